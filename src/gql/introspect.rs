//! Schema introspection: runs the standard GraphQL introspection query and
//! reshapes the response into operations with their variable definitions.

use super::client::{Client, Operation as GqlOperation};
use super::error::{GqlError, Result};
use super::operation::{Kind, OperationVariable, Source};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// The standard introspection query: every type, and the root `Query` /
/// `Mutation` / `Subscription` types' fields with their arguments.
/// `ofType` is unrolled to seven levels to fully resolve types wrapped in
/// any realistic combination of `NON_NULL`/`LIST` (e.g. `[[String!]!]!`
/// is already four wrappers deep).
pub const INTROSPECTION_QUERY: &str = r#"
query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types {
      ...FullType
    }
    directives {
      name
      description
      args { ...InputValue }
    }
  }
}
fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args { ...InputValue }
    type { ...TypeRef }
    isDeprecated
    deprecationReason
  }
  inputFields { ...InputValue }
  interfaces { ...TypeRef }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes { ...TypeRef }
}
fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}
fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType {
                kind
                name
              }
            }
          }
        }
      }
    }
  }
}
"#;

#[derive(Clone, Debug, Deserialize)]
struct RawSchema {
  #[serde(rename = "__schema")]
  schema: RawSchemaInner,
}

#[derive(Clone, Debug, Deserialize)]
struct RawSchemaInner {
  #[serde(rename = "queryType")]
  query_type: Option<RawNamed>,
  #[serde(rename = "mutationType")]
  mutation_type: Option<RawNamed>,
  #[serde(rename = "subscriptionType", default)]
  subscription_type: Option<RawNamed>,
  types: Vec<RawType>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawNamed {
  name: String,
}

#[derive(Clone, Debug, Deserialize)]
struct RawType {
  name: Option<String>,
  #[serde(default)]
  fields: Vec<RawField>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawField {
  name: String,
  #[serde(default)]
  description: Option<String>,
  #[serde(default)]
  args: Vec<RawInputValue>,
  #[serde(rename = "isDeprecated", default)]
  is_deprecated: bool,
}

#[derive(Clone, Debug, Deserialize)]
struct RawInputValue {
  name: String,
  #[serde(rename = "type")]
  ty: RawTypeRef,
  #[serde(rename = "defaultValue", default)]
  default_value: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawTypeRef {
  kind: String,
  name: Option<String>,
  #[serde(rename = "ofType", default)]
  of_type: Option<Box<RawTypeRef>>,
}

impl RawTypeRef {
  /// Renders the GraphQL SDL notation for a (possibly wrapped) type:
  /// `NON_NULL` becomes a trailing `!`, `LIST` becomes surrounding `[ ]`.
  fn render(&self) -> String {
    match self.kind.as_str() {
      "NON_NULL" => format!("{}!", self.of_type.as_ref().map(|t| t.render()).unwrap_or_default()),
      "LIST" => format!("[{}]", self.of_type.as_ref().map(|t| t.render()).unwrap_or_default()),
      _ => self.name.clone().unwrap_or_default(),
    }
  }

  fn is_required(&self) -> bool {
    self.kind == "NON_NULL"
  }
}

/// Reshapes an introspection response into [`super::DiscoveredOperation`]s
/// hanging off the root `Query`/`Mutation`/`Subscription` types. Full
/// type/interface/enum graphs are parsed only as far as needed to resolve
/// field argument types -- nothing else in this crate consumes them.
pub struct Introspector<'a> {
  client: &'a Client,
}

impl<'a> Introspector<'a> {
  pub fn new(client: &'a Client) -> Self {
    Self { client }
  }

  /// Runs introspection. Returns [`GqlError::IntrospectionDisabled`] if the
  /// endpoint's error response mentions "introspection"; any other error
  /// surfaces as-is.
  pub async fn introspect(&self) -> Result<Vec<super::DiscoveredOperation>> {
    let operation = GqlOperation::from_query("IntrospectionQuery", INTROSPECTION_QUERY, serde_json::json!({}));
    let data = self.client.execute(&operation).await?;
    parse_schema(data)
  }
}

fn parse_schema(data: Value) -> Result<Vec<super::DiscoveredOperation>> {
  let raw: RawSchema = serde_json::from_value(data).map_err(GqlError::Decode)?;
  let by_name: HashMap<&str, &RawType> = raw.schema.types.iter().filter_map(|t| t.name.as_deref().map(|n| (n, t))).collect();

  let mut operations = Vec::new();
  let roots = [
    (raw.schema.query_type.as_ref(), Kind::Query),
    (raw.schema.mutation_type.as_ref(), Kind::Mutation),
    (raw.schema.subscription_type.as_ref(), Kind::Subscription),
  ];

  for (root, kind) in roots {
    let Some(root) = root else { continue };
    let Some(ty) = by_name.get(root.name.as_str()) else { continue };
    for field in &ty.fields {
      operations.push(field_to_operation(field, kind));
    }
  }

  Ok(operations)
}

fn field_to_operation(field: &RawField, kind: Kind) -> super::DiscoveredOperation {
  let variables = field
    .args
    .iter()
    .map(|arg| OperationVariable {
      name: arg.name.clone(),
      type_name: arg.ty.render(),
      required: arg.ty.is_required(),
      default_value: arg.default_value.clone(),
    })
    .collect();

  super::DiscoveredOperation {
    name: field.name.clone(),
    kind,
    query: None,
    sha256_hash: None,
    variables,
    description: field.description.clone(),
    deprecated: field.is_deprecated,
    source: Source::Introspection,
    discovered_at: chrono::Utc::now(),
  }
}
