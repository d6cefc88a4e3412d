//! The discovered-operation data model shared by the introspector (C6) and
//! the discovery engine (C7).

use chrono::{DateTime, Utc};

/// The three GraphQL root operation kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
  Query,
  Mutation,
  Subscription,
}

/// Where a [`DiscoveredOperation`] came from. Kept per-operation so
/// callers can weigh confidence: introspection is ground truth, the
/// known-list catalog may be stale, and error-probing can have false
/// positives on field names that exist but aren't really top-level
/// operations worth querying.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
  Introspection,
  ErrorProbing,
  KnownList,
  Manual,
}

/// One argument a discovered operation accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationVariable {
  pub name: String,
  /// SDL type rendering, e.g. `String!`, `[ID!]!`.
  pub type_name: String,
  pub required: bool,
  pub default_value: Option<String>,
}

/// A single discovered GraphQL operation.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscoveredOperation {
  pub name: String,
  pub kind: Kind,
  pub query: Option<String>,
  pub sha256_hash: Option<String>,
  pub variables: Vec<OperationVariable>,
  pub description: Option<String>,
  pub deprecated: bool,
  pub source: Source,
  pub discovered_at: DateTime<Utc>,
}

impl DiscoveredOperation {
  pub fn new(name: impl Into<String>, kind: Kind, source: Source) -> Self {
    Self {
      name: name.into(),
      kind,
      query: None,
      sha256_hash: None,
      variables: Vec::new(),
      description: None,
      deprecated: false,
      source,
      discovered_at: Utc::now(),
    }
  }
}
