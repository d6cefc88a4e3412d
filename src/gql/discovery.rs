//! Multi-strategy GraphQL operation discovery.
//!
//! Combines three independent sources of operation names and merges them
//! into one deduplicated [`DiscoveryResult`]:
//!
//! 1. **Introspection** -- if the endpoint allows it, just ask (C6).
//! 2. **Error probing** -- send one deliberately malformed query and mine
//!    the server's "Did you mean ...?" suggestion list for real field
//!    names.
//! 3. **Known list** -- a static, hand-curated seed catalog (see
//!    [`super::known_operations`]).
//!
//! Twitch's production endpoint has introspection disabled, which is why
//! (2) and (3) exist at all.

use super::client::Client;
use super::error::GqlError;
use super::introspect::Introspector;
use super::known_operations::KNOWN_OPERATIONS;
use super::operation::{DiscoveredOperation, Kind, Source};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// The candidate field name probed when `skip_probing` is false. Chosen to
/// be exceedingly unlikely to collide with a real field.
const PROBE_FIELD: &str = "__invalid_probe_field_12345";

/// Per-strategy opt-outs. All strategies run by default.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscoveryOptions {
  pub skip_introspection: bool,
  pub skip_probing: bool,
  pub skip_known_list: bool,
}

/// The outcome of a [`DiscoveryEngine::discover_all`] run. A snapshot,
/// immutable after the engine returns.
#[derive(Clone, Debug, Default)]
pub struct DiscoveryResult {
  /// The operations introspection actually reported, before merging with
  /// the other strategies -- `None` if introspection was skipped or
  /// failed.
  pub schema: Option<Vec<DiscoveredOperation>>,
  pub operations: Vec<DiscoveredOperation>,
  pub discovered_at: Option<DateTime<Utc>>,
  pub sources: Vec<Source>,
  pub errors: Vec<String>,
  pub introspection_enabled: bool,
}

pub struct DiscoveryEngine<'a> {
  client: &'a Client,
}

impl<'a> DiscoveryEngine<'a> {
  pub fn new(client: &'a Client) -> Self {
    Self { client }
  }

  /// Runs every non-skipped strategy and merges the results. A failing
  /// strategy contributes a string to `result.errors` rather than
  /// aborting the others -- one strategy's failure never masks another's
  /// success.
  pub async fn discover_all(&self, options: DiscoveryOptions) -> DiscoveryResult {
    let mut result = DiscoveryResult { introspection_enabled: true, ..Default::default() };
    let mut merged: HashMap<String, DiscoveredOperation> = HashMap::new();

    if !options.skip_introspection {
      result.sources.push(Source::Introspection);
      match Introspector::new(self.client).introspect().await {
        Ok(ops) => {
          result.schema = Some(ops.clone());
          for op in ops {
            merge_into(&mut merged, op);
          }
        }
        Err(GqlError::IntrospectionDisabled(message)) => {
          result.introspection_enabled = false;
          tracing::debug!(message = %message, "introspection disabled on endpoint");
        }
        Err(err) => {
          result.errors.push(format!("introspection: {err}"));
        }
      }
    }

    if !options.skip_probing {
      result.sources.push(Source::ErrorProbing);
      match self.probe_suggestions().await {
        Ok(candidates) => {
          for name in candidates {
            let kind = infer_operation_type(&name);
            merge_into(&mut merged, DiscoveredOperation::new(name, kind, Source::ErrorProbing));
          }
        }
        Err(err) => result.errors.push(format!("error probing: {err}")),
      }
    }

    if !options.skip_known_list {
      result.sources.push(Source::KnownList);
      for known in KNOWN_OPERATIONS {
        merge_into(&mut merged, DiscoveredOperation::new(known.name, known.kind, Source::KnownList));
      }
    }

    result.operations = merged.into_values().collect();
    result.operations.sort_by(|a, b| a.name.cmp(&b.name));
    result.discovered_at = Some(Utc::now());
    result
  }

  /// Sends one deliberately malformed query referencing a field that
  /// cannot exist, and mines the server's "Did you mean ...?" suggestion
  /// list for real operation names.
  async fn probe_suggestions(&self) -> super::error::Result<Vec<String>> {
    let query = format!("query {{ {PROBE_FIELD} }}");
    let operation = super::client::Operation::from_query("ProbeDiscovery", query, serde_json::json!({}));
    match self.client.execute(&operation).await {
      // A malformed probe field succeeding outright is not expected, but
      // isn't useful for discovery either way.
      Ok(_) => Ok(Vec::new()),
      Err(GqlError::Api { message, .. }) => Ok(parse_suggestions(&message).into_iter().filter(|name| looks_like_operation(name)).collect()),
      Err(err) => Err(err),
    }
  }

  /// Probes a single caller-supplied candidate name directly, for callers
  /// who already have a candidate list from some other source (e.g. a
  /// captured proxy operation name) and want to confirm it's live.
  pub async fn probe(&self, candidate: &str) -> super::error::Result<bool> {
    let query = format!("query {{ {candidate} }}");
    let operation = super::client::Operation::from_query(candidate, query, serde_json::json!({}));
    match self.client.execute(&operation).await {
      Ok(_) => Ok(true),
      Err(GqlError::Api { message, .. }) => Ok(!message.contains(&format!("Cannot query field \"{candidate}\""))),
      Err(err) => Err(err),
    }
  }
}

/// Inserts `incoming` into `merged`, keyed by name. If a record already
/// exists under that name, it is merged field-by-field: a more specific
/// kind wins (a [`Kind::Query`] default yields to `Mutation`/`Subscription`,
/// but between two non-`Query` kinds the earlier one is kept), and every
/// other field prefers whichever side already has a non-empty value,
/// since "prefer non-empty" means the first strategy to populate a field
/// keeps it.
fn merge_into(merged: &mut HashMap<String, DiscoveredOperation>, incoming: DiscoveredOperation) {
  match merged.get_mut(&incoming.name) {
    None => {
      merged.insert(incoming.name.clone(), incoming);
    }
    Some(existing) => {
      if existing.kind != incoming.kind && existing.kind == Kind::Query {
        existing.kind = incoming.kind;
      }
      if existing.query.is_none() {
        existing.query = incoming.query;
      }
      if existing.sha256_hash.is_none() {
        existing.sha256_hash = incoming.sha256_hash;
      }
      if existing.description.as_deref().unwrap_or("").is_empty() {
        existing.description = incoming.description;
      }
      if existing.variables.is_empty() {
        existing.variables = incoming.variables;
      }
      existing.deprecated = existing.deprecated || incoming.deprecated;
    }
  }
}

/// Extracts every quoted token following the first `Did you mean` in a
/// GraphQL validation error, e.g. `Cannot query field "foo" on type
/// "Query". Did you mean "bar", "baz", or "quux"?` yields
/// `["bar", "baz", "quux"]`.
fn parse_suggestions(message: &str) -> Vec<String> {
  let Some(marker_idx) = message.find("Did you mean") else {
    return Vec::new();
  };
  let tail = &message[marker_idx..];

  let mut suggestions = Vec::new();
  let mut rest = tail;
  while let Some(start) = rest.find('"') {
    let after_quote = &rest[start + 1..];
    let Some(end) = after_quote.find('"') else { break };
    suggestions.push(after_quote[..end].to_string());
    rest = &after_quote[end + 1..];
  }
  suggestions
}

/// Heuristic gate on probe-derived candidate names: at least 2 characters,
/// and either starting with an uppercase letter, containing an
/// underscore, or containing a lowercase-to-uppercase (camelCase)
/// transition. Filters out plain field names like `id` or `login` that
/// are real GraphQL fields but not top-level operations worth recording.
pub fn looks_like_operation(name: &str) -> bool {
  if name.chars().count() < 2 {
    return false;
  }
  let starts_upper = name.chars().next().is_some_and(|c| c.is_uppercase());
  let has_underscore = name.contains('_');
  let has_camel_transition = name.chars().zip(name.chars().skip(1)).any(|(a, b)| a.is_lowercase() && b.is_uppercase());
  starts_upper || has_underscore || has_camel_transition
}

/// Classifies an operation name by its conventional naming pattern:
/// mutation-verb prefixes/suffixes, subscription markers, otherwise query.
pub fn infer_operation_type(name: &str) -> Kind {
  const MUTATION_VERBS: &[&str] = &["Create", "Update", "Delete", "Remove", "Add", "Set", "Follow", "Unfollow", "Block", "Unblock", "Ban", "Unban", "Report"];

  if MUTATION_VERBS.iter().any(|verb| name.starts_with(verb) || name.ends_with(verb)) {
    return Kind::Mutation;
  }
  if name.starts_with("On") || name.starts_with("Subscribe") || name.contains("Subscription") {
    return Kind::Subscription;
  }
  Kind::Query
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn infer_operation_type_matches_spec_examples() {
    assert_eq!(infer_operation_type("CreateClip"), Kind::Mutation);
    assert_eq!(infer_operation_type("UpdateUser"), Kind::Mutation);
    assert_eq!(infer_operation_type("DeleteVideo"), Kind::Mutation);
    assert_eq!(infer_operation_type("FollowButton_FollowUser"), Kind::Mutation);
    assert_eq!(infer_operation_type("OnMessageReceived"), Kind::Subscription);
    assert_eq!(infer_operation_type("SubscribeToChat"), Kind::Subscription);
    assert_eq!(infer_operation_type("GetUser"), Kind::Query);
    assert_eq!(infer_operation_type("ChannelPage_Query"), Kind::Query);
  }

  #[test]
  fn looks_like_operation_matches_spec_examples() {
    assert!(looks_like_operation("ChannelPage_Query"));
    assert!(looks_like_operation("GetUser"));
    assert!(looks_like_operation("UserCard"));
    assert!(!looks_like_operation("id"));
    assert!(!looks_like_operation("a"));
    assert!(!looks_like_operation("login"));
  }

  #[test]
  fn parse_suggestions_extracts_quoted_names() {
    let message = r#"Cannot query field "foo" on type "Query". Did you mean "bar", "baz", or "quux"?"#;
    assert_eq!(parse_suggestions(message), vec!["bar", "baz", "quux"]);
  }

  #[test]
  fn parse_suggestions_empty_when_no_marker() {
    assert!(parse_suggestions("Cannot query field \"foo\" on type \"Query\".").is_empty());
  }

  #[test]
  fn dedup_prefers_non_empty_fields_and_keeps_first_query_text() {
    let mut merged = HashMap::new();
    merge_into(&mut merged, DiscoveredOperation::new("Op1", Kind::Query, Source::KnownList));
    merge_into(&mut merged, {
      let mut op = DiscoveredOperation::new("Op2", Kind::Query, Source::KnownList);
      op.query = Some("query Op2{user}".to_string());
      op
    });
    merge_into(&mut merged, {
      let mut op = DiscoveredOperation::new("Op1", Kind::Query, Source::ErrorProbing);
      op.description = Some("Better".to_string());
      op
    });
    merge_into(&mut merged, DiscoveredOperation::new("Op2", Kind::Query, Source::ErrorProbing));

    assert_eq!(merged.len(), 2);
    assert_eq!(merged["Op1"].description.as_deref(), Some("Better"));
    assert_eq!(merged["Op2"].query.as_deref(), Some("query Op2{user}"));
  }

  #[test]
  fn dedup_lets_specific_kind_win_over_default_query() {
    let mut merged = HashMap::new();
    merge_into(&mut merged, DiscoveredOperation::new("SendMessage", Kind::Query, Source::ErrorProbing));
    merge_into(&mut merged, DiscoveredOperation::new("SendMessage", Kind::Mutation, Source::KnownList));
    assert_eq!(merged["SendMessage"].kind, Kind::Mutation);
  }
}
