//! Persisted-query GraphQL client with retry/backoff and batching.

use super::error::{GqlError, Result};
use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::time::Duration;

pub const TWITCH_GQL_ENDPOINT: &str = "https://gql.twitch.tv/gql";

/// Twitch's well-known public web client id, sent as the `Client-Id`
/// header. Twitch's GraphQL endpoint requires *some* registered client id
/// on every request; this is the one the twitch.tv website itself uses.
pub const TWITCH_WEB_CLIENT_ID: &str = "kimne78kx3ncx6brgo4mv6wki5h1ko";

/// A single operation to send: either raw query text (an ad-hoc query, by
/// name) or a persisted-query hash reference with no text attached. These
/// are two distinct, caller-selected modes -- there is no automatic
/// hash-first fallback between them.
#[derive(Clone, Debug)]
pub struct Operation {
  pub name: String,
  pub query: Option<String>,
  pub sha256_hash: Option<String>,
  pub variables: Value,
  pub extra_extensions: Option<Value>,
}

impl Operation {
  /// Builds an ad-hoc operation from full query text. Sent as a plain
  /// `query` field; carries no persisted-query hash.
  pub fn from_query(name: impl Into<String>, query: impl Into<String>, variables: Value) -> Self {
    Operation { name: name.into(), query: Some(query.into()), sha256_hash: None, variables, extra_extensions: None }
  }

  /// Builds an operation from a hash reference alone, with no query text
  /// to fall back to if the server reports `PersistedQueryNotFound`. This
  /// is `Client::execute_with_hash`'s building block.
  pub fn from_hash(name: impl Into<String>, sha256_hash: impl Into<String>, variables: Value) -> Self {
    Operation { name: name.into(), query: None, sha256_hash: Some(sha256_hash.into()), variables, extra_extensions: None }
  }

  /// Renders the outgoing JSON body. Fields that have no value (`query`,
  /// `variables`, `extensions`) are omitted entirely rather than sent as
  /// `null`.
  fn body(&self) -> Value {
    let mut body = serde_json::Map::new();
    body.insert("operationName".to_string(), json!(self.name));

    if !matches!(self.variables, Value::Null) {
      body.insert("variables".to_string(), self.variables.clone());
    }

    if let Some(query) = &self.query {
      body.insert("query".to_string(), json!(query));
    }

    let mut extensions = self.extra_extensions.clone().unwrap_or_else(|| json!({}));
    if let Some(hash) = &self.sha256_hash {
      extensions["persistedQuery"] = json!({ "version": 1, "sha256Hash": hash });
    }
    if extensions.as_object().is_some_and(|m| !m.is_empty()) {
      body.insert("extensions".to_string(), extensions);
    }

    Value::Object(body)
  }
}

pub fn hash_query(query: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(query.as_bytes());
  hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

/// Retry policy applied by [`Client::execute`] and [`Client::execute_batch`].
///
/// Backoff is deterministic exponential growth with no jitter:
/// `base_delay * 2^(attempt-1)` for the first, second, ... retry.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
  pub enabled: bool,
  pub max_retries: u32,
  pub base_delay: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self { enabled: true, max_retries: 3, base_delay: Duration::from_millis(250) }
  }
}

/// A GraphQL-over-HTTP client speaking Twitch's persisted-query dialect.
///
/// Safe for concurrent use: the underlying `reqwest::Client` and all
/// configuration are immutable after construction.
#[derive(Clone)]
pub struct Client {
  http: reqwest::Client,
  endpoint: String,
  client_id: String,
  oauth_token: Option<String>,
  retry: RetryPolicy,
}

impl Client {
  pub fn new(client_id: impl Into<String>) -> Self {
    Self {
      http: reqwest::Client::new(),
      endpoint: TWITCH_GQL_ENDPOINT.to_string(),
      client_id: client_id.into(),
      oauth_token: None,
      retry: RetryPolicy::default(),
    }
  }

  pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
    self.endpoint = endpoint.into();
    self
  }

  pub fn with_oauth_token(mut self, token: impl Into<String>) -> Self {
    self.oauth_token = Some(token.into());
    self
  }

  pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
    self.retry = retry;
    self
  }

  /// Executes a single operation, retrying transient failures with
  /// exponential backoff when the retry policy is enabled. A persisted-hash
  /// operation the server doesn't have cached fails with
  /// [`GqlError::PersistedQueryNotFound`] -- there is no query text to
  /// register in its place.
  pub async fn execute(&self, operation: &Operation) -> Result<Value> {
    let mut attempt = 0u32;
    loop {
      match self.send_one(operation).await {
        Ok(value) => return Ok(value),
        Err(err) if self.should_retry(&err, attempt) => {
          tracing::warn!(operation = %operation.name, attempt, error = %err, "retrying graphql request");
          sleep_backoff(self.retry.base_delay, attempt).await;
          attempt += 1;
        }
        Err(err) => return Err(err),
      }
    }
  }

  /// Executes a persisted-query-only request given just a hash -- no
  /// query text is sent or available if the server reports
  /// `PersistedQueryNotFound`.
  pub async fn execute_with_hash(&self, name: impl Into<String>, hash: impl Into<String>, variables: Value) -> Result<Value> {
    let operation = Operation::from_hash(name, hash, variables);
    self.execute(&operation).await
  }

  /// Executes several operations in one HTTP round trip, as a JSON array
  /// body. Twitch's GraphQL endpoint answers batched requests with a
  /// matching JSON array of responses, in request order. Not retried at
  /// this level -- a batch failure could be partial, and retrying the
  /// whole batch risks duplicate side effects for mutations that already
  /// succeeded.
  pub async fn execute_batch(&self, operations: &[Operation]) -> Result<Vec<Value>> {
    self.send_batch(operations).await
  }

  fn should_retry(&self, err: &GqlError, attempt: u32) -> bool {
    self.retry.enabled && attempt < self.retry.max_retries && err.is_retryable()
  }

  async fn send_one(&self, operation: &Operation) -> Result<Value> {
    let response = self.post_value(&operation.body()).await?;
    if is_persisted_query_miss(&response) {
      return Err(GqlError::PersistedQueryNotFound);
    }
    extract_single(response)
  }

  async fn send_batch(&self, operations: &[Operation]) -> Result<Vec<Value>> {
    let body: Vec<Value> = operations.iter().map(|op| op.body()).collect();
    let response = self.post_value(&Value::Array(body)).await?;
    let values = response.as_array().cloned().ok_or_else(|| GqlError::Api {
      status: 200,
      message: "expected a JSON array for a batched request".to_string(),
    })?;

    values
      .into_iter()
      .map(|value| if is_persisted_query_miss(&value) { Err(GqlError::PersistedQueryNotFound) } else { extract_single(value) })
      .collect()
  }

  async fn post_value<T: Serialize>(&self, body: &T) -> Result<Value> {
    let mut request = self.http.post(&self.endpoint).header("Content-Type", "application/json").header("Client-Id", &self.client_id);
    if let Some(token) = &self.oauth_token {
      request = request.header("Authorization", format!("OAuth {token}"));
    }

    let response = request.json(body).send().await?;

    let status = response.status();
    if status.as_u16() == 429 {
      return Err(GqlError::RateLimited { reset_at: None, remaining: None });
    }
    if !status.is_success() {
      let message = response.text().await.unwrap_or_default();
      return Err(GqlError::Api { status: status.as_u16(), message });
    }

    Ok(response.json::<Value>().await?)
  }
}

fn is_persisted_query_miss(response: &Value) -> bool {
  response
    .get("errors")
    .and_then(Value::as_array)
    .is_some_and(|errors| errors.iter().any(|e| e.get("message").and_then(Value::as_str) == Some("PersistedQueryNotFound")))
}

/// Pulls `data` out of a successful response, or turns a populated
/// `errors` array into an error. A message mentioning "introspection"
/// (case-insensitively) is surfaced as [`GqlError::IntrospectionDisabled`]
/// instead of a generic [`GqlError::Api`], so [`super::Introspector`] and
/// [`super::DiscoveryEngine`] can tell "the endpoint said no" apart from
/// "the endpoint is broken".
fn extract_single(response: Value) -> Result<Value> {
  if let Some(errors) = response.get("errors").and_then(Value::as_array) {
    if !errors.is_empty() {
      let messages: Vec<&str> = errors.iter().filter_map(|e| e.get("message").and_then(Value::as_str)).collect();
      if let Some(disabled) = messages.iter().find(|m| m.to_lowercase().contains("introspection")) {
        return Err(GqlError::IntrospectionDisabled(disabled.to_string()));
      }
      return Err(GqlError::Api { status: 200, message: messages.join("; ") });
    }
  }
  Ok(response.get("data").cloned().unwrap_or(Value::Null))
}

async fn sleep_backoff(base: Duration, attempt: u32) {
  let delay = base.saturating_mul(1u32 << attempt.min(16));
  tokio::time::sleep(delay).await;
}
