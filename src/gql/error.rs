//! Error types for the GraphQL client, introspector and discovery engine.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned by [`super::Client`] and the higher-level introspection
/// and discovery machinery built on top of it.
#[derive(Debug, Error)]
pub enum GqlError {
  /// The server responded `429`. Callers that retry should back off
  /// longer than they would for a plain [`GqlError::Api`].
  ///
  /// `reset_at`/`remaining` are reserved for the standard rate-limit
  /// response headers (`Ratelimit-Reset`, `Ratelimit-Remaining`); Twitch's
  /// GQL endpoint doesn't send them today, so these stay `None` rather
  /// than being filled in with a guess.
  #[error("rate limited")]
  RateLimited { reset_at: Option<DateTime<Utc>>, remaining: Option<u64> },

  /// A non-2xx, non-429 HTTP response, or a response with a populated
  /// `errors` array.
  #[error("graphql api error ({status}): {message}")]
  Api { status: u16, message: String },

  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("failed to decode response body: {0}")]
  Decode(#[from] serde_json::Error),

  /// A persisted query reference was used with no registered query text
  /// and the server didn't already have it cached (`PersistedQueryNotFound`).
  #[error("persisted query not found and no query text available to register it")]
  PersistedQueryNotFound,

  /// The server's `errors` array contained a message mentioning
  /// "introspection" (case-insensitively) -- the endpoint has introspection
  /// turned off rather than having failed outright. Carries the first
  /// matching message.
  #[error("introspection is disabled: {0}")]
  IntrospectionDisabled(String),
}

impl GqlError {
  /// Whether a request that failed this way is worth retrying. Only
  /// [`GqlError::RateLimited`] and 5xx [`GqlError::Api`] responses are
  /// retryable; transport errors propagate wrapped rather than being
  /// retried at this layer.
  pub fn is_retryable(&self) -> bool {
    match self {
      GqlError::RateLimited { .. } => true,
      GqlError::Api { status, .. } => *status >= 500,
      GqlError::Transport(_) => false,
      GqlError::Decode(_) => false,
      GqlError::PersistedQueryNotFound => false,
      GqlError::IntrospectionDisabled(_) => false,
    }
  }
}

pub type Result<T> = std::result::Result<T, GqlError>;
