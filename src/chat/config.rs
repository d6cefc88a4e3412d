//! Connection configuration.
//!
//! Mirrors the option-pattern used elsewhere in this crate: a plain
//! configuration record with a sensible [`Default`], built up with a
//! builder-style chain of setters rather than a separate `Options` type.

use rand::Rng;
use std::time::Duration;

/// Default capabilities requested during the handshake.
pub const DEFAULT_CAPABILITIES: &[&str] = &["twitch.tv/tags", "twitch.tv/commands", "twitch.tv/membership"];

pub const CHAT_URL: &str = "wss://irc-ws.chat.twitch.tv:443";

/// Login credentials for the chat connection.
#[derive(Clone)]
pub struct Credentials {
  /// IRC nickname. Lower-cased before being sent.
  pub nick: String,
  /// OAuth user access token. The `oauth:` prefix is added automatically
  /// if missing.
  pub token: String,
}

impl Credentials {
  pub fn new(nick: impl Into<String>, token: impl Into<String>) -> Self {
    Self { nick: nick.into(), token: token.into() }
  }

  /// Anonymous, read-only credentials using Twitch's `justinfanNNNNN`
  /// convention: any password is accepted for these nicks, but the
  /// resulting connection cannot send `PRIVMSG`.
  pub fn anonymous() -> Self {
    let n: u32 = rand::thread_rng().gen_range(10_000..99_999);
    Self { nick: format!("justinfan{n}"), token: "oauth:anonymous".to_string() }
  }
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials").field("nick", &self.nick).field("token", &"<redacted>").finish()
  }
}

/// Connection configuration.
#[derive(Clone, Debug)]
pub struct Config {
  pub credentials: Option<Credentials>,
  pub capabilities: Vec<String>,
  /// WebSocket URL to dial. Defaults to [`CHAT_URL`]; overridable so
  /// tests (and anyone proxying the connection) can point at a different
  /// endpoint.
  pub url: String,
  pub connect_timeout: Duration,
  /// Whether to automatically reconnect and rejoin channels after a
  /// disconnect. Enabled by default.
  pub auto_reconnect: bool,
  /// How long to wait before the first reconnect attempt after a
  /// disconnect.
  pub reconnect_delay: Duration,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      credentials: None,
      capabilities: DEFAULT_CAPABILITIES.iter().map(|s| s.to_string()).collect(),
      url: CHAT_URL.to_string(),
      connect_timeout: Duration::from_secs(10),
      auto_reconnect: true,
      reconnect_delay: Duration::from_secs(5),
    }
  }
}

impl Config {
  pub fn credentials(mut self, credentials: Credentials) -> Self {
    self.credentials = Some(credentials);
    self
  }

  pub fn capabilities(mut self, capabilities: impl IntoIterator<Item = impl Into<String>>) -> Self {
    self.capabilities = capabilities.into_iter().map(|c| c.into()).collect();
    self
  }

  pub fn url(mut self, url: impl Into<String>) -> Self {
    self.url = url.into();
    self
  }

  pub fn connect_timeout(mut self, timeout: Duration) -> Self {
    self.connect_timeout = timeout;
    self
  }

  pub fn auto_reconnect(mut self, enabled: bool) -> Self {
    self.auto_reconnect = enabled;
    self
  }

  pub fn reconnect_delay(mut self, delay: Duration) -> Self {
    self.reconnect_delay = delay;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn anonymous_credentials_use_justinfan_convention() {
    let creds = Credentials::anonymous();
    assert!(creds.nick.starts_with("justinfan"));
    let suffix: u32 = creds.nick.trim_start_matches("justinfan").parse().unwrap();
    assert!((10_000..99_999).contains(&suffix));
  }

  #[test]
  fn default_config_matches_spec_defaults() {
    let config = Config::default();
    assert_eq!(config.capabilities, DEFAULT_CAPABILITIES);
    assert!(config.auto_reconnect);
  }
}
