//! Configuration for the intercepting proxy.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The GraphQL host the proxy watches for captures. Anything else passing
/// through the proxy is forwarded untouched.
pub const DEFAULT_GQL_HOST: &str = "gql.twitch.tv";

#[derive(Clone, Debug)]
pub struct ProxyConfig {
  /// Address the proxy's HTTP listener binds to.
  pub listen_addr: SocketAddr,
  /// Host portion of request authorities treated as GraphQL traffic worth
  /// capturing. Matched case-insensitively, ignoring a trailing port.
  pub gql_host: String,
  /// Directory captured operations are written to. Created if missing.
  pub capture_dir: PathBuf,
  /// Timeout applied to the upstream leg of a forwarded request.
  pub upstream_timeout: Duration,
}

impl ProxyConfig {
  pub fn new(listen_addr: SocketAddr, capture_dir: impl AsRef<Path>) -> Self {
    Self {
      listen_addr,
      gql_host: DEFAULT_GQL_HOST.to_string(),
      capture_dir: capture_dir.as_ref().to_path_buf(),
      upstream_timeout: Duration::from_secs(30),
    }
  }

  pub fn with_gql_host(mut self, host: impl Into<String>) -> Self {
    self.gql_host = host.into();
    self
  }

  pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
    self.upstream_timeout = timeout;
    self
  }

  /// Whether `authority` (a `host` or `host:port` string) names the
  /// configured GraphQL host.
  pub fn matches_gql_host(&self, authority: &str) -> bool {
    let host = authority.split(':').next().unwrap_or(authority);
    host.eq_ignore_ascii_case(&self.gql_host)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn matches_gql_host_ignores_port_and_case() {
    let config = ProxyConfig::new("127.0.0.1:8080".parse().unwrap(), "/tmp/captures");
    assert!(config.matches_gql_host("gql.twitch.tv:443"));
    assert!(config.matches_gql_host("GQL.TWITCH.TV"));
    assert!(!config.matches_gql_host("other.twitch.tv"));
  }
}
