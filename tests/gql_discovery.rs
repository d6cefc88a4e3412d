//! Integration tests for the multi-strategy discovery engine against a
//! minimal mock GraphQL endpoint.

mod common;

use common::{free_port, read_http_request, respond};
use tokio::net::TcpListener;
use twitch_proto::gql::{Client, DiscoveryEngine, DiscoveryOptions, Source};

#[tokio::test]
async fn skipping_introspection_and_probing_yields_only_known_list() {
  // No strategy here makes a network call, so the client's endpoint is
  // never dialed -- a bogus port is fine.
  let client = Client::new("test-client-id").with_endpoint("http://127.0.0.1:1");
  let engine = DiscoveryEngine::new(&client);

  let result = engine
    .discover_all(DiscoveryOptions { skip_introspection: true, skip_probing: true, skip_known_list: false })
    .await;

  assert_eq!(result.sources, vec![Source::KnownList]);
  assert!(!result.operations.is_empty());
  assert!(result.errors.is_empty());
}

#[tokio::test]
async fn introspection_disabled_endpoint_still_returns_known_list() {
  let port = free_port();
  let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();

  let server = tokio::spawn(async move {
    let (mut socket, _) = listener.accept().await.unwrap();
    read_http_request(&mut socket).await;
    respond(&mut socket, 200, r#"{"errors":[{"message":"GraphQL introspection is not allowed"}]}"#).await;
  });

  let client = Client::new("test-client-id").with_endpoint(format!("http://127.0.0.1:{port}"));
  let engine = DiscoveryEngine::new(&client);

  let result = engine
    .discover_all(DiscoveryOptions { skip_introspection: false, skip_probing: true, skip_known_list: false })
    .await;

  assert!(!result.introspection_enabled);
  assert!(result.errors.is_empty(), "a disabled endpoint is not itself an error: {:?}", result.errors);
  assert!(result.sources.contains(&Source::Introspection));
  assert!(!result.operations.is_empty(), "known list should still contribute");

  server.await.unwrap();
}
