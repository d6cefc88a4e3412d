//! The forward/CONNECT proxy itself.
//!
//! Shaped after hyper's own `http_proxy` example: plain HTTP requests are
//! forwarded through a pooled client, and `CONNECT` requests are tunneled by
//! splicing the client and upstream sockets together once hyper hands back
//! the upgraded connection. GraphQL request bodies addressed to the
//! configured host are captured on the way through, never modified.

use super::capture::GqlRequestRecord;
use super::capture::CaptureStore;
use super::config::ProxyConfig;
use super::error::{ProxyError, Result};
use bytes::Bytes;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Incoming;
use hyper::client::conn::http1::Builder as ClientConnBuilder;
use hyper::server::conn::http1::Builder as ServerConnBuilder;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

fn full_body(bytes: impl Into<Bytes>) -> BoxBody {
  Full::new(bytes.into()).map_err(|never| match never {}).boxed()
}

fn empty_body() -> BoxBody {
  Empty::new().map_err(|never| match never {}).boxed()
}

/// A running (or not-yet-started) intercepting proxy.
pub struct Proxy {
  config: ProxyConfig,
  captures: Arc<CaptureStore>,
  shutdown: Arc<Notify>,
}

impl Proxy {
  pub fn new(config: ProxyConfig) -> Result<Self> {
    let captures = Arc::new(CaptureStore::new(&config.capture_dir)?);
    Ok(Self { config, captures, shutdown: Arc::new(Notify::new()) })
  }

  /// Binds the listener and serves connections until [`Proxy::close`] is
  /// called.
  pub async fn run(&self) -> Result<()> {
    let listener = TcpListener::bind(self.config.listen_addr).await.map_err(ProxyError::Bind)?;
    self.captures.log_line(&format!("listening on {}", self.config.listen_addr))?;

    loop {
      tokio::select! {
        _ = self.shutdown.notified() => {
          self.captures.log_line("shutting down")?;
          return Ok(());
        }
        accepted = listener.accept() => {
          let (stream, peer) = accepted.map_err(ProxyError::Io)?;
          let config = self.config.clone();
          let captures = Arc::clone(&self.captures);
          tokio::spawn(async move {
            if let Err(err) = serve_connection(stream, config, captures).await {
              tracing::debug!(%peer, error = %err, "proxy connection ended with an error");
            }
          });
        }
      }
    }
  }

  /// Signals the serve loop to stop accepting new connections and return.
  /// In-flight connections are left to finish on their own.
  pub fn close(&self) {
    self.shutdown.notify_one();
  }
}

async fn serve_connection(stream: TcpStream, config: ProxyConfig, captures: Arc<CaptureStore>) -> Result<()> {
  let io = TokioIo::new(stream);
  ServerConnBuilder::new()
    .preserve_header_case(true)
    .title_case_headers(true)
    .serve_connection(io, service_fn(move |req| handle(req, config.clone(), Arc::clone(&captures))))
    .with_upgrades()
    .await
    .map_err(ProxyError::Http)
}

async fn handle(req: Request<Incoming>, config: ProxyConfig, captures: Arc<CaptureStore>) -> std::result::Result<Response<BoxBody>, hyper::Error> {
  if req.method() == Method::CONNECT {
    return Ok(handle_connect(req));
  }

  let timeout = config.upstream_timeout;
  match tokio::time::timeout(timeout, forward(req, &config, &captures)).await {
    Ok(Ok(response)) => Ok(response),
    Ok(Err(err)) => {
      tracing::warn!(error = %err, "failed to forward proxied request");
      Ok(Response::builder().status(502).body(full_body(err.to_string())).expect("valid response"))
    }
    Err(_) => {
      tracing::warn!(?timeout, "upstream request timed out");
      Ok(Response::builder().status(504).body(full_body("upstream request timed out")).expect("valid response"))
    }
  }
}

/// Answers a `CONNECT` request with `200`, then once the client upgrades
/// the connection, splices it to a freshly dialed connection to the
/// requested authority. This is the only way a forward proxy can support
/// TLS (`https://`) destinations without terminating TLS itself.
fn handle_connect(req: Request<Incoming>) -> Response<BoxBody> {
  let Some(authority) = req.uri().authority().map(|a| a.to_string()) else {
    return Response::builder().status(400).body(full_body("CONNECT request had no authority")).expect("valid response");
  };

  tokio::spawn(async move {
    match hyper::upgrade::on(req).await {
      Ok(upgraded) => {
        if let Err(err) = tunnel(upgraded, &authority).await {
          tracing::debug!(%authority, error = %err, "tunnel closed with an error");
        }
      }
      Err(err) => tracing::debug!(error = %err, "failed to upgrade CONNECT request"),
    }
  });

  Response::builder().status(200).body(empty_body()).expect("valid response")
}

async fn tunnel(upgraded: hyper::upgrade::Upgraded, authority: &str) -> Result<()> {
  let mut server = TcpStream::connect(authority).await.map_err(ProxyError::Io)?;
  let mut client = TokioIo::new(upgraded);
  tokio::io::copy_bidirectional(&mut client, &mut server).await.map_err(ProxyError::Io)?;
  Ok(())
}

/// Forwards a plain (non-`CONNECT`) request upstream over a one-shot
/// client connection, capturing the body first if it looks like a
/// GraphQL request to the configured host.
async fn forward(req: Request<Incoming>, config: &ProxyConfig, captures: &CaptureStore) -> Result<Response<BoxBody>> {
  let authority = req.uri().authority().map(|a| a.to_string()).or_else(|| req.headers().get(hyper::header::HOST).and_then(|h| h.to_str().ok()).map(|s| s.to_string())).ok_or(ProxyError::MissingAuthority)?;

  let host = authority.split(':').next().unwrap_or(&authority).to_string();
  let port = authority.split(':').nth(1).and_then(|p| p.parse().ok()).unwrap_or(80u16);

  let (parts, body) = req.into_parts();
  let bytes = body.collect().await.map_err(ProxyError::Http)?.to_bytes();

  if config.matches_gql_host(&authority) {
    capture_gql_body(captures, &bytes);
  }

  let stream = TcpStream::connect((host.as_str(), port)).await.map_err(ProxyError::Io)?;
  let io = TokioIo::new(stream);
  let (mut sender, connection) = ClientConnBuilder::new().handshake(io).await.map_err(ProxyError::Http)?;
  tokio::spawn(async move {
    if let Err(err) = connection.await {
      tracing::debug!(error = %err, "upstream connection closed with an error");
    }
  });

  let outgoing = Request::from_parts(parts, full_body(bytes));
  let response = sender.send_request(outgoing).await.map_err(ProxyError::Http)?;
  let (parts, body) = response.into_parts();
  let bytes = body.collect().await.map_err(ProxyError::Http)?.to_bytes();
  Ok(Response::from_parts(parts, full_body(bytes)))
}

fn capture_gql_body(captures: &CaptureStore, bytes: &Bytes) {
  if bytes.is_empty() {
    return;
  }
  match GqlRequestRecord::parse_body(bytes) {
    Ok(records) => {
      for record in &records {
        if let Err(err) = captures.record(record) {
          tracing::warn!(error = %err, "failed to persist captured graphql request");
        }
      }
    }
    Err(err) => tracing::debug!(error = %err, "request to gql host did not parse as a graphql body"),
  }
}
