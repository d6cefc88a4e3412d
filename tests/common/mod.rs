//! Shared helpers for the integration tests: a tiny hand-rolled HTTP/1.1
//! server good enough to stand in for `gql.twitch.tv` or an arbitrary
//! upstream, used instead of pulling in a dedicated mocking crate.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Reserves an ephemeral TCP port by binding and immediately dropping a
/// std listener. Good enough for spinning up a server whose address needs
/// to be known before it starts accepting.
pub fn free_port() -> u16 {
  std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

/// Reads one HTTP/1.1 request off `socket`: headers, then exactly
/// `Content-Length` bytes of body if present. Returns the raw request
/// bytes (headers + body) for callers that want to inspect what was sent.
pub async fn read_http_request(socket: &mut TcpStream) -> Vec<u8> {
  let mut buf = Vec::new();
  let mut chunk = [0u8; 4096];
  loop {
    let n = socket.read(&mut chunk).await.expect("read request");
    if n == 0 {
      break;
    }
    buf.extend_from_slice(&chunk[..n]);
    let Some(header_end) = find_subslice(&buf, b"\r\n\r\n") else { continue };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length: usize = headers
      .lines()
      .find_map(|l| l.strip_prefix("content-length:").map(|v| v.trim().to_string()))
      .and_then(|v| v.parse().ok())
      .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
      let n = socket.read(&mut chunk).await.expect("read request body");
      if n == 0 {
        break;
      }
      buf.extend_from_slice(&chunk[..n]);
    }
    break;
  }
  buf
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  haystack.windows(needle.len()).position(|w| w == needle)
}

/// Writes a minimal HTTP/1.1 response with a JSON content type and
/// `Connection: close` (our test servers handle exactly one request per
/// accepted socket).
pub async fn respond(socket: &mut TcpStream, status: u16, body: &str) {
  let reason = match status {
    200 => "OK",
    400 => "Bad Request",
    429 => "Too Many Requests",
    500 => "Internal Server Error",
    _ => "Unknown",
  };
  let response = format!(
    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
    body.len()
  );
  socket.write_all(response.as_bytes()).await.expect("write response");
  socket.flush().await.expect("flush response");
}
