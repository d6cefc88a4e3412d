//! Error types for the chat client.

use thiserror::Error;

/// Errors that can occur while driving a chat [`Connection`](super::Connection).
#[derive(Debug, Error)]
pub enum ChatError {
  #[error("connection is not established")]
  NotConnected,

  #[error("connection is already established")]
  AlreadyConnected,

  #[error("authentication failed: {0}")]
  AuthFailed(String),

  #[error("handshake timed out")]
  HandshakeTimeout,

  #[error("connection closed by the server")]
  ConnectionClosed,

  #[error("operation was cancelled")]
  Cancelled,

  #[error("websocket error: {0}")]
  WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

pub type Result<T> = std::result::Result<T, ChatError>;
