//! Error types for the intercepting proxy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("http error: {0}")]
  Http(#[from] hyper::Error),

  #[error("request had no authority to connect to")]
  MissingAuthority,

  #[error("failed to persist captured operations: {0}")]
  Persist(std::io::Error),

  #[error("failed to bind listener: {0}")]
  Bind(std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProxyError>;
