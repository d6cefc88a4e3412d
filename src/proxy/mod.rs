//! ## Intercepting proxy
//!
//! A local forward proxy (C8) for recovering GraphQL operations out of a
//! real browser session: point a Twitch tab's proxy settings (or an
//! `HTTPS_PROXY` environment variable) at [`Proxy`], browse normally, and
//! every distinct GraphQL request the tab makes is captured to disk --
//! deduplicated by [`fingerprint`] -- for later replay through [`Client`].
//!
//! [`Client`]: crate::gql::Client

mod capture;
mod config;
mod error;
mod fingerprint;
mod server;

pub use capture::GqlRequestRecord;
pub use config::{ProxyConfig, DEFAULT_GQL_HOST};
pub use error::{ProxyError, Result};
pub use fingerprint::fingerprint;
pub use server::Proxy;
