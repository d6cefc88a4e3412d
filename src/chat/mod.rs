//! ## Chat client
//!
//! A stateful WebSocket connection to Twitch chat (`wss://irc-ws.chat.twitch.tv:443`),
//! plus a reconnecting bot facade built on top of it.
//!
//! [`Connection`] is the low-level primitive: it performs the capability
//! negotiation and auth handshake synchronously inside [`Connection::connect`],
//! then hands off to a background reader task that decodes incoming
//! [`Frame`](crate::irc::Frame)s into [`crate::msg::Event`]s and dispatches
//! them to whatever callbacks are registered on [`Connection::handlers`].
//! A second background task sends a keepalive `PING` on an interval and
//! treats a missing `PONG` as a dead connection.
//!
//! [`Bot`] wraps a [`Connection`] with reconnect-with-backoff and
//! rejoin-on-reconnect policy, matching how most long-running chat bots
//! actually want to use this crate.

mod bot;
mod config;
mod connection;
mod error;
mod handlers;

pub use bot::Bot;
pub use config::{Config, Credentials, CHAT_URL, DEFAULT_CAPABILITIES};
pub use connection::Connection;
pub use error::{ChatError, Result};
pub use handlers::{Handler, Handlers, RaidEvent};

/// Cancellation signal accepted by [`Connection::ping`]. Re-exported so
/// callers don't need a direct `tokio-util` dependency just to drive a
/// manual heartbeat.
pub use tokio_util::sync::CancellationToken;
