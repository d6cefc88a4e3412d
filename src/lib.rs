//! ## Twitch protocol stack
//!
//! This crate implements the two undocumented, real-time protocol surfaces
//! exposed by Twitch: the tag-extended IRC-over-WebSocket chat protocol, and
//! the GraphQL HTTP endpoint behind the website and apps.
//!
//! The entrypoints are:
//! - [`irc`]: a total, never-failing line parser for the tagged IRC grammar.
//! - [`msg`]: typed domain events decoded from parsed [`irc::Frame`]s.
//! - [`chat`]: a stateful WebSocket chat connection and a callback-oriented
//!   bot facade built on top of it (feature `client`/`bot`).
//! - [`gql`]: a GraphQL client, schema introspector and multi-strategy
//!   operation discovery engine (feature `gql`).
//! - [`proxy`]: an intercepting forward proxy that captures GraphQL traffic
//!   in flight (feature `proxy`).

#![allow(clippy::too_many_arguments)]

pub mod irc;
pub mod msg;

#[cfg(feature = "client")]
pub mod chat;

#[cfg(feature = "gql")]
pub mod gql;

#[cfg(feature = "proxy")]
pub mod proxy;

pub use irc::Frame;
pub use msg::Event;
