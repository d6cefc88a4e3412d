//! ## GraphQL client, introspector and discovery engine
//!
//! [`Client`] speaks Twitch's persisted-query dialect of GraphQL-over-HTTP:
//! operations are referenced by a SHA-256 hash of their query text rather
//! than sending the text itself, falling back to registering the text on
//! a `PersistedQueryNotFound` miss. [`Introspector`] runs the standard
//! introspection query and reshapes it into [`DiscoveredOperation`]s.
//! [`DiscoveryEngine`] combines introspection, a curated known-operation
//! catalog, and error-message probing to build up a [`DiscoveryResult`] on
//! endpoints where introspection is disabled.

mod client;
mod discovery;
mod error;
mod introspect;
mod known_operations;
mod operation;

pub use client::{hash_query, Client, Operation, RetryPolicy, TWITCH_GQL_ENDPOINT, TWITCH_WEB_CLIENT_ID};
pub use discovery::{infer_operation_type, looks_like_operation, DiscoveryEngine, DiscoveryOptions, DiscoveryResult};
pub use error::{GqlError, Result};
pub use introspect::{Introspector, INTROSPECTION_QUERY};
pub use known_operations::{KnownOperation, KNOWN_OPERATIONS};
pub use operation::{DiscoveredOperation, Kind, OperationVariable, Source};
