//! Serving generated GraphQL schemas.
//!
//! [`build_schema`] generates the schema of a server from its [`Configuration`], federated or not.
//! Operations are executed by an [`ExecutionEngine`]: queries and mutations through
//! [`GraphQLRequestHandler`], subscriptions through [`SubscriptionHandler`]. WebSocket sessions
//! speaking the `graphql-ws` protocol are served by [`SubscriptionProtocolHandler`], which tracks
//! the running subscriptions of every session in a [`SubscriptionSessionState`].
//!
//! ## Usage
//!
//! ```
//! use graphql_reflect::TopLevelObject;
//! use graphql_reflect::reflect::ClassDescriptor;
//! use graphql_reflect::reflect::ClassRegistry;
//! use graphql_reflect::reflect::FunctionDescriptor;
//! use graphql_reflect::reflect::TypeDescriptor;
//! use graphql_reflect_server::Configuration;
//! use graphql_reflect_server::SchemaSources;
//!
//! let configuration = Configuration::from_yaml("federation:\n  enabled: true\n").unwrap();
//! let mut registry = ClassRegistry::new();
//! registry.register(
//!     ClassDescriptor::object("shop::Query")
//!         .function(FunctionDescriptor::new("greeting", TypeDescriptor::string())),
//! );
//!
//! let generated = graphql_reflect_server::build_schema(
//!     &configuration,
//!     SchemaSources::new(registry).with_query(TopLevelObject::new("shop::Query")),
//! )
//! .unwrap();
//! assert!(generated.sdl().contains("_service: _Service!"));
//! ```

#![warn(
    rustdoc::broken_intra_doc_links,
    unreachable_pub,
    unreachable_patterns,
    unused,
    unused_qualifications,
    dead_code,
    while_true,
    unconditional_panic,
    clippy::all
)]

pub mod configuration;
pub mod execution;
mod schema;
pub mod subscriptions;

pub use crate::configuration::Configuration;
pub use crate::configuration::ConfigurationError;
pub use crate::execution::ExecutionEngine;
pub use crate::execution::GraphQLRequestHandler;
pub use crate::execution::SubscriptionHandler;
pub use crate::schema::SchemaSources;
pub use crate::schema::build_schema;
pub use crate::subscriptions::SubscriptionProtocolHandler;
pub use crate::subscriptions::SubscriptionSession;
pub use crate::subscriptions::SubscriptionSessionState;
