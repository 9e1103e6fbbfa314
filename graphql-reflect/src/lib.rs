//! Generates GraphQL schemas from described host classes.
//!
//! Classes, their properties and their functions are described with the types of the
//! [`reflect`] module and registered in a [`ClassRegistry`](reflect::ClassRegistry). Given the
//! root objects of the query, mutation and subscription operations, the [`SchemaGenerator`]
//! derives every type they reach and binds a [`DataFetcher`](execution::DataFetcher) to every
//! field. Executing operations against the generated schema is left to an execution engine.
//!
//! ## Usage
//!
//! ```
//! use graphql_reflect::TopLevelObject;
//! use graphql_reflect::reflect::Annotations;
//! use graphql_reflect::reflect::ClassDescriptor;
//! use graphql_reflect::reflect::ClassRegistry;
//! use graphql_reflect::reflect::FunctionDescriptor;
//! use graphql_reflect::reflect::ParameterDescriptor;
//! use graphql_reflect::reflect::TypeDescriptor;
//!
//! let mut registry = ClassRegistry::new();
//! registry.register(
//!     ClassDescriptor::object("greetings::Query")
//!         .function(
//!             FunctionDescriptor::new("greet", TypeDescriptor::string())
//!                 .parameter(ParameterDescriptor::new("name", TypeDescriptor::string())),
//!         )
//!         .function(
//!             FunctionDescriptor::new("secret", TypeDescriptor::string())
//!                 .with_annotations(Annotations::ignored()),
//!         ),
//! );
//!
//! let generated = graphql_reflect::to_schema(
//!     Default::default(),
//!     registry,
//!     &[TopLevelObject::new("greetings::Query")],
//!     &[],
//!     &[],
//! )
//! .unwrap();
//! assert!(generated.sdl().contains("greet(name: String!): String!"));
//! assert!(!generated.sdl().contains("secret"));
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

pub mod config;
pub mod context;
pub mod error;
pub mod execution;
pub mod generator;
pub mod graphql;
pub mod hooks;
pub mod print;
pub mod reflect;

pub use crate::config::SchemaGeneratorConfig;
pub use crate::config::TopLevelNames;
pub use crate::config::TopLevelObject;
pub use crate::context::Context;
pub use crate::error::BoxError;
pub use crate::error::FetchError;
pub use crate::error::SchemaGenerationError;
pub use crate::generator::GeneratedSchema;
pub use crate::generator::SchemaGenerator;
pub use crate::generator::to_schema;
pub use crate::hooks::NoopSchemaGeneratorHooks;
pub use crate::hooks::SchemaGeneratorHooks;
pub use crate::print::PrintOptions;
pub use crate::print::print_schema;
