//! Apollo Federation support for generated schemas.
//!
//! Classes become federated entities through the directives of the [`directives`] module.
//! Generating a schema with [`FederatedSchemaGeneratorHooks`] validates those directives and adds
//! the `_service` and `_entities` fields a federation gateway relies on. Representations sent to
//! `_entities` are resolved by the [`FederatedTypeResolver`]s of a [`FederatedTypeRegistry`].
//!
//! ## Usage
//!
//! ```
//! use graphql_reflect::SchemaGeneratorConfig;
//! use graphql_reflect::TopLevelObject;
//! use graphql_reflect::reflect::Annotations;
//! use graphql_reflect::reflect::ClassDescriptor;
//! use graphql_reflect::reflect::ClassRegistry;
//! use graphql_reflect::reflect::FunctionDescriptor;
//! use graphql_reflect::reflect::PropertyDescriptor;
//! use graphql_reflect::reflect::TypeDescriptor;
//! use graphql_reflect_federation::FederatedTypeRegistry;
//! use graphql_reflect_federation::directives;
//!
//! let mut registry = ClassRegistry::new();
//! registry
//!     .register(
//!         ClassDescriptor::object("products::Product")
//!             .with_annotations(Annotations::default().with_directive(directives::key("upc")))
//!             .property(PropertyDescriptor::new("upc", TypeDescriptor::string())),
//!     )
//!     .register(ClassDescriptor::object("products::Query").function(FunctionDescriptor::new(
//!         "topProduct",
//!         TypeDescriptor::of("products::Product"),
//!     )));
//!
//! let generated = graphql_reflect_federation::to_federated_schema(
//!     SchemaGeneratorConfig::default(),
//!     registry,
//!     FederatedTypeRegistry::default(),
//!     &[TopLevelObject::new("products::Query")],
//!     &[],
//!     &[],
//! )
//! .unwrap();
//! assert!(generated.sdl().contains("_entities(representations: [_Any!]!): [_Entity]!"));
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

pub mod directives;
mod error;
pub mod execution;
mod hooks;
mod sdl;
mod validation;

use std::sync::Arc;

use graphql_reflect::GeneratedSchema;
use graphql_reflect::SchemaGenerationError;
use graphql_reflect::SchemaGeneratorConfig;
use graphql_reflect::TopLevelObject;
use graphql_reflect::reflect::ClassRegistry;

pub use crate::error::FederationError;
pub use crate::error::ValidationErrors;
pub use crate::execution::EntityResolver;
pub use crate::execution::FederatedTypeRegistry;
pub use crate::execution::FederatedTypeResolver;
pub use crate::hooks::FederatedSchemaGeneratorHooks;
pub use crate::sdl::service_sdl;
pub use crate::validation::validate_federated_schema;

/// Generates a federated schema.
///
/// The hooks of `config` keep being called: they are wrapped by [`FederatedSchemaGeneratorHooks`].
pub fn to_federated_schema(
    config: SchemaGeneratorConfig,
    registry: impl Into<Arc<ClassRegistry>>,
    federated_registry: FederatedTypeRegistry,
    queries: &[TopLevelObject],
    mutations: &[TopLevelObject],
    subscriptions: &[TopLevelObject],
) -> Result<GeneratedSchema, SchemaGenerationError> {
    let hooks = FederatedSchemaGeneratorHooks::with_delegate(federated_registry, config.hooks.clone());
    graphql_reflect::to_schema(
        config.with_hooks(Arc::new(hooks)),
        registry,
        queries,
        mutations,
        subscriptions,
    )
}
