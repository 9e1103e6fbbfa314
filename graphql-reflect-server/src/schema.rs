//! Generation of the schema served by the server.

use std::sync::Arc;

use graphql_reflect::GeneratedSchema;
use graphql_reflect::SchemaGenerationError;
use graphql_reflect::SchemaGeneratorConfig;
use graphql_reflect::SchemaGeneratorHooks;
use graphql_reflect::TopLevelNames;
use graphql_reflect::TopLevelObject;
use graphql_reflect::reflect::ClassRegistry;
use graphql_reflect_federation::FederatedTypeRegistry;

use crate::configuration::Configuration;

/// What the schema is generated from.
#[derive(Clone)]
pub struct SchemaSources {
    registry: Arc<ClassRegistry>,
    hooks: Option<Arc<dyn SchemaGeneratorHooks>>,
    top_level_names: Option<TopLevelNames>,
    federated_types: FederatedTypeRegistry,
    queries: Vec<TopLevelObject>,
    mutations: Vec<TopLevelObject>,
    subscriptions: Vec<TopLevelObject>,
}

impl SchemaSources {
    pub fn new(registry: impl Into<Arc<ClassRegistry>>) -> Self {
        SchemaSources {
            registry: registry.into(),
            hooks: None,
            top_level_names: None,
            federated_types: FederatedTypeRegistry::default(),
            queries: Vec::new(),
            mutations: Vec::new(),
            subscriptions: Vec::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn SchemaGeneratorHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn with_top_level_names(mut self, top_level_names: TopLevelNames) -> Self {
        self.top_level_names = Some(top_level_names);
        self
    }

    /// Resolvers of the federated entities. Only used when federation is enabled.
    pub fn with_federated_types(mut self, federated_types: FederatedTypeRegistry) -> Self {
        self.federated_types = federated_types;
        self
    }

    pub fn with_query(mut self, query: TopLevelObject) -> Self {
        self.queries.push(query);
        self
    }

    pub fn with_mutation(mut self, mutation: TopLevelObject) -> Self {
        self.mutations.push(mutation);
        self
    }

    pub fn with_subscription(mut self, subscription: TopLevelObject) -> Self {
        self.subscriptions.push(subscription);
        self
    }
}

/// Generates the schema described by `sources`, federated when `configuration` enables it.
pub fn build_schema(
    configuration: &Configuration,
    sources: SchemaSources,
) -> Result<GeneratedSchema, SchemaGenerationError> {
    let mut config = SchemaGeneratorConfig::new(configuration.packages.iter().cloned());
    if let Some(hooks) = sources.hooks {
        config = config.with_hooks(hooks);
    }
    if let Some(top_level_names) = sources.top_level_names {
        config = config.with_top_level_names(top_level_names);
    }

    let generated = if configuration.federation.enabled {
        graphql_reflect_federation::to_federated_schema(
            config,
            sources.registry,
            sources.federated_types,
            &sources.queries,
            &sources.mutations,
            &sources.subscriptions,
        )?
    } else {
        graphql_reflect::to_schema(
            config,
            sources.registry,
            &sources.queries,
            &sources.mutations,
            &sources.subscriptions,
        )?
    };
    tracing::info!(federated = configuration.federation.enabled, "\n{}", generated.sdl());
    Ok(generated)
}
