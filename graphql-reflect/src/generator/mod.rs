//! Schema generation from registered classes.

mod cache;
mod directives;
mod fields;
mod roots;
mod types;

use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::Schema;
use apollo_compiler::schema::ComponentName;
use apollo_compiler::schema::DirectiveDefinition;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::ObjectType;
use apollo_compiler::validation::Valid;
use indexmap::IndexMap;

use self::cache::TypesCache;
use crate::config::SchemaGeneratorConfig;
use crate::config::TopLevelObject;
use crate::error::SchemaGenerationError;
use crate::execution::CodeRegistry;
use crate::print::PrintOptions;
use crate::print::print_schema;
use crate::reflect::ClassRegistry;
use crate::reflect::TypeDescriptor;

/// A validated schema along with the data fetchers of its fields.
#[derive(Debug)]
pub struct GeneratedSchema {
    pub schema: Valid<Schema>,
    pub code_registry: Arc<CodeRegistry>,
}

impl GeneratedSchema {
    /// Prints the schema in SDL with the given options.
    pub fn print(&self, options: &PrintOptions) -> String {
        print_schema(&self.schema, options)
    }

    /// Prints the schema in SDL with the default options.
    pub fn sdl(&self) -> String {
        self.print(&PrintOptions::default())
    }
}

/// Generates a schema from the functions of the given root objects.
pub fn to_schema(
    config: SchemaGeneratorConfig,
    registry: impl Into<Arc<ClassRegistry>>,
    queries: &[TopLevelObject],
    mutations: &[TopLevelObject],
    subscriptions: &[TopLevelObject],
) -> Result<GeneratedSchema, SchemaGenerationError> {
    SchemaGenerator::new(config, registry).generate_schema(queries, mutations, subscriptions, &[])
}

/// State of one schema generation run.
///
/// Generation is single threaded and runs once: [`SchemaGenerator::generate_schema`]
/// consumes the generator.
pub struct SchemaGenerator {
    config: SchemaGeneratorConfig,
    registry: Arc<ClassRegistry>,
    cache: TypesCache,
    code_registry: CodeRegistry,
    directives: IndexMap<Name, Node<DirectiveDefinition>>,
    /// Extended scalars and types supplied by hooks.
    additional_types: IndexMap<Name, ExtendedType>,
}

impl SchemaGenerator {
    pub fn new(config: SchemaGeneratorConfig, registry: impl Into<Arc<ClassRegistry>>) -> Self {
        SchemaGenerator {
            config,
            registry: registry.into(),
            cache: TypesCache::default(),
            code_registry: CodeRegistry::new(),
            directives: IndexMap::new(),
            additional_types: IndexMap::new(),
        }
    }

    /// Generates the root operation types, every type they reach and `additional_types`,
    /// then assembles and validates the schema.
    pub fn generate_schema(
        mut self,
        queries: &[TopLevelObject],
        mutations: &[TopLevelObject],
        subscriptions: &[TopLevelObject],
        additional_types: &[TypeDescriptor],
    ) -> Result<GeneratedSchema, SchemaGenerationError> {
        let query = self.generate_queries(queries)?;
        let mutation = self.generate_mutations(mutations)?;
        let subscription = self.generate_subscriptions(subscriptions)?;
        for descriptor in additional_types {
            self.generate_graphql_type(descriptor, false, false)?;
        }
        self.assemble(query, mutation, subscription)
    }

    fn assemble(
        self,
        query: ObjectType,
        mutation: Option<ObjectType>,
        subscription: Option<ObjectType>,
    ) -> Result<GeneratedSchema, SchemaGenerationError> {
        let SchemaGenerator {
            config,
            cache,
            mut code_registry,
            directives,
            additional_types,
            ..
        } = self;
        let hooks = config.hooks.clone();
        tracing::debug!(
            reflected = cache.len(),
            additional = additional_types.len(),
            "assembling generated schema"
        );

        let mut schema = Schema::new();
        schema.directive_definitions.extend(directives);
        schema.types.extend(additional_types);
        for (descriptor, definition) in cache.into_types()? {
            let definition = hooks.will_add_type_to_schema(&descriptor, definition);
            schema.types.insert(definition.name().clone(), definition);
        }

        let query_name = query.name.clone();
        schema.schema_definition.make_mut().query = Some(ComponentName::from(query.name.clone()));
        schema
            .types
            .insert(query.name.clone(), ExtendedType::Object(Node::new(query)));
        if let Some(mutation) = mutation {
            schema.schema_definition.make_mut().mutation =
                Some(ComponentName::from(mutation.name.clone()));
            schema
                .types
                .insert(mutation.name.clone(), ExtendedType::Object(Node::new(mutation)));
        }
        if let Some(subscription) = subscription {
            schema.schema_definition.make_mut().subscription =
                Some(ComponentName::from(subscription.name.clone()));
            schema.types.insert(
                subscription.name.clone(),
                ExtendedType::Object(Node::new(subscription)),
            );
        }

        hooks.will_build_schema(&mut schema, &mut code_registry)?;

        if let Some(ExtendedType::Object(query)) = schema.types.get(&query_name) {
            if query.fields.is_empty() {
                return Err(SchemaGenerationError::EmptyQueryType {
                    type_name: query_name,
                });
            }
        }

        let schema = schema.validate()?;
        Ok(GeneratedSchema {
            schema,
            code_registry: Arc::new(code_registry),
        })
    }
}
