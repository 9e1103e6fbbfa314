//! Schema generator hooks turning a generated schema into a federated one.

use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::Schema;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::collections::IndexSet;
use apollo_compiler::name;
use apollo_compiler::schema::Component;
use apollo_compiler::schema::ComponentName;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::FieldDefinition;
use apollo_compiler::schema::InputValueDefinition;
use apollo_compiler::schema::ObjectType;
use apollo_compiler::schema::ScalarType;
use apollo_compiler::schema::UnionType;
use apollo_compiler::ty;
use graphql_reflect::NoopSchemaGeneratorHooks;
use graphql_reflect::SchemaGenerationError;
use graphql_reflect::SchemaGeneratorHooks;
use graphql_reflect::execution::CodeRegistry;
use graphql_reflect::execution::FieldCoordinate;
use graphql_reflect::execution::PropertyDataFetcher;
use graphql_reflect::reflect::ClassDescriptor;
use graphql_reflect::reflect::FunctionDescriptor;
use graphql_reflect::reflect::PropertyDescriptor;
use graphql_reflect::reflect::TypeDescriptor;

use crate::directives;
use crate::directives::KEY_DIRECTIVE_NAME;
use crate::error::FederationError;
use crate::execution::EntityResolver;
use crate::execution::FederatedTypeRegistry;
use crate::execution::ServiceSdl;
use crate::sdl::service_sdl;
use crate::validation::validate_federated_schema;

const ANY_SCALAR_NAME: Name = name!("_Any");
const FIELD_SET_SCALAR_NAME: Name = name!("_FieldSet");
const SERVICE_TYPE_NAME: Name = name!("_Service");
const ENTITY_UNION_NAME: Name = name!("_Entity");
const SERVICE_FIELD_NAME: Name = name!("_service");
const ENTITIES_FIELD_NAME: Name = name!("_entities");
const SDL_FIELD_NAME: Name = name!("sdl");
const REPRESENTATIONS_ARGUMENT_NAME: Name = name!("representations");

/// Hooks validating the federation directives of the generated schema and adding the fields a
/// federation gateway queries.
///
/// Every hook is delegated to the wrapped hooks. Once they have run, `will_build_schema` adds
/// `_service` and, when the schema defines entities, `_entities` to the query type.
pub struct FederatedSchemaGeneratorHooks {
    delegate: Arc<dyn SchemaGeneratorHooks>,
    registry: Arc<FederatedTypeRegistry>,
}

impl FederatedSchemaGeneratorHooks {
    pub fn new(registry: FederatedTypeRegistry) -> Self {
        Self::with_delegate(registry, Arc::new(NoopSchemaGeneratorHooks))
    }

    pub fn with_delegate(
        registry: FederatedTypeRegistry,
        delegate: Arc<dyn SchemaGeneratorHooks>,
    ) -> Self {
        FederatedSchemaGeneratorHooks {
            delegate,
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &FederatedTypeRegistry {
        &self.registry
    }

    fn federate(
        &self,
        schema: &mut Schema,
        code_registry: &mut CodeRegistry,
    ) -> Result<(), FederationError> {
        let query_name = schema
            .schema_definition
            .query
            .as_ref()
            .map(|query| query.name.clone())
            .ok_or(FederationError::MissingQueryType)?;

        validate_federated_schema(schema)?;

        // Computed before the federation types are added: the gateway does not expect them.
        let sdl = service_sdl(schema);
        add_directive_definitions(schema);
        insert_scalar(schema, FIELD_SET_SCALAR_NAME);

        let entities: IndexSet<ComponentName> = schema
            .types
            .values()
            .filter_map(|definition| match definition {
                ExtendedType::Object(object) if object.directives.has(&KEY_DIRECTIVE_NAME) => {
                    Some(ComponentName::from(object.name.clone()))
                }
                _ => None,
            })
            .collect();
        tracing::debug!(entities = entities.len(), "federating generated schema");

        let mut service = IndexMap::default();
        service.insert(SDL_FIELD_NAME, field(SDL_FIELD_NAME, ty!(String!), Vec::new()));
        schema.types.insert(
            SERVICE_TYPE_NAME,
            ExtendedType::Object(Node::new(ObjectType {
                description: None,
                name: SERVICE_TYPE_NAME,
                implements_interfaces: Default::default(),
                directives: Default::default(),
                fields: service,
            })),
        );
        code_registry.register(
            FieldCoordinate::new(SERVICE_TYPE_NAME, SDL_FIELD_NAME),
            Arc::new(PropertyDataFetcher::new(SDL_FIELD_NAME.as_str())),
        );

        let mut query_fields = vec![(
            SERVICE_FIELD_NAME,
            field(SERVICE_FIELD_NAME, ty!(_Service!), Vec::new()),
        )];
        code_registry.register(
            FieldCoordinate::new(query_name.clone(), SERVICE_FIELD_NAME),
            Arc::new(ServiceSdl { sdl }),
        );

        if !entities.is_empty() {
            insert_scalar(schema, ANY_SCALAR_NAME);
            schema.types.insert(
                ENTITY_UNION_NAME,
                ExtendedType::Union(Node::new(UnionType {
                    description: None,
                    name: ENTITY_UNION_NAME,
                    directives: Default::default(),
                    members: entities,
                })),
            );
            let representations = Node::new(InputValueDefinition {
                description: None,
                name: REPRESENTATIONS_ARGUMENT_NAME,
                ty: Node::new(ty!([_Any!]!)),
                default_value: None,
                directives: Default::default(),
            });
            query_fields.push((
                ENTITIES_FIELD_NAME,
                field(ENTITIES_FIELD_NAME, ty!([_Entity]!), vec![representations]),
            ));
            code_registry.register(
                FieldCoordinate::new(query_name.clone(), ENTITIES_FIELD_NAME),
                Arc::new(EntityResolver::new(self.registry.clone())),
            );
        }

        let Some(ExtendedType::Object(query)) = schema.types.get_mut(&query_name) else {
            return Err(FederationError::MissingQueryType);
        };
        query.make_mut().fields.extend(query_fields);
        Ok(())
    }
}

impl std::fmt::Debug for FederatedSchemaGeneratorHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FederatedSchemaGeneratorHooks")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

fn field(
    name: Name,
    ty: apollo_compiler::ast::Type,
    arguments: Vec<Node<InputValueDefinition>>,
) -> Component<FieldDefinition> {
    Component::new(FieldDefinition {
        description: None,
        name,
        arguments,
        ty,
        directives: Default::default(),
    })
}

fn insert_scalar(schema: &mut Schema, name: Name) {
    schema.types.entry(name.clone()).or_insert_with(|| {
        ExtendedType::Scalar(Node::new(ScalarType {
            description: None,
            name,
            directives: Default::default(),
        }))
    });
}

/// Defines every federation directive, including the ones no class applies.
fn add_directive_definitions(schema: &mut Schema) {
    for annotation in [
        directives::external(),
        directives::requires(""),
        directives::provides(""),
        directives::key(""),
        directives::extends(),
    ] {
        schema
            .directive_definitions
            .entry(annotation.name.clone())
            .or_insert_with(|| Node::new(annotation.definition()));
    }
}

impl SchemaGeneratorHooks for FederatedSchemaGeneratorHooks {
    fn will_build_schema(
        &self,
        schema: &mut Schema,
        code_registry: &mut CodeRegistry,
    ) -> Result<(), SchemaGenerationError> {
        self.delegate.will_build_schema(schema, code_registry)?;
        self.federate(schema, code_registry).map_err(Into::into)
    }

    fn will_generate_type(&self, descriptor: &TypeDescriptor) -> Option<ExtendedType> {
        self.delegate.will_generate_type(descriptor)
    }

    fn did_generate_type(&self, descriptor: &TypeDescriptor, generated: ExtendedType) -> ExtendedType {
        self.delegate.did_generate_type(descriptor, generated)
    }

    fn will_add_type_to_schema(
        &self,
        descriptor: &TypeDescriptor,
        generated: ExtendedType,
    ) -> ExtendedType {
        self.delegate.will_add_type_to_schema(descriptor, generated)
    }

    fn will_resolve_wrapper_type(&self, descriptor: &TypeDescriptor) -> TypeDescriptor {
        self.delegate.will_resolve_wrapper_type(descriptor)
    }

    fn is_valid_property(&self, class: &ClassDescriptor, property: &PropertyDescriptor) -> bool {
        self.delegate.is_valid_property(class, property)
    }

    fn is_valid_function(&self, class: &ClassDescriptor, function: &FunctionDescriptor) -> bool {
        self.delegate.is_valid_function(class, function)
    }

    fn on_rewire_type(&self, generated: ExtendedType, code_registry: &mut CodeRegistry) -> ExtendedType {
        self.delegate.on_rewire_type(generated, code_registry)
    }

    fn on_rewire_field(
        &self,
        coordinate: &FieldCoordinate,
        field: FieldDefinition,
        code_registry: &mut CodeRegistry,
    ) -> FieldDefinition {
        self.delegate.on_rewire_field(coordinate, field, code_registry)
    }

    fn did_generate_query_field(&self, function: &FunctionDescriptor, field: FieldDefinition) -> FieldDefinition {
        self.delegate.did_generate_query_field(function, field)
    }

    fn did_generate_mutation_field(
        &self,
        function: &FunctionDescriptor,
        field: FieldDefinition,
    ) -> FieldDefinition {
        self.delegate.did_generate_mutation_field(function, field)
    }

    fn did_generate_subscription_field(
        &self,
        function: &FunctionDescriptor,
        field: FieldDefinition,
    ) -> FieldDefinition {
        self.delegate.did_generate_subscription_field(function, field)
    }
}
