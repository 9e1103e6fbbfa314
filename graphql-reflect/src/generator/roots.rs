//! Root operation types built from top level objects.

use apollo_compiler::Name;
use apollo_compiler::ast::DirectiveLocation;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::schema::ObjectType;
use strum_macros::Display;

use super::SchemaGenerator;
use super::fields::insert_field;
use crate::config::TopLevelObject;
use crate::error::SchemaGenerationError;
use crate::reflect::BuiltinClass;
use crate::reflect::ClassDescriptor;
use crate::reflect::filters;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
enum RootOperation {
    Query,
    Mutation,
    Subscription,
}

impl RootOperation {
    fn invalid(self, class: &ClassDescriptor, reason: &str) -> SchemaGenerationError {
        let class_name = class.qualified_name.to_string();
        match self {
            RootOperation::Query => SchemaGenerationError::InvalidQueryType { class_name },
            RootOperation::Mutation => SchemaGenerationError::InvalidMutationType { class_name },
            RootOperation::Subscription => SchemaGenerationError::InvalidSubscriptionType {
                class_name,
                reason: reason.to_string(),
            },
        }
    }
}

impl SchemaGenerator {
    /// The query type. It is generated even without objects so that an empty query type is
    /// reported when the schema is assembled.
    pub(super) fn generate_queries(
        &mut self,
        queries: &[TopLevelObject],
    ) -> Result<ObjectType, SchemaGenerationError> {
        let name = self.config.top_level_names.query.clone();
        self.generate_root(RootOperation::Query, name, queries)
    }

    pub(super) fn generate_mutations(
        &mut self,
        mutations: &[TopLevelObject],
    ) -> Result<Option<ObjectType>, SchemaGenerationError> {
        if mutations.is_empty() {
            return Ok(None);
        }
        let name = self.config.top_level_names.mutation.clone();
        self.generate_root(RootOperation::Mutation, name, mutations)
            .map(Some)
    }

    /// Every function of a subscription object must return a `Publisher`.
    pub(super) fn generate_subscriptions(
        &mut self,
        subscriptions: &[TopLevelObject],
    ) -> Result<Option<ObjectType>, SchemaGenerationError> {
        if subscriptions.is_empty() {
            return Ok(None);
        }
        let name = self.config.top_level_names.subscription.clone();
        self.generate_root(RootOperation::Subscription, name, subscriptions)
            .map(Some)
    }

    fn generate_root(
        &mut self,
        operation: RootOperation,
        name: Name,
        objects: &[TopLevelObject],
    ) -> Result<ObjectType, SchemaGenerationError> {
        let hooks = self.config.hooks.clone();
        let mut root = ObjectType {
            description: None,
            name: name.clone(),
            implements_interfaces: Default::default(),
            directives: Default::default(),
            fields: IndexMap::default(),
        };

        for object in objects {
            let class = self
                .registry
                .get(&object.class)
                .cloned()
                .ok_or_else(|| SchemaGenerationError::UnknownClass {
                    class_name: object.class.clone(),
                })?;
            if !class.is_public() {
                return Err(operation.invalid(&class, "the class is not public"));
            }
            let directives = self.type_directives(&class.annotations, DirectiveLocation::Object);
            root.directives.0.extend(directives.0);

            for function in filters::valid_functions(&class, &*hooks) {
                if operation == RootOperation::Subscription
                    && !function.return_type.is_builtin(BuiltinClass::Publisher)
                {
                    return Err(operation.invalid(
                        &class,
                        &format!("function {} does not return a Publisher", function.name),
                    ));
                }
                let field = self.function_field(function, &name, object.instance.clone(), false)?;
                let field = match operation {
                    RootOperation::Query => hooks.did_generate_query_field(function, field),
                    RootOperation::Mutation => hooks.did_generate_mutation_field(function, field),
                    RootOperation::Subscription => {
                        hooks.did_generate_subscription_field(function, field)
                    }
                };
                insert_field(&mut root.fields, &name, field)?;
            }
            tracing::debug!(%operation, class = %class.qualified_name, "generated root fields");
        }
        Ok(root)
    }
}
