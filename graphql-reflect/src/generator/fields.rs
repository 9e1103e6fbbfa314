//! Binding of host properties and functions to GraphQL fields.

use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast::DirectiveLocation;
use apollo_compiler::ast::InputValueDefinition;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::schema::Component;
use apollo_compiler::schema::FieldDefinition;
use serde_json_bytes::Value;

use super::SchemaGenerator;
use crate::error::SchemaGenerationError;
use crate::execution::FieldCoordinate;
use crate::execution::FunctionDataFetcher;
use crate::execution::ParameterBinding;
use crate::execution::PropertyDataFetcher;
use crate::reflect::Annotations;
use crate::reflect::BuiltinClass;
use crate::reflect::ClassRef;
use crate::reflect::FunctionDescriptor;
use crate::reflect::PropertyDescriptor;
use crate::reflect::TypeDescriptor;
use crate::reflect::filters;

/// The GraphQL name of a member: its rename annotation or its host name.
pub(super) fn graphql_name(
    annotations: &Annotations,
    host_name: &str,
) -> Result<Name, SchemaGenerationError> {
    let name = annotations.name.as_deref().unwrap_or(host_name);
    Name::new(name).map_err(|_| SchemaGenerationError::invalid_name(name))
}

pub(super) fn description(annotations: &Annotations) -> Option<Node<str>> {
    annotations.description.as_deref().map(Into::into)
}

/// Adds `field` to `fields`, rejecting two members mapped to the same field name.
pub(super) fn insert_field(
    fields: &mut IndexMap<Name, Component<FieldDefinition>>,
    type_name: &Name,
    field: FieldDefinition,
) -> Result<(), SchemaGenerationError> {
    if fields.contains_key(&field.name) {
        return Err(SchemaGenerationError::DuplicateField {
            type_name: type_name.clone(),
            field_name: field.name,
        });
    }
    fields.insert(field.name.clone(), Component::new(field));
    Ok(())
}

/// The type a field resolves to once the wrappers of a function's return type are removed.
///
/// `Future<T>`, `Publisher<T>` and `FetchResult<T>` resolve to `T`, and so does
/// `Future<FetchResult<T>>`.
fn unwrap_return_type(
    descriptor: &TypeDescriptor,
) -> Result<TypeDescriptor, SchemaGenerationError> {
    match &descriptor.class {
        ClassRef::Builtin(builtin) if builtin.is_wrapper() => {
            let inner = descriptor.type_argument()?;
            match (builtin, &inner.class) {
                (BuiltinClass::Future, ClassRef::Builtin(BuiltinClass::FetchResult)) => {
                    Ok(inner.type_argument()?.clone())
                }
                _ => Ok(inner.clone()),
            }
        }
        _ => Ok(descriptor.clone()),
    }
}

impl SchemaGenerator {
    /// Builds the field of `function` on the type `parent`.
    ///
    /// Unless the field is abstract its data fetcher invokes the function, on `target` when
    /// given and on the resolution source otherwise.
    pub(super) fn function_field(
        &mut self,
        function: &FunctionDescriptor,
        parent: &Name,
        target: Option<Value>,
        is_abstract: bool,
    ) -> Result<FieldDefinition, SchemaGenerationError> {
        let hooks = self.config.hooks.clone();
        let name = graphql_name(&function.annotations, &function.name)?;

        let mut arguments = Vec::new();
        let mut bindings = Vec::with_capacity(function.parameters.len());
        for parameter in &function.parameters {
            let binding = if parameter.is_context() {
                ParameterBinding::Context
            } else if parameter.is_environment() {
                ParameterBinding::Environment
            } else if !filters::is_argument(parameter) {
                ParameterBinding::Ignored
            } else {
                let argument_name = graphql_name(&parameter.annotations, &parameter.name)?;
                let ty = self.generate_graphql_type(&parameter.ty, true, parameter.annotations.id)?;
                arguments.push(Node::new(InputValueDefinition {
                    description: description(&parameter.annotations),
                    name: argument_name.clone(),
                    ty: Node::new(ty),
                    default_value: None,
                    directives: self.member_directives(
                        &parameter.annotations,
                        DirectiveLocation::ArgumentDefinition,
                    ),
                }));
                ParameterBinding::Argument {
                    name: argument_name,
                    ty: parameter.ty.clone(),
                    id: parameter.annotations.id,
                }
            };
            bindings.push((parameter.name.clone(), binding));
        }

        let return_type = unwrap_return_type(&hooks.will_resolve_wrapper_type(&function.return_type))?;
        let ty = self.generate_graphql_type(&return_type, false, function.annotations.id)?;
        let field = FieldDefinition {
            description: description(&function.annotations),
            name: name.clone(),
            arguments,
            ty,
            directives: self
                .member_directives(&function.annotations, DirectiveLocation::FieldDefinition),
        };

        let coordinate = FieldCoordinate::new(parent.clone(), name);
        if !is_abstract && !function.is_abstract {
            match &function.invoker {
                Some(invoker) => {
                    self.code_registry.register(
                        coordinate.clone(),
                        Arc::new(FunctionDataFetcher::new(
                            target,
                            bindings,
                            invoker.clone(),
                            self.registry.clone(),
                        )),
                    );
                }
                None => tracing::warn!(
                    function = %function.name,
                    %coordinate,
                    "function has no invoker, its field resolves to nothing"
                ),
            }
        }
        Ok(hooks.on_rewire_field(&coordinate, field, &mut self.code_registry))
    }

    /// Builds the field of `property` on the type `parent`.
    pub(super) fn property_field(
        &mut self,
        property: &PropertyDescriptor,
        parent: &Name,
        is_abstract: bool,
    ) -> Result<FieldDefinition, SchemaGenerationError> {
        let hooks = self.config.hooks.clone();
        let name = graphql_name(&property.annotations, &property.name)?;
        let ty = self.generate_graphql_type(&property.ty, false, property.annotations.id)?;
        let field = FieldDefinition {
            description: description(&property.annotations),
            name: name.clone(),
            arguments: Vec::new(),
            ty,
            directives: self
                .member_directives(&property.annotations, DirectiveLocation::FieldDefinition),
        };

        let coordinate = FieldCoordinate::new(parent.clone(), name);
        if !is_abstract {
            let fetcher = match &property.accessor {
                Some(accessor) => PropertyDataFetcher::with_accessor(&property.name, accessor.clone()),
                None => PropertyDataFetcher::new(&property.name),
            };
            self.code_registry
                .register(coordinate.clone(), Arc::new(fetcher));
        }
        Ok(hooks.on_rewire_field(&coordinate, field, &mut self.code_registry))
    }

    /// Builds the input field of `property`.
    pub(super) fn input_field(
        &mut self,
        property: &PropertyDescriptor,
    ) -> Result<InputValueDefinition, SchemaGenerationError> {
        let name = graphql_name(&property.annotations, &property.name)?;
        let ty = self.generate_graphql_type(&property.ty, true, property.annotations.id)?;
        Ok(InputValueDefinition {
            description: description(&property.annotations),
            name,
            ty: Node::new(ty),
            default_value: None,
            directives: self
                .member_directives(&property.annotations, DirectiveLocation::InputFieldDefinition),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(TypeDescriptor::future_of(TypeDescriptor::string()), TypeDescriptor::string())]
    #[case(TypeDescriptor::publisher_of(TypeDescriptor::int()), TypeDescriptor::int())]
    #[case(
        TypeDescriptor::fetch_result_of(TypeDescriptor::of("Widget").nullable()),
        TypeDescriptor::of("Widget").nullable()
    )]
    #[case(
        TypeDescriptor::future_of(TypeDescriptor::fetch_result_of(TypeDescriptor::boolean())),
        TypeDescriptor::boolean()
    )]
    #[case(
        TypeDescriptor::publisher_of(TypeDescriptor::publisher_of(TypeDescriptor::int())),
        TypeDescriptor::publisher_of(TypeDescriptor::int())
    )]
    #[case(
        TypeDescriptor::fetch_result_of(TypeDescriptor::future_of(TypeDescriptor::int())),
        TypeDescriptor::future_of(TypeDescriptor::int())
    )]
    #[case(
        TypeDescriptor::list_of(TypeDescriptor::string()),
        TypeDescriptor::list_of(TypeDescriptor::string())
    )]
    fn wrappers_are_removed(#[case] declared: TypeDescriptor, #[case] expected: TypeDescriptor) {
        assert_eq!(unwrap_return_type(&declared).unwrap(), expected);
    }

    #[test]
    fn wrapper_without_argument_is_rejected() {
        let error = unwrap_return_type(&TypeDescriptor::builtin(
            crate::reflect::BuiltinClass::Future,
        ))
        .unwrap_err();
        assert_eq!(
            error.to_string(),
            "type Future is not supported: missing generic type argument"
        );
    }

    #[test]
    fn renamed_members_keep_valid_names() {
        assert_eq!(
            graphql_name(&Annotations::renamed("label"), "displayName")
                .unwrap()
                .as_str(),
            "label"
        );
        assert!(graphql_name(&Annotations::default(), "not a name").is_err());
    }
}
