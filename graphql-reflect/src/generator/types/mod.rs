//! Mapping of host types to GraphQL types.

mod enums;
mod input;
mod object;
mod scalar;

use apollo_compiler::Name;
use apollo_compiler::ast::Type;

use super::SchemaGenerator;
use super::cache::TypeCategory;
use super::cache::TypesCacheKey;
use crate::error::SchemaGenerationError;
use crate::reflect::BuiltinClass;
use crate::reflect::ClassDescriptor;
use crate::reflect::ClassRef;
use crate::reflect::TypeDescriptor;

const INPUT_SUFFIX: &str = "Input";

/// Wraps `ty` in a non-null type, unless it already is one.
pub(crate) fn non_null(ty: Type) -> Type {
    match ty {
        Type::Named(name) => Type::NonNullNamed(name),
        Type::List(inner) => Type::NonNullList(inner),
        non_null => non_null,
    }
}

/// The name of the type generated for `class`.
///
/// Input objects get the `Input` suffix unless their name already ends with it.
fn type_name(class: &ClassDescriptor, input: bool) -> Result<Name, SchemaGenerationError> {
    let name = class
        .annotations
        .name
        .as_deref()
        .unwrap_or(&class.simple_name);
    let name = if input && !name.to_ascii_lowercase().ends_with("input") {
        format!("{name}{INPUT_SUFFIX}")
    } else {
        name.to_string()
    };
    Name::new(&name).map_err(|_| SchemaGenerationError::invalid_name(&name))
}

impl SchemaGenerator {
    /// Generates the GraphQL type of `descriptor` in an output position, or an input position
    /// when `input` is set. `id` marks members annotated as IDs.
    pub(crate) fn generate_graphql_type(
        &mut self,
        descriptor: &TypeDescriptor,
        input: bool,
        id: bool,
    ) -> Result<Type, SchemaGenerationError> {
        let hooks = self.config.hooks.clone();
        let ty = if let Some(definition) = hooks.will_generate_type(descriptor) {
            let definition = hooks.did_generate_type(descriptor, definition);
            let name = definition.name().clone();
            check_category(&name, TypeCategory::of(&definition), input)?;
            self.additional_types
                .entry(name.clone())
                .or_insert(definition);
            Type::Named(name)
        } else if let Some(scalar) = self.scalar_type(descriptor, id)? {
            Type::Named(scalar)
        } else {
            self.object_from_reflection(descriptor, input, id)?
        };
        Ok(if descriptor.nullable { ty } else { non_null(ty) })
    }

    fn object_from_reflection(
        &mut self,
        descriptor: &TypeDescriptor,
        input: bool,
        id: bool,
    ) -> Result<Type, SchemaGenerationError> {
        match &descriptor.class {
            ClassRef::Builtin(BuiltinClass::List | BuiltinClass::Array) => {
                let element = descriptor.type_argument()?;
                let element = self.generate_graphql_type(element, input, id)?;
                return Ok(Type::List(Box::new(element)));
            }
            ClassRef::Builtin(builtin) => {
                return Err(SchemaGenerationError::TypeNotSupported {
                    type_name: descriptor.to_string(),
                    reason: format!("{builtin} cannot be the type of a field or argument"),
                });
            }
            ClassRef::Named(_) => {}
        }

        let class = self.registry.class_of(descriptor)?.clone();
        if !self.config.is_supported(&class.qualified_name) {
            return Err(SchemaGenerationError::TypeNotSupported {
                type_name: class.qualified_name.to_string(),
                reason: "the class is outside the supported packages".to_string(),
            });
        }
        let category = if class.is_enum() {
            TypeCategory::Enum
        } else if input {
            if class.is_interface() {
                return Err(SchemaGenerationError::CouldNotCastGraphQLType {
                    type_name: class.simple_name.clone(),
                    expected: "GraphQLInputType",
                });
            }
            TypeCategory::InputObject
        } else if class.is_union() {
            TypeCategory::Union
        } else if class.is_interface() {
            TypeCategory::Interface
        } else {
            TypeCategory::Object
        };

        let is_input_object = category == TypeCategory::InputObject;
        let key = TypesCacheKey::new(descriptor, is_input_object);
        if let Some(handle) = self.cache.get(&key) {
            return Ok(Type::Named(handle.name));
        }

        let name = type_name(&class, is_input_object)?;
        let declared = TypeDescriptor {
            nullable: false,
            ..descriptor.clone()
        };
        let handle = self.cache.claim(key, name.clone(), &declared)?;
        tracing::trace!(class = %class.qualified_name, %name, "generating type");

        let definition = match category {
            TypeCategory::Enum => self.generate_enum(&class, &name)?,
            TypeCategory::InputObject => self.generate_input_object(&class, &name)?,
            TypeCategory::Union => self.generate_union(&class, &name)?,
            TypeCategory::Interface => self.generate_interface(&class, &name)?,
            TypeCategory::Object | TypeCategory::Scalar => self.generate_object(&class, &name)?,
        };
        let hooks = self.config.hooks.clone();
        let definition = hooks.did_generate_type(&declared, definition);
        let definition = hooks.on_rewire_type(definition, &mut self.code_registry);
        self.cache.complete(&handle, definition);

        if category == TypeCategory::Interface {
            self.generate_implementations(&class)?;
        }
        Ok(Type::Named(name))
    }
}

fn check_category(
    name: &Name,
    category: TypeCategory,
    input: bool,
) -> Result<(), SchemaGenerationError> {
    if input && !category.is_input() {
        return Err(SchemaGenerationError::CouldNotCastGraphQLType {
            type_name: name.to_string(),
            expected: "GraphQLInputType",
        });
    }
    if !input && !category.is_output() {
        return Err(SchemaGenerationError::CouldNotCastGraphQLType {
            type_name: name.to_string(),
            expected: "GraphQLOutputType",
        });
    }
    Ok(())
}
