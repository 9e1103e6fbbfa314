use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast::DirectiveLocation;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::schema::Component;
use apollo_compiler::schema::EnumType;
use apollo_compiler::schema::EnumValueDefinition;
use apollo_compiler::schema::ExtendedType;

use crate::error::SchemaGenerationError;
use crate::generator::SchemaGenerator;
use crate::generator::fields::description;
use crate::generator::fields::graphql_name;
use crate::reflect::ClassDescriptor;
use crate::reflect::ClassKind;

impl SchemaGenerator {
    /// Generates an enum with one value per non ignored constant, in declaration order.
    pub(super) fn generate_enum(
        &mut self,
        class: &ClassDescriptor,
        name: &Name,
    ) -> Result<ExtendedType, SchemaGenerationError> {
        let ClassKind::Enum(constants) = &class.kind else {
            return Err(SchemaGenerationError::CouldNotCastGraphQLType {
                type_name: class.simple_name.clone(),
                expected: "GraphQLEnumType",
            });
        };

        let mut values = IndexMap::default();
        for constant in constants.iter().filter(|constant| !constant.annotations.ignored) {
            let value = graphql_name(&constant.annotations, &constant.name)?;
            let definition = EnumValueDefinition {
                description: description(&constant.annotations),
                value: value.clone(),
                directives: self.member_directives(&constant.annotations, DirectiveLocation::EnumValue),
            };
            if values
                .insert(value.clone(), Component::new(definition))
                .is_some()
            {
                return Err(SchemaGenerationError::DuplicateField {
                    type_name: name.clone(),
                    field_name: value,
                });
            }
        }

        Ok(ExtendedType::Enum(Node::new(EnumType {
            description: description(&class.annotations),
            name: name.clone(),
            directives: self.type_directives(&class.annotations, DirectiveLocation::Enum),
            values,
        })))
    }
}
