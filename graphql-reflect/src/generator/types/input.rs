use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast::DirectiveLocation;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::schema::Component;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::InputObjectType;

use crate::error::SchemaGenerationError;
use crate::generator::SchemaGenerator;
use crate::generator::fields::description;
use crate::reflect::ClassDescriptor;
use crate::reflect::filters;

impl SchemaGenerator {
    /// Generates an input object from the valid properties of `class`. Functions are ignored.
    pub(super) fn generate_input_object(
        &mut self,
        class: &ClassDescriptor,
        name: &Name,
    ) -> Result<ExtendedType, SchemaGenerationError> {
        let hooks = self.config.hooks.clone();
        let mut fields = IndexMap::default();
        for property in filters::valid_properties(class, &*hooks) {
            let field = self.input_field(property)?;
            if fields.contains_key(&field.name) {
                return Err(SchemaGenerationError::DuplicateField {
                    type_name: name.clone(),
                    field_name: field.name,
                });
            }
            fields.insert(field.name.clone(), Component::new(field));
        }

        Ok(ExtendedType::InputObject(Node::new(InputObjectType {
            description: description(&class.annotations),
            name: name.clone(),
            directives: self.type_directives(&class.annotations, DirectiveLocation::InputObject),
            fields,
        })))
    }
}
