use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::ast::Directive;
use apollo_compiler::ast::DirectiveLocation;
use apollo_compiler::schema;
use apollo_compiler::schema::Component;

use super::SchemaGenerator;
use crate::print::BUILT_IN_DIRECTIVES;
use crate::reflect::Annotations;

fn accepts_deprecation(location: DirectiveLocation) -> bool {
    matches!(
        location,
        DirectiveLocation::FieldDefinition
            | DirectiveLocation::ArgumentDefinition
            | DirectiveLocation::InputFieldDefinition
            | DirectiveLocation::EnumValue
    )
}

impl SchemaGenerator {
    /// Directives applied by `annotations` at `location`.
    ///
    /// The definitions of custom directives are recorded for the generated schema.
    fn directives(&mut self, annotations: &Annotations, location: DirectiveLocation) -> Vec<Directive> {
        let mut directives = Vec::new();
        if let Some(deprecation) = &annotations.deprecated {
            if accepts_deprecation(location) {
                directives.push(deprecation.to_directive());
            }
        }
        for annotation in &annotations.directives {
            if !annotation.locations.contains(&location) {
                tracing::warn!(
                    directive = %annotation.name,
                    location = ?location,
                    "directive applied to a location it does not declare"
                );
            }
            if !BUILT_IN_DIRECTIVES.contains(&annotation.name.as_str()) {
                self.directives
                    .entry(annotation.name.clone())
                    .or_insert_with(|| Node::new(annotation.definition()));
            }
            directives.push(annotation.to_directive());
        }
        directives
    }

    /// Directives of a named type.
    pub(super) fn type_directives(
        &mut self,
        annotations: &Annotations,
        location: DirectiveLocation,
    ) -> schema::DirectiveList {
        schema::DirectiveList(
            self.directives(annotations, location)
                .into_iter()
                .map(Component::new)
                .collect(),
        )
    }

    /// Directives of a field, argument, input field or enum value.
    pub(super) fn member_directives(
        &mut self,
        annotations: &Annotations,
        location: DirectiveLocation,
    ) -> ast::DirectiveList {
        ast::DirectiveList(
            self.directives(annotations, location)
                .into_iter()
                .map(Node::new)
                .collect(),
        )
    }
}
