//! The SDL published through `_service`.

use apollo_compiler::Schema;
use graphql_reflect::PrintOptions;
use graphql_reflect::print_schema;

use crate::directives::EXTENDS_DIRECTIVE_NAME;

/// Prints the schema of this service as the gateway expects it.
///
/// The schema definition and directive definitions are left out, and types carrying `@extends`
/// are rendered as type extensions.
pub fn service_sdl(schema: &Schema) -> String {
    let mut printed = schema.clone();
    printed.directive_definitions.clear();
    let options = PrintOptions {
        include_schema_definition: false,
        type_extension_directive: Some(EXTENDS_DIRECTIVE_NAME.to_string()),
        ..Default::default()
    };
    print_schema(&printed, &options)
}
