//! Federation directives, applied to described classes and members through annotations.
//!
//! ```graphql
//! directive @key(fields: _FieldSet!) repeatable on OBJECT | INTERFACE
//! directive @extends on OBJECT | INTERFACE
//! directive @external on FIELD_DEFINITION
//! directive @requires(fields: _FieldSet!) on FIELD_DEFINITION
//! directive @provides(fields: _FieldSet!) on FIELD_DEFINITION
//! ```

use apollo_compiler::Name;
use apollo_compiler::ast::Directive;
use apollo_compiler::ast::DirectiveLocation;
use apollo_compiler::ast::Value;
use apollo_compiler::name;
use apollo_compiler::ty;
use graphql_reflect::reflect::DirectiveAnnotation;

pub(crate) const KEY_DIRECTIVE_NAME: Name = name!("key");
pub(crate) const EXTENDS_DIRECTIVE_NAME: Name = name!("extends");
pub(crate) const EXTERNAL_DIRECTIVE_NAME: Name = name!("external");
pub(crate) const REQUIRES_DIRECTIVE_NAME: Name = name!("requires");
pub(crate) const PROVIDES_DIRECTIVE_NAME: Name = name!("provides");

pub(crate) const FIELDS_ARGUMENT_NAME: Name = name!("fields");

/// Marks an entity, identified by the given field set, that other services can extend.
///
/// ```graphql
/// type Product @key(fields: "upc") {
///   upc: String!
/// }
/// ```
pub fn key(fields: &str) -> DirectiveAnnotation {
    DirectiveAnnotation::new(
        KEY_DIRECTIVE_NAME,
        [DirectiveLocation::Object, DirectiveLocation::Interface],
    )
    .with_description("Space separated list of primary keys needed to access federated object")
    .argument(FIELDS_ARGUMENT_NAME, ty!(_FieldSet!), Value::String(fields.to_string()))
    .repeatable()
}

/// Marks a type owned by another service and extended by this one.
pub fn extends() -> DirectiveAnnotation {
    DirectiveAnnotation::new(
        EXTENDS_DIRECTIVE_NAME,
        [DirectiveLocation::Object, DirectiveLocation::Interface],
    )
    .with_description("Marks target object as extending part of the federated schema")
}

/// Marks a field of an extended type as resolved by the service owning the type.
pub fn external() -> DirectiveAnnotation {
    DirectiveAnnotation::new(EXTERNAL_DIRECTIVE_NAME, [DirectiveLocation::FieldDefinition])
        .with_description("Marks target field as external meaning it will be resolved by federated schema")
}

/// The external fields a field of an extended type needs to be resolved.
pub fn requires(fields: &str) -> DirectiveAnnotation {
    DirectiveAnnotation::new(REQUIRES_DIRECTIVE_NAME, [DirectiveLocation::FieldDefinition])
        .with_description("Specifies required input field set from the base type for a resolver")
        .argument(FIELDS_ARGUMENT_NAME, ty!(_FieldSet!), Value::String(fields.to_string()))
}

/// The external fields of the returned entity this service can resolve itself.
pub fn provides(fields: &str) -> DirectiveAnnotation {
    DirectiveAnnotation::new(PROVIDES_DIRECTIVE_NAME, [DirectiveLocation::FieldDefinition])
        .with_description("Specifies the base type field set that will be selectable by the gateway")
        .argument(FIELDS_ARGUMENT_NAME, ty!(_FieldSet!), Value::String(fields.to_string()))
}

/// The field set of a `@key`, `@requires` or `@provides` directive.
pub(crate) fn field_set(directive: &Directive) -> &str {
    directive
        .specified_argument_by_name(&FIELDS_ARGUMENT_NAME)
        .and_then(|value| value.as_str())
        .unwrap_or_default()
}
