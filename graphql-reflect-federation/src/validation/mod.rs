//! Validation of the federation directives applied to a generated schema.

mod field_set;

use apollo_compiler::Name;
use apollo_compiler::Schema;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::schema::Component;
use apollo_compiler::schema::DirectiveList;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::FieldDefinition;
use itertools::Itertools;

pub(crate) use self::field_set::tokenize;
use self::field_set::FieldSetValidator;
use crate::directives::EXTENDS_DIRECTIVE_NAME;
use crate::directives::EXTERNAL_DIRECTIVE_NAME;
use crate::directives::KEY_DIRECTIVE_NAME;
use crate::directives::PROVIDES_DIRECTIVE_NAME;
use crate::directives::REQUIRES_DIRECTIVE_NAME;
use crate::directives::field_set;
use crate::error::FederationError;
use crate::error::ValidationErrors;

type Fields = IndexMap<Name, Component<FieldDefinition>>;

/// Validates every object and interface type carrying `@key` or `@extends`.
///
/// All problems are collected before failing, so one run reports every invalid directive.
pub fn validate_federated_schema(schema: &Schema) -> Result<(), FederationError> {
    let mut errors = Vec::new();
    for definition in schema.types.values() {
        let (name, directives, fields) = match definition {
            ExtendedType::Object(object) => (&object.name, &object.directives, &object.fields),
            ExtendedType::Interface(interface) => {
                (&interface.name, &interface.directives, &interface.fields)
            }
            _ => continue,
        };
        if directives.has(&KEY_DIRECTIVE_NAME) || directives.has(&EXTENDS_DIRECTIVE_NAME) {
            tracing::trace!(type_name = %name, "validating federated type");
            validate_type(schema, name, directives, fields, &mut errors);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(FederationError::InvalidFederatedSchema(ValidationErrors(errors)))
    }
}

fn validate_type(
    schema: &Schema,
    type_name: &Name,
    directives: &DirectiveList,
    fields: &Fields,
    errors: &mut Vec<String>,
) {
    let extended_type = directives.has(&EXTENDS_DIRECTIVE_NAME);

    let keys = directives.get_all(&KEY_DIRECTIVE_NAME).collect::<Vec<_>>();
    if keys.is_empty() {
        errors.push(format!(
            "@key directive is missing on federated {type_name} type"
        ));
    }
    for key in keys {
        let fields_value = field_set(key);
        let label = format!("@key(fields: \"{fields_value}\") directive on {type_name}");
        validate_field_set(schema, &label, fields_value, fields, extended_type, errors);
    }

    for field in fields.values() {
        let coordinate = format!("{type_name}.{}", field.name);
        if extended_type {
            for requires in field.directives.get_all(&REQUIRES_DIRECTIVE_NAME) {
                let fields_value = field_set(requires);
                let label = format!("@requires(fields: \"{fields_value}\") directive on {coordinate}");
                validate_field_set(schema, &label, fields_value, fields, true, errors);
            }
        }
        for provides in field.directives.get_all(&PROVIDES_DIRECTIVE_NAME) {
            validate_provides(schema, &coordinate, field, field_set(provides), errors);
        }
    }

    if !extended_type {
        let fields_with = |directive: &Name| {
            fields
                .values()
                .filter(|field| field.directives.has(directive))
                .map(|field| field.name.as_str())
                .join(", ")
        };
        for directive in [EXTERNAL_DIRECTIVE_NAME, REQUIRES_DIRECTIVE_NAME] {
            let marked = fields_with(&directive);
            if !marked.is_empty() {
                errors.push(format!(
                    "base {type_name} type has fields marked with @{directive} directive, fields=[{marked}]"
                ));
            }
        }
    }
}

fn validate_field_set(
    schema: &Schema,
    label: &str,
    fields_value: &str,
    fields: &Fields,
    extended_type: bool,
    errors: &mut Vec<String>,
) {
    let tokens = tokenize(fields_value);
    if tokens.is_empty() {
        errors.push(format!("{label} is missing field information"));
        return;
    }
    FieldSetValidator {
        schema,
        label,
        extended_type,
    }
    .validate(tokens, fields, errors);
}

/// `@provides` must be placed on a field returning an extended object type, and select its
/// external fields.
fn validate_provides(
    schema: &Schema,
    coordinate: &str,
    field: &FieldDefinition,
    fields_value: &str,
    errors: &mut Vec<String>,
) {
    let returned = match schema.types.get(field.ty.inner_named_type()) {
        Some(ExtendedType::Object(object)) if !field.ty.is_list() => object,
        _ => {
            errors.push(format!(
                "@provides directive is specified on a {coordinate} field but it does not return an object type"
            ));
            return;
        }
    };
    if !returned.directives.has(&EXTENDS_DIRECTIVE_NAME) {
        errors.push(format!(
            "@provides directive is specified on a {coordinate} field references local object"
        ));
        return;
    }
    let label = format!("@provides(fields: \"{fields_value}\") directive on {coordinate}");
    validate_field_set(schema, &label, fields_value, &returned.fields, true, errors);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const DIRECTIVES: &str = r#"
        scalar _FieldSet
        directive @key(fields: _FieldSet!) repeatable on OBJECT | INTERFACE
        directive @extends on OBJECT | INTERFACE
        directive @external on FIELD_DEFINITION
        directive @requires(fields: _FieldSet!) on FIELD_DEFINITION
        directive @provides(fields: _FieldSet!) on FIELD_DEFINITION
    "#;

    fn errors(sdl: &str) -> Vec<String> {
        let schema = Schema::parse_and_validate(format!("{DIRECTIVES}{sdl}"), "schema.graphql")
            .unwrap()
            .into_inner();
        match validate_federated_schema(&schema) {
            Ok(()) => Vec::new(),
            Err(FederationError::InvalidFederatedSchema(errors)) => errors.0,
            Err(error) => panic!("unexpected error: {error}"),
        }
    }

    #[test]
    fn accepts_valid_entities() {
        let sdl = r#"
            type Product @key(fields: "id type") @key(fields: "sku") {
              id: String!
              type: String!
              sku: String!
              reviews: [Review!]!
              topReview: Review! @provides(fields: "body")
            }
            type Review @extends @key(fields: "id") {
              id: ID! @external
              body: String! @external
              weight: Float! @external
              shippingCost: String! @requires(fields: "weight")
            }
            type Query {
              product: Product
              review: Review
            }
        "#;
        assert!(errors(sdl).is_empty());
    }

    #[test]
    fn provides_needs_an_object_type() {
        let sdl = r#"
            type Product @key(fields: "id") {
              id: String!
              reviews: [Review!]! @provides(fields: "body")
            }
            type Review @extends @key(fields: "id") {
              id: ID! @external
              body: String! @external
            }
            type Query {
              product: Product
            }
        "#;
        assert_eq!(
            errors(sdl),
            vec![
                "@provides directive is specified on a Product.reviews field but it does not return an object type"
                    .to_string()
            ]
        );
    }

    #[test]
    fn types_without_federation_directives_are_ignored() {
        let sdl = r#"
            type Plain {
              id: ID! @external
            }
            type Query {
              plain: Plain
            }
        "#;
        assert!(errors(sdl).is_empty());
    }

    #[test]
    fn extended_types_need_a_key() {
        let sdl = r#"
            type Review @extends {
              id: ID! @external
            }
            type Query {
              review: Review
            }
        "#;
        assert_eq!(
            errors(sdl),
            vec!["@key directive is missing on federated Review type".to_string()]
        );
    }

    #[test]
    fn base_types_cannot_use_external_or_requires() {
        let sdl = r#"
            type Product @key(fields: "id") {
              id: ID!
              weight: Float @external
              cost: String @requires(fields: "weight")
            }
            type Query {
              product: Product
            }
        "#;
        assert_eq!(
            errors(sdl),
            vec![
                "base Product type has fields marked with @external directive, fields=[weight]"
                    .to_string(),
                "base Product type has fields marked with @requires directive, fields=[cost]"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn empty_keys_are_reported() {
        let sdl = r#"
            type Product @key(fields: " ") {
              id: ID!
            }
            type Query {
              product: Product
            }
        "#;
        assert_eq!(
            errors(sdl),
            vec![r#"@key(fields: " ") directive on Product is missing field information"#.to_string()]
        );
    }

    #[test]
    fn provides_must_reference_external_fields_of_extended_objects() {
        let sdl = r#"
            type Shipment @key(fields: "id") {
              id: ID!
              local: Local! @provides(fields: "text")
              provided: Provided! @provides(fields: "text")
            }
            type Local @key(fields: "id") {
              id: ID!
              text: String!
            }
            type Provided @extends @key(fields: "id") {
              id: ID! @external
              text: String!
            }
            type Query {
              shipment: Shipment
            }
        "#;
        assert_eq!(
            errors(sdl),
            vec![
                "@provides directive is specified on a Shipment.local field references local object"
                    .to_string(),
                r#"@provides(fields: "text") directive on Shipment.provided specifies invalid field set - extended type incorrectly references local field=text"#
                    .to_string(),
            ]
        );
    }
}
