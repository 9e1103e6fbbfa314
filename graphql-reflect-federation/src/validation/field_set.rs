//! Validation of the field sets of `@key`, `@requires` and `@provides`.
//!
//! A field set is a whitespace separated list of field names, where `{ ... }` selects the
//! sub-fields of the preceding field.

use std::iter::Peekable;

use apollo_compiler::Name;
use apollo_compiler::Schema;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::schema::Component;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::FieldDefinition;

use crate::directives::EXTERNAL_DIRECTIVE_NAME;

const OPEN: &str = "{";
const CLOSE: &str = "}";

/// Splits a field set into names and braces.
pub(crate) fn tokenize(field_set: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (index, c) in field_set.char_indices() {
        let is_separator = c.is_whitespace() || c == ',' || c == '{' || c == '}';
        if is_separator {
            if let Some(from) = start.take() {
                tokens.push(&field_set[from..index]);
            }
            if c == '{' || c == '}' {
                tokens.push(&field_set[index..index + 1]);
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(from) = start {
        tokens.push(&field_set[from..]);
    }
    tokens
}

/// Walks a field set against the fields of one type.
///
/// `label` names the validated directive occurrence in the reported errors. When `extended_type`
/// is set, selected fields must be `@external`, otherwise they must not be.
pub(crate) struct FieldSetValidator<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) label: &'a str,
    pub(crate) extended_type: bool,
}

type Fields = IndexMap<Name, Component<FieldDefinition>>;

impl FieldSetValidator<'_> {
    pub(crate) fn validate<'t>(
        &self,
        tokens: impl IntoIterator<Item = &'t str>,
        fields: &Fields,
        errors: &mut Vec<String>,
    ) {
        let mut tokens = tokens.into_iter().peekable();
        self.validate_selection(&mut tokens, fields, errors);
    }

    fn error(&self, errors: &mut Vec<String>, problem: impl std::fmt::Display) {
        errors.push(format!(
            "{} specifies invalid field set - {problem}",
            self.label
        ));
    }

    fn validate_selection<'t, I>(
        &self,
        tokens: &mut Peekable<I>,
        fields: &Fields,
        errors: &mut Vec<String>,
    ) where
        I: Iterator<Item = &'t str>,
    {
        while let Some(token) = tokens.next() {
            if token == CLOSE {
                return;
            }
            let selects_sub_fields = tokens.next_if_eq(&OPEN).is_some();
            let Some(field) = fields.get(token) else {
                self.error(
                    errors,
                    format_args!("field set references non-existent field, field={token}"),
                );
                if selects_sub_fields {
                    skip_selection(tokens);
                }
                continue;
            };

            let is_external = field.directives.has(&EXTERNAL_DIRECTIVE_NAME);
            if self.extended_type && !is_external {
                self.error(
                    errors,
                    format_args!("extended type incorrectly references local field={token}"),
                );
            } else if !self.extended_type && is_external {
                self.error(
                    errors,
                    format_args!("type incorrectly references external field={token}"),
                );
            }

            let definition = self.schema.types.get(field.ty.inner_named_type());
            if field.ty.is_list() {
                self.error(
                    errors,
                    format_args!("field set references a list, field={token}"),
                );
                if selects_sub_fields {
                    skip_selection(tokens);
                }
                continue;
            }
            match (definition, selects_sub_fields) {
                (Some(ExtendedType::Object(object)), true) => {
                    self.validate_selection(tokens, &object.fields, errors)
                }
                (Some(ExtendedType::Interface(interface)), true) => {
                    self.validate_selection(tokens, &interface.fields, errors)
                }
                (Some(ExtendedType::Union(_)), sub_selection) => {
                    self.error(
                        errors,
                        format_args!("field set references a union, field={token}"),
                    );
                    if sub_selection {
                        skip_selection(tokens);
                    }
                }
                (Some(ExtendedType::Interface(_)), false) => self.error(
                    errors,
                    format_args!("field set references an interface without selecting its fields, field={token}"),
                ),
                (Some(ExtendedType::Object(_)), false) => self.error(
                    errors,
                    format_args!("field set references an object without selecting its fields, field={token}"),
                ),
                (_, true) => {
                    self.error(
                        errors,
                        format_args!("field set selects sub-fields of a leaf field, field={token}"),
                    );
                    skip_selection(tokens);
                }
                (_, false) => {}
            }
        }
    }
}

/// Consumes tokens up to the brace closing the current selection.
fn skip_selection<'t>(tokens: &mut impl Iterator<Item = &'t str>) {
    let mut depth = 1usize;
    for token in tokens {
        match token {
            OPEN => depth += 1,
            CLOSE => {
                depth -= 1;
                if depth == 0 {
                    return;
                }
            }
            _ => {}
        }
    }
}
