//! Member filters applied before a property, function or parameter becomes part of the schema.

use super::ClassDescriptor;
use super::FunctionDescriptor;
use super::ParameterDescriptor;
use super::PropertyDescriptor;
use super::Visibility;
use crate::hooks::SchemaGeneratorHooks;

/// Functions every host object has, which never describe data.
const SYNTHESIZED_FUNCTIONS: [&str; 5] = ["annotationType", "toString", "copy", "equals", "hashCode"];

fn is_synthesized(function: &FunctionDescriptor) -> bool {
    SYNTHESIZED_FUNCTIONS.contains(&function.name.as_str())
        || function
            .name
            .strip_prefix("component")
            .is_some_and(|index| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()))
}

pub(crate) fn is_valid_property(
    class: &ClassDescriptor,
    property: &PropertyDescriptor,
    hooks: &dyn SchemaGeneratorHooks,
) -> bool {
    property.visibility == Visibility::Public
        && !property.annotations.ignored
        && hooks.is_valid_property(class, property)
}

pub(crate) fn is_valid_function(
    class: &ClassDescriptor,
    function: &FunctionDescriptor,
    hooks: &dyn SchemaGeneratorHooks,
) -> bool {
    function.visibility == Visibility::Public
        && !function.annotations.ignored
        && !is_synthesized(function)
        && hooks.is_valid_function(class, function)
}

/// Whether a parameter is exposed as a GraphQL argument.
pub(crate) fn is_argument(parameter: &ParameterDescriptor) -> bool {
    !parameter.annotations.ignored && !parameter.is_context() && !parameter.is_environment()
}

pub(crate) fn valid_properties<'a>(
    class: &'a ClassDescriptor,
    hooks: &'a dyn SchemaGeneratorHooks,
) -> impl Iterator<Item = &'a PropertyDescriptor> + 'a {
    class
        .properties
        .iter()
        .filter(move |property| is_valid_property(class, property, hooks))
}

pub(crate) fn valid_functions<'a>(
    class: &'a ClassDescriptor,
    hooks: &'a dyn SchemaGeneratorHooks,
) -> impl Iterator<Item = &'a FunctionDescriptor> + 'a {
    class
        .functions
        .iter()
        .filter(move |function| is_valid_function(class, function, hooks))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::hooks::NoopSchemaGeneratorHooks;
    use crate::reflect::Annotations;
    use crate::reflect::TypeDescriptor;

    #[rstest]
    #[case("toString", false)]
    #[case("hashCode", false)]
    #[case("component1", false)]
    #[case("component12", false)]
    #[case("component", true)]
    #[case("components", true)]
    #[case("greet", true)]
    fn synthesized_functions_are_filtered(#[case] name: &str, #[case] valid: bool) {
        let class = ClassDescriptor::object("Query");
        let function = FunctionDescriptor::new(name, TypeDescriptor::string());
        assert_eq!(
            is_valid_function(&class, &function, &NoopSchemaGeneratorHooks),
            valid
        );
    }

    #[test]
    fn ignored_and_private_members_are_filtered() {
        let class = ClassDescriptor::object("Widget")
            .property(PropertyDescriptor::new("id", TypeDescriptor::int()))
            .property(
                PropertyDescriptor::new("secret", TypeDescriptor::string())
                    .with_annotations(Annotations::ignored()),
            )
            .property(
                PropertyDescriptor::new("cost", TypeDescriptor::int())
                    .with_visibility(Visibility::Private),
            );
        let names: Vec<_> = valid_properties(&class, &NoopSchemaGeneratorHooks)
            .map(|property| property.name.as_str())
            .collect();
        assert_eq!(names, vec!["id"]);
    }

    #[test]
    fn context_and_environment_parameters_are_not_arguments() {
        assert!(is_argument(&ParameterDescriptor::new(
            "name",
            TypeDescriptor::string()
        )));
        assert!(!is_argument(&ParameterDescriptor::new(
            "context",
            TypeDescriptor::context()
        )));
        assert!(!is_argument(
            &ParameterDescriptor::new("user", TypeDescriptor::of("User"))
                .with_annotations(Annotations::context())
        ));
        assert!(!is_argument(&ParameterDescriptor::new(
            "env",
            TypeDescriptor::environment()
        )));
    }
}
