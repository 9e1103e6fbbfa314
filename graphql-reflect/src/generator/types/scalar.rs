use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::name;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::ScalarType;

use crate::error::SchemaGenerationError;
use crate::generator::SchemaGenerator;
use crate::reflect::BuiltinClass;
use crate::reflect::ClassRef;
use crate::reflect::TypeDescriptor;

/// Scalars outside the GraphQL specification that built-in classes map to.
fn extended_scalar(builtin: BuiltinClass) -> Option<(Name, &'static str)> {
    Some(match builtin {
        BuiltinClass::Long => (name!("Long"), "A 64-bit signed integer"),
        BuiltinClass::Short => (name!("Short"), "A 16-bit signed integer"),
        BuiltinClass::BigDecimal => (name!("BigDecimal"), "An arbitrary precision signed decimal"),
        BuiltinClass::BigInteger => (name!("BigInteger"), "An arbitrary precision signed integer"),
        BuiltinClass::Char => (name!("Char"), "A single character"),
        _ => return None,
    })
}

impl SchemaGenerator {
    /// The scalar a built-in class maps to, or `None` when the type is not a scalar.
    pub(super) fn scalar_type(
        &mut self,
        descriptor: &TypeDescriptor,
        id: bool,
    ) -> Result<Option<Name>, SchemaGenerationError> {
        if id {
            return match &descriptor.class {
                ClassRef::Builtin(
                    BuiltinClass::Int
                    | BuiltinClass::String
                    | BuiltinClass::Long
                    | BuiltinClass::Uuid,
                ) => Ok(Some(name!("ID"))),
                // The elements of an ID list are IDs.
                ClassRef::Builtin(BuiltinClass::List | BuiltinClass::Array) => Ok(None),
                class => Err(SchemaGenerationError::InvalidIdType {
                    type_name: class.to_string(),
                }),
            };
        }

        let ClassRef::Builtin(builtin) = descriptor.class else {
            return Ok(None);
        };
        let name = match builtin {
            BuiltinClass::Int => name!("Int"),
            BuiltinClass::Float | BuiltinClass::Double => name!("Float"),
            BuiltinClass::String => name!("String"),
            BuiltinClass::Boolean => name!("Boolean"),
            BuiltinClass::Uuid => {
                return Err(SchemaGenerationError::TypeNotSupported {
                    type_name: builtin.to_string(),
                    reason: "UUIDs are only supported as IDs unless a hook maps them to a scalar"
                        .to_string(),
                });
            }
            builtin => match extended_scalar(builtin) {
                Some((name, description)) => {
                    self.additional_types.entry(name.clone()).or_insert_with(|| {
                        ExtendedType::Scalar(Node::new(ScalarType {
                            description: Some(description.into()),
                            name: name.clone(),
                            directives: Default::default(),
                        }))
                    });
                    name
                }
                None => return Ok(None),
            },
        };
        Ok(Some(name))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::config::SchemaGeneratorConfig;
    use crate::reflect::ClassRegistry;

    fn generator() -> SchemaGenerator {
        SchemaGenerator::new(SchemaGeneratorConfig::default(), ClassRegistry::new())
    }

    #[rstest]
    #[case(TypeDescriptor::int(), "Int")]
    #[case(TypeDescriptor::float(), "Float")]
    #[case(TypeDescriptor::double(), "Float")]
    #[case(TypeDescriptor::string(), "String")]
    #[case(TypeDescriptor::boolean(), "Boolean")]
    #[case(TypeDescriptor::long(), "Long")]
    #[case(TypeDescriptor::builtin(BuiltinClass::Char), "Char")]
    fn builtins_map_to_scalars(#[case] descriptor: TypeDescriptor, #[case] expected: &str) {
        let scalar = generator().scalar_type(&descriptor, false).unwrap();
        assert_eq!(scalar.as_ref().map(Name::as_str), Some(expected));
    }

    #[test]
    fn extended_scalars_are_added_once() {
        let mut generator = generator();
        generator.scalar_type(&TypeDescriptor::long(), false).unwrap();
        generator.scalar_type(&TypeDescriptor::long().nullable(), false).unwrap();
        assert_eq!(generator.additional_types.len(), 1);
        assert!(matches!(
            generator.additional_types.get("Long"),
            Some(ExtendedType::Scalar(_))
        ));
    }

    #[rstest]
    #[case(TypeDescriptor::int())]
    #[case(TypeDescriptor::string())]
    #[case(TypeDescriptor::long())]
    #[case(TypeDescriptor::uuid())]
    fn id_classes(#[case] descriptor: TypeDescriptor) {
        let scalar = generator().scalar_type(&descriptor, true).unwrap();
        assert_eq!(scalar.as_ref().map(Name::as_str), Some("ID"));
    }

    #[test]
    fn other_id_classes_are_rejected() {
        let error = generator()
            .scalar_type(&TypeDescriptor::boolean(), true)
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Boolean is not a valid ID type, only Int, String, Long and UUID are allowed"
        );
        assert!(generator()
            .scalar_type(&TypeDescriptor::of("shop::Widget"), true)
            .is_err());
    }

    #[test]
    fn non_scalars_fall_through() {
        assert_eq!(generator().scalar_type(&TypeDescriptor::of("shop::Widget"), false).unwrap(), None);
        assert_eq!(
            generator()
                .scalar_type(&TypeDescriptor::list_of(TypeDescriptor::int()), true)
                .unwrap(),
            None
        );
    }
}
