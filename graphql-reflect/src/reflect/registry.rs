use std::sync::Arc;

use indexmap::IndexMap;

use super::ClassDescriptor;
use super::ClassKind;
use super::ClassRef;
use super::FunctionDescriptor;
use super::TypeDescriptor;
use crate::error::SchemaGenerationError;

/// Every host class a schema may reference, keyed by qualified name.
#[derive(Clone, Debug, Default)]
pub struct ClassRegistry {
    classes: IndexMap<Arc<str>, Arc<ClassDescriptor>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers a class, replacing any class with the same qualified name.
    pub fn register(&mut self, class: ClassDescriptor) -> &mut Self {
        self.classes
            .insert(class.qualified_name.clone(), Arc::new(class));
        self
    }

    /// Registers an extension function of `class_name`.
    ///
    /// The first parameter must be the receiver, typed as the extended class. It is removed from
    /// the exposed parameters and receives the resolution source at execution time.
    pub fn register_extension(
        &mut self,
        class_name: &str,
        mut function: FunctionDescriptor,
    ) -> Result<&mut Self, SchemaGenerationError> {
        let invalid = |reason: &str| SchemaGenerationError::InvalidExtensionFunction {
            class_name: class_name.to_string(),
            function_name: function.name.clone(),
            reason: reason.to_string(),
        };
        let receiver = function
            .parameters
            .first()
            .ok_or_else(|| invalid("missing receiver parameter"))?;
        if receiver.ty.class != ClassRef::Named(class_name.into()) {
            return Err(invalid(&format!(
                "receiver has type {} instead of {class_name}",
                receiver.ty
            )));
        }
        if function.is_abstract {
            return Err(invalid("extension functions cannot be abstract"));
        }
        let class = self
            .classes
            .get_mut(class_name)
            .ok_or_else(|| SchemaGenerationError::UnknownClass {
                class_name: class_name.to_string(),
            })?;
        function.parameters.remove(0);
        Arc::make_mut(class).functions.push(function);
        Ok(self)
    }

    pub fn get(&self, qualified_name: &str) -> Option<&Arc<ClassDescriptor>> {
        self.classes.get(qualified_name)
    }

    /// The registered class referenced by `descriptor`.
    pub fn class_of(
        &self,
        descriptor: &TypeDescriptor,
    ) -> Result<&Arc<ClassDescriptor>, SchemaGenerationError> {
        match &descriptor.class {
            ClassRef::Named(name) => {
                self.get(name)
                    .ok_or_else(|| SchemaGenerationError::UnknownClass {
                        class_name: name.to_string(),
                    })
            }
            ClassRef::Builtin(builtin) => Err(SchemaGenerationError::TypeNotSupported {
                type_name: builtin.to_string(),
                reason: "built-in classes have no members".to_string(),
            }),
        }
    }

    /// Concrete classes implementing `interface`, directly or through other interfaces,
    /// in registration order.
    pub fn implementations_of<'a>(
        &'a self,
        interface: &'a str,
    ) -> impl Iterator<Item = &'a Arc<ClassDescriptor>> + 'a {
        self.classes
            .values()
            .filter(|class| class.kind == ClassKind::Object)
            .filter(move |class| self.is_subtype(class, interface))
    }

    fn is_subtype(&self, class: &ClassDescriptor, interface: &str) -> bool {
        class.supertypes.iter().any(|supertype| {
            supertype.as_ref() == interface
                || self
                    .get(supertype)
                    .is_some_and(|parent| self.is_subtype(parent, interface))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ClassDescriptor>> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::ParameterDescriptor;

    fn registry() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        registry
            .register(ClassDescriptor::interface("Animal").function(
                FunctionDescriptor::new("name", TypeDescriptor::string()).abstract_function(),
            ))
            .register(ClassDescriptor::interface("Pet").implements("Animal").function(
                FunctionDescriptor::new("owner", TypeDescriptor::string()).abstract_function(),
            ))
            .register(ClassDescriptor::object("Dog").implements("Pet"))
            .register(ClassDescriptor::object("Cat").implements("Animal"))
            .register(ClassDescriptor::object("Rock"));
        registry
    }

    #[test]
    fn implementations_are_transitive() {
        let registry = registry();
        let animals: Vec<_> = registry
            .implementations_of("Animal")
            .map(|class| class.simple_name.as_str())
            .collect();
        assert_eq!(animals, vec!["Dog", "Cat"]);
        let pets: Vec<_> = registry
            .implementations_of("Pet")
            .map(|class| class.simple_name.as_str())
            .collect();
        assert_eq!(pets, vec!["Dog"]);
    }

    #[test]
    fn extension_receiver_is_stripped() {
        let mut registry = registry();
        registry
            .register_extension(
                "Dog",
                FunctionDescriptor::new("bark", TypeDescriptor::string())
                    .parameter(ParameterDescriptor::new("dog", TypeDescriptor::of("Dog")))
                    .parameter(ParameterDescriptor::new("times", TypeDescriptor::int())),
            )
            .unwrap();
        let dog = registry.get("Dog").unwrap();
        assert_eq!(dog.functions.len(), 1);
        assert_eq!(dog.functions[0].parameters.len(), 1);
        assert_eq!(dog.functions[0].parameters[0].name, "times");
    }

    #[test]
    fn extension_needs_matching_receiver() {
        let mut registry = registry();
        let error = registry
            .register_extension(
                "Dog",
                FunctionDescriptor::new("bark", TypeDescriptor::string())
                    .parameter(ParameterDescriptor::new("times", TypeDescriptor::int())),
            )
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "extension function bark on Dog is invalid: receiver has type Int instead of Dog"
        );
        assert!(matches!(
            registry.register_extension(
                "Dog",
                FunctionDescriptor::new("bark", TypeDescriptor::string())
            ),
            Err(SchemaGenerationError::InvalidExtensionFunction { .. })
        ));
    }
}
