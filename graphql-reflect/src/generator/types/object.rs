//! Objects, interfaces and unions.

use std::collections::HashSet;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast::DirectiveLocation;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::collections::IndexSet;
use apollo_compiler::schema::Component;
use apollo_compiler::schema::ComponentName;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::FieldDefinition;
use apollo_compiler::schema::InterfaceType;
use apollo_compiler::schema::ObjectType;
use apollo_compiler::schema::UnionType;

use crate::error::SchemaGenerationError;
use crate::generator::SchemaGenerator;
use crate::generator::fields::description;
use crate::generator::fields::insert_field;
use crate::reflect::ClassDescriptor;
use crate::reflect::filters;

impl SchemaGenerator {
    pub(super) fn generate_object(
        &mut self,
        class: &ClassDescriptor,
        name: &Name,
    ) -> Result<ExtendedType, SchemaGenerationError> {
        let implements_interfaces = self.interfaces_of(class)?;
        let fields = self.fields_of(class, name, false)?;
        Ok(ExtendedType::Object(Node::new(ObjectType {
            description: description(&class.annotations),
            name: name.clone(),
            implements_interfaces,
            directives: self.type_directives(&class.annotations, DirectiveLocation::Object),
            fields,
        })))
    }

    /// Generates an interface. Its fields are abstract: implementations resolve them.
    pub(super) fn generate_interface(
        &mut self,
        class: &ClassDescriptor,
        name: &Name,
    ) -> Result<ExtendedType, SchemaGenerationError> {
        let implements_interfaces = self.interfaces_of(class)?;
        let fields = self.fields_of(class, name, true)?;
        Ok(ExtendedType::Interface(Node::new(InterfaceType {
            description: description(&class.annotations),
            name: name.clone(),
            implements_interfaces,
            directives: self.type_directives(&class.annotations, DirectiveLocation::Interface),
            fields,
        })))
    }

    /// Generates a union of the concrete classes implementing the marker interface `class`.
    pub(super) fn generate_union(
        &mut self,
        class: &ClassDescriptor,
        name: &Name,
    ) -> Result<ExtendedType, SchemaGenerationError> {
        let mut members = IndexSet::default();
        for implementation in self.implementations_of(class) {
            let ty = self.generate_graphql_type(&implementation.type_descriptor(), false, false)?;
            members.insert(ComponentName::from(ty.inner_named_type().clone()));
        }
        Ok(ExtendedType::Union(Node::new(UnionType {
            description: description(&class.annotations),
            name: name.clone(),
            directives: self.type_directives(&class.annotations, DirectiveLocation::Union),
            members,
        })))
    }

    /// Generates every supported concrete class implementing the interface `class`, so that
    /// implementations reachable only through the interface are part of the schema.
    pub(super) fn generate_implementations(
        &mut self,
        class: &ClassDescriptor,
    ) -> Result<(), SchemaGenerationError> {
        for implementation in self.implementations_of(class) {
            self.generate_graphql_type(&implementation.type_descriptor(), false, false)?;
        }
        Ok(())
    }

    fn implementations_of(&self, class: &ClassDescriptor) -> Vec<Arc<ClassDescriptor>> {
        self.registry
            .implementations_of(&class.qualified_name)
            .filter(|implementation| {
                implementation.is_public() && self.config.is_supported(&implementation.qualified_name)
            })
            .cloned()
            .collect()
    }

    /// The interfaces implemented by `class`, transitively and in declaration order.
    ///
    /// Union markers and unregistered or unsupported supertypes are skipped.
    fn interfaces_of(
        &mut self,
        class: &ClassDescriptor,
    ) -> Result<IndexSet<ComponentName>, SchemaGenerationError> {
        let mut interfaces = IndexSet::default();
        let mut visited = HashSet::new();
        let mut pending = class.supertypes.clone();
        let mut next = 0;
        while let Some(supertype) = pending.get(next).cloned() {
            next += 1;
            if !visited.insert(supertype.clone()) {
                continue;
            }
            let Some(interface) = self.registry.get(&supertype).cloned() else {
                continue;
            };
            if !interface.is_interface()
                || interface.is_union()
                || !self.config.is_supported(&interface.qualified_name)
            {
                continue;
            }
            pending.extend(interface.supertypes.iter().cloned());
            let ty = self.generate_graphql_type(&interface.type_descriptor(), false, false)?;
            interfaces.insert(ComponentName::from(ty.inner_named_type().clone()));
        }
        Ok(interfaces)
    }

    fn fields_of(
        &mut self,
        class: &ClassDescriptor,
        name: &Name,
        is_abstract: bool,
    ) -> Result<IndexMap<Name, Component<FieldDefinition>>, SchemaGenerationError> {
        let hooks = self.config.hooks.clone();
        let mut fields = IndexMap::default();
        for property in filters::valid_properties(class, &*hooks) {
            let field = self.property_field(property, name, is_abstract)?;
            insert_field(&mut fields, name, field)?;
        }
        for function in filters::valid_functions(class, &*hooks) {
            let field = self.function_field(function, name, None, is_abstract)?;
            insert_field(&mut fields, name, field)?;
        }
        Ok(fields)
    }
}
