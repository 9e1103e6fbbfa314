//! Generated named types of one schema generation run.

use std::collections::HashMap;

use apollo_compiler::Name;
use apollo_compiler::schema::ExtendedType;
use indexmap::IndexMap;

use crate::error::SchemaGenerationError;
use crate::reflect::ClassRef;
use crate::reflect::TypeDescriptor;

/// Identity of a generated type. Nullability does not take part in it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct TypesCacheKey {
    class: ClassRef,
    arguments: Vec<TypeDescriptor>,
    input: bool,
}

impl TypesCacheKey {
    pub(crate) fn new(descriptor: &TypeDescriptor, input: bool) -> Self {
        TypesCacheKey {
            class: descriptor.class.clone(),
            arguments: descriptor.arguments.clone(),
            input,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TypeCategory {
    Scalar,
    Enum,
    Object,
    Interface,
    Union,
    InputObject,
}

impl TypeCategory {
    pub(crate) fn of(definition: &ExtendedType) -> Self {
        match definition {
            ExtendedType::Scalar(_) => TypeCategory::Scalar,
            ExtendedType::Object(_) => TypeCategory::Object,
            ExtendedType::Interface(_) => TypeCategory::Interface,
            ExtendedType::Union(_) => TypeCategory::Union,
            ExtendedType::Enum(_) => TypeCategory::Enum,
            ExtendedType::InputObject(_) => TypeCategory::InputObject,
        }
    }

    pub(crate) fn is_input(self) -> bool {
        matches!(
            self,
            TypeCategory::Scalar | TypeCategory::Enum | TypeCategory::InputObject
        )
    }

    pub(crate) fn is_output(self) -> bool {
        self != TypeCategory::InputObject
    }
}

enum Slot {
    /// Claimed, its fields are still being generated. The name can already be referenced.
    UnderConstruction,
    Finished(ExtendedType),
}

struct CacheEntry {
    name: Name,
    descriptor: TypeDescriptor,
    slot: Slot,
}

/// Forward handle to a claimed type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TypeHandle {
    pub(crate) index: usize,
    pub(crate) name: Name,
}

/// Arena of generated type slots, indexed by cache key.
///
/// A slot is claimed before the fields of its type are generated so self references resolve to
/// the claimed name instead of recursing.
#[derive(Default)]
pub(crate) struct TypesCache {
    entries: IndexMap<TypesCacheKey, CacheEntry>,
    names: HashMap<Name, usize>,
}

impl TypesCache {
    pub(crate) fn get(&self, key: &TypesCacheKey) -> Option<TypeHandle> {
        self.entries
            .get_full(key)
            .map(|(index, _, entry)| TypeHandle {
                index,
                name: entry.name.clone(),
            })
    }

    pub(crate) fn claim(
        &mut self,
        key: TypesCacheKey,
        name: Name,
        descriptor: &TypeDescriptor,
    ) -> Result<TypeHandle, SchemaGenerationError> {
        if let Some(index) = self.names.get(&name) {
            let (_, existing) = self
                .entries
                .get_index(*index)
                .ok_or_else(|| SchemaGenerationError::invalid_name(&name))?;
            return Err(SchemaGenerationError::ConflictingTypes {
                type_name: name,
                first: existing.descriptor.class.to_string(),
                second: descriptor.class.to_string(),
            });
        }
        let (index, _) = self.entries.insert_full(
            key,
            CacheEntry {
                name: name.clone(),
                descriptor: descriptor.clone(),
                slot: Slot::UnderConstruction,
            },
        );
        self.names.insert(name.clone(), index);
        Ok(TypeHandle { index, name })
    }

    /// Promotes a claimed slot to its finished definition.
    pub(crate) fn complete(&mut self, handle: &TypeHandle, definition: ExtendedType) {
        if let Some((_, entry)) = self.entries.get_index_mut(handle.index) {
            entry.slot = Slot::Finished(definition);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// The finished types in the order they were claimed.
    pub(crate) fn into_types(
        self,
    ) -> Result<Vec<(TypeDescriptor, ExtendedType)>, SchemaGenerationError> {
        self.entries
            .into_values()
            .map(|entry| match entry.slot {
                Slot::Finished(definition) => Ok((entry.descriptor, definition)),
                Slot::UnderConstruction => Err(SchemaGenerationError::TypeNotSupported {
                    type_name: entry.name.to_string(),
                    reason: "type generation did not complete".to_string(),
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use apollo_compiler::Node;
    use apollo_compiler::name;
    use apollo_compiler::schema::ObjectType;

    use super::*;

    fn object(name: Name) -> ExtendedType {
        ExtendedType::Object(Node::new(ObjectType {
            description: None,
            name,
            implements_interfaces: Default::default(),
            directives: Default::default(),
            fields: Default::default(),
        }))
    }

    #[test]
    fn claimed_slots_are_found_before_completion() {
        let mut cache = TypesCache::default();
        let node = TypeDescriptor::of("Node");
        let key = TypesCacheKey::new(&node, false);
        let handle = cache
            .claim(key.clone(), name!("Node"), &node)
            .unwrap();
        assert_eq!(cache.get(&key), Some(handle.clone()));

        cache.complete(&handle, object(name!("Node")));
        let types = cache.into_types().unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].1.name().as_str(), "Node");
    }

    #[test]
    fn nullability_does_not_change_identity() {
        let key = TypesCacheKey::new(&TypeDescriptor::of("Node"), false);
        assert_eq!(key, TypesCacheKey::new(&TypeDescriptor::of("Node").nullable(), false));
        assert_ne!(key, TypesCacheKey::new(&TypeDescriptor::of("Node"), true));
    }

    #[test]
    fn a_name_belongs_to_one_class() {
        let mut cache = TypesCache::default();
        let first = TypeDescriptor::of("billing::Account");
        let second = TypeDescriptor::of("crm::Account");
        cache
            .claim(TypesCacheKey::new(&first, false), name!("Account"), &first)
            .unwrap();
        let error = cache
            .claim(TypesCacheKey::new(&second, false), name!("Account"), &second)
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "classes billing::Account and crm::Account both generate the GraphQL type Account"
        );
    }

    #[test]
    fn unfinished_slots_fail_assembly() {
        let mut cache = TypesCache::default();
        let node = TypeDescriptor::of("Node");
        cache
            .claim(TypesCacheKey::new(&node, false), name!("Node"), &node)
            .unwrap();
        assert!(cache.into_types().is_err());
    }
}
