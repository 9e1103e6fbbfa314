//! Extension points of the schema generator.

use apollo_compiler::Schema;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::FieldDefinition;

use crate::error::SchemaGenerationError;
use crate::execution::CodeRegistry;
use crate::execution::FieldCoordinate;
use crate::reflect::ClassDescriptor;
use crate::reflect::FunctionDescriptor;
use crate::reflect::PropertyDescriptor;
use crate::reflect::TypeDescriptor;

/// Hooks called while a schema is generated.
///
/// Every method has a pass-through default so implementations only override what they need.
pub trait SchemaGeneratorHooks: Send + Sync {
    /// Called once the root types are assembled, before the schema is validated.
    ///
    /// May add types, root fields and data fetchers.
    fn will_build_schema(
        &self,
        _schema: &mut Schema,
        _code_registry: &mut CodeRegistry,
    ) -> Result<(), SchemaGenerationError> {
        Ok(())
    }

    /// Supplies the GraphQL type of a host type instead of reflecting it.
    ///
    /// Typically used to map host types such as dates or UUIDs to custom scalars.
    fn will_generate_type(&self, _descriptor: &TypeDescriptor) -> Option<ExtendedType> {
        None
    }

    /// Called with every generated named type before it is cached.
    fn did_generate_type(
        &self,
        _descriptor: &TypeDescriptor,
        generated: ExtendedType,
    ) -> ExtendedType {
        generated
    }

    /// Called with every reflected type right before it is added to the schema.
    fn will_add_type_to_schema(
        &self,
        _descriptor: &TypeDescriptor,
        generated: ExtendedType,
    ) -> ExtendedType {
        generated
    }

    /// Returns the type used in place of a function's declared return type,
    /// before wrapper types are unwrapped.
    fn will_resolve_wrapper_type(&self, descriptor: &TypeDescriptor) -> TypeDescriptor {
        descriptor.clone()
    }

    fn is_valid_property(&self, _class: &ClassDescriptor, _property: &PropertyDescriptor) -> bool {
        true
    }

    fn is_valid_function(&self, _class: &ClassDescriptor, _function: &FunctionDescriptor) -> bool {
        true
    }

    /// Called with every reflected type. Data fetchers of its fields may be replaced here.
    fn on_rewire_type(
        &self,
        generated: ExtendedType,
        _code_registry: &mut CodeRegistry,
    ) -> ExtendedType {
        generated
    }

    /// Called with every bound field. The returned field replaces the built one.
    fn on_rewire_field(
        &self,
        _coordinate: &FieldCoordinate,
        field: FieldDefinition,
        _code_registry: &mut CodeRegistry,
    ) -> FieldDefinition {
        field
    }

    fn did_generate_query_field(
        &self,
        _function: &FunctionDescriptor,
        field: FieldDefinition,
    ) -> FieldDefinition {
        field
    }

    fn did_generate_mutation_field(
        &self,
        _function: &FunctionDescriptor,
        field: FieldDefinition,
    ) -> FieldDefinition {
        field
    }

    fn did_generate_subscription_field(
        &self,
        _function: &FunctionDescriptor,
        field: FieldDefinition,
    ) -> FieldDefinition {
        field
    }
}

/// Hooks leaving every generated element untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSchemaGeneratorHooks;

impl SchemaGeneratorHooks for NoopSchemaGeneratorHooks {}
