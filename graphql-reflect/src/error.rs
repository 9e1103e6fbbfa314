//! Schema generation and field resolution errors.
use apollo_compiler::Name;
use apollo_compiler::validation::DiagnosticList;
use apollo_compiler::validation::WithErrors;
use displaydoc::Display;
use serde::Serialize;
use serde_json_bytes::ByteString;
use serde_json_bytes::Value;
use thiserror::Error;

use crate::graphql;

/// Boxed error returned by user supplied collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building a schema.
///
/// Every variant is fatal: no partial schema is produced.
#[derive(Error, Display, Debug)]
#[non_exhaustive]
pub enum SchemaGenerationError {
    /// type {type_name} is not supported: {reason}
    TypeNotSupported { type_name: String, reason: String },

    /// {type_name} is not a valid ID type, only Int, String, Long and UUID are allowed
    InvalidIdType { type_name: String },

    /// could not cast GraphQL type {type_name} to {expected}
    CouldNotCastGraphQLType {
        type_name: String,
        expected: &'static str,
    },

    /// query class {class_name} is not public
    InvalidQueryType { class_name: String },

    /// mutation class {class_name} is not public
    InvalidMutationType { class_name: String },

    /// subscription class {class_name} is invalid: {reason}
    InvalidSubscriptionType { class_name: String, reason: String },

    /// extension function {function_name} on {class_name} is invalid: {reason}
    InvalidExtensionFunction {
        class_name: String,
        function_name: String,
        reason: String,
    },

    /// class {class_name} is not registered
    UnknownClass { class_name: String },

    /// '{name}' is not a valid GraphQL name
    InvalidName { name: String },

    /// field {field_name} is defined more than once on {type_name}
    DuplicateField { type_name: Name, field_name: Name },

    /// classes {first} and {second} both generate the GraphQL type {type_name}
    ConflictingTypes {
        type_name: Name,
        first: String,
        second: String,
    },

    /// the {type_name} type does not define any field
    EmptyQueryType { type_name: Name },

    /// generated schema is invalid: {0}
    InvalidSchema(String),

    /// {0}
    Extension(BoxError),
}

impl SchemaGenerationError {
    pub(crate) fn invalid_name(name: &str) -> Self {
        SchemaGenerationError::InvalidName {
            name: name.to_string(),
        }
    }
}

impl From<DiagnosticList> for SchemaGenerationError {
    fn from(errors: DiagnosticList) -> Self {
        SchemaGenerationError::InvalidSchema(errors.to_string())
    }
}

impl<T> From<WithErrors<T>> for SchemaGenerationError {
    fn from(with_errors: WithErrors<T>) -> Self {
        with_errors.errors.into()
    }
}

/// Errors raised by data fetchers at execution time.
///
/// These are scoped to the field being resolved and never abort a whole request.
#[derive(Error, Display, Debug, Clone, Serialize, Eq, PartialEq)]
#[serde(untagged)]
#[non_exhaustive]
pub enum FetchError {
    /// invalid value for argument '{argument}': {reason}
    InvalidArgument {
        /// Name of the argument.
        argument: String,
        /// Why the value could not be converted.
        reason: String,
    },

    /// field {coordinate} has no source object to resolve against
    MissingSource { coordinate: String },

    /// resolver for {coordinate} failed: {reason}
    ResolverFailed {
        /// The field coordinate, such as `Query.widget`.
        coordinate: String,
        /// The failure reason.
        reason: String,
    },
}

impl FetchError {
    /// Convert the fetch error to a GraphQL error.
    pub fn to_graphql_error(&self) -> graphql::Error {
        let mut value: Value = serde_json_bytes::to_value(self).unwrap_or_default();
        if let Some(extensions) = value.as_object_mut() {
            extensions
                .entry("code")
                .or_insert(Value::String(self.extension_code()));
        }
        graphql::Error {
            message: self.to_string(),
            extensions: value.as_object().cloned().unwrap_or_default(),
            ..Default::default()
        }
    }

    fn extension_code(&self) -> ByteString {
        match self {
            FetchError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            FetchError::MissingSource { .. } => "MISSING_SOURCE",
            FetchError::ResolverFailed { .. } => "RESOLVER_FAILED",
        }
        .into()
    }
}
