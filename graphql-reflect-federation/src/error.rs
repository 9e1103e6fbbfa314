use std::fmt;

use displaydoc::Display;
use graphql_reflect::SchemaGenerationError;
use thiserror::Error;

/// Errors raised while federating a generated schema.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FederationError {
    /// invalid federated schema:{0}
    InvalidFederatedSchema(ValidationErrors),

    /// the schema does not define a query type
    MissingQueryType,
}

/// Every problem found while validating the federation directives of a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.0 {
            write!(f, "\n - {error}")?;
        }
        Ok(())
    }
}

impl From<FederationError> for SchemaGenerationError {
    fn from(error: FederationError) -> Self {
        SchemaGenerationError::Extension(Box::new(error))
    }
}
