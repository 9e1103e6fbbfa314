use async_trait::async_trait;
use serde_json_bytes::Value;

use super::DataFetcher;
use super::DataFetchingEnvironment;
use super::FetchOutput;
use super::PropertyAccessor;
use crate::error::FetchError;

/// Resolves a field by reading a property of the source object.
pub struct PropertyDataFetcher {
    property: String,
    accessor: Option<PropertyAccessor>,
}

impl PropertyDataFetcher {
    /// Reads the member `property` of the source object.
    pub fn new(property: impl Into<String>) -> Self {
        PropertyDataFetcher {
            property: property.into(),
            accessor: None,
        }
    }

    pub(crate) fn with_accessor(property: impl Into<String>, accessor: PropertyAccessor) -> Self {
        PropertyDataFetcher {
            property: property.into(),
            accessor: Some(accessor),
        }
    }
}

#[async_trait]
impl DataFetcher for PropertyDataFetcher {
    async fn fetch(&self, environment: DataFetchingEnvironment) -> Result<FetchOutput, FetchError> {
        if let Some(accessor) = &self.accessor {
            return accessor(&environment.source).map(FetchOutput::Value);
        }
        let value = environment
            .source
            .as_object()
            .and_then(|source| source.get(self.property.as_str()))
            .cloned()
            .unwrap_or_default();
        Ok(FetchOutput::Value(value))
    }
}
