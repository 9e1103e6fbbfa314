//! Resolution of the `_entities` and `_service` federation fields.

mod entities;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use graphql_reflect::BoxError;
use graphql_reflect::Context;
use graphql_reflect::FetchError;
use graphql_reflect::execution::DataFetcher;
use graphql_reflect::execution::DataFetchingEnvironment;
use graphql_reflect::execution::FetchOutput;
use graphql_reflect::graphql;
use graphql_reflect::graphql::Object;
use serde_json_bytes::Value;
use serde_json_bytes::json;

pub use self::entities::EntityResolver;

/// Turns representations of one entity type into entities.
#[async_trait]
pub trait FederatedTypeResolver: Send + Sync {
    /// The GraphQL name of the resolved entity type.
    fn type_name(&self) -> &str;

    /// Resolves `representations`, returning one result per representation and in the same
    /// order: the entity, null, or the error of that representation alone.
    ///
    /// An `Err` for the whole batch fails every representation of it.
    async fn resolve(
        &self,
        context: &Context,
        representations: Vec<Object>,
    ) -> Result<Vec<Result<Value, graphql::Error>>, BoxError>;
}

/// The [`FederatedTypeResolver`]s of a service, by entity type name.
///
/// Built once before schema generation and only read afterwards.
#[derive(Clone, Default)]
pub struct FederatedTypeRegistry {
    resolvers: HashMap<String, Arc<dyn FederatedTypeResolver>>,
}

impl FederatedTypeRegistry {
    pub fn new(resolvers: impl IntoIterator<Item = Arc<dyn FederatedTypeResolver>>) -> Self {
        FederatedTypeRegistry {
            resolvers: resolvers
                .into_iter()
                .map(|resolver| (resolver.type_name().to_string(), resolver))
                .collect(),
        }
    }

    pub fn resolver(&self, type_name: &str) -> Option<&Arc<dyn FederatedTypeResolver>> {
        self.resolvers.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.resolvers.contains_key(type_name)
    }
}

impl fmt::Debug for FederatedTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut type_names: Vec<_> = self.resolvers.keys().collect();
        type_names.sort();
        f.debug_struct("FederatedTypeRegistry")
            .field("type_names", &type_names)
            .finish()
    }
}

/// Resolves `Query._service` to the SDL of the service.
pub(crate) struct ServiceSdl {
    pub(crate) sdl: String,
}

#[async_trait]
impl DataFetcher for ServiceSdl {
    async fn fetch(&self, _environment: DataFetchingEnvironment) -> Result<FetchOutput, FetchError> {
        Ok(json!({ "sdl": self.sdl.as_str() }).into())
    }
}
