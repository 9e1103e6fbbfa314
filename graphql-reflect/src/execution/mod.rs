//! Field resolution: data fetchers and the registry binding them to schema coordinates.
//!
//! Executing operations is left to an execution engine. It looks up the [`DataFetcher`] of every
//! field it resolves in the [`CodeRegistry`] produced along with the schema.

mod coercion;
mod function;
mod property;

use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use apollo_compiler::Name;
use async_trait::async_trait;
use futures::Stream;
use futures::future::BoxFuture;
use serde_json_bytes::Value;

pub(crate) use self::coercion::coerce_argument;
pub use self::function::FunctionDataFetcher;
pub use self::function::Invocation;
pub(crate) use self::function::ParameterBinding;
pub use self::function::ParameterValue;
pub use self::property::PropertyDataFetcher;
use crate::context::Context;
use crate::error::FetchError;
use crate::graphql;
use crate::graphql::Object;

/// The code executed when a function field is resolved.
pub type Invoker =
    Arc<dyn Fn(Invocation) -> BoxFuture<'static, Result<FetchOutput, FetchError>> + Send + Sync>;

/// Reads a property from its source object.
pub type PropertyAccessor = Arc<dyn Fn(&Value) -> Result<Value, FetchError> + Send + Sync>;

/// The values published by a subscription field.
pub type ValueStream = Pin<Box<dyn Stream<Item = Result<Value, FetchError>> + Send>>;

/// A field of a schema type, such as `Query.greet`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldCoordinate {
    pub type_name: Name,
    pub field_name: Name,
}

impl FieldCoordinate {
    pub fn new(type_name: Name, field_name: Name) -> Self {
        FieldCoordinate {
            type_name,
            field_name,
        }
    }
}

impl fmt::Display for FieldCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

/// Everything a data fetcher gets to resolve one field.
#[derive(Clone, Debug)]
pub struct DataFetchingEnvironment {
    pub coordinate: FieldCoordinate,
    /// The resolved value of the parent field.
    pub source: Value,
    /// Argument values, already coerced to their GraphQL input types by the engine.
    pub arguments: Object,
    pub context: Context,
}

impl DataFetchingEnvironment {
    pub fn new(coordinate: FieldCoordinate, source: Value, arguments: Object, context: Context) -> Self {
        DataFetchingEnvironment {
            coordinate,
            source,
            arguments,
            context,
        }
    }
}

/// The result of resolving a field.
pub enum FetchOutput {
    Value(Value),
    /// Data accompanied by field errors, as returned by functions producing a `FetchResult`.
    Partial {
        data: Value,
        errors: Vec<graphql::Error>,
    },
    /// Events of a subscription field.
    Stream(ValueStream),
}

impl FetchOutput {
    /// The resolved value, if this is not a stream.
    pub fn value(&self) -> Option<&Value> {
        match self {
            FetchOutput::Value(value) | FetchOutput::Partial { data: value, .. } => Some(value),
            FetchOutput::Stream(_) => None,
        }
    }

    pub fn errors(&self) -> &[graphql::Error] {
        match self {
            FetchOutput::Partial { errors, .. } => errors,
            _ => &[],
        }
    }
}

impl From<Value> for FetchOutput {
    fn from(value: Value) -> Self {
        FetchOutput::Value(value)
    }
}

impl fmt::Debug for FetchOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutput::Value(value) => f.debug_tuple("Value").field(value).finish(),
            FetchOutput::Partial { data, errors } => f
                .debug_struct("Partial")
                .field("data", data)
                .field("errors", errors)
                .finish(),
            FetchOutput::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// Resolves the value of one field.
#[async_trait]
pub trait DataFetcher: Send + Sync {
    async fn fetch(&self, environment: DataFetchingEnvironment) -> Result<FetchOutput, FetchError>;
}

/// Data fetchers of a schema, by field coordinate.
#[derive(Clone, Default)]
pub struct CodeRegistry {
    data_fetchers: HashMap<FieldCoordinate, Arc<dyn DataFetcher>>,
}

impl CodeRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Binds `fetcher` to `coordinate`, returning the fetcher it replaces.
    pub fn register(
        &mut self,
        coordinate: FieldCoordinate,
        fetcher: Arc<dyn DataFetcher>,
    ) -> Option<Arc<dyn DataFetcher>> {
        self.data_fetchers.insert(coordinate, fetcher)
    }

    pub fn data_fetcher(&self, coordinate: &FieldCoordinate) -> Option<&Arc<dyn DataFetcher>> {
        self.data_fetchers.get(coordinate)
    }

    /// Looks up a data fetcher by type and field name.
    pub fn data_fetcher_for(&self, type_name: &str, field_name: &str) -> Option<&Arc<dyn DataFetcher>> {
        self.data_fetchers
            .iter()
            .find(|(coordinate, _)| {
                coordinate.type_name.as_str() == type_name
                    && coordinate.field_name.as_str() == field_name
            })
            .map(|(_, fetcher)| fetcher)
    }

    pub fn contains(&self, coordinate: &FieldCoordinate) -> bool {
        self.data_fetchers.contains_key(coordinate)
    }

    /// Coordinates having a data fetcher, sorted.
    pub fn coordinates(&self) -> Vec<&FieldCoordinate> {
        let mut coordinates: Vec<_> = self.data_fetchers.keys().collect();
        coordinates.sort_by_key(|coordinate| coordinate.to_string());
        coordinates
    }

    pub fn len(&self) -> usize {
        self.data_fetchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_fetchers.is_empty()
    }
}

impl fmt::Debug for CodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeRegistry")
            .field("data_fetchers", &self.coordinates())
            .finish()
    }
}
