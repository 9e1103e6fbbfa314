use std::sync::Arc;

use apollo_compiler::Name;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json_bytes::Value;

use super::DataFetcher;
use super::DataFetchingEnvironment;
use super::FetchOutput;
use super::FieldCoordinate;
use super::Invoker;
use super::coerce_argument;
use crate::context::Context;
use crate::error::FetchError;
use crate::reflect::ClassRegistry;
use crate::reflect::TypeDescriptor;

/// How a declared parameter is fed when the function is invoked.
#[derive(Clone, Debug)]
pub(crate) enum ParameterBinding {
    Context,
    Environment,
    /// Excluded from the schema; receives null.
    Ignored,
    /// `id` marks parameters exposed as `ID`.
    Argument { name: Name, ty: TypeDescriptor, id: bool },
}

/// The value passed for one declared parameter.
#[derive(Clone, Debug)]
pub enum ParameterValue {
    Value(Value),
    Context(Context),
    Environment(Box<DataFetchingEnvironment>),
}

/// A call of a host function, as received by its invoker.
#[derive(Clone, Debug)]
pub struct Invocation {
    receiver: Value,
    parameters: Vec<(String, ParameterValue)>,
    context: Context,
    coordinate: FieldCoordinate,
}

impl Invocation {
    /// The object the function is called on: the bound instance or the resolution source.
    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn coordinate(&self) -> &FieldCoordinate {
        &self.coordinate
    }

    /// Parameter values in declaration order.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.parameters
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// The converted value of the parameter named `name`.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find_map(|(parameter, value)| match value {
                ParameterValue::Value(value) if parameter == name => Some(value),
                _ => None,
            })
    }

    /// Deserializes the parameter named `name`.
    pub fn argument<T: DeserializeOwned>(&self, name: &str) -> Result<T, FetchError> {
        let value = self.value(name).cloned().unwrap_or_default();
        serde_json_bytes::from_value(value).map_err(|error| FetchError::InvalidArgument {
            argument: name.to_string(),
            reason: error.to_string(),
        })
    }

    /// A [`FetchError::ResolverFailed`] for this invocation.
    pub fn failure(&self, reason: impl ToString) -> FetchError {
        FetchError::ResolverFailed {
            coordinate: self.coordinate.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Resolves a field by invoking a host function.
pub struct FunctionDataFetcher {
    target: Option<Value>,
    parameters: Vec<(String, ParameterBinding)>,
    invoker: Invoker,
    registry: Arc<ClassRegistry>,
}

impl FunctionDataFetcher {
    pub(crate) fn new(
        target: Option<Value>,
        parameters: Vec<(String, ParameterBinding)>,
        invoker: Invoker,
        registry: Arc<ClassRegistry>,
    ) -> Self {
        FunctionDataFetcher {
            target,
            parameters,
            invoker,
            registry,
        }
    }

    fn parameter_value(
        &self,
        binding: &ParameterBinding,
        environment: &DataFetchingEnvironment,
    ) -> Result<ParameterValue, FetchError> {
        Ok(match binding {
            ParameterBinding::Context => ParameterValue::Context(environment.context.clone()),
            ParameterBinding::Environment => {
                ParameterValue::Environment(Box::new(environment.clone()))
            }
            ParameterBinding::Ignored => ParameterValue::Value(Value::Null),
            ParameterBinding::Argument { name, ty, id } => {
                let given = environment
                    .arguments
                    .get(name.as_str())
                    .cloned()
                    .unwrap_or_default();
                ParameterValue::Value(coerce_argument(&self.registry, name.as_str(), given, ty, *id)?)
            }
        })
    }
}

#[async_trait]
impl DataFetcher for FunctionDataFetcher {
    async fn fetch(&self, environment: DataFetchingEnvironment) -> Result<FetchOutput, FetchError> {
        let receiver = match &self.target {
            Some(target) => target.clone(),
            None if environment.source.is_null() => return Ok(FetchOutput::Value(Value::Null)),
            None => environment.source.clone(),
        };
        let parameters = self
            .parameters
            .iter()
            .map(|(name, binding)| Ok((name.clone(), self.parameter_value(binding, &environment)?)))
            .collect::<Result<Vec<_>, FetchError>>()?;
        let invocation = Invocation {
            receiver,
            parameters,
            context: environment.context,
            coordinate: environment.coordinate,
        };
        (self.invoker)(invocation).await
    }
}

#[cfg(test)]
mod tests {
    use apollo_compiler::name;
    use futures::FutureExt;
    use serde_json_bytes::json;

    use super::*;

    fn greeter() -> FunctionDataFetcher {
        let invoker: Invoker = Arc::new(|invocation: Invocation| {
            async move {
                let name: String = invocation.argument("name")?;
                let greeting = invocation
                    .receiver()
                    .as_object()
                    .and_then(|source| source.get("greeting"))
                    .and_then(|greeting| greeting.as_str())
                    .unwrap_or("Hello")
                    .to_string();
                let user: Option<String> = invocation
                    .parameters()
                    .find_map(|(_, value)| match value {
                        ParameterValue::Context(context) => context.get("user").ok().flatten(),
                        _ => None,
                    });
                let greeting = format!("{greeting} {name} from {}", user.unwrap_or_default());
                Ok::<FetchOutput, FetchError>(json!(greeting).into())
            }
            .boxed()
        });
        FunctionDataFetcher::new(
            None,
            vec![
                (
                    "name".to_string(),
                    ParameterBinding::Argument {
                        name: name!("name"),
                        ty: TypeDescriptor::string(),
                        id: false,
                    },
                ),
                ("context".to_string(), ParameterBinding::Context),
            ],
            invoker,
            Arc::new(ClassRegistry::new()),
        )
    }

    fn environment(source: Value, arguments: Value) -> DataFetchingEnvironment {
        let context = Context::new();
        context.insert("user", "ada".to_string()).unwrap();
        DataFetchingEnvironment::new(
            FieldCoordinate::new(name!("Query"), name!("greet")),
            source,
            arguments.as_object().cloned().unwrap_or_default(),
            context,
        )
    }

    #[tokio::test]
    async fn invokes_on_source_with_context_and_arguments() {
        let output = greeter()
            .fetch(environment(json!({"greeting": "Hi"}), json!({"name": "Bob"})))
            .await
            .unwrap();
        assert_eq!(output.value(), Some(&json!("Hi Bob from ada")));
    }

    #[tokio::test]
    async fn null_source_resolves_to_null() {
        let output = greeter()
            .fetch(environment(Value::Null, json!({"name": "Bob"})))
            .await
            .unwrap();
        assert_eq!(output.value(), Some(&Value::Null));
    }

    #[tokio::test]
    async fn missing_argument_is_rejected() {
        let error = greeter()
            .fetch(environment(json!({}), json!({})))
            .await
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid value for argument 'name': null given for a non-null value"
        );
    }
}
