use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use graphql_reflect::Context;
use graphql_reflect::FetchError;
use graphql_reflect::execution::DataFetcher;
use graphql_reflect::execution::DataFetchingEnvironment;
use graphql_reflect::execution::FetchOutput;
use graphql_reflect::graphql;
use graphql_reflect::graphql::Object;
use indexmap::IndexMap;
use serde_json_bytes::Value;

use super::FederatedTypeRegistry;

const REPRESENTATIONS_ARGUMENT: &str = "representations";
const TYPENAME_FIELD: &str = "__typename";
const ENTITY_RESOLUTION_ERROR_CODE: &str = "ENTITY_RESOLUTION_FAILED";

type Resolved = (usize, Result<Value, graphql::Error>);

/// Resolves `Query._entities`.
///
/// Representations are grouped by `__typename` and every group is resolved on its own task.
/// Entities are returned in the order of their representations. A representation that cannot be
/// resolved yields null along with one error, without affecting the others.
pub struct EntityResolver {
    registry: Arc<FederatedTypeRegistry>,
}

impl EntityResolver {
    pub fn new(registry: Arc<FederatedTypeRegistry>) -> Self {
        EntityResolver { registry }
    }

    pub async fn resolve(&self, context: &Context, representations: Vec<Value>) -> FetchOutput {
        let mut groups: IndexMap<String, Vec<(usize, Object)>> = IndexMap::new();
        let mut resolved: Vec<Resolved> = Vec::new();
        for (index, representation) in representations.into_iter().enumerate() {
            let type_name = representation
                .as_object()
                .and_then(|representation| representation.get(TYPENAME_FIELD))
                .and_then(|type_name| type_name.as_str())
                .map(str::to_string);
            match (type_name, representation) {
                (Some(type_name), Value::Object(representation)) => groups
                    .entry(type_name)
                    .or_default()
                    .push((index, representation)),
                (_, representation) => resolved.push(unresolvable(index, &representation)),
            }
        }

        let batches = groups.into_iter().map(|(type_name, batch)| {
            let registry = self.registry.clone();
            let context = context.clone();
            let indices: Vec<usize> = batch.iter().map(|(index, _)| *index).collect();
            let task = tokio::spawn(async move {
                resolve_type(&registry, &context, &type_name, batch).await
            });
            async move {
                match task.await {
                    Ok(resolved) => resolved,
                    Err(join_error) => {
                        tracing::error!(error = %join_error, "entity resolution task failed");
                        indices
                            .into_iter()
                            .map(|index| {
                                (
                                    index,
                                    Err(entity_error(format!(
                                        "Exception was thrown while trying to resolve federated entity at index {index}"
                                    ))),
                                )
                            })
                            .collect()
                    }
                }
            }
        });

        resolved.extend(join_all(batches).await.into_iter().flatten());
        resolved.sort_by_key(|(index, _)| *index);

        let mut data = Vec::with_capacity(resolved.len());
        let mut errors = Vec::new();
        for (index, result) in resolved {
            match result {
                Ok(entity) => data.push(entity),
                Err(mut error) => {
                    error.path = Some(vec![Value::from("_entities"), Value::from(index)]);
                    data.push(Value::Null);
                    errors.push(error);
                }
            }
        }
        FetchOutput::Partial {
            data: Value::Array(data),
            errors,
        }
    }
}

#[async_trait]
impl DataFetcher for EntityResolver {
    async fn fetch(&self, environment: DataFetchingEnvironment) -> Result<FetchOutput, FetchError> {
        let representations = match environment.arguments.get(REPRESENTATIONS_ARGUMENT) {
            Some(Value::Array(representations)) => representations.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(FetchError::InvalidArgument {
                    argument: REPRESENTATIONS_ARGUMENT.to_string(),
                    reason: "expected a list of representations".to_string(),
                });
            }
        };
        Ok(self.resolve(&environment.context, representations).await)
    }
}

/// Resolves the representations of one type, keeping their indices.
async fn resolve_type(
    registry: &FederatedTypeRegistry,
    context: &Context,
    type_name: &str,
    batch: Vec<(usize, Object)>,
) -> Vec<Resolved> {
    let Some(resolver) = registry.resolver(type_name) else {
        return batch
            .into_iter()
            .map(|(index, representation)| unresolvable(index, &Value::Object(representation)))
            .collect();
    };

    let (indices, representations): (Vec<usize>, Vec<Object>) = batch.into_iter().unzip();
    match resolver.resolve(context, representations.clone()).await {
        Ok(entities) if entities.len() == indices.len() => {
            indices.into_iter().zip(entities).collect()
        }
        Ok(entities) => {
            let message = format!(
                "Federation batch request for {} generated different number of results than requested, representations={}, results={}",
                resolver.type_name(),
                indices.len(),
                entities.len()
            );
            indices
                .into_iter()
                .map(|index| (index, Err(entity_error(message.clone()))))
                .collect()
        }
        Err(error) => {
            tracing::warn!(type_name = resolver.type_name(), %error, "federated type resolver failed");
            indices
                .into_iter()
                .zip(representations)
                .map(|(index, representation)| {
                    let message = format!(
                        "Exception was thrown while trying to resolve federated type, representation={}",
                        render(&Value::Object(representation))
                    );
                    (index, Err(entity_error(message)))
                })
                .collect()
        }
    }
}

/// A representation without a `__typename`, or naming a type without a resolver.
fn unresolvable(index: usize, representation: &Value) -> Resolved {
    let message = format!(
        "Unable to resolve federated type, representation={}",
        render(representation)
    );
    (index, Err(entity_error(message)))
}

fn render(representation: &Value) -> String {
    serde_json::to_string(representation).unwrap_or_default()
}

fn entity_error(message: String) -> graphql::Error {
    graphql::Error::builder()
        .message(message)
        .extension_code(ENTITY_RESOLUTION_ERROR_CODE)
        .build()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use graphql_reflect::BoxError;
    use pretty_assertions::assert_eq;
    use serde_json_bytes::json;

    use super::*;
    use crate::execution::FederatedTypeResolver;

    /// Resolves representations by echoing their `id`, after a delay.
    struct Echo {
        type_name: &'static str,
        delay: Duration,
    }

    #[async_trait]
    impl FederatedTypeResolver for Echo {
        fn type_name(&self) -> &str {
            self.type_name
        }

        async fn resolve(
            &self,
            _context: &Context,
            representations: Vec<Object>,
        ) -> Result<Vec<Result<Value, graphql::Error>>, BoxError> {
            tokio::time::sleep(self.delay).await;
            Ok(representations
                .into_iter()
                .map(|representation| {
                    Ok(json!({
                        "type": self.type_name,
                        "id": representation.get("id").cloned().unwrap_or_default(),
                    }))
                })
                .collect())
        }
    }

    struct Failing;

    #[async_trait]
    impl FederatedTypeResolver for Failing {
        fn type_name(&self) -> &str {
            "Broken"
        }

        async fn resolve(
            &self,
            _context: &Context,
            _representations: Vec<Object>,
        ) -> Result<Vec<Result<Value, graphql::Error>>, BoxError> {
            Err("database unavailable".into())
        }
    }

    struct Short;

    #[async_trait]
    impl FederatedTypeResolver for Short {
        fn type_name(&self) -> &str {
            "Short"
        }

        async fn resolve(
            &self,
            _context: &Context,
            _representations: Vec<Object>,
        ) -> Result<Vec<Result<Value, graphql::Error>>, BoxError> {
            Ok(Vec::new())
        }
    }

    /// Refuses odd ids one by one.
    struct EvenOnly;

    #[async_trait]
    impl FederatedTypeResolver for EvenOnly {
        fn type_name(&self) -> &str {
            "Even"
        }

        async fn resolve(
            &self,
            _context: &Context,
            representations: Vec<Object>,
        ) -> Result<Vec<Result<Value, graphql::Error>>, BoxError> {
            Ok(representations
                .into_iter()
                .map(|representation| match representation.get("id").and_then(Value::as_i64) {
                    Some(id) if id % 2 == 0 => Ok(json!({ "id": id })),
                    _ => Err(graphql::Error::builder()
                        .message("odd ids are not stocked")
                        .extension_code("NOT_STOCKED")
                        .build()),
                })
                .collect())
        }
    }

    fn resolver() -> EntityResolver {
        EntityResolver::new(Arc::new(FederatedTypeRegistry::new([
            Arc::new(Echo {
                type_name: "User",
                delay: Duration::from_millis(30),
            }) as Arc<dyn FederatedTypeResolver>,
            Arc::new(Echo {
                type_name: "Book",
                delay: Duration::from_millis(1),
            }),
            Arc::new(Failing),
            Arc::new(Short),
            Arc::new(EvenOnly),
        ])))
    }

    fn messages(output: &FetchOutput) -> Vec<&str> {
        output
            .errors()
            .iter()
            .map(|error| error.message.as_str())
            .collect()
    }

    #[test_log::test(tokio::test)]
    async fn entities_keep_the_order_of_representations() {
        let output = resolver()
            .resolve(
                &Context::new(),
                vec![
                    json!({"__typename": "User", "id": 1}),
                    json!({"__typename": "Book", "id": 2}),
                    json!({"__typename": "User", "id": 3}),
                    json!({"__typename": "Book", "id": 4}),
                ],
            )
            .await;
        assert_eq!(
            output.value(),
            Some(&json!([
                {"type": "User", "id": 1},
                {"type": "Book", "id": 2},
                {"type": "User", "id": 3},
                {"type": "Book", "id": 4},
            ]))
        );
        assert!(output.errors().is_empty());
    }

    #[tokio::test]
    async fn unknown_types_resolve_to_null_with_one_error() {
        let output = resolver()
            .resolve(
                &Context::new(),
                vec![
                    json!({"__typename": "User", "id": 1}),
                    json!({"id": 124}),
                    json!({"__typename": "Author", "id": 7}),
                ],
            )
            .await;
        assert_eq!(
            output.value(),
            Some(&json!([{"type": "User", "id": 1}, null, null]))
        );
        assert_eq!(
            messages(&output),
            vec![
                r#"Unable to resolve federated type, representation={"id":124}"#,
                r#"Unable to resolve federated type, representation={"__typename":"Author","id":7}"#,
            ]
        );
        assert_eq!(
            output.errors()[0].path,
            Some(vec![json!("_entities"), json!(1)])
        );
        assert_eq!(
            output.errors()[0].extensions.get("code"),
            Some(&json!("ENTITY_RESOLUTION_FAILED"))
        );
    }

    #[tokio::test]
    async fn failing_resolvers_do_not_affect_other_types() {
        let output = resolver()
            .resolve(
                &Context::new(),
                vec![
                    json!({"__typename": "Broken", "id": 1}),
                    json!({"__typename": "Book", "id": 2}),
                    json!({"__typename": "Short", "id": 3}),
                ],
            )
            .await;
        assert_eq!(
            output.value(),
            Some(&json!([null, {"type": "Book", "id": 2}, null]))
        );
        assert_eq!(
            messages(&output),
            vec![
                r#"Exception was thrown while trying to resolve federated type, representation={"__typename":"Broken","id":1}"#,
                "Federation batch request for Short generated different number of results than requested, representations=1, results=0",
            ]
        );
    }

    #[tokio::test]
    async fn errors_of_single_entities_keep_the_rest_of_the_batch() {
        let output = resolver()
            .resolve(
                &Context::new(),
                vec![
                    json!({"__typename": "Even", "id": 2}),
                    json!({"__typename": "Even", "id": 3}),
                    json!({"__typename": "Even", "id": 4}),
                ],
            )
            .await;
        assert_eq!(output.value(), Some(&json!([{"id": 2}, null, {"id": 4}])));
        assert_eq!(messages(&output), vec!["odd ids are not stocked"]);
        assert_eq!(
            output.errors()[0].path,
            Some(vec![json!("_entities"), json!(1)])
        );
        assert_eq!(
            output.errors()[0].extensions.get("code"),
            Some(&json!("NOT_STOCKED"))
        );
    }

    #[tokio::test]
    async fn representations_that_are_not_objects_are_reported_as_received() {
        let output = resolver()
            .resolve(
                &Context::new(),
                vec![json!("oops"), json!({"__typename": "Book", "id": 2})],
            )
            .await;
        assert_eq!(output.value(), Some(&json!([null, {"type": "Book", "id": 2}])));
        assert_eq!(
            messages(&output),
            vec![r#"Unable to resolve federated type, representation="oops""#]
        );
    }

    #[tokio::test]
    async fn representations_are_read_from_the_arguments() {
        let arguments = json!({"representations": [{"__typename": "Book", "id": 9}]});
        let environment = DataFetchingEnvironment::new(
            graphql_reflect::execution::FieldCoordinate::new(
                apollo_compiler::name!("Query"),
                apollo_compiler::name!("_entities"),
            ),
            Value::Null,
            arguments.as_object().cloned().unwrap_or_default(),
            Context::new(),
        );
        let output = resolver().fetch(environment).await.unwrap();
        assert_eq!(output.value(), Some(&json!([{"type": "Book", "id": 9}])));
    }
}
