use graphql_reflect::FetchError;
use graphql_reflect::execution::FetchOutput;
use graphql_reflect::execution::Invocation;
use graphql_reflect::reflect::Annotations;
use graphql_reflect::reflect::ClassDescriptor;
use graphql_reflect::reflect::ClassRegistry;
use graphql_reflect::reflect::FunctionDescriptor;
use graphql_reflect::reflect::ParameterDescriptor;
use graphql_reflect::reflect::PropertyDescriptor;
use graphql_reflect::reflect::TypeDescriptor;
use graphql_reflect_federation::directives;
use serde_json_bytes::Value;
use serde_json_bytes::json;

/// A product catalog owning `Product` and extending the `Review` entity of another service.
pub(crate) fn products() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry
        .register(
            ClassDescriptor::object("products::Product")
                .with_annotations(Annotations::default().with_directive(directives::key("upc")))
                .property(PropertyDescriptor::new("upc", TypeDescriptor::string()))
                .property(PropertyDescriptor::new(
                    "name",
                    TypeDescriptor::string().nullable(),
                ))
                .function(FunctionDescriptor::new(
                    "reviews",
                    TypeDescriptor::list_of(TypeDescriptor::of("products::Review")),
                )),
        )
        .register(
            ClassDescriptor::object("products::Review")
                .with_annotations(
                    Annotations::default()
                        .with_directive(directives::extends())
                        .with_directive(directives::key("id")),
                )
                .property(
                    PropertyDescriptor::new("id", TypeDescriptor::string())
                        .with_annotations(Annotations::id().with_directive(directives::external())),
                )
                .property(PropertyDescriptor::new("body", TypeDescriptor::string())),
        )
        .register(
            ClassDescriptor::object("products::Query").function(
                FunctionDescriptor::new(
                    "topProducts",
                    TypeDescriptor::list_of(TypeDescriptor::of("products::Product")),
                )
                .parameter(ParameterDescriptor::new("first", TypeDescriptor::int()))
                .with_invoker(|invocation: Invocation| async move {
                    let first = invocation.argument::<usize>("first")?;
                    let products = (1..=first)
                        .map(|upc| json!({"upc": upc.to_string(), "name": format!("Product {upc}")}))
                        .collect::<Vec<_>>();
                    Ok::<FetchOutput, FetchError>(Value::Array(products).into())
                }),
            ),
        );
    registry
}

/// Like [`products`], but the key of the extended `Review` references a local field.
pub(crate) fn invalid_reviews() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry
        .register(
            ClassDescriptor::object("reviews::Review")
                .with_annotations(
                    Annotations::default()
                        .with_directive(directives::extends())
                        .with_directive(directives::key("id")),
                )
                .property(
                    PropertyDescriptor::new("id", TypeDescriptor::string())
                        .with_annotations(Annotations::id()),
                ),
        )
        .register(
            ClassDescriptor::object("reviews::Query").function(FunctionDescriptor::new(
                "review",
                TypeDescriptor::of("reviews::Review").nullable(),
            )),
        );
    registry
}
