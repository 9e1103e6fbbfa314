use std::sync::Arc;

use graphql_reflect::Context;
use graphql_reflect::SchemaGenerationError;
use graphql_reflect::TopLevelObject;
use graphql_reflect::graphql;
use graphql_reflect::reflect::ClassDescriptor;
use graphql_reflect::reflect::FunctionDescriptor;
use graphql_reflect::reflect::TypeDescriptor;
use graphql_reflect_server::Configuration;
use graphql_reflect_server::GraphQLRequestHandler;
use graphql_reflect_server::SchemaSources;
use graphql_reflect_server::build_schema;
use pretty_assertions::assert_eq;
use serde_json_bytes::json;

use crate::fixtures::RootFieldEngine;
use crate::fixtures::clock;

fn sources() -> SchemaSources {
    SchemaSources::new(clock())
        .with_query(TopLevelObject::new("clock::Query"))
        .with_subscription(TopLevelObject::new("clock::Ticks"))
}

#[test_log::test]
fn builds_a_plain_schema() {
    let generated = build_schema(&Configuration::default(), sources()).unwrap();
    let sdl = generated.sdl();
    assert!(sdl.contains("type Query {\n  now: Long!\n}"));
    assert!(sdl.contains("type Subscription {\n  ticks(count: Int!): Int!\n}"));
    assert!(!sdl.contains("_service"));
}

#[test_log::test]
fn builds_a_federated_schema_when_enabled() {
    let configuration = Configuration::from_yaml("federation:\n  enabled: true\n").unwrap();
    let generated = build_schema(&configuration, sources()).unwrap();
    let sdl = generated.sdl();
    assert!(sdl.contains("type Query {\n  now: Long!\n  _service: _Service!\n}"));
    assert!(sdl.contains("directive @key(fields: _FieldSet!) repeatable on OBJECT | INTERFACE"));
    // No class is an entity.
    assert!(!sdl.contains("_entities"));
}

#[test]
fn packages_restrict_the_reflected_classes() {
    let mut registry = clock();
    registry
        .register(ClassDescriptor::object("calendar::Day"))
        .register(
            ClassDescriptor::object("clock::Query")
                .function(FunctionDescriptor::new("today", TypeDescriptor::of("calendar::Day"))),
        );
    let configuration = Configuration::from_yaml("packages:\n  - clock\n").unwrap();
    let error = build_schema(
        &configuration,
        SchemaSources::new(registry).with_query(TopLevelObject::new("clock::Query")),
    )
    .unwrap_err();
    assert!(
        matches!(&error, SchemaGenerationError::TypeNotSupported { type_name, .. } if type_name == "calendar::Day"),
        "{error}"
    );
}

#[tokio::test]
async fn requests_are_executed_against_the_generated_schema() {
    let generated = build_schema(&Configuration::default(), sources()).unwrap();
    let handler = GraphQLRequestHandler::new(Arc::new(RootFieldEngine { generated }));

    let response = handler
        .execute_request(
            graphql::Request {
                query: Some("query now { now }".to_string()),
                operation_name: Some("now".to_string()),
                ..Default::default()
            },
            Context::new(),
        )
        .await;
    assert_eq!(response.data, Some(json!({"now": 42})));

    let response = handler
        .execute_request(graphql::Request::default(), Context::new())
        .await;
    assert_eq!(response.data, None);
    assert_eq!(response.errors[0].message, "missing operation name");
}
