use std::sync::Arc;

use apollo_compiler::name;
use graphql_reflect::SchemaGenerationError;
use graphql_reflect::SchemaGeneratorConfig;
use graphql_reflect::SchemaGeneratorHooks;
use graphql_reflect::TopLevelObject;
use graphql_reflect::execution::DataFetchingEnvironment;
use graphql_reflect::execution::FieldCoordinate;
use graphql_reflect::reflect::ClassDescriptor;
use graphql_reflect::reflect::FunctionDescriptor;
use graphql_reflect_federation::FederatedTypeRegistry;
use graphql_reflect_federation::to_federated_schema;
use pretty_assertions::assert_eq;
use serde_json_bytes::json;

use crate::fixtures::invalid_reviews;
use crate::fixtures::products;

#[test]
fn generates_the_federated_schema() {
    let generated = to_federated_schema(
        SchemaGeneratorConfig::default(),
        products(),
        FederatedTypeRegistry::default(),
        &[TopLevelObject::new("products::Query")],
        &[],
        &[],
    )
    .unwrap();
    insta::assert_snapshot!(generated.sdl(), @r###"
    schema {
      query: Query
    }

    """Marks target object as extending part of the federated schema"""
    directive @extends on OBJECT | INTERFACE

    """
    Marks target field as external meaning it will be resolved by federated schema
    """
    directive @external on FIELD_DEFINITION

    """Space separated list of primary keys needed to access federated object"""
    directive @key(fields: _FieldSet!) repeatable on OBJECT | INTERFACE

    """
    Specifies the base type field set that will be selectable by the gateway
    """
    directive @provides(fields: _FieldSet!) on FIELD_DEFINITION

    """Specifies required input field set from the base type for a resolver"""
    directive @requires(fields: _FieldSet!) on FIELD_DEFINITION

    type Product @key(fields: "upc") {
      upc: String!
      name: String
      reviews: [Review!]!
    }

    type Query {
      topProducts(first: Int!): [Product!]!
      _service: _Service!
      _entities(representations: [_Any!]!): [_Entity]!
    }

    type Review @extends @key(fields: "id") {
      id: ID! @external
      body: String!
    }

    scalar _Any

    union _Entity = Product | Review

    scalar _FieldSet

    type _Service {
      sdl: String!
    }
    "###);
}

#[tokio::test]
async fn service_returns_the_sdl_of_the_service() {
    let generated = to_federated_schema(
        SchemaGeneratorConfig::default(),
        products(),
        FederatedTypeRegistry::default(),
        &[TopLevelObject::new("products::Query")],
        &[],
        &[],
    )
    .unwrap();

    let coordinate = FieldCoordinate::new(name!("Query"), name!("_service"));
    let service = generated
        .code_registry
        .data_fetcher(&coordinate)
        .unwrap()
        .fetch(DataFetchingEnvironment::new(
            coordinate.clone(),
            json!({}),
            Default::default(),
            Default::default(),
        ))
        .await
        .unwrap();
    let service = service.value().cloned().unwrap();

    let coordinate = FieldCoordinate::new(name!("_Service"), name!("sdl"));
    let sdl = generated
        .code_registry
        .data_fetcher(&coordinate)
        .unwrap()
        .fetch(DataFetchingEnvironment::new(
            coordinate.clone(),
            service,
            Default::default(),
            Default::default(),
        ))
        .await
        .unwrap();
    let sdl = sdl.value().and_then(|sdl| sdl.as_str()).unwrap();
    insta::assert_snapshot!(sdl, @r###"
    type Product @key(fields: "upc") {
      upc: String!
      name: String
      reviews: [Review!]!
    }

    type Query {
      topProducts(first: Int!): [Product!]!
    }

    extend type Review @key(fields: "id") {
      id: ID! @external
      body: String!
    }
    "###);
}

#[test]
fn invalid_federation_directives_fail_generation() {
    let error = to_federated_schema(
        SchemaGeneratorConfig::default(),
        invalid_reviews(),
        FederatedTypeRegistry::default(),
        &[TopLevelObject::new("reviews::Query")],
        &[],
        &[],
    )
    .unwrap_err();
    assert!(matches!(error, SchemaGenerationError::Extension(_)));
    assert_eq!(
        error.to_string(),
        "invalid federated schema:\n - @key(fields: \"id\") directive on Review specifies invalid field set - extended type incorrectly references local field=id"
    );
}

/// Hides `Product.reviews`, the only field referencing `Review`.
struct WithoutReviews;

impl SchemaGeneratorHooks for WithoutReviews {
    fn is_valid_function(&self, _class: &ClassDescriptor, function: &FunctionDescriptor) -> bool {
        function.name != "reviews"
    }
}

#[test]
fn user_hooks_keep_being_called() {
    let generated = to_federated_schema(
        SchemaGeneratorConfig::default().with_hooks(Arc::new(WithoutReviews)),
        products(),
        FederatedTypeRegistry::default(),
        &[TopLevelObject::new("products::Query")],
        &[],
        &[],
    )
    .unwrap();
    let sdl = generated.sdl();
    assert!(!sdl.contains("reviews"));
    assert!(sdl.contains("union _Entity = Product\n"));
}

#[tokio::test]
async fn top_level_functions_still_resolve() {
    let generated = to_federated_schema(
        SchemaGeneratorConfig::default(),
        products(),
        FederatedTypeRegistry::default(),
        &[TopLevelObject::new("products::Query").with_instance(json!({}))],
        &[],
        &[],
    )
    .unwrap();
    let output = generated
        .code_registry
        .data_fetcher_for("Query", "topProducts")
        .unwrap()
        .fetch(DataFetchingEnvironment::new(
            FieldCoordinate::new(name!("Query"), name!("topProducts")),
            json!({}),
            json!({"first": 2}).as_object().cloned().unwrap(),
            Default::default(),
        ))
        .await
        .unwrap();
    assert_eq!(
        output.value(),
        Some(&json!([
            {"upc": "1", "name": "Product 1"},
            {"upc": "2", "name": "Product 2"},
        ]))
    );
}
