//! Request execution over an [`ExecutionEngine`].

mod request_handler;
mod subscription_handler;

use async_trait::async_trait;
use graphql_reflect::BoxError;
use graphql_reflect::Context;
use graphql_reflect::graphql;

pub use self::request_handler::GraphQLRequestHandler;
pub use self::subscription_handler::SubscriptionHandler;

/// Executes operations against a generated schema.
///
/// Parsing, validation and execution of operations happen in the engine. The engine resolves
/// fields through the data fetchers of the generated code registry.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Executes a query or mutation.
    async fn execute(
        &self,
        request: graphql::Request,
        context: Context,
    ) -> Result<graphql::Response, BoxError>;

    /// Executes a subscription, returning one response per published event.
    async fn subscribe(
        &self,
        request: graphql::Request,
        context: Context,
    ) -> Result<graphql::ResponseStream, BoxError>;
}

/// Error code of the responses reporting engine failures.
pub(crate) const EXECUTION_ERROR_CODE: &str = "EXECUTION_FAILED";

pub(crate) fn execution_error(error: &BoxError) -> graphql::Response {
    graphql::Response::from_error(
        graphql::Error::builder()
            .message(error.to_string())
            .extension_code(EXECUTION_ERROR_CODE)
            .build(),
    )
}
