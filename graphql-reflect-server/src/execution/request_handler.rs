use std::sync::Arc;

use graphql_reflect::Context;
use graphql_reflect::graphql;

use super::ExecutionEngine;
use super::execution_error;

/// Executes queries and mutations.
#[derive(Clone)]
pub struct GraphQLRequestHandler {
    engine: Arc<dyn ExecutionEngine>,
}

impl GraphQLRequestHandler {
    pub fn new(engine: Arc<dyn ExecutionEngine>) -> Self {
        GraphQLRequestHandler { engine }
    }

    /// Executes `request`. Engine failures are reported as a response with a single error.
    pub async fn execute_request(
        &self,
        request: graphql::Request,
        context: Context,
    ) -> graphql::Response {
        let operation_name = request.operation_name.clone();
        match self.engine.execute(request, context).await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(?operation_name, %error, "failed to execute request");
                execution_error(&error)
            }
        }
    }
}
