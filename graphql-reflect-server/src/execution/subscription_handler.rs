use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use graphql_reflect::Context;
use graphql_reflect::graphql;

use super::ExecutionEngine;
use super::execution_error;

/// Executes subscriptions.
#[derive(Clone)]
pub struct SubscriptionHandler {
    engine: Arc<dyn ExecutionEngine>,
}

impl SubscriptionHandler {
    pub fn new(engine: Arc<dyn ExecutionEngine>) -> Self {
        SubscriptionHandler { engine }
    }

    /// Streams the responses of the subscription `request`.
    ///
    /// When the engine fails to start the subscription, the stream yields one response with a
    /// single error.
    pub async fn execute_subscription(
        &self,
        request: graphql::Request,
        context: Context,
    ) -> graphql::ResponseStream {
        match self.engine.subscribe(request, context).await {
            Ok(responses) => responses,
            Err(error) => {
                tracing::error!(%error, "failed to start subscription");
                stream::once(async move { execution_error(&error) }).boxed()
            }
        }
    }
}
