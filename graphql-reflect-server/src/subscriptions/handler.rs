use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::future;
use futures::stream;
use futures::stream::BoxStream;
use graphql_reflect::Context;
use graphql_reflect::graphql;
use tokio::time::Instant;
use tokio_stream::wrappers::IntervalStream;

use super::protocol::ClientMessageType;
use super::protocol::OperationMessage;
use super::protocol::ServerMessageType;
use super::session_state::SubscriptionSession;
use super::session_state::SubscriptionSessionState;
use crate::configuration::Subscriptions;
use crate::execution::SubscriptionHandler;

/// Answers the messages of the `graphql-ws` protocol received on WebSocket sessions.
///
/// Every incoming message is answered with a stream of outgoing messages. Streams answering
/// `start` and `connection_init` run until their operation is stopped or the session terminated.
#[derive(Clone)]
pub struct SubscriptionProtocolHandler {
    keep_alive_interval: Option<Duration>,
    subscription_handler: SubscriptionHandler,
    session_state: Arc<SubscriptionSessionState>,
}

impl SubscriptionProtocolHandler {
    pub fn new(configuration: &Subscriptions, subscription_handler: SubscriptionHandler) -> Self {
        SubscriptionProtocolHandler {
            keep_alive_interval: configuration.keep_alive(),
            subscription_handler,
            session_state: Arc::new(SubscriptionSessionState::new()),
        }
    }

    pub fn session_state(&self) -> &Arc<SubscriptionSessionState> {
        &self.session_state
    }

    /// Handles the text frame `payload` received on `session`.
    pub fn handle(
        &self,
        payload: &str,
        session: &SubscriptionSession,
        context: Context,
    ) -> BoxStream<'static, OperationMessage> {
        let message: OperationMessage = match serde_json::from_str(payload) {
            Ok(message) => message,
            Err(error) => {
                tracing::error!(session = session.id(), %error, "could not parse operation message");
                return connection_error(None);
            }
        };
        tracing::debug!(
            session = session.id(),
            message_type = %message.message_type,
            id = ?message.id,
            "received operation message"
        );

        let answers = match message.client_type() {
            Some(ClientMessageType::ConnectionInit) => self.on_connection_init(session),
            Some(ClientMessageType::Start) => self.on_start(message, session, context),
            Some(ClientMessageType::Stop) => {
                let complete = message
                    .id
                    .and_then(|id| self.session_state.stop_operation(session, &id));
                stream::iter(complete).boxed()
            }
            Some(ClientMessageType::ConnectionTerminate) => {
                self.session_state.terminate_session(session);
                stream::empty().boxed()
            }
            None => {
                tracing::error!(
                    session = session.id(),
                    message_type = %message.message_type,
                    "unknown operation message type"
                );
                if let Some(id) = &message.id {
                    self.session_state.stop_operation(session, id);
                }
                connection_error(message.id)
            }
        };

        let session_id = session.id().to_string();
        answers
            .inspect(move |message| {
                tracing::debug!(
                    session = %session_id,
                    message_type = %message.message_type,
                    id = ?message.id,
                    "sending operation message"
                )
            })
            .boxed()
    }

    fn on_connection_init(
        &self,
        session: &SubscriptionSession,
    ) -> BoxStream<'static, OperationMessage> {
        let ack = stream::once(future::ready(OperationMessage::new(
            ServerMessageType::ConnectionAck,
        )));
        let Some(interval) = self.keep_alive_interval else {
            return ack.boxed();
        };

        let subscription = session.child_token();
        if !self
            .session_state
            .save_keep_alive_subscription(session, subscription.clone())
        {
            tracing::error!(session = session.id(), "connection_init on a terminated session");
            return connection_error(None);
        }
        let keep_alive =
            IntervalStream::new(tokio::time::interval_at(Instant::now() + interval, interval))
                .map(|_| OperationMessage::new(ServerMessageType::KeepAlive))
                .take_until(subscription.cancelled_owned());
        ack.chain(keep_alive).boxed()
    }

    fn on_start(
        &self,
        message: OperationMessage,
        session: &SubscriptionSession,
        context: Context,
    ) -> BoxStream<'static, OperationMessage> {
        let Some(operation_id) = message.id else {
            tracing::error!(session = session.id(), "start message without an id");
            return connection_error(None);
        };
        let request = message.payload.and_then(|payload| {
            serde_json_bytes::from_value::<graphql::Request>(payload)
                .map_err(|error| {
                    tracing::error!(
                        session = session.id(),
                        %operation_id,
                        %error,
                        "invalid start payload"
                    )
                })
                .ok()
        });
        let Some(request) = request else {
            self.session_state.stop_operation(session, &operation_id);
            return connection_error(Some(operation_id));
        };

        let subscription = session.child_token();
        let Some(generation) =
            self.session_state
                .save_operation(session, &operation_id, subscription.clone())
        else {
            tracing::error!(session = session.id(), %operation_id, "start on a terminated session");
            return connection_error(Some(operation_id));
        };

        let handler = self.subscription_handler.clone();
        let id = operation_id.clone();
        let responses =
            stream::once(async move { handler.execute_subscription(request, context).await })
                .flatten()
                .map(move |response| OperationMessage::from_response(&id, response));

        let session_state = self.session_state.clone();
        let session = session.clone();
        let complete = stream::once(async move {
            session_state.finish_operation(&session, &operation_id, generation);
            OperationMessage::new(ServerMessageType::Complete).with_id(operation_id)
        });

        responses
            .chain(complete)
            .take_until(subscription.cancelled_owned())
            .boxed()
    }
}

fn connection_error(id: Option<String>) -> BoxStream<'static, OperationMessage> {
    let mut message = OperationMessage::new(ServerMessageType::ConnectionError);
    message.id = id;
    stream::once(future::ready(message)).boxed()
}
