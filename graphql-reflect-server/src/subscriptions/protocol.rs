//! Messages of the legacy `graphql-ws` protocol, also known as subscriptions-transport-ws.
//!
//! <https://github.com/apollographql/subscriptions-transport-ws/blob/master/PROTOCOL.md>

use graphql_reflect::graphql;
use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::Value;
use strum_macros::AsRefStr;
use strum_macros::Display;
use strum_macros::EnumString;

/// WebSocket subprotocol name of the protocol.
pub const GRAPHQL_WS_SUBPROTOCOL: &str = "graphql-ws";

/// Types of the messages sent by clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ClientMessageType {
    ConnectionInit,
    Start,
    Stop,
    ConnectionTerminate,
}

/// Types of the messages sent by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ServerMessageType {
    ConnectionAck,
    ConnectionError,
    #[strum(serialize = "ka")]
    KeepAlive,
    Data,
    Error,
    Complete,
}

/// The envelope of every message exchanged over the protocol.
///
/// The type is kept as text: clients may send types this server does not know.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payload: Option<Value>,
}

impl OperationMessage {
    pub fn new(message_type: ServerMessageType) -> Self {
        OperationMessage {
            message_type: message_type.to_string(),
            id: None,
            payload: None,
        }
    }

    pub fn client(message_type: ClientMessageType) -> Self {
        OperationMessage {
            message_type: message_type.to_string(),
            id: None,
            payload: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// `data`, or `error` when the response carries errors.
    pub(crate) fn from_response(id: &str, response: graphql::Response) -> Self {
        let message_type = if response.has_errors() {
            ServerMessageType::Error
        } else {
            ServerMessageType::Data
        };
        let message = OperationMessage::new(message_type).with_id(id);
        match serde_json_bytes::to_value(response) {
            Ok(payload) => message.with_payload(payload),
            Err(error) => {
                tracing::error!(%error, "could not serialize subscription response");
                OperationMessage::new(ServerMessageType::Error).with_id(id)
            }
        }
    }

    /// The type of a client message, if known.
    pub fn client_type(&self) -> Option<ClientMessageType> {
        self.message_type.parse().ok()
    }

    /// The type of a server message, if known.
    pub fn server_type(&self) -> Option<ServerMessageType> {
        self.message_type.parse().ok()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json_bytes::json;

    use super::*;

    #[rstest]
    #[case(ServerMessageType::ConnectionAck, "connection_ack")]
    #[case(ServerMessageType::ConnectionError, "connection_error")]
    #[case(ServerMessageType::KeepAlive, "ka")]
    #[case(ServerMessageType::Data, "data")]
    #[case(ServerMessageType::Error, "error")]
    #[case(ServerMessageType::Complete, "complete")]
    fn server_vocabulary(#[case] message_type: ServerMessageType, #[case] text: &str) {
        assert_eq!(message_type.as_ref(), text);
        assert_eq!(OperationMessage::new(message_type).server_type(), Some(message_type));
    }

    #[test]
    fn client_vocabulary() {
        let parsed = ["connection_init", "start", "stop", "connection_terminate", "subscribe"]
            .map(|text| text.parse::<ClientMessageType>().ok());
        assert_eq!(
            parsed,
            [
                Some(ClientMessageType::ConnectionInit),
                Some(ClientMessageType::Start),
                Some(ClientMessageType::Stop),
                Some(ClientMessageType::ConnectionTerminate),
                None,
            ]
        );
    }

    #[test]
    fn envelopes_omit_missing_members() {
        assert_eq!(
            OperationMessage::new(ServerMessageType::KeepAlive).to_json().unwrap(),
            r#"{"type":"ka"}"#
        );
        let message: OperationMessage = serde_json::from_str(
            r#"{"type":"start","id":"1","payload":{"query":"subscription { ticks }"}}"#,
        )
        .unwrap();
        assert_eq!(message.client_type(), Some(ClientMessageType::Start));
        assert_eq!(message.id.as_deref(), Some("1"));
        assert_eq!(
            message.payload,
            Some(json!({"query": "subscription { ticks }"}))
        );
    }

    #[test]
    fn responses_with_errors_are_sent_as_errors() {
        let data = OperationMessage::from_response(
            "1",
            graphql::Response {
                data: Some(json!({"ticks": 1})),
                ..Default::default()
            },
        );
        assert_eq!(
            data.to_json().unwrap(),
            r#"{"type":"data","id":"1","payload":{"data":{"ticks":1}}}"#
        );

        let error = OperationMessage::from_response(
            "1",
            graphql::Response::from_error(graphql::Error::builder().message("boom").build()),
        );
        assert_eq!(
            error.to_json().unwrap(),
            r#"{"type":"error","id":"1","payload":{"errors":[{"message":"boom"}]}}"#
        );
    }
}
