//! Subscriptions over WebSocket, using the `graphql-ws` protocol.

mod handler;
pub mod protocol;
mod session_state;

pub use self::handler::SubscriptionProtocolHandler;
pub use self::session_state::SubscriptionSession;
pub use self::session_state::SubscriptionSessionState;
