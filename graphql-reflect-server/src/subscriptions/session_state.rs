//! Subscriptions running on each WebSocket connection.

use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use super::protocol::OperationMessage;
use super::protocol::ServerMessageType;

/// One WebSocket connection.
///
/// Its token is cancelled when the session is terminated. The transport closes the connection
/// once it observes the cancellation. Tokens of the subscriptions running on the connection are
/// children of it.
#[derive(Clone, Debug)]
pub struct SubscriptionSession {
    id: String,
    closed: CancellationToken,
}

impl SubscriptionSession {
    pub fn new(id: impl Into<String>) -> Self {
        SubscriptionSession {
            id: id.into(),
            closed: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Completes once the session is terminated.
    pub async fn closed(&self) {
        self.closed.cancelled().await
    }

    /// A token cancelled at the latest when the session is terminated.
    pub(crate) fn child_token(&self) -> CancellationToken {
        self.closed.child_token()
    }

    fn close(&self) {
        self.closed.cancel();
    }
}

/// Keep-alive timers and running operations, by session id.
///
/// Subscriptions are stopped through their cancellation tokens.
#[derive(Debug, Default)]
pub struct SubscriptionSessionState {
    keep_alive: DashMap<String, CancellationToken>,
    operations: DashMap<String, HashMap<String, RunningOperation>>,
    started: AtomicU64,
}

#[derive(Debug)]
struct RunningOperation {
    /// Tells a restarted operation apart from the one it replaced.
    generation: u64,
    subscription: CancellationToken,
}

impl SubscriptionSessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves the keep-alive timer of `session`, stopped when the session is terminated.
    ///
    /// Returns `false` without saving anything once the session is terminated.
    pub fn save_keep_alive_subscription(
        &self,
        session: &SubscriptionSession,
        subscription: CancellationToken,
    ) -> bool {
        if session.is_closed() {
            return false;
        }
        if let Some(replaced) = self
            .keep_alive
            .insert(session.id().to_string(), subscription)
        {
            replaced.cancel();
        }
        if session.is_closed() {
            // terminated while saving
            if let Some((_, keep_alive)) = self.keep_alive.remove(session.id()) {
                keep_alive.cancel();
            }
            return false;
        }
        true
    }

    /// Saves the running operation `operation_id` of `session`.
    ///
    /// An operation already running under the same id is cancelled and replaced. Returns the
    /// generation identifying this run of the operation, or `None` without saving anything once
    /// the session is terminated.
    pub fn save_operation(
        &self,
        session: &SubscriptionSession,
        operation_id: &str,
        subscription: CancellationToken,
    ) -> Option<u64> {
        if session.is_closed() {
            return None;
        }
        let generation = self.started.fetch_add(1, Ordering::Relaxed);
        let replaced = self
            .operations
            .entry(session.id().to_string())
            .or_default()
            .insert(
                operation_id.to_string(),
                RunningOperation {
                    generation,
                    subscription,
                },
            );
        if let Some(replaced) = replaced {
            tracing::warn!(
                session = session.id(),
                operation_id,
                "operation started again, cancelling the running one"
            );
            replaced.subscription.cancel();
        }
        if session.is_closed() {
            // terminated while saving
            if let Some(running) = self.remove_operation(session, operation_id) {
                running.subscription.cancel();
            }
            return None;
        }
        Some(generation)
    }

    /// Stops the operation `operation_id` of `session`, without terminating the session.
    ///
    /// Returns the `complete` message acknowledging the stop, or `None` if no such operation is
    /// running.
    pub fn stop_operation(
        &self,
        session: &SubscriptionSession,
        operation_id: &str,
    ) -> Option<OperationMessage> {
        let running = self.remove_operation(session, operation_id)?;
        running.subscription.cancel();
        Some(OperationMessage::new(ServerMessageType::Complete).with_id(operation_id))
    }

    /// Forgets an operation that completed on its own.
    ///
    /// Does nothing if the operation was restarted since `generation` started.
    pub(crate) fn finish_operation(
        &self,
        session: &SubscriptionSession,
        operation_id: &str,
        generation: u64,
    ) {
        let mut emptied = false;
        if let Some(mut operations) = self.operations.get_mut(session.id()) {
            let current = operations
                .get(operation_id)
                .is_some_and(|running| running.generation == generation);
            if current {
                operations.remove(operation_id);
            }
            emptied = operations.is_empty();
        }
        if emptied {
            self.operations
                .remove_if(session.id(), |_, operations| operations.is_empty());
        }
    }

    /// Closes `session`, then stops its keep-alive timer and every operation.
    ///
    /// Terminating a terminated session does nothing.
    pub fn terminate_session(&self, session: &SubscriptionSession) {
        session.close();
        if let Some((_, operations)) = self.operations.remove(session.id()) {
            for running in operations.into_values() {
                running.subscription.cancel();
            }
        }
        if let Some((_, keep_alive)) = self.keep_alive.remove(session.id()) {
            keep_alive.cancel();
        }
    }

    /// Whether the operation `operation_id` of `session` is running.
    pub fn operation_exists(&self, session: &SubscriptionSession, operation_id: &str) -> bool {
        self.operations
            .get(session.id())
            .is_some_and(|operations| operations.contains_key(operation_id))
    }

    /// The number of operations running on `session`.
    pub fn active_operations(&self, session: &SubscriptionSession) -> usize {
        self.operations
            .get(session.id())
            .map_or(0, |operations| operations.len())
    }

    pub fn has_keep_alive(&self, session: &SubscriptionSession) -> bool {
        self.keep_alive.contains_key(session.id())
    }

    fn remove_operation(
        &self,
        session: &SubscriptionSession,
        operation_id: &str,
    ) -> Option<RunningOperation> {
        let mut operations = self.operations.get_mut(session.id())?;
        let running = operations.remove(operation_id);
        let emptied = operations.is_empty();
        drop(operations);
        if emptied {
            self.operations
                .remove_if(session.id(), |_, operations| operations.is_empty());
        }
        running
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn stop_cancels_and_acknowledges() {
        let state = SubscriptionSessionState::new();
        let session = SubscriptionSession::new("s1");
        let operation = session.child_token();
        state.save_operation(&session, "1", operation.clone());
        assert!(state.operation_exists(&session, "1"));

        let complete = state.stop_operation(&session, "1").unwrap();
        assert_eq!(complete.to_json().unwrap(), r#"{"type":"complete","id":"1"}"#);
        assert!(operation.is_cancelled());
        assert!(!state.operation_exists(&session, "1"));
        assert!(!session.is_closed());
    }

    #[test]
    fn stopping_an_unknown_operation_does_nothing() {
        let state = SubscriptionSessionState::new();
        let session = SubscriptionSession::new("s1");
        assert_eq!(state.stop_operation(&session, "42"), None);
    }

    #[test]
    fn restarting_an_operation_cancels_the_running_one() {
        let state = SubscriptionSessionState::new();
        let session = SubscriptionSession::new("s1");
        let first = session.child_token();
        let second = session.child_token();
        let replaced = state.save_operation(&session, "1", first.clone()).unwrap();
        let current = state.save_operation(&session, "1", second.clone()).unwrap();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(state.active_operations(&session), 1);

        state.finish_operation(&session, "1", replaced);
        assert!(state.operation_exists(&session, "1"));
        state.finish_operation(&session, "1", current);
        assert!(!state.operation_exists(&session, "1"));
    }

    #[test]
    fn terminate_cancels_everything_once() {
        let state = SubscriptionSessionState::new();
        let session = SubscriptionSession::new("s1");
        let other = SubscriptionSession::new("s2");
        let keep_alive = session.child_token();
        let operations = [session.child_token(), session.child_token()];
        let untouched = other.child_token();
        state.save_keep_alive_subscription(&session, keep_alive.clone());
        state.save_operation(&session, "1", operations[0].clone());
        state.save_operation(&session, "2", operations[1].clone());
        state.save_operation(&other, "1", untouched.clone());

        state.terminate_session(&session);
        assert!(keep_alive.is_cancelled());
        assert!(operations.iter().all(CancellationToken::is_cancelled));
        assert_eq!(state.active_operations(&session), 0);
        assert!(!state.has_keep_alive(&session));
        assert!(session.is_closed());

        state.terminate_session(&session);
        assert_eq!(state.active_operations(&session), 0);
        assert!(!untouched.is_cancelled());
        assert!(state.operation_exists(&other, "1"));
    }

    #[test]
    fn terminated_sessions_accept_nothing_new() {
        let state = SubscriptionSessionState::new();
        let session = SubscriptionSession::new("s1");
        state.terminate_session(&session);

        assert_eq!(state.save_operation(&session, "1", session.child_token()), None);
        assert!(!state.save_keep_alive_subscription(&session, session.child_token()));
        assert_eq!(state.active_operations(&session), 0);
        assert!(!state.operation_exists(&session, "1"));
        assert!(!state.has_keep_alive(&session));
    }
}
