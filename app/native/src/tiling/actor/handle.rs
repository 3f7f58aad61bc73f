//! Handle for communicating with the state actor.
//!
//! The `StateActorHandle` provides a safe, cloneable interface for sending
//! events and hotkey actions to the state actor and querying its state.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use super::messages::{QueryResult, StateMessage, StateQuery};
use crate::hotkey::HotkeyAction;
use crate::tiling::constants::timing::QUERY_TIMEOUT_MS;
use crate::tiling::state::{TilingSnapshot, WindowId, WindowSnapshot};

/// Error types for actor communication.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    /// Failed to send message to actor.
    #[error("Failed to send message to actor: channel closed")]
    SendFailed,

    /// Failed to receive response from actor.
    #[error("Failed to receive response from actor: channel closed")]
    ReceiveFailed,

    /// Query timed out.
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// The actor answered with a different result than the query asked for.
    #[error("Unexpected query result")]
    UnexpectedResult,
}

/// Handle for communicating with the state actor.
///
/// This handle is cheap to clone and can be shared across tasks.
#[derive(Clone, Debug)]
pub struct StateActorHandle {
    sender: mpsc::Sender<StateMessage>,
}

impl StateActorHandle {
    /// Create a new handle with the given sender.
    pub(crate) const fn new(sender: mpsc::Sender<StateMessage>) -> Self { Self { sender } }

    /// Whether the actor has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.sender.is_closed() }

    // ========================================================================
    // Fire-and-forget sending
    // ========================================================================

    /// Send a message to the actor without waiting for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn send(&self, msg: StateMessage) -> Result<(), ActorError> {
        self.sender.try_send(msg).map_err(|_| ActorError::SendFailed)
    }

    /// Send a message to the actor and wait for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed.
    pub async fn send_async(&self, msg: StateMessage) -> Result<(), ActorError> {
        self.sender.send(msg).await.map_err(|_| ActorError::SendFailed)
    }

    /// Queue a hotkey action for the focused window.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed.
    pub async fn dispatch(&self, action: HotkeyAction) -> Result<(), ActorError> {
        self.send_async(StateMessage::Hotkey(action)).await
    }

    /// Ask the actor to stop.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor already stopped.
    pub async fn shutdown(&self) -> Result<(), ActorError> { self.send_async(StateMessage::Shutdown).await }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Execute a query and wait for the result.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed, or
    /// [`ActorError::ReceiveFailed`] if the response channel is closed.
    pub async fn query(&self, query: StateQuery) -> Result<QueryResult, ActorError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(StateMessage::Query { query, respond_to: tx })
            .await
            .map_err(|_| ActorError::SendFailed)?;

        rx.await.map_err(|_| ActorError::ReceiveFailed)
    }

    /// Execute a query with a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Timeout`] if the query doesn't complete in time,
    /// or any error from [`Self::query`].
    pub async fn query_timeout(&self, query: StateQuery, timeout: Duration) -> Result<QueryResult, ActorError> {
        tokio::time::timeout(timeout, self.query(query))
            .await
            .map_err(|_| ActorError::Timeout(timeout))?
    }

    // ========================================================================
    // Convenience query methods
    // ========================================================================

    /// Copy of the whole tiling state.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn snapshot(&self) -> Result<TilingSnapshot, ActorError> {
        let timeout = Duration::from_millis(QUERY_TIMEOUT_MS);
        match self.query_timeout(StateQuery::Snapshot, timeout).await? {
            QueryResult::Snapshot(snapshot) => Ok(snapshot),
            QueryResult::Window(_) => Err(ActorError::UnexpectedResult),
        }
    }

    /// One cached window, `None` if it is not tracked.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn window(&self, id: WindowId) -> Result<Option<WindowSnapshot>, ActorError> {
        let timeout = Duration::from_millis(QUERY_TIMEOUT_MS);
        match self.query_timeout(StateQuery::GetWindow { id }, timeout).await? {
            QueryResult::Window(window) => Ok(window),
            QueryResult::Snapshot(_) => Err(ActorError::UnexpectedResult),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_after_receiver_dropped_fails() {
        let (sender, receiver) = mpsc::channel(4);
        drop(receiver);
        let handle = StateActorHandle::new(sender);

        assert!(handle.is_closed());
        assert!(matches!(handle.send(StateMessage::Shutdown), Err(ActorError::SendFailed)));
        assert!(matches!(handle.dispatch(HotkeyAction::Maximize).await, Err(ActorError::SendFailed)));
    }

    #[tokio::test]
    async fn test_query_fails_when_responder_dropped() {
        let (sender, mut receiver) = mpsc::channel(4);
        let handle = StateActorHandle::new(sender);

        let responder = tokio::spawn(async move {
            // Drop the response channel without answering.
            if let Some(StateMessage::Query { respond_to, .. }) = receiver.recv().await {
                drop(respond_to);
            }
        });

        let result = handle.query(StateQuery::Snapshot).await;
        assert!(matches!(result, Err(ActorError::ReceiveFailed)));
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_query_timeout() {
        let (sender, _receiver) = mpsc::channel(4);
        let handle = StateActorHandle::new(sender);

        let result = handle.query_timeout(StateQuery::Snapshot, Duration::from_millis(20)).await;
        assert!(matches!(result, Err(ActorError::Timeout(_))));
    }

    #[test]
    fn test_error_messages() {
        assert!(ActorError::SendFailed.to_string().contains("channel closed"));
        assert!(ActorError::Timeout(Duration::from_millis(5)).to_string().contains("5ms"));
    }
}
