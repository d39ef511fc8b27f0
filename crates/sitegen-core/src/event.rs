//! Event bus for sitegen using tokio::broadcast
//!
//! Screens subscribe to redraw when the session, the balance or an artifact
//! changes underneath them (for example from the background refresher).

use tokio::sync::broadcast;

/// Events emitted by the client core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A session was established (sign-in)
    SignedIn(String),
    /// The session was torn down (logout)
    SignedOut,
    /// A fresh token balance arrived
    BalanceUpdated(u64),
    /// A balance refresh failed (logged, never fatal)
    BalanceRefreshFailed(String),
    /// Tokens were purchased
    TokensPurchased(u64),
}

/// Event bus for broadcasting client events
///
/// Uses tokio::broadcast for multi-consumer support.
pub struct EventBus {
    sender: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create with default capacity (64 events)
    pub fn default_capacity() -> Self {
        Self::new(64)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: ClientEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive events
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::default_capacity()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let bus = EventBus::default_capacity();
        let mut rx = bus.subscribe();

        bus.publish(ClientEvent::BalanceUpdated(40_000));
        bus.publish(ClientEvent::SignedIn("u1".to_string()));

        assert_eq!(rx.recv().await.unwrap(), ClientEvent::BalanceUpdated(40_000));
        assert!(matches!(rx.recv().await.unwrap(), ClientEvent::SignedIn(id) if id == "u1"));
    }

    #[tokio::test]
    async fn test_clones_share_channel() {
        let bus = EventBus::default_capacity();
        let clone = bus.clone();
        let mut rx = bus.subscribe();

        clone.publish(ClientEvent::SignedOut);

        assert_eq!(rx.recv().await.unwrap(), ClientEvent::SignedOut);
        assert_eq!(clone.subscriber_count(), 1);
    }

    #[test]
    fn test_event_bus_no_subscribers_ok() {
        let bus = EventBus::default_capacity();
        bus.publish(ClientEvent::SignedOut);
    }
}
