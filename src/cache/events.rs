//! Invalidation notifications
//!
//! Lets other parts of the client (another view, a background refresher) learn
//! that cached responses were dropped, without inspecting storage themselves.

use tokio::sync::broadcast;

/// Default number of events buffered per subscriber
const CHANNEL_CAPACITY: usize = 64;

/// Something happened to the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// These cache keys were invalidated after a successful mutation
    Invalidated { keys: Vec<String> },
    /// Every cache entry was cleared
    Cleared,
}

/// Broadcast channel for cache events
#[derive(Debug, Clone)]
pub struct CacheEvents {
    sender: broadcast::Sender<CacheEvent>,
}

impl Default for CacheEvents {
    fn default() -> Self {
        Self::new(CHANNEL_CAPACITY)
    }
}

impl CacheEvents {
    /// Creates a channel buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns a receiver for events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.sender.subscribe()
    }

    /// Publishes `event` to every current subscriber
    ///
    /// Returns the number of subscribers reached; having none is fine.
    pub fn publish(&self, event: CacheEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let events = CacheEvents::default();
        assert_eq!(events.publish(CacheEvent::Cleared), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let events = CacheEvents::default();
        let mut receiver = events.subscribe();

        let reached = events.publish(CacheEvent::Invalidated {
            keys: vec!["/posts/abc".to_string()],
        });

        assert_eq!(reached, 1);
        assert_eq!(
            receiver.recv().await.unwrap(),
            CacheEvent::Invalidated {
                keys: vec!["/posts/abc".to_string()]
            }
        );
    }
}
