//! Session event broadcasting.
//!
//! Subscribers receive events as they happen; events sent while nobody is
//! subscribed are dropped.

use tokio::sync::broadcast;
use url::Url;

/// Default channel capacity.
const DEFAULT_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session came back out of a redirect or from storage.
    Restored {
        /// Canonical URL of the page, one-time auth parameters removed.
        url: Url,
        web_id: Option<String>,
    },
    LoggedOut,
}

/// Broadcasts session events to any number of subscribers.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SessionEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Sends `event`; returns the number of subscribers that received it.
    pub fn send(&self, event: SessionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> RestoreSubscription {
        RestoreSubscription {
            receiver: self.sender.subscribe(),
        }
    }
}

/// Receiving end handed out by `IdentityFlow::on_restore`.
#[derive(Debug)]
pub struct RestoreSubscription {
    receiver: broadcast::Receiver<SessionEvent>,
}

impl RestoreSubscription {
    /// Waits for the next event. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "session event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns an event if one is already queued.
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_to_every_subscriber() {
        let events = SessionEvents::default();
        let mut a = events.subscribe();
        let mut b = events.subscribe();

        assert_eq!(events.send(SessionEvent::LoggedOut), 2);
        assert_eq!(a.recv().await, Some(SessionEvent::LoggedOut));
        assert_eq!(b.try_recv(), Some(SessionEvent::LoggedOut));
        assert_eq!(b.try_recv(), None);
    }

    #[test]
    fn send_without_subscribers_is_dropped() {
        let events = SessionEvents::default();
        assert_eq!(events.send(SessionEvent::LoggedOut), 0);
    }

    #[tokio::test]
    async fn closed_channel_ends_subscription() {
        let events = SessionEvents::default();
        let mut sub = events.subscribe();
        drop(events);
        assert_eq!(sub.recv().await, None);
    }
}
