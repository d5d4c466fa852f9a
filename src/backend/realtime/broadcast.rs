/**
 * Real-time Event Broadcasting
 *
 * Events travel through one `tokio::sync::broadcast` channel per namespace.
 * Each frame is wrapped in an `Envelope` that remembers which socket
 * produced it, so presence and typing updates can skip their sender.
 *
 * Sending is fire-and-forget: no subscribers is not an error, and nothing
 * here can fail the request that triggered the event.
 */

use crate::shared::RealtimeEvent;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Event plus the socket it came from, if any
#[derive(Debug, Clone)]
pub struct Envelope {
    pub event: RealtimeEvent,
    /// Connection id of the originating socket; `None` for server events
    pub origin: Option<Uuid>,
}

impl Envelope {
    pub fn new(event: RealtimeEvent) -> Self {
        Self { event, origin: None }
    }

    pub fn from_socket(event: RealtimeEvent, connection_id: Uuid) -> Self {
        Self {
            event,
            origin: Some(connection_id),
        }
    }

    /// Whether the socket `connection_id` should receive this envelope
    pub fn is_for(&self, connection_id: Uuid) -> bool {
        self.origin != Some(connection_id)
    }
}

/// Sender side of one namespace
pub type RealtimeEventBroadcast = broadcast::Sender<Envelope>;

/// Broadcast an envelope to all subscribers of a namespace
///
/// # Returns
///
/// Number of active subscribers that received the event (0 if no subscribers)
pub fn broadcast_event(broadcast_tx: &RealtimeEventBroadcast, envelope: Envelope) -> usize {
    let name = envelope.event.event_type.as_str();
    match broadcast_tx.send(envelope) {
        Ok(subscriber_count) => {
            tracing::debug!("[Realtime] '{}' sent to {} subscribers", name, subscriber_count);
            subscriber_count
        }
        Err(_) => {
            tracing::debug!("[Realtime] No subscribers for '{}'", name);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_event_with_subscribers() {
        let (tx, mut rx) = broadcast::channel::<Envelope>(16);

        let count = broadcast_event(&tx, Envelope::new(RealtimeEvent::members_updated()));
        assert_eq!(count, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event.event_type.as_str(), "channel:members_updated");
    }

    #[test]
    fn test_broadcast_event_no_subscribers() {
        let (tx, _) = broadcast::channel::<Envelope>(16);
        let count = broadcast_event(&tx, Envelope::new(RealtimeEvent::members_updated()));
        assert_eq!(count, 0);
    }

    #[test]
    fn test_envelope_skips_origin() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let envelope = Envelope::from_socket(RealtimeEvent::members_updated(), me);
        assert!(!envelope.is_for(me));
        assert!(envelope.is_for(other));
        assert!(Envelope::new(RealtimeEvent::members_updated()).is_for(me));
    }
}
