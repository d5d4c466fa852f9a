//! Namespace registry for real-time fan-out.
//!
//! A namespace is the broadcast scope of one channel (`/channels/{name}`) or
//! one user (`/users/{id}`). Senders are created lazily on first subscribe
//! and live in a map behind a std mutex; the lock is never held across an
//! await.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::backend::realtime::broadcast::{broadcast_event, Envelope, RealtimeEventBroadcast};
use crate::shared::RealtimeEvent;

const NAMESPACE_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Keyed by normalized channel name
    Channel(String),
    User(Uuid),
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Channel(name) => write!(f, "/channels/{}", name),
            Namespace::User(id) => write!(f, "/users/{}", id),
        }
    }
}

#[derive(Clone, Default)]
pub struct RealtimeHub {
    namespaces: Arc<Mutex<HashMap<Namespace, RealtimeEventBroadcast>>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Namespace, RealtimeEventBroadcast>> {
        self.namespaces.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to a namespace, creating it if needed
    pub fn subscribe(&self, namespace: &Namespace) -> broadcast::Receiver<Envelope> {
        self.lock()
            .entry(namespace.clone())
            .or_insert_with(|| broadcast::channel(NAMESPACE_CAPACITY).0)
            .subscribe()
    }

    fn send(&self, namespace: &Namespace, envelope: Envelope) -> usize {
        let sender = self.lock().get(namespace).cloned();
        match sender {
            Some(tx) => broadcast_event(&tx, envelope),
            None => {
                tracing::debug!(
                    "[Realtime] No listeners on {} for '{}'",
                    namespace,
                    envelope.event.event_type.as_str()
                );
                0
            }
        }
    }

    /// Send a server event to every socket in a namespace
    pub fn emit(&self, namespace: &Namespace, event: RealtimeEvent) -> usize {
        self.send(namespace, Envelope::new(event))
    }

    /// Send an event to every socket in a namespace except `connection_id`
    pub fn emit_except(&self, namespace: &Namespace, event: RealtimeEvent, connection_id: Uuid) -> usize {
        self.send(namespace, Envelope::from_socket(event, connection_id))
    }

    /// Drop a namespace. Receivers drain what was already sent, then see
    /// `Closed`.
    pub fn close(&self, namespace: &Namespace) -> bool {
        let removed = self.lock().remove(namespace).is_some();
        if removed {
            tracing::info!("[Realtime] Closed namespace {}", namespace);
        }
        removed
    }

    /// Remove namespaces nobody listens to. Returns how many were removed.
    pub fn prune_idle(&self) -> usize {
        let mut namespaces = self.lock();
        let before = namespaces.len();
        namespaces.retain(|_, tx| tx.receiver_count() > 0);
        before - namespaces.len()
    }

    pub fn subscriber_count(&self, namespace: &Namespace) -> usize {
        self.lock()
            .get(namespace)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    pub fn namespace_count(&self) -> usize {
        self.lock().len()
    }
}
