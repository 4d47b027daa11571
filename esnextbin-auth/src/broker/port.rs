use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use super::models::AuthMessage;

#[derive(Debug)]
pub(crate) enum PortEvent {
    Message(AuthMessage),
    Closed,
}

type Slot = Arc<Mutex<Option<mpsc::UnboundedSender<PortEvent>>>>;

/// Delivery point for notifications coming from the authorization surface.
///
/// The broker registers a listener only while an authorization attempt is
/// running; anything posted outside that window is dropped.
#[derive(Clone, Default)]
pub struct AuthorizationPort {
    slot: Slot,
}

impl AuthorizationPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a notification. Returns `false` when no attempt is listening.
    pub fn post(&self, message: AuthMessage) -> bool {
        self.send(PortEvent::Message(message))
    }

    /// Report that the surface went away without completing authorization
    pub fn close(&self) -> bool {
        self.send(PortEvent::Closed)
    }

    pub fn is_listening(&self) -> bool {
        self.lock().is_some()
    }

    pub(crate) fn listen(&self) -> Listener {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.lock() = Some(tx.clone());
        Listener {
            rx,
            tx,
            slot: self.slot.clone(),
        }
    }

    fn send(&self, event: PortEvent) -> bool {
        match self.lock().as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => {
                tracing::debug!("No authorization in progress, dropping notification");
                false
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<mpsc::UnboundedSender<PortEvent>>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Receiving end for one attempt; deregisters itself when dropped
pub(crate) struct Listener {
    rx: mpsc::UnboundedReceiver<PortEvent>,
    tx: mpsc::UnboundedSender<PortEvent>,
    slot: Slot,
}

impl Listener {
    pub(crate) async fn recv(&mut self) -> Option<PortEvent> {
        self.rx.recv().await
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        // Only clear our own registration
        if slot.as_ref().is_some_and(|tx| tx.same_channel(&self.tx)) {
            *slot = None;
        }
    }
}
