//! Transport endpoints and the size-tiered transfer protocol
//!
//! This module holds everything that moves a descriptor between sandboxes:
//! - WireMessage: the logical message vocabulary, identical on every hop
//! - Transport: one sandbox's send/receive capability, as an explicit
//!   endpoint object rather than an ambient global
//! - TransferStrategy: full / simplified / chunked classification
//! - ChunkedSender / ChunkedReceiver: the split/reassemble state machines

pub mod message;
pub mod receiver;
pub mod sender;
pub mod strategy;

pub use message::{TransferMetadata, WireMessage};
pub use receiver::{ChunkedReceiver, ReceiveOutcome, SessionRegistry, TransferSession, TransferSubscriber};
pub use sender::{ChunkedSender, SenderPhase, DEFAULT_FRAGMENT_SIZE};
pub use strategy::{TransferStrategy, FULL_MAX_BYTES, SIMPLIFIED_MAX_BYTES};

use crate::error::{CaptureError, Result};
use std::sync::Mutex;
use std::sync::mpsc;

/// One sandbox's messaging capability
///
/// Each hosting context gets exactly one endpoint instance, passed into the
/// components that need it. Receiving is poll-based to match the
/// single-threaded, cooperative model of the hosting sandboxes.
pub trait Transport: Send {
    /// Queue a message toward the peer sandbox
    fn send(&self, message: WireMessage) -> Result<()>;

    /// Take the next pending message, if any
    fn try_recv(&self) -> Result<Option<WireMessage>>;
}

/// Paired in-process endpoints backed by channels
///
/// The substitute for every native hop mechanism in tests and demos: two
/// endpoints whose queues are crossed, so what one sends the other receives.
pub struct InMemoryTransport {
    label: String,
    tx: mpsc::Sender<WireMessage>,
    rx: Mutex<mpsc::Receiver<WireMessage>>,
}

impl InMemoryTransport {
    /// Create a connected endpoint pair
    pub fn pair(label_a: impl Into<String>, label_b: impl Into<String>) -> (Self, Self) {
        let (tx_ab, rx_ab) = mpsc::channel();
        let (tx_ba, rx_ba) = mpsc::channel();

        (
            Self {
                label: label_a.into(),
                tx: tx_ab,
                rx: Mutex::new(rx_ba),
            },
            Self {
                label: label_b.into(),
                tx: tx_ba,
                rx: Mutex::new(rx_ab),
            },
        )
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Transport for InMemoryTransport {
    fn send(&self, message: WireMessage) -> Result<()> {
        log::trace!("{} -> {}", self.label, message.kind());
        self.tx
            .send(message)
            .map_err(|_| CaptureError::TransportClosed(format!("peer of '{}' is gone", self.label)))
    }

    fn try_recv(&self) -> Result<Option<WireMessage>> {
        let rx = self
            .rx
            .lock()
            .map_err(|e| CaptureError::TransportClosed(format!("endpoint '{}' poisoned: {}", self.label, e)))?;

        match rx.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(CaptureError::TransportClosed(
                format!("peer of '{}' is gone", self.label),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_delivers_both_directions() {
        let (a, b) = InMemoryTransport::pair("page", "content");

        a.send(WireMessage::CheckPluginReady).unwrap();
        assert_eq!(b.try_recv().unwrap(), Some(WireMessage::CheckPluginReady));
        assert_eq!(b.try_recv().unwrap(), None);

        b.send(WireMessage::PluginHeartbeat { source: "plugin".into(), timestamp: 1 })
            .unwrap();
        assert!(matches!(
            a.try_recv().unwrap(),
            Some(WireMessage::PluginHeartbeat { .. })
        ));
    }

    #[test]
    fn test_messages_preserve_order() {
        let (a, b) = InMemoryTransport::pair("page", "content");

        for i in 0..10 {
            a.send(WireMessage::ChunkedData {
                session_id: "s".into(),
                chunk_index: i,
                total_chunks: 10,
                data: String::new(),
            })
            .unwrap();
        }

        for i in 0..10 {
            match b.try_recv().unwrap() {
                Some(WireMessage::ChunkedData { chunk_index, .. }) => assert_eq!(chunk_index, i),
                other => panic!("unexpected message: {:?}", other),
            }
        }
    }

    #[test]
    fn test_dropped_peer_reported() {
        let (a, b) = InMemoryTransport::pair("page", "content");
        drop(b);

        let result = a.send(WireMessage::CheckPluginReady);
        assert!(matches!(result, Err(CaptureError::TransportClosed(_))));
    }

    #[test]
    fn test_buffered_messages_survive_peer_drop() {
        let (a, b) = InMemoryTransport::pair("page", "content");
        a.send(WireMessage::CheckPluginReady).unwrap();
        drop(a);

        // The queued message is still delivered before the closure surfaces
        assert_eq!(b.try_recv().unwrap(), Some(WireMessage::CheckPluginReady));
        assert!(matches!(b.try_recv(), Err(CaptureError::TransportClosed(_))));
    }
}
