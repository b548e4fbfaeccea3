use crate::descriptor::ElementDescriptor;
use crate::dom::DomElement;
use crate::error::{CaptureError, Result};
use crate::extract::TreeExtractor;
use crate::relay::HeartbeatMonitor;
use crate::time::{Delay, SystemDelay};
use crate::transport::{
    ChunkedSender, TransferMetadata, TransferStrategy, Transport, WireMessage,
    DEFAULT_FRAGMENT_SIZE,
};
use std::sync::Arc;

/// What one capture produced and how it was shipped
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReport {
    pub strategy: TransferStrategy,
    /// Size of the full serialization that was classified
    pub size_bytes: usize,
    pub messages_sent: usize,
    /// Present for chunked transfers only
    pub session_id: Option<String>,
    pub total_chunks: Option<usize>,
}

/// One capture pipeline bound to a sandbox's endpoint
///
/// Owns the extractor and the page-side transport, and consults the
/// liveness monitor before anything is sent: an unreachable plugin
/// sandbox is an immediate error, never a silently queued message.
/// Exactly one capture is assumed live at a time; callers needing more
/// must serialize them.
pub struct CaptureSession {
    transport: Box<dyn Transport>,
    monitor: Arc<HeartbeatMonitor>,
    extractor: TreeExtractor,
    delay: Box<dyn Delay>,
    fragment_size: usize,
}

impl CaptureSession {
    pub fn new(transport: Box<dyn Transport>, monitor: Arc<HeartbeatMonitor>) -> Self {
        Self {
            transport,
            monitor,
            extractor: TreeExtractor::new(),
            delay: Box::new(SystemDelay),
            fragment_size: DEFAULT_FRAGMENT_SIZE,
        }
    }

    /// Builder method: substitute the extractor
    pub fn with_extractor(mut self, extractor: TreeExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Builder method: substitute the inter-chunk delay
    pub fn with_delay(mut self, delay: Box<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Builder method: override the chunk fragment size
    pub fn with_fragment_size(mut self, fragment_size: usize) -> Self {
        self.fragment_size = fragment_size.max(1);
        self
    }

    pub fn extractor(&self) -> &TreeExtractor {
        &self.extractor
    }

    /// Capture an element subtree and ship the descriptor
    pub fn capture(&mut self, element: &DomElement) -> Result<TransferReport> {
        self.monitor.ensure_ready()?;

        let descriptor = self.extractor.analyze(element);
        log::info!(
            "Captured <{}> into {} nodes",
            element.tag_name,
            descriptor.node_count()
        );

        self.send_descriptor(&descriptor)
    }

    /// Ship an already extracted descriptor through the tier that fits it
    pub fn send_descriptor(&mut self, descriptor: &ElementDescriptor) -> Result<TransferReport> {
        let serialized = descriptor
            .to_json()
            .map_err(|e| CaptureError::SerializationFailed(e.to_string()))?;
        let size_bytes = serialized.len();
        let strategy = TransferStrategy::classify(size_bytes);
        log::info!("Descriptor is {} bytes, sending {}", size_bytes, strategy);

        match strategy {
            TransferStrategy::Full => {
                self.transport.send(WireMessage::PasteData {
                    figma_data: descriptor.clone(),
                })?;
                Ok(TransferReport {
                    strategy,
                    size_bytes,
                    messages_sent: 1,
                    session_id: None,
                    total_chunks: None,
                })
            }
            TransferStrategy::Simplified => {
                self.transport.send(WireMessage::PasteData {
                    figma_data: descriptor.simplify(),
                })?;
                Ok(TransferReport {
                    strategy,
                    size_bytes,
                    messages_sent: 1,
                    session_id: None,
                    total_chunks: None,
                })
            }
            TransferStrategy::Chunked => {
                let metadata = TransferMetadata {
                    name: Some(descriptor.name.clone()),
                    node_count: Some(descriptor.node_count()),
                };
                let mut sender =
                    ChunkedSender::with_fragment_size(serialized, metadata, self.fragment_size);
                let session_id = sender.session_id().to_string();
                let total_chunks = sender.total_chunks();

                let messages_sent = sender.send_all(self.transport.as_ref(), self.delay.as_ref())?;

                Ok(TransferReport {
                    strategy,
                    size_bytes,
                    messages_sent,
                    session_id: Some(session_id),
                    total_chunks: Some(total_chunks),
                })
            }
        }
    }
}
