use crate::error::Result;
use crate::time::Delay;
use crate::transport::message::{TransferMetadata, WireMessage};
use crate::transport::Transport;
use std::time::Duration;
use uuid::Uuid;

/// Characters per fragment; chosen well under the per-message ceiling of
/// the narrowest hop in the chain
pub const DEFAULT_FRAGMENT_SIZE: usize = 100_000;

/// Spacing between chunk emissions. One message per scheduled tick is the
/// protocol's only backpressure: the sender never waits on the receiver.
pub const CHUNK_TICK: Duration = Duration::from_millis(10);

/// Where the sender is in its one-way lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderPhase {
    Idle,
    Sending,
    Done,
}

/// Splits one payload into ordered, individually addressed fragments
///
/// `Idle → start → Sending → data × total_chunks → complete → Done`.
/// The payload is fragmented on construction; `next_message` steps the
/// state machine one wire message at a time, and `send_all` pumps it to
/// completion with a pause between ticks.
pub struct ChunkedSender {
    session_id: String,
    fragments: Vec<String>,
    size_bytes: usize,
    metadata: TransferMetadata,
    phase: SenderPhase,
    next_index: usize,
}

impl ChunkedSender {
    /// Create a sender for one payload with the default fragment size
    pub fn new(payload: String, metadata: TransferMetadata) -> Self {
        Self::with_fragment_size(payload, metadata, DEFAULT_FRAGMENT_SIZE)
    }

    /// Create a sender with a custom fragment size (in characters)
    pub fn with_fragment_size(
        payload: String,
        metadata: TransferMetadata,
        fragment_size: usize,
    ) -> Self {
        let fragment_size = fragment_size.max(1);
        let size_bytes = payload.len();

        Self {
            session_id: Uuid::new_v4().to_string(),
            fragments: split_fragments(&payload, fragment_size),
            size_bytes,
            metadata,
            phase: SenderPhase::Idle,
            next_index: 0,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn total_chunks(&self) -> usize {
        self.fragments.len()
    }

    pub fn phase(&self) -> SenderPhase {
        self.phase
    }

    /// Produce the next wire message, or None once the transfer is done
    pub fn next_message(&mut self) -> Option<WireMessage> {
        match self.phase {
            SenderPhase::Idle => {
                self.phase = SenderPhase::Sending;
                Some(WireMessage::ChunkedStart {
                    session_id: self.session_id.clone(),
                    total_chunks: self.fragments.len(),
                    size_bytes: self.size_bytes,
                    metadata: self.metadata.clone(),
                })
            }
            SenderPhase::Sending => {
                if self.next_index < self.fragments.len() {
                    let chunk_index = self.next_index;
                    self.next_index += 1;
                    Some(WireMessage::ChunkedData {
                        session_id: self.session_id.clone(),
                        chunk_index,
                        total_chunks: self.fragments.len(),
                        data: std::mem::take(&mut self.fragments[chunk_index]),
                    })
                } else {
                    self.phase = SenderPhase::Done;
                    Some(WireMessage::ChunkedComplete {
                        session_id: self.session_id.clone(),
                    })
                }
            }
            SenderPhase::Done => None,
        }
    }

    /// Pump the whole transfer through a transport, one message per tick
    pub fn send_all(&mut self, transport: &dyn Transport, delay: &dyn Delay) -> Result<usize> {
        let total = self.fragments.len();
        log::info!(
            "Starting chunked transfer {}: {} chunks, {} bytes",
            self.session_id,
            total,
            self.size_bytes
        );

        let mut sent = 0;
        while let Some(message) = self.next_message() {
            transport.send(message)?;
            sent += 1;
            if self.phase == SenderPhase::Sending {
                delay.pause(CHUNK_TICK);
            }
        }

        log::info!("Chunked transfer {} handed to relay", self.session_id);
        Ok(sent)
    }
}

/// Split on character boundaries into fragments of at most `fragment_size`
/// characters; `ceil(char_count / fragment_size)` fragments in total.
fn split_fragments(payload: &str, fragment_size: usize) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::with_capacity(fragment_size.min(payload.len()));
    let mut count = 0;

    for c in payload.chars() {
        current.push(c);
        count += 1;
        if count >= fragment_size {
            fragments.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        fragments.push(current);
    }

    fragments
}
