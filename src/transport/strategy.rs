//! Size-tiered transmission strategy
//!
//! Message channels between sandboxes have a practical per-message ceiling
//! and latency proportional to size. Small payloads go through verbatim;
//! medium payloads are reduced to avoid chunking overhead; anything larger
//! is chunked so no single message ever exceeds the ceiling.

/// Largest serialized descriptor sent verbatim in one message
pub const FULL_MAX_BYTES: usize = 500_000;

/// Largest payload served by the reduced-fidelity descriptor
pub const SIMPLIFIED_MAX_BYTES: usize = 2_000_000;

/// The three transmission tiers, ordered by the payload size they serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TransferStrategy {
    Full,
    Simplified,
    Chunked,
}

impl TransferStrategy {
    /// Pick the tier for a serialized descriptor of the given byte size
    pub fn classify(size_bytes: usize) -> Self {
        if size_bytes <= FULL_MAX_BYTES {
            TransferStrategy::Full
        } else if size_bytes <= SIMPLIFIED_MAX_BYTES {
            TransferStrategy::Simplified
        } else {
            TransferStrategy::Chunked
        }
    }
}

impl std::fmt::Display for TransferStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferStrategy::Full => write!(f, "full"),
            TransferStrategy::Simplified => write!(f, "simplified"),
            TransferStrategy::Chunked => write!(f, "chunked"),
        }
    }
}
