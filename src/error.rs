use thiserror::Error;

/// Errors that can occur during capture, transfer, and relay operations
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Reading the element snapshot or its computed style failed.
    /// Recovered internally by the fallback descriptor; callers of
    /// `TreeExtractor::analyze` never see this variant.
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// The descriptor did not survive the JSON round-trip self-check.
    /// Recovered internally by the fallback descriptor.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// A chunked transfer could not complete
    #[error("Transfer {session_id} failed: {reason}")]
    TransferFailed { session_id: String, reason: String },

    /// A data or complete message referenced a session the receiver does not know
    #[error("Unknown transfer session '{0}'")]
    UnknownSession(String),

    /// The target sandbox's heartbeat is stale or was never observed
    #[error("Relay unavailable: {0}")]
    RelayUnavailable(String),

    /// A transport endpoint's peer is gone
    #[error("Transport closed: {0}")]
    TransportClosed(String),
}

/// Result type alias for capture operations
pub type Result<T> = std::result::Result<T, CaptureError>;
