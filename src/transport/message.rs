use crate::descriptor::ElementDescriptor;
use serde::{Deserialize, Serialize};

/// Descriptive fields carried by a chunked-start message
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_count: Option<usize>,
}

/// The logical wire vocabulary, independent of which hop carries a message
///
/// Every hop forwards these unchanged; field names on the wire match the
/// original message schema (camelCase), so a payload serialized at one end
/// of the chain deserializes identically at the other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum WireMessage {
    /// Opens a chunked transfer session
    #[serde(rename = "component-chunked-start", rename_all = "camelCase")]
    ChunkedStart {
        session_id: String,
        total_chunks: usize,
        size_bytes: usize,
        metadata: TransferMetadata,
    },

    /// One payload fragment
    #[serde(rename = "component-chunked-data", rename_all = "camelCase")]
    ChunkedData {
        session_id: String,
        chunk_index: usize,
        total_chunks: usize,
        data: String,
    },

    /// Closes a chunked transfer session and triggers reassembly
    #[serde(rename = "component-chunked-complete", rename_all = "camelCase")]
    ChunkedComplete { session_id: String },

    /// Full or simplified descriptor delivered in a single message
    #[serde(rename = "paste-data", rename_all = "camelCase")]
    PasteData { figma_data: ElementDescriptor },

    /// Liveness query for the plugin sandbox
    #[serde(rename = "CHECK_FIGMA_PLUGIN_READY")]
    CheckPluginReady,

    /// Periodic liveness broadcast from the plugin sandbox
    #[serde(rename = "plugin-heartbeat", rename_all = "camelCase")]
    PluginHeartbeat { source: String, timestamp: u64 },
}

impl WireMessage {
    /// The wire-level type tag, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            WireMessage::ChunkedStart { .. } => "component-chunked-start",
            WireMessage::ChunkedData { .. } => "component-chunked-data",
            WireMessage::ChunkedComplete { .. } => "component-chunked-complete",
            WireMessage::PasteData { .. } => "paste-data",
            WireMessage::CheckPluginReady => "CHECK_FIGMA_PLUGIN_READY",
            WireMessage::PluginHeartbeat { .. } => "plugin-heartbeat",
        }
    }
}
