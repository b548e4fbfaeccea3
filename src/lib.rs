//! # dom-capture
//!
//! A Rust library for capturing DOM subtrees into bounded design descriptors
//! and moving them, however large, across a chain of isolated execution
//! contexts, so a design tool can rebuild them as editable objects.
//!
//! ## Features
//!
//! - **Bounded extraction**: walk an element snapshot under strict depth,
//!   child-count, and string limits, and always produce a JSON-serializable
//!   descriptor no matter how pathological the input is
//! - **Size-tiered transport**: small payloads ship verbatim, medium payloads
//!   ship as a reduced-fidelity descriptor, large payloads are chunked so no
//!   single message exceeds a hop's practical ceiling
//! - **Context relay**: forward messages unchanged across the four-sandbox
//!   chain (page script → content script → extension host → plugin UI) while
//!   tracking the plugin's heartbeat, so a dead target fails fast
//! - **Deterministic testing**: transports, clocks, and delays are explicit
//!   trait objects with in-memory substitutes
//!
//! ## Capturing and shipping a subtree
//!
//! ```rust
//! use dom_capture::{CaptureSession, DomElement, HeartbeatMonitor, RelayChain, Transport, WireMessage};
//! use std::sync::Arc;
//!
//! # fn main() -> dom_capture::Result<()> {
//! let monitor = Arc::new(HeartbeatMonitor::new());
//! let (chain, page, plugin) = RelayChain::in_memory(monitor.clone());
//!
//! // The plugin sandbox announces itself before any capture may start
//! plugin.send(WireMessage::PluginHeartbeat { source: "plugin-ui".into(), timestamp: 0 })?;
//! chain.pump_until_idle()?;
//!
//! let element = DomElement::new("div")
//!     .with_bounding_box(0.0, 0.0, 320.0, 200.0)
//!     .with_style("background-color", "rgb(250, 250, 250)");
//!
//! let mut session = CaptureSession::new(Box::new(page), monitor);
//! let report = session.capture(&element)?;
//! println!("shipped {} bytes via {}", report.size_bytes, report.strategy);
//! # Ok(())
//! # }
//! ```
//!
//! ## Reassembling on the consumer side
//!
//! ```rust
//! use dom_capture::{ChunkedReceiver, ReceiveOutcome, Transport};
//!
//! fn drain(plugin_end: &dyn Transport, receiver: &mut ChunkedReceiver) -> dom_capture::Result<Option<String>> {
//!     while let Some(message) = plugin_end.try_recv()? {
//!         if let ReceiveOutcome::Reassembled { payload, .. } = receiver.handle(message)? {
//!             return Ok(Some(payload));
//!         }
//!     }
//!     Ok(None)
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`dom`]: element snapshots and computed-style access
//! - [`extract`]: bounded tree extraction and variant capture
//! - [`descriptor`]: the serializable descriptor model
//! - [`transport`]: wire messages, strategy tiers, chunked sender/receiver
//! - [`relay`]: the four-sandbox chain and heartbeat liveness
//! - [`capture`]: the end-to-end capture facade
//! - [`error`]: error types and result alias
//! - [`time`]: injectable clock and delay primitives

pub mod capture;
pub mod descriptor;
pub mod dom;
pub mod error;
pub mod extract;
pub mod relay;
pub mod time;
pub mod transport;

pub use capture::{CaptureSession, TransferReport};
pub use descriptor::{Color, Effect, EffectKind, ElementDescriptor, NodeKind, NodeProperties, Stroke, Typography};
pub use dom::{BoundingBox, ComputedStyle, DomElement};
pub use error::{CaptureError, Result};
pub use extract::{ExtractorLimits, PseudoState, PseudoStateDriver, StateCapture, TreeExtractor};
pub use relay::{ContextRelay, HeartbeatMonitor, RelayChain, SandboxId};
pub use time::{Clock, Delay, ManualClock, NoopDelay, SystemClock, SystemDelay};
pub use transport::{
    ChunkedReceiver, ChunkedSender, InMemoryTransport, ReceiveOutcome, SessionRegistry,
    TransferMetadata, TransferStrategy, TransferSubscriber, Transport, WireMessage,
};
