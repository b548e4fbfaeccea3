//! Message routing across the four-sandbox chain
//!
//! The capture pipeline spans four mutually isolated execution contexts:
//!
//! `PageScript ⇄ ContentScript ⇄ ExtensionHost ⇄ PluginUi`
//!
//! Each hop uses a different native mechanism in production (DOM events,
//! the extension message bus, cross-window postMessage, the plugin
//! bridge); here every hop is a [`Transport`](crate::transport::Transport)
//! endpoint, and a relay's only job is to forward message type and fields
//! unchanged while feeding observed heartbeats into the liveness monitor.

pub mod heartbeat;

pub use heartbeat::{HeartbeatMonitor, FRESHNESS_WINDOW};

use crate::error::Result;
use crate::transport::{InMemoryTransport, Transport, WireMessage};
use std::sync::Arc;

/// The four sandboxes of the chain, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SandboxId {
    PageScript,
    ContentScript,
    ExtensionHost,
    PluginUi,
}

impl SandboxId {
    /// Chain order, page side first
    pub const CHAIN: [SandboxId; 4] = [
        SandboxId::PageScript,
        SandboxId::ContentScript,
        SandboxId::ExtensionHost,
        SandboxId::PluginUi,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SandboxId::PageScript => "page-script",
            SandboxId::ContentScript => "content-script",
            SandboxId::ExtensionHost => "extension-host",
            SandboxId::PluginUi => "plugin-ui",
        }
    }
}

impl std::fmt::Display for SandboxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Forwards messages unchanged between two adjacent sandboxes
///
/// One relay runs in each intermediate sandbox, joining its page-facing
/// (upstream) and plugin-facing (downstream) endpoints. Heartbeats
/// travelling up from the plugin side are observed en route; nothing
/// else is inspected, and nothing is ever rewritten.
pub struct ContextRelay {
    at: SandboxId,
    upstream: Box<dyn Transport>,
    downstream: Box<dyn Transport>,
    monitor: Arc<HeartbeatMonitor>,
}

impl ContextRelay {
    pub fn new(
        at: SandboxId,
        upstream: Box<dyn Transport>,
        downstream: Box<dyn Transport>,
        monitor: Arc<HeartbeatMonitor>,
    ) -> Self {
        Self { at, upstream, downstream, monitor }
    }

    pub fn at(&self) -> SandboxId {
        self.at
    }

    pub fn monitor(&self) -> Arc<HeartbeatMonitor> {
        self.monitor.clone()
    }

    /// Forward everything currently queued in both directions
    ///
    /// Returns how many messages were moved. Call repeatedly; each call
    /// models one turn of the sandbox's event loop.
    pub fn pump_once(&self) -> Result<usize> {
        let mut forwarded = 0;

        while let Some(message) = self.upstream.try_recv()? {
            log::trace!("{}: forwarding {} toward plugin", self.at, message.kind());
            self.downstream.send(message)?;
            forwarded += 1;
        }

        while let Some(message) = self.downstream.try_recv()? {
            if let WireMessage::PluginHeartbeat { source, timestamp } = &message {
                self.monitor.observe(source, *timestamp);
            }
            log::trace!("{}: forwarding {} toward page", self.at, message.kind());
            self.upstream.send(message)?;
            forwarded += 1;
        }

        Ok(forwarded)
    }
}

/// The fully wired four-sandbox chain over in-memory endpoints
///
/// Production deploys one script per sandbox; tests and the CLI wire the
/// same topology in one process. Building the chain yields the two end
/// transports (the page-script producer end and the plugin-ui consumer
/// end) with relays running in the two intermediate sandboxes.
pub struct RelayChain {
    relays: Vec<ContextRelay>,
    monitor: Arc<HeartbeatMonitor>,
}

impl RelayChain {
    /// Build the chain with a shared liveness monitor; returns the chain
    /// plus the page end and the plugin end
    pub fn in_memory(
        monitor: Arc<HeartbeatMonitor>,
    ) -> (Self, InMemoryTransport, InMemoryTransport) {
        let (page, content_up) = InMemoryTransport::pair("page-script", "content-script:up");
        let (content_down, host_up) = InMemoryTransport::pair("content-script:down", "extension-host:up");
        let (host_down, plugin) = InMemoryTransport::pair("extension-host:down", "plugin-ui");

        let relays = vec![
            ContextRelay::new(
                SandboxId::ContentScript,
                Box::new(content_up),
                Box::new(content_down),
                monitor.clone(),
            ),
            ContextRelay::new(
                SandboxId::ExtensionHost,
                Box::new(host_up),
                Box::new(host_down),
                monitor.clone(),
            ),
        ];

        (Self { relays, monitor }, page, plugin)
    }

    pub fn monitor(&self) -> Arc<HeartbeatMonitor> {
        self.monitor.clone()
    }

    /// Pump every relay until no messages remain in flight
    pub fn pump_until_idle(&self) -> Result<usize> {
        let mut total = 0;
        loop {
            let mut moved = 0;
            for relay in &self.relays {
                moved += relay.pump_once()?;
            }
            if moved == 0 {
                return Ok(total);
            }
            total += moved;
        }
    }
}
