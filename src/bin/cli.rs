//! dom-capture CLI
//!
//! Reads an element snapshot from a JSON file, runs the full capture
//! pipeline across an in-memory four-sandbox relay chain, and reports what
//! crossed the wire. A debugging harness for the library, not a deployment
//! surface.

use anyhow::{Context, Result};
use clap::Parser;
use dom_capture::time::Clock;
use dom_capture::{
    CaptureSession, ChunkedReceiver, DomElement, HeartbeatMonitor, NoopDelay, ReceiveOutcome,
    RelayChain, SystemClock, Transport, WireMessage,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "dom-capture",
    version,
    about = "Capture an element snapshot and relay it across the sandbox chain"
)]
struct Cli {
    /// Path to an element snapshot in JSON form
    input: PathBuf,

    /// Fragment size for chunked transfers, in characters
    #[arg(long, default_value_t = dom_capture::transport::DEFAULT_FRAGMENT_SIZE)]
    fragment_size: usize,

    /// Pretty-print the descriptor that reached the consumer end
    #[arg(long)]
    print_descriptor: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let json = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let element = DomElement::from_json(&json).context("Input is not a valid element snapshot")?;

    // Wire the chain and let the plugin end announce itself
    let monitor = Arc::new(HeartbeatMonitor::new());
    let (chain, page, plugin) = RelayChain::in_memory(monitor.clone());
    plugin.send(WireMessage::PluginHeartbeat {
        source: "plugin-ui".into(),
        timestamp: SystemClock.now_millis(),
    })?;
    chain.pump_until_idle()?;

    eprintln!("Capturing <{}>...", element.tag_name);
    let mut session = CaptureSession::new(Box::new(page), monitor)
        .with_delay(Box::new(NoopDelay))
        .with_fragment_size(cli.fragment_size);
    let report = session.capture(&element)?;
    chain.pump_until_idle()?;

    // Play the consumer: drain the plugin end and reassemble
    let mut receiver = ChunkedReceiver::new();
    let mut delivered: Option<String> = None;
    while let Some(message) = plugin.try_recv()? {
        match message {
            WireMessage::PasteData { figma_data } => {
                delivered = Some(serde_json::to_string(&figma_data)?);
            }
            other => {
                if let ReceiveOutcome::Reassembled { payload, .. } = receiver.handle(other)? {
                    delivered = Some(payload);
                }
            }
        }
    }

    println!("strategy:      {}", report.strategy);
    println!("payload size:  {} bytes", report.size_bytes);
    println!("messages sent: {}", report.messages_sent);
    if let (Some(session_id), Some(chunks)) = (&report.session_id, report.total_chunks) {
        println!("session:       {} ({} chunks)", session_id, chunks);
    }

    match delivered {
        Some(payload) => {
            println!("delivered:     {} bytes", payload.len());
            if cli.print_descriptor {
                let value: serde_json::Value = serde_json::from_str(&payload)?;
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
        }
        None => anyhow::bail!("No descriptor reached the consumer end"),
    }

    Ok(())
}
