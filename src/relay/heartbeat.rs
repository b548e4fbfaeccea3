use crate::error::{CaptureError, Result};
use crate::time::{Clock, SystemClock};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How recent the last heartbeat must be for the target to count as live.
/// Heartbeats arrive every few seconds; two missed beats mark it gone.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(10);

/// Liveness flag for the far end of the relay chain
///
/// The plugin sandbox broadcasts a heartbeat on a timer; whichever relay
/// observes it feeds this monitor. The flag is true only while the most
/// recent observation is inside the freshness window, and false before
/// any heartbeat has ever arrived. Callers must check it before starting
/// a transfer so an unreachable target fails immediately instead of
/// silently queueing messages.
pub struct HeartbeatMonitor {
    clock: Arc<dyn Clock>,
    window_millis: u64,
    last_observed: Mutex<Option<u64>>,
}

impl HeartbeatMonitor {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), FRESHNESS_WINDOW)
    }

    pub fn with_clock(clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            clock,
            window_millis: window.as_millis() as u64,
            last_observed: Mutex::new(None),
        }
    }

    /// Record a heartbeat at the local observation time
    ///
    /// The broadcast's own timestamp is logged but not trusted for
    /// freshness; sandboxes do not share a clock.
    pub fn observe(&self, source: &str, remote_timestamp: u64) {
        let now = self.clock.now_millis();
        log::debug!(
            "Heartbeat from '{}' (remote time {}) observed at {}",
            source,
            remote_timestamp,
            now
        );
        if let Ok(mut last) = self.last_observed.lock() {
            *last = Some(now);
        }
    }

    /// Whether the target is currently reachable
    pub fn is_ready(&self) -> bool {
        let last = match self.last_observed.lock() {
            Ok(last) => *last,
            Err(_) => return false,
        };
        match last {
            Some(observed) => self.clock.now_millis().saturating_sub(observed) <= self.window_millis,
            None => false,
        }
    }

    /// Fail fast when the target is unreachable
    pub fn ensure_ready(&self) -> Result<()> {
        let last = self.last_observed.lock().map(|l| *l).unwrap_or(None);
        match last {
            None => Err(CaptureError::RelayUnavailable(
                "no heartbeat observed from the plugin sandbox yet".to_string(),
            )),
            Some(observed) => {
                let age = self.clock.now_millis().saturating_sub(observed);
                if age <= self.window_millis {
                    Ok(())
                } else {
                    Err(CaptureError::RelayUnavailable(format!(
                        "last plugin heartbeat was {}ms ago (freshness window {}ms)",
                        age, self.window_millis
                    )))
                }
            }
        }
    }
}

impl Default for HeartbeatMonitor {
    fn default() -> Self {
        Self::new()
    }
}
