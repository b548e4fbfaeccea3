//! Interaction-state variant capture
//!
//! A component's hover and pressed appearances are captured by driving the
//! live element into each pseudo-state, waiting a fixed settle delay for
//! styles to apply, and re-running extraction. The wait is a time-based
//! yield, not a reactive one: an unusually slow render can under-settle,
//! which degrades fidelity but never crashes.

use crate::descriptor::ElementDescriptor;
use crate::dom::DomElement;
use crate::error::Result;
use crate::extract::TreeExtractor;
use crate::time::Delay;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Interaction states captured as variants
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PseudoState {
    Default,
    Hover,
    Pressed,
}

/// Drives the live element into a pseudo-state and re-reads it
///
/// The page-side implementation dispatches synthetic pointer events; tests
/// substitute a fake that swaps snapshots. Either way the extractor only
/// sees element snapshots.
pub trait PseudoStateDriver {
    /// Put the element into the given state
    fn apply(&mut self, state: PseudoState) -> Result<()>;

    /// Re-read the element subtree in its current state
    fn snapshot(&mut self) -> Result<DomElement>;
}

/// One captured interaction state
#[derive(Debug, Clone, PartialEq)]
pub struct StateCapture {
    pub state: PseudoState,
    pub descriptor: ElementDescriptor,
}

/// How long styles are given to settle after a state change
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

impl TreeExtractor {
    /// Capture the element in its default, hover, and pressed states
    ///
    /// The default state is always first and always present. Hover and
    /// pressed are appended only when their fills, strokes, or effects
    /// differ structurally from the default; visually identical states
    /// add no payload. Driver failures skip that state, never the capture.
    pub fn analyze_with_variants(
        &self,
        driver: &mut dyn PseudoStateDriver,
        delay: &dyn Delay,
    ) -> Vec<StateCapture> {
        let mut captures = Vec::new();

        let default_descriptor = match self.capture_state(driver, delay, PseudoState::Default) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                log::warn!("Default state snapshot failed: {}", e);
                self.fallback(&DomElement::new("unknown"))
            }
        };
        captures.push(StateCapture {
            state: PseudoState::Default,
            descriptor: default_descriptor,
        });

        for state in [PseudoState::Hover, PseudoState::Pressed] {
            match self.capture_state(driver, delay, state) {
                Ok(descriptor) => {
                    if paints_differ(&captures[0].descriptor, &descriptor) {
                        captures.push(StateCapture { state, descriptor });
                    }
                }
                Err(e) => {
                    log::warn!("Skipping {:?} variant: {}", state, e);
                }
            }
        }

        // Leave the element as we found it; a failure here only means the
        // page shows a lingering pseudo-state until the next real pointer move
        if let Err(e) = driver.apply(PseudoState::Default) {
            log::debug!("Could not restore default state: {}", e);
        }

        captures
    }

    fn capture_state(
        &self,
        driver: &mut dyn PseudoStateDriver,
        delay: &dyn Delay,
        state: PseudoState,
    ) -> Result<ElementDescriptor> {
        driver.apply(state)?;
        delay.pause(SETTLE_DELAY);
        let snapshot = driver.snapshot()?;
        Ok(self.analyze(&snapshot))
    }
}

/// Structural comparison of the visual groups a variant can change
fn paints_differ(a: &ElementDescriptor, b: &ElementDescriptor) -> bool {
    a.fills != b.fills || a.strokes != b.strokes || a.effects != b.effects
}
