//! Bounded DOM-subtree extraction
//!
//! This module turns an element snapshot into a design descriptor under
//! strict limits: recursion depth, children per level, string and array
//! lengths. Extraction must never fail to its caller and must never emit
//! anything that cannot survive JSON serialization; when either promise is
//! at risk the rich result is discarded for a minimal fallback descriptor.

pub mod classify;
pub mod paint;
pub mod variants;

pub use classify::{classify_tag, is_unsafe_tag};
pub use variants::{PseudoState, PseudoStateDriver, StateCapture};

use crate::descriptor::{ElementDescriptor, NodeKind, NodeProperties};
use crate::dom::{ComputedStyle, DomElement};

/// Extraction bounds; the defaults are the contract
#[derive(Debug, Clone)]
pub struct ExtractorLimits {
    /// Maximum recursion depth below the root
    pub max_depth: usize,
    /// Children inspected per level before giving up on the rest
    pub children_considered: usize,
    /// Children actually emitted per level
    pub children_emitted: usize,
    /// Name length cap, ellipsis included
    pub max_name_len: usize,
    /// Id length cap
    pub max_id_len: usize,
    /// Text content cap
    pub max_text_len: usize,
    /// Fill array cap
    pub max_fills: usize,
    /// Stroke array cap
    pub max_strokes: usize,
    /// Effect array cap
    pub max_effects: usize,
}

impl Default for ExtractorLimits {
    fn default() -> Self {
        Self {
            max_depth: 3,
            children_considered: 10,
            children_emitted: 8,
            max_name_len: 24,
            max_id_len: 50,
            max_text_len: 500,
            max_fills: 10,
            max_strokes: 5,
            max_effects: 3,
        }
    }
}

/// Walks an element snapshot and emits a bounded, serializable descriptor
#[derive(Debug, Default, Clone)]
pub struct TreeExtractor {
    limits: ExtractorLimits,
}

impl TreeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: ExtractorLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ExtractorLimits {
        &self.limits
    }

    /// Analyze an element subtree into a descriptor
    ///
    /// Never fails: the result is round-tripped through serialization as a
    /// self-check, and any problem yields the minimal fallback descriptor
    /// instead of an error.
    pub fn analyze(&self, element: &DomElement) -> ElementDescriptor {
        let mut counter: u64 = 0;
        let descriptor = self.analyze_node(element, 0, &mut counter);

        match descriptor
            .to_json()
            .and_then(|json| ElementDescriptor::from_json(&json))
        {
            Ok(verified) => verified,
            Err(e) => {
                log::warn!(
                    "Descriptor for <{}> failed the serialization self-check ({}), using fallback",
                    element.tag_name,
                    e
                );
                self.fallback(element)
            }
        }
    }

    /// The ultra-safe degraded descriptor: id, frame type, name, geometry
    pub fn fallback(&self, element: &DomElement) -> ElementDescriptor {
        let (x, y, width, height) = geometry_of(element);
        ElementDescriptor::new(
            self.cap_id(element.id().map(String::as_str).unwrap_or("fallback")),
            NodeKind::Frame,
            self.cap_name(&display_name(element)),
        )
        .with_geometry(x, y, width, height)
    }

    fn analyze_node(
        &self,
        element: &DomElement,
        depth: usize,
        counter: &mut u64,
    ) -> ElementDescriptor {
        *counter += 1;
        let style = ComputedStyle::of(element);
        let (x, y, width, height) = geometry_of(element);

        let id = match element.id() {
            Some(id) if !id.is_empty() => self.cap_id(id),
            _ => format!("{}-{}", safe_tag(&element.tag_name), counter),
        };

        let mut descriptor = ElementDescriptor::new(
            id,
            classify_tag(&element.tag_name),
            self.cap_name(&display_name(element)),
        )
        .with_geometry(x, y, width, height);

        self.attach_paints(&mut descriptor, &style);
        self.attach_text(&mut descriptor, element, &style);

        if depth < self.limits.max_depth {
            descriptor.children = self.emit_children(element, depth, counter, &descriptor.id);
        }

        descriptor
    }

    /// Inspect at most `children_considered` renderable children, emit at
    /// most `children_emitted`, and append the truncation marker when the
    /// renderable count exceeds the considered limit.
    fn emit_children(
        &self,
        element: &DomElement,
        depth: usize,
        counter: &mut u64,
        parent_id: &str,
    ) -> Vec<ElementDescriptor> {
        let renderable: Vec<&DomElement> = element
            .children
            .iter()
            .filter(|child| is_capturable(child))
            .collect();
        let total = renderable.len();

        let mut emitted: Vec<ElementDescriptor> = renderable
            .into_iter()
            .take(self.limits.children_considered)
            .take(self.limits.children_emitted)
            .map(|child| self.analyze_node(child, depth + 1, counter))
            .collect();

        if total > self.limits.children_considered {
            let hidden = total - emitted.len();
            emitted.push(
                ElementDescriptor::new(
                    format!("{}-overflow", parent_id),
                    NodeKind::Text,
                    format!("+{} truncated", hidden),
                )
                .with_geometry(0.0, 0.0, 0.0, 0.0),
            );
        }

        emitted
    }

    fn attach_paints(&self, descriptor: &mut ElementDescriptor, style: &ComputedStyle) {
        let mut fills = paint::extract_fills(style);
        fills.truncate(self.limits.max_fills);
        if !fills.is_empty() {
            descriptor.fills = Some(fills);
        }

        let mut strokes = paint::extract_strokes(style);
        strokes.truncate(self.limits.max_strokes);
        if !strokes.is_empty() {
            descriptor.strokes = Some(strokes);
        }

        let mut effects = paint::extract_effects(style);
        effects.truncate(self.limits.max_effects);
        if !effects.is_empty() {
            descriptor.effects = Some(effects);
        }

        let mut properties = NodeProperties::default();
        let opacity = style.opacity();
        if opacity < 1.0 {
            properties.opacity = Some(opacity);
        }
        if let Some(radius) = style.px("border-radius").filter(|r| *r > 0.0) {
            properties.corner_radius = Some(radius);
        }
        if !properties.is_empty() {
            descriptor.properties = Some(properties);
        }
    }

    fn attach_text(
        &self,
        descriptor: &mut ElementDescriptor,
        element: &DomElement,
        style: &ComputedStyle,
    ) {
        let text = element
            .text_content
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        if let Some(text) = text {
            let capped = cap_chars(text, self.limits.max_text_len);
            descriptor
                .properties
                .get_or_insert_with(NodeProperties::default)
                .text = Some(capped);
        }

        if descriptor.kind == NodeKind::Text || text.is_some() {
            let typography = paint::extract_typography(style);
            if !typography.is_empty() {
                descriptor.typography = Some(typography);
            }
        }
    }

    fn cap_name(&self, name: &str) -> String {
        cap_with_ellipsis(name, self.limits.max_name_len)
    }

    fn cap_id(&self, id: &str) -> String {
        cap_chars(id, self.limits.max_id_len)
    }
}

/// Whether a child subtree participates in capture at all
fn is_capturable(element: &DomElement) -> bool {
    if is_unsafe_tag(&element.tag_name) {
        return false;
    }
    if ComputedStyle::of(element).is_hidden() {
        return false;
    }
    element
        .bounding_box
        .map(|b| sanitize(b.width) > 0.0 && sanitize(b.height) > 0.0)
        .unwrap_or(false)
}

/// Geometry with every non-finite coordinate flattened to zero
fn geometry_of(element: &DomElement) -> (f64, f64, f64, f64) {
    match element.bounding_box {
        Some(b) => (
            sanitize(b.x),
            sanitize(b.y),
            sanitize(b.width),
            sanitize(b.height),
        ),
        None => (0.0, 0.0, 0.0, 0.0),
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn safe_tag(tag: &str) -> &str {
    if tag.is_empty() { "node" } else { tag }
}

/// Best human-readable label for an element
fn display_name(element: &DomElement) -> String {
    element
        .get_attribute("aria-label")
        .or_else(|| element.get_attribute("alt"))
        .or_else(|| element.id())
        .cloned()
        .unwrap_or_else(|| safe_tag(&element.tag_name).to_string())
}

/// Truncate to at most `max` characters, ellipsis included
fn cap_with_ellipsis(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let kept: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Truncate to at most `max` characters on a char boundary
fn cap_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
