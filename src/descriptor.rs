use serde::{Deserialize, Serialize};

/// Closed set of design-node kinds a captured element can map to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Frame,
    Component,
    Image,
    Text,
    Vector,
    Ellipse,
    Rectangle,
}

/// RGBA color with components in 0.0..=1.0
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent colors carry no visual information
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

/// Border paint with its weight in pixels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub weight: f64,
}

/// Visual effect kinds derived from shadow and filter styles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectKind {
    DropShadow,
    InnerShadow,
    LayerBlur,
}

/// A single visual effect
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Effect {
    #[serde(rename = "type")]
    pub kind: EffectKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,

    #[serde(default)]
    pub offset_x: f64,

    #[serde(default)]
    pub offset_y: f64,

    #[serde(default)]
    pub radius: f64,
}

/// Text styling, included only when the source element carries text
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Typography {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
}

impl Typography {
    pub fn is_empty(&self) -> bool {
        *self == Typography::default()
    }
}

/// Non-default properties that do not fit the paint or typography groups
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,

    /// Text content for TEXT nodes, length-capped at extraction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl NodeProperties {
    pub fn is_empty(&self) -> bool {
        *self == NodeProperties::default()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Bounded, serializable representation of a captured DOM subtree
///
/// Produced by extraction, immutable thereafter, consumed once by the
/// transport layer. The tree is a snapshot: no cycles by construction,
/// every number finite, every string and array length-capped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDescriptor {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    pub name: String,

    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementDescriptor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fills: Option<Vec<Color>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strokes: Option<Vec<Stroke>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<Vec<Effect>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<NodeProperties>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub typography: Option<Typography>,

    /// Set on reduced-fidelity payloads so the consumer can distinguish the
    /// two accepted shapes without knowing which transport tier was used
    #[serde(default, skip_serializing_if = "is_false")]
    pub simplified: bool,
}

/// How many fills a simplified descriptor keeps
const SIMPLIFIED_MAX_FILLS: usize = 3;
/// How many strokes a simplified descriptor keeps
const SIMPLIFIED_MAX_STROKES: usize = 2;
/// How many effects a simplified descriptor keeps
const SIMPLIFIED_MAX_EFFECTS: usize = 1;
/// How many children a simplified descriptor keeps
const SIMPLIFIED_MAX_CHILDREN: usize = 10;

impl ElementDescriptor {
    /// Create a descriptor with geometry only
    pub fn new(id: impl Into<String>, kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            children: Vec::new(),
            fills: None,
            strokes: None,
            effects: None,
            properties: None,
            typography: None,
            simplified: false,
        }
    }

    /// Builder method: set geometry
    pub fn with_geometry(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<ElementDescriptor>) -> Self {
        self.children = children;
        self
    }

    /// Builder method: set fills
    pub fn with_fills(mut self, fills: Vec<Color>) -> Self {
        self.fills = Some(fills);
        self
    }

    /// Derive the reduced-fidelity payload used when the full serialization
    /// would exceed the single-message threshold but chunking is not yet
    /// warranted: top-level geometry/type/name, the first few paints, and up
    /// to ten geometry-only children with grandchildren dropped.
    pub fn simplify(&self) -> ElementDescriptor {
        let children = self
            .children
            .iter()
            .take(SIMPLIFIED_MAX_CHILDREN)
            .map(|child| {
                ElementDescriptor::new(child.id.clone(), child.kind, child.name.clone())
                    .with_geometry(child.x, child.y, child.width, child.height)
            })
            .collect();

        ElementDescriptor {
            id: self.id.clone(),
            kind: self.kind,
            name: self.name.clone(),
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            children,
            fills: self
                .fills
                .as_ref()
                .map(|f| f.iter().copied().take(SIMPLIFIED_MAX_FILLS).collect()),
            strokes: self
                .strokes
                .as_ref()
                .map(|s| s.iter().copied().take(SIMPLIFIED_MAX_STROKES).collect()),
            effects: self
                .effects
                .as_ref()
                .map(|e| e.iter().copied().take(SIMPLIFIED_MAX_EFFECTS).collect()),
            properties: None,
            typography: None,
            simplified: true,
        }
    }

    /// Serialize the descriptor to compact JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a descriptor from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Count nodes in the descriptor tree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ElementDescriptor::node_count).sum::<usize>()
    }

    /// Depth of the descriptor tree in edges (a leaf is depth 0)
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}
