use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snapshot of a DOM element as read from the hosting page
///
/// Carries everything the in-page script reads through the standard
/// style-readback API: tag, attributes, text, computed style, and geometry.
/// The snapshot is immutable input to extraction; it is never sent anywhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomElement {
    /// HTML tag name (e.g., "div", "button", "img")
    pub tag_name: String,

    /// Element attributes (id, class, href, etc.)
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Text content of the element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    /// Computed style properties, keyed by CSS property name
    #[serde(default)]
    pub computed_style: HashMap<String, String>,

    /// Layout box of the element in page coordinates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,

    /// Child elements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DomElement>,
}

/// Bounding box coordinates for an element
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DomElement {
    /// Create a new DomElement
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: HashMap::new(),
            text_content: None,
            computed_style: HashMap::new(),
            bounding_box: None,
            children: Vec::new(),
        }
    }

    /// Builder method: set attributes
    pub fn with_attributes(mut self, attributes: HashMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Builder method: set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Builder method: set a computed style property
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.computed_style.insert(property.into(), value.into());
        self
    }

    /// Builder method: set the bounding box
    pub fn with_bounding_box(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.bounding_box = Some(BoundingBox { x, y, width, height });
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<DomElement>) -> Self {
        self.children = children;
        self
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Add a child element
    pub fn add_child(&mut self, child: DomElement) {
        self.children.push(child);
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    /// Get element ID
    pub fn id(&self) -> Option<&String> {
        self.attributes.get("id")
    }

    /// Check if element has a specific class
    pub fn has_class(&self, class_name: &str) -> bool {
        if let Some(classes) = self.attributes.get("class") {
            classes.split_whitespace().any(|c| c == class_name)
        } else {
            false
        }
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    /// Get a computed style property value
    pub fn style(&self, property: &str) -> Option<&str> {
        self.computed_style.get(property).map(String::as_str)
    }

    /// Parse a DomElement snapshot from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the snapshot to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl BoundingBox {
    /// Create a new BoundingBox
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Check if the box occupies any area
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_creation() {
        let mut attrs = HashMap::new();
        attrs.insert("id".to_string(), "hero".to_string());
        attrs.insert("class".to_string(), "card primary".to_string());

        let element = DomElement::new("div")
            .with_attributes(attrs)
            .with_text("Hello")
            .with_bounding_box(10.0, 20.0, 200.0, 100.0);

        assert_eq!(element.tag_name, "div");
        assert_eq!(element.id(), Some(&"hero".to_string()));
        assert_eq!(element.text_content, Some("Hello".to_string()));
        assert!(element.bounding_box.unwrap().has_area());
    }

    #[test]
    fn test_has_class() {
        let mut element = DomElement::new("div");
        element.add_attribute("class", "container main active");

        assert!(element.has_class("container"));
        assert!(element.has_class("active"));
        assert!(!element.has_class("hidden"));
    }

    #[test]
    fn test_style_lookup() {
        let element = DomElement::new("button")
            .with_style("background-color", "rgb(255, 0, 0)")
            .with_style("display", "block");

        assert_eq!(element.style("display"), Some("block"));
        assert_eq!(element.style("background-color"), Some("rgb(255, 0, 0)"));
        assert_eq!(element.style("visibility"), None);
    }

    #[test]
    fn test_json_round_trip() {
        let element = DomElement::new("section")
            .with_text("Body")
            .with_style("color", "rgb(0, 0, 0)")
            .with_children(vec![DomElement::new("p").with_text("Paragraph")]);

        let json = element.to_json().unwrap();
        let parsed = DomElement::from_json(&json).unwrap();

        assert_eq!(element, parsed);
    }

    #[test]
    fn test_bounding_box_area() {
        assert!(BoundingBox::new(0.0, 0.0, 10.0, 5.0).has_area());
        assert!(!BoundingBox::new(0.0, 0.0, 0.0, 0.0).has_area());
        assert!(!BoundingBox::new(5.0, 5.0, 10.0, 0.0).has_area());
    }
}
