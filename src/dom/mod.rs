//! Element snapshot module
//!
//! This module holds the input side of the pipeline: the serializable
//! snapshot of a DOM subtree as the in-page script reads it, plus a typed
//! view over computed style values. It includes:
//! - DomElement: snapshot of one element (tag, attributes, text, style, box)
//! - BoundingBox: page-coordinate layout box
//! - ComputedStyle: typed accessors over the raw style map

pub mod element;
pub mod style;

pub use element::{BoundingBox, DomElement};
pub use style::ComputedStyle;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_export() {
        let element = DomElement::new("div");
        assert_eq!(element.tag_name, "div");
    }

    #[test]
    fn test_style_export() {
        let element = DomElement::new("div").with_style("display", "flex");
        assert_eq!(ComputedStyle::of(&element).display(), "flex");
    }
}
