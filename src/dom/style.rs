use crate::dom::element::DomElement;

/// Typed view over an element's computed style map
///
/// Computed values arrive as strings exactly as the style-readback API
/// reports them ("none", "rgb(0, 0, 0)", "16px"); this view does the
/// parsing so extraction never touches raw strings.
#[derive(Debug, Clone, Copy)]
pub struct ComputedStyle<'a> {
    element: &'a DomElement,
}

impl<'a> ComputedStyle<'a> {
    pub fn of(element: &'a DomElement) -> Self {
        Self { element }
    }

    /// Raw property value, if present in the snapshot
    pub fn raw(&self, property: &str) -> Option<&'a str> {
        self.element.style(property)
    }

    /// The display property, defaulting to "inline" like the platform does
    pub fn display(&self) -> &'a str {
        self.raw("display").unwrap_or("inline")
    }

    /// The visibility property, defaulting to "visible"
    pub fn visibility(&self) -> &'a str {
        self.raw("visibility").unwrap_or("visible")
    }

    /// Opacity as a number; unparseable values count as fully opaque
    pub fn opacity(&self) -> f64 {
        self.raw("opacity")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(1.0)
    }

    /// A pixel-valued property ("12px" or bare "12"), if parseable
    pub fn px(&self, property: &str) -> Option<f64> {
        parse_px(self.raw(property)?)
    }

    /// Whether style alone hides the element (geometry is checked separately)
    pub fn is_hidden(&self) -> bool {
        self.display() == "none"
            || matches!(self.visibility(), "hidden" | "collapse")
            || self.opacity() <= 0.0
    }
}

/// Parse a CSS length like "12px", "12.5px", or "12" into a finite number
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let numeric = trimmed.strip_suffix("px").unwrap_or(trimmed);
    numeric.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let element = DomElement::new("span");
        let style = ComputedStyle::of(&element);

        assert_eq!(style.display(), "inline");
        assert_eq!(style.visibility(), "visible");
        assert_eq!(style.opacity(), 1.0);
        assert!(!style.is_hidden());
    }

    #[test]
    fn test_hidden_by_display() {
        let element = DomElement::new("div").with_style("display", "none");
        assert!(ComputedStyle::of(&element).is_hidden());
    }

    #[test]
    fn test_hidden_by_visibility() {
        let element = DomElement::new("div").with_style("visibility", "hidden");
        assert!(ComputedStyle::of(&element).is_hidden());

        let element = DomElement::new("div").with_style("visibility", "collapse");
        assert!(ComputedStyle::of(&element).is_hidden());
    }

    #[test]
    fn test_hidden_by_opacity() {
        let element = DomElement::new("div").with_style("opacity", "0");
        assert!(ComputedStyle::of(&element).is_hidden());

        let element = DomElement::new("div").with_style("opacity", "0.5");
        assert!(!ComputedStyle::of(&element).is_hidden());
    }

    #[test]
    fn test_opacity_garbage_counts_as_opaque() {
        let element = DomElement::new("div").with_style("opacity", "not-a-number");
        assert_eq!(ComputedStyle::of(&element).opacity(), 1.0);

        let element = DomElement::new("div").with_style("opacity", "NaN");
        assert_eq!(ComputedStyle::of(&element).opacity(), 1.0);
    }

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("12px"), Some(12.0));
        assert_eq!(parse_px("12.5px"), Some(12.5));
        assert_eq!(parse_px(" 8 "), Some(8.0));
        assert_eq!(parse_px("auto"), None);
        assert_eq!(parse_px(""), None);
    }
}
