use crate::descriptor::NodeKind;

/// Map a tag name onto the closed set of design-node kinds
///
/// Total over all inputs: anything unrecognized is a plain rectangle.
pub fn classify_tag(tag_name: &str) -> NodeKind {
    let tag = tag_name.to_ascii_lowercase();

    match tag.as_str() {
        // Structural containers become frames
        "div" | "section" | "article" | "main" | "header" | "footer" | "nav" | "aside"
        | "form" | "fieldset" | "ul" | "ol" | "li" | "table" | "thead" | "tbody" | "tr"
        | "figure" | "dialog" | "body" => NodeKind::Frame,

        // Interactive elements become components so states can attach to them
        "button" | "a" | "input" | "select" | "textarea" | "label" | "summary" => {
            NodeKind::Component
        }

        // Media elements
        "img" | "picture" | "video" => NodeKind::Image,

        // Inline text carriers
        "span" | "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "strong" | "em" | "b"
        | "i" | "u" | "small" | "code" | "pre" | "blockquote" | "td" | "th" | "dt" | "dd"
        | "figcaption" | "caption" => NodeKind::Text,

        // Vector primitives
        "path" | "rect" | "polygon" | "polyline" | "line" => NodeKind::Vector,
        "circle" | "ellipse" => NodeKind::Ellipse,

        _ => NodeKind::Rectangle,
    }
}

/// Tags whose subtrees are never captured: non-renderable, or rendered by a
/// nested engine the snapshot cannot represent
pub fn is_unsafe_tag(tag_name: &str) -> bool {
    matches!(
        tag_name.to_ascii_lowercase().as_str(),
        "iframe" | "script" | "style" | "noscript" | "svg" | "canvas"
    )
}
