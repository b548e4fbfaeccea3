use crate::descriptor::{Color, Effect, EffectKind, Stroke, Typography};
use crate::dom::ComputedStyle;
use crate::dom::style::parse_px;

/// Parse a CSS color as the style-readback API reports it
///
/// Computed values normally arrive as `rgb(...)` / `rgba(...)`; hex and the
/// keywords that survive computation are handled as well. Returns None for
/// anything unrecognized rather than guessing.
pub fn parse_css_color(value: &str) -> Option<Color> {
    let v = value.trim();

    if v.eq_ignore_ascii_case("transparent") {
        return Some(Color::new(0.0, 0.0, 0.0, 0.0));
    }
    if v.eq_ignore_ascii_case("black") {
        return Some(Color::new(0.0, 0.0, 0.0, 1.0));
    }
    if v.eq_ignore_ascii_case("white") {
        return Some(Color::new(1.0, 1.0, 1.0, 1.0));
    }

    if let Some(hex) = v.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    let body = v
        .strip_prefix("rgba")
        .or_else(|| v.strip_prefix("rgb"))?
        .trim()
        .strip_prefix('(')?
        .strip_suffix(')')?;

    // Components may be separated by commas or spaces, with an optional
    // "/ alpha" in the space-separated form
    let normalized = body.replace('/', " ");
    let parts: Vec<&str> = normalized
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() < 3 {
        return None;
    }

    let r = parse_color_channel(parts[0])?;
    let g = parse_color_channel(parts[1])?;
    let b = parse_color_channel(parts[2])?;
    let a = if parts.len() > 3 {
        parts[3].parse::<f64>().ok().filter(|a| a.is_finite())?.clamp(0.0, 1.0)
    } else {
        1.0
    };

    Some(Color::new(r, g, b, a))
}

fn parse_color_channel(part: &str) -> Option<f64> {
    let n = part.parse::<f64>().ok().filter(|n| n.is_finite())?;
    Some((n / 255.0).clamp(0.0, 1.0))
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    let expand = |c: u8| -> f64 { (c as f64) / 255.0 };

    match hex.len() {
        3 => {
            let bytes = u16::from_str_radix(hex, 16).ok()?;
            let r = ((bytes >> 8) & 0xf) as u8;
            let g = ((bytes >> 4) & 0xf) as u8;
            let b = (bytes & 0xf) as u8;
            Some(Color::new(
                expand(r * 17),
                expand(g * 17),
                expand(b * 17),
                1.0,
            ))
        }
        6 => {
            let bytes = u32::from_str_radix(hex, 16).ok()?;
            Some(Color::new(
                expand(((bytes >> 16) & 0xff) as u8),
                expand(((bytes >> 8) & 0xff) as u8),
                expand((bytes & 0xff) as u8),
                1.0,
            ))
        }
        8 => {
            let bytes = u32::from_str_radix(hex, 16).ok()?;
            Some(Color {
                r: expand(((bytes >> 24) & 0xff) as u8),
                g: expand(((bytes >> 16) & 0xff) as u8),
                b: expand(((bytes >> 8) & 0xff) as u8),
                a: expand((bytes & 0xff) as u8),
            })
        }
        _ => None,
    }
}

/// Extract solid fills; transparent backgrounds produce no fill at all
pub fn extract_fills(style: &ComputedStyle) -> Vec<Color> {
    let mut fills = Vec::new();

    if let Some(value) = style.raw("background-color") {
        if let Some(color) = parse_css_color(value) {
            if !color.is_transparent() {
                fills.push(color);
            }
        }
    }

    fills
}

/// Extract border strokes; zero-width or styleless borders produce nothing
pub fn extract_strokes(style: &ComputedStyle) -> Vec<Stroke> {
    let border_style = style
        .raw("border-style")
        .or_else(|| style.raw("border-top-style"))
        .unwrap_or("none");
    if border_style == "none" || border_style == "hidden" {
        return Vec::new();
    }

    let weight = style
        .px("border-width")
        .or_else(|| style.px("border-top-width"))
        .unwrap_or(0.0);
    if weight <= 0.0 {
        return Vec::new();
    }

    let color = style
        .raw("border-color")
        .or_else(|| style.raw("border-top-color"))
        .and_then(parse_css_color)
        .unwrap_or(Color::new(0.0, 0.0, 0.0, 1.0));
    if color.is_transparent() {
        return Vec::new();
    }

    vec![Stroke { color, weight }]
}

/// Extract shadow and blur effects from box-shadow and filter
pub fn extract_effects(style: &ComputedStyle) -> Vec<Effect> {
    let mut effects = Vec::new();

    if let Some(value) = style.raw("box-shadow") {
        if value != "none" {
            for shadow in split_outside_parens(value) {
                if let Some(effect) = parse_shadow(&shadow) {
                    effects.push(effect);
                }
            }
        }
    }

    if let Some(value) = style.raw("filter") {
        if let Some(radius) = parse_blur_filter(value) {
            effects.push(Effect {
                kind: EffectKind::LayerBlur,
                color: None,
                offset_x: 0.0,
                offset_y: 0.0,
                radius,
            });
        }
    }

    effects
}

/// Split a comma-separated list without breaking inside rgb(...) groups
fn split_outside_parens(value: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for c in value.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}

/// Parse one computed box-shadow entry, e.g. "rgb(0, 0, 0) 0px 4px 12px 0px"
/// or "0px 2px 4px rgba(0, 0, 0, 0.5) inset"
fn parse_shadow(shadow: &str) -> Option<Effect> {
    let inset = shadow.contains("inset");

    // Pull out the color group first so its digits do not pollute the lengths
    let (color, remainder) = match shadow.find("rgb").or_else(|| shadow.find('#')) {
        Some(start) => {
            let color_str = &shadow[start..];
            let end = if color_str.starts_with('#') {
                color_str
                    .find(|c: char| c.is_whitespace())
                    .unwrap_or(color_str.len())
            } else {
                color_str.find(')').map(|i| i + 1)?
            };
            let mut remainder = String::new();
            remainder.push_str(&shadow[..start]);
            remainder.push(' ');
            remainder.push_str(&color_str[end..]);
            (parse_css_color(&color_str[..end]), remainder)
        }
        None => (None, shadow.to_string()),
    };

    let lengths: Vec<f64> = remainder
        .split_whitespace()
        .filter(|token| *token != "inset")
        .filter_map(parse_px)
        .collect();
    if lengths.len() < 2 {
        return None;
    }

    Some(Effect {
        kind: if inset {
            EffectKind::InnerShadow
        } else {
            EffectKind::DropShadow
        },
        color,
        offset_x: lengths[0],
        offset_y: lengths[1],
        radius: lengths.get(2).copied().unwrap_or(0.0),
    })
}

/// Extract the radius from a blur(..) filter, if present
fn parse_blur_filter(value: &str) -> Option<f64> {
    let start = value.find("blur(")?;
    let rest = &value[start + 5..];
    let end = rest.find(')')?;
    parse_px(&rest[..end]).filter(|r| *r > 0.0)
}

/// Platform default weight; regular text carries no typography weight entry
const DEFAULT_FONT_WEIGHT: u32 = 400;
/// Platform default size in pixels
const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Extract typography, recording only values that differ from the defaults
pub fn extract_typography(style: &ComputedStyle) -> Typography {
    let font_family = style.raw("font-family").map(|v| {
        v.split(',')
            .next()
            .unwrap_or(v)
            .trim()
            .trim_matches('"')
            .trim_matches('\'')
            .to_string()
    });

    let font_size = style.px("font-size").filter(|s| *s != DEFAULT_FONT_SIZE);

    let font_weight = style
        .raw("font-weight")
        .and_then(|v| match v {
            "normal" => Some(DEFAULT_FONT_WEIGHT),
            "bold" => Some(700),
            other => other.parse::<u32>().ok(),
        })
        .filter(|w| *w != DEFAULT_FONT_WEIGHT);

    let line_height = style
        .raw("line-height")
        .filter(|v| *v != "normal")
        .and_then(parse_px);

    let letter_spacing = style
        .raw("letter-spacing")
        .filter(|v| *v != "normal")
        .and_then(parse_px);

    let text_align = style
        .raw("text-align")
        .filter(|v| !matches!(*v, "start" | "left"))
        .map(str::to_string);

    Typography {
        font_family,
        font_size,
        font_weight,
        line_height,
        letter_spacing,
        text_align,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DomElement;

    #[test]
    fn test_parse_rgb() {
        let color = parse_css_color("rgb(255, 0, 0)").unwrap();
        assert_eq!(color, Color::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_parse_rgba() {
        let color = parse_css_color("rgba(0, 0, 0, 0.5)").unwrap();
        assert_eq!(color.a, 0.5);
        assert_eq!(color.r, 0.0);
    }

    #[test]
    fn test_parse_space_separated() {
        let color = parse_css_color("rgb(255 128 0 / 0.25)").unwrap();
        assert_eq!(color.r, 1.0);
        assert_eq!(color.a, 0.25);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(
            parse_css_color("#ff0000").unwrap(),
            Color::new(1.0, 0.0, 0.0, 1.0)
        );
        assert_eq!(
            parse_css_color("#f00").unwrap(),
            Color::new(1.0, 0.0, 0.0, 1.0)
        );
        assert_eq!(parse_css_color("#ff000080").unwrap().a, 128.0 / 255.0);
    }

    #[test]
    fn test_parse_transparent_and_garbage() {
        assert!(parse_css_color("transparent").unwrap().is_transparent());
        assert!(parse_css_color("inherit").is_none());
        assert!(parse_css_color("rgb(banana)").is_none());
        assert!(parse_css_color("").is_none());
    }

    #[test]
    fn test_fills_skip_transparent_background() {
        let element = DomElement::new("div").with_style("background-color", "rgba(0, 0, 0, 0)");
        assert!(extract_fills(&ComputedStyle::of(&element)).is_empty());

        let element = DomElement::new("div").with_style("background-color", "rgb(10, 20, 30)");
        assert_eq!(extract_fills(&ComputedStyle::of(&element)).len(), 1);
    }

    #[test]
    fn test_strokes_require_width_and_style() {
        let element = DomElement::new("div")
            .with_style("border-style", "solid")
            .with_style("border-width", "2px")
            .with_style("border-color", "rgb(0, 0, 255)");
        let strokes = extract_strokes(&ComputedStyle::of(&element));
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].weight, 2.0);

        let element = DomElement::new("div")
            .with_style("border-style", "none")
            .with_style("border-width", "2px");
        assert!(extract_strokes(&ComputedStyle::of(&element)).is_empty());

        let element = DomElement::new("div")
            .with_style("border-style", "solid")
            .with_style("border-width", "0px");
        assert!(extract_strokes(&ComputedStyle::of(&element)).is_empty());
    }

    #[test]
    fn test_shadow_parsing_color_first() {
        let element =
            DomElement::new("div").with_style("box-shadow", "rgb(0, 0, 0) 0px 4px 12px 0px");
        let effects = extract_effects(&ComputedStyle::of(&element));

        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].kind, EffectKind::DropShadow);
        assert_eq!(effects[0].offset_y, 4.0);
        assert_eq!(effects[0].radius, 12.0);
    }

    #[test]
    fn test_shadow_parsing_inset_and_multiple() {
        let element = DomElement::new("div").with_style(
            "box-shadow",
            "rgba(0, 0, 0, 0.2) 0px 1px 2px 0px, rgb(255, 255, 255) 0px 0px 4px 0px inset",
        );
        let effects = extract_effects(&ComputedStyle::of(&element));

        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0].kind, EffectKind::DropShadow);
        assert_eq!(effects[1].kind, EffectKind::InnerShadow);
    }

    #[test]
    fn test_blur_filter() {
        let element = DomElement::new("div").with_style("filter", "blur(6px)");
        let effects = extract_effects(&ComputedStyle::of(&element));

        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].kind, EffectKind::LayerBlur);
        assert_eq!(effects[0].radius, 6.0);
    }

    #[test]
    fn test_no_effects_for_none() {
        let element = DomElement::new("div").with_style("box-shadow", "none");
        assert!(extract_effects(&ComputedStyle::of(&element)).is_empty());
    }

    #[test]
    fn test_typography_defaults_omitted() {
        let element = DomElement::new("p")
            .with_style("font-size", "16px")
            .with_style("font-weight", "400")
            .with_style("text-align", "left")
            .with_style("line-height", "normal");
        let typography = extract_typography(&ComputedStyle::of(&element));

        assert!(typography.font_size.is_none());
        assert!(typography.font_weight.is_none());
        assert!(typography.text_align.is_none());
        assert!(typography.line_height.is_none());
    }

    #[test]
    fn test_typography_non_defaults_kept() {
        let element = DomElement::new("h1")
            .with_style("font-family", "\"Inter\", sans-serif")
            .with_style("font-size", "32px")
            .with_style("font-weight", "bold")
            .with_style("text-align", "center");
        let typography = extract_typography(&ComputedStyle::of(&element));

        assert_eq!(typography.font_family.as_deref(), Some("Inter"));
        assert_eq!(typography.font_size, Some(32.0));
        assert_eq!(typography.font_weight, Some(700));
        assert_eq!(typography.text_align.as_deref(), Some("center"));
    }
}
