//! Gradient codec: gradient-clipped text fill to and from an editable list of
//! colors.

use std::fmt::Write;
use std::sync::OnceLock;

use regex::Regex;

use crate::css::parser::split_top_level;
use crate::css::stylesheet::{is_transparent, ComputedStyle};

/// Direction used when a gradient does not state one.
pub const DEFAULT_DIRECTION: &str = "135deg";

/// The decomposed, editable form of a linear gradient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientDescriptor {
    /// Color tokens, in stop order, as written in the source.
    pub colors: Vec<String>,
    /// Angle or `to <side>` keyword.
    pub direction: String,
}

impl GradientDescriptor {
    pub fn new(colors: Vec<String>, direction: impl Into<String>) -> Self {
        Self {
            colors,
            direction: direction.into(),
        }
    }

    /// Serialize with evenly spaced stops.
    pub fn encode(&self) -> String {
        encode(&self.colors, &self.direction)
    }

    /// Parse a gradient value, keeping its direction when it has one.
    ///
    /// Returns `None` when `source` holds no `linear-gradient(...)`.
    pub fn decode(source: &str, default_direction: &str) -> Option<Self> {
        let inner = gradient_arguments(source)?;
        let direction = split_top_level(inner, ',')
            .into_iter()
            .next()
            .filter(|first| is_direction(first))
            .unwrap_or_else(|| default_direction.to_string());
        Some(Self {
            colors: extract_colors(inner),
            direction,
        })
    }

    /// Replace one color. Out of range indices are ignored.
    pub fn set_color(&mut self, index: usize, color: impl Into<String>) {
        if let Some(slot) = self.colors.get_mut(index) {
            *slot = color.into();
        }
    }
}

/// `linear-gradient(direction, c0 0%, ..., cN 100%)`.
///
/// Stop `i` of `n` sits at `i / (n - 1) * 100%`; a single color sits at `0%`.
pub fn encode(colors: &[String], direction: &str) -> String {
    let n = colors.len();
    let mut out = format!("linear-gradient({direction}");
    for (i, color) in colors.iter().enumerate() {
        let stop = if n > 1 {
            i as f64 / (n - 1) as f64 * 100.0
        } else {
            0.0
        };
        let _ = write!(out, ", {color} {}%", format_stop(stop));
    }
    out.push(')');
    out
}

/// Integer when whole, otherwise at most two decimals.
fn format_stop(stop: f64) -> String {
    let rounded = (stop * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let text = format!("{rounded:.2}");
        text.trim_end_matches('0').to_string()
    }
}

fn color_families() -> &'static [Regex] {
    static FAMILIES: OnceLock<Vec<Regex>> = OnceLock::new();
    FAMILIES.get_or_init(|| {
        [
            r"rgba?\([^)]*\)",
            r"#[0-9a-fA-F]{6}\b",
            r"#[0-9a-fA-F]{3}\b",
            r"hsla?\([^)]*\)",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("color family pattern"))
        .collect()
    })
}

/// Extract color tokens from a gradient source.
///
/// Families are tried in order (rgb/rgba, 6-digit hex, 3-digit hex,
/// hsl/hsla) and the first one with any match wins; families never mix.
pub fn extract_colors(source: &str) -> Vec<String> {
    color_families()
        .iter()
        .map(|family| {
            family
                .find_iter(source)
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>()
        })
        .find(|colors| !colors.is_empty())
        .unwrap_or_default()
}

/// The argument list of the first `linear-gradient(...)` in `source`.
fn gradient_arguments(source: &str) -> Option<&str> {
    let start = source.find("linear-gradient(")? + "linear-gradient(".len();
    let mut depth = 1usize;
    for (i, c) in source[start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&source[start..start + i]);
                }
            }
            _ => {}
        }
    }
    Some(&source[start..])
}

fn is_direction(arg: &str) -> bool {
    let arg = arg.trim().to_ascii_lowercase();
    if arg.starts_with("to ") {
        return true;
    }
    ["deg", "turn", "rad", "grad"].iter().any(|unit| {
        arg.strip_suffix(unit)
            .is_some_and(|n| !n.is_empty() && n.parse::<f64>().is_ok())
    })
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Detect gradient-clipped text on a node's computed style.
///
/// The text must be transparent (its color or its fill override) and either
/// clipped to text or combined with a gradient-valued background. A gradient
/// whose colors match no known notation decodes to a single representative
/// solid color.
pub fn detect(style: &ComputedStyle, default_direction: &str) -> Option<GradientDescriptor> {
    let transparent_text = is_transparent(&style.get("color"))
        || style
            .specified("-webkit-text-fill-color")
            .is_some_and(is_transparent);
    if !transparent_text {
        return None;
    }

    // Clipping to text without a gradient source leaves nothing to decode,
    // so the gradient background is required either way.
    let source = style.get("background-image");
    if !source.contains("linear-gradient(") {
        return None;
    }

    let mut descriptor = GradientDescriptor::decode(&source, default_direction)?;
    if descriptor.colors.is_empty() {
        descriptor.colors.push(fallback_color(style));
    }
    Some(descriptor)
}

/// A representative solid color for a node whose gradient cannot be read.
pub fn fallback_color(style: &ComputedStyle) -> String {
    ["color", "background-color"]
        .iter()
        .map(|p| style.get(p))
        .find(|v| !is_transparent(v))
        .unwrap_or_else(|| "#000000".to_string())
}
