//! CSS lengths: Length, Unit (px, %, em, rem, vw, vh, auto).

use std::fmt;

/// Root font size used to resolve `rem` (and `em`, which the layout pass
/// treats as `rem` since it does not track font inheritance).
pub const ROOT_FONT_SIZE_PX: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unit {
    Px,
    Percent,
    Em,
    Rem,
    Vw,
    Vh,
    Auto,
}

/// A length value with a unit, e.g. `12px`, `50%`, `1.5rem`, `auto`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: Unit,
}

impl Length {
    pub fn px(value: f32) -> Self {
        Self { value, unit: Unit::Px }
    }

    pub fn percent(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Percent,
        }
    }

    pub fn auto() -> Self {
        Self {
            value: 0.0,
            unit: Unit::Auto,
        }
    }

    pub fn is_auto(&self) -> bool {
        self.unit == Unit::Auto
    }

    /// Parse a single length token. Bare numbers are accepted as pixels.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim().to_ascii_lowercase();
        if text == "auto" {
            return Some(Self::auto());
        }
        let split = text
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let (number, unit) = text.split_at(split);
        let value: f32 = number.parse().ok()?;
        let unit = match unit {
            "" | "px" => Unit::Px,
            "%" => Unit::Percent,
            "em" => Unit::Em,
            "rem" => Unit::Rem,
            "vw" => Unit::Vw,
            "vh" => Unit::Vh,
            _ => return None,
        };
        Some(Self { value, unit })
    }

    /// Resolve to pixels where that needs no containing block.
    ///
    /// Returns `None` for percentages and `auto`.
    pub fn to_px(&self, viewport: (f32, f32)) -> Option<f32> {
        match self.unit {
            Unit::Px => Some(self.value),
            Unit::Em | Unit::Rem => Some(self.value * ROOT_FONT_SIZE_PX),
            Unit::Vw => Some(self.value / 100.0 * viewport.0),
            Unit::Vh => Some(self.value / 100.0 * viewport.1),
            Unit::Percent | Unit::Auto => None,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.unit {
            Unit::Auto => return write!(f, "auto"),
            Unit::Px => "px",
            Unit::Percent => "%",
            Unit::Em => "em",
            Unit::Rem => "rem",
            Unit::Vw => "vw",
            Unit::Vh => "vh",
        };
        if self.value.fract() == 0.0 {
            write!(f, "{}{suffix}", self.value as i64)
        } else {
            write!(f, "{}{suffix}", self.value)
        }
    }
}

/// Expand a 1 to 4 value box shorthand (`margin`, `padding`) into
/// `[top, right, bottom, left]`.
pub fn expand_box(value: &str) -> Option<[String; 4]> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    let [top, right, bottom, left] = match parts.as_slice() {
        [all] => [*all, *all, *all, *all],
        [vertical, horizontal] => [*vertical, *horizontal, *vertical, *horizontal],
        [top, horizontal, bottom] => [*top, *horizontal, *bottom, *horizontal],
        [top, right, bottom, left] => [*top, *right, *bottom, *left],
        _ => return None,
    };
    Some([top.into(), right.into(), bottom.into(), left.into()])
}
