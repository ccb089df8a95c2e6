//! Computed CSS -> taffy Style conversion.
//!
//! Maps the cascade's string values ([`ComputedStyle`]) to taffy's layout
//! types ([`taffy::Style`], [`LengthPercentageAuto`], etc.). Values that do
//! not parse as a [`Length`] fall back to `auto` (sizes, margins) or zero
//! (padding, borders, gaps).

use taffy::prelude::*;

use crate::css::length::{Length, Unit};
use crate::css::stylesheet::ComputedStyle;

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// Convert a CSS value to a [`LengthPercentageAuto`].
///
/// - `px`, `em`, `rem`, `vw`, `vh` -> absolute length
/// - `%` -> percent (0..100 mapped to 0..1)
/// - `auto` and anything unparseable -> auto
pub fn resolve_auto(value: &str, viewport: (f32, f32)) -> LengthPercentageAuto {
    match Length::parse(value) {
        Some(Length { value, unit: Unit::Percent }) => LengthPercentageAuto::from_percent(value / 100.0),
        Some(length) => match length.to_px(viewport) {
            Some(px) => LengthPercentageAuto::from_length(px),
            None => LengthPercentageAuto::AUTO,
        },
        None => LengthPercentageAuto::AUTO,
    }
}

/// Convert a CSS value to a [`LengthPercentage`] for contexts without auto
/// (padding, border, gap). `auto` and unparseable values map to zero.
pub fn resolve_definite(value: &str, viewport: (f32, f32)) -> LengthPercentage {
    match Length::parse(value) {
        Some(Length { value, unit: Unit::Percent }) => LengthPercentage::from_percent(value / 100.0),
        Some(length) => LengthPercentage::from_length(length.to_px(viewport).unwrap_or(0.0)),
        None => LengthPercentage::ZERO,
    }
}

/// Convert a CSS value to a [`Dimension`] for sizing contexts.
pub fn resolve_dimension(value: &str, viewport: (f32, f32)) -> Dimension {
    match Length::parse(value) {
        Some(Length { value, unit: Unit::Percent }) => Dimension::from_percent(value / 100.0),
        Some(length) => match length.to_px(viewport) {
            Some(px) => Dimension::from_length(px),
            None => Dimension::AUTO,
        },
        None => Dimension::AUTO,
    }
}

/// Width of the border drawn on every side, from `border-width` or the
/// first length in the `border` shorthand. `none` and `hidden` are zero.
pub fn border_width(style: &ComputedStyle, viewport: (f32, f32)) -> f32 {
    let source = style
        .specified("border-width")
        .or_else(|| style.specified("border"))
        .unwrap_or("");
    let words: Vec<&str> = source.split_whitespace().collect();
    if words.iter().any(|w| matches!(*w, "none" | "hidden")) {
        return 0.0;
    }
    words
        .iter()
        .find_map(|w| Length::parse(w).and_then(|l| l.to_px(viewport)))
        .unwrap_or(0.0)
}

fn resolve_box_auto(style: &ComputedStyle, property: &str, viewport: (f32, f32)) -> Rect<LengthPercentageAuto> {
    let side = |i: usize| resolve_auto(&style.get(&format!("{property}-{}", SIDES[i])), viewport);
    Rect {
        top: side(0),
        right: side(1),
        bottom: side(2),
        left: side(3),
    }
}

fn resolve_box_definite(style: &ComputedStyle, property: &str, viewport: (f32, f32)) -> Rect<LengthPercentage> {
    let side = |i: usize| resolve_definite(&style.get(&format!("{property}-{}", SIDES[i])), viewport);
    Rect {
        top: side(0),
        right: side(1),
        bottom: side(2),
        left: side(3),
    }
}

/// Convert a computed style into a [`taffy::Style`].
///
/// `viewport` is the emulated device size, used to resolve `vw` and `vh`.
///
/// Mapping summary:
/// - `display: none` -> `Display::None`, `flex` -> `Flex`, `grid` -> `Grid`,
///   everything else -> `Block`
/// - `flex-direction`, `flex-wrap`, `gap` for flex and grid containers
/// - `width/height`, `min-*`, `max-*` -> `size`, `min_size`, `max_size`
/// - `margin-*`, `padding-*` longhands -> `margin`, `padding`
/// - `border`/`border-width` -> uniform `border`
/// - `box-sizing: border-box` -> `BoxSizing::BorderBox`
/// - `position: absolute|fixed` -> `Position::Absolute` with `top/right/bottom/left` inset
pub fn resolve_style(style: &ComputedStyle, viewport: (f32, f32)) -> taffy::Style {
    let mut out = taffy::Style::default();

    out.display = match style.get("display").as_str() {
        "none" => Display::None,
        "flex" | "inline-flex" => Display::Flex,
        "grid" | "inline-grid" => Display::Grid,
        _ => Display::Block,
    };

    if out.display == Display::Flex {
        out.flex_direction = match style.get("flex-direction").as_str() {
            "column" => FlexDirection::Column,
            "column-reverse" => FlexDirection::ColumnReverse,
            "row-reverse" => FlexDirection::RowReverse,
            _ => FlexDirection::Row,
        };
        if style.get("flex-wrap") == "wrap" {
            out.flex_wrap = FlexWrap::Wrap;
        }
    }
    if matches!(out.display, Display::Flex | Display::Grid) {
        if let Some(gap) = style.specified("gap") {
            let mut parts = gap.split_whitespace();
            let row = parts.next().unwrap_or("0");
            let column = parts.next().unwrap_or(row);
            out.gap = Size {
                width: resolve_definite(column, viewport),
                height: resolve_definite(row, viewport),
            };
        }
    }

    out.size = Size {
        width: resolve_dimension(&style.get("width"), viewport),
        height: resolve_dimension(&style.get("height"), viewport),
    };
    out.min_size = Size {
        width: resolve_dimension(&style.get("min-width"), viewport),
        height: resolve_dimension(&style.get("min-height"), viewport),
    };
    out.max_size = Size {
        width: resolve_dimension(&style.get("max-width"), viewport),
        height: resolve_dimension(&style.get("max-height"), viewport),
    };

    out.margin = resolve_box_auto(style, "margin", viewport);
    out.padding = resolve_box_definite(style, "padding", viewport);

    let border = LengthPercentage::from_length(border_width(style, viewport));
    out.border = Rect {
        top: border,
        right: border,
        bottom: border,
        left: border,
    };

    if style.get("box-sizing") == "border-box" {
        out.box_sizing = taffy::style::BoxSizing::BorderBox;
    } else {
        out.box_sizing = taffy::style::BoxSizing::ContentBox;
    }

    if matches!(style.get("position").as_str(), "absolute" | "fixed") {
        out.position = Position::Absolute;
        out.inset = Rect {
            top: resolve_auto(&style.get("top"), viewport),
            right: resolve_auto(&style.get("right"), viewport),
            bottom: resolve_auto(&style.get("bottom"), viewport),
            left: resolve_auto(&style.get("left"), viewport),
        };
    }

    out
}
