//! Editable properties and typed style values.

use std::fmt;

use crate::gradient::GradientDescriptor;

/// The kind of control a property is edited with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Color,
    Dimension,
    Text,
    Gradient,
}

/// A typed style value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleValue {
    Color(String),
    Dimension(String),
    Text(String),
    Gradient(GradientDescriptor),
}

impl StyleValue {
    /// Wrap a raw CSS value in the variant for `kind`. Gradient kinds need a
    /// descriptor, so raw text falls back to `Text`.
    pub fn of_kind(kind: ValueKind, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        match kind {
            ValueKind::Color => Self::Color(raw),
            ValueKind::Dimension => Self::Dimension(raw),
            ValueKind::Text | ValueKind::Gradient => Self::Text(raw),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Color(_) => ValueKind::Color,
            Self::Dimension(_) => ValueKind::Dimension,
            Self::Text(_) => ValueKind::Text,
            Self::Gradient(_) => ValueKind::Gradient,
        }
    }

    /// The CSS text written to the node and the ledger.
    pub fn to_css(&self) -> String {
        match self {
            Self::Color(v) | Self::Dimension(v) | Self::Text(v) => v.clone(),
            Self::Gradient(descriptor) => descriptor.encode(),
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

macro_rules! editable_properties {
    ($($variant:ident => $css:literal, $key:literal, $kind:ident;)*) => {
        /// Closed set of properties the inspector and ledger know by name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EditableProperty {
            $($variant,)*
        }

        impl EditableProperty {
            pub const ALL: &'static [EditableProperty] = &[$(EditableProperty::$variant,)*];

            /// The CSS property written on the node. Sentinels have none.
            pub fn css_name(self) -> &'static str {
                match self {
                    $(EditableProperty::$variant => $css,)*
                }
            }

            /// The key stored in the ledger.
            pub fn key(self) -> &'static str {
                match self {
                    $(EditableProperty::$variant => $key,)*
                }
            }

            pub fn kind(self) -> ValueKind {
                match self {
                    $(EditableProperty::$variant => ValueKind::$kind,)*
                }
            }
        }
    };
}

editable_properties! {
    Color => "color", "color", Color;
    BackgroundColor => "background-color", "backgroundColor", Color;
    FontSize => "font-size", "fontSize", Dimension;
    FontWeight => "font-weight", "fontWeight", Text;
    FontFamily => "font-family", "fontFamily", Text;
    PaddingTop => "padding-top", "paddingTop", Dimension;
    PaddingRight => "padding-right", "paddingRight", Dimension;
    PaddingBottom => "padding-bottom", "paddingBottom", Dimension;
    PaddingLeft => "padding-left", "paddingLeft", Dimension;
    MarginTop => "margin-top", "marginTop", Dimension;
    MarginRight => "margin-right", "marginRight", Dimension;
    MarginBottom => "margin-bottom", "marginBottom", Dimension;
    MarginLeft => "margin-left", "marginLeft", Dimension;
    BorderRadius => "border-radius", "borderRadius", Dimension;
    Border => "border", "border", Text;
    Width => "width", "width", Dimension;
    Height => "height", "height", Dimension;
    Background => "background", "background", Text;
    BackgroundClip => "background-clip", "backgroundClip", Text;
    WebkitBackgroundClip => "-webkit-background-clip", "webkitBackgroundClip", Text;
    WebkitTextFillColor => "-webkit-text-fill-color", "webkitTextFillColor", Color;
    BackdropFilter => "backdrop-filter", "backdropFilter", Text;
    WebkitBackdropFilter => "-webkit-backdrop-filter", "webkitBackdropFilter", Text;
    BoxShadow => "box-shadow", "boxShadow", Text;
    TextContent => "", "textContent", Text;
    PageBackground => "", "pageBackground", Color;
}

impl EditableProperty {
    /// Properties sampled when the inspector opens, in display order.
    pub const SAMPLED: &'static [EditableProperty] = &[
        EditableProperty::Color,
        EditableProperty::BackgroundColor,
        EditableProperty::FontSize,
        EditableProperty::FontWeight,
        EditableProperty::FontFamily,
        EditableProperty::PaddingTop,
        EditableProperty::PaddingRight,
        EditableProperty::PaddingBottom,
        EditableProperty::PaddingLeft,
        EditableProperty::MarginTop,
        EditableProperty::MarginRight,
        EditableProperty::MarginBottom,
        EditableProperty::MarginLeft,
        EditableProperty::BorderRadius,
        EditableProperty::Border,
        EditableProperty::Width,
        EditableProperty::Height,
    ];

    /// Look up a property by its ledger key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.key() == key)
    }

    /// Look up a property by its CSS name.
    pub fn from_css_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| !p.css_name().is_empty() && p.css_name() == name)
    }

    /// Whether this is a sentinel with no CSS property of its own.
    pub fn is_sentinel(self) -> bool {
        self.css_name().is_empty()
    }
}

/// Convert a ledger key to a CSS property name: known keys map through
/// [`EditableProperty`], other camelCase keys are converted mechanically
/// (`borderTopWidth` to `border-top-width`, `webkitMaskImage` to
/// `-webkit-mask-image`).
pub fn key_to_css(key: &str) -> String {
    if let Some(property) = EditableProperty::from_key(key).filter(|p| !p.is_sentinel()) {
        return property.css_name().to_string();
    }
    if key.contains('-') {
        return key.to_ascii_lowercase();
    }
    let mut css = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                css.push('-');
            }
            css.push(c.to_ascii_lowercase());
        } else {
            css.push(c);
        }
    }
    for vendor in ["webkit-", "moz-", "ms-"] {
        if css.starts_with(vendor) {
            return format!("-{css}");
        }
    }
    css
}

/// Inverse of [`key_to_css`] for properties outside the closed set.
pub fn css_to_key(name: &str) -> String {
    if let Some(property) = EditableProperty::from_css_name(name) {
        return property.key().to_string();
    }
    let mut key = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.trim_start_matches('-').chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            key.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            key.push(c);
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_and_names() {
        assert_eq!(EditableProperty::BackgroundColor.css_name(), "background-color");
        assert_eq!(EditableProperty::BackgroundColor.key(), "backgroundColor");
        assert_eq!(EditableProperty::from_key("textContent"), Some(EditableProperty::TextContent));
        assert!(EditableProperty::PageBackground.is_sentinel());
        assert_eq!(EditableProperty::from_css_name("margin-left"), Some(EditableProperty::MarginLeft));
        assert_eq!(EditableProperty::from_css_name(""), None);
    }

    #[test]
    fn keys_are_unique() {
        for (i, a) in EditableProperty::ALL.iter().enumerate() {
            for b in &EditableProperty::ALL[i + 1..] {
                assert_ne!(a.key(), b.key());
            }
        }
    }

    #[test]
    fn unknown_keys_convert_mechanically() {
        assert_eq!(key_to_css("borderTopWidth"), "border-top-width");
        assert_eq!(key_to_css("webkitMaskImage"), "-webkit-mask-image");
        assert_eq!(key_to_css("opacity"), "opacity");
        assert_eq!(key_to_css("text-shadow"), "text-shadow");
        assert_eq!(key_to_css("webkitBackgroundClip"), "-webkit-background-clip");
        assert_eq!(css_to_key("border-top-width"), "borderTopWidth");
        assert_eq!(css_to_key("-webkit-mask-image"), "webkitMaskImage");
    }

    #[test]
    fn value_kinds() {
        assert_eq!(StyleValue::of_kind(ValueKind::Dimension, "4px"), StyleValue::Dimension("4px".into()));
        let gradient = StyleValue::Gradient(GradientDescriptor::new(vec!["#000000".into()], "90deg"));
        assert_eq!(gradient.kind(), ValueKind::Gradient);
        assert_eq!(gradient.to_css(), "linear-gradient(90deg, #000000 0%)");
    }
}
