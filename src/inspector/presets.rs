//! Style presets: shortcuts that expand to ordinary property writes.

use super::property::EditableProperty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowDepth {
    None,
    Sm,
    Md,
    Lg,
    Xl,
}

impl ShadowDepth {
    pub fn box_shadow(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Sm => "0 1px 2px rgba(0, 0, 0, 0.05)",
            Self::Md => "0 4px 6px rgba(0, 0, 0, 0.1)",
            Self::Lg => "0 10px 15px rgba(0, 0, 0, 0.1)",
            Self::Xl => "0 20px 25px rgba(0, 0, 0, 0.15)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Translucent, blur-backed panel.
    Glass,
    Rounded,
    Circle,
    /// Reset corners.
    Square,
    Shadow(ShadowDepth),
}

impl Preset {
    pub const ALL: &'static [Preset] = &[
        Preset::Glass,
        Preset::Rounded,
        Preset::Circle,
        Preset::Square,
        Preset::Shadow(ShadowDepth::None),
        Preset::Shadow(ShadowDepth::Sm),
        Preset::Shadow(ShadowDepth::Md),
        Preset::Shadow(ShadowDepth::Lg),
        Preset::Shadow(ShadowDepth::Xl),
    ];

    /// The property writes this preset stands for, in application order.
    pub fn writes(self) -> Vec<(EditableProperty, &'static str)> {
        match self {
            Preset::Glass => vec![
                (EditableProperty::Background, "rgba(255, 255, 255, 0.1)"),
                (EditableProperty::BackdropFilter, "blur(10px)"),
                (EditableProperty::WebkitBackdropFilter, "blur(10px)"),
                (EditableProperty::Border, "1px solid rgba(255, 255, 255, 0.2)"),
            ],
            Preset::Rounded => vec![(EditableProperty::BorderRadius, "12px")],
            Preset::Circle => vec![(EditableProperty::BorderRadius, "50%")],
            Preset::Square => vec![(EditableProperty::BorderRadius, "0")],
            Preset::Shadow(depth) => vec![(EditableProperty::BoxShadow, depth.box_shadow())],
        }
    }

    /// Stable name used by panel controls.
    pub fn name(self) -> &'static str {
        match self {
            Preset::Glass => "glass",
            Preset::Rounded => "rounded",
            Preset::Circle => "circle",
            Preset::Square => "square",
            Preset::Shadow(ShadowDepth::None) => "shadow-none",
            Preset::Shadow(ShadowDepth::Sm) => "shadow-sm",
            Preset::Shadow(ShadowDepth::Md) => "shadow-md",
            Preset::Shadow(ShadowDepth::Lg) => "shadow-lg",
            Preset::Shadow(ShadowDepth::Xl) => "shadow-xl",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glass_expands_to_four_writes() {
        let writes = Preset::Glass.writes();
        assert_eq!(writes.len(), 4);
        assert_eq!(writes[1], (EditableProperty::BackdropFilter, "blur(10px)"));
    }

    #[test]
    fn names_round_trip() {
        for &preset in Preset::ALL {
            assert_eq!(Preset::from_name(preset.name()), Some(preset));
        }
        assert_eq!(Preset::from_name("sparkle"), None);
    }

    #[test]
    fn corner_presets() {
        assert_eq!(Preset::Circle.writes(), vec![(EditableProperty::BorderRadius, "50%")]);
        assert_eq!(Preset::Square.writes(), vec![(EditableProperty::BorderRadius, "0")]);
    }
}
