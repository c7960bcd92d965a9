//! Small capability traits shared by chips, chip lists and sort controllers.
//!
//! Components compose these instead of inheriting a common base: a type that
//! can be disabled implements [`HasDisabledState`], a type that carries a
//! theme color implements [`HasColor`].

use std::fmt;

/// Theme palette a component can be drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ThemePalette {
    /// The theme's main color.
    Primary,
    /// The theme's secondary color.
    Accent,
    /// The color for warnings and destructive actions.
    Warn,
}

impl ThemePalette {
    /// The palette name as used in style class names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Accent => "accent",
            Self::Warn => "warn",
        }
    }
}

impl fmt::Display for ThemePalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A component that can be disabled.
pub trait HasDisabledState {
    /// Whether the component is disabled.
    fn is_disabled(&self) -> bool;

    /// Enable or disable the component.
    fn set_disabled(&mut self, disabled: bool);

    /// Whether the component accepts user interaction.
    fn is_enabled(&self) -> bool {
        !self.is_disabled()
    }
}

/// A component drawn with a theme color.
pub trait HasColor {
    /// The explicitly set color, if any.
    fn color(&self) -> Option<ThemePalette>;

    /// Set or clear the color.
    fn set_color(&mut self, color: Option<ThemePalette>);

    /// The color used when none is set.
    fn default_color(&self) -> Option<ThemePalette> {
        None
    }

    /// The color to draw with.
    fn effective_color(&self) -> Option<ThemePalette> {
        self.color().or_else(|| self.default_color())
    }
}
