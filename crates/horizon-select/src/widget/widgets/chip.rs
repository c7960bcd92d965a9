//! Chip descriptors.
//!
//! A [`Chip`] describes one chip as the host presents it to a
//! [`ChipListController`](super::ChipListController): its value plus the
//! flags that govern interaction. The controller copies what it needs at
//! registration time and hands back an [`ItemId`](horizon_select_core::ItemId).

use crate::widget::NavigationKey;
use crate::widget::capability::{HasColor, HasDisabledState, ThemePalette};

/// Description of a chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip<V> {
    /// The chip's value. Chips without a value never match a bound value.
    pub value: Option<V>,
    /// Whether the chip starts selected.
    pub selected: bool,
    /// Whether the chip is disabled.
    pub disabled: bool,
    /// Whether the user may select the chip.
    pub selectable: bool,
    /// Whether Delete/Backspace on the chip requests its removal.
    pub removable: bool,
    /// Theme color.
    pub color: Option<ThemePalette>,
}

impl<V> Default for Chip<V> {
    fn default() -> Self {
        Self {
            value: None,
            selected: false,
            disabled: false,
            selectable: true,
            removable: true,
            color: None,
        }
    }
}

impl<V> Chip<V> {
    /// Create an enabled, selectable, removable chip with a value.
    pub fn new(value: V) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    /// Create a chip without a value.
    pub fn without_value() -> Self {
        Self::default()
    }

    /// Set whether the chip starts selected.
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Set the disabled flag.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set whether the user may select the chip.
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Set whether the chip can be removed from the keyboard.
    pub fn with_removable(mut self, removable: bool) -> Self {
        self.removable = removable;
        self
    }

    /// Set the theme color.
    pub fn with_color(mut self, color: ThemePalette) -> Self {
        self.color = Some(color);
        self
    }
}

impl<V> HasDisabledState for Chip<V> {
    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }
}

impl<V> HasColor for Chip<V> {
    fn color(&self) -> Option<ThemePalette> {
        self.color
    }

    fn set_color(&mut self, color: Option<ThemePalette>) {
        self.color = color;
    }

    fn default_color(&self) -> Option<ThemePalette> {
        Some(ThemePalette::Primary)
    }
}

/// Keys a chip list reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChipKey {
    /// Backspace.
    Backspace,
    /// Forward delete.
    Delete,
    /// Space bar.
    Space,
    /// Enter or Return.
    Enter,
    /// Any other printable character.
    Char(char),
    /// Arrow keys, Home/End and Tab.
    Navigation(NavigationKey),
}

impl From<NavigationKey> for ChipKey {
    fn from(key: NavigationKey) -> Self {
        Self::Navigation(key)
    }
}
