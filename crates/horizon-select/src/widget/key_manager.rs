//! Keyboard-driven active item tracking.
//!
//! [`KeyboardItemCycler`] keeps an "active item" cursor over an ordered list
//! of items and moves it in response to navigation intents (next, previous,
//! first, last). It understands:
//!
//! - **Orientation**: an intent along an axis the cycler does not support is
//!   ignored
//! - **Wrap**: with wrapping on, moving past either end continues at the other
//! - **Disabled items**: skipped transparently; if every item is disabled the
//!   cursor becomes `None`
//! - **Text direction**: left/right arrow keys are mirrored for RTL layouts
//!
//! The cycler never owns the items. Hosts describe them with [`CycleEntry`]
//! values (a key plus a disabled flag) and hand over a fresh snapshot through
//! [`KeyboardItemCycler::update_items`] whenever the list changes.
//!
//! # Example
//!
//! ```
//! use horizon_select::widget::{CycleEntry, CyclerConfig, KeyboardItemCycler};
//!
//! let mut cycler = KeyboardItemCycler::new(CyclerConfig::new().wrap(true));
//! cycler.update_items(vec![
//!     CycleEntry::new("a"),
//!     CycleEntry::new("b").disabled(true),
//!     CycleEntry::new("c"),
//! ]);
//!
//! cycler.set_first_item_active();
//! cycler.set_next_item_active();
//! assert_eq!(cycler.active_index(), Some(2));
//!
//! cycler.set_next_item_active();
//! assert_eq!(cycler.active_index(), Some(0));
//! ```

use horizon_select_core::Signal;
use horizon_select_core::logging::targets;

const TARGET: &str = targets::KEY_MANAGER;

/// A navigation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Axis {
    /// Left/right.
    Horizontal,
    /// Up/down.
    Vertical,
}

/// The axes a cycler responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Orientation {
    /// Only horizontal navigation.
    Horizontal,
    /// Only vertical navigation (default).
    #[default]
    Vertical,
    /// Both axes.
    Both,
}

impl Orientation {
    /// Whether navigation along `axis` is supported.
    pub fn supports(self, axis: Axis) -> bool {
        matches!(
            (self, axis),
            (Self::Both, _) | (Self::Horizontal, Axis::Horizontal) | (Self::Vertical, Axis::Vertical)
        )
    }
}

/// Layout direction of the host, used to mirror horizontal keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TextDirection {
    /// Left to right (default).
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

/// An abstract navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationIntent {
    /// Move to the next item along an axis.
    Next(Axis),
    /// Move to the previous item along an axis.
    Previous(Axis),
    /// Move to the first item.
    First,
    /// Move to the last item.
    Last,
}

/// Physical keys the cycler understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavigationKey {
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left; mirrored in right-to-left layouts.
    Left,
    /// Arrow right; mirrored in right-to-left layouts.
    Right,
    /// Home.
    Home,
    /// End.
    End,
    /// Tab, which leaves the cycler.
    Tab,
}

/// Result of [`KeyboardItemCycler::on_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key was handled; the host should suppress its default action.
    Consumed,
    /// The key is not meaningful for this cycler.
    Ignored,
    /// Tab was pressed; `tab_out` has been emitted and focus should leave.
    TabOut,
}

impl KeyOutcome {
    /// Whether the host should suppress the key's default action.
    pub fn is_consumed(self) -> bool {
        self == Self::Consumed
    }
}

/// A snapshot of one item as seen by the cycler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleEntry<K> {
    /// Stable identity of the item.
    pub key: K,
    /// Whether the item is disabled.
    pub disabled: bool,
}

impl<K> CycleEntry<K> {
    /// Create an enabled entry.
    pub fn new(key: K) -> Self {
        Self {
            key,
            disabled: false,
        }
    }

    /// Set the disabled flag.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Configuration for a [`KeyboardItemCycler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CyclerConfig {
    /// Continue at the opposite end when moving past either end.
    pub wrap: bool,
    /// Axes the cycler responds to.
    pub orientation: Orientation,
    /// Layout direction; mirrors left/right keys when RTL.
    pub text_direction: TextDirection,
    /// Skip disabled items while navigating.
    pub skip_disabled: bool,
}

impl Default for CyclerConfig {
    fn default() -> Self {
        Self {
            wrap: false,
            orientation: Orientation::Vertical,
            text_direction: TextDirection::Ltr,
            skip_disabled: true,
        }
    }
}

impl CyclerConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable wrapping.
    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Set the supported axes.
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the layout direction.
    pub fn text_direction(mut self, direction: TextDirection) -> Self {
        self.text_direction = direction;
        self
    }

    /// Enable or disable skipping of disabled items.
    pub fn skip_disabled(mut self, skip: bool) -> Self {
        self.skip_disabled = skip;
        self
    }
}

/// Moves an active-item cursor over an ordered list of items.
///
/// The cursor is `None` or a valid index into the current item list. It is
/// revalidated on every [`update_items`](Self::update_items).
///
/// # Signals
///
/// - `change`: emitted with the new index whenever the cursor moves through a
///   navigation call (not through [`update_active_item_index`](Self::update_active_item_index)
///   or [`update_items`](Self::update_items))
/// - `tab_out`: emitted when Tab is pressed
pub struct KeyboardItemCycler<K> {
    items: Vec<CycleEntry<K>>,
    active_index: Option<usize>,
    active_key: Option<K>,
    config: CyclerConfig,

    /// Emitted when the active index changes.
    pub change: Signal<Option<usize>>,
    /// Emitted when the user tabs out of the list.
    pub tab_out: Signal<()>,
}

impl<K: Clone + PartialEq + 'static> Default for KeyboardItemCycler<K> {
    fn default() -> Self {
        Self::new(CyclerConfig::default())
    }
}

impl<K: Clone + PartialEq + 'static> KeyboardItemCycler<K> {
    /// Create an empty cycler.
    pub fn new(config: CyclerConfig) -> Self {
        Self {
            items: Vec::new(),
            active_index: None,
            active_key: None,
            config,
            change: Signal::new(),
            tab_out: Signal::new(),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Get the configuration.
    pub fn config(&self) -> &CyclerConfig {
        &self.config
    }

    /// Enable or disable wrapping.
    pub fn set_wrap(&mut self, wrap: bool) {
        self.config.wrap = wrap;
    }

    /// Set the supported axes.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.config.orientation = orientation;
    }

    /// Set the layout direction.
    pub fn set_text_direction(&mut self, direction: TextDirection) {
        self.config.text_direction = direction;
    }

    /// Enable or disable skipping of disabled items.
    pub fn set_skip_disabled(&mut self, skip: bool) {
        self.config.skip_disabled = skip;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The current item snapshot.
    pub fn items(&self) -> &[CycleEntry<K>] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The active index.
    #[inline]
    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// The key of the active item.
    pub fn active_item(&self) -> Option<&K> {
        self.active_key.as_ref()
    }

    /// Position of `key` in the item list.
    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.items.iter().position(|entry| &entry.key == key)
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Replace the item snapshot and revalidate the cursor.
    ///
    /// If the active item is still present the cursor follows it to its new
    /// index. Otherwise the cursor moves to the item now at the old position,
    /// clamped to the last index, or becomes `None` when the list is empty.
    /// Returns the revalidated index. Does not emit `change`.
    pub fn update_items(&mut self, items: Vec<CycleEntry<K>>) -> Option<usize> {
        let previous = self.active_index;
        self.items = items;

        let tracked = self
            .active_key
            .as_ref()
            .and_then(|key| self.items.iter().position(|entry| &entry.key == key));

        let index = match (tracked, previous) {
            (Some(index), _) => Some(index),
            (None, Some(old)) if !self.items.is_empty() => Some(old.min(self.items.len() - 1)),
            _ => None,
        };

        self.set_active(index, false);
        index
    }

    /// Set the disabled flag of the item with `key`.
    ///
    /// Returns `false` if no such item exists.
    pub fn set_item_disabled(&mut self, key: &K, disabled: bool) -> bool {
        match self.items.iter_mut().find(|entry| &entry.key == key) {
            Some(entry) => {
                entry.disabled = disabled;
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Apply a navigation intent.
    ///
    /// Returns whether the intent applies to this cycler. Intents along an
    /// unsupported axis are ignored and return `false`; a supported intent
    /// that cannot move (a boundary without wrap) still returns `true`.
    pub fn handle_intent(&mut self, intent: NavigationIntent) -> bool {
        match intent {
            NavigationIntent::Next(axis) | NavigationIntent::Previous(axis)
                if !self.config.orientation.supports(axis) =>
            {
                false
            }
            NavigationIntent::Next(_) => {
                self.set_next_item_active();
                true
            }
            NavigationIntent::Previous(_) => {
                self.set_previous_item_active();
                true
            }
            NavigationIntent::First => {
                self.set_first_item_active();
                true
            }
            NavigationIntent::Last => {
                self.set_last_item_active();
                true
            }
        }
    }

    /// Translate a physical key into an intent and apply it.
    pub fn on_key(&mut self, key: NavigationKey) -> KeyOutcome {
        let rtl = self.config.text_direction == TextDirection::Rtl;
        let intent = match key {
            NavigationKey::Tab => {
                self.tab_out.emit(());
                return KeyOutcome::TabOut;
            }
            NavigationKey::Up => NavigationIntent::Previous(Axis::Vertical),
            NavigationKey::Down => NavigationIntent::Next(Axis::Vertical),
            NavigationKey::Right if rtl => NavigationIntent::Previous(Axis::Horizontal),
            NavigationKey::Right => NavigationIntent::Next(Axis::Horizontal),
            NavigationKey::Left if rtl => NavigationIntent::Next(Axis::Horizontal),
            NavigationKey::Left => NavigationIntent::Previous(Axis::Horizontal),
            NavigationKey::Home => NavigationIntent::First,
            NavigationKey::End => NavigationIntent::Last,
        };

        if self.handle_intent(intent) {
            KeyOutcome::Consumed
        } else {
            KeyOutcome::Ignored
        }
    }

    /// Activate the first navigable item.
    pub fn set_first_item_active(&mut self) {
        let index = (0..self.items.len()).find(|&i| self.is_navigable(i));
        self.set_active(index, true);
    }

    /// Activate the last navigable item.
    pub fn set_last_item_active(&mut self) {
        let index = (0..self.items.len()).rev().find(|&i| self.is_navigable(i));
        self.set_active(index, true);
    }

    /// Activate the next navigable item.
    pub fn set_next_item_active(&mut self) {
        self.step(1);
    }

    /// Activate the previous navigable item.
    pub fn set_previous_item_active(&mut self) {
        self.step(-1);
    }

    /// Jump to `index`, clamped to the last item.
    ///
    /// Disabled items are not skipped. Does nothing on an empty list.
    pub fn set_active_item(&mut self, index: usize) {
        if let Some(index) = self.clamp(index) {
            self.set_active(Some(index), true);
        }
    }

    /// Activate the item with `key`. Returns `false` if it is not present.
    pub fn set_active_by_key(&mut self, key: &K) -> bool {
        match self.index_of(key) {
            Some(index) => {
                self.set_active(Some(index), true);
                true
            }
            None => false,
        }
    }

    /// Move the cursor to `index` (clamped) without emitting `change`.
    pub fn update_active_item_index(&mut self, index: usize) {
        let index = self.clamp(index);
        self.set_active(index, false);
    }

    /// Clear the cursor.
    pub fn clear_active(&mut self) {
        self.set_active(None, true);
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn clamp(&self, index: usize) -> Option<usize> {
        self.items.len().checked_sub(1).map(|last| index.min(last))
    }

    fn is_navigable(&self, index: usize) -> bool {
        self.items
            .get(index)
            .is_some_and(|entry| !(self.config.skip_disabled && entry.disabled))
    }

    fn step(&mut self, delta: isize) {
        let len = self.items.len() as isize;
        if len == 0 {
            self.set_active(None, true);
            return;
        }

        // With no active item, "next" starts before the first item and
        // "previous" after the last.
        let origin = match self.active_index {
            Some(index) => index as isize,
            None if delta > 0 => -1,
            None => len,
        };

        let target = if self.config.wrap {
            (1..=len)
                .map(|distance| (origin + delta * distance).rem_euclid(len) as usize)
                .find(|&i| self.is_navigable(i))
        } else {
            let mut candidate = origin + delta;
            let mut found = None;
            while (0..len).contains(&candidate) {
                if self.is_navigable(candidate as usize) {
                    found = Some(candidate as usize);
                    break;
                }
                candidate += delta;
            }
            found
        };

        match target {
            Some(index) => self.set_active(Some(index), true),
            None if !(0..self.items.len()).any(|i| self.is_navigable(i)) => {
                self.set_active(None, true);
            }
            // Boundary without wrap.
            None => {}
        }
    }

    fn set_active(&mut self, index: Option<usize>, emit: bool) {
        let changed = index != self.active_index;
        self.active_index = index;
        self.active_key = index
            .and_then(|i| self.items.get(i))
            .map(|entry| entry.key.clone());

        if changed {
            tracing::trace!(target: TARGET, ?index, emit, "active item changed");
            if emit {
                self.change.emit(index);
            }
        }
    }
}

impl<K: std::fmt::Debug> std::fmt::Debug for KeyboardItemCycler<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardItemCycler")
            .field("items", &self.items)
            .field("active_index", &self.active_index)
            .field("config", &self.config)
            .finish()
    }
}

static_assertions::assert_impl_all!(KeyboardItemCycler<horizon_select_core::ItemId>: Send, Sync);
