//! Chip list controller.
//!
//! [`ChipListController`] drives an interactive collection of chips. It
//! combines a [`SelectionRegistry`] with a [`KeyboardItemCycler`] and adds the
//! list-level behavior on top:
//!
//! - user selection that respects disabled and non-selectable chips
//! - Backspace from an empty text input moves focus onto the last chip
//! - when a focused chip is removed, focus moves to its neighbor, or to the
//!   text input once the list is empty
//! - two-way value sync with an external form model, matching chips by value
//!   through the registry's comparison function
//!
//! Every public call emits at most one `change` notification, after its state
//! is fully consistent.
//!
//! # Example
//!
//! ```
//! use horizon_select::widget::widgets::{Chip, ChipListConfig, ChipListController, ChipListValue};
//!
//! let mut chips = ChipListController::new(ChipListConfig::new().multiple(true));
//! let ids = chips.on_children_changed(vec![Chip::new("a"), Chip::new("b"), Chip::new("c")]);
//!
//! chips.select_chip(ids[2])?;
//! chips.select_chip(ids[0])?;
//!
//! assert_eq!(chips.value(), ChipListValue::Multiple(vec!["a", "c"]));
//! # Ok::<(), horizon_select::SelectError>(())
//! ```

use horizon_select_core::logging::{span_names, targets};
use horizon_select_core::{ItemId, PerfSpan, Result, SelectError, Signal};
use slotmap::SecondaryMap;

use super::chip::{Chip, ChipKey};
use crate::model::{SelectionChange, SelectionMode, SelectionRegistry};
use crate::widget::capability::{HasDisabledState, ThemePalette};
use crate::widget::{CycleEntry, CyclerConfig, KeyOutcome, KeyboardItemCycler, Orientation};

const TARGET: &str = targets::CHIPS;

/// Configuration for a [`ChipListController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChipListConfig {
    /// Allow several chips to be selected.
    pub multiple: bool,
    /// Allow the user to select chips at all.
    pub selectable: bool,
    /// Disable the whole list.
    pub disabled: bool,
    /// Keyboard navigation settings.
    pub cycler: CyclerConfig,
}

impl Default for ChipListConfig {
    fn default() -> Self {
        Self {
            multiple: false,
            selectable: true,
            disabled: false,
            cycler: CyclerConfig::new().wrap(true).orientation(Orientation::Both),
        }
    }
}

impl ChipListConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable multiple selection.
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Enable or disable user selection.
    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Disable or enable the list.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the keyboard navigation settings.
    pub fn cycler(mut self, cycler: CyclerConfig) -> Self {
        self.cycler = cycler;
        self
    }

    fn selection_mode(&self) -> SelectionMode {
        if self.multiple {
            SelectionMode::Multiple
        } else {
            SelectionMode::Single
        }
    }
}

/// The value of a chip list, shaped by its selection mode.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ChipListValue<V> {
    /// Single selection: the selected value, if any.
    Single(Option<V>),
    /// Multiple selection: the selected values in chip order.
    Multiple(Vec<V>),
}

impl<V> ChipListValue<V> {
    /// Whether no value is selected.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(value) => value.is_none(),
            Self::Multiple(values) => values.is_empty(),
        }
    }

    /// The selected values as a vector.
    pub fn into_vec(self) -> Vec<V> {
        match self {
            Self::Single(value) => value.into_iter().collect(),
            Self::Multiple(values) => values,
        }
    }
}

/// Payload of [`ChipListController::change`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipListChange<V> {
    /// The list's value after the change.
    pub value: ChipListValue<V>,
    /// Whether the change came from user interaction.
    pub user_input: bool,
}

/// Where keyboard focus is within the chip list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    /// A chip has focus.
    Chip(ItemId),
    /// The associated text input has focus.
    Input,
    /// Nothing in the list has focus.
    #[default]
    None,
}

/// The element a key event was dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTarget {
    /// A chip.
    Chip(ItemId),
    /// The text input. `empty` is true when the input has no text before the
    /// caret.
    Input { empty: bool },
    /// Anything else.
    Other,
}

/// Settings for the text input that feeds a chip list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChipInputConfig {
    /// Keys that finish the current entry and emit `chip_end`.
    pub separator_keys: Vec<ChipKey>,
    /// Emit `chip_end` when the input loses focus.
    pub add_on_blur: bool,
}

impl Default for ChipInputConfig {
    fn default() -> Self {
        Self {
            separator_keys: vec![ChipKey::Enter],
            add_on_blur: false,
        }
    }
}

impl ChipInputConfig {
    /// Create a configuration with Enter as the only separator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the separator keys.
    pub fn separator_keys(mut self, keys: impl IntoIterator<Item = ChipKey>) -> Self {
        self.separator_keys = keys.into_iter().collect();
        self
    }

    /// Enable or disable ending the entry on blur.
    pub fn add_on_blur(mut self, add_on_blur: bool) -> Self {
        self.add_on_blur = add_on_blur;
        self
    }

    /// Whether `key` finishes an entry.
    pub fn is_separator(&self, key: ChipKey) -> bool {
        self.separator_keys.contains(&key)
    }
}

#[derive(Debug, Clone, Copy)]
struct ChipAux {
    selectable: bool,
    removable: bool,
    color: Option<ThemePalette>,
}

/// Drives selection, keyboard focus and value sync for a list of chips.
///
/// # Signals
///
/// - `change`: selection changed; emitted at most once per public call
/// - `focus_changed`: the focused element changed
/// - `remove_requested`: the user asked to remove a chip (Delete/Backspace);
///   the host decides whether to call [`remove_chip`](Self::remove_chip)
/// - `state_changes`: anything the host may want to re-render changed
/// - `chip_end`: the text input finished an entry; carries the input text
///
/// After [`tear_down`](Self::tear_down) every mutating call is a no-op.
pub struct ChipListController<V> {
    config: ChipListConfig,
    registry: SelectionRegistry<V>,
    cycler: KeyboardItemCycler<ItemId>,
    aux: SecondaryMap<ItemId, ChipAux>,
    focus: FocusTarget,
    input_registered: bool,
    input_config: ChipInputConfig,
    input_text: String,
    input_empty: bool,
    torn_down: bool,

    /// Emitted when the selection changes.
    pub change: Signal<ChipListChange<V>>,
    /// Emitted when focus moves.
    pub focus_changed: Signal<FocusTarget>,
    /// Emitted when the user asks to remove a chip.
    pub remove_requested: Signal<ItemId>,
    /// Emitted when displayed state changes.
    pub state_changes: Signal<()>,
    /// Emitted when the text input finishes an entry.
    pub chip_end: Signal<String>,
}

impl<V: Clone + PartialEq + 'static> ChipListController<V> {
    /// Create an empty chip list comparing values with `PartialEq`.
    pub fn new(config: ChipListConfig) -> Self {
        Self::from_registry(config, SelectionRegistry::new(config.selection_mode()))
    }
}

impl<V: Clone + PartialEq + 'static> Default for ChipListController<V> {
    fn default() -> Self {
        Self::new(ChipListConfig::default())
    }
}

impl<V: Clone + 'static> ChipListController<V> {
    /// Create an empty chip list with a custom value comparison.
    pub fn with_compare<F>(config: ChipListConfig, compare: F) -> Self
    where
        F: Fn(&V, &V) -> bool + Send + Sync + 'static,
    {
        Self::from_registry(
            config,
            SelectionRegistry::with_compare(config.selection_mode(), compare),
        )
    }

    fn from_registry(config: ChipListConfig, registry: SelectionRegistry<V>) -> Self {
        Self {
            config,
            registry,
            cycler: KeyboardItemCycler::new(config.cycler),
            aux: SecondaryMap::new(),
            focus: FocusTarget::None,
            input_registered: false,
            input_config: ChipInputConfig::default(),
            input_text: String::new(),
            input_empty: true,
            torn_down: false,
            change: Signal::new(),
            focus_changed: Signal::new(),
            remove_requested: Signal::new(),
            state_changes: Signal::new(),
            chip_end: Signal::new(),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The configuration.
    pub fn config(&self) -> &ChipListConfig {
        &self.config
    }

    /// The underlying selection registry.
    pub fn registry(&self) -> &SelectionRegistry<V> {
        &self.registry
    }

    /// The underlying keyboard cycler.
    pub fn cycler(&self) -> &KeyboardItemCycler<ItemId> {
        &self.cycler
    }

    /// The chips in display order.
    pub fn chips(&self) -> &[ItemId] {
        self.registry.ids()
    }

    /// Number of chips.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether the list shows nothing: no chips and no text in the input.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty() && (!self.input_registered || self.input_empty)
    }

    /// The selected chips in display order.
    pub fn selected(&self) -> Vec<ItemId> {
        self.registry.selected_items()
    }

    /// The list's current value.
    pub fn value(&self) -> ChipListValue<V> {
        match self.registry.mode() {
            SelectionMode::Single => ChipListValue::Single(
                self.registry
                    .selected_item()
                    .and_then(|id| self.registry.value(id))
                    .cloned(),
            ),
            SelectionMode::Multiple => ChipListValue::Multiple(self.registry.selected_values()),
        }
    }

    /// Whether a chip is selected.
    pub fn is_chip_selected(&self, id: ItemId) -> bool {
        self.registry.is_selected(id)
    }

    /// A chip's value.
    pub fn chip_value(&self, id: ItemId) -> Option<&V> {
        self.registry.value(id)
    }

    /// A chip's theme color.
    pub fn chip_color(&self, id: ItemId) -> Option<ThemePalette> {
        self.aux.get(id).and_then(|aux| aux.color)
    }

    /// Whether the user can currently change a chip's selection.
    pub fn is_chip_selectable(&self, id: ItemId) -> bool {
        self.config.selectable
            && !self.config.disabled
            && !self.registry.is_disabled(id)
            && self.aux.get(id).is_some_and(|aux| aux.selectable)
    }

    /// Where focus currently is.
    pub fn focus_target(&self) -> FocusTarget {
        self.focus
    }

    /// Whether [`tear_down`](Self::tear_down) has been called.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Append a chip. Returns `None` after teardown.
    pub fn add_chip(&mut self, chip: Chip<V>) -> Option<ItemId> {
        let index = self.registry.len();
        self.insert_chip(index, chip)
    }

    /// Insert a chip at `index` (clamped). Returns `None` after teardown.
    pub fn insert_chip(&mut self, index: usize, chip: Chip<V>) -> Option<ItemId> {
        if self.torn_down {
            return None;
        }

        let before = self.registry.selected_items();
        let id = self.register_chip(Some(index), chip);
        self.sync_cycler();
        tracing::debug!(target: TARGET, %id, index, "chip added");

        self.emit_change_if_changed(&before, false);
        self.state_changes.emit(());
        Some(id)
    }

    /// Rebuild the list from a new chip sequence.
    ///
    /// Every chip gets a fresh [`ItemId`]. Chips flagged as selected are
    /// selected, then each previously selected value is selected again on the
    /// first chip whose value matches it. A focused chip keeps focus when a
    /// chip with a matching value survives; otherwise focus moves to the chip
    /// now at its old position. Returns the new ids in order.
    pub fn on_children_changed(&mut self, chips: Vec<Chip<V>>) -> Vec<ItemId> {
        if self.torn_down {
            return Vec::new();
        }
        let _perf = PerfSpan::new("chip_list_rebuild");
        let _span = tracing::debug_span!(target: TARGET, span_names::CHIP_SYNC, count = chips.len()).entered();

        let previous_ids = self.registry.selected_items();
        let previous_values = self.registry.selected_values();
        let previous_focus = match self.focus {
            FocusTarget::Chip(id) => self
                .registry
                .index_of(id)
                .map(|index| (index, self.registry.value(id).cloned())),
            _ => None,
        };

        self.registry.selection_changed.set_blocked(true);
        for id in self.registry.ids().to_vec() {
            self.registry.deregister(id);
        }
        self.aux.clear();

        let ids: Vec<ItemId> = chips
            .into_iter()
            .map(|chip| self.register_chip(None, chip))
            .collect();

        for value in &previous_values {
            self.registry.select_value(value);
        }
        self.registry.selection_changed.set_blocked(false);

        let current_ids = self.registry.selected_items();
        if !previous_ids.is_empty() || !current_ids.is_empty() {
            self.registry.selection_changed.emit(SelectionChange {
                selected: current_ids,
                deselected: previous_ids,
            });
        }

        self.sync_cycler();

        if let Some((old, value)) = previous_focus {
            let target = match ids.len().checked_sub(1) {
                Some(last) => {
                    let index = value
                        .and_then(|value| self.registry.find_by_value(&value))
                        .and_then(|id| self.registry.index_of(id))
                        .unwrap_or_else(|| old.min(last));
                    self.cycler.update_active_item_index(index);
                    FocusTarget::Chip(ids[index])
                }
                None => self.fallback_focus(),
            };
            self.set_focus(target);
        }

        tracing::debug!(target: TARGET, count = ids.len(), "chips rebuilt");

        let current_values = self.registry.selected_values();
        if !self.values_match(&previous_values, &current_values) {
            self.emit_change(false);
        }
        self.state_changes.emit(());
        ids
    }

    /// Remove a chip at the host's request.
    ///
    /// Same as [`handle_item_removed`](Self::handle_item_removed).
    pub fn remove_chip(&mut self, id: ItemId) -> Result<()> {
        self.handle_item_removed(id)
    }

    /// Forget a chip that has been torn down and hand its focus on.
    ///
    /// If the chip had focus, focus moves to the chip now at its position,
    /// or to the new last chip when it was last. An emptied list hands focus
    /// to the text input if one is registered.
    pub fn handle_item_removed(&mut self, id: ItemId) -> Result<()> {
        if self.torn_down {
            return Ok(());
        }
        let index = self.registry.index_of(id).ok_or(SelectError::InvalidItem(id))?;

        let before = self.registry.selected_items();
        let had_focus = self.focus == FocusTarget::Chip(id);

        self.registry.deregister(id);
        self.aux.remove(id);
        self.sync_cycler();

        if had_focus {
            let target = match self.registry.len().checked_sub(1) {
                Some(last) => {
                    let new_index = index.min(last);
                    self.cycler.set_active_item(new_index);
                    self.registry
                        .id_at(new_index)
                        .map_or(FocusTarget::None, FocusTarget::Chip)
                }
                None => {
                    self.cycler.clear_active();
                    self.fallback_focus()
                }
            };
            tracing::debug!(target: TARGET, %id, index, ?target, "focused chip removed");
            self.set_focus(target);
        } else {
            tracing::debug!(target: TARGET, %id, index, "chip removed");
        }

        self.emit_change_if_changed(&before, false);
        self.state_changes.emit(());
        Ok(())
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select a chip on behalf of the user.
    ///
    /// Ignored (returns `Ok(false)`) for disabled or non-selectable chips and
    /// for disabled or non-selectable lists.
    pub fn select_chip(&mut self, id: ItemId) -> Result<bool> {
        self.user_selection(id, |registry| registry.select(id))
    }

    /// Deselect a chip on behalf of the user.
    pub fn deselect_chip(&mut self, id: ItemId) -> Result<bool> {
        self.user_selection(id, |registry| registry.deselect(id))
    }

    /// Toggle a chip on behalf of the user. Returns whether anything changed.
    pub fn toggle_chip(&mut self, id: ItemId) -> Result<bool> {
        self.user_selection(id, |registry| registry.toggle(id).map(|_| true))
    }

    /// Replace the selection with the chips matching an external value.
    ///
    /// Values without a matching chip are ignored. In single mode a
    /// [`ChipListValue::Multiple`] selects its last matching value.
    pub fn set_value_from_external(&mut self, value: ChipListValue<V>) {
        if self.torn_down {
            return;
        }

        let before = self.registry.selected_items();
        self.select_values(value.into_vec());
        self.emit_change_if_changed(&before, false);
    }

    // =========================================================================
    // Keyboard and Focus
    // =========================================================================

    /// Handle a key pressed on a chip or on the text input.
    pub fn handle_key(&mut self, key: ChipKey, target: KeyTarget) -> KeyOutcome {
        if self.torn_down || self.config.disabled {
            return KeyOutcome::Ignored;
        }
        if let KeyTarget::Input { empty } = target {
            self.input_empty = empty;
        }

        match (key, target) {
            (ChipKey::Backspace, KeyTarget::Input { empty: true }) => {
                if self.registry.is_empty() {
                    return KeyOutcome::Ignored;
                }
                self.cycler.set_last_item_active();
                self.focus_active_chip();
                KeyOutcome::Consumed
            }
            (key, KeyTarget::Input { .. }) if self.input_config.is_separator(key) => {
                self.emit_chip_end();
                KeyOutcome::Consumed
            }
            (ChipKey::Backspace | ChipKey::Delete, KeyTarget::Chip(id)) => {
                let removable = self.aux.get(id).is_some_and(|aux| aux.removable);
                if !removable || self.registry.is_disabled(id) {
                    return KeyOutcome::Ignored;
                }
                tracing::debug!(target: TARGET, %id, "chip removal requested");
                self.remove_requested.emit(id);
                KeyOutcome::Consumed
            }
            (ChipKey::Space, KeyTarget::Chip(id)) => {
                if self.registry.contains(id) {
                    let _ = self.toggle_chip(id);
                }
                KeyOutcome::Consumed
            }
            (ChipKey::Navigation(key), KeyTarget::Chip(id)) => {
                if let Some(index) = self.registry.index_of(id) {
                    self.cycler.update_active_item_index(index);
                }
                let outcome = self.cycler.on_key(key);
                if outcome.is_consumed() {
                    self.focus_active_chip();
                }
                outcome
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// Announce that the list has an associated text input, with Enter as
    /// its separator.
    pub fn register_input(&mut self) {
        self.register_input_with(ChipInputConfig::default());
    }

    /// Announce an associated text input with its own settings.
    pub fn register_input_with(&mut self, config: ChipInputConfig) {
        self.input_registered = true;
        self.input_config = config;
    }

    /// The text input settings.
    pub fn input_config(&self) -> &ChipInputConfig {
        &self.input_config
    }

    /// The text last reported for the input.
    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    /// Forget the associated text input.
    pub fn unregister_input(&mut self) {
        self.input_registered = false;
        self.input_text.clear();
        self.input_empty = true;
        if self.focus == FocusTarget::Input {
            self.set_focus(FocusTarget::None);
        }
    }

    /// Record whether the text input holds any text.
    pub fn set_input_empty(&mut self, empty: bool) {
        self.input_empty = empty;
    }

    /// Record the text input's current contents.
    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.input_text = text.into();
        self.input_empty = self.input_text.is_empty();
    }

    /// Record the text input gaining or losing focus.
    pub fn set_input_focused(&mut self, focused: bool) {
        if self.torn_down || !self.input_registered {
            return;
        }
        if focused {
            self.set_focus(FocusTarget::Input);
            return;
        }
        if self.input_config.add_on_blur {
            self.emit_chip_end();
        }
        if self.focus == FocusTarget::Input {
            self.set_focus(FocusTarget::None);
        }
    }

    /// Focus the list: the first chip, or the text input when there are no
    /// chips.
    pub fn focus(&mut self) {
        if self.torn_down || self.config.disabled || self.focus == FocusTarget::Input {
            return;
        }

        if self.registry.is_empty() {
            let target = self.fallback_focus();
            self.set_focus(target);
        } else {
            self.cycler.set_first_item_active();
            self.focus_active_chip();
        }
        self.state_changes.emit(());
    }

    /// Record a chip gaining focus, for example from a pointer press.
    pub fn chip_focused(&mut self, id: ItemId) -> Result<()> {
        if self.torn_down {
            return Ok(());
        }
        let index = self.registry.index_of(id).ok_or(SelectError::InvalidItem(id))?;
        self.cycler.update_active_item_index(index);
        self.set_focus(FocusTarget::Chip(id));
        Ok(())
    }

    /// Record focus leaving the list.
    pub fn blur(&mut self) {
        if !self.torn_down {
            self.set_focus(FocusTarget::None);
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Disable or enable the list.
    pub fn set_disabled(&mut self, disabled: bool) {
        if self.torn_down || self.config.disabled == disabled {
            return;
        }
        self.config.disabled = disabled;
        self.state_changes.emit(());
    }

    /// Allow or forbid user selection.
    pub fn set_selectable(&mut self, selectable: bool) {
        if self.torn_down || self.config.selectable == selectable {
            return;
        }
        self.config.selectable = selectable;
        self.state_changes.emit(());
    }

    /// Switch between single and multiple selection.
    ///
    /// Leaving multiple mode keeps only the most recently selected chip.
    pub fn set_multiple(&mut self, multiple: bool) {
        if self.torn_down || self.config.multiple == multiple {
            return;
        }
        let before = self.registry.selected_items();
        self.config.multiple = multiple;
        self.registry.set_mode(self.config.selection_mode());
        self.emit_change_if_changed(&before, false);
    }

    /// Replace the value comparison and re-apply the current value with it.
    pub fn set_compare_with<F>(&mut self, compare: F)
    where
        F: Fn(&V, &V) -> bool + Send + Sync + 'static,
    {
        if self.torn_down {
            return;
        }
        let before = self.registry.selected_items();
        let values = self.registry.selected_values();
        self.registry.set_compare_with(compare);
        self.select_values(values);
        self.emit_change_if_changed(&before, false);
    }

    /// Disable or enable a single chip.
    pub fn set_chip_disabled(&mut self, id: ItemId, disabled: bool) -> Result<()> {
        if self.torn_down {
            return Ok(());
        }
        self.registry.set_disabled(id, disabled)?;
        self.cycler.set_item_disabled(&id, disabled);
        self.state_changes.emit(());
        Ok(())
    }

    /// Stop reacting to anything and disconnect every observer.
    pub fn tear_down(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.change.disconnect_all();
        self.focus_changed.disconnect_all();
        self.remove_requested.disconnect_all();
        self.state_changes.disconnect_all();
        self.chip_end.disconnect_all();
        self.cycler.change.disconnect_all();
        self.cycler.tab_out.disconnect_all();
        self.registry.selection_changed.disconnect_all();
        tracing::debug!(target: TARGET, "chip list torn down");
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn register_chip(&mut self, index: Option<usize>, chip: Chip<V>) -> ItemId {
        let id = match index {
            Some(index) => self.registry.register_at(index, chip.value),
            None => self.registry.register(chip.value),
        };
        // Freshly registered, so these cannot fail.
        let _ = self.registry.set_disabled(id, chip.disabled);
        if chip.selected {
            let _ = self.registry.select(id);
        }
        self.aux.insert(
            id,
            ChipAux {
                selectable: chip.selectable,
                removable: chip.removable,
                color: chip.color,
            },
        );
        id
    }

    fn sync_cycler(&mut self) {
        let entries = self
            .registry
            .ids()
            .iter()
            .map(|&id| CycleEntry::new(id).disabled(self.registry.is_disabled(id)))
            .collect();
        self.cycler.update_items(entries);
    }

    fn select_values(&mut self, values: Vec<V>) {
        self.registry.clear(None);
        for value in &values {
            self.registry.select_value(value);
        }
    }

    fn user_selection<F>(&mut self, id: ItemId, op: F) -> Result<bool>
    where
        F: FnOnce(&mut SelectionRegistry<V>) -> Result<bool>,
    {
        if self.torn_down {
            return Ok(false);
        }
        if !self.registry.contains(id) {
            return Err(SelectError::InvalidItem(id));
        }
        if !self.is_chip_selectable(id) {
            return Ok(false);
        }

        let changed = op(&mut self.registry)?;
        if changed {
            if let Some(index) = self.registry.index_of(id) {
                self.cycler.update_active_item_index(index);
            }
            self.emit_change(true);
        }
        Ok(changed)
    }

    fn fallback_focus(&self) -> FocusTarget {
        if self.input_registered {
            FocusTarget::Input
        } else {
            FocusTarget::None
        }
    }

    fn focus_active_chip(&mut self) {
        let target = self
            .cycler
            .active_item()
            .copied()
            .map_or_else(|| self.fallback_focus(), FocusTarget::Chip);
        self.set_focus(target);
    }

    fn set_focus(&mut self, target: FocusTarget) {
        if self.focus != target {
            self.focus = target;
            self.focus_changed.emit(target);
        }
    }

    fn values_match(&self, a: &[V], b: &[V]) -> bool {
        let compare = self.registry.compare_with();
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| compare(x, y))
    }

    fn emit_change_if_changed(&self, before: &[ItemId], user_input: bool) {
        if self.registry.selected_items() != before {
            self.emit_change(user_input);
        }
    }

    fn emit_chip_end(&self) {
        tracing::debug!(target: TARGET, len = self.input_text.len(), "chip entry ended");
        self.chip_end.emit(self.input_text.clone());
    }

    fn emit_change(&self, user_input: bool) {
        self.change.emit(ChipListChange {
            value: self.value(),
            user_input,
        });
    }
}

impl<V: Clone + 'static> HasDisabledState for ChipListController<V> {
    fn is_disabled(&self) -> bool {
        self.config.disabled
    }

    fn set_disabled(&mut self, disabled: bool) {
        ChipListController::set_disabled(self, disabled);
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for ChipListController<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChipListController")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("focus", &self.focus)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

static_assertions::assert_impl_all!(ChipListController<String>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::NavigationKey;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn list(multiple: bool, values: &[&'static str]) -> (ChipListController<&'static str>, Vec<ItemId>) {
        let mut list = ChipListController::new(ChipListConfig::new().multiple(multiple));
        let ids = list.on_children_changed(values.iter().map(|&v| Chip::new(v)).collect());
        (list, ids)
    }

    fn record_changes<V: Clone + Send + 'static>(
        list: &ChipListController<V>,
    ) -> Arc<Mutex<Vec<ChipListChange<V>>>> {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let changes_clone = changes.clone();
        list.change.connect(move |change| changes_clone.lock().push(change.clone()));
        changes
    }

    #[test]
    fn test_single_selection_value() {
        let (mut list, ids) = list(false, &["a", "b"]);
        list.select_chip(ids[0]).unwrap();
        list.select_chip(ids[1]).unwrap();
        assert_eq!(list.value(), ChipListValue::Single(Some("b")));
        assert_eq!(list.selected(), vec![ids[1]]);
    }

    #[test]
    fn test_disabled_and_unselectable_chips_ignore_user_selection() {
        let mut list = ChipListController::new(ChipListConfig::new());
        let disabled = list.add_chip(Chip::new(1).with_disabled(true)).unwrap();
        let fixed = list.add_chip(Chip::new(2).with_selectable(false)).unwrap();
        let changes = record_changes(&list);

        assert!(!list.select_chip(disabled).unwrap());
        assert!(!list.select_chip(fixed).unwrap());
        assert!(changes.lock().is_empty());

        // Programmatic values still reach them.
        list.set_value_from_external(ChipListValue::Single(Some(1)));
        assert!(list.is_chip_selected(disabled));
    }

    #[test]
    fn test_disabled_list_ignores_user_selection() {
        let (mut list, ids) = list(true, &["a"]);
        list.set_disabled(true);
        assert!(list.is_disabled());
        assert!(!list.toggle_chip(ids[0]).unwrap());
        assert_eq!(
            list.handle_key(ChipKey::Space, KeyTarget::Chip(ids[0])),
            KeyOutcome::Ignored
        );
    }

    #[test]
    fn test_unknown_chip_is_rejected() {
        let (mut list, ids) = list(true, &["a", "b"]);
        list.remove_chip(ids[1]).unwrap();
        assert_eq!(list.select_chip(ids[1]), Err(SelectError::InvalidItem(ids[1])));
        assert_eq!(list.remove_chip(ids[1]), Err(SelectError::InvalidItem(ids[1])));
        assert_eq!(list.chip_focused(ids[1]), Err(SelectError::InvalidItem(ids[1])));
    }

    #[test]
    fn test_one_change_per_external_call() {
        let (mut list, _ids) = list(true, &["a", "b", "c"]);
        let changes = record_changes(&list);

        list.set_value_from_external(ChipListValue::Multiple(vec!["c", "a", "b"]));

        let changes = changes.lock();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].value, ChipListValue::Multiple(vec!["a", "b", "c"]));
        assert!(!changes[0].user_input);
    }

    #[test]
    fn test_external_value_without_change_is_silent() {
        let (mut list, _ids) = list(false, &["a", "b"]);
        list.set_value_from_external(ChipListValue::Single(Some("a")));
        let changes = record_changes(&list);

        list.set_value_from_external(ChipListValue::Single(Some("a")));
        list.set_value_from_external(ChipListValue::Single(Some("zzz")));
        list.set_value_from_external(ChipListValue::Single(Some("zzz")));

        assert_eq!(changes.lock().len(), 1);
        assert_eq!(list.value(), ChipListValue::Single(None));
    }

    #[test]
    fn test_single_mode_multiple_value_last_match_wins() {
        let (mut list, ids) = list(false, &["a", "b", "c"]);
        list.set_value_from_external(ChipListValue::Multiple(vec!["c", "a"]));
        assert_eq!(list.selected(), vec![ids[0]]);
    }

    #[test]
    fn test_rebuild_reapplies_selected_values() {
        let (mut list, ids) = list(true, &["a", "b", "c"]);
        list.select_chip(ids[1]).unwrap();
        list.select_chip(ids[2]).unwrap();
        let changes = record_changes(&list);

        let new_ids = list.on_children_changed(vec![Chip::new("c"), Chip::new("b"), Chip::new("d")]);

        assert!(new_ids.iter().all(|id| !ids.contains(id)));
        assert_eq!(list.selected(), vec![new_ids[0], new_ids[1]]);
        // Order of the value follows chip order, so it changed.
        assert_eq!(changes.lock().len(), 1);
        assert_eq!(list.value(), ChipListValue::Multiple(vec!["c", "b"]));
    }

    #[test]
    fn test_rebuild_with_same_values_is_silent() {
        let (mut list, ids) = list(true, &["a", "b"]);
        list.select_chip(ids[0]).unwrap();
        let changes = record_changes(&list);

        list.on_children_changed(vec![Chip::new("a"), Chip::new("b")]);

        assert!(changes.lock().is_empty());
        assert_eq!(list.value(), ChipListValue::Multiple(vec!["a"]));
    }

    #[test]
    fn test_rebuild_with_custom_compare() {
        let mut list = ChipListController::with_compare(
            ChipListConfig::new(),
            |a: &(u32, &'static str), b: &(u32, &'static str)| a.0 == b.0,
        );
        let ids = list.on_children_changed(vec![Chip::new((1, "one")), Chip::new((2, "two"))]);
        list.select_chip(ids[1]).unwrap();

        let new_ids = list.on_children_changed(vec![Chip::new((2, "TWO")), Chip::new((3, "three"))]);

        assert_eq!(list.selected(), vec![new_ids[0]]);
        assert_eq!(list.value(), ChipListValue::Single(Some((2, "TWO"))));
    }

    #[test]
    fn test_rebuild_focus_follows_chip_value() {
        let (mut list, ids) = list(false, &["a", "b", "c"]);
        list.chip_focused(ids[2]).unwrap();

        let new_ids = list.on_children_changed(vec![
            Chip::new("z"),
            Chip::new("a"),
            Chip::new("b"),
            Chip::new("c"),
        ]);

        assert_eq!(list.focus_target(), FocusTarget::Chip(new_ids[3]));
        assert_eq!(list.cycler().active_index(), Some(3));
    }

    #[test]
    fn test_rebuild_focus_falls_back_to_old_position() {
        let (mut list, ids) = list(false, &["a", "b", "c"]);
        list.chip_focused(ids[2]).unwrap();

        let new_ids = list.on_children_changed(vec![Chip::new("x"), Chip::new("y")]);

        assert_eq!(list.focus_target(), FocusTarget::Chip(new_ids[1]));
        assert_eq!(list.cycler().active_index(), Some(1));
    }

    #[test]
    fn test_rebuild_notifies_registry_once() {
        let (mut list, ids) = list(true, &["a", "b", "c"]);
        list.select_chip(ids[0]).unwrap();
        list.select_chip(ids[1]).unwrap();

        let notifications = Arc::new(Mutex::new(Vec::new()));
        let notifications_clone = notifications.clone();
        list.registry()
            .selection_changed
            .connect(move |change: &SelectionChange| notifications_clone.lock().push(change.clone()));

        let new_ids = list.on_children_changed(vec![Chip::new("a"), Chip::new("b"), Chip::new("c")]);

        let notifications = notifications.lock();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].selected, vec![new_ids[0], new_ids[1]]);
        assert_eq!(notifications[0].deselected, vec![ids[0], ids[1]]);
        assert!(!list.registry().selection_changed.is_blocked());
    }

    #[test]
    fn test_separator_key_ends_entry() {
        let (mut list, _ids) = list(true, &["a"]);
        list.register_input_with(ChipInputConfig::new().separator_keys([ChipKey::Enter, ChipKey::Char(',')]));
        let ended = Arc::new(Mutex::new(Vec::new()));
        let ended_clone = ended.clone();
        list.chip_end.connect(move |text: &String| ended_clone.lock().push(text.clone()));

        list.set_input_text("rust");
        assert!(list
            .handle_key(ChipKey::Char(','), KeyTarget::Input { empty: false })
            .is_consumed());
        assert_eq!(
            list.handle_key(ChipKey::Char('x'), KeyTarget::Input { empty: false }),
            KeyOutcome::Ignored
        );
        list.set_input_text("go");
        assert!(list
            .handle_key(ChipKey::Enter, KeyTarget::Input { empty: false })
            .is_consumed());

        assert_eq!(*ended.lock(), vec!["rust".to_string(), "go".to_string()]);
    }

    #[test]
    fn test_blur_ends_entry_only_with_add_on_blur() {
        let (mut list, _ids) = list(false, &["a"]);
        list.register_input();
        let ended = Arc::new(Mutex::new(Vec::new()));
        let ended_clone = ended.clone();
        list.chip_end.connect(move |text: &String| ended_clone.lock().push(text.clone()));

        list.set_input_text("draft");
        list.set_input_focused(true);
        list.set_input_focused(false);
        assert!(ended.lock().is_empty());

        list.register_input_with(ChipInputConfig::new().add_on_blur(true));
        list.set_input_focused(true);
        list.set_input_focused(false);
        assert_eq!(*ended.lock(), vec!["draft".to_string()]);
        assert_eq!(list.focus_target(), FocusTarget::None);
    }

    #[test]
    fn test_set_compare_with_reapplies_value() {
        let mut list = ChipListController::new(ChipListConfig::new());
        let ids = list.on_children_changed(vec![Chip::new("Apple".to_string()), Chip::new("apple".to_string())]);
        list.select_chip(ids[1]).unwrap();

        list.set_compare_with(|a: &String, b: &String| a.eq_ignore_ascii_case(b));

        assert_eq!(list.selected(), vec![ids[0]]);
    }

    #[test]
    fn test_removing_focused_chip_hands_focus_to_neighbor() {
        let (mut list, ids) = list(false, &["a", "b", "c"]);
        list.chip_focused(ids[1]).unwrap();

        list.remove_chip(ids[1]).unwrap();

        assert_eq!(list.cycler().active_index(), Some(1));
        assert_eq!(list.focus_target(), FocusTarget::Chip(ids[2]));
    }

    #[test]
    fn test_removing_last_focused_chip_moves_to_new_last() {
        let (mut list, ids) = list(false, &["a", "b", "c"]);
        list.chip_focused(ids[2]).unwrap();

        list.remove_chip(ids[2]).unwrap();

        assert_eq!(list.cycler().active_index(), Some(1));
        assert_eq!(list.focus_target(), FocusTarget::Chip(ids[1]));
    }

    #[test]
    fn test_removing_only_chip_falls_back_to_input() {
        let (mut list, ids) = list(false, &["a"]);
        list.register_input();
        list.chip_focused(ids[0]).unwrap();

        list.remove_chip(ids[0]).unwrap();

        assert_eq!(list.focus_target(), FocusTarget::Input);
        assert_eq!(list.cycler().active_index(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_removing_unfocused_chip_keeps_focus() {
        let (mut list, ids) = list(false, &["a", "b", "c"]);
        list.chip_focused(ids[2]).unwrap();

        list.remove_chip(ids[0]).unwrap();

        assert_eq!(list.focus_target(), FocusTarget::Chip(ids[2]));
        assert_eq!(list.cycler().active_index(), Some(1));
    }

    #[test]
    fn test_removing_selected_chip_emits_change() {
        let (mut list, ids) = list(true, &["a", "b"]);
        list.select_chip(ids[0]).unwrap();
        let changes = record_changes(&list);

        list.remove_chip(ids[0]).unwrap();

        assert_eq!(changes.lock().len(), 1);
        assert_eq!(list.value(), ChipListValue::Multiple(Vec::new()));
    }

    #[test]
    fn test_backspace_on_empty_input_focuses_last_chip() {
        let (mut list, ids) = list(false, &["a", "b", "c"]);
        list.register_input();
        list.set_input_focused(true);

        assert_eq!(
            list.handle_key(ChipKey::Backspace, KeyTarget::Input { empty: false }),
            KeyOutcome::Ignored
        );
        assert_eq!(list.focus_target(), FocusTarget::Input);

        assert_eq!(
            list.handle_key(ChipKey::Backspace, KeyTarget::Input { empty: true }),
            KeyOutcome::Consumed
        );
        assert_eq!(list.focus_target(), FocusTarget::Chip(ids[2]));
        // Nothing was removed.
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_delete_on_chip_requests_removal() {
        let mut list = ChipListController::new(ChipListConfig::new());
        let removable = list.add_chip(Chip::new("a")).unwrap();
        let fixed = list.add_chip(Chip::new("b").with_removable(false)).unwrap();

        let requested = Arc::new(Mutex::new(Vec::new()));
        let requested_clone = requested.clone();
        list.remove_requested.connect(move |&id| requested_clone.lock().push(id));

        assert!(list.handle_key(ChipKey::Delete, KeyTarget::Chip(removable)).is_consumed());
        assert_eq!(
            list.handle_key(ChipKey::Backspace, KeyTarget::Chip(fixed)),
            KeyOutcome::Ignored
        );

        assert_eq!(*requested.lock(), vec![removable]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_space_toggles_chip() {
        let (mut list, ids) = list(true, &["a", "b"]);
        let changes = record_changes(&list);

        list.handle_key(ChipKey::Space, KeyTarget::Chip(ids[1]));
        assert!(list.is_chip_selected(ids[1]));
        list.handle_key(ChipKey::Space, KeyTarget::Chip(ids[1]));
        assert!(!list.is_chip_selected(ids[1]));

        let changes = changes.lock();
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|change| change.user_input));
    }

    #[test]
    fn test_arrow_keys_move_focus_between_chips() {
        let (mut list, ids) = list(false, &["a", "b", "c"]);
        list.chip_focused(ids[2]).unwrap();

        let outcome = list.handle_key(NavigationKey::Right.into(), KeyTarget::Chip(ids[2]));

        assert!(outcome.is_consumed());
        assert_eq!(list.focus_target(), FocusTarget::Chip(ids[0]));

        list.handle_key(NavigationKey::Up.into(), KeyTarget::Chip(ids[0]));
        assert_eq!(list.focus_target(), FocusTarget::Chip(ids[2]));
    }

    #[test]
    fn test_tab_out_keeps_focus_for_host() {
        let (mut list, ids) = list(false, &["a"]);
        list.chip_focused(ids[0]).unwrap();
        assert_eq!(
            list.handle_key(NavigationKey::Tab.into(), KeyTarget::Chip(ids[0])),
            KeyOutcome::TabOut
        );
        assert_eq!(list.focus_target(), FocusTarget::Chip(ids[0]));
    }

    #[test]
    fn test_focus_prefers_first_enabled_chip_then_input() {
        let mut list = ChipListController::new(ChipListConfig::new());
        list.register_input();
        list.focus();
        assert_eq!(list.focus_target(), FocusTarget::Input);

        list.set_input_focused(false);
        assert_eq!(list.focus_target(), FocusTarget::None);

        let _disabled = list.add_chip(Chip::new("a").with_disabled(true));
        let enabled = list.add_chip(Chip::new("b")).unwrap();
        list.focus();
        assert_eq!(list.focus_target(), FocusTarget::Chip(enabled));
    }

    #[test]
    fn test_focus_changed_signal() {
        let (mut list, ids) = list(false, &["a", "b"]);
        let targets = Arc::new(Mutex::new(Vec::new()));
        let targets_clone = targets.clone();
        list.focus_changed.connect(move |&target| targets_clone.lock().push(target));

        list.chip_focused(ids[0]).unwrap();
        list.chip_focused(ids[0]).unwrap();
        list.blur();

        assert_eq!(*targets.lock(), vec![FocusTarget::Chip(ids[0]), FocusTarget::None]);
    }

    #[test]
    fn test_switching_to_single_keeps_latest_selection() {
        let (mut list, ids) = list(true, &["a", "b", "c"]);
        list.select_chip(ids[2]).unwrap();
        list.select_chip(ids[0]).unwrap();

        list.set_multiple(false);

        assert_eq!(list.value(), ChipListValue::Single(Some("a")));
    }

    #[test]
    fn test_chip_disabled_flag_updates_navigation() {
        let (mut list, ids) = list(false, &["a", "b", "c"]);
        list.set_chip_disabled(ids[1], true).unwrap();
        list.chip_focused(ids[0]).unwrap();

        list.handle_key(NavigationKey::Right.into(), KeyTarget::Chip(ids[0]));

        assert_eq!(list.focus_target(), FocusTarget::Chip(ids[2]));
        assert!(!list.is_chip_selectable(ids[1]));
    }

    #[test]
    fn test_torn_down_controller_ignores_calls() {
        let (mut list, ids) = list(true, &["a", "b"]);
        let changes = record_changes(&list);
        list.tear_down();

        assert_eq!(list.change.connection_count(), 0);
        assert!(list.add_chip(Chip::new("c")).is_none());
        assert!(list.on_children_changed(vec![Chip::new("x")]).is_empty());
        assert_eq!(list.select_chip(ids[0]), Ok(false));
        assert_eq!(list.remove_chip(ids[0]), Ok(()));
        list.set_value_from_external(ChipListValue::Multiple(vec!["a"]));
        list.focus();

        assert!(list.is_torn_down());
        assert_eq!(list.len(), 2);
        assert!(list.selected().is_empty());
        assert_eq!(list.focus_target(), FocusTarget::None);
        assert!(changes.lock().is_empty());
    }

    #[test]
    fn test_chip_colors() {
        let mut list = ChipListController::new(ChipListConfig::new());
        let id = list.add_chip(Chip::new(1).with_color(ThemePalette::Accent)).unwrap();
        assert_eq!(list.chip_color(id), Some(ThemePalette::Accent));
        assert_eq!(list.chip_value(id), Some(&1));
    }
}
