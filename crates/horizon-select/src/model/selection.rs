//! Selection registry for selectable items.
//!
//! This module provides [`SelectionRegistry`], which tracks a set of
//! registered items and their selected/deselected state in either single or
//! multiple selection mode.
//!
//! # Ordering
//!
//! Items keep the order in which they were registered. Every query that
//! returns several selected items ([`SelectionRegistry::selected_items`],
//! [`SelectionRegistry::selected_values`]) reports them in registration order,
//! never in the order the user clicked them. Value arrays pushed out to a form
//! model therefore stay stable no matter how the selection was built. The
//! click order is still recorded and available through
//! [`SelectionRegistry::selection_order`].
//!
//! # Example
//!
//! ```
//! use horizon_select::model::{SelectionMode, SelectionRegistry};
//!
//! let mut registry = SelectionRegistry::new(SelectionMode::Multiple);
//! let a = registry.register(Some("a"));
//! let b = registry.register(Some("b"));
//! let c = registry.register(Some("c"));
//!
//! registry.select(c)?;
//! registry.select(a)?;
//!
//! assert_eq!(registry.selected_items(), vec![a, c]);
//! assert_eq!(registry.selected_values(), vec!["a", "c"]);
//! # let _ = b;
//! # Ok::<(), horizon_select::SelectError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use horizon_select_core::logging::targets;
use horizon_select_core::{ItemId, Result, SelectError, Signal};
use slotmap::SlotMap;

const TARGET: &str = targets::SELECTION;

/// Selection behavior mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SelectionMode {
    /// At most one item is selected; selecting another replaces it (default).
    #[default]
    Single,
    /// Any subset of items may be selected.
    Multiple,
}

/// Payload of [`SelectionRegistry::selection_changed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChange {
    /// Items that became selected.
    pub selected: Vec<ItemId>,
    /// Items that became deselected.
    pub deselected: Vec<ItemId>,
}

impl SelectionChange {
    /// Whether the change carries no transitions.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.deselected.is_empty()
    }
}

/// Equality function used to match item values.
///
/// Must be pure and total. A function that is not gives unspecified results
/// for which item matches a value.
pub type CompareFn<V> = Arc<dyn Fn(&V, &V) -> bool + Send + Sync>;

/// What [`SelectionRegistry::deregister`] hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deregistered<V> {
    /// Position the item occupied before removal.
    pub index: usize,
    /// The item's value.
    pub value: Option<V>,
    /// Whether the item was selected when removed.
    pub was_selected: bool,
}

#[derive(Debug, Clone)]
struct ItemRecord<V> {
    value: Option<V>,
    selected: bool,
    disabled: bool,
}

/// Tracks registered items and their selection state.
///
/// The registry owns a small record per item (value, selected and disabled
/// flags) in an arena keyed by [`ItemId`]. Records are created by
/// [`register`](Self::register) and dropped by
/// [`deregister`](Self::deregister); the items themselves belong to the host.
///
/// # Signals
///
/// - `selection_changed`: emitted once per mutating call that changed
///   anything, with the ids that became selected and deselected
pub struct SelectionRegistry<V> {
    mode: SelectionMode,
    items: SlotMap<ItemId, ItemRecord<V>>,
    /// Registration order.
    order: Vec<ItemId>,
    /// Click order of the currently selected items.
    selection_order: Vec<ItemId>,
    compare: CompareFn<V>,

    /// Emitted when selection changes.
    pub selection_changed: Signal<SelectionChange>,
}

impl<V: PartialEq + 'static> SelectionRegistry<V> {
    /// Creates an empty registry comparing values with `PartialEq`.
    pub fn new(mode: SelectionMode) -> Self {
        Self::with_compare(mode, |a: &V, b: &V| a == b)
    }
}

impl<V: PartialEq + 'static> Default for SelectionRegistry<V> {
    fn default() -> Self {
        Self::new(SelectionMode::default())
    }
}

impl<V: 'static> SelectionRegistry<V> {
    /// Creates an empty registry with a custom value comparison.
    pub fn with_compare<F>(mode: SelectionMode, compare: F) -> Self
    where
        F: Fn(&V, &V) -> bool + Send + Sync + 'static,
    {
        Self {
            mode,
            items: SlotMap::with_key(),
            order: Vec::new(),
            selection_order: Vec::new(),
            compare: Arc::new(compare),
            selection_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Gets the selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Sets the selection mode.
    ///
    /// Switching to [`SelectionMode::Single`] while several items are
    /// selected keeps only the most recently selected one.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
        if mode == SelectionMode::Single && self.selection_order.len() > 1 {
            let keep = self.selection_order.last().copied();
            let deselected = self.deselect_all_except(keep);
            self.emit_change(Vec::new(), deselected);
        }
    }

    /// Replaces the value comparison function.
    pub fn set_compare_with<F>(&mut self, compare: F)
    where
        F: Fn(&V, &V) -> bool + Send + Sync + 'static,
    {
        self.compare = Arc::new(compare);
    }

    /// Returns the value comparison function.
    pub fn compare_with(&self) -> CompareFn<V> {
        Arc::clone(&self.compare)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers an item at the end of the registration order.
    pub fn register(&mut self, value: Option<V>) -> ItemId {
        let index = self.order.len();
        self.register_at(index, value)
    }

    /// Registers an item at `index` in the registration order.
    ///
    /// `index` is clamped to the current length.
    pub fn register_at(&mut self, index: usize, value: Option<V>) -> ItemId {
        let id = self.items.insert(ItemRecord {
            value,
            selected: false,
            disabled: false,
        });
        let index = index.min(self.order.len());
        self.order.insert(index, id);
        tracing::debug!(target: TARGET, %id, index, "registered item");
        id
    }

    /// Removes an item, returning its former position and state.
    ///
    /// Returns `None` for unknown ids. Removing a selected item emits
    /// `selection_changed` with the item in `deselected`.
    pub fn deregister(&mut self, id: ItemId) -> Option<Deregistered<V>> {
        let record = self.items.remove(id)?;
        let index = self.order.iter().position(|&other| other == id)?;
        self.order.remove(index);
        self.selection_order.retain(|&other| other != id);
        tracing::debug!(target: TARGET, %id, index, "deregistered item");

        if record.selected {
            self.emit_change(Vec::new(), vec![id]);
        }

        Some(Deregistered {
            index,
            value: record.value,
            was_selected: record.selected,
        })
    }

    // =========================================================================
    // Item Queries
    // =========================================================================

    /// Returns the number of registered items.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no items are registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns true if the item is registered.
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(id)
    }

    /// Returns the registered items in registration order.
    pub fn ids(&self) -> &[ItemId] {
        &self.order
    }

    /// Returns the position of an item in registration order.
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.order.iter().position(|&other| other == id)
    }

    /// Returns the item at a position in registration order.
    pub fn id_at(&self, index: usize) -> Option<ItemId> {
        self.order.get(index).copied()
    }

    /// Returns an item's value.
    pub fn value(&self, id: ItemId) -> Option<&V> {
        self.items.get(id).and_then(|record| record.value.as_ref())
    }

    /// Checks if an item is disabled. Unknown items report `false`.
    pub fn is_disabled(&self, id: ItemId) -> bool {
        self.items.get(id).is_some_and(|record| record.disabled)
    }

    /// Sets an item's disabled flag.
    ///
    /// The flag is informational for the registry; programmatic selection of
    /// a disabled item still succeeds.
    pub fn set_disabled(&mut self, id: ItemId, disabled: bool) -> Result<()> {
        let record = self.items.get_mut(id).ok_or(SelectError::InvalidItem(id))?;
        record.disabled = disabled;
        Ok(())
    }

    /// Finds the first item, in registration order, whose value matches.
    ///
    /// Items without a value never match.
    pub fn find_by_value(&self, value: &V) -> Option<ItemId> {
        self.order.iter().copied().find(|&id| {
            self.items
                .get(id)
                .and_then(|record| record.value.as_ref())
                .is_some_and(|candidate| (self.compare)(candidate, value))
        })
    }

    // =========================================================================
    // Selection Queries
    // =========================================================================

    /// Checks if an item is selected. Unknown items report `false`.
    pub fn is_selected(&self, id: ItemId) -> bool {
        self.items.get(id).is_some_and(|record| record.selected)
    }

    /// Returns true if any items are selected.
    pub fn has_selection(&self) -> bool {
        !self.selection_order.is_empty()
    }

    /// Returns the number of selected items.
    pub fn selected_count(&self) -> usize {
        self.selection_order.len()
    }

    /// Returns the selected items in registration order.
    pub fn selected_items(&self) -> Vec<ItemId> {
        self.order
            .iter()
            .copied()
            .filter(|&id| self.is_selected(id))
            .collect()
    }

    /// Returns the first selected item in registration order.
    ///
    /// In single mode this is the selected item, if any.
    pub fn selected_item(&self) -> Option<ItemId> {
        self.order.iter().copied().find(|&id| self.is_selected(id))
    }

    /// Returns the selected items in the order they were selected.
    pub fn selection_order(&self) -> &[ItemId] {
        &self.selection_order
    }

    // =========================================================================
    // Selection Operations
    // =========================================================================

    /// Selects an item.
    ///
    /// In single mode the previously selected item is deselected first.
    /// Returns whether the state changed; selecting an already selected item
    /// is a no-op.
    pub fn select(&mut self, id: ItemId) -> Result<bool> {
        let record = self.items.get(id).ok_or(SelectError::InvalidItem(id))?;
        if record.selected {
            return Ok(false);
        }

        let deselected = match self.mode {
            SelectionMode::Single => self.deselect_all_except(None),
            SelectionMode::Multiple => Vec::new(),
        };

        if let Some(record) = self.items.get_mut(id) {
            record.selected = true;
        }
        self.selection_order.push(id);
        tracing::trace!(target: TARGET, %id, "selected item");

        self.emit_change(vec![id], deselected);
        Ok(true)
    }

    /// Deselects an item. Returns whether the state changed.
    pub fn deselect(&mut self, id: ItemId) -> Result<bool> {
        let record = self.items.get_mut(id).ok_or(SelectError::InvalidItem(id))?;
        if !record.selected {
            return Ok(false);
        }

        record.selected = false;
        self.selection_order.retain(|&other| other != id);
        tracing::trace!(target: TARGET, %id, "deselected item");

        self.emit_change(Vec::new(), vec![id]);
        Ok(true)
    }

    /// Toggles an item, returning its new selected state.
    pub fn toggle(&mut self, id: ItemId) -> Result<bool> {
        if self.is_selected(id) {
            self.deselect(id)?;
            Ok(false)
        } else {
            self.select(id)?;
            Ok(true)
        }
    }

    /// Selects the first item whose value matches `value`.
    ///
    /// Returns the matched item, or `None` when nothing matches.
    pub fn select_value(&mut self, value: &V) -> Option<ItemId> {
        let id = self.find_by_value(value)?;
        // The id comes straight from `order`, so it is registered.
        let _ = self.select(id);
        Some(id)
    }

    /// Deselects every item except `except`.
    ///
    /// Returns the ids that were deselected.
    pub fn clear(&mut self, except: Option<ItemId>) -> Vec<ItemId> {
        let deselected = self.deselect_all_except(except);
        self.emit_change(Vec::new(), deselected.clone());
        deselected
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn deselect_all_except(&mut self, keep: Option<ItemId>) -> Vec<ItemId> {
        let mut deselected = Vec::new();
        for &id in &self.order {
            if Some(id) == keep {
                continue;
            }
            if let Some(record) = self.items.get_mut(id) {
                if record.selected {
                    record.selected = false;
                    deselected.push(id);
                }
            }
        }
        self.selection_order.retain(|&id| Some(id) == keep);
        deselected
    }

    fn emit_change(&self, selected: Vec<ItemId>, deselected: Vec<ItemId>) {
        let change = SelectionChange {
            selected,
            deselected,
        };
        if !change.is_empty() {
            self.selection_changed.emit(change);
        }
    }
}

impl<V: Clone + 'static> SelectionRegistry<V> {
    /// Returns the values of the selected items in registration order.
    ///
    /// Selected items without a value are skipped.
    pub fn selected_values(&self) -> Vec<V> {
        self.order
            .iter()
            .filter_map(|&id| self.items.get(id))
            .filter(|record| record.selected)
            .filter_map(|record| record.value.clone())
            .collect()
    }
}

impl<V: fmt::Debug> fmt::Debug for SelectionRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<_> = self
            .order
            .iter()
            .filter_map(|&id| self.items.get(id).map(|record| (id, record)))
            .collect();
        f.debug_struct("SelectionRegistry")
            .field("mode", &self.mode)
            .field("items", &items)
            .field("selection_order", &self.selection_order)
            .finish()
    }
}

static_assertions::assert_impl_all!(SelectionRegistry<String>: Send, Sync);
