//! Sort controller for sortable column headers.
//!
//! A [`SortController`] tracks which of its registered [`Sortable`]s is the
//! active sort criterion and in which [`SortDirection`]. Activating the same
//! sortable repeatedly walks it through a direction cycle:
//!
//! | start  | clear allowed | cycle                 |
//! |--------|---------------|-----------------------|
//! | `asc`  | yes           | `asc → desc → "" → …` |
//! | `asc`  | no            | `asc → desc → …`      |
//! | `desc` | yes           | `desc → asc → "" → …` |
//! | `desc` | no            | `desc → asc → …`      |
//!
//! Activating a different sortable makes it active with its own start
//! direction, falling back to the controller-wide default.
//!
//! # Example
//!
//! ```
//! use horizon_select::widget::widgets::{SortConfig, SortController, SortDirection, Sortable};
//!
//! let mut sort = SortController::new(SortConfig::default());
//! sort.register(Sortable::new("name"))?;
//!
//! let directions: Vec<_> = (0..4)
//!     .map(|_| sort.sort_by_id("name").map(|event| event.direction))
//!     .collect::<Result<_, _>>()?;
//!
//! assert_eq!(
//!     directions,
//!     vec![SortDirection::Asc, SortDirection::Desc, SortDirection::None, SortDirection::Asc]
//! );
//! # Ok::<(), horizon_select::SelectError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use horizon_select_core::logging::{span_names, targets};
use horizon_select_core::{Result, SelectError, Signal};

use crate::widget::capability::HasDisabledState;

const TARGET: &str = targets::SORT;

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SortDirection {
    /// Not sorted (`""`).
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = ""))]
    None,
    /// Ascending (`"asc"`).
    Asc,
    /// Descending (`"desc"`).
    Desc,
}

impl SortDirection {
    /// The direction's string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Whether this is `Asc` or `Desc`.
    pub fn is_sorted(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = SelectError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" => Ok(Self::None),
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(SelectError::invalid_direction(other)),
        }
    }
}

impl From<SortStart> for SortDirection {
    fn from(start: SortStart) -> Self {
        match start {
            SortStart::Asc => Self::Asc,
            SortStart::Desc => Self::Desc,
        }
    }
}

/// The first direction a sortable takes when it becomes active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SortStart {
    /// Start ascending.
    #[default]
    Asc,
    /// Start descending.
    Desc,
}

impl SortStart {
    /// The other direction.
    pub fn opposite(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// The direction cycle for a start direction.
///
/// The cycle is `[start, opposite(start)]`, followed by
/// [`SortDirection::None`] unless clearing is disabled.
pub fn sort_direction_cycle(start: SortStart, disable_clear: bool) -> &'static [SortDirection] {
    use SortDirection::{Asc, Desc, None};

    match (start, disable_clear) {
        (SortStart::Asc, false) => &[Asc, Desc, None],
        (SortStart::Asc, true) => &[Asc, Desc],
        (SortStart::Desc, false) => &[Desc, Asc, None],
        (SortStart::Desc, true) => &[Desc, Asc],
    }
}

/// Something that can become the active sort criterion, typically a column
/// header.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sortable {
    /// Unique, non-empty id.
    pub id: String,
    /// Start direction; the controller default when `None`.
    pub start: Option<SortStart>,
    /// Overrides the controller's `disable_clear` when set.
    pub disable_clear: Option<bool>,
    /// Ignore header clicks.
    pub disabled: bool,
}

impl Sortable {
    /// Create a sortable using the controller defaults.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start: None,
            disable_clear: None,
            disabled: false,
        }
    }

    /// Set the start direction.
    pub fn with_start(mut self, start: SortStart) -> Self {
        self.start = Some(start);
        self
    }

    /// Override whether the cycle includes the cleared state.
    pub fn with_disable_clear(mut self, disable_clear: bool) -> Self {
        self.disable_clear = Some(disable_clear);
        self
    }

    /// Set the disabled flag.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

impl HasDisabledState for Sortable {
    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }
}

/// Payload of [`SortController::sort_change`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortEvent {
    /// Id of the active sortable.
    pub active: String,
    /// The new direction.
    pub direction: SortDirection,
}

/// Controller-wide sort settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SortConfig {
    /// Default start direction.
    pub start: SortStart,
    /// Leave the cleared state out of the cycle.
    pub disable_clear: bool,
    /// Ignore header clicks.
    pub disabled: bool,
}

impl SortConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default start direction.
    pub fn start(mut self, start: SortStart) -> Self {
        self.start = start;
        self
    }

    /// Leave the cleared state out of the cycle.
    pub fn disable_clear(mut self, disable_clear: bool) -> Self {
        self.disable_clear = disable_clear;
        self
    }

    /// Disable or enable the controller.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Tracks the active sortable and its direction.
///
/// A non-empty direction always comes with an active sortable.
///
/// # Signals
///
/// - `sort_change`: emitted exactly once per [`sort`](Self::sort)
/// - `state_changes`: emitted when inputs change programmatically
pub struct SortController {
    sortables: HashMap<String, Sortable>,
    active: Option<String>,
    direction: SortDirection,
    config: SortConfig,

    /// Emitted when the user changes the sort.
    pub sort_change: Signal<SortEvent>,
    /// Emitted when state changes without user interaction.
    pub state_changes: Signal<()>,
}

impl Default for SortController {
    fn default() -> Self {
        Self::new(SortConfig::default())
    }
}

impl SortController {
    /// Create a controller with no sortables.
    pub fn new(config: SortConfig) -> Self {
        Self {
            sortables: HashMap::new(),
            active: None,
            direction: SortDirection::None,
            config,
            sort_change: Signal::new(),
            state_changes: Signal::new(),
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a sortable.
    ///
    /// Fails with [`SelectError::MissingId`] for an empty id and with
    /// [`SelectError::DuplicateId`] if the id is taken. A failed call leaves
    /// the registry unchanged.
    pub fn register(&mut self, sortable: Sortable) -> Result<()> {
        if sortable.id.is_empty() {
            tracing::warn!(target: TARGET, "rejected sortable without id");
            return Err(SelectError::MissingId);
        }
        if self.sortables.contains_key(&sortable.id) {
            tracing::warn!(target: TARGET, id = %sortable.id, "rejected duplicate sortable");
            return Err(SelectError::DuplicateId(sortable.id));
        }

        tracing::debug!(target: TARGET, id = %sortable.id, "registered sortable");
        self.sortables.insert(sortable.id.clone(), sortable);
        Ok(())
    }

    /// Remove a sortable.
    ///
    /// Removing the active sortable keeps it active, so a header that is
    /// registered again under the same id resumes its state.
    pub fn deregister(&mut self, id: &str) -> Option<Sortable> {
        let removed = self.sortables.remove(id);
        if removed.is_some() {
            tracing::debug!(target: TARGET, id, "deregistered sortable");
        }
        removed
    }

    /// Whether a sortable with `id` is registered.
    pub fn is_registered(&self, id: &str) -> bool {
        self.sortables.contains_key(id)
    }

    /// The registered sortable with `id`.
    pub fn sortable(&self, id: &str) -> Option<&Sortable> {
        self.sortables.get(id)
    }

    /// Number of registered sortables.
    pub fn len(&self) -> usize {
        self.sortables.len()
    }

    /// Whether no sortables are registered.
    pub fn is_empty(&self) -> bool {
        self.sortables.is_empty()
    }

    // =========================================================================
    // State
    // =========================================================================

    /// The configuration.
    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    /// Id of the active sortable.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The current direction.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Whether `id` is active with a non-empty direction.
    pub fn is_sorted(&self, id: &str) -> bool {
        self.active.as_deref() == Some(id) && self.direction.is_sorted()
    }

    /// Whether clicks on `id` are ignored.
    pub fn is_sortable_disabled(&self, id: &str) -> bool {
        self.config.disabled || self.sortables.get(id).is_some_and(|s| s.disabled)
    }

    /// The direction a header's arrow should point.
    ///
    /// The current direction while sorted, otherwise the direction a click
    /// would start with.
    pub fn arrow_direction(&self, sortable: &Sortable) -> SortStart {
        if self.is_sorted(&sortable.id) && self.direction == SortDirection::Desc {
            SortStart::Desc
        } else if self.is_sorted(&sortable.id) {
            SortStart::Asc
        } else {
            sortable.start.unwrap_or(self.config.start)
        }
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// The direction `sortable` would move to if sorted again.
    ///
    /// A current direction that is not in the sortable's cycle restarts the
    /// cycle.
    pub fn next_sort_direction(&self, sortable: &Sortable) -> SortDirection {
        let disable_clear = sortable.disable_clear.unwrap_or(self.config.disable_clear);
        let cycle = sort_direction_cycle(sortable.start.unwrap_or(self.config.start), disable_clear);

        let next = cycle
            .iter()
            .position(|&direction| direction == self.direction)
            .map_or(0, |index| (index + 1) % cycle.len());
        cycle[next]
    }

    /// Activate `sortable`, or advance its direction if it is already active.
    ///
    /// Emits `sort_change` exactly once.
    pub fn sort(&mut self, sortable: &Sortable) -> SortEvent {
        let _span = tracing::debug_span!(target: TARGET, span_names::SORT, id = %sortable.id).entered();
        if self.active.as_deref() == Some(sortable.id.as_str()) {
            self.direction = self.next_sort_direction(sortable);
        } else {
            self.active = Some(sortable.id.clone());
            self.direction = sortable.start.unwrap_or(self.config.start).into();
        }

        let event = SortEvent {
            active: sortable.id.clone(),
            direction: self.direction,
        };
        tracing::debug!(target: TARGET, active = %event.active, direction = %event.direction, "sort changed");
        self.sort_change.emit(event.clone());
        event
    }

    /// [`sort`](Self::sort) the registered sortable with `id`.
    pub fn sort_by_id(&mut self, id: &str) -> Result<SortEvent> {
        let sortable = self
            .sortables
            .get(id)
            .cloned()
            .ok_or_else(|| SelectError::UnknownSortable(id.to_owned()))?;
        Ok(self.sort(&sortable))
    }

    /// Handle a click on the header of `id`.
    ///
    /// Returns `Ok(None)` without changing anything when the controller or
    /// the sortable is disabled.
    pub fn handle_header_click(&mut self, id: &str) -> Result<Option<SortEvent>> {
        let sortable = self
            .sortables
            .get(id)
            .ok_or_else(|| SelectError::UnknownSortable(id.to_owned()))?;
        if self.config.disabled || sortable.disabled {
            return Ok(None);
        }
        let sortable = sortable.clone();
        Ok(Some(self.sort(&sortable)))
    }

    // =========================================================================
    // Programmatic State
    // =========================================================================

    /// Set the active sortable and direction directly.
    ///
    /// Fails with [`SelectError::NoActiveSortable`] for a non-empty direction
    /// without an active id. Emits `state_changes`, not `sort_change`.
    pub fn set_sort(&mut self, active: Option<&str>, direction: SortDirection) -> Result<()> {
        if active.is_none() && direction.is_sorted() {
            return Err(SelectError::NoActiveSortable);
        }
        self.active = active.map(str::to_owned);
        self.direction = direction;
        self.state_changes.emit(());
        Ok(())
    }

    /// Set the direction of the active sortable.
    pub fn set_direction(&mut self, direction: SortDirection) -> Result<()> {
        if self.active.is_none() && direction.is_sorted() {
            return Err(SelectError::NoActiveSortable);
        }
        self.direction = direction;
        self.state_changes.emit(());
        Ok(())
    }

    /// Parse and set the direction of the active sortable.
    pub fn set_direction_str(&mut self, direction: &str) -> Result<()> {
        self.set_direction(direction.parse()?)
    }

    /// Set the default start direction.
    pub fn set_start(&mut self, start: SortStart) {
        self.config.start = start;
        self.state_changes.emit(());
    }

    /// Leave the cleared state out of the cycle.
    pub fn set_disable_clear(&mut self, disable_clear: bool) {
        self.config.disable_clear = disable_clear;
        self.state_changes.emit(());
    }
}

impl HasDisabledState for SortController {
    fn is_disabled(&self) -> bool {
        self.config.disabled
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
        self.state_changes.emit(());
    }
}

impl fmt::Debug for SortController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortController")
            .field("sortables", &self.sortables.len())
            .field("active", &self.active)
            .field("direction", &self.direction)
            .field("config", &self.config)
            .finish()
    }
}

static_assertions::assert_impl_all!(SortController: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn directions(sort: &mut SortController, sortable: &Sortable, n: usize) -> Vec<SortDirection> {
        (0..n).map(|_| sort.sort(sortable).direction).collect()
    }

    #[test]
    fn test_direction_cycle() {
        assert_eq!(
            sort_direction_cycle(SortStart::Asc, false),
            &[SortDirection::Asc, SortDirection::Desc, SortDirection::None]
        );
        assert_eq!(
            sort_direction_cycle(SortStart::Desc, true),
            &[SortDirection::Desc, SortDirection::Asc]
        );
    }

    #[test]
    fn test_three_state_cycle() {
        let mut sort = SortController::default();
        let name = Sortable::new("name");
        assert_eq!(
            directions(&mut sort, &name, 4),
            vec![SortDirection::Asc, SortDirection::Desc, SortDirection::None, SortDirection::Asc]
        );
    }

    #[test]
    fn test_desc_start_without_clear() {
        let mut sort = SortController::new(SortConfig::new().start(SortStart::Desc).disable_clear(true));
        let name = Sortable::new("name");
        assert_eq!(
            directions(&mut sort, &name, 3),
            vec![SortDirection::Desc, SortDirection::Asc, SortDirection::Desc]
        );
    }

    #[test]
    fn test_sortable_overrides_controller() {
        let mut sort = SortController::new(SortConfig::new().disable_clear(true));
        let age = Sortable::new("age")
            .with_start(SortStart::Desc)
            .with_disable_clear(false);
        assert_eq!(
            directions(&mut sort, &age, 4),
            vec![SortDirection::Desc, SortDirection::Asc, SortDirection::None, SortDirection::Desc]
        );
    }

    #[test]
    fn test_switching_sortable_restarts() {
        let mut sort = SortController::default();
        let name = Sortable::new("name");
        let age = Sortable::new("age").with_start(SortStart::Desc);

        sort.sort(&name);
        sort.sort(&name);
        let event = sort.sort(&age);

        assert_eq!(event.active, "age");
        assert_eq!(event.direction, SortDirection::Desc);
        assert!(sort.is_sorted("age"));
        assert!(!sort.is_sorted("name"));
    }

    #[test]
    fn test_direction_outside_cycle_restarts() {
        let mut sort = SortController::new(SortConfig::new().disable_clear(true));
        sort.set_sort(Some("name"), SortDirection::None).unwrap();
        assert_eq!(sort.next_sort_direction(&Sortable::new("name")), SortDirection::Asc);
    }

    #[test]
    fn test_register_rejects_missing_and_duplicate_ids() {
        let mut sort = SortController::default();
        sort.register(Sortable::new("name").with_start(SortStart::Desc)).unwrap();

        assert_eq!(sort.register(Sortable::new("")), Err(SelectError::MissingId));
        assert_eq!(
            sort.register(Sortable::new("name")),
            Err(SelectError::DuplicateId("name".into()))
        );
        assert_eq!(sort.len(), 1);
        assert_eq!(sort.sortable("name").and_then(|s| s.start), Some(SortStart::Desc));
    }

    #[test]
    fn test_sort_change_emitted_once_per_sort() {
        let mut sort = SortController::default();
        sort.register(Sortable::new("name")).unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        sort.sort_change.connect(move |event| events_clone.lock().push(event.clone()));

        sort.sort_by_id("name").unwrap();
        sort.sort_by_id("name").unwrap();
        sort.set_sort(None, SortDirection::None).unwrap();

        let events = events.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            SortEvent {
                active: "name".into(),
                direction: SortDirection::Desc,
            }
        );
    }

    #[test]
    fn test_sort_by_unknown_id() {
        let mut sort = SortController::default();
        assert_eq!(
            sort.sort_by_id("missing"),
            Err(SelectError::UnknownSortable("missing".into()))
        );
        assert_eq!(sort.active(), None);
    }

    #[test]
    fn test_header_click_respects_disabled() {
        let mut sort = SortController::default();
        sort.register(Sortable::new("name")).unwrap();
        sort.register(Sortable::new("age").with_disabled(true)).unwrap();

        assert_eq!(sort.handle_header_click("age"), Ok(None));
        assert!(sort.is_sortable_disabled("age"));
        assert!(sort.handle_header_click("name").unwrap().is_some());

        sort.set_disabled(true);
        assert_eq!(sort.handle_header_click("name"), Ok(None));
        assert_eq!(sort.direction(), SortDirection::Asc);
    }

    #[test]
    fn test_direction_requires_active() {
        let mut sort = SortController::default();
        assert_eq!(
            sort.set_sort(None, SortDirection::Asc),
            Err(SelectError::NoActiveSortable)
        );
        assert_eq!(sort.set_direction_str("desc"), Err(SelectError::NoActiveSortable));
        assert_eq!(sort.direction(), SortDirection::None);

        sort.set_sort(Some("name"), SortDirection::Desc).unwrap();
        sort.set_direction_str("asc").unwrap();
        assert!(sort.is_sorted("name"));
        assert_eq!(sort.direction(), SortDirection::Asc);
    }

    #[test]
    fn test_invalid_direction_string() {
        let mut sort = SortController::default();
        sort.set_sort(Some("name"), SortDirection::Asc).unwrap();
        assert_eq!(
            sort.set_direction_str("ascending"),
            Err(SelectError::InvalidDirection("ascending".into()))
        );
        assert_eq!(sort.direction(), SortDirection::Asc);
    }

    #[test]
    fn test_direction_parse_and_display() {
        for direction in [SortDirection::None, SortDirection::Asc, SortDirection::Desc] {
            assert_eq!(direction.to_string().parse::<SortDirection>(), Ok(direction));
        }
        assert!("ASC".parse::<SortDirection>().is_err());
    }

    #[test]
    fn test_deregister_active_keeps_state() {
        let mut sort = SortController::default();
        sort.register(Sortable::new("name")).unwrap();
        sort.sort_by_id("name").unwrap();

        assert!(sort.deregister("name").is_some());
        assert_eq!(sort.active(), Some("name"));

        sort.register(Sortable::new("name")).unwrap();
        assert_eq!(sort.sort_by_id("name").unwrap().direction, SortDirection::Desc);
    }

    #[test]
    fn test_arrow_direction() {
        let mut sort = SortController::default();
        let name = Sortable::new("name");
        let age = Sortable::new("age").with_start(SortStart::Desc);

        assert_eq!(sort.arrow_direction(&name), SortStart::Asc);
        assert_eq!(sort.arrow_direction(&age), SortStart::Desc);

        sort.sort(&name);
        sort.sort(&name);
        assert_eq!(sort.arrow_direction(&name), SortStart::Desc);
    }
}
