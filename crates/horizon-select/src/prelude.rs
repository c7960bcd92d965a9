//! Prelude module for Horizon Select.
//!
//! ```ignore
//! use horizon_select::prelude::*;
//! ```

// ============================================================================
// Core
// ============================================================================

pub use crate::signal::{ConnectionId, Signal};
pub use crate::{ItemId, Result, SelectError};

// ============================================================================
// Selection and Navigation
// ============================================================================

pub use crate::model::{SelectionChange, SelectionMode, SelectionRegistry};
pub use crate::widget::{
    Axis, CycleEntry, CyclerConfig, HasColor, HasDisabledState, KeyOutcome, KeyboardItemCycler,
    NavigationIntent, NavigationKey, Orientation, SharedController, TextDirection, ThemePalette,
};

// ============================================================================
// Components
// ============================================================================

pub use crate::widget::widgets::{
    Chip, ChipInputConfig, ChipKey, ChipListChange, ChipListConfig, ChipListController, ChipListValue,
    FocusTarget, KeyTarget, SortConfig, SortController, SortDirection, SortEvent, SortStart,
    Sortable, TooltipPosition,
};
