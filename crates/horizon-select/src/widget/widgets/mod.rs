//! Controllers for concrete components.
//!
//! - [`ChipListController`]: an interactive list of [`Chip`]s
//! - [`SortController`]: the active sort column and its direction
//! - [`TooltipPosition`]: tooltip placement names

mod chip;
mod chip_list;
mod sort;
mod tooltip;

pub use chip::{Chip, ChipKey};
pub use chip_list::{
    ChipInputConfig, ChipListChange, ChipListConfig, ChipListController, ChipListValue, FocusTarget,
    KeyTarget,
};
pub use sort::{
    sort_direction_cycle, SortConfig, SortController, SortDirection, SortEvent, SortStart,
    Sortable,
};
pub use tooltip::{Side, TooltipPosition};
