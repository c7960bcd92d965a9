//! Horizon Select - selection, keyboard navigation and sort state for UI
//! component libraries.
//!
//! This is the main crate; it re-exports the core types from
//! `horizon-select-core` and adds the controllers:
//!
//! - [`model::SelectionRegistry`]: selectable items in single or multiple mode
//! - [`widget::KeyboardItemCycler`]: arrow-key active item tracking
//! - [`widget::widgets::ChipListController`]: chip selection, removal focus
//!   hand-off and external value sync
//! - [`widget::widgets::SortController`]: active sort column and direction
//!
//! Nothing here renders. Hosts feed user input in and re-render from the
//! controllers' signals.
//!
//! # Example
//!
//! ```
//! use horizon_select::prelude::*;
//!
//! let mut chips = ChipListController::new(ChipListConfig::new().multiple(true));
//! let ids = chips.on_children_changed(vec![Chip::new("rust"), Chip::new("go")]);
//!
//! chips.change.connect(|change| println!("value: {:?}", change.value));
//! chips.toggle_chip(ids[1])?;
//!
//! assert_eq!(chips.value(), ChipListValue::Multiple(vec!["go"]));
//! # Ok::<(), SelectError>(())
//! ```

pub use horizon_select_core::*;

pub mod model;
pub mod prelude;
pub mod widget;
