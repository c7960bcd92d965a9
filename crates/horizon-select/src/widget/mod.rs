//! Interaction controllers for Horizon Select.
//!
//! This module holds everything that reacts to user input:
//!
//! - [`KeyboardItemCycler`]: the active-item cursor behind arrow-key
//!   navigation
//! - [`capability`]: the [`HasDisabledState`] and [`HasColor`] traits
//! - [`SharedController`]: a mutex wrapper for multi-threaded hosts
//! - [`widgets`]: the chip list, sort and tooltip controllers
//!
//! Controllers own their state and report changes through
//! [`Signal`](horizon_select_core::Signal)s. Hosts translate raw input
//! (clicks, key presses, focus events) into controller calls and re-render
//! from the signals.

pub mod capability;
mod key_manager;
mod shared;
pub mod widgets;

pub use capability::{HasColor, HasDisabledState, ThemePalette};
pub use key_manager::{
    Axis, CycleEntry, CyclerConfig, KeyOutcome, KeyboardItemCycler, NavigationIntent,
    NavigationKey, Orientation, TextDirection,
};
pub use shared::SharedController;
