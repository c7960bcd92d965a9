//! Selection state for registries of selectable items.
//!
//! # Core Types
//!
//! - [`SelectionRegistry`]: registered items plus their selected/disabled state
//! - [`SelectionMode`]: single or multiple selection
//! - [`SelectionChange`]: payload of the registry's change signal
//!
//! The registry knows nothing about focus or keys; the chip list controller
//! combines it with a keyboard item cycler to produce list behavior.

mod selection;

pub use selection::{CompareFn, Deregistered, SelectionChange, SelectionMode, SelectionRegistry};
