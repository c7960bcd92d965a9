//! Core systems for Horizon Select.
//!
//! This crate provides the foundational pieces shared by the selection and
//! sort controllers:
//!
//! - **Item handles**: [`ItemId`], the stable handle for a registered item
//! - **Signal/Slot System**: synchronous change notification via [`Signal`]
//! - **Errors**: [`SelectError`] and the [`Result`] alias
//! - **Logging**: `tracing` targets, [`PerfSpan`] and the `select_*!` macros
//!
//! # Signal Example
//!
//! ```
//! use horizon_select_core::Signal;
//!
//! let active_changed = Signal::<Option<usize>>::new();
//!
//! let conn_id = active_changed.connect(|index| {
//!     println!("Active item is now {:?}", index);
//! });
//!
//! active_changed.emit(Some(2));
//! active_changed.disconnect(conn_id);
//! ```

mod error;
pub mod item;
pub mod logging;
pub mod signal;

pub use error::{Result, SelectError};
pub use item::ItemId;
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
