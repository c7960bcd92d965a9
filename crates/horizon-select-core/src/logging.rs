//! Logging facilities for Horizon Select.
//!
//! Horizon Select uses the `tracing` crate for instrumentation. The library
//! never installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_select=debug")
//!     .init();
//! ```
//!
//! Each controller logs under its own target (see [`targets`]) so hosts can
//! turn on, say, chip-list focus hand-off without drowning in key manager
//! traces.

/// Span names used throughout Horizon Select for tracing.
pub mod span_names {
    /// Signal emission span.
    pub const SIGNAL: &str = "horizon_select::signal";
    /// Chip list rebuild span.
    pub const CHIP_SYNC: &str = "horizon_select::chip_sync";
    /// Sort change span.
    pub const SORT: &str = "horizon_select::sort";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_select_core";
    /// Signal system target.
    pub const SIGNAL: &str = "horizon_select_core::signal";
    /// Selection registry target.
    pub const SELECTION: &str = "horizon_select::selection";
    /// Keyboard item cycler target.
    pub const KEY_MANAGER: &str = "horizon_select::key_manager";
    /// Chip list controller target.
    pub const CHIPS: &str = "horizon_select::chips";
    /// Sort controller target.
    pub const SORT: &str = "horizon_select::sort";
    /// Performance spans target.
    pub const PERF: &str = "horizon_select::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_select::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are thin wrappers around the `tracing` macros with consistent
/// target naming.
#[macro_export]
macro_rules! select_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_select_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! select_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_select_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! select_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "horizon_select_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! select_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_select_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! select_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "horizon_select_core", $($arg)*)
    };
}
