//! Error types for Horizon Select.

use crate::item::ItemId;

/// A specialized Result type for Horizon Select operations.
pub type Result<T> = std::result::Result<T, SelectError>;

/// Errors raised by the selection and sort controllers.
///
/// Every variant describes a programmer error at the call site. User-input
/// edge cases (navigating past the end of a list, clicking a disabled item,
/// removing the last chip) are handled by the controllers and never surface
/// here. A call that fails leaves the controller state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    /// The item is not registered with this controller.
    #[error("Item {0} is not registered with this controller")]
    InvalidItem(ItemId),

    /// A sortable with the same id is already registered.
    #[error("Cannot have two sortables with the same id ({0})")]
    DuplicateId(String),

    /// A sortable was registered without an id.
    #[error("Sortables must be provided with a unique, non-empty id")]
    MissingId,

    /// A direction string outside `""`, `"asc"` and `"desc"`.
    #[error("{0:?} is not a valid sort direction ('asc' or 'desc')")]
    InvalidDirection(String),

    /// A position string that does not name a tooltip position.
    #[error("Tooltip position {0:?} is invalid")]
    InvalidPosition(String),

    /// No sortable with this id is registered.
    #[error("No sortable is registered with id {0:?}")]
    UnknownSortable(String),

    /// A non-empty sort direction was set while no sortable is active.
    #[error("Cannot set a sort direction without an active sortable")]
    NoActiveSortable,
}

impl SelectError {
    /// Create an invalid-direction error from the offending input.
    pub fn invalid_direction(direction: impl Into<String>) -> Self {
        Self::InvalidDirection(direction.into())
    }

    /// Create an invalid-position error from the offending input.
    pub fn invalid_position(position: impl Into<String>) -> Self {
        Self::InvalidPosition(position.into())
    }

    /// Whether the error concerns sortable registration.
    pub fn is_registration_error(&self) -> bool {
        matches!(self, Self::DuplicateId(_) | Self::MissingId)
    }
}
