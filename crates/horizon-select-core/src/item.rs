//! Item handles.
//!
//! Every selectable item a controller knows about is addressed by an
//! [`ItemId`]. The id is issued by the owning registry when the item announces
//! itself and becomes stale once the item is deregistered. Stale ids are never
//! reused for a different item, so a controller can always tell a stale handle
//! apart from a live one.

use std::fmt;

use slotmap::new_key_type;

new_key_type! {
    /// A stable handle for an item registered with a selection registry.
    ///
    /// The hosting layer keeps the `ItemId` returned at registration time and
    /// passes it back for every later call that concerns the item.
    ///
    /// # Related Types
    ///
    /// - [`crate::SelectError::InvalidItem`] - Returned when a handle is unknown
    pub struct ItemId;
}

impl ItemId {
    /// Convert the id to a raw u64 value.
    ///
    /// Useful when the host needs a numeric key (for example to build element
    /// ids). Convert back with [`ItemId::from_raw`].
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Rebuild an id from a value produced by [`ItemId::as_raw`].
    ///
    /// This does not check whether the id is still registered anywhere.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{:x}", self.as_raw())
    }
}
