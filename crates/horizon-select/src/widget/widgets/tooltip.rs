//! Tooltip placement names.
//!
//! Only the validation and direction-aware resolution of a placement live
//! here; measuring and positioning the overlay is the host's job.

use std::fmt;
use std::str::FromStr;

use horizon_select_core::{Result, SelectError};

use crate::widget::TextDirection;

/// Where a tooltip is shown relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TooltipPosition {
    /// Always to the left.
    Left,
    /// Always to the right.
    Right,
    /// Above the anchor.
    Above,
    /// Below the anchor.
    #[default]
    Below,
    /// Left in LTR layouts, right in RTL.
    Before,
    /// Right in LTR layouts, left in RTL.
    After,
}

/// A physical side of the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Top edge.
    Top,
    /// Bottom edge.
    Bottom,
}

impl Side {
    /// The opposite side, used when the preferred side does not fit.
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }
}

impl TooltipPosition {
    /// The position's string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Above => "above",
            Self::Below => "below",
            Self::Before => "before",
            Self::After => "after",
        }
    }

    /// The physical side for a layout direction.
    pub fn resolve(self, direction: TextDirection) -> Side {
        let ltr = direction == TextDirection::Ltr;
        match self {
            Self::Above => Side::Top,
            Self::Below => Side::Bottom,
            Self::Left => Side::Left,
            Self::Right => Side::Right,
            Self::Before if ltr => Side::Left,
            Self::Before => Side::Right,
            Self::After if ltr => Side::Right,
            Self::After => Side::Left,
        }
    }

    /// The preferred side and its fallback.
    pub fn sides(self, direction: TextDirection) -> (Side, Side) {
        let side = self.resolve(direction);
        (side, side.opposite())
    }
}

impl fmt::Display for TooltipPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TooltipPosition {
    type Err = SelectError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "above" => Ok(Self::Above),
            "below" => Ok(Self::Below),
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            other => Err(SelectError::invalid_position(other)),
        }
    }
}
