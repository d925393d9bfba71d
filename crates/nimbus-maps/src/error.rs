//! Error types for maps construction.

use nimbus_core::Axis;
use std::fmt;

/// Errors arising from building gridbox maps.
#[derive(Debug, Clone, PartialEq)]
pub enum MapsError {
    /// An axis needs at least two half-coordinates (one gridbox).
    TooFewHalfCoords {
        /// The axis in question.
        axis: Axis,
        /// How many half-coordinates were supplied.
        got: usize,
    },
    /// Half-coordinates must be strictly increasing.
    NonMonotonic {
        /// The axis in question.
        axis: Axis,
        /// Position of the first half-coordinate not above its predecessor.
        position: usize,
    },
    /// Half-coordinates must be finite.
    NonFinite {
        /// The axis in question.
        axis: Axis,
        /// Position of the offending value.
        position: usize,
    },
    /// The total number of gridboxes does not fit a gridbox index.
    TooManyGridboxes {
        /// The requested number of gridboxes.
        count: u128,
    },
}

impl fmt::Display for MapsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewHalfCoords { axis, got } => {
                write!(f, "{axis} axis needs at least 2 half-coordinates, got {got}")
            }
            Self::NonMonotonic { axis, position } => write!(
                f,
                "{axis} half-coordinates not strictly increasing at position {position}"
            ),
            Self::NonFinite { axis, position } => {
                write!(f, "{axis} half-coordinate at position {position} is not finite")
            }
            Self::TooManyGridboxes { count } => {
                write!(f, "{count} gridboxes exceed the gridbox index range")
            }
        }
    }
}

impl std::error::Error for MapsError {}
