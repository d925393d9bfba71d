//! Domain edge behavior and the neighbour-lookup result.

use nimbus_core::GbxIndex;

/// How a grid axis treats the faces at the ends of the domain.
///
/// This controls *topology*: whether a gridbox on the domain edge has a
/// neighbour across that face. What happens to a superdroplet that
/// leaves through an open face is decided separately by the configured
/// boundary conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeBehavior {
    /// No neighbour across the edge; lookups return [`Neighbour::Edge`].
    Open,
    /// The edge wraps to the opposite side of the domain.
    Periodic,
}

/// Result of looking up a gridbox's neighbour in one direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Neighbour {
    /// An adjacent gridbox sharing the face.
    Gridbox(GbxIndex),
    /// The gridbox on the opposite side of a periodic domain.
    ///
    /// A droplet crossing into it must have `shift` added to its
    /// coordinate along the direction's axis.
    Wrapped {
        /// The gridbox across the periodic edge.
        index: GbxIndex,
        /// Coordinate offset along the crossed axis [m].
        shift: f64,
    },
    /// Domain edge sentinel: no gridbox in that direction.
    Edge,
}

impl Neighbour {
    /// The neighbouring gridbox, or `None` at an open edge.
    pub fn index(&self) -> Option<GbxIndex> {
        match *self {
            Neighbour::Gridbox(index) | Neighbour::Wrapped { index, .. } => Some(index),
            Neighbour::Edge => None,
        }
    }

    /// Coordinate shift to apply when crossing (zero unless wrapped).
    pub fn shift(&self) -> f64 {
        match *self {
            Neighbour::Wrapped { shift, .. } => shift,
            _ => 0.0,
        }
    }

    /// `true` for the domain edge sentinel.
    pub fn is_edge(&self) -> bool {
        matches!(self, Neighbour::Edge)
    }
}
