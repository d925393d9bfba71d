//! Error types for domain construction.
//!
//! Transport itself has no error path: every per-step decision is a
//! total function over valid indices and the edge sentinel. What can go
//! wrong is assembling the domain, and those failures are reported here
//! at construction time.

use std::error::Error;
use std::fmt;

use crate::id::{GbxIndex, SdId};

/// Errors detected while assembling gridboxes and superdroplets.
#[derive(Clone, Debug, PartialEq)]
pub enum DomainError {
    /// The domain has no gridboxes.
    EmptyDomain,
    /// A superdroplet names a gridbox that does not exist.
    GridboxOutOfRange {
        /// The offending superdroplet.
        sdid: SdId,
        /// The index it claimed.
        gbxindex: GbxIndex,
        /// Number of gridboxes in the domain.
        ngbxs: usize,
    },
    /// Two superdroplets share an identity.
    DuplicateSdId {
        /// The repeated id.
        sdid: SdId,
    },
    /// A superdroplet position is NaN or infinite.
    NonFinitePosition {
        /// The offending superdroplet.
        sdid: SdId,
    },
    /// A superdroplet lies outside the bounds of its owning gridbox.
    PositionOutsideGridbox {
        /// The offending superdroplet.
        sdid: SdId,
        /// Its owning gridbox.
        gbxindex: GbxIndex,
    },
    /// Two collaborators disagree on the number of gridboxes.
    SizeMismatch {
        /// Which collaborator disagrees.
        what: &'static str,
        /// Gridbox count reported by the maps.
        expected: usize,
        /// Gridbox count reported by the collaborator.
        actual: usize,
    },
    /// Gridbox `i` of the gridbox array does not carry index `i`.
    GridboxOrder {
        /// Position in the array.
        position: usize,
        /// Index found there.
        found: GbxIndex,
    },
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDomain => write!(f, "domain must have at least one gridbox"),
            Self::GridboxOutOfRange {
                sdid,
                gbxindex,
                ngbxs,
            } => write!(
                f,
                "superdroplet {sdid} assigned to gridbox {gbxindex}, domain has {ngbxs}"
            ),
            Self::DuplicateSdId { sdid } => write!(f, "duplicate superdroplet id {sdid}"),
            Self::NonFinitePosition { sdid } => {
                write!(f, "superdroplet {sdid} has a non-finite position")
            }
            Self::PositionOutsideGridbox { sdid, gbxindex } => write!(
                f,
                "superdroplet {sdid} lies outside the bounds of gridbox {gbxindex}"
            ),
            Self::SizeMismatch {
                what,
                expected,
                actual,
            } => write!(
                f,
                "{what} has {actual} gridboxes, maps define {expected}"
            ),
            Self::GridboxOrder { position, found } => write!(
                f,
                "gridbox at position {position} has index {found}"
            ),
        }
    }
}

impl Error for DomainError {}
