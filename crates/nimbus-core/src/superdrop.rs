//! The [`Superdrop`] particle record.

use crate::geometry::Position;
use crate::id::{GbxIndex, SdId};

/// A Lagrangian particle standing in for `xi` real droplets with shared
/// attributes.
///
/// Transport reads and writes only `gbxindex` and `position`; boundary
/// conditions may also reset `radius`. The remaining attributes belong to
/// the microphysics kernels and pass through untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Superdrop {
    /// Stable identity.
    pub sdid: SdId,
    /// Owning gridbox, or [`GbxIndex::OUT_OF_DOMAIN`] between the reindex
    /// and commit stages of a transport step.
    pub gbxindex: GbxIndex,
    /// Location in the domain [m].
    pub position: Position,
    /// Droplet radius [m].
    pub radius: f64,
    /// Dissolved solute mass [g].
    pub msol: f64,
    /// Multiplicity: number of real droplets represented.
    pub xi: u64,
}

impl Superdrop {
    /// Create a superdroplet owned by `gbxindex`.
    pub fn new(
        sdid: SdId,
        gbxindex: GbxIndex,
        position: Position,
        radius: f64,
        msol: f64,
        xi: u64,
    ) -> Self {
        Self {
            sdid,
            gbxindex,
            position,
            radius,
            msol,
            xi,
        }
    }

    /// `false` once transport has flagged this droplet as having crossed
    /// a domain edge.
    pub fn is_in_domain(&self) -> bool {
        self.gbxindex.is_in_domain()
    }

    /// Flag the droplet as outside every gridbox.
    pub fn mark_out_of_domain(&mut self) {
        self.gbxindex = GbxIndex::OUT_OF_DOMAIN;
    }
}
