//! Strongly-typed identifiers and the [`ModelStep`] clock.

use std::fmt;

/// Identifies a gridbox within the simulation domain.
///
/// Gridboxes are created once from the maps' index space and assigned
/// sequential indices `0..ngbxs`. The reserved value
/// [`GbxIndex::OUT_OF_DOMAIN`] marks a superdroplet that has crossed a
/// domain edge and is awaiting a boundary-condition decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GbxIndex(pub u32);

impl GbxIndex {
    /// Sentinel for superdroplets outside every gridbox.
    pub const OUT_OF_DOMAIN: GbxIndex = GbxIndex(u32::MAX);

    /// `false` only for [`OUT_OF_DOMAIN`](Self::OUT_OF_DOMAIN).
    pub fn is_in_domain(self) -> bool {
        self != Self::OUT_OF_DOMAIN
    }

    /// The index as a `usize`, for slicing per-gridbox tables.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GbxIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_in_domain() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "out-of-domain")
        }
    }
}

impl From<u32> for GbxIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Stable identity of a superdroplet.
///
/// Survives transport, repartitioning and boundary reinitialisation;
/// only a superdroplet injected by a boundary condition receives a new id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SdId(pub u64);

impl fmt::Display for SdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SdId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Model time measured in integer steps.
///
/// Every interval in the stepping loop (coupling, observation, motion)
/// is a whole number of model steps, so all scheduling is exact integer
/// arithmetic. [`ModelStep::MAX`] means "never".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelStep(pub u32);

impl ModelStep {
    /// The zero step (start of a run).
    pub const ZERO: ModelStep = ModelStep(0);

    /// Largest representable step; used as "no next event".
    pub const MAX: ModelStep = ModelStep(u32::MAX);

    /// First multiple of `interval` strictly after `self`.
    ///
    /// Saturates at [`ModelStep::MAX`]. An `interval` of zero means the
    /// event never fires and also yields `MAX`.
    pub fn next_multiple_of(self, interval: u32) -> ModelStep {
        if interval == 0 {
            return ModelStep::MAX;
        }
        let next = (self.0 / interval).saturating_add(1);
        ModelStep(next.saturating_mul(interval))
    }

    /// `true` if `self` is a multiple of `interval` (never for zero).
    pub fn is_multiple_of(self, interval: u32) -> bool {
        interval != 0 && self.0 % interval == 0
    }
}

impl fmt::Display for ModelStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ModelStep {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
