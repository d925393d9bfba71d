//! Gridboxes: the Eulerian cells of the domain.

use crate::state::State;
use nimbus_core::{Bounds, DomainError, GbxIndex};
use nimbus_maps::GridboxMaps;

/// One fixed-volume cell of the domain.
///
/// A gridbox owns its thermodynamic [`State`] but not its droplets: those
/// live in [`SupersInDomain`](crate::SupersInDomain) and are reached with
/// `supers.view_for(gbx.index)`. Gridboxes are created once from the
/// maps' index space and never destroyed during a run.
#[derive(Clone, Debug, PartialEq)]
pub struct Gridbox {
    /// Index into the maps.
    pub index: GbxIndex,
    /// Thermodynamic and wind state.
    pub state: State,
    /// Volume [m^3].
    pub volume: f64,
}

impl Gridbox {
    /// Construct a gridbox.
    pub fn new(index: GbxIndex, state: State, volume: f64) -> Self {
        Self {
            index,
            state,
            volume,
        }
    }
}

/// Create one gridbox per maps index, each in the default [`State`].
pub fn create_gridboxes<M: GridboxMaps>(maps: &M) -> Vec<Gridbox> {
    create_gridboxes_with(maps, |_, _| State::default())
}

/// Create one gridbox per maps index, initialising each state from its
/// index and bounds.
pub fn create_gridboxes_with<M, F>(maps: &M, mut init: F) -> Vec<Gridbox>
where
    M: GridboxMaps,
    F: FnMut(GbxIndex, &Bounds) -> State,
{
    (0..maps.ngbxs() as u32)
        .map(GbxIndex)
        .map(|idx| {
            let bounds = maps.bounds(idx);
            Gridbox::new(idx, init(idx, &bounds), maps.volume(idx))
        })
        .collect()
}

/// Check that `gbxs` holds exactly one gridbox per maps index, in index
/// order.
///
/// Transport indexes the gridbox array by [`GbxIndex`], so a mismatch
/// here is a composition error and must be caught before stepping.
pub fn check_gridboxes<M: GridboxMaps>(maps: &M, gbxs: &[Gridbox]) -> Result<(), DomainError> {
    if maps.ngbxs() == 0 {
        return Err(DomainError::EmptyDomain);
    }
    if gbxs.len() != maps.ngbxs() {
        return Err(DomainError::SizeMismatch {
            what: "gridbox array",
            expected: maps.ngbxs(),
            actual: gbxs.len(),
        });
    }
    for (position, gbx) in gbxs.iter().enumerate() {
        if gbx.index.as_usize() != position {
            return Err(DomainError::GridboxOrder {
                position,
                found: gbx.index,
            });
        }
    }
    Ok(())
}
