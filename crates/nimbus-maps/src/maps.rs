//! The core [`GridboxMaps`] trait.

use crate::edge::{EdgeBehavior, Neighbour};
use nimbus_core::{Axis, Bounds, Direction, GbxIndex, Position};
use smallvec::SmallVec;

/// Static geometry and adjacency of the gridbox domain.
///
/// All superdroplet transport flows through this trait: the orchestrator
/// asks for a gridbox's bounds to decide whether a droplet has left it,
/// and for the neighbour in the direction of travel to decide where it
/// went. Concrete backends ([`ColumnMaps`](crate::ColumnMaps),
/// [`CartesianMaps`](crate::CartesianMaps)) define the topology.
///
/// # Contract
///
/// - Pure lookups: no method has side effects, and results never change
///   for the lifetime of the maps.
/// - [`neighbour`](Self::neighbour) is total; callers check for
///   [`Neighbour::Edge`].
/// - [`bounds`](Self::bounds) and [`volume`](Self::volume) panic for an
///   index outside `0..ngbxs()`. Domain geometry is fixed when the maps
///   are built, so an out-of-range index is a bug in the caller, not a
///   runtime condition.
/// - Gridboxes reported as neighbours share a face: the face of `a` in
///   direction `d` coincides (after any periodic shift) with the face of
///   the neighbour in `d.opposite()`.
///
/// # Thread Safety
///
/// `Sync` is required because transport resolves every droplet's gridbox
/// in parallel against one shared `&maps`.
pub trait GridboxMaps: Send + Sync + 'static {
    /// Number of gridboxes in the domain.
    fn ngbxs(&self) -> usize;

    /// Number of modelled spatial dimensions (1 for a column, 3 for a
    /// full Cartesian domain).
    fn nspacedims(&self) -> usize;

    /// Spatial bounds of a gridbox.
    ///
    /// # Panics
    ///
    /// If `idx` is not a valid gridbox index.
    fn bounds(&self, idx: GbxIndex) -> Bounds;

    /// Neighbour of `idx` across the face in direction `dir`.
    fn neighbour(&self, idx: GbxIndex, dir: Direction) -> Neighbour;

    /// Bounds of the whole domain.
    fn domain_bounds(&self) -> Bounds;

    /// Edge behavior along `axis`.
    fn edge_behavior(&self, axis: Axis) -> EdgeBehavior;

    /// Volume of a gridbox [m^3].
    ///
    /// Default implementation multiplies the finite extents of
    /// [`bounds`](Self::bounds).
    fn volume(&self, idx: GbxIndex) -> f64 {
        let b = self.bounds(idx);
        Axis::ALL
            .iter()
            .map(|&axis| b.extent(axis))
            .filter(|e| e.is_finite())
            .product()
    }

    /// The gridbox containing `pos`, or `None` if it lies outside the
    /// domain.
    ///
    /// Default implementation scans every gridbox. Backends should
    /// override with a search over their half-coordinates.
    fn locate(&self, pos: &Position) -> Option<GbxIndex> {
        (0..self.ngbxs() as u32)
            .map(GbxIndex)
            .find(|&idx| self.bounds(idx).contains(pos))
    }

    /// All six neighbour lookups of a gridbox, in [`Direction::ALL`] order.
    fn neighbours(&self, idx: GbxIndex) -> SmallVec<[(Direction, Neighbour); 6]> {
        Direction::ALL
            .iter()
            .map(|&dir| (dir, self.neighbour(idx, dir)))
            .collect()
    }
}
