//! Full 3-D Cartesian grid of gridboxes.

use crate::edge::{EdgeBehavior, Neighbour};
use crate::error::MapsError;
use crate::halfcoords::{self, AxisStep};
use crate::maps::GridboxMaps;
use nimbus_core::{Axis, Bounds, Direction, GbxIndex, Position};

/// A rectilinear 3-D grid with independent half-coordinates per axis.
///
/// Gridbox numbering runs `z` fastest, then `x`, then `y`:
/// `index = k + nz * (i + nx * j)` for cell `(k, i, j)` along
/// `(z, x, y)`. Each axis has its own [`EdgeBehavior`].
///
/// # Examples
///
/// ```
/// use nimbus_core::{Direction, GbxIndex};
/// use nimbus_maps::{CartesianMaps, EdgeBehavior, GridboxMaps, Neighbour};
///
/// let maps = CartesianMaps::uniform(
///     [(0.0, 100.0, 4), (0.0, 50.0, 2), (0.0, 50.0, 2)],
///     [EdgeBehavior::Open, EdgeBehavior::Periodic, EdgeBehavior::Periodic],
/// )
/// .unwrap();
/// assert_eq!(maps.ngbxs(), 16);
///
/// // Moving east from x-cell 0 lands in x-cell 1: index + nz.
/// assert_eq!(maps.neighbour(GbxIndex(0), Direction::East), Neighbour::Gridbox(GbxIndex(4)));
///
/// // Vertical edges are open.
/// assert!(maps.neighbour(GbxIndex(3), Direction::Up).is_edge());
/// ```
#[derive(Debug, Clone)]
pub struct CartesianMaps {
    /// Half-coordinates in `[z, x, y]` order.
    halfs: [Vec<f64>; 3],
    edges: [EdgeBehavior; 3],
}

impl CartesianMaps {
    /// Maximum number of gridboxes: one index is reserved for
    /// [`GbxIndex::OUT_OF_DOMAIN`].
    pub const MAX_GBXS: usize = (u32::MAX - 1) as usize;

    /// Build from half-coordinates per axis, in `(z, x, y)` order.
    pub fn new(
        zhalf: Vec<f64>,
        xhalf: Vec<f64>,
        yhalf: Vec<f64>,
        edges: [EdgeBehavior; 3],
    ) -> Result<Self, MapsError> {
        halfcoords::validate(Axis::Z, &zhalf)?;
        halfcoords::validate(Axis::X, &xhalf)?;
        halfcoords::validate(Axis::Y, &yhalf)?;
        let count = halfcoords::ncells(&zhalf) as u128
            * halfcoords::ncells(&xhalf) as u128
            * halfcoords::ncells(&yhalf) as u128;
        if count > Self::MAX_GBXS as u128 {
            return Err(MapsError::TooManyGridboxes { count });
        }
        Ok(Self {
            halfs: [zhalf, xhalf, yhalf],
            edges,
        })
    }

    /// Build an evenly spaced grid from `(min, max, ncells)` per axis, in
    /// `(z, x, y)` order.
    pub fn uniform(
        axes: [(f64, f64, usize); 3],
        edges: [EdgeBehavior; 3],
    ) -> Result<Self, MapsError> {
        let [z, x, y] = axes;
        Self::new(
            halfcoords::even(z.0, z.1, z.2),
            halfcoords::even(x.0, x.1, x.2),
            halfcoords::even(y.0, y.1, y.2),
            edges,
        )
    }

    /// Number of cells along `axis`.
    pub fn ncells(&self, axis: Axis) -> usize {
        halfcoords::ncells(&self.halfs[axis.index()])
    }

    /// Half-coordinates along `axis`.
    pub fn halfcoords(&self, axis: Axis) -> &[f64] {
        &self.halfs[axis.index()]
    }

    /// Cell numbers `[k, i, j]` of a gridbox along `(z, x, y)`.
    pub fn cell_of(&self, idx: GbxIndex) -> [usize; 3] {
        let n = self.check(idx);
        let nz = self.ncells(Axis::Z);
        let nx = self.ncells(Axis::X);
        [n % nz, (n / nz) % nx, n / (nz * nx)]
    }

    /// Gridbox index of cell `[k, i, j]`.
    pub fn index_of(&self, cell: [usize; 3]) -> GbxIndex {
        let nz = self.ncells(Axis::Z);
        let nx = self.ncells(Axis::X);
        GbxIndex((cell[0] + nz * (cell[1] + nx * cell[2])) as u32)
    }

    fn check(&self, idx: GbxIndex) -> usize {
        let n = idx.as_usize();
        assert!(
            n < self.ngbxs(),
            "gridbox index {idx} out of range for domain of {} gridboxes",
            self.ngbxs()
        );
        n
    }
}

impl GridboxMaps for CartesianMaps {
    fn ngbxs(&self) -> usize {
        Axis::ALL.iter().map(|&a| self.ncells(a)).product()
    }

    fn nspacedims(&self) -> usize {
        3
    }

    fn bounds(&self, idx: GbxIndex) -> Bounds {
        let cell = self.cell_of(idx);
        let mut lower = Position::default();
        let mut upper = Position::default();
        for axis in Axis::ALL {
            let h = &self.halfs[axis.index()];
            let c = cell[axis.index()];
            *lower.get_mut(axis) = h[c];
            *upper.get_mut(axis) = h[c + 1];
        }
        Bounds::new(lower, upper)
    }

    fn neighbour(&self, idx: GbxIndex, dir: Direction) -> Neighbour {
        let mut cell = self.cell_of(idx);
        let axis = dir.axis();
        let a = axis.index();
        match halfcoords::step(&self.halfs[a], cell[a], dir.is_upper(), self.edges[a]) {
            AxisStep::Adjacent(c) => {
                cell[a] = c;
                Neighbour::Gridbox(self.index_of(cell))
            }
            AxisStep::Wrapped(c, shift) => {
                cell[a] = c;
                Neighbour::Wrapped {
                    index: self.index_of(cell),
                    shift,
                }
            }
            AxisStep::Edge => Neighbour::Edge,
        }
    }

    fn domain_bounds(&self) -> Bounds {
        let mut lower = Position::default();
        let mut upper = Position::default();
        for axis in Axis::ALL {
            let h = &self.halfs[axis.index()];
            *lower.get_mut(axis) = h[0];
            *upper.get_mut(axis) = h[h.len() - 1];
        }
        Bounds::new(lower, upper)
    }

    fn edge_behavior(&self, axis: Axis) -> EdgeBehavior {
        self.edges[axis.index()]
    }

    fn locate(&self, pos: &Position) -> Option<GbxIndex> {
        let mut cell = [0usize; 3];
        for axis in Axis::ALL {
            cell[axis.index()] = halfcoords::locate(&self.halfs[axis.index()], pos.get(axis))?;
        }
        Some(self.index_of(cell))
    }
}
