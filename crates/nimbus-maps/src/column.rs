//! Single vertical column of gridboxes (1-D).

use crate::edge::{EdgeBehavior, Neighbour};
use crate::error::MapsError;
use crate::halfcoords::{self, AxisStep};
use crate::maps::GridboxMaps;
use nimbus_core::{Axis, Bounds, Direction, GbxIndex, Position};

/// A one-dimensional column of gridboxes stacked along `z`.
///
/// Gridbox `k` spans `[zhalf[k], zhalf[k + 1])`, so index 0 is the
/// bottom of the column. The horizontal extent is a single cell which is
/// periodic onto itself: a droplet drifting out sideways re-enters on the
/// opposite side of the same gridbox. Vertical edges follow the
/// configured [`EdgeBehavior`].
///
/// # Examples
///
/// ```
/// use nimbus_core::{Direction, GbxIndex};
/// use nimbus_maps::{ColumnMaps, EdgeBehavior, GridboxMaps, Neighbour};
///
/// let maps = ColumnMaps::uniform(0.0, 100.0, 4, EdgeBehavior::Open).unwrap();
/// assert_eq!(maps.ngbxs(), 4);
/// assert_eq!(maps.nspacedims(), 1);
///
/// // Interior gridbox has a neighbour above.
/// assert_eq!(maps.neighbour(GbxIndex(1), Direction::Up), Neighbour::Gridbox(GbxIndex(2)));
///
/// // The top gridbox sits at the domain edge.
/// assert!(maps.neighbour(GbxIndex(3), Direction::Up).is_edge());
/// ```
#[derive(Debug, Clone)]
pub struct ColumnMaps {
    zhalf: Vec<f64>,
    zedge: EdgeBehavior,
    xrange: (f64, f64),
    yrange: (f64, f64),
}

impl ColumnMaps {
    /// Maximum number of gridboxes: one index is reserved for
    /// [`GbxIndex::OUT_OF_DOMAIN`].
    pub const MAX_GBXS: usize = (u32::MAX - 1) as usize;

    /// Build a column from its vertical half-levels (cell faces).
    ///
    /// The horizontal extent defaults to `[0, 1) x [0, 1)` metres.
    pub fn new(zhalf: Vec<f64>, zedge: EdgeBehavior) -> Result<Self, MapsError> {
        halfcoords::validate(Axis::Z, &zhalf)?;
        let n = halfcoords::ncells(&zhalf);
        if n > Self::MAX_GBXS {
            return Err(MapsError::TooManyGridboxes { count: n as u128 });
        }
        Ok(Self {
            zhalf,
            zedge,
            xrange: (0.0, 1.0),
            yrange: (0.0, 1.0),
        })
    }

    /// Build a column of `nz` equal-depth gridboxes spanning `[zmin, zmax)`.
    pub fn uniform(zmin: f64, zmax: f64, nz: usize, zedge: EdgeBehavior) -> Result<Self, MapsError> {
        Self::new(halfcoords::even(zmin, zmax, nz), zedge)
    }

    /// Replace the horizontal extent of the column.
    pub fn with_horizontal_extent(
        mut self,
        xrange: (f64, f64),
        yrange: (f64, f64),
    ) -> Result<Self, MapsError> {
        halfcoords::validate(Axis::X, &[xrange.0, xrange.1])?;
        halfcoords::validate(Axis::Y, &[yrange.0, yrange.1])?;
        self.xrange = xrange;
        self.yrange = yrange;
        Ok(self)
    }

    /// Number of gridboxes in the column.
    pub fn nz(&self) -> usize {
        halfcoords::ncells(&self.zhalf)
    }

    /// Vertical half-levels.
    pub fn zhalf(&self) -> &[f64] {
        &self.zhalf
    }

    /// Index of the uppermost gridbox.
    pub fn top(&self) -> GbxIndex {
        GbxIndex((self.nz() - 1) as u32)
    }

    fn check(&self, idx: GbxIndex) -> usize {
        let k = idx.as_usize();
        assert!(
            k < self.nz(),
            "gridbox index {idx} out of range for column of {} gridboxes",
            self.nz()
        );
        k
    }

    fn horizontal_wrap(&self, dir: Direction, idx: GbxIndex) -> Neighbour {
        let (lo, hi) = match dir.axis() {
            Axis::X => self.xrange,
            _ => self.yrange,
        };
        let width = hi - lo;
        Neighbour::Wrapped {
            index: idx,
            shift: if dir.is_upper() { -width } else { width },
        }
    }
}

impl GridboxMaps for ColumnMaps {
    fn ngbxs(&self) -> usize {
        self.nz()
    }

    fn nspacedims(&self) -> usize {
        1
    }

    fn bounds(&self, idx: GbxIndex) -> Bounds {
        let k = self.check(idx);
        Bounds::new(
            Position::new(self.zhalf[k], self.xrange.0, self.yrange.0),
            Position::new(self.zhalf[k + 1], self.xrange.1, self.yrange.1),
        )
    }

    fn neighbour(&self, idx: GbxIndex, dir: Direction) -> Neighbour {
        let k = self.check(idx);
        match dir.axis() {
            Axis::Z => match halfcoords::step(&self.zhalf, k, dir.is_upper(), self.zedge) {
                AxisStep::Adjacent(k) => Neighbour::Gridbox(GbxIndex(k as u32)),
                AxisStep::Wrapped(k, shift) => Neighbour::Wrapped {
                    index: GbxIndex(k as u32),
                    shift,
                },
                AxisStep::Edge => Neighbour::Edge,
            },
            Axis::X | Axis::Y => self.horizontal_wrap(dir, idx),
        }
    }

    fn domain_bounds(&self) -> Bounds {
        Bounds::new(
            Position::new(self.zhalf[0], self.xrange.0, self.yrange.0),
            Position::new(self.zhalf[self.nz()], self.xrange.1, self.yrange.1),
        )
    }

    fn edge_behavior(&self, axis: Axis) -> EdgeBehavior {
        match axis {
            Axis::Z => self.zedge,
            Axis::X | Axis::Y => EdgeBehavior::Periodic,
        }
    }

    fn locate(&self, pos: &Position) -> Option<GbxIndex> {
        if !self.domain_bounds().contains(pos) {
            return None;
        }
        halfcoords::locate(&self.zhalf, pos.z).map(|k| GbxIndex(k as u32))
    }
}
