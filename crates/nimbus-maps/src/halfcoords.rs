//! Helpers over the half-coordinates (cell faces) of a single axis,
//! shared by the column and Cartesian backends.

use crate::edge::EdgeBehavior;
use crate::error::MapsError;
use nimbus_core::Axis;

/// Where one step along an axis lands, in cell numbers of that axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum AxisStep {
    /// The adjacent cell.
    Adjacent(usize),
    /// The cell on the other side of a periodic edge, with the
    /// coordinate shift that crossing implies.
    Wrapped(usize, f64),
    /// Open edge.
    Edge,
}

/// Check that `halfs` describes at least one cell with finite, strictly
/// increasing faces.
pub(crate) fn validate(axis: Axis, halfs: &[f64]) -> Result<(), MapsError> {
    if halfs.len() < 2 {
        return Err(MapsError::TooFewHalfCoords {
            axis,
            got: halfs.len(),
        });
    }
    for (position, h) in halfs.iter().enumerate() {
        if !h.is_finite() {
            return Err(MapsError::NonFinite { axis, position });
        }
    }
    for (position, pair) in halfs.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(MapsError::NonMonotonic {
                axis,
                position: position + 1,
            });
        }
    }
    Ok(())
}

/// Evenly spaced faces `[lo, lo + delta, ..., hi]`.
///
/// The last face is pinned to `hi` so accumulated rounding cannot shrink
/// the domain.
pub(crate) fn even(lo: f64, hi: f64, ncells: usize) -> Vec<f64> {
    let delta = (hi - lo) / ncells as f64;
    let mut faces: Vec<f64> = (0..ncells).map(|i| lo + i as f64 * delta).collect();
    faces.push(hi);
    faces
}

/// Number of cells described by `halfs`.
pub(crate) fn ncells(halfs: &[f64]) -> usize {
    halfs.len() - 1
}

/// Cell containing `value` under half-open `[h_i, h_{i+1})` semantics.
pub(crate) fn locate(halfs: &[f64], value: f64) -> Option<usize> {
    let first = *halfs.first()?;
    let last = *halfs.last()?;
    if !(value >= first && value < last) {
        return None;
    }
    // Number of faces at or below `value`, minus one, is the cell.
    Some(halfs.partition_point(|&h| h <= value) - 1)
}

/// Step one cell from `cell` towards the upper (`upper == true`) or lower
/// face of an axis with the given faces and edge behavior.
pub(crate) fn step(halfs: &[f64], cell: usize, upper: bool, edge: EdgeBehavior) -> AxisStep {
    let n = ncells(halfs);
    let length = halfs[n] - halfs[0];
    if upper {
        if cell + 1 < n {
            AxisStep::Adjacent(cell + 1)
        } else {
            match edge {
                EdgeBehavior::Periodic => AxisStep::Wrapped(0, -length),
                EdgeBehavior::Open => AxisStep::Edge,
            }
        }
    } else if cell > 0 {
        AxisStep::Adjacent(cell - 1)
    } else {
        match edge {
            EdgeBehavior::Periodic => AxisStep::Wrapped(n - 1, length),
            EdgeBehavior::Open => AxisStep::Edge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_bad_faces() {
        assert!(matches!(
            validate(Axis::Z, &[0.0]),
            Err(MapsError::TooFewHalfCoords { got: 1, .. })
        ));
        assert!(matches!(
            validate(Axis::X, &[0.0, 1.0, 1.0]),
            Err(MapsError::NonMonotonic { position: 2, .. })
        ));
        assert!(matches!(
            validate(Axis::Y, &[0.0, f64::NAN]),
            Err(MapsError::NonFinite { position: 1, .. })
        ));
        assert!(validate(Axis::Z, &[0.0, 25.0, 50.0]).is_ok());
    }

    #[test]
    fn locate_is_half_open() {
        let h = [0.0, 10.0, 20.0, 30.0];
        assert_eq!(locate(&h, 0.0), Some(0));
        assert_eq!(locate(&h, 9.999), Some(0));
        assert_eq!(locate(&h, 10.0), Some(1));
        assert_eq!(locate(&h, 29.0), Some(2));
        assert_eq!(locate(&h, 30.0), None);
        assert_eq!(locate(&h, -0.1), None);
        assert_eq!(locate(&h, f64::NAN), None);
    }

    #[test]
    fn step_open_and_periodic() {
        let h = [0.0, 10.0, 20.0];
        assert_eq!(step(&h, 0, true, EdgeBehavior::Open), AxisStep::Adjacent(1));
        assert_eq!(step(&h, 1, true, EdgeBehavior::Open), AxisStep::Edge);
        assert_eq!(step(&h, 0, false, EdgeBehavior::Open), AxisStep::Edge);
        assert_eq!(
            step(&h, 1, true, EdgeBehavior::Periodic),
            AxisStep::Wrapped(0, -20.0)
        );
        assert_eq!(
            step(&h, 0, false, EdgeBehavior::Periodic),
            AxisStep::Wrapped(1, 20.0)
        );
    }

    #[test]
    fn even_faces_pin_the_top() {
        let h = even(-25.0, 3200.0, 129);
        assert_eq!(h.len(), 130);
        assert_eq!(h[0], -25.0);
        assert_eq!(*h.last().unwrap(), 3200.0);
        assert!(validate(Axis::Z, &h).is_ok());
    }
}
