//! GridboxMaps compliance test helpers.
//!
//! These functions verify that a maps backend satisfies the invariants
//! required by the trait contract. Reused across the column and
//! Cartesian test modules.

use crate::edge::{EdgeBehavior, Neighbour};
use crate::maps::GridboxMaps;
use indexmap::IndexSet;
use nimbus_core::{Axis, Direction, GbxIndex, Position};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

fn all_gbxs(maps: &dyn GridboxMaps) -> impl Iterator<Item = GbxIndex> {
    (0..maps.ngbxs() as u32).map(GbxIndex)
}

/// Assert that crossing back from a neighbour returns to the start, with
/// the opposite periodic shift.
pub fn assert_neighbours_symmetric(maps: &dyn GridboxMaps) {
    for a in all_gbxs(maps) {
        for dir in Direction::ALL {
            let n = maps.neighbour(a, dir);
            let Some(b) = n.index() else { continue };
            let back = maps.neighbour(b, dir.opposite());
            assert_eq!(
                back.index(),
                Some(a),
                "neighbour symmetry violated: {b} is {dir:?} of {a} but {a} is not {:?} of {b}",
                dir.opposite()
            );
            assert!(
                close(back.shift(), -n.shift()),
                "periodic shifts not opposite between {a} and {b}: {} vs {}",
                n.shift(),
                back.shift()
            );
        }
    }
}

/// Assert that neighbours share the crossed face (after any shift) and
/// agree on their extent along the other two axes.
pub fn assert_faces_shared(maps: &dyn GridboxMaps) {
    for a in all_gbxs(maps) {
        let ba = maps.bounds(a);
        for dir in Direction::ALL {
            let n = maps.neighbour(a, dir);
            let Some(b) = n.index() else { continue };
            let bb = maps.bounds(b);
            let crossed = ba.face(dir) + n.shift();
            assert!(
                close(crossed, bb.face(dir.opposite())),
                "{dir:?} face of {a} at {crossed} does not meet {:?} face of {b} at {}",
                dir.opposite(),
                bb.face(dir.opposite())
            );
            for axis in Axis::ALL.into_iter().filter(|&ax| ax != dir.axis()) {
                assert_eq!(
                    ba.along(axis),
                    bb.along(axis),
                    "{a} and {b} are {dir:?} neighbours but differ along {axis}"
                );
            }
        }
    }
}

/// Assert that `Neighbour::Edge` appears exactly on open domain faces.
pub fn assert_edges_on_open_faces(maps: &dyn GridboxMaps) {
    let domain = maps.domain_bounds();
    for a in all_gbxs(maps) {
        let ba = maps.bounds(a);
        for dir in Direction::ALL {
            let on_domain_face = ba.face(dir) == domain.face(dir);
            let open = maps.edge_behavior(dir.axis()) == EdgeBehavior::Open;
            let n = maps.neighbour(a, dir);
            assert_eq!(
                n.is_edge(),
                on_domain_face && open,
                "{a} {dir:?}: got {n:?}, on domain face = {on_domain_face}, open = {open}"
            );
            if let Neighbour::Wrapped { .. } = n {
                assert!(on_domain_face, "{a} {dir:?} wraps from an interior face");
            }
        }
    }
}

/// Assert that every gridbox midpoint locates back to that gridbox, and
/// that every gridbox is hit exactly once.
pub fn assert_locate_midpoints(maps: &dyn GridboxMaps) {
    let mut seen = IndexSet::new();
    for a in all_gbxs(maps) {
        let b = maps.bounds(a);
        let mid = Position::new(b.midpoint(Axis::Z), b.midpoint(Axis::X), b.midpoint(Axis::Y));
        assert_eq!(maps.locate(&mid), Some(a), "midpoint {mid:?} of {a} misplaced");
        assert!(b.contains(&mid));
        seen.insert(a);
    }
    assert_eq!(seen.len(), maps.ngbxs());
}

/// Assert that volumes are positive and tile the domain.
pub fn assert_volumes_tile_domain(maps: &dyn GridboxMaps) {
    let mut total = 0.0;
    for a in all_gbxs(maps) {
        let v = maps.volume(a);
        assert!(v > 0.0, "volume of {a} is {v}");
        total += v;
    }
    let domain = maps.domain_bounds();
    let expected: f64 = Axis::ALL
        .iter()
        .map(|&axis| domain.extent(axis))
        .filter(|e| e.is_finite())
        .product();
    assert!(
        (total - expected).abs() <= 1e-9 * expected,
        "gridbox volumes sum to {total}, domain volume is {expected}"
    );
}

/// Assert that the `neighbours` helper lists all six directions in order.
pub fn assert_neighbours_complete(maps: &dyn GridboxMaps) {
    for a in all_gbxs(maps) {
        let list = maps.neighbours(a);
        assert_eq!(list.len(), 6);
        for ((dir, n), expected) in list.iter().zip(Direction::ALL) {
            assert_eq!(*dir, expected);
            assert_eq!(*n, maps.neighbour(a, expected));
        }
    }
}

/// Run all compliance checks.
pub fn run_full_compliance(maps: &dyn GridboxMaps) {
    assert_neighbours_symmetric(maps);
    assert_faces_shared(maps);
    assert_edges_on_open_faces(maps);
    assert_locate_midpoints(maps);
    assert_volumes_tile_domain(maps);
    assert_neighbours_complete(maps);
}
