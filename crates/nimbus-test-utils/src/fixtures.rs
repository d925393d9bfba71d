//! Reusable maps and populations.
//!
//! - [`column`] / [`periodic_column`]: 25 m gridboxes from z = 0.
//! - [`kid_column`]: the 129-level kinematic column, -25 m to 3200 m.
//! - [`cartesian_box`]: 4 x 3 x 2 gridboxes of 10 m.

use nimbus_core::{GbxIndex, Position, SdId, Superdrop};
use nimbus_domain::{create_supers, InitSupers, SupersInDomain};
use nimbus_maps::{CartesianMaps, ColumnMaps, EdgeBehavior, GridboxMaps};

/// Gridbox depth used by [`column`] and [`periodic_column`] [m].
pub const COLUMN_DZ: f64 = 25.0;

fn uniform_column(nz: usize, edge: EdgeBehavior) -> ColumnMaps {
    match ColumnMaps::uniform(0.0, COLUMN_DZ * nz as f64, nz, edge) {
        Ok(maps) => maps,
        Err(e) => panic!("bad column fixture ({nz} levels): {e}"),
    }
}

/// `nz` gridboxes with open top and bottom.
pub fn column(nz: usize) -> ColumnMaps {
    uniform_column(nz, EdgeBehavior::Open)
}

/// `nz` gridboxes whose top wraps to the bottom.
pub fn periodic_column(nz: usize) -> ColumnMaps {
    uniform_column(nz, EdgeBehavior::Periodic)
}

/// The kinematic column: 129 gridboxes of 25 m from -25 m to 3200 m.
pub fn kid_column() -> ColumnMaps {
    match ColumnMaps::uniform(-25.0, 3200.0, 129, EdgeBehavior::Open) {
        Ok(maps) => maps,
        Err(e) => panic!("bad kinematic column fixture: {e}"),
    }
}

/// 4 x 3 x 2 gridboxes of 10 m along (z, x, y), one edge behaviour per
/// axis.
pub fn cartesian_box(edges: [EdgeBehavior; 3]) -> CartesianMaps {
    match CartesianMaps::uniform([(0.0, 40.0, 4), (0.0, 30.0, 3), (0.0, 20.0, 2)], edges) {
        Ok(maps) => maps,
        Err(e) => panic!("bad cartesian fixture: {e}"),
    }
}

/// A 1 um droplet of multiplicity 1 at height `z`, centred horizontally
/// in the unit extent of a column.
pub fn drop_at(id: u64, gbx: u32, z: f64) -> Superdrop {
    Superdrop::new(SdId(id), GbxIndex(gbx), Position::new(z, 0.5, 0.5), 1e-6, 0.0, 1)
}

/// `per_gbx` seeded droplets in every gridbox of `maps`.
pub fn seeded<M: GridboxMaps>(maps: &M, per_gbx: usize, seed: u64) -> SupersInDomain {
    let init = InitSupers {
        nsupers_per_gbx: per_gbx,
        seed,
        ..Default::default()
    };
    match create_supers(maps, &init) {
        Ok(supers) => supers,
        Err(e) => panic!("bad seeded fixture: {e}"),
    }
}
