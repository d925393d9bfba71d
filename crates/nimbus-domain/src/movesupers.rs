//! The per-step transport orchestrator.
//!
//! [`MoveSupersInDomain::run_step`] runs four stages, each finishing for
//! every droplet before the next begins:
//!
//! 1. **Motion**: candidate positions from the [`Motion`], in parallel
//!    over gridboxes.
//! 2. **Reindex**: each droplet's owning index is resolved through the
//!    maps, at most one neighbour hop per axis. Periodic crossings shift
//!    the coordinate; open-edge crossings mark the droplet out of domain.
//!    Ends with a repartition that gathers those droplets as escapees.
//! 3. **Boundary resolution**: the [`BoundaryConditions`] decide each
//!    escapee's fate.
//! 4. **Commit**: a final repartition; unresolved escapees are removed.
//!
//! The population is moved through by value, so an interrupted step
//! never leaves a half-built partition behind.

use crate::boundary::BoundaryConditions;
use crate::gridbox::Gridbox;
use crate::metrics::TransportMetrics;
use crate::motion::Motion;
use crate::supers::SupersInDomain;
use nimbus_core::{Axis, GbxIndex, ModelStep, Superdrop};
use nimbus_maps::{GridboxMaps, Neighbour};
use rayon::prelude::*;
use std::time::Instant;
use tracing::debug;

/// What reindexing did to one droplet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Reindexed {
    /// Still in the same gridbox.
    Stayed,
    /// Now owned by a different gridbox.
    Moved {
        /// Whether a periodic edge was crossed on the way.
        wrapped: bool,
    },
    /// Still in the same gridbox after crossing a periodic edge onto
    /// itself.
    WrappedInPlace,
    /// Crossed an open domain edge.
    Escaped,
}

#[derive(Clone, Copy, Debug, Default)]
struct ReindexCounts {
    moved: u64,
    wrapped: u64,
    escaped: u64,
}

impl ReindexCounts {
    fn record(mut self, r: Reindexed) -> Self {
        match r {
            Reindexed::Stayed => {}
            Reindexed::Moved { wrapped } => {
                self.moved += 1;
                self.wrapped += wrapped as u64;
            }
            Reindexed::WrappedInPlace => self.wrapped += 1,
            Reindexed::Escaped => self.escaped += 1,
        }
        self
    }

    fn merge(self, o: Self) -> Self {
        Self {
            moved: self.moved + o.moved,
            wrapped: self.wrapped + o.wrapped,
            escaped: self.escaped + o.escaped,
        }
    }
}

/// Resolve the owning gridbox of `drop`, currently owned by `from`,
/// after its position has been updated.
///
/// # Panics
///
/// If the position is not finite, or if the droplet travelled further
/// than one gridbox along any axis (the motion step is too long for the
/// grid spacing).
pub(crate) fn reindex<M: GridboxMaps>(maps: &M, from: GbxIndex, drop: &mut Superdrop) -> Reindexed {
    assert!(
        drop.position.is_finite(),
        "superdroplet {} has non-finite position {:?} after motion",
        drop.sdid,
        drop.position
    );
    let mut idx = from;
    let mut wrapped = false;
    for axis in Axis::ALL {
        let Some(dir) = maps.bounds(idx).exit_direction(axis, drop.position.get(axis)) else {
            continue;
        };
        match maps.neighbour(idx, dir) {
            Neighbour::Gridbox(next) => idx = next,
            Neighbour::Wrapped { index, shift } => {
                idx = index;
                wrapped = true;
                let (lo, hi) = maps.bounds(idx).along(axis);
                let c = drop.position.get_mut(axis);
                *c += shift;
                // Rounding in the shift can land on or just past a face.
                // Anything further is a real overshoot for the assert below.
                let ulps = 4.0 * f64::EPSILON * hi.abs().max(lo.abs()).max(shift.abs());
                if *c >= hi && *c - hi <= ulps {
                    *c = hi.next_down();
                } else if *c < lo && lo - *c <= ulps {
                    *c = lo;
                }
            }
            Neighbour::Edge => {
                drop.mark_out_of_domain();
                return Reindexed::Escaped;
            }
        }
        assert!(
            maps.bounds(idx).contains_along(axis, drop.position.get(axis)),
            "superdroplet {} crossed more than one gridbox along {axis} in one step \
             (from gridbox {from}, {axis} = {}); shorten the motion step",
            drop.sdid,
            drop.position.get(axis)
        );
    }
    drop.gbxindex = idx;
    match (idx == from, wrapped) {
        (true, false) => Reindexed::Stayed,
        (true, true) => Reindexed::WrappedInPlace,
        (false, wrapped) => Reindexed::Moved { wrapped },
    }
}

/// Moves superdroplets through the domain once per motion step.
///
/// Generic over the [`Motion`] and [`BoundaryConditions`] so the hot
/// per-droplet loops are monomorphised; use
/// [`AnyBoundaryConditions`](crate::AnyBoundaryConditions) to pick
/// boundary conditions at runtime.
#[derive(Clone, Debug)]
pub struct MoveSupersInDomain<Mo: Motion, B: BoundaryConditions> {
    motion: Mo,
    bcs: B,
}

impl<Mo: Motion, B: BoundaryConditions> MoveSupersInDomain<Mo, B> {
    /// Combine a motion with boundary conditions.
    pub fn new(motion: Mo, bcs: B) -> Self {
        Self { motion, bcs }
    }

    /// The motion.
    pub fn motion(&self) -> &Mo {
        &self.motion
    }

    /// The boundary conditions.
    pub fn boundary_conditions(&self) -> &B {
        &self.bcs
    }

    /// First step after `t` on which transport runs.
    pub fn next_step(&self, t: ModelStep) -> ModelStep {
        self.motion.next_step(t)
    }

    /// `true` if transport runs on step `t`.
    pub fn on_step(&self, t: ModelStep) -> bool {
        self.motion.on_step(t)
    }

    /// Advance every droplet by one motion step, if `t` is a motion step.
    ///
    /// `gbxs` and `supers` must both be built over `maps`' index space;
    /// [`check_gridboxes`](crate::check_gridboxes) verifies the former at
    /// composition time.
    pub fn run_step<M: GridboxMaps>(
        &self,
        t: ModelStep,
        maps: &M,
        gbxs: &[Gridbox],
        supers: SupersInDomain,
    ) -> (SupersInDomain, TransportMetrics) {
        if !self.on_step(t) {
            return (supers, TransportMetrics::default());
        }
        debug_assert_eq!(gbxs.len(), maps.ngbxs());
        debug_assert_eq!(supers.ngbxs(), maps.ngbxs());

        let start = Instant::now();
        let mut supers = supers;
        let nsupers = supers.totnsupers() as u64;

        // Motion.
        supers
            .gridbox_views_mut()
            .into_par_iter()
            .zip(gbxs.par_iter())
            .for_each(|(view, gbx)| {
                let bounds = maps.bounds(gbx.index);
                for drop in view.iter_mut() {
                    drop.position = self.motion.new_position(gbx, &bounds, drop);
                }
            });

        // Reindex.
        let counts = supers
            .gridbox_views_mut()
            .into_par_iter()
            .zip(gbxs.par_iter())
            .map(|(view, gbx)| {
                view.iter_mut().fold(ReindexCounts::default(), |acc, drop| {
                    acc.record(reindex(maps, gbx.index, drop))
                })
            })
            .reduce(ReindexCounts::default, ReindexCounts::merge);
        let supers = supers.repartition();

        #[cfg(debug_assertions)]
        let interior = supers.ids();

        // Boundary resolution.
        let supers = self.bcs.apply(maps, gbxs, supers);
        let nreinserted = supers.escapees().iter().filter(|d| d.is_in_domain()).count() as u64;
        let nremoved = supers.escapees().len() as u64 - nreinserted;

        // Commit.
        let supers = supers.commit();

        #[cfg(debug_assertions)]
        {
            let after = supers.ids();
            for id in &interior {
                assert!(
                    after.contains(id),
                    "boundary conditions discarded interior superdroplet {id}"
                );
            }
        }

        let metrics = TransportMetrics {
            nsupers,
            nmoved: counts.moved,
            nwrapped: counts.wrapped,
            ncrossed: counts.escaped,
            nreinserted,
            nremoved,
            elapsed_us: start.elapsed().as_micros() as u64,
        };
        debug!(
            step = %t,
            moved = metrics.nmoved,
            wrapped = metrics.nwrapped,
            crossed = metrics.ncrossed,
            reinserted = metrics.nreinserted,
            removed = metrics.nremoved,
            "transport step"
        );
        (supers, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{NullBoundaryConditions, ReflectingBoundary, TopReinitialisation};
    use crate::gridbox::create_gridboxes;
    use crate::motion::{ConstantVelocityMotion, NullMotion};
    use nimbus_core::{Position, SdId};
    use nimbus_maps::{CartesianMaps, ColumnMaps, EdgeBehavior};

    fn column(edge: EdgeBehavior) -> ColumnMaps {
        ColumnMaps::uniform(0.0, 100.0, 4, edge).unwrap()
    }

    fn drop_at(id: u64, gbx: u32, z: f64) -> Superdrop {
        Superdrop::new(SdId(id), GbxIndex(gbx), Position::new(z, 0.5, 0.5), 50.0, 1e-18, 1)
    }

    fn rising(speed: f64) -> ConstantVelocityMotion {
        ConstantVelocityMotion::new(1, 1.0, Position::new(speed, 0.0, 0.0))
    }

    // ── Reindex ─────────────────────────────────────────────────

    #[test]
    fn reindex_outcomes() {
        let maps = column(EdgeBehavior::Open);
        let mut d = drop_at(0, 1, 30.0);
        assert_eq!(reindex(&maps, GbxIndex(1), &mut d), Reindexed::Stayed);

        d.position.z = 55.0;
        assert_eq!(
            reindex(&maps, GbxIndex(1), &mut d),
            Reindexed::Moved { wrapped: false }
        );
        assert_eq!(d.gbxindex, GbxIndex(2));

        let mut top = drop_at(1, 3, 100.5);
        assert_eq!(reindex(&maps, GbxIndex(3), &mut top), Reindexed::Escaped);
        assert!(!top.is_in_domain());
    }

    #[test]
    fn reindex_wraps_periodic_column() {
        let maps = column(EdgeBehavior::Periodic);
        let mut d = drop_at(0, 3, 104.0);
        assert_eq!(
            reindex(&maps, GbxIndex(3), &mut d),
            Reindexed::Moved { wrapped: true }
        );
        assert_eq!(d.gbxindex, GbxIndex(0));
        assert!((d.position.z - 4.0).abs() < 1e-12);

        // Horizontal drift in a column wraps onto the same gridbox.
        let mut side = drop_at(1, 1, 30.0);
        side.position.x = 1.25;
        assert_eq!(reindex(&maps, GbxIndex(1), &mut side), Reindexed::WrappedInPlace);
        assert!((side.position.x - 0.25).abs() < 1e-12);
    }

    #[test]
    fn reindex_diagonal_cartesian_hop() {
        let maps = CartesianMaps::uniform(
            [(0.0, 30.0, 3), (0.0, 30.0, 3), (0.0, 30.0, 3)],
            [EdgeBehavior::Open; 3],
        )
        .unwrap();
        let from = maps.index_of([1, 1, 1]);
        let mut d = Superdrop::new(SdId(0), from, Position::new(21.0, 9.0, 25.0), 1.0, 0.0, 1);
        assert_eq!(
            reindex(&maps, from, &mut d),
            Reindexed::Moved { wrapped: false }
        );
        assert_eq!(d.gbxindex, maps.index_of([2, 0, 2]));
    }

    #[test]
    #[should_panic(expected = "more than one gridbox")]
    fn reindex_panics_on_cfl_violation() {
        let maps = column(EdgeBehavior::Open);
        let mut d = drop_at(0, 0, 60.0);
        let _ = reindex(&maps, GbxIndex(0), &mut d);
    }

    #[test]
    #[should_panic(expected = "more than one gridbox")]
    fn reindex_panics_on_periodic_overshoot() {
        // 140 wraps to 40, which is gridbox 1, two hops from gridbox 3.
        let maps = column(EdgeBehavior::Periodic);
        let mut d = drop_at(0, 3, 140.0);
        let _ = reindex(&maps, GbxIndex(3), &mut d);
    }

    #[test]
    fn reindex_absorbs_rounding_on_periodic_face() {
        let maps = column(EdgeBehavior::Periodic);
        let mut d = drop_at(0, 3, 100.0);
        assert_eq!(
            reindex(&maps, GbxIndex(3), &mut d),
            Reindexed::Moved { wrapped: true }
        );
        assert_eq!(d.gbxindex, GbxIndex(0));
        assert_eq!(d.position.z, 0.0);

        // -1e-15 + 100 rounds to exactly 100, the top face.
        let mut low = drop_at(1, 0, -1e-15);
        assert_eq!(
            reindex(&maps, GbxIndex(0), &mut low),
            Reindexed::Moved { wrapped: true }
        );
        assert_eq!(low.gbxindex, GbxIndex(3));
        assert!(low.position.z < 100.0 && low.position.z >= 75.0);
    }

    #[test]
    #[should_panic(expected = "non-finite")]
    fn reindex_panics_on_nan() {
        let maps = column(EdgeBehavior::Open);
        let mut d = drop_at(0, 0, f64::NAN);
        let _ = reindex(&maps, GbxIndex(0), &mut d);
    }

    // ── Full steps ──────────────────────────────────────────────

    #[test]
    fn off_step_is_a_no_op() {
        let maps = column(EdgeBehavior::Open);
        let gbxs = create_gridboxes(&maps);
        let supers = SupersInDomain::new(4, vec![drop_at(0, 0, 10.0)]).unwrap();
        let mover = MoveSupersInDomain::new(NullMotion, NullBoundaryConditions);
        let (out, m) = mover.run_step(ModelStep(0), &maps, &gbxs, supers.clone());
        assert_eq!(out, supers);
        assert_eq!(m, TransportMetrics::default());
    }

    #[test]
    fn top_reinit_scenario() {
        let maps = column(EdgeBehavior::Open);
        let gbxs = create_gridboxes(&maps);
        let supers = SupersInDomain::new(4, vec![drop_at(7, 3, 90.0)]).unwrap();
        let mover = MoveSupersInDomain::new(rising(20.0), TopReinitialisation::new(0.0));
        let (out, m) = mover.run_step(ModelStep(0), &maps, &gbxs, supers);

        assert_eq!(out.all().len(), 1);
        let d = &out.all()[0];
        assert_eq!(d.sdid, SdId(7));
        assert_eq!(d.gbxindex, GbxIndex(3));
        assert_eq!(d.radius, 0.0);
        assert!(out.check_positions(&maps).is_ok());
        assert_eq!(m.ncrossed, 1);
        assert_eq!(m.nreinserted, 1);
        assert_eq!(m.nremoved, 0);
    }

    #[test]
    fn open_edges_with_null_bcs_remove_escapees() {
        let maps = column(EdgeBehavior::Open);
        let gbxs = create_gridboxes(&maps);
        let supers = SupersInDomain::new(
            4,
            vec![drop_at(0, 3, 95.0), drop_at(1, 0, 5.0), drop_at(2, 1, 45.0)],
        )
        .unwrap();
        let mover = MoveSupersInDomain::new(rising(10.0), NullBoundaryConditions);
        let (out, m) = mover.run_step(ModelStep(3), &maps, &gbxs, supers);
        assert_eq!(out.totnsupers(), 2);
        assert_eq!(out.nsupers_in(GbxIndex(0)), 1);
        assert_eq!(out.nsupers_in(GbxIndex(2)), 1);
        assert_eq!(m.nsupers, 3);
        assert_eq!(m.nmoved, 1);
        assert_eq!(m.nremoved, 1);
        assert_eq!(m.net_change(), -1);
    }

    #[test]
    fn reflecting_keeps_everything() {
        let maps = column(EdgeBehavior::Open);
        let gbxs = create_gridboxes(&maps);
        let drops = (0..8u64).map(|i| drop_at(i, (i % 4) as u32, (i % 4) as f64 * 25.0 + 2.0)).collect();
        let supers = SupersInDomain::new(4, drops).unwrap();
        let mover = MoveSupersInDomain::new(rising(-5.0), ReflectingBoundary);
        let (out, m) = mover.run_step(ModelStep(1), &maps, &gbxs, supers);
        assert_eq!(out.totnsupers(), 8);
        assert_eq!(m.ncrossed, 2);
        assert_eq!(m.nreinserted, 2);
        assert!(out.check_positions(&maps).is_ok());
    }

    #[test]
    fn periodic_column_conserves_droplets_over_many_steps() {
        let maps = column(EdgeBehavior::Periodic);
        let gbxs = create_gridboxes(&maps);
        let drops = (0..20u64).map(|i| drop_at(i, (i % 4) as u32, (i % 4) as f64 * 25.0 + 12.0)).collect();
        let mut supers = SupersInDomain::new(4, drops).unwrap();
        let mover = MoveSupersInDomain::new(rising(17.0), NullBoundaryConditions);
        for t in 0..50 {
            let (next, m) = mover.run_step(ModelStep(t), &maps, &gbxs, supers);
            assert_eq!(m.ncrossed, 0);
            supers = next;
            assert!(supers.check_positions(&maps).is_ok());
        }
        assert_eq!(supers.totnsupers(), 20);
    }
}
