//! The superdroplet model as seen by the timestep loop.

use nimbus_core::{DomainError, ModelStep};
use nimbus_domain::{
    check_gridboxes, BoundaryConditions, Gridbox, Motion, MoveSupersInDomain, SupersInDomain,
    TransportMetrics,
};
use nimbus_maps::GridboxMaps;
use nimbus_obs::Observer;

/// Maps, transport and observer bundled with the coupling step.
///
/// Transport runs on its own motion steps, which may be finer than the
/// coupling step; [`run_step`](Self::run_step) walks every motion step
/// between two loop steps.
#[derive(Debug)]
pub struct SdmMethods<M, Mo, B, O>
where
    M: GridboxMaps,
    Mo: Motion,
    B: BoundaryConditions,
    O: Observer,
{
    couplstep: u32,
    maps: M,
    movesupers: MoveSupersInDomain<Mo, B>,
    obs: O,
}

impl<M, Mo, B, O> SdmMethods<M, Mo, B, O>
where
    M: GridboxMaps,
    Mo: Motion,
    B: BoundaryConditions,
    O: Observer,
{
    /// Bundle the parts. `couplstep` is in model steps.
    pub fn new(couplstep: u32, maps: M, movesupers: MoveSupersInDomain<Mo, B>, obs: O) -> Self {
        Self {
            couplstep,
            maps,
            movesupers,
            obs,
        }
    }

    /// Interval between dynamics couplings, in model steps.
    pub fn couplstep(&self) -> u32 {
        self.couplstep
    }

    /// The gridbox maps.
    pub fn maps(&self) -> &M {
        &self.maps
    }

    /// The transport orchestrator.
    pub fn movesupers(&self) -> &MoveSupersInDomain<Mo, B> {
        &self.movesupers
    }

    /// The observer.
    pub fn observer(&self) -> &O {
        &self.obs
    }

    /// Consume, returning the observer and whatever it recorded.
    pub fn into_observer(self) -> O {
        self.obs
    }

    /// First coupling step after `t`.
    pub fn next_couplstep(&self, t: ModelStep) -> ModelStep {
        t.next_multiple_of(self.couplstep)
    }

    /// Check that `gbxs` and `supers` are built over this model's maps.
    pub fn check(&self, gbxs: &[Gridbox], supers: &SupersInDomain) -> Result<(), DomainError> {
        check_gridboxes(&self.maps, gbxs)?;
        if supers.ngbxs() != self.maps.ngbxs() {
            return Err(DomainError::SizeMismatch {
                what: "superdroplet partition",
                expected: self.maps.ngbxs(),
                actual: supers.ngbxs(),
            });
        }
        supers.check_positions(&self.maps)
    }

    /// Called once before the first step.
    pub fn prepare_to_timestep(&mut self, gbxs: &[Gridbox], supers: &SupersInDomain) {
        self.obs.before_timestepping(gbxs, supers);
    }

    /// Observe at the start of step `t`.
    pub fn at_start_step(&mut self, t: ModelStep, gbxs: &[Gridbox], supers: &SupersInDomain) {
        self.obs.at_start_step(t, gbxs, supers);
    }

    /// Run every motion step in `[t, t_next)`.
    ///
    /// The returned metrics sum the counts of those motion steps;
    /// `nsupers` is the population before the last of them, or the
    /// current population if none ran.
    pub fn run_step(
        &self,
        t: ModelStep,
        t_next: ModelStep,
        gbxs: &[Gridbox],
        supers: SupersInDomain,
    ) -> (SupersInDomain, TransportMetrics) {
        let mut supers = supers;
        let mut total = TransportMetrics {
            nsupers: supers.totnsupers() as u64,
            ..Default::default()
        };
        let mut subt = t;
        while subt < t_next {
            let next = self.movesupers.next_step(subt).min(t_next);
            if self.movesupers.on_step(subt) {
                let (moved, m) = self.movesupers.run_step(subt, &self.maps, gbxs, supers);
                supers = moved;
                total.accumulate(&m);
            }
            subt = next;
        }
        (supers, total)
    }

    /// Called once after the last step.
    pub fn after_timestepping(&mut self) {
        self.obs.after_timestepping();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_core::Position;
    use nimbus_domain::{create_gridboxes, ConstantVelocityMotion, NullBoundaryConditions, NullMotion};
    use nimbus_maps::{ColumnMaps, EdgeBehavior};
    use nimbus_obs::NullObserver;
    use nimbus_test_utils::{column, drop_at};

    fn rising(interval: u32) -> MoveSupersInDomain<ConstantVelocityMotion, NullBoundaryConditions> {
        MoveSupersInDomain::new(
            ConstantVelocityMotion::new(interval, 1.0, Position::new(1.0, 0.0, 0.0)),
            NullBoundaryConditions,
        )
    }

    #[test]
    fn run_step_walks_every_motion_step() {
        let maps = ColumnMaps::uniform(0.0, 100.0, 4, EdgeBehavior::Periodic).unwrap();
        let gbxs = create_gridboxes(&maps);
        let supers = SupersInDomain::new(4, vec![drop_at(0, 0, 5.0)]).unwrap();
        let sdm = SdmMethods::new(6, maps, rising(2), NullObserver);

        let (supers, m) = sdm.run_step(ModelStep(0), ModelStep(6), &gbxs, supers);
        // Motion steps 0, 2, 4.
        assert!((supers.all()[0].position.z - 8.0).abs() < 1e-12);
        assert_eq!(m.nsupers, 1);

        let (supers, _) = sdm.run_step(ModelStep(6), ModelStep(7), &gbxs, supers);
        let (supers, _) = sdm.run_step(ModelStep(7), ModelStep(9), &gbxs, supers);
        // Motion steps 6 and 8.
        assert!((supers.all()[0].position.z - 10.0).abs() < 1e-12);
    }

    #[test]
    fn run_step_without_motion_reports_population() {
        let maps = column(4);
        let gbxs = create_gridboxes(&maps);
        let supers = SupersInDomain::new(4, vec![drop_at(0, 1, 30.0), drop_at(1, 2, 60.0)]).unwrap();
        let sdm = SdmMethods::new(
            3,
            maps,
            MoveSupersInDomain::new(NullMotion, NullBoundaryConditions),
            NullObserver,
        );
        let (after, m) = sdm.run_step(ModelStep(0), ModelStep(3), &gbxs, supers.clone());
        assert_eq!(after, supers);
        assert_eq!(m.nsupers, 2);
        assert_eq!(m.nmoved, 0);
    }

    #[test]
    fn next_couplstep() {
        let sdm = SdmMethods::new(5, column(2), rising(1), NullObserver);
        assert_eq!(sdm.couplstep(), 5);
        assert_eq!(sdm.next_couplstep(ModelStep(0)), ModelStep(5));
        assert_eq!(sdm.next_couplstep(ModelStep(7)), ModelStep(10));
    }

    #[test]
    fn check_rejects_mismatched_parts() {
        let sdm = SdmMethods::new(1, column(4), rising(1), NullObserver);
        let gbxs = create_gridboxes(sdm.maps());
        let supers = SupersInDomain::empty(4).unwrap();
        assert!(sdm.check(&gbxs, &supers).is_ok());

        assert!(matches!(
            sdm.check(&gbxs[..3], &supers),
            Err(DomainError::SizeMismatch { .. })
        ));
        let wrong = SupersInDomain::empty(3).unwrap();
        assert!(matches!(
            sdm.check(&gbxs, &wrong),
            Err(DomainError::SizeMismatch {
                what: "superdroplet partition",
                ..
            })
        ));
        let misplaced = SupersInDomain::new(4, vec![drop_at(0, 0, 80.0)]).unwrap();
        assert!(matches!(
            sdm.check(&gbxs, &misplaced),
            Err(DomainError::PositionOutsideGridbox { .. })
        ));
    }
}
