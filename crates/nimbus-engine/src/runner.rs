//! The timestep loop.
//!
//! [`TimestepRunner::run`] steps from model step 0 through `t_end`
//! inclusive. Each pass of the loop runs from `t` to
//! `t_next = min(next coupling step, next observation)`:
//!
//! 1. on coupling steps, receive dynamics into gridbox states;
//! 2. observe;
//! 3. advance the dynamics;
//! 4. run every superdroplet motion step in `[t, t_next)`;
//! 5. on coupling steps, send gridbox states back to the dynamics.

use std::time::Instant;

use nimbus_core::ModelStep;
use nimbus_domain::{BoundaryConditions, Gridbox, Motion, SupersInDomain, TransportMetrics};
use nimbus_maps::GridboxMaps;
use nimbus_obs::Observer;
use tracing::{debug, info};

use crate::config::ConfigError;
use crate::dynamics::{CoupledDynamics, DynComms};
use crate::metrics::StepMetrics;
use crate::sdm::SdmMethods;

// ── RunReport ─────────────────────────────────────────────────────

/// Outcome of a complete [`TimestepRunner::run`].
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Population after the last step.
    pub supers: SupersInDomain,
    /// Number of loop steps taken.
    pub nsteps: u64,
    /// Transport counts summed over the run.
    pub transport: TransportMetrics,
    /// Wall-clock time for the run, in microseconds.
    pub total_us: u64,
}

// ── TimestepRunner ────────────────────────────────────────────────

/// Drives an [`SdmMethods`] and a [`CoupledDynamics`] in lockstep.
///
/// Created with [`new()`](Self::new), which checks that the two agree
/// on the coupling step and that the comms fit the maps. Either call
/// [`run()`](Self::run) for the whole loop or [`step()`](Self::step)
/// one pass at a time.
pub struct TimestepRunner<M, Mo, B, O, D, C>
where
    M: GridboxMaps,
    Mo: Motion,
    B: BoundaryConditions,
    O: Observer,
    D: CoupledDynamics,
    C: DynComms<D>,
{
    sdm: SdmMethods<M, Mo, B, O>,
    dynamics: D,
    comms: C,
    t_end: ModelStep,
    last_metrics: StepMetrics,
}

impl<M, Mo, B, O, D, C> TimestepRunner<M, Mo, B, O, D, C>
where
    M: GridboxMaps,
    Mo: Motion,
    B: BoundaryConditions,
    O: Observer,
    D: CoupledDynamics,
    C: DynComms<D>,
{
    /// Compose a runner that stops after model step `t_end`.
    pub fn new(
        sdm: SdmMethods<M, Mo, B, O>,
        dynamics: D,
        comms: C,
        t_end: u32,
    ) -> Result<Self, ConfigError> {
        if sdm.couplstep() == 0 {
            return Err(ConfigError::InvalidTimestep {
                name: "couplstep",
                value: 0.0,
            });
        }
        if ModelStep(t_end) == ModelStep::MAX {
            return Err(ConfigError::TimestepOverflow {
                name: "t_end",
                value: t_end as f64,
            });
        }
        if dynamics.couplstep() != sdm.couplstep() {
            return Err(ConfigError::CouplstepMismatch {
                sdm: sdm.couplstep(),
                dynamics: dynamics.couplstep(),
            });
        }
        comms.check(sdm.maps(), &dynamics)?;
        Ok(Self {
            sdm,
            dynamics,
            comms,
            t_end: ModelStep(t_end),
            last_metrics: StepMetrics::default(),
        })
    }

    /// The superdroplet model.
    pub fn sdm(&self) -> &SdmMethods<M, Mo, B, O> {
        &self.sdm
    }

    /// The dynamics.
    pub fn dynamics(&self) -> &D {
        &self.dynamics
    }

    /// Last model step of the run.
    pub fn t_end(&self) -> ModelStep {
        self.t_end
    }

    /// Metrics from the most recent [`step()`](Self::step).
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Split back into the superdroplet model and the dynamics.
    pub fn into_parts(self) -> (SdmMethods<M, Mo, B, O>, D) {
        (self.sdm, self.dynamics)
    }

    /// Run the whole loop from step 0.
    ///
    /// `gbxs` and `supers` are checked against the maps first; nothing
    /// in the loop itself can fail.
    pub fn run(
        &mut self,
        gbxs: &mut [Gridbox],
        supers: SupersInDomain,
    ) -> Result<RunReport, ConfigError> {
        self.sdm.check(gbxs, &supers)?;
        let start = Instant::now();

        self.dynamics.prepare_to_timestep();
        self.sdm.prepare_to_timestep(gbxs, &supers);
        info!(
            t_end = %self.t_end,
            couplstep = self.sdm.couplstep(),
            ngbxs = gbxs.len(),
            nsupers = supers.totnsupers(),
            "timestepping started"
        );

        let mut supers = supers;
        let mut transport = TransportMetrics::default();
        let mut nsteps = 0;
        let mut t = ModelStep::ZERO;
        while t <= self.t_end {
            let (next, metrics) = self.step(t, gbxs, supers);
            supers = next;
            transport.accumulate(&metrics.transport);
            nsteps += 1;
            t = metrics.t_next;
        }

        self.sdm.after_timestepping();
        let total_us = start.elapsed().as_micros() as u64;
        info!(
            nsteps,
            nsupers = supers.totnsupers(),
            moved = transport.nmoved,
            reinserted = transport.nreinserted,
            removed = transport.nremoved,
            total_us,
            "timestepping finished"
        );
        Ok(RunReport {
            supers,
            nsteps,
            transport,
            total_us,
        })
    }

    /// One pass of the loop starting at `t`.
    ///
    /// Assumes the parts have passed [`SdmMethods::check`]. The returned
    /// metrics carry `t_next`, where the next pass starts.
    pub fn step(
        &mut self,
        t: ModelStep,
        gbxs: &mut [Gridbox],
        supers: SupersInDomain,
    ) -> (SupersInDomain, &StepMetrics) {
        let start = Instant::now();
        let t_next = self
            .sdm
            .next_couplstep(t)
            .min(self.sdm.observer().next_obs(t));
        let coupling = t.is_multiple_of(self.sdm.couplstep());
        let mut metrics = StepMetrics {
            t,
            t_next,
            ..Default::default()
        };

        if coupling {
            let phase = Instant::now();
            self.comms
                .receive_dynamics(self.sdm.maps(), &self.dynamics, gbxs);
            metrics.receive_us = phase.elapsed().as_micros() as u64;
        }

        let phase = Instant::now();
        self.sdm.at_start_step(t, gbxs, &supers);
        metrics.observe_us = phase.elapsed().as_micros() as u64;

        let phase = Instant::now();
        self.dynamics.run_step(t, t_next);
        metrics.dynamics_us = phase.elapsed().as_micros() as u64;

        let phase = Instant::now();
        let (supers, transport) = self.sdm.run_step(t, t_next, gbxs, supers);
        metrics.sdm_us = phase.elapsed().as_micros() as u64;
        metrics.transport = transport;

        if coupling {
            let phase = Instant::now();
            self.comms
                .send_dynamics(self.sdm.maps(), gbxs, &mut self.dynamics);
            metrics.send_us = phase.elapsed().as_micros() as u64;
        }

        metrics.total_us = start.elapsed().as_micros() as u64;
        debug!(
            step = %t,
            next = %t_next,
            coupling,
            nsupers = supers.totnsupers(),
            total_us = metrics.total_us,
            "loop step"
        );
        self.last_metrics = metrics;
        (supers, &self.last_metrics)
    }
}
