//! Coupling to the dynamics solver.
//!
//! A [`CoupledDynamics`] advances the Eulerian fields between coupling
//! steps. A [`DynComms`] moves data between those fields and the
//! gridbox states: [`receive_dynamics`](DynComms::receive_dynamics)
//! before the superdroplet step, [`send_dynamics`](DynComms::send_dynamics)
//! after it.

use std::f64::consts::PI;

use nimbus_core::{Axis, DomainError, GbxIndex, ModelStep};
use nimbus_domain::{FacePair, Gridbox};
use nimbus_maps::GridboxMaps;
use tracing::{debug, info};

/// A dynamics solver stepped by the timestep loop.
pub trait CoupledDynamics: Send {
    /// Interval between couplings, in model steps.
    fn couplstep(&self) -> u32;

    /// Called once before the first step.
    fn prepare_to_timestep(&mut self) {}

    /// Advance from `t` to `t_next`. Only does work when `t` is a
    /// coupling step.
    fn run_step(&mut self, t: ModelStep, t_next: ModelStep);

    /// `true` if `t` is a coupling step.
    fn on_step(&self, t: ModelStep) -> bool {
        t.is_multiple_of(self.couplstep())
    }
}

/// Exchanges data between a [`CoupledDynamics`] and the gridboxes.
pub trait DynComms<D: CoupledDynamics>: Send {
    /// Check that `dynamics` matches the index space of `maps`.
    fn check<M: GridboxMaps>(&self, _maps: &M, _dynamics: &D) -> Result<(), DomainError> {
        Ok(())
    }

    /// Copy dynamics fields into gridbox states.
    fn receive_dynamics<M: GridboxMaps>(&self, maps: &M, dynamics: &D, gbxs: &mut [Gridbox]);

    /// Copy gridbox states back to the dynamics.
    fn send_dynamics<M: GridboxMaps>(&self, maps: &M, gbxs: &[Gridbox], dynamics: &mut D);
}

// ── Null ──────────────────────────────────────────────────────────

/// Dynamics that never change anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NullDynamics {
    couplstep: u32,
}

impl NullDynamics {
    /// Couple every `couplstep` model steps.
    pub fn new(couplstep: u32) -> Self {
        Self { couplstep }
    }
}

impl CoupledDynamics for NullDynamics {
    fn couplstep(&self) -> u32 {
        self.couplstep
    }

    fn run_step(&mut self, _t: ModelStep, _t_next: ModelStep) {}
}

/// Exchanges nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NullDynComms;

impl<D: CoupledDynamics> DynComms<D> for NullDynComms {
    fn receive_dynamics<M: GridboxMaps>(&self, _maps: &M, _dynamics: &D, _gbxs: &mut [Gridbox]) {}

    fn send_dynamics<M: GridboxMaps>(&self, _maps: &M, _gbxs: &[Gridbox], _dynamics: &mut D) {}
}

// ── Kinematic column ─────────────────────────────────────────────

/// Thermodynamic fields at one gridbox.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermoLevel {
    /// Pressure [Pa].
    pub press: f64,
    /// Temperature [K].
    pub temp: f64,
    /// Vapour mass mixing ratio [kg/kg].
    pub qvap: f64,
    /// Condensate mass mixing ratio [kg/kg].
    pub qcond: f64,
}

impl ThermoLevel {
    /// International standard atmosphere at height `z` [m], with vapour
    /// decaying over a 2 km scale height from 10 g/kg.
    pub fn standard_atmosphere(z: f64) -> Self {
        let temp = 288.15 - 0.0065 * z;
        Self {
            press: 101_325.0 * (temp / 288.15).powf(5.2559),
            temp,
            qvap: 0.01 * (-z.max(0.0) / 2000.0).exp(),
            qcond: 0.0,
        }
    }
}

/// Kinematic driver: a prescribed updraft over fixed thermodynamics.
///
/// The vertical wind is uniform in space and follows
/// `w(t) = wmax * sin(pi * t / tscale)` for `t < tscale`, zero after.
/// Thermodynamic fields are held per gridbox and only change when the
/// gridboxes send them back.
#[derive(Clone, Debug, PartialEq)]
pub struct KinematicColumnDynamics {
    couplstep: u32,
    step_seconds: f64,
    wmax: f64,
    tscale: f64,
    wvel: f64,
    levels: Vec<ThermoLevel>,
}

impl KinematicColumnDynamics {
    /// Default peak updraft [m/s].
    pub const WMAX: f64 = 3.0;
    /// Default forcing period [s].
    pub const TSCALE: f64 = 600.0;

    /// Drive `levels` (one per gridbox, in index order), coupling every
    /// `couplstep` steps of `step_seconds` each.
    pub fn new(couplstep: u32, step_seconds: f64, levels: Vec<ThermoLevel>) -> Self {
        Self {
            couplstep,
            step_seconds,
            wmax: Self::WMAX,
            tscale: Self::TSCALE,
            wvel: 0.0,
            levels,
        }
    }

    /// Standard-atmosphere levels at every gridbox's midpoint height.
    pub fn standard_atmosphere<M: GridboxMaps>(couplstep: u32, step_seconds: f64, maps: &M) -> Self {
        let levels = (0..maps.ngbxs() as u32)
            .map(|g| ThermoLevel::standard_atmosphere(maps.bounds(GbxIndex(g)).midpoint(Axis::Z)))
            .collect();
        Self::new(couplstep, step_seconds, levels)
    }

    /// Override the forcing amplitude [m/s] and period [s].
    pub fn with_forcing(mut self, wmax: f64, tscale: f64) -> Self {
        self.wmax = wmax;
        self.tscale = tscale;
        self
    }

    /// Prescribed updraft at `time` seconds.
    pub fn updraft(&self, time: f64) -> f64 {
        if time < self.tscale {
            self.wmax * (PI * time / self.tscale).sin()
        } else {
            0.0
        }
    }

    /// Updraft set by the last [`run_step`](CoupledDynamics::run_step).
    pub fn wvel(&self) -> f64 {
        self.wvel
    }

    /// Thermodynamic fields, one per gridbox.
    pub fn levels(&self) -> &[ThermoLevel] {
        &self.levels
    }
}

impl CoupledDynamics for KinematicColumnDynamics {
    fn couplstep(&self) -> u32 {
        self.couplstep
    }

    fn prepare_to_timestep(&mut self) {
        info!(
            nlevels = self.levels.len(),
            wmax = self.wmax,
            tscale = self.tscale,
            "kinematic dynamics ready"
        );
    }

    fn run_step(&mut self, t: ModelStep, _t_next: ModelStep) {
        if self.on_step(t) {
            self.wvel = self.updraft(t.0 as f64 * self.step_seconds);
            debug!(step = %t, wvel = self.wvel, "prescribed updraft");
        }
    }
}

/// Copies a [`KinematicColumnDynamics`] into gridbox states and back.
///
/// Receiving sets each gridbox's thermodynamics from its level and both
/// vertical wind faces to the current updraft; horizontal winds are
/// zero. Sending writes the thermodynamics back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KinematicComms;

impl DynComms<KinematicColumnDynamics> for KinematicComms {
    fn check<M: GridboxMaps>(
        &self,
        maps: &M,
        dynamics: &KinematicColumnDynamics,
    ) -> Result<(), DomainError> {
        if dynamics.levels.len() != maps.ngbxs() {
            return Err(DomainError::SizeMismatch {
                what: "dynamics levels",
                expected: maps.ngbxs(),
                actual: dynamics.levels.len(),
            });
        }
        Ok(())
    }

    fn receive_dynamics<M: GridboxMaps>(
        &self,
        _maps: &M,
        dynamics: &KinematicColumnDynamics,
        gbxs: &mut [Gridbox],
    ) {
        for (gbx, level) in gbxs.iter_mut().zip(&dynamics.levels) {
            let state = &mut gbx.state;
            state.press = level.press;
            state.temp = level.temp;
            state.qvap = level.qvap;
            state.qcond = level.qcond;
            state.wvel = FacePair::uniform(dynamics.wvel);
            state.uvel = FacePair::default();
            state.vvel = FacePair::default();
        }
    }

    fn send_dynamics<M: GridboxMaps>(
        &self,
        _maps: &M,
        gbxs: &[Gridbox],
        dynamics: &mut KinematicColumnDynamics,
    ) {
        for (level, gbx) in dynamics.levels.iter_mut().zip(gbxs) {
            level.press = gbx.state.press;
            level.temp = gbx.state.temp;
            level.qvap = gbx.state.qvap;
            level.qcond = gbx.state.qcond;
        }
    }
}
