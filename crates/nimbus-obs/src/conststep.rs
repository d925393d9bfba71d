//! Observers that act at a constant step interval, and their actions.

use crate::observer::Observer;
use nimbus_core::ModelStep;
use nimbus_domain::{Gridbox, SupersInDomain};
use std::f64::consts::PI;
use tracing::info;

/// What a [`ConstStepObserver`] does on each of its observation steps.
pub trait ObsAction: Send {
    /// Called once before the first step.
    fn before(&mut self, _gbxs: &[Gridbox], _supers: &SupersInDomain) {}

    /// Record or report step `t`.
    fn observe(&mut self, t: ModelStep, gbxs: &[Gridbox], supers: &SupersInDomain);

    /// Called once after the last step.
    fn after(&mut self) {}
}

/// Runs an [`ObsAction`] every `interval` model steps, starting at 0.
///
/// An interval of zero never observes.
#[derive(Clone, Debug)]
pub struct ConstStepObserver<A> {
    interval: u32,
    action: A,
}

impl<A: ObsAction> ConstStepObserver<A> {
    /// Observe with `action` every `interval` steps.
    pub fn new(interval: u32, action: A) -> Self {
        Self { interval, action }
    }

    /// The observation interval in model steps.
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// The action, e.g. to read back what it recorded.
    pub fn action(&self) -> &A {
        &self.action
    }

    /// Consume the observer, returning its action.
    pub fn into_action(self) -> A {
        self.action
    }
}

impl<A: ObsAction> Observer for ConstStepObserver<A> {
    fn before_timestepping(&mut self, gbxs: &[Gridbox], supers: &SupersInDomain) {
        self.action.before(gbxs, supers);
    }

    fn after_timestepping(&mut self) {
        self.action.after();
    }

    fn next_obs(&self, t: ModelStep) -> ModelStep {
        t.next_multiple_of(self.interval)
    }

    fn on_step(&self, t: ModelStep) -> bool {
        t.is_multiple_of(self.interval)
    }

    fn at_start_step(&mut self, t: ModelStep, gbxs: &[Gridbox], supers: &SupersInDomain) {
        if self.on_step(t) {
            self.action.observe(t, gbxs, supers);
        }
    }
}

// ── Actions ─────────────────────────────────────────────────────

/// Records the model time of each observation, in seconds.
#[derive(Clone, Debug, Default)]
pub struct TimeRecord {
    step_seconds: f64,
    times: Vec<f64>,
}

impl TimeRecord {
    /// Convert steps to seconds with `step_seconds` per model step.
    pub fn new(step_seconds: f64) -> Self {
        Self {
            step_seconds,
            times: Vec::new(),
        }
    }

    /// Recorded times [s].
    pub fn times(&self) -> &[f64] {
        &self.times
    }
}

impl ObsAction for TimeRecord {
    fn observe(&mut self, t: ModelStep, _gbxs: &[Gridbox], _supers: &SupersInDomain) {
        self.times.push(t.0 as f64 * self.step_seconds);
    }
}

/// Records the superdroplet count, domain-wide and per gridbox.
#[derive(Clone, Debug, Default)]
pub struct NsupersRecord {
    totals: Vec<usize>,
    per_gbx: Vec<Vec<usize>>,
}

impl NsupersRecord {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Domain totals, one per observation.
    pub fn totals(&self) -> &[usize] {
        &self.totals
    }

    /// Per-gridbox counts, one row per observation.
    pub fn per_gbx(&self) -> &[Vec<usize>] {
        &self.per_gbx
    }
}

impl ObsAction for NsupersRecord {
    fn observe(&mut self, _t: ModelStep, _gbxs: &[Gridbox], supers: &SupersInDomain) {
        self.totals.push(supers.totnsupers());
        self.per_gbx
            .push(supers.views().map(|(_, view)| view.len()).collect());
    }
}

/// Domain-total moments of the droplet size distribution.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MassMoments {
    /// Number of real droplets (0th moment).
    pub mom0: f64,
    /// Liquid water mass [kg] (3rd moment times water density).
    pub mass: f64,
}

/// Records [`MassMoments`] of the whole domain.
#[derive(Clone, Debug, Default)]
pub struct MassMomentsRecord {
    moments: Vec<MassMoments>,
}

impl MassMomentsRecord {
    /// Density of liquid water [kg/m^3].
    pub const RHO_WATER: f64 = 998.203;

    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded moments, one per observation.
    pub fn moments(&self) -> &[MassMoments] {
        &self.moments
    }

    /// Moments of the current population.
    pub fn compute(supers: &SupersInDomain) -> MassMoments {
        supers.all().iter().fold(MassMoments::default(), |acc, d| {
            let xi = d.xi as f64;
            MassMoments {
                mom0: acc.mom0 + xi,
                mass: acc.mass + xi * 4.0 / 3.0 * PI * d.radius.powi(3) * Self::RHO_WATER,
            }
        })
    }
}

impl ObsAction for MassMomentsRecord {
    fn observe(&mut self, _t: ModelStep, _gbxs: &[Gridbox], supers: &SupersInDomain) {
        self.moments.push(Self::compute(supers));
    }
}

/// Logs a one-line summary of the run state at `info` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSummary {
    step_seconds: f64,
}

impl LogSummary {
    /// Report times with `step_seconds` per model step.
    pub fn new(step_seconds: f64) -> Self {
        Self { step_seconds }
    }
}

impl ObsAction for LogSummary {
    fn before(&mut self, gbxs: &[Gridbox], supers: &SupersInDomain) {
        info!(
            ngbxs = gbxs.len(),
            nsupers = supers.totnsupers(),
            "starting timestepping"
        );
    }

    fn observe(&mut self, t: ModelStep, gbxs: &[Gridbox], supers: &SupersInDomain) {
        let n = supers.totnsupers();
        let mean_radius = if n == 0 {
            0.0
        } else {
            supers.all().iter().map(|d| d.radius).sum::<f64>() / n as f64
        };
        let max_w = gbxs
            .iter()
            .map(|g| g.state.wvel.centre().abs())
            .fold(0.0, f64::max);
        info!(
            t = t.0 as f64 * self.step_seconds,
            nsupers = n,
            mean_radius,
            max_w,
            "observation"
        );
    }

    fn after(&mut self) {
        info!("timestepping complete");
    }
}
