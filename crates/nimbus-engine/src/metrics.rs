//! Per-step performance metrics for the timestep loop.
//!
//! [`StepMetrics`] captures timing for one pass of the loop, from `t` to
//! `t_next`, together with the transport counts of every motion step in
//! between.

use nimbus_core::ModelStep;
use nimbus_domain::TransportMetrics;

/// Timing and transport counts for one loop step.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Start of the step.
    pub t: ModelStep,
    /// Start of the next step.
    pub t_next: ModelStep,
    /// Wall-clock time for the whole step.
    pub total_us: u64,
    /// Time spent copying dynamics into gridboxes.
    pub receive_us: u64,
    /// Time spent in observers.
    pub observe_us: u64,
    /// Time spent in the dynamics solver.
    pub dynamics_us: u64,
    /// Time spent in superdroplet transport.
    pub sdm_us: u64,
    /// Time spent copying gridboxes back to dynamics.
    pub send_us: u64,
    /// Transport counts summed over the step's motion steps.
    pub transport: TransportMetrics,
}
