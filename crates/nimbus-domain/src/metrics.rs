//! Per-step transport counters.

/// Counts and timing for one transport step.
///
/// A step on which motion does not run reports all zeros.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransportMetrics {
    /// In-domain droplets at the start of the step.
    pub nsupers: u64,
    /// Droplets whose owning gridbox changed.
    pub nmoved: u64,
    /// Droplets that crossed a periodic edge.
    pub nwrapped: u64,
    /// Droplets that crossed an open edge and were handed to the
    /// boundary conditions.
    pub ncrossed: u64,
    /// Edge-crossing droplets the boundary conditions put back in the
    /// domain.
    pub nreinserted: u64,
    /// Edge-crossing droplets removed at commit.
    pub nremoved: u64,
    /// Wall-clock time for the whole step, in microseconds.
    pub elapsed_us: u64,
}

impl TransportMetrics {
    /// Net change in the in-domain population over the step.
    pub fn net_change(&self) -> i64 {
        -(self.nremoved as i64)
    }

    /// Add a later step's counts to these. `nsupers` takes the later
    /// step's value.
    pub fn accumulate(&mut self, rhs: &TransportMetrics) {
        self.nsupers = rhs.nsupers;
        self.nmoved += rhs.nmoved;
        self.nwrapped += rhs.nwrapped;
        self.ncrossed += rhs.ncrossed;
        self.nreinserted += rhs.nreinserted;
        self.nremoved += rhs.nremoved;
        self.elapsed_us += rhs.elapsed_us;
    }
}
