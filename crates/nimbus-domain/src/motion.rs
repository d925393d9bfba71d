//! Superdroplet motion: candidate positions from gridbox state.
//!
//! A [`Motion`] only proposes where a droplet would be after one motion
//! step. Deciding which gridbox that position belongs to, and what
//! happens at the domain edge, is left to
//! [`MoveSupersInDomain`](crate::MoveSupersInDomain).

use crate::gridbox::Gridbox;
use nimbus_core::{Axis, Bounds, ModelStep, Position, Superdrop};

/// Computes each droplet's candidate position for one motion step.
///
/// Implementations must be pure: `new_position` is called concurrently
/// for many droplets and the result may depend only on its arguments.
pub trait Motion: Send + Sync {
    /// First step after `t` on which motion runs.
    fn next_step(&self, t: ModelStep) -> ModelStep;

    /// `true` if motion runs on step `t`.
    fn on_step(&self, t: ModelStep) -> bool;

    /// Candidate position of `drop`, which is owned by `gbx` with the
    /// given bounds.
    fn new_position(&self, gbx: &Gridbox, bounds: &Bounds, drop: &Superdrop) -> Position;
}

/// Motion that never runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMotion;

impl Motion for NullMotion {
    fn next_step(&self, _t: ModelStep) -> ModelStep {
        ModelStep::MAX
    }

    fn on_step(&self, _t: ModelStep) -> bool {
        false
    }

    fn new_position(&self, _gbx: &Gridbox, _bounds: &Bounds, drop: &Superdrop) -> Position {
        drop.position
    }
}

/// Every droplet moves with the same fixed velocity.
#[derive(Clone, Copy, Debug)]
pub struct ConstantVelocityMotion {
    interval: u32,
    delt: f64,
    velocity: Position,
}

impl ConstantVelocityMotion {
    /// Motion every `interval` model steps, each covering `delt` seconds,
    /// with `velocity` in m/s along `(z, x, y)`.
    pub fn new(interval: u32, delt: f64, velocity: Position) -> Self {
        Self {
            interval,
            delt,
            velocity,
        }
    }
}

impl Motion for ConstantVelocityMotion {
    fn next_step(&self, t: ModelStep) -> ModelStep {
        t.next_multiple_of(self.interval)
    }

    fn on_step(&self, t: ModelStep) -> bool {
        t.is_multiple_of(self.interval)
    }

    fn new_position(&self, _gbx: &Gridbox, _bounds: &Bounds, drop: &Superdrop) -> Position {
        let p = drop.position;
        Position::new(
            p.z + self.velocity.z * self.delt,
            p.x + self.velocity.x * self.delt,
            p.y + self.velocity.y * self.delt,
        )
    }
}

/// Advection by the gridbox winds, with an optional constant fall speed.
///
/// Face winds are interpolated linearly to the droplet's position inside
/// its gridbox, then the position is advanced by one forward-Euler step.
/// Along an axis with unbounded extent the face-centre mean is used.
#[derive(Clone, Copy, Debug)]
pub struct WindMotion {
    interval: u32,
    delt: f64,
    fall_speed: f64,
}

impl WindMotion {
    /// Motion every `interval` model steps, each covering `delt` seconds.
    pub fn new(interval: u32, delt: f64) -> Self {
        Self {
            interval,
            delt,
            fall_speed: 0.0,
        }
    }

    /// Add a constant downward fall speed [m/s].
    pub fn with_fall_speed(mut self, fall_speed: f64) -> Self {
        self.fall_speed = fall_speed;
        self
    }

    fn fraction(bounds: &Bounds, axis: Axis, value: f64) -> f64 {
        let (lo, hi) = bounds.along(axis);
        let width = hi - lo;
        if width.is_finite() && width > 0.0 {
            ((value - lo) / width).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }
}

impl Motion for WindMotion {
    fn next_step(&self, t: ModelStep) -> ModelStep {
        t.next_multiple_of(self.interval)
    }

    fn on_step(&self, t: ModelStep) -> bool {
        t.is_multiple_of(self.interval)
    }

    fn new_position(&self, gbx: &Gridbox, bounds: &Bounds, drop: &Superdrop) -> Position {
        let s = &gbx.state;
        let p = drop.position;
        let w = s.wvel.interpolate(Self::fraction(bounds, Axis::Z, p.z)) - self.fall_speed;
        let u = s.uvel.interpolate(Self::fraction(bounds, Axis::X, p.x));
        let v = s.vvel.interpolate(Self::fraction(bounds, Axis::Y, p.y));
        Position::new(
            p.z + w * self.delt,
            p.x + u * self.delt,
            p.y + v * self.delt,
        )
    }
}
