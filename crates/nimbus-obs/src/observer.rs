//! The [`Observer`] trait and its monoid structure.

use nimbus_core::ModelStep;
use nimbus_domain::{Gridbox, SupersInDomain};

/// Samples the run from the outside of transport.
///
/// The stepping loop calls [`before_timestepping`](Self::before_timestepping)
/// once, then [`at_start_step`](Self::at_start_step) at the start of every
/// step it stops on, then [`after_timestepping`](Self::after_timestepping)
/// once. Observers read gridboxes and droplets; they never mutate them.
///
/// # Composition
///
/// Observers form a monoid. [`then`](Self::then) combines two into one
/// whose [`next_obs`](Self::next_obs) is the earlier of the two and
/// whose hooks call both in order; [`NullObserver`] is the identity.
/// Each observer decides inside `at_start_step` whether `t` is one of
/// its own observation steps.
pub trait Observer: Send {
    /// Called once before the first step.
    fn before_timestepping(&mut self, _gbxs: &[Gridbox], _supers: &SupersInDomain) {}

    /// Called once after the last step.
    fn after_timestepping(&mut self) {}

    /// First step after `t` on which this observer wants to run.
    /// [`ModelStep::MAX`] means never.
    fn next_obs(&self, t: ModelStep) -> ModelStep;

    /// `true` if `t` is an observation step.
    fn on_step(&self, t: ModelStep) -> bool;

    /// Called at the start of every step the loop stops on.
    fn at_start_step(&mut self, t: ModelStep, gbxs: &[Gridbox], supers: &SupersInDomain);

    /// Combine with `other`, which runs second.
    fn then<B: Observer>(self, other: B) -> Combined<Self, B>
    where
        Self: Sized,
    {
        Combined::new(self, other)
    }
}

impl<O: Observer + ?Sized> Observer for Box<O> {
    fn before_timestepping(&mut self, gbxs: &[Gridbox], supers: &SupersInDomain) {
        (**self).before_timestepping(gbxs, supers)
    }

    fn after_timestepping(&mut self) {
        (**self).after_timestepping()
    }

    fn next_obs(&self, t: ModelStep) -> ModelStep {
        (**self).next_obs(t)
    }

    fn on_step(&self, t: ModelStep) -> bool {
        (**self).on_step(t)
    }

    fn at_start_step(&mut self, t: ModelStep, gbxs: &[Gridbox], supers: &SupersInDomain) {
        (**self).at_start_step(t, gbxs, supers)
    }
}

// ── Identity ────────────────────────────────────────────────────

/// The observer that never observes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn next_obs(&self, _t: ModelStep) -> ModelStep {
        ModelStep::MAX
    }

    fn on_step(&self, _t: ModelStep) -> bool {
        false
    }

    fn at_start_step(&mut self, _t: ModelStep, _gbxs: &[Gridbox], _supers: &SupersInDomain) {}
}

// ── Static composition ─────────────────────────────────────────

/// Two observers run as one; `A` first.
#[derive(Clone, Debug, Default)]
pub struct Combined<A, B> {
    first: A,
    second: B,
}

impl<A: Observer, B: Observer> Combined<A, B> {
    /// Combine `first` and `second`.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// The observer that runs first.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// The observer that runs second.
    pub fn second(&self) -> &B {
        &self.second
    }

    /// Split back into the two observers.
    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: Observer, B: Observer> Observer for Combined<A, B> {
    fn before_timestepping(&mut self, gbxs: &[Gridbox], supers: &SupersInDomain) {
        self.first.before_timestepping(gbxs, supers);
        self.second.before_timestepping(gbxs, supers);
    }

    fn after_timestepping(&mut self) {
        self.first.after_timestepping();
        self.second.after_timestepping();
    }

    fn next_obs(&self, t: ModelStep) -> ModelStep {
        self.first.next_obs(t).min(self.second.next_obs(t))
    }

    fn on_step(&self, t: ModelStep) -> bool {
        self.first.on_step(t) || self.second.on_step(t)
    }

    fn at_start_step(&mut self, t: ModelStep, gbxs: &[Gridbox], supers: &SupersInDomain) {
        self.first.at_start_step(t, gbxs, supers);
        self.second.at_start_step(t, gbxs, supers);
    }
}

// ── Dynamic composition ────────────────────────────────────────

/// An ordered list of observers chosen at runtime.
///
/// `next_obs` is the minimum over the list (a fold starting from
/// [`ModelStep::MAX`], so the empty pipeline behaves as
/// [`NullObserver`]); hooks run in insertion order.
#[derive(Default)]
pub struct ObserverPipeline {
    stages: Vec<Box<dyn Observer>>,
}

impl ObserverPipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observer.
    pub fn push<O: Observer + 'static>(&mut self, obs: O) {
        self.stages.push(Box::new(obs));
    }

    /// Append an observer, builder style.
    pub fn with<O: Observer + 'static>(mut self, obs: O) -> Self {
        self.push(obs);
        self
    }

    /// Number of observers.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// `true` if there are no observers.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl std::fmt::Debug for ObserverPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverPipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}

impl Observer for ObserverPipeline {
    fn before_timestepping(&mut self, gbxs: &[Gridbox], supers: &SupersInDomain) {
        for obs in &mut self.stages {
            obs.before_timestepping(gbxs, supers);
        }
    }

    fn after_timestepping(&mut self) {
        for obs in &mut self.stages {
            obs.after_timestepping();
        }
    }

    fn next_obs(&self, t: ModelStep) -> ModelStep {
        self.stages
            .iter()
            .fold(ModelStep::MAX, |acc, obs| acc.min(obs.next_obs(t)))
    }

    fn on_step(&self, t: ModelStep) -> bool {
        self.stages.iter().any(|obs| obs.on_step(t))
    }

    fn at_start_step(&mut self, t: ModelStep, gbxs: &[Gridbox], supers: &SupersInDomain) {
        for obs in &mut self.stages {
            obs.at_start_step(t, gbxs, supers);
        }
    }
}
