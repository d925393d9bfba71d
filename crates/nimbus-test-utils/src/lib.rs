//! Test fixtures and mock types for Nimbus development.
//!
//! Provides standard maps and populations ([`fixtures`]), an observer
//! that records every hook call ([`RecordingObserver`]), and a motion
//! scripted per droplet ([`ScriptedMotion`]).

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{cartesian_box, column, drop_at, kid_column, periodic_column, seeded, COLUMN_DZ};

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use nimbus_core::{Bounds, ModelStep, Position, SdId, Superdrop};
use nimbus_domain::{Gridbox, Motion, SupersInDomain};
use nimbus_obs::Observer;

// ── RecordingObserver ─────────────────────────────────────────────

/// One hook call seen by a [`RecordingObserver`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObsEvent {
    Before { nsupers: usize },
    Observe { t: u32, nsupers: usize },
    After,
}

/// Observes every `interval` steps, appending each hook call to a
/// shared log.
///
/// Clone the log handle with [`log`](RecordingObserver::log) before
/// moving the observer into the code under test.
#[derive(Clone, Debug)]
pub struct RecordingObserver {
    interval: u32,
    log: Arc<Mutex<Vec<ObsEvent>>>,
}

impl RecordingObserver {
    pub fn new(interval: u32) -> Self {
        Self {
            interval,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the event log.
    pub fn log(&self) -> Arc<Mutex<Vec<ObsEvent>>> {
        Arc::clone(&self.log)
    }

    /// Copy of the events recorded so far.
    pub fn events(&self) -> Vec<ObsEvent> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn push(&self, event: ObsEvent) {
        if let Ok(mut log) = self.log.lock() {
            log.push(event);
        }
    }
}

impl Observer for RecordingObserver {
    fn before_timestepping(&mut self, _gbxs: &[Gridbox], supers: &SupersInDomain) {
        self.push(ObsEvent::Before {
            nsupers: supers.totnsupers(),
        });
    }

    fn after_timestepping(&mut self) {
        self.push(ObsEvent::After);
    }

    fn next_obs(&self, t: ModelStep) -> ModelStep {
        t.next_multiple_of(self.interval)
    }

    fn on_step(&self, t: ModelStep) -> bool {
        t.is_multiple_of(self.interval)
    }

    fn at_start_step(&mut self, t: ModelStep, _gbxs: &[Gridbox], supers: &SupersInDomain) {
        if self.on_step(t) {
            self.push(ObsEvent::Observe {
                t: t.0,
                nsupers: supers.totnsupers(),
            });
        }
    }
}

// ── ScriptedMotion ────────────────────────────────────────────────

/// Moves chosen droplets by a fixed displacement every step; all others
/// stay put.
#[derive(Clone, Debug, Default)]
pub struct ScriptedMotion {
    displacements: IndexMap<SdId, Position>,
}

impl ScriptedMotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move droplet `id` by `(dz, dx, dy)` on every step.
    pub fn with(mut self, id: u64, dz: f64, dx: f64, dy: f64) -> Self {
        self.displacements.insert(SdId(id), Position::new(dz, dx, dy));
        self
    }
}

impl Motion for ScriptedMotion {
    fn next_step(&self, t: ModelStep) -> ModelStep {
        t.next_multiple_of(1)
    }

    fn on_step(&self, _t: ModelStep) -> bool {
        true
    }

    fn new_position(&self, _gbx: &Gridbox, _bounds: &Bounds, drop: &Superdrop) -> Position {
        match self.displacements.get(&drop.sdid) {
            Some(d) => Position::new(
                drop.position.z + d.z,
                drop.position.x + d.x,
                drop.position.y + d.y,
            ),
            None => drop.position,
        }
    }
}
