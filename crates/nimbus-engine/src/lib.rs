//! Timestepping engine for Nimbus.
//!
//! Couples superdroplet transport to a dynamics solver and an observer.
//!
//! # Architecture
//!
//! ```text
//! TimestepRunner
//! ├── CoupledDynamics      advanced every coupling step
//! ├── DynComms             gridbox states <-> dynamics fields
//! └── SdmMethods
//!     ├── GridboxMaps
//!     ├── MoveSupersInDomain   every motion step
//!     └── Observer             every observation step
//! ```
//!
//! [`SdmConfig`] converts timesteps in seconds into model steps and
//! selects the boundary conditions; everything it rejects is caught
//! before the loop starts.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dynamics;
pub mod metrics;
pub mod runner;
pub mod sdm;

pub use config::{BoundarySelection, ConfigError, SdmConfig, Timesteps};
pub use dynamics::{
    CoupledDynamics, DynComms, KinematicColumnDynamics, KinematicComms, NullDynComms,
    NullDynamics, ThermoLevel,
};
pub use metrics::StepMetrics;
pub use runner::{RunReport, TimestepRunner};
pub use sdm::SdmMethods;
