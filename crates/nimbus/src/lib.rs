//! Nimbus: superdroplet transport for cloud microphysics.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Nimbus sub-crates. For most users, adding `nimbus` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use nimbus::prelude::*;
//!
//! // Four 25 m gridboxes with an open top and bottom.
//! let maps = ColumnMaps::uniform(0.0, 100.0, 4, EdgeBehavior::Open).unwrap();
//! let mut gbxs = create_gridboxes(&maps);
//! let supers = create_supers(&maps, &InitSupers::default()).unwrap();
//! let n = supers.totnsupers();
//!
//! // Droplets rise at 2 m/s; those leaving the top are recycled.
//! let movesupers = MoveSupersInDomain::new(
//!     ConstantVelocityMotion::new(1, 1.0, Position::new(2.0, 0.0, 0.0)),
//!     TopReinitialisation::new(0.0),
//! );
//! let sdm = SdmMethods::new(5, maps, movesupers, NullObserver);
//! let mut runner = TimestepRunner::new(sdm, NullDynamics::new(5), NullDynComms, 100).unwrap();
//! let report = runner.run(&mut gbxs, supers).unwrap();
//! assert_eq!(report.supers.totnsupers(), n);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `nimbus-core` | IDs, geometry, the superdroplet record, `DomainError` |
//! | [`maps`] | `nimbus-maps` | Gridbox maps: column and Cartesian |
//! | [`domain`] | `nimbus-domain` | Gridboxes, droplet storage, motion, boundary conditions, transport |
//! | [`obs`] | `nimbus-obs` | Observers and their composition |
//! | [`engine`] | `nimbus-engine` | Configuration, dynamics coupling, the timestep loop |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and IDs (`nimbus-core`).
pub use nimbus_core as types;

/// Gridbox maps (`nimbus-maps`).
///
/// The [`maps::GridboxMaps`] trait and its backends
/// [`maps::ColumnMaps`] and [`maps::CartesianMaps`].
pub use nimbus_maps as maps;

/// Gridboxes and superdroplet transport (`nimbus-domain`).
pub use nimbus_domain as domain;

/// Observers (`nimbus-obs`).
pub use nimbus_obs as obs;

/// Configuration and the timestep loop (`nimbus-engine`).
pub use nimbus_engine as engine;

/// Common imports for typical Nimbus usage.
///
/// ```rust
/// use nimbus::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use nimbus_core::{
        Axis, Bounds, Direction, DomainError, GbxIndex, ModelStep, Position, SdId, Superdrop,
    };

    // Maps
    pub use nimbus_maps::{CartesianMaps, ColumnMaps, EdgeBehavior, GridboxMaps, Neighbour};

    // Domain
    pub use nimbus_domain::{
        create_gridboxes, create_supers, AnyBoundaryConditions, BoundaryConditions,
        ConstantVelocityMotion, Gridbox, InitSupers, Motion, MoveSupersInDomain,
        NullBoundaryConditions, NullMotion, ReflectingBoundary, State, SupersInDomain,
        TopReinitialisation, TransportMetrics, WindMotion,
    };

    // Observation
    pub use nimbus_obs::{ConstStepObserver, NullObserver, ObsAction, Observer, ObserverPipeline};

    // Engine
    pub use nimbus_engine::{
        ConfigError, CoupledDynamics, DynComms, KinematicColumnDynamics, KinematicComms,
        NullDynComms, NullDynamics, SdmConfig, SdmMethods, StepMetrics, TimestepRunner,
        Timesteps,
    };
}
