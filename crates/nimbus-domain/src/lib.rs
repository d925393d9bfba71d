//! Gridboxes and superdroplet transport for Nimbus.
//!
//! Owns the droplet population and moves it through the domain once per
//! motion step.
//!
//! # Architecture
//!
//! ```text
//! MoveSupersInDomain<Motion, BoundaryConditions>
//! ├── Motion            candidate positions (parallel per gridbox)
//! ├── reindex           owning gridbox via GridboxMaps (parallel)
//! ├── SupersInDomain    repartition → escapees
//! ├── BoundaryConditions  resolve escapees
//! └── SupersInDomain    commit
//! ```
//!
//! Gridboxes hold state only. The droplets of gridbox `i` are
//! `supers.view_for(i)`, a slice of one sorted `Vec` owned by
//! [`SupersInDomain`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod gridbox;
pub mod init;
pub mod metrics;
pub mod motion;
pub mod movesupers;
pub mod state;
pub mod supers;

pub use boundary::{
    AnyBoundaryConditions, BoundaryConditions, NullBoundaryConditions, ReflectingBoundary,
    ReinitPlacement, TopReinitialisation,
};
pub use gridbox::{check_gridboxes, create_gridboxes, create_gridboxes_with, Gridbox};
pub use init::{create_supers, seed_superdrops, InitSupers};
pub use metrics::TransportMetrics;
pub use motion::{ConstantVelocityMotion, Motion, NullMotion, WindMotion};
pub use movesupers::MoveSupersInDomain;
pub use state::{FacePair, State};
pub use supers::SupersInDomain;
