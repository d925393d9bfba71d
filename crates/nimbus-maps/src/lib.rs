//! Gridbox geometry and adjacency for Nimbus domains.
//!
//! This crate defines the [`GridboxMaps`] trait, the static description
//! of grid geometry through which superdroplet transport resolves which
//! gridbox a droplet belongs to, along with concrete coordinate
//! topologies.
//!
//! # Backends
//!
//! - [`ColumnMaps`]: single vertical column (1-D), horizontally periodic
//!   onto itself
//! - [`CartesianMaps`]: full 3-D Cartesian grid with per-axis
//!   [`EdgeBehavior`] (open or periodic)
//!
//! # Edges
//!
//! Neighbour lookups are total. Across an open edge they return
//! [`Neighbour::Edge`]; across a periodic edge they return
//! [`Neighbour::Wrapped`] carrying the coordinate shift the caller must
//! apply.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cartesian;
pub mod column;
pub mod edge;
pub mod error;
pub(crate) mod halfcoords;
pub mod maps;

#[cfg(test)]
pub(crate) mod compliance;

pub use cartesian::CartesianMaps;
pub use column::ColumnMaps;
pub use edge::{EdgeBehavior, Neighbour};
pub use error::MapsError;
pub use maps::GridboxMaps;
