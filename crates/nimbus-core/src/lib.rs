//! Core types for the Nimbus superdroplet framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Nimbus workspace:
//! strongly-typed indices, spatial geometry, the [`Superdrop`] record,
//! and domain construction errors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod geometry;
pub mod id;
pub mod superdrop;

pub use error::DomainError;
pub use geometry::{Axis, Bounds, Direction, Position};
pub use id::{GbxIndex, ModelStep, SdId};
pub use superdrop::Superdrop;
