//! Observers for Nimbus superdroplet runs.
//!
//! Observers sample gridboxes and droplets at the start of steps chosen
//! by the stepping loop. They compose as a monoid: statically with
//! [`Observer::then`] into a [`Combined`], or at runtime into an
//! [`ObserverPipeline`], with [`NullObserver`] as the identity.
//!
//! [`ConstStepObserver`] runs an [`ObsAction`] at a fixed interval; the
//! provided actions record times ([`TimeRecord`]), superdroplet counts
//! ([`NsupersRecord`]) and size-distribution moments
//! ([`MassMomentsRecord`]), or log a summary line ([`LogSummary`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod conststep;
pub mod observer;

pub use conststep::{
    ConstStepObserver, LogSummary, MassMoments, MassMomentsRecord, NsupersRecord, ObsAction,
    TimeRecord,
};
pub use observer::{Combined, NullObserver, Observer, ObserverPipeline};
