//! Run configuration, validation, and error types.
//!
//! [`SdmConfig`] holds timesteps in seconds and the boundary selection.
//! [`Timesteps::from_config`] converts the former into integer model
//! steps; [`SdmConfig::boundary_conditions`] builds the latter. Both are
//! done once, before stepping.

use std::error::Error;
use std::fmt;

use nimbus_core::DomainError;
use nimbus_domain::{
    AnyBoundaryConditions, NullBoundaryConditions, ReflectingBoundary, ReinitPlacement,
    TopReinitialisation,
};
use nimbus_maps::MapsError;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a configuration or composing a run.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Gridbox or superdroplet construction failed.
    Domain(DomainError),
    /// Maps construction failed.
    Maps(MapsError),
    /// A timestep is NaN, infinite, zero, or negative.
    InvalidTimestep {
        /// Which timestep.
        name: &'static str,
        /// The invalid value [s].
        value: f64,
    },
    /// A timestep is not a whole number of model steps.
    NotMultipleOfResolution {
        /// Which timestep.
        name: &'static str,
        /// The timestep [s].
        value: f64,
        /// Seconds per model step.
        resolution: f64,
    },
    /// A timestep does not fit in a model step counter.
    TimestepOverflow {
        /// Which timestep.
        name: &'static str,
        /// The timestep [s].
        value: f64,
    },
    /// A timestep is longer than the whole run.
    ExceedsRunLength {
        /// Which timestep.
        name: &'static str,
        /// The timestep [s].
        value: f64,
        /// Run length [s].
        t_end: f64,
    },
    /// Dry radius is NaN, infinite, or negative.
    InvalidDryRadius {
        /// The invalid value [m].
        value: f64,
    },
    /// Dynamics and transport disagree on the coupling step.
    CouplstepMismatch {
        /// Coupling step of the superdroplet model.
        sdm: u32,
        /// Coupling step of the dynamics.
        dynamics: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "domain: {e}"),
            Self::Maps(e) => write!(f, "maps: {e}"),
            Self::InvalidTimestep { name, value } => {
                write!(f, "{name} must be finite and positive, got {value}")
            }
            Self::NotMultipleOfResolution {
                name,
                value,
                resolution,
            } => write!(
                f,
                "{name} = {value} s is not a whole number of {resolution} s model steps"
            ),
            Self::TimestepOverflow { name, value } => {
                write!(f, "{name} = {value} s overflows the model step counter")
            }
            Self::ExceedsRunLength { name, value, t_end } => {
                write!(f, "{name} = {value} s is longer than t_end = {t_end} s")
            }
            Self::InvalidDryRadius { value } => {
                write!(f, "dry radius must be finite and non-negative, got {value}")
            }
            Self::CouplstepMismatch { sdm, dynamics } => write!(
                f,
                "coupling step mismatch: superdroplet model {sdm}, dynamics {dynamics}"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::Maps(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DomainError> for ConfigError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

impl From<MapsError> for ConfigError {
    fn from(e: MapsError) -> Self {
        Self::Maps(e)
    }
}

// ── BoundarySelection ─────────────────────────────────────────────

/// Which boundary conditions a run uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundarySelection {
    /// Droplets crossing an open edge are removed.
    #[default]
    Null,
    /// Droplets leaving through the top are put back in the top gridbox
    /// at the dry radius.
    TopReinitialisation,
    /// Droplets crossing an open edge are mirrored back inside.
    Reflecting,
}

// ── SdmConfig ─────────────────────────────────────────────────────

/// Configuration for one run. All times are in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct SdmConfig {
    /// Seconds per model step. Every other timestep must be a whole
    /// multiple of this. Default: 1.
    pub resolution: f64,
    /// Interval between dynamics couplings. Default: 2.
    pub couplstep: f64,
    /// Interval between transport steps. Default: 1.
    pub motionstep: f64,
    /// Interval between observations. Default: 10.
    pub obsstep: f64,
    /// Run length. Default: 600.
    pub t_end: f64,
    /// Boundary conditions. Default: [`BoundarySelection::Null`].
    pub boundary: BoundarySelection,
    /// Radius given to reinitialised droplets [m]. Default: 0.
    pub dry_radius: f64,
    /// Where reinitialised droplets are placed. Default: reflected.
    pub placement: ReinitPlacement,
}

impl Default for SdmConfig {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            couplstep: 2.0,
            motionstep: 1.0,
            obsstep: 10.0,
            t_end: 600.0,
            boundary: BoundarySelection::Null,
            dry_radius: 0.0,
            placement: ReinitPlacement::default(),
        }
    }
}

impl SdmConfig {
    /// Check every field.
    ///
    /// Timesteps must be finite, positive, whole multiples of
    /// `resolution`, and no longer than `t_end`. The dry radius must be
    /// finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Timesteps::from_config(self)?;
        if !(self.dry_radius.is_finite() && self.dry_radius >= 0.0) {
            return Err(ConfigError::InvalidDryRadius {
                value: self.dry_radius,
            });
        }
        Ok(())
    }

    /// Build the selected boundary conditions.
    pub fn boundary_conditions(&self) -> Result<AnyBoundaryConditions, ConfigError> {
        self.validate()?;
        Ok(match self.boundary {
            BoundarySelection::Null => NullBoundaryConditions.into(),
            BoundarySelection::TopReinitialisation => TopReinitialisation::new(self.dry_radius)
                .with_placement(self.placement)
                .into(),
            BoundarySelection::Reflecting => ReflectingBoundary.into(),
        })
    }
}

// ── Timesteps ─────────────────────────────────────────────────────

/// Timesteps of an [`SdmConfig`] in integer model steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timesteps {
    /// Dynamics coupling interval.
    pub couplstep: u32,
    /// Transport interval.
    pub motionstep: u32,
    /// Observation interval.
    pub obsstep: u32,
    /// Last model step of the run.
    pub t_end: u32,
}

fn to_steps(name: &'static str, value: f64, resolution: f64) -> Result<u32, ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::InvalidTimestep { name, value });
    }
    let steps = value / resolution;
    let whole = steps.round();
    if whole < 1.0 || (steps - whole).abs() > 1e-9 * whole {
        return Err(ConfigError::NotMultipleOfResolution {
            name,
            value,
            resolution,
        });
    }
    // u32::MAX is reserved for "never".
    if whole >= u32::MAX as f64 {
        return Err(ConfigError::TimestepOverflow { name, value });
    }
    Ok(whole as u32)
}

impl Timesteps {
    /// Convert and check the timesteps of `config`.
    pub fn from_config(config: &SdmConfig) -> Result<Self, ConfigError> {
        let resolution = config.resolution;
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(ConfigError::InvalidTimestep {
                name: "resolution",
                value: resolution,
            });
        }
        let t_end = to_steps("t_end", config.t_end, resolution)?;
        let check = |name, value| -> Result<u32, ConfigError> {
            let steps = to_steps(name, value, resolution)?;
            if steps > t_end {
                return Err(ConfigError::ExceedsRunLength {
                    name,
                    value,
                    t_end: config.t_end,
                });
            }
            Ok(steps)
        };
        Ok(Self {
            couplstep: check("couplstep", config.couplstep)?,
            motionstep: check("motionstep", config.motionstep)?,
            obsstep: check("obsstep", config.obsstep)?,
            t_end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = SdmConfig::default();
        assert!(cfg.validate().is_ok());
        let ts = Timesteps::from_config(&cfg).unwrap();
        assert_eq!(
            ts,
            Timesteps {
                couplstep: 2,
                motionstep: 1,
                obsstep: 10,
                t_end: 600
            }
        );
    }

    #[test]
    fn sub_second_resolution() {
        let cfg = SdmConfig {
            resolution: 0.1,
            couplstep: 0.5,
            motionstep: 0.3,
            obsstep: 2.0,
            t_end: 60.0,
            ..Default::default()
        };
        let ts = Timesteps::from_config(&cfg).unwrap();
        assert_eq!((ts.couplstep, ts.motionstep, ts.obsstep, ts.t_end), (5, 3, 20, 600));
    }

    #[test]
    fn rejects_non_positive_and_non_finite() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let cfg = SdmConfig {
                motionstep: bad,
                ..Default::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::InvalidTimestep {
                    name: "motionstep",
                    ..
                })
            ));
        }
        let cfg = SdmConfig {
            resolution: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidTimestep {
                name: "resolution",
                ..
            })
        ));
    }

    #[test]
    fn rejects_fractional_steps() {
        let cfg = SdmConfig {
            resolution: 2.0,
            couplstep: 3.0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NotMultipleOfResolution {
                name: "couplstep",
                ..
            })
        ));
    }

    #[test]
    fn rejects_steps_longer_than_run() {
        let cfg = SdmConfig {
            obsstep: 700.0,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ExceedsRunLength { name: "obsstep", .. }));
        assert!(err.to_string().contains("obsstep"));
    }

    #[test]
    fn rejects_overflowing_run_length() {
        let cfg = SdmConfig {
            resolution: 1e-6,
            t_end: 1e6,
            ..Default::default()
        };
        assert!(matches!(
            Timesteps::from_config(&cfg),
            Err(ConfigError::TimestepOverflow { name: "t_end", .. })
        ));
    }

    #[test]
    fn rejects_bad_dry_radius() {
        for bad in [-1e-9, f64::NAN, f64::INFINITY] {
            let cfg = SdmConfig {
                dry_radius: bad,
                ..Default::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::InvalidDryRadius { .. })
            ));
        }
    }

    #[test]
    fn builds_selected_boundary_conditions() {
        let mut cfg = SdmConfig::default();
        assert_eq!(
            cfg.boundary_conditions().unwrap(),
            AnyBoundaryConditions::Null(NullBoundaryConditions)
        );
        cfg.boundary = BoundarySelection::TopReinitialisation;
        cfg.dry_radius = 1e-8;
        cfg.placement = ReinitPlacement::Midpoint;
        assert_eq!(
            cfg.boundary_conditions().unwrap(),
            AnyBoundaryConditions::TopReinitialisation(
                TopReinitialisation::new(1e-8).with_placement(ReinitPlacement::Midpoint)
            )
        );
        cfg.boundary = BoundarySelection::Reflecting;
        assert_eq!(
            cfg.boundary_conditions().unwrap(),
            AnyBoundaryConditions::Reflecting(ReflectingBoundary)
        );
    }

    #[test]
    fn wrapped_errors_expose_source() {
        let err: ConfigError = DomainError::EmptyDomain.into();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("domain:"));
        let err = ConfigError::InvalidDryRadius { value: -1.0 };
        assert!(err.source().is_none());
    }
}
