//! Benchmark profiles and utilities for the Nimbus superdroplet framework.
//!
//! - [`kid_setup`]: the 129-level kinematic column, ready to run
//! - [`box_profile`]: an `n x n x n` Cartesian box with periodic sides
//!   and a seeded population, for transport micro-benchmarks

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use nimbus_core::Position;
use nimbus_domain::{
    create_gridboxes, create_supers, AnyBoundaryConditions, ConstantVelocityMotion, Gridbox,
    InitSupers, MoveSupersInDomain, NullBoundaryConditions, SupersInDomain, WindMotion,
};
use nimbus_engine::{
    ConfigError, KinematicColumnDynamics, KinematicComms, SdmConfig, SdmMethods, Timesteps,
    TimestepRunner,
};
use nimbus_maps::{CartesianMaps, ColumnMaps, EdgeBehavior};
use nimbus_obs::Observer;

/// Runner type for the kinematic column.
pub type KidRunner<O> = TimestepRunner<
    ColumnMaps,
    WindMotion,
    AnyBoundaryConditions,
    O,
    KinematicColumnDynamics,
    KinematicComms,
>;

/// Everything needed to run the kinematic column.
pub struct KidSetup<O: Observer> {
    /// The composed runner.
    pub runner: KidRunner<O>,
    /// Gridboxes in their initial state.
    pub gbxs: Vec<Gridbox>,
    /// The seeded population.
    pub supers: SupersInDomain,
}

/// Compose the kinematic column from `config`, seeding droplets with
/// `init` and observing with `obs`.
///
/// 129 gridboxes of 25 m span -25 m to 3200 m. Droplets are advected
/// by a standard-atmosphere [`KinematicColumnDynamics`].
pub fn kid_setup<O: Observer>(
    config: &SdmConfig,
    init: &InitSupers,
    obs: O,
) -> Result<KidSetup<O>, ConfigError> {
    let ts = Timesteps::from_config(config)?;
    let bcs = config.boundary_conditions()?;
    let maps = ColumnMaps::uniform(-25.0, 3200.0, 129, EdgeBehavior::Open)?;
    let gbxs = create_gridboxes(&maps);
    let supers = create_supers(&maps, init)?;

    let motion = WindMotion::new(ts.motionstep, ts.motionstep as f64 * config.resolution);
    let dynamics = KinematicColumnDynamics::standard_atmosphere(ts.couplstep, config.resolution, &maps);
    let sdm = SdmMethods::new(ts.couplstep, maps, MoveSupersInDomain::new(motion, bcs), obs);
    let runner = TimestepRunner::new(sdm, dynamics, KinematicComms, ts.t_end)?;
    Ok(KidSetup {
        runner,
        gbxs,
        supers,
    })
}

/// Transport used by [`box_profile`].
pub type Drift = MoveSupersInDomain<ConstantVelocityMotion, NullBoundaryConditions>;

/// A Cartesian box and its population.
pub struct BoxProfile {
    /// The maps.
    pub maps: CartesianMaps,
    /// Gridboxes in the default state.
    pub gbxs: Vec<Gridbox>,
    /// The seeded population.
    pub supers: SupersInDomain,
    /// A diagonal drift of 3 m per step or less along each axis.
    pub movesupers: Drift,
}

/// A periodic box of `n^3` 10 m gridboxes with `per_gbx` droplets in
/// each.
///
/// Every face is periodic, so the population never changes however
/// many steps are run.
pub fn box_profile(n: usize, per_gbx: usize, seed: u64) -> Result<BoxProfile, ConfigError> {
    let extent = 10.0 * n as f64;
    let maps = CartesianMaps::uniform(
        [(0.0, extent, n), (0.0, extent, n), (0.0, extent, n)],
        [EdgeBehavior::Periodic; 3],
    )?;
    let gbxs = create_gridboxes(&maps);
    let init = InitSupers {
        nsupers_per_gbx: per_gbx,
        seed,
        ..Default::default()
    };
    let supers = create_supers(&maps, &init)?;
    let movesupers = MoveSupersInDomain::new(
        ConstantVelocityMotion::new(1, 1.0, Position::new(3.0, -2.0, 1.5)),
        NullBoundaryConditions,
    );
    Ok(BoxProfile {
        maps,
        gbxs,
        supers,
        movesupers,
    })
}
