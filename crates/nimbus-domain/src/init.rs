//! Seeding an initial superdroplet population.
//!
//! Positions are uniform within each gridbox and radii log-uniform
//! between two bounds, all drawn from a ChaCha8 stream so the same seed
//! always yields the same population.

use crate::supers::SupersInDomain;
use nimbus_core::{Axis, DomainError, GbxIndex, Position, SdId, Superdrop};
use nimbus_maps::GridboxMaps;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;
use tracing::{info, warn};

/// Parameters for [`seed_superdrops`].
#[derive(Clone, Debug, PartialEq)]
pub struct InitSupers {
    /// Superdroplets per gridbox.
    pub nsupers_per_gbx: usize,
    /// Smallest radius [m].
    pub rmin: f64,
    /// Largest radius [m].
    pub rmax: f64,
    /// Real droplet number concentration [m^-3], shared evenly among a
    /// gridbox's superdroplets.
    pub numconc: f64,
    /// Solute density [kg/m^3]; solute mass is that of a sphere of the
    /// initial radius.
    pub rho_sol: f64,
    /// Seed for the random stream.
    pub seed: u64,
}

impl Default for InitSupers {
    fn default() -> Self {
        Self {
            nsupers_per_gbx: 16,
            rmin: 1e-8,
            rmax: 1e-6,
            numconc: 1e8,
            rho_sol: 2016.0,
            seed: 0,
        }
    }
}

fn uniform_in(rng: &mut ChaCha8Rng, lo: f64, hi: f64) -> f64 {
    if !(lo.is_finite() && hi.is_finite()) {
        return 0.0;
    }
    let v = lo + rng.random::<f64>() * (hi - lo);
    if v < hi {
        v
    } else {
        lo
    }
}

/// Draw `nsupers_per_gbx` superdroplets in every gridbox of `maps`.
///
/// Identities are sequential from zero, gridbox by gridbox.
pub fn seed_superdrops<M: GridboxMaps>(maps: &M, init: &InitSupers) -> Vec<Superdrop> {
    let mut rng = ChaCha8Rng::seed_from_u64(init.seed);
    let (lnmin, lnmax) = (init.rmin.ln(), init.rmax.ln());
    let mut drops = Vec::with_capacity(maps.ngbxs() * init.nsupers_per_gbx);
    let mut next_id = 0u64;
    for g in 0..maps.ngbxs() as u32 {
        let idx = GbxIndex(g);
        let b = maps.bounds(idx);
        let xi = if init.nsupers_per_gbx == 0 {
            0
        } else {
            (init.numconc * maps.volume(idx) / init.nsupers_per_gbx as f64).round() as u64
        };
        for _ in 0..init.nsupers_per_gbx {
            let mut pos = Position::default();
            for axis in Axis::ALL {
                let (lo, hi) = b.along(axis);
                *pos.get_mut(axis) = uniform_in(&mut rng, lo, hi);
            }
            let radius = if lnmax > lnmin {
                (lnmin + rng.random::<f64>() * (lnmax - lnmin))
                    .exp()
                    .clamp(init.rmin, init.rmax)
            } else {
                init.rmin
            };
            let msol = 4.0 / 3.0 * PI * radius.powi(3) * init.rho_sol * 1000.0;
            drops.push(Superdrop::new(SdId(next_id), idx, pos, radius, msol, xi.max(1)));
            next_id += 1;
        }
    }
    drops
}

/// Seed a population and partition it over `maps`.
pub fn create_supers<M: GridboxMaps>(maps: &M, init: &InitSupers) -> Result<SupersInDomain, DomainError> {
    let drops = seed_superdrops(maps, init);
    if drops.is_empty() {
        warn!(ngbxs = maps.ngbxs(), "initial superdroplet population is empty");
    }
    let supers = SupersInDomain::new(maps.ngbxs(), drops)?;
    supers.check_positions(maps)?;
    info!(
        nsupers = supers.totnsupers(),
        ngbxs = maps.ngbxs(),
        seed = init.seed,
        "seeded superdroplets"
    );
    Ok(supers)
}
