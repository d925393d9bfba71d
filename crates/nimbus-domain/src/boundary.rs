//! Boundary conditions: what happens to droplets that leave the domain.
//!
//! Transport marks a droplet [`GbxIndex::OUT_OF_DOMAIN`] when its motion
//! crosses an open domain face. After the reindex repartition those
//! droplets sit in the escapee region of [`SupersInDomain`]; a
//! [`BoundaryConditions`] implementation then decides, per escapee,
//! whether to reinstate it (by giving it a valid gridbox index and a
//! position inside that gridbox) or leave it out of domain to be removed
//! at commit. It must not touch in-domain droplets.

use crate::gridbox::Gridbox;
use crate::supers::SupersInDomain;
use nimbus_core::{Axis, Bounds, Direction, GbxIndex, Position};
use nimbus_maps::{EdgeBehavior, GridboxMaps, Neighbour};
use std::fmt;
use tracing::trace;

/// Resolves droplets that crossed an open domain edge this step.
pub trait BoundaryConditions: Send + Sync {
    /// Resolve the escapees of `supers` and return the updated
    /// population. Called once per transport step, between the reindex
    /// repartition and commit.
    fn apply<M: GridboxMaps>(
        &self,
        maps: &M,
        gbxs: &[Gridbox],
        supers: SupersInDomain,
    ) -> SupersInDomain;
}

// ── Null ────────────────────────────────────────────────────────

/// Identity boundary conditions.
///
/// Escapees stay out of domain and are removed at commit, which gives
/// absorbing open edges. Periodic edges never produce escapees since the
/// maps resolve them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NullBoundaryConditions;

impl BoundaryConditions for NullBoundaryConditions {
    fn apply<M: GridboxMaps>(
        &self,
        _maps: &M,
        _gbxs: &[Gridbox],
        supers: SupersInDomain,
    ) -> SupersInDomain {
        supers
    }
}

// ── Top reinitialisation ────────────────────────────────────────

/// Where a reinitialised droplet is placed inside the top gridbox.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReinitPlacement {
    /// Mirror the overshoot back below the top face. Falls back to the
    /// midpoint if the mirrored height leaves the top gridbox.
    #[default]
    Reflect,
    /// The vertical midpoint of the top gridbox.
    Midpoint,
}

impl ReinitPlacement {
    fn height(self, top: &Bounds, ztop: f64, z: f64) -> f64 {
        let mid = top.midpoint(Axis::Z);
        match self {
            ReinitPlacement::Midpoint => mid,
            ReinitPlacement::Reflect => {
                let mirrored = 2.0 * ztop - z;
                if top.contains_along(Axis::Z, mirrored) {
                    mirrored
                } else {
                    mid
                }
            }
        }
    }
}

/// Droplets leaving through the top of the domain are recycled into the
/// top gridbox of their column with their radius reset.
///
/// This is a modelling policy for the kinematic column case, not
/// physics: a droplet that rises out of the domain is treated as having
/// fully evaporated, leaving its aerosol at `dry_radius`, and the aerosol
/// re-enters at the top. It stands in for a proper aerosol-recycling
/// scheme. Only the radius and position are reset; solute mass,
/// multiplicity and identity carry over. Escapees through any other face
/// are left to be removed at commit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TopReinitialisation {
    /// Radius assigned to recycled droplets [m].
    pub dry_radius: f64,
    /// Placement within the top gridbox.
    pub placement: ReinitPlacement,
}

impl TopReinitialisation {
    /// Recycle to `dry_radius` with [`ReinitPlacement::Reflect`].
    pub fn new(dry_radius: f64) -> Self {
        Self {
            dry_radius,
            placement: ReinitPlacement::default(),
        }
    }

    /// Choose where recycled droplets are placed.
    pub fn with_placement(mut self, placement: ReinitPlacement) -> Self {
        self.placement = placement;
        self
    }
}

/// Bring the horizontal coordinates of `pos` back inside `domain`.
///
/// Reindexing stops at the first open face it crosses, so a droplet
/// leaving through the top can still be outside horizontally: periodic
/// axes are wrapped and open axes clamped just inside the face.
fn horizontally_inside<M: GridboxMaps>(maps: &M, domain: &Bounds, mut pos: Position) -> Position {
    for axis in [Axis::X, Axis::Y] {
        let (lo, hi) = domain.along(axis);
        let c = pos.get(axis);
        if domain.contains_along(axis, c) {
            continue;
        }
        let inside = match maps.edge_behavior(axis) {
            EdgeBehavior::Periodic => lo + (c - lo).rem_euclid(hi - lo),
            EdgeBehavior::Open => c,
        };
        *pos.get_mut(axis) = inside.clamp(lo, hi.next_down());
    }
    pos
}

/// The uppermost gridbox of the column containing `pos` horizontally.
fn top_of_column<M: GridboxMaps>(maps: &M, domain: &Bounds, pos: &Position) -> Option<GbxIndex> {
    let mut cur = maps.locate(&pos.with(Axis::Z, domain.lower.z))?;
    while let Neighbour::Gridbox(up) = maps.neighbour(cur, Direction::Up) {
        cur = up;
    }
    Some(cur)
}

impl BoundaryConditions for TopReinitialisation {
    fn apply<M: GridboxMaps>(
        &self,
        maps: &M,
        _gbxs: &[Gridbox],
        mut supers: SupersInDomain,
    ) -> SupersInDomain {
        let domain = maps.domain_bounds();
        let ztop = domain.face(Direction::Up);
        for drop in supers.escapees_mut() {
            if drop.position.z < ztop {
                continue;
            }
            let pos = horizontally_inside(maps, &domain, drop.position);
            let Some(top) = top_of_column(maps, &domain, &pos) else {
                continue;
            };
            let bounds = maps.bounds(top);
            // Policy: collapse to the dry aerosol radius and recycle.
            drop.radius = self.dry_radius;
            drop.position = pos.with(Axis::Z, self.placement.height(&bounds, ztop, pos.z));
            drop.gbxindex = top;
            trace!(sdid = %drop.sdid, gbx = %top, z = drop.position.z, "reinitialised at top");
        }
        supers
    }
}

// ── Reflecting ──────────────────────────────────────────────────

/// Escapees are mirrored back across the face they crossed.
///
/// A coordinate that is still outside after mirroring (an overshoot
/// larger than the domain) is clamped just inside the face.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReflectingBoundary;

impl ReflectingBoundary {
    fn reflect(domain: &Bounds, mut pos: Position) -> Position {
        for axis in Axis::ALL {
            let (lo, hi) = domain.along(axis);
            let c = pos.get(axis);
            let mirrored = if c < lo {
                2.0 * lo - c
            } else if c >= hi {
                2.0 * hi - c
            } else {
                c
            };
            *pos.get_mut(axis) = if mirrored >= lo && mirrored < hi {
                mirrored
            } else {
                mirrored.clamp(lo, hi.next_down())
            };
        }
        pos
    }
}

impl BoundaryConditions for ReflectingBoundary {
    fn apply<M: GridboxMaps>(
        &self,
        maps: &M,
        _gbxs: &[Gridbox],
        mut supers: SupersInDomain,
    ) -> SupersInDomain {
        let domain = maps.domain_bounds();
        for drop in supers.escapees_mut() {
            let pos = Self::reflect(&domain, drop.position);
            if let Some(idx) = maps.locate(&pos) {
                drop.position = pos;
                drop.gbxindex = idx;
                trace!(sdid = %drop.sdid, gbx = %idx, "reflected");
            }
        }
        supers
    }
}

// ── Runtime selection ───────────────────────────────────────────

/// Boundary conditions chosen at runtime, e.g. from configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnyBoundaryConditions {
    /// See [`NullBoundaryConditions`].
    Null(NullBoundaryConditions),
    /// See [`TopReinitialisation`].
    TopReinitialisation(TopReinitialisation),
    /// See [`ReflectingBoundary`].
    Reflecting(ReflectingBoundary),
}

impl Default for AnyBoundaryConditions {
    fn default() -> Self {
        Self::Null(NullBoundaryConditions)
    }
}

impl fmt::Display for AnyBoundaryConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null(_) => write!(f, "null"),
            Self::TopReinitialisation(t) => {
                write!(f, "top-reinitialisation(dry_radius={})", t.dry_radius)
            }
            Self::Reflecting(_) => write!(f, "reflecting"),
        }
    }
}

impl From<NullBoundaryConditions> for AnyBoundaryConditions {
    fn from(b: NullBoundaryConditions) -> Self {
        Self::Null(b)
    }
}

impl From<TopReinitialisation> for AnyBoundaryConditions {
    fn from(b: TopReinitialisation) -> Self {
        Self::TopReinitialisation(b)
    }
}

impl From<ReflectingBoundary> for AnyBoundaryConditions {
    fn from(b: ReflectingBoundary) -> Self {
        Self::Reflecting(b)
    }
}

impl BoundaryConditions for AnyBoundaryConditions {
    fn apply<M: GridboxMaps>(
        &self,
        maps: &M,
        gbxs: &[Gridbox],
        supers: SupersInDomain,
    ) -> SupersInDomain {
        match self {
            Self::Null(b) => b.apply(maps, gbxs, supers),
            Self::TopReinitialisation(b) => b.apply(maps, gbxs, supers),
            Self::Reflecting(b) => b.apply(maps, gbxs, supers),
        }
    }
}
