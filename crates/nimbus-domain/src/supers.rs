//! Ownership and per-gridbox partitioning of the superdroplet population.
//!
//! [`SupersInDomain`] stores every droplet in one contiguous `Vec`, sorted
//! by owning gridbox. An offsets table of `ngbxs + 1` entries turns that
//! order into per-gridbox views without copying any droplet. Droplets
//! flagged [`GbxIndex::OUT_OF_DOMAIN`] sort after every gridbox and form
//! the *escapee* region, which no view covers.
//!
//! ```text
//!   drops:   [ g0 g0 | g1 | g2 g2 g2 | ... | g(n-1) |  escapees  ]
//!   offsets:  0       2    3           ...           end
//!                                                    ^ offsets[ngbxs]
//! ```
//!
//! Transport works in three moves: rewrite droplets' owning index in
//! place (views go stale but stay in-bounds), [`repartition`] to rebuild
//! the order, then [`commit`] after boundary conditions have decided
//! what to do with the escapees.
//!
//! [`repartition`]: SupersInDomain::repartition
//! [`commit`]: SupersInDomain::commit

use indexmap::IndexSet;
use nimbus_core::{DomainError, GbxIndex, SdId, Superdrop};
use nimbus_maps::GridboxMaps;
use rayon::slice::ParallelSliceMut;

/// The full superdroplet population, partitioned by gridbox.
///
/// # Invariants
///
/// Between steps (after [`commit`](Self::commit)):
///
/// - Every droplet in `all()` has an owning index in `0..ngbxs`.
/// - `view_for(i)` holds exactly the droplets owned by `i`, and the
///   views concatenated in index order equal `all()`.
/// - There are no escapees.
///
/// During a transport step these hold only for the partition as last
/// rebuilt; owning indices rewritten since then take effect at the next
/// [`repartition`](Self::repartition).
#[derive(Clone, Debug, PartialEq)]
pub struct SupersInDomain {
    drops: Vec<Superdrop>,
    offsets: Vec<usize>,
    injected: Vec<Superdrop>,
}

impl SupersInDomain {
    /// Partition `drops` over a domain of `ngbxs` gridboxes.
    ///
    /// Every droplet must name an existing gridbox (the out-of-domain
    /// sentinel is rejected too), have a finite position, and carry a
    /// unique [`SdId`].
    pub fn new(ngbxs: usize, drops: Vec<Superdrop>) -> Result<Self, DomainError> {
        if ngbxs == 0 {
            return Err(DomainError::EmptyDomain);
        }
        let mut seen = IndexSet::with_capacity(drops.len());
        for d in &drops {
            if d.gbxindex.as_usize() >= ngbxs {
                return Err(DomainError::GridboxOutOfRange {
                    sdid: d.sdid,
                    gbxindex: d.gbxindex,
                    ngbxs,
                });
            }
            if !d.position.is_finite() {
                return Err(DomainError::NonFinitePosition { sdid: d.sdid });
            }
            if !seen.insert(d.sdid) {
                return Err(DomainError::DuplicateSdId { sdid: d.sdid });
            }
        }
        Ok(Self::build(ngbxs, drops))
    }

    /// An empty population over `ngbxs` gridboxes.
    pub fn empty(ngbxs: usize) -> Result<Self, DomainError> {
        Self::new(ngbxs, Vec::new())
    }

    /// Sort `drops` by owning gridbox and derive the offsets table.
    ///
    /// # Panics
    ///
    /// If a droplet names an index at or beyond `ngbxs` that is not the
    /// out-of-domain sentinel.
    fn build(ngbxs: usize, mut drops: Vec<Superdrop>) -> Self {
        let mut counts = vec![0usize; ngbxs];
        for d in &drops {
            if d.is_in_domain() {
                let i = d.gbxindex.as_usize();
                assert!(
                    i < ngbxs,
                    "superdroplet {} assigned to nonexistent gridbox {} (domain has {ngbxs})",
                    d.sdid,
                    d.gbxindex
                );
                counts[i] += 1;
            }
        }

        // Stable, so droplets keep their relative order within a gridbox.
        // The sentinel is u32::MAX and sorts after every real index.
        drops.par_sort_by_key(|d| d.gbxindex);

        let mut offsets = Vec::with_capacity(ngbxs + 1);
        let mut acc = 0;
        offsets.push(0);
        for c in counts {
            acc += c;
            offsets.push(acc);
        }
        Self {
            drops,
            offsets,
            injected: Vec::new(),
        }
    }

    /// Number of gridboxes the population is partitioned over.
    pub fn ngbxs(&self) -> usize {
        self.offsets.len() - 1
    }

    fn range(&self, idx: GbxIndex) -> std::ops::Range<usize> {
        let i = idx.as_usize();
        assert!(
            i < self.ngbxs(),
            "gridbox index {idx} out of range for domain of {} gridboxes",
            self.ngbxs()
        );
        self.offsets[i]..self.offsets[i + 1]
    }

    fn in_domain_end(&self) -> usize {
        self.offsets[self.ngbxs()]
    }

    // ── Views ──────────────────────────────────────────────────

    /// Droplets owned by gridbox `idx`.
    ///
    /// # Panics
    ///
    /// If `idx` is not below [`ngbxs`](Self::ngbxs).
    pub fn view_for(&self, idx: GbxIndex) -> &[Superdrop] {
        let r = self.range(idx);
        &self.drops[r]
    }

    /// Mutable droplets owned by gridbox `idx`.
    ///
    /// Rewriting a droplet's `gbxindex` here does not move it; the move
    /// happens at the next [`repartition`](Self::repartition).
    pub fn view_for_mut(&mut self, idx: GbxIndex) -> &mut [Superdrop] {
        let r = self.range(idx);
        &mut self.drops[r]
    }

    /// Number of droplets owned by gridbox `idx`.
    pub fn nsupers_in(&self, idx: GbxIndex) -> usize {
        self.range(idx).len()
    }

    /// All in-domain droplets, in gridbox order.
    pub fn all(&self) -> &[Superdrop] {
        &self.drops[..self.in_domain_end()]
    }

    /// All in-domain droplets, mutably.
    pub fn all_mut(&mut self) -> &mut [Superdrop] {
        let end = self.in_domain_end();
        &mut self.drops[..end]
    }

    /// Number of in-domain droplets.
    pub fn totnsupers(&self) -> usize {
        self.in_domain_end()
    }

    /// `(index, view)` for every gridbox, in index order.
    pub fn views(&self) -> impl Iterator<Item = (GbxIndex, &[Superdrop])> + '_ {
        self.offsets
            .windows(2)
            .enumerate()
            .map(|(i, w)| (GbxIndex(i as u32), &self.drops[w[0]..w[1]]))
    }

    /// Disjoint mutable views, one per gridbox in index order.
    ///
    /// Suitable for handing to a parallel iterator alongside the
    /// gridbox array.
    pub fn gridbox_views_mut(&mut self) -> Vec<&mut [Superdrop]> {
        let ngbxs = self.ngbxs();
        let end = self.in_domain_end();
        let mut views = Vec::with_capacity(ngbxs);
        let mut rest = &mut self.drops[..end];
        for w in self.offsets.windows(2) {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(w[1] - w[0]);
            views.push(head);
            rest = tail;
        }
        views
    }

    // ── Escapees and injection ─────────────────────────────────

    /// Droplets that left the domain through an open edge and have not
    /// yet been resolved by boundary conditions.
    pub fn escapees(&self) -> &[Superdrop] {
        &self.drops[self.in_domain_end()..]
    }

    /// Mutable escapees. A boundary condition reinstates a droplet by
    /// setting its `gbxindex` (and position) to a valid gridbox; the
    /// move takes effect at [`commit`](Self::commit).
    pub fn escapees_mut(&mut self) -> &mut [Superdrop] {
        let end = self.in_domain_end();
        &mut self.drops[end..]
    }

    /// Add new droplets, placed at the next repartition.
    pub fn inject<I: IntoIterator<Item = Superdrop>>(&mut self, drops: I) {
        self.injected.extend(drops);
    }

    /// Number of droplets awaiting placement by [`inject`](Self::inject).
    pub fn ninjected(&self) -> usize {
        self.injected.len()
    }

    /// Drop every escapee. Returns how many were removed.
    pub fn discard_escapees(&mut self) -> usize {
        let end = self.in_domain_end();
        let removed = self.drops.len() - end;
        self.drops.truncate(end);
        removed
    }

    // ── Repartitioning ─────────────────────────────────────────

    /// Rebuild the partition from each droplet's current `gbxindex`.
    ///
    /// Consumes the old partition and returns a complete new one;
    /// nothing is visible half-built. Droplets marked out of domain move
    /// to the escapee region. Injected droplets are placed.
    ///
    /// # Panics
    ///
    /// If a droplet names a gridbox index at or beyond `ngbxs` other
    /// than [`GbxIndex::OUT_OF_DOMAIN`]. Debug builds also panic if an
    /// injected droplet has a non-finite position or reuses an id.
    pub fn repartition(self) -> SupersInDomain {
        let ngbxs = self.ngbxs();
        #[cfg(debug_assertions)]
        if !self.injected.is_empty() {
            self.check_injected();
        }
        let mut drops = self.drops;
        drops.extend(self.injected);
        Self::build(ngbxs, drops)
    }

    #[cfg(debug_assertions)]
    fn check_injected(&self) {
        let mut seen: IndexSet<SdId> = self.drops.iter().map(|d| d.sdid).collect();
        for d in &self.injected {
            assert!(
                d.position.is_finite(),
                "injected superdroplet {} has non-finite position {:?}",
                d.sdid,
                d.position
            );
            assert!(seen.insert(d.sdid), "injected superdroplet {} reuses an existing id", d.sdid);
        }
    }

    /// Finish a transport step: repartition, then discard any droplet
    /// still out of domain.
    pub fn commit(self) -> SupersInDomain {
        let mut next = self.repartition();
        next.discard_escapees();
        next
    }

    // ── Checks ─────────────────────────────────────────────────

    /// Identities of all in-domain droplets, in gridbox order.
    pub fn ids(&self) -> IndexSet<SdId> {
        self.all().iter().map(|d| d.sdid).collect()
    }

    /// Check that each in-domain droplet lies within its gridbox's
    /// bounds and that its owning index matches the view it sits in.
    pub fn check_positions<M: GridboxMaps>(&self, maps: &M) -> Result<(), DomainError> {
        if maps.ngbxs() != self.ngbxs() {
            return Err(DomainError::SizeMismatch {
                what: "superdroplet partition",
                expected: maps.ngbxs(),
                actual: self.ngbxs(),
            });
        }
        for (idx, view) in self.views() {
            let bounds = maps.bounds(idx);
            for d in view {
                if d.gbxindex != idx || !bounds.contains(&d.position) {
                    return Err(DomainError::PositionOutsideGridbox {
                        sdid: d.sdid,
                        gbxindex: d.gbxindex,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_core::Position;
    use nimbus_maps::{ColumnMaps, EdgeBehavior};
    use proptest::prelude::*;

    fn drop_at(id: u64, gbx: u32, z: f64) -> Superdrop {
        Superdrop::new(
            SdId(id),
            GbxIndex(gbx),
            Position::new(z, 0.5, 0.5),
            1e-6,
            0.0,
            100,
        )
    }

    /// 4 gridboxes of 25 m; droplet `id` sits in gridbox `id % 4`.
    fn sample() -> SupersInDomain {
        let drops = (0..10u64)
            .map(|id| {
                let g = (id % 4) as u32;
                drop_at(id, g, g as f64 * 25.0 + 1.0)
            })
            .collect();
        SupersInDomain::new(4, drops).unwrap()
    }

    // ── Construction ────────────────────────────────────────────

    #[test]
    fn new_sorts_into_views() {
        let s = sample();
        assert_eq!(s.ngbxs(), 4);
        assert_eq!(s.totnsupers(), 10);
        assert_eq!(s.nsupers_in(GbxIndex(0)), 3);
        assert_eq!(s.nsupers_in(GbxIndex(3)), 2);
        let ids: Vec<u64> = s.view_for(GbxIndex(1)).iter().map(|d| d.sdid.0).collect();
        assert_eq!(ids, vec![1, 5, 9]);
        assert!(s.escapees().is_empty());
    }

    #[test]
    fn new_rejects_bad_population() {
        assert_eq!(
            SupersInDomain::new(4, vec![drop_at(0, 4, 0.0)]),
            Err(DomainError::GridboxOutOfRange {
                sdid: SdId(0),
                gbxindex: GbxIndex(4),
                ngbxs: 4
            })
        );
        assert!(matches!(
            SupersInDomain::new(4, vec![drop_at(0, u32::MAX, 0.0)]),
            Err(DomainError::GridboxOutOfRange { .. })
        ));
        assert_eq!(
            SupersInDomain::new(4, vec![drop_at(1, 0, 0.0), drop_at(1, 1, 30.0)]),
            Err(DomainError::DuplicateSdId { sdid: SdId(1) })
        );
        assert_eq!(
            SupersInDomain::new(4, vec![drop_at(2, 0, f64::NAN)]),
            Err(DomainError::NonFinitePosition { sdid: SdId(2) })
        );
        assert_eq!(SupersInDomain::empty(0), Err(DomainError::EmptyDomain));
    }

    // ── Repartition ─────────────────────────────────────────────

    #[test]
    fn repartition_moves_reassigned_droplets() {
        let mut s = sample();
        for d in s.view_for_mut(GbxIndex(0)) {
            d.gbxindex = GbxIndex(2);
        }
        // Views are by slot until the rebuild.
        assert_eq!(s.nsupers_in(GbxIndex(0)), 3);
        let s = s.repartition();
        assert_eq!(s.nsupers_in(GbxIndex(0)), 0);
        assert_eq!(s.nsupers_in(GbxIndex(2)), 6);
        assert_eq!(s.totnsupers(), 10);
    }

    #[test]
    fn out_of_domain_droplets_become_escapees() {
        let mut s = sample();
        s.view_for_mut(GbxIndex(3))[0].mark_out_of_domain();
        let s = s.repartition();
        assert_eq!(s.totnsupers(), 9);
        assert_eq!(s.escapees().len(), 1);
        assert_eq!(s.escapees()[0].sdid, SdId(3));
        assert!(s.all().iter().all(|d| d.is_in_domain()));
    }

    #[test]
    fn commit_reclaims_unresolved_escapees_only() {
        let mut s = sample();
        s.view_for_mut(GbxIndex(3))[0].mark_out_of_domain();
        s.view_for_mut(GbxIndex(2))[0].mark_out_of_domain();
        let mut s = s.repartition();
        // Reinstate one escapee.
        s.escapees_mut()[0].gbxindex = GbxIndex(0);
        let s = s.commit();
        assert_eq!(s.totnsupers(), 9);
        assert!(s.escapees().is_empty());
        assert_eq!(s.nsupers_in(GbxIndex(0)), 4);
    }

    #[test]
    fn injected_droplets_placed_at_repartition() {
        let mut s = sample();
        s.inject([drop_at(100, 1, 30.0)]);
        assert_eq!(s.ninjected(), 1);
        assert_eq!(s.totnsupers(), 10);
        let s = s.repartition();
        assert_eq!(s.ninjected(), 0);
        assert_eq!(s.nsupers_in(GbxIndex(1)), 4);
        assert!(s.ids().contains(&SdId(100)));
    }

    #[test]
    #[should_panic(expected = "nonexistent gridbox")]
    fn repartition_to_nonexistent_gridbox_panics() {
        let mut s = sample();
        s.view_for_mut(GbxIndex(0))[0].gbxindex = GbxIndex(7);
        let _ = s.repartition();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "reuses an existing id")]
    fn inject_duplicate_id_panics() {
        let mut s = sample();
        s.inject([drop_at(3, 0, 5.0)]);
        let _ = s.repartition();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "non-finite position")]
    fn inject_non_finite_panics() {
        let mut s = sample();
        s.inject([drop_at(50, 0, f64::INFINITY)]);
        let _ = s.repartition();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "reuses an existing id")]
    fn inject_same_id_twice_panics() {
        let mut s = sample();
        s.inject([drop_at(50, 0, 5.0), drop_at(50, 1, 30.0)]);
        let _ = s.repartition();
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn view_out_of_range_panics() {
        let s = sample();
        let _ = s.view_for(GbxIndex(4));
    }

    // ── Views ───────────────────────────────────────────────────

    #[test]
    fn gridbox_views_mut_are_disjoint_cover() {
        let mut s = sample();
        let lens: Vec<usize> = s.gridbox_views_mut().iter().map(|v| v.len()).collect();
        assert_eq!(lens, vec![3, 3, 2, 2]);
        for view in s.gridbox_views_mut() {
            for d in view.iter_mut() {
                d.xi += 1;
            }
        }
        assert!(s.all().iter().all(|d| d.xi == 101));
    }

    #[test]
    fn check_positions_against_maps() {
        let maps = ColumnMaps::uniform(0.0, 100.0, 4, EdgeBehavior::Open).unwrap();
        let mut s = sample();
        assert!(s.check_positions(&maps).is_ok());
        s.view_for_mut(GbxIndex(1))[0].position.z = 80.0;
        assert_eq!(
            s.check_positions(&maps),
            Err(DomainError::PositionOutsideGridbox {
                sdid: SdId(1),
                gbxindex: GbxIndex(1)
            })
        );
    }

    // ── Properties ──────────────────────────────────────────────

    proptest! {
        #[test]
        fn partition_is_disjoint_cover(
            ngbxs in 1usize..12,
            assign in proptest::collection::vec((0u32..16, any::<bool>()), 0..80),
        ) {
            let drops: Vec<Superdrop> = (0..assign.len() as u64)
                .map(|id| drop_at(id, 0, 0.0))
                .collect();
            let mut s = SupersInDomain::new(ngbxs, drops).unwrap();
            for (d, &(g, out)) in s.all_mut().iter_mut().zip(&assign) {
                if out {
                    d.mark_out_of_domain();
                } else {
                    d.gbxindex = GbxIndex(g % ngbxs as u32);
                }
            }
            let s = s.repartition();

            let mut concat = Vec::new();
            for (idx, view) in s.views() {
                prop_assert!(view.iter().all(|d| d.gbxindex == idx));
                concat.extend_from_slice(view);
            }
            prop_assert_eq!(&concat[..], s.all());

            let nout = assign.iter().filter(|a| a.1).count();
            prop_assert_eq!(s.escapees().len(), nout);
            prop_assert_eq!(s.totnsupers() + nout, assign.len());

            let mut ids: Vec<u64> = s.all().iter().chain(s.escapees()).map(|d| d.sdid.0).collect();
            ids.sort_unstable();
            prop_assert_eq!(ids, (0..assign.len() as u64).collect::<Vec<_>>());
        }
    }
}
