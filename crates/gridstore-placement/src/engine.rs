//! The rule-fitting search engine.
//!
//! [`fit_region`] partitions a region's peers among an ordered rule list
//! by recursive backtracking: for each rule it enumerates every subset of
//! the still-unclaimed eligible peers of the right size (bitmask order),
//! keeps the best per-rule fit under [`compare_rule_fit`], and recurses
//! into the next rule. Subset enumeration is exponential in the per-rule
//! candidate count; callers are expected to keep replica counts small
//! (single digits), which real replication factors do.

use std::cmp::Ordering;

use tracing::debug;

use gridstore_core::{Peer, PeerId, RegionInfo, StoreId, StoreInfo};

use crate::fit::{RegionFit, RuleFit, compare_rule_fit};
use crate::rule::{Rule, match_label_constraints, rule_has_eligible_store};

/// A region peer annotated with its resolved store and leader flag for
/// the duration of one search. `selected` tracks which rule-claimed peers
/// are off-limits to later rules while backtracking.
#[derive(Debug, Clone)]
pub(crate) struct FitPeer {
    pub(crate) peer: Peer,
    pub(crate) store: Option<StoreInfo>,
    pub(crate) is_leader: bool,
    pub(crate) selected: bool,
}

/// Resolve stores and order peers for the search: healthy peers first
/// (down = 0, pending = 1, healthy = 2), peer id ascending as tie-break.
/// The ordering makes the subset enumeration, and therefore the winning
/// assignment among equally-scored alternatives, deterministic.
///
/// `replacement` substitutes a hypothetical hosting store for whichever
/// peer currently lives on the source store; the incremental replacement
/// checker uses it to rescore a single what-if move.
pub(crate) fn prepare_fit_peers(
    stores: &[StoreInfo],
    region: &RegionInfo,
    peers: &[Peer],
    replacement: Option<(StoreId, &StoreInfo)>,
) -> Vec<FitPeer> {
    let mut out: Vec<FitPeer> = peers
        .iter()
        .map(|p| {
            let store = match replacement {
                Some((src, dst)) if p.store_id == src => Some(dst.clone()),
                _ => stores.iter().find(|s| s.id == p.store_id).cloned(),
            };
            FitPeer { peer: p.clone(), store, is_leader: region.is_leader(p.id), selected: false }
        })
        .collect();
    out.sort_by(|a, b| {
        let (sa, sb) = (state_score(region, a.peer.id), state_score(region, b.peer.id));
        sb.cmp(&sa).then(a.peer.id.cmp(&b.peer.id))
    });
    out
}

fn state_score(region: &RegionInfo, peer_id: PeerId) -> u8 {
    if region.is_down(peer_id) {
        0
    } else if region.is_pending(peer_id) {
        1
    } else {
        2
    }
}

/// Fit a region's peers to the rule list and return the best achievable
/// assignment. Pure function of its inputs; the result is deterministic.
pub fn fit_region(stores: &[StoreInfo], region: &RegionInfo, rules: &[Rule]) -> RegionFit {
    debug!(
        region = region.id,
        peers = region.peers().len(),
        rules = rules.len(),
        "fitting region against rule list"
    );
    let mut worker = FitWorker::new(stores, region, rules);
    worker.run();
    worker.into_fit()
}

struct FitWorker<'a> {
    stores: &'a [StoreInfo],
    rules: &'a [Rule],
    /// Sorted by `prepare_fit_peers`; `selected` flags mutate during the
    /// search, everything else is fixed.
    peers: Vec<FitPeer>,
    best_rule_fits: Vec<Option<RuleFit>>,
    orphan_peers: Vec<Peer>,
    need_isolation: bool,
    /// Once a satisfied solution exists and no rule asks for isolation,
    /// nothing left to optimize: short-circuit all remaining subsets.
    exit: bool,
}

impl<'a> FitWorker<'a> {
    fn new(stores: &'a [StoreInfo], region: &RegionInfo, rules: &'a [Rule]) -> Self {
        Self {
            stores,
            rules,
            peers: prepare_fit_peers(stores, region, region.peers(), None),
            best_rule_fits: vec![None; rules.len()],
            orphan_peers: Vec::new(),
            need_isolation: rules.iter().any(|r| !r.location_labels.is_empty()),
            exit: false,
        }
    }

    fn run(&mut self) {
        self.fit_rule(0);
        // All peers go to the orphan list when the rule list is empty.
        self.update_orphan_peers(0);
    }

    fn into_fit(self) -> RegionFit {
        RegionFit::new(self.best_rule_fits, self.orphan_peers, self.stores.to_vec())
    }

    /// Pick the most suitable peer combination for the rule at `index`.
    /// Returns true if it replaced the best fit with a better alternative.
    fn fit_rule(&mut self, index: usize) -> bool {
        if self.exit {
            return false;
        }
        if index >= self.rules.len() {
            if !self.need_isolation && self.best_is_satisfied() {
                self.exit = true;
            }
            return false;
        }

        let rule = &self.rules[index];
        let mut candidates: Vec<usize> = Vec::new();
        if rule_has_eligible_store(rule, self.stores) {
            // Peers not claimed by an earlier rule, hosted on a store
            // matching the rule's constraints.
            for (i, p) in self.peers.iter().enumerate() {
                if !p.selected
                    && p.store.as_ref().is_some_and(|s| {
                        match_label_constraints(s, &rule.label_constraints)
                    })
                {
                    candidates.push(i);
                }
            }
        }

        let count = rule.count.min(candidates.len());
        self.fit_rule_with_candidates(&candidates, index, count)
    }

    /// Enumerate every `count`-element subset of the candidates as a
    /// bitmask, smallest pattern first, and trial each one.
    fn fit_rule_with_candidates(&mut self, candidates: &[usize], index: usize, count: usize) -> bool {
        debug_assert!(candidates.len() < 64, "candidate fan-out beyond the engine's design range");

        let mut better = false;
        let limit: u64 = (1u64 << candidates.len()) - 1;
        let mut mask: u64 = (1u64 << count) - 1;
        while mask <= limit {
            if mask.count_ones() as usize == count {
                let selected = self.select_peers(candidates, mask);
                better = self.compare_best(&selected, index) || better;
                // Release the subset so the next trial can reuse its peers.
                for &i in &selected {
                    self.peers[i].selected = false;
                }
                if self.exit {
                    break;
                }
            }
            mask += 1;
        }
        better
    }

    /// Mark the peers addressed by the mask's set bits as selected and
    /// return their indices (bit k of the mask addresses `candidates[k]`).
    fn select_peers(&mut self, candidates: &[usize], mut mask: u64) -> Vec<usize> {
        let mut selected = Vec::new();
        for &idx in candidates {
            if mask & 1 == 1 {
                self.peers[idx].selected = true;
                selected.push(idx);
            }
            mask >>= 1;
            if mask == 0 {
                break;
            }
        }
        selected
    }

    /// Trial one subset against the best fit recorded for this rule index.
    /// Strictly better: install it, invalidate all later indices, recurse.
    /// Equal: recurse first, commit only if a later rule improved.
    fn compare_best(&mut self, selected: &[usize], index: usize) -> bool {
        let refs: Vec<&FitPeer> = selected.iter().map(|&i| &self.peers[i]).collect();
        let rf = RuleFit::new(&self.rules[index], &refs);
        let cmp = match &self.best_rule_fits[index] {
            Some(best) => compare_rule_fit(&rf, best),
            None => Ordering::Greater,
        };

        match cmp {
            Ordering::Greater => {
                self.best_rule_fits[index] = Some(rf);
                // Later results were computed against a different claimed
                // set; they must be redone.
                for slot in &mut self.best_rule_fits[index + 1..] {
                    *slot = None;
                }
                self.fit_rule(index + 1);
                self.update_orphan_peers(index + 1);
                true
            }
            Ordering::Equal => {
                if self.fit_rule(index + 1) {
                    self.best_rule_fits[index] = Some(rf);
                    return true;
                }
                false
            }
            Ordering::Less => false,
        }
    }

    /// At full depth, everything not claimed by a rule is an orphan.
    fn update_orphan_peers(&mut self, index: usize) {
        if index != self.rules.len() {
            return;
        }
        self.orphan_peers.clear();
        self.orphan_peers
            .extend(self.peers.iter().filter(|p| !p.selected).map(|p| p.peer.clone()));
    }

    /// Satisfaction of the best-so-far state, mirroring
    /// [`RegionFit::is_satisfied`]. Checked at full depth against the
    /// orphan list as last recorded, before it is recomputed.
    fn best_is_satisfied(&self) -> bool {
        !self.best_rule_fits.is_empty()
            && self
                .best_rule_fits
                .iter()
                .all(|rf| rf.as_ref().is_some_and(RuleFit::is_satisfied))
            && self.orphan_peers.is_empty()
    }
}
