//! Fit results — how well a region's replicas satisfy its rule list.
//!
//! A [`RegionFit`] partitions the region's peers among the rules: every
//! peer either belongs to exactly one [`RuleFit`] or is an orphan. Both
//! types are immutable after the search completes, except for the
//! cache-provenance flag on `RegionFit`, and are therefore safe to share
//! across threads.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use serde::Serialize;

use gridstore_core::{Peer, PeerId, RegionInfo, StoreId, StoreInfo};

use crate::engine::{FitPeer, prepare_fit_peers};
use crate::rule::{Rule, match_label_constraints};
use crate::score::isolation_score;

/// The result of matching a subset of a region's peers to one rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleFit {
    pub rule: Rule,
    /// Peers of the region divided to this rule.
    pub peers: Vec<Peer>,
    /// Subset of `peers` whose actual role differs from the rule's
    /// required role. Such peers are assignable but mark the fit as
    /// unsatisfied until role migration fixes them.
    #[serde(rename = "peers-different-role")]
    pub peers_with_different_role: Vec<Peer>,
    /// At which level of the rule's location hierarchy the peers are
    /// isolated. Larger is better.
    #[serde(rename = "isolation-score")]
    pub isolation_score: f64,
}

impl RuleFit {
    pub(crate) fn new(rule: &Rule, selected: &[&FitPeer]) -> Self {
        let mut rf = RuleFit {
            rule: rule.clone(),
            peers: Vec::new(),
            peers_with_different_role: Vec::new(),
            isolation_score: isolation_score(selected, &rule.location_labels),
        };
        for p in selected {
            rf.peers.push(p.peer.clone());
            if !rule.role.matches(&p.peer, p.is_leader) || (p.peer.is_witness && !rule.is_witness)
            {
                rf.peers_with_different_role.push(p.peer.clone());
            }
        }
        rf
    }

    /// The rule is satisfied when it holds exactly `count` peers and none
    /// of them needs a role migration.
    pub fn is_satisfied(&self) -> bool {
        self.peers.len() == self.rule.count && self.peers_with_different_role.is_empty()
    }

    /// Whether one of this fit's peers lives on the given store.
    pub fn contains_store(&self, store_id: StoreId) -> bool {
        self.peers.iter().any(|p| p.store_id == store_id)
    }
}

/// Three-way comparison of two fits for the same rule: more assigned
/// peers wins, then fewer role mismatches, then higher isolation score.
pub fn compare_rule_fit(a: &RuleFit, b: &RuleFit) -> Ordering {
    a.peers
        .len()
        .cmp(&b.peers.len())
        .then(b.peers_with_different_role.len().cmp(&a.peers_with_different_role.len()))
        .then(a.isolation_score.partial_cmp(&b.isolation_score).unwrap_or(Ordering::Equal))
}

/// The aggregate fit of one region against an ordered rule list.
///
/// `rule_fits` corresponds positionally to the input rules; an entry is
/// `None` when the rule never had an eligible candidate. Peers claimed by
/// no rule end up in `orphan_peers` and are removal candidates.
#[derive(Debug, Serialize)]
pub struct RegionFit {
    #[serde(skip)]
    cached: AtomicBool,
    #[serde(rename = "rule-fits")]
    pub rule_fits: Vec<Option<RuleFit>>,
    #[serde(rename = "orphan-peers")]
    pub orphan_peers: Vec<Peer>,
    #[serde(skip)]
    region_stores: Vec<StoreInfo>,
}

impl RegionFit {
    pub(crate) fn new(
        rule_fits: Vec<Option<RuleFit>>,
        orphan_peers: Vec<Peer>,
        region_stores: Vec<StoreInfo>,
    ) -> Self {
        Self { cached: AtomicBool::new(false), rule_fits, orphan_peers, region_stores }
    }

    /// Mark whether this result was served from a cache rather than a
    /// fresh computation. The flag is the only mutable state on the type.
    pub fn set_cached(&self, cached: bool) {
        self.cached.store(cached, AtomicOrdering::SeqCst);
    }

    pub fn is_cached(&self) -> bool {
        self.cached.load(AtomicOrdering::SeqCst)
    }

    /// All rules fulfilled and no orphan peers. An empty rule list is
    /// never satisfied; neither is a rule slot left without candidates.
    pub fn is_satisfied(&self) -> bool {
        !self.rule_fits.is_empty()
            && self.rule_fits.iter().all(|rf| rf.as_ref().is_some_and(RuleFit::is_satisfied))
            && self.orphan_peers.is_empty()
    }

    /// The rule fit that claimed the given peer, if any.
    pub fn rule_fit_for_peer(&self, peer_id: PeerId) -> Option<&RuleFit> {
        self.rule_fits
            .iter()
            .flatten()
            .find(|rf| rf.peers.iter().any(|p| p.id == peer_id))
    }

    fn rule_fit_by_store(&self, store_id: StoreId) -> Option<&RuleFit> {
        self.rule_fits.iter().flatten().find(|rf| rf.contains_store(store_id))
    }

    /// The store snapshot this fit was computed against.
    pub fn region_stores(&self) -> &[StoreInfo] {
        &self.region_stores
    }

    /// Cheap what-if check: may the replica on `src_store_id` move to
    /// `dst_store` without breaking compliance?
    ///
    /// Approximation by design: only the owning rule is rescored, the
    /// global search is not re-run. Fails closed when no rule owns the
    /// source store or the destination violates the rule's constraints;
    /// accepts when the new isolation score is at least the original.
    pub fn replace(&self, src_store_id: StoreId, dst_store: &StoreInfo, region: &RegionInfo) -> bool {
        let Some(fit) = self.rule_fit_by_store(src_store_id) else {
            return false;
        };
        if !match_label_constraints(dst_store, &fit.rule.label_constraints) {
            return false;
        }
        // Same rule membership: a no-op move, isolation is unaffected.
        if fit.contains_store(dst_store.id) {
            return true;
        }

        let peers = prepare_fit_peers(
            &self.region_stores,
            region,
            &fit.peers,
            Some((src_store_id, dst_store)),
        );
        let refs: Vec<&FitPeer> = peers.iter().collect();
        fit.isolation_score <= isolation_score(&refs, &fit.rule.location_labels)
    }
}

/// Compare two whole-region fits positionally: the first rule index where
/// the fits differ decides; on a full tie, fewer orphan peers wins.
pub fn compare_region_fit(a: &RegionFit, b: &RegionFit) -> Ordering {
    for (fa, fb) in a.rule_fits.iter().zip(&b.rule_fits) {
        let cmp = match (fa, fb) {
            (Some(fa), Some(fb)) => compare_rule_fit(fa, fb),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    b.orphan_peers.len().cmp(&a.orphan_peers.len())
}
