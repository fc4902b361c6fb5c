//! Isolation scoring for assigned replica sets.

use crate::engine::FitPeer;

/// Base of the per-pair isolation weight. A pair diverging at hierarchy
/// level `i` out of `L` location labels contributes `100^(L-i-1)`, so one
/// divergence at a coarser level always outweighs any number of
/// divergences below it (for realistic replica counts).
pub(crate) const REPLICA_BASE_SCORE: f64 = 100.0;

/// Score how well a set of assigned peers is isolated over an ordered
/// location-label hierarchy. Strictly pairwise-additive: every unordered
/// pair of peers whose stores diverge at some level adds weight for that
/// level; co-located pairs and pairs with an unresolved store add zero.
pub(crate) fn isolation_score(peers: &[&FitPeer], labels: &[String]) -> f64 {
    if labels.is_empty() || peers.len() <= 1 {
        return 0.0;
    }
    let mut score = 0.0;
    for (i, p1) in peers.iter().enumerate() {
        for p2 in &peers[i + 1..] {
            let (Some(s1), Some(s2)) = (p1.store.as_ref(), p2.store.as_ref()) else {
                continue;
            };
            if let Some(index) = s1.compare_location(s2, labels) {
                score += REPLICA_BASE_SCORE.powi((labels.len() - index - 1) as i32);
            }
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridstore_core::{Peer, StoreInfo};

    fn labeled_peer(id: u64, labels: &[(&str, &str)]) -> FitPeer {
        let mut store = StoreInfo::new(id);
        for (k, v) in labels {
            store = store.with_label(*k, *v);
        }
        FitPeer {
            peer: Peer::new(id, id),
            store: Some(store),
            is_leader: false,
            selected: false,
        }
    }

    fn keys(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| (*l).to_string()).collect()
    }

    #[test]
    fn fully_isolated_single_level() {
        let peers = [
            labeled_peer(1, &[("dc", "1")]),
            labeled_peer(2, &[("dc", "2")]),
            labeled_peer(3, &[("dc", "3")]),
        ];
        let refs: Vec<&FitPeer> = peers.iter().collect();

        // Three pairs, each diverging at the only level: 3 * 100^0.
        assert_eq!(isolation_score(&refs, &keys(&["dc"])), 3.0);
    }

    #[test]
    fn colocated_pair_contributes_nothing() {
        let peers = [
            labeled_peer(1, &[("dc", "1")]),
            labeled_peer(2, &[("dc", "1")]),
            labeled_peer(3, &[("dc", "3")]),
        ];
        let refs: Vec<&FitPeer> = peers.iter().collect();

        assert_eq!(isolation_score(&refs, &keys(&["dc"])), 2.0);
    }

    #[test]
    fn coarser_divergence_dominates_finer() {
        let zone_spread = [
            labeled_peer(1, &[("zone", "z1"), ("rack", "r1")]),
            labeled_peer(2, &[("zone", "z2"), ("rack", "r1")]),
            labeled_peer(3, &[("zone", "z3"), ("rack", "r1")]),
        ];
        let rack_spread = [
            labeled_peer(1, &[("zone", "z1"), ("rack", "r1")]),
            labeled_peer(2, &[("zone", "z1"), ("rack", "r2")]),
            labeled_peer(3, &[("zone", "z1"), ("rack", "r3")]),
        ];
        let labels = keys(&["zone", "rack"]);

        let zr: Vec<&FitPeer> = zone_spread.iter().collect();
        let rr: Vec<&FitPeer> = rack_spread.iter().collect();

        assert_eq!(isolation_score(&zr, &labels), 300.0);
        assert_eq!(isolation_score(&rr, &labels), 3.0);
        assert!(isolation_score(&zr, &labels) > isolation_score(&rr, &labels));
    }

    #[test]
    fn degenerate_inputs_score_zero() {
        let one = [labeled_peer(1, &[("dc", "1")])];
        let refs: Vec<&FitPeer> = one.iter().collect();

        assert_eq!(isolation_score(&refs, &keys(&["dc"])), 0.0);
        assert_eq!(isolation_score(&[], &keys(&["dc"])), 0.0);
        assert_eq!(isolation_score(&refs, &[]), 0.0);
    }

    #[test]
    fn missing_store_or_label_scores_zero() {
        let mut unresolved = labeled_peer(1, &[("dc", "1")]);
        unresolved.store = None;
        let peers = [unresolved, labeled_peer(2, &[("dc", "2")])];
        let refs: Vec<&FitPeer> = peers.iter().collect();

        assert_eq!(isolation_score(&refs, &keys(&["dc"])), 0.0);

        let unlabeled = [labeled_peer(1, &[]), labeled_peer(2, &[("dc", "2")])];
        let refs: Vec<&FitPeer> = unlabeled.iter().collect();
        assert_eq!(isolation_score(&refs, &keys(&["dc"])), 0.0);
    }
}
