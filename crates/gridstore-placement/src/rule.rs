//! Placement rules and label-constraint matching.
//!
//! A rule is a declarative requirement over a region's replicas: how many
//! peers, in which role, on which stores (label constraints), spread over
//! which location hierarchy. Rules are evaluated as an ordered list; the
//! fitting engine commits to earlier rules before later ones.

use serde::{Deserialize, Serialize};

use gridstore_core::{Peer, StoreInfo};

/// Replica role required by a rule.
///
/// Unlike [`gridstore_core::PeerRole`] this distinguishes leadership:
/// a rule can pin the leader (or explicitly non-leaders) to a store set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleRole {
    /// Any non-learner, leader or not.
    Voter,
    /// The region's current leader only.
    Leader,
    /// Non-learner replicas that are not the leader.
    Follower,
    /// Learner replicas only.
    Learner,
}

impl RuleRole {
    /// Whether a peer's actual role matches this requirement exactly.
    /// Mismatches are still assignable; they surface as
    /// `peers_with_different_role` and drive later role migration.
    ///
    /// `is_leader` is resolved by the caller (true iff the peer is its
    /// region's current leader).
    pub fn matches(self, peer: &Peer, is_leader: bool) -> bool {
        match self {
            RuleRole::Voter => !peer.is_learner(),
            RuleRole::Leader => is_leader,
            RuleRole::Follower => !peer.is_learner() && !is_leader,
            RuleRole::Learner => peer.is_learner(),
        }
    }
}

/// Operator of a label constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelConstraintOp {
    /// Label value must be one of the listed values.
    In,
    /// Label value must not be any of the listed values (missing label passes).
    NotIn,
    /// Label key must be present, any value.
    Exists,
    /// Label key must be absent.
    NotExists,
}

/// One label predicate; a rule carries a conjunction of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConstraint {
    pub key: String,
    pub op: LabelConstraintOp,
    #[serde(default)]
    pub values: Vec<String>,
}

impl LabelConstraint {
    pub fn matches(&self, store: &StoreInfo) -> bool {
        let value = store.label_value(&self.key);
        match self.op {
            LabelConstraintOp::In => value.is_some_and(|v| self.values.iter().any(|w| w == v)),
            LabelConstraintOp::NotIn => !value.is_some_and(|v| self.values.iter().any(|w| w == v)),
            LabelConstraintOp::Exists => value.is_some(),
            LabelConstraintOp::NotExists => value.is_none(),
        }
    }
}

/// True iff the store satisfies every constraint in the set.
pub fn match_label_constraints(store: &StoreInfo, constraints: &[LabelConstraint]) -> bool {
    constraints.iter().all(|c| c.matches(store))
}

/// A placement rule applied to a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    /// Target number of replicas assigned to this rule.
    pub count: usize,
    pub role: RuleRole,
    /// Conjunction of store-label predicates limiting eligible stores.
    #[serde(default)]
    pub label_constraints: Vec<LabelConstraint>,
    /// Ordered isolation hierarchy, most significant key first.
    #[serde(default)]
    pub location_labels: Vec<String>,
    /// Whether this rule places witness replicas.
    #[serde(default)]
    pub is_witness: bool,
}

impl Rule {
    pub fn new(id: impl Into<String>, role: RuleRole, count: usize) -> Self {
        Self {
            id: id.into(),
            count,
            role,
            label_constraints: Vec::new(),
            location_labels: Vec::new(),
            is_witness: false,
        }
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: LabelConstraint) -> Self {
        self.label_constraints.push(constraint);
        self
    }

    #[must_use]
    pub fn with_location_labels(mut self, labels: &[&str]) -> Self {
        self.location_labels = labels.iter().map(|l| (*l).to_string()).collect();
        self
    }
}

/// Cheap precheck: does any store cluster-wide satisfy the rule's
/// constraints? A rule failing this has zero candidates and its slot in
/// the fit result stays empty.
pub fn rule_has_eligible_store(rule: &Rule, stores: &[StoreInfo]) -> bool {
    stores.iter().any(|s| match_label_constraints(s, &rule.label_constraints))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_constraint(key: &str, values: &[&str]) -> LabelConstraint {
        LabelConstraint {
            key: key.to_string(),
            op: LabelConstraintOp::In,
            values: values.iter().map(|v| (*v).to_string()).collect(),
        }
    }

    #[test]
    fn in_and_not_in() {
        let store = StoreInfo::new(1).with_label("zone", "z1");

        assert!(in_constraint("zone", &["z1", "z2"]).matches(&store));
        assert!(!in_constraint("zone", &["z3"]).matches(&store));

        let not_in = LabelConstraint {
            key: "zone".to_string(),
            op: LabelConstraintOp::NotIn,
            values: vec!["z1".to_string()],
        };
        assert!(!not_in.matches(&store));
        // Missing key passes NotIn.
        assert!(not_in.matches(&StoreInfo::new(2)));
    }

    #[test]
    fn exists_and_not_exists() {
        let store = StoreInfo::new(1).with_label("disk", "ssd");
        let exists = LabelConstraint {
            key: "disk".to_string(),
            op: LabelConstraintOp::Exists,
            values: Vec::new(),
        };
        let not_exists = LabelConstraint {
            key: "disk".to_string(),
            op: LabelConstraintOp::NotExists,
            values: Vec::new(),
        };

        assert!(exists.matches(&store));
        assert!(!not_exists.matches(&store));
        assert!(not_exists.matches(&StoreInfo::new(2)));
    }

    #[test]
    fn constraint_set_is_a_conjunction() {
        let store = StoreInfo::new(1).with_label("zone", "z1").with_label("disk", "ssd");
        let constraints =
            vec![in_constraint("zone", &["z1"]), in_constraint("disk", &["nvme"])];

        assert!(!match_label_constraints(&store, &constraints));
        assert!(match_label_constraints(&store, &constraints[..1]));
        // Empty set matches everything.
        assert!(match_label_constraints(&store, &[]));
    }

    #[test]
    fn eligible_store_precheck() {
        let stores = vec![
            StoreInfo::new(1).with_label("zone", "z1"),
            StoreInfo::new(2).with_label("zone", "z2"),
        ];
        let rule = Rule::new("ssd-only", RuleRole::Voter, 3)
            .with_constraint(in_constraint("zone", &["z9"]));

        assert!(!rule_has_eligible_store(&rule, &stores));
        assert!(rule_has_eligible_store(&Rule::new("any", RuleRole::Voter, 3), &stores));
    }

    #[test]
    fn role_matching() {
        let leader = Peer::new(1, 1);
        let follower = Peer::new(2, 2);
        let learner = Peer::new(3, 3).learner();

        assert!(RuleRole::Voter.matches(&leader, true));
        assert!(RuleRole::Voter.matches(&follower, false));
        assert!(!RuleRole::Voter.matches(&learner, false));

        assert!(RuleRole::Leader.matches(&leader, true));
        assert!(!RuleRole::Leader.matches(&follower, false));

        assert!(RuleRole::Follower.matches(&follower, false));
        assert!(!RuleRole::Follower.matches(&leader, true));
        assert!(!RuleRole::Follower.matches(&learner, false));

        assert!(RuleRole::Learner.matches(&learner, false));
        assert!(!RuleRole::Learner.matches(&follower, false));
    }
}
