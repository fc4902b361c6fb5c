//! GridStore placement engine — rule fitting, isolation scoring, replica
//! assignment.
//!
//! Given a snapshot of cluster stores, one region, and an ordered list of
//! placement rules, this crate decides whether the region's replicas
//! satisfy the rules and, if not, what the best achievable assignment
//! looks like and which replicas are surplus. It does NOT move replicas
//! (that's a scheduler's job); it only judges assignments and ranks
//! alternatives.
//!
//! # Components
//!
//! - **`rule`** — placement rules and the label-constraint oracle
//! - **`score`** — pairwise isolation scoring over location hierarchies
//! - **`fit`** — fit results (`RegionFit`/`RuleFit`), comparison, the
//!   incremental replacement checker
//! - **`engine`** — the backtracking search behind [`fit_region`]
//!
//! The search is synchronous and deterministic: identical inputs produce
//! identical results, down to peer ordering. Results are immutable after
//! construction (apart from the cache-provenance flag) and safe to share
//! across threads.

pub mod engine;
pub mod fit;
pub mod rule;
mod score;

pub use engine::fit_region;
pub use fit::{RegionFit, RuleFit, compare_region_fit, compare_rule_fit};
pub use rule::{
    LabelConstraint, LabelConstraintOp, Rule, RuleRole, match_label_constraints,
    rule_has_eligible_store,
};
