//! Label scheduler — moves leadership off stores that reject it.
//!
//! Stores can carry labels marking them unfit for leadership (a store
//! being drained, a cold-storage tier, a witness-only host). This
//! scheduler scans for leaders sitting on such stores and issues a
//! transfer-leader operator towards the least-loaded healthy follower.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use gridstore_core::{RegionId, RegionInfo, StoreId, StoreInfo};
use gridstore_placement::{LabelConstraint, match_label_constraints};

use crate::error::{SchedulerError, SchedulerResult};

/// An action handed to the operator-execution pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operator {
    TransferLeader { region_id: RegionId, from_store: StoreId, to_store: StoreId },
}

/// Read access to cluster state, owned by the caller.
pub trait ClusterState {
    fn stores(&self) -> anyhow::Result<Vec<StoreInfo>>;
    /// Regions whose current leader lives on the given store.
    fn leader_regions_on(&self, store_id: StoreId) -> anyhow::Result<Vec<RegionInfo>>;
    /// Number of region leaders the store currently hosts.
    fn leader_count(&self, store_id: StoreId) -> anyhow::Result<usize>;
}

/// Scheduler that vacates leadership from stores matching a reject-leader
/// label property.
pub struct LabelScheduler {
    reject_leader: Vec<LabelConstraint>,
}

impl LabelScheduler {
    pub fn new(reject_leader: Vec<LabelConstraint>) -> SchedulerResult<Self> {
        if reject_leader.is_empty() {
            return Err(SchedulerError::EmptyLabelProperty);
        }
        Ok(Self { reject_leader })
    }

    /// Produce at most one transfer-leader operator per invocation.
    ///
    /// Picks the first reject-leader store (id order) hosting a leader,
    /// skips followers on stores with down or pending replicas, and
    /// targets the follower store with the fewest leaders.
    pub fn schedule(&self, cluster: &impl ClusterState) -> SchedulerResult<Option<Operator>> {
        let stores = cluster.stores()?;
        let mut reject_store_ids: Vec<StoreId> = stores
            .iter()
            .filter(|s| match_label_constraints(s, &self.reject_leader))
            .map(|s| s.id)
            .collect();
        if reject_store_ids.is_empty() {
            debug!("no reject-leader stores, skipping");
            return Ok(None);
        }
        reject_store_ids.sort_unstable();
        debug!(stores = ?reject_store_ids, "reject-leader store list");

        for store_id in reject_store_ids {
            for region in cluster.leader_regions_on(store_id)? {
                debug!(region = region.id, "selecting region to transfer leader");
                let excluded: HashSet<StoreId> = region.unhealthy_store_ids();

                let mut target: Option<(usize, StoreId)> = None;
                for peer in region.peers() {
                    if region.is_leader(peer.id)
                        || peer.is_learner()
                        || excluded.contains(&peer.store_id)
                    {
                        continue;
                    }
                    let load = cluster.leader_count(peer.store_id)?;
                    let key = (load, peer.store_id);
                    if target.is_none_or(|t| key < t) {
                        target = Some(key);
                    }
                }

                let Some((_, to_store)) = target else {
                    debug!(region = region.id, "no transfer target found for region");
                    continue;
                };
                return Ok(Some(Operator::TransferLeader {
                    region_id: region.id,
                    from_store: store_id,
                    to_store,
                }));
            }
        }
        debug!("no leader region found on reject-leader stores");
        Ok(None)
    }
}
