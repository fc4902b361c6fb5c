//! gridstore-core — the read-only cluster model.
//!
//! Domain types describing cluster state as seen by the placement layer:
//! stores (physical nodes with labels), regions (replicated partitions),
//! and peers (one replica of a region on one store). These types are
//! owned by the cluster-state layer; the placement engine only reads them.
//!
//! # Components
//!
//! - **`store`** — `StoreInfo`, location-label comparison, `StoreSet`
//! - **`region`** — `RegionInfo`, `Peer`, replica roles and health sets

pub mod region;
pub mod store;

pub use region::{Peer, PeerId, PeerRole, RegionId, RegionInfo};
pub use store::{StoreId, StoreInfo, StoreSet};
