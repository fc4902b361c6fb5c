//! gridstore-scheduler — schedulers consuming placement judgments.
//!
//! Thin decision layers on top of `gridstore-placement`: they read
//! cluster state, ask the fitting engine (or store labels directly)
//! whether anything is out of place, and emit operators for the
//! execution pipeline. They never move data themselves.
//!
//! # Components
//!
//! - **`label`** — leader eviction from stores labeled to reject
//!   leadership
//! - **`error`** — scheduler error types

pub mod error;
pub mod label;

pub use error::{SchedulerError, SchedulerResult};
pub use label::{ClusterState, LabelScheduler, Operator};
