//! Store collaborators owning the four slices of replicated state
//!
//! Each store owns one category of durable state exclusively and exposes
//! mutation, clone and restore operations to the state machine core:
//! - `rules`: rule definitions keyed by rule id
//! - `buckets`: events stashed per rule, awaiting evaluation
//! - `scripts`: evaluation script sources keyed by script id
//! - `executions`: records of completed rule executions
//!
//! The in-memory implementations are the reference collaborators used by
//! tests and embedding. Production deployments may implement the traits
//! over their own backing state, as long as every operation stays
//! deterministic.

pub mod buckets;
pub mod executions;
pub mod rules;
pub mod scripts;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during store mutations
///
/// Serializable so that apply results can travel back to the submitting
/// client through the replication layer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum StoreError {
    /// The id is already present in the store
    #[error("{0} already exists")]
    AlreadyExists(String),
    /// The id is not present in the store
    #[error("{0} not found")]
    NotFound(String),
}
