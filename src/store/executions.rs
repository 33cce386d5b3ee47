//! Execution record store
//!
//! Every completed rule evaluation leaves a record of what ran and what
//! the script produced. Records are written by the execution pipeline
//! and pruned by retention commands.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::buckets::Event;
use super::StoreError;

/// A record of one completed rule execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Unique record id
    pub id: String,
    /// Rule that was evaluated
    #[serde(default, rename = "ruleID")]
    pub rule_id: String,
    /// Events the evaluation consumed
    #[serde(default)]
    pub events: Vec<Event>,
    /// Whatever the evaluation script produced
    #[serde(default, rename = "scriptResult")]
    pub script_result: serde_json::Value,
    /// Submitter-assigned creation time; never read from the wall clock
    /// at apply time
    #[serde(default, rename = "createdAtMillis")]
    pub created_at_millis: u64,
}

/// Complete contents of an execution store at one instant
pub type HistoryImage = BTreeMap<String, ExecutionRecord>;

/// Execution store contract: mutation, clone and restore
pub trait ExecutionStore: Send {
    /// Add a new record; errors if the id is already present
    fn add(&mut self, record: ExecutionRecord) -> Result<(), StoreError>;

    /// Remove a record; errors if the id is absent
    fn remove(&mut self, record_id: &str) -> Result<(), StoreError>;

    /// Deep copy of the complete store contents
    fn clone_image(&self) -> HistoryImage;

    /// Replace the complete store contents with the image
    fn restore(&mut self, image: HistoryImage);
}

/// In-memory execution store
#[derive(Debug, Default)]
pub struct MemoryExecutionStore {
    records: BTreeMap<String, ExecutionRecord>,
}

impl MemoryExecutionStore {
    /// Create a new empty execution store
    pub fn new() -> Self {
        MemoryExecutionStore {
            records: BTreeMap::new(),
        }
    }

    /// Get a record directly (for read-only queries)
    pub fn get(&self, record_id: &str) -> Option<&ExecutionRecord> {
        self.records.get(record_id)
    }
}

impl ExecutionStore for MemoryExecutionStore {
    fn add(&mut self, record: ExecutionRecord) -> Result<(), StoreError> {
        if self.records.contains_key(&record.id) {
            return Err(StoreError::AlreadyExists(format!("record {}", record.id)));
        }
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    fn remove(&mut self, record_id: &str) -> Result<(), StoreError> {
        self.records
            .remove(record_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("record {}", record_id)))
    }

    fn clone_image(&self) -> HistoryImage {
        self.records.clone()
    }

    fn restore(&mut self, image: HistoryImage) {
        self.records = image;
    }
}
