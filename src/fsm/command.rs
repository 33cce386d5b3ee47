//! Replicated command model
//!
//! Commands are the sole unit passed through the replicated log: created
//! by an external submitter, committed by consensus, applied exactly once
//! and then discarded. The `op` tag is a closed set - an entry whose tag
//! falls outside it fails to decode, and the dispatcher treats that as
//! fatal.

use serde::{Deserialize, Serialize};

use crate::store::buckets::Event;
use crate::store::executions::ExecutionRecord;
use crate::store::rules::Rule;

/// Envelope schema version written and understood by this build
pub const SCHEMA_VERSION: u32 = 1;

fn schema_version() -> u32 {
    SCHEMA_VERSION
}

/// One committed log entry: schema version plus the tagged command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    /// Schema version, reserved for rolling upgrades. Entries written
    /// before the field existed decode as version 1.
    #[serde(default = "schema_version")]
    pub v: u32,
    #[serde(flatten)]
    pub command: Command,
}

impl CommandEnvelope {
    /// Wrap a command at the current schema version
    pub fn new(command: Command) -> Self {
        CommandEnvelope {
            v: SCHEMA_VERSION,
            command,
        }
    }

    /// Serialize for appending to the replicated log
    ///
    /// Field order is fixed by the type and map sections are ordered, so
    /// equal commands encode to identical bytes on every replica.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// A replicated command and the payload it carries
///
/// Tagged by `op` on the wire. Each variant carries only the fields its
/// store operation needs; the dispatcher matches exhaustively, so adding
/// a variant without routing it is a compile error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Stash an event into the bucket for a rule
    Stash {
        #[serde(rename = "ruleID")]
        rule_id: String,
        event: Event,
    },
    /// Add a new rule definition
    AddRule { rule: Rule },
    /// Replace an existing rule definition
    UpdateRule { rule: Rule },
    /// Remove a rule definition
    RemoveRule {
        #[serde(rename = "ruleID")]
        rule_id: String,
    },
    /// Discard all events stashed for a rule
    FlushBucket {
        #[serde(rename = "ruleID")]
        rule_id: String,
    },
    /// Add a new evaluation script
    AddScript {
        #[serde(rename = "scriptID")]
        script_id: String,
        script: Vec<u8>,
    },
    /// Replace an existing evaluation script
    UpdateScript {
        #[serde(rename = "scriptID")]
        script_id: String,
        script: Vec<u8>,
    },
    /// Remove an evaluation script
    RemoveScript {
        #[serde(rename = "scriptID")]
        script_id: String,
    },
    /// Record a completed rule execution
    AddRecord { record: ExecutionRecord },
    /// Remove an execution record
    RemoveRecord {
        #[serde(rename = "recordID")]
        record_id: String,
    },
}
