//! Command dispatcher and whole-state snapshot/restore
//!
//! `Fsm` owns the four store collaborators and is driven by the
//! consensus layer: committed entries arrive one at a time through
//! `apply`, while snapshot production and installation run on behalf
//! of log compaction and replica catch-up.

use std::io::Read;
use std::sync::{Arc, Mutex};

use tracing::{debug, error, info};

use crate::fsm::command::{Command, CommandEnvelope, SCHEMA_VERSION};
use crate::fsm::traits::{ApplyResult, Snapshotable, StateMachine};
use crate::snapshot::{FsmSnapshot, RestoreError, StateImage, IMAGE_VERSION};
use crate::store::buckets::{BucketStore, MemoryBucketStore};
use crate::store::executions::{ExecutionStore, MemoryExecutionStore};
use crate::store::rules::{MemoryRuleStore, RuleStore};
use crate::store::scripts::{MemoryScriptStore, ScriptStore};

/// Replicated state machine over the four store collaborators
///
/// Every mutating entry point takes `&mut self`, so for a uniquely-owned
/// machine exclusivity is a compile-time fact. `SharedFsm` wraps the
/// machine for callers that also run snapshot or restore from a
/// background context.
pub struct Fsm {
    rules: Box<dyn RuleStore>,
    buckets: Box<dyn BucketStore>,
    scripts: Box<dyn ScriptStore>,
    executions: Box<dyn ExecutionStore>,
}

impl Fsm {
    /// Create a machine over the given store collaborators
    pub fn new(
        rules: Box<dyn RuleStore>,
        buckets: Box<dyn BucketStore>,
        scripts: Box<dyn ScriptStore>,
        executions: Box<dyn ExecutionStore>,
    ) -> Self {
        Fsm {
            rules,
            buckets,
            scripts,
            executions,
        }
    }

    /// Create a machine over empty in-memory stores
    pub fn in_memory() -> Self {
        Fsm::new(
            Box::new(MemoryRuleStore::new()),
            Box::new(MemoryBucketStore::new()),
            Box::new(MemoryScriptStore::new()),
            Box::new(MemoryExecutionStore::new()),
        )
    }

    /// Apply one committed log entry
    ///
    /// Decodes the entry, routes it to exactly one store operation and
    /// returns that operation's result verbatim. Entries arrive already
    /// ordered and de-duplicated by the consensus layer.
    ///
    /// An entry this replica cannot decode is fatal: peers committed it
    /// and will apply it, so ignoring it here would silently diverge
    /// from them.
    pub fn apply(&mut self, entry: &[u8]) -> ApplyResult {
        let envelope: CommandEnvelope = match serde_json::from_slice(entry) {
            Ok(envelope) => envelope,
            Err(e) => fatal(&format!("undecodable committed entry: {}", e)),
        };

        // A version this build does not understand is the same situation
        // as an unrecognized op: peers may interpret the entry, we cannot
        if envelope.v > SCHEMA_VERSION {
            fatal(&format!(
                "committed entry has schema version {}, this build supports up to {}",
                envelope.v, SCHEMA_VERSION
            ));
        }

        debug!(command = ?envelope.command, "applying committed entry");
        self.dispatch(envelope.command)
    }

    /// Exhaustive routing: each op maps to exactly one store call
    fn dispatch(&mut self, command: Command) -> ApplyResult {
        match command {
            Command::Stash { rule_id, event } => self.buckets.stash(&rule_id, event),
            Command::AddRule { rule } => self.rules.add_rule(rule),
            Command::UpdateRule { rule } => self.rules.update_rule(rule),
            Command::RemoveRule { rule_id } => self.rules.remove_rule(&rule_id),
            Command::FlushBucket { rule_id } => self.buckets.flush_bucket(&rule_id),
            Command::AddScript { script_id, script } => self.scripts.add_script(&script_id, script),
            Command::UpdateScript { script_id, script } => {
                self.scripts.update_script(&script_id, script)
            }
            Command::RemoveScript { script_id } => self.scripts.remove_script(&script_id),
            Command::AddRecord { record } => self.executions.add(record),
            Command::RemoveRecord { record_id } => self.executions.remove(&record_id),
        }
    }

    /// Capture a consistent snapshot of all four stores
    ///
    /// The four clones are taken back-to-back under this borrow, so they
    /// reflect the same point in the apply stream - no command can split
    /// across them.
    pub fn snapshot(&self) -> FsmSnapshot {
        info!("producing state snapshot");
        FsmSnapshot::new(StateImage {
            version: IMAGE_VERSION,
            buckets: self.buckets.clone_image(),
            rules: self.rules.clone_image(),
            scripts: self.scripts.clone_image(),
            history: self.executions.clone_image(),
        })
    }

    /// Install a snapshot, replacing the contents of all four stores
    ///
    /// The image is fully decoded before any store is touched, so a
    /// malformed or truncated stream leaves existing state exactly as it
    /// was. The reader is consumed by value and dropped on every exit
    /// path.
    pub fn restore<R: Read>(&mut self, reader: R) -> Result<(), RestoreError> {
        info!("installing state snapshot");
        let image = StateImage::decode(reader)?;

        // Full replacement, not merge: anything present in current state
        // but absent from the image is discarded
        self.buckets.restore(image.buckets);
        self.rules.restore(image.rules);
        self.scripts.restore(image.scripts);
        self.executions.restore(image.history);
        Ok(())
    }
}

/// Fatal-path exit, the only process-terminating path in the crate
///
/// Used when continuing would risk undetectable state divergence between
/// replicas. Halting lets the consensus layer observe this replica as
/// unavailable rather than silently wrong. Conditions a caller could
/// recover from must use the error paths instead.
fn fatal(msg: &str) -> ! {
    error!("{}", msg);
    panic!("{}", msg);
}

impl StateMachine for Fsm {
    fn apply(&mut self, entry: &[u8]) -> ApplyResult {
        Fsm::apply(self, entry)
    }
}

impl Snapshotable for Fsm {
    fn snapshot(&self) -> FsmSnapshot {
        Fsm::snapshot(self)
    }

    fn restore(&mut self, reader: Box<dyn Read + Send>) -> Result<(), RestoreError> {
        Fsm::restore(self, reader)
    }
}

/// Shared state machine handle for use from multiple contexts
///
/// One lock serializes `apply`, snapshot cloning and `restore`: from
/// each store's perspective the three are strictly ordered and never
/// interleave, even when snapshots are triggered from a background
/// compaction task.
pub type SharedFsm = Arc<Mutex<Fsm>>;

impl StateMachine for SharedFsm {
    fn apply(&mut self, entry: &[u8]) -> ApplyResult {
        self.lock().unwrap().apply(entry)
    }
}

impl Snapshotable for SharedFsm {
    fn snapshot(&self) -> FsmSnapshot {
        self.lock().unwrap().snapshot()
    }

    fn restore(&mut self, reader: Box<dyn Read + Send>) -> Result<(), RestoreError> {
        self.lock().unwrap().restore(reader)
    }
}
