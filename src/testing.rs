//! Testing utilities: call-recording store doubles
//!
//! Each recording store logs the store calls it receives to a shared
//! vec, so routing tests can assert that a command reached exactly one
//! store operation and that no other store was touched.

use std::sync::{Arc, Mutex};

use crate::fsm::Fsm;
use crate::store::buckets::{BucketStore, BucketsImage, Event};
use crate::store::executions::{ExecutionRecord, ExecutionStore, HistoryImage};
use crate::store::rules::{Rule, RuleStore, RulesImage};
use crate::store::scripts::{ScriptStore, ScriptsImage};
use crate::store::StoreError;

/// Shared record of store calls
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Create an empty call log
pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Build a machine whose four stores all record into `log`
pub fn recording_fsm(log: &CallLog) -> Fsm {
    Fsm::new(
        Box::new(RecordingRuleStore { calls: log.clone() }),
        Box::new(RecordingBucketStore { calls: log.clone() }),
        Box::new(RecordingScriptStore { calls: log.clone() }),
        Box::new(RecordingExecutionStore { calls: log.clone() }),
    )
}

/// Rule store double that records calls instead of holding state
pub struct RecordingRuleStore {
    pub calls: CallLog,
}

impl RuleStore for RecordingRuleStore {
    fn add_rule(&mut self, rule: Rule) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("rules.add_rule {}", rule.id));
        Ok(())
    }

    fn update_rule(&mut self, rule: Rule) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("rules.update_rule {}", rule.id));
        Ok(())
    }

    fn remove_rule(&mut self, rule_id: &str) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("rules.remove_rule {}", rule_id));
        Ok(())
    }

    fn clone_image(&self) -> RulesImage {
        self.calls.lock().unwrap().push("rules.clone".to_string());
        RulesImage::new()
    }

    fn restore(&mut self, _image: RulesImage) {
        self.calls.lock().unwrap().push("rules.restore".to_string());
    }
}

/// Bucket store double that records calls instead of holding state
pub struct RecordingBucketStore {
    pub calls: CallLog,
}

impl BucketStore for RecordingBucketStore {
    fn stash(&mut self, rule_id: &str, _event: Event) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("buckets.stash {}", rule_id));
        Ok(())
    }

    fn flush_bucket(&mut self, rule_id: &str) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("buckets.flush_bucket {}", rule_id));
        Ok(())
    }

    fn clone_image(&self) -> BucketsImage {
        self.calls.lock().unwrap().push("buckets.clone".to_string());
        BucketsImage::new()
    }

    fn restore(&mut self, _image: BucketsImage) {
        self.calls
            .lock()
            .unwrap()
            .push("buckets.restore".to_string());
    }
}

/// Script store double that records calls instead of holding state
pub struct RecordingScriptStore {
    pub calls: CallLog,
}

impl ScriptStore for RecordingScriptStore {
    fn add_script(&mut self, script_id: &str, _script: Vec<u8>) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("scripts.add_script {}", script_id));
        Ok(())
    }

    fn update_script(&mut self, script_id: &str, _script: Vec<u8>) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("scripts.update_script {}", script_id));
        Ok(())
    }

    fn remove_script(&mut self, script_id: &str) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("scripts.remove_script {}", script_id));
        Ok(())
    }

    fn clone_image(&self) -> ScriptsImage {
        self.calls.lock().unwrap().push("scripts.clone".to_string());
        ScriptsImage::new()
    }

    fn restore(&mut self, _image: ScriptsImage) {
        self.calls
            .lock()
            .unwrap()
            .push("scripts.restore".to_string());
    }
}

/// Execution store double that records calls instead of holding state
pub struct RecordingExecutionStore {
    pub calls: CallLog,
}

impl ExecutionStore for RecordingExecutionStore {
    fn add(&mut self, record: ExecutionRecord) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("executions.add {}", record.id));
        Ok(())
    }

    fn remove(&mut self, record_id: &str) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("executions.remove {}", record_id));
        Ok(())
    }

    fn clone_image(&self) -> HistoryImage {
        self.calls
            .lock()
            .unwrap()
            .push("executions.clone".to_string());
        HistoryImage::new()
    }

    fn restore(&mut self, _image: HistoryImage) {
        self.calls
            .lock()
            .unwrap()
            .push("executions.restore".to_string());
    }
}
