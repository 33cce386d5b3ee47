//! Rule definition store
//!
//! Rules describe which event types get bucketed together and which
//! script evaluates the bucket when it is flushed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::StoreError;

/// A rule definition
///
/// Every field except `id` is defaulted so a minimal `{"id":"r1"}`
/// payload decodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule id
    pub id: String,
    /// Human-readable title
    #[serde(default)]
    pub title: String,
    /// Event types this rule collects into its bucket
    #[serde(default, rename = "eventTypes")]
    pub event_types: Vec<String>,
    /// Script evaluated against the bucket when it is flushed
    #[serde(default, rename = "scriptID")]
    pub script_id: String,
    /// How long stashed events dwell before the bucket is flushed
    #[serde(default, rename = "waitWindowMillis")]
    pub wait_window_millis: u64,
}

/// Complete contents of a rule store at one instant
///
/// Keyed by rule id. A `BTreeMap` keeps serialization order deterministic,
/// so equal state produces identical snapshot bytes on every replica.
pub type RulesImage = BTreeMap<String, Rule>;

/// Rule store contract: mutation, clone and restore
///
/// All operations must be deterministic - the same call against the same
/// state must produce the same outcome on every replica.
pub trait RuleStore: Send {
    /// Add a new rule; errors if the id is already present
    fn add_rule(&mut self, rule: Rule) -> Result<(), StoreError>;

    /// Replace an existing rule; errors if the id is absent
    fn update_rule(&mut self, rule: Rule) -> Result<(), StoreError>;

    /// Remove a rule; errors if the id is absent
    fn remove_rule(&mut self, rule_id: &str) -> Result<(), StoreError>;

    /// Deep copy of the complete store contents
    fn clone_image(&self) -> RulesImage;

    /// Replace the complete store contents with the image
    fn restore(&mut self, image: RulesImage);
}

/// In-memory rule store
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: BTreeMap<String, Rule>,
}

impl MemoryRuleStore {
    /// Create a new empty rule store
    pub fn new() -> Self {
        MemoryRuleStore {
            rules: BTreeMap::new(),
        }
    }

    /// Get a rule directly (for read-only queries)
    pub fn get(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.get(rule_id)
    }

    /// Number of rules in the store
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if the store holds no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RuleStore for MemoryRuleStore {
    fn add_rule(&mut self, rule: Rule) -> Result<(), StoreError> {
        if self.rules.contains_key(&rule.id) {
            return Err(StoreError::AlreadyExists(format!("rule {}", rule.id)));
        }
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    fn update_rule(&mut self, rule: Rule) -> Result<(), StoreError> {
        if !self.rules.contains_key(&rule.id) {
            return Err(StoreError::NotFound(format!("rule {}", rule.id)));
        }
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    fn remove_rule(&mut self, rule_id: &str) -> Result<(), StoreError> {
        self.rules
            .remove(rule_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("rule {}", rule_id)))
    }

    fn clone_image(&self) -> RulesImage {
        self.rules.clone()
    }

    fn restore(&mut self, image: RulesImage) {
        self.rules = image;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str) -> Rule {
        Rule {
            id: id.to_string(),
            ..Rule::default()
        }
    }

    #[test]
    fn test_add_and_get() {
        let mut store = MemoryRuleStore::new();

        store.add_rule(rule("r1")).unwrap();
        assert_eq!(store.get("r1").unwrap().id, "r1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_duplicate_fails() {
        let mut store = MemoryRuleStore::new();

        store.add_rule(rule("r1")).unwrap();
        let result = store.add_rule(rule("r1"));
        assert_eq!(
            result,
            Err(StoreError::AlreadyExists("rule r1".to_string()))
        );
    }

    #[test]
    fn test_update_replaces() {
        let mut store = MemoryRuleStore::new();

        store.add_rule(rule("r1")).unwrap();

        let mut updated = rule("r1");
        updated.title = "escalation".to_string();
        store.update_rule(updated).unwrap();

        assert_eq!(store.get("r1").unwrap().title, "escalation");
    }

    #[test]
    fn test_update_missing_fails() {
        let mut store = MemoryRuleStore::new();

        let result = store.update_rule(rule("r1"));
        assert_eq!(result, Err(StoreError::NotFound("rule r1".to_string())));
    }

    #[test]
    fn test_remove() {
        let mut store = MemoryRuleStore::new();

        store.add_rule(rule("r1")).unwrap();
        store.remove_rule("r1").unwrap();
        assert!(store.get("r1").is_none());

        // Removing again fails
        let result = store.remove_rule("r1");
        assert_eq!(result, Err(StoreError::NotFound("rule r1".to_string())));
    }

    #[test]
    fn test_restore_replaces_everything() {
        let mut store = MemoryRuleStore::new();
        store.add_rule(rule("old")).unwrap();

        let mut image = RulesImage::new();
        image.insert("new".to_string(), rule("new"));
        store.restore(image);

        assert!(store.get("old").is_none());
        assert!(store.get("new").is_some());
    }

    #[test]
    fn test_clone_image_is_deep() {
        let mut store = MemoryRuleStore::new();
        store.add_rule(rule("r1")).unwrap();

        let image = store.clone_image();

        // Mutating the store afterwards does not change the image
        store.remove_rule("r1").unwrap();
        assert!(image.contains_key("r1"));
    }

    #[test]
    fn test_minimal_rule_decodes() {
        let parsed: Rule = serde_json::from_str(r#"{"id":"r1"}"#).unwrap();
        assert_eq!(parsed.id, "r1");
        assert_eq!(parsed.title, "");
        assert!(parsed.event_types.is_empty());
    }
}
