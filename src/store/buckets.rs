//! Event bucket store
//!
//! Events submitted for a rule are stashed in that rule's bucket until
//! the bucket is flushed for evaluation. Flushing policy (dwell timers,
//! evaluation) lives outside the state machine; this store only holds
//! the bucketed events.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::StoreError;

/// A single event as submitted by an external source
///
/// All fields are defaulted so partial payloads decode. `data` carries
/// the source-defined document verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Source-assigned event id
    #[serde(default)]
    pub id: String,
    /// Event type, matched against a rule's `event_types`
    #[serde(default, rename = "eventType")]
    pub event_type: String,
    /// Origin of the event
    #[serde(default)]
    pub source: String,
    /// Arbitrary event payload
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Complete contents of a bucket store at one instant
///
/// Rule id to the events stashed for that rule, in stash order.
pub type BucketsImage = BTreeMap<String, Vec<Event>>;

/// Bucket store contract: mutation, clone and restore
pub trait BucketStore: Send {
    /// Append an event to the bucket for `rule_id`, creating the bucket
    /// on first stash
    fn stash(&mut self, rule_id: &str, event: Event) -> Result<(), StoreError>;

    /// Discard the bucket for `rule_id`; errors if no bucket exists
    fn flush_bucket(&mut self, rule_id: &str) -> Result<(), StoreError>;

    /// Deep copy of the complete store contents
    fn clone_image(&self) -> BucketsImage;

    /// Replace the complete store contents with the image
    fn restore(&mut self, image: BucketsImage);
}

/// In-memory bucket store
#[derive(Debug, Default)]
pub struct MemoryBucketStore {
    buckets: BTreeMap<String, Vec<Event>>,
}

impl MemoryBucketStore {
    /// Create a new empty bucket store
    pub fn new() -> Self {
        MemoryBucketStore {
            buckets: BTreeMap::new(),
        }
    }

    /// Get the stashed events for a rule (for read-only queries)
    pub fn bucket(&self, rule_id: &str) -> Option<&[Event]> {
        self.buckets.get(rule_id).map(Vec::as_slice)
    }
}

impl BucketStore for MemoryBucketStore {
    fn stash(&mut self, rule_id: &str, event: Event) -> Result<(), StoreError> {
        // The bucket store does not consult the rule store: one command
        // touches one store, so existence of the rule is not checked here
        self.buckets
            .entry(rule_id.to_string())
            .or_default()
            .push(event);
        Ok(())
    }

    fn flush_bucket(&mut self, rule_id: &str) -> Result<(), StoreError> {
        self.buckets
            .remove(rule_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("bucket {}", rule_id)))
    }

    fn clone_image(&self) -> BucketsImage {
        self.buckets.clone()
    }

    fn restore(&mut self, image: BucketsImage) {
        self.buckets = image;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(id: &str) -> Event {
        Event {
            id: id.to_string(),
            event_type: "acme.prod.icinga.check_disk".to_string(),
            source: "icinga".to_string(),
            data: json!({"host": "db-1"}),
        }
    }

    #[test]
    fn test_stash_creates_bucket() {
        let mut store = MemoryBucketStore::new();

        store.stash("r1", event("e1")).unwrap();
        store.stash("r1", event("e2")).unwrap();

        let bucket = store.bucket("r1").unwrap();
        assert_eq!(bucket.len(), 2);
        // Stash order is preserved
        assert_eq!(bucket[0].id, "e1");
        assert_eq!(bucket[1].id, "e2");
    }

    #[test]
    fn test_stash_separate_rules_separate_buckets() {
        let mut store = MemoryBucketStore::new();

        store.stash("r1", event("e1")).unwrap();
        store.stash("r2", event("e2")).unwrap();

        assert_eq!(store.bucket("r1").unwrap().len(), 1);
        assert_eq!(store.bucket("r2").unwrap().len(), 1);
    }

    #[test]
    fn test_flush_discards_bucket() {
        let mut store = MemoryBucketStore::new();

        store.stash("r1", event("e1")).unwrap();
        store.flush_bucket("r1").unwrap();
        assert!(store.bucket("r1").is_none());
    }

    #[test]
    fn test_flush_missing_bucket_fails() {
        let mut store = MemoryBucketStore::new();

        let result = store.flush_bucket("r1");
        assert_eq!(result, Err(StoreError::NotFound("bucket r1".to_string())));
    }

    #[test]
    fn test_restore_replaces_everything() {
        let mut store = MemoryBucketStore::new();
        store.stash("old", event("e1")).unwrap();

        let mut image = BucketsImage::new();
        image.insert("new".to_string(), vec![event("e2")]);
        store.restore(image);

        assert!(store.bucket("old").is_none());
        assert_eq!(store.bucket("new").unwrap()[0].id, "e2");
    }

    #[test]
    fn test_event_payload_round_trips() {
        let e = event("e1");
        let encoded = serde_json::to_string(&e).unwrap();
        let decoded: Event = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, e);
    }
}
