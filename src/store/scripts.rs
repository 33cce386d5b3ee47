//! Evaluation script store
//!
//! Scripts are opaque byte blobs keyed by script id; the state machine
//! never interprets their contents.

use std::collections::BTreeMap;

use super::StoreError;

/// Complete contents of a script store at one instant
pub type ScriptsImage = BTreeMap<String, Vec<u8>>;

/// Script store contract: mutation, clone and restore
pub trait ScriptStore: Send {
    /// Add a new script; errors if the id is already present
    fn add_script(&mut self, script_id: &str, script: Vec<u8>) -> Result<(), StoreError>;

    /// Replace an existing script; errors if the id is absent
    fn update_script(&mut self, script_id: &str, script: Vec<u8>) -> Result<(), StoreError>;

    /// Remove a script; errors if the id is absent
    fn remove_script(&mut self, script_id: &str) -> Result<(), StoreError>;

    /// Deep copy of the complete store contents
    fn clone_image(&self) -> ScriptsImage;

    /// Replace the complete store contents with the image
    fn restore(&mut self, image: ScriptsImage);
}

/// In-memory script store
#[derive(Debug, Default)]
pub struct MemoryScriptStore {
    scripts: BTreeMap<String, Vec<u8>>,
}

impl MemoryScriptStore {
    /// Create a new empty script store
    pub fn new() -> Self {
        MemoryScriptStore {
            scripts: BTreeMap::new(),
        }
    }

    /// Get a script directly (for read-only queries)
    pub fn get(&self, script_id: &str) -> Option<&[u8]> {
        self.scripts.get(script_id).map(Vec::as_slice)
    }
}

impl ScriptStore for MemoryScriptStore {
    fn add_script(&mut self, script_id: &str, script: Vec<u8>) -> Result<(), StoreError> {
        if self.scripts.contains_key(script_id) {
            return Err(StoreError::AlreadyExists(format!("script {}", script_id)));
        }
        self.scripts.insert(script_id.to_string(), script);
        Ok(())
    }

    fn update_script(&mut self, script_id: &str, script: Vec<u8>) -> Result<(), StoreError> {
        if !self.scripts.contains_key(script_id) {
            return Err(StoreError::NotFound(format!("script {}", script_id)));
        }
        self.scripts.insert(script_id.to_string(), script);
        Ok(())
    }

    fn remove_script(&mut self, script_id: &str) -> Result<(), StoreError> {
        self.scripts
            .remove(script_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("script {}", script_id)))
    }

    fn clone_image(&self) -> ScriptsImage {
        self.scripts.clone()
    }

    fn restore(&mut self, image: ScriptsImage) {
        self.scripts = image;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut store = MemoryScriptStore::new();

        store.add_script("s1", b"let result = 0;".to_vec()).unwrap();
        assert_eq!(store.get("s1").unwrap(), b"let result = 0;");
    }

    #[test]
    fn test_add_duplicate_fails() {
        let mut store = MemoryScriptStore::new();

        store.add_script("s1", vec![1]).unwrap();
        let result = store.add_script("s1", vec![2]);
        assert_eq!(
            result,
            Err(StoreError::AlreadyExists("script s1".to_string()))
        );
        // Original contents are untouched
        assert_eq!(store.get("s1").unwrap(), [1]);
    }

    #[test]
    fn test_update_replaces() {
        let mut store = MemoryScriptStore::new();

        store.add_script("s1", vec![1]).unwrap();
        store.update_script("s1", vec![2]).unwrap();
        assert_eq!(store.get("s1").unwrap(), [2]);
    }

    #[test]
    fn test_update_missing_fails() {
        let mut store = MemoryScriptStore::new();

        let result = store.update_script("s1", vec![1]);
        assert_eq!(result, Err(StoreError::NotFound("script s1".to_string())));
    }

    #[test]
    fn test_remove() {
        let mut store = MemoryScriptStore::new();

        store.add_script("s1", vec![1]).unwrap();
        store.remove_script("s1").unwrap();
        assert!(store.get("s1").is_none());

        let result = store.remove_script("s1");
        assert_eq!(result, Err(StoreError::NotFound("script s1".to_string())));
    }

    #[test]
    fn test_restore_replaces_everything() {
        let mut store = MemoryScriptStore::new();
        store.add_script("old", vec![1]).unwrap();

        let mut image = ScriptsImage::new();
        image.insert("new".to_string(), vec![2]);
        store.restore(image);

        assert!(store.get("old").is_none());
        assert_eq!(store.get("new").unwrap(), [2]);
    }
}
