use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Document store the tracker reads from and writes back to.
pub trait CycleStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the whole document.
    fn set(&self, key: &str, document: Value) -> Result<(), StoreError>;

    /// Merge `patch` into the stored document, creating it if missing.
    fn merge(&self, key: &str, patch: Value) -> Result<(), StoreError>;
}

/// Objects merge key by key; anything else is replaced.
pub fn merge_value(target: &mut Value, patch: Value) {
    match patch {
        Value::Object(patch) if target.is_object() => {
            if let Some(target) = target.as_object_mut() {
                for (key, value) in patch {
                    merge_value(target.entry(key).or_insert(Value::Null), value);
                }
            }
        }
        patch => *target = patch,
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Value>>, StoreError> {
        self.documents
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl CycleStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.documents()?.get(key).cloned())
    }

    fn set(&self, key: &str, document: Value) -> Result<(), StoreError> {
        self.documents()?.insert(key.to_string(), document);
        Ok(())
    }

    fn merge(&self, key: &str, patch: Value) -> Result<(), StoreError> {
        let mut documents = self.documents()?;
        let doc = documents
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Default::default()));
        merge_value(doc, patch);
        Ok(())
    }
}
