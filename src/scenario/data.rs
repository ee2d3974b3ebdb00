//! String-keyed scenario-scoped value storage.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Arbitrary scenario-scoped data keyed by case-sensitive strings.
///
/// Keys are not namespaced and the last write wins. Reading an unset key
/// yields `None`; values never leak between scenario instances because each
/// [`ScenarioContext`](crate::scenario::ScenarioContext) owns its own bag.
#[derive(Debug, Default)]
pub struct ScenarioData {
    entries: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl ScenarioData {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Arc::new(value));
    }

    /// Returns the value stored under `key` when it has type `T`.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.entries
            .get(key)
            .and_then(|value| Arc::clone(value).downcast::<T>().ok())
    }

    /// Whether any value is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes the value stored under `key`, reporting whether one existed.
    #[must_use]
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
