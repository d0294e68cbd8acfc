use std::sync::Arc;
use tracing::debug;

/// Single-entry memo keyed by content digest.
///
/// Holds the value computed for the most recent key. Asking for the same key
/// returns the stored value; a different key replaces it.
#[derive(Debug)]
pub struct ContentSlot<T> {
    name: &'static str,
    entry: Option<(String, Arc<T>)>,
}

impl<T> ContentSlot<T> {
    pub fn new(name: &'static str) -> Self {
        Self { name, entry: None }
    }

    /// Returns the cached value and `true` on a hit, or computes, stores and
    /// returns it with `false`
    pub fn get_or_compute<F>(&mut self, key: &str, compute: F) -> (Arc<T>, bool)
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get(key) {
            debug!(slot = self.name, key, "Content cache hit");
            return (value, true);
        }

        debug!(slot = self.name, key, "Content cache miss");
        let value = Arc::new(compute());
        self.entry = Some((key.to_string(), Arc::clone(&value)));
        (value, false)
    }

    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.entry
            .as_ref()
            .filter(|(stored, _)| stored == key)
            .map(|(_, value)| Arc::clone(value))
    }
}
