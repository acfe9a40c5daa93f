//! Name to stream mapping.

use super::StreamLog;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Owns every stream, keyed by name.
///
/// At most one [`StreamLog`] exists per name, even when several callers race
/// to create the same unseen stream.
#[derive(Default)]
pub struct StreamRegistry {
    /// Structural lock: guards insertion, never entry mutation.
    streams: RwLock<HashMap<String, Arc<StreamLog>>>,
}

impl StreamRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stream for `name`, creating and registering it if absent.
    pub fn get_or_create(&self, name: &str) -> Arc<StreamLog> {
        if let Some(stream) = self.get(name) {
            return stream;
        }

        let mut streams = self.streams.write();
        let stream = streams.entry(name.to_string()).or_insert_with(|| {
            debug!(stream = name, "created stream");
            Arc::new(StreamLog::new(name))
        });
        Arc::clone(stream)
    }

    /// Look up a stream without creating it.
    pub fn get(&self, name: &str) -> Option<Arc<StreamLog>> {
        self.streams.read().get(name).cloned()
    }

    /// Drop every stream.
    ///
    /// Handles already returned stay usable but are no longer reachable by name.
    pub fn clear(&self) {
        let mut streams = self.streams.write();
        debug!(streams = streams.len(), "cleared registry");
        streams.clear();
    }

    /// Number of registered streams.
    pub fn len(&self) -> usize {
        self.streams.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered stream names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.streams.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Snapshot of every registered stream handle.
    pub(crate) fn streams(&self) -> Vec<Arc<StreamLog>> {
        self.streams.read().values().cloned().collect()
    }
}
