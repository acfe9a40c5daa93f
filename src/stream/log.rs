//! Append-only stream log.

use crate::types::{now_ms, Entry, EntryId, Fields};
use parking_lot::{Mutex, MutexGuard};
use tracing::trace;

/// A named, append-only sequence of entries guarded by a content lock.
pub struct StreamLog {
    /// Stream name (key in the registry).
    name: String,

    /// Entries in append order. Never reordered or removed.
    entries: Mutex<Vec<Entry>>,
}

impl StreamLog {
    /// Create an empty stream.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append an entry and return its id.
    ///
    /// The id uses `explicit_ms` when given, otherwise the current wall-clock
    /// millisecond. The sequence part is the entry count at the moment of the
    /// append, so ids within one stream never repeat.
    pub fn append(&self, fields: Fields, explicit_ms: Option<u64>) -> EntryId {
        let mut entries = self.entries.lock();

        let id = assign_id(&entries, explicit_ms);
        entries.push(Entry { id, fields });

        trace!(stream = %self.name, %id, "appended entry");
        id
    }

    /// Current entry count.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the first `min(count, len)` entries, oldest first.
    pub fn range(&self, count: usize) -> Vec<Entry> {
        let entries = self.entries.lock();
        entries[..count.min(entries.len())].to_vec()
    }

    /// Id of the most recent entry.
    pub fn last_id(&self) -> Option<EntryId> {
        self.entries.lock().last().map(|e| e.id)
    }

    /// Take the content lock.
    ///
    /// Callers holding more than one of these must have acquired them in
    /// ascending stream-name order.
    pub(crate) fn lock_entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock()
    }
}

/// Assign the id for the next entry. Must be called with the content lock held.
fn assign_id(entries: &[Entry], explicit_ms: Option<u64>) -> EntryId {
    let ms = explicit_ms.unwrap_or_else(now_ms);
    EntryId::new(ms, entries.len() as u64)
}
