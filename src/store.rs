//! Main StreamStore struct tying all components together.

use crate::commands::{Command, Reply};
use crate::read::{read_streams, ReadRequest, StreamEntries};
use crate::stream::StreamRegistry;
use crate::types::{Entry, EntryId, Fields};
use tracing::debug;

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Per-stream result cap used when a request names no count.
    pub default_count: usize,

    /// How far ahead of the current time the `$` sentinel sits for an
    /// empty stream, in milliseconds.
    pub latest_sentinel_offset_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_count: 100,
            latest_sentinel_offset_ms: 3_600_000,
        }
    }
}

/// Store statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub stream_count: usize,
    pub entry_count: usize,
}

/// The in-memory stream store.
///
/// Construct one at startup and share it (usually behind an `Arc`) with
/// every request handler. All state is volatile.
#[derive(Default)]
pub struct StreamStore {
    /// Store configuration.
    config: StoreConfig,

    /// Every stream, by name.
    registry: StreamRegistry,
}

impl StreamStore {
    /// Create an empty store.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            registry: StreamRegistry::new(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // --- Stream Operations ---

    /// Append an entry to `stream`, creating the stream if needed.
    pub fn append(&self, stream: &str, fields: Fields, explicit_ms: Option<u64>) -> EntryId {
        self.registry.get_or_create(stream).append(fields, explicit_ms)
    }

    /// First `count` entries of `stream`. Empty for an unknown stream.
    pub fn range(&self, stream: &str, count: usize) -> Vec<Entry> {
        self.registry
            .get(stream)
            .map(|s| s.range(count))
            .unwrap_or_default()
    }

    /// Entry count of `stream`. Zero for an unknown stream.
    pub fn len(&self, stream: &str) -> usize {
        self.registry.get(stream).map(|s| s.len()).unwrap_or(0)
    }

    /// Entries newer than each request's watermark, at most `count` per stream.
    pub fn read(&self, requests: &[ReadRequest], count: usize) -> Vec<StreamEntries> {
        read_streams(
            &self.registry,
            requests,
            count,
            self.config.latest_sentinel_offset_ms,
        )
    }

    // --- Commands ---

    /// Run a decoded command.
    pub fn execute(&self, command: Command) -> Reply {
        match command {
            Command::Append { stream, fields, ms } => Reply::Added {
                id: self.append(&stream, fields, ms),
            },
            Command::Range { stream, count } => {
                Reply::Entries(self.range(&stream, count.unwrap_or(self.config.default_count)))
            }
            Command::Len { stream } => Reply::Length {
                length: self.len(&stream),
            },
            Command::Read { requests, count } => Reply::Streams(
                self.read(&requests, count.unwrap_or(self.config.default_count)),
            ),
        }
    }

    // --- Lifecycle ---

    /// Remove every stream.
    pub fn clear(&self) {
        self.registry.clear();
    }

    /// Registered stream names, sorted.
    pub fn stream_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Get store statistics.
    pub fn stats(&self) -> StoreStats {
        let streams = self.registry.streams();
        let stats = StoreStats {
            stream_count: streams.len(),
            entry_count: streams.iter().map(|s| s.len()).sum(),
        };
        debug!(?stats, "collected stats");
        stats
    }
}
