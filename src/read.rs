//! Multi-stream reads.
//!
//! A read resolves every requested stream, takes all of their content locks
//! in ascending name order, copies each stream's entries, releases the locks,
//! and only then filters the copies against the caller's watermarks.
//!
//! The fixed acquisition order is what keeps concurrent reads from
//! deadlocking: two reads that share streams always take the shared locks
//! in the same relative order, whatever order their callers listed them in.

use crate::error::{Result, StreamError};
use crate::stream::StreamRegistry;
use crate::types::{now_ms, Entry, EntryId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Token asking for entries newer than the stream's current last entry.
pub const LATEST_TOKEN: &str = "$";

/// Exclusive lower bound for a read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Watermark {
    /// Only entries appended after the read's snapshot (`$`).
    Latest,
    /// Entries with an id strictly greater than this one.
    After(EntryId),
}

impl FromStr for Watermark {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self> {
        if s == LATEST_TOKEN {
            Ok(Watermark::Latest)
        } else {
            s.parse().map(Watermark::After)
        }
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Watermark::Latest => f.write_str(LATEST_TOKEN),
            Watermark::After(id) => write!(f, "{}", id),
        }
    }
}

/// One `(stream, watermark)` pair of a read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadRequest {
    pub stream: String,
    pub watermark: Watermark,
}

impl ReadRequest {
    pub fn new(stream: impl Into<String>, watermark: Watermark) -> Self {
        Self {
            stream: stream.into(),
            watermark,
        }
    }

    /// Pair stream names with watermark ids positionally.
    ///
    /// Fails if the two lists differ in length or any id is malformed.
    pub fn pair<S: AsRef<str>, I: AsRef<str>>(names: &[S], ids: &[I]) -> Result<Vec<Self>> {
        if names.len() != ids.len() {
            return Err(StreamError::UnpairedStreams {
                tokens: names.len() + ids.len(),
            });
        }

        names
            .iter()
            .zip(ids)
            .map(|(name, id)| -> Result<Self> {
                Ok(ReadRequest::new(name.as_ref(), id.as_ref().parse()?))
            })
            .collect()
    }
}

/// Entries read from one stream. Serializes as `[stream, [entry, ...]]`.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamEntries {
    pub stream: String,
    pub entries: Vec<Entry>,
}

impl Serialize for StreamEntries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (&self.stream, &self.entries).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StreamEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let (stream, entries) = <(String, Vec<Entry>)>::deserialize(deserializer)?;
        Ok(Self { stream, entries })
    }
}

/// Point-in-time copy of one stream.
struct Snapshot {
    entries: Vec<Entry>,
    /// What `$` resolves to: the largest id present, not the last appended,
    /// since explicit timestamps may go backwards.
    latest: EntryId,
}

/// Read entries newer than each request's watermark, at most `count` per stream.
///
/// Streams missing from the registry are skipped. Streams with nothing new
/// are omitted. Output follows request order.
pub(crate) fn read_streams(
    registry: &StreamRegistry,
    requests: &[ReadRequest],
    count: usize,
    sentinel_offset_ms: u64,
) -> Vec<StreamEntries> {
    let snapshots = snapshot_streams(registry, requests, sentinel_offset_ms);

    requests
        .iter()
        .filter_map(|request| {
            let snapshot = snapshots.get(request.stream.as_str())?;
            let after = match request.watermark {
                Watermark::Latest => snapshot.latest,
                Watermark::After(id) => id,
            };

            let entries: Vec<Entry> = snapshot
                .entries
                .iter()
                .filter(|e| e.id > after)
                .take(count)
                .cloned()
                .collect();

            (!entries.is_empty()).then(|| StreamEntries {
                stream: request.stream.clone(),
                entries,
            })
        })
        .collect()
}

/// Copy every requested stream while holding all of their content locks.
fn snapshot_streams<'a>(
    registry: &StreamRegistry,
    requests: &'a [ReadRequest],
    sentinel_offset_ms: u64,
) -> HashMap<&'a str, Snapshot> {
    // BTreeSet yields names in ascending order: the global lock order.
    let names: BTreeSet<&str> = requests.iter().map(|r| r.stream.as_str()).collect();
    let streams: Vec<(&str, _)> = names
        .into_iter()
        .filter_map(|name| registry.get(name).map(|stream| (name, stream)))
        .collect();

    // Guards release on every exit path, including unwinding.
    let guards: Vec<_> = streams
        .iter()
        .map(|(name, stream)| (*name, stream.lock_entries()))
        .collect();

    // Above any id an append could produce during this read.
    let sentinel = EntryId::new(now_ms().saturating_add(sentinel_offset_ms), 0);

    let snapshots: HashMap<&str, Snapshot> = guards
        .iter()
        .map(|(name, entries)| {
            let latest = entries.iter().map(|e| e.id).max().unwrap_or(sentinel);
            (
                *name,
                Snapshot {
                    entries: entries.to_vec(),
                    latest,
                },
            )
        })
        .collect();

    debug!(streams = requests.len(), locked = guards.len(), "snapshotted streams");
    drop(guards);

    snapshots
}
