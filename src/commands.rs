//! Transport-neutral request decoding and reply shapes.
//!
//! A transport hands the raw request parameters to the `Command`
//! constructors, which validate them before the store is touched, then
//! serializes the [`Reply`] returned by [`StreamStore::execute`].
//!
//! [`StreamStore::execute`]: crate::StreamStore::execute

use crate::error::{Result, StreamError};
use crate::read::{ReadRequest, StreamEntries};
use crate::types::{Entry, EntryId, Fields};
use serde::Serialize;

/// A validated request.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Append `fields` to `stream`.
    Append {
        stream: String,
        fields: Fields,
        ms: Option<u64>,
    },

    /// First `count` entries of `stream`. `None` uses the configured default.
    Range {
        stream: String,
        count: Option<usize>,
    },

    /// Entry count of `stream`.
    Len { stream: String },

    /// Entries newer than each watermark.
    Read {
        requests: Vec<ReadRequest>,
        count: Option<usize>,
    },
}

impl Command {
    /// Decode an append.
    ///
    /// `body` is a JSON object of fields; an empty body means no fields.
    /// A blank `ms` falls back to the wall clock.
    pub fn append(stream: impl Into<String>, body: &[u8], ms: Option<&str>) -> Result<Self> {
        Ok(Command::Append {
            stream: stream.into(),
            fields: parse_fields(body)?,
            ms: parse_timestamp(ms)?,
        })
    }

    /// Decode a range. `start` and `end` bounds are not supported.
    pub fn range(stream: impl Into<String>, count: Option<&str>) -> Result<Self> {
        Ok(Command::Range {
            stream: stream.into(),
            count: parse_count(count)?,
        })
    }

    pub fn len(stream: impl Into<String>) -> Self {
        Command::Len {
            stream: stream.into(),
        }
    }

    /// Decode a read from a `"name id name id ..."` parameter.
    pub fn read(streams: Option<&str>, count: Option<&str>) -> Result<Self> {
        let tokens: Vec<&str> = streams.unwrap_or_default().split_whitespace().collect();
        if tokens.is_empty() {
            return Err(StreamError::MissingStreams);
        }
        if tokens.len() % 2 != 0 {
            return Err(StreamError::UnpairedStreams {
                tokens: tokens.len(),
            });
        }

        let requests = tokens
            .chunks_exact(2)
            .map(|pair| -> Result<ReadRequest> {
                Ok(ReadRequest::new(pair[0], pair[1].parse()?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Command::Read {
            requests,
            count: parse_count(count)?,
        })
    }
}

/// Result of executing a [`Command`], serializable in the wire shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// `{"id": "<ms>-<seq>"}`
    Added { id: EntryId },
    /// `[entry, ...]`
    Entries(Vec<Entry>),
    /// `{"length": n}`
    Length { length: usize },
    /// `[[stream, [entry, ...]], ...]`
    Streams(Vec<StreamEntries>),
}

fn parse_fields(body: &[u8]) -> Result<Fields> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Fields::new());
    }

    match serde_json::from_slice::<serde_json::Value>(body)? {
        serde_json::Value::Object(fields) => Ok(fields),
        serde_json::Value::Null => Ok(Fields::new()),
        other => Err(StreamError::InvalidFields(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

fn parse_timestamp(ms: Option<&str>) -> Result<Option<u64>> {
    match ms.map(str::trim) {
        None | Some("") => Ok(None),
        Some(ms) => ms
            .parse()
            .map(Some)
            .map_err(|_| StreamError::InvalidTimestamp(ms.to_string())),
    }
}

fn parse_count(count: Option<&str>) -> Result<Option<usize>> {
    count
        .map(|c| {
            c.trim()
                .parse()
                .map_err(|_| StreamError::InvalidCount(c.to_string()))
        })
        .transpose()
}
