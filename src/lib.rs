//! # Stream Log
//!
//! An in-memory, append-only stream store: named logs of field maps with
//! time-based ids, range and length queries, and non-blocking reads across
//! several streams at once.
//!
//! ## Core Concepts
//!
//! - **Entries**: Immutable `(id, fields)` records with `<ms>-<seq>` ids
//! - **Streams**: Append-only entry logs, each guarded by its own lock
//! - **Registry**: Name to stream mapping, creating streams on first append
//! - **Reads**: Consistent multi-stream snapshots filtered by watermark ids
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use streamlog::{ReadRequest, StreamStore};
//!
//! let store = StreamStore::default();
//!
//! let fields = serde_json::from_value(json!({"rider": "Castilla"})).unwrap();
//! let id = store.append("race", fields, Some(1000));
//! assert_eq!(id.to_string(), "1000-0");
//! assert_eq!(store.len("race"), 1);
//!
//! let requests = ReadRequest::pair(&["race"], &["0-0"]).unwrap();
//! let result = store.read(&requests, 10);
//! assert_eq!(result[0].entries[0].id, id);
//! ```

pub mod commands;
pub mod error;
pub mod read;
pub mod store;
pub mod stream;
pub mod types;

// Re-exports
pub use commands::{Command, Reply};
pub use error::{Result, StreamError};
pub use read::{ReadRequest, StreamEntries, Watermark, LATEST_TOKEN};
pub use store::{StoreConfig, StoreStats, StreamStore};
pub use stream::{StreamLog, StreamRegistry};
pub use types::{now_ms, Entry, EntryId, Fields};
