//! Streams and the registry that owns them.
//!
//! Two lock tiers exist:
//! - the registry's structural lock, held only while looking up or
//!   inserting a stream
//! - each stream's content lock, held while appending or copying entries
//!
//! The structural lock is never held while a content lock is taken, and
//! no lock is held across a caller boundary. Any operation that needs
//! several content locks at once must take them sorted by stream name
//! (see [`crate::read`]).

mod log;
mod registry;

pub use log::StreamLog;
pub use registry::StreamRegistry;
