//! Storage Engine
//!
//! In-memory key-value cache with TTL support.

mod entry;
mod reaper;
mod store;

pub use entry::{Entry, Ttl, DEFAULT_EXPIRATION, NO_EXPIRATION};
pub use reaper::{Reaper, Sweep};
pub use store::{ByteCache, Cache};
