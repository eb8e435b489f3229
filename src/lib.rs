//! TTLCACHE - In-Process Key-Value Cache with Expiration
//!
//! A thread-safe map-like store where every entry carries its own
//! time-to-live. Expired entries are hidden from lookups immediately and
//! removed physically by an optional background reaper.
//!
//! ```no_run
//! use std::time::Duration;
//! use ttlcache::{Cache, NO_EXPIRATION};
//!
//! let cache = Cache::new(Duration::from_secs(60), Duration::from_secs(10));
//! cache.set("session", 42, Duration::from_secs(5));
//! cache.set("config", 7, NO_EXPIRATION);
//! assert_eq!(cache.get("session"), Some(42));
//! cache.close();
//! ```

pub mod config;
pub mod error;
pub mod storage;

pub use config::Config;
pub use error::{CacheError, Result};
pub use storage::{
    ByteCache, Cache, Entry, Reaper, Sweep, Ttl, DEFAULT_EXPIRATION, NO_EXPIRATION,
};
