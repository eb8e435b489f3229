//! Cache Entries
//!
//! Stored values with creation time and expiration metadata.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Expiration requested for a `set`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Use the cache's configured default TTL
    Default,
    /// Never expire
    Never,
    /// Expire after the given duration
    After(Duration),
}

/// Use the cache's default expiration
pub const DEFAULT_EXPIRATION: Ttl = Ttl::Default;

/// Never expire
pub const NO_EXPIRATION: Ttl = Ttl::Never;

impl From<Duration> for Ttl {
    fn from(ttl: Duration) -> Self {
        if ttl.is_zero() {
            Ttl::Default
        } else {
            Ttl::After(ttl)
        }
    }
}

impl Ttl {
    /// Resolve against a default TTL; `None` means the entry never expires.
    pub(crate) fn resolve(self, default_ttl: Duration) -> Option<Duration> {
        let ttl = match self {
            Ttl::Never => return None,
            Ttl::Default => default_ttl,
            Ttl::After(d) if d.is_zero() => default_ttl,
            Ttl::After(d) => d,
        };
        (!ttl.is_zero()).then_some(ttl)
    }
}

/// Entry in the cache with value and expiration
#[derive(Debug, Clone)]
pub struct Entry<V> {
    value: V,
    created: DateTime<Utc>,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    /// Create an entry that expires `ttl` from now, or never for `None`.
    ///
    /// Unlike `Cache::set`, there is no default to fall back on here:
    /// `Some(Duration::ZERO)` is an entry that is already expired. A TTL too
    /// large to represent as an `Instant` never expires.
    pub fn new(value: V, ttl: Option<Duration>) -> Self {
        Self {
            value,
            created: Utc::now(),
            expires_at: ttl.and_then(|d| Instant::now().checked_add(d)),
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    /// Wall-clock time the entry was inserted
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub(crate) fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.map(|t| now > t).unwrap_or(false)
    }

    /// Time left before expiry; `None` if the entry never expires or already has
    pub fn ttl_remaining(&self) -> Option<Duration> {
        let now = Instant::now();
        self.expires_at
            .filter(|t| now <= *t)
            .map(|t| t.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_ttl_from_duration() {
        assert_eq!(Ttl::from(Duration::ZERO), Ttl::Default);
        assert_eq!(
            Ttl::from(Duration::from_secs(3)),
            Ttl::After(Duration::from_secs(3))
        );
    }

    #[test]
    fn test_ttl_resolution() {
        let default = Duration::from_secs(10);

        assert_eq!(Ttl::Default.resolve(default), Some(default));
        assert_eq!(Ttl::After(Duration::ZERO).resolve(default), Some(default));
        assert_eq!(Ttl::Never.resolve(default), None);
        assert_eq!(
            Ttl::After(Duration::from_secs(1)).resolve(default),
            Some(Duration::from_secs(1))
        );

        // Zero default means no expiration
        assert_eq!(Ttl::Default.resolve(Duration::ZERO), None);
        assert_eq!(NO_EXPIRATION.resolve(Duration::ZERO), None);
        assert_eq!(DEFAULT_EXPIRATION, Ttl::Default);
    }

    #[test]
    fn test_never_expiring_entry() {
        let entry = Entry::new("value", None);
        assert!(entry.expires_at().is_none());
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining().is_none());
        assert!(entry.created() <= Utc::now());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = Entry::new(42, Some(Duration::from_millis(20)));
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining().is_some());

        thread::sleep(Duration::from_millis(40));
        assert!(entry.is_expired());
        assert!(entry.ttl_remaining().is_none());
        assert_eq!(entry.into_value(), 42);
    }

    #[test]
    fn test_zero_ttl_entry_is_expired() {
        let entry = Entry::new("seed", Some(Duration::ZERO));
        assert!(entry.expires_at().is_some());

        thread::sleep(Duration::from_millis(2));
        assert!(entry.is_expired());
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let entry = Entry::new("v", Some(Duration::MAX));
        assert!(entry.expires_at().is_none());
        assert!(!entry.is_expired());
    }
}
