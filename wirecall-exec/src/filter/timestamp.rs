use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

struct Cached {
    value: String,
    expires_at: Instant,
}

/// Formatted signing timestamp, recomputed at most once per `ttl`.
///
/// Readers share the lock; only the thread that finds the entry stale takes the write side,
/// and it re-checks expiry before refreshing.
pub struct TimestampCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entry: RwLock<Option<Cached>>,
}

impl TimestampCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entry: RwLock::new(None),
        }
    }

    pub fn system(ttl: Duration) -> Self {
        Self::new(ttl, Arc::new(SystemClock))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn current(&self) -> String {
        let now = Instant::now();
        {
            let guard = self.entry.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(c) = guard.as_ref().filter(|c| now < c.expires_at) {
                return c.value.clone();
            }
        }

        let mut guard = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(c) = guard.as_ref().filter(|c| now < c.expires_at) {
            return c.value.clone();
        }
        let value = self.clock.now().format(TIMESTAMP_FORMAT).to_string();
        *guard = Some(Cached {
            value: value.clone(),
            expires_at: now + self.ttl,
        });
        value
    }

    pub fn invalidate(&self) {
        *self.entry.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl fmt::Debug for TimestampCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
