//! Time source for the engine.
//!
//! All timestamps are unix seconds. The engine never calls
//! `Utc::now()` directly; it goes through this seam so expiry logic
//! can be driven deterministically in tests.

use std::sync::Arc;

/// Provides the current time as unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Shared handle used by every engine component.
pub type SharedClock = Arc<dyn Clock>;

pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}

#[cfg(test)]
pub mod test_support {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::Clock;

    /// Manually advanced clock for expiry-boundary tests.
    pub struct ManualClock(AtomicI64);

    impl ManualClock {
        pub fn at(start: i64) -> Arc<Self> {
            Arc::new(Self(AtomicI64::new(start)))
        }

        pub fn advance(&self, secs: i64) {
            self.0.fetch_add(secs, Ordering::SeqCst);
        }

        pub fn set(&self, secs: i64) {
            self.0.store(secs, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }
}
