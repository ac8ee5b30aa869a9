// Time Provider Port (for testability)
// Retry pacing goes through this seam so tests observe delays instead of
// actually sleeping.

use async_trait::async_trait;

/// Time provider interface (allows mocking in tests)
#[async_trait]
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;

    /// Suspend the current task for `ms` milliseconds
    async fn sleep_ms(&self, ms: i64);
}

/// System time provider (production)
pub struct SystemTimeProvider;

#[async_trait]
impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    async fn sleep_ms(&self, ms: i64) {
        if ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(ms as u64)).await;
        }
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    /// Mock time provider: `sleep_ms` records the requested delay and
    /// advances a virtual clock instead of sleeping.
    pub struct MockTimeProvider {
        now: AtomicI64,
        sleeps: Mutex<Vec<i64>>,
    }

    impl MockTimeProvider {
        pub fn new(start_millis: i64) -> Self {
            Self {
                now: AtomicI64::new(start_millis),
                sleeps: Mutex::new(Vec::new()),
            }
        }

        /// Delays requested so far, in order.
        pub fn recorded_sleeps(&self) -> Vec<i64> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    impl Default for MockTimeProvider {
        fn default() -> Self {
            Self::new(1_000)
        }
    }

    #[async_trait]
    impl TimeProvider for MockTimeProvider {
        fn now_millis(&self) -> i64 {
            self.now.load(Ordering::SeqCst)
        }

        async fn sleep_ms(&self, ms: i64) {
            self.sleeps.lock().unwrap().push(ms);
            self.now.fetch_add(ms.max(0), Ordering::SeqCst);
        }
    }
}
