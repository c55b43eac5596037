//! # Marquee Testing
//!
//! Testing utilities and helpers for the Marquee booking portal.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (deterministic clock, id
//!   generator, and in-memory durable storage)
//! - The [`ReducerTest`] Given-When-Then harness and effect assertions
//!
//! ## Example
//!
//! ```ignore
//! use marquee_testing::{test_clock, test_ids, test_storage};
//!
//! #[tokio::test]
//! async fn test_booking_flow() {
//!     let storage = test_storage();
//!     let env = CatalogEnvironment::new(
//!         Arc::new(test_clock()),
//!         Arc::new(test_ids(1000)),
//!         Arc::new(storage.clone()),
//!     );
//!     // ... drive a Store and assert on storage.value("bookings")
//! }
//! ```

use chrono::{DateTime, Utc};
use marquee_core::environment::{Clock, IdGenerator, KeyValueStorage, StorageError};


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, KeyValueStorage, StorageError, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use marquee_testing::mocks::FixedClock;
    /// use marquee_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Sequential id generator for predictable ids in tests
    ///
    /// Issues `start`, `start + 1`, `start + 2`, … — strictly monotonic
    /// like the production generator, but deterministic.
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Create a generator whose first id is `start`
        #[must_use]
        pub const fn starting_at(start: u64) -> Self {
            Self {
                next: AtomicU64::new(start),
            }
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::starting_at(1)
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> u64 {
            self.next.fetch_add(1, Ordering::Relaxed)
        }
    }

    /// Create a sequential id generator starting at `start`
    #[must_use]
    pub const fn test_ids(start: u64) -> SequentialIdGenerator {
        SequentialIdGenerator::starting_at(start)
    }

    /// In-memory durable storage for tests
    ///
    /// A `HashMap` behind a mutex, shared across clones so a test can keep
    /// one handle for assertions while the environment owns another.
    #[derive(Debug, Clone, Default)]
    pub struct MemoryStorage {
        entries: Arc<Mutex<HashMap<String, String>>>,
    }

    impl MemoryStorage {
        /// Create an empty storage
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a storage pre-populated with the given entries
        #[must_use]
        pub fn with_entries<I, K, V>(entries: I) -> Self
        where
            I: IntoIterator<Item = (K, V)>,
            K: Into<String>,
            V: Into<String>,
        {
            let storage = Self::new();
            {
                let mut map = storage.lock_entries();
                for (key, value) in entries {
                    map.insert(key.into(), value.into());
                }
            }
            storage
        }

        /// Read the value currently stored under `key`, if any
        #[must_use]
        pub fn value(&self, key: &str) -> Option<String> {
            self.lock_entries().get(key).cloned()
        }

        /// Number of stored entries
        #[must_use]
        pub fn len(&self) -> usize {
            self.lock_entries().len()
        }

        /// Whether the storage holds no entries
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.lock_entries().is_empty()
        }

        fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
            // A poisoned map is still a valid map for test purposes
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl KeyValueStorage for MemoryStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.lock_entries().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.lock_entries()
                .insert(key.to_owned(), value.to_owned());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.lock_entries().remove(key);
            Ok(())
        }
    }

    /// Create an empty in-memory storage
    #[must_use]
    pub fn test_storage() -> MemoryStorage {
        MemoryStorage::new()
    }
}

// Re-export commonly used items
pub use mocks::{
    FixedClock, MemoryStorage, SequentialIdGenerator, test_clock, test_ids, test_storage,
};
pub use reducer_test::{ReducerTest, assertions};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn test_sequential_ids() {
        let ids = test_ids(100);
        assert_eq!(ids.next_id(), 100);
        assert_eq!(ids.next_id(), 101);
        assert_eq!(ids.next_id(), 102);
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = test_storage();
        assert!(storage.is_empty());

        assert!(storage.set("user", "{}").is_ok());
        assert_eq!(storage.value("user").as_deref(), Some("{}"));
        assert_eq!(storage.len(), 1);

        assert!(storage.remove("user").is_ok());
        assert!(storage.value("user").is_none());

        // Removing an absent key is a no-op
        assert!(storage.remove("user").is_ok());
    }

    #[test]
    fn test_memory_storage_shared_across_clones() {
        let storage = test_storage();
        let handle = storage.clone();

        assert!(storage.set("bookings", "[1,2]").is_ok());
        assert_eq!(handle.value("bookings").as_deref(), Some("[1,2]"));
    }
}
