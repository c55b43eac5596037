//! # Marquee Core
//!
//! Core traits and types for the Marquee booking portal architecture.
//!
//! This crate provides the fundamental abstractions the two application
//! stores (session, catalog) are built from:
//!
//! - **State**: Domain state for a feature, plus the shared load-phase
//!   state machine every store goes through on startup
//! - **Action**: All possible inputs to a reducer (commands and the
//!   notification events fed back by effects)
//! - **Reducer**: Pure function `(State, Action, Environment) → Effects`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O)
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```ignore
//! use marquee_core::*;
//!
//! impl Reducer for CatalogReducer {
//!     type State = CatalogState;
//!     type Action = CatalogAction;
//!     type Environment = CatalogEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CatalogState,
//!         action: CatalogAction,
//!         env: &CatalogEnvironment,
//!     ) -> SmallVec<[Effect<CatalogAction>; 4]> {
//!         // Business logic goes here
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// State module - shared state types for the application stores
pub mod state {
    /// Startup lifecycle of a store: `Uninitialized → Loading → Ready`.
    ///
    /// Both application stores model their "loading" flag as this explicit
    /// three-state machine instead of independent booleans. Mutating
    /// operations require [`LoadPhase::Ready`]; reducers reject anything
    /// earlier with their `NotReady` error. Persistence effects are only
    /// constructed in `Ready`-gated reducer arms, so durable state can never
    /// be overwritten while the initial load is still in flight.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum LoadPhase {
        /// No load has been requested yet
        #[default]
        Uninitialized,

        /// The initial (or an in-flight) load effect is running
        Loading,

        /// Loaded; operations are meaningful from here on
        Ready,
    }

    impl LoadPhase {
        /// Check whether the store has finished loading
        #[must_use]
        pub const fn is_ready(self) -> bool {
            matches!(self, Self::Ready)
        }

        /// Check whether a load effect is currently in flight
        #[must_use]
        pub const fn is_loading(self) -> bool {
            matches!(self, Self::Loading)
        }
    }

    impl std::fmt::Display for LoadPhase {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Uninitialized => write!(f, "uninitialized"),
                Self::Loading => write!(f, "loading"),
                Self::Ready => write!(f, "ready"),
            }
        }
    }
}

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → Effects`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for SessionReducer {
    ///     type State = SessionState;
    ///     type Action = SessionAction;
    ///     type Environment = SessionEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut SessionState,
    ///         action: SessionAction,
    ///         env: &SessionEnvironment,
    ///     ) -> SmallVec<[Effect<SessionAction>; 4]> {
    ///         match action {
    ///             SessionAction::Logout => {
    ///                 state.identity = None;
    ///                 SmallVec::new()
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// A vector of effects to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what
    /// should happen, returned from reducers and executed by the Store
    /// runtime. The artificial startup and login delays of the portal are
    /// `Future` effects that sleep before producing their feedback action.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    #[allow(missing_docs)]
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (for timeouts, retries)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into
        /// the reducer and broadcast to store observers
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Wrap an already-computed feedback action in a `Future` effect
        ///
        /// The action is fed back into the reducer and broadcast to
        /// observers as soon as the effect is executed. Reducers use this to
        /// emit notification events after a successful mutation.
        #[must_use]
        pub fn emit(action: Action) -> Effect<Action>
        where
            Action: Send + 'static,
        {
            Effect::Future(Box::pin(async move { Some(action) }))
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter. Production implementations live next to
/// the traits; deterministic test doubles live in `marquee-testing`.
pub mod environment {
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};
    use thiserror::Error;

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use marquee_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let now = clock.now();
    /// assert!(now.timestamp() > 0);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// `IdGenerator` trait - abstracts id generation for aggregates
    ///
    /// Identity ids and admin-created event ids both come from here. Every
    /// call must return an id strictly greater than any previous one from
    /// the same generator, so ids are unique for the life of the process.
    pub trait IdGenerator: Send + Sync {
        /// Produce the next unique id
        fn next_id(&self) -> u64;
    }

    /// Production id generator: wall-clock milliseconds with a monotonic
    /// guard
    ///
    /// Returns the current Unix time in milliseconds, bumped past the
    /// previously issued id when two calls land on the same millisecond.
    #[derive(Debug, Default)]
    pub struct SystemIdGenerator {
        last: AtomicU64,
    }

    impl SystemIdGenerator {
        /// Create a new generator
        #[must_use]
        pub const fn new() -> Self {
            Self {
                last: AtomicU64::new(0),
            }
        }
    }

    impl IdGenerator for SystemIdGenerator {
        fn next_id(&self) -> u64 {
            let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
            let mut prev = self.last.load(Ordering::Relaxed);
            loop {
                let next = now.max(prev + 1);
                match self.last.compare_exchange_weak(
                    prev,
                    next,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => return next,
                    Err(observed) => prev = observed,
                }
            }
        }
    }

    /// Errors from the durable key-value storage
    ///
    /// Storage failures are recoverable: callers log them and carry on,
    /// since local persistence is best-effort and not a source of truth.
    #[derive(Error, Debug)]
    pub enum StorageError {
        /// Key contains characters that are not storage-safe
        #[error("storage key {0:?} contains characters outside [A-Za-z0-9._-]")]
        InvalidKey(String),

        /// Underlying I/O failed
        #[error("storage I/O failed: {0}")]
        Io(#[from] std::io::Error),
    }

    /// Durable local key-value storage, string keys to string values
    ///
    /// The process-external persistence boundary of the portal: the session
    /// store keeps the serialized identity under `user`, the catalog store
    /// keeps the booking ledger under `bookings`. Values survive restarts;
    /// absent keys read as `None`.
    pub trait KeyValueStorage: Send + Sync {
        /// Read the value stored under `key`, if any
        ///
        /// # Errors
        ///
        /// Returns [`StorageError`] if the key is invalid or the read fails.
        fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

        /// Store `value` under `key`, replacing any previous value
        ///
        /// # Errors
        ///
        /// Returns [`StorageError`] if the key is invalid or the write fails.
        fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

        /// Remove the value stored under `key`; removing an absent key is a
        /// no-op
        ///
        /// # Errors
        ///
        /// Returns [`StorageError`] if the key is invalid or the removal
        /// fails.
        fn remove(&self, key: &str) -> Result<(), StorageError>;
    }

    /// Storage key for the serialized session identity
    pub const USER_KEY: &str = "user";

    /// Storage key for the serialized booking ledger
    pub const BOOKINGS_KEY: &str = "bookings";
}
