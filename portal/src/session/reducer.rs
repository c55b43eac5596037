//! Reducer logic for the session store.
//!
//! Commands validate against the load phase, mutate state in place, and
//! return effects for the artificial delays, persistence, and notification
//! feedback. Malformed persisted identities degrade to the logged-out state;
//! they are never an error.

use crate::session::types::{Identity, SessionAction, SessionError, SessionState};
use marquee_core::{
    SmallVec,
    effect::Effect,
    environment::{Clock, IdGenerator, KeyValueStorage, USER_KEY},
    reducer::Reducer,
    smallvec,
    state::LoadPhase,
};
use std::sync::Arc;
use std::time::Duration;

/// Delay before the restore attempt resolves, emulating a network round trip
const DEFAULT_RESTORE_DELAY: Duration = Duration::from_millis(500);

/// Delay before a login resolves
const DEFAULT_LOGIN_DELAY: Duration = Duration::from_millis(800);

/// Environment dependencies for the session reducer
#[derive(Clone)]
pub struct SessionEnvironment {
    /// Clock for identity timestamps
    pub clock: Arc<dyn Clock>,
    /// Id generator for identity ids
    pub ids: Arc<dyn IdGenerator>,
    /// Durable storage holding the serialized identity under `user`
    pub storage: Arc<dyn KeyValueStorage>,
    /// How long the restore attempt sleeps before resolving
    pub restore_delay: Duration,
    /// How long a login sleeps before resolving
    pub login_delay: Duration,
}

impl SessionEnvironment {
    /// Creates an environment with the default delays
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self {
            clock,
            ids,
            storage,
            restore_delay: DEFAULT_RESTORE_DELAY,
            login_delay: DEFAULT_LOGIN_DELAY,
        }
    }

    /// Override the artificial delays (tests use zero)
    #[must_use]
    pub const fn with_delays(mut self, restore_delay: Duration, login_delay: Duration) -> Self {
        self.restore_delay = restore_delay;
        self.login_delay = login_delay;
        self
    }
}

/// Reducer for the session store
#[derive(Clone, Debug, Default)]
pub struct SessionReducer;

impl SessionReducer {
    /// Creates a new `SessionReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for SessionReducer {
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            SessionAction::Initialize => {
                // Idempotent: only the first call starts the restore
                if state.phase != LoadPhase::Uninitialized {
                    return SmallVec::new();
                }
                state.phase = LoadPhase::Loading;

                let storage = Arc::clone(&env.storage);
                let delay = env.restore_delay;
                smallvec![Effect::Future(Box::pin(async move {
                    tokio::time::sleep(delay).await;
                    let identity = restore_identity(storage.as_ref());
                    Some(SessionAction::RestoreCompleted { identity })
                }))]
            }

            SessionAction::Login { email, password: _ } => {
                if !state.phase.is_ready() {
                    state.last_error = Some(SessionError::NotReady);
                    tracing::debug!("login rejected: session store not ready");
                    return SmallVec::new();
                }
                state.last_error = None;
                state.phase = LoadPhase::Loading;

                let clock = Arc::clone(&env.clock);
                let ids = Arc::clone(&env.ids);
                let storage = Arc::clone(&env.storage);
                let delay = env.login_delay;
                smallvec![Effect::Future(Box::pin(async move {
                    tokio::time::sleep(delay).await;
                    let identity = Identity::new(ids.next_id(), email, clock.now());
                    persist_identity(storage.as_ref(), &identity);
                    Some(SessionAction::LoggedIn { identity })
                }))]
            }

            SessionAction::Logout => {
                // Idempotent: clearing an absent identity and removing an
                // absent key are both no-ops
                state.identity = None;
                state.last_error = None;

                let storage = Arc::clone(&env.storage);
                smallvec![Effect::Future(Box::pin(async move {
                    if let Err(err) = storage.remove(USER_KEY) {
                        tracing::warn!(error = %err, "failed to remove stored identity");
                    }
                    Some(SessionAction::LoggedOut)
                }))]
            }

            // ========== Notification events ==========
            SessionAction::RestoreCompleted { identity } => {
                // Only the in-flight restore may complete; a stray completion
                // after the store is ready must not clobber a later login
                if state.phase.is_loading() {
                    state.identity = identity;
                    state.phase = LoadPhase::Ready;
                }
                SmallVec::new()
            }

            SessionAction::LoggedIn { identity } => {
                // Prior identity (if any) is overwritten, not merged
                state.identity = Some(identity);
                state.phase = LoadPhase::Ready;
                state.last_error = None;
                SmallVec::new()
            }

            SessionAction::LoggedOut => {
                // Already applied during command processing; carried for
                // observers
                SmallVec::new()
            }
        }
    }
}

/// Read and parse the persisted identity; anything malformed degrades to
/// logged-out
fn restore_identity(storage: &dyn KeyValueStorage) -> Option<Identity> {
    let raw = match storage.get(USER_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read stored identity");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(identity) => Some(identity),
        Err(err) => {
            tracing::debug!(error = %err, "stored identity failed to parse, treating as absent");
            None
        }
    }
}

/// Persist the identity, logging (not propagating) failures
fn persist_identity(storage: &dyn KeyValueStorage, identity: &Identity) {
    match serde_json::to_string(identity) {
        Ok(json) => {
            if let Err(err) = storage.set(USER_KEY, &json) {
                tracing::warn!(error = %err, "failed to persist identity");
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to serialize identity");
        }
    }
}
