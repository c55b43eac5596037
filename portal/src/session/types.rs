//! Domain types for the session store.

use chrono::{DateTime, Utc};
use marquee_core::state::LoadPhase;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The authenticated user record held by the session store
///
/// Created on successful login, destroyed on logout. The serialized form is
/// what lands in durable storage under the `user` key; field names are
/// camelCase there (`isAdmin`, `createdAt`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Unique id, issued at login time
    pub id: u64,
    /// The email the user logged in with, verbatim
    pub email: String,
    /// Display name, derived from the email
    pub name: String,
    /// Admin capability, derived from the email
    pub is_admin: bool,
    /// When this identity was created
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Build an identity from its login inputs, deriving name and admin flag
    #[must_use]
    pub fn new(id: u64, email: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        let email = email.into();
        let name = Self::display_name(&email).to_owned();
        let is_admin = Self::is_admin_email(&email);
        Self {
            id,
            email,
            name,
            is_admin,
            created_at,
        }
    }

    /// Display name for an email: everything before the `@`, or the whole
    /// string when there is none
    #[must_use]
    pub fn display_name(email: &str) -> &str {
        email.split('@').next().unwrap_or(email)
    }

    /// The admin rule: any address containing `admin`, case-insensitively
    ///
    /// A pure function of the email — recomputing it must always agree with
    /// whatever was persisted.
    #[must_use]
    pub fn is_admin_email(email: &str) -> bool {
        email.to_lowercase().contains("admin")
    }
}

/// Validation failures from the session store
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// A command arrived before the initial restore finished
    #[error("Session is still loading, please try again")]
    NotReady,
}

/// State of the session store
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    /// Current identity; `None` when logged out
    pub identity: Option<Identity>,
    /// Startup lifecycle
    pub phase: LoadPhase,
    /// Last validation error (if any)
    pub last_error: Option<SessionError>,
}

impl SessionState {
    /// Creates a new logged-out, uninitialized state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether someone is logged in
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Whether the current identity carries the admin capability
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(|i| i.is_admin)
    }

    /// Whether the initial restore has completed
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.phase.is_ready()
    }
}

/// Commands and notification events for the session store
///
/// Commands are requests from the presentation layer; notification events
/// are fed back by effects after the artificial delays and are what store
/// observers see.
#[derive(Clone, Debug)]
pub enum SessionAction {
    // ========== Commands ==========
    /// Command: restore a previously persisted identity, then become ready.
    /// Idempotent — only the first call does anything.
    Initialize,

    /// Command: log in. Always succeeds after a delay; the password is
    /// accepted as-is (presence validation is a presentation concern).
    Login {
        /// Email to derive the identity from
        email: String,
        /// Ignored beyond being carried along
        password: String,
    },

    /// Command: log out. Idempotent; clears the identity and removes the
    /// persisted form.
    Logout,

    // ========== Notification events ==========
    /// Event: the restore attempt finished (with or without an identity)
    RestoreCompleted {
        /// Restored identity, if storage held a well-formed one
        identity: Option<Identity>,
    },

    /// Event: login completed and the identity was persisted
    LoggedIn {
        /// The freshly created identity
        identity: Identity,
    },

    /// Event: logout completed and the persisted identity was removed
    LoggedOut,
}
