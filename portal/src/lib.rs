//! Marquee portal: the application core of an event-booking demo.
//!
//! Two cooperating stores make up the portal:
//!
//! - [`session`]: zero-or-one authenticated identity with a derived admin
//!   capability, restored from and persisted to durable local storage
//! - [`catalog`]: the event catalog and the booking ledger, with seat-count
//!   consistency enforced at booking time
//!
//! Both stores follow the same shape: a state struct with derived queries, a
//! command/notification action enum, and a reducer that validates commands,
//! mutates state in place, and emits effects for the artificial startup
//! delays, best-effort persistence, and observer notifications. The
//! presentation layer is a collaborator, not part of this crate: it sends
//! commands, subscribes to notification events, and re-reads derived queries.
//!
//! # Quick Start
//!
//! ```no_run
//! use marquee_core::environment::{SystemClock, SystemIdGenerator};
//! use marquee_portal::catalog::{CatalogAction, CatalogEnvironment, CatalogReducer, CatalogState};
//! use marquee_runtime::Store;
//! use marquee_storage::FileStorage;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Arc::new(FileStorage::new("/tmp/marquee")?);
//! let env = CatalogEnvironment::new(Arc::new(SystemIdGenerator::new()), storage);
//! let store = Store::new(CatalogState::new(), CatalogReducer::new(), env);
//!
//! // Load the catalog (seed events plus the persisted ledger)
//! let mut handle = store.send(CatalogAction::Load).await?;
//! handle.wait().await;
//!
//! // Book the jazz night
//! let first = store.state(|s| s.events.first().map(|e| e.id)).await;
//! if let Some(event_id) = first {
//!     store.send(CatalogAction::Book { event_id }).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod session;
