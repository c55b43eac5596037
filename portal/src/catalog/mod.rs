//! Catalog store: the event catalog and the booking ledger.
//!
//! The catalog itself is never persisted — it reloads from the seed list on
//! every run. Only the booking ledger (the ids this session holds a seat
//! for) crosses the durable-storage boundary, and only after the initial
//! load has completed.

pub mod reducer;
pub mod seed;
pub mod types;

// Re-export commonly used types
pub use reducer::{CatalogEnvironment, CatalogReducer};
pub use types::{CatalogAction, CatalogError, CatalogState, Category, Event, EventDraft, EventId};
