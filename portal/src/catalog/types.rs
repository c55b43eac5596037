//! Domain types for the catalog store.

use chrono::NaiveDate;
use marquee_core::state::LoadPhase;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for an event
///
/// Seed events use small integers; admin-created events get time-derived ids
/// from the environment's id generator. Serializes as a bare integer, so the
/// persisted ledger is a plain JSON array of numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    /// Creates an `EventId` from its integer value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the inner integer
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event category
///
/// The closed set observed in the seed data, with a fallback for anything an
/// admin types in that isn't one of them. Round-trips through its string
/// form for serialization.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Concerts and live music
    Music,
    /// Conferences and tech meetups
    Technology,
    /// Exhibitions and galleries
    Art,
    /// Comedy and shows
    Entertainment,
    /// Wellness and fitness
    Health,
    /// Culinary events
    Food,
    /// Anything else
    Other(String),
}

impl Category {
    /// The display string for this category
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Music => "Music",
            Self::Technology => "Technology",
            Self::Art => "Art",
            Self::Entertainment => "Entertainment",
            Self::Health => "Health",
            Self::Food => "Food",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Music" => Self::Music,
            "Technology" => Self::Technology,
            "Art" => Self::Art,
            "Entertainment" => Self::Entertainment,
            "Health" => Self::Health,
            "Food" => Self::Food,
            _ => Self::Other(value),
        }
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bookable event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique identifier
    pub id: EventId,
    /// Event title
    pub title: String,
    /// Calendar date the event takes place on
    pub date: NaiveDate,
    /// Venue
    pub location: String,
    /// Category
    pub category: Category,
    /// Ticket price; 0 means free
    pub price: f64,
    /// Seats still available; unsigned, so a negative count is
    /// unrepresentable
    pub available_seats: u32,
    /// Longer description shown on the details page
    pub description: String,
}

/// The shape accepted when an admin creates an event: everything but the id
///
/// No field validation happens at this layer; the presentation layer owns
/// form validation messages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    /// Event title
    pub title: String,
    /// Calendar date
    pub date: NaiveDate,
    /// Venue
    pub location: String,
    /// Category
    pub category: Category,
    /// Ticket price
    pub price: f64,
    /// Initial seat count
    pub available_seats: u32,
    /// Description
    pub description: String,
}

impl EventDraft {
    /// Attach a freshly generated id, producing the catalog entry
    #[must_use]
    pub fn into_event(self, id: EventId) -> Event {
        Event {
            id,
            title: self.title,
            date: self.date,
            location: self.location,
            category: self.category,
            price: self.price,
            available_seats: self.available_seats,
            description: self.description,
        }
    }
}

/// Validation failures from the catalog store
///
/// All recoverable and user-facing; the display strings are the messages the
/// presentation layer surfaces.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum CatalogError {
    /// A command arrived before the initial load finished
    #[error("Catalog is still loading, please try again")]
    NotReady,

    /// The referenced event is not in the catalog
    #[error("Event not found")]
    NotFound,

    /// Capacity exhausted
    #[error("No seats available")]
    SoldOut,

    /// The session already holds a booking for this event
    #[error("You have already booked this event")]
    AlreadyBooked,

    /// The session holds no booking for this event
    #[error("Booking not found")]
    BookingNotFound,
}

/// State of the catalog store
#[derive(Clone, Debug, Default)]
pub struct CatalogState {
    /// The catalog, in catalog order (seed order plus appended events)
    pub events: Vec<Event>,
    /// The booking ledger: event ids this session holds a seat for, in
    /// booking order, at most one entry per id
    pub bookings: Vec<EventId>,
    /// Startup lifecycle
    pub phase: LoadPhase,
    /// Last validation error (if any)
    pub last_error: Option<CatalogError>,
}

impl CatalogState {
    /// Creates a new empty, uninitialized state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events in the catalog
    #[must_use]
    pub fn count(&self) -> usize {
        self.events.len()
    }

    /// Whether the initial load has completed
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.phase.is_ready()
    }

    /// Returns an event by id
    #[must_use]
    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Checks if an event exists in the catalog
    #[must_use]
    pub fn exists(&self, id: EventId) -> bool {
        self.get(id).is_some()
    }

    /// Checks if the session holds a booking for this event
    #[must_use]
    pub fn is_booked(&self, id: EventId) -> bool {
        self.bookings.contains(&id)
    }

    /// The booked subset of the catalog, in catalog order (not booking
    /// order)
    #[must_use]
    pub fn booked_events(&self) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| self.is_booked(e.id))
            .collect()
    }

    /// Unique categories present in the catalog, in catalog order
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        let mut seen = Vec::new();
        for event in &self.events {
            if !seen.contains(&event.category) {
                seen.push(event.category.clone());
            }
        }
        seen
    }

    /// Events matching a free-text query and an optional category filter
    ///
    /// The query matches title or location, case-insensitively; an empty
    /// query matches everything.
    #[must_use]
    pub fn search(&self, query: &str, category: Option<&Category>) -> Vec<&Event> {
        let needle = query.to_lowercase();
        self.events
            .iter()
            .filter(|e| category.is_none_or(|c| &e.category == c))
            .filter(|e| {
                needle.is_empty()
                    || e.title.to_lowercase().contains(&needle)
                    || e.location.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

/// Commands and notification events for the catalog store
#[derive(Clone, Debug)]
pub enum CatalogAction {
    // ========== Commands ==========
    /// Command: populate the catalog from the seed list and read the
    /// persisted ledger. Idempotent — only the first call does anything.
    Load,

    /// Command: book one seat on an event
    Book {
        /// The event to book
        event_id: EventId,
    },

    /// Command: cancel this session's booking on an event
    Cancel {
        /// The event to release
        event_id: EventId,
    },

    /// Command: append an admin-created event to the catalog
    AddEvent {
        /// The event fields, id assigned on creation
        draft: EventDraft,
    },

    /// Command: remove an event from the catalog, cleaning up any booking
    RemoveEvent {
        /// The event to remove
        event_id: EventId,
    },

    // ========== Notification events ==========
    /// Event: the initial load finished
    LoadCompleted {
        /// A fresh copy of the seed catalog
        events: Vec<Event>,
        /// The ledger restored from storage (empty when absent or
        /// malformed)
        bookings: Vec<EventId>,
    },

    /// Event: a booking was recorded and the ledger persisted
    Booked {
        /// The booked event
        event_id: EventId,
    },

    /// Event: a booking was released and the ledger persisted
    BookingCancelled {
        /// The released event
        event_id: EventId,
    },

    /// Event: an admin-created event joined the catalog
    EventAdded {
        /// The new catalog entry
        event: Event,
    },

    /// Event: an event left the catalog (and the ledger, if booked)
    EventRemoved {
        /// The removed event's id
        event_id: EventId,
    },
}
