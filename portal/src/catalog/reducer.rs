//! Reducer logic for the catalog store.
//!
//! Commands validate against the current state, mutate it in place, and
//! return a single effect that persists the ledger (when it changed) and
//! feeds the matching notification event back to observers. The ledger
//! snapshot is taken after the mutation, inside the reducer, so what gets
//! written always reflects exactly the state the command produced.

use crate::catalog::seed::seed_events;
use crate::catalog::types::{CatalogAction, CatalogError, CatalogState, EventId};
use marquee_core::{
    SmallVec,
    effect::Effect,
    environment::{BOOKINGS_KEY, IdGenerator, KeyValueStorage},
    reducer::Reducer,
    smallvec,
    state::LoadPhase,
};
use std::sync::Arc;
use std::time::Duration;

/// Delay before the initial load resolves, emulating a network round trip
const DEFAULT_LOAD_DELAY: Duration = Duration::from_millis(1000);

/// Environment dependencies for the catalog reducer
#[derive(Clone)]
pub struct CatalogEnvironment {
    /// Id generator for admin-created events
    pub ids: Arc<dyn IdGenerator>,
    /// Durable storage holding the ledger under `bookings`
    pub storage: Arc<dyn KeyValueStorage>,
    /// How long the initial load sleeps before resolving
    pub load_delay: Duration,
}

impl CatalogEnvironment {
    /// Creates an environment with the default load delay
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            ids,
            storage,
            load_delay: DEFAULT_LOAD_DELAY,
        }
    }

    /// Override the artificial load delay (tests use zero)
    #[must_use]
    pub const fn with_load_delay(mut self, load_delay: Duration) -> Self {
        self.load_delay = load_delay;
        self
    }
}

/// Reducer for the catalog store
#[derive(Clone, Debug, Default)]
pub struct CatalogReducer;

impl CatalogReducer {
    /// Creates a new `CatalogReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a `Book` command
    fn validate_book(state: &CatalogState, event_id: EventId) -> Result<(), CatalogError> {
        if !state.phase.is_ready() {
            return Err(CatalogError::NotReady);
        }
        let Some(event) = state.get(event_id) else {
            return Err(CatalogError::NotFound);
        };
        if event.available_seats == 0 {
            return Err(CatalogError::SoldOut);
        }
        if state.is_booked(event_id) {
            return Err(CatalogError::AlreadyBooked);
        }
        Ok(())
    }

    /// Validates a `Cancel` command
    fn validate_cancel(state: &CatalogState, event_id: EventId) -> Result<(), CatalogError> {
        if !state.phase.is_ready() {
            return Err(CatalogError::NotReady);
        }
        if !state.is_booked(event_id) {
            return Err(CatalogError::BookingNotFound);
        }
        Ok(())
    }

    /// Validates a `RemoveEvent` command
    fn validate_remove(state: &CatalogState, event_id: EventId) -> Result<(), CatalogError> {
        if !state.phase.is_ready() {
            return Err(CatalogError::NotReady);
        }
        if !state.exists(event_id) {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }

    /// Record a validation failure; no effects, no state change beyond the
    /// error
    fn fail(
        state: &mut CatalogState,
        error: CatalogError,
    ) -> SmallVec<[Effect<CatalogAction>; 4]> {
        tracing::debug!(%error, "catalog command rejected");
        state.last_error = Some(error);
        SmallVec::new()
    }

    /// Persist the (already mutated) ledger and feed the notification event
    /// back to observers
    ///
    /// Only reachable from `Ready`-gated command arms, which is what keeps
    /// the persisted ledger safe from being clobbered during the initial
    /// load.
    fn commit(
        env: &CatalogEnvironment,
        bookings: &[EventId],
        event: CatalogAction,
    ) -> SmallVec<[Effect<CatalogAction>; 4]> {
        let storage = Arc::clone(&env.storage);
        let ledger = bookings.to_vec();
        smallvec![Effect::Future(Box::pin(async move {
            persist_bookings(storage.as_ref(), &ledger);
            Some(event)
        }))]
    }
}

impl Reducer for CatalogReducer {
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = CatalogEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            CatalogAction::Load => {
                // Idempotent: only the first call starts the load
                if state.phase != LoadPhase::Uninitialized {
                    return SmallVec::new();
                }
                state.phase = LoadPhase::Loading;

                let storage = Arc::clone(&env.storage);
                let delay = env.load_delay;
                smallvec![Effect::Future(Box::pin(async move {
                    tokio::time::sleep(delay).await;
                    let bookings = restore_bookings(storage.as_ref());
                    Some(CatalogAction::LoadCompleted {
                        events: seed_events(),
                        bookings,
                    })
                }))]
            }

            CatalogAction::Book { event_id } => {
                if let Err(error) = Self::validate_book(state, event_id) {
                    return Self::fail(state, error);
                }

                // Exactly one seat, on exactly this event
                if let Some(event) = state.events.iter_mut().find(|e| e.id == event_id) {
                    event.available_seats -= 1;
                }
                state.bookings.push(event_id);
                state.last_error = None;

                Self::commit(env, &state.bookings, CatalogAction::Booked { event_id })
            }

            CatalogAction::Cancel { event_id } => {
                if let Err(error) = Self::validate_cancel(state, event_id) {
                    return Self::fail(state, error);
                }

                if let Some(event) = state.events.iter_mut().find(|e| e.id == event_id) {
                    event.available_seats += 1;
                }
                state.bookings.retain(|id| *id != event_id);
                state.last_error = None;

                Self::commit(
                    env,
                    &state.bookings,
                    CatalogAction::BookingCancelled { event_id },
                )
            }

            CatalogAction::AddEvent { draft } => {
                if !state.phase.is_ready() {
                    return Self::fail(state, CatalogError::NotReady);
                }

                let event = draft.into_event(EventId::new(env.ids.next_id()));
                state.events.push(event.clone());
                state.last_error = None;

                // The catalog is not persisted, so there is nothing to write
                smallvec![Effect::emit(CatalogAction::EventAdded { event })]
            }

            CatalogAction::RemoveEvent { event_id } => {
                if let Err(error) = Self::validate_remove(state, event_id) {
                    return Self::fail(state, error);
                }

                state.events.retain(|e| e.id != event_id);
                // Cascading cleanup: a booking for a removed event must not
                // survive it
                state.bookings.retain(|id| *id != event_id);
                state.last_error = None;

                Self::commit(
                    env,
                    &state.bookings,
                    CatalogAction::EventRemoved { event_id },
                )
            }

            // ========== Notification events ==========
            CatalogAction::LoadCompleted { events, bookings } => {
                // Only the in-flight load may complete
                if state.phase.is_loading() {
                    state.events = events;
                    state.bookings = bookings;
                    state.phase = LoadPhase::Ready;
                }
                SmallVec::new()
            }

            CatalogAction::Booked { .. }
            | CatalogAction::BookingCancelled { .. }
            | CatalogAction::EventAdded { .. }
            | CatalogAction::EventRemoved { .. } => {
                // Already applied during command processing; carried for
                // observers
                SmallVec::new()
            }
        }
    }
}

/// Read and parse the persisted ledger; anything malformed reads as empty
fn restore_bookings(storage: &dyn KeyValueStorage) -> Vec<EventId> {
    let raw = match storage.get(BOOKINGS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to read stored bookings");
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(bookings) => bookings,
        Err(err) => {
            tracing::debug!(error = %err, "stored bookings failed to parse, treating as empty");
            Vec::new()
        }
    }
}

/// Persist the ledger, logging (not propagating) failures
fn persist_bookings(storage: &dyn KeyValueStorage, bookings: &[EventId]) {
    match serde_json::to_string(bookings) {
        Ok(json) => {
            if let Err(err) = storage.set(BOOKINGS_KEY, &json) {
                tracing::warn!(error = %err, "failed to persist bookings");
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to serialize bookings");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{Category, EventDraft};
    use chrono::NaiveDate;
    use marquee_testing::{ReducerTest, assertions, test_ids, test_storage};

    fn test_env() -> CatalogEnvironment {
        CatalogEnvironment::new(Arc::new(test_ids(1000)), Arc::new(test_storage()))
            .with_load_delay(Duration::ZERO)
    }

    fn ready_state() -> CatalogState {
        CatalogState {
            events: seed_events(),
            bookings: Vec::new(),
            phase: LoadPhase::Ready,
            last_error: None,
        }
    }

    fn draft(title: &str) -> EventDraft {
        EventDraft {
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap_or_default(),
            location: "Hall C".to_string(),
            category: Category::Music,
            price: 35.0,
            available_seats: 40,
            description: "A late addition to the season.".to_string(),
        }
    }

    #[test]
    fn load_starts_loading_with_a_load_effect() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(CatalogState::new())
            .when_action(CatalogAction::Load)
            .then_state(|state| {
                assert!(state.phase.is_loading());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn load_is_idempotent_once_started() {
        for phase in [LoadPhase::Loading, LoadPhase::Ready] {
            ReducerTest::new(CatalogReducer::new())
                .with_env(test_env())
                .given_state(CatalogState {
                    phase,
                    ..CatalogState::new()
                })
                .when_action(CatalogAction::Load)
                .then_effects(assertions::assert_no_effects)
                .run();
        }
    }

    #[test]
    fn load_completed_applies_catalog_and_ledger() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(CatalogState {
                phase: LoadPhase::Loading,
                ..CatalogState::new()
            })
            .when_action(CatalogAction::LoadCompleted {
                events: seed_events(),
                bookings: vec![EventId::new(3)],
            })
            .then_state(|state| {
                assert!(state.is_ready());
                assert_eq!(state.count(), 8);
                assert!(state.is_booked(EventId::new(3)));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn book_decrements_seats_and_records_the_booking() {
        let id = EventId::new(1);

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(ready_state())
            .when_action(CatalogAction::Book { event_id: id })
            .then_state(move |state| {
                assert_eq!(state.get(id).map(|e| e.available_seats), Some(9));
                assert!(state.is_booked(id));
                assert!(state.last_error.is_none());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn book_leaves_other_events_untouched() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(ready_state())
            .when_action(CatalogAction::Book {
                event_id: EventId::new(1),
            })
            .then_state(|state| {
                assert_eq!(
                    state.get(EventId::new(2)).map(|e| e.available_seats),
                    Some(100)
                );
            })
            .run();
    }

    #[test]
    fn book_unknown_event_fails_not_found() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(ready_state())
            .when_action(CatalogAction::Book {
                event_id: EventId::new(999),
            })
            .then_state(|state| {
                assert_eq!(state.last_error, Some(CatalogError::NotFound));
                assert!(state.bookings.is_empty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn book_sold_out_event_fails_sold_out() {
        let mut state = ready_state();
        if let Some(event) = state.events.first_mut() {
            event.available_seats = 0;
        }

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(CatalogAction::Book {
                event_id: EventId::new(1),
            })
            .then_state(|state| {
                assert_eq!(state.last_error, Some(CatalogError::SoldOut));
                assert!(!state.is_booked(EventId::new(1)));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn book_twice_fails_already_booked() {
        let mut state = ready_state();
        if let Some(event) = state.events.first_mut() {
            event.available_seats = 9;
        }
        state.bookings.push(EventId::new(1));

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(CatalogAction::Book {
                event_id: EventId::new(1),
            })
            .then_state(|state| {
                assert_eq!(state.last_error, Some(CatalogError::AlreadyBooked));
                // Seats unchanged by the rejected attempt
                assert_eq!(state.get(EventId::new(1)).map(|e| e.available_seats), Some(9));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn book_before_load_fails_not_ready() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(CatalogState::new())
            .when_action(CatalogAction::Book {
                event_id: EventId::new(1),
            })
            .then_state(|state| {
                assert_eq!(state.last_error, Some(CatalogError::NotReady));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn cancel_restores_the_seat_and_clears_the_booking() {
        let mut state = ready_state();
        if let Some(event) = state.events.first_mut() {
            event.available_seats = 9;
        }
        state.bookings.push(EventId::new(1));

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(CatalogAction::Cancel {
                event_id: EventId::new(1),
            })
            .then_state(|state| {
                assert_eq!(
                    state.get(EventId::new(1)).map(|e| e.available_seats),
                    Some(10)
                );
                assert!(!state.is_booked(EventId::new(1)));
                assert!(state.last_error.is_none());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
            })
            .run();
    }

    #[test]
    fn cancel_without_a_booking_fails_booking_not_found() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(ready_state())
            .when_action(CatalogAction::Cancel {
                event_id: EventId::new(1),
            })
            .then_state(|state| {
                assert_eq!(state.last_error, Some(CatalogError::BookingNotFound));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn add_event_appends_with_a_fresh_id() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(ready_state())
            .when_action(CatalogAction::AddEvent {
                draft: draft("Winter Gala"),
            })
            .then_state(|state| {
                assert_eq!(state.count(), 9);
                let added = state.get(EventId::new(1000));
                assert_eq!(added.map(|e| e.title.as_str()), Some("Winter Gala"));
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn add_event_ids_are_distinct_across_calls() {
        let env = test_env();
        let reducer = CatalogReducer::new();
        let mut state = ready_state();

        let _ = reducer.reduce(
            &mut state,
            CatalogAction::AddEvent {
                draft: draft("First"),
            },
            &env,
        );
        let _ = reducer.reduce(
            &mut state,
            CatalogAction::AddEvent {
                draft: draft("Second"),
            },
            &env,
        );

        let mut ids: Vec<u64> = state.events.iter().map(|e| e.id.value()).collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before, "every catalog id must be unique");
    }

    #[test]
    fn remove_event_cascades_into_the_ledger() {
        let mut state = ready_state();
        if let Some(event) = state.events.first_mut() {
            event.available_seats = 9;
        }
        state.bookings.push(EventId::new(1));

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(CatalogAction::RemoveEvent {
                event_id: EventId::new(1),
            })
            .then_state(|state| {
                assert!(!state.exists(EventId::new(1)));
                // No orphaned booking may survive the event
                assert!(!state.is_booked(EventId::new(1)));
                assert_eq!(state.count(), 7);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
            })
            .run();
    }

    #[test]
    fn remove_unknown_event_fails_not_found() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(ready_state())
            .when_action(CatalogAction::RemoveEvent {
                event_id: EventId::new(999),
            })
            .then_state(|state| {
                assert_eq!(state.last_error, Some(CatalogError::NotFound));
                assert_eq!(state.count(), 8);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn book_cancel_round_trip_restores_the_seed_counts() {
        let env = test_env();
        let reducer = CatalogReducer::new();
        let mut state = ready_state();
        let id = EventId::new(1);

        let _ = reducer.reduce(&mut state, CatalogAction::Book { event_id: id }, &env);
        assert_eq!(state.get(id).map(|e| e.available_seats), Some(9));

        let _ = reducer.reduce(&mut state, CatalogAction::Book { event_id: id }, &env);
        assert_eq!(state.last_error, Some(CatalogError::AlreadyBooked));

        let _ = reducer.reduce(&mut state, CatalogAction::Cancel { event_id: id }, &env);
        assert_eq!(state.get(id).map(|e| e.available_seats), Some(10));
        assert!(!state.is_booked(id));

        let _ = reducer.reduce(&mut state, CatalogAction::Cancel { event_id: id }, &env);
        assert_eq!(state.last_error, Some(CatalogError::BookingNotFound));
    }

    #[test]
    fn cancel_after_remove_fails_booking_not_found() {
        let env = test_env();
        let reducer = CatalogReducer::new();
        let mut state = ready_state();
        let id = EventId::new(2);

        let _ = reducer.reduce(&mut state, CatalogAction::Book { event_id: id }, &env);
        let _ = reducer.reduce(&mut state, CatalogAction::RemoveEvent { event_id: id }, &env);
        let _ = reducer.reduce(&mut state, CatalogAction::Cancel { event_id: id }, &env);

        assert_eq!(state.last_error, Some(CatalogError::BookingNotFound));
    }

    #[test]
    fn restore_ignores_malformed_stored_bookings() {
        let storage = test_storage();
        let _ = storage.set(BOOKINGS_KEY, "not-an-array");
        assert!(restore_bookings(&storage).is_empty());
    }

    #[test]
    fn restore_round_trips_a_persisted_ledger() {
        let storage = test_storage();
        persist_bookings(&storage, &[EventId::new(1), EventId::new(8)]);
        assert_eq!(storage.value(BOOKINGS_KEY).as_deref(), Some("[1,8]"));
        assert_eq!(
            restore_bookings(&storage),
            vec![EventId::new(1), EventId::new(8)]
        );
    }
}
