//! Demo binary for the Marquee booking portal.
//!
//! Walks the whole flow end to end against file-backed storage: initialize
//! both stores, log in as an admin, browse and search the catalog, book and
//! cancel a seat, administer the catalog, log out, and shut down. Bookings
//! and the session survive under the storage directory between runs, which
//! is the point — delete it to start fresh.

use marquee_core::environment::{SystemClock, SystemIdGenerator};
use marquee_portal::catalog::{
    CatalogAction, CatalogEnvironment, CatalogReducer, CatalogState, EventId,
};
use marquee_portal::session::{SessionAction, SessionEnvironment, SessionReducer, SessionState};
use marquee_runtime::Store;
use marquee_storage::FileStorage;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Shortened artificial delays so the demo stays snappy
const DEMO_DELAY: Duration = Duration::from_millis(150);

#[tokio::main]
#[allow(clippy::too_many_lines)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal=debug,marquee_portal=debug,marquee_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Marquee Booking Portal ===\n");

    let base_dir = std::env::temp_dir().join("marquee-portal");
    println!("Durable storage: {}", base_dir.display());

    let storage = Arc::new(FileStorage::new(&base_dir)?);
    let ids = Arc::new(SystemIdGenerator::new());

    let session = Store::new(
        SessionState::new(),
        SessionReducer::new(),
        SessionEnvironment::new(
            Arc::new(SystemClock),
            Arc::clone(&ids) as _,
            Arc::clone(&storage) as _,
        )
        .with_delays(DEMO_DELAY, DEMO_DELAY),
    );

    let catalog = Store::new(
        CatalogState::new(),
        CatalogReducer::new(),
        CatalogEnvironment::new(Arc::clone(&ids) as _, Arc::clone(&storage) as _)
            .with_load_delay(DEMO_DELAY),
    );

    // Observe catalog notifications the way a presentation layer would
    let mut notifications = catalog.subscribe_actions();
    tokio::spawn(async move {
        while let Ok(action) = notifications.recv().await {
            match action {
                CatalogAction::Booked { event_id } => {
                    println!("  [observer] booked event {event_id}");
                }
                CatalogAction::BookingCancelled { event_id } => {
                    println!("  [observer] cancelled booking for event {event_id}");
                }
                CatalogAction::EventAdded { event } => {
                    println!("  [observer] event {} joined the catalog", event.id);
                }
                CatalogAction::EventRemoved { event_id } => {
                    println!("  [observer] event {event_id} left the catalog");
                }
                CatalogAction::LoadCompleted { ref events, .. } => {
                    println!("  [observer] catalog loaded with {} events", events.len());
                }
                _ => {}
            }
        }
    });

    // Initialize both stores; the delays model the original loading screens
    println!("\n>>> Initializing stores...");
    let mut handle = session.send(SessionAction::Initialize).await?;
    handle.wait().await;
    let mut handle = catalog.send(CatalogAction::Load).await?;
    handle.wait().await;

    if let Some(name) = session
        .state(|s| s.identity.as_ref().map(|i| i.name.clone()))
        .await
    {
        println!("Welcome back, {name}!");
    } else {
        println!("No stored session found.");
    }

    // Log in as an admin and wait for the notification
    println!("\n>>> Logging in as admin@marquee.io...");
    let logged_in = session
        .send_and_wait_for(
            SessionAction::Login {
                email: "admin@marquee.io".to_string(),
                password: "demo".to_string(),
            },
            |a| matches!(a, SessionAction::LoggedIn { .. }),
            Duration::from_secs(5),
        )
        .await?;
    if let SessionAction::LoggedIn { identity } = logged_in {
        println!("Logged in as {} (admin: {})", identity.name, identity.is_admin);
    }

    // Browse the catalog
    let total = catalog.state(CatalogState::count).await;
    let categories = catalog
        .state(|s| {
            s.categories()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        })
        .await;
    println!("\n{total} events across categories: {}", categories.join(", "));

    let night_hits = catalog
        .state(|s| {
            s.search("night", None)
                .iter()
                .map(|e| e.title.clone())
                .collect::<Vec<_>>()
        })
        .await;
    println!("Search for \"night\": {}", night_hits.join(" / "));

    // Book the jazz night, then show the guard rails
    let jazz = EventId::new(1);
    println!("\n>>> Booking event {jazz}...");
    let mut handle = catalog.send(CatalogAction::Book { event_id: jazz }).await?;
    handle.wait().await;
    report_seats(&catalog, jazz).await;

    println!(">>> Booking it again...");
    let mut handle = catalog.send(CatalogAction::Book { event_id: jazz }).await?;
    handle.wait().await;
    if let Some(error) = catalog.state(|s| s.last_error.clone()).await {
        println!("Rejected: {error}");
    }

    println!(">>> Cancelling the booking...");
    let mut handle = catalog
        .send(CatalogAction::Cancel { event_id: jazz })
        .await?;
    handle.wait().await;
    report_seats(&catalog, jazz).await;

    // Admin flow: add an event, then remove it again
    println!("\n>>> Adding a late-season event...");
    let draft = marquee_portal::catalog::EventDraft {
        title: "New Year Gala".to_string(),
        date: chrono::NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default(),
        location: "Grand Ballroom".to_string(),
        category: marquee_portal::catalog::Category::Entertainment,
        price: 95.0,
        available_seats: 120,
        description: "Ring in the new year in style.".to_string(),
    };
    let mut handle = catalog.send(CatalogAction::AddEvent { draft }).await?;
    handle.wait().await;

    let added_id = catalog
        .state(|s| s.events.last().map(|e| e.id))
        .await
        .unwrap_or(jazz);
    println!(">>> Removing event {added_id} again...");
    let mut handle = catalog
        .send(CatalogAction::RemoveEvent { event_id: added_id })
        .await?;
    handle.wait().await;

    // Log out and shut both stores down
    println!("\n>>> Logging out...");
    let mut handle = session.send(SessionAction::Logout).await?;
    handle.wait().await;
    println!(
        "Authenticated: {}",
        session.state(SessionState::is_authenticated).await
    );

    session.shutdown(Duration::from_secs(5)).await?;
    catalog.shutdown(Duration::from_secs(5)).await?;

    println!("\n=== Done ===");
    Ok(())
}

async fn report_seats(
    catalog: &Store<CatalogState, CatalogAction, CatalogEnvironment, CatalogReducer>,
    id: EventId,
) {
    if let Some((title, seats)) = catalog
        .state(|s| s.get(id).map(|e| (e.title.clone(), e.available_seats)))
        .await
    {
        println!("{title}: {seats} seats available");
    }
}
