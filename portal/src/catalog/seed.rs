//! The seed catalog.
//!
//! Hardcoded event data standing in for an API response. The catalog is
//! rebuilt from this list on every load; only the booking ledger persists
//! across runs.

use super::types::{Category, Event, EventId};
use chrono::NaiveDate;

#[allow(clippy::expect_used)]
fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("seed dates are valid")
}

/// A fresh copy of the seed catalog
///
/// Every call allocates anew, so later catalog mutation can never corrupt
/// the seed.
#[must_use]
pub fn seed_events() -> Vec<Event> {
    vec![
        Event {
            id: EventId::new(1),
            title: "Jazz Night".to_string(),
            date: date(2024, 12, 20),
            location: "Hall A".to_string(),
            category: Category::Music,
            price: 50.0,
            available_seats: 10,
            description: "Experience an unforgettable evening of smooth jazz with renowned \
                          musicians. Enjoy classic standards and contemporary pieces in an \
                          intimate setting with premium acoustics."
                .to_string(),
        },
        Event {
            id: EventId::new(2),
            title: "Tech Conference 2024".to_string(),
            date: date(2024, 12, 22),
            location: "Main Auditorium".to_string(),
            category: Category::Technology,
            price: 150.0,
            available_seats: 100,
            description: "Join industry leaders and innovators for a day of cutting-edge \
                          technology discussions. Topics include AI, blockchain, cloud \
                          computing, and the future of software development."
                .to_string(),
        },
        Event {
            id: EventId::new(3),
            title: "Art Exhibition: Modern Visions".to_string(),
            date: date(2024, 12, 25),
            location: "Gallery Wing B".to_string(),
            category: Category::Art,
            price: 25.0,
            available_seats: 50,
            description: "Explore contemporary art from emerging artists around the world. \
                          This exhibition features paintings, sculptures, and digital \
                          installations that challenge conventional perspectives."
                .to_string(),
        },
        Event {
            id: EventId::new(4),
            title: "Comedy Night Live".to_string(),
            date: date(2024, 12, 28),
            location: "Comedy Club".to_string(),
            category: Category::Entertainment,
            price: 40.0,
            available_seats: 75,
            description: "Laugh out loud with our lineup of talented comedians. From stand-up \
                          to improv, this night promises non-stop entertainment and \
                          unforgettable moments."
                .to_string(),
        },
        Event {
            id: EventId::new(5),
            title: "Yoga & Wellness Retreat".to_string(),
            date: date(2025, 1, 5),
            location: "Wellness Center".to_string(),
            category: Category::Health,
            price: 80.0,
            available_seats: 30,
            description: "Rejuvenate your mind and body with expert-led yoga sessions, \
                          meditation workshops, and wellness seminars. Perfect for beginners \
                          and experienced practitioners alike."
                .to_string(),
        },
        Event {
            id: EventId::new(6),
            title: "Culinary Masterclass".to_string(),
            date: date(2025, 1, 10),
            location: "Culinary Studio".to_string(),
            category: Category::Food,
            price: 120.0,
            available_seats: 20,
            description: "Learn gourmet cooking techniques from award-winning chefs. This \
                          hands-on masterclass covers everything from knife skills to plating \
                          like a professional."
                .to_string(),
        },
        Event {
            id: EventId::new(7),
            title: "Rock Concert: The Legends".to_string(),
            date: date(2025, 1, 15),
            location: "Open Air Stadium".to_string(),
            category: Category::Music,
            price: 200.0,
            available_seats: 500,
            description: "Experience the ultimate rock concert featuring legendary bands and \
                          electrifying performances. Get ready for a night of classic hits and \
                          raw musical energy."
                .to_string(),
        },
        Event {
            id: EventId::new(8),
            title: "Startup Pitch Competition".to_string(),
            date: date(2025, 1, 20),
            location: "Innovation Hub".to_string(),
            category: Category::Technology,
            price: 0.0,
            available_seats: 200,
            description: "Watch promising startups pitch their ideas to top investors. \
                          Network with entrepreneurs, investors, and industry professionals in \
                          this exciting competition."
                .to_string(),
        },
    ]
}
