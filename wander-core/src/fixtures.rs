//! Deterministic trip data used by the fixture planner, tests and the
//! reference backend's seed history.

use chrono::NaiveDate;
use wander_shared::{Coordinates, EventKind, NewTrip, Trip, TripEvent, TripStatus};

#[allow(clippy::too_many_arguments)]
fn event(
    id: u32,
    title: &str,
    start_time: &str,
    end_time: &str,
    description: &str,
    kind: EventKind,
    cost: u64,
    location: &str,
    lat: f64,
    lng: f64,
) -> TripEvent {
    TripEvent {
        id,
        title: title.to_string(),
        description: description.to_string(),
        location: location.to_string(),
        start_time: start_time.to_string(),
        end_time: end_time.to_string(),
        kind,
        cost,
        coordinates: Coordinates { lat, lng },
    }
}

/// Five-event Tokyo itinerary totalling 1350
pub fn tokyo_itinerary() -> Vec<TripEvent> {
    vec![
        event(
            1,
            "Airport Check-in",
            "08:00 AM",
            "09:00 AM",
            "Check-in at the airport and security screening",
            EventKind::Travel,
            0,
            "John F. Kennedy International Airport",
            40.6413,
            -73.7781,
        ),
        event(
            2,
            "Flight to Tokyo",
            "10:00 AM",
            "02:00 PM",
            "Direct flight to Tokyo, Japan",
            EventKind::Travel,
            800,
            "Tokyo Haneda Airport",
            35.5494,
            139.7798,
        ),
        event(
            3,
            "Hotel Check-in",
            "03:00 PM",
            "04:00 PM",
            "Check into Park Hyatt Tokyo and freshen up",
            EventKind::Accommodation,
            400,
            "Park Hyatt Tokyo, Shinjuku",
            35.6870,
            139.6920,
        ),
        event(
            4,
            "Tokyo Tower Visit",
            "05:00 PM",
            "07:00 PM",
            "Visit iconic Tokyo Tower and observation deck",
            EventKind::Activity,
            30,
            "Tokyo Tower, Minato",
            35.6586,
            139.7454,
        ),
        event(
            5,
            "Sushi Dinner",
            "07:30 PM",
            "09:00 PM",
            "Authentic sushi dinner at Tsukiji Fish Market",
            EventKind::Dining,
            120,
            "Tsukiji Fish Market",
            35.6654,
            139.7707,
        ),
    ]
}

pub fn tokyo_draft() -> NewTrip {
    NewTrip::draft("Tokyo, Japan", "5 days", tokyo_itinerary())
}

/// Paris (confirmed) and London (draft), newest first
pub fn sample_history() -> Vec<Trip> {
    let paris_events = vec![
        event(
            1,
            "Flight to Paris",
            "08:00 AM",
            "02:00 PM",
            "Direct flight to Paris Charles de Gaulle",
            EventKind::Travel,
            800,
            "Charles de Gaulle Airport",
            49.0097,
            2.5479,
        ),
        event(
            2,
            "Hotel Check-in",
            "03:00 PM",
            "04:00 PM",
            "Four nights in the Marais",
            EventKind::Accommodation,
            1500,
            "Le Marais, Paris",
            48.8590,
            2.3626,
        ),
        event(
            3,
            "Eiffel Tower Visit",
            "10:00 AM",
            "12:00 PM",
            "Visit the iconic Eiffel Tower",
            EventKind::Activity,
            30,
            "Eiffel Tower, Paris",
            48.8584,
            2.2945,
        ),
        event(
            4,
            "Seine Dinner Cruise",
            "08:00 PM",
            "10:30 PM",
            "Dinner on the river",
            EventKind::Dining,
            170,
            "Port de la Bourdonnais",
            48.8602,
            2.2935,
        ),
    ];
    let london_events = vec![
        event(
            1,
            "Flight to London",
            "09:00 AM",
            "11:00 AM",
            "Flight to London Heathrow",
            EventKind::Travel,
            600,
            "Heathrow Airport",
            51.4700,
            -0.4543,
        ),
        event(
            2,
            "Hotel Check-in",
            "01:00 PM",
            "02:00 PM",
            "Two nights in Covent Garden",
            EventKind::Accommodation,
            900,
            "Covent Garden, London",
            51.5117,
            -0.1240,
        ),
        event(
            3,
            "British Museum",
            "03:00 PM",
            "06:00 PM",
            "Afternoon at the museum",
            EventKind::Activity,
            0,
            "Great Russell St, London",
            51.5194,
            -0.1270,
        ),
        event(
            4,
            "Dinner in Soho",
            "07:30 PM",
            "09:30 PM",
            "Dinner and a show",
            EventKind::Dining,
            300,
            "Soho, London",
            51.5136,
            -0.1365,
        ),
    ];

    vec![
        Trip {
            id: "1".to_string(),
            destination: "Paris, France".to_string(),
            duration: "5 days".to_string(),
            status: TripStatus::Confirmed,
            cost: 2500,
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap_or_default(),
            trip_data: paris_events,
            booking_reference: Some("TRVAB123XYZ".to_string()),
            voice_file_name: None,
        },
        Trip {
            id: "2".to_string(),
            destination: "London, UK".to_string(),
            duration: "3 days".to_string(),
            status: TripStatus::Draft,
            cost: 1800,
            date: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap_or_default(),
            trip_data: london_events,
            booking_reference: None,
            voice_file_name: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokyo_draft_cost_matches_events() {
        let draft = tokyo_draft();
        assert_eq!(draft.cost, 1350);
        assert_eq!(draft.status, TripStatus::Draft);
        assert_eq!(draft.trip_data.len(), 5);
    }

    #[test]
    fn test_sample_history_is_consistent() {
        for trip in sample_history() {
            assert_eq!(trip.cost, trip.events_total(), "cost mismatch for {}", trip.destination);
            assert!(trip.has_consistent_booking());
            if let Some(reference) = &trip.booking_reference {
                assert!(crate::booking::is_issued_format(reference), "bad reference {}", reference);
            }
        }
    }
}
