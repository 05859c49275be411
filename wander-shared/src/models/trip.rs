use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Two-state trip lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Draft,
    Confirmed,
}

impl TripStatus {
    /// Draft → Confirmed is the only forward move. Re-applying the current
    /// status is accepted; Confirmed → Draft is not.
    pub fn can_transition_to(self, next: TripStatus) -> bool {
        !matches!((self, next), (TripStatus::Confirmed, TripStatus::Draft))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TripStatus::Draft => "draft",
            TripStatus::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of an itinerary line item. Unknown wire values fall back to `Other`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Travel,
    Accommodation,
    Activity,
    Dining,
    #[default]
    #[serde(other)]
    Other,
}

impl EventKind {
    /// Icon name used by the presentation layer
    pub fn icon(self) -> &'static str {
        match self {
            EventKind::Travel => "airplane",
            EventKind::Accommodation => "bed",
            EventKind::Activity => "camera",
            EventKind::Dining => "restaurant",
            EventKind::Other => "location",
        }
    }

    /// Accent colour used by the presentation layer
    pub fn color(self) -> &'static str {
        match self {
            EventKind::Travel => "#4285f4",
            EventKind::Accommodation => "#9c27b0",
            EventKind::Activity => "#ff9800",
            EventKind::Dining => "#34a853",
            EventKind::Other => "#5f6368",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// One scheduled item within a trip's itinerary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripEvent {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub location: String,
    // Display strings such as "08:00 AM"; never parsed.
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "type", default)]
    pub kind: EventKind,
    pub cost: u64,
    pub coordinates: Coordinates,
}

/// The aggregate the client manages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub destination: String,
    pub duration: String,
    pub status: TripStatus,
    pub cost: u64,
    pub date: NaiveDate,
    pub trip_data: Vec<TripEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_file_name: Option<String>,
}

impl Trip {
    /// Materialise a trip from a draft record plus its generated identity
    pub fn from_new(new_trip: NewTrip, id: String, date: NaiveDate) -> Self {
        Self {
            id,
            destination: new_trip.destination,
            duration: new_trip.duration,
            status: new_trip.status,
            cost: new_trip.cost,
            date,
            trip_data: new_trip.trip_data,
            booking_reference: new_trip.booking_reference,
            voice_file_name: None,
        }
    }

    /// Sum of the itinerary's event costs
    pub fn events_total(&self) -> u64 {
        self.trip_data.iter().map(|event| event.cost).sum()
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == TripStatus::Confirmed
    }

    /// A confirmed trip must carry a non-empty booking reference.
    pub fn has_consistent_booking(&self) -> bool {
        match self.status {
            TripStatus::Confirmed => self
                .booking_reference
                .as_deref()
                .is_some_and(|reference| !reference.trim().is_empty()),
            TripStatus::Draft => true,
        }
    }
}

/// A trip record before an identifier and creation date are assigned
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub destination: String,
    pub duration: String,
    pub status: TripStatus,
    pub cost: u64,
    pub trip_data: Vec<TripEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_reference: Option<String>,
}

impl NewTrip {
    /// Draft whose cost is computed once from its events
    pub fn draft(destination: impl Into<String>, duration: impl Into<String>, trip_data: Vec<TripEvent>) -> Self {
        let cost = trip_data.iter().map(|event| event.cost).sum();
        Self {
            destination: destination.into(),
            duration: duration.into(),
            status: TripStatus::Draft,
            cost,
            trip_data,
            booking_reference: None,
        }
    }
}

/// Body of `PUT /trips/{id}/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripStatusUpdate {
    pub status: TripStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_reference: Option<String>,
}

impl From<&Trip> for NewTrip {
    fn from(trip: &Trip) -> Self {
        Self {
            destination: trip.destination.clone(),
            duration: trip.duration.clone(),
            status: trip.status,
            cost: trip.cost,
            trip_data: trip.trip_data.clone(),
            booking_reference: trip.booking_reference.clone(),
        }
    }
}
