use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use wander_core::{booking, fixtures};
use wander_shared::{
    ItineraryDescriptor, PaymentRequest, PaymentResponse, Trip, TripStatus, TripStatusUpdate,
    VoiceFileInfo,
};

use crate::error::AppError;

/// An uploaded `voice_input` file
#[derive(Debug, Clone)]
pub struct StoredVoice {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl StoredVoice {
    pub fn info(&self) -> VoiceFileInfo {
        VoiceFileInfo {
            filename: self.filename.clone(),
            size: self.bytes.len() as u64,
            created: self.created_at.to_rfc3339(),
            modified: self.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub trip_id: String,
    pub response: PaymentResponse,
}

/// In-memory persistence for the reference backend
#[derive(Debug, Default)]
pub struct TripRegistry {
    // Newest first
    trips: Vec<Trip>,
    voices: HashMap<String, StoredVoice>,
    payments: Vec<PaymentRecord>,
}

impl TripRegistry {
    pub fn seeded() -> Self {
        Self { trips: fixtures::sample_history(), ..Self::default() }
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn trip(&self, trip_id: &str) -> Result<&Trip, AppError> {
        self.trips
            .iter()
            .find(|trip| trip.id == trip_id)
            .ok_or_else(|| AppError::trip_not_found(trip_id))
    }

    fn trip_mut(&mut self, trip_id: &str) -> Result<&mut Trip, AppError> {
        self.trips
            .iter_mut()
            .find(|trip| trip.id == trip_id)
            .ok_or_else(|| AppError::trip_not_found(trip_id))
    }

    pub fn insert(&mut self, trip: Trip, voice: Option<StoredVoice>) {
        if let Some(voice) = voice {
            self.voices.insert(trip.id.clone(), voice);
        }
        self.trips.insert(0, trip);
    }

    /// Same rules as the client: no confirmed → draft, no confirmation without a reference.
    pub fn update_status(&mut self, trip_id: &str, update: TripStatusUpdate) -> Result<Trip, AppError> {
        let reference = booking::normalize_reference(update.booking_reference.as_deref());
        let trip = self.trip_mut(trip_id)?;

        if !trip.status.can_transition_to(update.status) {
            return Err(AppError::Conflict(format!(
                "Trip {} cannot move from {} to {}",
                trip_id, trip.status, update.status
            )));
        }
        if update.status == TripStatus::Confirmed
            && reference.is_none()
            && booking::normalize_reference(trip.booking_reference.as_deref()).is_none()
        {
            return Err(AppError::BadRequest(format!(
                "Trip {} cannot be confirmed without a bookingReference",
                trip_id
            )));
        }

        trip.status = update.status;
        if reference.is_some() {
            trip.booking_reference = reference;
        }
        Ok(trip.clone())
    }

    /// One payment per trip; a paid trip is confirmed with the reference it was issued.
    pub fn record_payment(&mut self, request: &PaymentRequest) -> Result<PaymentResponse, AppError> {
        let trip = self.trip(&request.trip_id)?;

        if trip.is_confirmed() {
            return Err(AppError::Conflict(format!("Trip {} is already confirmed", trip.id)));
        }
        if let Some(previous) = self.payments.iter().find(|p| p.trip_id == request.trip_id) {
            return Err(AppError::Conflict(format!(
                "Trip {} was already paid with booking reference {}",
                request.trip_id, previous.response.booking_reference
            )));
        }

        if request.amount != trip.cost {
            return Err(AppError::BadRequest(format!(
                "Amount {} does not match trip cost {}",
                request.amount, trip.cost
            )));
        }
        if request.payment_method.requires_card_details()
            && !request.card_details.as_ref().is_some_and(|card| card.is_complete())
        {
            return Err(AppError::BadRequest("Card details are incomplete".to_string()));
        }

        let response = PaymentResponse {
            payment_id: format!("pay_{}", uuid::Uuid::new_v4().simple()),
            status: "succeeded".to_string(),
            booking_reference: booking::generate_reference(),
        };
        self.payments.push(PaymentRecord {
            trip_id: request.trip_id.clone(),
            response: response.clone(),
        });
        Ok(response)
    }

    pub fn payments(&self) -> &[PaymentRecord] {
        &self.payments
    }

    pub fn itinerary(&self, trip_id: &str) -> Result<ItineraryDescriptor, AppError> {
        let trip = self.trip(trip_id)?;
        Ok(ItineraryDescriptor {
            message: format!("Itinerary for {} is ready for download", trip.destination),
            trip_id: trip.id.clone(),
            destination: trip.destination.clone(),
            download_url: format!("/trips/{}/itinerary.pdf", trip.id),
        })
    }

    pub fn voice(&self, trip_id: &str) -> Result<&StoredVoice, AppError> {
        self.trip(trip_id)?;
        self.voices
            .get(trip_id)
            .ok_or_else(|| AppError::NotFound(format!("Trip {} has no voice recording", trip_id)))
    }

    pub fn voice_files(&self) -> Vec<VoiceFileInfo> {
        let mut files: Vec<&StoredVoice> = self.voices.values().collect();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        files.into_iter().map(StoredVoice::info).collect()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RwLock<TripRegistry>>,
}

impl AppState {
    pub fn new(seed_sample_trips: bool) -> Self {
        let registry = if seed_sample_trips { TripRegistry::seeded() } else { TripRegistry::default() };
        Self { registry: Arc::new(RwLock::new(registry)) }
    }
}
