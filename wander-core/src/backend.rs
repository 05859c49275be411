use async_trait::async_trait;
use wander_shared::{
    ItineraryDescriptor, PaymentRequest, PaymentResponse, Trip, TripStatus, VoiceFileListing,
    VoiceRecording,
};

use crate::ApiResult;

/// One method per client intent; each maps to exactly one HTTP request.
///
/// Implementations perform no retries and enforce no timeouts of their own.
#[async_trait]
pub trait TripBackend: Send + Sync {
    /// `POST /trips` with the recording as the `voice_input` multipart field
    async fn create_trip(&self, recording: &VoiceRecording) -> ApiResult<Trip>;

    /// `GET /trips`; an empty list is a valid answer
    async fn get_trips(&self) -> ApiResult<Vec<Trip>>;

    /// `GET /trips/{id}`
    async fn get_trip(&self, trip_id: &str) -> ApiResult<Trip>;

    /// `PUT /trips/{id}/status`; returns the trip as persisted by the backend
    async fn update_trip_status(
        &self,
        trip_id: &str,
        status: TripStatus,
        booking_reference: Option<&str>,
    ) -> ApiResult<Trip>;

    /// `POST /payments`
    async fn process_payment(&self, request: &PaymentRequest) -> ApiResult<PaymentResponse>;

    /// `GET /trips/{id}/itinerary`
    async fn download_itinerary(&self, trip_id: &str) -> ApiResult<ItineraryDescriptor>;

    /// `GET /trips/{id}/voice`, raw audio bytes
    async fn get_voice_file(&self, trip_id: &str) -> ApiResult<Vec<u8>>;

    /// `GET /voice-files`
    async fn list_voice_files(&self) -> ApiResult<VoiceFileListing>;
}
