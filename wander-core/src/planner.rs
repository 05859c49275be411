use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use wander_shared::{NewTrip, Trip, VoiceRecording};

use crate::{backend::TripBackend, fixtures, ApiResult};

/// Outcome of turning a voice request into a trip
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedTrip {
    /// The backend created and stored the trip; its identifier is authoritative.
    Persisted(Trip),
    /// Nothing was stored remotely; the caller assigns a local identifier.
    Provisional(NewTrip),
}

/// Capability that turns a voice recording into a planned trip
#[async_trait]
pub trait TripPlanner: Send + Sync {
    async fn plan_trip(&self, recording: &VoiceRecording) -> ApiResult<PlannedTrip>;
}

/// Plans by uploading the recording to the backend
pub struct BackendPlanner {
    backend: Arc<dyn TripBackend>,
}

impl BackendPlanner {
    pub fn new(backend: Arc<dyn TripBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl TripPlanner for BackendPlanner {
    async fn plan_trip(&self, recording: &VoiceRecording) -> ApiResult<PlannedTrip> {
        let trip = self.backend.create_trip(recording).await?;
        info!("Backend planned trip {} to {}", trip.id, trip.destination);
        Ok(PlannedTrip::Persisted(trip))
    }
}

/// Always proposes the same Tokyo itinerary, without any I/O
pub struct FixturePlanner;

#[async_trait]
impl TripPlanner for FixturePlanner {
    async fn plan_trip(&self, recording: &VoiceRecording) -> ApiResult<PlannedTrip> {
        info!(
            "Fixture planner ignoring {} bytes of audio from {}",
            recording.bytes.len(),
            recording.file_name
        );
        Ok(PlannedTrip::Provisional(fixtures::tokyo_draft()))
    }
}
