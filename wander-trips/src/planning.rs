use std::sync::Arc;
use tracing::{info, warn};
use wander_core::{ApiError, PlannedTrip, TripPlanner};
use wander_shared::VoiceRecording;

use crate::store::TripStore;

#[derive(Debug, thiserror::Error)]
pub enum PlanningError {
    #[error("Trip planning failed: {0}")]
    Planner(#[from] ApiError),
}

/// Voice recording in, trip identifier out
pub struct PlanningFlow {
    planner: Arc<dyn TripPlanner>,
    store: Arc<TripStore>,
}

impl PlanningFlow {
    pub fn new(planner: Arc<dyn TripPlanner>, store: Arc<TripStore>) -> Self {
        Self { planner, store }
    }

    /// Plan a trip and make it visible in the store.
    ///
    /// Backend-created trips arrive through a refresh; a failed refresh is
    /// logged and the backend's identifier is still returned. Provisional
    /// trips are added locally as drafts.
    pub async fn plan_trip(&self, recording: &VoiceRecording) -> Result<String, PlanningError> {
        match self.planner.plan_trip(recording).await? {
            PlannedTrip::Persisted(trip) => {
                if let Err(e) = self.store.refresh().await {
                    warn!("Trip {} created but refresh failed: {}", trip.id, e);
                }
                Ok(trip.id)
            }
            PlannedTrip::Provisional(draft) => {
                let trip_id = self.store.add_trip(draft);
                info!("Provisional trip {} added", trip_id);
                Ok(trip_id)
            }
        }
    }
}
