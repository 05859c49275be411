use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use wander_core::fixtures;
use wander_shared::{ItineraryDescriptor, Trip, TripStatusUpdate, VoiceFileListing};

use crate::error::AppError;
use crate::state::{AppState, StoredVoice};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trips", get(list_trips).post(create_trip))
        .route("/trips/{id}", get(get_trip))
        .route("/trips/{id}/status", put(update_status))
        .route("/trips/{id}/itinerary", get(itinerary))
        .route("/trips/{id}/voice", get(voice_file))
        .route("/voice-files", get(list_voice_files))
}

/// POST /trips
/// Accepts the `voice_input` upload and plans a trip from it
async fn create_trip(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Trip>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("voice_input") {
            continue;
        }
        let filename = field.file_name().unwrap_or("voice_input.m4a").to_string();
        let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Could not read voice_input: {}", e)))?;
        upload = Some((filename, content_type, bytes.to_vec()));
    }

    let (filename, content_type, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("Missing voice_input field".to_string()))?;

    let trip_id = Uuid::new_v4().to_string();
    let stored_name = format!("{}_{}", trip_id, filename);
    let now = Utc::now();

    // Transcription and itinerary generation are not wired up; every upload plans Tokyo.
    let mut trip = Trip::from_new(fixtures::tokyo_draft(), trip_id.clone(), now.date_naive());
    trip.voice_file_name = Some(stored_name.clone());

    let voice = StoredVoice {
        filename: stored_name,
        content_type,
        bytes,
        created_at: now,
    };
    info!("Stored {} bytes of audio for trip {}", voice.bytes.len(), trip_id);

    state.registry.write().await.insert(trip.clone(), Some(voice));
    Ok(Json(trip))
}

/// GET /trips
async fn list_trips(State(state): State<AppState>) -> Json<Vec<Trip>> {
    Json(state.registry.read().await.trips().to_vec())
}

/// GET /trips/{id}
async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Json<Trip>, AppError> {
    let registry = state.registry.read().await;
    Ok(Json(registry.trip(&trip_id)?.clone()))
}

/// PUT /trips/{id}/status
async fn update_status(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
    Json(update): Json<TripStatusUpdate>,
) -> Result<Json<Trip>, AppError> {
    let trip = state.registry.write().await.update_status(&trip_id, update)?;
    info!("Trip {} is now {}", trip.id, trip.status);
    Ok(Json(trip))
}

/// GET /trips/{id}/itinerary
async fn itinerary(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Json<ItineraryDescriptor>, AppError> {
    Ok(Json(state.registry.read().await.itinerary(&trip_id)?))
}

/// GET /trips/{id}/voice
async fn voice_file(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let registry = state.registry.read().await;
    let voice = registry.voice(&trip_id)?;
    let disposition = format!("attachment; filename=\"{}\"", voice.filename);
    Ok((
        [
            (header::CONTENT_TYPE, voice.content_type.clone()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        voice.bytes.clone(),
    ))
}

/// GET /voice-files
async fn list_voice_files(State(state): State<AppState>) -> Json<VoiceFileListing> {
    Json(VoiceFileListing { voice_files: state.registry.read().await.voice_files() })
}
