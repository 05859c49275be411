use serde::{Deserialize, Serialize};

/// Pointer to a prepared itinerary download; the artifact itself is fetched elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDescriptor {
    pub message: String,
    pub trip_id: String,
    pub destination: String,
    pub download_url: String,
}
