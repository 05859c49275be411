pub mod models;
pub mod pii;

pub use models::itinerary::ItineraryDescriptor;
pub use models::payment::{CardDetails, PaymentMethod, PaymentRequest, PaymentResponse};
pub use models::trip::{Coordinates, EventKind, NewTrip, Trip, TripEvent, TripStatus, TripStatusUpdate};
pub use models::voice::{VoiceFileInfo, VoiceFileListing, VoiceRecording};
