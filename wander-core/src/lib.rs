pub mod backend;
pub mod booking;
pub mod fixtures;
pub mod planner;

pub use backend::TripBackend;
pub use planner::{BackendPlanner, FixturePlanner, PlannedTrip, TripPlanner};

/// The single failure shape every backend call is normalized into
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Transport failure: {message}")]
    Transport { message: String },
    #[error("HTTP error! status: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("Malformed response: {message}")]
    Decode { message: String },
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    pub fn status_code(status: u16, body: impl Into<String>) -> Self {
        Self::Status { status, body: body.into() }
    }

    /// HTTP status when the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
