use async_trait::async_trait;
use reqwest::{multipart, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use wander_core::{ApiError, ApiResult, TripBackend};
use wander_shared::{
    ItineraryDescriptor, PaymentRequest, PaymentResponse, Trip, TripStatus, TripStatusUpdate,
    VoiceFileListing, VoiceRecording,
};

use crate::app_config::BackendConfig;

/// `TripBackend` over HTTP/JSON.
///
/// Every method issues exactly one request. Non-2xx answers become
/// `ApiError::Status` with whatever body text could be read; failures before
/// a response arrives become `ApiError::Transport`.
#[derive(Clone)]
pub struct HttpBackend {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::transport(format!("Invalid base URL {}: {}", base_url, e)))?;
        Ok(Self { base_url, client: reqwest::Client::new() })
    }

    pub fn from_config(config: &BackendConfig) -> ApiResult<Self> {
        Self::new(&config.base_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::transport(format!("Base URL cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(|e| {
            error!("API request failed: {}", e);
            ApiError::transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("API Error: {} {}", status.as_u16(), body);
            return Err(ApiError::status_code(status.as_u16(), body));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(|e| {
            error!("API response could not be decoded: {}", e);
            ApiError::Decode { message: e.to_string() }
        })
    }
}

#[async_trait]
impl TripBackend for HttpBackend {
    async fn create_trip(&self, recording: &VoiceRecording) -> ApiResult<Trip> {
        let url = self.endpoint(&["trips"])?;
        debug!("POST {} ({} bytes of audio)", url, recording.bytes.len());

        let part = multipart::Part::bytes(recording.bytes.clone())
            .file_name(recording.file_name.clone())
            .mime_str(&recording.mime_type)
            .map_err(|e| ApiError::transport(format!("Invalid audio mime type: {}", e)))?;
        let form = multipart::Form::new().part("voice_input", part);

        self.send_json(self.client.post(url).multipart(form)).await
    }

    async fn get_trips(&self) -> ApiResult<Vec<Trip>> {
        let url = self.endpoint(&["trips"])?;
        debug!("GET {}", url);
        self.send_json(self.client.get(url)).await
    }

    async fn get_trip(&self, trip_id: &str) -> ApiResult<Trip> {
        let url = self.endpoint(&["trips", trip_id])?;
        debug!("GET {}", url);
        self.send_json(self.client.get(url)).await
    }

    async fn update_trip_status(
        &self,
        trip_id: &str,
        status: TripStatus,
        booking_reference: Option<&str>,
    ) -> ApiResult<Trip> {
        let url = self.endpoint(&["trips", trip_id, "status"])?;
        debug!("PUT {} -> {}", url, status);
        let body = TripStatusUpdate {
            status,
            booking_reference: booking_reference.map(str::to_string),
        };
        self.send_json(self.client.put(url).json(&body)).await
    }

    async fn process_payment(&self, request: &PaymentRequest) -> ApiResult<PaymentResponse> {
        let url = self.endpoint(&["payments"])?;
        debug!("POST {} for trip {} via {}", url, request.trip_id, request.payment_method);
        self.send_json(self.client.post(url).json(request)).await
    }

    async fn download_itinerary(&self, trip_id: &str) -> ApiResult<ItineraryDescriptor> {
        let url = self.endpoint(&["trips", trip_id, "itinerary"])?;
        debug!("GET {}", url);
        self.send_json(self.client.get(url)).await
    }

    async fn get_voice_file(&self, trip_id: &str) -> ApiResult<Vec<u8>> {
        let url = self.endpoint(&["trips", trip_id, "voice"])?;
        debug!("GET {}", url);
        let response = self.send(self.client.get(url)).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn list_voice_files(&self) -> ApiResult<VoiceFileListing> {
        let url = self.endpoint(&["voice-files"])?;
        debug!("GET {}", url);
        self.send_json(self.client.get(url)).await
    }
}
