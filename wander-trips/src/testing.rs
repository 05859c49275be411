use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Mutex;
use tokio::sync::{oneshot, Notify};
use wander_core::{booking, fixtures, ApiError, ApiResult, TripBackend};
use wander_shared::{
    ItineraryDescriptor, NewTrip, PaymentRequest, PaymentResponse, Trip, TripStatus,
    VoiceFileListing, VoiceRecording,
};

pub(crate) fn rome_draft() -> NewTrip {
    NewTrip {
        destination: "Rome".to_string(),
        duration: "3 days".to_string(),
        status: TripStatus::Draft,
        cost: 500,
        trip_data: vec![],
        booking_reference: None,
    }
}

pub(crate) fn draft_trip(id: &str, cost: u64) -> Trip {
    let mut trip = Trip::from_new(
        rome_draft(),
        id.to_string(),
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
    );
    trip.cost = cost;
    trip
}

#[derive(Default)]
struct Failures {
    list: Option<ApiError>,
    status: Option<ApiError>,
    payment: Option<ApiError>,
    create: Option<ApiError>,
}

/// In-memory backend with scriptable failures and a call log
#[derive(Default)]
pub(crate) struct FakeBackend {
    remote: Mutex<Vec<Trip>>,
    failures: Mutex<Failures>,
    calls: Mutex<Vec<String>>,
    list_gate: Mutex<Option<oneshot::Receiver<()>>>,
    list_started: Notify,
    status_gate: Mutex<Option<oneshot::Receiver<()>>>,
    status_started: Notify,
}

impl FakeBackend {
    pub(crate) fn with_remote(trips: Vec<Trip>) -> Self {
        let backend = Self::default();
        backend.set_remote(trips);
        backend
    }

    pub(crate) fn set_remote(&self, trips: Vec<Trip>) {
        *self.remote.lock().unwrap() = trips;
    }

    pub(crate) fn remote_trip(&self, trip_id: &str) -> Option<Trip> {
        self.remote.lock().unwrap().iter().find(|t| t.id == trip_id).cloned()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn fail_list(&self, err: ApiError) {
        self.failures.lock().unwrap().list = Some(err);
    }

    pub(crate) fn fail_status(&self, err: ApiError) {
        self.failures.lock().unwrap().status = Some(err);
    }

    pub(crate) fn fail_payment(&self, err: ApiError) {
        self.failures.lock().unwrap().payment = Some(err);
    }

    pub(crate) fn fail_create(&self, err: ApiError) {
        self.failures.lock().unwrap().create = Some(err);
    }

    /// The next `get_trips` snapshots the remote list, then waits for the returned sender.
    pub(crate) fn hold_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.list_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub(crate) async fn list_started(&self) {
        self.list_started.notified().await;
    }

    /// The next `update_trip_status` waits for the returned sender before answering.
    pub(crate) fn hold_next_status(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.status_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub(crate) async fn status_started(&self) {
        self.status_started.notified().await;
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn not_found(trip_id: &str) -> ApiError {
        ApiError::status_code(404, format!("{{\"error\":\"Trip {} not found\"}}", trip_id))
    }
}

#[async_trait]
impl TripBackend for FakeBackend {
    async fn create_trip(&self, recording: &VoiceRecording) -> ApiResult<Trip> {
        self.record(format!("create_trip {}", recording.file_name));
        if let Some(err) = self.failures.lock().unwrap().create.clone() {
            return Err(err);
        }
        let mut trip = Trip::from_new(
            fixtures::tokyo_draft(),
            format!("srv-{}", self.remote.lock().unwrap().len() + 1),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );
        trip.voice_file_name = Some(recording.file_name.clone());
        self.remote.lock().unwrap().insert(0, trip.clone());
        Ok(trip)
    }

    async fn get_trips(&self) -> ApiResult<Vec<Trip>> {
        self.record("get_trips".to_string());
        let failure = self.failures.lock().unwrap().list.clone();
        let snapshot = self.remote.lock().unwrap().clone();
        let gate = self.list_gate.lock().unwrap().take();

        self.list_started.notify_one();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(snapshot),
        }
    }

    async fn get_trip(&self, trip_id: &str) -> ApiResult<Trip> {
        self.record(format!("get_trip {}", trip_id));
        self.remote_trip(trip_id).ok_or_else(|| Self::not_found(trip_id))
    }

    async fn update_trip_status(
        &self,
        trip_id: &str,
        status: TripStatus,
        booking_reference: Option<&str>,
    ) -> ApiResult<Trip> {
        self.record(format!("update_trip_status {} {}", trip_id, status));
        let gate = self.status_gate.lock().unwrap().take();
        self.status_started.notify_one();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if let Some(err) = self.failures.lock().unwrap().status.clone() {
            return Err(err);
        }
        let mut remote = self.remote.lock().unwrap();
        let trip = remote
            .iter_mut()
            .find(|t| t.id == trip_id)
            .ok_or_else(|| Self::not_found(trip_id))?;
        trip.status = status;
        if let Some(reference) = booking_reference {
            trip.booking_reference = Some(reference.to_string());
        }
        Ok(trip.clone())
    }

    async fn process_payment(&self, request: &PaymentRequest) -> ApiResult<PaymentResponse> {
        self.record(format!("process_payment {} {}", request.trip_id, request.amount));
        if let Some(err) = self.failures.lock().unwrap().payment.clone() {
            return Err(err);
        }
        Ok(PaymentResponse {
            payment_id: format!("pay-{}", request.trip_id),
            status: "succeeded".to_string(),
            booking_reference: booking::generate_reference(),
        })
    }

    async fn download_itinerary(&self, trip_id: &str) -> ApiResult<ItineraryDescriptor> {
        self.record(format!("download_itinerary {}", trip_id));
        let trip = self.remote_trip(trip_id).ok_or_else(|| Self::not_found(trip_id))?;
        Ok(ItineraryDescriptor {
            message: "Itinerary ready".to_string(),
            trip_id: trip.id.clone(),
            destination: trip.destination,
            download_url: format!("/trips/{}/itinerary.pdf", trip.id),
        })
    }

    async fn get_voice_file(&self, trip_id: &str) -> ApiResult<Vec<u8>> {
        self.record(format!("get_voice_file {}", trip_id));
        Err(Self::not_found(trip_id))
    }

    async fn list_voice_files(&self) -> ApiResult<VoiceFileListing> {
        self.record("list_voice_files".to_string());
        Ok(VoiceFileListing::default())
    }
}
