use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Local;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use wander_core::{booking, ApiError, TripBackend};
use wander_shared::{NewTrip, Trip, TripStatus};

/// How status updates are reconciled with the backend.
///
/// With `optimistic = false` (the default) the backend is called first and the
/// local record changes only after it succeeds. With `optimistic = true` the
/// local record changes immediately and is restored if the backend fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    pub optimistic: bool,
}

/// Change notifications for presentation code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripStoreEvent {
    Refreshed { count: usize },
    Added { trip_id: String },
    StatusChanged { trip_id: String, status: TripStatus },
}

#[derive(Debug, thiserror::Error)]
pub enum TripStoreError {
    #[error("Backend request failed: {0}")]
    Backend(#[from] ApiError),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: TripStatus, to: TripStatus },

    #[error("Trip {0} cannot be confirmed without a booking reference")]
    MissingBookingReference(String),
}

struct Collection {
    trips: Vec<Trip>,
    // Generation of the refresh whose result is currently applied
    applied_refresh: u64,
}

/// Session-scoped source of truth for the user's trips.
///
/// Construct once, share as `Arc<TripStore>`. Readers always get cloned
/// snapshots; every mutation is a single step under the write lock.
pub struct TripStore {
    backend: Arc<dyn TripBackend>,
    options: StoreOptions,
    collection: RwLock<Collection>,
    refreshes_in_flight: AtomicUsize,
    refresh_generation: AtomicU64,
    last_local_id: AtomicU64,
    events: broadcast::Sender<TripStoreEvent>,
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl TripStore {
    pub fn new(backend: Arc<dyn TripBackend>, options: StoreOptions) -> Self {
        Self::with_trips(backend, options, Vec::new())
    }

    /// Start from an already-known collection (newest first)
    pub fn with_trips(backend: Arc<dyn TripBackend>, options: StoreOptions, trips: Vec<Trip>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            backend,
            options,
            collection: RwLock::new(Collection { trips, applied_refresh: 0 }),
            refreshes_in_flight: AtomicUsize::new(0),
            refresh_generation: AtomicU64::new(0),
            last_local_id: AtomicU64::new(0),
            events,
        }
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TripStoreEvent> {
        self.events.subscribe()
    }

    /// True only while a refresh is in flight
    pub fn is_loading(&self) -> bool {
        self.refreshes_in_flight.load(Ordering::SeqCst) > 0
    }

    /// Snapshot of the collection in display order
    pub fn trips(&self) -> Vec<Trip> {
        read_lock(&self.collection).trips.clone()
    }

    pub fn get_trip_by_id(&self, trip_id: &str) -> Option<Trip> {
        read_lock(&self.collection)
            .trips
            .iter()
            .find(|trip| trip.id == trip_id)
            .cloned()
    }

    /// Replace the whole collection with the backend's list.
    ///
    /// On failure the collection is left exactly as it was. A refresh that
    /// finishes after a newer one has already been applied is dropped.
    pub async fn refresh(&self) -> Result<(), TripStoreError> {
        let _loading = LoadingGuard::enter(&self.refreshes_in_flight);
        let generation = self.refresh_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let fetched = match self.backend.get_trips().await {
            Ok(trips) => trips,
            Err(e) => {
                warn!("Trip refresh failed, keeping {} cached trips: {}", self.trips().len(), e);
                return Err(e.into());
            }
        };

        let count = fetched.len();
        {
            let mut collection = write_lock(&self.collection);
            if generation < collection.applied_refresh {
                debug!(
                    "Dropping refresh #{} superseded by #{}",
                    generation, collection.applied_refresh
                );
                return Ok(());
            }
            collection.trips = fetched;
            collection.applied_refresh = generation;
        }

        info!("Trip store refreshed with {} trips", count);
        self.publish(TripStoreEvent::Refreshed { count });
        Ok(())
    }

    /// Insert a client-side trip at the front and return its generated id.
    ///
    /// A trip added as confirmed without a usable booking reference gets a
    /// freshly issued one.
    pub fn add_trip(&self, new_trip: NewTrip) -> String {
        let trip_id = self.next_local_id();
        let today = Local::now().date_naive();
        let mut trip = Trip::from_new(new_trip, trip_id.clone(), today);

        trip.booking_reference = booking::normalize_reference(trip.booking_reference.as_deref());
        if trip.status == TripStatus::Confirmed && trip.booking_reference.is_none() {
            let reference = booking::generate_reference();
            warn!(
                "Confirmed trip {} added without a booking reference, issued {}",
                trip_id, reference
            );
            trip.booking_reference = Some(reference);
        }

        write_lock(&self.collection).trips.insert(0, trip);

        info!("Added local trip {}", trip_id);
        self.publish(TripStoreEvent::Added { trip_id: trip_id.clone() });
        trip_id
    }

    /// Persist a status change and mirror it locally.
    ///
    /// Returns the updated local record, or `None` when the trip is not in
    /// the local collection (the backend is still called). A supplied
    /// booking reference replaces the stored one; otherwise the stored one is kept.
    pub async fn update_trip_status(
        &self,
        trip_id: &str,
        status: TripStatus,
        booking_reference: Option<&str>,
    ) -> Result<Option<Trip>, TripStoreError> {
        let reference = booking::normalize_reference(booking_reference);
        let local = self.get_trip_by_id(trip_id);

        if let Some(current) = &local {
            if !current.status.can_transition_to(status) {
                return Err(TripStoreError::InvalidTransition { from: current.status, to: status });
            }
        }

        let has_reference = reference.is_some()
            || local.as_ref().is_some_and(|trip| {
                booking::normalize_reference(trip.booking_reference.as_deref()).is_some()
            });
        if status == TripStatus::Confirmed && !has_reference {
            return Err(TripStoreError::MissingBookingReference(trip_id.to_string()));
        }

        if local.is_none() {
            warn!("Status update for trip {} which is not in the local collection", trip_id);
        }

        if self.options.optimistic {
            let previous = self.apply_status(trip_id, status, reference.as_deref());
            match self.backend.update_trip_status(trip_id, status, reference.as_deref()).await {
                Ok(_) => Ok(self.get_trip_by_id(trip_id)),
                Err(e) => {
                    warn!("Status update for trip {} failed, rolling back: {}", trip_id, e);
                    if let Some(previous) = previous {
                        self.restore(trip_id, previous.status, previous.booking_reference);
                    }
                    Err(e.into())
                }
            }
        } else {
            let persisted = self
                .backend
                .update_trip_status(trip_id, status, reference.as_deref())
                .await
                .map_err(|e| {
                    warn!("Status update for trip {} failed: {}", trip_id, e);
                    TripStoreError::from(e)
                })?;
            if persisted.status != status {
                warn!(
                    "Backend reports trip {} as {} after requesting {}",
                    trip_id, persisted.status, status
                );
            }
            self.apply_status(trip_id, status, reference.as_deref());
            Ok(self.get_trip_by_id(trip_id))
        }
    }

    // Returns the record as it was before the change.
    fn apply_status(&self, trip_id: &str, status: TripStatus, reference: Option<&str>) -> Option<Trip> {
        let previous = {
            let mut collection = write_lock(&self.collection);
            let trip = collection.trips.iter_mut().find(|trip| trip.id == trip_id)?;
            let previous = trip.clone();
            trip.status = status;
            if let Some(reference) = reference {
                trip.booking_reference = Some(reference.to_string());
            }
            previous
        };

        info!("Trip {} is now {}", trip_id, status);
        self.publish(TripStoreEvent::StatusChanged { trip_id: trip_id.to_string(), status });
        Some(previous)
    }

    // Only the fields an update touches; anything a refresh brought in meanwhile stays.
    fn restore(&self, trip_id: &str, status: TripStatus, booking_reference: Option<String>) {
        {
            let mut collection = write_lock(&self.collection);
            match collection.trips.iter_mut().find(|trip| trip.id == trip_id) {
                Some(trip) => {
                    trip.status = status;
                    trip.booking_reference = booking_reference;
                }
                None => return,
            }
        }
        self.publish(TripStoreEvent::StatusChanged { trip_id: trip_id.to_string(), status });
    }

    // Millisecond timestamp, bumped when two trips land in the same millisecond.
    fn next_local_id(&self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let mut last = self.last_local_id.load(Ordering::SeqCst);
        loop {
            let next = now.max(last + 1);
            match self.last_local_id.compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst) {
                Ok(_) => return next.to_string(),
                Err(actual) => last = actual,
            }
        }
    }

    fn publish(&self, event: TripStoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{draft_trip, rome_draft, FakeBackend};
    use wander_core::fixtures;

    fn store_with(backend: &Arc<FakeBackend>, options: StoreOptions) -> Arc<TripStore> {
        Arc::new(TripStore::new(backend.clone(), options))
    }

    #[test]
    fn test_add_trip_then_lookup() {
        let backend = Arc::new(FakeBackend::default());
        let store = store_with(&backend, StoreOptions::default());

        let id = store.add_trip(rome_draft());
        let trip = store.get_trip_by_id(&id).unwrap();

        assert_eq!(trip.id, id);
        assert_eq!(trip.destination, "Rome");
        assert_eq!(trip.duration, "3 days");
        assert_eq!(trip.cost, 500);
        assert_eq!(trip.status, TripStatus::Draft);
        assert_eq!(trip.date, Local::now().date_naive());
        assert_eq!(NewTrip::from(&trip), rome_draft());
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_add_trip_prepends_with_unique_ids() {
        let backend = Arc::new(FakeBackend::default());
        let store = store_with(&backend, StoreOptions::default());

        let first = store.add_trip(rome_draft());
        let second = store.add_trip(fixtures::tokyo_draft());

        assert_ne!(first, second);
        let ids: Vec<String> = store.trips().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn test_unknown_id_is_absent() {
        let backend = Arc::new(FakeBackend::default());
        let store = store_with(&backend, StoreOptions::default());
        assert!(store.get_trip_by_id("missing").is_none());
    }

    #[tokio::test]
    async fn test_refresh_with_empty_backend() {
        let backend = Arc::new(FakeBackend::default());
        let store = Arc::new(TripStore::with_trips(
            backend.clone(),
            StoreOptions::default(),
            fixtures::sample_history(),
        ));
        let gate = backend.hold_next_list();

        let pending = {
            let store = store.clone();
            tokio::spawn(async move { store.refresh().await })
        };
        backend.list_started().await;
        assert!(store.is_loading());

        gate.send(()).unwrap();
        pending.await.unwrap().unwrap();

        assert!(!store.is_loading());
        assert!(store.trips().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_keeps_backend_order() {
        let backend = Arc::new(FakeBackend::with_remote(fixtures::sample_history()));
        let store = store_with(&backend, StoreOptions::default());
        let mut events = store.subscribe();

        store.refresh().await.unwrap();

        let ids: Vec<String> = store.trips().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(events.try_recv().unwrap(), TripStoreEvent::Refreshed { count: 2 });
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_collection_untouched() {
        let backend = Arc::new(FakeBackend::with_remote(vec![draft_trip("remote", 10)]));
        let store = store_with(&backend, StoreOptions::default());
        store.add_trip(rome_draft());
        let before = store.trips();

        backend.fail_list(ApiError::transport("connection refused"));
        let err = store.refresh().await.unwrap_err();

        assert!(matches!(err, TripStoreError::Backend(ApiError::Transport { .. })));
        assert_eq!(store.trips(), before);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_superseded_refresh_is_dropped() {
        let backend = Arc::new(FakeBackend::with_remote(vec![draft_trip("old", 10)]));
        let store = store_with(&backend, StoreOptions::default());
        let gate = backend.hold_next_list();

        let slow = {
            let store = store.clone();
            tokio::spawn(async move { store.refresh().await })
        };
        backend.list_started().await;

        backend.set_remote(vec![draft_trip("new", 20)]);
        store.refresh().await.unwrap();
        assert!(store.is_loading());

        gate.send(()).unwrap();
        slow.await.unwrap().unwrap();

        let ids: Vec<String> = store.trips().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["new".to_string()]);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_confirm_existing_draft() {
        let backend = Arc::new(FakeBackend::with_remote(vec![draft_trip("t1", 500)]));
        let store = store_with(&backend, StoreOptions::default());
        store.refresh().await.unwrap();

        let updated = store
            .update_trip_status("t1", TripStatus::Confirmed, Some("TRVXYZ"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, TripStatus::Confirmed);
        assert_eq!(updated.booking_reference.as_deref(), Some("TRVXYZ"));
        assert_eq!(updated.cost, 500);
        assert_eq!(store.get_trip_by_id("t1").unwrap(), updated);
        assert!(backend.calls().contains(&"update_trip_status t1 confirmed".to_string()));
    }

    #[tokio::test]
    async fn test_confirm_without_reference_is_rejected() {
        let backend = Arc::new(FakeBackend::with_remote(vec![draft_trip("t1", 500)]));
        let store = store_with(&backend, StoreOptions::default());
        store.refresh().await.unwrap();

        for reference in [None, Some(""), Some("   ")] {
            let err = store
                .update_trip_status("t1", TripStatus::Confirmed, reference)
                .await
                .unwrap_err();
            assert!(matches!(err, TripStoreError::MissingBookingReference(_)));
        }

        assert_eq!(store.get_trip_by_id("t1").unwrap().status, TripStatus::Draft);
        assert!(!backend.calls().iter().any(|c| c.starts_with("update_trip_status")));
    }

    #[tokio::test]
    async fn test_reconfirm_keeps_existing_reference() {
        let backend = Arc::new(FakeBackend::with_remote(fixtures::sample_history()));
        let store = store_with(&backend, StoreOptions::default());
        store.refresh().await.unwrap();

        let trip = store
            .update_trip_status("1", TripStatus::Confirmed, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(trip.booking_reference.as_deref(), Some("TRVAB123XYZ"));
    }

    #[tokio::test]
    async fn test_backward_transition_is_rejected() {
        let backend = Arc::new(FakeBackend::with_remote(fixtures::sample_history()));
        let store = store_with(&backend, StoreOptions::default());
        store.refresh().await.unwrap();

        let err = store.update_trip_status("1", TripStatus::Draft, None).await.unwrap_err();
        assert!(matches!(
            err,
            TripStoreError::InvalidTransition { from: TripStatus::Confirmed, to: TripStatus::Draft }
        ));
        assert!(store.get_trip_by_id("1").unwrap().is_confirmed());
    }

    #[tokio::test]
    async fn test_unknown_local_trip_still_calls_backend() {
        let backend = Arc::new(FakeBackend::with_remote(vec![draft_trip("remote-only", 70)]));
        let store = store_with(&backend, StoreOptions::default());
        let local_id = store.add_trip(rome_draft());
        let before = store.trips();

        let result = store
            .update_trip_status("remote-only", TripStatus::Confirmed, Some("TRVREMOTE01"))
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(store.trips(), before);
        assert_eq!(store.get_trip_by_id(&local_id).unwrap().status, TripStatus::Draft);
        assert_eq!(backend.remote_trip("remote-only").unwrap().status, TripStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_backend_failure_leaves_local_state() {
        let backend = Arc::new(FakeBackend::with_remote(vec![draft_trip("t1", 500)]));
        let store = store_with(&backend, StoreOptions::default());
        store.refresh().await.unwrap();
        backend.fail_status(ApiError::status_code(500, "db down"));

        let err = store
            .update_trip_status("t1", TripStatus::Confirmed, Some("TRVXYZ"))
            .await
            .unwrap_err();

        assert!(matches!(err, TripStoreError::Backend(ApiError::Status { status: 500, .. })));
        let trip = store.get_trip_by_id("t1").unwrap();
        assert_eq!(trip.status, TripStatus::Draft);
        assert!(trip.booking_reference.is_none());
    }

    #[tokio::test]
    async fn test_optimistic_update_rolls_back_on_failure() {
        let backend = Arc::new(FakeBackend::with_remote(vec![draft_trip("t1", 500)]));
        let store = store_with(&backend, StoreOptions { optimistic: true });
        store.refresh().await.unwrap();
        let before = store.trips();
        let mut events = store.subscribe();
        backend.fail_status(ApiError::transport("timeout"));

        assert!(store
            .update_trip_status("t1", TripStatus::Confirmed, Some("TRVXYZ"))
            .await
            .is_err());

        assert_eq!(store.trips(), before);
        assert_eq!(
            events.try_recv().unwrap(),
            TripStoreEvent::StatusChanged { trip_id: "t1".to_string(), status: TripStatus::Confirmed }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            TripStoreEvent::StatusChanged { trip_id: "t1".to_string(), status: TripStatus::Draft }
        );
    }

    #[tokio::test]
    async fn test_optimistic_update_success() {
        let backend = Arc::new(FakeBackend::with_remote(vec![draft_trip("t1", 500)]));
        let store = store_with(&backend, StoreOptions { optimistic: true });
        store.refresh().await.unwrap();

        let trip = store
            .update_trip_status("t1", TripStatus::Confirmed, Some("TRVXYZ"))
            .await
            .unwrap()
            .unwrap();
        assert!(trip.is_confirmed());
        assert!(trip.has_consistent_booking());
    }

    #[test]
    fn test_confirmed_trip_added_without_reference_gets_one() {
        let backend = Arc::new(FakeBackend::default());
        let store = store_with(&backend, StoreOptions::default());

        for reference in [None, Some("  ".to_string())] {
            let new_trip = NewTrip {
                status: TripStatus::Confirmed,
                booking_reference: reference,
                ..rome_draft()
            };
            let trip = store.get_trip_by_id(&store.add_trip(new_trip)).unwrap();

            assert!(trip.is_confirmed());
            assert!(trip.has_consistent_booking());
            assert!(booking::is_issued_format(trip.booking_reference.as_deref().unwrap()));
        }
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_added_trip_keeps_supplied_reference() {
        let backend = Arc::new(FakeBackend::default());
        let store = store_with(&backend, StoreOptions::default());
        let new_trip = NewTrip {
            status: TripStatus::Confirmed,
            booking_reference: Some(" TRVAB123XYZ ".to_string()),
            ..rome_draft()
        };

        let trip = store.get_trip_by_id(&store.add_trip(new_trip)).unwrap();
        assert_eq!(trip.booking_reference.as_deref(), Some("TRVAB123XYZ"));
    }

    #[tokio::test]
    async fn test_blank_stored_reference_does_not_allow_confirmation() {
        let mut remote = draft_trip("t1", 500);
        remote.booking_reference = Some(String::new());
        let backend = Arc::new(FakeBackend::with_remote(vec![remote]));
        let store = store_with(&backend, StoreOptions::default());
        store.refresh().await.unwrap();

        let err = store.update_trip_status("t1", TripStatus::Confirmed, None).await.unwrap_err();

        assert!(matches!(err, TripStoreError::MissingBookingReference(_)));
        assert_eq!(store.get_trip_by_id("t1").unwrap().status, TripStatus::Draft);
        assert!(!backend.calls().iter().any(|c| c.starts_with("update_trip_status")));
    }

    #[tokio::test]
    async fn test_rollback_keeps_fields_from_concurrent_refresh() {
        let backend = Arc::new(FakeBackend::with_remote(vec![draft_trip("t1", 500)]));
        let store = store_with(&backend, StoreOptions { optimistic: true });
        store.refresh().await.unwrap();
        backend.fail_status(ApiError::transport("timeout"));
        let gate = backend.hold_next_status();

        let pending = {
            let store = store.clone();
            tokio::spawn(async move {
                store.update_trip_status("t1", TripStatus::Confirmed, Some("TRVXYZ")).await
            })
        };
        backend.status_started().await;
        assert!(store.get_trip_by_id("t1").unwrap().is_confirmed());

        backend.set_remote(vec![draft_trip("t1", 650)]);
        store.refresh().await.unwrap();
        gate.send(()).unwrap();
        assert!(pending.await.unwrap().is_err());

        let trip = store.get_trip_by_id("t1").unwrap();
        assert_eq!(trip.status, TripStatus::Draft);
        assert!(trip.booking_reference.is_none());
        assert_eq!(trip.cost, 650);
    }
}
