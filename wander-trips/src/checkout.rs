use std::sync::Arc;
use tracing::{error, info};
use wander_core::{booking, ApiError, TripBackend};
use wander_shared::{ItineraryDescriptor, PaymentRequest, PaymentResponse, Trip, TripStatus};

use crate::store::{TripStore, TripStoreError};

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Card payments need card number, expiry date, CVV and cardholder name")]
    MissingCardDetails,

    #[error("Trip {0} is already confirmed")]
    AlreadyConfirmed(String),

    #[error("Payment failed: {0}")]
    Payment(#[source] ApiError),

    /// Money was taken but the trip could not be confirmed; retry the
    /// confirmation with `booking_reference` instead of paying again.
    #[error("Payment {booking_reference} succeeded but confirmation failed: {source}")]
    Confirmation {
        booking_reference: String,
        #[source]
        source: TripStoreError,
    },
}

/// Result of a completed checkout
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub payment: PaymentResponse,
    /// Local record after confirmation; `None` when the store has not loaded the trip yet
    pub trip: Option<Trip>,
}

/// Payment followed by draft → confirmed
pub struct CheckoutService {
    backend: Arc<dyn TripBackend>,
    store: Arc<TripStore>,
}

impl CheckoutService {
    pub fn new(backend: Arc<dyn TripBackend>, store: Arc<TripStore>) -> Self {
        Self { backend, store }
    }

    /// Charge for a trip, then confirm it with the issued booking reference.
    ///
    /// If the payment is rejected the trip stays a draft and nothing is attached.
    /// A trip the store already holds as confirmed is never charged.
    pub async fn pay_and_confirm(&self, request: PaymentRequest) -> Result<Confirmation, CheckoutError> {
        if self.store.get_trip_by_id(&request.trip_id).is_some_and(|trip| trip.is_confirmed()) {
            return Err(CheckoutError::AlreadyConfirmed(request.trip_id));
        }
        if request.payment_method.requires_card_details()
            && !request.card_details.as_ref().is_some_and(|card| card.is_complete())
        {
            return Err(CheckoutError::MissingCardDetails);
        }

        let payment = self.backend.process_payment(&request).await.map_err(|e| {
            error!("Payment error for trip {}: {}", request.trip_id, e);
            CheckoutError::Payment(e)
        })?;
        info!(
            "Payment {} for trip {} is {}",
            payment.payment_id, request.trip_id, payment.status
        );

        let trip = self
            .store
            .update_trip_status(&request.trip_id, TripStatus::Confirmed, Some(&payment.booking_reference))
            .await
            .map_err(|source| CheckoutError::Confirmation {
                booking_reference: payment.booking_reference.clone(),
                source,
            })?;

        Ok(Confirmation { payment, trip })
    }

    /// Confirm a trip outside the payment flow, issuing a reference when none is given.
    pub async fn confirm_external(
        &self,
        trip_id: &str,
        booking_reference: Option<&str>,
    ) -> Result<Option<Trip>, TripStoreError> {
        let existing = self
            .store
            .get_trip_by_id(trip_id)
            .and_then(|trip| trip.booking_reference);
        let reference = booking::normalize_reference(booking_reference)
            .or(existing)
            .unwrap_or_else(booking::generate_reference);

        self.store
            .update_trip_status(trip_id, TripStatus::Confirmed, Some(&reference))
            .await
    }

    pub async fn download_itinerary(&self, trip_id: &str) -> Result<ItineraryDescriptor, ApiError> {
        let descriptor = self.backend.download_itinerary(trip_id).await.map_err(|e| {
            error!("Download error for trip {}: {}", trip_id, e);
            e
        })?;
        info!("Itinerary for {} ready at {}", descriptor.destination, descriptor.download_url);
        Ok(descriptor)
    }
}
