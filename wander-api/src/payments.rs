use axum::{extract::State, routing::post, Json, Router};
use tracing::info;
use wander_shared::{PaymentRequest, PaymentResponse};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/payments", post(process_payment))
}

/// POST /payments
/// Records the payment and issues a booking reference. The trip stays a
/// draft until the client confirms it through the status endpoint.
async fn process_payment(
    State(state): State<AppState>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<PaymentResponse>, AppError> {
    // card_details is masked in Debug output
    tracing::debug!("Payment request: {:?}", request);

    let response = state.registry.write().await.record_payment(&request)?;
    info!(
        "Payment {} of {} for trip {} via {}",
        response.payment_id, request.amount, request.trip_id, request.payment_method
    );
    Ok(Json(response))
}
