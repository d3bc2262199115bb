use axum::{extract::State, http::StatusCode, Json};
use ethers::{types::U256, utils::to_checksum};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    api::{parse_address, ApiError},
    blockchain::payment,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct SendPaymentRequest {
    pub to: String,
    /// Decimal wei amount; a string so values above 2^64 survive JSON.
    pub value_wei: String,
}

#[derive(Debug, Serialize)]
pub struct SendPaymentResponse {
    pub tx_hash: String,
    pub from: String,
    pub to: String,
    pub value_wei: String,
}

pub async fn send_payment_handler(
    State(state): State<AppState>,
    Json(req): Json<SendPaymentRequest>,
) -> Result<Json<SendPaymentResponse>, ApiError> {
    if !state.payments_enabled {
        return Err(ApiError::new(StatusCode::FORBIDDEN, "Payments are disabled on this server"));
    }

    let to = parse_address("to", Some(&req.to))?;
    let value = U256::from_dec_str(req.value_wei.trim())
        .map_err(|_| ApiError::bad_request("value_wei must be a non-negative decimal integer"))?;

    let from = state.account.address();
    info!(?from, ?to, %value, "Received payment request");

    // Hold the sender's lane for the whole submission so nonces stay unique.
    let _lane = state.send_queue.acquire(from).await;
    let ctx = state.call_context();
    let handle = payment::send(&ctx, &state.account, to, value, &state.connector).await?;

    Ok(Json(SendPaymentResponse {
        tx_hash: handle.to_string(),
        from: to_checksum(&from, None),
        to: to_checksum(&to, None),
        value_wei: value.to_string(),
    }))
}
