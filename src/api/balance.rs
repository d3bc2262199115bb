use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::{
    api::{parse_address, AddressQuery, ApiError},
    blockchain::balance,
    AppState,
};

// Defines the structure for the JSON output returned by our API.
#[derive(Debug, Serialize)]
pub struct BalanceOutput {
    /// The address exactly as the client supplied it.
    pub address: String,
    /// Balance in whole native units, exact decimal.
    pub balance: String,
    pub balance_wei: String,
}

// The handler function for the GET /balance?address=0x.. endpoint.
pub async fn get_balance_handler(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
) -> Result<Json<BalanceOutput>, ApiError> {
    let address = parse_address("address", query.address.as_deref())?;

    let ctx = state.call_context();
    let balance = balance::report(&ctx, &state.connector, address).await?;
    debug!(?address, %balance, "Balance reported");

    Ok(Json(BalanceOutput {
        address: query.address.unwrap_or_default().trim().to_string(),
        balance: balance.to_string(),
        balance_wei: balance.raw().to_string(),
    }))
}
