use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::{
    api::{parse_address, AddressQuery, ApiError},
    blockchain::balance,
    prediction::{self, Trend},
    AppState,
};

#[derive(Debug, Serialize)]
pub struct PredictOutput {
    pub address: String,
    pub trend: Trend,
    /// Percentage with two decimals, e.g. "82.00%".
    pub confidence: String,
}

pub async fn predict_handler(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
) -> Result<Json<PredictOutput>, ApiError> {
    let address = parse_address("address", query.address.as_deref())?;

    let ctx = state.call_context();
    let balance = balance::report(&ctx, &state.connector, address).await?;
    let prediction = prediction::predict(&balance);

    info!(?address, trend = %prediction.trend, "Trend predicted");

    Ok(Json(PredictOutput {
        address: query.address.unwrap_or_default().trim().to_string(),
        trend: prediction.trend,
        confidence: prediction.confidence_percent(),
    }))
}
