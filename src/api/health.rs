use axum::{extract::State, response::IntoResponse, Json};
use ethers::utils::to_checksum;

use crate::AppState;

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "network": state.network_name.as_ref(),
        "chain_id": state.connector.chain_id(),
        "account": to_checksum(&state.account.address(), None),
    }))
}
