//! # API Module
//!
//! HTTP front end over the chain core. Handlers parse input, call the typed
//! core operations and render JSON; they own no chain logic.
//!
//! ## Available Endpoints
//!
//! - `GET /health` - Liveness plus network and service account
//! - `GET /balance?address=0x..` - Native balance in whole units
//! - `GET /predict?address=0x..` - Balance-derived trend label
//! - `POST /payments` - Send native value from the service account
//! - `POST /agent/register` - Register a named agent
//! - `GET /agent/list` - List registered agents

use std::str::FromStr;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use ethers::types::Address;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::AppState;

pub mod agents;
pub mod balance;
pub mod error;
pub mod health;
pub mod payments;
pub mod predict;

pub use error::ApiError;

/// Upper bound on handling any single HTTP request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Query string shared by the address-based endpoints.
#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    pub address: Option<String>,
}

/// Build the service router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/balance", get(balance::get_balance_handler))
        .route("/predict", get(predict::predict_handler))
        .route("/payments", post(payments::send_payment_handler))
        .route("/agent/register", post(agents::register_agent_handler))
        .route("/agent/list", get(agents::list_agents_handler))
        .with_state(state)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Parse a 0x-prefixed 20-byte hex address supplied by a client.
pub(crate) fn parse_address(field: &str, raw: Option<&str>) -> Result<Address, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("Missing {} parameter", field)))?;

    if !raw.starts_with("0x") || raw.len() != 42 {
        return Err(ApiError::bad_request(format!(
            "Invalid {}: expected a 0x-prefixed 40-character hex address",
            field
        )));
    }

    Address::from_str(raw)
        .map_err(|_| ApiError::bad_request(format!("Invalid {}: not a hex address", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_address_accepts_any_case() {
        let lower = parse_address("address", Some("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266")).unwrap();
        let mixed = parse_address("address", Some("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")).unwrap();
        assert_eq!(lower, mixed);
    }

    #[test]
    fn parse_address_rejects_missing_and_malformed_input() {
        assert!(parse_address("address", None).is_err());
        assert!(parse_address("address", Some("  ")).is_err());
        assert!(parse_address("address", Some("0xDEADBEEF")).is_err());
        assert!(parse_address("address", Some("f39fd6e51aad88f6f4ce6ab8827279cfffb92266")).is_err());
        assert!(parse_address("address", Some("0xz39fd6e51aad88f6f4ce6ab8827279cfffb92266")).is_err());
    }
}
