use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::{agents::AgentRecord, api::ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterAgentRequest {
    pub name: String,
}

pub async fn register_agent_handler(
    State(state): State<AppState>,
    Json(req): Json<RegisterAgentRequest>,
) -> Result<(StatusCode, Json<AgentRecord>), ApiError> {
    let record = state.agents.register(&req.name)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_agents_handler(State(state): State<AppState>) -> Json<Vec<AgentRecord>> {
    Json(state.agents.list())
}
