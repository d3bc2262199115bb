// src/agents.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

pub const MAX_AGENT_NAME_LEN: usize = 64;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AgentError {
    #[error("agent name must not be empty")]
    EmptyName,
    #[error("agent name must be at most {} characters", MAX_AGENT_NAME_LEN)]
    NameTooLong,
    #[error("agent '{0}' is already registered")]
    AlreadyRegistered(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentRecord {
    pub id: Uuid,
    pub name: String,
    pub registered_at: DateTime<Utc>,
}

/// In-memory registry of named agents, keyed by name. Nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: Arc<DashMap<String, AgentRecord>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &str) -> Result<AgentRecord, AgentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AgentError::EmptyName);
        }
        if name.chars().count() > MAX_AGENT_NAME_LEN {
            return Err(AgentError::NameTooLong);
        }

        match self.agents.entry(name.to_string()) {
            Entry::Occupied(_) => Err(AgentError::AlreadyRegistered(name.to_string())),
            Entry::Vacant(slot) => {
                let record = AgentRecord {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    registered_at: Utc::now(),
                };
                slot.insert(record.clone());
                info!(agent = %record.name, id = %record.id, "Agent registered");
                Ok(record)
            }
        }
    }

    /// All agents, oldest registration first.
    pub fn list(&self) -> Vec<AgentRecord> {
        let mut agents: Vec<AgentRecord> = self.agents.iter().map(|e| e.value().clone()).collect();
        agents.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        agents
    }
}
