// src/lib.rs

use std::sync::Arc;
use std::time::Duration;

// Re-export commonly used types
pub use ethers::types::{Address, H256, U256};

// Re-export modules
pub mod agents;
pub mod api;
pub mod blockchain;
pub mod config;
pub mod prediction;

use blockchain::{
    account_key::AccountKey, connector::ChainConnector, context::CallContext,
    send_queue::SendQueue,
};

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Label of the configured network
    pub network_name: Arc<str>,
    /// Deadline applied to every call into the RPC node
    pub rpc_timeout: Duration,
    /// Whether the payment endpoint may spend from the service account
    pub payments_enabled: bool,
    /// Session with the RPC node
    pub connector: ChainConnector,
    /// The service account's signing key
    pub account: Arc<AccountKey>,
    /// Serialises payments per sender
    pub send_queue: SendQueue,
    /// Registered agents
    pub agents: agents::AgentRegistry,
}

impl AppState {
    /// A fresh context bounded by the configured RPC timeout.
    pub fn call_context(&self) -> CallContext {
        CallContext::with_timeout(self.rpc_timeout)
    }
}
