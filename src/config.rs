// src/config.rs

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretString;

use crate::api::REQUEST_TIMEOUT;

/// Largest accepted `RPC_TIMEOUT_SECS`. Node calls must give up before the
/// router's own request timeout, so a slow node surfaces as 504 and not 408.
pub const MAX_RPC_TIMEOUT_SECS: u64 = REQUEST_TIMEOUT.as_secs() - 5;

/// Process configuration, loaded once at startup from the environment (and a
/// `.env` file if present).
#[derive(Debug)]
pub struct Config {
    // Server settings
    pub host: String,
    pub port: u16,
    /// Whether `POST /payments` may spend from the service account.
    pub payments_enabled: bool,

    // Blockchain settings
    pub rpc_url: String,
    /// Free-form label reported by `/health`, e.g. "sepolia".
    pub network_name: String,
    /// Per-call deadline for requests to the RPC node.
    pub rpc_timeout: Duration,

    // Account settings
    /// Hex-encoded signing key. Only parsed into an `AccountKey`; never printed.
    pub private_key: SecretString,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = lookup("RPC_URL")
            .filter(|v| !v.trim().is_empty())
            .context("RPC_URL must be set to the JSON-RPC endpoint of an EVM node")?;
        let private_key = lookup("PRIVATE_KEY")
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::new)
            .context("PRIVATE_KEY must be set to the hex-encoded signing key")?;

        let rpc_timeout_secs: u64 = lookup("RPC_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("RPC_TIMEOUT_SECS must be a valid number")?;
        if rpc_timeout_secs == 0 || rpc_timeout_secs > MAX_RPC_TIMEOUT_SECS {
            anyhow::bail!(
                "RPC_TIMEOUT_SECS must be between 1 and {}, got {}",
                MAX_RPC_TIMEOUT_SECS,
                rpc_timeout_secs
            );
        }

        Ok(Config {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            payments_enabled: lookup("PAYMENTS_ENABLED")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),

            rpc_url,
            network_name: lookup("NETWORK_NAME")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            rpc_timeout: Duration::from_secs(rpc_timeout_secs),

            private_key,
        })
    }
}
