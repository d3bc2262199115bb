//! JSON-RPC connector to a single EVM node.
//!
//! This is the only module that performs network I/O against the chain. It
//! never retries: every failure is returned to the caller as-is.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ethers::types::{Address, Bytes, H256, U256};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::blockchain::{
    context::CallContext,
    error::{ChainError, ChainResult},
};

/// Upper bound on the `eth_chainId` handshake performed by [`ChainConnector::connect`].
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Durable reference to a broadcast transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHandle {
    pub id: H256,
}

impl std::fmt::Display for TransactionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.id)
    }
}

/// Outcome of a single JSON-RPC exchange that reached the node.
enum RpcReply {
    Result(Value),
    Error { code: i64, message: String },
}

/// Why a read call produced no value.
#[derive(Debug)]
pub(crate) enum ReadFailure {
    /// Transport failure, deadline, cancellation or an unusable reply.
    Call(ChainError),
    /// The node answered with a JSON-RPC error object.
    Node { code: i64, message: String },
}

impl ReadFailure {
    fn into_chain_error(self, method: &str) -> ChainError {
        match self {
            ReadFailure::Call(err) => err,
            ReadFailure::Node { code, message } => ChainError::Connection(format!(
                "{} failed with RPC error {}: {}",
                method, code, message
            )),
        }
    }
}

/// Session with one JSON-RPC endpoint.
///
/// Cheap to clone; clones share the HTTP connection pool, which supports
/// concurrent in-flight requests without extra locking.
#[derive(Clone, Debug)]
pub struct ChainConnector {
    client: Client,
    endpoint: Url,
    chain_id: u64,
    next_id: Arc<AtomicU64>,
}

impl ChainConnector {
    /// Open a session and learn the chain id. Any failure, including the
    /// handshake timing out, is reported as a connection error.
    pub async fn connect(endpoint_url: &str) -> ChainResult<Self> {
        Self::connect_with(&CallContext::with_timeout(CONNECT_TIMEOUT), endpoint_url).await
    }

    pub async fn connect_with(ctx: &CallContext, endpoint_url: &str) -> ChainResult<Self> {
        let endpoint = Url::parse(endpoint_url)
            .map_err(|e| ChainError::Connection(format!("invalid RPC URL: {}", e)))?;

        match endpoint.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ChainError::Connection(format!(
                    "unsupported RPC scheme '{}', expected http or https",
                    other
                )))
            }
        }

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ChainError::Connection(format!("failed to build HTTP client: {}", e)))?;

        let mut connector = Self {
            client,
            endpoint,
            chain_id: 0,
            next_id: Arc::new(AtomicU64::new(1)),
        };

        let chain_id = connector
            .read(ctx, "eth_chainId", json!([]))
            .await
            .and_then(|v| parse_quantity(&v, "eth_chainId"))
            .map_err(|e| match e {
                ChainError::Connection(msg) | ChainError::Timeout(msg) => {
                    ChainError::Connection(format!("failed to reach RPC node: {}", msg))
                }
                other => other,
            })?;

        if chain_id > U256::from(u64::MAX) {
            return Err(ChainError::Connection(format!(
                "node reported an out-of-range chain id {}",
                chain_id
            )));
        }
        connector.chain_id = chain_id.as_u64();

        info!(
            host = connector.endpoint.host_str().unwrap_or_default(),
            chain_id = connector.chain_id,
            "Connected to RPC node"
        );
        Ok(connector)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Native balance in wei as of the node's latest block.
    pub async fn get_balance(&self, ctx: &CallContext, address: Address) -> ChainResult<U256> {
        let result = self
            .read(ctx, "eth_getBalance", json!([format!("{:?}", address), "latest"]))
            .await?;
        parse_quantity(&result, "eth_getBalance")
    }

    /// Next unused nonce, counting transactions still in the node's mempool.
    pub async fn get_pending_nonce(&self, ctx: &CallContext, address: Address) -> ChainResult<U256> {
        self.pending_nonce(ctx, address)
            .await
            .map_err(|f| f.into_chain_error("eth_getTransactionCount"))
    }

    /// The node's gas price hint in wei.
    pub async fn suggest_gas_price(&self, ctx: &CallContext) -> ChainResult<U256> {
        self.gas_price(ctx)
            .await
            .map_err(|f| f.into_chain_error("eth_gasPrice"))
    }

    pub(crate) async fn pending_nonce(&self, ctx: &CallContext, address: Address) -> Result<U256, ReadFailure> {
        self.read_quantity(
            ctx,
            "eth_getTransactionCount",
            json!([format!("{:?}", address), "pending"]),
        )
        .await
    }

    pub(crate) async fn gas_price(&self, ctx: &CallContext) -> Result<U256, ReadFailure> {
        self.read_quantity(ctx, "eth_gasPrice", json!([])).await
    }

    /// Submit signed transaction bytes exactly once.
    ///
    /// A JSON-RPC error from the node becomes [`ChainError::Rejected`] with
    /// the node's message. After a [`ChainError::Timeout`] the transaction
    /// may still have landed; re-check the pending nonce before resending.
    pub async fn broadcast(&self, ctx: &CallContext, signed: &Bytes) -> ChainResult<TransactionHandle> {
        let params = json!([format!("0x{}", hex::encode(signed))]);
        match self.call(ctx, "eth_sendRawTransaction", params).await? {
            RpcReply::Result(value) => {
                let id: H256 = serde_json::from_value(value.clone()).map_err(|_| {
                    ChainError::Connection(format!(
                        "eth_sendRawTransaction returned a malformed hash: {}",
                        value
                    ))
                })?;
                Ok(TransactionHandle { id })
            }
            RpcReply::Error { code, message } => {
                warn!(code, reason = %message, "Node rejected transaction");
                Err(ChainError::Rejected(message))
            }
        }
    }

    /// A read call: node-side errors are reported as connection errors.
    async fn read(&self, ctx: &CallContext, method: &'static str, params: Value) -> ChainResult<Value> {
        self.read_raw(ctx, method, params)
            .await
            .map_err(|f| f.into_chain_error(method))
    }

    async fn read_raw(&self, ctx: &CallContext, method: &'static str, params: Value) -> Result<Value, ReadFailure> {
        match self.call(ctx, method, params).await.map_err(ReadFailure::Call)? {
            RpcReply::Result(value) => Ok(value),
            RpcReply::Error { code, message } => Err(ReadFailure::Node { code, message }),
        }
    }

    async fn read_quantity(
        &self,
        ctx: &CallContext,
        method: &'static str,
        params: Value,
    ) -> Result<U256, ReadFailure> {
        let result = self.read_raw(ctx, method, params).await?;
        parse_quantity(&result, method).map_err(ReadFailure::Call)
    }

    async fn call(&self, ctx: &CallContext, method: &'static str, params: Value) -> ChainResult<RpcReply> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        debug!(method, id, "Sending JSON-RPC request");

        let body: Value = ctx
            .run(async {
                let response = self
                    .client
                    .post(self.endpoint.clone())
                    .json(&payload)
                    .send()
                    .await?;
                let status = response.status();
                match response.json::<Value>().await {
                    Ok(body) => Ok(body),
                    Err(_) if !status.is_success() => Err(ChainError::Connection(format!(
                        "{} answered with HTTP {}",
                        method, status
                    ))),
                    Err(e) => Err(e.into()),
                }
            })
            .await?;

        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Ok(RpcReply::Error { code, message });
        }

        match body.get("result") {
            Some(result) => Ok(RpcReply::Result(result.clone())),
            None => Err(ChainError::Connection(format!(
                "{} response has neither result nor error: {}",
                method, body
            ))),
        }
    }
}

/// Parse a JSON-RPC hex quantity such as `"0x1bc16d674ec80000"`.
fn parse_quantity(value: &Value, method: &str) -> ChainResult<U256> {
    let text = value.as_str().ok_or_else(|| {
        ChainError::Connection(format!("{} returned a non-string quantity: {}", method, value))
    })?;
    let digits = text.strip_prefix("0x").ok_or_else(|| {
        ChainError::Connection(format!("{} returned a quantity without 0x prefix: {}", method, text))
    })?;
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(digits, 16).map_err(|_| {
        ChainError::Connection(format!("{} returned an invalid quantity: {}", method, text))
    })
}
