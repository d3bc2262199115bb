// src/blockchain/payment.rs

use ethers_core::types::{
    transaction::eip2718::TypedTransaction, Address, TransactionRequest, U256,
};
use tracing::{debug, info};

use crate::blockchain::{
    account_key::AccountKey,
    connector::{ChainConnector, ReadFailure, TransactionHandle},
    context::CallContext,
    error::{ChainError, ChainResult},
};

/// Gas used by a plain value transfer with no calldata.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Assemble an unsigned legacy value transfer.
pub fn build_transfer(
    from: Address,
    to: Address,
    value: U256,
    nonce: U256,
    gas_price: U256,
    chain_id: u64,
) -> TypedTransaction {
    TransactionRequest::new()
        .from(from)
        .to(to)
        .value(value)
        .nonce(nonce)
        .gas(TRANSFER_GAS_LIMIT)
        .gas_price(gas_price)
        .chain_id(chain_id)
        .into()
}

/// Build, sign and broadcast a transfer of `value` wei from `key` to `to`.
///
/// One linear pass with no retry. Two overlapping calls for the same key may
/// read the same pending nonce; callers that send concurrently from one
/// account must serialise those calls themselves (see `SendQueue`).
pub async fn send(
    ctx: &CallContext,
    key: &AccountKey,
    to: Address,
    value: U256,
    connector: &ChainConnector,
) -> ChainResult<TransactionHandle> {
    let from = key.address();

    let (nonce, gas_price) = tokio::try_join!(
        async {
            connector
                .pending_nonce(ctx, from)
                .await
                .map_err(|f| classify(f, ChainError::Nonce))
        },
        async {
            connector
                .gas_price(ctx)
                .await
                .map_err(|f| classify(f, ChainError::GasEstimation))
        },
    )?;

    debug!(?from, ?to, %nonce, %gas_price, "Assembled transfer");

    let tx = build_transfer(from, to, value, nonce, gas_price, connector.chain_id());
    let signed = key.sign_transaction(tx)?;

    let handle = connector.broadcast(ctx, signed.raw()).await?;
    if handle.id != signed.hash() {
        debug!(node = %handle, local = ?signed.hash(), "Node returned an unexpected transaction hash");
    }

    info!(?from, ?to, %value, %nonce, tx = %handle, "Transfer broadcast");
    Ok(handle)
}

/// Transport failures and timeouts keep their own class; an error answered
/// by the node becomes the step-specific error.
fn classify(failure: ReadFailure, wrap: fn(String) -> ChainError) -> ChainError {
    match failure {
        ReadFailure::Call(err) => err,
        ReadFailure::Node { code, message } => wrap(format!("RPC error {}: {}", code, message)),
    }
}
