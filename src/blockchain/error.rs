// src/blockchain/error.rs

use thiserror::Error;

/// Failures surfaced by the chain-facing core.
///
/// Messages never contain key material. Node-supplied text (e.g. a rejection
/// reason) is carried verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// Transport unreachable, reset, or the node answered with something unusable.
    #[error("connection error: {0}")]
    Connection(String),
    /// Deadline exceeded or the call was cancelled.
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),
    #[error("nonce error: {0}")]
    Nonce(String),
    #[error("gas estimation error: {0}")]
    GasEstimation(String),
    #[error("signing error: {0}")]
    Signing(String),
    /// The node refused the transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),
}

/// How a caller should treat a failed call before trying again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Retry with backoff.
    SafeToRetry,
    /// The remote action may have happened; re-check state (e.g. the pending nonce) first.
    ReverifyState,
    /// Re-fetch nonce / gas price, then retry.
    RederiveInputs,
    /// Retrying the same request will fail the same way.
    Permanent,
    Fatal,
}

impl ChainError {
    pub fn retry_class(&self) -> RetryClass {
        match self {
            ChainError::Connection(_) => RetryClass::SafeToRetry,
            ChainError::Timeout(_) => RetryClass::ReverifyState,
            ChainError::Nonce(_) | ChainError::GasEstimation(_) => RetryClass::RederiveInputs,
            ChainError::Rejected(_) => RetryClass::Permanent,
            ChainError::InvalidKeyFormat(_) | ChainError::Signing(_) => RetryClass::Fatal,
        }
    }
}

impl From<reqwest::Error> for ChainError {
    fn from(err: reqwest::Error) -> Self {
        // The endpoint URL may embed an API key.
        let err = err.without_url();
        if err.is_timeout() {
            ChainError::Timeout(err.to_string())
        } else {
            ChainError::Connection(err.to_string())
        }
    }
}

pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_classes_follow_taxonomy() {
        assert_eq!(ChainError::Connection("reset".into()).retry_class(), RetryClass::SafeToRetry);
        assert_eq!(ChainError::Timeout("late".into()).retry_class(), RetryClass::ReverifyState);
        assert_eq!(ChainError::Nonce("x".into()).retry_class(), RetryClass::RederiveInputs);
        assert_eq!(ChainError::GasEstimation("x".into()).retry_class(), RetryClass::RederiveInputs);
        assert_eq!(
            ChainError::Rejected("insufficient funds".into()).retry_class(),
            RetryClass::Permanent
        );
        assert_eq!(ChainError::Signing("x".into()).retry_class(), RetryClass::Fatal);
        assert_eq!(ChainError::InvalidKeyFormat("x".into()).retry_class(), RetryClass::Fatal);
    }

    #[test]
    fn rejection_reason_is_kept_verbatim() {
        let err = ChainError::Rejected("nonce too low".into());
        assert_eq!(err.to_string(), "transaction rejected: nonce too low");
    }
}
