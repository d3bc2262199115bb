// src/blockchain/mod.rs

pub mod account_key;
pub mod balance;
pub mod connector;
pub mod context;
pub mod error;
pub mod payment;
pub mod send_queue;

pub use account_key::{AccountKey, SignedTransaction};
pub use balance::DisplayBalance;
pub use connector::{ChainConnector, TransactionHandle};
pub use context::CallContext;
pub use error::{ChainError, ChainResult, RetryClass};

// Re-export commonly used types
pub use ethers::{
    types::{Address, H256, U256},
    utils::to_checksum,
};
