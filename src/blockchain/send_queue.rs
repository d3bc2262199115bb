// src/blockchain/send_queue.rs

use std::sync::Arc;

use dashmap::DashMap;
use ethers_core::types::Address;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Serialises payment submissions per sender address.
///
/// `payment::send` reads the pending nonce without coordination, so two
/// overlapping sends from one account can pick the same nonce. Holding the
/// lane guard for the whole send keeps an account's submissions strictly
/// one after another; different accounts never wait on each other.
#[derive(Debug, Clone, Default)]
pub struct SendQueue {
    // Each address gets its own lane. The DashMap allows concurrent access to different lanes.
    lanes: Arc<DashMap<Address, Arc<Mutex<()>>>>,
}

impl SendQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of `address`'s lane. The lane is released when
    /// the guard is dropped.
    pub async fn acquire(&self, address: Address) -> OwnedMutexGuard<()> {
        let lane = self
            .lanes
            .entry(address)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lane.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_address_waits_for_the_previous_sender() {
        let queue = SendQueue::new();
        let account = Address::repeat_byte(0x11);

        let first = queue.acquire(account).await;
        let second = tokio::time::timeout(Duration::from_millis(50), queue.acquire(account)).await;
        assert!(second.is_err(), "second sender should still be waiting");

        drop(first);
        let second = tokio::time::timeout(Duration::from_millis(500), queue.acquire(account)).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn different_addresses_do_not_block_each_other() {
        let queue = SendQueue::new();
        let _a = queue.acquire(Address::repeat_byte(0x11)).await;
        let b = tokio::time::timeout(
            Duration::from_millis(500),
            queue.acquire(Address::repeat_byte(0x22)),
        )
        .await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn clones_share_lanes() {
        let queue = SendQueue::new();
        let other = queue.clone();
        let account = Address::repeat_byte(0x33);

        let _held = queue.acquire(account).await;
        let waiting = tokio::time::timeout(Duration::from_millis(50), other.acquire(account)).await;
        assert!(waiting.is_err());
    }
}
