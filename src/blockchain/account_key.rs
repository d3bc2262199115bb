// src/blockchain/account_key.rs

use std::fmt;

use ethers_core::{
    types::{transaction::eip2718::TypedTransaction, Address, Bytes, Signature, H256},
    utils::keccak256,
};
use ethers_signers::{LocalWallet, Signer};
use zeroize::Zeroizing;

use crate::blockchain::error::{ChainError, ChainResult};

/// The service's signing key and the address derived from it.
///
/// Not `Clone`: there is exactly one owner for the process lifetime. The
/// underlying k256 scalar is zeroized when this value is dropped.
pub struct AccountKey {
    wallet: LocalWallet,
    address: Address,
}

impl AccountKey {
    /// Parse a hex-encoded secp256k1 secret (with or without `0x`).
    pub fn load(secret_hex: &str) -> ChainResult<Self> {
        let trimmed = secret_hex.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        if stripped.len() != 64 {
            return Err(ChainError::InvalidKeyFormat(format!(
                "expected 64 hex characters, got {}",
                stripped.len()
            )));
        }

        let bytes = Zeroizing::new(
            hex::decode(stripped)
                .map_err(|_| ChainError::InvalidKeyFormat("secret is not valid hex".into()))?,
        );

        let wallet = LocalWallet::from_bytes(&bytes)
            .map_err(|_| ChainError::InvalidKeyFormat("secret is not a valid secp256k1 scalar".into()))?;
        let address = wallet.address();

        Ok(Self { wallet, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a transaction locally. Deterministic (RFC 6979): identical input
    /// yields identical bytes. The transaction must carry a chain id and, if
    /// it names a sender, that sender must be this key.
    pub fn sign_transaction(&self, tx: TypedTransaction) -> ChainResult<SignedTransaction> {
        if tx.chain_id().is_none() {
            return Err(ChainError::Signing("transaction has no chain id".into()));
        }
        if let Some(from) = tx.from() {
            if *from != self.address {
                return Err(ChainError::Signing(format!(
                    "transaction sender {:?} does not match signing key {:?}",
                    from, self.address
                )));
            }
        }

        let signature = self
            .wallet
            .sign_transaction_sync(&tx)
            .map_err(|e| ChainError::Signing(e.to_string()))?;
        let raw = tx.rlp_signed(&signature);

        Ok(SignedTransaction { tx, signature, raw })
    }
}

impl fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountKey")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// A transaction together with its signature and RLP wire encoding.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    tx: TypedTransaction,
    signature: Signature,
    raw: Bytes,
}

impl SignedTransaction {
    /// Bytes for `eth_sendRawTransaction`.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// The hash the network will assign to this transaction.
    pub fn hash(&self) -> H256 {
        H256::from(keccak256(&self.raw))
    }

    /// Check that the signature covers the current transaction fields and was
    /// produced by `signer`.
    pub fn verify(&self, signer: Address) -> ChainResult<()> {
        self.signature
            .verify(self.tx.sighash(), signer)
            .map_err(|e| ChainError::Signing(format!("signature does not verify: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::types::{TransactionRequest, U256};
    use std::str::FromStr;

    // Well-known development key (Hardhat / Anvil account #0).
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn transfer(key: &AccountKey) -> TypedTransaction {
        TransactionRequest::new()
            .from(key.address())
            .to(Address::from_str("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap())
            .value(U256::from(1_000_000_000_000_000u64))
            .nonce(3u64)
            .gas(21_000u64)
            .gas_price(U256::from(2_000_000_000u64))
            .chain_id(31337u64)
            .into()
    }

    #[test]
    fn load_derives_known_address() {
        let key = AccountKey::load(DEV_KEY).unwrap();
        assert_eq!(key.address(), Address::from_str(DEV_ADDRESS).unwrap());
    }

    #[test]
    fn load_is_deterministic_and_prefix_insensitive() {
        let a = AccountKey::load(DEV_KEY).unwrap();
        let b = AccountKey::load(DEV_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn load_rejects_malformed_secrets() {
        let not_hex = "g".repeat(64);
        let zero_scalar = "0".repeat(64);
        for bad in ["", "0x1234", "zz", not_hex.as_str(), zero_scalar.as_str()] {
            assert!(
                matches!(AccountKey::load(bad), Err(ChainError::InvalidKeyFormat(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let key = AccountKey::load(DEV_KEY).unwrap();
        let rendered = format!("{:?}", key);
        assert!(rendered.contains("address"));
        assert!(!rendered.contains(DEV_KEY.trim_start_matches("0x")));
    }

    #[test]
    fn signature_verifies_against_the_key_address() {
        let key = AccountKey::load(DEV_KEY).unwrap();
        let signed = key.sign_transaction(transfer(&key)).unwrap();
        signed.verify(key.address()).unwrap();

        let stranger = Address::from_str("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap();
        assert!(signed.verify(stranger).is_err());
    }

    #[test]
    fn mutating_a_signed_field_breaks_verification() {
        let key = AccountKey::load(DEV_KEY).unwrap();

        let mut nonce_changed = key.sign_transaction(transfer(&key)).unwrap();
        nonce_changed.tx.set_nonce(4u64);
        assert!(nonce_changed.verify(key.address()).is_err());

        let mut value_changed = key.sign_transaction(transfer(&key)).unwrap();
        value_changed.tx.set_value(U256::from(2u64));
        assert!(value_changed.verify(key.address()).is_err());

        let mut gas_changed = key.sign_transaction(transfer(&key)).unwrap();
        gas_changed.tx.set_gas_price(U256::from(1u64));
        assert!(gas_changed.verify(key.address()).is_err());
    }

    #[test]
    fn signing_is_deterministic() {
        let key = AccountKey::load(DEV_KEY).unwrap();
        let first = key.sign_transaction(transfer(&key)).unwrap();
        let second = key.sign_transaction(transfer(&key)).unwrap();
        assert_eq!(first.raw(), second.raw());
        assert_eq!(first.hash(), second.hash());
    }

    #[test]
    fn signing_requires_chain_id_and_matching_sender() {
        let key = AccountKey::load(DEV_KEY).unwrap();

        let mut no_chain = transfer(&key);
        if let TypedTransaction::Legacy(ref mut inner) = no_chain {
            inner.chain_id = None;
        }
        assert!(matches!(key.sign_transaction(no_chain), Err(ChainError::Signing(_))));

        let mut wrong_sender = transfer(&key);
        wrong_sender.set_from(Address::repeat_byte(0xAA));
        assert!(matches!(key.sign_transaction(wrong_sender), Err(ChainError::Signing(_))));
    }
}
