//! Collaborators the lockdrop logic talks to but does not implement.
//!
//! Implementations own their transport; retries and timeouts belong to them
//! or their callers. Errors come back as `LockdropError::Provider` or
//! `LockdropError::Ledger` and are passed through unchanged.

use async_trait::async_trait;

use crate::claims::{ClaimReceipt, ClaimRecord};
use crate::error::LockdropError;
use crate::types::{ClaimId, LockParameter, TxHash, UnspentLock};

/// Source-chain data: unspent outputs by address and raw transactions by id.
#[async_trait]
pub trait ChainDataProvider: Send + Sync {
    async fn fetch_unspent_outputs(&self, address: &str) -> Result<Vec<UnspentLock>, LockdropError>;

    /// Consensus-serialized transaction bytes.
    async fn fetch_raw_transaction(&self, txid: &TxHash) -> Result<Vec<u8>, LockdropError>;
}

/// Destination ledger: claim submission and claim record lookup.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn submit_claim(
        &self,
        param: &LockParameter,
        nonce: u64,
    ) -> Result<ClaimReceipt, LockdropError>;

    async fn get_claim_record(&self, id: &ClaimId) -> Result<Option<ClaimRecord>, LockdropError>;
}
