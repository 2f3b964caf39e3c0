//! Lock and claim flows over the collaborator ports.
//!
//! These only sequence calls: every provider or ledger error is returned
//! as-is, and nothing here retries.

use bitcoin::consensus::deserialize;
use bitcoin::Transaction;
use lockdrop_core::claims::{ClaimReceipt, ClaimStatus};
use lockdrop_core::config::PowConfig;
use lockdrop_core::error::LockdropError;
use lockdrop_core::ports::{ChainDataProvider, LedgerClient};
use lockdrop_core::types::{ClaimId, LockParameter, UnspentLock};
use lockdrop_crypto::hash::claim_id;
use lockdrop_crypto::pow::mine_pow_nonce;
use tracing::{info, warn};

use crate::script::RedemptionScript;

/// Result of a claim submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimSubmission {
    pub claim_id: ClaimId,
    pub nonce: u64,
    pub receipt: ClaimReceipt,
}

/// Lock records for every output currently unspent at the redemption
/// address. Zero-value outputs are skipped.
pub async fn collect_lock_parameters<P: ChainDataProvider + ?Sized>(
    provider: &P,
    redemption: &RedemptionScript,
) -> Result<Vec<LockParameter>, LockdropError> {
    let address = redemption.address.to_string();
    let outputs = provider.fetch_unspent_outputs(&address).await?;

    let params: Vec<LockParameter> = outputs
        .iter()
        .filter(|utxo| {
            if utxo.value == 0 {
                warn!(
                    txid = %utxo.txid,
                    vout = utxo.output_index,
                    "skipping zero-value lock output"
                );
                return false;
            }
            true
        })
        .map(|utxo| redemption.lock_parameter(utxo.txid, utxo.value))
        .collect();

    info!(%address, found = params.len(), "collected lock outputs");
    Ok(params)
}

/// Check against the raw funding transaction that `lock` really is output
/// `lock.output_index` paying `lock.value` to the redemption script.
pub async fn verify_funding<P: ChainDataProvider + ?Sized>(
    provider: &P,
    lock: &UnspentLock,
    redemption: &RedemptionScript,
) -> Result<(), LockdropError> {
    let raw = provider.fetch_raw_transaction(&lock.txid).await?;
    let tx: Transaction = deserialize(&raw)
        .map_err(|e| LockdropError::Serialization(format!("funding transaction: {e}")))?;

    let mismatch = |reason: String| LockdropError::FundingMismatch {
        txid: lock.txid.to_hex(),
        reason,
    };

    let txid = tx.compute_txid().to_string();
    if txid != lock.txid.to_hex() {
        return Err(mismatch(format!("provider returned transaction {txid}")));
    }
    let output = tx
        .output
        .get(lock.output_index as usize)
        .ok_or_else(|| mismatch(format!("no output {}", lock.output_index)))?;
    if output.script_pubkey != redemption.script_pubkey {
        return Err(mismatch(format!(
            "output {} is not locked to {}",
            lock.output_index, redemption.address
        )));
    }
    if output.value.to_sat() != lock.value {
        return Err(mismatch(format!(
            "output {} holds {} sat, expected {}",
            lock.output_index,
            output.value.to_sat(),
            lock.value
        )));
    }
    Ok(())
}

/// Derive the claim id, mine its nonce and submit the claim.
pub async fn request_claim<L: LedgerClient + ?Sized>(
    ledger: &L,
    param: &LockParameter,
    pow: &PowConfig,
) -> Result<ClaimSubmission, LockdropError> {
    let id = claim_id(param);
    let nonce = mine_pow_nonce(&id, pow)?;
    let receipt = ledger.submit_claim(param, nonce).await?;
    info!(claim_id = %id, nonce, tx = %receipt.transaction_hash, "claim submitted");
    Ok(ClaimSubmission {
        claim_id: id,
        nonce,
        receipt,
    })
}

pub async fn claim_status<L: LedgerClient + ?Sized>(
    ledger: &L,
    id: &ClaimId,
) -> Result<ClaimStatus, LockdropError> {
    let record = ledger.get_claim_record(id).await?;
    Ok(ClaimStatus::from_record(record.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::compile_lock;
    use async_trait::async_trait;
    use bitcoin::absolute::LockTime;
    use bitcoin::consensus::serialize;
    use bitcoin::transaction::Version;
    use bitcoin::{Amount, ScriptBuf, TxIn, TxOut};
    use lockdrop_core::claims::ClaimRecord;
    use lockdrop_core::types::{LockNetwork, TxHash};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const G_COMPRESSED: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    fn redemption() -> RedemptionScript {
        compile_lock(30, &hex::decode(G_COMPRESSED).unwrap(), LockNetwork::Testnet).unwrap()
    }

    fn funding_tx(outputs: Vec<TxOut>) -> Transaction {
        Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn::default()],
            output: outputs,
        }
    }

    fn txhash(tx: &Transaction) -> TxHash {
        TxHash::from_hex(&tx.compute_txid().to_string()).unwrap()
    }

    #[derive(Default)]
    struct FakeChain {
        utxos: Vec<UnspentLock>,
        raw: HashMap<TxHash, Vec<u8>>,
    }

    #[async_trait]
    impl ChainDataProvider for FakeChain {
        async fn fetch_unspent_outputs(
            &self,
            _address: &str,
        ) -> Result<Vec<UnspentLock>, LockdropError> {
            Ok(self.utxos.clone())
        }

        async fn fetch_raw_transaction(&self, txid: &TxHash) -> Result<Vec<u8>, LockdropError> {
            self.raw
                .get(txid)
                .cloned()
                .ok_or_else(|| LockdropError::Provider(format!("unknown transaction {txid}")))
        }
    }

    #[derive(Default)]
    struct FakeLedger {
        submitted: Mutex<Vec<(LockParameter, u64)>>,
        records: HashMap<ClaimId, ClaimRecord>,
    }

    #[async_trait]
    impl LedgerClient for FakeLedger {
        async fn submit_claim(
            &self,
            param: &LockParameter,
            nonce: u64,
        ) -> Result<ClaimReceipt, LockdropError> {
            self.submitted.lock().unwrap().push((param.clone(), nonce));
            Ok(ClaimReceipt {
                transaction_hash: "0xfeed".into(),
            })
        }

        async fn get_claim_record(
            &self,
            id: &ClaimId,
        ) -> Result<Option<ClaimRecord>, LockdropError> {
            Ok(self.records.get(id).cloned())
        }
    }

    #[tokio::test]
    async fn collects_parameters_for_each_output() {
        let r = redemption();
        let chain = FakeChain {
            utxos: vec![
                UnspentLock {
                    txid: TxHash([1u8; 32]),
                    output_index: 0,
                    value: 50_000,
                    confirmed_height: Some(10),
                },
                UnspentLock {
                    txid: TxHash([2u8; 32]),
                    output_index: 3,
                    value: 0,
                    confirmed_height: None,
                },
            ],
            ..FakeChain::default()
        };
        let params = collect_lock_parameters(&chain, &r).await.unwrap();
        assert_eq!(params, vec![r.lock_parameter(TxHash([1u8; 32]), 50_000)]);
        assert_eq!(params[0].duration_secs, 2_592_000);
    }

    #[tokio::test]
    async fn funding_that_pays_the_script_verifies() {
        let r = redemption();
        let tx = funding_tx(vec![
            TxOut {
                value: Amount::from_sat(1),
                script_pubkey: ScriptBuf::new(),
            },
            TxOut {
                value: Amount::from_sat(75_000),
                script_pubkey: r.script_pubkey.clone(),
            },
        ]);
        let lock = UnspentLock {
            txid: txhash(&tx),
            output_index: 1,
            value: 75_000,
            confirmed_height: Some(100),
        };
        let mut chain = FakeChain::default();
        chain.raw.insert(lock.txid, serialize(&tx));

        verify_funding(&chain, &lock, &r).await.unwrap();

        let wrong_index = UnspentLock { output_index: 0, ..lock.clone() };
        assert!(matches!(
            verify_funding(&chain, &wrong_index, &r).await,
            Err(LockdropError::FundingMismatch { .. })
        ));
        let wrong_value = UnspentLock { value: 75_001, ..lock.clone() };
        assert!(matches!(
            verify_funding(&chain, &wrong_value, &r).await,
            Err(LockdropError::FundingMismatch { .. })
        ));
        let missing_output = UnspentLock { output_index: 7, ..lock };
        assert!(matches!(
            verify_funding(&chain, &missing_output, &r).await,
            Err(LockdropError::FundingMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn provider_errors_pass_through() {
        let lock = UnspentLock {
            txid: TxHash([3u8; 32]),
            output_index: 0,
            value: 1,
            confirmed_height: None,
        };
        let err = verify_funding(&FakeChain::default(), &lock, &redemption())
            .await
            .unwrap_err();
        assert_eq!(err, LockdropError::Provider(format!("unknown transaction {}", lock.txid)));
    }

    #[tokio::test]
    async fn substituted_transaction_is_rejected() {
        let r = redemption();
        let tx = funding_tx(vec![TxOut {
            value: Amount::from_sat(5),
            script_pubkey: r.script_pubkey.clone(),
        }]);
        let lock = UnspentLock {
            txid: TxHash([4u8; 32]),
            output_index: 0,
            value: 5,
            confirmed_height: Some(1),
        };
        let mut chain = FakeChain::default();
        chain.raw.insert(lock.txid, serialize(&tx));
        assert!(matches!(
            verify_funding(&chain, &lock, &r).await,
            Err(LockdropError::FundingMismatch { .. })
        ));

        chain.raw.insert(lock.txid, vec![0xde, 0xad]);
        assert!(matches!(
            verify_funding(&chain, &lock, &r).await,
            Err(LockdropError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn claim_request_submits_mined_nonce() {
        let param = redemption().lock_parameter(TxHash([5u8; 32]), 12_345);
        let ledger = FakeLedger::default();
        let pow = PowConfig::default();

        let submission = request_claim(&ledger, &param, &pow).await.unwrap();
        assert_eq!(submission.claim_id, claim_id(&param));
        assert!(lockdrop_crypto::pow::verify_pow_nonce(
            &submission.claim_id,
            submission.nonce,
            pow.work_mask
        ));
        assert_eq!(submission.receipt.transaction_hash, "0xfeed");
        assert_eq!(*ledger.submitted.lock().unwrap(), vec![(param, submission.nonce)]);
    }

    #[tokio::test]
    async fn pow_timeout_skips_submission() {
        let param = redemption().lock_parameter(TxHash([5u8; 32]), 12_345);
        let ledger = FakeLedger::default();
        let pow = PowConfig {
            work_mask: 0xff,
            max_iterations: 0,
        };
        assert_eq!(
            request_claim(&ledger, &param, &pow).await.unwrap_err(),
            LockdropError::PowTimeout { iterations: 0 }
        );
        assert!(ledger.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_reflects_ledger_record() {
        let param = redemption().lock_parameter(TxHash([6u8; 32]), 1);
        let id = claim_id(&param);
        let mut ledger = FakeLedger::default();
        assert_eq!(claim_status(&ledger, &id).await.unwrap(), ClaimStatus::NotRequested);

        ledger.records.insert(
            id,
            ClaimRecord {
                approve: 2,
                decline: 1,
                complete: false,
                amount: 0,
            },
        );
        assert_eq!(
            claim_status(&ledger, &id).await.unwrap(),
            ClaimStatus::Pending {
                approve: 2,
                decline: 1
            }
        );
    }
}
