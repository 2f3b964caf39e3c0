//! Spending transaction for a matured lock.
//!
//! One input (the funding output, sequence >= the script's CSV value), one
//! output (locked value minus fee to the recipient). The input is signed
//! with SIGHASH_ALL over the redeem script and satisfied with
//! `<sig> <redeem script>`.

use bitcoin::absolute::LockTime;
use bitcoin::consensus::encode::serialize_hex;
use bitcoin::hashes::Hash;
use bitcoin::script::{Builder, PushBytesBuf};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::transaction::Version;
use bitcoin::{
    ecdsa, Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
};
use lockdrop_core::constants::MAX_RELATIVE_SEQUENCE;
use lockdrop_core::error::LockdropError;
use lockdrop_core::types::{LockNetwork, Satoshi, UnspentLock};
use lockdrop_crypto::signer::LockSigner;
use tracing::info;

use crate::address::parse_address;
use crate::script::RedemptionScript;

/// Build and sign the transaction that spends `lock` out of `redemption`.
///
/// `sequence` must be a plain block count in `redemption.sequence..=65535`.
/// Values with any bit above the low 16 set are rejected, including bits
/// 16..22 that CSV itself ignores, so the signed input always carries the
/// same encoding `days_to_block_sequence` produces.
///
/// All input validation happens before the signer is called; on error
/// nothing is signed and no partial transaction is returned.
pub fn build_unlock_transaction<S: LockSigner + ?Sized>(
    signer: &S,
    network: LockNetwork,
    lock: &UnspentLock,
    redemption: &RedemptionScript,
    sequence: u32,
    recipient: &str,
    fee: Satoshi,
) -> Result<Transaction, LockdropError> {
    let sequence = check_sequence(sequence, redemption)?;

    let fee_amount = Amount::from_sat(fee);
    if fee_amount > Amount::MAX_MONEY {
        return Err(LockdropError::InvalidFee(format!(
            "{fee} sat exceeds the maximum money supply"
        )));
    }

    let recipient = parse_address(recipient, network)
        .map_err(|e| LockdropError::InvalidRecipient(e.to_string()))?;

    if fee > lock.value {
        return Err(LockdropError::InsufficientFunds {
            value: lock.value,
            fee,
        });
    }

    if signer.public_key().serialize() != *redemption.public_key.as_bytes() {
        return Err(LockdropError::InvalidPublicKey(format!(
            "signer key {} does not unlock script for {}",
            signer.public_key(),
            redemption.public_key
        )));
    }

    // Funding txid arrives in display order; outpoints use internal order.
    let mut internal = *lock.txid.as_bytes();
    internal.reverse();

    let mut tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint {
                txid: Txid::from_byte_array(internal),
                vout: lock.output_index,
            },
            script_sig: ScriptBuf::new(),
            sequence,
            witness: Witness::new(),
        }],
        output: vec![TxOut {
            value: Amount::from_sat(lock.value - fee),
            script_pubkey: recipient.script_pubkey(),
        }],
    };

    let digest = {
        let cache = SighashCache::new(&tx);
        cache
            .legacy_signature_hash(0, &redemption.redeem_script, EcdsaSighashType::All.to_u32())
            .map_err(|e| LockdropError::ScriptAssemblyError(e.to_string()))?
            .to_byte_array()
    };
    let signature = ecdsa::Signature::sighash_all(signer.sign_digest(&digest)?);
    tx.input[0].script_sig = unlock_script_sig(&signature, &redemption.redeem_script)?;

    info!(
        txid = %tx.compute_txid(),
        funding = %lock.txid,
        vout = lock.output_index,
        value = lock.value,
        fee,
        %recipient,
        "built unlock transaction"
    );
    Ok(tx)
}

/// Consensus-serialized transaction as lowercase hex, ready to broadcast.
pub fn to_raw_hex(tx: &Transaction) -> String {
    serialize_hex(tx)
}

/// P2SH satisfaction: push the DER signature (with sighash byte), then push
/// the serialized redeem script.
fn unlock_script_sig(
    signature: &ecdsa::Signature,
    redeem_script: &ScriptBuf,
) -> Result<ScriptBuf, LockdropError> {
    let sig = PushBytesBuf::try_from(signature.to_vec())
        .map_err(|e| LockdropError::ScriptAssemblyError(format!("signature push: {e}")))?;
    let redeem = PushBytesBuf::try_from(redeem_script.to_bytes())
        .map_err(|e| LockdropError::ScriptAssemblyError(format!("redeem script push: {e}")))?;
    Ok(Builder::new().push_slice(sig).push_slice(redeem).into_script())
}

/// Accepts only a bare 16-bit block count no lower than the script's CSV
/// value; flag bits and the bits CSV masks out are both refused.
fn check_sequence(
    sequence: u32,
    redemption: &RedemptionScript,
) -> Result<Sequence, LockdropError> {
    if sequence > MAX_RELATIVE_SEQUENCE {
        return Err(LockdropError::InvalidSequence(format!(
            "{sequence} is not a block-based relative lock time (max {MAX_RELATIVE_SEQUENCE})"
        )));
    }
    if sequence < redemption.sequence {
        return Err(LockdropError::InvalidSequence(format!(
            "{sequence} is below the script's CHECKSEQUENCEVERIFY value {}",
            redemption.sequence
        )));
    }
    Ok(Sequence::from_consensus(sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::compile_lock;
    use bitcoin::script::Instruction;
    use bitcoin::secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1};
    use lockdrop_core::types::TxHash;
    use lockdrop_crypto::signer::{SignerError, SoftwareSigner};
    use std::cell::{Cell, RefCell};

    const RECIPIENT: &str = "mrCDrCybB6J1vRfbwM5hemdJz73FwDBC8r";

    /// Signs with secret key 1 and records every digest it is asked to sign.
    struct RecordingSigner {
        inner: SoftwareSigner,
        calls: Cell<usize>,
        last_digest: RefCell<Option<[u8; 32]>>,
    }

    impl RecordingSigner {
        fn new() -> Self {
            let mut sk = [0u8; 32];
            sk[31] = 1;
            Self {
                inner: SoftwareSigner::from_secret_key_bytes(sk).unwrap(),
                calls: Cell::new(0),
                last_digest: RefCell::new(None),
            }
        }
    }

    impl LockSigner for RecordingSigner {
        fn public_key(&self) -> PublicKey {
            self.inner.public_key()
        }

        fn sign_digest(&self, digest: &[u8; 32]) -> Result<Signature, SignerError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_digest.borrow_mut() = Some(*digest);
            self.inner.sign_digest(digest)
        }
    }

    struct FailingSigner(PublicKey);

    impl LockSigner for FailingSigner {
        fn public_key(&self) -> PublicKey {
            self.0
        }

        fn sign_digest(&self, _digest: &[u8; 32]) -> Result<Signature, SignerError> {
            Err(SignerError::Device("user rejected".into()))
        }
    }

    fn redemption() -> RedemptionScript {
        let signer = RecordingSigner::new();
        compile_lock(30, &signer.public_key().serialize(), LockNetwork::Testnet).unwrap()
    }

    fn funding() -> UnspentLock {
        UnspentLock {
            txid: TxHash::from_hex(
                "6c4364b2f5a847ffc69f787a0894191b75aa278a95020f02e4753c76119324e0",
            )
            .unwrap(),
            output_index: 1,
            value: 100_000,
            confirmed_height: Some(800_000),
        }
    }

    fn build(
        signer: &RecordingSigner,
        sequence: u32,
        recipient: &str,
        fee: u64,
    ) -> Result<Transaction, LockdropError> {
        build_unlock_transaction(
            signer,
            LockNetwork::Testnet,
            &funding(),
            &redemption(),
            sequence,
            recipient,
            fee,
        )
    }

    #[test]
    fn transaction_shape() {
        let signer = RecordingSigner::new();
        let tx = build(&signer, 4_320, RECIPIENT, 1_000).unwrap();

        assert_eq!(tx.version, Version::TWO);
        assert_eq!(tx.lock_time, LockTime::ZERO);
        assert_eq!(tx.input.len(), 1);
        assert_eq!(
            tx.input[0].previous_output.txid.to_string(),
            funding().txid.to_hex(),
            "outpoint must display as the funding txid"
        );
        assert_eq!(tx.input[0].previous_output.vout, 1);
        assert_eq!(tx.input[0].sequence.to_consensus_u32(), 4_320);
        assert_eq!(tx.output.len(), 1);
        assert_eq!(tx.output[0].value, Amount::from_sat(99_000));
        assert_eq!(
            hex::encode(tx.output[0].script_pubkey.as_bytes()),
            "76a914751e76e8199196d454941c45d1b3a323f1433bd688ac"
        );
    }

    #[test]
    fn signs_legacy_sighash_all_over_redeem_script() {
        let signer = RecordingSigner::new();
        build(&signer, 4_320, RECIPIENT, 1_000).unwrap();
        assert_eq!(signer.calls.get(), 1);
        assert_eq!(
            hex::encode(signer.last_digest.borrow().unwrap()),
            "525c161c400ef0beb7a889a761eea416f234cf5383e4f9e72152d5c0b18f0562"
        );
    }

    #[test]
    fn script_sig_pushes_signature_then_redeem_script() {
        let signer = RecordingSigner::new();
        let tx = build(&signer, 4_320, RECIPIENT, 1_000).unwrap();

        let pushes: Vec<Vec<u8>> = tx.input[0]
            .script_sig
            .instructions()
            .map(|ins| match ins.unwrap() {
                Instruction::PushBytes(b) => b.as_bytes().to_vec(),
                Instruction::Op(op) => panic!("unexpected opcode {op}"),
            })
            .collect();
        assert_eq!(pushes.len(), 2);
        assert_eq!(*pushes[0].last().unwrap(), 0x01, "SIGHASH_ALL suffix");
        assert_eq!(pushes[1], redemption().redeem_script.to_bytes());

        let der = Signature::from_der(&pushes[0][..pushes[0].len() - 1]).unwrap();
        let digest = signer.last_digest.borrow().unwrap();
        Secp256k1::verification_only()
            .verify_ecdsa(&Message::from_digest(digest), &der, &signer.public_key())
            .unwrap();
    }

    #[test]
    fn higher_sequence_is_accepted() {
        let signer = RecordingSigner::new();
        let tx = build(&signer, 5_000, RECIPIENT, 0).unwrap();
        assert_eq!(tx.input[0].sequence.to_consensus_u32(), 5_000);
        assert_eq!(tx.output[0].value, Amount::from_sat(100_000));
    }

    #[test]
    fn fee_above_value_fails_without_signing() {
        let signer = RecordingSigner::new();
        assert_eq!(
            build(&signer, 4_320, RECIPIENT, 100_001).unwrap_err(),
            LockdropError::InsufficientFunds {
                value: 100_000,
                fee: 100_001
            }
        );
        assert_eq!(signer.calls.get(), 0);
    }

    #[test]
    fn invalid_inputs_fail_without_signing() {
        let signer = RecordingSigner::new();
        assert!(matches!(
            build(&signer, 4_319, RECIPIENT, 1_000),
            Err(LockdropError::InvalidSequence(_))
        ));
        assert!(matches!(
            build(&signer, 1 << 22 | 4_320, RECIPIENT, 1_000),
            Err(LockdropError::InvalidSequence(_))
        ));
        assert!(matches!(
            build(&signer, u32::MAX, RECIPIENT, 1_000),
            Err(LockdropError::InvalidSequence(_))
        ));
        assert!(matches!(
            build(&signer, 4_320, RECIPIENT, u64::MAX),
            Err(LockdropError::InvalidFee(_))
        ));
        assert!(matches!(
            build(&signer, 4_320, "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH", 1_000),
            Err(LockdropError::InvalidRecipient(_))
        ));
        assert!(matches!(
            build(&signer, 4_320, "garbage", 1_000),
            Err(LockdropError::InvalidRecipient(_))
        ));
        assert_eq!(signer.calls.get(), 0);
    }

    #[test]
    fn sequence_bits_outside_the_block_count_are_refused() {
        // Bit 16 is ignored by CSV but is not part of a canonical block count.
        let signer = RecordingSigner::new();
        for sequence in [0x1_10E0, 1 << 31 | 4_320, 65_536] {
            assert!(
                matches!(
                    build(&signer, sequence, RECIPIENT, 1_000),
                    Err(LockdropError::InvalidSequence(_))
                ),
                "{sequence:#x} should be refused"
            );
        }
        assert!(build(&signer, 65_535, RECIPIENT, 1_000).is_ok());
        assert_eq!(signer.calls.get(), 1);
    }

    #[test]
    fn wrong_signer_key_rejected() {
        let other = SoftwareSigner::from_secret_key_bytes([0x55; 32]).unwrap();
        let err = build_unlock_transaction(
            &other,
            LockNetwork::Testnet,
            &funding(),
            &redemption(),
            4_320,
            RECIPIENT,
            1_000,
        )
        .unwrap_err();
        assert!(matches!(err, LockdropError::InvalidPublicKey(_)));
    }

    #[test]
    fn signer_failure_is_surfaced() {
        let signer = FailingSigner(RecordingSigner::new().public_key());
        let err = build_unlock_transaction(
            &signer,
            LockNetwork::Testnet,
            &funding(),
            &redemption(),
            4_320,
            RECIPIENT,
            1_000,
        )
        .unwrap_err();
        assert_eq!(err, LockdropError::Signer("signing device error: user rejected".into()));
    }

    #[test]
    fn raw_hex_starts_with_version_two() {
        let signer = RecordingSigner::new();
        let tx = build(&signer, 4_320, RECIPIENT, 1_000).unwrap();
        let raw = to_raw_hex(&tx);
        assert!(raw.starts_with("02000000"));
        assert!(raw.ends_with("00000000"));
    }
}
