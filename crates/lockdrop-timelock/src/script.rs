//! Relative-timelock redemption script and its P2SH locking address.
//!
//! ```text
//! <sequence> OP_CHECKSEQUENCEVERIFY OP_DROP <compressed pubkey> OP_CHECKSIG
//! ```

use bitcoin::opcodes::all::{OP_CHECKSIG, OP_CSV, OP_DROP};
use bitcoin::script::Builder;
use bitcoin::{Address, PublicKey, ScriptBuf};
use lockdrop_core::constants::{MAX_LOCK_DAYS, MIN_LOCK_DAYS};
use lockdrop_core::error::LockdropError;
use lockdrop_core::types::{CompressedPublicKey, LockNetwork, LockParameter, Satoshi, TxHash};
use lockdrop_crypto::keys::compress_public_key;
use tracing::debug;

use crate::address::{bitcoin_network, validate_public_key};
use crate::sequence::days_to_block_sequence;

/// A compiled lock. Pure function of (days, public key, network).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedemptionScript {
    pub days: u32,
    /// BIP-68 value pushed before OP_CSV; also the minimum input sequence of
    /// the spending transaction.
    pub sequence: u32,
    pub public_key: CompressedPublicKey,
    pub network: LockNetwork,
    pub redeem_script: ScriptBuf,
    /// OP_HASH160 <script hash> OP_EQUAL, the output the funding
    /// transaction pays.
    pub script_pubkey: ScriptBuf,
    pub address: Address,
}

impl RedemptionScript {
    /// Lock record for a funding output of `value` satoshi in `txid`.
    pub fn lock_parameter(&self, txid: TxHash, value: Satoshi) -> LockParameter {
        LockParameter::bitcoin(txid, self.public_key, self.days, value)
    }

    pub fn redeem_script_hex(&self) -> String {
        hex_script(&self.redeem_script)
    }
}

/// Compile the lock script for `days` days (30..=300) over `public_key`
/// (compressed or uncompressed SEC1) and derive its P2SH address.
///
/// The script always embeds the compressed key, so both encodings of the
/// same key give the same address.
pub fn compile_lock(
    days: u32,
    public_key: &[u8],
    network: LockNetwork,
) -> Result<RedemptionScript, LockdropError> {
    if !(MIN_LOCK_DAYS..=MAX_LOCK_DAYS).contains(&days) {
        return Err(LockdropError::InvalidDuration {
            min: MIN_LOCK_DAYS,
            max: MAX_LOCK_DAYS,
            got: days,
        });
    }

    let compressed = compress_public_key(public_key)?;
    if !validate_public_key(compressed.as_bytes(), network) {
        return Err(LockdropError::InvalidPublicKey(format!(
            "{compressed} does not derive a valid {network} address"
        )));
    }
    let key = PublicKey::from_slice(compressed.as_bytes())
        .map_err(|e| LockdropError::InvalidPublicKey(e.to_string()))?;

    let sequence = days_to_block_sequence(days)?;
    let redeem_script = lock_script(sequence, &key);
    let address = Address::p2sh(&redeem_script, bitcoin_network(network))
        .map_err(|e| LockdropError::ScriptAssemblyError(e.to_string()))?;

    debug!(
        days,
        sequence,
        %network,
        %address,
        script = %hex_script(&redeem_script),
        "compiled lock script"
    );

    Ok(RedemptionScript {
        days,
        sequence,
        public_key: compressed,
        network,
        script_pubkey: address.script_pubkey(),
        redeem_script,
        address,
    })
}

/// `<sequence> OP_CSV OP_DROP <key> OP_CHECKSIG` with minimal pushes.
pub fn lock_script(sequence: u32, key: &PublicKey) -> ScriptBuf {
    Builder::new()
        .push_int(i64::from(sequence))
        .push_opcode(OP_CSV)
        .push_opcode(OP_DROP)
        .push_key(key)
        .push_opcode(OP_CHECKSIG)
        .into_script()
}

fn hex_script(script: &ScriptBuf) -> String {
    hex::encode(script.as_bytes())
}
