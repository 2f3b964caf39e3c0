use lockdrop_core::config::PowConfig;
use lockdrop_core::error::LockdropError;
use lockdrop_core::types::ClaimId;
use tracing::debug;

use crate::hash::blake2_256;

/// Verify that blake2_256(hex(id) || decimal(nonce))[0] & work_mask == 0.
pub fn verify_pow_nonce(id: &ClaimId, nonce: u64, work_mask: u8) -> bool {
    pow_hash(id, nonce)[0] & work_mask == 0
}

/// Find the smallest nonce, counting up from 0, that passes
/// `verify_pow_nonce`. Gives up after `config.max_iterations` attempts.
pub fn mine_pow_nonce(id: &ClaimId, config: &PowConfig) -> Result<u64, LockdropError> {
    for nonce in 0..config.max_iterations {
        if verify_pow_nonce(id, nonce, config.work_mask) {
            debug!(claim_id = %id, nonce, "claim PoW solved");
            return Ok(nonce);
        }
    }
    Err(LockdropError::PowTimeout {
        iterations: config.max_iterations,
    })
}

/// The preimage is the ASCII text of the lowercase hex id (no `0x`)
/// followed by the nonce in decimal.
fn pow_hash(id: &ClaimId, nonce: u64) -> [u8; 32] {
    let preimage = format!("{}{}", id.to_hex(), nonce);
    blake2_256(preimage.as_bytes())
}
