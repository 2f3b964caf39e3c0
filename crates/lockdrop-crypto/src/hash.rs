use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use lockdrop_core::types::{ClaimId, LockParameter};

type Blake2b256 = Blake2b<U32>;

/// Compute BLAKE2b-256 of arbitrary bytes → 32-byte array.
pub fn blake2_256(data: &[u8]) -> [u8; 32] {
    Blake2b256::digest(data).into()
}

/// Derive the ClaimId of a lock: BLAKE2b-256 over its canonical encoding.
/// The destination ledger recomputes exactly this on submission.
pub fn claim_id(param: &LockParameter) -> ClaimId {
    ClaimId::from_bytes(blake2_256(&param.canonical_bytes()))
}
