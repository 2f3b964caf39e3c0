use bitcoin::secp256k1::Secp256k1;
use bitcoin::sign_message::{signed_msg_hash, MessageSignature};
use lockdrop_core::error::LockdropError;

/// Recover the public key behind a base64 Bitcoin signed-message signature
/// over `message`. The returned key carries the compression flag encoded in
/// the signature header.
pub fn recover_public_key(
    message: &str,
    signature_base64: &str,
) -> Result<bitcoin::PublicKey, LockdropError> {
    let cleaned: String = signature_base64
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let signature = MessageSignature::from_base64(&cleaned)
        .map_err(|e| LockdropError::InvalidSignature(e.to_string()))?;
    signature
        .recover_pubkey(&Secp256k1::verification_only(), signed_msg_hash(message))
        .map_err(|e| LockdropError::InvalidSignature(e.to_string()))
}
