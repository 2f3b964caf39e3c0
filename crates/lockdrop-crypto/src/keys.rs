use bitcoin::secp256k1::PublicKey;
use lockdrop_core::error::LockdropError;
use lockdrop_core::types::CompressedPublicKey;

/// Parse a SEC1 public key, compressed (33 bytes) or uncompressed (65 bytes),
/// checking that it is a point on secp256k1.
pub fn parse_public_key(bytes: &[u8]) -> Result<PublicKey, LockdropError> {
    PublicKey::from_slice(bytes).map_err(|e| {
        LockdropError::InvalidPublicKey(format!("{} ({} bytes)", e, bytes.len()))
    })
}

/// Compressed form of a public key; compressed input is returned unchanged.
pub fn compress_public_key(bytes: &[u8]) -> Result<CompressedPublicKey, LockdropError> {
    Ok(CompressedPublicKey::from_bytes(parse_public_key(bytes)?.serialize()))
}

/// 65-byte uncompressed form of a public key.
pub fn decompress_public_key(bytes: &[u8]) -> Result<[u8; 65], LockdropError> {
    Ok(parse_public_key(bytes)?.serialize_uncompressed())
}
