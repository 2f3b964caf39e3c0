pub mod hash;
pub mod keys;
pub mod message;
pub mod pow;
pub mod signer;

pub use hash::{blake2_256, claim_id};
pub use keys::{compress_public_key, decompress_public_key, parse_public_key};
pub use message::recover_public_key;
pub use pow::{mine_pow_nonce, verify_pow_nonce};
pub use signer::{LockSigner, SignerError, SoftwareSigner};
