use bitcoin::secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};
use lockdrop_core::error::LockdropError;
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("invalid secret key")]
    InvalidSecretKey,
    #[error("invalid WIF private key: {0}")]
    InvalidWif(String),
    #[error("signing device error: {0}")]
    Device(String),
}

impl From<SignerError> for LockdropError {
    fn from(e: SignerError) -> Self {
        LockdropError::Signer(e.to_string())
    }
}

/// Capability to produce a deterministic ECDSA signature over a 32-byte
/// digest. Transaction builders only ever see this trait; key material stays
/// behind it (in memory, on a hardware device, ...).
pub trait LockSigner {
    fn public_key(&self) -> PublicKey;

    fn sign_digest(&self, digest: &[u8; 32]) -> Result<Signature, SignerError>;
}

/// In-process signer over a secp256k1 secret key (RFC 6979 nonces).
///
/// The secret key is held in `Zeroizing` storage to wipe memory on drop.
pub struct SoftwareSigner {
    public_key: PublicKey,
    secret_key_bytes: Zeroizing<[u8; 32]>,
}

impl SoftwareSigner {
    pub fn from_secret_key_bytes(sk_bytes: [u8; 32]) -> Result<Self, SignerError> {
        let secret_key_bytes = Zeroizing::new(sk_bytes);
        let sk = SecretKey::from_slice(&secret_key_bytes[..])
            .map_err(|_| SignerError::InvalidSecretKey)?;
        let public_key = PublicKey::from_secret_key(&Secp256k1::signing_only(), &sk);
        Ok(Self {
            public_key,
            secret_key_bytes,
        })
    }

    /// Import a wallet-exported WIF private key.
    pub fn from_wif(wif: &str) -> Result<Self, SignerError> {
        let key = bitcoin::PrivateKey::from_wif(wif.trim())
            .map_err(|e| SignerError::InvalidWif(e.to_string()))?;
        Self::from_secret_key_bytes(key.inner.secret_bytes())
    }
}

impl LockSigner for SoftwareSigner {
    fn public_key(&self) -> PublicKey {
        self.public_key
    }

    fn sign_digest(&self, digest: &[u8; 32]) -> Result<Signature, SignerError> {
        let sk = SecretKey::from_slice(&self.secret_key_bytes[..])
            .map_err(|_| SignerError::InvalidSecretKey)?;
        let msg = Message::from_digest(*digest);
        Ok(Secp256k1::signing_only().sign_ecdsa(&msg, &sk))
    }
}

impl std::fmt::Debug for SoftwareSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SoftwareSigner {{ public_key: {} }}", self.public_key)
    }
}
