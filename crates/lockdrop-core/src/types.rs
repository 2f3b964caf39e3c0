use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::SECONDS_PER_DAY;
use crate::error::LockdropError;

/// Amount in satoshi on the source chain.
pub type Satoshi = u64;

/// Amount in femto PLM on the destination ledger.
pub type Femto = u128;

/// Source-chain block height.
pub type BlockHeight = u32;

/// Fixed-size byte newtypes rendered as lowercase hex (no `0x` prefix) and
/// parsed with or without the prefix.
macro_rules! hex_bytes_newtype {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub fn from_bytes(b: [u8; $len]) -> Self {
                Self(b)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn from_slice(bytes: &[u8]) -> Option<Self> {
                let arr: [u8; $len] = bytes.try_into().ok()?;
                Some(Self(arr))
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            pub fn from_hex(s: &str) -> Result<Self, LockdropError> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(s).map_err(|e| {
                    LockdropError::Serialization(format!("{}: {e}", stringify!($name)))
                })?;
                Self::from_slice(&bytes).ok_or_else(|| {
                    LockdropError::Serialization(format!(
                        "{}: expected {} bytes, got {}",
                        stringify!($name),
                        $len,
                        bytes.len()
                    ))
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}…)", stringify!($name), &self.to_hex()[..16])
            }
        }

        impl FromStr for $name {
            type Err = LockdropError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_bytes_newtype!(
    /// 32-byte source-chain transaction id in display (big-endian) order,
    /// exactly as block explorers print it.
    TxHash,
    32
);

hex_bytes_newtype!(
    /// 32-byte claim identifier: BLAKE2b-256 of a `LockParameter`'s canonical
    /// encoding. Primary key of a claim on the destination ledger.
    ClaimId,
    32
);

hex_bytes_newtype!(
    /// SEC1 compressed secp256k1 public key.
    CompressedPublicKey,
    33
);

// ── LockType ─────────────────────────────────────────────────────────────────

/// Source chain family the lock was made on. The discriminant is the byte
/// the destination ledger stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LockType {
    Bitcoin = 0,
    Ethereum = 1,
}

impl LockType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(LockType::Bitcoin),
            1 => Some(LockType::Ethereum),
            _ => None,
        }
    }
}

// ── LockNetwork ──────────────────────────────────────────────────────────────

/// Source-chain network a lock script and its address are derived for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockNetwork {
    Mainnet,
    Testnet,
    Regtest,
}

impl fmt::Display for LockNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockNetwork::Mainnet => write!(f, "mainnet"),
            LockNetwork::Testnet => write!(f, "testnet"),
            LockNetwork::Regtest => write!(f, "regtest"),
        }
    }
}

impl FromStr for LockNetwork {
    type Err = LockdropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" | "bitcoin" => Ok(LockNetwork::Mainnet),
            "testnet" | "test" | "test3" => Ok(LockNetwork::Testnet),
            "regtest" => Ok(LockNetwork::Regtest),
            other => Err(LockdropError::Serialization(format!("unknown network: {other}"))),
        }
    }
}

// ── LockParameter ────────────────────────────────────────────────────────────

/// Canonical record of one time-lock, shared by claim identifier derivation
/// and the destination ledger's storage.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockParameter {
    pub lock_type: LockType,
    /// Funding transaction on the source chain.
    pub transaction_id: TxHash,
    pub public_key: CompressedPublicKey,
    /// Seconds-equivalent of the block-count duration enforced by the script.
    pub duration_secs: u64,
    /// Locked amount in the source chain's smallest unit.
    #[serde(with = "serde_u128")]
    pub value: u128,
}

impl LockParameter {
    /// Size of `canonical_bytes()`: 1 + 32 + 33 + 8 + 16.
    pub const ENCODED_LEN: usize = 90;

    /// Record for a Bitcoin lock of `days` days; the duration is
    /// `days * 86400` so it matches what the compiled script enforces.
    pub fn bitcoin(
        transaction_id: TxHash,
        public_key: CompressedPublicKey,
        days: u32,
        value: Satoshi,
    ) -> Self {
        Self {
            lock_type: LockType::Bitcoin,
            transaction_id,
            public_key,
            duration_secs: days_to_seconds(days),
            value: value as u128,
        }
    }

    /// Fixed-width encoding the destination ledger hashes:
    /// `type:u8 || txid:[u8;32] || pubkey:[u8;33] || duration:u64le || value:u128le`.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::ENCODED_LEN);
        out.push(self.lock_type.as_u8());
        out.extend_from_slice(self.transaction_id.as_bytes());
        out.extend_from_slice(self.public_key.as_bytes());
        out.extend_from_slice(&self.duration_secs.to_le_bytes());
        out.extend_from_slice(&self.value.to_le_bytes());
        out
    }

    /// Fails unless `duration_secs` is exactly the seconds-equivalent of
    /// `days`, i.e. the record describes the script compiled for `days`.
    pub fn ensure_matches_days(&self, days: u32) -> Result<(), LockdropError> {
        let expected_secs = days_to_seconds(days);
        if self.duration_secs != expected_secs {
            return Err(LockdropError::DurationMismatch {
                days,
                expected_secs,
                got_secs: self.duration_secs,
            });
        }
        Ok(())
    }
}

/// `days * 86400`, the duration stored in a `LockParameter`.
pub fn days_to_seconds(days: u32) -> u64 {
    days as u64 * SECONDS_PER_DAY
}

// ── UnspentLock ──────────────────────────────────────────────────────────────

/// A funding output observed at a lock address by the chain-data provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentLock {
    pub txid: TxHash,
    pub output_index: u32,
    pub value: Satoshi,
    /// Height of the block that confirmed the funding transaction.
    /// `None` while it sits in the mempool.
    pub confirmed_height: Option<BlockHeight>,
}

pub(crate) mod serde_u128 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&v.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
