use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{POW_MAX_ITERATIONS, POW_WORK_MASK};
use crate::error::LockdropError;
use crate::types::LockNetwork;

/// Claim proof-of-work parameters.
///
/// `work_mask` is a difficulty knob, not a security boundary: a nonce is
/// accepted when `digest[0] & work_mask == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowConfig {
    pub work_mask: u8,
    /// Attempts before mining fails with `PowTimeout`.
    pub max_iterations: u64,
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            work_mask: POW_WORK_MASK,
            max_iterations: POW_MAX_ITERATIONS,
        }
    }
}

/// Settings shared by the wallet commands, loadable from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockdropConfig {
    /// Source-chain network locks are compiled for.
    pub network: LockNetwork,
    pub pow: PowConfig,
    /// JSON-RPC endpoint of a destination ledger node.
    pub ledger_rpc: String,
}

impl Default for LockdropConfig {
    fn default() -> Self {
        Self {
            network: LockNetwork::Testnet,
            pow: PowConfig::default(),
            ledger_rpc: "http://127.0.0.1:9933".into(),
        }
    }
}

impl LockdropConfig {
    pub fn from_json(json: &str) -> Result<Self, LockdropError> {
        serde_json::from_str(json).map_err(|e| LockdropError::Serialization(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, LockdropError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            LockdropError::Serialization(format!("reading {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}
