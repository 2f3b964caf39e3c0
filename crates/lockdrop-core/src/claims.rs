//! lockdrop-core::claims
//!
//! Read-only view of the destination ledger's claim state. The ledger owns
//! these records; this side only submits a claim and polls for the result.

use serde::{Deserialize, Serialize};

use crate::types::{serde_u128, ClaimId, Femto};
use crate::units::PLM;

/// Claim record as stored by the destination ledger under its `ClaimId`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Validator votes approving the claim.
    pub approve: u32,
    /// Validator votes declining the claim.
    pub decline: u32,
    /// Set once the reward has been paid out.
    pub complete: bool,
    /// Awarded reward in femto PLM.
    #[serde(with = "serde_u128")]
    pub amount: Femto,
}

/// Acknowledgement returned by the ledger for a submitted claim request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    /// Hash of the ledger transaction carrying the claim request (hex).
    pub transaction_hash: String,
}

/// Where a claim stands from the locker's point of view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimStatus {
    /// The ledger has no record under this id.
    NotRequested,
    /// Requested and being voted on.
    Pending { approve: u32, decline: u32 },
    /// Paid out.
    Complete {
        approve: u32,
        decline: u32,
        amount: Femto,
    },
}

impl ClaimStatus {
    pub fn from_record(record: Option<&ClaimRecord>) -> Self {
        match record {
            None => ClaimStatus::NotRequested,
            Some(r) if r.complete => ClaimStatus::Complete {
                approve: r.approve,
                decline: r.decline,
                amount: r.amount,
            },
            Some(r) => ClaimStatus::Pending {
                approve: r.approve,
                decline: r.decline,
            },
        }
    }

    pub fn is_requested(&self) -> bool {
        !matches!(self, ClaimStatus::NotRequested)
    }

    /// One-line summary for `id`.
    pub fn describe(&self, id: &ClaimId) -> String {
        let status_str = match self {
            ClaimStatus::NotRequested => "Claim not requested".to_string(),
            ClaimStatus::Pending { approve, decline } => {
                format!("Claim requested | approve {approve} | decline {decline}")
            }
            ClaimStatus::Complete {
                approve,
                decline,
                amount,
            } => format!(
                "Claim complete | approve {approve} | decline {decline} | receiving {} {}",
                PLM.format(*amount),
                PLM.display_unit
            ),
        };
        format!("Claim 0x{} | {}", &id.to_hex()[..16], status_str)
    }
}
