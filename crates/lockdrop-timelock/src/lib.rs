//! lockdrop-timelock
//!
//! Bitcoin side of the lockdrop: the CHECKSEQUENCEVERIFY lock script and its
//! P2SH address, the transaction that spends it once the relative lock has
//! matured, and the flows that tie both to the chain-data provider and the
//! destination ledger.

pub mod address;
pub mod flow;
pub mod query;
pub mod script;
pub mod sequence;
pub mod unlock;

pub use address::{
    bitcoin_network, network_from_address, p2pkh_address, parse_address, recover_locker_key,
    validate_address, validate_public_key,
};
pub use flow::{
    claim_status, collect_lock_parameters, request_claim, verify_funding, ClaimSubmission,
};
pub use query::{blocks_until_unlock, is_matured};
pub use script::{compile_lock, lock_script, RedemptionScript};
pub use sequence::{block_sequence_to_redeemable_epoch_seconds, days_to_block_sequence};
pub use unlock::{build_unlock_transaction, to_raw_hex};
