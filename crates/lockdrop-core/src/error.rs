use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LockdropError {
    // ── Lock script errors ───────────────────────────────────────────────────
    #[error("lock duration must be between {min} and {max} days, got {got}")]
    InvalidDuration { min: u32, max: u32, got: u32 },

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("block sequence cannot be more than {max}, got {got}")]
    SequenceOverflow { max: u32, got: u64 },

    #[error("lock duration {got_secs}s does not match {days} days ({expected_secs}s)")]
    DurationMismatch {
        days: u32,
        expected_secs: u64,
        got_secs: u64,
    },

    // ── Unlock transaction errors ────────────────────────────────────────────
    #[error("invalid block sequence: {0}")]
    InvalidSequence(String),

    #[error("invalid transaction fee: {0}")]
    InvalidFee(String),

    #[error("invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("insufficient funds: fee {fee} exceeds locked value {value}")]
    InsufficientFunds { value: u64, fee: u64 },

    #[error("redeem script assembly failed: {0}")]
    ScriptAssemblyError(String),

    #[error("signer failure: {0}")]
    Signer(String),

    // ── Claim errors ─────────────────────────────────────────────────────────
    #[error("no proof-of-work nonce found within {iterations} iterations")]
    PowTimeout { iterations: u64 },

    // ── Addresses, amounts, signatures ───────────────────────────────────────
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid message signature: {0}")]
    InvalidSignature(String),

    // ── Collaborators ────────────────────────────────────────────────────────
    #[error("chain data provider error: {0}")]
    Provider(String),

    #[error("ledger client error: {0}")]
    Ledger(String),

    #[error("funding transaction {txid} does not pay the lock script: {reason}")]
    FundingMismatch { txid: String, reason: String },

    // ── Serialization ────────────────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),
}
