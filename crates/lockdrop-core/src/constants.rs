/// ─── Lockdrop Protocol Constants ────────────────────────────────────────────
///
/// Funds are time-locked on the source chain (Bitcoin) behind a relative
/// lock-time script; the destination ledger rewards the lock in PLM.
///
/// Source base unit:      satoshi (1 BTC = 10^8 satoshi)
/// Destination base unit: femto   (1 PLM = 10^15 femto)

// ── Relative lock-time ───────────────────────────────────────────────────────

/// Blocks mined per day at a 10 minute block interval (6 * 24).
pub const BLOCKS_PER_DAY: u32 = 144;

/// Largest block count a BIP-68 relative lock-time can encode.
pub const MAX_RELATIVE_SEQUENCE: u32 = 65_535;

/// Shortest lock the destination ledger accepts (days).
pub const MIN_LOCK_DAYS: u32 = 30;

/// Longest lock the destination ledger accepts (days).
pub const MAX_LOCK_DAYS: u32 = 300;

pub const SECONDS_PER_DAY: u64 = 86_400;

// ── Proof-of-Work ─────────────────────────────────────────────────────────────

/// Bits of the first digest byte that must be zero for a claim nonce.
/// Four leading zero bits: one accepted nonce per ~16 attempts.
pub const POW_WORK_MASK: u8 = 0b1111_0000;

/// Ceiling on nonce attempts before mining gives up.
/// At the default mask the chance of reaching it is below 2^-90_000.
pub const POW_MAX_ITERATIONS: u64 = 1_000_000;

// ── Denominations ─────────────────────────────────────────────────────────────

/// Decimal places between satoshi and BTC.
pub const SATOSHI_DECIMALS: u32 = 8;

/// Decimal places between femto and PLM.
pub const FEMTO_DECIMALS: u32 = 15;

// ── Signed message ────────────────────────────────────────────────────────────

/// Message a locker signs so the destination side can recover their key.
pub const LOCK_MESSAGE: &str = "plasm network btc lock";
