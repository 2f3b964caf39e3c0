use lockdrop_core::error::LockdropError;
use lockdrop_core::types::{BlockHeight, UnspentLock};

use crate::sequence::days_to_block_sequence;

/// Blocks still to be mined before an unlock transaction for `lock` can go
/// into the next block, given the current chain tip. `None` while the
/// funding transaction is unconfirmed (the relative lock has not started).
///
/// An output confirmed at height `h` under a `n`-block CSV lock is spendable
/// in blocks at height `h + n` and above.
pub fn blocks_until_unlock(
    lock: &UnspentLock,
    days: u32,
    tip_height: BlockHeight,
) -> Result<Option<u32>, LockdropError> {
    let sequence = days_to_block_sequence(days)?;
    Ok(lock.confirmed_height.map(|confirmed| {
        confirmed
            .saturating_add(sequence)
            .saturating_sub(tip_height.saturating_add(1))
    }))
}

/// Returns true if an unlock transaction would be valid in the next block.
pub fn is_matured(
    lock: &UnspentLock,
    days: u32,
    tip_height: BlockHeight,
) -> Result<bool, LockdropError> {
    Ok(blocks_until_unlock(lock, days, tip_height)? == Some(0))
}
