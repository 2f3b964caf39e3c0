use bitcoin::Sequence;
use lockdrop_core::constants::{BLOCKS_PER_DAY, MAX_RELATIVE_SEQUENCE};
use lockdrop_core::error::LockdropError;
use lockdrop_core::types::days_to_seconds;

/// BIP-68 block-based relative lock time for `days` days at 144 blocks/day.
///
/// Only the 16-bit value field is available, so anything past 65535 blocks
/// (about 455 days) fails with `SequenceOverflow`. This bound is independent
/// of the 30..=300 day range enforced by `compile_lock`.
pub fn days_to_block_sequence(days: u32) -> Result<u32, LockdropError> {
    let blocks = days as u64 * BLOCKS_PER_DAY as u64;
    let height = u16::try_from(blocks).map_err(|_| LockdropError::SequenceOverflow {
        max: MAX_RELATIVE_SEQUENCE,
        got: blocks,
    })?;
    Ok(Sequence::from_height(height).to_consensus_u32())
}

/// Seconds-equivalent of a `days`-day lock, the value carried in
/// `LockParameter::duration_secs`.
pub fn block_sequence_to_redeemable_epoch_seconds(days: u32) -> u64 {
    days_to_seconds(days)
}
