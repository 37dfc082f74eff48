//! Block checksum codec.
//!
//! Every block carries its integrity tag inline: `block_size - 4` payload
//! bytes followed by the Adler-32 of that payload, stored little-endian in
//! the last four bytes. The trailer is the entire persisted format; nothing
//! outside the block describes it.

use adler32::RollingAdler32;

/// Bytes reserved at the end of every block for the checksum trailer.
pub const CHECKSUM_TRAILER_BYTES: usize = 4;

/// Smallest block that still has a payload in front of the trailer.
pub const MIN_BLOCK_SIZE: usize = 8;

/// Adler-32 of a block payload.
#[must_use]
pub fn block_checksum(payload: &[u8]) -> u32 {
    RollingAdler32::from_buffer(payload).hash()
}

/// Seal a block in place: checksum everything before the trailer and store
/// the value little-endian in the trailing four bytes.
///
/// Block sizes below [`MIN_BLOCK_SIZE`] or not a multiple of four are
/// rejected by configuration validation before any block is built, so the
/// length is never checked here.
pub fn seal_block(block: &mut [u8]) {
    let payload_end = block.len() - CHECKSUM_TRAILER_BYTES;
    let sum = block_checksum(&block[..payload_end]);
    block[payload_end..].copy_from_slice(&sum.to_le_bytes());
}

/// Verify a sealed block against its embedded trailer.
///
/// A mismatch is a normal, reportable condition rather than a failure of
/// this codec, so the result is a plain `bool`.
#[must_use]
pub fn verify_block(block: &[u8]) -> bool {
    let payload_end = block.len() - CHECKSUM_TRAILER_BYTES;
    let trailer = &block[payload_end..];
    let stored = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    stored == block_checksum(&block[..payload_end])
}
