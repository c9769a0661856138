//! Run-length pre-encoding (RLE1), applied to raw bytes before they enter
//! the block.
//!
//! Runs of 1-3 identical bytes are stored literally. A run of four or more
//! is stored as the byte four times followed by a count byte holding
//! `length - 4`, so a run's physical size is bounded at five bytes and the
//! BWT always sees the same canonical shape for long runs. The CRC is fed
//! the *logical* bytes, not the encoded form.

use crate::compression::compress::Block;

/// Longest run the encoder accumulates before forcing a flush. Keeps the
/// count byte in range (251 = 255 - 4).
pub const MAX_RUN: u32 = 255;

/// The pending `(byte, length)` run between `write` calls.
#[derive(Debug, Default)]
pub struct RunState {
    pub current: Option<u8>,
    pub length: u32,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.length = 0;
    }
}

/// Append one finished run to the block in RLE1 form, folding the logical
/// bytes into the block CRC. The caller has already made room (a flush may
/// first close the block when it is within its safety margin).
pub fn write_run(block: &mut Block, byte: u8, length: u32) {
    debug_assert!(length >= 1 && length <= MAX_RUN);
    block.crc.update_run(byte, length);
    match length {
        1..=3 => {
            for _ in 0..length {
                block.data.push(byte);
            }
        }
        n => {
            for _ in 0..4 {
                block.data.push(byte);
            }
            block.data.push((n - 4) as u8);
        }
    }
}
