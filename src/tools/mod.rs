//! Helper stages of the compression pipeline.
//!
//! - cli: command line options for the front end binary.
//! - crc: CRC32 checksums, block and stream versions, plus segment combine.
//! - rle1: run-length pre-encoding of raw input bytes, pre-BWT.
//! - rle2_mtf: move-to-front transform and zero-run encoding, post-BWT.
//! - symbol_map: the per-block symbol presence bitmap.
pub mod cli;
pub mod crc;
pub mod rle1;
pub mod rle2_mtf;
pub mod symbol_map;
