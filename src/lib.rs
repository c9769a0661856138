//! A bzip2-format block-sorting compressor.
//!
//! Input is run-length pre-encoded and accumulated into blocks of 100 to
//! 900kB. Each block goes through a Burrows-Wheeler sort, a move-to-front
//! and zero-run recoding, and multi-table Huffman coding, then is framed
//! onto the output bitstream with its CRC. Compression only; the streams
//! decompress with any bzip2 decoder.
//!
//! The usual entry point is [`BzEncoder`]:
//!
//! ```no_run
//! use std::fs::File;
//! use bzenc::BzEncoder;
//!
//! # fn main() -> bzenc::Result<()> {
//! let sink = File::create("data.bz2")?;
//! let mut encoder = BzEncoder::new(sink, 9)?;
//! encoder.write(b"some data")?;
//! encoder.finish()?;
//! # Ok(())
//! # }
//! ```
#![warn(rust_2018_idioms)]

pub mod bitstream;
pub mod bwt;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use compression::compress::{choose_block_size, BzEncoder};
pub use error::{Error, Result};
