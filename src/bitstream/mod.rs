//! Bit-level output for the bzip2 stream. Every field in the format is
//! packed most-significant-bit first, with no alignment except the final
//! byte padding at end of stream.
pub mod bitwriter;
