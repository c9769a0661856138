//! Stream orchestration: block accumulation and the `BzEncoder` writer.
pub mod compress;
pub mod compress_block;
