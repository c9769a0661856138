//! Multi-table Huffman coding of the MTF/RLE2 symbol stream.
//!
//! A block is coded with two to six Huffman tables, chosen by stream
//! length. The symbol stream is split into 50-symbol groups and each group
//! is assigned whichever table codes it cheapest; a few refinement passes
//! re-derive the tables from the groups that picked them. The per-group
//! table choices (selectors) ship in the block header, move-to-front and
//! unary coded, followed by every table's code lengths as 5-bit origin
//! plus bit-level deltas.

pub mod huffman;
pub mod huffman_code_from_weights;

/// Symbol space: 256 byte values plus RUNA/RUNB and the end-of-block
/// symbol, less the two values freed by the run coding.
pub const MAX_ALPHA_SIZE: usize = 258;

/// Symbols coded per selector.
pub const GROUP_SIZE: usize = 50;

/// Most coding tables a block may carry.
pub const GROUP_COUNT: usize = 6;

/// Longest admissible Huffman code.
pub const MAX_CODE_LEN: u32 = 20;
