use std::io::{Error, Write};

use log::{debug, trace};

use crate::bitstream::bitwriter::BitWriter;
use crate::bwt::block_sort::block_sort;
use crate::compression::compress::Block;
use crate::huffman_coding::huffman::huf_encode;
use crate::tools::rle2_mtf::rle2_mtf_encode;

/// Compress one filled block onto the bitstream: block magic and CRC,
/// then the transform chain (block sort, MTF/RLE2, Huffman) with its
/// header fields interleaved where the format wants them.
///
/// The randomised flag and origin pointer sit between the CRC and the
/// symbol maps, so the sort has to run before those bits go out.
pub fn compress_block<W: Write>(
    bw: &mut BitWriter<W>,
    block: &mut Block,
    block_crc: u32,
    iterations: usize,
    work_factor: i32,
) -> Result<(), Error> {
    trace!("block {} header at bit {}", block.seq, bw.loc());
    bw.write_bits(24, 0x31_41_59)?;
    bw.write_bits(24, 0x26_53_59)?;
    bw.out32(block_crc)?;

    block_sort(block, work_factor);
    bw.write_bits(1, block.randomised as u32)?;
    bw.write_bits(24, block.orig_ptr)?;

    rle2_mtf_encode(block);
    huf_encode(bw, block, iterations)?;

    debug!(
        "block {}: {} bytes after run-length coding, {} MTF symbols, crc {:08x}",
        block.seq,
        block.data.len(),
        block.rle2.len(),
        block_crc
    );
    Ok(())
}
