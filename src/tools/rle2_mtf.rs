//! Move-to-front transform and zero-run encoding (RLE2) of the BWT output.
//!
//! The transform recodes each BWT byte as its rank in a recency list seeded
//! with the block's compacted alphabet, so locally repetitive data turns
//! into a stream dominated by small ranks. Runs of rank zero are not
//! emitted one by one: the run length is decomposed bijectively over the
//! two pseudo-symbols RUNA and RUNB, so a run of N zeros costs O(log N)
//! symbols. One end-of-block symbol closes the stream.

use log::trace;

use crate::compression::compress::Block;
use crate::tools::symbol_map::encode_sym_map;

pub const RUNA: u16 = 0;
pub const RUNB: u16 = 1;

/// Transform `block.bwt` into the MTF symbol stream. Fills `block.rle2`,
/// `block.freqs`, `block.eob` and `block.sym_map`. The alphabet is the set
/// of byte values actually present, densely remapped; the stream symbols
/// are RUNA/RUNB (0, 1), ranks shifted up by one (2..=n_in_use) and the
/// end-of-block symbol (n_in_use + 1).
pub fn rle2_mtf_encode(block: &mut Block) {
    // Find every byte value present and seed the recency list with the
    // compacted alphabet in ascending order.
    let mut in_use = [false; 256];
    for &byte in &block.bwt {
        in_use[byte as usize] = true;
    }
    let mut mtf_index = [0_u8; 256];
    let mut n_in_use = 0_usize;
    for (sym, &used) in in_use.iter().enumerate() {
        if used {
            mtf_index[n_in_use] = sym as u8;
            n_in_use += 1;
        }
    }

    let eob = n_in_use as u16 + 1;
    block.eob = eob;
    block.sym_map = encode_sym_map(&in_use);
    block.freqs = [0; crate::huffman_coding::MAX_ALPHA_SIZE];

    // Size for the worst case (no zero runs) plus the end-of-block symbol.
    block.rle2.clear();
    block.rle2.resize(block.bwt.len() + 1, 0);

    let mut zeros = 0_usize;
    let mut out_idx = 0_usize;

    for byte in &block.bwt {
        let mut idx = mtf_index[..n_in_use]
            .iter()
            .position(|c| c == byte)
            .expect("alphabet covers every block byte");
        if idx == 0 {
            zeros += 1;
            continue;
        }

        // A non-zero rank: flush any pending zero run first.
        flush_zeros(&mut block.rle2, &mut block.freqs, &mut out_idx, zeros);
        zeros = 0;

        block.freqs[idx + 1] += 1;
        block.rle2[out_idx] = idx as u16 + 1;
        out_idx += 1;

        // Move the byte to the front of the recency list. Shift in blocks
        // of four, then clean up the remainder.
        let front = mtf_index[idx];
        while idx > 3 {
            mtf_index[idx] = mtf_index[idx - 1];
            mtf_index[idx - 1] = mtf_index[idx - 2];
            mtf_index[idx - 2] = mtf_index[idx - 3];
            mtf_index[idx - 3] = mtf_index[idx - 4];
            idx -= 4;
        }
        while idx > 0 {
            mtf_index[idx] = mtf_index[idx - 1];
            idx -= 1;
        }
        mtf_index[0] = front;
    }

    // Trailing zeros, then the end-of-block symbol.
    flush_zeros(&mut block.rle2, &mut block.freqs, &mut out_idx, zeros);
    block.rle2[out_idx] = eob;
    block.freqs[eob as usize] += 1;
    out_idx += 1;

    block.rle2.truncate(out_idx);
    trace!(
        "mtf/rle2: {} bwt bytes -> {} symbols, {} in use",
        block.bwt.len(),
        block.rle2.len(),
        n_in_use
    );
}

/// Emit a pending run of `zeros` rank-zero symbols as RUNA/RUNB codes.
/// The decomposition writes bit b of (zeros in bijective base 2) as RUNA
/// for 1 and RUNB for 2.
fn flush_zeros(rle2: &mut [u16], freqs: &mut [u32], out_idx: &mut usize, zeros: usize) {
    if zeros == 0 {
        return;
    }
    let mut n = zeros - 1;
    loop {
        let sym = (n & 1) as u16; // RUNA or RUNB
        rle2[*out_idx] = sym;
        freqs[sym as usize] += 1;
        *out_idx += 1;
        if n < 2 {
            break;
        }
        n = (n - 2) >> 1;
    }
}
