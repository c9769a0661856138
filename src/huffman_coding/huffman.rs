use std::cmp::Ordering;
use std::io::{Error, Write};

use log::{debug, trace};

use super::huffman_code_from_weights::assign_code_lengths;
use super::{GROUP_COUNT, GROUP_SIZE, MAX_ALPHA_SIZE};
use crate::bitstream::bitwriter::BitWriter;
use crate::compression::compress::Block;

/// Cost charged to a symbol outside a table's seed partition, and inside
/// it. The gap is what steers each 50-symbol group towards the table that
/// was seeded with its kind of symbols.
const GREATER_ICOST: u32 = 15;
const LESSER_ICOST: u32 = 0;

/// Huffman-code the block's MTF/RLE2 stream and write the coded section:
/// symbol maps, table count, selectors, code length tables, payload.
///
/// Table refinement runs `iterations` passes (the format fixes nothing
/// here; four is the traditional default). Each pass assigns every
/// 50-symbol group its cheapest table, then rebuilds each table from the
/// frequencies of the groups that chose it.
pub fn huf_encode<W: Write>(
    bw: &mut BitWriter<W>,
    block: &mut Block,
    iterations: usize,
) -> Result<(), Error> {
    let alpha_size = block.eob as usize + 1;
    let vec_end = block.rle2.len();
    let table_count = table_count_for(vec_end);

    // The seed tables: length arrays that double as per-symbol cost
    // tables while we refine.
    let mut lengths = init_tables(&block.freqs, table_count, alpha_size);

    let selector_count = (vec_end + GROUP_SIZE - 1) / GROUP_SIZE;
    let mut selectors = vec![0_usize; selector_count];

    for iter in 0..iterations {
        let mut favorites = [0_usize; GROUP_COUNT];
        let mut total_cost = 0_u64;
        let mut rfreq = [[0_u32; MAX_ALPHA_SIZE]; GROUP_COUNT];

        for (i, chunk) in block.rle2.chunks(GROUP_SIZE).enumerate() {
            let mut cost = [0_u32; GROUP_COUNT];
            for &symbol in chunk {
                for (t, c) in cost.iter_mut().enumerate().take(table_count) {
                    *c += lengths[t][symbol as usize];
                }
            }

            // Lowest cost wins; ties go to the lowest-numbered table.
            let bt = (0..table_count).min_by_key(|&t| cost[t]).unwrap_or_default();
            total_cost += cost[bt] as u64;
            favorites[bt] += 1;

            for &symbol in chunk {
                rfreq[bt][symbol as usize] += 1;
            }
            if iter == iterations - 1 {
                selectors[i] = bt;
            }
        }

        debug!(
            " pass {}: cost {} bits, table uses {:?}",
            iter + 1,
            total_cost,
            &favorites[..table_count]
        );

        for t in 0..table_count {
            assign_code_lengths(&mut lengths[t], &rfreq[t], alpha_size);
        }
    }

    // Coded section header: symbol maps, then 3 bits of table count and
    // 15 bits of selector count.
    trace!("symbol maps at bit {}", bw.loc());
    for &word in &block.sym_map {
        bw.out16(word)?;
    }
    bw.write_bits(3, table_count as u32)?;
    bw.write_bits(15, selector_count as u32)?;

    // Selectors, move-to-front then unary (n ones and a terminating zero).
    trace!("{} selectors at bit {}", selector_count, bw.loc());
    let mut table_order: [usize; GROUP_COUNT] = [0, 1, 2, 3, 4, 5];
    for &selector in &selectors {
        let n = table_order
            .iter()
            .position(|&t| t == selector)
            .unwrap_or_default();
        let mut idx = n;
        while idx > 0 {
            table_order[idx] = table_order[idx - 1];
            idx -= 1;
        }
        table_order[0] = selector;
        bw.write_bits(n as u8 + 1, (1 << (n + 1)) - 2)?;
    }

    // Canonical codes: within a table, codes are assigned in ascending
    // (length, symbol) order, counting up and left-shifting on each
    // length change.
    let mut codes = vec![[0_u32; MAX_ALPHA_SIZE]; table_count];
    for (t, table_codes) in codes.iter_mut().enumerate() {
        let mut len_sym: Vec<(u32, u16)> = (0..alpha_size)
            .map(|s| (lengths[t][s], s as u16))
            .collect();
        len_sym.sort_unstable();

        let mut next_code: (u32, u32) = (len_sym[0].0, 0);
        for &(len, sym) in &len_sym {
            if len != next_code.0 {
                next_code.1 <<= len - next_code.0;
                next_code.0 = len;
            }
            table_codes[sym as usize] = next_code.1;
            next_code.1 += 1;
        }

        // The table's lengths, in symbol order: a 5-bit origin, then for
        // every symbol its delta as a string of 2-bit increments or
        // decrements closed by a zero bit.
        trace!("code lengths for table {} at bit {}", t, bw.loc());
        let mut origin = lengths[t][0];
        bw.write_bits(5, origin)?;
        for s in 0..alpha_size {
            let mut delta = lengths[t][s] as i32 - origin as i32;
            origin = lengths[t][s];
            loop {
                match delta.cmp(&0) {
                    Ordering::Greater => {
                        bw.write_bits(2, 0b10)?;
                        delta -= 1;
                    }
                    Ordering::Less => {
                        bw.write_bits(2, 0b11)?;
                        delta += 1;
                    }
                    Ordering::Equal => break,
                }
            }
            bw.write_bits(1, 0)?;
        }
    }

    // The payload: every group coded with its selected table.
    trace!("{} symbols of payload at bit {}", vec_end, bw.loc());
    for (g, chunk) in block.rle2.chunks(GROUP_SIZE).enumerate() {
        let t = selectors[g];
        for &symbol in chunk {
            bw.write_bits(
                lengths[t][symbol as usize] as u8,
                codes[t][symbol as usize],
            )?;
        }
    }
    Ok(())
}

/// Tables used, by symbol stream length.
pub fn table_count_for(stream_len: usize) -> usize {
    match stream_len {
        0..=199 => 2,
        200..=599 => 3,
        600..=1199 => 4,
        1200..=2399 => 5,
        _ => 6,
    }
}

/// Seed the coding tables by walking the cumulative frequency spectrum:
/// each table claims symbols until it holds roughly its share of the
/// total, marked cheap in that table and expensive everywhere else.
/// Alternate tables stop one symbol shy of their share so the low tables
/// are not starved.
fn init_tables(freqs: &[u32], table_count: usize, alpha_size: usize) -> Vec<[u32; MAX_ALPHA_SIZE]> {
    let mut lengths = vec![[GREATER_ICOST; MAX_ALPHA_SIZE]; table_count];
    let mut rem_f: i32 = freqs[..alpha_size].iter().sum::<u32>() as i32;

    let mut n_part = table_count as i32;
    let mut gs = 0_usize;
    while n_part > 0 {
        let t_freq = rem_f / n_part;
        let mut ge = gs as i32 - 1;
        let mut a_freq = 0_i32;
        while a_freq < t_freq && ge < alpha_size as i32 - 1 {
            ge += 1;
            a_freq += freqs[ge as usize] as i32;
        }

        if ge > gs as i32
            && n_part != table_count as i32
            && n_part != 1
            && (table_count as i32 - n_part) % 2 == 1
        {
            a_freq -= freqs[ge as usize] as i32;
            ge -= 1;
        }

        if ge >= gs as i32 {
            for s in gs..=ge as usize {
                lengths[n_part as usize - 1][s] = LESSER_ICOST;
            }
        }

        n_part -= 1;
        gs = (ge + 1) as usize;
        rem_f -= a_freq;
    }
    lengths
}
