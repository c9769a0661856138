use log::{debug, info};

use super::block_sort::Work;
use super::main_q_sort3::main_q_sort3;

const MAIN_QSORT_STACK_SIZE: usize = 100;
const BZ_N_RADIX: i32 = 2;

/// Bytes of the block mirrored past the end so rotation comparisons can
/// run off the edge without wrapping on every step.
pub const OVERSHOOT: usize = 34;

/// The quicksort's explicit stack of (lo, hi, depth) frames.
pub struct QSort {
    pub stack: Vec<(i32, i32, i32)>,
    pub end: usize,
}

impl QSort {
    pub fn new(end: usize) -> Self {
        Self {
            stack: Vec::with_capacity(MAIN_QSORT_STACK_SIZE),
            end,
        }
    }
}

/// Sort every rotation of `block_data8`, returning the pointer array: the
/// i-th entry is the start position of the i-th rotation in sorted order.
///
/// The strategy is Burrows and Wheeler's bucket refinement. A radix pass
/// over two-byte prefixes splits the rotations into 65536 small buckets.
/// Big buckets (first byte) are then processed least-full first: each
/// small bucket is quicksorted, after which one scan of the finished big
/// bucket synthesises the order of every bucket whose *second* byte is the
/// finished one, so most buckets are never comparison-sorted at all. The
/// quadrant cache records partial orderings to speed later comparisons.
///
/// If the work counter expires mid-sort (only possible on the first
/// attempt) the returned array is partially sorted garbage; the caller
/// checks the counter, perturbs the block, and calls again.
pub fn main_sort(block_data8: &[u8], work: &mut Work) -> Vec<u32> {
    let end = block_data8.len();
    let mut qs = QSort::new(end);

    let mut quadrant: Vec<u16> = vec![0; end + OVERSHOOT];
    let mut copy_start = [0_i32; 256];
    let mut copy_end = [0_i32; 256];

    // Widen the input to u16 (so it shares an element type with the
    // quadrant cache) and mirror the first OVERSHOOT bytes past the end.
    // Small blocks wrap as often as needed.
    let mut block_data: Vec<u16> = Vec::with_capacity(end + OVERSHOOT);
    block_data.extend(block_data8.iter().map(|&b| b as u16));
    block_data.extend((0..OVERSHOOT).map(|i| block_data8[i % end] as u16));

    // Count every cyclic two-byte prefix, then turn the counts into
    // cumulative bucket boundaries.
    let mut freq_tab = vec![0_u32; 65536 + 1];
    let mut s = (block_data8[0] as u16) << 8;
    for i in (0..end).rev() {
        s = (s >> 8) | ((block_data8[i] as u16) << 8);
        freq_tab[s as usize] += 1;
    }
    freq_tab.iter_mut().fold(0, |acc, x| {
        *x += acc;
        *x
    });

    info!("   bucket sorting ...");

    // Drop each rotation into its two-byte bucket, back to front so the
    // fill is stable.
    let mut bwt_ptr = vec![0_u32; end];
    let mut s = (block_data8[0] as u16) << 8;
    for i in (0..end).rev() {
        s = (s >> 8) | ((block_data8[i] as u16) << 8);
        let j = freq_tab[s as usize] - 1;
        freq_tab[s as usize] = j;
        bwt_ptr[j as usize] = i as u32;
    }

    let mut big_done = [false; 256];

    // Shell sort the big-bucket processing order by bucket size, smallest
    // first. 364 is the largest 3h+1 increment below 256*3.
    let mut running_order: Vec<u8> = (0..=255).collect();
    let mut h = 364;
    while h != 1 {
        h /= 3;
        for i in h..=255 {
            let vv = running_order[i];
            let mut j = i;
            while big_freq(&freq_tab, running_order[j - h] as u32) > big_freq(&freq_tab, vv as u32)
            {
                running_order[j] = running_order[j - h];
                j -= h;
                if j <= (h - 1) {
                    break;
                }
            }
            running_order[j] = vv;
        }
    }

    const SETMASK: u32 = 1 << 21;
    const CLEARMASK: u32 = !SETMASK;

    let mut num_q_sorted = 0;

    for (i, &ss) in running_order.iter().enumerate() {
        /*--
           Step 1:
           Complete the big bucket [ss] by quicksorting any unsorted small
           buckets [ss, j], for j != ss. Previous scanning phases will have
           completed many of them already, marked by SETMASK in freq_tab.
        --*/
        for j in 0..=255_usize {
            if j != ss as usize {
                let sb = ((ss as usize) << 8) + j;
                if 0 == (freq_tab[sb] & SETMASK) {
                    let lo = (freq_tab[sb] & CLEARMASK) as i32;
                    let hi = (freq_tab[sb + 1] & CLEARMASK) as i32 - 1;
                    if hi > lo {
                        debug!(
                            "   qsort [0x{:0x}, 0x{:0x}]   done {}   this {}",
                            ss,
                            j,
                            num_q_sorted,
                            hi - lo + 1
                        );
                        qs.stack.clear();
                        qs.stack.push((lo, hi, BZ_N_RADIX));
                        main_q_sort3(&mut bwt_ptr, &block_data, &quadrant, work, &mut qs);
                        num_q_sorted += hi - lo + 1;

                        // Too expensive: bail out so the caller can perturb
                        // the block and retry.
                        if work.expired() {
                            return bwt_ptr;
                        };
                    }
                }
                freq_tab[sb] |= SETMASK;
            }
        }

        /*--
           Step 2:
           Scan the finished big bucket [ss] to synthesise the sorted order
           of every small bucket [t, ss], including [ss, ss]. Each rotation
           in [ss] names a predecessor rotation ending in ss; visiting them
           in sorted order places those predecessors in sorted order too.
        --*/
        for t in 0..256 {
            let idx = (t << 8) + ss as usize;
            copy_start[t] = (freq_tab[idx] & CLEARMASK) as i32;
            copy_end[t] = (freq_tab[idx + 1] & CLEARMASK) as i32 - 1;
        }

        let mut j = (freq_tab[(ss as usize) << 8] & CLEARMASK) as i32;
        while j < copy_start[ss as usize] {
            let mut k = bwt_ptr[j as usize] as i32 - 1;
            if k < 0 {
                k += end as i32;
            };
            let c1 = block_data[k as usize] as usize;
            if !big_done[c1] {
                bwt_ptr[copy_start[c1] as usize] = k as u32;
                copy_start[c1] += 1;
            }
            j += 1;
        }
        let mut j = ((freq_tab[(ss as usize + 1) << 8] & CLEARMASK) as i32) - 1;
        while j > copy_end[ss as usize] {
            let mut k = bwt_ptr[j as usize] as i32 - 1;
            if k < 0 {
                k += end as i32;
            }
            let c1 = block_data[k as usize] as usize;
            if !big_done[c1] {
                bwt_ptr[copy_end[c1] as usize] = k as u32;
                copy_end[c1] -= 1;
            }
            j -= 1;
        }

        // The two scans must have met exactly, except for the degenerate
        // single-symbol block where [ss, ss] is the whole array.
        debug_assert!(
            (copy_start[ss as usize] - 1 == copy_end[ss as usize])
                || (copy_start[ss as usize] == 0 && copy_end[ss as usize] == end as i32 - 1)
        );

        for t in 0..256_usize {
            freq_tab[(t << 8) + ss as usize] |= SETMASK;
        }

        /*--
           Step 3:
           Big bucket [ss] is done. Record its positions in the quadrant
           cache (scaled into u16 range) so later comparisons between
           rotations whose prefixes fall in this bucket resolve without
           walking the block. Skipped for the last bucket, where nothing
           can benefit.
        --*/
        big_done[ss as usize] = true;

        if i < 255 {
            let bb_start = (freq_tab[(ss as usize) << 8] & CLEARMASK) as i32;
            let bb_size = ((freq_tab[(ss as usize + 1) << 8] & CLEARMASK) as i32) - bb_start;
            let mut shifts: u32 = 0;
            while (bb_size >> shifts) > 65534 {
                shifts += 1;
            }

            let mut j = bb_size - 1;
            while j >= 0 {
                let a2update = bwt_ptr[(bb_start + j) as usize] as usize;
                let q_val = (j >> shifts) as u16;
                quadrant[a2update] = q_val;
                if a2update < OVERSHOOT {
                    quadrant[a2update + end] = q_val;
                }
                j -= 1;
            }
        }
    }

    info!(
        "{} pointers, {} sorted, {} scanned",
        end,
        num_q_sorted,
        end as i32 - num_q_sorted
    );
    bwt_ptr
}

/// Size of big bucket n: the span of freq_tab between its first-byte
/// boundaries.
#[inline(always)]
fn big_freq(freq_tab: &[u32], n: u32) -> u32 {
    freq_tab[((n + 1) as usize) << 8] - freq_tab[(n as usize) << 8]
}
