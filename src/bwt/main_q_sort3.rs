use log::warn;

use super::block_sort::Work;
use super::main_simple_sort::main_simple_sort;
use super::main_sort::QSort;

const MAIN_QSORT_STACK_SIZE: usize = 100;
const MAIN_QSORT_SMALL_THRESH: i32 = 20;
const MAIN_QSORT_DEPTH_THRESH: i32 = 10;

/// Three-way-partition quicksort over a small bucket of rotation pointers.
/// Buckets below the size threshold, or deeper than the depth threshold,
/// are handed to the shell sort instead. Partitioning pivots on the
/// median-of-three byte at the current depth; the three resulting segments
/// are pushed largest-first so the stack stays shallow.
pub(crate) fn main_q_sort3(
    bwt_ptr: &mut [u32],
    block_data: &[u16],
    quadrant: &[u16],
    work: &mut Work,
    qs: &mut QSort,
) {
    while !qs.stack.is_empty() {
        if qs.stack.len() >= MAIN_QSORT_STACK_SIZE - 2 {
            warn!("excessive stack depth in block sort quicksort");
        };

        // Get the current boundaries and depth
        let (lo, hi, d) = match qs.stack.pop() {
            Some(frame) => frame,
            None => break,
        };

        // Use main_simple_sort if the context is simple (small, not deep)
        if ((hi - lo) < MAIN_QSORT_SMALL_THRESH) || (d > MAIN_QSORT_DEPTH_THRESH) {
            main_simple_sort(bwt_ptr, block_data, quadrant, qs.end, lo, hi, d, work);
            if work.expired() {
                return;
            };
            continue;
        }

        // Get the approximate median value from the block data in this bucket
        let med = mmed3(
            block_data[bwt_ptr[lo as usize] as usize + d as usize],
            block_data[bwt_ptr[hi as usize] as usize + d as usize],
            block_data[bwt_ptr[(lo as usize + hi as usize) >> 1] as usize + d as usize],
        );

        let mut un_lo = lo;
        let mut lt_lo = lo;
        let mut un_hi = hi;
        let mut gt_hi = hi;

        loop {
            while un_hi >= un_lo {
                let n =
                    block_data[bwt_ptr[un_lo as usize] as usize + d as usize] as i32 - med as i32;
                if n == 0 {
                    bwt_ptr.swap(un_lo as usize, lt_lo as usize);
                    lt_lo += 1;
                    un_lo += 1;
                    continue;
                };
                if n > 0 {
                    break;
                };
                un_lo += 1;
            }
            while un_hi >= un_lo {
                let n =
                    block_data[bwt_ptr[un_hi as usize] as usize + d as usize] as i32 - med as i32;
                if n == 0 {
                    bwt_ptr.swap(un_hi as usize, gt_hi as usize);
                    gt_hi -= 1;
                    un_hi -= 1;
                    continue;
                };
                if n < 0 {
                    break;
                };
                un_hi -= 1;
            }
            if un_lo > un_hi {
                break;
            };
            bwt_ptr.swap(un_lo as usize, un_hi as usize);
            un_lo += 1;
            un_hi -= 1;
        }
        debug_assert!(un_hi == un_lo - 1);

        // Every element equalled the pivot: just descend a level
        if gt_hi < lt_lo {
            qs.stack.push((lo, hi, d + 1));
            continue;
        }

        // Move the pivot-equal runs from the edges into the middle
        let mut n = (lt_lo - lo).min(un_lo - lt_lo);
        mvswap(bwt_ptr, lo, un_lo - n, n);

        let mut m = (hi - gt_hi).min(gt_hi - un_hi);
        mvswap(bwt_ptr, un_lo, hi - m + 1, m);

        n = lo + un_lo - lt_lo - 1;
        m = hi - (gt_hi - un_hi) + 1;

        let mut next: [(i32, i32, i32); 3] = [(lo, n, d), (m, hi, d), (n + 1, m - 1, d + 1)];

        // Largest segment first so the stack holds the two smaller ones
        if (next[0].1 - next[0].0) < (next[1].1 - next[1].0) {
            next.swap(0, 1);
        }
        if (next[1].1 - next[1].0) < (next[2].1 - next[2].0) {
            next.swap(1, 2);
        }
        if (next[0].1 - next[0].0) < (next[1].1 - next[1].0) {
            next.swap(0, 1);
        }

        qs.stack.push(next[0]);
        qs.stack.push(next[1]);
        qs.stack.push(next[2]);
    }
}

/// Return the middle value of these three
fn mmed3(mut a: u16, mut b: u16, c: u16) -> u16 {
    if a > b {
        std::mem::swap(&mut a, &mut b);
    };
    if b > c {
        b = c;
        if a > b {
            b = a;
        }
    }
    b
}

/// Swap n pointers starting at lo/lo_2
fn mvswap(bwt_ptr: &mut [u32], lo: i32, lo_2: i32, n: i32) {
    let mut lo = lo as usize;
    let mut lo_2 = lo_2 as usize;
    let mut n = n;
    while n > 0 {
        bwt_ptr.swap(lo, lo_2);
        lo += 1;
        lo_2 += 1;
        n -= 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mmed3_is_the_median() {
        assert_eq!(mmed3(1, 2, 3), 2);
        assert_eq!(mmed3(3, 1, 2), 2);
        assert_eq!(mmed3(2, 3, 1), 2);
        assert_eq!(mmed3(5, 5, 1), 5);
        assert_eq!(mmed3(7, 7, 7), 7);
    }

    #[test]
    fn mvswap_swaps_disjoint_ranges() {
        let mut v: Vec<u32> = (0..10).collect();
        mvswap(&mut v, 0, 7, 3);
        assert_eq!(v, vec![7, 8, 9, 3, 4, 5, 6, 0, 1, 2]);
    }

    #[test]
    fn sorts_a_large_bucket() {
        // 64 rotations of repeating text is enough to exercise the
        // partition path (bucket size over the small threshold)
        let data: Vec<u8> = b"the quick brown fox jumps over the lazy dog once more..."
            .iter()
            .chain(b"the quick brown fox!")
            .copied()
            .collect();
        let end = data.len();
        let mut wide: Vec<u16> = data.iter().map(|&b| b as u16).collect();
        for i in 0..34 {
            wide.push(data[i % end] as u16);
        }
        let quadrant = vec![0_u16; wide.len()];
        let mut bwt_ptr: Vec<u32> = (0..end as u32).collect();
        let mut work = Work::new(30 * end as i32);
        let mut qs = QSort::new(end);
        qs.stack.push((0, end as i32 - 1, 0));

        main_q_sort3(&mut bwt_ptr, &wide, &quadrant, &mut work, &mut qs);

        // every adjacent pair of rotations must now be ordered
        let rotation = |start: u32| -> Vec<u8> {
            (0..end).map(|k| data[(start as usize + k) % end]).collect()
        };
        for pair in bwt_ptr.windows(2) {
            assert!(rotation(pair[0]) <= rotation(pair[1]));
        }
    }
}
