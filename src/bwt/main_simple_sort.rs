use super::block_sort::Work;
use super::main_gtu::main_gtu;

/// Shell-sort increments (Knuth's 3h+1 sequence).
const INCS: [i32; 14] = [
    1, 4, 13, 40, 121, 364, 1093, 3280, 9841, 29524, 88573, 265720, 797161, 2391484,
];

/// Shell sort the pointers in `bwt_ptr[lo..=hi]`, comparing rotations from
/// depth `d` onward. Used by the quicksort for small or deep buckets. The
/// inner loop is unrolled three deep; the work counter is only consulted
/// between groups, so an abort costs at most three extra insertions.
pub fn main_simple_sort(
    bwt_ptr: &mut [u32],
    block_data: &[u16],
    quadrant: &[u16],
    end: usize,
    lo: i32,
    hi: i32,
    d: i32,
    work: &mut Work,
) {
    let big_n = hi - lo + 1;
    if big_n < 2 {
        return;
    };

    let mut hp: i32 = 0;
    while INCS[hp as usize] < big_n {
        hp += 1;
    }
    hp -= 1;

    while hp >= 0 {
        let hp_incr = INCS[hp as usize];
        let mut i = lo + hp_incr;
        loop {
            /*-- copy 1 --*/
            if i > hi {
                break;
            };
            let mut tmp_v = bwt_ptr[i as usize];
            let mut j = i;

            while main_gtu(
                bwt_ptr[(j - hp_incr) as usize] as i32 + d,
                tmp_v as i32 + d,
                block_data,
                quadrant,
                end,
                work,
            ) {
                bwt_ptr[j as usize] = bwt_ptr[(j - hp_incr) as usize];
                j -= hp_incr;
                if j <= (lo + hp_incr - 1) {
                    break;
                };
            }
            bwt_ptr[j as usize] = tmp_v;
            i += 1;

            /*-- copy 2 --*/
            if i > hi {
                break;
            };
            tmp_v = bwt_ptr[i as usize];
            j = i;
            while main_gtu(
                bwt_ptr[(j - hp_incr) as usize] as i32 + d,
                tmp_v as i32 + d,
                block_data,
                quadrant,
                end,
                work,
            ) {
                bwt_ptr[j as usize] = bwt_ptr[(j - hp_incr) as usize];
                j -= hp_incr;
                if j <= (lo + hp_incr - 1) {
                    break;
                };
            }
            bwt_ptr[j as usize] = tmp_v;
            i += 1;

            /*-- copy 3 --*/
            if i > hi {
                break;
            };
            tmp_v = bwt_ptr[i as usize];
            j = i;
            while main_gtu(
                bwt_ptr[(j - hp_incr) as usize] as i32 + d,
                tmp_v as i32 + d,
                block_data,
                quadrant,
                end,
                work,
            ) {
                bwt_ptr[j as usize] = bwt_ptr[(j - hp_incr) as usize];
                j -= hp_incr;
                if j <= (lo + hp_incr - 1) {
                    break;
                };
            }
            bwt_ptr[j as usize] = tmp_v;
            i += 1;

            if work.expired() {
                return;
            };
        }
        hp -= 1;
    }
}
