use super::block_sort::Work;

/// Compare the rotations starting at `i1` and `i2`, returning true when
/// rotation `i1` sorts strictly greater. The first twelve bytes are checked
/// directly; after that each step consults the quadrant cache as well, so
/// buckets that earlier passes already ordered resolve without walking the
/// whole block. Every eight-position stride charges one unit of work, which
/// is how pathological blocks get detected.
pub fn main_gtu(
    i1: i32,
    i2: i32,
    block_data: &[u16],
    quadrant: &[u16],
    end: usize,
    work: &mut Work,
) -> bool {
    debug_assert!(i1 != i2);
    let mut a = i1 as usize;
    let mut b = i2 as usize;

    macro_rules! check_bd {
        () => {
            if let Some(result) = check_data(block_data, a, b) {
                return result;
            }
            a += 1;
            b += 1;
        };
    }
    macro_rules! check_bdq {
        () => {
            if let Some(result) = check_data(block_data, a, b) {
                return result;
            }
            if let Some(result) = check_data(quadrant, a, b) {
                return result;
            }
            a += 1;
            b += 1;
        };
    }

    // Check block data 12 times
    check_bd!();
    check_bd!();
    check_bd!();
    check_bd!();
    check_bd!();
    check_bd!();
    check_bd!();
    check_bd!();
    check_bd!();
    check_bd!();
    check_bd!();
    check_bd!();

    let mut k: i32 = end as i32 + 8;
    while k >= 0 {
        // Check block data then quadrant data 8 times
        check_bdq!();
        check_bdq!();
        check_bdq!();
        check_bdq!();
        check_bdq!();
        check_bdq!();
        check_bdq!();
        check_bdq!();

        // Wrap around the end of the block.
        // (Both block_data and quadrant extend past end.)
        if a > end {
            a -= end
        }
        if b > end {
            b -= end
        }
        k -= 8;
        work.done += 1;
    }
    false
}

#[inline(always)]
fn check_data(data: &[u16], a: usize, b: usize) -> Option<bool> {
    if data[a] != data[b] {
        Some(data[a] > data[b])
    } else {
        None
    }
}
