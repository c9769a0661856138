use log::{debug, warn};

use super::main_sort::main_sort;
use super::rand_table::RandGaps;
use crate::compression::compress::Block;

/// Default work units allowed per input byte before the sorter gives up
/// on the block and randomises it.
pub const WORK_FACTOR: i32 = 30;

/// The sorting effort meter. `done` is charged by the rotation comparator;
/// once it passes `limit` on the first attempt the sort is abandoned. The
/// second attempt (on the perturbed block) never expires.
pub struct Work {
    pub done: i32,
    pub limit: i32,
    pub first_attempt: bool,
}

impl Work {
    pub fn new(limit: i32) -> Self {
        Self {
            done: 0,
            limit,
            first_attempt: true,
        }
    }

    #[inline(always)]
    pub fn expired(&self) -> bool {
        self.first_attempt && self.done > self.limit
    }
}

/// Sort the block's rotations and derive the transform output: `block.bwt`
/// becomes the final column of the sorted rotation matrix and
/// `block.orig_ptr` the row holding the unrotated block.
///
/// Highly repetitive blocks can push the comparison sort towards quadratic
/// cost. When the work meter expires, the block is perturbed with the
/// fixed randomisation sequence (flagged in the block header so a decoder
/// can undo it) and sorted again without a limit; the perturbation breaks
/// up the long equal runs that caused the blow-up.
pub fn block_sort(block: &mut Block, work_factor: i32) {
    let end = block.data.len();
    debug_assert!(end > 0);

    block.randomised = false;
    let mut work = Work::new(work_factor.saturating_mul(end as i32));
    let mut bwt_ptr = main_sort(&block.data, &mut work);

    if work.expired() {
        warn!(
            "block sort gave up after {} work units (limit {}), randomising block",
            work.done, work.limit
        );
        randomise(&mut block.data);
        block.randomised = true;
        work = Work {
            done: 0,
            limit: 0,
            first_attempt: false,
        };
        bwt_ptr = main_sort(&block.data, &mut work);
    }
    debug!("block sort used {} work units", work.done);

    block.bwt.clear();
    block.bwt.reserve(end);
    block.orig_ptr = 0;
    for (i, &p) in bwt_ptr.iter().enumerate() {
        if p == 0 {
            block.orig_ptr = i as u32;
            block.bwt.push(block.data[end - 1]);
        } else {
            block.bwt.push(block.data[p as usize - 1]);
        }
    }
}

/// Xor selected bytes with 1, at the positions named by the fixed gap
/// sequence. Applied identically by decoders to reverse it.
fn randomise(data: &mut [u8]) {
    let mut gaps = RandGaps::new();
    for byte in data.iter_mut() {
        if gaps.step() {
            *byte ^= 1;
        }
    }
}
