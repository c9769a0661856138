//! Turns symbol frequencies into Huffman code lengths.
//!
//! The tree is never built explicitly; a min-heap merges the two lightest
//! nodes until one remains, and each leaf's depth is its code length. If
//! any length exceeds the format's 20-bit limit the weights are flattened
//! (halved, plus one) and the whole merge re-run, which converges quickly.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::MAX_CODE_LEN;

/// Compute code lengths for the first `alpha_size` symbols of `freqs`,
/// writing them into `lengths`. Zero-frequency symbols are treated as
/// frequency one so every symbol gets a code.
pub fn assign_code_lengths(lengths: &mut [u32], freqs: &[u32], alpha_size: usize) {
    // Weight in the high bits, tree depth in the low byte. Carrying the
    // depth inside the weight makes ties merge shallow-first, which keeps
    // the tree balanced among equal weights.
    let mut weights: Vec<u64> = freqs
        .iter()
        .take(alpha_size)
        .map(|&f| (if f == 0 { 1 } else { f as u64 }) << 8)
        .collect();

    loop {
        // Leaves are nodes 0..alpha_size, merges take ids from alpha_size up.
        let mut parent: Vec<usize> = vec![usize::MAX; 2 * alpha_size];
        let mut heap: BinaryHeap<Reverse<(u64, usize)>> = weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Reverse((w, i)))
            .collect();

        let mut next_id = alpha_size;
        while heap.len() > 1 {
            let Reverse((w1, n1)) = heap.pop().unwrap_or_default();
            let Reverse((w2, n2)) = heap.pop().unwrap_or_default();
            parent[n1] = next_id;
            parent[n2] = next_id;
            heap.push(Reverse((add_weights(w1, w2), next_id)));
            next_id += 1;
        }

        let mut too_long = false;
        for (i, len) in lengths.iter_mut().enumerate().take(alpha_size) {
            let mut depth = 0_u32;
            let mut k = i;
            while parent[k] != usize::MAX {
                k = parent[k];
                depth += 1;
            }
            *len = depth;
            too_long |= depth > MAX_CODE_LEN;
        }
        if !too_long {
            return;
        }

        // Flatten the weight distribution and retry.
        for w in weights.iter_mut() {
            let half = (*w >> 8) / 2;
            *w = (half + 1) << 8;
        }
    }
}

/// Parent weight: sum of the weights, depth one past the deeper child.
#[inline(always)]
fn add_weights(a: u64, b: u64) -> u64 {
    const WEIGHT_MASK: u64 = !0xff;
    const DEPTH_MASK: u64 = 0xff;
    ((a & WEIGHT_MASK) + (b & WEIGHT_MASK)) | (1 + (a & DEPTH_MASK).max(b & DEPTH_MASK))
}

#[cfg(test)]
mod test {
    use super::*;

    fn kraft_sum(lengths: &[u32]) -> f64 {
        lengths.iter().map(|&l| (0.5_f64).powi(l as i32)).sum()
    }

    #[test]
    fn uniform_frequencies_give_balanced_codes() {
        let freqs = [10_u32; 8];
        let mut lengths = [0_u32; 8];
        assign_code_lengths(&mut lengths, &freqs, 8);
        assert_eq!(lengths, [3; 8]);
    }

    #[test]
    fn lengths_form_a_complete_code() {
        let freqs: Vec<u32> = (1..=40).map(|n| n * n).collect();
        let mut lengths = vec![0_u32; 40];
        assign_code_lengths(&mut lengths, &freqs, 40);
        assert!((kraft_sum(&lengths) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rare_symbols_get_longer_codes() {
        let freqs = [1000, 1000, 1000, 1];
        let mut lengths = [0_u32; 4];
        assign_code_lengths(&mut lengths, &freqs, 4);
        assert!(lengths[3] >= lengths[0]);
        assert!(lengths[3] >= lengths[1]);
    }

    #[test]
    fn zero_frequency_symbols_still_coded() {
        let freqs = [50, 0, 50, 0];
        let mut lengths = [0_u32; 4];
        assign_code_lengths(&mut lengths, &freqs, 4);
        assert!(lengths.iter().all(|&l| l >= 1));
        assert!((kraft_sum(&lengths) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn depth_is_capped() {
        // near-fibonacci frequencies force a degenerate tree well past
        // the limit until the flattening retry kicks in
        let mut freqs = vec![0_u32; 40];
        let (mut a, mut b) = (1_u64, 1_u64);
        for f in freqs.iter_mut() {
            *f = a.min(u32::MAX as u64) as u32;
            let c = a + b;
            a = b;
            b = c;
        }
        let mut lengths = vec![0_u32; 40];
        assign_code_lengths(&mut lengths, &freqs, 40);
        assert!(lengths.iter().all(|&l| l <= MAX_CODE_LEN));
        assert!((kraft_sum(&lengths) - 1.0).abs() < 1e-9);
    }
}
