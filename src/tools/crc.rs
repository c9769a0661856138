//! CRC32 checksums for the bzip2 stream, both block and stream versions.
//!
//! Bzip2 uses the bit-reversed variant of the usual CRC32: the register is
//! fed most-significant-bit first with polynomial 0x04c11db7 (this is
//! CRC-32/BZIP2). Each block carries the CRC of its pre-RLE1 bytes, and the
//! stream trailer carries a combined CRC folded from every block CRC.

/// MSB-first CRC32 polynomial.
const CRC32_POLY: u32 = 0x04c1_1db7;

/// The 256-entry lookup table, computed once at compile time.
static CRC32_TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0_u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ CRC32_POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Running CRC register for one block. Reset at the start of every block;
/// `result()` is what goes into the block header.
#[derive(Debug, Clone)]
pub struct Crc {
    register: u32,
}

impl Crc {
    pub fn new() -> Self {
        Self {
            register: 0xffff_ffff,
        }
    }

    /// Clear the register back to all-ones.
    pub fn reset(&mut self) {
        self.register = 0xffff_ffff;
    }

    /// Fold one byte into the register.
    #[inline(always)]
    pub fn update(&mut self, byte: u8) {
        self.register = (self.register << 8)
            ^ CRC32_TABLE[(((self.register >> 24) as u8) ^ byte) as usize];
    }

    /// Fold `count` copies of `byte` into the register.
    pub fn update_run(&mut self, byte: u8, count: u32) {
        for _ in 0..count {
            self.update(byte);
        }
    }

    /// The finished CRC: one's complement of the register.
    pub fn result(&self) -> u32 {
        !self.register
    }

    /// Merge a second segment's CRC (computed over its own `other_len`
    /// bytes) into this one, as if this register had also consumed those
    /// bytes. Uses the GF(2) zero-extension matrix technique, so segment
    /// CRCs computed independently can be combined without re-scanning.
    pub fn combine(&mut self, other_crc: u32, other_len: u64) {
        let combined = combine(self.result(), other_crc, other_len);
        self.register = !combined;
    }
}

impl Default for Crc {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold one block CRC into the running stream CRC: rotate left one bit,
/// then xor. Applied after every block, empty blocks included.
pub fn stream_crc(running: u32, block_crc: u32) -> u32 {
    running.rotate_left(1) ^ block_crc
}

/// crc(A ++ B) from crc(A), crc(B) and len(B).
///
/// The doubling-squares walk is done in the reflected (LSB-first) domain
/// with the reversed polynomial; bzip2's MSB-first CRC is the bit-reverse
/// of that, so the values are mirrored at the boundary.
pub fn combine(crc_a: u32, crc_b: u32, len_b: u64) -> u32 {
    if len_b == 0 {
        return crc_a;
    }
    let mut crc = crc_a.reverse_bits();
    let mut len = len_b;

    // Operator matrices for one and two zero bytes appended.
    let mut odd = [0_u32; 32];
    odd[0] = 0xedb8_8320; // reflected CRC32_POLY
    let mut row = 1_u32;
    for cell in odd.iter_mut().skip(1) {
        *cell = row;
        row <<= 1;
    }
    let mut even = [0_u32; 32];
    gf2_matrix_square(&mut even, &odd);
    gf2_matrix_square(&mut odd, &even);

    // Apply len(B) zero bytes to crc(A), squaring as we shift out bits.
    loop {
        gf2_matrix_square(&mut even, &odd);
        if len & 1 != 0 {
            crc = gf2_matrix_times(&even, crc);
        }
        len >>= 1;
        if len == 0 {
            break;
        }
        gf2_matrix_square(&mut odd, &even);
        if len & 1 != 0 {
            crc = gf2_matrix_times(&odd, crc);
        }
        len >>= 1;
        if len == 0 {
            break;
        }
    }

    (crc ^ crc_b.reverse_bits()).reverse_bits()
}

#[inline]
fn gf2_matrix_times(mat: &[u32; 32], mut vec: u32) -> u32 {
    let mut sum = 0;
    let mut i = 0;
    while vec != 0 {
        if vec & 1 != 0 {
            sum ^= mat[i];
        }
        vec >>= 1;
        i += 1;
    }
    sum
}

fn gf2_matrix_square(square: &mut [u32; 32], mat: &[u32; 32]) {
    for (sq, &m) in square.iter_mut().zip(mat.iter()) {
        *sq = gf2_matrix_times(mat, m);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn crc_of(data: &[u8]) -> u32 {
        let mut crc = Crc::new();
        for &b in data {
            crc.update(b);
        }
        crc.result()
    }

    #[test]
    fn check_value() {
        // CRC-32/BZIP2 check value for "123456789"
        assert_eq!(crc_of(b"123456789"), 0xfc89_1918);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(crc_of(b""), 0x0000_0000);
    }

    #[test]
    fn update_run_matches_loop() {
        let mut a = Crc::new();
        a.update_run(b'x', 300);
        assert_eq!(a.result(), crc_of(&[b'x'; 300]));
    }

    #[test]
    fn combine_matches_concatenation() {
        let a = b"The quick brown fox ";
        let b = b"jumps over the lazy dog";
        let whole = crc_of(b"The quick brown fox jumps over the lazy dog");
        assert_eq!(combine(crc_of(a), crc_of(b), b.len() as u64), whole);
    }

    #[test]
    fn combine_mutating_form() {
        let a = vec![0xa5_u8; 1000];
        let b: Vec<u8> = (0..=255_u8).cycle().take(4097).collect();
        let mut crc = Crc::new();
        for &x in &a {
            crc.update(x);
        }
        let mut whole = Crc::new();
        for &x in a.iter().chain(b.iter()) {
            whole.update(x);
        }
        crc.combine(crc_of(&b), b.len() as u64);
        assert_eq!(crc.result(), whole.result());
    }

    #[test]
    fn combine_empty_segment() {
        let a = crc_of(b"abc");
        assert_eq!(combine(a, crc_of(b""), 0), a);
    }

    #[test]
    fn stream_fold() {
        // rotate-left-and-xor, starting from zero
        assert_eq!(stream_crc(0, 0x1234_5678), 0x1234_5678);
        assert_eq!(stream_crc(0x8000_0001, 0), 0x0000_0003);
    }
}
