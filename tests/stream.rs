//! Whole-stream tests: framing, determinism and block handling of the
//! encoder, checked at the bit level where the format is not byte aligned.

use bzenc::BzEncoder;

const BLOCK_MAGIC: u64 = 0x3141_5926_5359;
const STREAM_TRAILER: u64 = 0x1772_4538_5090;

fn compress(data: &[u8], block_size: usize) -> Vec<u8> {
    let mut encoder = BzEncoder::new(Vec::new(), block_size).unwrap();
    encoder.write(data).unwrap();
    encoder.finish().unwrap();
    encoder.into_inner()
}

/// Count occurrences of a `bits`-wide pattern at any bit offset. Block
/// boundaries are not byte aligned, so byte search is not enough.
fn count_bit_pattern(data: &[u8], pattern: u64, bits: u32) -> usize {
    let total_bits = data.len() * 8;
    if total_bits < bits as usize {
        return 0;
    }
    let mask = (1_u64 << bits) - 1;
    let mut window = 0_u64;
    let mut count = 0;
    for i in 0..total_bits {
        let bit = (data[i / 8] >> (7 - i % 8)) & 1;
        window = ((window << 1) | bit as u64) & mask;
        if i + 1 >= bits as usize && window == pattern {
            count += 1;
        }
    }
    count
}

/// Bit offset of the last occurrence of a `bits`-wide pattern.
fn find_bit_pattern(data: &[u8], pattern: u64, bits: u32) -> Option<usize> {
    let total_bits = data.len() * 8;
    let mask = (1_u64 << bits) - 1;
    let mut window = 0_u64;
    let mut found = None;
    for i in 0..total_bits {
        let bit = (data[i / 8] >> (7 - i % 8)) & 1;
        window = ((window << 1) | bit as u64) & mask;
        if i + 1 >= bits as usize && window == pattern {
            found = Some(i + 1 - bits as usize);
        }
    }
    found
}

fn read_bits(data: &[u8], offset: usize, count: u32) -> u64 {
    (offset..offset + count as usize).fold(0, |word, i| {
        (word << 1) | ((data[i / 8] >> (7 - i % 8)) & 1) as u64
    })
}

/// Deterministic filler that defeats the run-length stage.
fn noise(len: usize) -> Vec<u8> {
    let mut state = 0x2545_f491_4f6c_dd1d_u64;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 56) as u8
        })
        .collect()
}

#[test]
fn empty_stream_is_fourteen_bytes() {
    let out = compress(b"", 4);
    assert_eq!(
        out,
        vec![
            b'B', b'Z', b'h', b'4', 0x17, 0x72, 0x45, 0x38, 0x50, 0x90, 0x00, 0x00, 0x00, 0x00,
        ]
    );
}

#[test]
fn output_is_deterministic() {
    let data = noise(10_000);
    assert_eq!(compress(&data, 1), compress(&data, 1));
}

#[test]
fn chunking_does_not_change_the_stream() {
    let data = b"A stream is a stream is a stream, however it arrives.".repeat(100);

    let whole = compress(&data, 1);

    let mut encoder = BzEncoder::new(Vec::new(), 1).unwrap();
    for byte in &data {
        encoder.write(std::slice::from_ref(byte)).unwrap();
    }
    encoder.finish().unwrap();
    assert_eq!(whole, encoder.into_inner());

    let mut encoder = BzEncoder::new(Vec::new(), 1).unwrap();
    for chunk in data.chunks(777) {
        encoder.write(chunk).unwrap();
    }
    encoder.finish().unwrap();
    assert_eq!(whole, encoder.into_inner());
}

#[test]
fn small_input_is_one_block() {
    let out = compress(b"hello bzip2 world", 1);
    assert_eq!(&out[..4], b"BZh1");
    assert_eq!(count_bit_pattern(&out, BLOCK_MAGIC, 48), 1);
    assert_eq!(count_bit_pattern(&out, STREAM_TRAILER, 48), 1);
    // randomised flag (bit 112, right after magic and crc) is clear
    assert_eq!(out[14] & 0x80, 0);
}

#[test]
fn overfull_block_splits_into_two() {
    // just past what a 100k block holds after the safety margin
    let data = noise(99_981);
    let mut encoder = BzEncoder::new(Vec::new(), 1).unwrap();
    encoder.write(&data).unwrap();
    encoder.finish().unwrap();
    assert_eq!(encoder.blocks(), 2);
    let out = encoder.into_inner();
    assert_eq!(count_bit_pattern(&out, BLOCK_MAGIC, 48), 2);
    assert_eq!(count_bit_pattern(&out, STREAM_TRAILER, 48), 1);
}

#[test]
fn larger_block_size_keeps_one_block() {
    let data = noise(150_000);
    let mut encoder = BzEncoder::new(Vec::new(), 2).unwrap();
    encoder.write(&data).unwrap();
    encoder.finish().unwrap();
    assert_eq!(encoder.blocks(), 1);
}

#[test]
fn pathological_input_sets_the_randomised_flag() {
    // a zero work budget makes any comparison-heavy block give up and
    // take the randomisation path; the stream must still be well formed
    let data = b"ab".repeat(1000);
    let mut encoder = BzEncoder::new(Vec::new(), 1).unwrap().work_factor(0);
    encoder.write(&data).unwrap();
    encoder.finish().unwrap();
    assert_eq!(encoder.blocks(), 1);
    let out = encoder.into_inner();
    assert_eq!(out[14] & 0x80, 0x80);
    assert_eq!(count_bit_pattern(&out, STREAM_TRAILER, 48), 1);
}

#[test]
fn normal_work_factor_avoids_randomisation() {
    let data = noise(2000);
    let out = compress(&data, 1);
    assert_eq!(out[14] & 0x80, 0);
}

#[test]
fn trailer_crc_matches_across_block_sizes() {
    // the input fits one block at either size, so the folded stream crc
    // is the same even though the headers differ
    let data = noise(60_000);
    let small = compress(&data, 1);
    let big = compress(&data, 9);

    let trailer_crc = |out: &[u8]| {
        let at = find_bit_pattern(out, STREAM_TRAILER, 48).unwrap();
        read_bits(out, at + 48, 32)
    };
    assert_eq!(trailer_crc(&small), trailer_crc(&big));
}

#[test]
fn long_runs_compress_tightly() {
    // half a block of one byte: RLE1 plus the zero-run coding should
    // collapse it to a tiny stream
    let out = compress(&[b'y'; 50_000], 1);
    assert!(out.len() < 200, "got {} bytes", out.len());
}

#[test]
fn io_write_adapter_matches_native_writes() {
    use std::io::Write;

    let data = b"two doors, one stream".repeat(64);
    let native = compress(&data, 1);

    let mut encoder = BzEncoder::new(Vec::new(), 1).unwrap();
    encoder.write_all(&data).unwrap();
    encoder.finish().unwrap();
    assert_eq!(native, encoder.into_inner());
}
