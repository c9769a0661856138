//! The bzip2 symbol presence maps.
//!
//! There are 256 possible byte values, seen as 16 ranges of 16. A leading
//! 16-bit word has one bit per range that contains at least one used value;
//! it is followed by one 16-bit word per used range marking the individual
//! values. Ranges with no symbols are skipped entirely.

const BIT_MASK: u16 = 0x8000;

/// Build the presence maps from the in-use table. Returns the index word
/// followed by one word per non-empty 16-value range.
pub fn encode_sym_map(in_use: &[bool; 256]) -> Vec<u16> {
    let mut maps: Vec<u16> = vec![0; 17];

    in_use.iter().enumerate().for_each(|(idx, &used)| {
        if used {
            // idx/16 selects the range, the low four bits the value in it
            maps[0] |= BIT_MASK >> (idx >> 4);
            maps[1 + (idx >> 4)] |= BIT_MASK >> (idx & 15);
        }
    });

    maps.retain(|&map| map > 0);
    maps
}

/// Recover the sorted list of used byte values from the maps. The inverse
/// of `encode_sym_map`; kept for tests and diagnostics.
#[cfg(test)]
pub fn decode_sym_map(symbol_map: &[u16]) -> Vec<u8> {
    let mut symbols: Vec<u8> = Vec::with_capacity(256);
    let mut map_idx = 0;

    for range in 0..16_u8 {
        if (symbol_map[0] & (BIT_MASK >> range)) > 0 {
            map_idx += 1;
            for byte_idx in 0..16_u8 {
                if (symbol_map[map_idx] & (BIT_MASK >> byte_idx)) > 0 {
                    symbols.push((range << 4) + byte_idx);
                }
            }
        }
    }
    symbols
}

#[cfg(test)]
mod test {
    use super::*;

    fn in_use_of(data: &[u8]) -> [bool; 256] {
        let mut in_use = [false; 256];
        for &b in data {
            in_use[b as usize] = true;
        }
        in_use
    }

    #[test]
    fn encode_symbol_map_test() {
        let maps = encode_sym_map(&in_use_of(b"Making a silly test."));
        assert_eq!(maps, vec![11008, 32770, 4, 17754, 6208]);
    }

    #[test]
    fn round_trip_symbol_map() {
        let data = b"Now is the time for all good men to come to the aid...";
        let mut expect = data.to_vec();
        expect.sort_unstable();
        expect.dedup();
        assert_eq!(decode_sym_map(&encode_sym_map(&in_use_of(data))), expect);
    }

    #[test]
    fn full_symbol_map() {
        let maps = encode_sym_map(&[true; 256]);
        assert_eq!(maps, vec![0xffff; 17]);
        assert_eq!(decode_sym_map(&maps), (0..=255).collect::<Vec<u8>>());
    }

    #[test]
    fn single_symbol_map() {
        // only byte 0x41 present: range 4 in the index, bit 1 in its word
        let mut in_use = [false; 256];
        in_use[0x41] = true;
        assert_eq!(encode_sym_map(&in_use), vec![0x0800, 0x4000]);
    }
}
