//! Search for the end of a run of bytes that can be copied to the output unchanged.
//!
//! Both classification tables agree on which bytes are `Literal` (printable ASCII except the six
//! OWASP characters, plus tab, line feed and carriage return), so one scanner serves both of the
//! escapers.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use multiversion::multiversion;

use crate::table::CP1252_TABLE;

const BLOCK_SIZE: usize = 16; // One sse2 128i load.

/// Returns index of the first byte at or after `start` that needs escaping, or `input.len()`
/// if there is none.
#[inline(always)]
fn skip_literal_fallback(input: &[u8], start: usize) -> usize {
    input[start..]
        .iter()
        .position(|&b| !CP1252_TABLE[b as usize].is_literal())
        .map_or(input.len(), |offset| start + offset)
}

/// Same as `skip_literal_fallback`, but implemented using SIMD intrinsics.
///
/// # Safety
///
/// Can be only called if SSSE3 is available.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "ssse3")]
unsafe fn skip_literal_ssse3(input: &[u8], start: usize) -> usize {
    // Classification using two `pshufb` instructions (`_mm_shuffle_epi8` intrinsic) that match
    // the high and low nibble of the byte. Combining that together we get a non-zero value for every
    // byte that needs escaping.

    //     hi / lo
    //         +--------------------------------
    //         | 0 1 2 3 4 5 6 7 8 9 a b c d e f
    //       --+--------------------------------
    //       0 | A A A A A A A A A . . A A . A A
    //       1 | B B B B B B B B B B B B B B B B
    //       2 | . . " . . . & ' . . . . . . . /
    //       3 | . . . . . . . . . . . . < . > .
    //     4-7 | . . . . . . . . . . . . . . . .
    //     8-f | H H H H H H H H H H H H H H H H

    const NOTHING: i8    = 0;
    const CONTROL_A: i8  = 1 << 0;
    const CONTROL_B: i8  = 1 << 1;
    const PUNCT_2X: i8   = 1 << 2;
    const PUNCT_3X: i8   = 1 << 3;
    const HIGH: i8       = 1 << 4;
    const ANY: i8        = CONTROL_B | HIGH;

    let lo_nibbles_lookup = _mm_setr_epi8(
        /* 0 */ ANY | CONTROL_A,
        /* 1 */ ANY | CONTROL_A,
        /* 2 */ ANY | CONTROL_A | PUNCT_2X,
        /* 3 */ ANY | CONTROL_A,
        /* 4 */ ANY | CONTROL_A,
        /* 5 */ ANY | CONTROL_A,
        /* 6 */ ANY | CONTROL_A | PUNCT_2X,
        /* 7 */ ANY | CONTROL_A | PUNCT_2X,
        /* 8 */ ANY | CONTROL_A,
        /* 9 */ ANY,
        /* a */ ANY,
        /* b */ ANY | CONTROL_A,
        /* c */ ANY | CONTROL_A | PUNCT_3X,
        /* d */ ANY,
        /* e */ ANY | CONTROL_A | PUNCT_3X,
        /* f */ ANY | CONTROL_A | PUNCT_2X,
    );

    let hi_nibbles_lookup = _mm_setr_epi8(
        /* 0 */ CONTROL_A,
        /* 1 */ CONTROL_B,
        /* 2 */ PUNCT_2X,
        /* 3 */ PUNCT_3X,
        /* 4 */ NOTHING,
        /* 5 */ NOTHING,
        /* 6 */ NOTHING,
        /* 7 */ NOTHING,
        /* 8 */ HIGH,
        /* 9 */ HIGH,
        /* a */ HIGH,
        /* b */ HIGH,
        /* c */ HIGH,
        /* d */ HIGH,
        /* e */ HIGH,
        /* f */ HIGH,
    );

    let mut i = start;
    while i + BLOCK_SIZE <= input.len() {
        let chunk = _mm_loadu_si128(input.as_ptr().add(i) as *const __m128i);
        let lo_nibbles = _mm_and_si128(chunk, _mm_set1_epi8(0x0f));
        let hi_nibbles = _mm_and_si128(_mm_srli_epi16(chunk, 4), _mm_set1_epi8(0x0f));
        let lo_translated = _mm_shuffle_epi8(lo_nibbles_lookup, lo_nibbles);
        let hi_translated = _mm_shuffle_epi8(hi_nibbles_lookup, hi_nibbles);
        let intersection = _mm_and_si128(lo_translated, hi_translated);
        let eq = _mm_cmpeq_epi8(intersection, _mm_setzero_si128());
        let mask = !(_mm_movemask_epi8(eq) as u32) & 0xffff;

        if mask != 0 {
            return i + mask.trailing_zeros() as usize;
        }

        i += BLOCK_SIZE;
    }

    // Less than one block left.
    skip_literal_fallback(input, i)
}

/// Returns index of the first byte at or after `start` that is not `Literal` in the
/// classification tables, or `input.len()` if the rest of the input can be copied as is.
#[multiversion]
#[specialize(target = "x86_64+ssse3", fn = "skip_literal_ssse3", unsafe = true)]
pub(crate) fn skip_literal(input: &[u8], start: usize) -> usize {
    skip_literal_fallback(input, start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_all_skip_literal(input: &[u8], start: usize) -> usize {
        let expected = skip_literal_fallback(input, start);

        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("ssse3") {
                assert_eq!(unsafe { skip_literal_ssse3(input, start) }, expected);
            }
        }

        assert_eq!(skip_literal(input, start), expected);

        expected
    }

    #[test]
    fn test_skip_literal() {
        let input = b"plain text, nothing to see here but <this> and \"that\"";
        assert_eq!(run_all_skip_literal(input, 0), 36);
        assert_eq!(run_all_skip_literal(input, 37), 41);
        assert_eq!(run_all_skip_literal(input, 42), 47);
        assert_eq!(run_all_skip_literal(input, 48), 52);
        assert_eq!(run_all_skip_literal(input, 53), 53);
        assert_eq!(run_all_skip_literal(input, input.len()), input.len());
    }

    #[test]
    fn test_skip_literal_every_byte() {
        let mut input = Vec::new();

        for c in 0..=255u8 {
            input.clear();
            input.extend(std::iter::repeat(c).take(BLOCK_SIZE * 4));

            let expected = if CP1252_TABLE[c as usize].is_literal() { input.len() } else { 0 };
            assert_eq!(run_all_skip_literal(&input, 0), expected, "byte {:#04x}", c);

            let literal = matches!(c, b'\t' | b'\n' | b'\r')
                || ((0x20..=0x7f).contains(&c) && !b"\"&'/<>".contains(&c));
            assert_eq!(CP1252_TABLE[c as usize].is_literal(), literal, "byte {:#04x}", c);
        }
    }

    #[test]
    fn test_skip_literal_every_position() {
        // The escaped byte lands at every offset of a block and in the unaligned tail.
        for len in 1..BLOCK_SIZE * 3 {
            for position in 0..len {
                let mut input = vec![b'a'; len];
                input[position] = 0xc3;

                for start in 0..=position {
                    assert_eq!(run_all_skip_literal(&input, start), position);
                }
                assert_eq!(run_all_skip_literal(&input, position + 1), len);
            }
        }
    }
}
