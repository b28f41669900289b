/*! Quality scores for literals extracted from regular expressions.

When a pattern contains more than one literal, the optimizer picks the one
that is less likely to appear in arbitrary data, because it will be used
for locating candidate matches with `memchr::memmem`. Each byte contributes
to the quality of the literal according to how common it is in typical
inputs, and literals with many distinct bytes are preferred over literals
with repeated bytes.
*/

use bitvec::array::BitArray;

/// Quality of a single byte.
#[inline]
fn byte_quality(byte: u8) -> i32 {
    match byte {
        // Common values contribute less to the quality than the rest of
        // values.
        0x20 | 0x90 | 0xcc | 0xff => 12,
        // Zeroes are specially bad.
        0x00 => 6,
        // Letters are very frequent in text, and they are slightly worse
        // than punctuation and digits.
        b'a'..=b'z' | b'A'..=b'Z' => 18,
        _ => 20,
    }
}

/// Computes the quality of a literal. Higher is better. Empty literals
/// have the lowest possible quality.
pub(crate) fn literal_quality(literal: &[u8]) -> i32 {
    let Some(first) = literal.first() else {
        return i32::MIN;
    };

    let mut bytes_present: BitArray<[u64; 4]> = Default::default();
    let mut unique_bytes = 0;
    let mut q = 0;

    for byte in literal {
        q += byte_quality(*byte);
        if !bytes_present[*byte as usize] {
            bytes_present.set(*byte as usize, true);
            unique_bytes += 1;
        }
    }

    // If all the bytes in the literal are equal and very common, penalize
    // it heavily.
    if unique_bytes == 1 {
        match *first {
            0x00 | 0x20 | 0x90 | 0xcc | 0xff => q -= 5,
            _ => q += 2,
        }
    } else {
        q += 2 * unique_bytes;
    }

    q
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::literal_quality;

    #[test]
    fn quality() {
        assert_eq!(literal_quality(b""), i32::MIN);
        assert_eq!(literal_quality(b"@"), 22);
        assert_eq!(literal_quality(b"a"), 20);
        assert_eq!(literal_quality(b" "), 7);
        assert_eq!(literal_quality(b"http"), 4 * 18 + 2 * 3);
        assert_eq!(literal_quality(b"://"), 3 * 20 + 2 * 2);

        assert!(literal_quality(b"http") > literal_quality(b"://"));
        assert!(literal_quality(b"abcd") > literal_quality(b"aaaa"));
        assert!(literal_quality(b"-") > literal_quality(b"e"));
    }
}
