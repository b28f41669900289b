/*! Scanning primitives used by the specialized matching strategies.

Every primitive processes the input in chunks of [`CHUNK`] bytes. For each
chunk the membership test is computed for all the bytes and OR-ed together,
without branching on individual bytes, which lets the compiler vectorize the
loop. Only when a chunk contains a hit the exact position is located with a
scalar scan. The bytes that don't fill a whole chunk at the end of the input
are scanned one by one.
*/

use crate::re::hir::is_word_byte;

/// Number of bytes processed at once.
pub(crate) const CHUNK: usize = 16;

/// Lookup table for the `\w` class.
static WORD_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        table[i] = b == b'_'
            || (b >= b'0' && b <= b'9')
            || (b >= b'a' && b <= b'z')
            || (b >= b'A' && b <= b'Z');
        i += 1;
    }
    table
};

#[inline(always)]
fn is_digit(b: u8) -> bool {
    b.wrapping_sub(b'0') < 10
}

#[inline(always)]
fn is_space(b: u8) -> bool {
    // \t, \n, \v, \f and \r are contiguous.
    (b == b' ') | (b.wrapping_sub(b'\t') < 5)
}

#[inline(always)]
fn is_word(b: u8) -> bool {
    WORD_TABLE[b as usize]
}

/// Returns the position of the first byte at or after `from` that satisfies
/// `pred`.
#[inline(always)]
fn find_by<P>(text: &[u8], from: usize, pred: P) -> Option<usize>
where
    P: Fn(u8) -> bool,
{
    let haystack = text.get(from..)?;
    let mut chunks = haystack.chunks_exact(CHUNK);
    let mut offset = from;

    for chunk in &mut chunks {
        if chunk.iter().fold(false, |hit, b| hit | pred(*b)) {
            return chunk.iter().position(|b| pred(*b)).map(|i| offset + i);
        }
        offset += CHUNK;
    }

    chunks.remainder().iter().position(|b| pred(*b)).map(|i| offset + i)
}

pub(crate) fn find_whitespace(text: &[u8], from: usize) -> Option<usize> {
    find_by(text, from, is_space)
}

pub(crate) fn find_non_whitespace(text: &[u8], from: usize) -> Option<usize> {
    find_by(text, from, |b| !is_space(b))
}

pub(crate) fn find_digit(text: &[u8], from: usize) -> Option<usize> {
    find_by(text, from, is_digit)
}

pub(crate) fn find_non_digit(text: &[u8], from: usize) -> Option<usize> {
    find_by(text, from, |b| !is_digit(b))
}

pub(crate) fn find_word_byte(text: &[u8], from: usize) -> Option<usize> {
    find_by(text, from, is_word)
}

pub(crate) fn find_non_word_byte(text: &[u8], from: usize) -> Option<usize> {
    find_by(text, from, |b| !is_word(b))
}

/// Finds the first maximal run of digits that starts at or after `from`.
/// Returns the start and end offsets of the run.
pub(crate) fn find_digit_run(
    text: &[u8],
    from: usize,
) -> Option<(usize, usize)> {
    let start = find_digit(text, from)?;
    let end = find_non_digit(text, start).unwrap_or(text.len());
    Some((start, end))
}

/// Finds the first maximal run of non-whitespace bytes that starts at or
/// after `from`.
pub(crate) fn find_non_whitespace_run(
    text: &[u8],
    from: usize,
) -> Option<(usize, usize)> {
    let start = find_non_whitespace(text, from)?;
    let end = find_whitespace(text, start).unwrap_or(text.len());
    Some((start, end))
}

/// Returns true if there's a word boundary at `pos`, that is, if one of
/// the bytes surrounding `pos` is a word byte and the other one is not.
/// The start and the end of the text count as non-word bytes.
pub(crate) fn is_word_boundary(text: &[u8], pos: usize) -> bool {
    let prev = pos
        .checked_sub(1)
        .and_then(|i| text.get(i))
        .is_some_and(|b| is_word_byte(*b));
    let next = text.get(pos).is_some_and(|b| is_word_byte(*b));
    prev != next
}
