//! UTF-8 codec — table-driven decode/encode of Unicode scalars.
//!
//! A stateless pair of functions driven by a 256-entry first-byte dispatch
//! table. No partial state is carried between calls; callers (the buffered
//! input stream) own all state about what bytes are available.

/// Result of attempting to decode one scalar from a byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeResult {
    /// The prefix is the minimal UTF-8 encoding of `cp`; `width` bytes were consumed.
    Ok(u32, u8),
    /// The first byte is a legal starter but `avail` bytes were not enough to
    /// complete the sequence. `width` is the length implied by the first byte.
    NeedMore(u8),
    /// The input can never be completed into a valid scalar; resync by
    /// skipping exactly one byte.
    Invalid,
}

/// Result of attempting to encode one scalar into a byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeResult {
    /// `width` bytes were written to `out`.
    Ok(u8),
    /// `out` does not have `width` bytes of room.
    NeedMore(u8),
    /// `cp` is not encodable (surrogate or above U+10FFFF).
    Invalid,
}

/// One row of the first-byte dispatch table.
#[derive(Debug, Clone, Copy)]
struct Starter {
    /// Total encoded width implied by this leading byte, or 0 if the byte can
    /// never start a valid sequence.
    width: u8,
    /// Bits of the leading byte that contribute to the scalar value.
    first_byte_mask: u8,
    /// Minimum scalar value a sequence of this width may legally encode
    /// (rejects overlong encodings).
    min_cp: u32,
}

const INVALID_STARTER: Starter = Starter { width: 0, first_byte_mask: 0, min_cp: 0 };

/// 256-entry dispatch table keyed on the leading byte of a UTF-8 sequence.
///
/// Built once at compile time. `0x00..=0x7F` are 1-byte ASCII starters,
/// `0x80..=0xBF` are continuation bytes (never a valid starter),
/// `0xC0..=0xC1` are overlong 2-byte starters (rejected),
/// `0xC2..=0xDF` are valid 2-byte starters, `0xE0..=0xEF` are 3-byte starters,
/// `0xF0..=0xF4` are valid 4-byte starters, `0xF5..=0xFF` exceed the Unicode range.
const fn build_table() -> [Starter; 256] {
    let mut table = [INVALID_STARTER; 256];
    let mut b: usize = 0;
    while b < 256 {
        table[b] = match b as u8 {
            0x00..=0x7F => Starter { width: 1, first_byte_mask: 0x7F, min_cp: 0 },
            0x80..=0xBF => INVALID_STARTER,
            0xC0..=0xC1 => INVALID_STARTER,
            0xC2..=0xDF => Starter { width: 2, first_byte_mask: 0x1F, min_cp: 0x80 },
            0xE0..=0xEF => Starter { width: 3, first_byte_mask: 0x0F, min_cp: 0x800 },
            0xF0..=0xF4 => Starter { width: 4, first_byte_mask: 0x07, min_cp: 0x1_0000 },
            0xF5..=0xFF => INVALID_STARTER,
        };
        b += 1;
    }
    table
}

const DISPATCH: [Starter; 256] = build_table();

#[inline]
fn is_continuation(b: u8) -> bool {
    (b & 0xC0) == 0x80
}

#[inline]
fn is_surrogate(cp: u32) -> bool {
    (0xD800..=0xDFFF).contains(&cp)
}

/// Decode one scalar from the start of `bytes`, using only the first `avail`
/// bytes of it (`avail` may be less than `bytes.len()` when the caller wants
/// to simulate a short buffer near end-of-input).
///
/// `Invalid` always reports `width == 1` so scanners can resynchronize by
/// skipping one byte.
pub fn decode(bytes: &[u8], avail: usize) -> DecodeResult {
    if avail == 0 {
        return DecodeResult::NeedMore(1);
    }
    let first = bytes[0];
    let starter = DISPATCH[first as usize];
    if starter.width == 0 {
        return DecodeResult::Invalid;
    }
    let width = starter.width as usize;
    if avail < width {
        return DecodeResult::NeedMore(starter.width);
    }

    let mut cp = (first & starter.first_byte_mask) as u32;
    for i in 1..width {
        let b = bytes[i];
        if !is_continuation(b) {
            return DecodeResult::Invalid;
        }
        cp = (cp << 6) | (b & 0x3F) as u32;
    }

    if cp < starter.min_cp {
        return DecodeResult::Invalid;
    }
    if is_surrogate(cp) {
        return DecodeResult::Invalid;
    }
    if cp > 0x10_FFFF {
        return DecodeResult::Invalid;
    }

    DecodeResult::Ok(cp, starter.width)
}

/// Minimal encoded width of `cp`, or 0 if `cp` is not encodable.
fn encoded_width(cp: u32) -> u8 {
    match cp {
        0x0000..=0x007F => 1,
        0x0080..=0x07FF => 2,
        0x0800..=0xFFFF if !is_surrogate(cp) => 3,
        0x1_0000..=0x10_FFFF => 4,
        _ => 0,
    }
}

/// Encode `cp` as minimal UTF-8 into `out`, using only the first `avail`
/// bytes of capacity.
pub fn encode(cp: u32, out: &mut [u8], avail: usize) -> EncodeResult {
    let width = encoded_width(cp);
    if width == 0 {
        return EncodeResult::Invalid;
    }
    if avail < width as usize {
        return EncodeResult::NeedMore(width);
    }
    match width {
        1 => out[0] = cp as u8,
        2 => {
            out[0] = 0xC0 | ((cp >> 6) & 0x1F) as u8;
            out[1] = 0x80 | (cp & 0x3F) as u8;
        }
        3 => {
            out[0] = 0xE0 | ((cp >> 12) & 0x0F) as u8;
            out[1] = 0x80 | ((cp >> 6) & 0x3F) as u8;
            out[2] = 0x80 | (cp & 0x3F) as u8;
        }
        4 => {
            out[0] = 0xF0 | ((cp >> 18) & 0x07) as u8;
            out[1] = 0x80 | ((cp >> 12) & 0x3F) as u8;
            out[2] = 0x80 | ((cp >> 6) & 0x3F) as u8;
            out[3] = 0x80 | (cp & 0x3F) as u8;
        }
        _ => unreachable!(),
    }
    EncodeResult::Ok(width)
}
