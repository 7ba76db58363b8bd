//! Buffered input stream.
//!
//! Owns a single contiguous byte window over the source, compacting unread
//! bytes to the front on refill so any multi-byte scalar is always
//! contiguous, and tracking byte/line/column position as scalars are
//! consumed.

use std::io;

use crate::codec::{self, DecodeResult};
use crate::position::SourcePosition;

/// Construction-time failures specific to stream setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    /// `buffer_size == 0`.
    ZeroBufferSize,
    /// `buffer_size < 4`; four bytes are required so any single scalar fits
    /// contiguously.
    BufferTooSmall,
    /// `buffer_size` exceeds [`ABS_MAX_BUFFER_SIZE`], or allocation failed.
    OutOfMemory,
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            StreamError::ZeroBufferSize => "buffer size must not be zero",
            StreamError::BufferTooSmall => "buffer size must be at least 4 bytes",
            StreamError::OutOfMemory => "failed to allocate input buffer",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for StreamError {}

/// Implementation-chosen hard cap on requested buffer size.
pub const ABS_MAX_BUFFER_SIZE: usize = 1 << 30; // 1 GiB

const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Single-slot cache for the result of the most recent `peek_cp()`.
#[derive(Debug, Clone, Copy)]
struct PeekCache {
    cp: u32,
    width: u8,
}

/// A UTF-8 scalar stream with lookahead, built over a fixed-capacity byte
/// window and a blocking byte source.
pub struct BufferedInputStream<R> {
    source: R,
    buf: Vec<u8>,
    /// Index of the first unread byte in `buf`.
    pos: usize,
    /// Index one past the last valid byte in `buf`.
    end: usize,
    has_pending_cr: bool,
    peek: Option<PeekCache>,
    position: SourcePosition,
    total_bytes_read: u64,
    source_exhausted: bool,
    io_error: Option<io::Error>,
}

impl<R: io::Read> BufferedInputStream<R> {
    /// Construct a stream over `source` with the given buffer size, skipping
    /// a leading UTF-8 BOM if present.
    pub fn new(source: R, buffer_size: usize) -> Result<Self, StreamError> {
        if buffer_size == 0 {
            return Err(StreamError::ZeroBufferSize);
        }
        if buffer_size < 4 {
            return Err(StreamError::BufferTooSmall);
        }
        if buffer_size > ABS_MAX_BUFFER_SIZE {
            return Err(StreamError::OutOfMemory);
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(buffer_size).map_err(|_| StreamError::OutOfMemory)?;
        buf.resize(buffer_size, 0);

        let mut stream = BufferedInputStream {
            source,
            buf,
            pos: 0,
            end: 0,
            has_pending_cr: false,
            peek: None,
            position: SourcePosition::START,
            total_bytes_read: 0,
            source_exhausted: false,
            io_error: None,
        };
        stream.refill();
        stream.skip_bom();
        Ok(stream)
    }

    /// Current source position (not counting any cached peek).
    pub fn current_position(&self) -> SourcePosition {
        self.position
    }

    /// Total bytes read from the underlying source, excluding a consumed BOM.
    pub fn total_bytes_read(&self) -> u64 {
        self.total_bytes_read
    }

    /// Takes and clears the most recent I/O error observed from the
    /// underlying source, if any. The tokenizer checks this whenever a read
    /// method reports end-of-input, to distinguish a genuine EOF from an I/O
    /// failure that this layer otherwise treats as EOF, with the error
    /// preserved here for the caller that needs to distinguish them.
    pub fn take_io_error(&mut self) -> Option<io::Error> {
        self.io_error.take()
    }

    fn available(&self) -> usize {
        self.end - self.pos
    }

    fn skip_bom(&mut self) {
        if self.available() >= BOM.len() && self.buf[self.pos..self.pos + BOM.len()] == BOM {
            self.pos += BOM.len();
            self.total_bytes_read -= BOM.len() as u64;
        }
    }

    /// Moves any unread bytes to the front of the buffer, then reads as much
    /// as the source will give until either `n` bytes are available or the
    /// source is exhausted.
    fn ensure_at_least(&mut self, n: usize) {
        if self.available() >= n || self.source_exhausted {
            return;
        }
        if self.pos > 0 {
            self.buf.copy_within(self.pos..self.end, 0);
            self.end -= self.pos;
            self.pos = 0;
            self.peek = None;
        }
        while self.available() < n && !self.source_exhausted {
            if self.end == self.buf.len() {
                break;
            }
            match self.source.read(&mut self.buf[self.end..]) {
                Ok(0) => self.source_exhausted = true,
                Ok(n) => {
                    self.end += n;
                    self.total_bytes_read += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.io_error = Some(e);
                    self.source_exhausted = true;
                }
            }
        }
    }

    fn refill(&mut self) {
        self.ensure_at_least(self.buf.len());
    }

    /// Decode the scalar at the front of the unread window, refilling first
    /// if fewer than 4 bytes are available and the source has more to give.
    fn decode_front(&mut self) -> Option<(u32, u8)> {
        if self.available() < 4 && !self.source_exhausted {
            self.refill();
        }
        loop {
            match codec::decode(&self.buf[self.pos..self.end], self.available()) {
                DecodeResult::Ok(cp, width) => return Some((cp, width)),
                DecodeResult::NeedMore(_) if !self.source_exhausted => {
                    self.refill();
                    if self.available() == 0 && self.source_exhausted {
                        return None;
                    }
                    continue;
                }
                DecodeResult::NeedMore(_) | DecodeResult::Invalid => return None,
            }
        }
    }

    /// Returns the next scalar without consuming it, or `-1` at end-of-input.
    /// Idempotent: repeated calls with no intervening `get_cp` return the
    /// same value and do not advance position.
    pub fn peek_cp(&mut self) -> i32 {
        if let Some(cache) = self.peek {
            return cache.cp as i32;
        }
        match self.decode_front() {
            Some((cp, width)) => {
                self.peek = Some(PeekCache { cp, width });
                cp as i32
            }
            None => -1,
        }
    }

    /// Returns the next scalar and advances position by its encoded width,
    /// or `-1` at end-of-input.
    pub fn get_cp(&mut self) -> i32 {
        let (cp, width) = match self.peek.take() {
            Some(cache) => (cache.cp, cache.width),
            None => match self.decode_front() {
                Some(pair) => pair,
                None => return -1,
            },
        };
        self.advance(width, cp);
        cp as i32
    }

    /// Advance past `width` bytes already known to encode `cp`, updating
    /// byte/line/column position as each byte is consumed.
    fn advance(&mut self, width: u8, cp: u32) {
        for i in 0..width as usize {
            let b = self.buf[self.pos + i];
            self.track_byte(b);
        }
        self.pos += width as usize;
        self.position.byte_offset += width as u64;
        let _ = cp;
    }

    fn track_byte(&mut self, b: u8) {
        if b == b'\r' {
            self.position.line += 1;
            self.position.column = 1;
            self.has_pending_cr = true;
            return;
        }
        if b == b'\n' {
            if self.has_pending_cr {
                self.has_pending_cr = false;
            } else {
                self.position.line += 1;
                self.position.column = 1;
            }
            return;
        }
        self.has_pending_cr = false;
        if (b & 0xC0) != 0x80 {
            self.position.column += 1;
        }
    }

    /// Appends raw UTF-8 bytes of each accepted scalar to `out` until either
    /// end-of-input, an invalid sequence, or `pred(cp)` returns `false`.
    pub fn read_while(&mut self, out: &mut Vec<u8>, mut pred: impl FnMut(u32) -> bool) {
        loop {
            let cp = self.peek_cp();
            if cp < 0 || !pred(cp as u32) {
                return;
            }
            let start = out.len();
            out.resize(start + 4, 0);
            let width = match codec::encode(cp as u32, &mut out[start..], 4) {
                crate::codec::EncodeResult::Ok(w) => w,
                _ => unreachable!("scalar decoded from valid UTF-8 must re-encode"),
            };
            out.truncate(start + width as usize);
            self.get_cp();
        }
    }

    /// Shorthand for `read_while(out, |cp| cp != delim as u32)`; the
    /// delimiter is left unconsumed.
    pub fn read_until(&mut self, out: &mut Vec<u8>, ascii_delim: u8) {
        self.read_while(out, |cp| cp != ascii_delim as u32);
    }

    /// Consumes while `peek_cp()` is SPACE, TAB, LF, or CR.
    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek_cp(), 0x20 | 0x09 | 0x0A | 0x0D) {
            self.get_cp();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stream(bytes: &[u8], buffer_size: usize) -> BufferedInputStream<Cursor<Vec<u8>>> {
        BufferedInputStream::new(Cursor::new(bytes.to_vec()), buffer_size).unwrap()
    }

    #[test]
    fn rejects_bad_buffer_sizes() {
        assert_eq!(
            BufferedInputStream::new(Cursor::new(vec![]), 0).unwrap_err(),
            StreamError::ZeroBufferSize
        );
        assert_eq!(
            BufferedInputStream::new(Cursor::new(vec![]), 3).unwrap_err(),
            StreamError::BufferTooSmall
        );
        assert_eq!(
            BufferedInputStream::new(Cursor::new(vec![]), ABS_MAX_BUFFER_SIZE + 1).unwrap_err(),
            StreamError::OutOfMemory
        );
    }

    #[test]
    fn peek_is_idempotent() {
        let mut s = stream(b"ab", 8);
        assert_eq!(s.peek_cp(), 'a' as i32);
        assert_eq!(s.peek_cp(), 'a' as i32);
        assert_eq!(s.current_position(), SourcePosition::START);
        assert_eq!(s.get_cp(), 'a' as i32);
        assert_eq!(s.peek_cp(), 'b' as i32);
    }

    #[test]
    fn empty_input_is_eof() {
        let mut s = stream(b"", 8);
        assert_eq!(s.peek_cp(), -1);
        assert_eq!(s.get_cp(), -1);
    }

    #[test]
    fn skips_leading_bom_without_counting_it() {
        let mut s = stream(&[0xEF, 0xBB, 0xBF, b'x'], 8);
        assert_eq!(s.get_cp(), 'x' as i32);
        assert_eq!(s.total_bytes_read(), 1);
    }

    #[test]
    fn crlf_counts_as_one_newline() {
        let mut s = stream(b"a\r\nb", 64);
        assert_eq!(s.get_cp(), 'a' as i32);
        assert_eq!(s.get_cp(), '\r' as i32);
        assert_eq!(s.current_position().line, 2);
        assert_eq!(s.current_position().column, 1);
        assert_eq!(s.get_cp(), '\n' as i32);
        assert_eq!(s.current_position().line, 2);
        assert_eq!(s.current_position().column, 1);
        assert_eq!(s.get_cp(), 'b' as i32);
        assert_eq!(s.current_position().column, 2);
    }

    #[test]
    fn column_counts_scalars_not_bytes() {
        // "世" is U+4E16, a 3-byte scalar.
        let mut s = stream("世x".as_bytes(), 64);
        assert_eq!(s.get_cp(), 0x4E16);
        assert_eq!(s.current_position().column, 2);
        assert_eq!(s.get_cp(), 'x' as i32);
        assert_eq!(s.current_position().column, 3);
    }

    #[test]
    fn minimal_four_byte_buffer_decodes_scalar_straddling_refill() {
        // Four-byte buffer (the minimum) with a 4-byte scalar (an emoji) followed
        // by more data forces at least one compaction/refill mid-scalar.
        let text = "\u{1F600}rest".as_bytes();
        let mut s = stream(text, 4);
        assert_eq!(s.get_cp(), 0x1F600);
        let mut out = Vec::new();
        s.read_while(&mut out, |_| true);
        assert_eq!(out, b"rest");
    }

    #[test]
    fn read_while_stops_at_predicate_and_leaves_delimiter() {
        let mut s = stream(b"abc<def", 8);
        let mut out = Vec::new();
        s.read_while(&mut out, |cp| cp != '<' as u32);
        assert_eq!(out, b"abc");
        assert_eq!(s.peek_cp(), '<' as i32);
    }

    #[test]
    fn read_until_is_read_while_with_ascii_delim() {
        let mut s = stream(b"name=value", 8);
        let mut out = Vec::new();
        s.read_until(&mut out, b'=');
        assert_eq!(out, b"name");
        assert_eq!(s.peek_cp(), '=' as i32);
    }

    #[test]
    fn skip_whitespace_consumes_space_tab_lf_cr() {
        let mut s = stream(b" \t\r\nx", 64);
        s.skip_whitespace();
        assert_eq!(s.peek_cp(), 'x' as i32);
    }

    #[test]
    fn invalid_utf8_mid_stream_is_treated_as_eof_at_this_layer() {
        let mut s = stream(&[b'a', 0xFF, b'b'], 64);
        assert_eq!(s.get_cp(), 'a' as i32);
        assert_eq!(s.get_cp(), -1);
    }

    #[test]
    fn buffer_compaction_never_loses_unread_bytes() {
        // Drive refills with a buffer barely larger than one scalar, across a
        // long run of ASCII text, and confirm every byte is still read in order.
        let text: Vec<u8> = (0..500).map(|i| b'a' + (i % 26) as u8).collect();
        let mut s = stream(&text, 5);
        let mut out = Vec::new();
        s.read_while(&mut out, |_| true);
        assert_eq!(out, text);
    }
}
