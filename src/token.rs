//! Token type: a fixed-layout record describing one lexical unit.

/// Token discriminant. `DocumentStart` and `DocumentEnd` carry their
/// documented numeric values (`0` and `11`); the remaining kinds fill the
/// gap in declaration order, with `Error` following `DocumentEnd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TokenType {
    DocumentStart = 0,
    StartTag = 1,
    EndTag = 2,
    EmptyTag = 3,
    AttributeName = 4,
    AttributeValue = 5,
    Text = 6,
    Comment = 7,
    Pi = 8,
    CData = 9,
    Doctype = 10,
    DocumentEnd = 11,
    Error = 12,
}

/// A fixed-layout, 32-byte token record.
///
/// `data` is a borrowed pointer into one of the tokenizer's arenas
/// (`TagBuffer`, `TextArena`, or `ErrorArena`), valid only until the next
/// `next_token`/`reset` call. Application code should read a token's bytes
/// via [`Token::as_slice`] rather than dereferencing `data` directly —
/// constructing this struct and reading `data` raw is confined to this
/// crate's `arena`/`tokenizer` modules.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub data: *const u8,
    pub byte_offset: u64,
    pub length: u32,
    pub line: u32,
    pub column: u32,
    pub kind: TokenType,
    _padding: [u8; 3],
}

impl Token {
    /// A token carrying no data, at the given position — used for
    /// `DocumentStart`/`DocumentEnd` and for constructing placeholders
    /// before a sub-scanner fills in the real fields.
    pub fn empty(kind: TokenType, byte_offset: u64, line: u32, column: u32) -> Self {
        Token {
            data: std::ptr::null(),
            byte_offset,
            length: 0,
            line,
            column,
            kind,
            _padding: [0; 3],
        }
    }

    /// Construct a token whose bytes are `slice`, which must outlive every
    /// use of the returned token per the pointer-stability contract in
    /// spec.md §3.
    pub fn from_slice(kind: TokenType, slice: &[u8], byte_offset: u64, line: u32, column: u32) -> Self {
        Token {
            data: if slice.is_empty() { std::ptr::null() } else { slice.as_ptr() },
            byte_offset,
            length: slice.len() as u32,
            line,
            column,
            kind,
            _padding: [0; 3],
        }
    }

    /// Reconstructs the borrowed byte slice this token points at.
    ///
    /// # Safety contract
    /// The caller is responsible for only calling this while the token is
    /// still within its documented validity window (spec.md §3 invariants
    /// 5–7). This crate never violates that window before handing a token
    /// back to the caller, but it cannot enforce the window after that point
    /// without borrow-checker support it deliberately forgoes for ABI
    /// compatibility (see `SPEC_FULL.md` §12).
    pub fn as_slice(&self) -> &[u8] {
        if self.data.is_null() || self.length == 0 {
            &[]
        } else {
            // SAFETY: `data`/`length` were derived together from a live arena
            // slice at construction time, and this crate's invariants (see
            // module docs) keep that slice valid for the window documented
            // in spec.md §3.
            unsafe { std::slice::from_raw_parts(self.data, self.length as usize) }
        }
    }
}
