//! Source position tracking.

/// A position in the source byte stream: absolute byte offset plus 1-based
/// line/column, where column counts Unicode scalars, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePosition {
    pub byte_offset: u64,
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    /// The position at the very start of a stream, before any byte is consumed.
    pub const START: SourcePosition = SourcePosition { byte_offset: 0, line: 1, column: 1 };
}
