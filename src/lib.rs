//! Streaming, arena-based XML tokenizer for documents that may exceed
//! available RAM.
//!
//! Four layers, innermost first: a table-driven UTF-8 codec ([`codec`]), a
//! buffered input stream with lookahead and position tracking
//! ([`BufferedInputStream`]), a three-arena token memory model ([`arena`]),
//! and the tokenizer state machine itself ([`Tokenizer`]). See each module's
//! docs for the contract it implements.

pub mod arena;
pub mod codec;
pub mod error;
pub mod limits;
pub mod position;
pub mod source;
pub mod stream;
pub mod token;
pub mod tokenizer;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the most common API entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// The tokenizer itself, and its internal state-machine discriminant.
pub use tokenizer::{State, Tokenizer};

/// A fixed-layout, 32-byte token record.
pub use token::{Token, TokenType};

/// Current byte/line/column provenance of a stream or tokenizer.
pub use position::SourcePosition;

/// Blocking byte-oriented input; any `std::io::Read` implementor qualifies.
pub use source::ByteSource;

/// The buffered UTF-8 scalar stream `Tokenizer` is built over.
pub use stream::{BufferedInputStream, StreamError};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration: soft limits and behavior flags.
// ─────────────────────────────────────────────────────────────────────────────

pub use limits::{Limits, Options};
pub use limits::{
    COALESCE_TEXT, EXPAND_INTERNAL_ENTITIES, NORMALIZE_LINE_ENDINGS, REPORT_INTERTAG_WHITESPACE, REPORT_XML_DECL, STRICT,
};

// ─────────────────────────────────────────────────────────────────────────────
// Errors.
// ─────────────────────────────────────────────────────────────────────────────

pub use error::{ErrorCode, ErrorRecord, Severity, TokenizerError};
