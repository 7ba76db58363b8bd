//! XML tokenizer state machine (spec.md §4.4).
//!
//! A trampolined state machine, not a coroutine: `next_token` dispatches on
//! `state`, and each sub-scanner either emits a token and returns, or changes
//! state and lets the caller loop. Modeled on the teacher crate's
//! `DecompressStage`-driven loop in `frame/decompress.rs`, generalized from
//! "decode one LZ4 block" to "scan one XML token."

mod content;
mod name;
mod tag;

use std::io::Read;

use crate::arena::{ErrorArena, TagStack, TextArena};
use crate::codec;
use crate::error::{ErrorCode, ErrorRecord, Severity};
use crate::limits::{Limits, Options};
use crate::position::SourcePosition;
use crate::stream::BufferedInputStream;
use crate::token::{Token, TokenType};

/// States of the tokenizer state machine (spec.md §4.4 "States"). A separate
/// `InAttr` flag from the distilled spec is folded in here: the four
/// attribute-related variants already say whether an attribute is being
/// scanned, so a redundant boolean would just be a second source of truth
/// (see `DESIGN.md`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Content,
    TagOpen,
    StartTagName,
    EndTagName,
    InTag,
    AttrName,
    AfterAttrName,
    BeforeAttrValue,
    AttrValueQuoted,
    /// Reserved for a future comment scanner; never entered in Phase-1.
    ReservedComment,
    /// Reserved for a future CDATA scanner; never entered in Phase-1.
    ReservedCData,
    /// Reserved for a future processing-instruction scanner; never entered in Phase-1.
    ReservedPi,
    /// Reserved for a future DOCTYPE scanner; never entered in Phase-1.
    ReservedDoctype,
}

/// Consumes a byte-oriented source and emits a linear sequence of XML
/// tokens. See spec.md §2, §4.4, §6.
pub struct Tokenizer<R> {
    stream: BufferedInputStream<R>,
    limits: Limits,
    options: Options,
    state: State,
    started: bool,
    ended: bool,
    tag_stack: TagStack,
    text_arena: TextArena,
    error_arena: ErrorArena,
    errors: Vec<ErrorRecord>,
    /// Captured position of the first byte of the token currently being
    /// scanned (spec.md §4.4 "Position marking"), taken when that token (or
    /// an error in its place) is emitted.
    pending_start: Option<SourcePosition>,
}

impl<R: Read> Tokenizer<R> {
    /// Builds a tokenizer over an already-constructed input stream. Stream
    /// construction (buffer-size validation, BOM handling) is a separate,
    /// fallible step — see [`BufferedInputStream::new`] — so this
    /// constructor is infallible (spec.md §6 `new(input, options, limits)`).
    pub fn new(stream: BufferedInputStream<R>, options: Options, limits: Limits) -> Self {
        let limits = limits.clamped();
        Tokenizer {
            stream,
            tag_stack: TagStack::new(limits.max_open_depth, limits.max_per_tag_bytes, crate::limits::FREELIST_BUDGET_BYTES),
            limits,
            options,
            state: State::Content,
            started: false,
            ended: false,
            text_arena: TextArena::new(),
            error_arena: ErrorArena::new(),
            errors: Vec::new(),
            pending_start: None,
        }
    }

    /// Convenience constructor: builds the input stream and the tokenizer in
    /// one call, surfacing stream construction failures as
    /// [`crate::error::TokenizerError`] (spec.md §10 "Construction failures
    /// return `Result<T, TokenizerError>`").
    pub fn from_reader(
        source: R,
        buffer_size: usize,
        options: Options,
        limits: Limits,
    ) -> Result<Self, crate::error::TokenizerError> {
        let stream = BufferedInputStream::new(source, buffer_size)?;
        Ok(Tokenizer::new(stream, options, limits))
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn current_position(&self) -> SourcePosition {
        self.stream.current_position()
    }

    pub fn nesting_depth(&self) -> usize {
        self.tag_stack.depth()
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Restores the pre-`DocumentStart` state, keeping the same input
    /// stream, options, and limits (spec.md §4.4 "Failure semantics", §6
    /// `reset()`).
    pub fn reset(&mut self) {
        self.state = State::Content;
        self.started = false;
        self.ended = false;
        self.tag_stack.clear();
        self.text_arena.clear();
        self.error_arena.clear();
        self.errors.clear();
        self.pending_start = None;
    }

    /// Emits exactly one token per call (spec.md §4.4 "Trampoline").
    /// Returns `false` after `DocumentEnd` or the first fatal `Error`, per
    /// spec.md §6.
    pub fn next_token(&mut self, out: &mut Token) -> bool {
        match self.advance() {
            Some(tok) => {
                *out = tok;
                true
            }
            None => false,
        }
    }

    fn advance(&mut self) -> Option<Token> {
        if self.ended {
            return None;
        }
        if !self.started {
            self.started = true;
            let pos = self.stream.current_position();
            return Some(Token::empty(TokenType::DocumentStart, pos.byte_offset, pos.line, pos.column));
        }
        loop {
            let outcome = match self.state {
                State::Content => content::scan_content(self),
                State::TagOpen => tag::scan_tag_open(self),
                State::StartTagName => tag::scan_start_tag_name(self),
                State::EndTagName => tag::scan_end_tag_name(self),
                State::InTag => tag::scan_in_tag(self),
                State::AttrName => tag::scan_attr_name(self),
                State::AfterAttrName => tag::scan_after_attr_name(self),
                State::BeforeAttrValue => tag::scan_before_attr_value(self),
                State::AttrValueQuoted => tag::scan_attr_value_quoted(self),
                State::ReservedComment | State::ReservedCData | State::ReservedPi | State::ReservedDoctype => {
                    unreachable!("reserved states are never entered in Phase-1")
                }
            };
            if let Some(tok) = outcome {
                return Some(tok);
            }
            if self.ended {
                return None;
            }
        }
    }

    /// Captures the current position into the pending-start slot if nothing
    /// is pending yet (spec.md §4.4 "Position marking").
    fn mark_start(&mut self) {
        if self.pending_start.is_none() {
            self.pending_start = Some(self.stream.current_position());
        }
    }

    /// Reads the pending-start slot without clearing it.
    fn peek_start(&self) -> SourcePosition {
        self.pending_start.unwrap_or_else(|| self.stream.current_position())
    }

    /// Takes and clears the pending-start slot, falling back to the current
    /// cursor if nothing was marked.
    fn take_start(&mut self) -> SourcePosition {
        self.pending_start.take().unwrap_or_else(|| self.stream.current_position())
    }

    /// Records a fatal error, sets `Ended`, and builds the single `Error`
    /// token the trampoline returns for it (spec.md §4.4 "Failure
    /// semantics", §7). Position is the pending-start slot if one was
    /// marked before the offending scan, otherwise the current cursor
    /// (spec.md §7 "Position").
    fn emit_error(&mut self, code: ErrorCode, severity: Severity, message: &str) -> Token {
        let pos = self.take_start();
        let (offset, len) = self.error_arena.intern(message);
        self.errors.push(ErrorRecord { code, severity, position: pos, message: message.into() });
        self.ended = true;
        let slice = self.error_arena.slice(offset, len);
        Token::from_slice(TokenType::Error, slice, pos.byte_offset, pos.line, pos.column)
    }

    /// Reads scalars from the stream while `pred` holds, re-encoding each
    /// into `out`, aborting early (before unbounded growth) once `out.len()`
    /// would exceed `cap`. Bounds memory use against a pathological, very
    /// long Name/attribute-value run (spec.md §5 "Resource bounds").
    fn read_bounded(&mut self, cap: usize, mut pred: impl FnMut(u32) -> bool) -> Result<Vec<u8>, ()> {
        let mut out = Vec::new();
        loop {
            let cp = self.stream.peek_cp();
            if cp < 0 || !pred(cp as u32) {
                return Ok(out);
            }
            let cp = self.stream.get_cp();
            let start = out.len();
            out.resize(start + 4, 0);
            let width = match codec::encode(cp as u32, &mut out[start..], 4) {
                codec::EncodeResult::Ok(w) => w,
                _ => unreachable!("scalar decoded from valid UTF-8 must re-encode"),
            };
            out.truncate(start + width as usize);
            if out.len() > cap {
                return Err(());
            }
        }
    }
}
