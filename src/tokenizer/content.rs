//! Text scanning and the generic end-of-input handling reached from
//! `Content` (spec.md §4.4 "Text scanning", "Trampoline" steps 4-5).

use std::io::Read;

use crate::codec;
use crate::error::{ErrorCode, Severity};
use crate::limits::NORMALIZE_LINE_ENDINGS;
use crate::token::{Token, TokenType};

use super::{State, Tokenizer};

pub(super) fn scan_content<R: Read>(tok: &mut Tokenizer<R>) -> Option<Token> {
    let peek = tok.stream.peek_cp();
    if peek == '<' as i32 {
        tok.mark_start();
        tok.state = State::TagOpen;
        return None;
    }
    if peek == -1 {
        return Some(handle_end_of_input(tok));
    }

    tok.mark_start();
    tok.text_arena.clear();
    loop {
        let peek = tok.stream.peek_cp();
        if peek == '<' as i32 || peek == -1 {
            break;
        }
        let cp = tok.stream.get_cp();
        if tok.options.contains(NORMALIZE_LINE_ENDINGS) && (cp == '\r' as i32 || cp == '\n' as i32) {
            if cp == '\r' as i32 && tok.stream.peek_cp() == '\n' as i32 {
                tok.stream.get_cp();
            }
            tok.text_arena.append(b"\n");
        } else {
            append_scalar(tok, cp as u32);
        }
        if tok.text_arena.len() >= tok.limits.max_text_run_bytes {
            return Some(tok.emit_error(ErrorCode::LimitExceeded, Severity::Fatal, "text run exceeds limit"));
        }
    }

    let start_pos = tok.take_start();
    Some(Token::from_slice(
        TokenType::Text,
        tok.text_arena.as_slice(),
        start_pos.byte_offset,
        start_pos.line,
        start_pos.column,
    ))
}

/// Trampoline steps 4-5: only reachable while in `Content`, since every
/// other state has its own end-of-input diagnostic.
fn handle_end_of_input<R: Read>(tok: &mut Tokenizer<R>) -> Token {
    if let Some(err) = tok.stream.take_io_error() {
        return tok.emit_error(ErrorCode::IoError, Severity::Fatal, &format!("I/O error reading source: {err}"));
    }
    if tok.tag_stack.is_empty() {
        let pos = tok.stream.current_position();
        tok.ended = true;
        Token::empty(TokenType::DocumentEnd, pos.byte_offset, pos.line, pos.column)
    } else {
        tok.emit_error(ErrorCode::UnexpectedEof, Severity::Fatal, "Unclosed tag at end of document")
    }
}

fn append_scalar<R: Read>(tok: &mut Tokenizer<R>, cp: u32) {
    let mut buf = [0u8; 4];
    let width = match codec::encode(cp, &mut buf, 4) {
        codec::EncodeResult::Ok(w) => w,
        _ => unreachable!("scalar decoded from valid UTF-8 must re-encode"),
    };
    tok.text_arena.append(&buf[..width as usize]);
}
