//! Tag dispatch, start/end tags, the in-tag body, and attributes (spec.md
//! §4.4 "Tag dispatch (TagOpen)" through "End tag").

use std::io::Read;

use crate::error::{ErrorCode, Severity};
use crate::token::{Token, TokenType};

use super::{name, State, Tokenizer};

/// Reads a Name (spec.md §4.4 "Start tag" production) into the current
/// frame's `TagBuffer`, bounding the scan at `limits.max_name_bytes` before
/// it can grow unboundedly (spec.md §5 "Resource bounds").
fn read_name_into_tag_buffer<R: Read>(tok: &mut Tokenizer<R>) -> Result<(usize, usize), Token> {
    let raw = match tok.read_bounded(tok.limits.max_name_bytes, name::is_name_char) {
        Ok(raw) => raw,
        Err(()) => return Err(tok.emit_error(ErrorCode::LimitExceeded, Severity::Fatal, "name exceeds length limit")),
    };
    match tok.tag_stack.top_buffer_mut().and_then(|buf| buf.append(&raw)) {
        Some(pair) => Ok(pair),
        None => Err(tok.emit_error(ErrorCode::LimitExceeded, Severity::Fatal, "tag buffer capacity exceeded")),
    }
}

pub(super) fn scan_tag_open<R: Read>(tok: &mut Tokenizer<R>) -> Option<Token> {
    tok.stream.get_cp(); // consume '<'
    let peek = tok.stream.peek_cp();
    if peek == '/' as i32 {
        tok.stream.get_cp();
        tok.state = State::EndTagName;
        return None;
    }
    if peek >= 0 && name::is_name_start(peek as u32) {
        tok.state = State::StartTagName;
        return None;
    }
    if peek == -1 {
        return Some(tok.emit_error(ErrorCode::UnexpectedEof, Severity::Fatal, "Unexpected EOF after '<'"));
    }
    // '!', '?', or anything else: Phase-1 does not support comments/CDATA/PI/DOCTYPE.
    Some(tok.emit_error(ErrorCode::InvalidCharAfterLt, Severity::Fatal, "Invalid character after '<'"))
}

pub(super) fn scan_start_tag_name<R: Read>(tok: &mut Tokenizer<R>) -> Option<Token> {
    let frame_start = tok.peek_start();
    if !tok.tag_stack.push_frame(frame_start) {
        return Some(tok.emit_error(ErrorCode::LimitExceeded, Severity::Fatal, "maximum tag nesting depth exceeded"));
    }
    let (offset, len) = match read_name_into_tag_buffer(tok) {
        Ok(pair) => pair,
        Err(err_tok) => return Some(err_tok),
    };
    {
        let frame = tok.tag_stack.top_mut().unwrap();
        frame.context.name_offset = offset;
        frame.context.name_len = len;
    }
    tok.state = State::InTag;
    let start_pos = tok.take_start();
    let frame = tok.tag_stack.top().unwrap();
    Some(Token::from_slice(TokenType::StartTag, frame.name(), start_pos.byte_offset, start_pos.line, start_pos.column))
}

pub(super) fn scan_in_tag<R: Read>(tok: &mut Tokenizer<R>) -> Option<Token> {
    tok.stream.skip_whitespace();
    let peek = tok.stream.peek_cp();

    if peek == '>' as i32 {
        tok.stream.get_cp();
        tok.state = State::Content;
        return None;
    }

    if peek == '/' as i32 {
        tok.stream.get_cp();
        if tok.stream.peek_cp() != '>' as i32 {
            return Some(tok.emit_error(ErrorCode::UnterminatedTag, Severity::Fatal, "unterminated tag"));
        }
        tok.stream.get_cp();
        let empty_tag = {
            let frame = tok.tag_stack.top_mut().unwrap();
            frame.context.is_empty = true;
            let pos = frame.context.start_position;
            Token::from_slice(TokenType::EmptyTag, frame.name(), pos.byte_offset, pos.line, pos.column)
        };
        tok.tag_stack.pop_frame();
        tok.state = State::Content;
        return Some(empty_tag);
    }

    if peek >= 0 && name::is_name_start(peek as u32) {
        tok.state = State::AttrName;
        return None;
    }

    Some(tok.emit_error(ErrorCode::UnterminatedTag, Severity::Fatal, "unterminated tag"))
}

pub(super) fn scan_attr_name<R: Read>(tok: &mut Tokenizer<R>) -> Option<Token> {
    tok.mark_start();
    let (offset, len) = match read_name_into_tag_buffer(tok) {
        Ok(pair) => pair,
        Err(err_tok) => return Some(err_tok),
    };
    let attr_count = {
        let frame = tok.tag_stack.top_mut().unwrap();
        frame.context.attr_count += 1;
        frame.context.attr_count
    };
    if attr_count > tok.limits.max_attrs_per_element {
        return Some(tok.emit_error(ErrorCode::LimitExceeded, Severity::Fatal, "too many attributes on element"));
    }
    tok.state = State::AfterAttrName;
    let start_pos = tok.take_start();
    let frame = tok.tag_stack.top().unwrap();
    let slice = frame.buffer().unwrap().slice(offset, len);
    Some(Token::from_slice(TokenType::AttributeName, slice, start_pos.byte_offset, start_pos.line, start_pos.column))
}

pub(super) fn scan_after_attr_name<R: Read>(tok: &mut Tokenizer<R>) -> Option<Token> {
    tok.stream.skip_whitespace();
    if tok.stream.peek_cp() != '=' as i32 {
        return Some(tok.emit_error(
            ErrorCode::ExpectedEqualsAfterAttrName,
            Severity::Fatal,
            "expected '=' after attribute name",
        ));
    }
    tok.stream.get_cp();
    tok.state = State::BeforeAttrValue;
    None
}

pub(super) fn scan_before_attr_value<R: Read>(tok: &mut Tokenizer<R>) -> Option<Token> {
    tok.stream.skip_whitespace();
    if tok.stream.peek_cp() != '"' as i32 {
        // Single-quoted values are a Phase-1 fatal error, same code as a
        // missing quote entirely (spec.md §4.4 "Attributes").
        return Some(tok.emit_error(
            ErrorCode::ExpectedQuoteForAttrValue,
            Severity::Fatal,
            "expected '\"' to start attribute value",
        ));
    }
    tok.mark_start();
    tok.stream.get_cp(); // consume opening quote
    tok.state = State::AttrValueQuoted;
    None
}

pub(super) fn scan_attr_value_quoted<R: Read>(tok: &mut Tokenizer<R>) -> Option<Token> {
    let quote = '"' as u32;
    let raw = match tok.read_bounded(tok.limits.max_attr_value_bytes, |cp| cp != quote) {
        Ok(raw) => raw,
        Err(()) => {
            return Some(tok.emit_error(
                ErrorCode::LimitExceeded,
                Severity::Fatal,
                "attribute value exceeds length limit",
            ))
        }
    };
    if tok.stream.peek_cp() != '"' as i32 {
        return Some(tok.emit_error(ErrorCode::UnterminatedTag, Severity::Fatal, "unterminated attribute value"));
    }
    tok.stream.get_cp(); // consume closing quote

    let (offset, len) = match tok.tag_stack.top_buffer_mut().and_then(|buf| buf.append(&raw)) {
        Some(pair) => pair,
        None => return Some(tok.emit_error(ErrorCode::LimitExceeded, Severity::Fatal, "tag buffer capacity exceeded")),
    };
    tok.state = State::InTag;
    let start_pos = tok.take_start();
    let frame = tok.tag_stack.top().unwrap();
    let slice = frame.buffer().unwrap().slice(offset, len);
    Some(Token::from_slice(TokenType::AttributeValue, slice, start_pos.byte_offset, start_pos.line, start_pos.column))
}

pub(super) fn scan_end_tag_name<R: Read>(tok: &mut Tokenizer<R>) -> Option<Token> {
    let (name_off, name_len) = match read_name_into_tag_buffer(tok) {
        Ok(pair) => pair,
        Err(err_tok) => return Some(err_tok),
    };
    tok.stream.skip_whitespace();
    if tok.stream.peek_cp() != '>' as i32 {
        return Some(tok.emit_error(ErrorCode::UnterminatedTag, Severity::Fatal, "unterminated end tag"));
    }
    tok.stream.get_cp();

    let names_match = {
        let frame = tok.tag_stack.top().unwrap();
        let buf = frame.buffer().unwrap();
        buf.slice(name_off, name_len) == frame.name()
    };
    if !names_match {
        return Some(tok.emit_error(ErrorCode::UnterminatedTag, Severity::Fatal, "End tag mismatch"));
    }

    let start_pos = tok.take_start();
    let end_tag = {
        let frame = tok.tag_stack.top().unwrap();
        let buf = frame.buffer().unwrap();
        Token::from_slice(
            TokenType::EndTag,
            buf.slice(name_off, name_len),
            start_pos.byte_offset,
            start_pos.line,
            start_pos.column,
        )
    };
    tok.tag_stack.pop_frame();
    tok.state = State::Content;
    Some(end_tag)
}
