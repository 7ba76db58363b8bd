//! Integration tests driving `Tokenizer` as an external consumer would.

use std::io::Cursor;

use xmltok::{Limits, Options, Token, TokenType, Tokenizer};

fn tokenizer(input: &str) -> Tokenizer<Cursor<Vec<u8>>> {
    Tokenizer::from_reader(Cursor::new(input.as_bytes().to_vec()), 64, Options::default(), Limits::default()).unwrap()
}

fn collect(tok: &mut Tokenizer<Cursor<Vec<u8>>>) -> Vec<(TokenType, Vec<u8>)> {
    let mut out = Vec::new();
    let mut t = Token::empty(TokenType::DocumentStart, 0, 1, 1);
    while tok.next_token(&mut t) {
        out.push((t.kind, t.as_slice().to_vec()));
    }
    out
}

#[test]
fn nested_elements_with_an_attribute() {
    let mut tok = tokenizer(r#"<a x="1"><b>hi</b></a>"#);
    let tokens = collect(&mut tok);
    let kinds: Vec<TokenType> = tokens.iter().map(|(k, _)| *k).collect();
    assert_eq!(
        kinds,
        vec![
            TokenType::DocumentStart,
            TokenType::StartTag,
            TokenType::AttributeName,
            TokenType::AttributeValue,
            TokenType::StartTag,
            TokenType::Text,
            TokenType::EndTag,
            TokenType::EndTag,
            TokenType::DocumentEnd,
        ]
    );
    assert_eq!(tokens[1].1, b"a");
    assert_eq!(tokens[2].1, b"x");
    assert_eq!(tokens[3].1, b"1");
    assert_eq!(tokens[4].1, b"b");
    assert_eq!(tokens[5].1, b"hi");
    assert_eq!(tokens[6].1, b"b");
    assert_eq!(tokens[7].1, b"a");
}

#[test]
fn start_tag_positions_match_their_source_offsets() {
    let mut tok = tokenizer(r#"<a x="1"><b>hi</b></a>"#);
    let mut t = Token::empty(TokenType::DocumentStart, 0, 1, 1);
    assert!(tok.next_token(&mut t)); // DocumentStart
    assert!(tok.next_token(&mut t)); // StartTag("a")
    assert_eq!((t.byte_offset, t.column), (0, 1));
    assert!(tok.next_token(&mut t)); // AttributeName("x")
    assert!(tok.next_token(&mut t)); // AttributeValue("1")
    assert!(tok.next_token(&mut t)); // StartTag("b")
    assert_eq!((t.byte_offset, t.column), (9, 10));
    assert!(tok.next_token(&mut t)); // Text("hi")
    assert_eq!((t.byte_offset, t.column), (12, 13));
}

#[test]
fn nesting_depth_tracks_open_elements() {
    let mut tok = tokenizer("<a><b><c/></b></a>");
    let mut t = Token::empty(TokenType::DocumentStart, 0, 1, 1);
    tok.next_token(&mut t); // DocumentStart
    tok.next_token(&mut t); // <a>
    assert_eq!(tok.nesting_depth(), 1);
    tok.next_token(&mut t); // <b>
    assert_eq!(tok.nesting_depth(), 2);
    tok.next_token(&mut t); // StartTag("c")
    assert_eq!(t.kind, TokenType::StartTag);
    assert_eq!(tok.nesting_depth(), 3);
    tok.next_token(&mut t); // EmptyTag("c"), frame popped
    assert_eq!(t.kind, TokenType::EmptyTag);
    assert_eq!(tok.nesting_depth(), 2);
    tok.next_token(&mut t); // </b>
    assert_eq!(tok.nesting_depth(), 1);
}

#[test]
fn crlf_normalization_can_be_disabled() {
    let mut tok = Tokenizer::from_reader(
        Cursor::new(b"line1\r\nline2".to_vec()),
        64,
        Options::from_bits(0),
        Limits::default(),
    )
    .unwrap();
    let tokens = collect(&mut tok);
    assert_eq!(tokens[1], (TokenType::Text, b"line1\r\nline2".to_vec()));
}

#[test]
fn unclosed_tag_emits_fatal_error_then_refuses_to_continue() {
    let mut tok = tokenizer("<a>");
    let mut t = Token::empty(TokenType::DocumentStart, 0, 1, 1);
    assert!(tok.next_token(&mut t)); // DocumentStart
    assert!(tok.next_token(&mut t)); // StartTag("a")
    assert!(tok.next_token(&mut t)); // Error
    assert_eq!(t.kind, TokenType::Error);
    assert_eq!(t.as_slice(), b"Unclosed tag at end of document");
    assert!(!tok.next_token(&mut t));
    assert_eq!(tok.errors().len(), 1);
}

#[test]
fn end_tag_mismatch_is_fatal() {
    let mut tok = tokenizer("<a></b>");
    let tokens = collect(&mut tok);
    let last = tokens.last().unwrap();
    assert_eq!(last.0, TokenType::Error);
}

#[test]
fn reset_returns_to_pre_document_start_state_and_clears_errors() {
    let mut tok = tokenizer("<a>");
    let mut t = Token::empty(TokenType::DocumentStart, 0, 1, 1);
    while tok.next_token(&mut t) {}
    assert_eq!(tok.errors().len(), 1);
    tok.reset();
    assert_eq!(tok.errors().len(), 0);
    assert!(tok.next_token(&mut t));
    assert_eq!(t.kind, TokenType::DocumentStart);
}

#[test]
fn max_open_depth_is_enforced() {
    let limits = Limits { max_open_depth: 2, ..Limits::default() };
    let mut tok =
        Tokenizer::from_reader(Cursor::new(b"<a><b><c>".to_vec()), 64, Options::default(), limits).unwrap();
    let tokens = collect(&mut tok);
    assert_eq!(tokens.last().unwrap().0, TokenType::Error);
}

#[test]
fn empty_input_is_just_the_two_document_boundaries() {
    let mut tok = tokenizer("");
    let tokens = collect(&mut tok);
    assert_eq!(tokens, vec![(TokenType::DocumentStart, Vec::new()), (TokenType::DocumentEnd, Vec::new())]);
}
