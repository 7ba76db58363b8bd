#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use xmltok::{Limits, Options, Token, TokenType, Tokenizer};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes through the full tokenizer at a default-sized buffer.
    // Err/Error tokens are expected and fine; what we verify is no panics,
    // no infinite loop (bounded by the input draining to DocumentEnd/Error),
    // and that token ordering never goes backwards.
    let Ok(mut tok) = Tokenizer::from_reader(Cursor::new(data.to_vec()), 4096, Options::default(), Limits::default())
    else {
        return;
    };

    let mut t = Token::empty(TokenType::DocumentStart, 0, 1, 1);
    let mut last_offset = 0u64;
    while tok.next_token(&mut t) {
        assert!(t.byte_offset >= last_offset, "token offsets must be non-decreasing");
        last_offset = t.byte_offset;
        let _ = t.as_slice();
    }
});
