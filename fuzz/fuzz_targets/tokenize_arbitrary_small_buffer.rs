#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use xmltok::{Limits, Options, Token, TokenType, Tokenizer};

fuzz_target!(|data: &[u8]| {
    // Same as tokenize_arbitrary, but at the minimum legal buffer size (4
    // bytes), to stress compaction/refill boundaries against arbitrary
    // multi-byte UTF-8 scalars straddling every possible refill point.
    let Ok(mut tok) = Tokenizer::from_reader(Cursor::new(data.to_vec()), 4, Options::default(), Limits::default())
    else {
        return;
    };

    let mut t = Token::empty(TokenType::DocumentStart, 0, 1, 1);
    while tok.next_token(&mut t) {
        let _ = t.as_slice();
    }
});
