//! Fuzz the payload lexer and parser with arbitrary text.
//!
//! The lexer must terminate, emit exactly one trailing EOF token, and only
//! produce offsets that are valid cut points in the input.

#![no_main]

use emitter_proto::{Lexer, TokenKind, payload};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let tokens: Vec<_> = Lexer::new(&text).collect();

    // INVARIANT 1: the stream ends with a single EOF
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);

    // INVARIANT 2: offsets never go backwards and are char boundaries
    let mut last = 0;
    for token in &tokens {
        assert!(token.pos >= last);
        assert!(text.is_char_boundary(token.pos));
        last = token.pos;
    }

    // INVARIANT 3: the parser accepts anything the lexer does
    let decoded = payload::parse(data);
    assert!(decoded.len() <= tokens.len());
});
