//! Tokenizer for the `key:value[,key:value...]` event payload.
//!
//! A small state machine pulled one token at a time through [`Iterator`]. The
//! grammar has no escaping, so the scanner never fails: malformed input
//! produces best-effort tokens and always terminates with
//! [`TokenKind::Eof`].
//!
//! # Value termination
//!
//! A value normally runs to the end of the input. It stops at a `,` only when
//! another `:` follows later and the nearest separator ahead is that `,`. A
//! value containing a comma is therefore split whenever another pair follows
//! it.
//!
//! ```text
//! username:alexander,password:Scribeapple
//! └─Key──┘ └─Value─┘ └─Key──┘ └──Value──┘ Eof
//! ```

use std::iter::FusedIterator;

/// Separates a key from its value
pub const SEPARATOR: char = ':';

/// Separates one pair from the next
pub const PAIR_SEPARATOR: char = ',';

/// Token tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A key, without the trailing `:`
    Key,
    /// A value, without the trailing `,`
    Value,
    /// End of input. Always the final token.
    Eof,
}

/// A token borrowed from the lexer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// What kind of token this is
    pub kind: TokenKind,
    /// Byte offset just past the token's source span
    pub pos: usize,
    /// Token text (empty for [`TokenKind::Eof`])
    pub value: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Key,
    Separator,
    Value,
    PairSeparator,
    End,
    Done,
}

/// Single-pass payload lexer.
///
/// Not restartable: scanning the same input again needs a new `Lexer`.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    start: usize,
    pos: usize,
    state: State,
}

impl<'a> Lexer<'a> {
    /// Create a lexer positioned at the start of `input`.
    pub const fn new(input: &'a str) -> Self {
        Self { input, start: 0, pos: 0, state: State::Key }
    }

    fn emit(&mut self, kind: TokenKind) -> Token<'a> {
        let token = Token { kind, pos: self.pos, value: &self.input[self.start..self.pos] };
        self.start = self.pos;
        token
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Advance one code point at a time until `c` (left unconsumed) or EOF.
    fn accept_until(&mut self, c: char) {
        let rest = &self.input[self.pos..];
        self.pos = rest
            .char_indices()
            .find_map(|(offset, ch)| (ch == c).then_some(self.pos + offset))
            .unwrap_or(self.input.len());
    }

    fn accept_until_eof(&mut self) {
        self.pos = self.input.len();
    }

    /// Step over a separator and drop it from the next token.
    fn skip(&mut self, c: char) {
        self.pos = (self.pos + c.len_utf8()).min(self.input.len());
        self.start = self.pos;
    }

    fn index(&self, c: char) -> Option<usize> {
        self.input[self.pos..].find(c)
    }

    /// Whichever of `chars` occurs first in the remaining input.
    fn first_of(&self, chars: &[char]) -> Option<char> {
        chars
            .iter()
            .filter_map(|&c| self.index(c).map(|i| (i, c)))
            .min_by_key(|&(i, _)| i)
            .map(|(_, c)| c)
    }

    fn lex_value(&mut self) -> Token<'a> {
        let more_pairs = self.index(SEPARATOR).is_some()
            && self.first_of(&[PAIR_SEPARATOR, SEPARATOR]) == Some(PAIR_SEPARATOR);

        if more_pairs {
            self.accept_until(PAIR_SEPARATOR);
        } else {
            self.accept_until_eof();
        }

        let token = self.emit(TokenKind::Value);
        self.state = if self.is_eof() { State::End } else { State::PairSeparator };
        token
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                State::Key => {
                    self.accept_until(SEPARATOR);
                    self.state = State::Separator;
                    return Some(self.emit(TokenKind::Key));
                },
                State::Separator => {
                    self.skip(SEPARATOR);
                    self.state = State::Value;
                },
                State::Value => return Some(self.lex_value()),
                State::PairSeparator => {
                    self.skip(PAIR_SEPARATOR);
                    self.state = State::Key;
                },
                State::End => {
                    self.state = State::Done;
                    return Some(self.emit(TokenKind::Eof));
                },
                State::Done => return None,
            }
        }
    }
}

impl FusedIterator for Lexer<'_> {}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn tok(kind: TokenKind, pos: usize, value: &str) -> Token<'_> {
        Token { kind, pos, value }
    }

    #[test]
    fn username_and_password() {
        let tokens: Vec<_> = Lexer::new("username:alexander,password:Scribeapple").collect();
        assert_eq!(tokens, vec![
            tok(TokenKind::Key, 8, "username"),
            tok(TokenKind::Value, 18, "alexander"),
            tok(TokenKind::Key, 27, "password"),
            tok(TokenKind::Value, 39, "Scribeapple"),
            tok(TokenKind::Eof, 39, ""),
        ]);
    }

    #[test]
    fn single_email_pair() {
        let tokens: Vec<_> = Lexer::new("email:liamwilson186@example.net").collect();
        assert_eq!(tokens, vec![
            tok(TokenKind::Key, 5, "email"),
            tok(TokenKind::Value, 31, "liamwilson186@example.net"),
            tok(TokenKind::Eof, 31, ""),
        ]);
    }

    #[test]
    fn user_agent_with_commas_runs_to_end() {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_1) AppleWebKit/602.2.14 \
                  (KHTML, like Gecko) Version/10.0.1 Safari/602.2.14";
        let input = format!("user-agent:{ua}");
        let tokens: Vec<_> = Lexer::new(&input).collect();
        assert_eq!(tokens, vec![
            tok(TokenKind::Key, 10, "user-agent"),
            tok(TokenKind::Value, 130, ua),
            tok(TokenKind::Eof, 130, ""),
        ]);
    }

    #[test]
    fn comma_value_followed_by_pair_is_split() {
        let values: Vec<_> = Lexer::new("a:x,y,b:z")
            .filter(|t| t.kind == TokenKind::Value)
            .map(|t| t.value)
            .collect();
        assert_eq!(values, vec!["x", "z"]);
    }

    #[test]
    fn multibyte_offsets_are_char_boundaries() {
        let input = "név:Zoë,jelszó:ŐrültTeknős";
        for token in Lexer::new(input) {
            assert!(input.is_char_boundary(token.pos));
        }
        let values: Vec<_> = Lexer::new(input)
            .filter(|t| t.kind == TokenKind::Value)
            .map(|t| t.value)
            .collect();
        assert_eq!(values, vec!["Zoë", "ŐrültTeknős"]);
    }

    #[test]
    fn key_without_separator_does_not_panic() {
        let tokens: Vec<_> = Lexer::new("orphan").collect();
        assert_eq!(tokens, vec![
            tok(TokenKind::Key, 6, "orphan"),
            tok(TokenKind::Value, 6, ""),
            tok(TokenKind::Eof, 6, ""),
        ]);
    }

    #[test]
    fn exhausted_lexer_stays_exhausted() {
        let mut lexer = Lexer::new("k:v");
        assert_eq!(lexer.by_ref().count(), 3);
        assert_eq!(lexer.next(), None);
    }

    proptest! {
        #[test]
        fn always_terminates_with_eof(input in ".*") {
            let tokens: Vec<_> = Lexer::new(&input).collect();
            prop_assert!(tokens.len() <= input.len() + 3);
            prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
            prop_assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
            for token in &tokens {
                prop_assert!(input.is_char_boundary(token.pos));
            }
        }
    }
}
