//! Structured view of the raw event payload.

use std::collections::HashMap;

use crate::lexer::{Lexer, TokenKind};

/// Decoded `key -> value` pairs. Later duplicates overwrite earlier ones.
pub type DecodedPayload = HashMap<String, String>;

/// Parse raw payload bytes into key/value pairs.
///
/// Never fails. Invalid UTF-8 is replaced before lexing, and malformed pairs
/// produce whatever the lexer makes of them.
pub fn parse(bytes: &[u8]) -> DecodedPayload {
    let text = String::from_utf8_lossy(bytes);
    let mut decoded = DecodedPayload::new();
    let mut key = "";

    for token in Lexer::new(&text) {
        match token.kind {
            TokenKind::Eof => break,
            TokenKind::Key => key = token.value,
            TokenKind::Value => {
                decoded.insert(key.to_owned(), token.value.to_owned());
            },
        }
    }

    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(entries: &[(&str, &str)]) -> DecodedPayload {
        entries.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn username_and_password() {
        assert_eq!(
            parse(b"username:alexander,password:Scribeapple"),
            pairs(&[("username", "alexander"), ("password", "Scribeapple")])
        );
    }

    #[test]
    fn email() {
        assert_eq!(
            parse(b"email:liamwilson186@example.net"),
            pairs(&[("email", "liamwilson186@example.net")])
        );
    }

    #[test]
    fn user_agent() {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_1) AppleWebKit/602.2.14 \
                  (KHTML, like Gecko) Version/10.0.1 Safari/602.2.14";
        assert_eq!(parse(format!("user-agent:{ua}").as_bytes()), pairs(&[("user-agent", ua)]));
    }

    #[test]
    fn last_duplicate_wins() {
        assert_eq!(parse(b"username:first,username:second"), pairs(&[("username", "second")]));
    }

    #[test]
    fn invalid_utf8_is_tolerated() {
        let decoded = parse(b"username:\xffbob");
        assert_eq!(decoded.get("username").map(String::as_str), Some("\u{fffd}bob"));
    }
}
