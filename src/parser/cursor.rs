use crate::lexer::{Token, TokenInfo, TokenKind};

/// Read position over a token sequence. Owned by a single parse; the
/// position only ever moves forward.
pub struct TokenCursor {
    tokens: Vec<TokenInfo>,
    pos: usize,
    eof: TokenInfo,
}

impl TokenCursor {
    pub fn new(tokens: Vec<TokenInfo>) -> Self {
        // Past-the-end sentinel, placed just after the last real token
        let (line, column) = tokens
            .last()
            .map(|t| (t.line, t.column + t.token.value.chars().count().max(1)))
            .unwrap_or((1, 1));
        let eof = TokenInfo {
            token: Token::end_of_input(),
            line,
            column,
        };
        TokenCursor { tokens, pos: 0, eof }
    }

    pub fn peek(&self) -> &Token {
        &self.peek_info().token
    }

    pub fn peek_info(&self) -> &TokenInfo {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    pub fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    pub fn skip_newlines(&mut self) {
        while self.peek().kind == TokenKind::Newline {
            self.advance();
        }
    }

    #[cfg(test)]
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::EndOfInput
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    #[test]
    fn test_peek_does_not_advance() {
        let cursor = TokenCursor::new(Lexer::new("say x").tokenize());
        assert!(cursor.peek().is_keyword("say"));
        assert!(cursor.peek().is_keyword("say"));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_advance_stops_at_sentinel() {
        let mut cursor = TokenCursor::new(Lexer::new("x").tokenize());
        assert_eq!(cursor.advance().value, "x");
        assert_eq!(cursor.advance().kind, TokenKind::EndOfInput);
        let pos = cursor.position();
        assert_eq!(cursor.advance().kind, TokenKind::EndOfInput);
        assert_eq!(cursor.advance().kind, TokenKind::EndOfInput);
        assert_eq!(cursor.position(), pos);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_empty_stream_yields_sentinel() {
        let mut cursor = TokenCursor::new(Vec::new());
        assert_eq!(cursor.peek().kind, TokenKind::EndOfInput);
        assert_eq!(cursor.advance().kind, TokenKind::EndOfInput);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_skip_newlines() {
        let mut cursor = TokenCursor::new(Lexer::new("\n\n\nend").tokenize());
        cursor.skip_newlines();
        assert!(cursor.peek().is_keyword("end"));
        assert_eq!(cursor.position(), 3);
    }
}
