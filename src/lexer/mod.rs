use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::errors::HERLANG_KEYWORDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    StringLiteral,
    Symbol,
    Newline,
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::StringLiteral => "string",
            TokenKind::Symbol => "symbol",
            TokenKind::Newline => "newline",
            TokenKind::EndOfInput => "end of file",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenKind, value: &str) -> Self {
        Token {
            kind,
            value: value.to_string(),
        }
    }

    pub fn end_of_input() -> Self {
        Token::new(TokenKind::EndOfInput, "")
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.value == word
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.value == symbol
    }

    /// How the token reads in an error message.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Newline | TokenKind::EndOfInput => self.kind.to_string(),
            TokenKind::StringLiteral => format!("\"{}\"", self.value),
            _ => format!("'{}'", self.value),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.next();
        if let Some(c) = ch {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        ch
    }

    fn peek(&mut self) -> Option<&char> {
        self.input.peek()
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Comments run from `#` to the end of the line; the newline itself is kept.
    fn skip_comment(&mut self) {
        while let Some(&ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Escapes are kept verbatim: `"\n"` yields the two characters `\` and `n`.
    fn read_string(&mut self) -> String {
        let mut result = String::new();
        while let Some(&ch) = self.peek() {
            match ch {
                '"' => {
                    self.advance();
                    break;
                }
                '\n' => break,
                '\\' => {
                    result.push(ch);
                    self.advance();
                    if let Some(&escaped) = self.peek() {
                        if escaped != '\n' {
                            result.push(escaped);
                            self.advance();
                        }
                    }
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }
        result
    }

    fn read_word(&mut self, first: char) -> Token {
        let mut word = String::from(first);
        while let Some(&ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if HERLANG_KEYWORDS.contains(&word.as_str()) {
            Token::new(TokenKind::Keyword, &word)
        } else {
            Token::new(TokenKind::Identifier, &word)
        }
    }

    fn next_is_digit(&self) -> bool {
        let mut input = self.input.clone();
        matches!(input.next(), Some(c) if c.is_ascii_digit())
    }

    pub fn tokenize(&mut self) -> Vec<TokenInfo> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let line = self.line;
            let column = self.column;

            let token = match self.advance() {
                None => Token::end_of_input(),
                Some(ch) => match ch {
                    '\n' => Token::new(TokenKind::Newline, "\n"),
                    '#' => {
                        self.skip_comment();
                        continue;
                    }
                    '"' => Token::new(TokenKind::StringLiteral, &self.read_string()),
                    '-' if self.next_is_digit() => self.read_word('-'),
                    c if c.is_alphanumeric() || c == '_' => self.read_word(c),
                    c => Token::new(TokenKind::Symbol, &c.to_string()),
                },
            };

            let is_eof = token.kind == TokenKind::EndOfInput;
            tokens.push(TokenInfo { token, line, column });

            if is_eof {
                break;
            }
        }

        tokens
    }
}
