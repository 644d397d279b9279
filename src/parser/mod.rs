pub mod ast;
pub mod cursor;

use crate::errors::{find_similar_keyword, CompileError, ParseErrorKind, SourceFile, SourceLocation, HERLANG_KEYWORDS};
use crate::lexer::{Token, TokenInfo, TokenKind};
use ast::*;
use cursor::TokenCursor;

/// Statements a single block may hold before the parser gives up on
/// finding its `end`.
pub const DEFAULT_MAX_BLOCK_ITERATIONS: usize = 10_000;

/// Result of looking for one statement at the cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Statement(Statement),
    /// One unrecognized token was consumed and dropped. Callers looping
    /// over statements drop one more token after this.
    Skipped,
    /// Nothing left to parse; no token was consumed.
    EndOfInput,
}

/// Keywords that open a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementKeyword {
    For,
    Function,
    Start,
    Say,
    Set,
}

impl StatementKeyword {
    fn from_token(token: &Token) -> Option<Self> {
        if token.kind != TokenKind::Keyword {
            return None;
        }
        match token.value.as_str() {
            "for" => Some(StatementKeyword::For),
            "function" => Some(StatementKeyword::Function),
            "start" => Some(StatementKeyword::Start),
            "say" => Some(StatementKeyword::Say),
            "set" => Some(StatementKeyword::Set),
            _ => None,
        }
    }
}

pub struct Parser {
    cursor: TokenCursor,
    source_file: Option<SourceFile>,
    max_block_iterations: usize,
}

impl Parser {
    pub fn new(tokens: Vec<TokenInfo>) -> Self {
        Parser {
            cursor: TokenCursor::new(tokens),
            source_file: None,
            max_block_iterations: DEFAULT_MAX_BLOCK_ITERATIONS,
        }
    }

    pub fn with_source(mut self, filename: &str, content: &str) -> Self {
        self.source_file = Some(SourceFile::new(filename, content));
        self
    }

    pub fn with_max_block_iterations(mut self, limit: usize) -> Self {
        self.max_block_iterations = limit;
        self
    }

    fn current(&self) -> &Token {
        self.cursor.peek()
    }

    fn current_location(&self) -> Option<SourceLocation> {
        let info = self.cursor.peek_info();
        self.source_file
            .as_ref()
            .map(|src| src.make_location(info.line, info.column))
    }

    fn make_error(&self, kind: ParseErrorKind) -> CompileError {
        let mut err = CompileError::new(kind);
        if let Some(loc) = self.current_location() {
            err = err.with_location(loc);
        }
        err
    }

    fn err_expected_keyword(&self, keyword: &'static str, context: &'static str) -> CompileError {
        let got = self.current();
        let mut err = self.make_error(ParseErrorKind::ExpectedKeyword {
            keyword,
            context,
            found: got.describe(),
        });
        if got.kind == TokenKind::Identifier {
            if let Some(suggestion) = find_similar_keyword(&got.value, HERLANG_KEYWORDS) {
                err = err.with_suggestion(&suggestion);
            }
        }
        err
    }

    fn expect_keyword(&mut self, keyword: &'static str, context: &'static str) -> Result<(), CompileError> {
        if self.current().is_keyword(keyword) {
            self.cursor.advance();
            Ok(())
        } else {
            Err(self.err_expected_keyword(keyword, context))
        }
    }

    fn expect_symbol(&mut self, symbol: &'static str, context: &'static str) -> Result<(), CompileError> {
        if self.current().is_symbol(symbol) {
            self.cursor.advance();
            Ok(())
        } else {
            Err(self.make_error(ParseErrorKind::ExpectedSymbol {
                symbol,
                context,
                found: self.current().describe(),
            }))
        }
    }

    fn expect_identifier(&mut self, context: &'static str) -> Result<String, CompileError> {
        let got = self.current();
        if got.kind == TokenKind::Identifier {
            return Ok(self.cursor.advance().value);
        }

        let mut err = self.make_error(ParseErrorKind::ExpectedIdentifier {
            context,
            found: got.describe(),
        });
        if got.kind == TokenKind::Keyword {
            err = err.with_hint(&format!(
                "'{}' is a reserved keyword and cannot be used as a name",
                got.value
            ));
        }
        Err(err)
    }

    fn expect_number(&mut self, context: &'static str) -> Result<i64, CompileError> {
        let parsed = self.current().value.parse::<i64>();
        match parsed {
            Ok(n) => {
                self.cursor.advance();
                Ok(n)
            }
            Err(_) => Err(self.make_error(ParseErrorKind::ExpectedNumber {
                context,
                found: self.current().describe(),
            })),
        }
    }

    fn expect_string(&mut self, context: &'static str) -> Result<String, CompileError> {
        if self.current().kind == TokenKind::StringLiteral {
            Ok(self.cursor.advance().value)
        } else {
            Err(self.make_error(ParseErrorKind::ExpectedString {
                context,
                found: self.current().describe(),
            }))
        }
    }

    pub fn parse(&mut self) -> Result<Program, CompileError> {
        let mut statements = Vec::new();

        loop {
            match self.parse_statement()? {
                Dispatch::Statement(stmt) => statements.push(stmt),
                Dispatch::Skipped => {
                    self.cursor.advance();
                }
                Dispatch::EndOfInput => break,
            }
        }

        Ok(Program::new(statements))
    }

    /// Parses the statement at the cursor, if the lookahead opens one.
    pub fn parse_statement(&mut self) -> Result<Dispatch, CompileError> {
        self.cursor.skip_newlines();

        if self.cursor.is_at_end() {
            return Ok(Dispatch::EndOfInput);
        }
        let tok = self.current();
        let is_identifier = tok.kind == TokenKind::Identifier;

        let stmt = match StatementKeyword::from_token(tok) {
            Some(StatementKeyword::For) => self.parse_for()?,
            Some(StatementKeyword::Function) => self.parse_function_def()?,
            Some(StatementKeyword::Start) => self.parse_entry_block()?,
            Some(StatementKeyword::Say) => self.parse_say()?,
            Some(StatementKeyword::Set) => self.parse_set()?,
            None if is_identifier => self.parse_call()?,
            None => {
                self.cursor.advance();
                return Ok(Dispatch::Skipped);
            }
        };

        Ok(Dispatch::Statement(stmt))
    }

    /// Collects statements up to and including the block's `end`.
    fn parse_block(&mut self) -> Result<Vec<Statement>, CompileError> {
        let mut body = Vec::new();
        let mut iterations = 0usize;

        loop {
            self.cursor.skip_newlines();

            let current = self.current();
            if current.is_keyword("end") {
                self.cursor.advance();
                break;
            }
            if current.kind == TokenKind::EndOfInput {
                return Err(self
                    .make_error(ParseErrorKind::UnexpectedEndOfBlock)
                    .with_hint("close every 'for', 'function' and 'start:' block with 'end'"));
            }

            // EndOfInput cannot come back here: it was ruled out above
            match self.parse_statement()? {
                Dispatch::Statement(stmt) => body.push(stmt),
                Dispatch::Skipped | Dispatch::EndOfInput => {
                    self.cursor.advance();
                }
            }

            iterations += 1;
            if iterations > self.max_block_iterations {
                return Err(self.make_error(ParseErrorKind::TooManyStatements {
                    limit: self.max_block_iterations,
                }));
            }
        }

        Ok(body)
    }

    // for IDENT from NUMBER to NUMBER [:] BLOCK
    fn parse_for(&mut self) -> Result<Statement, CompileError> {
        self.cursor.advance();

        let variable = self.expect_identifier("after 'for'")?;
        self.expect_keyword("from", "after loop variable")?;
        let start = self.expect_number("after 'from'")?;
        self.expect_keyword("to", "after start value")?;
        let end = self.expect_number("after 'to'")?;

        if self.current().is_symbol(":") {
            self.cursor.advance();
        }
        self.cursor.skip_newlines();
        let body = self.parse_block()?;

        Ok(Statement::ForLoop {
            variable,
            start,
            end,
            body,
        })
    }

    // function IDENT [PARAM] : BLOCK
    fn parse_function_def(&mut self) -> Result<Statement, CompileError> {
        self.cursor.advance();

        let name = self.expect_identifier("after 'function'")?;

        // A ':' right after the name means there is no parameter; any other
        // token, whatever its kind, is taken as the parameter
        let parameter = if self.current().is_symbol(":") {
            self.cursor.advance();
            None
        } else {
            let param = self.cursor.advance().value;
            self.expect_symbol(":", "after parameter in function definition")?;
            Some(param)
        };

        let body = self.parse_block()?;
        Ok(Statement::FunctionDef {
            name,
            parameter,
            body,
        })
    }

    // start : BLOCK
    fn parse_entry_block(&mut self) -> Result<Statement, CompileError> {
        self.cursor.advance();
        self.expect_symbol(":", "after 'start'")?;
        let body = self.parse_block()?;
        Ok(Statement::EntryBlock { body })
    }

    // say (ARG [,])* [end = STRING]
    fn parse_say(&mut self) -> Result<Statement, CompileError> {
        self.cursor.advance();

        let mut arguments = Vec::new();
        let mut is_variable = Vec::new();
        let mut terminator = DEFAULT_SAY_TERMINATOR.to_string();

        loop {
            let next = self.current().clone();
            match next.kind {
                // `end` here is only ever the `end="..."` suffix
                TokenKind::Keyword if next.value == "end" => {
                    self.cursor.advance();
                    if !self.current().is_symbol("=") {
                        return Err(self
                            .make_error(ParseErrorKind::ExpectedSymbol {
                                symbol: "=",
                                context: "after 'end' in 'say'",
                                found: self.current().describe(),
                            })
                            .with_hint("a block's 'end' must be on its own line"));
                    }
                    self.cursor.advance();
                    terminator = self.expect_string("after 'end='")?;
                    break;
                }
                TokenKind::Newline | TokenKind::EndOfInput => {
                    self.cursor.advance();
                    break;
                }
                TokenKind::StringLiteral | TokenKind::Identifier => {
                    let arg = self.cursor.advance();
                    is_variable.push(arg.kind == TokenKind::Identifier);
                    arguments.push(arg.value);

                    if self.current().is_symbol(",") {
                        self.cursor.advance();
                    }
                }
                _ => {
                    return Err(self.make_error(ParseErrorKind::UnexpectedToken {
                        context: "say",
                        found: next.describe(),
                    }));
                }
            }
        }

        if arguments.len() != is_variable.len() {
            return Err(self.make_error(ParseErrorKind::ArgumentMismatch {
                arguments: arguments.len(),
                flags: is_variable.len(),
            }));
        }

        Ok(Statement::Say {
            arguments,
            is_variable,
            terminator,
        })
    }

    // set IDENT
    fn parse_set(&mut self) -> Result<Statement, CompileError> {
        self.cursor.advance();
        let variable = self.expect_identifier("after 'set'")?;
        Ok(Statement::Set { variable })
    }

    // IDENT [ARG]
    fn parse_call(&mut self) -> Result<Statement, CompileError> {
        let function = self.cursor.advance().value;

        let next_kind = self.current().kind;
        let (argument, argument_kind) = match next_kind {
            TokenKind::StringLiteral | TokenKind::Identifier => {
                let arg = self.cursor.advance();
                (Some(arg.value), arg.kind)
            }
            _ => (None, TokenKind::EndOfInput),
        };

        Ok(Statement::Call {
            function,
            argument,
            argument_kind,
        })
    }
}
