use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub line_content: String,
}

impl SourceLocation {
    pub fn new(file: &str, line: usize, column: usize, line_content: &str) -> Self {
        SourceLocation {
            file: file.to_string(),
            line,
            column,
            line_content: line_content.to_string(),
        }
    }
}

/// Every way a parse can abort. `found` fields hold the offending token as
/// shown to the user (see `Token::describe`).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("Expected identifier {context}, got {found}")]
    ExpectedIdentifier { context: &'static str, found: String },

    #[error("Expected '{keyword}' {context}, got {found}")]
    ExpectedKeyword {
        keyword: &'static str,
        context: &'static str,
        found: String,
    },

    #[error("Expected '{symbol}' {context}, got {found}")]
    ExpectedSymbol {
        symbol: &'static str,
        context: &'static str,
        found: String,
    },

    #[error("Expected number {context}, got {found}")]
    ExpectedNumber { context: &'static str, found: String },

    #[error("Expected string literal {context}, got {found}")]
    ExpectedString { context: &'static str, found: String },

    #[error("Unexpected token in '{context}': {found}")]
    UnexpectedToken { context: &'static str, found: String },

    #[error("Unexpected end of file inside block")]
    UnexpectedEndOfBlock,

    #[error("Too many statements parsed without encountering 'end' (limit is {limit})")]
    TooManyStatements { limit: usize },

    #[error("Internal error: 'say' has {arguments} arguments but {flags} variable flags")]
    ArgumentMismatch { arguments: usize, flags: usize },
}

impl ParseErrorKind {
    /// Stable code shown in the error header.
    pub fn code(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedIdentifier { .. } => "E0001",
            ParseErrorKind::ExpectedKeyword { .. } => "E0002",
            ParseErrorKind::ExpectedSymbol { .. } => "E0003",
            ParseErrorKind::ExpectedNumber { .. } => "E0004",
            ParseErrorKind::ExpectedString { .. } => "E0005",
            ParseErrorKind::UnexpectedToken { .. } => "E0006",
            ParseErrorKind::UnexpectedEndOfBlock => "E0007",
            ParseErrorKind::TooManyStatements { .. } => "E0008",
            ParseErrorKind::ArgumentMismatch { .. } => "E0009",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompileError {
    pub kind: ParseErrorKind,
    pub location: Option<SourceLocation>,
    pub hint: Option<String>,
    pub suggestion: Option<String>,
}

impl CompileError {
    pub fn new(kind: ParseErrorKind) -> Self {
        CompileError {
            kind,
            location: None,
            hint: None,
            suggestion: None,
        }
    }

    pub fn with_location(mut self, loc: SourceLocation) -> Self {
        self.location = Some(loc);
        self
    }

    pub fn with_hint(mut self, hint: &str) -> Self {
        self.hint = Some(hint.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }
}

impl From<ParseErrorKind> for CompileError {
    fn from(kind: ParseErrorKind) -> Self {
        CompileError::new(kind)
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ANSI color codes
        const RED: &str = "\x1b[1;31m";
        const BLUE: &str = "\x1b[1;34m";
        const CYAN: &str = "\x1b[1;36m";
        const YELLOW: &str = "\x1b[1;33m";
        const GREEN: &str = "\x1b[1;32m";
        const RESET: &str = "\x1b[0m";
        const BOLD: &str = "\x1b[1m";

        writeln!(f, "{}error[{}]{}: {}{}", RED, self.kind.code(), RESET, BOLD, self.kind)?;
        write!(f, "{}", RESET)?;

        if let Some(ref loc) = self.location {
            writeln!(f, "  {}-->{} {}:{}:{}", BLUE, RESET, loc.file, loc.line, loc.column)?;

            let line_num_width = loc.line.to_string().len();

            writeln!(f, "  {:width$} {}|{}", "", BLUE, RESET, width = line_num_width)?;
            writeln!(
                f,
                "  {}{}{} {}|{} {}",
                BLUE,
                loc.line,
                RESET,
                BLUE,
                RESET,
                loc.line_content.trim_end()
            )?;

            let pointer_offset = loc.column.saturating_sub(1);
            writeln!(
                f,
                "  {:width$} {}|{} {}{}^--- here{}",
                "",
                BLUE,
                RESET,
                " ".repeat(pointer_offset),
                RED,
                RESET,
                width = line_num_width
            )?;
        }

        if let Some(ref hint) = self.hint {
            writeln!(f, "\n  {}hint{}: {}", CYAN, RESET, hint)?;
        }

        // Suggestion (did you mean?)
        if let Some(ref suggestion) = self.suggestion {
            writeln!(f, "  {}help{}: did you mean `{}{}{}`?", GREEN, RESET, YELLOW, suggestion, RESET)?;
        }

        Ok(())
    }
}

pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.to_lowercase().chars().collect();
    let b_chars: Vec<char> = b.to_lowercase().chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut dp = vec![vec![0usize; n + 1]; m + 1];

    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }

    dp[m][n]
}

pub fn find_similar_keyword(word: &str, keywords: &[&str]) -> Option<String> {
    // Short identifiers (x, i, n) are usually intentional names, not typos
    if word.len() <= 2 {
        return None;
    }

    let mut best_match: Option<(&str, usize)> = None;

    for &keyword in keywords {
        let len_diff = word.len().abs_diff(keyword.len());
        if len_diff > 2 {
            continue;
        }

        let distance = levenshtein_distance(word, keyword);
        if distance == 0 {
            return None;
        }

        let max_distance = if word.len() >= 4 { 2 } else { 1 };
        if distance <= max_distance {
            match best_match {
                Some((_, best)) if best <= distance => {}
                _ => best_match = Some((keyword, distance)),
            }
        }
    }

    best_match.map(|(s, _)| s.to_string())
}

/// Reserved words of the language; also the candidate list for typo hints.
pub const HERLANG_KEYWORDS: &[&str] = &[
    "for", "from", "to", "function", "start", "say", "set", "end",
    "if", "elif", "else", "return",
];

pub struct SourceFile {
    pub filename: String,
    lines: Vec<String>,
}

impl SourceFile {
    pub fn new(filename: &str, content: &str) -> Self {
        let lines: Vec<String> = content.lines().map(|s| s.to_string()).collect();
        SourceFile {
            filename: filename.to_string(),
            lines,
        }
    }

    pub fn get_line(&self, line_num: usize) -> Option<&str> {
        if line_num > 0 && line_num <= self.lines.len() {
            Some(&self.lines[line_num - 1])
        } else {
            None
        }
    }

    pub fn make_location(&self, line: usize, column: usize) -> SourceLocation {
        let line_content = self.get_line(line).unwrap_or("").to_string();
        SourceLocation::new(&self.filename, line, column, &line_content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("say", "say"), 0);
        assert_eq!(levenshtein_distance("say", "sya"), 2);
        assert_eq!(levenshtein_distance("from", "form"), 2);
        assert_eq!(levenshtein_distance("function", "funtion"), 1);
        assert_eq!(levenshtein_distance("", "end"), 3);
    }

    #[test]
    fn test_find_similar() {
        assert_eq!(find_similar_keyword("funtion", HERLANG_KEYWORDS), Some("function".to_string()));
        assert_eq!(find_similar_keyword("sey", HERLANG_KEYWORDS), Some("say".to_string()));
        assert_eq!(find_similar_keyword("strat", HERLANG_KEYWORDS), Some("start".to_string()));
    }

    #[test]
    fn test_no_suggestion_for_short_or_exact_words() {
        assert_eq!(find_similar_keyword("x", HERLANG_KEYWORDS), None);
        assert_eq!(find_similar_keyword("to", HERLANG_KEYWORDS), None);
        assert_eq!(find_similar_keyword("say", HERLANG_KEYWORDS), None);
        assert_eq!(find_similar_keyword("counter", HERLANG_KEYWORDS), None);
    }

    #[test]
    fn test_kind_messages() {
        assert_eq!(
            ParseErrorKind::UnexpectedEndOfBlock.to_string(),
            "Unexpected end of file inside block"
        );
        let kind = ParseErrorKind::ExpectedKeyword {
            keyword: "from",
            context: "after loop variable",
            found: "'form'".to_string(),
        };
        assert_eq!(kind.to_string(), "Expected 'from' after loop variable, got 'form'");
        assert_eq!(kind.code(), "E0002");
    }

    #[test]
    fn test_display_includes_location_and_suggestion() {
        let src = SourceFile::new("demo.her", "for i form 1 to 3:\n");
        let err = CompileError::new(ParseErrorKind::ExpectedKeyword {
            keyword: "from",
            context: "after loop variable",
            found: "'form'".to_string(),
        })
        .with_location(src.make_location(1, 7))
        .with_suggestion("from");

        let rendered = err.to_string();
        assert!(rendered.contains("error[E0002]"));
        assert!(rendered.contains("demo.her:1:7"));
        assert!(rendered.contains("for i form 1 to 3:"));
        assert!(rendered.contains("did you mean"));
    }

    #[test]
    fn test_source_is_kind() {
        use std::error::Error;
        let err = CompileError::new(ParseErrorKind::UnexpectedEndOfBlock);
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Unexpected end of file inside block"));
    }
}
