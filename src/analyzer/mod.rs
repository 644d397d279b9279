use std::fmt;

use thiserror::Error;

/// Line prefixes that open a block closed by a later `end`.
const BLOCK_OPENERS: &[&str] = &["function", "start:", "if", "elif", "else"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndentIssue {
    #[error("'end' without matching block start.")]
    EndWithoutBlock,

    #[error("'end' indentation mismatch. Expected {expected} spaces but got {actual}.")]
    EndMismatch { expected: usize, actual: usize },

    #[error("Inconsistent indentation. Expected greater than {expected} spaces but got {actual}.")]
    InconsistentIndentation { expected: usize, actual: usize },

    #[error("Some blocks not closed properly (missing 'end'). {open} still open.")]
    UnclosedBlocks { open: usize },
}

/// One advisory finding. `line` is 1-based; for `UnclosedBlocks` it is the
/// line just past the end of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub issue: IndentIssue,
}

impl Diagnostic {
    pub fn message(&self) -> String {
        self.issue.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issue {
            IndentIssue::UnclosedBlocks { .. } => write!(f, "[Warning] EOF: {}", self.message()),
            _ => write!(f, "[Warning] Line {}: {}", self.line, self.message()),
        }
    }
}

/// Checks that block bodies sit deeper than their opener and that each
/// `end` lines up with the opener it closes. Works on raw lines and never
/// stops early.
pub struct IndentAnalyzer {
    indent_stack: Vec<usize>,
    pub diagnostics: Vec<Diagnostic>,
}

impl IndentAnalyzer {
    pub fn new() -> Self {
        IndentAnalyzer {
            indent_stack: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn analyze(&mut self, source: &str) {
        let mut lineno = 1;

        for line in source.lines() {
            self.check_line(line, lineno);
            lineno += 1;
        }

        if !self.indent_stack.is_empty() {
            self.diagnostics.push(Diagnostic {
                line: lineno,
                issue: IndentIssue::UnclosedBlocks {
                    open: self.indent_stack.len(),
                },
            });
        }
    }

    fn check_line(&mut self, line: &str, lineno: usize) {
        let trimmed = line.trim_matches(|c: char| c.is_ascii_whitespace());
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }

        let indent = line.chars().take_while(|&c| c == ' ').count();

        if trimmed == "end" {
            match self.indent_stack.pop() {
                None => self.warn(lineno, IndentIssue::EndWithoutBlock),
                Some(expected) if expected != indent => self.warn(
                    lineno,
                    IndentIssue::EndMismatch {
                        expected,
                        actual: indent,
                    },
                ),
                Some(_) => {}
            }
        } else if BLOCK_OPENERS.iter().any(|opener| trimmed.starts_with(opener)) {
            self.indent_stack.push(indent);
        } else if let Some(&expected) = self.indent_stack.last() {
            if indent <= expected {
                self.warn(
                    lineno,
                    IndentIssue::InconsistentIndentation {
                        expected,
                        actual: indent,
                    },
                );
            }
        }
    }

    fn warn(&mut self, line: usize, issue: IndentIssue) {
        self.diagnostics.push(Diagnostic { line, issue });
    }
}

impl Default for IndentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a fresh analyzer over `source`.
pub fn check_indentation(source: &str) -> Vec<Diagnostic> {
    let mut analyzer = IndentAnalyzer::new();
    analyzer.analyze(source);
    analyzer.diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_source_has_no_diagnostics() {
        let src = "# greeting\nfunction greet name:\n  say \"hi\", name\nend\n\nstart:\n  greet \"bob\"\nend\n";
        assert!(check_indentation(src).is_empty());
    }

    #[test]
    fn test_body_not_indented() {
        let diags = check_indentation("function f:\nsay \"x\"\nend\n");
        assert_eq!(
            diags,
            vec![Diagnostic {
                line: 2,
                issue: IndentIssue::InconsistentIndentation {
                    expected: 0,
                    actual: 0
                },
            }]
        );
        assert!(diags[0].message().contains("Inconsistent indentation"));
    }

    #[test]
    fn test_end_mismatch_names_both_widths() {
        let diags = check_indentation("start:\n  say x\n  end\n");
        assert_eq!(
            diags,
            vec![Diagnostic {
                line: 3,
                issue: IndentIssue::EndMismatch {
                    expected: 0,
                    actual: 2
                },
            }]
        );
        assert_eq!(
            diags[0].to_string(),
            "[Warning] Line 3: 'end' indentation mismatch. Expected 0 spaces but got 2."
        );
    }

    #[test]
    fn test_end_without_block() {
        let diags = check_indentation("say x\nend\n");
        assert_eq!(
            diags,
            vec![Diagnostic {
                line: 2,
                issue: IndentIssue::EndWithoutBlock
            }]
        );
    }

    #[test]
    fn test_unclosed_blocks_reported_once_after_all_lines() {
        let diags = check_indentation("function f:\n  start:\n  say x\nsay y\n");
        // Every line is still checked before the final report
        assert_eq!(diags.len(), 3);
        assert_eq!(
            diags[0].issue,
            IndentIssue::InconsistentIndentation {
                expected: 2,
                actual: 2
            }
        );
        assert_eq!(diags[0].line, 3);
        assert_eq!(diags[1].line, 4);
        assert_eq!(diags[2].issue, IndentIssue::UnclosedBlocks { open: 2 });
        assert_eq!(diags[2].line, 5);
        assert!(diags[2].to_string().starts_with("[Warning] EOF:"));
    }

    #[test]
    fn test_conditional_openers_nest() {
        let src = "start:\n  if x\n    say x\n  end\n  else\n    say y\n  end\nend\n";
        assert!(check_indentation(src).is_empty());
    }

    #[test]
    fn test_opener_is_a_prefix_match() {
        // `iffy` starts with `if`, so it opens a block like the real keyword
        let diags = check_indentation("iffy\n  say x\n");
        assert_eq!(diags, vec![Diagnostic { line: 3, issue: IndentIssue::UnclosedBlocks { open: 1 } }]);
    }

    #[test]
    fn test_tabs_do_not_count_and_comments_are_ignored() {
        let src = "start:\n\tsay x\n# end\n   # also skipped\nend\n";
        let diags = check_indentation(src);
        assert_eq!(
            diags,
            vec![Diagnostic {
                line: 2,
                issue: IndentIssue::InconsistentIndentation {
                    expected: 0,
                    actual: 0
                },
            }]
        );
    }

    #[test]
    fn test_only_ascii_whitespace_is_blank() {
        // A no-break space line is content, not a blank line
        let diags = check_indentation("start:\n\u{a0}\nend\n");
        assert_eq!(
            diags,
            vec![Diagnostic {
                line: 2,
                issue: IndentIssue::InconsistentIndentation {
                    expected: 0,
                    actual: 0
                },
            }]
        );
    }

    #[test]
    fn test_windows_line_endings() {
        assert!(check_indentation("start:\r\n  say x\r\nend\r\n").is_empty());
    }
}
