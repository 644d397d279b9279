use crate::lexer::TokenKind;

/// Terminator used by `say` when no `end=` suffix is given. It is the
/// two-character escape, not a real line feed; expanding it is up to the
/// executor.
pub const DEFAULT_SAY_TERMINATOR: &str = "\\n";

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    ForLoop {
        variable: String,
        start: i64,
        end: i64,
        body: Vec<Statement>,
    },

    FunctionDef {
        name: String,
        parameter: Option<String>,
        body: Vec<Statement>,
    },

    // The `start:` block, the program's executable region
    EntryBlock {
        body: Vec<Statement>,
    },

    // `arguments` and `is_variable` always have the same length
    Say {
        arguments: Vec<String>,
        is_variable: Vec<bool>,
        terminator: String,
    },

    // Only the name is recorded; the grammar has no value slot
    Set {
        variable: String,
    },

    // `argument_kind` is EndOfInput when no argument was supplied
    Call {
        function: String,
        argument: Option<String>,
        argument_kind: TokenKind,
    },
}

impl Statement {
    pub fn body(&self) -> Option<&[Statement]> {
        match self {
            Statement::ForLoop { body, .. }
            | Statement::FunctionDef { body, .. }
            | Statement::EntryBlock { body } => Some(body.as_slice()),
            Statement::Say { .. } | Statement::Set { .. } | Statement::Call { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Program { statements }
    }

    /// Visits every statement, nested bodies included, in source order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Statement)) {
        fn walk_all<'a>(stmts: &'a [Statement], visit: &mut impl FnMut(&'a Statement)) {
            for stmt in stmts {
                visit(stmt);
                if let Some(body) = stmt.body() {
                    walk_all(body, visit);
                }
            }
        }
        walk_all(&self.statements, visit);
    }

    pub fn entry_block(&self) -> Option<&[Statement]> {
        self.statements.iter().find_map(|stmt| match stmt {
            Statement::EntryBlock { body } => Some(body.as_slice()),
            _ => None,
        })
    }
}
