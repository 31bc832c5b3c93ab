//! GIANT: lexer, parser and tree-walking evaluator for the relational-value
//! language described by this crate's design notes.
//!
//! The pipeline is the usual three stages - [`lexer`] turns source text into
//! a token stream, [`parser`] turns that into a small [`ast`], and
//! [`evaluator`] walks the AST against an [`environment::Environment`].
//! [`execute`] and friends wire all three together for callers who just want
//! to run a whole program.

pub mod ast;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod value;

pub use environment::Environment;
pub use error::GiantError;
pub use evaluator::Evaluator;

use lexer::Lexer;
use parser::Parser;
use std::io::Write;

/// Run a program against a fresh [`Environment`], writing program output to
/// `out`. Returns every error collected while lexing, parsing and
/// evaluating; an empty vector means the program ran to completion without
/// any.
pub fn execute_with(source: &str, out: &mut dyn Write) -> Vec<GiantError> {
    let tokens = match Lexer::new(source).tokenize() {
        Ok(tokens) => tokens,
        Err(e) => return vec![e],
    };

    let (stmts, mut errors) = Parser::new(tokens).parse_program();

    let mut evaluator = Evaluator::new(out);
    let mut eval_errors = evaluator.run(&stmts);
    errors.append(&mut eval_errors);
    errors
}

/// Run a program against a fresh environment, writing program output to
/// stdout.
pub fn execute(source: &str) -> Vec<GiantError> {
    let mut stdout = std::io::stdout();
    execute_with(source, &mut stdout)
}

/// Run a program against a fresh environment and return its rendered output
/// as a `String` alongside any errors, for tests and the REPL's `stop`-free
/// one-shot evaluation.
pub fn execute_to_string(source: &str) -> (String, Vec<GiantError>) {
    let mut buf = Vec::new();
    let errors = execute_with(source, &mut buf);
    (String::from_utf8_lossy(&buf).into_owned(), errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_to_string_runs_a_full_program() {
        let (out, errors) = execute_to_string(
            "@anchor limit = 100 tolerance = 2\nrelational r = 105 relative to [limit]\ntalk r",
        );
        assert!(errors.is_empty());
        assert_eq!(out, "105 (5 over limit)\n");
    }

    #[test]
    fn lex_errors_short_circuit_with_a_single_error() {
        let (_out, errors) = execute_to_string("*omo* never closed");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], GiantError::Syntax { .. }));
    }
}
