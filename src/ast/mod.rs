//! Abstract syntax tree for GIANT programs.
//!
//! Every surface phrasing the parser recognizes collapses into exactly one
//! of the node shapes below (spec §4.2's "multiple phrasings, one AST
//! node"); the variety lives in the parser, not here.

mod expr;
mod stmt;

pub use expr::{BinOp, Expr};
pub use stmt::{MetadataEntry, Stmt, WhenArm};
