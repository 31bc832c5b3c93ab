//! Statement nodes.

use super::expr::Expr;

/// One `key: value` line inside an `@anchor`/`relational` declaration body.
/// Kept as an `Expr` rather than a resolved `Scalar` so metadata literals go
/// through the same evaluation path as any other expression.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEntry {
    pub key: String,
    pub value: Expr,
    pub line: usize,
}

/// The indented `@action` body of a `when` clause, guarded by a qualifier
/// phrase and the anchor it is measured against (spec §4.2/§4.3).
#[derive(Debug, Clone, PartialEq)]
pub struct WhenArm {
    pub qualifier: String,
    pub anchor_name: String,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `make x be 5` / `set x to 5` / `let x be equal to 5`.
    Assign {
        name: String,
        value: Expr,
        line: usize,
    },
    /// `talk x` / `show x` / `wetin be x`.
    Print { value: Expr, line: usize },
    /// `@anchor name = <value> [metadata...]`.
    AnchorDecl {
        name: String,
        value: Expr,
        metadata: Vec<MetadataEntry>,
        line: usize,
    },
    /// `relational name = <value> relative to [a, b, ...] [metadata...]`.
    RelationalDecl {
        name: String,
        value: Expr,
        anchors: Vec<String>,
        metadata: Vec<MetadataEntry>,
        line: usize,
    },
    ListAnchors { line: usize },
    /// `describe anchor <name>` / `inspect anchor <name>` - both surface
    /// phrasings collapse to this one node (spec §4.2).
    DescribeAnchor { name: String, line: usize },
    /// `when <subject> is "<qualifier>" <anchor>:` followed by an indented
    /// `@action` body.
    When {
        subject: Expr,
        arm: WhenArm,
        line: usize,
    },
}

impl Stmt {
    pub fn line(&self) -> usize {
        match self {
            Stmt::Assign { line, .. }
            | Stmt::Print { line, .. }
            | Stmt::AnchorDecl { line, .. }
            | Stmt::RelationalDecl { line, .. }
            | Stmt::ListAnchors { line }
            | Stmt::DescribeAnchor { line, .. }
            | Stmt::When { line, .. } => *line,
        }
    }
}
