//! Tree-walking evaluator.
//!
//! Mirrors the teacher's `Interpreter`: one dispatch function per AST node,
//! writing side effects out through a generic sink instead of calling
//! `println!` directly, so the same evaluator drives both the CLI and the
//! in-memory test harness. Evaluation errors abort only the statement being
//! evaluated (spec §5) - the caller moves on to the next one.

use std::io::Write;

use crate::ast::{Expr, Stmt};
use crate::environment::Environment;
use crate::error::GiantError;
use crate::value::{compute_offset, qualifier_of, Anchor, Binding, Qualifier, Relational, RelationalOffset, Scalar};

pub struct Evaluator<'a> {
    pub env: Environment,
    out: &'a mut dyn Write,
}

impl<'a> Evaluator<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Evaluator { env: Environment::new(), out }
    }

    /// Run every statement, collecting one error per statement that fails
    /// without aborting the remaining ones.
    pub fn run(&mut self, stmts: &[Stmt]) -> Vec<GiantError> {
        let mut errors = Vec::new();
        for stmt in stmts {
            if let Err(e) = self.exec_stmt(stmt) {
                errors.push(e);
            }
        }
        errors
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), GiantError> {
        match stmt {
            Stmt::Assign { name, value, .. } => {
                let v = self.eval_expr(value)?;
                self.env.bind(name, Binding::Scalar(v));
                Ok(())
            }
            Stmt::Print { value, line } => {
                let v = self.eval_print_value(value, *line)?;
                writeln!(self.out, "{v}").map_err(|e| GiantError::value(*line, e.to_string()))
            }
            Stmt::AnchorDecl { name, value, metadata, line } => self.exec_anchor_decl(name, value, metadata, *line),
            Stmt::RelationalDecl { name, value, anchors, metadata, line } => {
                self.exec_relational_decl(name, value, anchors, metadata, *line)
            }
            Stmt::ListAnchors { line } => self.exec_list_anchors(*line),
            Stmt::DescribeAnchor { name, line } => self.exec_describe_anchor(name, *line),
            Stmt::When { subject, arm, line } => self.exec_when(subject, arm, *line),
        }
    }

    /// `talk`/`show`/`wetin be` can print a plain scalar or, when pointed at
    /// a bound anchor/relational name, its full rendered form.
    fn eval_print_value(&self, expr: &Expr, line: usize) -> Result<String, GiantError> {
        if let Expr::Ident { name, .. } = expr {
            match self.env.lookup(name) {
                Some(Binding::Scalar(s)) => return Ok(s.to_string()),
                Some(Binding::Anchor(a)) => return Ok(a.to_string()),
                Some(Binding::Relational(r)) => return Ok(r.to_string()),
                None => return Err(GiantError::name(line, format!("'{name}' is not bound"))),
            }
        }
        Ok(self.eval_expr(expr)?.to_string())
    }

    fn eval_expr(&self, expr: &Expr) -> Result<Scalar, GiantError> {
        match expr {
            Expr::Number { value, .. } => Ok(match value {
                crate::lexer::NumberLit::Int(i) => Scalar::Int(*i),
                crate::lexer::NumberLit::Float(f) => Scalar::Float(*f),
            }),
            Expr::Str { value, .. } => Ok(Scalar::Str(value.clone())),
            Expr::Ident { name, line } => match self.env.lookup(name) {
                Some(Binding::Scalar(s)) => Ok(s.clone()),
                Some(other) => Err(GiantError::type_error(
                    *line,
                    format!("'{name}' is a {}, not a plain value", other.type_name()),
                )),
                None => Err(GiantError::name(*line, format!("'{name}' is not bound"))),
            },
            Expr::Binary { op, lhs, rhs, line } => {
                let l = self.eval_expr(lhs)?;
                let r = self.eval_expr(rhs)?;
                Scalar::apply_binary(*op, &l, &r, *line)
            }
        }
    }

    fn eval_metadata(&self, entries: &[crate::ast::MetadataEntry]) -> Result<Vec<(String, Scalar)>, GiantError> {
        entries
            .iter()
            .map(|e| Ok((e.key.clone(), self.eval_expr(&e.value)?)))
            .collect()
    }

    /// Recognized-key bounds shared by anchors and relational values (spec
    /// §3/§7: non-negative `tolerance`, `confidence` in `[0, 1]`).
    fn validate_metadata(metadata: &[(String, Scalar)], line: usize) -> Result<(), GiantError> {
        if let Some((_, tol)) = metadata.iter().find(|(k, _)| k == "tolerance") {
            if tol.as_f64().map(|t| t < 0.0).unwrap_or(true) {
                return Err(GiantError::value(line, "tolerance must be a non-negative number"));
            }
        }
        if let Some((_, conf)) = metadata.iter().find(|(k, _)| k == "confidence") {
            match conf.as_f64() {
                Some(c) if (0.0..=1.0).contains(&c) => {}
                _ => return Err(GiantError::value(line, "confidence must be between 0 and 1")),
            }
        }
        Ok(())
    }

    fn exec_anchor_decl(
        &mut self,
        name: &str,
        value: &Expr,
        metadata: &[crate::ast::MetadataEntry],
        line: usize,
    ) -> Result<(), GiantError> {
        let v = self.eval_expr(value)?;
        if v.as_f64().is_none() {
            return Err(GiantError::type_error(line, format!("anchor '{name}' must be numeric")));
        }
        let metadata = self.eval_metadata(metadata)?;
        Self::validate_metadata(&metadata, line)?;
        self.env.bind(name, Binding::Anchor(Anchor { name: name.to_string(), value: v, metadata }));
        Ok(())
    }

    fn exec_relational_decl(
        &mut self,
        name: &str,
        value: &Expr,
        anchor_names: &[String],
        metadata: &[crate::ast::MetadataEntry],
        line: usize,
    ) -> Result<(), GiantError> {
        let v = self.eval_expr(value)?;
        if v.as_f64().is_none() {
            return Err(GiantError::type_error(line, format!("relational '{name}' must be numeric")));
        }
        let metadata = self.eval_metadata(metadata)?;
        Self::validate_metadata(&metadata, line)?;

        let mut offsets = Vec::with_capacity(anchor_names.len());
        for anchor_name in anchor_names {
            let anchor = self.resolve_anchor(anchor_name, line)?;
            let offset = compute_offset(&v, &anchor.value)
                .ok_or_else(|| GiantError::type_error(line, format!("anchor '{anchor_name}' is not numeric")))?;
            let qualifier = qualifier_of(v.as_f64().unwrap(), anchor);
            offsets.push(RelationalOffset { anchor_name: anchor_name.clone(), offset, qualifier });
        }

        self.env.bind(name, Binding::Relational(Relational { value: v, offsets, metadata }));
        Ok(())
    }

    fn resolve_anchor(&self, name: &str, line: usize) -> Result<&Anchor, GiantError> {
        match self.env.lookup(name) {
            Some(Binding::Anchor(a)) => Ok(a),
            Some(other) => Err(GiantError::type_error(line, format!("'{name}' is a {}, not an anchor", other.type_name()))),
            None => Err(GiantError::name(line, format!("'{name}' is not bound"))),
        }
    }

    /// "Print one line per anchor in insertion order" (spec §4.5) - each
    /// anchor gets its full rendering, the same one `describe anchor` uses.
    fn exec_list_anchors(&mut self, line: usize) -> Result<(), GiantError> {
        let rendered: Vec<String> = self.env.iter_anchors().map(|a| a.to_string()).collect();
        for line_out in rendered {
            writeln!(self.out, "{line_out}").map_err(|e| GiantError::value(line, e.to_string()))?;
        }
        Ok(())
    }

    fn exec_describe_anchor(&mut self, name: &str, line: usize) -> Result<(), GiantError> {
        let anchor = self.resolve_anchor(name, line)?;
        writeln!(self.out, "{anchor}").map_err(|e| GiantError::value(line, e.to_string()))
    }

    /// Regardless of whether `arm.anchor_name` is one of the subject's own
    /// cached reference anchors, the qualifier is resolved fresh against the
    /// live anchor binding (spec §4.3).
    fn exec_when(&mut self, subject: &Expr, arm: &crate::ast::WhenArm, line: usize) -> Result<(), GiantError> {
        let subject_value = self.eval_when_subject(subject, line)?;
        let anchor = self.resolve_anchor(&arm.anchor_name, line)?.clone();
        let expected = Qualifier::from_str(&arm.qualifier)
            .ok_or_else(|| GiantError::value(line, format!("'{}' is not a valid qualifier", arm.qualifier)))?;

        let actual = qualifier_of(subject_value, &anchor);
        if actual == expected {
            for stmt in &arm.body {
                self.exec_stmt(stmt)?;
            }
        }
        Ok(())
    }

    /// A `when` subject is usually a relational value's name (its own
    /// numeric `value` is what gets compared), but a plain numeric
    /// expression is accepted directly too.
    fn eval_when_subject(&self, expr: &Expr, line: usize) -> Result<f64, GiantError> {
        if let Expr::Ident { name, .. } = expr {
            if let Some(Binding::Relational(r)) = self.env.lookup(name) {
                return r
                    .value
                    .as_f64()
                    .ok_or_else(|| GiantError::type_error(line, format!("relational '{name}' is not numeric")));
            }
        }
        self.eval_expr(expr)?
            .as_f64()
            .ok_or_else(|| GiantError::type_error(line, "when subject must be numeric"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn run_source(src: &str) -> (String, Vec<GiantError>) {
        let tokens = Lexer::new(src).tokenize().unwrap();
        let (stmts, mut parse_errors) = Parser::new(tokens).parse_program();
        let mut buf = Vec::new();
        let mut eval = Evaluator::new(&mut buf);
        let mut errors = eval.run(&stmts);
        parse_errors.append(&mut errors);
        (String::from_utf8(buf).unwrap(), parse_errors)
    }

    #[test]
    fn assigns_and_prints_scalar() {
        let (out, errors) = run_source("make x be 5\ntalk x");
        assert!(errors.is_empty());
        assert_eq!(out, "5\n");
    }

    #[test]
    fn arithmetic_phrase_evaluates() {
        let (out, errors) = run_source("talk 3 plus 4");
        assert!(errors.is_empty());
        assert_eq!(out, "7\n");
    }

    #[test]
    fn division_promotes_to_float_display() {
        let (out, errors) = run_source("talk 7 divided by 1");
        assert!(errors.is_empty());
        assert_eq!(out, "7.0\n");
    }

    #[test]
    fn anchor_and_relational_render_with_qualifier() {
        let (out, errors) = run_source(
            "@anchor limit = 100 tolerance = 2\nrelational r = 105 relative to [limit]\ntalk r",
        );
        assert!(errors.is_empty());
        assert_eq!(out, "105 (5 over limit)\n");
    }

    #[test]
    fn talking_an_anchor_name_prints_its_full_rendering_not_just_the_value() {
        let (out, errors) = run_source("@anchor limit = 100 tolerance = 2\ntalk limit");
        assert!(errors.is_empty());
        assert_eq!(out, "limit = 100 [tolerance=\u{b1}2]\n");
    }

    #[test]
    fn when_clause_fires_on_matching_qualifier() {
        let (out, errors) = run_source(
            "@anchor limit = 100 tolerance = 2\nrelational r = 105 relative to [limit]\nwhen r is \"over\" limit:\n    @action talk \"too hot\"",
        );
        assert!(errors.is_empty());
        assert_eq!(out, "too hot\n");
    }

    #[test]
    fn when_clause_does_not_fire_on_mismatched_qualifier() {
        let (out, errors) = run_source(
            "@anchor limit = 100 tolerance = 2\nrelational r = 105 relative to [limit]\nwhen r is \"under\" limit:\n    @action talk \"too cold\"",
        );
        assert!(errors.is_empty());
        assert_eq!(out, "");
    }

    #[test]
    fn unbound_identifier_is_a_name_error() {
        let (_out, errors) = run_source("talk nope");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], GiantError::Name { .. }));
    }

    #[test]
    fn division_by_zero_is_reported_without_aborting_later_statements() {
        let (out, errors) = run_source("talk 1 divided by 0\ntalk \"still runs\"");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], GiantError::Arithmetic { .. }));
        assert_eq!(out, "still runs\n");
    }
}
