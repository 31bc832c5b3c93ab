//! Hand-written recursive-descent parser.
//!
//! Every statement form has exactly one parse function regardless of how
//! many keyword synonyms lead into it (spec §4.2): `make`/`set`/`let` all
//! fall into [`Parser::parse_assign`], `talk`/`show`/`wetin be` all fall
//! into [`Parser::parse_print`], and so on. A malformed statement produces
//! one error and parsing resumes at the next statement boundary rather than
//! aborting the whole program.

use crate::ast::{BinOp, Expr, MetadataEntry, Stmt, WhenArm};
use crate::error::GiantError;
use crate::lexer::{Keyword, NumberLit, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    /// Parse every statement in the token stream, recovering after each
    /// malformed one instead of stopping at the first error.
    pub fn parse_program(mut self) -> (Vec<Stmt>, Vec<GiantError>) {
        let mut stmts = Vec::new();
        let mut errors = Vec::new();

        loop {
            while self.peek_kind() == Some(&TokenKind::Newline) {
                self.advance();
            }
            if matches!(self.peek_kind(), Some(&TokenKind::Eof) | None) {
                break;
            }
            if matches!(self.peek_kind(), Some(&TokenKind::Indent(_))) {
                self.advance();
            }
            if matches!(self.peek_kind(), Some(&TokenKind::Eof) | None) {
                break;
            }

            match self.parse_statement() {
                Ok(stmt) => {
                    stmts.push(stmt);
                    if let Err(e) = self.expect_newline_or_eof() {
                        errors.push(e);
                        self.recover();
                    }
                }
                Err(e) => {
                    errors.push(e);
                    self.recover();
                }
            }
        }

        (stmts, errors)
    }

    /// Skip to the next top-level statement boundary (an `Indent(0)` token
    /// or EOF) after an error, so later statements still get parsed.
    fn recover(&mut self) {
        loop {
            match self.peek_kind() {
                None => return,
                Some(&TokenKind::Eof) => return,
                Some(&TokenKind::Indent(0)) => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt, GiantError> {
        match self.peek_kind() {
            Some(&TokenKind::Keyword(Keyword::Make | Keyword::Set | Keyword::Let)) => self.parse_assign(),
            Some(&TokenKind::Keyword(Keyword::Talk | Keyword::Show | Keyword::WetinBe)) => self.parse_print(),
            Some(&TokenKind::Keyword(Keyword::AtAnchor)) => self.parse_anchor_decl(),
            Some(&TokenKind::Keyword(Keyword::Relational)) => self.parse_relational_decl(),
            Some(&TokenKind::Keyword(Keyword::ListAnchors)) => {
                let line = self.peek_line();
                self.advance();
                Ok(Stmt::ListAnchors { line })
            }
            Some(&TokenKind::Keyword(Keyword::DescribeAnchor | Keyword::InspectAnchor)) => {
                let line = self.peek_line();
                self.advance();
                let name = self.expect_ident()?;
                Ok(Stmt::DescribeAnchor { name, line })
            }
            Some(&TokenKind::Keyword(Keyword::When)) => self.parse_when(),
            _ => Err(GiantError::syntax(self.peek_line(), "expected a statement")),
        }
    }

    fn parse_assign(&mut self) -> Result<Stmt, GiantError> {
        let line = self.peek_line();
        self.advance();
        let name = self.expect_ident()?;
        self.expect_connector()?;
        let value = self.parse_expr()?;
        Ok(Stmt::Assign { name, value, line })
    }

    fn parse_print(&mut self) -> Result<Stmt, GiantError> {
        let line = self.peek_line();
        self.advance();
        let value = self.parse_expr()?;
        Ok(Stmt::Print { value, line })
    }

    fn parse_anchor_decl(&mut self) -> Result<Stmt, GiantError> {
        let line = self.peek_line();
        self.advance();
        let name = self.expect_ident()?;
        self.expect_kind(&TokenKind::Eq, "expected '=' in anchor declaration")?;
        let value = self.parse_expr()?;
        let metadata = self.parse_metadata_entries()?;
        Ok(Stmt::AnchorDecl { name, value, metadata, line })
    }

    fn parse_relational_decl(&mut self) -> Result<Stmt, GiantError> {
        let line = self.peek_line();
        self.advance();
        let name = self.expect_ident()?;
        self.expect_kind(&TokenKind::Eq, "expected '=' in relational declaration")?;
        let value = self.parse_expr()?;
        self.expect_keyword(Keyword::RelativeTo, "expected 'relative to'")?;
        self.expect_kind(&TokenKind::LBracket, "expected '[' to start anchor list")?;
        let mut anchors = Vec::new();
        loop {
            if self.peek_kind() == Some(&TokenKind::RBracket) {
                self.advance();
                break;
            }
            anchors.push(self.expect_ident()?);
            match self.peek_kind() {
                Some(&TokenKind::Comma) => {
                    self.advance();
                }
                Some(&TokenKind::RBracket) => {
                    self.advance();
                    break;
                }
                _ => return Err(GiantError::syntax(self.peek_line(), "expected ',' or ']' in anchor list")),
            }
        }
        let metadata = self.parse_metadata_entries_with_continuation()?;
        Ok(Stmt::RelationalDecl { name, value, anchors, metadata, line })
    }

    fn parse_when(&mut self) -> Result<Stmt, GiantError> {
        let line = self.peek_line();
        self.advance();
        let subject = self.parse_expr()?;
        self.expect_keyword(Keyword::Is, "expected 'is' in when clause")?;
        let qualifier = self.expect_str()?;
        let anchor_name = self.expect_ident()?;
        self.expect_kind(&TokenKind::Colon, "expected ':' to open when body")?;
        self.expect_newline_or_eof()?;

        let mut body = Vec::new();
        while let Some(&TokenKind::Indent(width)) = self.peek_kind() {
            if width == 0 {
                break;
            }
            self.advance();
            self.expect_kind(&TokenKind::Keyword(Keyword::AtAction), "expected '@action' in when body")?;
            let stmt = self.parse_statement()?;
            body.push(stmt);
            self.expect_newline_or_eof()?;
        }

        if body.is_empty() {
            return Err(GiantError::syntax(line, "'when' clause has no @action body"));
        }

        Ok(Stmt::When { subject, arm: WhenArm { qualifier, anchor_name, body }, line })
    }

    /// Whether the cursor sits on a metadata key immediately followed by
    /// `=` - the lookahead that distinguishes `<meta>*` continuing from the
    /// statement simply ending here.
    fn peek_is_metadata_start(&self) -> bool {
        let is_key = matches!(
            self.peek_kind(),
            Some(&TokenKind::Keyword(
                Keyword::Unit
                    | Keyword::Tolerance
                    | Keyword::Description
                    | Keyword::Context
                    | Keyword::Confidence
                    | Keyword::Policy
                    | Keyword::SensorId
            )) | Some(&TokenKind::Ident(_))
        );
        is_key && self.tokens.get(self.pos + 1).map(|t| &t.kind) == Some(&TokenKind::Eq)
    }

    /// Zero or more `<key> = <expr>` phrases on the current line (spec
    /// §4.2's `<meta>*`), e.g. `tolerance = 5 unit = "C"`.
    fn parse_metadata_entries(&mut self) -> Result<Vec<MetadataEntry>, GiantError> {
        let mut entries = Vec::new();
        while self.peek_is_metadata_start() {
            let line = self.peek_line();
            let key = self.expect_metadata_key()?;
            self.expect_kind(&TokenKind::Eq, "expected '=' after metadata key")?;
            let value = self.parse_expr()?;
            entries.push(MetadataEntry { key, value, line });
        }
        Ok(entries)
    }

    /// Like [`Self::parse_metadata_entries`], but for `relational` declarations
    /// also accumulates metadata phrases written on subsequent indented
    /// lines into the same declaration (spec §4.2).
    fn parse_metadata_entries_with_continuation(&mut self) -> Result<Vec<MetadataEntry>, GiantError> {
        let mut entries = self.parse_metadata_entries()?;
        loop {
            let save = self.pos;
            if self.peek_kind() != Some(&TokenKind::Newline) {
                break;
            }
            self.advance();
            match self.peek_kind() {
                Some(&TokenKind::Indent(width)) if width > 0 => {
                    self.advance();
                }
                _ => {
                    self.pos = save;
                    break;
                }
            }
            if !self.peek_is_metadata_start() {
                self.pos = save;
                break;
            }
            entries.extend(self.parse_metadata_entries()?);
        }
        Ok(entries)
    }

    fn expect_metadata_key(&mut self) -> Result<String, GiantError> {
        let line = self.peek_line();
        let key = match self.peek_kind().cloned() {
            Some(TokenKind::Keyword(Keyword::Unit)) => "unit".to_string(),
            Some(TokenKind::Keyword(Keyword::Tolerance)) => "tolerance".to_string(),
            Some(TokenKind::Keyword(Keyword::Description)) => "description".to_string(),
            Some(TokenKind::Keyword(Keyword::Context)) => "context".to_string(),
            Some(TokenKind::Keyword(Keyword::Confidence)) => "confidence".to_string(),
            Some(TokenKind::Keyword(Keyword::Policy)) => "policy".to_string(),
            Some(TokenKind::Keyword(Keyword::SensorId)) => "sensor_id".to_string(),
            Some(TokenKind::Ident(name)) => name,
            _ => return Err(GiantError::syntax(line, "expected a metadata key")),
        };
        self.advance();
        Ok(key)
    }

    /// Additive level (spec §4.2): `plus`/`added to`/`minus`/`subtract`/
    /// `subtracted from`, binding looser than the multiplicative level below.
    fn parse_expr(&mut self) -> Result<Expr, GiantError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let line = self.peek_line();
            let op_and_order = match self.peek_kind() {
                Some(&TokenKind::Keyword(Keyword::Plus)) | Some(&TokenKind::Keyword(Keyword::AddedTo)) => {
                    Some((BinOp::Add, false))
                }
                Some(&TokenKind::Keyword(Keyword::Minus)) | Some(&TokenKind::Keyword(Keyword::Subtract)) => {
                    Some((BinOp::Sub, false))
                }
                Some(&TokenKind::Keyword(Keyword::SubtractedFrom)) => Some((BinOp::Sub, true)),
                _ => None,
            };
            let Some((op, reversed)) = op_and_order else {
                break;
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = if reversed {
                Expr::Binary { op, lhs: Box::new(rhs), rhs: Box::new(lhs), line }
            } else {
                Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), line }
            };
        }
        Ok(lhs)
    }

    /// Multiplicative level (spec §4.2): `times`/`multiplied by`/`over`/
    /// `divided by`, binding tighter than the additive level above.
    fn parse_multiplicative(&mut self) -> Result<Expr, GiantError> {
        let mut lhs = self.parse_atom()?;
        loop {
            let line = self.peek_line();
            let op_and_order = match self.peek_kind() {
                Some(&TokenKind::Keyword(Keyword::Times)) | Some(&TokenKind::Keyword(Keyword::MultipliedBy)) => {
                    Some((BinOp::Mul, false))
                }
                Some(&TokenKind::Keyword(Keyword::Over)) | Some(&TokenKind::Keyword(Keyword::DividedBy)) => {
                    Some((BinOp::Div, false))
                }
                _ => None,
            };
            let Some((op, reversed)) = op_and_order else {
                break;
            };
            self.advance();
            let rhs = self.parse_atom()?;
            lhs = if reversed {
                Expr::Binary { op, lhs: Box::new(rhs), rhs: Box::new(lhs), line }
            } else {
                Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), line }
            };
        }
        Ok(lhs)
    }

    fn parse_atom(&mut self) -> Result<Expr, GiantError> {
        let line = self.peek_line();
        match self.peek_kind().cloned() {
            Some(TokenKind::Number(n)) => {
                self.advance();
                Ok(Expr::Number { value: n, line })
            }
            Some(TokenKind::Str(s)) => {
                self.advance();
                Ok(Expr::Str { value: s, line })
            }
            Some(TokenKind::Ident(name)) => {
                self.advance();
                Ok(Expr::Ident { name, line })
            }
            _ => Err(GiantError::syntax(line, "expected a value")),
        }
    }

    fn expect_connector(&mut self) -> Result<(), GiantError> {
        match self.peek_kind() {
            Some(&TokenKind::Keyword(Keyword::Be | Keyword::To | Keyword::BeEqualTo)) => {
                self.advance();
                Ok(())
            }
            _ => Err(GiantError::syntax(self.peek_line(), "expected 'be', 'to' or 'be equal to'")),
        }
    }

    fn expect_ident(&mut self) -> Result<String, GiantError> {
        match self.peek_kind().cloned() {
            Some(TokenKind::Ident(name)) => {
                self.advance();
                Ok(name)
            }
            _ => Err(GiantError::syntax(self.peek_line(), "expected an identifier")),
        }
    }

    fn expect_str(&mut self) -> Result<String, GiantError> {
        match self.peek_kind().cloned() {
            Some(TokenKind::Str(s)) => {
                self.advance();
                Ok(s)
            }
            _ => Err(GiantError::syntax(self.peek_line(), "expected a quoted qualifier")),
        }
    }

    fn expect_kind(&mut self, kind: &TokenKind, message: &str) -> Result<(), GiantError> {
        if self.peek_kind() == Some(kind) {
            self.advance();
            Ok(())
        } else {
            Err(GiantError::syntax(self.peek_line(), message))
        }
    }

    fn expect_keyword(&mut self, kw: Keyword, message: &str) -> Result<(), GiantError> {
        if self.peek_kind() == Some(&TokenKind::Keyword(kw)) {
            self.advance();
            Ok(())
        } else {
            Err(GiantError::syntax(self.peek_line(), message))
        }
    }

    /// A statement ends at a `Newline`, EOF, or - when the statement just
    /// parsed was a `when` whose body loop already consumed its own
    /// trailing `Newline` - an `Indent(_)` already sitting at the start of
    /// the next line. That last case is left unconsumed so `parse_program`'s
    /// own `Indent` handling for the next statement still runs.
    fn expect_newline_or_eof(&mut self) -> Result<(), GiantError> {
        match self.peek_kind() {
            Some(&TokenKind::Newline) => {
                self.advance();
                Ok(())
            }
            Some(&TokenKind::Eof) | Some(&TokenKind::Indent(_)) | None => Ok(()),
            _ => Err(GiantError::syntax(self.peek_line(), "expected end of statement")),
        }
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_line(&self) -> usize {
        self.tokens.get(self.pos).map(|t| t.line).unwrap_or(0)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> (Vec<Stmt>, Vec<GiantError>) {
        let tokens = Lexer::new(src).tokenize().unwrap();
        Parser::new(tokens).parse_program()
    }

    #[test]
    fn parses_simple_assignment() {
        let (stmts, errors) = parse("make x be 5");
        assert!(errors.is_empty());
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Stmt::Assign { name, value, .. } => {
                assert_eq!(name, "x");
                assert_eq!(*value, Expr::Number { value: NumberLit::Int(5), line: 1 });
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        // "2 plus 3 times 4" must parse as 2 + (3 * 4), not (2 + 3) * 4.
        let (stmts, errors) = parse("talk 2 plus 3 times 4");
        assert!(errors.is_empty());
        match &stmts[0] {
            Stmt::Print { value: Expr::Binary { op, lhs, rhs, .. }, .. } => {
                assert_eq!(*op, BinOp::Add);
                assert_eq!(**lhs, Expr::Number { value: NumberLit::Int(2), line: 1 });
                match rhs.as_ref() {
                    Expr::Binary { op, lhs, rhs, .. } => {
                        assert_eq!(*op, BinOp::Mul);
                        assert_eq!(**lhs, Expr::Number { value: NumberLit::Int(3), line: 1 });
                        assert_eq!(**rhs, Expr::Number { value: NumberLit::Int(4), line: 1 });
                    }
                    other => panic!("expected a nested multiplicative expression, got {other:?}"),
                }
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn parses_subtracted_from_reverses_operands() {
        let (stmts, errors) = parse("talk 3 subtracted from 10");
        assert!(errors.is_empty());
        match &stmts[0] {
            Stmt::Print { value: Expr::Binary { op, lhs, rhs, .. }, .. } => {
                assert_eq!(*op, BinOp::Sub);
                assert_eq!(**lhs, Expr::Number { value: NumberLit::Int(10), line: 1 });
                assert_eq!(**rhs, Expr::Number { value: NumberLit::Int(3), line: 1 });
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn recovers_after_malformed_statement() {
        let (stmts, errors) = parse("make be 5\ntalk ok");
        assert_eq!(errors.len(), 1);
        assert_eq!(stmts.len(), 1);
        assert!(matches!(&stmts[0], Stmt::Print { .. }));
    }

    #[test]
    fn parses_anchor_with_metadata() {
        let (stmts, errors) = parse("@anchor limit = 100 unit = \"C\" tolerance = 2");
        assert!(errors.is_empty());
        match &stmts[0] {
            Stmt::AnchorDecl { name, metadata, .. } => {
                assert_eq!(name, "limit");
                assert_eq!(metadata.len(), 2);
                assert_eq!(metadata[0].key, "unit");
                assert_eq!(metadata[1].key, "tolerance");
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn parses_relational_declaration() {
        let (stmts, errors) = parse("relational r = 105 relative to [limit]");
        assert!(errors.is_empty());
        match &stmts[0] {
            Stmt::RelationalDecl { name, anchors, .. } => {
                assert_eq!(name, "r");
                assert_eq!(anchors, &vec!["limit".to_string()]);
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn relational_metadata_continues_on_indented_lines() {
        let (stmts, errors) = parse(
            "relational r = 105 relative to [limit] sensor_id = \"s1\"\n    policy = \"alert\"\ntalk r",
        );
        assert!(errors.is_empty());
        match &stmts[0] {
            Stmt::RelationalDecl { metadata, .. } => {
                assert_eq!(metadata.len(), 2);
                assert_eq!(metadata[0].key, "sensor_id");
                assert_eq!(metadata[1].key, "policy");
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn parses_when_with_action_body() {
        let (stmts, errors) = parse("when r is \"over\" limit:\n    @action talk \"too hot\"");
        assert!(errors.is_empty());
        match &stmts[0] {
            Stmt::When { arm, .. } => {
                assert_eq!(arm.qualifier, "over");
                assert_eq!(arm.anchor_name, "limit");
                assert_eq!(arm.body.len(), 1);
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn statement_following_a_when_clause_parses_without_a_spurious_error() {
        let (stmts, errors) = parse("when r is \"over\" limit:\n    @action talk \"too hot\"\ntalk \"done\"");
        assert!(errors.is_empty());
        assert_eq!(stmts.len(), 2);
        assert!(matches!(&stmts[0], Stmt::When { .. }));
        assert!(matches!(&stmts[1], Stmt::Print { .. }));
    }
}
