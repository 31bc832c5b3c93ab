//! Hand-rolled, position-tracking scanner for GIANT source text.
//!
//! The lexer turns UTF-8 source into a flat token stream. Its one genuinely
//! hard job is collapsing the surface language's many synonymous keyword
//! phrases ("make x be 5", "set x to 5", "let x be equal to 5", ...) into a
//! single keyword per phrase while still treating a word as a plain
//! identifier when it isn't actually the start of a matching phrase (spec
//! §4.1). That is done with a small greedy lookahead rather than a grammar
//! file, matching how this codebase has always hand-written its lexers.

mod token;

pub use token::{Keyword, NumberLit, Token, TokenKind};

use crate::error::GiantError;
use std::{iter::Peekable, str::Chars};
use token::{keyword_lookup, keyword_prefix_exists, MAX_KEYWORD_WORDS};

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            col: 1,
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, GiantError> {
        self.skip_blank_lines_then_indent()?;

        loop {
            self.skip_inline_whitespace();
            match self.peek() {
                None => {
                    self.tokens.push(Token::new(TokenKind::Eof, self.line, self.col));
                    break;
                }
                Some('\n') => self.lex_newline()?,
                Some('*') => self.lex_comment_or_error()?,
                Some('"') => self.lex_string()?,
                Some(c) if c.is_ascii_digit() => self.lex_number()?,
                Some('@') => self.lex_sigil()?,
                Some(c) if c.is_ascii_alphabetic() || c == '_' => self.lex_word()?,
                Some('=') => self.single(TokenKind::Eq),
                Some('[') => self.single(TokenKind::LBracket),
                Some(']') => self.single(TokenKind::RBracket),
                Some(':') => self.single(TokenKind::Colon),
                Some(',') => self.single(TokenKind::Comma),
                Some(other) => {
                    return Err(GiantError::syntax(
                        self.line,
                        format!("unexpected character '{other}'"),
                    ))
                }
            }
        }

        Ok(self.tokens)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn skip_inline_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t') | Some('\r')) {
            self.advance();
        }
    }

    /// After a line has ended, silently swallow any further blank lines (no
    /// extra `Newline` tokens - "blank lines produce a single NEWLINE"), then
    /// measure and emit the `Indent` of the next non-blank line, if any.
    fn skip_blank_lines_then_indent(&mut self) -> Result<(), GiantError> {
        loop {
            let start_col = self.col;
            let mut width = 0;
            while matches!(self.peek(), Some(' ') | Some('\t')) {
                self.advance();
                width += 1;
            }
            match self.peek() {
                None => return Ok(()),
                Some('\n') => {
                    self.advance();
                    continue;
                }
                Some(_) => {
                    self.tokens
                        .push(Token::new(TokenKind::Indent(width), self.line, start_col));
                    return Ok(());
                }
            }
        }
    }

    fn lex_newline(&mut self) -> Result<(), GiantError> {
        self.advance();
        self.tokens.push(Token::new(TokenKind::Newline, self.line, 1));
        self.skip_blank_lines_then_indent()
    }

    fn single(&mut self, kind: TokenKind) {
        let (line, col) = (self.line, self.col);
        self.advance();
        self.tokens.push(Token::new(kind, line, col));
    }

    fn read_ident_chars(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        s
    }

    /// Peek the next whitespace-separated word from a cloned char cursor,
    /// without touching lexer state. Used to look ahead across word
    /// boundaries while deciding whether a multi-word keyword continues.
    fn peek_next_word(cursor: &mut Peekable<Chars<'_>>) -> Option<String> {
        while matches!(cursor.peek(), Some(' ') | Some('\t') | Some('\r')) {
            cursor.next();
        }
        match cursor.peek() {
            Some(c) if c.is_ascii_alphanumeric() || *c == '_' => {}
            _ => return None,
        }
        let mut word = String::new();
        while let Some(c) = cursor.peek().copied() {
            if c.is_ascii_alphanumeric() || c == '_' {
                word.push(c);
                cursor.next();
            } else {
                break;
            }
        }
        Some(word)
    }

    fn lex_word(&mut self) -> Result<(), GiantError> {
        let (line, col) = (self.line, self.col);
        let first = self.read_ident_chars();

        let mut trial = vec![first.clone()];
        let mut matched: Option<(Keyword, usize)> = keyword_lookup(&trial).map(|kw| (kw, 1));

        let mut lookahead = self.chars.clone();
        while trial.len() < MAX_KEYWORD_WORDS {
            let Some(word) = Self::peek_next_word(&mut lookahead) else {
                break;
            };
            trial.push(word);
            if !keyword_prefix_exists(&trial) {
                break;
            }
            if let Some(kw) = keyword_lookup(&trial) {
                matched = Some((kw, trial.len()));
            }
        }

        if let Some((kw, nwords)) = matched {
            for _ in 1..nwords {
                self.skip_inline_whitespace();
                self.read_ident_chars();
            }
            self.tokens.push(Token::new(TokenKind::Keyword(kw), line, col));
        } else {
            self.tokens.push(Token::new(TokenKind::Ident(first), line, col));
        }
        Ok(())
    }

    fn lex_number(&mut self) -> Result<(), GiantError> {
        let (line, col) = (self.line, self.col);
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let mut is_float = false;
        if self.peek() == Some('.') {
            let mut probe = self.chars.clone();
            probe.next();
            if matches!(probe.peek(), Some(c) if c.is_ascii_digit()) {
                is_float = true;
                s.push('.');
                self.advance();
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        s.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }

        if is_float {
            let value: f64 = s
                .parse()
                .map_err(|_| GiantError::syntax(line, format!("invalid number literal '{s}'")))?;
            self.tokens
                .push(Token::new(TokenKind::Number(NumberLit::Float(value)), line, col));
        } else {
            let value: i64 = s
                .parse()
                .map_err(|_| GiantError::syntax(line, format!("invalid number literal '{s}'")))?;
            self.tokens
                .push(Token::new(TokenKind::Number(NumberLit::Int(value)), line, col));
        }
        Ok(())
    }

    fn lex_string(&mut self) -> Result<(), GiantError> {
        let (line, col) = (self.line, self.col);
        self.advance();
        let mut s = String::new();
        loop {
            match self.peek() {
                None => return Err(GiantError::syntax(line, "unterminated string literal")),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some('"') => {
                            s.push('"');
                            self.advance();
                        }
                        Some('\\') => {
                            s.push('\\');
                            self.advance();
                        }
                        _ => {
                            return Err(GiantError::syntax(
                                self.line,
                                "invalid escape sequence in string literal",
                            ))
                        }
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
            }
        }
        self.tokens.push(Token::new(TokenKind::Str(s), line, col));
        Ok(())
    }

    fn lex_sigil(&mut self) -> Result<(), GiantError> {
        let (line, col) = (self.line, self.col);
        self.advance();
        let word = self.read_ident_chars();
        let full = format!("@{word}");
        match full.as_str() {
            "@anchor" => self
                .tokens
                .push(Token::new(TokenKind::Keyword(Keyword::AtAnchor), line, col)),
            "@action" => self
                .tokens
                .push(Token::new(TokenKind::Keyword(Keyword::AtAction), line, col)),
            _ => return Err(GiantError::syntax(line, format!("unrecognized directive '{full}'"))),
        }
        Ok(())
    }

    fn matches_literal(&self, lit: &str) -> bool {
        let mut probe = self.chars.clone();
        for expected in lit.chars() {
            match probe.next() {
                Some(c) if c == expected => {}
                _ => return false,
            }
        }
        true
    }

    fn consume_literal(&mut self, lit: &str) {
        for _ in lit.chars() {
            self.advance();
        }
    }

    fn lex_comment_or_error(&mut self) -> Result<(), GiantError> {
        let line = self.line;
        if self.matches_literal("*sidegist*") {
            self.consume_literal("*sidegist*");
            while !matches!(self.peek(), None | Some('\n')) {
                self.advance();
            }
            Ok(())
        } else if self.matches_literal("*omo*") {
            self.consume_literal("*omo*");
            loop {
                if self.peek().is_none() {
                    return Err(GiantError::syntax(line, "unterminated block comment"));
                }
                if self.matches_literal("*omo*") {
                    self.consume_literal("*omo*");
                    return Ok(());
                }
                self.advance();
            }
        } else {
            Err(GiantError::syntax(line, "unexpected character '*'"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_identifier_and_number() {
        assert_eq!(
            kinds("speed 42"),
            vec![
                TokenKind::Indent(0),
                TokenKind::Ident("speed".into()),
                TokenKind::Number(NumberLit::Int(42)),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_float_literal() {
        assert_eq!(
            kinds("7.25"),
            vec![
                TokenKind::Indent(0),
                TokenKind::Number(NumberLit::Float(7.25)),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn collapses_multi_word_keyword() {
        assert_eq!(
            kinds("let x be equal to 5"),
            vec![
                TokenKind::Indent(0),
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Ident("x".into()),
                TokenKind::Keyword(Keyword::BeEqualTo),
                TokenKind::Number(NumberLit::Int(5)),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn distinguishes_single_word_keyword_from_prefix_of_longer_one() {
        // "be" alone must stay a single keyword, not an incomplete "be equal to".
        assert_eq!(
            kinds("make x be 5"),
            vec![
                TokenKind::Indent(0),
                TokenKind::Keyword(Keyword::Make),
                TokenKind::Ident("x".into()),
                TokenKind::Keyword(Keyword::Be),
                TokenKind::Number(NumberLit::Int(5)),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_string_with_escapes() {
        assert_eq!(
            kinds(r#""a \"quoted\" \\ value""#),
            vec![
                TokenKind::Indent(0),
                TokenKind::Str("a \"quoted\" \\ value".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn line_comment_consumes_rest_of_line() {
        assert_eq!(
            kinds("talk x *sidegist* trailing note\ntalk y"),
            vec![
                TokenKind::Indent(0),
                TokenKind::Keyword(Keyword::Talk),
                TokenKind::Ident("x".into()),
                TokenKind::Newline,
                TokenKind::Indent(0),
                TokenKind::Keyword(Keyword::Talk),
                TokenKind::Ident("y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn block_comment_spans_lines() {
        assert_eq!(
            kinds("talk x\n*omo*\nthis is ignored\n*omo*\ntalk y"),
            vec![
                TokenKind::Indent(0),
                TokenKind::Keyword(Keyword::Talk),
                TokenKind::Ident("x".into()),
                TokenKind::Newline,
                TokenKind::Indent(0),
                TokenKind::Keyword(Keyword::Talk),
                TokenKind::Ident("y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        assert!(Lexer::new("*omo* never closed").tokenize().is_err());
    }

    #[test]
    fn blank_lines_collapse_to_one_newline() {
        assert_eq!(
            kinds("talk x\n\n\ntalk y"),
            vec![
                TokenKind::Indent(0),
                TokenKind::Keyword(Keyword::Talk),
                TokenKind::Ident("x".into()),
                TokenKind::Newline,
                TokenKind::Indent(0),
                TokenKind::Keyword(Keyword::Talk),
                TokenKind::Ident("y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn indentation_is_recorded_for_when_bodies() {
        assert_eq!(
            kinds("when x is \"over\" lim:\n    @action talk \"fast\""),
            vec![
                TokenKind::Indent(0),
                TokenKind::Keyword(Keyword::When),
                TokenKind::Ident("x".into()),
                TokenKind::Keyword(Keyword::Is),
                TokenKind::Str("over".into()),
                TokenKind::Ident("lim".into()),
                TokenKind::Colon,
                TokenKind::Newline,
                TokenKind::Indent(4),
                TokenKind::Keyword(Keyword::AtAction),
                TokenKind::Keyword(Keyword::Talk),
                TokenKind::Str("fast".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn anchor_sigil_lexes_as_keyword() {
        assert_eq!(
            kinds("@anchor t = 100"),
            vec![
                TokenKind::Indent(0),
                TokenKind::Keyword(Keyword::AtAnchor),
                TokenKind::Ident("t".into()),
                TokenKind::Eq,
                TokenKind::Number(NumberLit::Int(100)),
                TokenKind::Eof,
            ]
        );
    }
}
