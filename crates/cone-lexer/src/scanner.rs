//! The scanner: turns UTF-8 source text into a stream of `Token`s.
//!
//! One `Scanner` per source file, mirroring the original `Lexer` struct
//! (parser/lexer.h) — this is the Rust analogue of `lexNextToken`,
//! `lexIsStmtBreak`, `lexBlockStart`/`lexBlockEnd`, generalized from a
//! single mutable global (`Lexer *lex`) to an owned, borrowable value so
//! the parser can hold one per file without a thread-local.

use crate::indent::{BlockMode, IndentStack};
use crate::keywords::{is_permission_name, lookup_keyword};
use crate::token::{LiteralValue, Token, TokenKind};
use cone_common::diagnostics::{diagnostic_codes, DiagnosticSink};
use cone_common::interner::Interner;
use cone_common::position::LineMap;
use cone_common::span::Span;
use std::path::PathBuf;

pub struct Scanner<'src> {
    src: &'src [u8],
    pos: u32,
    line_number: u32,
    line_start: u32,
    /// Indentation column (1-indexed) of the statement currently being
    /// parsed, set by the parser via `stmt_start` before each statement.
    stmt_indent: u32,
    /// Indentation column of the current physical line.
    cur_indent: u32,
    tok_pos_in_line: u32,
    indent: IndentStack,
    line_map: LineMap,
    file: PathBuf,
}

/// True if `column` dedents to or below `stmt_indent`, the rule the
/// parser uses to tell a continuation apart from a fresh statement
/// (spec §2, `lexIsStmtBreak`).
fn is_dedent_break(column: u32, stmt_indent: u32) -> bool {
    column <= stmt_indent
}

impl<'src> Scanner<'src> {
    #[must_use]
    pub fn new(source: &'src str, file: PathBuf) -> Self {
        Scanner {
            src: source.as_bytes(),
            pos: 0,
            line_number: 1,
            line_start: 0,
            stmt_indent: 0,
            cur_indent: 0,
            tok_pos_in_line: 0,
            indent: IndentStack::new(),
            line_map: LineMap::build(source),
            file,
        }
    }

    #[must_use]
    pub fn line_map(&self) -> &LineMap {
        &self.line_map
    }

    fn peek(&self) -> u8 {
        self.src.get(self.pos as usize).copied().unwrap_or(0)
    }

    fn peek_at(&self, offset: u32) -> u8 {
        self.src.get((self.pos + offset) as usize).copied().unwrap_or(0)
    }

    fn advance(&mut self) -> u8 {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn at_eof(&self) -> bool {
        self.pos as usize >= self.src.len()
    }

    /// Skips whitespace and comments, updating line/indent tracking as it
    /// goes. Returns the indentation column of the first token found.
    fn skip_trivia(&mut self) -> u32 {
        loop {
            match self.peek() {
                b' ' | b'\t' => {
                    self.pos += 1;
                }
                b'\n' => {
                    self.pos += 1;
                    self.line_number += 1;
                    self.line_start = self.pos;
                    self.line_map.push_line_start(self.pos);
                }
                b'\r' => {
                    self.pos += 1;
                }
                b'/' if self.peek_at(1) == b'/' => {
                    while !self.at_eof() && self.peek() != b'\n' {
                        self.pos += 1;
                    }
                }
                b'/' if self.peek_at(1) == b'*' => {
                    self.pos += 2;
                    while !self.at_eof() && !(self.peek() == b'*' && self.peek_at(1) == b'/') {
                        if self.peek() == b'\n' {
                            self.line_number += 1;
                            self.line_start = self.pos + 1;
                            self.line_map.push_line_start(self.pos + 1);
                        }
                        self.pos += 1;
                    }
                    self.pos = (self.pos + 2).min(self.src.len() as u32);
                }
                _ => break,
            }
        }
        self.pos - self.line_start + 1
    }

    /// Called by the parser before each new statement; records the
    /// current line indentation as the baseline for `is_stmt_break`.
    pub fn stmt_start(&mut self) {
        self.stmt_indent = self.cur_indent;
    }

    #[must_use]
    pub fn is_stmt_break(&self) -> bool {
        self.tok_pos_in_line == 0 && is_dedent_break(self.cur_indent, self.stmt_indent)
    }

    #[must_use]
    pub fn is_end_of_line(&self, prev_end: u32) -> bool {
        self.line_map.position_for(prev_end).line != self.line_map.position_for(self.pos).line
    }

    pub fn block_start(&mut self, mode: BlockMode) {
        let _ = self.indent.push(mode);
    }

    pub fn block_end(&mut self) {
        self.indent.pop();
    }

    #[must_use]
    pub fn is_block_end(&self) -> bool {
        match self.indent.top() {
            Some(BlockMode::Indented(indent)) => self.cur_indent <= indent,
            Some(BlockMode::SameLine) => self.tok_pos_in_line == 0,
            Some(BlockMode::Braced) | None => false,
        }
    }

    #[must_use]
    pub fn block_depth(&self) -> usize {
        self.indent.depth()
    }

    fn is_ident_start(c: u8) -> bool {
        c.is_ascii_alphabetic() || c == b'_'
    }

    fn is_ident_continue(c: u8) -> bool {
        c.is_ascii_alphanumeric() || c == b'_'
    }

    fn text(&self, span: Span) -> &'src str {
        std::str::from_utf8(&self.src[span.start as usize..span.end as usize]).unwrap_or("")
    }

    /// Scans and returns the next token. `interner` deduplicates
    /// identifier/string text; `diags` receives lexical errors (spec §7's
    /// accumulate-and-continue model — a bad token doesn't stop scanning).
    pub fn next_token(&mut self, interner: &mut Interner, diags: &mut DiagnosticSink) -> Token {
        let line_before = self.line_number;
        let column = self.skip_trivia();
        self.cur_indent = column;
        if line_before != self.line_number || self.pos == 0 {
            self.tok_pos_in_line = 0;
        }

        let start = self.pos;
        if self.at_eof() {
            return self.finish(TokenKind::Eof, start, LiteralValue::None);
        }

        let c = self.peek();
        let token = if Self::is_ident_start(c) {
            self.scan_ident(interner)
        } else if c.is_ascii_digit() {
            self.scan_number(diags)
        } else if c == b'"' {
            self.scan_string(diags)
        } else if c == b'\'' {
            self.scan_lifetime_or_char()
        } else if c == b'#' {
            self.scan_meta_ident(interner)
        } else if c == b'@' {
            self.scan_attr_ident(interner)
        } else {
            self.scan_punct(diags)
        };

        self.tok_pos_in_line += 1;
        token
    }

    fn finish(&self, kind: TokenKind, start: u32, value: LiteralValue) -> Token {
        let mut tok = Token::new(kind, Span::new(start, self.pos));
        tok.value = value;
        tok.pos_in_line = self.tok_pos_in_line;
        tok.stmt_break = self.is_stmt_break();
        tok
    }

    fn scan_ident(&mut self, interner: &mut Interner) -> Token {
        let start = self.pos;
        while !self.at_eof() && Self::is_ident_continue(self.peek()) {
            self.pos += 1;
        }
        let span = Span::new(start, self.pos);
        let text = self.text(span);
        if let Some(kw) = lookup_keyword(text) {
            return self.finish(kw, start, LiteralValue::None);
        }
        let atom = interner.intern(text);
        if is_permission_name(text) {
            return self.finish(TokenKind::Perm, start, LiteralValue::Name(atom));
        }
        self.finish(TokenKind::Ident, start, LiteralValue::Name(atom))
    }

    fn scan_meta_ident(&mut self, interner: &mut Interner) -> Token {
        let start = self.pos;
        self.pos += 1;
        while !self.at_eof() && Self::is_ident_continue(self.peek()) {
            self.pos += 1;
        }
        let atom = interner.intern(&self.text(Span::new(start + 1, self.pos)));
        self.finish(TokenKind::MetaIdent, start, LiteralValue::Name(atom))
    }

    fn scan_attr_ident(&mut self, interner: &mut Interner) -> Token {
        let start = self.pos;
        self.pos += 1;
        while !self.at_eof() && Self::is_ident_continue(self.peek()) {
            self.pos += 1;
        }
        let atom = interner.intern(&self.text(Span::new(start + 1, self.pos)));
        self.finish(TokenKind::AttrIdent, start, LiteralValue::Name(atom))
    }

    fn scan_lifetime_or_char(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;
        while !self.at_eof() && Self::is_ident_continue(self.peek()) {
            self.pos += 1;
        }
        self.finish(TokenKind::Lifetime, start, LiteralValue::None)
    }

    fn scan_number(&mut self, diags: &mut DiagnosticSink) -> Token {
        let start = self.pos;
        let mut is_float = false;
        while !self.at_eof() && (self.peek().is_ascii_digit() || self.peek() == b'_') {
            self.pos += 1;
        }
        if self.peek() == b'.' && self.peek_at(1).is_ascii_digit() {
            is_float = true;
            self.pos += 1;
            while !self.at_eof() && (self.peek().is_ascii_digit() || self.peek() == b'_') {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), b'e' | b'E') {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(), b'+' | b'-') {
                self.pos += 1;
            }
            while !self.at_eof() && self.peek().is_ascii_digit() {
                self.pos += 1;
            }
        }
        let span = Span::new(start, self.pos);
        let digits: String = self.text(span).chars().filter(|c| *c != '_').collect();
        if is_float {
            match digits.parse::<f64>() {
                Ok(f) => self.finish(TokenKind::FloatLit, start, LiteralValue::Float(f)),
                Err(_) => {
                    diags.report(self.file.clone(), span, diagnostic_codes::INVALID_NUMERIC_LITERAL, &[
                        &digits,
                    ]);
                    self.finish(TokenKind::FloatLit, start, LiteralValue::Float(0.0))
                }
            }
        } else {
            match digits.parse::<u64>() {
                Ok(n) => self.finish(TokenKind::IntLit, start, LiteralValue::Int(n)),
                Err(_) => {
                    diags.report(self.file.clone(), span, diagnostic_codes::INVALID_NUMERIC_LITERAL, &[
                        &digits,
                    ]);
                    self.finish(TokenKind::IntLit, start, LiteralValue::Int(0))
                }
            }
        }
    }

    fn scan_string(&mut self, diags: &mut DiagnosticSink) -> Token {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            if self.at_eof() || self.peek() == b'\n' {
                diags.report(
                    self.file.clone(),
                    Span::new(start, self.pos),
                    diagnostic_codes::UNTERMINATED_STRING,
                    &[],
                );
                break;
            }
            let c = self.advance();
            if c == b'"' {
                break;
            }
            if c == b'\\' {
                let esc = self.advance();
                value.push(match esc {
                    b'n' => '\n',
                    b't' => '\t',
                    b'r' => '\r',
                    b'0' => '\0',
                    b'\\' => '\\',
                    b'"' => '"',
                    other => other as char,
                });
            } else {
                value.push(c as char);
            }
        }
        self.finish(TokenKind::StringLit, start, LiteralValue::Str(value))
    }

    fn scan_punct(&mut self, diags: &mut DiagnosticSink) -> Token {
        let start = self.pos;
        let c = self.advance();
        macro_rules! two {
            ($second:expr, $two_kind:expr, $one_kind:expr) => {
                if self.peek() == $second {
                    self.pos += 1;
                    self.finish($two_kind, start, LiteralValue::None)
                } else {
                    self.finish($one_kind, start, LiteralValue::None)
                }
            };
        }
        match c {
            b';' => self.finish(TokenKind::Semi, start, LiteralValue::None),
            b':' => {
                if self.peek() == b':' {
                    self.pos += 1;
                    self.finish(TokenKind::DblColon, start, LiteralValue::None)
                } else {
                    self.finish(TokenKind::Colon, start, LiteralValue::None)
                }
            }
            b'{' => self.finish(TokenKind::LCurly, start, LiteralValue::None),
            b'}' => self.finish(TokenKind::RCurly, start, LiteralValue::None),
            b'[' => self.finish(TokenKind::LBracket, start, LiteralValue::None),
            b']' => self.finish(TokenKind::RBracket, start, LiteralValue::None),
            b'(' => self.finish(TokenKind::LParen, start, LiteralValue::None),
            b')' => self.finish(TokenKind::RParen, start, LiteralValue::None),
            b',' => self.finish(TokenKind::Comma, start, LiteralValue::None),
            b'.' => self.finish(TokenKind::Dot, start, LiteralValue::None),
            b'?' => {
                if self.peek() == b'.' {
                    self.pos += 1;
                    self.finish(TokenKind::QuesDot, start, LiteralValue::None)
                } else {
                    self.finish(TokenKind::Ques, start, LiteralValue::None)
                }
            }
            b'+' => {
                if self.peek() == b'+' {
                    self.pos += 1;
                    self.finish(TokenKind::Incr, start, LiteralValue::None)
                } else {
                    two!(b'=', TokenKind::PlusEq, TokenKind::Plus)
                }
            }
            b'-' => {
                if self.peek() == b'-' {
                    self.pos += 1;
                    self.finish(TokenKind::Decr, start, LiteralValue::None)
                } else if self.peek() == b'=' {
                    self.pos += 1;
                    self.finish(TokenKind::MinusEq, start, LiteralValue::None)
                } else {
                    self.finish(TokenKind::Dash, start, LiteralValue::None)
                }
            }
            b'*' => two!(b'=', TokenKind::MultEq, TokenKind::Star),
            b'%' => two!(b'=', TokenKind::RemEq, TokenKind::Percent),
            b'/' => two!(b'=', TokenKind::DivEq, TokenKind::Slash),
            b'&' => two!(b'=', TokenKind::AndEq, TokenKind::Amper),
            b'|' => two!(b'=', TokenKind::OrEq, TokenKind::Bar),
            b'^' => two!(b'=', TokenKind::XorEq, TokenKind::Caret),
            b'!' => two!(b'=', TokenKind::Ne, TokenKind::Not),
            b'~' => self.finish(TokenKind::Tilde, start, LiteralValue::None),
            b'=' => two!(b'=', TokenKind::Eq, TokenKind::Assgn),
            b'<' => {
                if self.peek() == b'-' {
                    self.pos += 1;
                    self.finish(TokenKind::LessDash, start, LiteralValue::None)
                } else if self.peek() == b'=' {
                    self.pos += 1;
                    self.finish(TokenKind::Le, start, LiteralValue::None)
                } else if self.peek() == b'<' {
                    self.pos += 1;
                    if self.peek() == b'=' {
                        self.pos += 1;
                        self.finish(TokenKind::ShlEq, start, LiteralValue::None)
                    } else {
                        self.finish(TokenKind::Shl, start, LiteralValue::None)
                    }
                } else {
                    self.finish(TokenKind::Lt, start, LiteralValue::None)
                }
            }
            b'>' => {
                if self.peek() == b'=' {
                    self.pos += 1;
                    self.finish(TokenKind::Ge, start, LiteralValue::None)
                } else if self.peek() == b'>' {
                    self.pos += 1;
                    if self.peek() == b'=' {
                        self.pos += 1;
                        self.finish(TokenKind::ShrEq, start, LiteralValue::None)
                    } else {
                        self.finish(TokenKind::Shr, start, LiteralValue::None)
                    }
                } else {
                    self.finish(TokenKind::Gt, start, LiteralValue::None)
                }
            }
            other => {
                diags.report(
                    self.file.clone(),
                    Span::new(start, self.pos),
                    diagnostic_codes::UNEXPECTED_CHAR,
                    &[&(other as char).to_string()],
                );
                self.finish(TokenKind::Eof, start, LiteralValue::None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(src: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(src, PathBuf::from("test.cone"));
        let mut interner = Interner::new();
        let mut diags = DiagnosticSink::new();
        let mut out = Vec::new();
        loop {
            let tok = scanner.next_token(&mut interner, &mut diags);
            let done = tok.kind == TokenKind::Eof;
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn scans_keywords_and_punctuation() {
        let kinds = scan_all("fn main() {}");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Fn,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LCurly,
                TokenKind::RCurly,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scans_permission_identifier_distinctly() {
        let kinds = scan_all("uni x");
        assert_eq!(kinds, vec![TokenKind::Perm, TokenKind::Ident, TokenKind::Eof]);
    }

    #[test]
    fn scans_numeric_literals() {
        let mut scanner = Scanner::new("42 3.14", PathBuf::from("t.cone"));
        let mut interner = Interner::new();
        let mut diags = DiagnosticSink::new();
        let a = scanner.next_token(&mut interner, &mut diags);
        assert_eq!(a.kind, TokenKind::IntLit);
        assert_eq!(a.value, LiteralValue::Int(42));
        let b = scanner.next_token(&mut interner, &mut diags);
        assert_eq!(b.kind, TokenKind::FloatLit);
        assert_eq!(b.value, LiteralValue::Float(3.14));
    }

    #[test]
    fn scans_compound_operators() {
        let kinds = scan_all("a <<= b >> c += 1");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::ShlEq,
                TokenKind::Ident,
                TokenKind::Shr,
                TokenKind::Ident,
                TokenKind::PlusEq,
                TokenKind::IntLit,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_diagnostic() {
        let mut scanner = Scanner::new("\"abc", PathBuf::from("t.cone"));
        let mut interner = Interner::new();
        let mut diags = DiagnosticSink::new();
        let tok = scanner.next_token(&mut interner, &mut diags);
        assert_eq!(tok.kind, TokenKind::StringLit);
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn block_stack_tracks_sig_indent_dedent() {
        let mut scanner = Scanner::new("x", PathBuf::from("t.cone"));
        scanner.cur_indent = 5;
        scanner.block_start(BlockMode::Indented(5));
        assert!(!scanner.is_block_end());
        scanner.cur_indent = 3;
        assert!(scanner.is_block_end());
    }
}
