//! Parser core: token navigation and error recovery.
//!
//! `Parser` pairs a `cone_lexer::Scanner` with one token of lookahead,
//! mirroring the global `Lexer *lex` + `lex->toktype` pattern the original
//! parser reads everywhere (parser/parsehelper.c) but packaged as an
//! ordinary struct instead of a global.

use cone_common::diagnostics::{diagnostic_codes, DiagnosticSink};
use cone_common::span::{Span, SpanBuilder};
use cone_ir::Program;
use cone_lexer::{BlockMode, Scanner, Token, TokenKind};
use std::path::PathBuf;

pub struct Parser<'p, 'src> {
    pub(crate) scanner: Scanner<'src>,
    pub(crate) cur: Token,
    pub(crate) prev_end: u32,
    pub(crate) program: &'p mut Program,
    pub(crate) diags: &'p mut DiagnosticSink,
    pub(crate) file: PathBuf,
}

impl<'p, 'src> Parser<'p, 'src> {
    pub fn new(
        source: &'src str,
        file: PathBuf,
        program: &'p mut Program,
        diags: &'p mut DiagnosticSink,
    ) -> Self {
        let mut scanner = Scanner::new(source, file.clone());
        let cur = scanner.next_token(&mut program.interner, diags);
        Parser { scanner, cur, prev_end: 0, program, diags, file }
    }

    pub(crate) fn span_start(&self) -> SpanBuilder {
        SpanBuilder::start(self.cur.span.start)
    }

    pub(crate) fn span_end(&self, b: SpanBuilder) -> Span {
        b.end(self.prev_end)
    }

    pub(crate) fn bump(&mut self) -> Token {
        self.prev_end = self.cur.span.end;
        let next = self.scanner.next_token(&mut self.program.interner, self.diags);
        std::mem::replace(&mut self.cur, next)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) {
        if !self.eat(kind) {
            let found = format!("{:?}", self.cur.kind);
            self.diags.report(
                self.file.clone(),
                self.cur.span,
                diagnostic_codes::EXPECTED_TOKEN,
                &[what, &found],
            );
        }
    }

    pub(crate) fn is_stmt_break(&self) -> bool {
        self.cur.stmt_break
    }

    pub(crate) fn stmt_start(&mut self) {
        self.scanner.stmt_start();
    }

    /// Recovers from a malformed statement by skipping to the next `;`,
    /// end-of-line, `}`, or EOF (parser/parsehelper.c's
    /// `parseSkipToNextStmt`, generalized since Rust has no goto-style
    /// early-exit macro to lean on).
    pub(crate) fn skip_to_next_stmt(&mut self) {
        loop {
            match self.cur.kind {
                TokenKind::Semi => {
                    self.bump();
                    return;
                }
                TokenKind::Eof | TokenKind::RCurly => return,
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// Consumes a statement's block-start token (`{` or `:`) and tells
    /// the scanner which block mode to track (parsehelper.c's
    /// `parseBlockStart`).
    pub(crate) fn block_start(&mut self) -> BlockMode {
        if self.eat(TokenKind::LCurly) {
            self.scanner.block_start(BlockMode::Braced);
            BlockMode::Braced
        } else if self.eat(TokenKind::Colon) {
            let mode = if self.scanner.is_end_of_line(self.prev_end) {
                BlockMode::Indented(self.scanner.block_depth() as u32)
            } else {
                BlockMode::SameLine
            };
            self.scanner.block_start(mode);
            mode
        } else {
            self.diags.report(
                self.file.clone(),
                self.cur.span,
                diagnostic_codes::EXPECTED_BLOCK,
                &["':' or '{'"],
            );
            BlockMode::SameLine
        }
    }

    pub(crate) fn block_end(&mut self, mode: BlockMode) {
        match mode {
            BlockMode::Braced => {
                self.expect(TokenKind::RCurly, "'}'");
            }
            BlockMode::Indented(_) | BlockMode::SameLine => {}
        }
        self.scanner.block_end();
    }

    pub(crate) fn at_block_end(&self, mode: BlockMode) -> bool {
        match mode {
            BlockMode::Braced => self.at(TokenKind::RCurly) || self.at(TokenKind::Eof),
            BlockMode::Indented(_) => self.scanner.is_block_end() || self.at(TokenKind::Eof),
            BlockMode::SameLine => {
                self.is_stmt_break() || self.at(TokenKind::Semi) || self.at(TokenKind::Eof)
            }
        }
    }
}
