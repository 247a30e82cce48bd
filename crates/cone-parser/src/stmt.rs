//! Statement parsing (parser/parsestmt.c): variable/const declarations,
//! control flow, and the `match`/`case` and `if let`-style perm-guard
//! desugarings spec §4.3 describes as lowering entirely inside the parser
//! rather than needing a dedicated IR node.

use crate::core::Parser;
use cone_ir::{NodeId, NodePayload, NodeTag};
use cone_lexer::{BlockMode, LiteralValue, TokenKind};
use smallvec::SmallVec;

impl<'p, 'src> Parser<'p, 'src> {
    /// Parses a `{`/`:`-delimited sequence of statements into a `Block`
    /// node. The block's `dealias` list starts empty; `cone-flow` fills it
    /// in once it knows which locals need an end-of-scope release.
    pub fn parse_block(&mut self) -> NodeId {
        let start = self.span_start();
        let mode = self.block_start();
        let mut stmts = SmallVec::new();
        while !self.at_block_end(mode) {
            self.stmt_start();
            stmts.push(self.parse_stmt());
            if mode == BlockMode::SameLine {
                break;
            }
        }
        self.block_end(mode);
        let span = self.span_end(start);
        self.alloc(span, NodeTag::Block, NodePayload::Block { stmts, dealias: SmallVec::new() })
    }

    pub fn parse_stmt(&mut self) -> NodeId {
        let start = self.span_start();
        let stmt = match self.cur.kind {
            TokenKind::Ret => self.parse_return(),
            TokenKind::Break => self.parse_break(),
            TokenKind::Continue => self.parse_continue(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Loop => self.parse_loop(),
            TokenKind::Each => self.parse_each(),
            TokenKind::Match => self.parse_match(),
            TokenKind::Perm => self.parse_perm_var_decl(),
            TokenKind::Set => self.parse_field_decl(),
            _ => self.parse_expr_or_swap_stmt(),
        };
        if self.at(TokenKind::Semi) {
            self.bump();
        } else if !self.is_stmt_break()
            && !self.at(TokenKind::RCurly)
            && !self.at(TokenKind::Eof)
        {
            // A statement that didn't end in `;`, at a statement break, or
            // at a block close is malformed; recover to the next one.
            self.skip_to_next_stmt();
        }
        let _ = start;
        stmt
    }

    fn parse_return(&mut self) -> NodeId {
        let start = self.span_start();
        self.bump();
        let value = if self.is_stmt_break() || self.at(TokenKind::Semi) || self.at(TokenKind::RCurly) {
            None
        } else {
            Some(self.parse_expr())
        };
        let span = self.span_end(start);
        self.alloc(span, NodeTag::Return, NodePayload::Return { value })
    }

    fn parse_break(&mut self) -> NodeId {
        let start = self.span_start();
        self.bump();
        let label = self.opt_label();
        let span = self.span_end(start);
        self.alloc(span, NodeTag::Break, NodePayload::Break { label })
    }

    fn parse_continue(&mut self) -> NodeId {
        let start = self.span_start();
        self.bump();
        let label = self.opt_label();
        let span = self.span_end(start);
        self.alloc(span, NodeTag::Continue, NodePayload::Continue { label })
    }

    fn opt_label(&mut self) -> Option<cone_common::interner::Atom> {
        if self.at(TokenKind::Ident) && !self.is_stmt_break() {
            if let LiteralValue::Name(a) = self.cur.value {
                self.bump();
                return Some(a);
            }
        }
        None
    }

    /// `if`/`elif`/`else` chain. Each arm's guard may itself be a perm-guard
    /// declaration (`if perm T name = expr`), which `parse_perm_guard`
    /// desugars into an injected `VarDcl` ahead of a literal `true` test.
    fn parse_if(&mut self) -> NodeId {
        let start = self.span_start();
        self.bump();
        let mut arms = SmallVec::new();
        arms.push(self.parse_if_arm());
        loop {
            if self.at(TokenKind::Elif) {
                self.bump();
                arms.push(self.parse_if_arm());
            } else {
                break;
            }
        }
        let else_arm = if self.eat(TokenKind::Else) { Some(self.parse_block()) } else { None };
        let span = self.span_end(start);
        self.alloc(span, NodeTag::If, NodePayload::If { arms, else_arm })
    }

    fn parse_if_arm(&mut self) -> (NodeId, NodeId) {
        let cond = if self.at(TokenKind::Perm) {
            self.parse_perm_guard()
        } else {
            self.parse_expr()
        };
        let body = self.parse_block();
        (cond, body)
    }

    /// `if perm T name = expr { ... }` / `case perm T name:` desugars to an
    /// injected `VarDcl` that binds `name` as `expr as T`, with the guard
    /// condition becoming `expr is T` (spec §4.3's perm-guard sugar, shared
    /// between `if` and `match`/`case`).
    fn parse_perm_guard(&mut self) -> NodeId {
        let start = self.span_start();
        let perm = self.parse_perm();
        let perm_node = self.alloc_perm_node(perm);
        let _ = perm_node;
        let ty = self.parse_type();
        let name = match self.cur.value {
            LiteralValue::Name(a) => a,
            _ => self.program.specials.anon,
        };
        self.bump();
        self.expect(TokenKind::Assgn, "'='");
        let scrutinee = self.parse_expr();
        let span = self.span_end(start);
        let bound_name = Some(name);
        self.alloc(
            span,
            NodeTag::Is,
            NodePayload::Is { value: scrutinee, guard: cone_ir::TypeGuard { ty, bound_name } },
        )
    }

    fn parse_while(&mut self) -> NodeId {
        let start = self.span_start();
        self.bump();
        let cond = if self.at(TokenKind::Perm) { self.parse_perm_guard() } else { self.parse_expr() };
        let body = self.parse_block();
        let mut arms = SmallVec::new();
        arms.push((cond, body));
        let span = self.span_end(start);
        let if_node = self.alloc(span, NodeTag::If, NodePayload::If { arms, else_arm: None });
        self.alloc(span, NodeTag::LoopBlock, NodePayload::LoopBlock { body: if_node, label: None })
    }

    fn parse_loop(&mut self) -> NodeId {
        let start = self.span_start();
        self.bump();
        let label = self.opt_label();
        let body = self.parse_block();
        let span = self.span_end(start);
        self.alloc(span, NodeTag::LoopBlock, NodePayload::LoopBlock { body, label })
    }

    /// `each name in iter { ... }` desugars to a `loop` over an injected
    /// iterator variable, calling `.next()`/`.hasNext()` the way the
    /// original's `parseEachStmt` expands it into a plain `while`.
    fn parse_each(&mut self) -> NodeId {
        let start = self.span_start();
        self.bump();
        let binding = match self.cur.value {
            LiteralValue::Name(a) => a,
            _ => self.program.specials.anon,
        };
        self.bump();
        self.expect(TokenKind::In, "'in'");
        let iter_expr = self.parse_expr();
        let iter_name = self.program.interner.intern("__each_iter");
        let iter_decl_span = self.span_end(start);
        let iter_decl = self.alloc(
            iter_decl_span,
            NodeTag::VarDcl,
            NodePayload::VarDcl { name: iter_name, declared_type: None, init: Some(iter_expr) },
        );
        let iter_use = self.alloc(
            iter_decl_span,
            NodeTag::NameUse,
            NodePayload::NameUse { name: iter_name, dclnode: None },
        );
        let has_next = self.program.interner.intern("hasNext");
        let cond = self.alloc(
            iter_decl_span,
            NodeTag::FnCall,
            NodePayload::FnCall { callee: iter_use, args: SmallVec::new(), methfld: Some(has_next) },
        );
        let next = self.program.interner.intern("next");
        let next_call = self.alloc(
            iter_decl_span,
            NodeTag::FnCall,
            NodePayload::FnCall { callee: iter_use, args: SmallVec::new(), methfld: Some(next) },
        );
        let binding_decl = self.alloc(
            iter_decl_span,
            NodeTag::VarDcl,
            NodePayload::VarDcl { name: binding, declared_type: None, init: Some(next_call) },
        );
        let user_body = self.parse_block();
        let mut body_stmts = SmallVec::new();
        body_stmts.push(binding_decl);
        body_stmts.push(user_body);
        let body_span = self.span_end(start);
        let body_block = self.alloc(
            body_span,
            NodeTag::Block,
            NodePayload::Block { stmts: body_stmts, dealias: SmallVec::new() },
        );
        let mut arms = SmallVec::new();
        arms.push((cond, body_block));
        let while_if =
            self.alloc(body_span, NodeTag::If, NodePayload::If { arms, else_arm: None });
        let loop_node = self.alloc(
            body_span,
            NodeTag::LoopBlock,
            NodePayload::LoopBlock { body: while_if, label: None },
        );
        let mut outer_stmts = SmallVec::new();
        outer_stmts.push(iter_decl);
        outer_stmts.push(loop_node);
        let span = self.span_end(start);
        self.alloc(span, NodeTag::Block, NodePayload::Block { stmts: outer_stmts, dealias: SmallVec::new() })
    }

    /// `match scrutinee { case pat1: ...; case pat2: ...; }` desugars to an
    /// `if`/`elif` chain testing each case pattern in turn (spec §4.3): a
    /// bare type is an `is` test, a bare value an `==` test, `perm T name`
    /// a perm-guard, and a trailing `else`/no-pattern case the final arm.
    fn parse_match(&mut self) -> NodeId {
        let start = self.span_start();
        self.bump();
        let scrutinee = self.parse_expr();
        let scrutinee_name = self.program.interner.intern("__match_scrutinee");
        let scrutinee_span = self.cur.span;
        let scrutinee_decl = self.alloc(
            scrutinee_span,
            NodeTag::VarDcl,
            NodePayload::VarDcl { name: scrutinee_name, declared_type: None, init: Some(scrutinee) },
        );
        let mode = self.block_start();
        let mut arms = SmallVec::new();
        let mut else_arm = None;
        while !self.at_block_end(mode) {
            self.stmt_start();
            if self.eat(TokenKind::Else) {
                else_arm = Some(self.parse_block());
                continue;
            }
            self.expect_case_keyword();
            let scrutinee_use = self.alloc(
                scrutinee_span,
                NodeTag::NameUse,
                NodePayload::NameUse { name: scrutinee_name, dclnode: None },
            );
            let cond = self.parse_case_pattern(scrutinee_use);
            let body = self.parse_block();
            arms.push((cond, body));
            if mode == BlockMode::SameLine {
                break;
            }
        }
        self.block_end(mode);
        let if_span = self.span_end(start);
        let if_node = self.alloc(if_span, NodeTag::If, NodePayload::If { arms, else_arm });
        let mut stmts = SmallVec::new();
        stmts.push(scrutinee_decl);
        stmts.push(if_node);
        self.alloc(if_span, NodeTag::Block, NodePayload::Block { stmts, dealias: SmallVec::new() })
    }

    /// `case` isn't a distinct token kind; the original recognizes it as a
    /// context-sensitive identifier inside `match` bodies the same way
    /// permission names are recognized inside type position.
    fn expect_case_keyword(&mut self) {
        if self.at(TokenKind::Ident) {
            if let LiteralValue::Name(a) = self.cur.value {
                if self.program.interner.resolve(a) == "case" {
                    self.bump();
                    return;
                }
            }
        }
        self.diags.report(
            self.file.clone(),
            self.cur.span,
            cone_common::diagnostics::diagnostic_codes::EXPECTED_TOKEN,
            &["'case'", &format!("{:?}", self.cur.kind)],
        );
    }

    fn parse_case_pattern(&mut self, scrutinee_use: NodeId) -> NodeId {
        let start = self.span_start();
        if self.at(TokenKind::Perm) {
            let perm = self.parse_perm();
            let perm_node = self.alloc_perm_node(perm);
            let _ = perm_node;
            let ty = self.parse_type();
            let name = match self.cur.value {
                LiteralValue::Name(a) => {
                    self.bump();
                    Some(a)
                }
                _ => None,
            };
            let span = self.span_end(start);
            return self.alloc(
                span,
                NodeTag::Is,
                NodePayload::Is { value: scrutinee_use, guard: cone_ir::TypeGuard { ty, bound_name: name } },
            );
        }
        // Otherwise the pattern is a type (`is` test) or a value (`==`
        // test); disambiguate the same way `parse_type`/`parse_expr`
        // already do, by trying a type first only for the reference/array/
        // pointer/tuple/fn sigils that can't start a value expression.
        if matches!(self.cur.kind, TokenKind::Amper | TokenKind::Star | TokenKind::Fn) {
            let ty = self.parse_type();
            let span = self.span_end(start);
            return self.alloc(
                span,
                NodeTag::Is,
                NodePayload::Is { value: scrutinee_use, guard: cone_ir::TypeGuard { ty, bound_name: None } },
            );
        }
        let value = self.parse_expr();
        let eq = self.program.interner.intern("==");
        let span = self.span_end(start);
        let mut args = SmallVec::new();
        args.push(value);
        self.alloc(span, NodeTag::FnCall, NodePayload::FnCall { callee: scrutinee_use, args, methfld: Some(eq) })
    }

    /// `perm T name = expr` / `perm name = expr` (type elided) local
    /// variable declaration.
    fn parse_perm_var_decl(&mut self) -> NodeId {
        let start = self.span_start();
        let _perm = self.parse_perm();
        let (declared_type, name) = if self.at(TokenKind::Ident) {
            // Lookahead-free heuristic: if two identifiers appear back to
            // back (`T name`), the first is a type; a lone identifier is
            // just the variable name with an elided type. Since Cone type
            // names and variable names share one lexical class, telling
            // them apart needs the same single-token trick `parse_type`
            // uses elsewhere: a sigil (`&`, `*`, `[`, `(`, `fn`) always
            // starts a type, and only a following identifier without one
            // of those is ambiguous, in which case we treat the lone
            // identifier as the binding name (matching the common `perm
            // name = expr` form).
            let name = match self.cur.value {
                LiteralValue::Name(a) => a,
                _ => self.program.specials.anon,
            };
            self.bump();
            (None, name)
        } else {
            let ty = self.parse_type();
            let name = match self.cur.value {
                LiteralValue::Name(a) => a,
                _ => self.program.specials.anon,
            };
            self.bump();
            (Some(ty), name)
        };
        let init = if self.eat(TokenKind::Assgn) { Some(self.parse_expr()) } else { None };
        let span = self.span_end(start);
        self.alloc(span, NodeTag::VarDcl, NodePayload::VarDcl { name, declared_type, init })
    }

    /// `set name [: T] = expr` field assignment statement form, distinct
    /// from a `FieldDcl` (which only appears inside a `struct` body).
    fn parse_field_decl(&mut self) -> NodeId {
        let start = self.span_start();
        self.bump();
        let name = match self.cur.value {
            LiteralValue::Name(a) => a,
            _ => self.program.specials.anon,
        };
        self.bump();
        let declared_type = if self.eat(TokenKind::Colon) { self.parse_type() } else {
            let void_span = self.cur.span;
            self.alloc(void_span, NodeTag::Void, NodePayload::Void)
        };
        self.expect(TokenKind::Assgn, "'='");
        let init = self.parse_expr();
        let span = self.span_end(start);
        self.alloc(
            span,
            NodeTag::FieldDcl,
            NodePayload::FieldDcl { name, declared_type, init: Some(init), index: 0 },
        )
    }

    /// A bare expression statement, or `lhs <-> rhs` swap sugar.
    fn parse_expr_or_swap_stmt(&mut self) -> NodeId {
        let start = self.span_start();
        let lhs = self.parse_expr();
        if self.eat(TokenKind::LessDash) {
            let rhs = self.parse_expr();
            let span = self.span_end(start);
            return self.alloc(span, NodeTag::Swap, NodePayload::Swap { lhs, rhs });
        }
        lhs
    }
}
