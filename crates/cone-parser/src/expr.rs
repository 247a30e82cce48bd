//! Expression parsing (parser/parseexpr.c), precedence low to high:
//! assignment, tuple comma, `or`, `and`, `not`, comparison (incl. `is`),
//! bitwise `|`/`^`/`&`, shift, additive, multiplicative, cast
//! (`as`/`into`), prefix, postfix, call suffixes, primary.

use crate::core::Parser;
use cone_ir::{LogicOp, NodeId, NodePayload, NodeTag, TypeGuard};
use cone_lexer::{LiteralValue, TokenKind};
use smallvec::SmallVec;

impl<'p, 'src> Parser<'p, 'src> {
    pub fn parse_expr(&mut self) -> NodeId {
        self.parse_assign()
    }

    fn parse_assign(&mut self) -> NodeId {
        let start = self.span_start();
        let lhs = self.parse_tuple();
        let op_name = match self.cur.kind {
            TokenKind::Assgn => None,
            TokenKind::PlusEq => Some("+"),
            TokenKind::MinusEq => Some("-"),
            TokenKind::MultEq => Some("*"),
            TokenKind::DivEq => Some("/"),
            TokenKind::RemEq => Some("%"),
            TokenKind::OrEq => Some("|"),
            TokenKind::AndEq => Some("&"),
            TokenKind::XorEq => Some("^"),
            TokenKind::ShlEq => Some("<<"),
            TokenKind::ShrEq => Some(">>"),
            _ => return lhs,
        };
        self.bump();
        let rhs = self.parse_assign();
        let span = self.span_end(start);
        match op_name {
            None => self.alloc(span, NodeTag::Assign, NodePayload::Assign { lval: lhs, rval: rhs }),
            Some(op) => {
                // Compound assignment desugars to `lhs.op(rhs)` with the
                // `OP_ASSGN`/`LVAL_OP` flags (spec §4.3).
                let op_atom = self.program.interner.intern(op);
                let mut args = SmallVec::new();
                args.push(rhs);
                let call = self.alloc(
                    span,
                    NodeTag::FnCall,
                    NodePayload::FnCall { callee: lhs, args, methfld: Some(op_atom) },
                );
                self.program.arena.get_mut(call).flags |=
                    cone_ir::NodeFlags::OP_ASSGN | cone_ir::NodeFlags::LVAL_OP;
                call
            }
        }
    }

    fn parse_tuple(&mut self) -> NodeId {
        let start = self.span_start();
        let first = self.parse_or();
        if !self.at(TokenKind::Comma) {
            return first;
        }
        let mut elements = SmallVec::new();
        elements.push(first);
        while self.eat(TokenKind::Comma) {
            elements.push(self.parse_or());
        }
        let span = self.span_end(start);
        self.alloc(span, NodeTag::VTuple, NodePayload::VTuple { elements })
    }

    fn parse_or(&mut self) -> NodeId {
        let start = self.span_start();
        let mut lhs = self.parse_and();
        while self.at(TokenKind::Or) {
            self.bump();
            let rhs = self.parse_and();
            let span = self.span_end(start);
            let mut operands = SmallVec::new();
            operands.push(lhs);
            operands.push(rhs);
            lhs = self.alloc(span, NodeTag::Logic, NodePayload::Logic { op: LogicOp::Or, operands });
        }
        lhs
    }

    fn parse_and(&mut self) -> NodeId {
        let start = self.span_start();
        let mut lhs = self.parse_not();
        while self.at(TokenKind::And) {
            self.bump();
            let rhs = self.parse_not();
            let span = self.span_end(start);
            let mut operands = SmallVec::new();
            operands.push(lhs);
            operands.push(rhs);
            lhs = self.alloc(span, NodeTag::Logic, NodePayload::Logic { op: LogicOp::And, operands });
        }
        lhs
    }

    fn parse_not(&mut self) -> NodeId {
        if self.at(TokenKind::Not) {
            let start = self.span_start();
            self.bump();
            let value = self.parse_not();
            let span = self.span_end(start);
            let mut operands = SmallVec::new();
            operands.push(value);
            return self.alloc(span, NodeTag::Logic, NodePayload::Logic { op: LogicOp::Not, operands });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> NodeId {
        let start = self.span_start();
        let lhs = self.parse_bitor();
        let op = match self.cur.kind {
            TokenKind::Eq => Some("=="),
            TokenKind::Ne => Some("!="),
            TokenKind::Lt => Some("<"),
            TokenKind::Le => Some("<="),
            TokenKind::Gt => Some(">"),
            TokenKind::Ge => Some(">="),
            TokenKind::Is => None,
            _ => return lhs,
        };
        if self.at(TokenKind::Is) {
            self.bump();
            let ty = self.parse_type();
            let bound_name = if self.at(TokenKind::Ident) {
                if let LiteralValue::Name(a) = self.cur.value {
                    self.bump();
                    Some(a)
                } else {
                    None
                }
            } else {
                None
            };
            let span = self.span_end(start);
            return self.alloc(
                span,
                NodeTag::Is,
                NodePayload::Is { value: lhs, guard: TypeGuard { ty, bound_name } },
            );
        }
        let op = op.expect("non-Is comparison token has an operator spelling");
        self.bump();
        let rhs = self.parse_bitor();
        self.binary_call(start, lhs, op, rhs)
    }

    fn parse_bitor(&mut self) -> NodeId {
        self.binary_chain(Self::parse_bitxor, &[(TokenKind::Bar, "|")])
    }
    fn parse_bitxor(&mut self) -> NodeId {
        self.binary_chain(Self::parse_bitand, &[(TokenKind::Caret, "^")])
    }
    fn parse_bitand(&mut self) -> NodeId {
        self.binary_chain(Self::parse_shift, &[(TokenKind::Amper, "&")])
    }
    fn parse_shift(&mut self) -> NodeId {
        self.binary_chain(Self::parse_additive, &[(TokenKind::Shl, "<<"), (TokenKind::Shr, ">>")])
    }
    fn parse_additive(&mut self) -> NodeId {
        self.binary_chain(Self::parse_multiplicative, &[
            (TokenKind::Plus, "+"),
            (TokenKind::Dash, "-"),
        ])
    }
    fn parse_multiplicative(&mut self) -> NodeId {
        self.binary_chain(Self::parse_cast, &[
            (TokenKind::Star, "*"),
            (TokenKind::Slash, "/"),
            (TokenKind::Percent, "%"),
        ])
    }

    fn binary_chain(
        &mut self,
        mut next: impl FnMut(&mut Self) -> NodeId,
        ops: &[(TokenKind, &'static str)],
    ) -> NodeId {
        let start = self.span_start();
        let mut lhs = next(self);
        'outer: loop {
            for &(tok, name) in ops {
                if self.at(tok) {
                    self.bump();
                    let rhs = next(self);
                    lhs = self.binary_call(start, lhs, name, rhs);
                    continue 'outer;
                }
            }
            break;
        }
        lhs
    }

    /// Every binary operator other than assignment/logic/`is` lowers to a
    /// method call on the left operand (spec §4.4's "fixed suite of
    /// operator/intrinsic methods").
    fn binary_call(
        &mut self,
        start: cone_common::span::SpanBuilder,
        lhs: NodeId,
        op: &str,
        rhs: NodeId,
    ) -> NodeId {
        let op_atom = self.program.interner.intern(op);
        let span = self.span_end(start);
        let mut args = SmallVec::new();
        args.push(rhs);
        self.alloc(span, NodeTag::FnCall, NodePayload::FnCall { callee: lhs, args, methfld: Some(op_atom) })
    }

    fn parse_cast(&mut self) -> NodeId {
        let start = self.span_start();
        let mut value = self.parse_prefix();
        loop {
            let reinterpret = if self.at(TokenKind::As) {
                false
            } else if self.at(TokenKind::Into) {
                true
            } else {
                break;
            };
            self.bump();
            let target = self.parse_type();
            let span = self.span_end(start);
            value = self.alloc(span, NodeTag::Cast, NodePayload::Cast { value, target, reinterpret });
        }
        value
    }

    fn parse_prefix(&mut self) -> NodeId {
        let start = self.span_start();
        match self.cur.kind {
            TokenKind::Dash => {
                self.bump();
                let value = self.parse_prefix();
                let neg = self.program.interner.intern("neg");
                let span = self.span_end(start);
                self.alloc(span, NodeTag::FnCall, NodePayload::FnCall {
                    callee: value,
                    args: SmallVec::new(),
                    methfld: Some(neg),
                })
            }
            TokenKind::Tilde => {
                self.bump();
                let value = self.parse_prefix();
                let not_atom = self.program.interner.intern("~");
                let span = self.span_end(start);
                self.alloc(span, NodeTag::FnCall, NodePayload::FnCall {
                    callee: value,
                    args: SmallVec::new(),
                    methfld: Some(not_atom),
                })
            }
            TokenKind::Star => {
                self.bump();
                let value = self.parse_prefix();
                let span = self.span_end(start);
                self.alloc(span, NodeTag::Deref, NodePayload::Deref { value })
            }
            TokenKind::Amper => {
                self.bump();
                let value = self.parse_prefix();
                let span = self.span_end(start);
                self.alloc(span, NodeTag::Borrow, NodePayload::Borrow { value })
            }
            TokenKind::Incr | TokenKind::Decr => {
                let op = if self.cur.kind == TokenKind::Incr { "_++" } else { "_--" };
                self.bump();
                let value = self.parse_prefix();
                self.binary_call_unary(start, value, op)
            }
            // Prefix sugar: a leading `.method`, `<<`, or `>>` implicitly
            // operates on `this` (spec §4.3).
            TokenKind::Dot => {
                self.bump();
                let this_span = self.cur.span;
                let this = self.alloc(
                    this_span,
                    NodeTag::NameUse,
                    NodePayload::NameUse { name: self.program.specials.this, dclnode: None },
                );
                self.parse_postfix_from(start, this)
            }
            TokenKind::Shl | TokenKind::Shr => {
                let op = if self.cur.kind == TokenKind::Shl { "<<" } else { ">>" };
                self.bump();
                let this_span = self.cur.span;
                let this = self.alloc(
                    this_span,
                    NodeTag::NameUse,
                    NodePayload::NameUse { name: self.program.specials.this, dclnode: None },
                );
                let rhs = self.parse_prefix();
                self.binary_call(start, this, op, rhs)
            }
            _ => self.parse_postfix(),
        }
    }

    fn binary_call_unary(
        &mut self,
        start: cone_common::span::SpanBuilder,
        value: NodeId,
        op: &str,
    ) -> NodeId {
        let op_atom = self.program.interner.intern(op);
        let span = self.span_end(start);
        self.alloc(span, NodeTag::FnCall, NodePayload::FnCall {
            callee: value,
            args: SmallVec::new(),
            methfld: Some(op_atom),
        })
    }

    fn parse_postfix(&mut self) -> NodeId {
        let start = self.span_start();
        let primary = self.parse_primary();
        self.parse_postfix_from(start, primary)
    }

    fn parse_postfix_from(&mut self, start: cone_common::span::SpanBuilder, mut value: NodeId) -> NodeId {
        loop {
            match self.cur.kind {
                TokenKind::Dot => {
                    self.bump();
                    let field = match self.cur.value.clone() {
                        LiteralValue::Name(a) => a,
                        _ => {
                            self.diags.report(
                                self.file.clone(),
                                self.cur.span,
                                cone_common::diagnostics::diagnostic_codes::UNEXPECTED_TOKEN,
                                &["identifier after '.'"],
                            );
                            self.program.specials.anon
                        }
                    };
                    self.bump();
                    let span = self.span_end(start);
                    let mut args = SmallVec::new();
                    if self.at(TokenKind::LParen) {
                        self.bump();
                        if !self.at(TokenKind::RParen) {
                            loop {
                                args.push(self.parse_expr());
                                if !self.eat(TokenKind::Comma) {
                                    break;
                                }
                            }
                        }
                        self.expect(TokenKind::RParen, "')'");
                    }
                    value = self.alloc(span, NodeTag::FnCall, NodePayload::FnCall {
                        callee: value,
                        args,
                        methfld: Some(field),
                    });
                }
                TokenKind::LParen => {
                    self.bump();
                    let mut args = SmallVec::new();
                    if !self.at(TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expr());
                            if !self.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen, "')'");
                    let span = self.span_end(start);
                    value = self.alloc(span, NodeTag::FnCall, NodePayload::FnCall {
                        callee: value,
                        args,
                        methfld: None,
                    });
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.parse_expr();
                    self.expect(TokenKind::RBracket, "']'");
                    let span = self.span_end(start);
                    value = self.alloc(span, NodeTag::ArrIndex, NodePayload::ArrIndex {
                        array: value,
                        index,
                    });
                }
                TokenKind::Incr | TokenKind::Decr => {
                    let op = if self.cur.kind == TokenKind::Incr { "_++" } else { "_--" };
                    self.bump();
                    value = self.binary_call_unary(start, value, op);
                }
                _ => break,
            }
        }
        value
    }

    fn parse_primary(&mut self) -> NodeId {
        let start = self.span_start();
        match self.cur.kind {
            TokenKind::IntLit => {
                let value = match self.cur.value {
                    LiteralValue::Int(n) => n,
                    _ => 0,
                };
                self.bump();
                let span = self.span_end(start);
                self.alloc(span, NodeTag::UIntLit, NodePayload::UIntLit { value })
            }
            TokenKind::FloatLit => {
                let value = match self.cur.value {
                    LiteralValue::Float(f) => f,
                    _ => 0.0,
                };
                self.bump();
                let span = self.span_end(start);
                self.alloc(span, NodeTag::FloatLit, NodePayload::FloatLit { value })
            }
            TokenKind::StringLit => {
                let text = match self.cur.value.clone() {
                    LiteralValue::Str(s) => s,
                    _ => String::new(),
                };
                self.bump();
                let atom = self.program.interner.intern(&text);
                let span = self.span_end(start);
                self.alloc(span, NodeTag::StringLit, NodePayload::StringLit { value: atom })
            }
            TokenKind::True | TokenKind::False => {
                let v = u64::from(self.cur.kind == TokenKind::True);
                self.bump();
                let span = self.span_end(start);
                self.alloc(span, NodeTag::UIntLit, NodePayload::UIntLit { value: v })
            }
            TokenKind::Null => {
                self.bump();
                let span = self.span_end(start);
                self.alloc(span, NodeTag::NullLit, NodePayload::NullLit)
            }
            TokenKind::Ident => {
                let name = match self.cur.value {
                    LiteralValue::Name(a) => a,
                    _ => unreachable!("Ident token always carries a Name value"),
                };
                self.bump();
                let span = self.span_end(start);
                self.alloc(span, NodeTag::NameUse, NodePayload::NameUse { name, dclnode: None })
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expr();
                self.expect(TokenKind::RParen, "')'");
                inner
            }
            TokenKind::LBracket => {
                self.bump();
                let mut elements = SmallVec::new();
                if !self.at(TokenKind::RBracket) {
                    loop {
                        elements.push(self.parse_expr());
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket, "']'");
                let span = self.span_end(start);
                self.alloc(span, NodeTag::ArrayLit, NodePayload::ArrayLit { elements })
            }
            _ => {
                let span = self.cur.span;
                self.diags.report(
                    self.file.clone(),
                    span,
                    cone_common::diagnostics::diagnostic_codes::UNEXPECTED_TOKEN,
                    &[&format!("{:?}", self.cur.kind)],
                );
                self.bump();
                self.alloc(span, NodeTag::NilLit, NodePayload::NilLit)
            }
        }
    }
}
