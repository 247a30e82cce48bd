//! Type parsing (parser/parsetype.c).

use crate::core::Parser;
use cone_common::span::Span;
use cone_ir::{BuiltinPerm, IrNode, NodePayload, NodeTag, PermRef};
use cone_lexer::{LiteralValue, TokenKind};
use smallvec::SmallVec;

impl<'p, 'src> Parser<'p, 'src> {
    /// Parses a permission: either a built-in spelling (`uni`, `mut`, ...)
    /// tokenized as `TokenKind::Perm`, or a custom name. Defaults to `mut`
    /// when none is written, matching the original's implicit-mut rule
    /// for unqualified reference types (parsetype.c line ~22).
    pub(crate) fn parse_perm(&mut self) -> PermRef {
        if self.at(TokenKind::Perm) {
            let name = match &self.cur.value {
                LiteralValue::Name(a) => *a,
                _ => unreachable!("Perm token always carries a Name value"),
            };
            self.bump();
            let text = self.program.interner.resolve(name).to_string();
            for builtin in BuiltinPerm::all() {
                if builtin.name() == text {
                    return PermRef::Builtin(builtin);
                }
            }
            PermRef::Custom(name)
        } else {
            PermRef::Builtin(BuiltinPerm::Mut)
        }
    }

    /// Parses a type expression. `&` introduces a reference (optionally
    /// prefixed by a region name and permission), `*` a raw pointer,
    /// `[` either an array ref or a fixed-size array, `(` a type tuple,
    /// `fn` a function signature, and a bare identifier a named type use.
    pub fn parse_type(&mut self) -> cone_ir::NodeId {
        let start = self.span_start();
        match self.cur.kind {
            TokenKind::Amper => {
                self.bump();
                let region = self.parse_region_name();
                let perm = self.parse_perm();
                let perm_node = self.alloc_perm_node(perm);
                let target = self.parse_type();
                let span = self.span_end(start);
                self.alloc(span, NodeTag::Ref, NodePayload::Ref { region, perm: perm_node, target })
            }
            TokenKind::LBracket => {
                self.bump();
                if self.at(TokenKind::RBracket) {
                    self.bump();
                    let perm = self.parse_perm();
                    let perm_node = self.alloc_perm_node(perm);
                    let region = self.parse_region_name();
                    let target = self.parse_type();
                    let span = self.span_end(start);
                    self.alloc(
                        span,
                        NodeTag::ArrayRef,
                        NodePayload::ArrayRef { region, perm: perm_node, target },
                    )
                } else {
                    let size = self.parse_array_size();
                    self.expect(TokenKind::RBracket, "']'");
                    let element = self.parse_type();
                    let span = self.span_end(start);
                    self.alloc(span, NodeTag::Array, NodePayload::Array { size, element })
                }
            }
            TokenKind::Star => {
                self.bump();
                let target = self.parse_type();
                let span = self.span_end(start);
                self.alloc(span, NodeTag::Ptr, NodePayload::Ptr { target })
            }
            TokenKind::LParen => {
                self.bump();
                let mut elements = SmallVec::new();
                if !self.at(TokenKind::RParen) {
                    loop {
                        elements.push(self.parse_type());
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen, "')'");
                let span = self.span_end(start);
                self.alloc(span, NodeTag::TTuple, NodePayload::TTuple { elements })
            }
            TokenKind::Fn => {
                self.bump();
                self.expect(TokenKind::LParen, "'('");
                let mut params = SmallVec::new();
                let mut variadic = false;
                if !self.at(TokenKind::RParen) {
                    loop {
                        if self.eat(TokenKind::Dot) {
                            // '...' variadic marker, written as three dots.
                            self.expect(TokenKind::Dot, "'.'");
                            self.expect(TokenKind::Dot, "'.'");
                            variadic = true;
                            break;
                        }
                        params.push(self.parse_type());
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen, "')'");
                let ret = if self.at(TokenKind::LCurly) || self.at(TokenKind::Semi) {
                    let void_span = self.cur.span;
                    self.alloc(void_span, NodeTag::Void, NodePayload::Void)
                } else {
                    self.parse_type()
                };
                let span = self.span_end(start);
                self.alloc(span, NodeTag::FnSig, NodePayload::FnSig { params, ret, variadic })
            }
            TokenKind::Ident => {
                let name = match &self.cur.value {
                    LiteralValue::Name(a) => *a,
                    _ => unreachable!("Ident token always carries a Name value"),
                };
                self.bump();
                let span = self.span_end(start);
                self.alloc(span, NodeTag::TypeNameUse, NodePayload::NameUse { name, dclnode: None })
            }
            _ => {
                let span = self.cur.span;
                self.diags.report(
                    self.file.clone(),
                    span,
                    cone_common::diagnostics::diagnostic_codes::UNEXPECTED_TOKEN,
                    &[&format!("{:?}", self.cur.kind)],
                );
                self.alloc(span, NodeTag::Void, NodePayload::Void)
            }
        }
    }

    /// Region names (`so`, `rc`, `borrow`, or a user-declared region)
    /// appear before the permission in a reference type: `&so mut T`. A
    /// bare `&T` (no region, no perm) would otherwise be ambiguous with
    /// `&so T` here, so only the closed set of corelib-registered region
    /// spellings are consumed as a region; any other identifier is left
    /// for `parse_type` to read as the target type. An absent region
    /// interns to `""`, which `cone-check` treats as "default region for
    /// this context" rather than a real region declaration.
    fn parse_region_name(&mut self) -> cone_common::interner::Atom {
        if self.at(TokenKind::Ident) {
            if let LiteralValue::Name(a) = self.cur.value {
                let text = self.program.interner.resolve(a);
                if matches!(text, "so" | "rc" | "borrow") {
                    self.bump();
                    return a;
                }
            }
        }
        self.program.interner.intern("")
    }

    fn parse_array_size(&mut self) -> u64 {
        if let LiteralValue::Int(n) = self.cur.value {
            self.bump();
            n
        } else {
            0
        }
    }

    pub(crate) fn alloc_perm_node(&mut self, perm: PermRef) -> cone_ir::NodeId {
        let flags = match perm {
            PermRef::Builtin(b) => b.flags(),
            PermRef::Custom(_) => cone_ir::PermFlags::empty(),
        };
        let name = match perm {
            PermRef::Builtin(b) => self.program.interner.intern(b.name()),
            PermRef::Custom(a) => a,
        };
        self.alloc(Span::dummy(), NodeTag::Perm, NodePayload::Perm { name, flags })
    }

    pub(crate) fn alloc(&mut self, span: Span, tag: NodeTag, payload: NodePayload) -> cone_ir::NodeId {
        self.program.arena.alloc(IrNode::new(span, tag, payload))
    }
}
