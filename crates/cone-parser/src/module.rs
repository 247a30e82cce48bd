//! Top-level parsing (parser/parsemod.c): modules, imports, function,
//! struct/trait, enum, typedef, extern, and const declarations.

use crate::core::Parser;
use cone_common::diagnostics::diagnostic_codes;
use cone_ir::{NodeFlags, NodeId, NodePayload, NodeTag};
use cone_lexer::{LiteralValue, TokenKind};
use smallvec::SmallVec;

impl<'p, 'src> Parser<'p, 'src> {
    /// Parses an entire source file as the implicit top-level module.
    pub fn parse_program(&mut self) -> NodeId {
        let start = self.span_start();
        let name = self.program.specials.anon;
        let mut members = SmallVec::new();
        while !self.at(TokenKind::Eof) {
            self.stmt_start();
            if let Some(member) = self.parse_global_item() {
                members.push(member);
            }
        }
        let span = self.span_end(start);
        let module = self.alloc(span, NodeTag::Module, NodePayload::Module { name, members });
        self.program.root = Some(module);
        module
    }

    /// One module-scope item, or `None` if a malformed item was skipped
    /// after reporting a diagnostic.
    fn parse_global_item(&mut self) -> Option<NodeId> {
        match self.cur.kind {
            TokenKind::Mod => Some(self.parse_module_decl()),
            TokenKind::Include => Some(self.parse_import()),
            TokenKind::Fn => Some(self.parse_fn_decl(NodeFlags::empty())),
            TokenKind::Extern => Some(self.parse_extern_fn()),
            TokenKind::Struct | TokenKind::Trait => Some(self.parse_struct_decl()),
            TokenKind::Enum => Some(self.parse_enum_decl()),
            TokenKind::Typedef => Some(self.parse_typedef()),
            TokenKind::Region => Some(self.parse_region_decl()),
            TokenKind::Perm if self.is_top_level_const() => Some(self.parse_const_decl()),
            TokenKind::Semi => {
                self.bump();
                None
            }
            _ => {
                let found = format!("{:?}", self.cur.kind);
                self.diags.report(
                    self.file.clone(),
                    self.cur.span,
                    diagnostic_codes::BAD_GLOBAL_STATEMENT,
                    &[&found],
                );
                self.skip_to_next_stmt();
                // `skip_to_next_stmt` stops at a `}` without consuming it,
                // expecting an enclosing block's `block_end` to do so. At
                // module scope there is no enclosing block, so a stray `}`
                // would otherwise never advance and loop forever here.
                if self.at(TokenKind::RCurly) {
                    self.bump();
                }
                None
            }
        }
    }

    /// A module-scope `perm T NAME = expr` is a constant, not a local
    /// variable declaration; the parser has no lookahead token for `const`
    /// itself (Cone spells it with the same `perm` production used inside
    /// function bodies).
    fn is_top_level_const(&self) -> bool {
        true
    }

    fn parse_module_decl(&mut self) -> NodeId {
        let start = self.span_start();
        self.bump();
        let name = match self.cur.value {
            LiteralValue::Name(a) => a,
            _ => self.program.specials.anon,
        };
        self.bump();
        let mode = self.block_start();
        let mut members = SmallVec::new();
        while !self.at_block_end(mode) {
            self.stmt_start();
            if let Some(member) = self.parse_global_item() {
                members.push(member);
            }
            if mode == cone_lexer::BlockMode::SameLine {
                break;
            }
        }
        self.block_end(mode);
        let span = self.span_end(start);
        self.alloc(span, NodeTag::Module, NodePayload::Module { name, members })
    }

    /// `include a::b::c` or `include a::b::*` (glob import, folded into
    /// every public name of `a::b` by `cone-resolve`).
    fn parse_import(&mut self) -> NodeId {
        let start = self.span_start();
        self.bump();
        let mut path = SmallVec::new();
        let mut glob = false;
        loop {
            if self.at(TokenKind::Star) {
                self.bump();
                glob = true;
                break;
            }
            match self.cur.value {
                LiteralValue::Name(a) => path.push(a),
                _ => break,
            }
            self.bump();
            if !self.eat(TokenKind::DblColon) {
                break;
            }
        }
        let alias = if self.at(TokenKind::Ident) && !self.is_stmt_break() {
            match self.cur.value {
                LiteralValue::Name(a) => {
                    self.bump();
                    Some(a)
                }
                _ => None,
            }
        } else {
            None
        };
        let span = self.span_end(start);
        self.alloc(span, NodeTag::Import, NodePayload::Import { path, glob, alias })
    }

    fn parse_fn_decl(&mut self, extra_flags: NodeFlags) -> NodeId {
        let start = self.span_start();
        self.bump();
        let name = match self.cur.value {
            LiteralValue::Name(a) => a,
            _ => self.program.specials.anon,
        };
        self.bump();
        let sig = self.parse_fn_sig();
        let body = if self.at(TokenKind::LCurly) || self.at(TokenKind::Colon) {
            Some(self.parse_block())
        } else {
            self.expect(TokenKind::Semi, "';'");
            None
        };
        let span = self.span_end(start);
        let node = self.alloc(span, NodeTag::FnDcl, NodePayload::FnDcl { name, sig, body });
        self.program.arena.get_mut(node).flags |= extra_flags;
        node
    }

    fn parse_fn_sig(&mut self) -> NodeId {
        let start = self.span_start();
        self.expect(TokenKind::LParen, "'('");
        let mut params = SmallVec::new();
        let mut variadic = false;
        if !self.at(TokenKind::RParen) {
            loop {
                if self.eat(TokenKind::Dot) {
                    self.expect(TokenKind::Dot, "'.'");
                    self.expect(TokenKind::Dot, "'.'");
                    variadic = true;
                    break;
                }
                params.push(self.parse_param());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'");
        let ret = if self.at(TokenKind::LCurly) || self.at(TokenKind::Colon) || self.at(TokenKind::Semi) {
            let void_span = self.cur.span;
            self.alloc(void_span, NodeTag::Void, NodePayload::Void)
        } else {
            self.parse_type()
        };
        let span = self.span_end(start);
        self.alloc(span, NodeTag::FnSig, NodePayload::FnSig { params, ret, variadic })
    }

    /// A single `name type` parameter, reusing `VarDcl` since a parameter
    /// is exactly a pre-initialized local (spec §3).
    fn parse_param(&mut self) -> NodeId {
        let start = self.span_start();
        let name = match self.cur.value {
            LiteralValue::Name(a) => a,
            _ => self.program.specials.anon,
        };
        self.bump();
        let declared_type = Some(self.parse_type());
        let span = self.span_end(start);
        self.alloc(span, NodeTag::VarDcl, NodePayload::VarDcl { name, declared_type, init: None })
    }

    fn parse_extern_fn(&mut self) -> NodeId {
        self.bump();
        if self.at(TokenKind::Ident) {
            if let LiteralValue::Name(a) = self.cur.value {
                if self.program.interner.resolve(a) == "system" {
                    self.bump();
                    return self.parse_fn_decl(NodeFlags::EXTERN | NodeFlags::SYSTEM);
                }
            }
        }
        self.parse_fn_decl(NodeFlags::EXTERN)
    }

    /// `struct`/`trait NAME [: base] { fields; methods }`. Trait mixin
    /// flattening and `SAME_SIZE`/`HAS_TAG_FIELD` assignment happen in
    /// `cone-check`, which needs the full set of a closed trait's variants
    /// resolved first; the parser only records what was written.
    fn parse_struct_decl(&mut self) -> NodeId {
        let start = self.span_start();
        let is_trait = self.at(TokenKind::Trait);
        self.bump();
        let samesize = self.eat(TokenKind::Samesize);
        let name = match self.cur.value {
            LiteralValue::Name(a) => a,
            _ => self.program.specials.anon,
        };
        self.bump();
        let basetrait = if self.eat(TokenKind::Colon) { Some(self.parse_type()) } else { None };
        let mode = self.block_start();
        let mut fields = SmallVec::new();
        let mut methods = SmallVec::new();
        while !self.at_block_end(mode) {
            self.stmt_start();
            if self.at(TokenKind::Fn) {
                methods.push(self.parse_fn_decl(NodeFlags::METH_PROP));
            } else if self.eat(TokenKind::Mixin) {
                let mixed_in = self.parse_type();
                fields.push(mixed_in);
            } else {
                fields.push(self.parse_struct_field());
            }
            if mode == cone_lexer::BlockMode::SameLine {
                break;
            }
        }
        self.block_end(mode);
        let span = self.span_end(start);
        let node = self.alloc(
            span,
            NodeTag::Struct,
            NodePayload::Struct { name, fields, methods, basetrait, variant_tag: None },
        );
        let mut flags = NodeFlags::empty();
        if is_trait {
            flags |= NodeFlags::TRAIT_TYPE;
        }
        if samesize {
            flags |= NodeFlags::SAME_SIZE | NodeFlags::HAS_TAG_FIELD;
        }
        self.program.arena.get_mut(node).flags |= flags;
        node
    }

    fn parse_struct_field(&mut self) -> NodeId {
        let start = self.span_start();
        let name = match self.cur.value {
            LiteralValue::Name(a) => a,
            _ => self.program.specials.anon,
        };
        self.bump();
        let declared_type = self.parse_type();
        let init = if self.eat(TokenKind::Assgn) { Some(self.parse_expr()) } else { None };
        let span = self.span_end(start);
        self.alloc(span, NodeTag::FieldDcl, NodePayload::FieldDcl { name, declared_type, init, index: 0 })
    }

    /// `enum NAME { Variant1; Variant2 struct-body; ... }` desugars to a
    /// closed trait (`Struct` with `TRAIT_TYPE|SAME_SIZE|HAS_TAG_FIELD`)
    /// whose variants are monotonically tagged `Struct` nodes mixing it in
    /// (spec §4.4's `Option`/`Result` pattern, generalized).
    fn parse_enum_decl(&mut self) -> NodeId {
        let start = self.span_start();
        self.bump();
        let name = match self.cur.value {
            LiteralValue::Name(a) => a,
            _ => self.program.specials.anon,
        };
        self.bump();
        let base_span = self.cur.span;
        let base_fields: SmallVec<[NodeId; 8]> = SmallVec::new();
        let base_methods: SmallVec<[NodeId; 8]> = SmallVec::new();
        let base = self.alloc(
            base_span,
            NodeTag::Struct,
            NodePayload::Struct {
                name,
                fields: base_fields,
                methods: base_methods,
                basetrait: None,
                variant_tag: None,
            },
        );
        self.program.arena.get_mut(base).flags |=
            NodeFlags::TRAIT_TYPE | NodeFlags::SAME_SIZE | NodeFlags::HAS_TAG_FIELD;

        let mode = self.block_start();
        let mut variants = SmallVec::new();
        let mut next_tag: u32 = 0;
        while !self.at_block_end(mode) {
            self.stmt_start();
            let variant = self.parse_enum_variant(base, next_tag);
            next_tag += 1;
            variants.push(variant);
            if mode == cone_lexer::BlockMode::SameLine {
                break;
            }
        }
        self.block_end(mode);
        let span = self.span_end(start);
        self.alloc(span, NodeTag::Enum, NodePayload::Enum { name, variants })
    }

    fn parse_enum_variant(&mut self, base: NodeId, tag: u32) -> NodeId {
        let start = self.span_start();
        let name = match self.cur.value {
            LiteralValue::Name(a) => a,
            _ => self.program.specials.anon,
        };
        self.bump();
        let mut fields = SmallVec::new();
        let mut methods = SmallVec::new();
        if self.at(TokenKind::LCurly) {
            let mode = self.block_start();
            while !self.at_block_end(mode) {
                self.stmt_start();
                if self.at(TokenKind::Fn) {
                    methods.push(self.parse_fn_decl(NodeFlags::METH_PROP));
                } else {
                    fields.push(self.parse_struct_field());
                }
            }
            self.block_end(mode);
        }
        let span = self.span_end(start);
        let node = self.alloc(
            span,
            NodeTag::Struct,
            NodePayload::Struct {
                name,
                fields,
                methods,
                basetrait: Some(base),
                variant_tag: Some(tag),
            },
        );
        node
    }

    /// `region NAME [rc]` declares a custom allocation region alongside
    /// the corelib-registered `so`/`rc` (spec §3's `Region` node); a
    /// trailing `rc` marks it reference-counted rather than single-owner.
    fn parse_region_decl(&mut self) -> NodeId {
        let start = self.span_start();
        self.bump();
        let name = match self.cur.value {
            LiteralValue::Name(a) => a,
            _ => self.program.specials.anon,
        };
        self.bump();
        let rc = if self.at(TokenKind::Ident) {
            match self.cur.value {
                LiteralValue::Name(a) if self.program.interner.resolve(a) == "rc" => {
                    self.bump();
                    true
                }
                _ => false,
            }
        } else {
            false
        };
        self.expect(TokenKind::Semi, "';'");
        let span = self.span_end(start);
        self.alloc(span, NodeTag::Region, NodePayload::Region { name, rc })
    }

    fn parse_typedef(&mut self) -> NodeId {
        let start = self.span_start();
        self.bump();
        let name = match self.cur.value {
            LiteralValue::Name(a) => a,
            _ => self.program.specials.anon,
        };
        self.bump();
        let aliased = self.parse_type();
        self.expect(TokenKind::Semi, "';'");
        let span = self.span_end(start);
        self.alloc(span, NodeTag::Typedef, NodePayload::Typedef { name, aliased })
    }

    fn parse_const_decl(&mut self) -> NodeId {
        let start = self.span_start();
        let _perm = self.parse_perm();
        let declared_type = if self.at(TokenKind::Ident) {
            // Two identifiers back to back means the first names the type.
            None
        } else {
            Some(self.parse_type())
        };
        let name = match self.cur.value {
            LiteralValue::Name(a) => a,
            _ => self.program.specials.anon,
        };
        self.bump();
        self.expect(TokenKind::Assgn, "'='");
        let value = self.parse_expr();
        self.expect(TokenKind::Semi, "';'");
        let span = self.span_end(start);
        self.alloc(span, NodeTag::ConstDcl, NodePayload::ConstDcl { name, declared_type, value })
    }
}
