//! `Option[T]`/`Result[T,E]` bootstrap (spec §4.4), built the same way the
//! parser desugars a user `enum`: a closed trait `Struct`
//! (`TRAIT_TYPE|SAME_SIZE|HAS_TAG_FIELD`) with tagged variant `Struct`s
//! mixing it in via `basetrait`, except the whole thing is wrapped in a
//! `Generic` over `T` (and, for `Result`, `E`) since corelib types are the
//! only ones in this compiler that need to exist before any source has
//! been parsed.

use cone_common::span::Span;
use cone_ir::{IrNode, NodeFlags, NodeId, NodePayload, NodeTag, Program};
use smallvec::SmallVec;

pub struct OptionResult {
    pub option_generic: NodeId,
    pub option_trait: NodeId,
    pub some: NodeId,
    pub none: NodeId,
    pub result_generic: NodeId,
    pub result_trait: NodeId,
    pub ok: NodeId,
    pub err: NodeId,
}

fn set_basetrait(program: &mut Program, variant: NodeId, base: NodeId) {
    if let NodePayload::Struct { basetrait, .. } = &mut program.arena.get_mut(variant).payload {
        *basetrait = Some(base);
    }
}

pub fn register_option_result(program: &mut Program) -> OptionResult {
    let t_name = program.interner.intern("T");
    let t_param = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::GenVarDcl,
        NodePayload::GenVarDcl { name: t_name, bound: None },
    ));
    let t_use = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::GenVarUse,
        NodePayload::GenVarUse { name: t_name, dclnode: Some(t_param) },
    ));

    let option_name = program.specials.option;
    let option_trait = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::Struct,
        NodePayload::Struct {
            name: option_name,
            fields: SmallVec::new(),
            methods: SmallVec::new(),
            basetrait: None,
            variant_tag: None,
        },
    ));
    program.arena.get_mut(option_trait).flags |=
        NodeFlags::TRAIT_TYPE | NodeFlags::SAME_SIZE | NodeFlags::HAS_TAG_FIELD;

    let value_field_name = program.interner.intern("value");
    let value_field = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::FieldDcl,
        NodePayload::FieldDcl { name: value_field_name, declared_type: t_use, init: None, index: 0 },
    ));
    let some_name = program.specials.some;
    let some = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::Struct,
        NodePayload::Struct {
            name: some_name,
            fields: SmallVec::from_slice(&[value_field]),
            methods: SmallVec::new(),
            basetrait: Some(option_trait),
            variant_tag: Some(0),
        },
    ));
    let none_name = program.specials.none;
    let none = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::Struct,
        NodePayload::Struct {
            name: none_name,
            fields: SmallVec::new(),
            methods: SmallVec::new(),
            basetrait: Some(option_trait),
            variant_tag: Some(1),
        },
    ));
    set_basetrait(program, some, option_trait);
    set_basetrait(program, none, option_trait);

    let mut option_params = SmallVec::new();
    option_params.push(t_param);
    let option_generic = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::Generic,
        NodePayload::Generic { name: option_name, params: option_params, body: option_trait },
    ));
    program.names.hook(option_name, option_generic);
    program.names.hook(some_name, some);
    program.names.hook(none_name, none);

    // Result[T, E]
    let e_name = program.interner.intern("E");
    let e_param = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::GenVarDcl,
        NodePayload::GenVarDcl { name: e_name, bound: None },
    ));
    let e_use = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::GenVarUse,
        NodePayload::GenVarUse { name: e_name, dclnode: Some(e_param) },
    ));
    let t2_use = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::GenVarUse,
        NodePayload::GenVarUse { name: t_name, dclnode: Some(t_param) },
    ));

    let result_name = program.specials.result;
    let result_trait = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::Struct,
        NodePayload::Struct {
            name: result_name,
            fields: SmallVec::new(),
            methods: SmallVec::new(),
            basetrait: None,
            variant_tag: None,
        },
    ));
    program.arena.get_mut(result_trait).flags |=
        NodeFlags::TRAIT_TYPE | NodeFlags::SAME_SIZE | NodeFlags::HAS_TAG_FIELD;

    let ok_field_name = program.interner.intern("value");
    let ok_field = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::FieldDcl,
        NodePayload::FieldDcl { name: ok_field_name, declared_type: t2_use, init: None, index: 0 },
    ));
    let ok_name = program.specials.ok;
    let ok = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::Struct,
        NodePayload::Struct {
            name: ok_name,
            fields: SmallVec::from_slice(&[ok_field]),
            methods: SmallVec::new(),
            basetrait: Some(result_trait),
            variant_tag: Some(0),
        },
    ));
    let err_field_name = program.interner.intern("error");
    let err_field = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::FieldDcl,
        NodePayload::FieldDcl { name: err_field_name, declared_type: e_use, init: None, index: 0 },
    ));
    let err_name = program.specials.err;
    let err = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::Struct,
        NodePayload::Struct {
            name: err_name,
            fields: SmallVec::from_slice(&[err_field]),
            methods: SmallVec::new(),
            basetrait: Some(result_trait),
            variant_tag: Some(1),
        },
    ));

    let mut result_params = SmallVec::new();
    result_params.push(t_param);
    result_params.push(e_param);
    let result_generic = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::Generic,
        NodePayload::Generic { name: result_name, params: result_params, body: result_trait },
    ));
    program.names.hook(result_name, result_generic);
    program.names.hook(ok_name, ok);
    program.names.hook(err_name, err);

    OptionResult {
        option_generic,
        option_trait,
        some,
        none,
        result_generic,
        result_trait,
        ok,
        err,
    }
}
