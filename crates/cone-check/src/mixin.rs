//! Trait mixin expansion and vtable/`VtableImpl` construction.
//!
//! Grounded on `tsz-checker`'s interface-merging pass (structural
//! interface extension flattened into one member list before checking),
//! adapted to this IR's explicit mixin-marker-in-the-fields-list
//! representation: a struct's `fields` list may hold a bare type `NodeId`
//! (not a `FieldDcl`) standing in for "splice this trait's fields here."

use crate::TypeChecker;
use cone_common::diagnostics::diagnostic_codes;
use cone_ir::{IrNode, NodeFlags, NodeId, NodePayload, NodeTag};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Every public method and non-enum field of a trait, in declaration
/// order, each entry indexed by its position here (spec's vtable slot
/// index).
#[derive(Clone, Debug, Default)]
pub struct Vtable {
    pub owner_trait: Option<NodeId>,
    pub entries: Vec<NodeId>,
}

/// Maps a concrete struct's members onto a trait's vtable slots.
#[derive(Clone, Debug)]
pub struct VtableImpl {
    pub trait_: NodeId,
    pub concrete: NodeId,
    pub slots: Vec<Option<NodeId>>,
}

/// Expands every mixin marker in `struct_id`'s field list in place,
/// copies in un-overridden default methods from the base trait, and
/// recomputes the derived flags (`MOVE_TYPE`/`THREAD_BOUND`/
/// `OPAQUE_TYPE`) once expansion is done. Idempotent: a struct whose
/// fields are already all `FieldDcl`s returns immediately.
pub(crate) fn expand_mixins(checker: &mut TypeChecker, struct_id: NodeId) {
    if checker.program.arena.tag(struct_id) != NodeTag::Struct {
        return;
    }
    let (fields, methods, basetrait) = match &checker.program.arena.get(struct_id).payload {
        NodePayload::Struct { fields, methods, basetrait, .. } => (fields.clone(), methods.clone(), *basetrait),
        _ => return,
    };

    let has_marker = fields.iter().any(|&f| checker.program.arena.tag(f) != NodeTag::FieldDcl);
    if !has_marker && basetrait.is_none() {
        return;
    }

    let mut new_fields: SmallVec<[NodeId; 8]> = SmallVec::new();
    let mut seen_names: FxHashSet<cone_common::interner::Atom> = FxHashSet::default();
    for &f in &fields {
        if checker.program.arena.tag(f) == NodeTag::FieldDcl {
            if let NodePayload::FieldDcl { name, .. } = &checker.program.arena.get(f).payload {
                seen_names.insert(*name);
            }
            new_fields.push(f);
            continue;
        }
        // Mixin marker: `f` names the base trait's type node.
        let base_struct = resolve_mixin_target(checker, f);
        let Some(base_struct) = base_struct else { continue };
        expand_mixins(checker, base_struct);
        splice_base_fields(checker, base_struct, &mut new_fields, &mut seen_names, struct_id);
    }

    let mut new_methods = methods.clone();
    if let Some(base) = basetrait.or_else(|| mixin_basetrait(checker, &fields)) {
        expand_mixins(checker, base);
        copy_default_methods(checker, base, &mut new_methods, struct_id);
    }

    renumber_fields(checker, &mut new_fields);

    let opaque = new_fields.is_empty();
    if let NodePayload::Struct { fields, methods, .. } = &mut checker.program.arena.get_mut(struct_id).payload {
        *fields = new_fields;
        *methods = new_methods;
    }
    let node = checker.program.arena.get_mut(struct_id);
    if opaque {
        node.flags |= NodeFlags::OPAQUE_TYPE;
    }
    recompute_infection_flags(checker, struct_id);
}

fn mixin_basetrait(checker: &TypeChecker, fields: &SmallVec<[NodeId; 8]>) -> Option<NodeId> {
    fields.iter().find(|&&f| checker.program.arena.tag(f) != NodeTag::FieldDcl).and_then(|&f| resolve_mixin_target(checker, f))
}

fn resolve_mixin_target(checker: &TypeChecker, marker: NodeId) -> Option<NodeId> {
    match checker.program.arena.tag(marker) {
        NodeTag::Struct => Some(marker),
        NodeTag::TypeNameUse | NodeTag::NameUse => match &checker.program.arena.get(marker).payload {
            NodePayload::NameUse { dclnode: Some(d), .. } if checker.program.arena.tag(*d) == NodeTag::Struct => Some(*d),
            _ => None,
        },
        _ => None,
    }
}

fn splice_base_fields(
    checker: &mut TypeChecker,
    base_struct: NodeId,
    new_fields: &mut SmallVec<[NodeId; 8]>,
    seen_names: &mut FxHashSet<cone_common::interner::Atom>,
    owner: NodeId,
) {
    let base_fields = match &checker.program.arena.get(base_struct).payload {
        NodePayload::Struct { fields, .. } => fields.clone(),
        _ => return,
    };
    for &bf in &base_fields {
        let (name, declared_type, init) = match &checker.program.arena.get(bf).payload {
            NodePayload::FieldDcl { name, declared_type, init, .. } => (*name, *declared_type, *init),
            _ => continue,
        };
        if !seen_names.insert(name) {
            let span = checker.program.arena.get(bf).span;
            let n = checker.program.interner.resolve(name).to_string();
            checker.report(span, diagnostic_codes::BAD_TRAIT_MIXIN, &[&n]);
            continue;
        }
        let span = checker.program.arena.get(bf).span;
        let cloned = checker.program.arena.alloc(IrNode::new(
            span,
            NodeTag::FieldDcl,
            NodePayload::FieldDcl { name, declared_type, init, index: 0 },
        ));
        checker.program.arena.get_mut(cloned).owner = Some(owner);
        new_fields.push(cloned);
    }
}

fn copy_default_methods(checker: &mut TypeChecker, base: NodeId, new_methods: &mut SmallVec<[NodeId; 8]>, owner: NodeId) {
    let base_methods = match &checker.program.arena.get(base).payload {
        NodePayload::Struct { methods, .. } => methods.clone(),
        _ => return,
    };
    for &bm in &base_methods {
        let (name, sig, body) = match &checker.program.arena.get(bm).payload {
            NodePayload::FnDcl { name, sig, body } => (*name, *sig, *body),
            _ => continue,
        };
        let already_overridden = new_methods.iter().any(|&m| match &checker.program.arena.get(m).payload {
            NodePayload::FnDcl { name: n, .. } => *n == name,
            _ => false,
        });
        if already_overridden {
            continue;
        }
        match body {
            Some(_) => {
                let span = checker.program.arena.get(bm).span;
                let cloned = checker.program.arena.alloc(IrNode::new(span, NodeTag::FnDcl, NodePayload::FnDcl { name, sig, body }));
                checker.program.arena.get_mut(cloned).owner = Some(owner);
                checker.program.arena.get_mut(cloned).flags = checker.program.arena.get(bm).flags;
                new_methods.push(cloned);
            }
            None => {
                let span = checker.program.arena.get(bm).span;
                let n = checker.program.interner.resolve(name).to_string();
                checker.report(span, diagnostic_codes::MISSING_TRAIT_METHOD, &[&n]);
            }
        }
    }
}

fn renumber_fields(checker: &mut TypeChecker, fields: &mut SmallVec<[NodeId; 8]>) {
    for (i, &f) in fields.iter().enumerate() {
        if let NodePayload::FieldDcl { index, .. } = &mut checker.program.arena.get_mut(f).payload {
            *index = i as u32;
        }
    }
}

fn recompute_infection_flags(checker: &mut TypeChecker, struct_id: NodeId) {
    let fields = match &checker.program.arena.get(struct_id).payload {
        NodePayload::Struct { fields, .. } => fields.clone(),
        _ => return,
    };
    let mut move_type = false;
    let mut thread_bound = false;
    for &f in &fields {
        let declared_type = match &checker.program.arena.get(f).payload {
            NodePayload::FieldDcl { declared_type, .. } => *declared_type,
            _ => continue,
        };
        let field_tag_node = field_type_decl(checker, declared_type);
        if let Some(n) = field_tag_node {
            let flags = checker.program.arena.get(n).flags;
            move_type |= flags.contains(NodeFlags::MOVE_TYPE);
            thread_bound |= flags.contains(NodeFlags::THREAD_BOUND);
        }
    }
    let node = checker.program.arena.get_mut(struct_id);
    if move_type {
        node.flags |= NodeFlags::MOVE_TYPE;
    }
    if thread_bound {
        node.flags |= NodeFlags::THREAD_BOUND;
    }
}

fn field_type_decl(checker: &TypeChecker, ty: NodeId) -> Option<NodeId> {
    match checker.program.arena.tag(ty) {
        NodeTag::TypeNameUse | NodeTag::NameUse => match &checker.program.arena.get(ty).payload {
            NodePayload::NameUse { dclnode, .. } => *dclnode,
            _ => None,
        },
        NodeTag::Ref | NodeTag::ArrayRef | NodeTag::VirtRef | NodeTag::Ptr => Some(ty),
        _ => Some(ty),
    }
}

/// Builds (or reuses) `trait_id`'s vtable on first use: every public
/// method and non-enum field in declaration order.
pub(crate) fn vtable_for(checker: &mut TypeChecker, trait_id: NodeId) -> Vtable {
    if let Some(existing) = checker.vtables.get(&trait_id) {
        return existing.clone();
    }
    let (fields, methods) = match &checker.program.arena.get(trait_id).payload {
        NodePayload::Struct { fields, methods, .. } => (fields.clone(), methods.clone()),
        _ => return Vtable::default(),
    };
    let mut entries = Vec::new();
    for &f in &fields {
        if checker.program.arena.tag(f) == NodeTag::FieldDcl {
            entries.push(f);
        }
    }
    for &m in &methods {
        let is_private = match &checker.program.arena.get(m).payload {
            NodePayload::FnDcl { name, .. } => checker.program.interner.resolve(*name).starts_with('_'),
            _ => false,
        };
        if !is_private {
            entries.push(m);
        }
    }
    let vtable = Vtable { owner_trait: Some(trait_id), entries };
    checker.vtables.insert(trait_id, vtable.clone());
    vtable
}

/// Constructs `VtableImpl` mapping `trait_id`'s vtable slots to
/// `concrete`'s matching members (by name, methods additionally needing a
/// virtual-ref-compatible signature). A missing entry is a coercion
/// failure reported at `coerce_span`.
pub(crate) fn vtable_impl_for(checker: &mut TypeChecker, trait_id: NodeId, concrete: NodeId, coerce_span: cone_common::span::Span) -> VtableImpl {
    if let Some(existing) = checker.vtable_impls.get(&(trait_id, concrete)) {
        return existing.clone();
    }
    let vtable = vtable_for(checker, trait_id);
    let mut slots = Vec::with_capacity(vtable.entries.len());
    for &slot in &vtable.entries {
        let name = match &checker.program.arena.get(slot).payload {
            NodePayload::FnDcl { name, .. } | NodePayload::FieldDcl { name, .. } => *name,
            _ => continue,
        };
        let found = lookup_matching_member(checker, concrete, name, checker.program.arena.tag(slot));
        if found.is_none() {
            let n = checker.program.interner.resolve(name).to_string();
            checker.report(coerce_span, diagnostic_codes::MISSING_TRAIT_METHOD, &[&n]);
        }
        slots.push(found);
    }
    let vtable_impl = VtableImpl { trait_: trait_id, concrete, slots };
    checker.vtable_impls.insert((trait_id, concrete), vtable_impl.clone());
    vtable_impl
}

fn lookup_matching_member(checker: &TypeChecker, concrete: NodeId, name: cone_common::interner::Atom, expect_tag: NodeTag) -> Option<NodeId> {
    let (fields, methods) = match &checker.program.arena.get(concrete).payload {
        NodePayload::Struct { fields, methods, .. } => (fields.clone(), methods.clone()),
        _ => return None,
    };
    match expect_tag {
        NodeTag::FieldDcl => fields.into_iter().find(|&f| matches!(&checker.program.arena.get(f).payload, NodePayload::FieldDcl { name: n, .. } if *n == name)),
        _ => methods.into_iter().find(|&m| matches!(&checker.program.arena.get(m).payload, NodePayload::FnDcl { name: n, .. } if *n == name)),
    }
}
