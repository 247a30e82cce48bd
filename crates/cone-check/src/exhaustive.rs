//! Closed-variant exhaustiveness for `if`/`match` chains built from `is`
//! guards against one scrutinee.
//!
//! Grounded on `tsz-checker`'s discriminated-union narrowing (each `is`
//! arm narrows the scrutinee the same way a `typeof`/tag check narrows a
//! tagged union there); the "rewrite the last arm to the else sentinel"
//! step is this IR's specific optimization; it saves the generator a
//! redundant tag test, generalized here for any closed trait/variant set.

use crate::TypeChecker;
use cone_common::diagnostics::diagnostic_codes;
use cone_ir::{NodeId, NodePayload, NodeTag};

/// After type-checking an `If`, checks whether every arm's condition is
/// an `is Variant` guard on the same scrutinee and whether the covered
/// variants exactly cover the scrutinee's base trait's derived set. If
/// so, rewrites the last arm into the `else` slot (the arms list itself
/// is left untouched otherwise — the last condition simply stops being
/// evaluated once `else_arm` carries its body).
pub(crate) fn check_exhaustiveness(checker: &mut TypeChecker, if_id: NodeId) {
    let (arms, else_arm) = match &checker.program.arena.get(if_id).payload {
        NodePayload::If { arms, else_arm } => (arms.clone(), *else_arm),
        _ => return,
    };
    if else_arm.is_some() || arms.len() < 2 {
        return;
    }

    let mut scrutinee: Option<NodeId> = None;
    let mut covered: Vec<NodeId> = Vec::new();
    for &(cond, _) in &arms {
        let Some((value, variant)) = is_guard_parts(checker, cond) else { return };
        let value_decl = scrutinee_decl(checker, value);
        match scrutinee {
            None => scrutinee = value_decl,
            Some(s) if value_decl == Some(s) => {}
            _ => return,
        }
        let Some(variant_decl) = resolve_type_decl(checker, variant) else { return };
        covered.push(variant_decl);
    }
    let Some(scrutinee_decl_id) = scrutinee else { return };
    let Some(base_ty) = scrutinee_base(checker, scrutinee_decl_id) else { return };
    let Some(all_variants) = checker.variants_of.get(&base_ty).cloned() else { return };

    let all_covered = all_variants.iter().all(|v| covered.contains(v)) && covered.len() == all_variants.len();
    if !all_covered {
        let span = checker.program.arena.get(if_id).span;
        checker.report(span, diagnostic_codes::NON_EXHAUSTIVE_MATCH, &[]);
        return;
    }

    let (_, last_body) = arms[arms.len() - 1];
    if let NodePayload::If { arms, else_arm } = &mut checker.program.arena.get_mut(if_id).payload {
        arms.pop();
        *else_arm = Some(last_body);
    }
}

fn is_guard_parts(checker: &TypeChecker, cond: NodeId) -> Option<(NodeId, NodeId)> {
    if checker.program.arena.tag(cond) != NodeTag::Is {
        return None;
    }
    match &checker.program.arena.get(cond).payload {
        NodePayload::Is { value, guard } => Some((*value, guard.ty)),
        _ => None,
    }
}

fn scrutinee_decl(checker: &TypeChecker, value: NodeId) -> Option<NodeId> {
    match &checker.program.arena.get(value).payload {
        NodePayload::NameUse { dclnode, .. } => *dclnode,
        _ => Some(value),
    }
}

fn scrutinee_base(checker: &TypeChecker, decl: NodeId) -> Option<NodeId> {
    let declared_type = match &checker.program.arena.get(decl).payload {
        NodePayload::VarDcl { declared_type, .. } => *declared_type,
        NodePayload::FieldDcl { declared_type, .. } => Some(*declared_type),
        _ => None,
    }?;
    resolve_type_decl(checker, declared_type)
}

/// Resolves a type-position node (possibly a `TypeNameUse`/`NameUse`
/// alias) down to the `Struct` declaration it ultimately names.
fn resolve_type_decl(checker: &TypeChecker, ty: NodeId) -> Option<NodeId> {
    match checker.program.arena.tag(ty) {
        NodeTag::TypeNameUse | NodeTag::NameUse => match &checker.program.arena.get(ty).payload {
            NodePayload::NameUse { dclnode: Some(d), .. } => resolve_type_decl(checker, *d),
            _ => None,
        },
        NodeTag::Struct => Some(ty),
        _ => None,
    }
}

