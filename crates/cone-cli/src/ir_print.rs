//! `--print-ir` dump: a generic arena walk that renders every node as its
//! tag, an optional scalar detail, and its children — the same shape
//! whether rendered as indented text or serialized as JSON.

use cone_common::interner::Atom;
use cone_ir::{NodeId, NodePayload, Program};
use serde::Serialize;

#[derive(Serialize)]
pub struct IrDump {
    pub tag: String,
    pub detail: Option<String>,
    pub children: Vec<IrDump>,
}

pub fn dump_node(program: &Program, id: NodeId) -> IrDump {
    let node = program.arena.get(id);
    let tag = format!("{:?}", node.tag);
    let resolve = |a: Atom| program.interner.resolve(a).to_string();

    let (detail, children): (Option<String>, Vec<NodeId>) = match &node.payload {
        NodePayload::Leaf | NodePayload::NilLit | NodePayload::NullLit | NodePayload::Void => {
            (None, vec![])
        }
        NodePayload::Module { name, members } => (Some(resolve(*name)), members.to_vec()),
        NodePayload::Import { path, glob, alias } => {
            let mut detail = path.iter().map(|a| resolve(*a)).collect::<Vec<_>>().join("::");
            if *glob {
                detail.push_str("::*");
            }
            if let Some(a) = alias {
                detail.push_str(&format!(" as {}", resolve(*a)));
            }
            (Some(detail), vec![])
        }
        NodePayload::Return { value } => (None, value.iter().copied().collect()),
        NodePayload::BlockReturn { value, dealias } => {
            let mut c: Vec<NodeId> = value.iter().copied().collect();
            c.extend(dealias.iter().copied());
            (None, c)
        }
        NodePayload::Break { label } => (label.map(resolve), vec![]),
        NodePayload::Continue { label } => (label.map(resolve), vec![]),
        NodePayload::FnDcl { name, sig, body } => {
            let mut c = vec![*sig];
            c.extend(body.iter().copied());
            (Some(resolve(*name)), c)
        }
        NodePayload::VarDcl { name, declared_type, init } => {
            let mut c: Vec<NodeId> = declared_type.iter().copied().collect();
            c.extend(init.iter().copied());
            (Some(resolve(*name)), c)
        }
        NodePayload::FieldDcl { name, declared_type, init, index } => {
            let mut c = vec![*declared_type];
            c.extend(init.iter().copied());
            (Some(format!("{}#{index}", resolve(*name))), c)
        }
        NodePayload::ConstDcl { name, declared_type, value } => {
            let mut c: Vec<NodeId> = declared_type.iter().copied().collect();
            c.push(*value);
            (Some(resolve(*name)), c)
        }
        NodePayload::Swap { lhs, rhs } => (None, vec![*lhs, *rhs]),
        NodePayload::Intrinsic { op } => (Some(resolve(*op)), vec![]),
        NodePayload::Typedef { name, aliased } => (Some(resolve(*name)), vec![*aliased]),
        NodePayload::UIntLit { value } => (Some(value.to_string()), vec![]),
        NodePayload::FloatLit { value } => (Some(value.to_string()), vec![]),
        NodePayload::StringLit { value } => (Some(resolve(*value)), vec![]),
        NodePayload::ArrayLit { elements } => (None, elements.to_vec()),
        NodePayload::TypeLit { ty, fields } => {
            let mut c = vec![*ty];
            c.extend(fields.iter().copied());
            (None, c)
        }
        NodePayload::NamedVal { name, value } => (Some(resolve(*name)), vec![*value]),
        NodePayload::VTuple { elements } => (None, elements.to_vec()),
        NodePayload::NameUse { name, .. } => (Some(resolve(*name)), vec![]),
        NodePayload::FnCall { callee, args, methfld } => {
            let mut c = vec![*callee];
            c.extend(args.iter().copied());
            (methfld.map(resolve), c)
        }
        NodePayload::ArrIndex { array, index } => (None, vec![*array, *index]),
        NodePayload::FldAccess { object, field, .. } => (Some(resolve(*field)), vec![*object]),
        NodePayload::Assign { lval, rval } => (None, vec![*lval, *rval]),
        NodePayload::Cast { value, target, reinterpret } => {
            (Some(format!("reinterpret={reinterpret}")), vec![*value, *target])
        }
        NodePayload::Is { value, guard } => {
            let detail = guard.bound_name.map(resolve);
            (detail, vec![*value, guard.ty])
        }
        NodePayload::Deref { value } | NodePayload::Borrow { value } => (None, vec![*value]),
        NodePayload::ArrayBorrow { value, start, end } => {
            let mut c = vec![*value];
            c.extend(start.iter().copied());
            c.extend(end.iter().copied());
            (None, c)
        }
        NodePayload::Allocate { region, value } => (Some(resolve(*region)), vec![*value]),
        NodePayload::ArrayAlloc { region, count, element_type } => {
            (Some(resolve(*region)), vec![*count, *element_type])
        }
        NodePayload::Sizeof { ty } => (None, vec![*ty]),
        NodePayload::Logic { op, operands } => (Some(format!("{op:?}")), operands.to_vec()),
        NodePayload::Alias { value, inc } => (Some(format!("inc={inc}")), vec![*value]),
        NodePayload::Block { stmts, dealias } => {
            let mut c = stmts.to_vec();
            c.extend(dealias.iter().copied());
            (None, c)
        }
        NodePayload::LoopBlock { body, label } => (label.map(resolve), vec![*body]),
        NodePayload::If { arms, else_arm } => {
            let mut c = Vec::new();
            for (cond, body) in arms {
                c.push(*cond);
                c.push(*body);
            }
            c.extend(else_arm.iter().copied());
            (None, c)
        }
        NodePayload::FnSig { params, ret, variadic } => {
            let mut c = params.to_vec();
            c.push(*ret);
            (Some(format!("variadic={variadic}")), c)
        }
        NodePayload::Ref { region, perm, target } | NodePayload::ArrayRef { region, perm, target } => {
            (Some(resolve(*region)), vec![*perm, *target])
        }
        NodePayload::VirtRef { perm, target } => (None, vec![*perm, *target]),
        NodePayload::Ptr { target } => (None, vec![*target]),
        NodePayload::Array { size, element } => (Some(size.to_string()), vec![*element]),
        NodePayload::ArrayDeref { element } => (None, vec![*element]),
        NodePayload::TTuple { elements } => (None, elements.to_vec()),
        NodePayload::IntNbr { name, bits }
        | NodePayload::UintNbr { name, bits }
        | NodePayload::FloatNbr { name, bits } => (Some(format!("{}:{bits}", resolve(*name))), vec![]),
        NodePayload::Struct { name, fields, methods, basetrait, .. } => {
            let mut c = fields.to_vec();
            c.extend(methods.iter().copied());
            c.extend(basetrait.iter().copied());
            (Some(resolve(*name)), c)
        }
        NodePayload::Enum { name, variants } => (Some(resolve(*name)), variants.to_vec()),
        NodePayload::Perm { name, .. } => (Some(resolve(*name)), vec![]),
        NodePayload::Region { name, rc } => (Some(format!("{}{}", resolve(*name), if *rc { " rc" } else { "" })), vec![]),
        NodePayload::Lifetime { name } => (Some(resolve(*name)), vec![]),
        NodePayload::TypedefType { name, aliased } => (Some(resolve(*name)), vec![*aliased]),
        NodePayload::Generic { name, params, body } => {
            let mut c = params.to_vec();
            c.push(*body);
            (Some(resolve(*name)), c)
        }
        NodePayload::Macro { name, params, body } => {
            let names = params.iter().map(|a| resolve(*a)).collect::<Vec<_>>().join(", ");
            (Some(format!("{}({names})", resolve(*name))), vec![*body])
        }
        NodePayload::GenVarDcl { name, bound } => (Some(resolve(*name)), bound.iter().copied().collect()),
        NodePayload::GenVarUse { name, .. } => (Some(resolve(*name)), vec![]),
    };

    IrDump { tag, detail, children: children.into_iter().map(|c| dump_node(program, c)).collect() }
}

/// Renders a dump tree with `|  ` indentation per nesting level, one node
/// per line, per the printed-IR-dump format.
pub fn render_text(dump: &IrDump, depth: usize, out: &mut String) {
    out.push_str(&"|  ".repeat(depth));
    out.push_str(&dump.tag);
    if let Some(detail) = &dump.detail {
        out.push_str(" \"");
        out.push_str(detail);
        out.push('"');
    }
    out.push('\n');
    for child in &dump.children {
        render_text(child, depth + 1, out);
    }
}
