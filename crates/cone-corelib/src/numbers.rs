//! Numeric primitive types and their intrinsic method suites (spec §4.4:
//! "permissions, numeric intrinsics"). Grounded on `tsz-binder`'s
//! `lib_loader`/`state_lib_merge` pattern of synthesizing declarations at
//! bootstrap time rather than parsing them from a prelude source file —
//! there is no Cone source for `i32.+`, only the table below.
//!
//! Each numeric type is an `IntNbr`/`UintNbr`/`FloatNbr` node (no fields
//! for a method list, unlike `Struct`); the method each name resolves to
//! lives in a side `Namespace` returned alongside the type's `NodeId`,
//! since there's nowhere on the node itself to put it.

use cone_common::interner::Atom;
use cone_common::span::Span;
use cone_ir::{IrNode, Namespace, NodeFlags, NodeId, NodePayload, NodeTag, Program};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// One registered numeric type: its declaration node and the methods
/// callable on a value of that type.
pub struct NumericType {
    pub decl: NodeId,
    pub methods: Namespace,
}

pub struct NumericTypes {
    pub by_name: FxHashMap<&'static str, NumericType>,
    pub bool_: NodeId,
    pub bool_methods: Namespace,
}

impl NumericTypes {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NumericType> {
        self.by_name.get(name)
    }

    #[must_use]
    pub fn decl(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).map(|t| t.decl)
    }
}

const SIGNED: &[(&str, u32)] = &[("i8", 8), ("i16", 16), ("i32", 32), ("i64", 64), ("isize", 64)];
const UNSIGNED: &[(&str, u32)] =
    &[("u8", 8), ("u16", 16), ("u32", 32), ("u64", 64), ("usize", 64)];
const FLOATS: &[(&str, u32)] = &[("f32", 32), ("f64", 64)];

const ARITH: &[&str] = &["+", "-", "*", "/", "%"];
const BITWISE: &[&str] = &["&", "|", "^", "<<", ">>"];
const COMPARE: &[&str] = &["==", "!=", "<", "<=", ">", ">="];
const FLOAT_ARITH: &[&str] = &["+", "-", "*", "/"];
const FLOAT_UNARY_METHODS: &[&str] = &["sqrt", "sin", "cos"];

pub fn register_numeric_types(program: &mut Program) -> NumericTypes {
    // `bool` is bootstrapped first: every comparison operator across every
    // numeric type returns it.
    let (bool_, bool_methods) = build_bool(program);

    let mut by_name = FxHashMap::default();
    for &(name, bits) in SIGNED {
        by_name.insert(name, build_integer(program, name, bits, true, bool_));
    }
    for &(name, bits) in UNSIGNED {
        by_name.insert(name, build_integer(program, name, bits, false, bool_));
    }
    for &(name, bits) in FLOATS {
        by_name.insert(name, build_float(program, name, bits, bool_));
    }

    NumericTypes { by_name, bool_, bool_methods }
}

fn alloc_type(program: &mut Program, name: &str, tag: NodeTag, bits: u32) -> NodeId {
    let atom = program.interner.intern(name);
    let payload = match tag {
        NodeTag::IntNbr => NodePayload::IntNbr { name: atom, bits },
        NodeTag::UintNbr => NodePayload::UintNbr { name: atom, bits },
        NodeTag::FloatNbr => NodePayload::FloatNbr { name: atom, bits },
        _ => unreachable!("alloc_type only used for numeric node tags"),
    };
    let id = program.arena.alloc(IrNode::new(Span::dummy(), tag, payload));
    program.names.hook(atom, id);
    id
}

/// Builds a zero- or one-argument intrinsic method: a `FnDcl` whose body
/// is a single `Intrinsic` node tagging the operation, plus the interned
/// `Atom` for its name (callers insert it into a `Namespace` directly so
/// nothing has to re-intern an already-known string).
fn intrinsic_method(
    program: &mut Program,
    op: &str,
    self_ty: NodeId,
    has_rhs: bool,
    ret: NodeId,
) -> (Atom, NodeId) {
    let op_atom = program.interner.intern(op);
    let mut params = SmallVec::new();
    if has_rhs {
        let rhs_name = program.interner.intern("rhs");
        let rhs = program.arena.alloc(IrNode::new(
            Span::dummy(),
            NodeTag::VarDcl,
            NodePayload::VarDcl { name: rhs_name, declared_type: Some(self_ty), init: None },
        ));
        params.push(rhs);
    }
    let sig = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::FnSig,
        NodePayload::FnSig { params, ret, variadic: false },
    ));
    let intrinsic_node = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::Intrinsic,
        NodePayload::Intrinsic { op: op_atom },
    ));
    let fndcl = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::FnDcl,
        NodePayload::FnDcl { name: op_atom, sig, body: Some(intrinsic_node) },
    ));
    program.arena.get_mut(fndcl).flags |= NodeFlags::METH_PROP;
    (op_atom, fndcl)
}

fn build_integer(
    program: &mut Program,
    name: &'static str,
    bits: u32,
    signed: bool,
    bool_ty: NodeId,
) -> NumericType {
    let tag = if signed { NodeTag::IntNbr } else { NodeTag::UintNbr };
    let decl = alloc_type(program, name, tag, bits);
    let mut methods = Namespace::new();

    for &op in ARITH.iter().chain(BITWISE) {
        let (atom, m) = intrinsic_method(program, op, decl, true, decl);
        methods.insert(atom, m);
    }
    for &op in COMPARE {
        let (atom, m) = intrinsic_method(program, op, decl, true, bool_ty);
        methods.insert(atom, m);
    }
    let (atom, m) = intrinsic_method(program, "~", decl, false, decl);
    methods.insert(atom, m);
    if signed {
        let (atom, m) = intrinsic_method(program, "neg", decl, false, decl);
        methods.insert(atom, m);
    }
    for &op in &["_++", "_--"] {
        let (atom, m) = intrinsic_method(program, op, decl, false, decl);
        methods.insert(atom, m);
    }

    NumericType { decl, methods }
}

fn build_float(program: &mut Program, name: &'static str, bits: u32, bool_ty: NodeId) -> NumericType {
    let decl = alloc_type(program, name, NodeTag::FloatNbr, bits);
    let mut methods = Namespace::new();
    for &op in FLOAT_ARITH {
        let (atom, m) = intrinsic_method(program, op, decl, true, decl);
        methods.insert(atom, m);
    }
    for &op in COMPARE {
        let (atom, m) = intrinsic_method(program, op, decl, true, bool_ty);
        methods.insert(atom, m);
    }
    let (atom, m) = intrinsic_method(program, "neg", decl, false, decl);
    methods.insert(atom, m);
    for &op in FLOAT_UNARY_METHODS {
        let (atom, m) = intrinsic_method(program, op, decl, false, decl);
        methods.insert(atom, m);
    }
    NumericType { decl, methods }
}

/// `bool` is modeled as a one-bit `UintNbr` rather than a distinct tag:
/// the coercion table (spec §4.6.1) treats "any numeric -> bool" as a
/// nonzero test rather than an identity conversion, so `cone-check`
/// special-cases it by name instead of needing a `NodeTag::Bool`.
fn build_bool(program: &mut Program) -> (NodeId, Namespace) {
    let decl = alloc_type(program, "bool", NodeTag::UintNbr, 1);
    let mut methods = Namespace::new();
    for &op in &["==", "!=", "&", "|", "^"] {
        let (atom, m) = intrinsic_method(program, op, decl, true, decl);
        methods.insert(atom, m);
    }
    (decl, methods)
}
