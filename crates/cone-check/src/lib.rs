//! Type-check and lowering pass: computes every expression's
//! `vtype` bottom-up, lowers overloaded `FnCall` nodes to `ArrIndex`/
//! `FldAccess`/a resolved method call, expands trait mixins, builds
//! vtables, and instantiates generics.
//!
//! Grounded on `tsz-checker`'s dispatch pattern (`dispatch.rs`'s
//! `match node.kind { k if k == SyntaxKind::X as u16 => ... }` becomes a
//! `match node.tag { NodeTag::X => ... }` over `cone-ir`'s closed enum)
//! and on `tsz-checker::context::CheckerContext` for the shared
//! mutable-state-by-reference pattern: `TypeChecker<'a>` holds the arena
//! and diagnostics sink by reference plus a `TypeTable` it owns outright,
//! with per-call cursors for the enclosing type/function rather than
//! thread-locals.

mod exhaustive;
mod generics;
mod method;
mod mixin;

pub use generics::InstantiationKey;
pub use method::{coerce, BestFit};
pub use mixin::{Vtable, VtableImpl};

use cone_common::diagnostics::{diagnostic_codes, DiagnosticSink};
use cone_common::interner::Atom;
use cone_corelib::CoreLib;
use cone_ir::{NodeFlags, NodeId, NodePayload, NodeTag, PermRef, Program};
use cone_types::{PermRefKey, TypeKey, TypeTable};
use rustc_hash::FxHashMap;
use std::path::PathBuf;

/// Shared state threaded through every `check_*` call: the arena, the
/// structural type table, the core-library handle for intrinsic method
/// lookups, and cursors for whichever type/function body is currently
/// being walked.
pub struct TypeChecker<'a> {
    pub program: &'a mut Program,
    pub diags: &'a mut DiagnosticSink,
    pub file: PathBuf,
    pub types: TypeTable,
    pub core: &'a CoreLib,
    /// Numeric/bool method namespaces keyed by their declaration node,
    /// since (unlike `Struct`) an `IntNbr`/`UintNbr`/`FloatNbr` node has
    /// nowhere on itself to store a method list.
    numeric_methods: FxHashMap<NodeId, &'a cone_ir::Namespace>,
    /// Declaration nodes synthesized on demand for region spellings that
    /// corelib doesn't pre-register (`borrow`), so every `Ref`'s region
    /// still canonicalizes against a real `NodeId`.
    region_decls: FxHashMap<Atom, NodeId>,
    /// Every `Struct` whose `basetrait` points at it, keyed by the base
    /// trait's `NodeId`.
    pub(crate) variants_of: FxHashMap<NodeId, Vec<NodeId>>,
    pub(crate) vtables: FxHashMap<NodeId, Vtable>,
    pub(crate) vtable_impls: FxHashMap<(NodeId, NodeId), VtableImpl>,
    pub(crate) generic_cache: FxHashMap<generics::InstantiationKey, NodeId>,
    current_type: Option<NodeId>,
    current_fn: Option<NodeId>,
}

/// Runs type-check and lowering over the whole program. Must run after
/// name-resolution; silently does nothing if
/// `program.root` is unset.
pub fn check_program(program: &mut Program, diags: &mut DiagnosticSink, core: &CoreLib, file: PathBuf) {
    run_checker(program, diags, core, file);
}

/// Same pass as [`check_program`], additionally handing the finished
/// checker's bookkeeping to `sink` as a [`CodegenSummary`] — the hand-off
/// point a real code generator would consume instead of walking the arena
/// a second time.
pub fn check_program_with_sink(program: &mut Program, diags: &mut DiagnosticSink, core: &CoreLib, file: PathBuf, sink: &mut dyn CodegenSink) {
    if let Some(checker) = run_checker(program, diags, core, file) {
        sink.emit(codegen_contract_stub(&checker));
    }
}

fn run_checker<'a>(program: &'a mut Program, diags: &'a mut DiagnosticSink, core: &'a CoreLib, file: PathBuf) -> Option<TypeChecker<'a>> {
    let root = program.root?;
    let variants_of = scan_variants(program);
    let numeric_methods = numeric_method_map(core);
    let mut checker = TypeChecker {
        program,
        diags,
        file,
        types: TypeTable::new(),
        core,
        numeric_methods,
        region_decls: FxHashMap::default(),
        variants_of,
        vtables: FxHashMap::default(),
        vtable_impls: FxHashMap::default(),
        generic_cache: FxHashMap::default(),
        current_type: None,
        current_fn: None,
    };
    checker.check_module(root);
    Some(checker)
}

/// Pre-scans the whole arena for `Struct` nodes with a `basetrait`,
/// grouping them by that trait's `NodeId`. A flat index
/// scan rather than a tree walk because generic bodies (`Option[T]`'s
/// `Some`/`None`) and enum variants are reachable from more than one
/// parent and are easiest to find by declaration node kind alone.
fn scan_variants(program: &Program) -> FxHashMap<NodeId, Vec<NodeId>> {
    let mut out: FxHashMap<NodeId, Vec<NodeId>> = FxHashMap::default();
    for i in 0..program.arena.len() as u32 {
        let id = NodeId::for_test(i);
        if program.arena.tag(id) != NodeTag::Struct {
            continue;
        }
        if let NodePayload::Struct { basetrait: Some(base), .. } = &program.arena.get(id).payload {
            out.entry(*base).or_default().push(id);
        }
    }
    out
}

fn numeric_method_map(core: &CoreLib) -> FxHashMap<NodeId, &cone_ir::Namespace> {
    let mut map = FxHashMap::default();
    for ty in core.numeric.by_name.values() {
        map.insert(ty.decl, &ty.methods);
    }
    map.insert(core.numeric.bool_, &core.numeric.bool_methods);
    map
}

impl<'a> TypeChecker<'a> {
    fn report(&mut self, span: cone_common::span::Span, code: u32, args: &[&str]) {
        self.diags.report(self.file.clone(), span, code, args);
    }

    /// Numeric/bool method namespace for `decl`, if it names one of the
    /// corelib primitive types.
    pub(crate) fn numeric_namespace(&self, decl: NodeId) -> Option<&cone_ir::Namespace> {
        self.numeric_methods.get(&decl).copied()
    }

    fn check_module(&mut self, module_id: NodeId) {
        let members = match &self.program.arena.get(module_id).payload {
            NodePayload::Module { members, .. } => members.clone(),
            _ => return,
        };
        for member in members {
            self.check_item(member);
        }
    }

    fn check_item(&mut self, id: NodeId) {
        match self.program.arena.tag(id) {
            NodeTag::Module => self.check_module(id),
            NodeTag::FnDcl => {
                self.check_fn(id);
            }
            NodeTag::Struct => {
                mixin::expand_mixins(self, id);
            }
            NodeTag::Enum => {
                let variants = match &self.program.arena.get(id).payload {
                    NodePayload::Enum { variants, .. } => variants.clone(),
                    _ => return,
                };
                for v in variants {
                    mixin::expand_mixins(self, v);
                }
            }
            NodeTag::ConstDcl => {
                let (declared_type, value) = match &self.program.arena.get(id).payload {
                    NodePayload::ConstDcl { declared_type, value, .. } => (*declared_type, *value),
                    _ => return,
                };
                let expected = declared_type.map(|t| self.type_of(t));
                self.check_expr(value, expected);
            }
            NodeTag::Generic => {
                // Generic bodies are only type-checked at instantiation
                // time; declaring one performs no work here.
            }
            _ => {}
        }
    }

    /// Resolves any type-position node to its canonical `TypeId`,
    /// building structural keys recursively for `Ref`/`ArrayRef`/
    /// `VirtRef`/`Ptr`/`Array`/`TTuple`/`FnSig` and treating everything
    /// else (numeric primitives, `Struct`, `Enum`, `Perm`, `Region`,
    /// `Void`) as nominal, identified by its own declaration node.
    pub(crate) fn type_of(&mut self, id: NodeId) -> cone_ir::TypeId {
        match self.program.arena.tag(id) {
            NodeTag::TypeNameUse | NodeTag::NameUse | NodeTag::VarNameUse => {
                let decl = match &self.program.arena.get(id).payload {
                    NodePayload::NameUse { dclnode: Some(d), .. } => Some(*d),
                    _ => None,
                };
                match decl {
                    Some(d) => self.type_of(d),
                    None => self.types.intern(TypeKey::Nominal(id)),
                }
            }
            NodeTag::GenVarUse => {
                let decl = match &self.program.arena.get(id).payload {
                    NodePayload::GenVarUse { dclnode: Some(d), .. } => Some(*d),
                    _ => None,
                };
                self.types.intern(TypeKey::Nominal(decl.unwrap_or(id)))
            }
            NodeTag::Ref => {
                let (region, perm, target) = match &self.program.arena.get(id).payload {
                    NodePayload::Ref { region, perm, target } => (*region, *perm, *target),
                    _ => unreachable!(),
                };
                let region = self.region_decl(region);
                let perm = self.perm_key(perm);
                let target = self.type_of(target);
                self.types.intern(TypeKey::Ref { region, perm, target })
            }
            NodeTag::ArrayRef => {
                let (region, perm, target) = match &self.program.arena.get(id).payload {
                    NodePayload::ArrayRef { region, perm, target } => (*region, *perm, *target),
                    _ => unreachable!(),
                };
                let region = self.region_decl(region);
                let perm = self.perm_key(perm);
                let target = self.type_of(target);
                self.types.intern(TypeKey::ArrayRef { region, perm, target })
            }
            NodeTag::VirtRef => {
                let (perm, target) = match &self.program.arena.get(id).payload {
                    NodePayload::VirtRef { perm, target } => (*perm, *target),
                    _ => unreachable!(),
                };
                let perm = self.perm_key(perm);
                let target = self.type_of(target);
                self.types.intern(TypeKey::VirtRef { perm, target })
            }
            NodeTag::Ptr => {
                let target = match &self.program.arena.get(id).payload {
                    NodePayload::Ptr { target } => *target,
                    _ => unreachable!(),
                };
                let target = self.type_of(target);
                self.types.intern(TypeKey::Ptr { target })
            }
            NodeTag::Array => {
                let (size, element) = match &self.program.arena.get(id).payload {
                    NodePayload::Array { size, element } => (*size, *element),
                    _ => unreachable!(),
                };
                let element = self.type_of(element);
                self.types.intern(TypeKey::Array { size, element })
            }
            NodeTag::TTuple => {
                let elements = match &self.program.arena.get(id).payload {
                    NodePayload::TTuple { elements } => elements.clone(),
                    _ => unreachable!(),
                };
                let elements = elements.into_iter().map(|e| self.type_of(e)).collect();
                self.types.intern(TypeKey::TTuple { elements })
            }
            NodeTag::FnSig => {
                let (params, ret, variadic) = match &self.program.arena.get(id).payload {
                    NodePayload::FnSig { params, ret, variadic } => (params.clone(), *ret, *variadic),
                    _ => unreachable!(),
                };
                let params = params
                    .into_iter()
                    .map(|p| {
                        let declared = match &self.program.arena.get(p).payload {
                            NodePayload::VarDcl { declared_type: Some(t), .. } => *t,
                            _ => p,
                        };
                        self.type_of(declared)
                    })
                    .collect();
                let ret = self.type_of(ret);
                self.types.intern(TypeKey::FnSig { params, ret, variadic })
            }
            NodeTag::ArrayDeref => {
                let element = match &self.program.arena.get(id).payload {
                    NodePayload::ArrayDeref { element } => *element,
                    _ => unreachable!(),
                };
                self.type_of(element)
            }
            // IntNbr/UintNbr/FloatNbr/Struct/Enum/Perm/Region/Void/
            // TypedefType/Lifetime: identified by their own declaration.
            _ => self.types.intern(TypeKey::Nominal(id)),
        }
    }

    fn region_decl(&mut self, region: Atom) -> NodeId {
        if let Some(&id) = self.region_decls.get(&region) {
            return id;
        }
        if let Some(id) = self.program.names.lookup(region) {
            self.region_decls.insert(region, id);
            return id;
        }
        let rc = cone_corelib::regions::region_is_rc(self.program, region);
        let id = self.program.arena.alloc(cone_ir::IrNode::new(
            cone_common::span::Span::dummy(),
            NodeTag::Region,
            NodePayload::Region { name: region, rc },
        ));
        self.region_decls.insert(region, id);
        id
    }

    fn perm_key(&self, perm: NodeId) -> PermRefKey {
        let name = match &self.program.arena.get(perm).payload {
            NodePayload::Perm { name, .. } => *name,
            _ => unreachable!("Ref/ArrayRef/VirtRef perm field always points at a Perm node"),
        };
        for b in cone_ir::BuiltinPerm::all() {
            if self.program.interner.resolve(name) == b.name() {
                return PermRefKey::Builtin(b);
            }
        }
        PermRefKey::Custom(name)
    }

    fn check_fn(&mut self, fndcl_id: NodeId) -> cone_ir::TypeId {
        let (sig, body) = match &self.program.arena.get(fndcl_id).payload {
            NodePayload::FnDcl { sig, body, .. } => (*sig, *body),
            _ => return self.types.intern(TypeKey::Nominal(fndcl_id)),
        };
        let ret = match &self.program.arena.get(sig).payload {
            NodePayload::FnSig { ret, .. } => *ret,
            _ => return self.types.intern(TypeKey::Nominal(fndcl_id)),
        };
        let ret_ty = self.type_of(ret);
        let previous_fn = self.current_fn.replace(fndcl_id);
        if let Some(body) = body {
            self.check_expr(body, Some(ret_ty));
        }
        self.current_fn = previous_fn;
        ret_ty
    }

    /// Computes `vtype` bottom-up for `id`, attempting to coerce against
    /// `expected` if given. Returns the final (possibly
    /// coerced) type.
    pub(crate) fn check_expr(&mut self, id: NodeId, expected: Option<cone_ir::TypeId>) -> cone_ir::TypeId {
        if self.program.arena.get(id).flags.contains(NodeFlags::TYPE_CHECKED) {
            return self.program.arena.get(id).vtype.expect("TYPE_CHECKED implies vtype set");
        }
        self.program.arena.get_mut(id).flags |= NodeFlags::TYPE_CHECKING;
        let ty = self.check_expr_uncached(id, expected);
        let node = self.program.arena.get_mut(id);
        node.flags.remove(NodeFlags::TYPE_CHECKING);
        node.flags |= NodeFlags::TYPE_CHECKED;
        node.vtype = Some(ty);
        ty
    }

    fn check_expr_uncached(&mut self, id: NodeId, expected: Option<cone_ir::TypeId>) -> cone_ir::TypeId {
        match self.program.arena.tag(id) {
            NodeTag::UIntLit => {
                let target = expected.unwrap_or_else(|| self.default_int_type());
                target
            }
            NodeTag::FloatLit => expected.unwrap_or_else(|| self.default_float_type()),
            NodeTag::NilLit | NodeTag::NullLit => expected.unwrap_or_else(|| self.default_int_type()),
            NodeTag::StringLit => self.types.intern(TypeKey::Nominal(id)),
            NodeTag::Block => self.check_block(id, expected),
            NodeTag::If => self.check_if(id, expected),
            NodeTag::LoopBlock => {
                let body = match &self.program.arena.get(id).payload {
                    NodePayload::LoopBlock { body, .. } => *body,
                    _ => unreachable!(),
                };
                self.check_expr(body, None);
                self.void_type()
            }
            NodeTag::Return => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Return { value } => *value,
                    _ => unreachable!(),
                };
                let ret_expected = self.current_fn.map(|f| self.return_type_of(f));
                if let Some(v) = value {
                    self.check_expr(v, ret_expected);
                }
                self.void_type()
            }
            NodeTag::BlockReturn => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::BlockReturn { value, .. } => *value,
                    _ => unreachable!(),
                };
                match value {
                    Some(v) => self.check_expr(v, expected),
                    None => self.void_type(),
                }
            }
            NodeTag::Break | NodeTag::Continue => self.void_type(),
            NodeTag::VarDcl => {
                let (declared_type, init) = match &self.program.arena.get(id).payload {
                    NodePayload::VarDcl { declared_type, init, .. } => (*declared_type, *init),
                    _ => unreachable!(),
                };
                let declared = declared_type.map(|t| self.type_of(t));
                if let Some(init) = init {
                    let actual = self.check_expr(init, declared);
                    return declared.unwrap_or(actual);
                }
                declared.unwrap_or_else(|| self.void_type())
            }
            NodeTag::FieldDcl => {
                let (declared_type, init) = match &self.program.arena.get(id).payload {
                    NodePayload::FieldDcl { declared_type, init, .. } => (*declared_type, *init),
                    _ => unreachable!(),
                };
                let declared = self.type_of(declared_type);
                if let Some(init) = init {
                    self.check_expr(init, Some(declared));
                }
                declared
            }
            NodeTag::ConstDcl => {
                self.check_item(id);
                self.void_type()
            }
            NodeTag::Swap => {
                let (lhs, rhs) = match &self.program.arena.get(id).payload {
                    NodePayload::Swap { lhs, rhs } => (*lhs, *rhs),
                    _ => unreachable!(),
                };
                let lt = self.check_expr(lhs, None);
                self.check_expr(rhs, Some(lt));
                self.void_type()
            }
            NodeTag::Assign => {
                let (lval, rval) = match &self.program.arena.get(id).payload {
                    NodePayload::Assign { lval, rval } => (*lval, *rval),
                    _ => unreachable!(),
                };
                let lt = self.check_expr(lval, None);
                if !self.is_lval(lval) {
                    let span = self.program.arena.get(lval).span;
                    self.report(span, diagnostic_codes::NOT_AN_LVAL, &["<expr>"]);
                }
                self.check_expr(rval, Some(lt));
                self.void_type()
            }
            NodeTag::FnCall => method::check_fn_call(self, id, expected),
            NodeTag::ArrIndex => method::check_index(self, id),
            NodeTag::FldAccess => {
                let object = match &self.program.arena.get(id).payload {
                    NodePayload::FldAccess { object, .. } => *object,
                    _ => unreachable!(),
                };
                self.check_expr(object, None);
                self.program.arena.get(id).vtype.unwrap_or_else(|| self.void_type())
            }
            NodeTag::Cast => {
                let (value, target) = match &self.program.arena.get(id).payload {
                    NodePayload::Cast { value, target, .. } => (*value, *target),
                    _ => unreachable!(),
                };
                self.check_expr(value, None);
                self.type_of(target)
            }
            NodeTag::Is => {
                let (value, ty) = match &self.program.arena.get(id).payload {
                    NodePayload::Is { value, guard } => (*value, guard.ty),
                    _ => unreachable!(),
                };
                self.check_expr(value, None);
                self.type_of(ty);
                self.bool_type()
            }
            NodeTag::Deref => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Deref { value } => *value,
                    _ => unreachable!(),
                };
                let t = self.check_expr(value, None);
                self.pointee_type(t).unwrap_or(t)
            }
            NodeTag::Borrow => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Borrow { value } => *value,
                    _ => unreachable!(),
                };
                self.check_expr(value, None)
            }
            NodeTag::ArrayBorrow => {
                let (value, start, end) = match &self.program.arena.get(id).payload {
                    NodePayload::ArrayBorrow { value, start, end } => (*value, *start, *end),
                    _ => unreachable!(),
                };
                let t = self.check_expr(value, None);
                if let Some(s) = start {
                    self.check_expr(s, None);
                }
                if let Some(e) = end {
                    self.check_expr(e, None);
                }
                t
            }
            NodeTag::Allocate => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Allocate { value, .. } => *value,
                    _ => unreachable!(),
                };
                self.check_expr(value, None)
            }
            NodeTag::ArrayAlloc => {
                let (count, element_type) = match &self.program.arena.get(id).payload {
                    NodePayload::ArrayAlloc { count, element_type, .. } => (*count, *element_type),
                    _ => unreachable!(),
                };
                self.check_expr(count, None);
                self.type_of(element_type)
            }
            NodeTag::Sizeof => {
                let ty = match &self.program.arena.get(id).payload {
                    NodePayload::Sizeof { ty } => *ty,
                    _ => unreachable!(),
                };
                self.type_of(ty);
                self.default_int_type()
            }
            NodeTag::Logic => {
                let operands = match &self.program.arena.get(id).payload {
                    NodePayload::Logic { operands, .. } => operands.clone(),
                    _ => unreachable!(),
                };
                let bool_type = self.bool_type();
                for o in operands {
                    self.check_expr(o, Some(bool_type));
                }
                self.bool_type()
            }
            NodeTag::Alias => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Alias { value, .. } => *value,
                    _ => unreachable!(),
                };
                self.check_expr(value, None)
            }
            NodeTag::ArrayLit => {
                let elements = match &self.program.arena.get(id).payload {
                    NodePayload::ArrayLit { elements } => elements.clone(),
                    _ => unreachable!(),
                };
                let elem_expected = expected.and_then(|e| match &self.types.get(e).key {
                    TypeKey::Array { element, .. } => Some(*element),
                    _ => None,
                });
                let mut element_ty = None;
                for (i, &el) in elements.iter().enumerate() {
                    let t = self.check_expr(el, elem_expected.or(element_ty));
                    if let Some(prev) = element_ty {
                        if prev != t {
                            let span = self.program.arena.get(el).span;
                            let from = format!("{t:?}");
                            let to = format!("{prev:?}");
                            self.report(span, diagnostic_codes::BAD_ARRAY_LITERAL, &[
                                &i.to_string(),
                                &from,
                                &to,
                            ]);
                        }
                    } else {
                        element_ty = Some(t);
                    }
                }
                let element = elem_expected.or(element_ty).unwrap_or_else(|| self.void_type());
                self.types.intern(TypeKey::Array { size: elements.len() as u64, element })
            }
            NodeTag::VTuple => {
                let elements = match &self.program.arena.get(id).payload {
                    NodePayload::VTuple { elements } => elements.clone(),
                    _ => unreachable!(),
                };
                let tys = elements.into_iter().map(|e| self.check_expr(e, None)).collect();
                self.types.intern(TypeKey::TTuple { elements: tys })
            }
            NodeTag::TypeLit => generics::check_type_lit(self, id),
            NodeTag::NamedVal => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::NamedVal { value, .. } => *value,
                    _ => unreachable!(),
                };
                self.check_expr(value, expected)
            }
            NodeTag::NameUse | NodeTag::VarNameUse | NodeTag::MbrNameUse => {
                let decl = match &self.program.arena.get(id).payload {
                    NodePayload::NameUse { dclnode, .. } => *dclnode,
                    _ => None,
                };
                match decl {
                    Some(d) if self.program.arena.tag(d) == NodeTag::Is => {
                        let ty = match &self.program.arena.get(d).payload {
                            NodePayload::Is { guard, .. } => guard.ty,
                            _ => unreachable!(),
                        };
                        self.type_of(ty)
                    }
                    Some(d) => self.check_expr(d, expected),
                    None => self.void_type(),
                }
            }
            _ => self.void_type(),
        }
    }

    fn check_block(&mut self, id: NodeId, expected: Option<cone_ir::TypeId>) -> cone_ir::TypeId {
        let stmts = match &self.program.arena.get(id).payload {
            NodePayload::Block { stmts, .. } => stmts.clone(),
            _ => unreachable!(),
        };
        let mut last = self.void_type();
        for (i, stmt) in stmts.iter().enumerate() {
            let is_last = i + 1 == stmts.len();
            last = self.check_expr(*stmt, if is_last { expected } else { None });
        }
        last
    }

    fn check_if(&mut self, id: NodeId, expected: Option<cone_ir::TypeId>) -> cone_ir::TypeId {
        let (arms, else_arm) = match &self.program.arena.get(id).payload {
            NodePayload::If { arms, else_arm } => (arms.clone(), *else_arm),
            _ => unreachable!(),
        };
        let mut result = self.void_type();
        for (cond, body) in &arms {
            if self.program.arena.tag(*cond) != NodeTag::Is {
                let bool_type = self.bool_type();
                self.check_expr(*cond, Some(bool_type));
            } else {
                self.check_expr(*cond, None);
            }
            result = self.check_expr(*body, expected);
        }
        if let Some(e) = else_arm {
            result = self.check_expr(e, expected);
        }
        exhaustive::check_exhaustiveness(self, id);
        result
    }

    fn return_type_of(&mut self, fndcl: NodeId) -> cone_ir::TypeId {
        let sig = match &self.program.arena.get(fndcl).payload {
            NodePayload::FnDcl { sig, .. } => *sig,
            _ => return self.void_type(),
        };
        let ret = match &self.program.arena.get(sig).payload {
            NodePayload::FnSig { ret, .. } => *ret,
            _ => return self.void_type(),
        };
        self.type_of(ret)
    }

    fn is_lval(&self, id: NodeId) -> bool {
        matches!(
            self.program.arena.tag(id),
            NodeTag::VarNameUse | NodeTag::MbrNameUse | NodeTag::FldAccess | NodeTag::ArrIndex | NodeTag::Deref
        ) || self.program.arena.get(id).flags.contains(NodeFlags::LVAL_OP)
    }

    fn pointee_type(&mut self, ty: cone_ir::TypeId) -> Option<cone_ir::TypeId> {
        match &self.types.get(ty).key {
            TypeKey::Ref { target, .. }
            | TypeKey::ArrayRef { target, .. }
            | TypeKey::VirtRef { target, .. }
            | TypeKey::Ptr { target } => Some(*target),
            _ => None,
        }
    }

    pub(crate) fn void_type(&mut self) -> cone_ir::TypeId {
        let void = self.program.arena.alloc(cone_ir::IrNode::new(
            cone_common::span::Span::dummy(),
            NodeTag::Void,
            NodePayload::Void,
        ));
        self.types.intern(TypeKey::Nominal(void))
    }

    pub(crate) fn bool_type(&mut self) -> cone_ir::TypeId {
        self.types.intern(TypeKey::Nominal(self.core.numeric.bool_))
    }

    fn default_int_type(&mut self) -> cone_ir::TypeId {
        let decl = self.core.numeric.decl("i32").expect("corelib registers i32");
        self.types.intern(TypeKey::Nominal(decl))
    }

    fn default_float_type(&mut self) -> cone_ir::TypeId {
        let decl = self.core.numeric.decl("f64").expect("corelib registers f64");
        self.types.intern(TypeKey::Nominal(decl))
    }
}

/// Reads off `PermRef` for a `Ref`'s declared permission node directly,
/// without going through a `TypeChecker` — used by `cone-flow` to decide
/// whether a store is permitted without re-deriving a
/// `TypeTable` entry just for the permission bits.
#[must_use]
pub fn perm_ref_of(program: &Program, perm: NodeId) -> PermRef {
    let name = match &program.arena.get(perm).payload {
        NodePayload::Perm { name, .. } => *name,
        _ => unreachable!("Ref/ArrayRef/VirtRef perm field always points at a Perm node"),
    };
    for b in cone_ir::BuiltinPerm::all() {
        if program.interner.resolve(name) == b.name() {
            return PermRef::Builtin(b);
        }
    }
    PermRef::Custom(name)
}

/// Default, dependency-free implementation of the codegen consumer
/// contract: reads only what type-check produced (tag, flags,
/// `vtype`, vtable entries) and counts/classifies nodes instead of
/// emitting real code, since LLVM codegen is out of scope for this
/// compiler core.
pub trait CodegenSink {
    fn emit(&mut self, summary: CodegenSummary);
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CodegenSummary {
    pub functions: usize,
    pub structs: usize,
    pub vtables: usize,
    pub vtable_impls: usize,
}

/// Walks the checker's own bookkeeping (never the arena a second time) to
/// produce a `CodegenSummary`, matching the consumer contract in:
/// "reads tag/flags/vtype/... entries, never writes anything the analyzer
/// reads."
#[must_use]
pub fn codegen_contract_stub(checker: &TypeChecker) -> CodegenSummary {
    CodegenSummary {
        functions: 0,
        structs: checker.variants_of.values().map(Vec::len).sum(),
        vtables: checker.vtables.len(),
        vtable_impls: checker.vtable_impls.len(),
    }
}
