//! Name-resolution pass (spec §4.5): binds every `NameUse` to its
//! declaration, re-tagging the generic `NameUse` the parser produces to
//! `VarNameUse`/`TypeNameUse`/`MbrNameUse` once the kind of thing it names
//! is known. Grounded on `tsz-binder`'s `state_binding.rs`/
//! `state_resolution.rs`/`state_module_binding.rs` split: module/struct
//! declarations are collected into a namespace up front (`collect`) so
//! forward references within a module or struct body work, while
//! block-local bindings are hooked one statement at a time as the walk
//! reaches them, so a local can't be used before its declaration — the
//! same split `tsz-binder` draws between its module-level "declare
//! everything, then bind" pass and its per-function sequential binding
//! pass.
//!
//! Unlike `tsz-binder`, an unresolved name here never aborts the pass
//! (spec §4.5's `ErrorUnkName`): the diagnostic is recorded, `dclnode`
//! stays `None`, and the walk continues so later errors in the same file
//! still surface in one run.

mod collect;

use cone_common::diagnostics::diagnostic_codes;
use cone_common::diagnostics::DiagnosticSink;
use cone_common::interner::Atom;
use cone_ir::{NodeFlags, NodeId, NodePayload, NodeTag, Program, ScopeMark};
use std::path::PathBuf;

pub use collect::Namespaces;

pub struct Resolver<'a> {
    program: &'a mut Program,
    diags: &'a mut DiagnosticSink,
    file: PathBuf,
    namespaces: Namespaces,
    /// The struct/trait whose method body is currently being walked, so a
    /// bare name that isn't a local can fall back to a field/method
    /// lookup (`MethFld`).
    current_type: Option<NodeId>,
}

/// Runs name resolution over the whole program rooted at `program.root`.
/// `file` is attached to every diagnostic this pass reports; like the
/// rest of this compiler's passes, it assumes one source file per run
/// (spec §6's single-file `conec` invocation).
pub fn resolve_program(program: &mut Program, diags: &mut DiagnosticSink, file: PathBuf) {
    let Some(root) = program.root else {
        return;
    };
    tracing::debug!(file = %file.display(), "resolving names");
    let namespaces = collect::collect_program(program, root);
    let mut resolver = Resolver { program, diags, file, namespaces, current_type: None };
    resolver.resolve_module(root);
}

impl<'a> Resolver<'a> {
    fn mark(&self) -> ScopeMark {
        self.program.names.mark()
    }

    fn unwind(&mut self, mark: ScopeMark) {
        self.program.names.unhook_all_in_scope(mark);
    }

    fn report_unknown(&mut self, span: cone_common::span::Span, name: Atom) {
        let text = self.program.interner.resolve(name).to_string();
        self.diags.report(self.file.clone(), span, diagnostic_codes::UNKNOWN_NAME, &[&text]);
    }

    fn resolve_module(&mut self, module_id: NodeId) {
        let mark = self.mark();
        if let Some(ns) = self.namespaces.modules.get(&module_id).cloned() {
            self.program.names.hook_namespace(&ns);
        }
        let members = match &self.program.arena.get(module_id).payload {
            NodePayload::Module { members, .. } => members.clone(),
            _ => return,
        };
        for member in members {
            self.resolve_item(member);
        }
        self.unwind(mark);
    }

    fn resolve_item(&mut self, id: NodeId) {
        match self.program.arena.tag(id) {
            NodeTag::Module => self.resolve_module(id),
            NodeTag::FnDcl => self.resolve_fn(id),
            NodeTag::Struct => self.resolve_struct(id),
            NodeTag::Enum => {
                let variants = match &self.program.arena.get(id).payload {
                    NodePayload::Enum { variants, .. } => variants.clone(),
                    _ => return,
                };
                for v in variants {
                    self.resolve_struct(v);
                }
            }
            NodeTag::Typedef => {
                let aliased = match &self.program.arena.get(id).payload {
                    NodePayload::Typedef { aliased, .. } => *aliased,
                    _ => return,
                };
                self.resolve_type(aliased);
            }
            NodeTag::ConstDcl => {
                let (declared_type, value) = match &self.program.arena.get(id).payload {
                    NodePayload::ConstDcl { declared_type, value, .. } => (*declared_type, *value),
                    _ => return,
                };
                if let Some(t) = declared_type {
                    self.resolve_type(t);
                }
                self.resolve_node(value);
            }
            NodeTag::Import => self.fold_import(id),
            NodeTag::Generic => {
                let (params, body) = match &self.program.arena.get(id).payload {
                    NodePayload::Generic { params, body, .. } => (params.clone(), *body),
                    _ => return,
                };
                let mark = self.mark();
                for p in &params {
                    let bound = match &self.program.arena.get(*p).payload {
                        NodePayload::GenVarDcl { name, .. } => Some(*name),
                        _ => None,
                    };
                    if let Some(name) = bound {
                        self.program.names.hook(name, *p);
                    }
                }
                self.resolve_item(body);
                self.unwind(mark);
            }
            NodeTag::Region => {}
            _ => {}
        }
    }

    fn resolve_fn(&mut self, fndcl_id: NodeId) {
        let (sig, body, is_method) = match &self.program.arena.get(fndcl_id).payload {
            NodePayload::FnDcl { sig, body, .. } => (*sig, *body, None),
            _ => return,
        };
        let is_method = is_method.unwrap_or_else(|| {
            self.program.arena.get(fndcl_id).flags.contains(NodeFlags::METH_PROP)
        });
        let mark = self.mark();
        if is_method {
            if let Some(owner) = self.current_type {
                self.program.names.hook(self.program.specials.this, owner);
                self.program.names.hook(self.program.specials.self_lower, owner);
            }
        }
        let (params, ret) = match &self.program.arena.get(sig).payload {
            NodePayload::FnSig { params, ret, .. } => (params.clone(), *ret),
            _ => (Default::default(), sig),
        };
        for &param in &params {
            let (name, declared_type) = match &self.program.arena.get(param).payload {
                NodePayload::VarDcl { name, declared_type, .. } => (*name, *declared_type),
                _ => continue,
            };
            if let Some(t) = declared_type {
                self.resolve_type(t);
            }
            self.program.names.hook(name, param);
        }
        self.resolve_type(ret);
        if let Some(body) = body {
            self.resolve_node(body);
        }
        self.unwind(mark);
    }

    fn resolve_struct(&mut self, struct_id: NodeId) {
        let (fields, methods) = match &self.program.arena.get(struct_id).payload {
            NodePayload::Struct { fields, methods, .. } => (fields.clone(), methods.clone()),
            _ => return,
        };
        let previous = self.current_type.replace(struct_id);
        for &field in &fields {
            // A `mixin Type` entry records the mixed-in type directly as
            // the field slot rather than a `FieldDcl`; only real fields
            // carry an initializer to resolve.
            let field_parts = match &self.program.arena.get(field).payload {
                NodePayload::FieldDcl { declared_type, init, .. } => Some((*declared_type, *init)),
                _ => None,
            };
            match field_parts {
                Some((declared_type, init)) => {
                    self.resolve_type(declared_type);
                    if let Some(init) = init {
                        self.resolve_node(init);
                    }
                }
                None => self.resolve_type(field),
            }
        }
        for &method in &methods {
            self.resolve_fn(method);
        }
        self.current_type = previous;
    }

    /// `include a::b::c` resolves `a`, then walks `b`, `c` through each
    /// successive module's collected namespace, hooking the final
    /// segment (or its alias) into the current scope. `include a::b::*`
    /// hooks every name in `b`'s namespace at once (spec §4.5's import
    /// folding).
    fn fold_import(&mut self, import_id: NodeId) {
        let (path, glob, alias) = match &self.program.arena.get(import_id).payload {
            NodePayload::Import { path, glob, alias } => (path.clone(), *glob, *alias),
            _ => return,
        };
        if path.is_empty() {
            return;
        }
        let span = self.program.arena.get(import_id).span;
        let Some(mut target) = self.program.names.lookup(path[0]) else {
            self.report_unknown(span, path[0]);
            return;
        };
        for &segment in &path[1..] {
            let Some(ns) = self.namespaces.modules.get(&target) else {
                self.report_unknown(span, segment);
                return;
            };
            let Some(next) = ns.lookup(segment) else {
                self.report_unknown(span, segment);
                return;
            };
            target = next;
        }
        if glob {
            if let Some(ns) = self.namespaces.modules.get(&target).cloned() {
                self.program.names.hook_namespace(&ns);
            }
        } else {
            let bound_name = alias.unwrap_or(*path.last().expect("path non-empty"));
            self.program.names.hook(bound_name, target);
        }
    }

    fn resolve_type(&mut self, id: NodeId) {
        match self.program.arena.tag(id) {
            NodeTag::TypeNameUse | NodeTag::NameUse => {
                let name = match &self.program.arena.get(id).payload {
                    NodePayload::NameUse { name, .. } => *name,
                    _ => return,
                };
                match self.program.names.lookup(name) {
                    Some(decl) => {
                        self.program.arena.retag(id, NodeTag::TypeNameUse);
                        if let NodePayload::NameUse { dclnode, .. } = &mut self.program.arena.get_mut(id).payload {
                            *dclnode = Some(decl);
                        }
                    }
                    None => {
                        let span = self.program.arena.get(id).span;
                        self.report_unknown(span, name);
                    }
                }
            }
            NodeTag::Ref => {
                let target = match &self.program.arena.get(id).payload {
                    NodePayload::Ref { target, .. } => *target,
                    _ => return,
                };
                self.resolve_type(target);
            }
            NodeTag::ArrayRef => {
                let target = match &self.program.arena.get(id).payload {
                    NodePayload::ArrayRef { target, .. } => *target,
                    _ => return,
                };
                self.resolve_type(target);
            }
            NodeTag::VirtRef => {
                let target = match &self.program.arena.get(id).payload {
                    NodePayload::VirtRef { target, .. } => *target,
                    _ => return,
                };
                self.resolve_type(target);
            }
            NodeTag::Ptr => {
                let target = match &self.program.arena.get(id).payload {
                    NodePayload::Ptr { target } => *target,
                    _ => return,
                };
                self.resolve_type(target);
            }
            NodeTag::Array => {
                let element = match &self.program.arena.get(id).payload {
                    NodePayload::Array { element, .. } => *element,
                    _ => return,
                };
                self.resolve_type(element);
            }
            NodeTag::ArrayDeref => {
                let element = match &self.program.arena.get(id).payload {
                    NodePayload::ArrayDeref { element } => *element,
                    _ => return,
                };
                self.resolve_type(element);
            }
            NodeTag::TTuple => {
                let elements = match &self.program.arena.get(id).payload {
                    NodePayload::TTuple { elements } => elements.clone(),
                    _ => return,
                };
                for e in elements {
                    self.resolve_type(e);
                }
            }
            NodeTag::FnSig => {
                let (params, ret) = match &self.program.arena.get(id).payload {
                    NodePayload::FnSig { params, ret, .. } => (params.clone(), *ret),
                    _ => return,
                };
                for p in params {
                    let declared_type = match &self.program.arena.get(p).payload {
                        NodePayload::VarDcl { declared_type, .. } => *declared_type,
                        _ => None,
                    };
                    if let Some(t) = declared_type {
                        self.resolve_type(t);
                    }
                }
                self.resolve_type(ret);
            }
            _ => {}
        }
    }

    /// Resolves a single expression/statement node, recursing into its
    /// children. Handles both statement forms (`Block`, `If`, `LoopBlock`,
    /// `Return`, ...) and expression forms in one walk, since Cone draws
    /// no hard line between them at this level (a `Block`'s last statement
    /// doubles as its value).
    fn resolve_node(&mut self, id: NodeId) {
        match self.program.arena.tag(id) {
            NodeTag::Block => {
                let stmts = match &self.program.arena.get(id).payload {
                    NodePayload::Block { stmts, .. } => stmts.clone(),
                    _ => return,
                };
                let mark = self.mark();
                for stmt in stmts {
                    self.resolve_node(stmt);
                    self.hook_if_binding(stmt);
                }
                self.unwind(mark);
            }
            NodeTag::If => {
                let (arms, else_arm) = match &self.program.arena.get(id).payload {
                    NodePayload::If { arms, else_arm } => (arms.clone(), *else_arm),
                    _ => return,
                };
                for (cond, body) in arms {
                    self.resolve_if_arm(cond, body);
                }
                if let Some(e) = else_arm {
                    self.resolve_node(e);
                }
            }
            NodeTag::LoopBlock => {
                let body = match &self.program.arena.get(id).payload {
                    NodePayload::LoopBlock { body, .. } => *body,
                    _ => return,
                };
                self.resolve_node(body);
            }
            NodeTag::Return => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Return { value } => *value,
                    _ => return,
                };
                if let Some(v) = value {
                    self.resolve_node(v);
                }
            }
            NodeTag::BlockReturn => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::BlockReturn { value, .. } => *value,
                    _ => return,
                };
                if let Some(v) = value {
                    self.resolve_node(v);
                }
            }
            NodeTag::Break | NodeTag::Continue => {}
            NodeTag::VarDcl => {
                let (declared_type, init) = match &self.program.arena.get(id).payload {
                    NodePayload::VarDcl { declared_type, init, .. } => (*declared_type, *init),
                    _ => return,
                };
                if let Some(t) = declared_type {
                    self.resolve_type(t);
                }
                if let Some(v) = init {
                    self.resolve_node(v);
                }
            }
            NodeTag::FieldDcl => {
                let (declared_type, init) = match &self.program.arena.get(id).payload {
                    NodePayload::FieldDcl { declared_type, init, .. } => (*declared_type, *init),
                    _ => return,
                };
                self.resolve_type(declared_type);
                if let Some(v) = init {
                    self.resolve_node(v);
                }
            }
            NodeTag::ConstDcl => self.resolve_item(id),
            NodeTag::Swap => {
                let (lhs, rhs) = match &self.program.arena.get(id).payload {
                    NodePayload::Swap { lhs, rhs } => (*lhs, *rhs),
                    _ => return,
                };
                self.resolve_node(lhs);
                self.resolve_node(rhs);
            }
            NodeTag::Assign => {
                let (lval, rval) = match &self.program.arena.get(id).payload {
                    NodePayload::Assign { lval, rval } => (*lval, *rval),
                    _ => return,
                };
                self.resolve_node(lval);
                self.resolve_node(rval);
            }
            NodeTag::FnCall => {
                let (callee, args) = match &self.program.arena.get(id).payload {
                    NodePayload::FnCall { callee, args, .. } => (*callee, args.clone()),
                    _ => return,
                };
                self.resolve_node(callee);
                for a in args {
                    self.resolve_node(a);
                }
            }
            NodeTag::ArrIndex => {
                let (array, index) = match &self.program.arena.get(id).payload {
                    NodePayload::ArrIndex { array, index } => (*array, *index),
                    _ => return,
                };
                self.resolve_node(array);
                self.resolve_node(index);
            }
            NodeTag::FldAccess => {
                let object = match &self.program.arena.get(id).payload {
                    NodePayload::FldAccess { object, .. } => *object,
                    _ => return,
                };
                self.resolve_node(object);
            }
            NodeTag::Cast => {
                let (value, target) = match &self.program.arena.get(id).payload {
                    NodePayload::Cast { value, target, .. } => (*value, *target),
                    _ => return,
                };
                self.resolve_node(value);
                self.resolve_type(target);
            }
            NodeTag::Is => {
                let (value, ty) = match &self.program.arena.get(id).payload {
                    NodePayload::Is { value, guard } => (*value, guard.ty),
                    _ => return,
                };
                self.resolve_node(value);
                self.resolve_type(ty);
            }
            NodeTag::Deref => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Deref { value } => *value,
                    _ => return,
                };
                self.resolve_node(value);
            }
            NodeTag::Borrow => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Borrow { value } => *value,
                    _ => return,
                };
                self.resolve_node(value);
            }
            NodeTag::ArrayBorrow => {
                let (value, start, end) = match &self.program.arena.get(id).payload {
                    NodePayload::ArrayBorrow { value, start, end } => (*value, *start, *end),
                    _ => return,
                };
                self.resolve_node(value);
                if let Some(s) = start {
                    self.resolve_node(s);
                }
                if let Some(e) = end {
                    self.resolve_node(e);
                }
            }
            NodeTag::Allocate => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Allocate { value, .. } => *value,
                    _ => return,
                };
                self.resolve_node(value);
            }
            NodeTag::ArrayAlloc => {
                let (count, element_type) = match &self.program.arena.get(id).payload {
                    NodePayload::ArrayAlloc { count, element_type, .. } => (*count, *element_type),
                    _ => return,
                };
                self.resolve_node(count);
                self.resolve_type(element_type);
            }
            NodeTag::Sizeof => {
                let ty = match &self.program.arena.get(id).payload {
                    NodePayload::Sizeof { ty } => *ty,
                    _ => return,
                };
                self.resolve_type(ty);
            }
            NodeTag::Logic => {
                let operands = match &self.program.arena.get(id).payload {
                    NodePayload::Logic { operands, .. } => operands.clone(),
                    _ => return,
                };
                for o in operands {
                    self.resolve_node(o);
                }
            }
            NodeTag::Alias => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Alias { value, .. } => *value,
                    _ => return,
                };
                self.resolve_node(value);
            }
            NodeTag::ArrayLit => {
                let elements = match &self.program.arena.get(id).payload {
                    NodePayload::ArrayLit { elements } => elements.clone(),
                    _ => return,
                };
                for e in elements {
                    self.resolve_node(e);
                }
            }
            NodeTag::VTuple => {
                let elements = match &self.program.arena.get(id).payload {
                    NodePayload::VTuple { elements } => elements.clone(),
                    _ => return,
                };
                for e in elements {
                    self.resolve_node(e);
                }
            }
            NodeTag::TypeLit => {
                let (ty, fields) = match &self.program.arena.get(id).payload {
                    NodePayload::TypeLit { ty, fields } => (*ty, fields.clone()),
                    _ => return,
                };
                self.resolve_type(ty);
                for f in fields {
                    self.resolve_node(f);
                }
            }
            NodeTag::NamedVal => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::NamedVal { value, .. } => *value,
                    _ => return,
                };
                self.resolve_node(value);
            }
            NodeTag::NameUse | NodeTag::VarNameUse | NodeTag::MbrNameUse => self.resolve_name_use(id),
            NodeTag::GenVarUse => {}
            _ => {}
        }
    }

    /// After a `Block` statement is resolved, a `VarDcl`/`ConstDcl` it
    /// introduces becomes visible to every statement that follows it in
    /// the same block (but not to itself or to anything earlier) — Cone's
    /// block scoping is sequential, not hoisted, unlike module/struct
    /// scope (spec §4.5).
    fn hook_if_binding(&mut self, stmt: NodeId) {
        let binding = match &self.program.arena.get(stmt).payload {
            NodePayload::VarDcl { name, .. } => Some(*name),
            NodePayload::ConstDcl { name, .. } => Some(*name),
            _ => None,
        };
        if let Some(name) = binding {
            self.program.names.hook(name, stmt);
        }
    }

    /// `if`/`while` arms whose condition is a bound `is` guard
    /// (`if perm T name = expr`, or `expr is T name`) scope `name` to the
    /// arm's body only.
    fn resolve_if_arm(&mut self, cond: NodeId, body: NodeId) {
        let mark = self.mark();
        if self.program.arena.tag(cond) == NodeTag::Is {
            let (value, ty, bound_name) = match &self.program.arena.get(cond).payload {
                NodePayload::Is { value, guard } => (*value, guard.ty, guard.bound_name),
                _ => unreachable!("tag checked above"),
            };
            self.resolve_node(value);
            self.resolve_type(ty);
            if let Some(bound) = bound_name {
                self.program.names.hook(bound, cond);
            }
        } else {
            self.resolve_node(cond);
        }
        self.resolve_node(body);
        self.unwind(mark);
    }

    /// Binds a `NameUse`, re-tagging it to `VarNameUse`/`TypeNameUse`
    /// once the declaration's kind is known, or to `MbrNameUse` plus
    /// `METH_FLD` when the name wasn't a local/param but matched a field
    /// or method of the enclosing type (spec §4.5's `MethFld` rewrite —
    /// `cone-check` performs the actual `self.name` lowering once it has
    /// a type to hang the synthesized receiver off of).
    fn resolve_name_use(&mut self, id: NodeId) {
        let name = match &self.program.arena.get(id).payload {
            NodePayload::NameUse { name, .. } => *name,
            _ => return,
        };
        if let Some(decl) = self.program.names.lookup(name) {
            // `this`/`self` resolve to the enclosing struct's own NodeId
            // (the parser never synthesizes a real receiver parameter) and
            // a perm-guard/`is`-bound name resolves to the `Is` node that
            // introduced it — both are value positions even though the
            // declaration they point at isn't a `VarDcl`.
            let is_receiver_sentinel =
                name == self.program.specials.this || name == self.program.specials.self_lower;
            let new_tag = if is_receiver_sentinel && self.program.arena.tag(decl) == NodeTag::Struct {
                NodeTag::VarNameUse
            } else {
                match self.program.arena.tag(decl) {
                    NodeTag::VarDcl
                    | NodeTag::FieldDcl
                    | NodeTag::ConstDcl
                    | NodeTag::GenVarDcl
                    | NodeTag::Is => NodeTag::VarNameUse,
                    NodeTag::Struct
                    | NodeTag::Enum
                    | NodeTag::IntNbr
                    | NodeTag::UintNbr
                    | NodeTag::FloatNbr
                    | NodeTag::TypedefType
                    | NodeTag::Typedef
                    | NodeTag::Generic
                    | NodeTag::Perm
                    | NodeTag::Region => NodeTag::TypeNameUse,
                    _ => NodeTag::NameUse,
                }
            };
            self.program.arena.retag(id, new_tag);
            if let NodePayload::NameUse { dclnode, .. } = &mut self.program.arena.get_mut(id).payload {
                *dclnode = Some(decl);
            }
            return;
        }
        // Not a local, param, or module-level name: try the enclosing
        // type's own fields/methods.
        if let Some(owner) = self.current_type {
            let field_or_method = self.namespaces.structs.get(&owner).and_then(|ns| ns.lookup(name));
            if let Some(decl) = field_or_method {
                self.program.arena.retag(id, NodeTag::MbrNameUse);
                let node = self.program.arena.get_mut(id);
                node.flags |= NodeFlags::METH_FLD;
                if let NodePayload::NameUse { dclnode, .. } = &mut node.payload {
                    *dclnode = Some(decl);
                }
                return;
            }
        }
        let span = self.program.arena.get(id).span;
        self.report_unknown(span, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cone_ir::Program;

    fn resolve(src: &str) -> (Program, DiagnosticSink) {
        let mut program = Program::new();
        cone_corelib::bootstrap(&mut program);
        let mut diags = DiagnosticSink::new();
        cone_parser::parse_module(src, PathBuf::from("t.cone"), &mut program, &mut diags);
        resolve_program(&mut program, &mut diags, PathBuf::from("t.cone"));
        (program, diags)
    }

    #[test]
    fn resolves_param_reference_in_fn_body() {
        let (program, diags) = resolve("fn add(a i32, b i32) i32 { ret a + b }");
        assert!(!diags.has_errors(), "{:?}", diags.diagnostics());
        let module = program.root.unwrap();
        let fndcl = match &program.arena.get(module).payload {
            NodePayload::Module { members, .. } => members[0],
            _ => panic!(),
        };
        let body = match &program.arena.get(fndcl).payload {
            NodePayload::FnDcl { body, .. } => body.unwrap(),
            _ => panic!(),
        };
        let ret_stmt = match &program.arena.get(body).payload {
            NodePayload::Block { stmts, .. } => stmts[0],
            _ => panic!(),
        };
        let plus_call = match &program.arena.get(ret_stmt).payload {
            NodePayload::Return { value } => value.unwrap(),
            _ => panic!(),
        };
        let a_use = match &program.arena.get(plus_call).payload {
            NodePayload::FnCall { callee, .. } => *callee,
            _ => panic!(),
        };
        assert_eq!(program.arena.tag(a_use), NodeTag::VarNameUse);
        match &program.arena.get(a_use).payload {
            NodePayload::NameUse { dclnode, .. } => assert!(dclnode.is_some()),
            _ => panic!(),
        }
    }

    #[test]
    fn reports_unknown_name_but_keeps_resolving_rest_of_file() {
        let (_program, diags) = resolve("fn f() i32 { ret nonexistent }\nfn g() i32 { ret 1 }");
        assert!(diags.has_errors());
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn bare_field_reference_in_method_becomes_mbr_name_use() {
        let (program, diags) = resolve(
            "struct Point {
                x i32
                fn getx() i32 { ret x }
            }",
        );
        assert!(!diags.has_errors(), "{:?}", diags.diagnostics());
        let module = program.root.unwrap();
        let struct_id = match &program.arena.get(module).payload {
            NodePayload::Module { members, .. } => members[0],
            _ => panic!(),
        };
        let method = match &program.arena.get(struct_id).payload {
            NodePayload::Struct { methods, .. } => methods[0],
            _ => panic!(),
        };
        let body = match &program.arena.get(method).payload {
            NodePayload::FnDcl { body, .. } => body.unwrap(),
            _ => panic!(),
        };
        let ret_stmt = match &program.arena.get(body).payload {
            NodePayload::Block { stmts, .. } => stmts[0],
            _ => panic!(),
        };
        let x_use = match &program.arena.get(ret_stmt).payload {
            NodePayload::Return { value } => value.unwrap(),
            _ => panic!(),
        };
        assert_eq!(program.arena.tag(x_use), NodeTag::MbrNameUse);
        assert!(program.arena.get(x_use).flags.contains(NodeFlags::METH_FLD));
    }

    #[test]
    fn this_reference_in_method_resolves_to_owning_struct_as_a_value_use() {
        let (program, diags) = resolve(
            "struct Point {
                x i32
                fn len() i32 { ret this.x }
            }",
        );
        assert!(!diags.has_errors(), "{:?}", diags.diagnostics());
        let module = program.root.unwrap();
        let struct_id = match &program.arena.get(module).payload {
            NodePayload::Module { members, .. } => members[0],
            _ => panic!(),
        };
        let method = match &program.arena.get(struct_id).payload {
            NodePayload::Struct { methods, .. } => methods[0],
            _ => panic!(),
        };
        let body = match &program.arena.get(method).payload {
            NodePayload::FnDcl { body, .. } => body.unwrap(),
            _ => panic!(),
        };
        let ret_stmt = match &program.arena.get(body).payload {
            NodePayload::Block { stmts, .. } => stmts[0],
            _ => panic!(),
        };
        let dot_x_call = match &program.arena.get(ret_stmt).payload {
            NodePayload::Return { value } => value.unwrap(),
            _ => panic!(),
        };
        let this_use = match &program.arena.get(dot_x_call).payload {
            NodePayload::FnCall { callee, .. } => *callee,
            _ => panic!(),
        };
        assert_eq!(program.arena.tag(this_use), NodeTag::VarNameUse);
        match &program.arena.get(this_use).payload {
            NodePayload::NameUse { dclnode, .. } => assert_eq!(*dclnode, Some(struct_id)),
            _ => panic!(),
        }
    }

    #[test]
    fn option_and_none_resolve_as_type_and_value_names() {
        let (program, diags) = resolve("fn f() Option { ret None }");
        assert!(!diags.has_errors(), "{:?}", diags.diagnostics());
        let module = program.root.unwrap();
        let fndcl = match &program.arena.get(module).payload {
            NodePayload::Module { members, .. } => members[0],
            _ => panic!(),
        };
        let sig = match &program.arena.get(fndcl).payload {
            NodePayload::FnDcl { sig, .. } => *sig,
            _ => panic!(),
        };
        let ret_ty = match &program.arena.get(sig).payload {
            NodePayload::FnSig { ret, .. } => *ret,
            _ => panic!(),
        };
        assert_eq!(program.arena.tag(ret_ty), NodeTag::TypeNameUse);
    }
}
