//! Data-flow pass: move/alias/borrow/initialization analysis, run per
//! function body once its type-check succeeds.
//!
//! Grounded on `original_source/src/c-compiler/ir/flow.c`/`.h`: a
//! `FlowState{fnsig, scope}` cursor, a flat variable-flow stack
//! (`gVarFlowStackp`'s `VarFlowInfo{node, flags}`) pushed one entry per
//! `VarDcl` and popped back to a saved position at scope exit
//! (`flowScopePush`/`flowScopePop`), and `flowScopePop`'s own/rc-reference
//! sweep for the end-of-scope dealias list. The per-pass cursor shape
//! (arena and diagnostics sink borrowed, one `file` path threaded
//! through) follows `cone-resolve::Resolver`.

use cone_check::perm_ref_of;
use cone_common::diagnostics::diagnostic_codes;
use cone_common::diagnostics::DiagnosticSink;
use cone_common::interner::Atom;
use cone_ir::{BuiltinPerm, NodeFlags, NodeId, NodePayload, NodeTag, PermRef, Program};
use std::path::PathBuf;

/// Position in the variable-flow stack at scope entry, saved so the
/// scope's declarations can be found (for dealiasing) and then discarded
/// (for popping) without re-walking the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeMark(usize);

#[derive(Clone, Debug)]
struct VarFlow {
    decl: NodeId,
    name: Atom,
    scope: i16,
    initialized: bool,
    moved: bool,
    move_type: bool,
    owns_region: bool,
}

/// Per-function cursor for the pass: the function signature being
/// checked, the current nesting depth, and the variable-flow stack.
pub struct FlowState<'a> {
    program: &'a mut Program,
    diags: &'a mut DiagnosticSink,
    file: PathBuf,
    fnsig: NodeId,
    scope: i16,
    vars: Vec<VarFlow>,
}

/// Runs data-flow analysis over every function body in the program.
/// Independent per function: one `FlowState` per `FnDcl`, so an error in
/// one function's flow never prevents another's from being checked.
pub fn check_program(program: &mut Program, diags: &mut DiagnosticSink, file: PathBuf) {
    if program.root.is_none() {
        return;
    }
    for fndcl in collect_fndcls(program) {
        let (sig, body) = match &program.arena.get(fndcl).payload {
            NodePayload::FnDcl { sig, body, .. } => (*sig, *body),
            _ => continue,
        };
        let Some(body) = body else { continue };
        tracing::debug!(fndcl = fndcl.index(), "checking data flow");
        let mut state = FlowState { program, diags, file: file.clone(), fnsig: sig, scope: 0, vars: Vec::new() };
        state.analyze_fn_body(body);
    }
}

/// Flat arena scan for every `FnDcl`, mirroring `cone-check::scan_variants`:
/// function bodies nest arbitrarily deep and a generic's body is only
/// reachable through its own declaration, so scanning by tag is simpler
/// than a tree walk that would have to know every place a function can
/// hide.
fn collect_fndcls(program: &Program) -> Vec<NodeId> {
    let mut out = Vec::new();
    for i in 0..program.arena.len() as u32 {
        let id = NodeId::for_test(i);
        if program.arena.tag(id) == NodeTag::FnDcl {
            out.push(id);
        }
    }
    out
}

impl<'a> FlowState<'a> {
    fn report(&mut self, span: cone_common::span::Span, code: u32, args: &[&str]) {
        self.diags.report(self.file.clone(), span, code, args);
    }

    fn mark(&self) -> ScopeMark {
        ScopeMark(self.vars.len())
    }

    fn scope_push(&mut self) -> ScopeMark {
        self.scope += 1;
        self.mark()
    }

    fn scope_pop(&mut self, mark: ScopeMark) {
        self.vars.truncate(mark.0);
        self.scope -= 1;
    }

    /// Builds the end-of-scope dealias list: every own/rc-regioned
    /// variable declared since `mark`, most-recently-declared first,
    /// excluding whichever variable `retexp` directly names (the
    /// return-escape optimization) and any variable already moved from.
    fn scope_dealias(&self, mark: ScopeMark, retexp: Option<NodeId>) -> Vec<NodeId> {
        let retvar = retexp.and_then(|r| self.var_index_of(r)).map(|i| self.vars[i].decl);
        self.vars[mark.0..]
            .iter()
            .rev()
            .filter(|v| v.owns_region && !v.moved && Some(v.decl) != retvar)
            .map(|v| v.decl)
            .collect()
    }

    fn analyze_fn_body(&mut self, body: NodeId) {
        let params = match &self.program.arena.get(self.fnsig).payload {
            NodePayload::FnSig { params, .. } => params.clone(),
            _ => Default::default(),
        };
        let mark = self.scope_push();
        for p in params {
            self.add_var(p, true);
        }
        self.load_value(body);
        self.scope_pop(mark);
    }

    fn add_var(&mut self, decl: NodeId, initialized: bool) {
        let (name, declared_type, has_init) = match &self.program.arena.get(decl).payload {
            NodePayload::VarDcl { name, declared_type, init } => (*name, *declared_type, init.is_some()),
            _ => return,
        };
        let move_type = declared_type.is_some_and(|t| self.is_move_type(t));
        let owns_region = declared_type.is_some_and(|t| self.owns_region(t));
        self.vars.push(VarFlow {
            decl,
            name,
            scope: self.scope,
            initialized: initialized || has_init,
            moved: false,
            move_type,
            owns_region,
        });
    }

    /// Resolves `expr` to its slot in the variable-flow stack: either a
    /// name use's declaration, or (for a freshly-declared `VarDcl` passed
    /// by its own id, as `check_store`'s declare-with-init path does) the
    /// declaration node itself.
    fn var_index_of(&self, expr: NodeId) -> Option<usize> {
        let decl = match &self.program.arena.get(expr).payload {
            NodePayload::NameUse { dclnode: Some(d), .. } => *d,
            _ => expr,
        };
        self.vars.iter().rposition(|v| v.decl == decl)
    }

    fn is_sink(&self, expr: NodeId) -> bool {
        matches!(&self.program.arena.get(expr).payload, NodePayload::NameUse { name, .. } if *name == self.program.specials.anon)
    }

    /// Resolves a `Ref`/`ArrayRef`'s `perm` field (or a `Struct`'s
    /// `MOVE_TYPE` infection flag) without going through the structural
    /// type table — `cone-flow` works off the raw declared-type nodes
    /// `cone-check` already canonicalized into, never its own `TypeId`s.
    fn is_move_type(&self, ty: NodeId) -> bool {
        match self.program.arena.tag(ty) {
            NodeTag::Ref => match &self.program.arena.get(ty).payload {
                NodePayload::Ref { perm, .. } => matches!(perm_ref_of(self.program, *perm), PermRef::Builtin(BuiltinPerm::Uni)),
                _ => false,
            },
            NodeTag::Struct => self.program.arena.get(ty).flags.contains(NodeFlags::MOVE_TYPE),
            NodeTag::TypeNameUse | NodeTag::NameUse => match &self.program.arena.get(ty).payload {
                NodePayload::NameUse { dclnode: Some(d), .. } => self.is_move_type(*d),
                _ => false,
            },
            _ => false,
        }
    }

    /// Whether `ty` is a `Ref`/`ArrayRef` whose region is `so` or `rc`
    /// (single-owner or reference-counted), the two spellings
    /// `region_is_rc`'s own doc comment calls out as owning rather than
    /// borrowing.
    fn owns_region(&self, ty: NodeId) -> bool {
        let region = match &self.program.arena.get(ty).payload {
            NodePayload::Ref { region, .. } | NodePayload::ArrayRef { region, .. } => *region,
            _ => return false,
        };
        self.program.interner.resolve(region) != "borrow"
    }

    fn region_of(&self, ty: NodeId) -> Option<Atom> {
        match &self.program.arena.get(ty).payload {
            NodePayload::Ref { region, .. } | NodePayload::ArrayRef { region, .. } => Some(*region),
            _ => None,
        }
    }

    /// Resolves an expression's declared-type node directly (not a
    /// `TypeId`): the `VarDcl`/`FieldDcl` a name use points at, or the
    /// target/element type one indirection below a `Deref`/`ArrIndex`/
    /// `FldAccess`.
    fn declared_type_node(&self, expr: NodeId) -> Option<NodeId> {
        match self.program.arena.tag(expr) {
            NodeTag::VarNameUse | NodeTag::MbrNameUse | NodeTag::NameUse => {
                let decl = match &self.program.arena.get(expr).payload {
                    NodePayload::NameUse { dclnode: Some(d), .. } => *d,
                    _ => return None,
                };
                match &self.program.arena.get(decl).payload {
                    NodePayload::VarDcl { declared_type: Some(t), .. } => Some(*t),
                    NodePayload::FieldDcl { declared_type, .. } => Some(*declared_type),
                    _ => None,
                }
            }
            NodeTag::Deref => {
                let value = match &self.program.arena.get(expr).payload {
                    NodePayload::Deref { value } => *value,
                    _ => return None,
                };
                let base = self.resolve_alias(self.declared_type_node(value)?);
                self.target_of(base)
            }
            NodeTag::ArrIndex => {
                let array = match &self.program.arena.get(expr).payload {
                    NodePayload::ArrIndex { array, .. } => *array,
                    _ => return None,
                };
                let base = self.resolve_alias(self.declared_type_node(array)?);
                match &self.program.arena.get(base).payload {
                    NodePayload::Array { element, .. } => Some(*element),
                    _ => self.target_of(base),
                }
            }
            NodeTag::FldAccess => {
                let (object, field_index) = match &self.program.arena.get(expr).payload {
                    NodePayload::FldAccess { object, field_index, .. } => (*object, *field_index),
                    _ => return None,
                };
                let base = self.resolve_alias(self.declared_type_node(object)?);
                let struct_decl = self.struct_of(base)?;
                let idx = field_index? as usize;
                let fields = match &self.program.arena.get(struct_decl).payload {
                    NodePayload::Struct { fields, .. } => fields.clone(),
                    _ => return None,
                };
                let fdecl = *fields.get(idx)?;
                match &self.program.arena.get(fdecl).payload {
                    NodePayload::FieldDcl { declared_type, .. } => Some(*declared_type),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn resolve_alias(&self, ty: NodeId) -> NodeId {
        match &self.program.arena.get(ty).payload {
            NodePayload::NameUse { dclnode: Some(d), .. } => self.resolve_alias(*d),
            _ => ty,
        }
    }

    fn target_of(&self, ty: NodeId) -> Option<NodeId> {
        match &self.program.arena.get(ty).payload {
            NodePayload::Ref { target, .. }
            | NodePayload::ArrayRef { target, .. }
            | NodePayload::VirtRef { target, .. }
            | NodePayload::Ptr { target } => Some(*target),
            _ => None,
        }
    }

    fn struct_of(&self, ty: NodeId) -> Option<NodeId> {
        let ty = self.resolve_alias(ty);
        match self.program.arena.tag(ty) {
            NodeTag::Struct => Some(ty),
            NodeTag::Ref | NodeTag::ArrayRef | NodeTag::VirtRef | NodeTag::Ptr => self.target_of(ty).and_then(|t| self.struct_of(t)),
            _ => None,
        }
    }

    fn perm_of(&self, ty: NodeId) -> Option<NodeId> {
        match &self.program.arena.get(ty).payload {
            NodePayload::Ref { perm, .. } | NodePayload::ArrayRef { perm, .. } | NodePayload::VirtRef { perm, .. } => Some(*perm),
            _ => None,
        }
    }

    fn perm_allows_write(&self, perm: PermRef) -> bool {
        match perm {
            PermRef::Builtin(b) => b.flags().may_write(),
            // A user-declared custom permission's flag set isn't resolved
            // here (no structural type table); treated permissively since
            // `cone-check`'s coercion table is the authority on whether
            // the assignment's types line up at all.
            PermRef::Custom(_) => true,
        }
    }

    /// Stores (`spec`'s `=`): checks the lval's permission allows writes
    /// and, for a borrow-regioned lval, that the container's scope
    /// doesn't outlive the borrowed reference's scope.
    fn check_store(&mut self, id: NodeId, lval: NodeId, rval: NodeId) {
        if self.is_sink(lval) {
            self.load_value(rval);
            return;
        }
        if let Some(raw_ty) = self.declared_type_node(lval) {
            let ty = self.resolve_alias(raw_ty);
            if let Some(perm) = self.perm_of(ty) {
                let pr = perm_ref_of(self.program, perm);
                if !self.perm_allows_write(pr) {
                    let span = self.program.arena.get(lval).span;
                    let name = self.describe(lval);
                    self.report(span, diagnostic_codes::NO_MUTATE, &[&name]);
                }
            }
            if self.region_of(ty).is_some_and(|r| self.program.interner.resolve(r) == "borrow") {
                self.check_borrow_outlives(id, lval, rval);
            }
        }
        self.load_value(rval);
        if let Some(i) = self.var_index_of(lval) {
            self.vars[i].initialized = true;
            self.vars[i].moved = false;
        }
    }

    /// Peels a `Borrow`/`Alias` wrapper down to the name use it wraps, so
    /// the scope comparison below looks at the borrowed variable itself
    /// rather than the `&expr`/alias node sitting on top of it.
    fn peel_borrow(&self, expr: NodeId) -> NodeId {
        match &self.program.arena.get(expr).payload {
            NodePayload::Borrow { value } => self.peel_borrow(*value),
            NodePayload::Alias { value, .. } => self.peel_borrow(*value),
            _ => expr,
        }
    }

    fn check_borrow_outlives(&mut self, id: NodeId, lval: NodeId, rval: NodeId) {
        let rval = self.peel_borrow(rval);
        let (Some(lscope), Some(rscope)) = (self.var_scope_of(lval), self.var_scope_of(rval)) else {
            return;
        };
        if lscope < rscope {
            let span = self.program.arena.get(id).span;
            let name = self.describe(lval);
            self.report(span, diagnostic_codes::BORROW_OUTLIVES_OWNER, &[&name]);
        }
    }

    fn var_scope_of(&self, expr: NodeId) -> Option<i16> {
        self.var_index_of(expr).map(|i| self.vars[i].scope)
    }

    fn describe(&self, expr: NodeId) -> String {
        match self.var_index_of(expr) {
            Some(i) => self.program.interner.resolve(self.vars[i].name).to_string(),
            None => "<expr>".to_string(),
        }
    }

    /// Visits a node whose value is about to be loaded, applying
    /// move-or-copy handling at named bindings and recursing everywhere
    /// else a child's value simply passes through.
    fn load_value(&mut self, id: NodeId) {
        match self.program.arena.tag(id) {
            NodeTag::Block => self.visit_block(id),
            NodeTag::If => self.visit_if(id),
            NodeTag::LoopBlock => {
                let body = match &self.program.arena.get(id).payload {
                    NodePayload::LoopBlock { body, .. } => *body,
                    _ => return,
                };
                self.load_value(body);
            }
            NodeTag::Assign => {
                let (lval, rval) = match &self.program.arena.get(id).payload {
                    NodePayload::Assign { lval, rval } => (*lval, *rval),
                    _ => return,
                };
                self.check_store(id, lval, rval);
            }
            NodeTag::Swap => {
                let (lhs, rhs) = match &self.program.arena.get(id).payload {
                    NodePayload::Swap { lhs, rhs } => (*lhs, *rhs),
                    _ => return,
                };
                self.load_value(lhs);
                self.load_value(rhs);
            }
            NodeTag::FnCall => {
                let (callee, args) = match &self.program.arena.get(id).payload {
                    NodePayload::FnCall { callee, args, .. } => (*callee, args.clone()),
                    _ => return,
                };
                self.load_value(callee);
                for a in args {
                    self.load_value(a);
                }
            }
            NodeTag::Borrow => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Borrow { value } => *value,
                    _ => return,
                };
                self.load_value(value);
            }
            NodeTag::ArrayBorrow => {
                let (value, start, end) = match &self.program.arena.get(id).payload {
                    NodePayload::ArrayBorrow { value, start, end } => (*value, *start, *end),
                    _ => return,
                };
                self.load_value(value);
                if let Some(s) = start {
                    self.load_value(s);
                }
                if let Some(e) = end {
                    self.load_value(e);
                }
            }
            NodeTag::VTuple => {
                let elements = match &self.program.arena.get(id).payload {
                    NodePayload::VTuple { elements } => elements.clone(),
                    _ => return,
                };
                for e in elements {
                    self.load_value(e);
                }
            }
            NodeTag::ArrayLit => {
                let elements = match &self.program.arena.get(id).payload {
                    NodePayload::ArrayLit { elements } => elements.clone(),
                    _ => return,
                };
                for e in elements {
                    self.load_value(e);
                }
            }
            NodeTag::Cast => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Cast { value, .. } => *value,
                    _ => return,
                };
                self.load_value(value);
            }
            NodeTag::Logic => {
                let operands = match &self.program.arena.get(id).payload {
                    NodePayload::Logic { operands, .. } => operands.clone(),
                    _ => return,
                };
                for o in operands {
                    self.load_value(o);
                }
            }
            NodeTag::Alias => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Alias { value, .. } => *value,
                    _ => return,
                };
                self.load_value(value);
            }
            NodeTag::VarDcl => {
                let (declared_type, init) = match &self.program.arena.get(id).payload {
                    NodePayload::VarDcl { declared_type, init, .. } => (*declared_type, *init),
                    _ => return,
                };
                if let Some(init) = init {
                    self.load_value(init);
                }
                self.add_var(id, false);
                if let (Some(ty), Some(init)) = (declared_type, init) {
                    let ty = self.resolve_alias(ty);
                    if self.region_of(ty).is_some_and(|r| self.program.interner.resolve(r) == "borrow") {
                        self.check_borrow_outlives(id, id, init);
                    }
                }
            }
            NodeTag::ConstDcl => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::ConstDcl { value, .. } => *value,
                    _ => return,
                };
                self.load_value(value);
            }
            NodeTag::Return => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Return { value } => *value,
                    _ => return,
                };
                if let Some(v) = value {
                    self.load_value(v);
                }
            }
            NodeTag::BlockReturn => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::BlockReturn { value, .. } => *value,
                    _ => return,
                };
                if let Some(v) = value {
                    self.load_value(v);
                }
            }
            NodeTag::Deref => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Deref { value } => *value,
                    _ => return,
                };
                self.load_value(value);
            }
            NodeTag::ArrIndex => {
                let (array, index) = match &self.program.arena.get(id).payload {
                    NodePayload::ArrIndex { array, index } => (*array, *index),
                    _ => return,
                };
                self.load_value(array);
                self.load_value(index);
            }
            NodeTag::FldAccess => {
                let object = match &self.program.arena.get(id).payload {
                    NodePayload::FldAccess { object, .. } => *object,
                    _ => return,
                };
                self.load_value(object);
            }
            NodeTag::VarNameUse | NodeTag::MbrNameUse => self.handle_move_or_copy(id),
            NodeTag::Allocate => {
                let value = match &self.program.arena.get(id).payload {
                    NodePayload::Allocate { value, .. } => *value,
                    _ => return,
                };
                self.load_value(value);
            }
            NodeTag::ArrayAlloc => {
                let count = match &self.program.arena.get(id).payload {
                    NodePayload::ArrayAlloc { count, .. } => *count,
                    _ => return,
                };
                self.load_value(count);
            }
            // Literals, `Is`, `Sizeof`, `Break`/`Continue`, and anything
            // else with no reachable variable use need no flow tracking.
            _ => {}
        }
    }

    fn handle_move_or_copy(&mut self, id: NodeId) {
        let Some(i) = self.var_index_of(id) else { return };
        let name = self.program.interner.resolve(self.vars[i].name).to_string();
        if !self.vars[i].initialized {
            let span = self.program.arena.get(id).span;
            self.report(span, diagnostic_codes::USE_BEFORE_INIT, &[&name]);
            return;
        }
        if self.vars[i].moved {
            let span = self.program.arena.get(id).span;
            self.report(span, diagnostic_codes::USE_AFTER_MOVE, &[&name]);
            return;
        }
        if self.vars[i].move_type {
            self.vars[i].moved = true;
        }
    }

    fn visit_block(&mut self, id: NodeId) {
        let stmts = match &self.program.arena.get(id).payload {
            NodePayload::Block { stmts, .. } => stmts.clone(),
            _ => return,
        };
        let mark = self.scope_push();
        let mut trailing_value = None;
        for &stmt in &stmts {
            if self.program.arena.tag(stmt) == NodeTag::BlockReturn {
                trailing_value = match &self.program.arena.get(stmt).payload {
                    NodePayload::BlockReturn { value, .. } => *value,
                    _ => None,
                };
            }
            self.load_value(stmt);
        }
        let dealias = self.scope_dealias(mark, trailing_value);
        if let NodePayload::Block { dealias: slot, .. } = &mut self.program.arena.get_mut(id).payload {
            *slot = dealias.clone().into();
        }
        if let Some(last) = stmts.last() {
            if self.program.arena.tag(*last) == NodeTag::BlockReturn {
                if let NodePayload::BlockReturn { dealias: slot, .. } = &mut self.program.arena.get_mut(*last).payload {
                    *slot = dealias.into();
                }
            }
        }
        self.scope_pop(mark);
    }

    fn visit_if(&mut self, id: NodeId) {
        let (arms, else_arm) = match &self.program.arena.get(id).payload {
            NodePayload::If { arms, else_arm } => (arms.clone(), *else_arm),
            _ => return,
        };
        for (cond, body) in arms {
            if self.program.arena.tag(cond) != NodeTag::Is {
                self.load_value(cond);
            }
            self.load_value(body);
        }
        if let Some(e) = else_arm {
            self.load_value(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cone_ir::Program;

    fn check_flow(src: &str) -> DiagnosticSink {
        let mut program = Program::new();
        let core = cone_corelib::bootstrap(&mut program);
        let mut diags = DiagnosticSink::new();
        let file = PathBuf::from("t.cone");
        cone_parser::parse_module(src, file.clone(), &mut program, &mut diags);
        cone_resolve::resolve_program(&mut program, &mut diags, file.clone());
        cone_check::check_program(&mut program, &mut diags, &core, file.clone());
        check_program(&mut program, &mut diags, file);
        diags
    }

    #[test]
    fn second_use_of_a_moved_uni_reference_is_use_after_move() {
        let diags = check_flow(
            "struct X {
                n i32
            }
            fn g(a &uni X) {
                mut &uni X b = a
                mut &uni X c = a
            }",
        );
        let codes: Vec<u32> = diags.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![diagnostic_codes::USE_AFTER_MOVE], "expected exactly one use-after-move: {codes:?}");
    }

    #[test]
    fn first_use_of_a_uni_reference_moves_without_diagnostic() {
        let diags = check_flow(
            "struct X {
                n i32
            }
            fn g(a &uni X) {
                mut &uni X b = a
            }",
        );
        assert!(!diags.has_errors(), "unexpected diagnostics: {:?}", diags.diagnostics());
    }

    #[test]
    fn assigning_a_narrower_scope_borrow_to_an_outer_variable_outlives_it() {
        let diags = check_flow(
            "fn h() {
                mut &borrow i32 outer
                {
                    mut inner = 0
                    outer = &inner
                }
            }",
        );
        let codes: Vec<u32> = diags.diagnostics().iter().map(|d| d.code).collect();
        assert!(codes.contains(&diagnostic_codes::BORROW_OUTLIVES_OWNER), "expected a borrow-outlives diagnostic: {codes:?}");
    }

    #[test]
    fn borrowing_a_same_scope_value_does_not_outlive_it() {
        let diags = check_flow(
            "fn h() {
                mut inner = 0
                mut &borrow i32 outer = &inner
            }",
        );
        assert!(!diags.has_errors(), "unexpected diagnostics: {:?}", diags.diagnostics());
    }

    #[test]
    fn use_before_init_is_reported() {
        let diags = check_flow(
            "fn g() i32 {
                mut &uni i32 b
                ret *b
            }",
        );
        let codes: Vec<u32> = diags.diagnostics().iter().map(|d| d.code).collect();
        assert!(codes.contains(&diagnostic_codes::USE_BEFORE_INIT), "expected a use-before-init diagnostic: {codes:?}");
    }
}
