//! Name table: interned-identifier bindings and the scoped hook/unhook
//! stack name-resolution walks over.
//!
//! Grounded on `ir/name.h`/`shared/name.h`'s `Name` record (a pointer to
//! the identifier's currently-bound declaration) and `hook`/`unhook_all_in_scope`
//! described in spec §4.1. The original keeps one global open-addressed
//! table that doubles on load; `rustc_hash::FxHashMap` gives the same O(1)
//! amortized behavior without hand-rolling probing.

use crate::arena::NodeId;
use cone_common::interner::{Atom, Interner};
use rustc_hash::FxHashMap;

/// Special names interned once at startup so the rest of the compiler can
/// compare by `Atom` instead of re-interning string literals at every use
/// site (spec §4.1's "special names" list).
pub struct SpecialNames {
    pub self_lower: Atom,
    pub self_upper: Atom,
    pub this: Atom,
    pub anon: Atom,
    pub clone: Atom,
    pub final_: Atom,
    pub option: Atom,
    pub some: Atom,
    pub none: Atom,
    pub result: Atom,
    pub ok: Atom,
    pub err: Atom,
    pub op_add: Atom,
    pub op_sub: Atom,
    pub op_mul: Atom,
    pub op_div: Atom,
    pub op_rem: Atom,
    pub op_eq: Atom,
    pub op_ne: Atom,
    pub op_lt: Atom,
    pub op_le: Atom,
    pub op_gt: Atom,
    pub op_ge: Atom,
    pub op_incr: Atom,
    pub op_decr: Atom,
    pub op_call: Atom,
    pub op_index: Atom,
    pub op_ref_index: Atom,
}

impl SpecialNames {
    pub fn new(interner: &mut Interner) -> Self {
        SpecialNames {
            self_lower: interner.intern("self"),
            self_upper: interner.intern("Self"),
            this: interner.intern("this"),
            anon: interner.intern("_"),
            clone: interner.intern("clone"),
            final_: interner.intern("final"),
            option: interner.intern("Option"),
            some: interner.intern("Some"),
            none: interner.intern("None"),
            result: interner.intern("Result"),
            ok: interner.intern("Ok"),
            err: interner.intern("Err"),
            op_add: interner.intern("+"),
            op_sub: interner.intern("-"),
            op_mul: interner.intern("*"),
            op_div: interner.intern("/"),
            op_rem: interner.intern("%"),
            op_eq: interner.intern("=="),
            op_ne: interner.intern("!="),
            op_lt: interner.intern("<"),
            op_le: interner.intern("<="),
            op_gt: interner.intern(">"),
            op_ge: interner.intern(">="),
            op_incr: interner.intern("_++"),
            op_decr: interner.intern("_--"),
            op_call: interner.intern("()"),
            op_index: interner.intern("[]"),
            op_ref_index: interner.intern("&[]"),
        }
    }
}

/// A namespace's own name -> declaration map, used for qualified lookup
/// (`mod::x`) and type method/field lookup (spec §4.1).
#[derive(Default, Clone)]
pub struct Namespace {
    entries: FxHashMap<Atom, NodeId>,
}

impl Namespace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: Atom, decl: NodeId) {
        self.entries.insert(name, decl);
    }

    #[must_use]
    pub fn lookup(&self, name: Atom) -> Option<NodeId> {
        self.entries.get(&name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Atom, NodeId)> + '_ {
        self.entries.iter().map(|(&k, &v)| (k, v))
    }
}

/// A saved position in the hook stack; `unhook_all_in_scope` pops back to
/// one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeMark(usize);

/// The global current-binding-for-name table plus its LIFO hook stack.
pub struct NameTable {
    current: FxHashMap<Atom, NodeId>,
    stack: Vec<(Atom, Option<NodeId>)>,
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NameTable {
    #[must_use]
    pub fn new() -> Self {
        NameTable { current: FxHashMap::default(), stack: Vec::new() }
    }

    #[must_use]
    pub fn mark(&self) -> ScopeMark {
        ScopeMark(self.stack.len())
    }

    /// Pushes `(name, previous binding)` and rebinds `name` to `decl`.
    pub fn hook(&mut self, name: Atom, decl: NodeId) {
        let previous = self.current.insert(name, decl);
        self.stack.push((name, previous));
    }

    /// Convenience used by `Module`/`Struct` entry: hooks every entry of a
    /// namespace at once (spec §4.1's `hook_namespace`).
    pub fn hook_namespace(&mut self, ns: &Namespace) {
        for (name, decl) in ns.iter() {
            self.hook(name, decl);
        }
    }

    /// Pops the hook stack back to `mark`, restoring whatever binding each
    /// popped name had before. Balanced even when the walk that pushed
    /// entries returned early on error (callers use an RAII guard, see
    /// `BindingScope`, rather than calling this by hand on every path).
    pub fn unhook_all_in_scope(&mut self, mark: ScopeMark) {
        while self.stack.len() > mark.0 {
            let (name, previous) = self.stack.pop().expect("stack longer than mark");
            match previous {
                Some(decl) => {
                    self.current.insert(name, decl);
                }
                None => {
                    self.current.remove(&name);
                }
            }
        }
    }

    #[must_use]
    pub fn lookup(&self, name: Atom) -> Option<NodeId> {
        self.current.get(&name).copied()
    }
}

/// RAII scope guard: hooking a block/fn/module's names through this type
/// guarantees `unhook_all_in_scope` runs exactly once, even if name
/// resolution bails out of the scope early via `?`.
pub struct BindingScope<'a> {
    table: &'a mut NameTable,
    mark: ScopeMark,
}

impl<'a> BindingScope<'a> {
    pub fn enter(table: &'a mut NameTable) -> Self {
        let mark = table.mark();
        BindingScope { table, mark }
    }

    pub fn hook(&mut self, name: Atom, decl: NodeId) {
        self.table.hook(name, decl);
    }

    pub fn hook_namespace(&mut self, ns: &Namespace) {
        self.table.hook_namespace(ns);
    }

    #[must_use]
    pub fn lookup(&self, name: Atom) -> Option<NodeId> {
        self.table.lookup(name)
    }
}

impl Drop for BindingScope<'_> {
    fn drop(&mut self) {
        self.table.unhook_all_in_scope(self.mark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::NodeId;

    #[test]
    fn hook_and_unhook_restores_previous_binding() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let mut table = NameTable::new();
        table.hook(x, NodeId::for_test(1));
        let mark = table.mark();
        table.hook(x, NodeId::for_test(2));
        assert_eq!(table.lookup(x), Some(NodeId::for_test(2)));
        table.unhook_all_in_scope(mark);
        assert_eq!(table.lookup(x), Some(NodeId::for_test(1)));
    }

    #[test]
    fn binding_scope_unhooks_on_drop() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let mut table = NameTable::new();
        {
            let mut scope = BindingScope::enter(&mut table);
            scope.hook(x, NodeId::for_test(1));
            assert_eq!(scope.lookup(x), Some(NodeId::for_test(1)));
        }
        assert_eq!(table.lookup(x), None);
    }
}
