//! Structural type table (hash-consing).
//!
//! Ref/ArrayRef/VirtRef/Ptr/Array/TTuple/FnSig are canonicalized: any two
//! structurally equal types share one `TypeId` (spec §3: "Structural
//! types ... are canonicalized through the type table"). Grounded on
//! `ir/typetbl.h`'s open-addressed structural table, generalized to a
//! `HashMap<TypeKey, TypeId>` keyed by a `TypeKey` that mirrors the
//! original's node-by-node equality test instead of pointer-by-pointer.

use cone_common::limits::{INITIAL_TABLE_CAPACITY, TABLE_GROW_THRESHOLD_PCT};
use cone_ir::{BuiltinPerm, NodeId, TypeId};
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PermRefKey {
    Builtin(BuiltinPerm),
    Custom(cone_common::interner::Atom),
}

/// Structural identity of a canonicalizable type. Each variant holds only
/// `TypeId`s and other `Copy`/hashable data, never a `NodeId` into the
/// declaration tree for its *structure* — so two structurally-equal-but-
/// separately-parsed types hash and compare equal regardless of where
/// they were written.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Ref { region: NodeId, perm: PermRefKey, target: TypeId },
    ArrayRef { region: NodeId, perm: PermRefKey, target: TypeId },
    VirtRef { perm: PermRefKey, target: TypeId },
    Ptr { target: TypeId },
    Array { size: u64, element: TypeId },
    TTuple { elements: Vec<TypeId> },
    FnSig { params: Vec<TypeId>, ret: TypeId, variadic: bool },
    /// Nominal types (Struct/Enum/IntNbr/UintNbr/FloatNbr/Void/Perm/Region)
    /// are identified by their declaration node, not structurally; they
    /// still get a `TypeId` so every typed expression can carry one
    /// uniformly, but two separate declarations are never unified.
    Nominal(NodeId),
}

/// The canonical representative for a `TypeId`: its structural key plus
/// a slot for backend-derived metadata the original attaches once a type
/// is first canonicalized (`ir/typetbl.h`: "carrying the LLVM type handle
/// and any derived metadata"). Codegen is external to this compiler, so
/// `llvm_handle` is a placeholder the `CodegenSink` contract in
/// `cone-check` fills in.
pub struct TypeEntry {
    pub key: TypeKey,
    pub llvm_handle: Option<u32>,
}

pub struct TypeTable {
    entries: Vec<TypeEntry>,
    index: FxHashMap<TypeKey, TypeId>,
    next_id: u32,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    #[must_use]
    pub fn new() -> Self {
        TypeTable {
            entries: Vec::with_capacity(INITIAL_TABLE_CAPACITY),
            index: FxHashMap::default(),
            next_id: 0,
        }
    }

    /// Returns the existing `TypeId` for `key` if one is already
    /// canonicalized, otherwise allocates a new one.
    pub fn intern(&mut self, key: TypeKey) -> TypeId {
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = TypeId::from_index(self.next_id);
        self.next_id += 1;
        self.entries.push(TypeEntry { key: key.clone(), llvm_handle: None });
        self.index.insert(key, id);
        self.maybe_grow();
        id
    }

    #[must_use]
    pub fn get(&self, id: TypeId) -> &TypeEntry {
        &self.entries[id.index()]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeEntry {
        &mut self.entries[id.index()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `FxHashMap` grows its own backing storage automatically; this just
    /// records the intent described in spec §4's "doubles when
    /// utilization exceeds a threshold" by reserving ahead of the
    /// threshold rather than letting every insert risk a rehash.
    fn maybe_grow(&mut self) {
        let load_pct = (self.entries.len() as u64 * 100) / self.index.capacity().max(1) as u64;
        if load_pct as u32 >= TABLE_GROW_THRESHOLD_PCT {
            self.index.reserve(self.index.capacity().max(INITIAL_TABLE_CAPACITY));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(n: u32) -> NodeId {
        cone_ir::NodeId::for_test(n)
    }

    #[test]
    fn structurally_equal_refs_share_one_type_id() {
        let mut table = TypeTable::new();
        let region = node(1);
        let inner = table.intern(TypeKey::Nominal(node(2)));
        let a = table.intern(TypeKey::Ref {
            region,
            perm: PermRefKey::Builtin(BuiltinPerm::Mut),
            target: inner,
        });
        let b = table.intern(TypeKey::Ref {
            region,
            perm: PermRefKey::Builtin(BuiltinPerm::Mut),
            target: inner,
        });
        assert_eq!(a, b);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn different_permission_yields_different_type_id() {
        let mut table = TypeTable::new();
        let region = node(1);
        let inner = table.intern(TypeKey::Nominal(node(2)));
        let a = table.intern(TypeKey::Ref {
            region,
            perm: PermRefKey::Builtin(BuiltinPerm::Mut),
            target: inner,
        });
        let b = table.intern(TypeKey::Ref {
            region,
            perm: PermRefKey::Builtin(BuiltinPerm::Imm),
            target: inner,
        });
        assert_ne!(a, b);
    }

    #[test]
    fn nominal_types_never_unify_across_declarations() {
        let mut table = TypeTable::new();
        let a = table.intern(TypeKey::Nominal(node(5)));
        let b = table.intern(TypeKey::Nominal(node(6)));
        assert_ne!(a, b);
    }
}
