//! The `TypeId` handle.
//!
//! `TypeId` lives here (rather than in `cone-types`, which owns the
//! actual structural hash-consing table) so that `IrNode::vtype` can
//! reference it without `cone-ir` depending on `cone-types` — the
//! dependency runs the other way: `cone-types::TypeTable` keys its
//! structural entries by `cone_ir::NodeId` for nominal types and their
//! perm/region fields by `cone_ir::perm` types.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

impl TypeId {
    #[must_use]
    pub fn from_index(n: u32) -> TypeId {
        TypeId(n)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[cfg(test)]
    pub(crate) fn for_test(n: u32) -> TypeId {
        TypeId(n)
    }
}
