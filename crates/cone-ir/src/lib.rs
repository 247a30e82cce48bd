//! IR node model and name table for the Cone compiler: the data
//! structures every later pass (`cone-resolve`, `cone-check`,
//! `cone-flow`) walks and mutates in place.
//!
//! The structural type table (`TypeTable`) is deliberately not here: it
//! lives in `cone-types`, which depends on this crate for `NodeId` and
//! `TypeId`. Keeping the dependency one-directional means `Program` only
//! carries what every pass needs from the first token onward; passes
//! that need a `TypeTable` (`cone-check` onward) hold one alongside a
//! `&mut Program` rather than `Program` holding one unconditionally.

pub mod arena;
pub mod name;
pub mod node;
pub mod perm;
pub mod types;

pub use arena::{Arena, NodeId};
pub use name::{BindingScope, NameTable, Namespace, ScopeMark, SpecialNames};
pub use node::{IrNode, LogicOp, NodeFlags, NodeGroup, NodePayload, NodeTag, TypeGuard};
pub use perm::{BuiltinPerm, PermFlags, PermRef};
pub use types::TypeId;

use cone_common::interner::Interner;

/// Everything the parser populates and every later pass shares: the node
/// arena, the string interner, and the name-binding stack. Bundled into
/// one struct so pass entry points take a single `&mut Program` instead
/// of several separate parameters.
pub struct Program {
    pub arena: Arena,
    pub interner: Interner,
    pub names: NameTable,
    pub specials: SpecialNames,
    pub root: Option<NodeId>,
}

impl Program {
    #[must_use]
    pub fn new() -> Self {
        let mut interner = Interner::new();
        let specials = SpecialNames::new(&mut interner);
        Program {
            arena: Arena::new(),
            interner,
            names: NameTable::new(),
            specials,
            root: None,
        }
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}
