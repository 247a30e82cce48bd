//! Registers the six built-in permissions as named `Perm` declarations
//! (spec §4.4) so a bare permission spelling used outside type position
//! (diagnostics, `--print-ir`) resolves to a real node rather than a
//! synthesized one-off like `parse_type`'s `alloc_perm_node` produces for
//! every occurrence written in source.

use cone_ir::{BuiltinPerm, IrNode, NodeId, NodePayload, NodeTag, Program};
use cone_common::span::Span;

pub struct PermSet {
    pub uni: NodeId,
    pub mut_: NodeId,
    pub imm: NodeId,
    pub ro: NodeId,
    pub mut1: NodeId,
    pub opaq: NodeId,
}

impl PermSet {
    #[must_use]
    pub fn get(&self, which: BuiltinPerm) -> NodeId {
        match which {
            BuiltinPerm::Uni => self.uni,
            BuiltinPerm::Mut => self.mut_,
            BuiltinPerm::Imm => self.imm,
            BuiltinPerm::Ro => self.ro,
            BuiltinPerm::Mut1 => self.mut1,
            BuiltinPerm::Opaq => self.opaq,
        }
    }
}

pub fn register_perms(program: &mut Program) -> PermSet {
    let mut alloc = |which: BuiltinPerm| -> NodeId {
        let name = program.interner.intern(which.name());
        let id = program.arena.alloc(IrNode::new(
            Span::dummy(),
            NodeTag::Perm,
            NodePayload::Perm { name, flags: which.flags() },
        ));
        program.names.hook(name, id);
        id
    };
    PermSet {
        uni: alloc(BuiltinPerm::Uni),
        mut_: alloc(BuiltinPerm::Mut),
        imm: alloc(BuiltinPerm::Imm),
        ro: alloc(BuiltinPerm::Ro),
        mut1: alloc(BuiltinPerm::Mut1),
        opaq: alloc(BuiltinPerm::Opaq),
    }
}
