//! `so`/`rc` region declarations (spec §4.4: "so/rc regions").
//!
//! `parse_type`'s `parse_region_name` only ever reads the literal
//! spellings `so`, `rc`, `borrow` into a `Ref`/`ArrayRef`'s `region: Atom`
//! field directly — a region name is never resolved through a `NameUse`
//! the way a type or value name is. These declarations exist so
//! `cone-check` (region reachability, spec §8 invariant 4) and
//! `--print-ir` have a real `Region` node to point at instead of treating
//! the bare atom as untyped data, and so user `region NAME [rc];`
//! declarations (parsed by `cone-parser::parse_region_decl`) sit in the
//! same namespace as the two built-ins.

use cone_common::span::Span;
use cone_ir::{IrNode, NodeId, NodePayload, NodeTag, Program};

pub struct RegionSet {
    pub so: NodeId,
    pub rc: NodeId,
}

pub fn register_regions(program: &mut Program) -> RegionSet {
    let so_name = program.interner.intern("so");
    let so = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::Region,
        NodePayload::Region { name: so_name, rc: false },
    ));
    program.names.hook(so_name, so);

    let rc_name = program.interner.intern("rc");
    let rc = program.arena.alloc(IrNode::new(
        Span::dummy(),
        NodeTag::Region,
        NodePayload::Region { name: rc_name, rc: true },
    ));
    program.names.hook(rc_name, rc);

    RegionSet { so, rc }
}

/// Whether the region named by `atom` is reference-counted. `"borrow"`
/// and any unrecognized/elided (`""`) spelling default to single-owner
/// semantics, matching `so`'s flag set.
#[must_use]
pub fn region_is_rc(program: &Program, atom: cone_common::interner::Atom) -> bool {
    program.interner.resolve(atom) == "rc"
}
