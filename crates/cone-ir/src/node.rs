//! Node tags, flags, and payloads.
//!
//! The original IR dispatches on a raw `uint16_t tag` partitioned by high
//! bits into groups (`ir/inode.h`: `StmtGroup`/`ExpGroup`/`TypeGroup`,
//! plus the orthogonal `NamedNode`/`MethodType` bits). Rust gives us a real
//! sum type instead, so `NodeTag` keeps the same four-group partition as
//! documentation (`group()`) but every variant is a distinct, exhaustively
//! matchable case — there is no `match node.tag & GroupMask` anywhere in
//! this compiler.

use bitflags::bitflags;
use cone_common::interner::Atom;
use cone_common::span::Span;
use smallvec::SmallVec;

use crate::arena::NodeId;

/// Which of the four high-bit groups a tag belongs to (`ir/inode.h`:
/// `StmtGroup`/`ExpGroup`/`TypeGroup`/meta). Kept only for the predicates
/// below; nothing downstream matches on `NodeGroup` instead of `NodeTag`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeGroup {
    Stmt,
    Exp,
    Type,
    Meta,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeTag {
    // --- Statements (ir/inode.h: StmtGroup) ---
    Module,
    Import,
    Return,
    BlockReturn,
    Break,
    Continue,
    FnDcl,
    VarDcl,
    FieldDcl,
    ConstDcl,
    Swap,
    Intrinsic,
    Typedef,

    // --- Typed expressions (ExpGroup) ---
    UIntLit,
    FloatLit,
    StringLit,
    NilLit,
    NullLit,
    ArrayLit,
    TypeLit,
    NamedVal,
    VTuple,
    NameUse,
    VarNameUse,
    TypeNameUse,
    MbrNameUse,
    FnCall,
    ArrIndex,
    FldAccess,
    Assign,
    Cast,
    Is,
    Deref,
    Borrow,
    ArrayBorrow,
    Allocate,
    ArrayAlloc,
    Sizeof,
    Logic,
    Alias,
    Block,
    LoopBlock,
    If,

    // --- Types (TypeGroup) ---
    FnSig,
    Ref,
    ArrayRef,
    VirtRef,
    Ptr,
    Array,
    ArrayDeref,
    TTuple,
    Void,
    IntNbr,
    UintNbr,
    FloatNbr,
    Struct,
    Enum,
    Perm,
    Region,
    Lifetime,
    TypedefType,

    // --- Meta ---
    Generic,
    Macro,
    GenVarDcl,
    GenVarUse,
}

impl NodeTag {
    #[must_use]
    pub fn group(self) -> NodeGroup {
        use NodeTag::*;
        match self {
            Module | Import | Return | BlockReturn | Break | Continue | FnDcl | VarDcl
            | FieldDcl | ConstDcl | Swap | Intrinsic | Typedef => NodeGroup::Stmt,
            UIntLit | FloatLit | StringLit | NilLit | NullLit | ArrayLit | TypeLit | NamedVal
            | VTuple | NameUse | VarNameUse | TypeNameUse | MbrNameUse | FnCall | ArrIndex
            | FldAccess | Assign | Cast | Is | Deref | Borrow | ArrayBorrow | Allocate
            | ArrayAlloc | Sizeof | Logic | Alias | Block | LoopBlock | If => NodeGroup::Exp,
            FnSig | Ref | ArrayRef | VirtRef | Ptr | Array | ArrayDeref | TTuple | Void
            | IntNbr | UintNbr | FloatNbr | Struct | Enum | Perm | Region | Lifetime
            | TypedefType => NodeGroup::Type,
            Generic | Macro | GenVarDcl | GenVarUse => NodeGroup::Meta,
        }
    }

    #[must_use]
    pub fn is_exp_node(self) -> bool {
        self.group() == NodeGroup::Exp
    }

    #[must_use]
    pub fn is_type_node(self) -> bool {
        self.group() == NodeGroup::Type
    }

    /// Named nodes (`ir/inode.h`'s `NamedNode` bit): declarations that
    /// carry an interned name and an owner namespace back-reference.
    #[must_use]
    pub fn is_named_node(self) -> bool {
        use NodeTag::*;
        matches!(
            self,
            Module
                | FnDcl
                | VarDcl
                | FieldDcl
                | ConstDcl
                | IntNbr
                | UintNbr
                | FloatNbr
                | Struct
                | Enum
                | Perm
                | Region
                | Lifetime
                | TypedefType
                | Generic
                | Macro
                | GenVarDcl
        )
    }

    /// Method-bearing types (`ir/inode.h`'s `MethodType` bit): types whose
    /// namespace can be searched for a method/field during dot-access
    /// resolution.
    #[must_use]
    pub fn is_method_type(self) -> bool {
        use NodeTag::*;
        matches!(self, IntNbr | UintNbr | FloatNbr | Struct | Ref | ArrayRef | Ptr | VirtRef)
    }
}

bitflags! {
    /// Node-specific flags (`ir/inode.h`'s `Flag*` macros generalized from
    /// per-struct bit reuse to one namespace, since Rust's `IrNode` has no
    /// risk of two unrelated node kinds colliding on the same bit).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct NodeFlags: u32 {
        /// FnDcl/VarDcl: method or property, not static.
        const METH_PROP      = 1 << 0;
        /// FnDcl/VarDcl: C ABI extern, no mangling.
        const EXTERN         = 1 << 1;
        /// FnDcl: imported system call.
        const SYSTEM         = 1 << 2;
        /// FnDcl: a `set` method.
        const SET_METHOD     = 1 << 3;
        /// FnCall: arguments are an index expression (`a[i]`), not a call.
        const INDEX          = 1 << 4;
        /// Ref: permits a null value (spec §3's `Ref`/option interaction).
        const REF_NULL       = 1 << 5;
        /// Struct (closed trait): variant structs share one size.
        const SAME_SIZE      = 1 << 6;
        /// Struct (closed trait): variants are discriminated by a tag field.
        const HAS_TAG_FIELD  = 1 << 7;
        /// Struct: this struct is a trait (may be a `basetrait`).
        const TRAIT_TYPE     = 1 << 8;
        /// Struct: no fields; zero-sized.
        const OPAQUE_TYPE    = 1 << 9;
        /// An expression that designates an assignable location.
        const LVAL_OP        = 1 << 10;
        /// FnCall lowered from a compound-assignment desugaring (`+=`).
        const OP_ASSGN       = 1 << 11;
        /// Ref/Struct: bitwise copy is unsafe; must move instead.
        const MOVE_TYPE      = 1 << 12;
        /// Ref/Struct: permission/value implies the type cannot cross threads.
        const THREAD_BOUND   = 1 << 13;
        /// FnDcl: eligible for inlining by the backend.
        const INLINE         = 1 << 14;
        /// Typed-expression node currently on the type-check pass's stack
        /// (cycle-detection, set/cleared around `check_expr`).
        const TYPE_CHECKING  = 1 << 15;
        /// Typed-expression node has completed type-check; `vtype` is valid.
        const TYPE_CHECKED   = 1 << 16;
        /// NameUse rewritten to `self.name` because it resolved to a
        /// method/field of the enclosing type (spec §4.5).
        const METH_FLD       = 1 << 17;
    }
}

/// A `case`/`if` binding guard lowered at parse time (spec §4.3): tests
/// `scrutinee is ty`, optionally declaring `name` as `scrutinee as ty`.
#[derive(Clone, Debug)]
pub struct TypeGuard {
    pub ty: NodeId,
    pub bound_name: Option<Atom>,
}

/// Payload carried by an `IrNode`, keyed by its `NodeTag`. Kept as one big
/// enum (rather than per-tag heap structs behind a trait object) so the
/// arena stays a flat `Vec<IrNode>` with no indirection — the arena owns
/// nodes, nodes refer to each other only by `NodeId`.
#[derive(Clone, Debug)]
pub enum NodePayload {
    Leaf,

    Module { name: Atom, members: SmallVec<[NodeId; 8]> },
    Import { path: SmallVec<[Atom; 4]>, glob: bool, alias: Option<Atom> },
    Return { value: Option<NodeId> },
    BlockReturn { value: Option<NodeId>, dealias: SmallVec<[NodeId; 4]> },
    Break { label: Option<Atom> },
    Continue { label: Option<Atom> },
    FnDcl { name: Atom, sig: NodeId, body: Option<NodeId> },
    VarDcl { name: Atom, declared_type: Option<NodeId>, init: Option<NodeId> },
    FieldDcl { name: Atom, declared_type: NodeId, init: Option<NodeId>, index: u32 },
    ConstDcl { name: Atom, declared_type: Option<NodeId>, value: NodeId },
    Swap { lhs: NodeId, rhs: NodeId },
    Intrinsic { op: Atom },
    Typedef { name: Atom, aliased: NodeId },

    UIntLit { value: u64 },
    FloatLit { value: f64 },
    StringLit { value: Atom },
    NilLit,
    NullLit,
    ArrayLit { elements: SmallVec<[NodeId; 8]> },
    TypeLit { ty: NodeId, fields: SmallVec<[NodeId; 8]> },
    NamedVal { name: Atom, value: NodeId },
    VTuple { elements: SmallVec<[NodeId; 4]> },

    NameUse { name: Atom, dclnode: Option<NodeId> },

    /// Overloaded per spec §3: calls, method calls, indexing, field
    /// access, and type literals all parse to `FnCall`, re-tagged to
    /// `ArrIndex`/`FldAccess`/`TypeLit` during lowering.
    FnCall { callee: NodeId, args: SmallVec<[NodeId; 4]>, methfld: Option<Atom> },
    ArrIndex { array: NodeId, index: NodeId },
    FldAccess { object: NodeId, field: Atom, field_index: Option<u32> },

    Assign { lval: NodeId, rval: NodeId },
    Cast { value: NodeId, target: NodeId, reinterpret: bool },
    Is { value: NodeId, guard: TypeGuard },
    Deref { value: NodeId },
    Borrow { value: NodeId },
    ArrayBorrow { value: NodeId, start: Option<NodeId>, end: Option<NodeId> },
    Allocate { region: Atom, value: NodeId },
    ArrayAlloc { region: Atom, count: NodeId, element_type: NodeId },
    Sizeof { ty: NodeId },
    Logic { op: LogicOp, operands: SmallVec<[NodeId; 2]> },
    /// Flow-inserted reference-count adjustment (spec §8): `inc` for a new
    /// alias, `dec` for an end-of-scope dealias.
    Alias { value: NodeId, inc: bool },
    Block { stmts: SmallVec<[NodeId; 8]>, dealias: SmallVec<[NodeId; 4]> },
    LoopBlock { body: NodeId, label: Option<Atom> },
    If { arms: SmallVec<[(NodeId, NodeId); 2]>, else_arm: Option<NodeId> },

    FnSig { params: SmallVec<[NodeId; 4]>, ret: NodeId, variadic: bool },
    Ref { region: Atom, perm: NodeId, target: NodeId },
    ArrayRef { region: Atom, perm: NodeId, target: NodeId },
    VirtRef { perm: NodeId, target: NodeId },
    Ptr { target: NodeId },
    Array { size: u64, element: NodeId },
    ArrayDeref { element: NodeId },
    TTuple { elements: SmallVec<[NodeId; 4]> },
    Void,
    IntNbr { name: Atom, bits: u32 },
    UintNbr { name: Atom, bits: u32 },
    FloatNbr { name: Atom, bits: u32 },
    Struct {
        name: Atom,
        fields: SmallVec<[NodeId; 8]>,
        methods: SmallVec<[NodeId; 8]>,
        basetrait: Option<NodeId>,
        variant_tag: Option<u32>,
    },
    Enum { name: Atom, variants: SmallVec<[NodeId; 8]> },
    Perm { name: Atom, flags: crate::perm::PermFlags },
    Region { name: Atom, rc: bool },
    Lifetime { name: Atom },
    TypedefType { name: Atom, aliased: NodeId },

    Generic { name: Atom, params: SmallVec<[NodeId; 4]>, body: NodeId },
    Macro { name: Atom, params: SmallVec<[Atom; 4]>, body: NodeId },
    GenVarDcl { name: Atom, bound: Option<NodeId> },
    GenVarUse { name: Atom, dclnode: Option<NodeId> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicOp {
    Not,
    And,
    Or,
}

/// One entry in the arena: header (span, tag, flags) plus the payload.
///
/// The typed-expression `vtype` and named-node `owner` fields the original
/// attaches to every header (`ir/inode.h`'s "additionally carries") live
/// as `Option<TypeId>`/`Option<NodeId>` here rather than on every payload
/// variant, since most nodes need them and Rust has no struct inheritance.
#[derive(Clone, Debug)]
pub struct IrNode {
    pub span: Span,
    pub tag: NodeTag,
    pub flags: NodeFlags,
    pub payload: NodePayload,
    /// Set once type-check assigns this expression's value type.
    pub vtype: Option<crate::types::TypeId>,
    /// Owning namespace for named nodes (module/struct/enum).
    pub owner: Option<NodeId>,
}

impl IrNode {
    #[must_use]
    pub fn new(span: Span, tag: NodeTag, payload: NodePayload) -> Self {
        IrNode { span, tag, flags: NodeFlags::empty(), payload, vtype: None, owner: None }
    }
}
