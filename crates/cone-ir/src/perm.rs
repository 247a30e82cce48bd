//! Permission flag sets and the built-in permission table.
//!
//! Flag bits and names are taken from `ir/types/permission.h`; the six
//! concrete permissions and their flag combinations come from spec §4.4
//! (the C compiler's `UniPerm`/`MutPerm`/... enum was renamed along the
//! way to `uni`/`mut`/`imm`/`ro`/`mut1`/`opaq`, which is the vocabulary
//! the rest of this compiler, and its diagnostics, use).

use bitflags::bitflags;
use cone_common::interner::Atom;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PermFlags: u8 {
        /// Contents may be read.
        const READ            = 1 << 0;
        /// Contents may be mutated.
        const WRITE           = 1 << 1;
        /// Another live alias may read or mutate the contents.
        const ALIAS           = 1 << 2;
        /// Another live alias may be created able to write the contents.
        const ALIAS_WRITE     = 1 << 3;
        /// A reference with this permission may cross threads.
        const RACE_SAFE       = 1 << 4;
        /// Interior references may be made within a sum type.
        const MAY_INT_REF_SUM = 1 << 5;
        /// No locks are needed to access the contents.
        const LOCKLESS        = 1 << 6;
    }
}

impl PermFlags {
    #[must_use]
    pub fn may_write(self) -> bool {
        self.contains(PermFlags::WRITE)
    }

    #[must_use]
    pub fn may_alias(self) -> bool {
        self.contains(PermFlags::ALIAS)
    }
}

/// One of the six built-in permission spellings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinPerm {
    Uni,
    Mut,
    Imm,
    Ro,
    Mut1,
    Opaq,
}

impl BuiltinPerm {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BuiltinPerm::Uni => "uni",
            BuiltinPerm::Mut => "mut",
            BuiltinPerm::Imm => "imm",
            BuiltinPerm::Ro => "ro",
            BuiltinPerm::Mut1 => "mut1",
            BuiltinPerm::Opaq => "opaq",
        }
    }

    #[must_use]
    pub fn flags(self) -> PermFlags {
        use PermFlags as F;
        match self {
            BuiltinPerm::Uni => {
                F::READ | F::WRITE | F::RACE_SAFE | F::MAY_INT_REF_SUM | F::LOCKLESS
            }
            BuiltinPerm::Mut => F::READ | F::WRITE | F::ALIAS | F::ALIAS_WRITE | F::LOCKLESS,
            BuiltinPerm::Imm => F::READ | F::ALIAS | F::RACE_SAFE | F::MAY_INT_REF_SUM | F::LOCKLESS,
            BuiltinPerm::Ro => F::READ | F::ALIAS | F::LOCKLESS,
            BuiltinPerm::Mut1 => F::READ | F::WRITE | F::ALIAS | F::MAY_INT_REF_SUM | F::LOCKLESS,
            BuiltinPerm::Opaq => F::ALIAS | F::RACE_SAFE | F::LOCKLESS,
        }
    }

    #[must_use]
    pub fn all() -> [BuiltinPerm; 6] {
        [
            BuiltinPerm::Uni,
            BuiltinPerm::Mut,
            BuiltinPerm::Imm,
            BuiltinPerm::Ro,
            BuiltinPerm::Mut1,
            BuiltinPerm::Opaq,
        ]
    }

    /// Permission variance (spec §4.6.x downcast table): identity, plus
    /// `uni -> {imm, mut, const/ro, mut1}` and `{mut, imm, mut1} -> const/ro`.
    #[must_use]
    pub fn allows_variance_to(self, target: BuiltinPerm) -> bool {
        if self == target {
            return true;
        }
        match self {
            BuiltinPerm::Uni => matches!(
                target,
                BuiltinPerm::Imm | BuiltinPerm::Mut | BuiltinPerm::Ro | BuiltinPerm::Mut1
            ),
            BuiltinPerm::Mut | BuiltinPerm::Imm | BuiltinPerm::Mut1 => target == BuiltinPerm::Ro,
            BuiltinPerm::Ro | BuiltinPerm::Opaq => false,
        }
    }
}

/// A permission reference attached to a `Ref`/`ArrayRef`/`VirtRef` node:
/// either one of the six built-ins or a user-declared custom permission
/// (spec doesn't rule these out; the corelib only seeds the six).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermRef {
    Builtin(BuiltinPerm),
    Custom(Atom),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uni_perm_matches_spec_flag_set() {
        let flags = BuiltinPerm::Uni.flags();
        assert!(flags.contains(PermFlags::READ | PermFlags::WRITE | PermFlags::RACE_SAFE));
        assert!(!flags.contains(PermFlags::ALIAS));
    }

    #[test]
    fn mut_perm_does_not_allow_race_safe() {
        let flags = BuiltinPerm::Mut.flags();
        assert!(!flags.contains(PermFlags::RACE_SAFE));
        assert!(flags.contains(PermFlags::ALIAS_WRITE));
    }

    #[test]
    fn uni_downgrades_to_mut_imm_ro_mut1_but_not_reverse() {
        assert!(BuiltinPerm::Uni.allows_variance_to(BuiltinPerm::Mut));
        assert!(BuiltinPerm::Uni.allows_variance_to(BuiltinPerm::Ro));
        assert!(!BuiltinPerm::Mut.allows_variance_to(BuiltinPerm::Uni));
    }

    #[test]
    fn mut_and_imm_downgrade_only_to_ro() {
        assert!(BuiltinPerm::Mut.allows_variance_to(BuiltinPerm::Ro));
        assert!(!BuiltinPerm::Mut.allows_variance_to(BuiltinPerm::Imm));
        assert!(BuiltinPerm::Imm.allows_variance_to(BuiltinPerm::Ro));
    }
}
