//! Core-library bootstrap (spec §4.4): the builtin declarations every
//! compiled program gets without writing a single `include`. Grounded on
//! `tsz-binder`'s `lib_loader`/`state_lib_merge`, which seeds the binder's
//! global scope from a built-in declaration table before any user file is
//! bound — the difference here is there's no serialized table to load;
//! every declaration is synthesized directly into the `Arena`.
//!
//! `bootstrap` must run before `cone-resolve` touches a `Program`: it
//! hooks every corelib name into `program.names` globally (no
//! `BindingScope`, so the bindings are never unhooked) and returns a
//! `CoreLib` handle `cone-check` holds onto for the the method/field
//! lookups and generic instantiations that need direct `NodeId` access
//! rather than going back through a name lookup.

pub mod numbers;
pub mod option_result;
pub mod perm;
pub mod regions;

pub use numbers::{NumericType, NumericTypes};
pub use option_result::OptionResult;
pub use perm::PermSet;
pub use regions::RegionSet;

use cone_ir::Program;

pub struct CoreLib {
    pub perms: PermSet,
    pub numeric: NumericTypes,
    pub regions: RegionSet,
    pub option_result: OptionResult,
}

#[must_use]
pub fn bootstrap(program: &mut Program) -> CoreLib {
    tracing::debug!("bootstrapping core library");
    let perms = perm::register_perms(program);
    let numeric = numbers::register_numeric_types(program);
    let regions = regions::register_regions(program);
    let option_result = option_result::register_option_result(program);
    CoreLib { perms, numeric, regions, option_result }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cone_ir::NodeTag;

    #[test]
    fn bootstrap_registers_i32_with_arithmetic_and_comparison_methods() {
        let mut program = Program::new();
        let core = bootstrap(&mut program);
        let i32_ty = core.numeric.get("i32").expect("i32 registered");
        assert_eq!(program.arena.tag(i32_ty.decl), NodeTag::IntNbr);
        let plus = program.interner.intern("+");
        let eq = program.interner.intern("==");
        assert!(i32_ty.methods.lookup(plus).is_some());
        assert!(i32_ty.methods.lookup(eq).is_some());
    }

    #[test]
    fn comparison_methods_return_bool() {
        let mut program = Program::new();
        let core = bootstrap(&mut program);
        let i32_ty = core.numeric.get("i32").unwrap();
        let lt = program.interner.intern("<");
        let lt_method = i32_ty.methods.lookup(lt).expect("i32 has <");
        match &program.arena.get(lt_method).payload {
            cone_ir::NodePayload::FnDcl { sig, .. } => match &program.arena.get(*sig).payload {
                cone_ir::NodePayload::FnSig { ret, .. } => assert_eq!(*ret, core.numeric.bool_),
                _ => panic!("expected FnSig"),
            },
            _ => panic!("expected FnDcl"),
        }
    }

    #[test]
    fn unsigned_types_have_no_neg_method() {
        let mut program = Program::new();
        let core = bootstrap(&mut program);
        let u32_ty = core.numeric.get("u32").unwrap();
        let neg = program.interner.intern("neg");
        assert!(u32_ty.methods.lookup(neg).is_none());
        let i32_ty = core.numeric.get("i32").unwrap();
        assert!(i32_ty.methods.lookup(neg).is_some());
    }

    #[test]
    fn option_and_result_are_closed_generic_traits_with_tagged_variants() {
        let mut program = Program::new();
        let core = bootstrap(&mut program);
        assert_eq!(program.arena.tag(core.option_result.option_generic), NodeTag::Generic);
        assert_eq!(program.arena.tag(core.option_result.some), NodeTag::Struct);
        match &program.arena.get(core.option_result.some).payload {
            cone_ir::NodePayload::Struct { basetrait, variant_tag, .. } => {
                assert_eq!(*basetrait, Some(core.option_result.option_trait));
                assert_eq!(*variant_tag, Some(0));
            }
            _ => panic!("expected Struct"),
        }
        match &program.arena.get(core.option_result.none).payload {
            cone_ir::NodePayload::Struct { variant_tag, .. } => assert_eq!(*variant_tag, Some(1)),
            _ => panic!("expected Struct"),
        }
    }

    #[test]
    fn so_and_rc_regions_are_registered() {
        let mut program = Program::new();
        let core = bootstrap(&mut program);
        assert_eq!(program.arena.tag(core.regions.so), NodeTag::Region);
        let so_atom = program.interner.intern("so");
        let rc_atom = program.interner.intern("rc");
        assert!(!regions::region_is_rc(&program, so_atom));
        assert!(regions::region_is_rc(&program, rc_atom));
    }
}
