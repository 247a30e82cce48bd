//! End-to-end coverage for trait/vtable coercion: a concrete struct passed
//! where a virtual reference to one of its traits is expected builds (or
//! reuses) that trait's vtable and the struct's `VtableImpl` against it.

use cone_common::diagnostics::DiagnosticSink;
use cone_ir::Program;
use std::path::PathBuf;

fn check(src: &str) -> (Program, DiagnosticSink) {
    let mut program = Program::new();
    let core = cone_corelib::bootstrap(&mut program);
    let mut diags = DiagnosticSink::new();
    let file = PathBuf::from("t.cone");
    cone_parser::parse_module(src, file.clone(), &mut program, &mut diags);
    cone_resolve::resolve_program(&mut program, &mut diags, file.clone());
    cone_check::check_program(&mut program, &mut diags, &core, file);
    (program, diags)
}

#[test]
fn concrete_struct_coerces_to_trait_virtual_ref_and_dispatches() {
    let (_program, diags) = check(
        "trait T {
            fn m() i32;
        }
        struct S {
            n i32
            fn m() i32 { ret this.n }
        }
        fn u(r &T) i32 {
            ret r.m()
        }
        fn call_u(s &S) i32 {
            ret u(s)
        }",
    );
    assert!(!diags.has_errors(), "unexpected diagnostics: {:?}", diags.diagnostics());
}

#[test]
fn struct_missing_a_trait_method_fails_the_coercion() {
    let (_program, diags) = check(
        "trait T {
            fn m() i32;
        }
        struct S {
            n i32
        }
        fn u(r &T) i32 {
            ret r.m()
        }
        fn call_u(s &S) i32 {
            ret u(s)
        }",
    );
    assert!(diags.has_errors(), "expected a missing-trait-method diagnostic");
    assert!(
        diags.diagnostics().iter().any(|d| d.code == cone_common::diagnostics::diagnostic_codes::MISSING_TRAIT_METHOD),
        "expected MISSING_TRAIT_METHOD among: {:?}",
        diags.diagnostics()
    );
}

#[test]
fn mismatched_struct_to_trait_argument_is_rejected() {
    let (_program, diags) = check(
        "trait T {
            fn m() i32;
        }
        struct S {
            n i32
            fn m() i32 { ret this.n }
        }
        struct Unrelated {
            x i32
        }
        fn u(r &T) i32 {
            ret r.m()
        }
        fn call_u(other &Unrelated) i32 {
            ret u(other)
        }",
    );
    assert!(diags.has_errors(), "expected a type-mismatch diagnostic for the unrelated struct");
}
