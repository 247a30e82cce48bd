//! Recursive-descent parser: turns a token stream into an IR tree rooted
//! at a `Module` node, writing directly into a shared `cone_ir::Program`
//! (arena + interner) as it goes.
//!
//! Mirrors the original's per-file entry point `parseFile`
//! (parser/parser.c) but returns a `NodeId` instead of writing into a
//! global `modnode`.

mod core;
mod expr;
mod module;
mod stmt;
mod ty;

pub use core::Parser;

use cone_common::diagnostics::DiagnosticSink;
use cone_ir::{NodeId, Program};
use std::path::PathBuf;

/// Parses `source` (the contents of `file`) as a complete compilation
/// unit, returning the `NodeId` of its top-level `Module` node. Diagnostics
/// accumulate in `diags` rather than aborting the parse; a malformed
/// statement is skipped and parsing continues with the next one.
pub fn parse_module(source: &str, file: PathBuf, program: &mut Program, diags: &mut DiagnosticSink) -> NodeId {
    tracing::debug!(file = %file.display(), bytes = source.len(), "parsing module");
    let mut parser = Parser::new(source, file, program, diags);
    parser.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cone_ir::{NodePayload, NodeTag};

    fn parse(src: &str) -> (Program, NodeId) {
        let mut program = Program::new();
        let mut diags = DiagnosticSink::new();
        let root = {
            let root = parse_module(src, PathBuf::from("test.cone"), &mut program, &mut diags);
            root
        };
        assert!(!diags.has_errors(), "unexpected diagnostics: {:?}", diags.diagnostics());
        (program, root)
    }

    #[test]
    fn parses_empty_module() {
        let (program, root) = parse("");
        match &program.arena.get(root).payload {
            NodePayload::Module { members, .. } => assert!(members.is_empty()),
            _ => panic!("expected Module"),
        }
    }

    #[test]
    fn parses_fn_decl_with_body() {
        let (program, root) = parse("fn add(a int32, b int32) int32 { ret a + b }");
        let members = match &program.arena.get(root).payload {
            NodePayload::Module { members, .. } => members.clone(),
            _ => panic!("expected Module"),
        };
        assert_eq!(members.len(), 1);
        assert_eq!(program.arena.tag(members[0]), NodeTag::FnDcl);
    }

    #[test]
    fn parses_struct_with_field_and_method() {
        let (program, root) = parse(
            "struct Point {
                x float64
                y float64
                fn len() float64 { ret this.x }
            }",
        );
        let members = match &program.arena.get(root).payload {
            NodePayload::Module { members, .. } => members.clone(),
            _ => panic!("expected Module"),
        };
        assert_eq!(members.len(), 1);
        match &program.arena.get(members[0]).payload {
            NodePayload::Struct { fields, methods, .. } => {
                assert_eq!(fields.len(), 2);
                assert_eq!(methods.len(), 1);
            }
            _ => panic!("expected Struct"),
        }
    }

    #[test]
    fn parses_if_elif_else_chain() {
        let (program, root) = parse(
            "fn classify(n int32) int32 {
                if n < 0 { ret 0 }
                elif n == 0 { ret 1 }
                else { ret 2 }
            }",
        );
        let members = match &program.arena.get(root).payload {
            NodePayload::Module { members, .. } => members.clone(),
            _ => panic!("expected Module"),
        };
        let body = match &program.arena.get(members[0]).payload {
            NodePayload::FnDcl { body, .. } => body.expect("fn has a body"),
            _ => panic!("expected FnDcl"),
        };
        let stmts = match &program.arena.get(body).payload {
            NodePayload::Block { stmts, .. } => stmts.clone(),
            _ => panic!("expected Block"),
        };
        assert_eq!(stmts.len(), 1);
        match &program.arena.get(stmts[0]).payload {
            NodePayload::If { arms, else_arm } => {
                assert_eq!(arms.len(), 2);
                assert!(else_arm.is_some());
            }
            _ => panic!("expected If"),
        }
    }

    #[test]
    fn parses_ref_type_with_region_and_perm() {
        let (program, root) = parse("fn borrow_it(r &so mut int32) int32 { ret *r }");
        let members = match &program.arena.get(root).payload {
            NodePayload::Module { members, .. } => members.clone(),
            _ => panic!("expected Module"),
        };
        let sig = match &program.arena.get(members[0]).payload {
            NodePayload::FnDcl { sig, .. } => *sig,
            _ => panic!("expected FnDcl"),
        };
        let params = match &program.arena.get(sig).payload {
            NodePayload::FnSig { params, .. } => params.clone(),
            _ => panic!("expected FnSig"),
        };
        let declared_type = match &program.arena.get(params[0]).payload {
            NodePayload::VarDcl { declared_type, .. } => declared_type.expect("param has a type"),
            _ => panic!("expected VarDcl"),
        };
        assert_eq!(program.arena.tag(declared_type), NodeTag::Ref);
    }

    #[test]
    fn parses_compound_assignment_as_op_assgn_call() {
        let (program, root) = parse("fn bump(n int32) int32 { n += 1; ret n }");
        let members = match &program.arena.get(root).payload {
            NodePayload::Module { members, .. } => members.clone(),
            _ => panic!("expected Module"),
        };
        let body = match &program.arena.get(members[0]).payload {
            NodePayload::FnDcl { body, .. } => body.expect("fn has a body"),
            _ => panic!("expected FnDcl"),
        };
        let stmts = match &program.arena.get(body).payload {
            NodePayload::Block { stmts, .. } => stmts.clone(),
            _ => panic!("expected Block"),
        };
        assert_eq!(program.arena.tag(stmts[0]), NodeTag::FnCall);
        let flags = program.arena.get(stmts[0]).flags;
        assert!(flags.contains(cone_ir::NodeFlags::OP_ASSGN));
        assert!(flags.contains(cone_ir::NodeFlags::LVAL_OP));
    }

    #[test]
    fn parses_each_loop_desugaring() {
        let (program, root) = parse("fn sum_all(xs &[]int32) int32 { each x in xs { ret x } }");
        let members = match &program.arena.get(root).payload {
            NodePayload::Module { members, .. } => members.clone(),
            _ => panic!("expected Module"),
        };
        let body = match &program.arena.get(members[0]).payload {
            NodePayload::FnDcl { body, .. } => body.expect("fn has a body"),
            _ => panic!("expected FnDcl"),
        };
        let stmts = match &program.arena.get(body).payload {
            NodePayload::Block { stmts, .. } => stmts.clone(),
            _ => panic!("expected Block"),
        };
        // each-desugaring produces a nested Block containing the iterator
        // VarDcl and a LoopBlock.
        let inner = match &program.arena.get(stmts[0]).payload {
            NodePayload::Block { stmts, .. } => stmts.clone(),
            _ => panic!("expected desugared Block"),
        };
        assert_eq!(inner.len(), 2);
        assert_eq!(program.arena.tag(inner[0]), NodeTag::VarDcl);
        assert_eq!(program.arena.tag(inner[1]), NodeTag::LoopBlock);
    }

    #[test]
    fn reports_diagnostic_on_malformed_global_item_and_recovers() {
        let mut program = Program::new();
        let mut diags = DiagnosticSink::new();
        // Recovery skips the bad tokens through the next `}`/`;`/EOF rather
        // than hanging or panicking; a second well-formed item afterward
        // still parses normally.
        let root = parse_module(
            "+++ fn bad() { }\nfn ok() { }",
            PathBuf::from("test.cone"),
            &mut program,
            &mut diags,
        );
        assert!(diags.has_errors());
        match &program.arena.get(root).payload {
            NodePayload::Module { members, .. } => assert_eq!(members.len(), 1),
            _ => panic!("expected Module"),
        }
    }
}
