//! Compilation driver: wires the parse/resolve/check/flow pipeline behind
//! the CLI's exit-code contract and renders accumulated diagnostics.

use crate::args::{CliArgs, IrFormat};
use crate::ir_print::{dump_node, render_text};
use anyhow::{Context, Result};
use cone_common::diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSink};
use cone_common::position::LineMap;
use cone_ir::Program;
use colored::Colorize;
use std::io::ErrorKind;
use std::path::Path;

pub const EXIT_OK: u8 = 0;
pub const EXIT_ERRORS: u8 = 1;
pub const EXIT_FILE_NOT_FOUND: u8 = 2;
pub const EXIT_OUT_OF_MEMORY: u8 = 3;

/// Runs one compilation and returns the process exit code. Only a read
/// failure unrelated to "file missing"/"out of memory" escalates to `Err`;
/// every other outcome (including compile errors) is reported on stdout
/// and folded into the returned code, per the "never aborts, always
/// reports" propagation rule.
pub fn run(args: &CliArgs) -> Result<u8> {
    let source = match std::fs::read_to_string(&args.source) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            eprintln!("{}: {}", "error".red().bold(), format!("file not found: {}", args.source.display()));
            return Ok(EXIT_FILE_NOT_FOUND);
        }
        Err(e) if e.kind() == ErrorKind::OutOfMemory => {
            eprintln!("{}: {}", "error".red().bold(), "out of memory reading source file");
            return Ok(EXIT_OUT_OF_MEMORY);
        }
        Err(e) => return Err(e).with_context(|| format!("reading {}", args.source.display())),
    };

    let mut program = Program::new();
    let core = cone_corelib::bootstrap(&mut program);
    let mut diags = DiagnosticSink::new();
    let file = args.source.clone();

    cone_parser::parse_module(&source, file.clone(), &mut program, &mut diags);
    if !diags.has_errors() {
        cone_resolve::resolve_program(&mut program, &mut diags, file.clone());
    }
    let mut sink = SummarySink::default();
    if !diags.has_errors() {
        cone_check::check_program_with_sink(&mut program, &mut diags, &core, file.clone(), &mut sink);
    }
    if !diags.has_errors() {
        cone_flow::check_program(&mut program, &mut diags, file.clone());
    }

    render_diagnostics(&diags, &source, &file);

    if !diags.has_errors() {
        if args.print_ir {
            print_ir(&program, args);
        }
        if let Some(dir) = &args.output {
            write_output_listing(sink.summary.as_ref(), dir)?;
        }
    }

    println!();
    if diags.has_errors() {
        println!("Unsuccessful compile: {} errors, {} warnings.", diags.error_count(), diags.warning_count());
        Ok(EXIT_ERRORS)
    } else {
        println!("Compilation successful. ({} warnings)", diags.warning_count());
        Ok(EXIT_OK)
    }
}

fn render_diagnostics(diags: &DiagnosticSink, source: &str, file: &Path) {
    let lines = LineMap::build(source);
    for d in diags.diagnostics() {
        render_one(d, &lines, source, file);
    }
}

fn render_one(d: &Diagnostic, lines: &LineMap, source: &str, file: &Path) {
    let pos = lines.position_for(d.span.start);
    let (label, n) = match d.category {
        DiagnosticCategory::Error => ("Error".red().bold(), d.code),
        DiagnosticCategory::Warning => ("Warning".yellow().bold(), d.code),
    };
    eprintln!("{}:{}:{}: {} {}: {}", file.display(), pos.line, pos.column, label, n, d.message);
    let line_text = lines.line_text(pos.line, source);
    eprintln!("{line_text}");
    eprintln!("{}^", " ".repeat(pos.column.saturating_sub(1) as usize));
}

fn print_ir(program: &Program, args: &CliArgs) {
    let Some(root) = program.root else { return };
    let dump = dump_node(program, root);
    match args.ir_format {
        IrFormat::Text => {
            let mut out = String::new();
            render_text(&dump, 0, &mut out);
            print!("{out}");
        }
        IrFormat::Json => {
            match serde_json::to_string_pretty(&dump) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("{}: failed to serialize IR: {e}", "error".red().bold()),
            }
        }
    }
}

#[derive(Default)]
struct SummarySink {
    summary: Option<cone_check::CodegenSummary>,
}

impl cone_check::CodegenSink for SummarySink {
    fn emit(&mut self, summary: cone_check::CodegenSummary) {
        self.summary = Some(summary);
    }
}

/// Writes the (stubbed) codegen sink's counted summary to `dir` — there is
/// no real code generator, so this is the full extent of `--output`'s
/// effect: proof that the consumer contract in `cone_check::CodegenSink`
/// was reachable and produced a summary.
fn write_output_listing(summary: Option<&cone_check::CodegenSummary>, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let listing = match summary {
        Some(s) => format!(
            "functions: {}\nstructs: {}\nvtables: {}\nvtable_impls: {}\n",
            s.functions, s.structs, s.vtables, s.vtable_impls
        ),
        None => String::new(),
    };
    let path = dir.join("summary.txt");
    std::fs::write(&path, listing).with_context(|| format!("writing {}", path.display()))
}
