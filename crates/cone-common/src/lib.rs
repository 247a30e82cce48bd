//! Common types and utilities for the Cone compiler.
//!
//! This crate provides foundational pieces shared by every stage of the
//! pipeline (lexer, parser, name-resolution, type-check/lowering,
//! data-flow):
//! - String interning (`Atom`, `Interner`)
//! - Source spans (`Span`, `Spanned`, `SpanBuilder`)
//! - Line/column positions for diagnostics (`LineMap`, `Position`)
//! - Diagnostic types and message lookup (`diagnostics`)
//! - Centralized compiler limits (`limits`)

pub mod interner;
pub use interner::{Atom, Interner};

pub mod span;
pub use span::{Span, SpanBuilder, Spanned};

pub mod position;
pub use position::{LineMap, Position};

pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSink};

pub mod limits;
