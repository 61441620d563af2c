//! zixc core library.
//!
//! Compiles `.zix` sources, Zig code with embedded `%` directives, into plain
//! Zig. The main entry points are [`compile`] for compiling one buffer with a
//! caller-owned [`BlockIdGen`], and [`compile_str`] for one-off use.

#![warn(missing_docs)]

/// Directive state machine.
pub mod compiler;
/// Positional scanner over a source buffer.
pub mod cursor;
/// Ordered output fragments and generated-code shapes.
pub mod emit;
/// Compile errors.
pub mod error;
/// Block identifiers and their generator.
pub mod ids;

// ── Convenience re-exports ──────────────────────────────────────────────────

pub use compiler::{CompileOptions, Compiler, DirectiveState, compile, compile_str};
pub use cursor::SourceCursor;
pub use emit::Emitter;
pub use error::{CompileError, ErrorKind};
pub use ids::{BlockId, BlockIdGen};

// Diagnostics (re-exported from the diagnostics crate)
pub use zixc_diagnostics::{Diagnostic, LineIndex, Location, Severity, Span, codes};
