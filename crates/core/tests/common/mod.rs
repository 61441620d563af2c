//! Shared test helpers for `zixc_core` integration tests.

#![allow(unreachable_pub)]

use zixc_core::{BlockIdGen, CompileError, CompileOptions, compile, compile_str};

/// Compile with a fresh generator, panicking with the error on failure.
pub fn compile_ok(src: &str) -> String {
    compile_str(src).unwrap_or_else(|e| panic!("unexpected error for {src:?}: {e} at {:?}", e.offset))
}

/// Compile with a fresh generator, panicking if it succeeds.
pub fn compile_err(src: &str) -> CompileError {
    match compile_str(src) {
        Ok(out) => panic!("expected an error for {src:?}, got {out:?}"),
        Err(e) => e,
    }
}

/// Compile against a shared generator with default options.
#[allow(dead_code)]
pub fn compile_shared(src: &str, ids: &BlockIdGen) -> Result<String, CompileError> {
    compile(src, ids, &CompileOptions::default())
}

/// Ids of every block declared in generated code, in output order.
///
/// `%{` blocks declare `const _state_N = .{`, `%[` callbacks declare
/// `const _state_N: `.
#[allow(dead_code)]
pub fn declared_blocks(out: &str) -> Vec<u64> {
    out.match_indices("const _state_")
        .filter_map(|(i, m)| {
            let rest = &out[i + m.len()..];
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        })
        .collect()
}
