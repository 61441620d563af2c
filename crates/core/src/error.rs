use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use zixc_diagnostics::{Diagnostic, Span, codes};

/// Which stage raised a [`CompileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The directive scanner / state machine.
    Tokenizer,
    /// Decoding the file's bytes before scanning.
    Encoding,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Tokenizer => f.write_str("tkz"),
            ErrorKind::Encoding => f.write_str("enc"),
        }
    }
}

/// A directive syntax error. Compilation of the file stops at the first one.
#[derive(Debug, Clone, thiserror::Error)]
#[error("[{kind}] {message}")]
pub struct CompileError {
    /// Stage that raised the error.
    pub kind: ErrorKind,
    /// Diagnostic code from [`zixc_diagnostics::codes`].
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Byte offset of the problem, `None` when it has no location.
    pub offset: Option<usize>,
    /// Further offsets tied to the same problem (other unclosed blocks).
    pub secondary: Vec<usize>,
    /// Details such as the offending directive and the state at the time.
    pub context: BTreeMap<String, String>,
    /// The buffer that was being compiled.
    pub source_text: Arc<str>,
}

impl CompileError {
    /// An error with no source location.
    pub fn unlocated(code: &'static str, message: impl Into<String>, source: &str) -> Self {
        Self {
            kind: ErrorKind::Tokenizer,
            code,
            message: message.into(),
            offset: None,
            secondary: Vec::new(),
            context: BTreeMap::new(),
            source_text: source.into(),
        }
    }

    /// Decode a source file, reporting invalid UTF-8 at the first bad byte.
    ///
    /// The error's source text is the lossy decoding; offsets before the bad
    /// byte are the same in both.
    pub fn decode(bytes: Vec<u8>) -> Result<String, Self> {
        String::from_utf8(bytes).map_err(|e| {
            let at = e.utf8_error().valid_up_to();
            let lossy = String::from_utf8_lossy(e.as_bytes());
            Self {
                kind: ErrorKind::Encoding,
                code: codes::INVALID_ENCODING,
                message: "source is not valid UTF-8".into(),
                offset: Some(at),
                secondary: Vec::new(),
                context: BTreeMap::new(),
                source_text: Arc::from(&*lossy),
            }
        })
    }

    /// Attach one context entry (builder pattern).
    pub fn with_context(mut self, key: &str, value: impl Into<String>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    /// Convert into diagnostics: the error itself, then one note per
    /// secondary location.
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        let mut primary = Diagnostic::error(
            self.code,
            self.message.clone(),
            self.offset.map(|at| directive_span(&self.source_text, at)),
        );
        if !self.context.is_empty() {
            primary = primary.with_context(self.context.clone());
        }
        std::iter::once(primary)
            .chain(self.secondary.iter().map(|&at| {
                Diagnostic::note(
                    self.code,
                    "this open bracket is also missing its close bracket",
                    Some(directive_span(&self.source_text, at)),
                )
            }))
            .collect()
    }
}

/// Span of the directive starting at `at`: the `%` plus the character after
/// it, clamped to the source.
fn directive_span(source: &str, at: usize) -> Span {
    let width = source
        .get(at..)
        .map_or(0, |rest| rest.chars().take(2).map(char::len_utf8).sum());
    Span::new(at, at + width)
}
