use std::collections::BTreeMap;

use crate::error::CompileError;

/// A forward-only scanner over one source buffer.
///
/// The position is a byte offset that only ever lands on ASCII directive
/// boundaries, so every slice handed out is valid UTF-8.
#[derive(Debug, Clone)]
pub struct SourceCursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> SourceCursor<'a> {
    /// Create a cursor at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    /// Consume everything up to the next `stop` (or the end of input) and
    /// return it. The cursor stops *on* `stop`, not past it.
    pub fn read_until(&mut self, stop: &str) -> &'a str {
        let end = self
            .rest()
            .find(stop)
            .map_or(self.source.len(), |n| self.pos + n);
        let run = &self.source[self.pos..end];
        self.pos = end;
        run
    }

    /// Consume `literal` if the input continues with it.
    pub fn read_literal_if_prefix(&mut self, literal: &str) -> bool {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Consume the longest run of `[A-Za-z0-9_]` at the current position.
    ///
    /// An empty slice means no identifier starts here; rejecting that is
    /// up to the caller.
    pub fn read_identifier(&mut self) -> &'a str {
        let len = self
            .rest()
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        let ident = &self.source[self.pos..self.pos + len];
        self.pos += len;
        ident
    }

    /// Whether the whole buffer has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Build an error located at the current position.
    pub fn error(&self, code: &'static str, message: impl Into<String>) -> CompileError {
        self.error_at(code, message, self.pos)
    }

    /// Build an error located at `offset` instead of the current position.
    pub fn error_at(
        &self,
        code: &'static str,
        message: impl Into<String>,
        offset: usize,
    ) -> CompileError {
        CompileError {
            kind: crate::error::ErrorKind::Tokenizer,
            code,
            message: message.into(),
            offset: Some(offset),
            secondary: Vec::new(),
            context: BTreeMap::new(),
            source_text: self.source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zixc_diagnostics::codes;

    #[test]
    fn read_until_stops_on_delimiter() {
        let mut c = SourceCursor::new("fn main%(x");
        assert_eq!(c.read_until("%"), "fn main");
        assert_eq!(c.position(), 7);
        // Already on the delimiter: nothing more to read.
        assert_eq!(c.read_until("%"), "");
        assert_eq!(c.position(), 7);
    }

    #[test]
    fn read_until_without_delimiter_reaches_end() {
        let mut c = SourceCursor::new("no directives");
        assert_eq!(c.read_until("%"), "no directives");
        assert!(c.at_end());
    }

    #[test]
    fn literal_prefix_only_moves_on_match() {
        let mut c = SourceCursor::new("%{rest");
        assert!(!c.read_literal_if_prefix("%("));
        assert_eq!(c.position(), 0);
        assert!(c.read_literal_if_prefix("%{"));
        assert_eq!(c.position(), 2);
    }

    #[test]
    fn literal_prefix_past_end_is_false() {
        let mut c = SourceCursor::new("%");
        assert!(!c.read_literal_if_prefix("%%"));
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn identifier_is_anchored_and_greedy() {
        let mut c = SourceCursor::new("item_2: u8");
        assert_eq!(c.read_identifier(), "item_2");
        assert_eq!(c.position(), 6);
        assert_eq!(c.read_identifier(), "");
        assert_eq!(c.position(), 6);
    }

    #[test]
    fn identifier_rejects_non_ascii() {
        let mut c = SourceCursor::new("éa");
        assert_eq!(c.read_identifier(), "");
    }

    #[test]
    fn error_carries_offset_and_source() {
        let mut c = SourceCursor::new("ab%9");
        c.read_until("%");
        let err = c.error(codes::UNKNOWN_DIRECTIVE, "percent nothing");
        assert_eq!(err.offset, Some(2));
        assert_eq!(&*err.source_text, "ab%9");
        let err = c.error_at(codes::UNKNOWN_DIRECTIVE, "percent nothing", 0);
        assert_eq!(err.offset, Some(0));
    }
}
