use std::fmt;

use serde::{Deserialize, Serialize};
use zixc_diagnostics::codes;

use crate::cursor::SourceCursor;
use crate::emit::{self, Emitter};
use crate::error::CompileError;
use crate::ids::{BlockId, BlockIdGen};

/// Knobs for the generated code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Function called with the parent state and the generated function at
    /// each `%[`.
    pub callback_fn: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            callback_fn: "ui.callback".into(),
        }
    }
}

/// Where the scanner is relative to a `%( ... %) %{` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveState {
    /// Plain code: top level or inside a block body.
    FnOrRoot,
    /// Between `%(` and `%)`.
    Args,
    /// Between `%)` and `%{`.
    ArgsEnd,
}

impl fmt::Display for DirectiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DirectiveState::FnOrRoot => "fn_or_root",
            DirectiveState::Args => "args",
            DirectiveState::ArgsEnd => "args_end",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    OpenArgs,
    CloseArgs,
    Ident,
    OpenBlock,
    CloseBlock,
    OpenCallback,
    CloseCallback,
    Percent,
}

impl Directive {
    /// Match order; the first prefix that fits wins.
    const ALL: [Directive; 8] = [
        Directive::OpenArgs,
        Directive::CloseArgs,
        Directive::Ident,
        Directive::OpenBlock,
        Directive::CloseBlock,
        Directive::OpenCallback,
        Directive::CloseCallback,
        Directive::Percent,
    ];

    fn token(self) -> &'static str {
        match self {
            Directive::OpenArgs => "%(",
            Directive::CloseArgs => "%)",
            Directive::Ident => "%.",
            Directive::OpenBlock => "%{",
            Directive::CloseBlock => "%}",
            Directive::OpenCallback => "%[",
            Directive::CloseCallback => "%]",
            Directive::Percent => "%%",
        }
    }
}

/// Identifiers collected between `%(` and `%)`.
#[derive(Debug)]
struct Capture<'a> {
    names: Vec<&'a str>,
    opened_at: usize,
}

/// What opened a block, and so which closer it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    /// `%{ ... %}`
    Body,
    /// `%[ ... %]`
    Callback,
}

#[derive(Debug, Clone, Copy)]
struct OpenBlock {
    id: BlockId,
    kind: BlockKind,
    /// Offset of the opening directive, for unclosed-block errors.
    at: usize,
}

/// Compile one buffer, drawing block ids from `ids`.
///
/// Pass the same generator for every file of a run so generated names stay
/// unique across files.
pub fn compile(
    source: &str,
    ids: &BlockIdGen,
    options: &CompileOptions,
) -> Result<String, CompileError> {
    Compiler::new(source, ids, options).run()
}

/// Compile one buffer with default options and a fresh id generator.
pub fn compile_str(source: &str) -> Result<String, CompileError> {
    compile(source, &BlockIdGen::new(), &CompileOptions::default())
}

/// The directive state machine for one buffer.
///
/// Built per file and consumed by [`Compiler::run`].
pub struct Compiler<'a> {
    cursor: SourceCursor<'a>,
    emit: Emitter<'a>,
    ids: &'a BlockIdGen,
    options: &'a CompileOptions,
    state: DirectiveState,
    capture: Option<Capture<'a>>,
    open: Vec<OpenBlock>,
}

impl<'a> Compiler<'a> {
    /// A compiler positioned at the start of `source`.
    pub fn new(source: &'a str, ids: &'a BlockIdGen, options: &'a CompileOptions) -> Self {
        Self {
            cursor: SourceCursor::new(source),
            emit: Emitter::new(),
            ids,
            options,
            state: DirectiveState::FnOrRoot,
            capture: None,
            open: Vec::new(),
        }
    }

    /// Scan the whole buffer and return the generated program.
    pub fn run(mut self) -> Result<String, CompileError> {
        loop {
            let text = self.cursor.read_until("%");
            self.emit.push(text);
            if self.cursor.at_end() {
                break;
            }
            self.directive()?;
        }
        self.finish()
    }

    fn directive(&mut self) -> Result<(), CompileError> {
        let at = self.cursor.position();
        let cursor = &mut self.cursor;
        let Some(directive) = Directive::ALL
            .into_iter()
            .find(|d| cursor.read_literal_if_prefix(d.token()))
        else {
            return Err(self
                .cursor
                .error_at(codes::UNKNOWN_DIRECTIVE, "percent nothing", at));
        };

        match directive {
            Directive::OpenArgs => self.open_args(at),
            Directive::CloseArgs => self.close_args(at),
            Directive::Ident => self.ident(at),
            Directive::OpenBlock => self.open_block(at),
            Directive::CloseBlock => self.close_block(at),
            Directive::OpenCallback => self.open_callback(at),
            Directive::CloseCallback => self.close_callback(at),
            Directive::Percent => {
                self.emit.push("%");
                Ok(())
            }
        }
    }

    fn fail(
        &self,
        code: &'static str,
        message: &str,
        directive: Directive,
        at: usize,
    ) -> CompileError {
        self.cursor
            .error_at(code, message, at)
            .with_context("directive", directive.token())
            .with_context("state", self.state.to_string())
    }

    fn open_args(&mut self, at: usize) -> Result<(), CompileError> {
        if self.state != DirectiveState::FnOrRoot || self.capture.is_some() {
            return Err(self.fail(codes::BAD_STATE, "bad state", Directive::OpenArgs, at));
        }
        self.state = DirectiveState::Args;
        self.capture = Some(Capture {
            names: Vec::new(),
            opened_at: at,
        });
        self.emit.push("(");
        Ok(())
    }

    fn close_args(&mut self, at: usize) -> Result<(), CompileError> {
        if self.state != DirectiveState::Args {
            return Err(self.fail(codes::BAD_STATE, "bad state", Directive::CloseArgs, at));
        }
        self.state = DirectiveState::ArgsEnd;
        self.emit.push(")");
        Ok(())
    }

    fn ident(&mut self, at: usize) -> Result<(), CompileError> {
        let name = self.cursor.read_identifier();
        if name.is_empty() {
            return Err(self.fail(
                codes::EXPECTED_IDENTIFIER,
                "expected identifier /[a-zA-Z0-9_]+/ after `%.`",
                Directive::Ident,
                at,
            ));
        }
        match self.state {
            DirectiveState::FnOrRoot => {
                let Some(block) = self.innermost() else {
                    return Err(self.fail(
                        codes::NO_ENCLOSING_BLOCK,
                        "`%.` used outside of any block",
                        Directive::Ident,
                        at,
                    ));
                };
                self.emit.push(emit::field_ref(block, name));
            }
            DirectiveState::Args => {
                let Some(capture) = self.capture.as_mut() else {
                    return Err(self.fail(
                        codes::BAD_STATE,
                        "bad state",
                        Directive::Ident,
                        at,
                    ));
                };
                capture.names.push(name);
                self.emit.push(name);
            }
            DirectiveState::ArgsEnd => {
                return Err(self.fail(
                    codes::BAD_STATE,
                    "bad state: `%.` between `%)` and `%{`",
                    Directive::Ident,
                    at,
                ));
            }
        }
        Ok(())
    }

    fn open_block(&mut self, at: usize) -> Result<(), CompileError> {
        if self.state != DirectiveState::ArgsEnd {
            return Err(self.fail(codes::BAD_STATE, "bad state", Directive::OpenBlock, at));
        }
        let Some(capture) = self.capture.take() else {
            return Err(self.fail(codes::BAD_STATE, "bad state", Directive::OpenBlock, at));
        };
        let id = self.push_block(BlockKind::Body, at);
        self.state = DirectiveState::FnOrRoot;
        self.emit.push("{");
        self.emit.push(emit::state_record(id, &capture.names));
        Ok(())
    }

    fn close_block(&mut self, at: usize) -> Result<(), CompileError> {
        if self.state != DirectiveState::FnOrRoot {
            return Err(self.fail(codes::BAD_STATE, "bad state", Directive::CloseBlock, at));
        }
        self.pop_block(BlockKind::Body, Directive::CloseBlock, at)?;
        self.emit.push("}");
        Ok(())
    }

    fn open_callback(&mut self, at: usize) -> Result<(), CompileError> {
        let Some(parent) = self.innermost() else {
            return Err(self.fail(
                codes::NO_ENCLOSING_BLOCK,
                "`%[` needs an enclosing block to capture",
                Directive::OpenCallback,
                at,
            ));
        };
        let id = self.push_block(BlockKind::Callback, at);
        self.emit
            .push(emit::callback_open(&self.options.callback_fn, parent, id));
        Ok(())
    }

    fn close_callback(&mut self, at: usize) -> Result<(), CompileError> {
        let id = self.pop_block(BlockKind::Callback, Directive::CloseCallback, at)?;
        self.emit.push(emit::callback_close(id));
        Ok(())
    }

    fn innermost(&self) -> Option<BlockId> {
        self.open.last().map(|b| b.id)
    }

    fn push_block(&mut self, kind: BlockKind, at: usize) -> BlockId {
        let id = self.ids.next_id();
        self.open.push(OpenBlock { id, kind, at });
        id
    }

    /// Pop the innermost block, which must have been opened as `kind`.
    fn pop_block(
        &mut self,
        kind: BlockKind,
        closer: Directive,
        at: usize,
    ) -> Result<BlockId, CompileError> {
        let message = match self.open.last().copied() {
            None => "no open block to close",
            Some(block) if block.kind == kind => {
                self.open.pop();
                return Ok(block.id);
            }
            Some(block) => match block.kind {
                BlockKind::Body => "`%]` cannot close a `%{` block; expected `%}`",
                BlockKind::Callback => "`%}` cannot close a `%[` callback; expected `%]`",
            },
        };
        Err(self.fail(codes::UNMATCHED_CLOSE, message, closer, at))
    }

    fn finish(self) -> Result<String, CompileError> {
        if let Some((first, rest)) = self.open.split_first() {
            let mut err = self.cursor.error_at(
                codes::UNCLOSED_BLOCK,
                "missing close bracket for this open bracket",
                first.at,
            );
            err.secondary = rest.iter().map(|b| b.at).collect();
            return Err(err.with_context("open_blocks", self.open.len().to_string()));
        }
        if self.state != DirectiveState::FnOrRoot {
            let at = self
                .capture
                .as_ref()
                .map_or(self.cursor.position(), |c| c.opened_at);
            return Err(self
                .cursor
                .error_at(
                    codes::UNTERMINATED_CAPTURE,
                    format!("bad state: {}", self.state),
                    at,
                )
                .with_context("state", self.state.to_string()));
        }
        Ok(self.emit.finish())
    }
}
