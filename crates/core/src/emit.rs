//! Output buffer and the shapes of generated Zig code.
//!
//! [`Emitter`] only appends and joins. The functions at the bottom of this
//! module decide what a state record, a field access, and a callback shim
//! look like; the state machine never spells out Zig itself.

use std::borrow::Cow;

use crate::ids::BlockId;

/// Ordered, append-only sequence of output fragments.
///
/// Verbatim runs are borrowed from the source buffer; only generated code
/// allocates.
#[derive(Debug, Default)]
pub struct Emitter<'a> {
    fragments: Vec<Cow<'a, str>>,
}

impl<'a> Emitter<'a> {
    /// An empty emitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment.
    pub fn push(&mut self, fragment: impl Into<Cow<'a, str>>) {
        let fragment = fragment.into();
        if !fragment.is_empty() {
            self.fragments.push(fragment);
        }
    }

    /// Concatenate every fragment into the final program text.
    pub fn finish(self) -> String {
        let len = self.fragments.iter().map(|f| f.len()).sum();
        let mut out = String::with_capacity(len);
        for fragment in &self.fragments {
            out.push_str(fragment);
        }
        out
    }
}

/// Names of generated identifiers.
pub mod names {
    use crate::ids::BlockId;

    /// The state record value of a block.
    pub fn state(id: BlockId) -> String {
        format!("_state_{id}")
    }

    /// The type of a block's state record.
    pub fn state_type(id: BlockId) -> String {
        format!("_State_{id}")
    }

    /// The function generated for a `%[` callback.
    pub fn func(id: BlockId) -> String {
        format!("_fn_{id}")
    }

    /// The type-erased parameter of a callback function.
    pub fn handle(id: BlockId) -> String {
        format!("_handle_{id}")
    }
}

/// `_state_N.<field>.*`: read a captured parameter through the block's
/// state record.
pub fn field_ref(block: BlockId, field: &str) -> String {
    format!("{}.{field}.*", names::state(block))
}

/// The declarations placed right after the `{` of a `%{` block: the record
/// binding each capture to a pointer, its type alias, and discards for both.
pub fn state_record(block: BlockId, captures: &[&str]) -> String {
    let state = names::state(block);
    let ty = names::state_type(block);
    let fields = captures
        .iter()
        .map(|c| format!(".{c} = &{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        " const {state} = .{{{fields}}}; const {ty} = @TypeOf({state}); _ = {state}; _ = {ty};"
    )
}

/// Opening of a `%[` shim: the callback call taking the parent's record
/// address, the nested function, and the recovery of the parent record from
/// the type-erased handle.
pub fn callback_open(callback_fn: &str, parent: BlockId, block: BlockId) -> String {
    let parent_state = names::state(parent);
    let parent_ty = names::state_type(parent);
    let state = names::state(block);
    let ty = names::state_type(block);
    let func = names::func(block);
    let handle = names::handle(block);
    format!(
        "{callback_fn}(&{parent_state}, struct{{fn {func}({handle}: *const anyopaque) void {{ \
         const {ty} = {parent_ty}; \
         const {state}: {ty} = @as(*const {ty}, @ptrCast(@alignCast({handle}))).*; \
         _ = {state}; _ = {ty};"
    )
}

/// Closing of a `%[` shim: end the function and the struct, name the
/// function, and close the callback call.
pub fn callback_close(block: BlockId) -> String {
    format!("}}}}.{})", names::func(block))
}
