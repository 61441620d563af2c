//! Diagnostic ID constants.
//!
//! Use these instead of string literals so a typo is a compile error.

/// A directive appeared in a state that does not accept it.
pub const BAD_STATE: &str = "ZIX1001";
/// `%.` or `%[` used with no open block to refer to.
pub const NO_ENCLOSING_BLOCK: &str = "ZIX1002";
/// `%.` not followed by an identifier.
pub const EXPECTED_IDENTIFIER: &str = "ZIX1003";
/// `%` followed by a character that starts no known directive.
pub const UNKNOWN_DIRECTIVE: &str = "ZIX1004";
/// A block opened by `%{` or `%[` was never closed.
pub const UNCLOSED_BLOCK: &str = "ZIX1005";
/// `%}` or `%]` with no open block.
pub const UNMATCHED_CLOSE: &str = "ZIX1006";
/// Input ended inside a `%( ... %)` capture region.
pub const UNTERMINATED_CAPTURE: &str = "ZIX1007";
/// A source file is not valid UTF-8.
pub const INVALID_ENCODING: &str = "ZIX1008";

/// Every known code, in numeric order.
pub const ALL: &[&str] = &[
    BAD_STATE,
    NO_ENCLOSING_BLOCK,
    EXPECTED_IDENTIFIER,
    UNKNOWN_DIRECTIVE,
    UNCLOSED_BLOCK,
    UNMATCHED_CLOSE,
    UNTERMINATED_CAPTURE,
    INVALID_ENCODING,
];

pub(crate) fn explanation(id: &str) -> Option<&'static str> {
    Some(match id {
        BAD_STATE => {
            "Directives follow a fixed order: `%(` opens a parameter capture, `%)` ends it, \
             and `%{` opens the block body. A directive used out of that order (for example \
             `%{` with no preceding `%( ... %)`) is rejected."
        }
        NO_ENCLOSING_BLOCK => {
            "`%.name` in a block body and `%[` both refer to the innermost open `%{` block. \
             Neither may appear at the top level of a file."
        }
        EXPECTED_IDENTIFIER => {
            "`%.` must be followed immediately by an identifier made of ASCII letters, digits, \
             and underscores."
        }
        UNKNOWN_DIRECTIVE => {
            "Recognized directives are `%(`, `%)`, `%.`, `%{`, `%}`, `%[`, `%]`, and `%%`. \
             Write `%%` for a literal percent sign."
        }
        UNCLOSED_BLOCK => {
            "Every `%{` needs a matching `%}` and every `%[` a matching `%]` before the end \
             of the file."
        }
        UNMATCHED_CLOSE => "A `%}` or `%]` was found with no open block left to close.",
        UNTERMINATED_CAPTURE => {
            "The file ended after `%(` without reaching the `%{` that opens the block body."
        }
        INVALID_ENCODING => {
            "Sources are read as UTF-8. The reported position is the first byte that is not \
             part of a valid UTF-8 sequence; re-save the file as UTF-8."
        }
        _ => return None,
    })
}
