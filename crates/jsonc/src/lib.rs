//! JSONC comment stripping for `zixc.jsonc` configuration files.
//!
//! Comments are blanked rather than removed: every comment byte becomes a
//! space and newlines inside block comments are kept, so line and column
//! numbers reported by `serde_json` still point into the original file.

/// Blank `//` and `/* */` comments in JSONC input.
///
/// String literals are copied untouched, including escaped quotes and
/// comment-like sequences such as `"http://..."`. An unterminated block
/// comment is blanked to the end of input.
#[must_use]
pub fn strip_jsonc(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut copied = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => i = skip_string(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = input[i..].find('\n').map_or(bytes.len(), |n| i + n);
                out.push_str(&input[copied..i]);
                blank(&mut out, &input[i..end]);
                copied = end;
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = input[i + 2..].find("*/").map_or(bytes.len(), |n| i + 2 + n + 2);
                out.push_str(&input[copied..i]);
                blank(&mut out, &input[i..end]);
                copied = end;
                i = end;
            }
            _ => i += 1,
        }
    }
    out.push_str(&input[copied..]);
    out
}

/// Index just past the string literal starting at `start` (a `"`).
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn blank(out: &mut String, comment: &str) {
    out.extend(comment.bytes().map(|b| if b == b'\n' { '\n' } else { ' ' }));
}
