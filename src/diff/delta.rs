//! The delta codec (spec component C4): a compact, tab-separated textual
//! encoding of a diff sequence, relative to its source rope.
//!
//! This interchange format is defined over text (`Rope<char>`); the
//! percent-encoding it uses for inserted spans only has a well-defined
//! meaning for characters.

use crate::error::Error;
use crate::Rope;

use super::{Diff, Op};

/// Characters a restricted URI percent-encoding leaves unescaped: ASCII
/// letters/digits, plus everything in spec §6's allow-list. `+` is
/// deliberately included so a literal `+` in the source round-trips as a
/// literal `+` rather than being read back as a space by a generic URL
/// decoder; this is the documented quirk this format preserves bit-exact.
fn is_literal(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '.' | '-'
                | '_'
                | '*'
                | ' '
                | '!'
                | '~'
                | '\''
                | '('
                | ')'
                | ';'
                | '/'
                | '?'
                | ':'
                | '@'
                | '&'
                | '='
                | '$'
                | '+'
                | ','
                | '#'
        )
}

/// Percent-encode `items` for an insert token.
pub fn encode_insert(items: &[char]) -> String {
    let mut out = String::with_capacity(items.len());
    let mut buf = [0u8; 4];
    for &c in items {
        if is_literal(c) {
            out.push(c);
        } else {
            for byte in c.encode_utf8(&mut buf).as_bytes() {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            }
        }
    }
    out
}

/// Decode a percent-encoded insert token's payload.
pub fn decode_insert(s: &str) -> crate::Result<Vec<char>> {
    let bytes = s.as_bytes();
    let mut out_bytes = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len() {
                return Err(Error::InvalidDelta(format!("truncated percent-escape in {s:?}")));
            }
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                .map_err(|_| Error::InvalidDelta(format!("invalid percent-escape in {s:?}")))?;
            let byte = u8::from_str_radix(hex, 16)
                .map_err(|_| Error::InvalidDelta(format!("invalid percent-escape in {s:?}")))?;
            out_bytes.push(byte);
            i += 3;
        } else {
            out_bytes.push(bytes[i]);
            i += 1;
        }
    }
    let decoded = String::from_utf8(out_bytes)
        .map_err(|_| Error::InvalidDelta("percent-decoded bytes were not valid UTF-8".into()))?;
    Ok(decoded.chars().collect())
}

/// Serialize `diffs` to the delta textual format.
pub fn to_delta(diffs: &[Diff<char>]) -> String {
    let mut out = String::new();
    for d in diffs {
        match d.op {
            Op::Insert => {
                out.push('+');
                out.push_str(&encode_insert(&d.items.to_vec()));
                out.push('\t');
            }
            Op::Delete => {
                out.push('-');
                out.push_str(&d.items.len().to_string());
                out.push('\t');
            }
            Op::Equal => {
                out.push('=');
                out.push_str(&d.items.len().to_string());
                out.push('\t');
            }
        }
    }
    if out.ends_with('\t') {
        out.pop();
    }
    out
}

/// Reconstruct the diff sequence `delta` describes relative to `source`.
///
/// # Errors
/// `Error::InvalidDelta` on a non-integer or negative count, an unknown
/// operation prefix, a count that overruns `source`, or a delta that
/// doesn't consume exactly `source.len()` elements.
pub fn parse_delta(source: &Rope<char>, delta: &str) -> crate::Result<Vec<Diff<char>>> {
    let mut diffs = Vec::new();
    let mut cursor = 0usize;
    if !delta.is_empty() {
        for token in delta.split('\t') {
            let tag = token.chars().next().ok_or_else(|| Error::InvalidDelta("empty token".into()))?;
            let rest = &token[tag.len_utf8()..];
            match tag {
                '+' => {
                    let chars = decode_insert(rest)?;
                    diffs.push(Diff::new(Op::Insert, chars));
                }
                '=' | '-' => {
                    let n: usize = rest
                        .parse()
                        .map_err(|_| Error::InvalidDelta(format!("invalid count {rest:?}")))?;
                    if cursor + n > source.len() {
                        return Err(Error::InvalidDelta(format!(
                            "count {n} at offset {cursor} overruns source of length {}",
                            source.len()
                        )));
                    }
                    let slice = source.slice(cursor, n).expect("bounds checked above");
                    cursor += n;
                    let op = if tag == '=' { Op::Equal } else { Op::Delete };
                    diffs.push(Diff::from_rope(op, slice));
                }
                _ => return Err(Error::InvalidDelta(format!("unknown delta operation {tag:?}"))),
            }
        }
    }
    if cursor != source.len() {
        return Err(Error::InvalidDelta(format!(
            "delta consumed {cursor} of {} source elements",
            source.len()
        )));
    }
    Ok(diffs)
}
