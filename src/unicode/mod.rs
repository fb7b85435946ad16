//! The character-class oracle used by the diff engine's semantic-lossless
//! cleanup pass (spec §6).
//!
//! Cleanup wants to know, for a candidate edit boundary, whether it lands
//! on a "nice" place to split: a line break, a blank line, a word
//! boundary, whitespace. That's meaningful for `Rope<char>`; for any other
//! element type there's no universal notion of "whitespace", so scoring
//! degrades to a constant `false`/`0` and cleanup stays correct, just less
//! pretty.
//!
//! Rust has no specialization on stable, so `CharClass` is given a single
//! blanket implementation that downcasts through [`std::any::Any`] to
//! `char` when it can, and falls back to the "nothing is special" answer
//! otherwise. Stable Rust's usual trick for "specialize for one concrete
//! type, generic default for the rest."

use std::any::Any;

/// A pluggable classifier for element boundaries, used only by
/// `cleanup_semantic_lossless`.
pub trait CharClass {
    fn is_letter_or_digit(&self) -> bool;
    fn is_whitespace(&self) -> bool;
    fn is_control(&self) -> bool;
}

impl<E: 'static> CharClass for E {
    fn is_letter_or_digit(&self) -> bool {
        (self as &dyn Any).downcast_ref::<char>().is_some_and(|c| char::is_alphanumeric(*c))
    }

    fn is_whitespace(&self) -> bool {
        (self as &dyn Any).downcast_ref::<char>().is_some_and(|c| char::is_whitespace(*c))
    }

    fn is_control(&self) -> bool {
        (self as &dyn Any).downcast_ref::<char>().is_some_and(|c| char::is_control(*c))
    }
}

/// True if `seq` ends a blank line: `"\n\n"` or `"\n\r\n"`.
pub fn is_blank_line_end(seq: &[char]) -> bool {
    let n = seq.len();
    (n >= 2 && seq[n - 2] == '\n' && seq[n - 1] == '\n')
        || (n >= 3 && seq[n - 3] == '\n' && seq[n - 2] == '\r' && seq[n - 1] == '\n')
}

/// True if `seq` starts a blank line: `"\r\n\r\n"`, `"\n\n"`, `"\r\n\n"`, or
/// `"\n\r\n"`.
pub fn is_blank_line_start(seq: &[char]) -> bool {
    let n = seq.len();
    (n >= 4 && seq[0] == '\r' && seq[1] == '\n' && seq[2] == '\r' && seq[3] == '\n')
        || (n >= 2 && seq[0] == '\n' && seq[1] == '\n')
        || (n >= 3 && seq[0] == '\r' && seq[1] == '\n' && seq[2] == '\n')
        || (n >= 3 && seq[0] == '\n' && seq[1] == '\r' && seq[2] == '\n')
}

/// `is_blank_line_end`, generalized to any `'static` element type via the
/// same downcast trick as [`CharClass`]; always `false` when `E != char`.
pub fn blank_line_end<E: 'static>(seq: &[E]) -> bool {
    as_chars(seq).is_some_and(is_blank_line_end)
}

/// `is_blank_line_start`, generalized the same way.
pub fn blank_line_start<E: 'static>(seq: &[E]) -> bool {
    as_chars(seq).is_some_and(is_blank_line_start)
}

fn as_chars<E: 'static>(seq: &[E]) -> Option<&[char]> {
    if std::any::TypeId::of::<E>() == std::any::TypeId::of::<char>() {
        // Safe: the TypeId check above proves E and char are the same
        // type, so a slice of one is the same layout as a slice of the
        // other. This is the slice analogue of `Any::downcast_ref`, which
        // isn't directly usable here since `[E]` is unsized.
        Some(unsafe { std::slice::from_raw_parts(seq.as_ptr() as *const char, seq.len()) })
    } else {
        None
    }
}
