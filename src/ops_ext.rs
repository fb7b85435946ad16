//! The rope operations layer (spec component C2): the string-like
//! primitives the diff and patch engines are built from: search,
//! replace, split, and the common-prefix/suffix/overlap measures.

use crate::internals::{self, common_overlap_len, Match};
use crate::Rope;

impl<E: PartialEq + Clone> Rope<E> {
    /// The index of the first occurrence of `needle` at or after `from`,
    /// or `None`.
    pub fn index_of(&self, needle: &[E], from: usize) -> Option<Match> {
        internals::search::index_of(&self.root, needle, from)
    }

    /// The index of the last occurrence of `needle`, or `None`.
    pub fn last_index_of(&self, needle: &[E]) -> Option<Match> {
        internals::search::last_index_of(&self.root, needle)
    }

    pub fn starts_with(&self, prefix: &[E]) -> bool {
        internals::search::starts_with(&self.root, prefix)
    }

    pub fn ends_with(&self, suffix: &[E]) -> bool {
        internals::search::ends_with(&self.root, suffix)
    }

    /// The number of leading elements `self` and `other` agree on.
    pub fn common_prefix_length(&self, other: &Self) -> usize {
        internals::search::common_prefix_len(&self.root, &other.root)
    }

    /// The number of trailing elements `self` and `other` agree on.
    pub fn common_suffix_length(&self, other: &Self) -> usize {
        internals::search::common_suffix_len(&self.root, &other.root)
    }

    /// The longest `k` such that `self`'s suffix of length `k` equals
    /// `other`'s prefix of length `k`. Used by diff cleanup to fold
    /// adjacent edits together.
    pub fn common_overlap_length(&self, other: &Self) -> usize {
        common_overlap_len(&self.to_vec(), &other.to_vec())
    }

    /// Replace every non-overlapping occurrence of `from` with `to`.
    pub fn replace(&self, from: &[E], to: &Self) -> Self {
        if from.is_empty() {
            return self.clone();
        }
        let mut out = Rope::new();
        let mut cursor = 0usize;
        while let Some(pos) = self.index_of(from, cursor) {
            out = out.concat(self.slice(cursor, pos - cursor).expect("pos within bounds"));
            out = out.concat(to.clone());
            cursor = pos + from.len();
        }
        out.concat(self.slice(cursor, self.len() - cursor).expect("cursor within bounds"))
    }

    /// A lazy, pull-based iterator over the slices between occurrences of
    /// `separator`.
    pub fn split<'a>(&'a self, separator: &'a [E]) -> Split<'a, E> {
        Split { rope: self, separator, cursor: Some(0) }
    }
}

/// Iterator returned by [`Rope::split`].
pub struct Split<'a, E> {
    rope: &'a Rope<E>,
    separator: &'a [E],
    cursor: Option<usize>,
}

impl<'a, E: PartialEq + Clone> Iterator for Split<'a, E> {
    type Item = Rope<E>;

    fn next(&mut self) -> Option<Rope<E>> {
        let start = self.cursor?;
        if self.separator.is_empty() {
            self.cursor = None;
            return Some(self.rope.slice(start, self.rope.len() - start).expect("start within bounds"));
        }
        match self.rope.index_of(self.separator, start) {
            Some(pos) => {
                self.cursor = Some(pos + self.separator.len());
                Some(self.rope.slice(start, pos - start).expect("pos within bounds"))
            }
            None => {
                self.cursor = None;
                Some(self.rope.slice(start, self.rope.len() - start).expect("start within bounds"))
            }
        }
    }
}
