//! The diff engine (spec component C3): computes a minimal-ish edit script
//! between two ropes using Myers bisect, with half-match and chunk-level
//! speedups and the usual family of cleanup passes.
//!
//! The engine works over `Vec<E>` internally, since diffing needs random
//! access and slicing patterns that don't map cleanly onto rope
//! recursion, and only wraps results back up as `Rope<E>` at the edges.

pub mod bisect;
pub mod chunk;
pub mod cleanup;
pub mod delta;
pub mod halfmatch;

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{instrument, trace};

use crate::unicode::CharClass;
use crate::Rope;

/// The kind of edit a [`Diff`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Delete,
    Insert,
    Equal,
}

/// One step of an edit script: an operation plus the items it applies to.
#[derive(Clone)]
pub struct Diff<E> {
    pub op: Op,
    pub items: Rope<E>,
}

impl<E: Clone> Diff<E> {
    pub fn new(op: Op, items: Vec<E>) -> Self {
        Diff { op, items: Rope::from_vec(items) }
    }

    pub fn from_rope(op: Op, items: Rope<E>) -> Self {
        Diff { op, items }
    }
}

impl<E: fmt::Debug> fmt::Debug for Diff<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diff").field("op", &self.op).field("items", &self.items).finish()
    }
}

impl<E: PartialEq> PartialEq for Diff<E> {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op && self.items == other.items
    }
}
impl<E: Eq> Eq for Diff<E> {}

/// Options controlling [`diff`].
#[derive(Clone)]
pub struct DiffOptions<E> {
    /// Seconds before a diff gives up and degrades to a non-optimal result.
    /// `<= 0.0` means unlimited, which also disables the half-match
    /// heuristic (it trades optimality for speed and is only worth it
    /// under a time budget).
    pub timeout_seconds: f32,
    /// Equalities shorter than this, surrounded by edits, are folded away
    /// by `cleanup_efficiency`.
    pub edit_cost: i16,
    /// Enables the chunk-level (line-level, for text) speedup pass.
    pub is_chunking_enabled: bool,
    /// The separator chunking splits on. Must be non-empty when chunking
    /// is enabled.
    pub chunk_separator: Vec<E>,
}

impl<E> Default for DiffOptions<E> {
    fn default() -> Self {
        DiffOptions {
            timeout_seconds: 0.5,
            edit_cost: 4,
            is_chunking_enabled: false,
            chunk_separator: Vec::new(),
        }
    }
}

impl DiffOptions<char> {
    /// The defaults used for text: chunking on, split on `'\n'`.
    pub fn text() -> Self {
        DiffOptions {
            timeout_seconds: 0.5,
            edit_cost: 4,
            is_chunking_enabled: true,
            chunk_separator: vec!['\n'],
        }
    }
}

pub(crate) struct Deadline(Option<Instant>);

impl Deadline {
    fn from_options<E>(options: &DiffOptions<E>) -> Self {
        if options.timeout_seconds > 0.0 {
            Deadline(Some(Instant::now() + Duration::from_secs_f32(options.timeout_seconds)))
        } else {
            Deadline(None)
        }
    }

    pub(crate) fn expired(&self) -> bool {
        self.0.is_some_and(|d| Instant::now() >= d)
    }
}

/// Compute the edit script that turns `text1` into `text2`.
#[instrument(level = "debug", skip_all, fields(len1 = text1.len(), len2 = text2.len()))]
pub fn diff<E: PartialEq + Clone + CharClass + 'static>(
    text1: &Rope<E>,
    text2: &Rope<E>,
    options: &DiffOptions<E>,
) -> Vec<Diff<E>> {
    let deadline = Deadline::from_options(options);
    let a = text1.to_vec();
    let b = text2.to_vec();
    let diffs = diff_vec(&a, &b, options, &deadline);
    trace!(ops = diffs.len(), "diff complete");
    diffs
}

pub(crate) fn diff_vec<E: PartialEq + Clone + CharClass + 'static>(
    text1: &[E],
    text2: &[E],
    options: &DiffOptions<E>,
    deadline: &Deadline,
) -> Vec<Diff<E>> {
    if text1 == text2 {
        return if text1.is_empty() {
            Vec::new()
        } else {
            vec![Diff::new(Op::Equal, text1.to_vec())]
        };
    }

    let prefix_len = common_prefix(text1, text2);
    let (t1, t2) = (&text1[prefix_len..], &text2[prefix_len..]);
    let suffix_len = common_suffix(t1, t2);
    let (t1, t2) = (&t1[..t1.len() - suffix_len], &t2[..t2.len() - suffix_len]);

    let mut diffs = compute_middle(t1, t2, options, deadline);

    if prefix_len > 0 {
        diffs.insert(0, Diff::new(Op::Equal, text1[..prefix_len].to_vec()));
    }
    if suffix_len > 0 {
        diffs.push(Diff::new(Op::Equal, text1[text1.len() - suffix_len..].to_vec()));
    }
    cleanup::cleanup_merge(&mut diffs);
    diffs
}

fn compute_middle<E: PartialEq + Clone + CharClass + 'static>(
    text1: &[E],
    text2: &[E],
    options: &DiffOptions<E>,
    deadline: &Deadline,
) -> Vec<Diff<E>> {
    if text1.is_empty() {
        return vec![Diff::new(Op::Insert, text2.to_vec())];
    }
    if text2.is_empty() {
        return vec![Diff::new(Op::Delete, text1.to_vec())];
    }

    let (long, short, long_is_1) =
        if text1.len() >= text2.len() { (text1, text2, true) } else { (text2, text1, false) };
    if let Some(pos) = index_of_slice(long, short, 0) {
        let op = if long_is_1 { Op::Delete } else { Op::Insert };
        let diffs = vec![
            Diff::new(op, long[..pos].to_vec()),
            Diff::new(Op::Equal, short.to_vec()),
            Diff::new(op, long[pos + short.len()..].to_vec()),
        ];
        return diffs.into_iter().filter(|d| !d.items.is_empty()).collect();
    }

    if short.len() == 1 {
        return vec![Diff::new(Op::Delete, text1.to_vec()), Diff::new(Op::Insert, text2.to_vec())];
    }

    if options.timeout_seconds > 0.0 {
        if let Some(hm) = halfmatch::half_match(text1, text2) {
            let mut diffs = diff_vec(&hm.text1_prefix, &hm.text2_prefix, options, deadline);
            diffs.push(Diff::new(Op::Equal, hm.common));
            diffs.extend(diff_vec(&hm.text1_suffix, &hm.text2_suffix, options, deadline));
            return diffs;
        }
    }

    if options.is_chunking_enabled
        && !options.chunk_separator.is_empty()
        && text1.len() > 100
        && text2.len() > 100
    {
        return chunk::chunk_diff(text1, text2, options, deadline);
    }

    bisect::bisect(text1, text2, options, deadline)
}

/// The total cost (insertions + deletions counted as substitutions where
/// paired) of applying `diffs`.
pub fn edit_distance<E>(diffs: &[Diff<E>]) -> usize {
    let mut levenshtein = 0;
    let mut insertions = 0;
    let mut deletions = 0;
    for d in diffs {
        match d.op {
            Op::Insert => insertions += d.items.len(),
            Op::Delete => deletions += d.items.len(),
            Op::Equal => {
                levenshtein += insertions.max(deletions);
                insertions = 0;
                deletions = 0;
            }
        }
    }
    levenshtein + insertions.max(deletions)
}

/// The rope `diffs` was computed from (every `Delete`/`Equal` span, in
/// order).
pub fn source<E: Clone>(diffs: &[Diff<E>]) -> Rope<E> {
    let mut out = Rope::new();
    for d in diffs {
        if d.op != Op::Insert {
            out = out.concat(d.items.clone());
        }
    }
    out
}

/// The rope `diffs` produces (every `Insert`/`Equal` span, in order).
pub fn target<E: Clone>(diffs: &[Diff<E>]) -> Rope<E> {
    let mut out = Rope::new();
    for d in diffs {
        if d.op != Op::Delete {
            out = out.concat(d.items.clone());
        }
    }
    out
}

pub(crate) fn common_prefix<E: PartialEq>(a: &[E], b: &[E]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

pub(crate) fn common_suffix<E: PartialEq>(a: &[E], b: &[E]) -> usize {
    a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count()
}

pub(crate) fn index_of_slice<E: PartialEq>(haystack: &[E], needle: &[E], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    if from >= haystack.len() || needle.len() > haystack.len() - from {
        return None;
    }
    haystack[from..].windows(needle.len()).position(|w| w == needle).map(|i| i + from)
}

/// The last occurrence of `needle` in `haystack`, or `None`.
pub(crate) fn last_index_of_slice<E: PartialEq>(haystack: &[E], needle: &[E]) -> Option<usize> {
    if needle.is_empty() {
        return Some(haystack.len());
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}
