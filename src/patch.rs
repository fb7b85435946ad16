//! The patch engine (spec component C6): builds fuzzy, context-bearing
//! patches from a diff, splits any that exceed the bitap pattern-length
//! ceiling, pads their edges for robust boundary matching, and applies a
//! patch chain against a possibly-drifted text using [`crate::bitap`] to
//! relocate each patch.

use crate::bitap::{self, MatchOptions};
use crate::diff::{self, cleanup, Diff, DiffOptions, Op};
use crate::error::Error;
use crate::unicode::CharClass;
use crate::Rope;

/// A single patch: a diff plus the source/target offsets and lengths it
/// was cut from.
///
/// Invariant: the first and last diff of a patch ready to apply are
/// `Equal` (context), added by [`add_context`]/[`add_padding`] before the
/// patch is handed to a caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patch<E> {
    pub diffs: Vec<Diff<E>>,
    pub start1: usize,
    pub length1: usize,
    pub start2: usize,
    pub length2: usize,
}

impl<E> Patch<E> {
    fn empty(start1: usize, start2: usize) -> Self {
        Patch { diffs: Vec::new(), start1, length1: 0, start2, length2: 0 }
    }
}

/// Options controlling the patch engine.
#[derive(Debug, Clone, Copy)]
pub struct PatchOptions {
    /// Above this fraction of edit distance to pattern length, a fuzzily
    /// relocated oversized patch is treated as a failed application.
    pub delete_threshold: f32,
    /// The amount of unchanged context kept on each side of an edit.
    pub margin: i16,
    /// The bit-width ceiling bitap's matcher enforces; patches whose
    /// source exceeds this are split.
    pub max_length: i16,
    pub match_options: MatchOptions,
}

impl Default for PatchOptions {
    fn default() -> Self {
        PatchOptions {
            delete_threshold: 0.5,
            margin: 4,
            max_length: 32,
            match_options: MatchOptions::default(),
        }
    }
}

/// Produces a synthetic padding element for [`add_padding`], given a
/// 1-based ordinal within the padding run. Only `char` has a sensible
/// answer; a generic element type simply can't apply patches near text
/// boundaries as robustly.
pub trait PadSymbol: Sized {
    fn pad_symbol(n: u8) -> Self;
}

impl PadSymbol for char {
    fn pad_symbol(n: u8) -> Self {
        n as char
    }
}

/// Compute the patches that turn `source` into `target`.
///
/// Diffs with more than two entries get a semantic + efficiency cleanup
/// pass first, same as the reference implementation, so the patch body
/// reads naturally rather than as a token-by-token diff.
pub fn create_patches<E>(
    source: &Rope<E>,
    target: &Rope<E>,
    patch_opts: &PatchOptions,
    diff_opts: &DiffOptions<E>,
) -> Vec<Patch<E>>
where
    E: PartialEq + Clone + CharClass + 'static,
{
    let mut diffs = diff::diff(source, target, diff_opts);
    if diffs.len() > 2 {
        cleanup::cleanup_semantic(&mut diffs);
        cleanup::cleanup_efficiency(&mut diffs, diff_opts.edit_cost);
    }
    let patches = patches_from_diffs(&diffs, patch_opts.margin);
    let source_vec = source.to_vec();
    patches.into_iter().map(|p| add_context(p, &source_vec, patch_opts)).collect()
}

/// Walk `diffs` with source/target cursors, grouping runs of edits
/// (plus any small bracketing equalities) into patches, starting a new
/// patch whenever an equality large enough to stand alone is seen.
fn patches_from_diffs<E: Clone>(diffs: &[Diff<E>], margin: i16) -> Vec<Patch<E>> {
    let margin = margin.max(0) as usize;
    let mut patches = Vec::new();
    if diffs.is_empty() {
        return patches;
    }

    let mut patch = Patch::empty(0, 0);
    let mut patch_diff_len = 0usize;
    let mut char_count1 = 0usize;
    let mut char_count2 = 0usize;

    for (x, d) in diffs.iter().enumerate() {
        let items = d.items.to_vec();
        if patch_diff_len == 0 && d.op != Op::Equal {
            patch.start1 = char_count1;
            patch.start2 = char_count2;
        }

        match d.op {
            Op::Insert => {
                patch.length2 += items.len();
                patch.diffs.push(d.clone());
                patch_diff_len += 1;
            }
            Op::Delete => {
                patch.length1 += items.len();
                patch.diffs.push(d.clone());
                patch_diff_len += 1;
            }
            Op::Equal => {
                if items.len() <= 2 * margin && patch_diff_len > 0 && x + 1 != diffs.len() {
                    patch.diffs.push(d.clone());
                    patch_diff_len += 1;
                    patch.length1 += items.len();
                    patch.length2 += items.len();
                } else if items.len() >= 2 * margin && patch_diff_len > 0 {
                    patches.push(patch);
                    patch = Patch::empty(0, 0);
                    patch_diff_len = 0;
                }
            }
        }

        if d.op != Op::Insert {
            char_count1 += items.len();
        }
        if d.op != Op::Delete {
            char_count2 += items.len();
        }
    }
    if patch_diff_len > 0 {
        patches.push(patch);
    }
    patches
}

/// Grow `patch`'s leading/trailing context against `source` until its
/// pattern is either uniquely located or as wide as `max_length` allows,
/// then pad by one more margin and record the grown region as leading
/// and trailing `Equal` diffs.
fn add_context<E: PartialEq + Clone>(mut patch: Patch<E>, source: &[E], opts: &PatchOptions) -> Patch<E> {
    if source.is_empty() {
        return patch;
    }
    let margin = opts.margin.max(0) as usize;
    let max_length = opts.max_length.max(0) as usize;

    let pattern_bounds = |padding: usize| {
        let lo = patch.start1.saturating_sub(padding);
        let hi = (patch.start1 + patch.length1 + padding).min(source.len());
        (lo, hi)
    };

    let mut padding = 0usize;
    let (mut lo, mut hi) = pattern_bounds(padding);
    while diff::index_of_slice(source, &source[lo..hi], 0)
        != diff::last_index_of_slice(source, &source[lo..hi])
        && hi - lo < max_length.saturating_sub(2 * margin)
    {
        padding += margin;
        let bounds = pattern_bounds(padding);
        lo = bounds.0;
        hi = bounds.1;
    }
    padding += margin;

    let prefix_start = patch.start1.saturating_sub(padding);
    let prefix = &source[prefix_start..patch.start1];
    if !prefix.is_empty() {
        patch.diffs.insert(0, Diff::new(Op::Equal, prefix.to_vec()));
    }
    let suffix_start = (patch.start1 + patch.length1).min(source.len());
    let suffix_end = (patch.start1 + patch.length1 + padding).min(source.len());
    let suffix = &source[suffix_start..suffix_end];
    if !suffix.is_empty() {
        patch.diffs.push(Diff::new(Op::Equal, suffix.to_vec()));
    }

    patch.start1 = patch.start1.saturating_sub(prefix.len());
    patch.start2 = patch.start2.saturating_sub(prefix.len());
    patch.length1 += prefix.len() + suffix.len();
    patch.length2 += prefix.len() + suffix.len();
    patch
}

/// Break any patch whose source length exceeds `opts.max_length` into a
/// chain of smaller patches, each carrying rolling context from its
/// neighbours so the chain still applies as a coherent whole.
pub fn split_max<E: Clone>(patches: &mut Vec<Patch<E>>, opts: &PatchOptions) {
    let patch_size = opts.max_length.max(0) as usize;
    let margin = opts.margin.max(0) as usize;
    if patch_size == 0 {
        return;
    }

    let mut x = 0usize;
    while x < patches.len() {
        if patches[x].length1 <= patch_size {
            x += 1;
            continue;
        }
        let bigpatch = patches.remove(x);
        let mut start1 = bigpatch.start1;
        let mut start2 = bigpatch.start2;
        let mut precontext: Vec<E> = Vec::new();
        let mut remaining: std::collections::VecDeque<Diff<E>> = bigpatch.diffs.into_iter().collect();
        let mut insert_at = x;

        while !remaining.is_empty() {
            let mut patch = Patch::empty(start1.saturating_sub(precontext.len()), start2.saturating_sub(precontext.len()));
            let mut empty = true;
            if !precontext.is_empty() {
                patch.length1 = precontext.len();
                patch.length2 = precontext.len();
                patch.diffs.push(Diff::new(Op::Equal, precontext.clone()));
            }

            while !remaining.is_empty() && patch.length1 < patch_size.saturating_sub(margin) {
                let front = remaining.front().unwrap();
                let op = front.op;
                let text = front.items.to_vec();

                if op == Op::Insert {
                    patch.length2 += text.len();
                    start2 += text.len();
                    patch.diffs.push(remaining.pop_front().unwrap());
                    empty = false;
                } else if op == Op::Delete
                    && patch.diffs.len() == 1
                    && patch.diffs[0].op == Op::Equal
                    && text.len() > 2 * patch_size
                {
                    patch.length1 += text.len();
                    start1 += text.len();
                    empty = false;
                    patch.diffs.push(remaining.pop_front().unwrap());
                } else {
                    let take = text.len().min(patch_size.saturating_sub(patch.length1).saturating_sub(margin));
                    let chunk: Vec<E> = text[..take].to_vec();
                    patch.length1 += chunk.len();
                    start1 += chunk.len();
                    if op == Op::Equal {
                        patch.length2 += chunk.len();
                        start2 += chunk.len();
                    } else {
                        empty = false;
                    }
                    patch.diffs.push(Diff::new(op, chunk.clone()));
                    if chunk.len() == text.len() {
                        remaining.pop_front();
                    } else {
                        let rest = text[chunk.len()..].to_vec();
                        remaining[0] = Diff::new(op, rest);
                    }
                }
            }

            precontext = target_text(&patch.diffs);
            if precontext.len() > margin {
                precontext = precontext[precontext.len() - margin..].to_vec();
            }
            let mut postcontext = source_text_from(&remaining);
            if postcontext.len() > margin {
                postcontext.truncate(margin);
            }
            if !postcontext.is_empty() {
                patch.length1 += postcontext.len();
                patch.length2 += postcontext.len();
                if let Some(last) = patch.diffs.last_mut() {
                    if last.op == Op::Equal {
                        let mut merged = last.items.to_vec();
                        merged.extend(postcontext.iter().cloned());
                        *last = Diff::new(Op::Equal, merged);
                    } else {
                        patch.diffs.push(Diff::new(Op::Equal, postcontext));
                    }
                } else {
                    patch.diffs.push(Diff::new(Op::Equal, postcontext));
                }
            }

            if !empty {
                patches.insert(insert_at, patch);
                insert_at += 1;
            }
        }
        x = insert_at;
    }
}

fn target_text<E: Clone>(diffs: &[Diff<E>]) -> Vec<E> {
    diffs.iter().filter(|d| d.op != Op::Delete).flat_map(|d| d.items.to_vec()).collect()
}

fn source_text_from<E: Clone>(diffs: &std::collections::VecDeque<Diff<E>>) -> Vec<E> {
    diffs.iter().filter(|d| d.op != Op::Insert).flat_map(|d| d.items.to_vec()).collect()
}

/// Prepend/append a unique synthetic padding run of length `margin` to
/// every patch's edge diffs, growing the adjacent edge `Equal` diff if
/// one already exists. Returns the padding so the caller can strip it
/// from the text again after applying.
pub fn add_padding<E: Clone + PadSymbol>(patches: &mut [Patch<E>], opts: &PatchOptions) -> Vec<E> {
    let padding_len = opts.margin.max(0) as usize;
    let null_padding: Vec<E> = (1..=padding_len as u32).map(|n| E::pad_symbol(n as u8)).collect();
    if patches.is_empty() {
        return null_padding;
    }

    for patch in patches.iter_mut() {
        patch.start1 += padding_len;
        patch.start2 += padding_len;
    }

    {
        let patch = patches.first_mut().unwrap();
        match patch.diffs.first() {
            None => {
                patch.diffs.insert(0, Diff::new(Op::Equal, null_padding.clone()));
                patch.start1 -= padding_len;
                patch.start2 -= padding_len;
                patch.length1 += padding_len;
                patch.length2 += padding_len;
            }
            Some(d) if d.op != Op::Equal => {
                patch.diffs.insert(0, Diff::new(Op::Equal, null_padding.clone()));
                patch.start1 -= padding_len;
                patch.start2 -= padding_len;
                patch.length1 += padding_len;
                patch.length2 += padding_len;
            }
            Some(d) => {
                let existing = d.items.len();
                if padding_len > existing {
                    let extra = padding_len - existing;
                    let mut new_items = null_padding[existing..].to_vec();
                    new_items.extend(d.items.to_vec());
                    patch.diffs[0] = Diff::new(Op::Equal, new_items);
                    patch.start1 -= extra;
                    patch.start2 -= extra;
                    patch.length1 += extra;
                    patch.length2 += extra;
                }
            }
        }
    }

    {
        let patch = patches.last_mut().unwrap();
        match patch.diffs.last() {
            None => {
                patch.diffs.push(Diff::new(Op::Equal, null_padding.clone()));
                patch.length1 += padding_len;
                patch.length2 += padding_len;
            }
            Some(d) if d.op != Op::Equal => {
                patch.diffs.push(Diff::new(Op::Equal, null_padding.clone()));
                patch.length1 += padding_len;
                patch.length2 += padding_len;
            }
            Some(d) => {
                let existing = d.items.len();
                if padding_len > existing {
                    let extra = padding_len - existing;
                    let mut new_items = d.items.to_vec();
                    new_items.extend_from_slice(&null_padding[..extra]);
                    let last = patch.diffs.len() - 1;
                    patch.diffs[last] = Diff::new(Op::Equal, new_items);
                    patch.length1 += extra;
                    patch.length2 += extra;
                }
            }
        }
    }

    null_padding
}

/// Apply `patches` to `text`, tolerating drift via bitap relocation.
///
/// Returns the patched text and a parallel `applied` array: `false` at
/// index `i` means `patches[i]` could not be confidently located and was
/// skipped, not that an error occurred.
pub fn apply_patches<E>(
    patches: &[Patch<E>],
    text: &Rope<E>,
    opts: &PatchOptions,
) -> (Rope<E>, Vec<bool>)
where
    E: PartialEq + Eq + std::hash::Hash + Clone + PadSymbol + CharClass + 'static,
{
    if patches.is_empty() {
        return (text.clone(), Vec::new());
    }

    let mut patches: Vec<Patch<E>> = patches.to_vec();
    let null_padding = add_padding(&mut patches, opts);
    split_max(&mut patches, opts);

    let mut working: Vec<E> = null_padding.clone();
    working.extend(text.to_vec());
    working.extend(null_padding.iter().cloned());

    let max_length = opts.max_length.max(0) as usize;
    let mut delta: isize = 0;
    let mut applied = Vec::with_capacity(patches.len());

    let diff_opts = DiffOptions::<E>::default();

    for patch in &patches {
        let expected_loc = (patch.start2 as isize + delta).max(0) as usize;
        let text1 = source_text(&patch.diffs);

        let mut start_loc;
        let mut end_loc: Option<usize> = None;
        if text1.len() > max_length {
            let head = &text1[..max_length];
            start_loc = bitap::match_pattern(&working, head, expected_loc, &opts.match_options);
            if let Some(s) = start_loc {
                let tail = &text1[text1.len() - max_length..];
                let tail_loc = expected_loc + text1.len() - max_length;
                end_loc = bitap::match_pattern(&working, tail, tail_loc, &opts.match_options);
                if end_loc.is_none() || s >= end_loc.unwrap() {
                    start_loc = None;
                }
            }
        } else {
            start_loc = bitap::match_pattern(&working, &text1, expected_loc, &opts.match_options);
        }

        let Some(start) = start_loc else {
            applied.push(false);
            delta -= patch.length2 as isize - patch.length1 as isize;
            continue;
        };

        applied.push(true);
        delta = start as isize - expected_loc as isize;
        let end = match end_loc {
            Some(e) => (e + max_length).min(working.len()),
            None => (start + text1.len()).min(working.len()),
        };
        let text2 = &working[start..end];

        if text1 == *text2 {
            let target = target_text(&patch.diffs);
            working.splice(start..start + text1.len(), target);
        } else {
            let diffs = diff::diff(&Rope::from_vec(text1.clone()), &Rope::from_vec(text2.to_vec()), &diff_opts);
            if text1.len() > max_length
                && diff::edit_distance(&diffs) as f32 / text1.len() as f32 > opts.delete_threshold
            {
                *applied.last_mut().unwrap() = false;
            } else {
                let mut diffs = diffs;
                cleanup::cleanup_semantic_lossless(&mut diffs);
                let mut index1 = 0usize;
                let mut index2 = 0usize;
                for m in &patch.diffs {
                    let items = m.items.to_vec();
                    let items_len = items.len();
                    if m.op != Op::Equal {
                        index2 = diff_x_index(&diffs, index1);
                    }
                    match m.op {
                        Op::Insert => {
                            let at = (start + index2).min(working.len());
                            for (offset, item) in items.into_iter().enumerate() {
                                working.insert(at + offset, item);
                            }
                        }
                        Op::Delete => {
                            let from = (start + index2).min(working.len());
                            let to_idx = diff_x_index(&diffs, index1 + items_len);
                            let to = (start + to_idx).min(working.len());
                            if from < to {
                                working.drain(from..to);
                            }
                        }
                        Op::Equal => {}
                    }
                    if m.op != Op::Delete {
                        index1 += items_len;
                    }
                }
            }
        }
    }

    let stripped = working[null_padding.len()..working.len() - null_padding.len()].to_vec();
    (Rope::from_vec(stripped), applied)
}

fn source_text<E: Clone>(diffs: &[Diff<E>]) -> Vec<E> {
    diffs.iter().filter(|d| d.op != Op::Insert).flat_map(|d| d.items.to_vec()).collect()
}

/// Translate index `loc1` (into the pre-image of `diffs`) to the
/// corresponding index in its post-image.
fn diff_x_index<E>(diffs: &[Diff<E>], loc1: usize) -> usize {
    let mut chars1 = 0usize;
    let mut chars2 = 0usize;
    let mut last_chars1 = 0usize;
    let mut last_chars2 = 0usize;
    let mut x = 0usize;
    while x < diffs.len() {
        if diffs[x].op != Op::Insert {
            chars1 += diffs[x].items.len();
        }
        if diffs[x].op != Op::Delete {
            chars2 += diffs[x].items.len();
        }
        if chars1 > loc1 {
            break;
        }
        last_chars1 = chars1;
        last_chars2 = chars2;
        x += 1;
    }
    if x != diffs.len() && diffs[x].op == Op::Delete {
        last_chars2
    } else {
        last_chars2 + (loc1 - last_chars1)
    }
}

// -- stringify/parse, scoped to `char` as the textual interchange type ---

/// Render `patches` in the GNU unified-diff-like textual format (spec
/// §4.5): `@@ -start1,length1 +start2,length2 @@` followed by body lines
/// prefixed `' '`/`'+'`/`'-'`, each holding the percent-encoded content
/// of that diff.
pub fn to_text(patches: &[Patch<char>]) -> String {
    let mut out = String::new();
    for patch in patches {
        out.push_str(&header(patch));
        for d in &patch.diffs {
            let prefix = match d.op {
                Op::Insert => '+',
                Op::Delete => '-',
                Op::Equal => ' ',
            };
            out.push(prefix);
            out.push_str(&diff::delta::encode_insert(&d.items.to_vec()));
            out.push('\n');
        }
    }
    out
}

fn header(patch: &Patch<char>) -> String {
    let coords = |start: usize, len: usize| {
        if len == 0 {
            format!("{},0", start)
        } else if len == 1 {
            format!("{}", start + 1)
        } else {
            format!("{},{}", start + 1, len)
        }
    };
    format!(
        "@@ -{} +{} @@\n",
        coords(patch.start1, patch.length1),
        coords(patch.start2, patch.length2)
    )
}

/// Parse the textual format produced by [`to_text`].
///
/// # Errors
/// `Error::InvalidArgument` on a malformed header or an unrecognized
/// body-line prefix.
pub fn parse(text: &str) -> crate::Result<Vec<Patch<char>>> {
    let mut patches = Vec::new();
    let mut lines = text.lines().peekable();

    while let Some(&line) = lines.peek() {
        let (start1, length1, start2, length2) = parse_header(line)?;
        lines.next();
        let mut patch = Patch {
            diffs: Vec::new(),
            start1,
            length1,
            start2,
            length2,
        };

        while let Some(&line) = lines.peek() {
            if line.starts_with("@@") {
                break;
            }
            lines.next();
            if line.is_empty() {
                continue;
            }
            let (tag, rest) = (line.as_bytes()[0] as char, &line[1..]);
            match tag {
                '+' => patch.diffs.push(Diff::new(Op::Insert, diff::delta::decode_insert(rest)?)),
                '-' => patch.diffs.push(Diff::new(Op::Delete, diff::delta::decode_insert(rest)?)),
                ' ' => patch.diffs.push(Diff::new(Op::Equal, diff::delta::decode_insert(rest)?)),
                _ => {
                    return Err(Error::InvalidArgument(format!(
                        "unknown patch body prefix {tag:?}"
                    )))
                }
            }
        }
        if patch.diffs.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "patch header {line:?} has no body diffs"
            )));
        }
        patches.push(patch);
    }
    Ok(patches)
}

fn parse_header(line: &str) -> crate::Result<(usize, usize, usize, usize)> {
    let body = line
        .strip_prefix("@@ -")
        .and_then(|s| s.strip_suffix(" @@"))
        .ok_or_else(|| Error::InvalidArgument(format!("malformed patch header {line:?}")))?;
    let (left, right) = body
        .split_once(" +")
        .ok_or_else(|| Error::InvalidArgument(format!("malformed patch header {line:?}")))?;
    let (s1, l1) = parse_coords(left, line)?;
    let (s2, l2) = parse_coords(right, line)?;
    Ok((s1, l1, s2, l2))
}

fn parse_coords(field: &str, line: &str) -> crate::Result<(usize, usize)> {
    let err = || Error::InvalidArgument(format!("malformed patch header {line:?}"));
    match field.split_once(',') {
        Some((s, l)) => {
            let start: usize = s.parse().map_err(|_| err())?;
            let len: usize = l.parse().map_err(|_| err())?;
            Ok((start.saturating_sub(1), if len == 0 { 0 } else { len }))
        }
        None => {
            let start: usize = field.parse().map_err(|_| err())?;
            Ok((start.saturating_sub(1), 1))
        }
    }
    .map(|(s, l)| if field.contains(',') && field.ends_with(",0") { (s, 0) } else { (s, l) })
}
