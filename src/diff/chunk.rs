//! Chunk-level diff speedup: recode each chunk (e.g. a line, for text) as
//! a single synthetic code point, diff the much shorter coded sequences,
//! then expand the result back and re-diff any replacement spans at the
//! element level so the final output is still element-accurate.

use super::{cleanup, diff_vec, index_of_slice, Deadline, Diff, DiffOptions, Op};
use crate::unicode::CharClass;

const MAX_CODES_TEXT1: usize = 40_000;
const MAX_CODES_TEXT2: usize = 65_535;

pub(crate) fn chunk_diff<E: PartialEq + Clone + CharClass + 'static>(
    text1: &[E],
    text2: &[E],
    options: &DiffOptions<E>,
    deadline: &Deadline,
) -> Vec<Diff<E>> {
    let mut chunk_list: Vec<Vec<E>> = Vec::new();
    let codes1 = encode(split_chunks(text1, &options.chunk_separator), &mut chunk_list, MAX_CODES_TEXT1);
    let codes2 = encode(split_chunks(text2, &options.chunk_separator), &mut chunk_list, MAX_CODES_TEXT2);

    let code_options: DiffOptions<u32> = DiffOptions {
        timeout_seconds: options.timeout_seconds,
        edit_cost: options.edit_cost,
        is_chunking_enabled: false,
        chunk_separator: Vec::new(),
    };
    let code_diffs = diff_vec(&codes1, &codes2, &code_options, deadline);

    let mut expanded: Vec<Diff<E>> = code_diffs
        .iter()
        .map(|d| {
            let items: Vec<E> =
                d.items.to_vec().into_iter().flat_map(|code| chunk_list[code as usize].clone()).collect();
            Diff::new(d.op, items)
        })
        .collect();

    cleanup::cleanup_semantic(&mut expanded);
    rediff_replacements(&mut expanded, options, deadline);
    expanded
}

/// Split `text` into pieces each ending at an occurrence of `sep`
/// (inclusive), with a final piece that may lack the trailing separator.
fn split_chunks<E: PartialEq + Clone>(text: &[E], sep: &[E]) -> Vec<Vec<E>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < text.len() {
        match index_of_slice(&text[start..], sep, 0) {
            Some(rel) => {
                let end = start + rel + sep.len();
                chunks.push(text[start..end].to_vec());
                start = end;
            }
            None => {
                chunks.push(text[start..].to_vec());
                break;
            }
        }
    }
    chunks
}

/// Assign each chunk a code, reusing a code for an identical chunk already
/// seen. Once `chunk_list` reaches `cap` distinct entries, the remainder
/// of this text's chunks is folded into one final literal chunk so no
/// element is ever dropped.
fn encode<E: PartialEq + Clone>(chunks: Vec<Vec<E>>, chunk_list: &mut Vec<Vec<E>>, cap: usize) -> Vec<u32> {
    let mut codes = Vec::with_capacity(chunks.len());
    let mut i = 0;
    while i < chunks.len() {
        if chunk_list.len() >= cap {
            let mut rest = Vec::new();
            for c in &chunks[i..] {
                rest.extend_from_slice(c);
            }
            codes.push(intern(chunk_list, rest));
            break;
        }
        codes.push(intern(chunk_list, chunks[i].clone()));
        i += 1;
    }
    codes
}

fn intern<E: PartialEq>(chunk_list: &mut Vec<Vec<E>>, chunk: Vec<E>) -> u32 {
    match chunk_list.iter().position(|c| *c == chunk) {
        Some(pos) => pos as u32,
        None => {
            chunk_list.push(chunk);
            (chunk_list.len() - 1) as u32
        }
    }
}

/// Re-diff every adjacent Delete/Insert replacement pair at the element
/// level, since the chunk-coded diff only guarantees chunk-granularity
/// accuracy.
fn rediff_replacements<E: PartialEq + Clone + CharClass + 'static>(
    diffs: &mut Vec<Diff<E>>,
    options: &DiffOptions<E>,
    deadline: &Deadline,
) {
    let mut no_chunk = options.clone();
    no_chunk.is_chunking_enabled = false;

    let mut result = Vec::with_capacity(diffs.len());
    let mut i = 0;
    while i < diffs.len() {
        if i + 1 < diffs.len() {
            let (a, b) = (&diffs[i], &diffs[i + 1]);
            let pair = match (a.op, b.op) {
                (Op::Delete, Op::Insert) => Some((a, b)),
                (Op::Insert, Op::Delete) => Some((b, a)),
                _ => None,
            };
            if let Some((del, ins)) = pair {
                result.extend(diff_vec(&del.items.to_vec(), &ins.items.to_vec(), &no_chunk, deadline));
                i += 2;
                continue;
            }
        }
        result.push(diffs[i].clone());
        i += 1;
    }
    *diffs = result;
}
