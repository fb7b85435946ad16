//! Post-processing passes over a raw diff: merging adjacent edits,
//! discarding semantically trivial noise, aligning edit boundaries to
//! natural break points, and collapsing short equalities that cost more
//! to keep than to fold into their neighbours.

use crate::internals::common_overlap_len;
use crate::unicode::{self, CharClass};

use super::{common_prefix, common_suffix, Diff, Op};

/// Merge adjacent same-operation diffs, factor common prefixes/suffixes
/// of a Delete/Insert run into neighbouring equalities, and iterate to a
/// fixed point.
pub fn cleanup_merge<E: PartialEq + Clone>(diffs: &mut Vec<Diff<E>>) {
    first_pass(diffs);
    while shift_pass(diffs) {
        first_pass(diffs);
    }
}

fn first_pass<E: PartialEq + Clone>(diffs: &mut Vec<Diff<E>>) {
    let mut out: Vec<Diff<E>> = Vec::with_capacity(diffs.len());
    let mut i = 0;
    while i < diffs.len() {
        match diffs[i].op {
            Op::Equal => {
                out.push(diffs[i].clone());
                i += 1;
            }
            Op::Delete | Op::Insert => {
                let mut delete_buf: Vec<E> = Vec::new();
                let mut insert_buf: Vec<E> = Vec::new();
                let mut count = 0;
                while i < diffs.len() && diffs[i].op != Op::Equal {
                    match diffs[i].op {
                        Op::Delete => delete_buf.extend(diffs[i].items.to_vec()),
                        Op::Insert => insert_buf.extend(diffs[i].items.to_vec()),
                        Op::Equal => unreachable!(),
                    }
                    count += 1;
                    i += 1;
                }
                if count > 1 && !delete_buf.is_empty() && !insert_buf.is_empty() {
                    let prefix = common_prefix(&insert_buf, &delete_buf);
                    if prefix > 0 {
                        push_equal(&mut out, insert_buf[..prefix].to_vec());
                        insert_buf.drain(..prefix);
                        delete_buf.drain(..prefix);
                    }
                    let suffix = common_suffix(&insert_buf, &delete_buf);
                    let trailing = if suffix > 0 {
                        let t = insert_buf[insert_buf.len() - suffix..].to_vec();
                        insert_buf.truncate(insert_buf.len() - suffix);
                        delete_buf.truncate(delete_buf.len() - suffix);
                        Some(t)
                    } else {
                        None
                    };
                    if !delete_buf.is_empty() {
                        out.push(Diff::new(Op::Delete, delete_buf));
                    }
                    if !insert_buf.is_empty() {
                        out.push(Diff::new(Op::Insert, insert_buf));
                    }
                    if let Some(t) = trailing {
                        push_equal(&mut out, t);
                    }
                } else {
                    if !delete_buf.is_empty() {
                        out.push(Diff::new(Op::Delete, delete_buf));
                    }
                    if !insert_buf.is_empty() {
                        out.push(Diff::new(Op::Insert, insert_buf));
                    }
                }
            }
        }
    }
    out.retain(|d| !d.items.is_empty());
    *diffs = out;
}

fn push_equal<E: Clone>(out: &mut Vec<Diff<E>>, items: Vec<E>) {
    if items.is_empty() {
        return;
    }
    if let Some(last) = out.last_mut() {
        if last.op == Op::Equal {
            let mut v = last.items.to_vec();
            v.extend(items);
            *last = Diff::new(Op::Equal, v);
            return;
        }
    }
    out.push(Diff::new(Op::Equal, items));
}

fn ends_with<E: PartialEq>(a: &[E], b: &[E]) -> bool {
    b.len() <= a.len() && a[a.len() - b.len()..] == *b
}

fn starts_with<E: PartialEq>(a: &[E], b: &[E]) -> bool {
    b.len() <= a.len() && a[..b.len()] == *b
}

/// A single edit surrounded by equalities can sometimes be shifted
/// sideways over one of them, eliminating a split. Returns whether any
/// shift was made (the caller re-runs `first_pass` and retries if so).
fn shift_pass<E: PartialEq + Clone>(diffs: &mut Vec<Diff<E>>) -> bool {
    let mut changed = false;
    let mut i = 1;
    while i + 1 < diffs.len() {
        if diffs[i - 1].op == Op::Equal && diffs[i + 1].op == Op::Equal {
            let this_items = diffs[i].items.to_vec();
            let prev_items = diffs[i - 1].items.to_vec();
            let next_items = diffs[i + 1].items.to_vec();
            if !prev_items.is_empty() && ends_with(&this_items, &prev_items) {
                let mut new_this = prev_items.clone();
                new_this.extend_from_slice(&this_items[..this_items.len() - prev_items.len()]);
                let mut new_next = prev_items;
                new_next.extend(next_items);
                let op = diffs[i].op;
                diffs[i] = Diff::new(op, new_this);
                diffs[i + 1] = Diff::new(Op::Equal, new_next);
                diffs.remove(i - 1);
                changed = true;
                continue;
            } else if !next_items.is_empty() && starts_with(&this_items, &next_items) {
                let mut new_prev = prev_items;
                new_prev.extend(next_items.clone());
                let mut new_this = this_items[next_items.len()..].to_vec();
                new_this.extend(next_items);
                let op = diffs[i].op;
                diffs[i - 1] = Diff::new(Op::Equal, new_prev);
                diffs[i] = Diff::new(op, new_this);
                diffs.remove(i + 1);
                changed = true;
                continue;
            }
        }
        i += 1;
    }
    changed
}

/// Discard edits that are semantically noise: equalities too short to be
/// worth the split they cause, and overlapping delete/insert pairs folded
/// into a shared equality.
pub fn cleanup_semantic<E: PartialEq + Clone + CharClass + 'static>(diffs: &mut Vec<Diff<E>>) {
    let mut changed = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<Vec<E>> = None;
    let (mut ins1, mut del1, mut ins2, mut del2) = (0usize, 0usize, 0usize, 0usize);
    let mut pointer = 0usize;
    while pointer < diffs.len() {
        if diffs[pointer].op == Op::Equal {
            equalities.push(pointer);
            ins1 = ins2;
            del1 = del2;
            ins2 = 0;
            del2 = 0;
            last_equality = Some(diffs[pointer].items.to_vec());
        } else {
            if diffs[pointer].op == Op::Insert {
                ins2 += diffs[pointer].items.len();
            } else {
                del2 += diffs[pointer].items.len();
            }
            if let Some(eq) = &last_equality {
                if eq.len() <= ins1.max(del1) && eq.len() <= ins2.max(del2) {
                    let at = *equalities.last().unwrap();
                    let eq = eq.clone();
                    diffs[at] = Diff::new(Op::Delete, eq.clone());
                    diffs.insert(at + 1, Diff::new(Op::Insert, eq));
                    equalities.pop();
                    equalities.pop();
                    pointer = equalities.last().copied().unwrap_or(usize::MAX);
                    ins1 = 0;
                    del1 = 0;
                    ins2 = 0;
                    del2 = 0;
                    last_equality = None;
                    changed = true;
                    if pointer == usize::MAX {
                        pointer = 0;
                        continue;
                    }
                }
            }
        }
        pointer = pointer.wrapping_add(1);
    }
    if changed {
        cleanup_merge(diffs);
    }

    // Fold delete/insert overlaps into a shared equality.
    let mut i = 1;
    while i < diffs.len() {
        if diffs[i - 1].op == Op::Delete && diffs[i].op == Op::Insert {
            let deletion = diffs[i - 1].items.to_vec();
            let insertion = diffs[i].items.to_vec();
            let overlap1 = common_overlap_len(&deletion, &insertion);
            let overlap2 = common_overlap_len(&insertion, &deletion);
            if overlap1 >= overlap2 {
                if overlap1 as f64 >= deletion.len() as f64 / 2.0 || overlap1 as f64 >= insertion.len() as f64 / 2.0 {
                    let equal_part = insertion[..overlap1].to_vec();
                    diffs[i - 1] = Diff::new(Op::Delete, deletion[..deletion.len() - overlap1].to_vec());
                    let new_insert = Diff::new(Op::Insert, insertion[overlap1..].to_vec());
                    diffs[i] = new_insert;
                    diffs.insert(i, Diff::new(Op::Equal, equal_part));
                    i += 1;
                }
            } else if overlap2 as f64 >= deletion.len() as f64 / 2.0 || overlap2 as f64 >= insertion.len() as f64 / 2.0 {
                let equal_part = deletion[..overlap2].to_vec();
                diffs[i - 1] = Diff::new(Op::Insert, insertion[..insertion.len() - overlap2].to_vec());
                diffs[i] = Diff::new(Op::Delete, deletion[overlap2..].to_vec());
                diffs.insert(i, Diff::new(Op::Equal, equal_part));
                i += 1;
            }
        }
        i += 1;
    }
    diffs.retain(|d| !d.items.is_empty());
    cleanup_semantic_lossless(diffs);
}

/// For each `Equal, Edit, Equal` triple, shift `Edit` across the boundary
/// to whichever alignment the boundary oracle scores highest: a line
/// break, a blank line, a word boundary, plain whitespace.
pub fn cleanup_semantic_lossless<E>(diffs: &mut Vec<Diff<E>>)
where
    E: PartialEq + Clone + CharClass + 'static,
{
    let mut pointer = 1isize;
    while pointer < diffs.len() as isize - 1 {
        let p = pointer as usize;
        if diffs[p - 1].op == Op::Equal && diffs[p + 1].op == Op::Equal {
            let mut equality1 = diffs[p - 1].items.to_vec();
            let mut edit = diffs[p].items.to_vec();
            let mut equality2 = diffs[p + 1].items.to_vec();

            let common_offset = common_suffix(&equality1, &edit);
            if common_offset > 0 {
                let common_str = edit[edit.len() - common_offset..].to_vec();
                equality1.truncate(equality1.len() - common_offset);
                let mut new_edit = common_str.clone();
                new_edit.extend_from_slice(&edit[..edit.len() - common_offset]);
                edit = new_edit;
                let mut new_eq2 = common_str;
                new_eq2.extend(equality2);
                equality2 = new_eq2;
            }

            let mut best_eq1 = equality1.clone();
            let mut best_edit = edit.clone();
            let mut best_eq2 = equality2.clone();
            let mut best_score = score(&equality1, &edit) + score(&edit, &equality2);

            while !edit.is_empty() && !equality2.is_empty() && edit[0] == equality2[0] {
                equality1.push(edit[0].clone());
                edit.remove(0);
                edit.push(equality2[0].clone());
                equality2.remove(0);
                let s = score(&equality1, &edit) + score(&edit, &equality2);
                if s >= best_score {
                    best_score = s;
                    best_eq1 = equality1.clone();
                    best_edit = edit.clone();
                    best_eq2 = equality2.clone();
                }
            }

            if diffs[p - 1].items.to_vec() != best_eq1 {
                let op = diffs[p].op;
                let mut next_pointer = p;
                if !best_eq1.is_empty() {
                    diffs[p - 1] = Diff::new(Op::Equal, best_eq1);
                } else {
                    diffs.remove(p - 1);
                    next_pointer -= 1;
                }
                diffs[next_pointer] = Diff::new(op, best_edit);
                if !best_eq2.is_empty() {
                    diffs[next_pointer + 1] = Diff::new(Op::Equal, best_eq2);
                } else {
                    diffs.remove(next_pointer + 1);
                }
            }
        }
        pointer += 1;
    }
}

/// Score how good a boundary is to split on, between the end of `one` and
/// the start of `two`. Higher is better; range is 0–6 per spec.
fn score<E: CharClass + 'static>(one: &[E], two: &[E]) -> i32 {
    if one.is_empty() || two.is_empty() {
        return 6;
    }
    let e1 = &one[one.len() - 1];
    let e2 = &two[0];
    let non_alnum1 = !e1.is_letter_or_digit();
    let non_alnum2 = !e2.is_letter_or_digit();
    let ws1 = non_alnum1 && e1.is_whitespace();
    let ws2 = non_alnum2 && e2.is_whitespace();
    let break1 = ws1 && e1.is_control();
    let break2 = ws2 && e2.is_control();
    let blank1 = break1 && unicode::blank_line_end(one);
    let blank2 = break2 && unicode::blank_line_start(two);

    if blank1 || blank2 {
        5
    } else if break1 || break2 {
        4
    } else if non_alnum1 && !ws1 && ws2 {
        3
    } else if ws1 || ws2 {
        2
    } else if non_alnum1 || non_alnum2 {
        1
    } else {
        0
    }
}

/// Collapse equalities shorter than `edit_cost` that sit between edits on
/// both sides, where keeping the split costs more bytes than merging it
/// away would.
pub fn cleanup_efficiency<E: PartialEq + Clone>(diffs: &mut Vec<Diff<E>>, edit_cost: i16) {
    let mut changed = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<Vec<E>> = None;
    let mut pointer = 0usize;
    let (mut pre_ins, mut pre_del, mut post_ins, mut post_del) = (false, false, false, false);

    while pointer < diffs.len() {
        if diffs[pointer].op == Op::Equal {
            let short_and_surrounded = diffs[pointer].items.len() < edit_cost.max(0) as usize
                && (post_ins || post_del);
            if short_and_surrounded {
                equalities.push(pointer);
                pre_ins = post_ins;
                pre_del = post_del;
                last_equality = Some(diffs[pointer].items.to_vec());
            } else {
                equalities.clear();
                last_equality = None;
            }
            post_ins = false;
            post_del = false;
        } else {
            if diffs[pointer].op == Op::Delete {
                post_del = true;
            } else {
                post_ins = true;
            }
            if let Some(eq) = last_equality.clone() {
                let many_edits_before_and_after = (pre_ins && pre_del && post_ins && post_del)
                    || (eq.len() < edit_cost.max(0) as usize / 2
                        && [pre_ins, pre_del, post_ins, post_del].iter().filter(|b| **b).count() == 3);
                if many_edits_before_and_after {
                    let at = *equalities.last().unwrap();
                    diffs[at] = Diff::new(Op::Delete, eq.clone());
                    diffs.insert(at + 1, Diff::new(Op::Insert, eq));
                    equalities.pop();
                    last_equality = None;
                    if pre_ins && pre_del {
                        post_ins = true;
                        post_del = true;
                        equalities.clear();
                    } else {
                        if let Some(&p) = equalities.last() {
                            pointer = p;
                        }
                        post_ins = false;
                        post_del = false;
                        equalities.pop();
                        last_equality = None;
                    }
                    changed = true;
                }
            }
        }
        pointer += 1;
    }
    if changed {
        cleanup_merge(diffs);
    }
}
