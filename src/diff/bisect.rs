//! The Myers O(ND) middle-snake bisect, the diff engine's fallback when
//! half-match and chunking don't apply.

use super::{diff_vec, Deadline, Diff, DiffOptions, Op};
use crate::unicode::CharClass;

/// Find a middle snake of `text1` and `text2`, split there, and diff each
/// half independently.
pub(crate) fn bisect<E: PartialEq + Clone + CharClass + 'static>(
    text1: &[E],
    text2: &[E],
    options: &DiffOptions<E>,
    deadline: &Deadline,
) -> Vec<Diff<E>> {
    let n = text1.len() as isize;
    let m = text2.len() as isize;
    let max_d = (n + m + 1) / 2;
    let v_offset = max_d;
    let v_length = 2 * max_d;
    let mut v1 = vec![-1isize; v_length as usize];
    let mut v2 = vec![-1isize; v_length as usize];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;
    let delta = n - m;
    // If the total length is odd, the front path overlaps the reverse
    // path first on the forward scan; otherwise on the reverse scan.
    let front = delta % 2 != 0;
    let mut k1start = 0isize;
    let mut k1end = 0isize;
    let mut k2start = 0isize;
    let mut k2end = 0isize;

    for d in 0..max_d {
        if deadline.expired() {
            break;
        }

        let mut k1 = -d + k1start;
        while k1 <= d - k1end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < n && y1 < m && text1[x1 as usize] == text2[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;
            if x1 > n {
                k1end += 2;
            } else if y1 > m {
                k1start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if k2_offset >= 0 && k2_offset < v_length && v2[k2_offset as usize] != -1 {
                    let x2 = n - v2[k2_offset as usize];
                    if x1 >= x2 {
                        return bisect_split(text1, text2, x1 as usize, y1 as usize, options, deadline);
                    }
                }
            }
            k1 += 2;
        }

        let mut k2 = -d + k2start;
        while k2 <= d - k2end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < n
                && y2 < m
                && text1[(n - x2 - 1) as usize] == text2[(m - y2 - 1) as usize]
            {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;
            if x2 > n {
                k2end += 2;
            } else if y2 > m {
                k2start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if k1_offset >= 0 && k1_offset < v_length && v1[k1_offset as usize] != -1 {
                    let x1 = v1[k1_offset as usize];
                    let y1 = v_offset + x1 - k1_offset;
                    let mirrored_x2 = n - x2;
                    if x1 >= mirrored_x2 {
                        return bisect_split(text1, text2, x1 as usize, y1 as usize, options, deadline);
                    }
                }
            }
            k2 += 2;
        }
    }

    vec![Diff::new(Op::Delete, text1.to_vec()), Diff::new(Op::Insert, text2.to_vec())]
}

fn bisect_split<E: PartialEq + Clone + CharClass + 'static>(
    text1: &[E],
    text2: &[E],
    x: usize,
    y: usize,
    options: &DiffOptions<E>,
    deadline: &Deadline,
) -> Vec<Diff<E>> {
    // Splits recurse with chunking disabled: the chunk pass only pays off
    // for the outermost diff, where whole chunks can be coded as a unit.
    let mut no_chunk = options.clone();
    no_chunk.is_chunking_enabled = false;

    let mut diffs = diff_vec(&text1[..x], &text2[..y], &no_chunk, deadline);
    diffs.extend(diff_vec(&text1[x..], &text2[y..], &no_chunk, deadline));
    diffs
}
