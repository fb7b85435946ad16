//! The half-match heuristic: look for a common substring at least half the
//! length of the longer input and use it to divide-and-conquer the diff.

use super::{common_prefix, common_suffix, index_of_slice};

/// A common substring found between `text1` and `text2`, splitting both
/// into a prefix pair and a suffix pair around it.
pub struct HalfMatch<E> {
    pub text1_prefix: Vec<E>,
    pub text1_suffix: Vec<E>,
    pub text2_prefix: Vec<E>,
    pub text2_suffix: Vec<E>,
    pub common: Vec<E>,
}

type Candidate<E> = (Vec<E>, Vec<E>, Vec<E>, Vec<E>, Vec<E>);

/// Find a half-match between `text1` and `text2`, or `None` if neither is
/// long enough or no sufficiently long common substring exists.
pub fn half_match<E: PartialEq + Clone>(text1: &[E], text2: &[E]) -> Option<HalfMatch<E>> {
    let (long, short, swapped) =
        if text1.len() >= text2.len() { (text1, text2, false) } else { (text2, text1, true) };

    if long.len() < 4 || short.len() * 2 < long.len() {
        return None;
    }

    let hm1 = half_match_at(long, short, long.len().div_ceil(4));
    let hm2 = half_match_at(long, short, long.len().div_ceil(2));

    let best = match (hm1, hm2) {
        (None, None) => None,
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (Some(a), Some(b)) => Some(if a.4.len() >= b.4.len() { a } else { b }),
    }?;

    let (long_prefix, long_suffix, short_prefix, short_suffix, common) = best;
    Some(if swapped {
        HalfMatch {
            text1_prefix: short_prefix,
            text1_suffix: short_suffix,
            text2_prefix: long_prefix,
            text2_suffix: long_suffix,
            common,
        }
    } else {
        HalfMatch {
            text1_prefix: long_prefix,
            text1_suffix: long_suffix,
            text2_prefix: short_prefix,
            text2_suffix: short_suffix,
            common,
        }
    })
}

/// Probe for a half-match using the seed `long[i..i + long.len()/4]`.
fn half_match_at<E: PartialEq + Clone>(long: &[E], short: &[E], i: usize) -> Option<Candidate<E>> {
    let seed = &long[i..i + long.len() / 4];
    let mut best: Option<Candidate<E>> = None;
    let mut j = 0;
    while let Some(pos) = index_of_slice(short, seed, j) {
        let prefix_len = common_prefix(&long[i..], &short[pos..]);
        let suffix_len = common_suffix(&long[..i], &short[..pos]);
        let best_len = best.as_ref().map(|b| b.4.len()).unwrap_or(0);
        if suffix_len + prefix_len > best_len {
            let mut common = short[pos - suffix_len..pos].to_vec();
            common.extend_from_slice(&short[pos..pos + prefix_len]);
            best = Some((
                long[..i - suffix_len].to_vec(),
                long[i + prefix_len..].to_vec(),
                short[..pos - suffix_len].to_vec(),
                short[pos + prefix_len..].to_vec(),
                common,
            ));
        }
        j = pos + 1;
    }
    best.filter(|b| 2 * b.4.len() >= long.len())
}
