//! # an-rope
//!
//! An immutable, persistent, generic sequence, a Rope, together with a
//! Diff/Match/Patch engine built on top of it.
//!
//! A [`Rope<E>`] is a balanced binary tree of immutable element chunks,
//! giving O(log n) indexed access, slicing, concatenation, insertion,
//! deletion, and search, while sharing structure between an old rope and
//! the new one any operation returns. It is generic over any equatable,
//! cloneable element type `E`; the canonical specialization is `E = char`
//! for text, but `u8`, Unicode scalar values, or tokens work just as well.
//!
//! On top of the rope sits [`diff`], a port of the Myers bisect diff
//! algorithm plus the semantic cleanup passes that make its output
//! readable, [`bitap`], a fuzzy pattern matcher, and [`patch`], which uses
//! both to build and apply fuzzy, context-bearing patches.
//!
//! For more on ropes generally, see:
//!
//! + <http://scienceblogs.com/goodmath/2009/01/26/ropes-twining-together-strings/>
//! + <https://www.ibm.com/developerworks/library/j-ropes/>

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::ops;
use std::sync::Arc;

mod internals;
pub mod unicode;

pub mod bitap;
pub mod diff;
pub mod error;
pub mod ops_ext;
pub mod patch;

pub use error::{Error, Result};

use internals::{Link, Node};

/// An immutable, persistent sequence of `E`.
///
/// Cloning a `Rope` is O(1): it just bumps a reference count on the root.
/// Every mutating-looking method (`insert`, `remove`, `concat`, ...)
/// returns a *new* `Rope` that shares as much structure with its inputs as
/// possible; nothing already built is ever changed in place.
#[derive(Clone)]
pub struct Rope<E> {
    root: Link<E>,
}

impl<E> Default for Rope<E> {
    fn default() -> Self {
        Rope { root: Node::empty() }
    }
}

impl<E> Rope<E> {
    /// An empty rope.
    ///
    /// # Examples
    /// ```
    /// use an_rope::Rope;
    /// let r: Rope<char> = Rope::new();
    /// assert!(r.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of elements in this rope.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// The depth of this rope's backing tree. Exposed for testing the
    /// balancing invariant (`depth <= 46` after `balance()`).
    pub fn depth(&self) -> u8 {
        self.root.depth()
    }

    /// The element at index `i`.
    ///
    /// # Errors
    /// `Error::OutOfRange` if `i >= self.len()`.
    pub fn get(&self, i: usize) -> Result<&E> {
        self.root.get(i).ok_or(Error::OutOfRange { index: i, len: self.len() })
    }
}

impl<E: Clone> Rope<E> {
    /// Build a rope from a vector of elements.
    pub fn from_vec(elements: Vec<E>) -> Self {
        if elements.is_empty() {
            Self::default()
        } else {
            Rope { root: Node::from_buffer(Arc::from(elements)) }
        }
    }

    /// Flatten this rope's elements into a single `Vec<E>`.
    pub fn to_vec(&self) -> Vec<E> {
        self.root.to_vec()
    }

    /// An iterator over every element in this rope, left to right.
    pub fn iter(&self) -> impl Iterator<Item = &E> + '_ {
        Node::iter(&self.root)
    }

    /// Split this rope at index `i`, consuming it and returning the left
    /// and right halves. `left.len() == i`.
    ///
    /// # Errors
    /// `Error::OutOfRange` if `i > self.len()`.
    pub fn split_at(self, i: usize) -> Result<(Self, Self)> {
        if i > self.len() {
            return Err(Error::OutOfRange { index: i, len: self.len() });
        }
        let (l, r) = Node::split_at(&self.root, i);
        Ok((Rope { root: l }, Rope { root: r }))
    }

    /// Concatenate this rope with `other`, consuming both and returning a
    /// new, possibly rebalanced, rope.
    ///
    /// # Examples
    /// ```
    /// use an_rope::Rope;
    /// let a = Rope::from_vec(vec![1, 2]);
    /// let b = Rope::from_vec(vec![3, 4]);
    /// assert_eq!(a.concat(b).to_vec(), vec![1, 2, 3, 4]);
    /// ```
    pub fn concat(self, other: Self) -> Self {
        Rope { root: Node::from_pair(self.root, other.root) }
    }

    /// A rope containing the elements in `[start, start+len)`.
    ///
    /// Shares the underlying buffers with `self`; no elements are copied.
    ///
    /// # Errors
    /// `Error::OutOfRange` if the requested range exceeds `self.len()`.
    pub fn slice(&self, start: usize, len: usize) -> Result<Self> {
        let end =
            start.checked_add(len).ok_or(Error::OutOfRange { index: start, len: self.len() })?;
        if end > self.len() {
            return Err(Error::OutOfRange { index: end, len: self.len() });
        }
        let (_, tail) = Node::split_at(&self.root, start);
        let (head, _) = Node::split_at(&tail, len);
        Ok(Rope { root: head })
    }

    /// Insert `item` at index `i`.
    ///
    /// # Errors
    /// `Error::OutOfRange` if `i > self.len()`.
    pub fn insert(&self, i: usize, item: E) -> Result<Self> {
        self.insert_rope(i, Rope::from_vec(vec![item]))
    }

    /// Insert `other` at index `i`.
    ///
    /// # Errors
    /// `Error::OutOfRange` if `i > self.len()`.
    pub fn insert_rope(&self, i: usize, other: Self) -> Result<Self> {
        let len = self.len();
        if i > len {
            return Err(Error::OutOfRange { index: i, len });
        }
        if other.is_empty() {
            return Ok(self.clone());
        }
        if i == 0 {
            return Ok(other.concat(self.clone()));
        }
        if i == len {
            return Ok(self.clone().concat(other));
        }
        let (left, right) = Node::split_at(&self.root, i);
        let joined = Node::from_pair(left, other.root);
        Ok(Rope { root: Node::from_pair(joined, right) })
    }

    /// Remove the elements in `[start, start+len)`, returning the
    /// resulting rope.
    ///
    /// # Errors
    /// `Error::OutOfRange` if the requested range exceeds `self.len()`.
    pub fn remove(&self, start: usize, len: usize) -> Result<Self> {
        let end =
            start.checked_add(len).ok_or(Error::OutOfRange { index: start, len: self.len() })?;
        if end > self.len() {
            return Err(Error::OutOfRange { index: end, len: self.len() });
        }
        let (left, rest) = Node::split_at(&self.root, start);
        let (_, right) = Node::split_at(&rest, len);
        Ok(Rope { root: Node::from_pair(left, right) })
    }
}

impl<E: PartialEq> Rope<E> {
    fn eq_contents(&self, other: &Self) -> bool {
        Node::eq_contents(&self.root, &other.root)
    }
}

impl<E: PartialEq> PartialEq for Rope<E> {
    fn eq(&self, other: &Self) -> bool {
        self.eq_contents(other)
    }
}
impl<E: Eq> Eq for Rope<E> {}

impl<E: Hash> Hash for Rope<E> {
    /// Hash this rope from `(first_element, length)`, so two ropes that
    /// hold the same elements hash identically regardless of how their
    /// trees happen to be shaped.
    fn hash<H: Hasher>(&self, state: &mut H) {
        Node::hash_contents(&self.root, state);
    }
}

impl<E: fmt::Debug> fmt::Debug for Rope<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rope{:?}", self.root)
    }
}

impl<E: Clone + Ord> Rope<E> {
    /// Binary search for `item`.
    ///
    /// Returns `Ok(index)` of a matching element, or `Err(index)` with the
    /// insertion point that would keep the sequence sorted.
    pub fn binary_search(&self, item: &E) -> std::result::Result<usize, usize> {
        internals::binary_search(&self.root, |e| e.cmp(item))
    }

    /// Insert `item` into a sorted rope, keeping it sorted.
    ///
    /// # Examples
    /// ```
    /// use an_rope::Rope;
    /// let r = Rope::from_vec(vec![0, 1, 3, 4, 5]);
    /// let r = r.insert_sorted(2);
    /// assert_eq!(r.to_vec(), vec![0, 1, 2, 3, 4, 5]);
    /// ```
    pub fn insert_sorted(&self, item: E) -> Self {
        let index = match self.binary_search(&item) {
            Ok(i) | Err(i) => i,
        };
        self.insert(index, item).expect("binary_search index is always <= len")
    }

    /// Binary search with an explicit comparator, for sequences ordered by
    /// something other than `Ord::cmp`.
    pub fn binary_search_by<F>(&self, compare: F) -> std::result::Result<usize, usize>
    where
        F: Fn(&E) -> Ordering,
    {
        internals::binary_search(&self.root, compare)
    }
}

impl<E: Clone> ops::Add for Rope<E> {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        self.concat(other)
    }
}

impl<E: Clone> FromIterator<E> for Rope<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Rope::from_vec(iter.into_iter().collect())
    }
}

impl<E: Clone> Extend<E> for Rope<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        let added = Rope::from_vec(iter.into_iter().collect());
        *self = self.clone().concat(added);
    }
}

impl<E: Clone> From<Vec<E>> for Rope<E> {
    fn from(v: Vec<E>) -> Self {
        Rope::from_vec(v)
    }
}

// -- the `char` specialization: a drop-in text rope ----------------------

impl From<&str> for Rope<char> {
    fn from(s: &str) -> Self {
        Rope::from_vec(s.chars().collect())
    }
}

impl From<String> for Rope<char> {
    fn from(s: String) -> Self {
        Rope::from_vec(s.chars().collect())
    }
}

impl From<&Rope<char>> for String {
    fn from(r: &Rope<char>) -> Self {
        r.iter().collect()
    }
}

impl fmt::Display for Rope<char> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.iter() {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl PartialEq<str> for Rope<char> {
    fn eq(&self, other: &str) -> bool {
        self.iter().copied().eq(other.chars())
    }
}

impl PartialEq<&str> for Rope<char> {
    fn eq(&self, other: &&str) -> bool {
        self.iter().copied().eq(other.chars())
    }
}

impl Rope<char> {
    /// An iterator over the extended grapheme clusters of this rope, per
    /// [UAX #29](http://www.unicode.org/reports/tr29/#Grapheme_Cluster_Boundaries).
    pub fn graphemes(&self) -> impl Iterator<Item = String> + '_ {
        use unicode_segmentation::UnicodeSegmentation;
        let s: String = self.iter().collect();
        // UnicodeSegmentation needs a contiguous &str; ropes used for text
        // are bounded by MAX_LEAF-sized chunks in practice, so this is a
        // bounded allocation per call, not a hidden O(n) per grapheme.
        s.graphemes(true).map(String::from).collect::<Vec<_>>().into_iter()
    }
}

#[cfg(test)]
mod tests;
