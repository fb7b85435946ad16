//! `Leaf` and `Branch`, the two concrete node shapes a [`super::Node`] can
//! take.

use std::sync::Arc;

use super::{Link, Node};

/// A leaf node: a view into a shared, immutable buffer of elements.
///
/// Slicing a rope never copies a leaf's backing buffer; it only narrows
/// `start..end`.
pub struct Leaf<E> {
    buf: Arc<[E]>,
    start: usize,
    end: usize,
}

impl<E> Leaf<E> {
    pub fn empty() -> Self {
        Leaf { buf: Arc::from(Vec::new()), start: 0, end: 0 }
    }

    pub fn new(buf: Arc<[E]>, start: usize, end: usize) -> Self {
        debug_assert!(start <= end && end <= buf.len());
        Leaf { buf, start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn as_slice(&self) -> &[E] {
        &self.buf[self.start..self.end]
    }

    pub fn get(&self, i: usize) -> Option<&E> {
        self.as_slice().get(i)
    }

    pub fn split_at(&self, i: usize) -> (Leaf<E>, Leaf<E>) {
        debug_assert!(i <= self.len());
        let mid = self.start + i;
        (
            Leaf { buf: self.buf.clone(), start: self.start, end: mid },
            Leaf { buf: self.buf.clone(), start: mid, end: self.end },
        )
    }
}

/// An internal node concatenating `left` and `right`.
pub struct Branch<E> {
    pub len: usize,
    pub weight: usize,
    pub depth: u8,
    pub left: Link<E>,
    pub right: Link<E>,
}

impl<E> Branch<E> {
    /// Construct a branch node from two non-empty children.
    ///
    /// Callers (`Node::from_pair`, `Node::split_at`) are responsible for
    /// the "concatenating with an empty operand returns the other operand
    /// unchanged" rule; by the time a `Branch` is built here, both sides
    /// are known to hold at least one element.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(left: Link<E>, right: Link<E>) -> Link<E> {
        let len = left.len() + right.len();
        let weight = left.len();
        let depth = 1 + left.depth().max(right.depth());
        Arc::new(Node::Branch(Branch { len, weight, depth, left, right }))
    }
}
