//! The `Node` tree backing a [`Rope`](../struct.Rope.html).
//!
//! A `Node<E>` is either a `Leaf` holding a contiguous, shared buffer of
//! elements, or a `Branch` concatenating together a left and right subtree.
//! Both variants are reached through [`Link`], a cheap-to-clone handle
//! (`Arc`) so that slicing, splitting, and concatenation can share
//! structure with their inputs instead of copying.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

mod node;
pub(crate) mod search;
mod sorted;
#[cfg(test)]
mod test;

pub use self::search::Match;
pub(crate) use self::search::common_overlap_len;
pub use self::sorted::binary_search;

/// The maximum number of elements a leaf may hold before it is split.
pub const MAX_LEAF: usize = 1024;

/// The maximum depth a balanced rope may have.
///
/// Above this bound the tree is flattened to a single buffer and rebuilt,
/// rather than extending the Fibonacci table further.
pub const MAX_DEPTH: u8 = 46;

/// `FIB[d] + 2` is the minimum length a balanced node of depth `d` must have.
///
/// This is the balancing criterion from "Ropes: an Alternative to Strings"
/// (Boehm, Atkinson, Plass), with the depth capped at `MAX_DEPTH` so the
/// table stays finite.
fn fib_plus_2(depth: u8) -> usize {
    // FIB[0] = 1, FIB[1] = 1, FIB[n] = FIB[n-1] + FIB[n-2], per the paper's
    // convention (not the textbook Fibonacci sequence, which starts 0, 1).
    let (mut a, mut b) = (1usize, 1usize);
    for _ in 0..depth {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    a.saturating_add(2)
}

/// A handle to a [`Node`], cheaply cloneable so subtrees may be shared
/// between the ropes produced by an operation and the ropes it was called
/// on.
pub type Link<E> = Arc<Node<E>>;

/// A node in a rope's backing tree.
pub enum Node<E> {
    Leaf(node::Leaf<E>),
    Branch(node::Branch<E>),
}

impl<E> Node<E> {
    /// The canonical empty node.
    pub fn empty() -> Link<E> {
        Arc::new(Node::Leaf(node::Leaf::empty()))
    }

    /// The number of elements held by the subtree rooted at this node.
    pub fn len(&self) -> usize {
        match *self {
            Node::Leaf(ref leaf) => leaf.len(),
            Node::Branch(ref branch) => branch.len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The weight of a node: the length of its left subtree, or its own
    /// length if it is a leaf.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn weight(&self) -> usize {
        match *self {
            Node::Leaf(ref leaf) => leaf.len(),
            Node::Branch(ref branch) => branch.weight,
        }
    }

    /// The depth (maximum root-to-leaf edge count) of this node.
    pub fn depth(&self) -> u8 {
        match *self {
            Node::Leaf(_) => 0,
            Node::Branch(ref branch) => branch.depth,
        }
    }

    fn is_balanced(&self) -> bool {
        self.depth() <= MAX_DEPTH && self.len() >= fib_plus_2(self.depth())
    }
}

impl<E: Clone> Node<E> {
    /// Build a leaf (or, if `buf` is too large, a balanced subtree of
    /// leaves) from a contiguous buffer of elements.
    pub fn from_buffer(buf: Arc<[E]>) -> Link<E> {
        Self::from_buffer_range(buf.clone(), 0, buf.len())
    }

    fn from_buffer_range(buf: Arc<[E]>, start: usize, end: usize) -> Link<E> {
        if end - start <= MAX_LEAF {
            Arc::new(Node::Leaf(node::Leaf::new(buf, start, end)))
        } else {
            let mid = start + (end - start) / 2;
            let left = Self::from_buffer_range(buf.clone(), start, mid);
            let right = Self::from_buffer_range(buf, mid, end);
            node::Branch::new(left, right)
        }
    }

    /// Concatenate two nodes, compacting away empty operands and
    /// rebalancing the result.
    pub fn from_pair(left: Link<E>, right: Link<E>) -> Link<E> {
        let joined = if left.is_empty() {
            right
        } else if right.is_empty() {
            left
        } else {
            node::Branch::new(left, right)
        };
        Self::balanced(joined)
    }

    /// Rebalance `node` if it has fallen outside the balancing invariant.
    pub fn balanced(node: Link<E>) -> Link<E> {
        if node.is_balanced() {
            node
        } else {
            let mut buf = Vec::with_capacity(node.len());
            node.collect_into(&mut buf);
            Self::from_buffer(Arc::from(buf))
        }
    }

    /// Append every element in this subtree, in order, onto `out`.
    fn collect_into(&self, out: &mut Vec<E>) {
        match *self {
            Node::Leaf(ref leaf) => out.extend_from_slice(leaf.as_slice()),
            Node::Branch(ref branch) => {
                branch.left.collect_into(out);
                branch.right.collect_into(out);
            }
        }
    }

    /// Flatten this subtree into a single contiguous buffer.
    pub fn to_vec(&self) -> Vec<E> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_into(&mut out);
        out
    }

}

impl<E> Node<E> {
    /// The element at index `i`, or `None` if `i` is out of range.
    pub fn get(&self, i: usize) -> Option<&E> {
        match *self {
            Node::Leaf(ref leaf) => leaf.get(i),
            Node::Branch(ref branch) => {
                if i < branch.weight {
                    branch.left.get(i)
                } else {
                    branch.right.get(i - branch.weight)
                }
            }
        }
    }

    /// Split this subtree at index `i`, returning the left and right
    /// halves. `left.len() == i`.
    pub fn split_at(node: &Link<E>, i: usize) -> (Link<E>, Link<E>) {
        debug_assert!(i <= node.len());
        match **node {
            Node::Leaf(ref leaf) => {
                let (l, r) = leaf.split_at(i);
                (Arc::new(Node::Leaf(l)), Arc::new(Node::Leaf(r)))
            }
            Node::Branch(ref branch) => {
                if i < branch.weight {
                    let (ll, lr) = Node::split_at(&branch.left, i);
                    let right = if lr.is_empty() {
                        branch.right.clone()
                    } else {
                        node::Branch::new(lr, branch.right.clone())
                    };
                    (ll, right)
                } else if i == branch.weight {
                    (branch.left.clone(), branch.right.clone())
                } else {
                    let (rl, rr) = Node::split_at(&branch.right, i - branch.weight);
                    let left = if rl.is_empty() {
                        branch.left.clone()
                    } else {
                        node::Branch::new(branch.left.clone(), rl)
                    };
                    (left, rr)
                }
            }
        }
    }

    /// Produce an iterator over `&E` in left-to-right order.
    pub fn iter(node: &Link<E>) -> Iter<'_, E> {
        Iter { stack: vec![IterFrame::Node(node)] }
    }
}

impl<E: PartialEq> Node<E> {
    pub fn eq_contents(a: &Link<E>, b: &Link<E>) -> bool {
        if a.len() != b.len() {
            return false;
        }
        Node::iter(a).eq(Node::iter(b))
    }
}

/// A left-to-right, depth-first iterator over the elements of a `Node<E>`.
pub struct Iter<'a, E> {
    stack: Vec<IterFrame<'a, E>>,
}

enum IterFrame<'a, E> {
    Node(&'a Link<E>),
    Leaf(&'a [E], usize),
}

impl<'a, E> Iterator for Iter<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<&'a E> {
        loop {
            match self.stack.pop()? {
                IterFrame::Leaf(slice, idx) => {
                    if idx < slice.len() {
                        self.stack.push(IterFrame::Leaf(slice, idx + 1));
                        return Some(&slice[idx]);
                    }
                }
                IterFrame::Node(link) => match **link {
                    Node::Leaf(ref leaf) => {
                        self.stack.push(IterFrame::Leaf(leaf.as_slice(), 0));
                    }
                    Node::Branch(ref branch) => {
                        self.stack.push(IterFrame::Node(&branch.right));
                        self.stack.push(IterFrame::Node(&branch.left));
                    }
                },
            }
        }
    }
}

impl<E: Hash> Node<E> {
    /// Hash this node the same way regardless of its internal shape:
    /// combining the first element's hash with the node's length.
    ///
    /// Per spec, two ropes differing only in tree shape must collide to
    /// the same bucket whenever they are equal, so the hash is computed
    /// from content (first element, length), never from the shape itself.
    pub fn hash_contents<H: Hasher>(node: &Link<E>, state: &mut H) {
        if let Some(first) = Node::iter(node).next() {
            first.hash(state);
        }
        node.len().hash(state);
    }
}

impl<E: fmt::Debug> fmt::Debug for Node<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Node::Leaf(ref leaf) => write!(f, "Leaf{:?}", leaf.as_slice()),
            Node::Branch(ref branch) => {
                write!(f, "Branch({:?}, {:?})", branch.left, branch.right)
            }
        }
    }
}
