use std::sync::Arc;

use super::{Link, Node};

fn leaf(s: &str) -> Link<char> {
    Node::from_buffer(Arc::from(s.chars().collect::<Vec<_>>()))
}

fn branch(left: Link<char>, right: Link<char>) -> Link<char> {
    Node::from_pair(left, right)
}

#[test]
fn leaf_from_buffer_is_a_leaf() {
    let n = leaf("asdf");
    assert_eq!(n.len(), 4);
    assert_eq!(n.depth(), 0);
}

#[test]
fn from_buffer_over_max_leaf_splits() {
    let s: Vec<char> = (0..(MAX_LEAF * 3)).map(|i| (b'a' + (i % 26) as u8) as char).collect();
    let n = Node::from_buffer(Arc::from(s.clone()));
    assert_eq!(n.len(), s.len());
    assert!(n.depth() > 0, "a buffer three leaves wide should not stay a single leaf");
    assert_eq!(n.to_vec(), s);
}

use super::MAX_LEAF;

#[test]
fn from_pair_with_empty_operand_returns_other_side_unchanged() {
    let a = leaf("hello");
    let empty = Node::empty();
    assert_eq!(Node::from_pair(a.clone(), empty.clone()).len(), a.len());
    assert_eq!(Node::from_pair(empty, a.clone()).len(), a.len());
    // No new branch node should be introduced either way.
    assert_eq!(Node::from_pair(a.clone(), Node::empty()).depth(), a.depth());
}

#[test]
fn branch_weight_is_left_length() {
    let b = branch(leaf("abc"), leaf("de"));
    assert_eq!(b.len(), 5);
    assert_eq!(b.weight(), 3);
    assert_eq!(b.depth(), 1);
}

#[test]
fn get_walks_into_correct_child() {
    let b = branch(leaf("abc"), leaf("de"));
    assert_eq!(b.get(0), Some(&'a'));
    assert_eq!(b.get(2), Some(&'c'));
    assert_eq!(b.get(3), Some(&'d'));
    assert_eq!(b.get(4), Some(&'e'));
    assert_eq!(b.get(5), None);
}

#[test]
fn split_at_leaf_boundary_yields_two_leaves() {
    let n = leaf("abcdef");
    let (l, r) = Node::split_at(&n, 3);
    assert_eq!(l.to_vec(), vec!['a', 'b', 'c']);
    assert_eq!(r.to_vec(), vec!['d', 'e', 'f']);
}

#[test]
fn split_at_zero_and_len_are_degenerate() {
    let n = leaf("abcdef");
    let (l, r) = Node::split_at(&n, 0);
    assert!(l.is_empty());
    assert_eq!(r.to_vec(), n.to_vec());
    let (l, r) = Node::split_at(&n, n.len());
    assert_eq!(l.to_vec(), n.to_vec());
    assert!(r.is_empty());
}

#[test]
fn split_at_descends_through_branches() {
    let b = branch(leaf("asdf"), leaf("qwer"));
    let (left, right) = Node::split_at(&b, 0);
    assert_eq!(left.to_vec(), Vec::<char>::new());
    assert_eq!(right.to_vec(), "asdfqwer".chars().collect::<Vec<_>>());

    let deep = branch(branch(leaf("asdf"), leaf("qwer")), leaf("yxcv"));
    let (left, right) = Node::split_at(&deep, 4);
    assert_eq!(left.to_vec(), "asdf".chars().collect::<Vec<_>>());
    assert_eq!(right.to_vec(), "qweryxcv".chars().collect::<Vec<_>>());
}

#[test]
fn split_then_concat_round_trips() {
    let n = leaf("the quick brown fox");
    for i in 0..=n.len() {
        let (l, r) = Node::split_at(&n, i);
        let rejoined = Node::from_pair(l, r);
        assert_eq!(rejoined.to_vec(), n.to_vec());
    }
}

#[test]
fn balance_keeps_depth_at_or_under_the_cap() {
    // Build a badly unbalanced tree by repeatedly concatenating a single
    // character onto the left, bypassing `from_pair`'s rebalancing so we
    // can then check `balanced` fixes it.
    let mut unbalanced: Link<char> = leaf("x");
    for _ in 0..200 {
        unbalanced = super::node::Branch::new(leaf("y"), unbalanced);
    }
    assert!(unbalanced.depth() as usize > super::MAX_DEPTH as usize);
    let balanced = Node::balanced(unbalanced.clone());
    assert!(balanced.depth() <= super::MAX_DEPTH);
    assert_eq!(balanced.to_vec(), unbalanced.to_vec());
}

#[test]
fn iter_visits_elements_left_to_right() {
    let deep = branch(branch(leaf("a"), leaf("b")), branch(leaf("c"), leaf("d")));
    let collected: Vec<char> = Node::iter(&deep).copied().collect();
    assert_eq!(collected, vec!['a', 'b', 'c', 'd']);
}

#[test]
fn eq_contents_ignores_tree_shape() {
    let a = leaf("test");
    let b = branch(leaf("te"), leaf("st"));
    assert!(Node::eq_contents(&a, &b));
}

#[test]
fn hash_contents_matches_for_differently_shaped_equal_ropes() {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hasher;

    fn hash_of(n: &Link<char>) -> u64 {
        let mut h = DefaultHasher::new();
        Node::hash_contents(n, &mut h);
        h.finish()
    }

    let a = leaf("test");
    let b = branch(leaf("te"), leaf("st"));
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn empty_node_has_no_first_element_but_hashes_consistently() {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hasher;

    let a = Node::<char>::empty();
    let b = Node::<char>::empty();
    let mut ha = DefaultHasher::new();
    let mut hb = DefaultHasher::new();
    Node::hash_contents(&a, &mut ha);
    Node::hash_contents(&b, &mut hb);
    assert_eq!(ha.finish(), hb.finish());
}

#[test]
fn binary_search_finds_exact_match_or_insertion_point() {
    let n = Node::from_buffer(Arc::from(vec![0, 1, 3, 4, 5]));
    assert_eq!(super::binary_search(&n, |e: &i32| e.cmp(&3)), Ok(2));
    assert_eq!(super::binary_search(&n, |e: &i32| e.cmp(&2)), Err(2));
    assert_eq!(super::binary_search(&n, |e: &i32| e.cmp(&-1)), Err(0));
    assert_eq!(super::binary_search(&n, |e: &i32| e.cmp(&10)), Err(5));
}

mod search {
    use super::super::search;
    use super::{branch, leaf};

    #[test]
    fn index_of_finds_match_spanning_leaf_boundary() {
        let b = branch(leaf("asd"), leaf("fqwer"));
        let needle: Vec<char> = "dfq".chars().collect();
        assert_eq!(search::index_of(&b, &needle, 0), Some(2));
    }

    #[test]
    fn index_of_respects_from_offset() {
        let n = leaf("abcabcabc");
        let needle: Vec<char> = "abc".chars().collect();
        assert_eq!(search::index_of(&n, &needle, 0), Some(0));
        assert_eq!(search::index_of(&n, &needle, 1), Some(3));
        assert_eq!(search::index_of(&n, &needle, 7), None);
    }

    #[test]
    fn last_index_of_finds_rightmost_occurrence() {
        let n = leaf("abcabcabc");
        let needle: Vec<char> = "abc".chars().collect();
        assert_eq!(search::last_index_of(&n, &needle), Some(6));
    }

    #[test]
    fn starts_with_and_ends_with() {
        let n = leaf("hello world");
        assert!(search::starts_with(&n, &"hello".chars().collect::<Vec<_>>()));
        assert!(!search::starts_with(&n, &"world".chars().collect::<Vec<_>>()));
        assert!(search::ends_with(&n, &"world".chars().collect::<Vec<_>>()));
        assert!(!search::ends_with(&n, &"hello".chars().collect::<Vec<_>>()));
    }

    #[test]
    fn common_prefix_and_suffix_length() {
        let a = leaf("international");
        let b = leaf("internet");
        assert_eq!(search::common_prefix_len(&a, &b), 6);

        let a = leaf("reboot");
        let b = leaf("root");
        assert_eq!(search::common_suffix_len(&a, &b), 3);
    }

    #[test]
    fn common_overlap_len_truncates_to_shorter_side() {
        assert_eq!(search::common_overlap_len(&['a', 'b', 'c'], &['b', 'c', 'd', 'e']), 2);
        assert_eq!(search::common_overlap_len(&['a', 'b', 'c'], &['x', 'y', 'z']), 0);
        assert_eq!(search::common_overlap_len(&[], &['a']), 0);
    }
}
