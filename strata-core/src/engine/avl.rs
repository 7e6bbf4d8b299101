//! Height-balanced (AVL) binary search tree with rank support
//!
//! Nodes live in an arena and refer to each other through [`NodeId`] handles,
//! so parent links never form reference cycles and rotations only rewrite
//! handles. Every node tracks its height and its weight (subtree node count),
//! which makes `find_by_rank` logarithmic.
//!
//! Complexity:
//! - insert / remove / find / lower_bound / upper_bound: O(log n)
//! - successor / predecessor: O(log n), amortized O(1) during a scan
//! - find_by_rank: O(log n)
//! - len / height: O(1)
//!
//! A [`NodeId`] stays valid until the next removal from the tree.

use super::order::{Natural, Order};
use std::fmt;

/// Handle to a node in an [`AvlTree`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Metadata hook invoked every time a node's derived fields are recomputed
///
/// `meta` is the node's own metadata; `left` and `right` are the already
/// up-to-date metadata of its children. Hooks must be pure functions of these
/// inputs so that aggregates (min, max, sum, ...) stay correct across
/// rotations.
pub trait Hook<T, M> {
    fn recompute(&self, value: &T, meta: &mut M, left: Option<&M>, right: Option<&M>);
}

struct Node<T, M> {
    value: T,
    meta: M,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    height: usize,
    weight: usize,
}

/// AVL tree ordered by a strict less-than [`Order`]
///
/// Values that compare equal are kept as distinct nodes; a new duplicate is
/// placed after the existing ones in in-order position.
pub struct AvlTree<T, O = Natural<T>, M = ()> {
    nodes: Vec<Node<T, M>>,
    root: Option<NodeId>,
    order: O,
    hooks: Vec<Box<dyn Hook<T, M> + Send + Sync>>,
}

impl<T: Ord> AvlTree<T, Natural<T>, ()> {
    /// Create an empty tree using the natural ordering of `T`
    pub fn new() -> Self {
        Self::with_order(Natural::new())
    }
}

impl<T: Ord> Default for AvlTree<T, Natural<T>, ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, O, M> fmt::Debug for AvlTree<T, O, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlTree")
            .field("len", &self.len())
            .field("height", &self.height())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl<T, O, M> AvlTree<T, O, M> {
    /// Number of values in the tree
    pub fn len(&self) -> usize {
        self.weight_of(self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree (0 when empty, 1 for a single node)
    pub fn height(&self) -> usize {
        self.height_of(self.root)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Value stored at `id`
    pub fn value(&self, id: NodeId) -> &T {
        &self.nodes[id.0].value
    }

    /// Hook-maintained metadata stored at `id`
    pub fn metadata(&self, id: NodeId) -> &M {
        &self.nodes[id.0].meta
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].left
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].right
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Height of the subtree rooted at `id`
    pub fn node_height(&self, id: NodeId) -> usize {
        self.nodes[id.0].height
    }

    /// Number of nodes in the subtree rooted at `id`
    pub fn node_weight(&self, id: NodeId) -> usize {
        self.nodes[id.0].weight
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// In-order successor of `id`, `None` for the last node
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.nodes[id.0].right {
            return Some(self.leftmost(right));
        }

        let mut cur = id;
        while let Some(parent) = self.nodes[cur.0].parent {
            if self.nodes[parent.0].right == Some(cur) {
                cur = parent;
            } else {
                return Some(parent);
            }
        }
        None
    }

    /// In-order predecessor of `id`, `None` for the first node
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.nodes[id.0].left {
            return Some(self.rightmost(left));
        }

        let mut cur = id;
        while let Some(parent) = self.nodes[cur.0].parent {
            if self.nodes[parent.0].left == Some(cur) {
                cur = parent;
            } else {
                return Some(parent);
            }
        }
        None
    }

    /// Node holding the smallest value
    pub fn first(&self) -> Option<NodeId> {
        self.root.map(|root| self.leftmost(root))
    }

    /// Node holding the largest value
    pub fn last(&self) -> Option<NodeId> {
        self.root.map(|root| self.rightmost(root))
    }

    pub fn min(&self) -> Option<&T> {
        self.first().map(|id| self.value(id))
    }

    pub fn max(&self) -> Option<&T> {
        self.last().map(|id| self.value(id))
    }

    /// Value at 1-based `rank` in tree order
    pub fn find_by_rank(&self, rank: usize) -> Option<&T> {
        if rank == 0 || rank > self.len() {
            return None;
        }

        let mut cur = self.root?;
        let mut rank = rank;
        loop {
            let node = &self.nodes[cur.0];
            let left_weight = self.weight_of(node.left);
            if rank <= left_weight {
                cur = node.left?;
            } else if rank == left_weight + 1 {
                return Some(&node.value);
            } else {
                rank -= left_weight + 1;
                cur = node.right?;
            }
        }
    }

    /// Visit every value in order
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&T),
    {
        for value in self.iter() {
            visit(value);
        }
    }

    /// In-order iterator over the values
    pub fn iter(&self) -> Iter<'_, T, O, M> {
        Iter {
            tree: self,
            next: self.first(),
        }
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id.0].left {
            id = left;
        }
        id
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.nodes[id.0].right {
            id = right;
        }
        id
    }

    fn height_of(&self, id: Option<NodeId>) -> usize {
        id.map_or(0, |n| self.nodes[n.0].height)
    }

    fn weight_of(&self, id: Option<NodeId>) -> usize {
        id.map_or(0, |n| self.nodes[n.0].weight)
    }

    fn balance_factor(&self, id: NodeId) -> isize {
        let node = &self.nodes[id.0];
        self.height_of(node.left) as isize - self.height_of(node.right) as isize
    }

    /// Point `parent`'s link to `old` (or the root) at `new`
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let node = &mut self.nodes[p.0];
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    node.right = new;
                }
            }
        }
    }
}

impl<T, O, M: Default> AvlTree<T, O, M> {
    /// Register a metadata hook
    pub fn with_hook<H>(mut self, hook: H) -> Self
    where
        H: Hook<T, M> + Send + Sync + 'static,
    {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Remove the node at `id` and return its value
    ///
    /// A node with two children takes over its in-order successor's value and
    /// the successor node is the one physically unlinked.
    pub fn remove_node(&mut self, id: NodeId) -> T {
        let (left, right) = {
            let node = &self.nodes[id.0];
            (node.left, node.right)
        };
        let victim = match (left, right) {
            (Some(_), Some(r)) => self.leftmost(r),
            _ => id,
        };

        let child = self.nodes[victim.0].left.or(self.nodes[victim.0].right);
        let parent = self.nodes[victim.0].parent;
        self.replace_child(parent, victim, child);
        if let Some(c) = child {
            self.nodes[c.0].parent = parent;
        }

        if victim != id {
            self.swap_payload(id, victim);
        }

        self.rebalance_to_root(parent);
        self.release(victim)
    }

    /// Recompute height, weight and hook metadata of `id` from its children
    fn update_metadata(&mut self, id: NodeId) {
        let (left, right) = {
            let node = &self.nodes[id.0];
            (node.left, node.right)
        };
        let height = self.height_of(left).max(self.height_of(right)) + 1;
        let weight = self.weight_of(left) + self.weight_of(right) + 1;
        {
            let node = &mut self.nodes[id.0];
            node.height = height;
            node.weight = weight;
        }

        if self.hooks.is_empty() {
            return;
        }

        // Moved out so the children's metadata can be borrowed alongside it.
        let mut meta = std::mem::take(&mut self.nodes[id.0].meta);
        {
            let value = &self.nodes[id.0].value;
            let left_meta = left.map(|l| &self.nodes[l.0].meta);
            let right_meta = right.map(|r| &self.nodes[r.0].meta);
            for hook in &self.hooks {
                hook.recompute(value, &mut meta, left_meta, right_meta);
            }
        }
        self.nodes[id.0].meta = meta;
    }

    fn rotate_left(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x.0].right else {
            return;
        };
        let parent = self.nodes[x.0].parent;
        self.replace_child(parent, x, Some(y));
        self.nodes[y.0].parent = parent;

        let inner = self.nodes[y.0].left;
        self.nodes[x.0].right = inner;
        if let Some(b) = inner {
            self.nodes[b.0].parent = Some(x);
        }

        self.nodes[y.0].left = Some(x);
        self.nodes[x.0].parent = Some(y);

        self.update_metadata(x);
        self.update_metadata(y);
    }

    fn rotate_right(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x.0].left else {
            return;
        };
        let parent = self.nodes[x.0].parent;
        self.replace_child(parent, x, Some(y));
        self.nodes[y.0].parent = parent;

        let inner = self.nodes[y.0].right;
        self.nodes[x.0].left = inner;
        if let Some(b) = inner {
            self.nodes[b.0].parent = Some(x);
        }

        self.nodes[y.0].right = Some(x);
        self.nodes[x.0].parent = Some(y);

        self.update_metadata(x);
        self.update_metadata(y);
    }

    fn rebalance(&mut self, id: NodeId) {
        self.update_metadata(id);
        let bf = self.balance_factor(id);

        if bf > 1 {
            if let Some(left) = self.nodes[id.0].left {
                if self.balance_factor(left) < 0 {
                    self.rotate_left(left);
                }
            }
            self.rotate_right(id);
        } else if bf < -1 {
            if let Some(right) = self.nodes[id.0].right {
                if self.balance_factor(right) > 0 {
                    self.rotate_right(right);
                }
            }
            self.rotate_left(id);
        }
    }

    fn rebalance_to_root(&mut self, start: Option<NodeId>) {
        let mut cur = start;
        while let Some(id) = cur {
            self.rebalance(id);
            cur = self.nodes[id.0].parent;
        }
    }

    /// Swap value and metadata between two distinct nodes
    fn swap_payload(&mut self, a: NodeId, b: NodeId) {
        let (lo, hi) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (head, tail) = self.nodes.split_at_mut(hi);
        let x = &mut head[lo];
        let y = &mut tail[0];
        std::mem::swap(&mut x.value, &mut y.value);
        std::mem::swap(&mut x.meta, &mut y.meta);
    }

    /// Free the arena slot of an already unlinked node
    ///
    /// The last arena node moves into the freed slot, so every link pointing
    /// at it is rewritten first.
    fn release(&mut self, victim: NodeId) -> T {
        let last = NodeId(self.nodes.len() - 1);
        if victim != last {
            let (parent, left, right) = {
                let node = &self.nodes[last.0];
                (node.parent, node.left, node.right)
            };
            self.replace_child(parent, last, Some(victim));
            for child in [left, right].into_iter().flatten() {
                self.nodes[child.0].parent = Some(victim);
            }
        }
        self.nodes.swap_remove(victim.0).value
    }
}

impl<T, O: Order<T>, M: Default> AvlTree<T, O, M> {
    /// Create an empty tree ordered by `order`
    pub fn with_order(order: O) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            order,
            hooks: Vec::new(),
        }
    }

    pub fn order(&self) -> &O {
        &self.order
    }

    /// Insert `value` with default metadata
    pub fn insert(&mut self, value: T) -> NodeId {
        self.insert_with_metadata(value, M::default())
    }

    /// Insert `value` carrying caller-supplied metadata
    pub fn insert_with_metadata(&mut self, value: T, meta: M) -> NodeId {
        let mut parent = None;
        let mut go_left = false;
        let mut cur = self.root;
        while let Some(c) = cur {
            parent = Some(c);
            let node = &self.nodes[c.0];
            go_left = self.order.less(&value, &node.value);
            cur = if go_left { node.left } else { node.right };
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            value,
            meta,
            parent,
            left: None,
            right: None,
            height: 1,
            weight: 1,
        });

        match parent {
            None => self.root = Some(id),
            Some(p) if go_left => self.nodes[p.0].left = Some(id),
            Some(p) => self.nodes[p.0].right = Some(id),
        }

        self.rebalance_to_root(Some(id));
        // Rotations never move arena slots, so `id` still addresses the new node.
        id
    }

    /// First node equal to `value`
    pub fn find(&self, value: &T) -> Option<NodeId> {
        let id = self.lower_bound(value)?;
        if self.order.equal(&self.nodes[id.0].value, value) {
            Some(id)
        } else {
            None
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    /// First node whose value is not less than `value`
    pub fn lower_bound(&self, value: &T) -> Option<NodeId> {
        let mut found = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.nodes[id.0];
            if !self.order.less(&node.value, value) {
                found = Some(id);
                cur = node.left;
            } else {
                cur = node.right;
            }
        }
        found
    }

    /// First node whose value is strictly greater than `value`
    pub fn upper_bound(&self, value: &T) -> Option<NodeId> {
        let mut found = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.nodes[id.0];
            if self.order.less(value, &node.value) {
                found = Some(id);
                cur = node.left;
            } else {
                cur = node.right;
            }
        }
        found
    }

    /// Remove the first node equal to `value`
    pub fn remove(&mut self, value: &T) -> bool {
        self.remove_if(value, |_| true)
    }

    /// Remove the first node equal to `value` that satisfies `predicate`
    ///
    /// Equal nodes are tried in order; returns false when none matches.
    pub fn remove_if<P>(&mut self, value: &T, mut predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        let mut cur = self.find(value);
        while let Some(id) = cur {
            let candidate = &self.nodes[id.0].value;
            if !self.order.equal(candidate, value) {
                return false;
            }
            if predicate(candidate) {
                self.remove_node(id);
                return true;
            }
            cur = self.successor(id);
        }
        false
    }
}

/// In-order iterator returned by [`AvlTree::iter`]
pub struct Iter<'a, T, O, M> {
    tree: &'a AvlTree<T, O, M>,
    next: Option<NodeId>,
}

impl<'a, T, O, M> Iterator for Iter<'a, T, O, M> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.successor(id);
        Some(self.tree.value(id))
    }
}

impl<'a, T, O, M> IntoIterator for &'a AvlTree<T, O, M> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, O, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::order::LessFn;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    /// Walk the whole tree checking links, weights, heights and balance
    fn check_invariants<T: std::fmt::Debug, O: Order<T>, M: Default>(tree: &AvlTree<T, O, M>) {
        fn walk<T: std::fmt::Debug, O: Order<T>, M: Default>(
            tree: &AvlTree<T, O, M>,
            id: Option<NodeId>,
            parent: Option<NodeId>,
        ) -> (usize, usize) {
            let Some(id) = id else {
                return (0, 0);
            };
            assert_eq!(tree.parent(id), parent, "broken parent link");
            let (lh, lw) = walk(tree, tree.left(id), Some(id));
            let (rh, rw) = walk(tree, tree.right(id), Some(id));
            assert!(lh.abs_diff(rh) <= 1, "unbalanced at {:?}", tree.value(id));
            assert_eq!(tree.node_height(id), lh.max(rh) + 1);
            assert_eq!(tree.node_weight(id), lw + rw + 1);
            (lh.max(rh) + 1, lw + rw + 1)
        }

        let (_, weight) = walk(tree, tree.root(), None);
        assert_eq!(weight, tree.len());

        let values: Vec<&T> = tree.iter().collect();
        for pair in values.windows(2) {
            assert!(!tree.order().less(pair[1], pair[0]), "out of order: {:?}", pair);
        }
    }

    #[derive(Default)]
    struct Sum(i64);

    struct SumHook;

    impl Hook<i64, Sum> for SumHook {
        fn recompute(&self, value: &i64, meta: &mut Sum, left: Option<&Sum>, right: Option<&Sum>) {
            meta.0 = *value + left.map_or(0, |m| m.0) + right.map_or(0, |m| m.0);
        }
    }

    #[test]
    fn test_empty_tree() {
        let tree: AvlTree<i32> = AvlTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.find_by_rank(1), None);
        assert_eq!(tree.min(), None);
        assert!(tree.find(&3).is_none());
    }

    #[test]
    fn test_insert_sequential_stays_balanced() {
        let mut tree = AvlTree::new();
        for i in 0..1024 {
            tree.insert(i);
        }
        check_invariants(&tree);
        assert_eq!(tree.len(), 1024);
        assert!(tree.height() <= 11);
        assert_eq!(tree.min(), Some(&0));
        assert_eq!(tree.max(), Some(&1023));
    }

    #[test]
    fn test_find_and_bounds() {
        let mut tree = AvlTree::new();
        for v in [10, 20, 30, 40, 50] {
            tree.insert(v);
        }

        assert_eq!(tree.find(&30).map(|id| *tree.value(id)), Some(30));
        assert!(tree.find(&35).is_none());

        assert_eq!(tree.lower_bound(&30).map(|id| *tree.value(id)), Some(30));
        assert_eq!(tree.lower_bound(&31).map(|id| *tree.value(id)), Some(40));
        assert_eq!(tree.upper_bound(&30).map(|id| *tree.value(id)), Some(40));
        assert!(tree.lower_bound(&51).is_none());
        assert!(tree.upper_bound(&50).is_none());
        assert_eq!(tree.lower_bound(&0).map(|id| *tree.value(id)), Some(10));
    }

    #[test]
    fn test_successor_and_predecessor_boundaries() {
        let mut tree = AvlTree::new();
        for v in [5, 3, 8, 1, 4] {
            tree.insert(v);
        }

        let first = tree.first().unwrap();
        assert_eq!(*tree.value(first), 1);
        assert!(tree.predecessor(first).is_none());

        let mut walked = vec![];
        let mut cur = Some(first);
        while let Some(id) = cur {
            walked.push(*tree.value(id));
            cur = tree.successor(id);
        }
        assert_eq!(walked, vec![1, 3, 4, 5, 8]);

        let last = tree.last().unwrap();
        assert!(tree.successor(last).is_none());
        assert_eq!(tree.predecessor(last).map(|id| *tree.value(id)), Some(5));
    }

    #[test]
    fn test_find_by_rank_matches_iteration() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut tree = AvlTree::new();
        for _ in 0..300 {
            tree.insert(rng.gen_range(0..100));
        }

        let in_order: Vec<i32> = tree.iter().copied().collect();
        let by_rank: Vec<i32> = (1..=tree.len()).filter_map(|r| tree.find_by_rank(r).copied()).collect();
        assert_eq!(in_order, by_rank);
        assert_eq!(tree.find_by_rank(0), None);
        assert_eq!(tree.find_by_rank(tree.len() + 1), None);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut tree = AvlTree::new();
        for v in [2, 1, 2, 2, 3] {
            tree.insert(v);
        }
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 2, 2, 2, 3]);

        assert!(tree.remove(&2));
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 2, 2, 3]);
        check_invariants(&tree);
    }

    #[test]
    fn test_remove_with_predicate_scans_equal_values() {
        // Order by the first component only so entries tie on it.
        let order = LessFn::new(|a: &(i32, char), b: &(i32, char)| a.0 < b.0);
        let mut tree: AvlTree<(i32, char), LessFn<(i32, char)>> = AvlTree::with_order(order);
        tree.insert((1, 'a'));
        tree.insert((1, 'b'));
        tree.insert((1, 'c'));
        tree.insert((2, 'd'));

        assert!(tree.remove_if(&(1, ' '), |v| v.1 == 'c'));
        assert!(!tree.remove_if(&(1, ' '), |v| v.1 == 'd'));
        assert!(!tree.remove_if(&(3, ' '), |_| true));

        let left: Vec<char> = tree.iter().map(|v| v.1).collect();
        assert_eq!(left, vec!['a', 'b', 'd']);
        check_invariants(&tree);
    }

    #[test]
    fn test_remove_two_child_node() {
        let mut tree = AvlTree::new();
        for v in [50, 30, 70, 20, 40, 60, 80] {
            tree.insert(v);
        }
        let root = tree.root().unwrap();
        assert_eq!(*tree.value(root), 50);

        assert_eq!(tree.remove_node(root), 50);
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![20, 30, 40, 60, 70, 80]);
        check_invariants(&tree);
    }

    #[test]
    fn test_random_insert_remove_keeps_invariants() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut values: Vec<u32> = (0..500).collect();
        values.shuffle(&mut rng);

        let mut tree = AvlTree::new();
        for v in &values {
            tree.insert(*v);
        }
        check_invariants(&tree);

        values.shuffle(&mut rng);
        for (i, v) in values.iter().take(350).enumerate() {
            assert!(tree.remove(v));
            if i % 25 == 0 {
                check_invariants(&tree);
            }
        }
        check_invariants(&tree);
        assert_eq!(tree.len(), 150);

        let mut expected: Vec<u32> = values[350..].to_vec();
        expected.sort_unstable();
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_remove_everything_then_reuse() {
        let mut tree = AvlTree::new();
        for v in 0..64 {
            tree.insert(v);
        }
        for v in 0..64 {
            assert!(tree.remove(&v));
        }
        assert!(tree.is_empty());
        assert!(!tree.remove(&1));

        tree.insert(9);
        assert_eq!(tree.len(), 1);
        check_invariants(&tree);
    }

    #[test]
    fn test_sum_hook_tracks_rotations_and_removals() {
        let mut tree: AvlTree<i64, _, Sum> = AvlTree::with_order(Natural::new()).with_hook(SumHook);
        for v in 1..=100 {
            tree.insert(v);
        }
        let root = tree.root().unwrap();
        assert_eq!(tree.metadata(root).0, 5050);

        for v in (2..=100).step_by(2) {
            tree.remove(&v);
        }
        let root = tree.root().unwrap();
        assert_eq!(tree.metadata(root).0, 2500);
        check_invariants(&tree);
    }

    #[test]
    fn test_clear() {
        let mut tree = AvlTree::new();
        for v in 0..10 {
            tree.insert(v);
        }
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.iter().count(), 0);
    }
}
