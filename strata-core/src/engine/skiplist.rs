//! Probabilistic skip list keyed by an [`Order`]
//!
//! Nodes are stored in an arena; forward links exist for every level a node
//! was promoted to and level 0 additionally carries a backward link, so the
//! bottom level is a complete doubly linked ordering of all entries.
//!
//! Equal keys are kept as separate nodes. A newly added duplicate is spliced
//! in front of the existing ones.

use super::order::{Natural, Order};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Highest level a node can be promoted to
pub const MAX_LEVEL: usize = 6;

const PROMOTION_PROBABILITY: f64 = 0.5;

/// Handle to a node in a [`SkipList`] arena
///
/// Valid until the next removal from the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SkipNodeId(usize);

struct SkipNode<K, V> {
    key: K,
    value: V,
    forward: Vec<Option<SkipNodeId>>,
    prev: Option<SkipNodeId>,
}

/// Per-level predecessors; `None` stands for the header
type Update = [Option<SkipNodeId>; MAX_LEVEL + 1];

pub struct SkipList<K, V, O = Natural<K>> {
    nodes: Vec<SkipNode<K, V>>,
    head: [Option<SkipNodeId>; MAX_LEVEL + 1],
    level: usize,
    order: O,
    rng: StdRng,
}

impl<K: Ord, V> SkipList<K, V, Natural<K>> {
    pub fn new() -> Self {
        Self::with_order(Natural::new())
    }
}

impl<K: Ord, V> Default for SkipList<K, V, Natural<K>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, O> fmt::Debug for SkipList<K, V, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkipList")
            .field("len", &self.nodes.len())
            .field("level", &self.level)
            .finish()
    }
}

impl<K, V, O> SkipList<K, V, O> {
    /// Replace the level generator with one seeded from `seed`
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Replace the level generator
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Highest level currently in use
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = [None; MAX_LEVEL + 1];
        self.level = 0;
    }

    pub fn key(&self, id: SkipNodeId) -> &K {
        &self.nodes[id.0].key
    }

    pub fn value(&self, id: SkipNodeId) -> &V {
        &self.nodes[id.0].value
    }

    /// Number of levels `id` is linked into
    pub fn node_levels(&self, id: SkipNodeId) -> usize {
        self.nodes[id.0].forward.len()
    }

    pub fn first(&self) -> Option<SkipNodeId> {
        self.head[0]
    }

    /// Following node at level 0
    pub fn next(&self, id: SkipNodeId) -> Option<SkipNodeId> {
        self.nodes[id.0].forward[0]
    }

    /// Preceding node at level 0
    pub fn previous(&self, id: SkipNodeId) -> Option<SkipNodeId> {
        self.nodes[id.0].prev
    }

    /// Visit every entry in level-0 order
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self.iter() {
            visit(key, value);
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V, O> {
        Iter {
            list: self,
            next: self.head[0],
        }
    }

    fn next_at(&self, at: Option<SkipNodeId>, level: usize) -> Option<SkipNodeId> {
        match at {
            None => self.head[level],
            Some(n) => self.nodes[n.0].forward[level],
        }
    }

    fn set_next(&mut self, at: Option<SkipNodeId>, level: usize, to: Option<SkipNodeId>) {
        match at {
            None => self.head[level] = to,
            Some(n) => self.nodes[n.0].forward[level] = to,
        }
    }

    fn random_level(&mut self) -> usize {
        let mut level = 0;
        while level < MAX_LEVEL && self.rng.gen_bool(PROMOTION_PROBABILITY) {
            level += 1;
        }
        level
    }
}

impl<K, V, O: Order<K>> SkipList<K, V, O> {
    /// Create an empty list with an entropy-seeded level generator
    pub fn with_order(order: O) -> Self {
        Self {
            nodes: Vec::new(),
            head: [None; MAX_LEVEL + 1],
            level: 0,
            order,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn order(&self) -> &O {
        &self.order
    }

    /// Splice a new node in front of any entries with an equal key
    pub fn add(&mut self, key: K, value: V) -> SkipNodeId {
        // Levels above the current one already point at the header.
        let update = self.find_update(&key);

        let level = self.random_level();
        self.level = self.level.max(level);

        let id = SkipNodeId(self.nodes.len());
        let forward: Vec<Option<SkipNodeId>> =
            (0..=level).map(|l| self.next_at(update[l], l)).collect();
        let successor = forward[0];
        self.nodes.push(SkipNode {
            key,
            value,
            forward,
            prev: update[0],
        });

        for (l, pred) in update.iter().enumerate().take(level + 1) {
            self.set_next(*pred, l, Some(id));
        }
        if let Some(s) = successor {
            self.nodes[s.0].prev = Some(id);
        }
        id
    }

    /// First node whose key is not less than `key`
    pub fn lower_bound(&self, key: &K) -> Option<SkipNodeId> {
        let update = self.find_update(key);
        self.next_at(update[0], 0)
    }

    /// First node with a key equal to `key`
    pub fn find(&self, key: &K) -> Option<SkipNodeId> {
        self.lower_bound(key)
            .filter(|id| self.order.equal(&self.nodes[id.0].key, key))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Value of the first entry with key `key`
    pub fn get_first(&self, key: &K) -> Option<&V> {
        self.find(key).map(|id| &self.nodes[id.0].value)
    }

    /// Values whose keys lie in `[start, end]`, in key order
    pub fn get_range(&self, start: &K, end: &K) -> Vec<&V> {
        let mut out = Vec::new();
        let mut cur = self.lower_bound(start);
        while let Some(id) = cur {
            let node = &self.nodes[id.0];
            if self.order.less(end, &node.key) {
                break;
            }
            out.push(&node.value);
            cur = node.forward[0];
        }
        out
    }

    /// Every value stored under `key`
    pub fn get_all(&self, key: &K) -> Vec<&V> {
        self.get_range(key, key)
    }

    /// Remove the first entry with key `key`
    pub fn remove(&mut self, key: &K) -> bool {
        self.remove_if(key, |_| true)
    }

    /// Remove the first entry with key `key` whose value satisfies `predicate`
    ///
    /// At most one node is removed per call.
    pub fn remove_if<P>(&mut self, key: &K, mut predicate: P) -> bool
    where
        P: FnMut(&V) -> bool,
    {
        let update = self.find_update(key);

        let mut target = None;
        let mut cur = self.next_at(update[0], 0);
        while let Some(id) = cur {
            let node = &self.nodes[id.0];
            if !self.order.equal(&node.key, key) {
                break;
            }
            if predicate(&node.value) {
                target = Some(id);
                break;
            }
            cur = node.forward[0];
        }
        let Some(target) = target else {
            return false;
        };

        let preds = self.predecessors(update, target);
        self.unlink(target, &preds);
        self.release(target);
        true
    }

    /// Per-level strict predecessors of `key`
    fn find_update(&self, key: &K) -> Update {
        let mut update = [None; MAX_LEVEL + 1];
        let mut cur = None;
        for l in (0..=self.level).rev() {
            while let Some(n) = self.next_at(cur, l) {
                if self.order.less(&self.nodes[n.0].key, key) {
                    cur = Some(n);
                } else {
                    break;
                }
            }
            update[l] = cur;
        }
        update
    }

    /// Exact per-level predecessors of `target`, starting from the strict
    /// predecessors of its key and stepping over equal-keyed nodes
    fn predecessors(&self, mut update: Update, target: SkipNodeId) -> Update {
        for (l, slot) in update
            .iter_mut()
            .enumerate()
            .take(self.nodes[target.0].forward.len())
        {
            let mut p = *slot;
            while let Some(n) = self.next_at(p, l) {
                if n == target {
                    break;
                }
                p = Some(n);
            }
            *slot = p;
        }
        update
    }

    fn unlink(&mut self, target: SkipNodeId, preds: &Update) {
        let forward = self.nodes[target.0].forward.clone();
        for (l, next) in forward.iter().enumerate() {
            self.set_next(preds[l], l, *next);
        }
        if let Some(s) = forward[0] {
            self.nodes[s.0].prev = self.nodes[target.0].prev;
        }
        while self.level > 0 && self.head[self.level].is_none() {
            self.level -= 1;
        }
    }

    /// Free an unlinked node's slot, moving the last arena node into it
    fn release(&mut self, victim: SkipNodeId) -> (K, V) {
        let last = SkipNodeId(self.nodes.len() - 1);
        if victim != last {
            let update = self.find_update(&self.nodes[last.0].key);
            let preds = self.predecessors(update, last);
            for l in 0..self.nodes[last.0].forward.len() {
                self.set_next(preds[l], l, Some(victim));
            }
            if let Some(s) = self.nodes[last.0].forward[0] {
                self.nodes[s.0].prev = Some(victim);
            }
        }
        let node = self.nodes.swap_remove(victim.0);
        (node.key, node.value)
    }
}

/// Level-0 iterator returned by [`SkipList::iter`]
pub struct Iter<'a, K, V, O> {
    list: &'a SkipList<K, V, O>,
    next: Option<SkipNodeId>,
}

impl<'a, K, V, O> Iterator for Iter<'a, K, V, O> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = &self.list.nodes[id.0];
        self.next = node.forward[0];
        Some((&node.key, &node.value))
    }
}
