use std::collections::VecDeque;

use itertools::Itertools;

/// The children of a node, or the reaction index held by a leaf.
#[derive(Clone, Copy, Debug)]
enum RateNodeKind {
    Leaf { reaction: usize },
    Internal { left: usize, right: usize },
}

/// A single node of the rate tree.
///
/// The parent index is a non-owning back-reference used only to propagate
/// invalidation; traversal from the root goes through the children. A node
/// whose `invalidated` flag is set holds a stale rate that must not be read
/// before the next update.
#[derive(Clone, Debug)]
struct RateNode {
    parent: Option<usize>,
    invalidated: bool,
    rate: f64,
    kind: RateNodeKind,
}

/// A binary aggregation tree over the rates of a group of reactions.
///
/// Leaves hold one reaction's rate each, internal nodes the sum of their
/// children, so the root holds the total rate of the group. Rate changes are
/// reported by invalidating leaves; the stale path to the root is recomputed
/// lazily by `update_rates`, and a cumulated rate value is translated to a
/// reaction in logarithmic time by `find`.
///
/// The tree is laid out in a flat arena, built once, and never resized.
/// Leaf `i` is node `i`, and the in-order traversal of the leaves follows
/// the reaction order, so `find` is consistent with the cumulated sums of
/// the rates in reaction order.
#[derive(Clone, Debug)]
pub struct RateTree {
    nodes: Vec<RateNode>,
    root: usize,
    leaf_count: usize,
    /// Invalidated nodes awaiting an update, children before parents.
    update_queue: VecDeque<usize>,
}

impl RateTree {
    pub fn new(leaf_count: usize) -> RateTree {
        assert!(leaf_count > 0, "A rate tree must hold at least one reaction");
        let mut nodes = (0..leaf_count)
            .map(|reaction| RateNode {
                parent: None,
                invalidated: false,
                rate: 0.,
                kind: RateNodeKind::Leaf { reaction },
            })
            .collect_vec();

        // Pairing consecutive nodes into parents until a single root remains.
        // An unpaired node is carried into the next layer unchanged, so every
        // appended parent has a larger index than both of its children.
        let mut layer = (0..leaf_count).collect_vec();
        while layer.len() > 1 {
            let mut next_layer = Vec::with_capacity(layer.len().div_ceil(2));
            for pair in layer.chunks(2) {
                match *pair {
                    [left, right] => {
                        let idx = nodes.len();
                        nodes.push(RateNode {
                            parent: None,
                            invalidated: false,
                            rate: 0.,
                            kind: RateNodeKind::Internal { left, right },
                        });
                        nodes[left].parent = Some(idx);
                        nodes[right].parent = Some(idx);
                        next_layer.push(idx);
                    }
                    [single] => next_layer.push(single),
                    _ => unreachable!(),
                }
            }
            layer = next_layer;
        }

        RateTree {
            root: layer[0],
            nodes,
            leaf_count,
            update_queue: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.leaf_count
    }

    /// Marks the leaf holding the given reaction as stale.
    ///
    /// Only the leaf itself is marked; the path to the root is invalidated
    /// during the next `update_rates` call, stopping at the first ancestor
    /// that is already stale.
    pub fn invalidate(&mut self, leaf: usize) {
        debug_assert!(
            leaf < self.leaf_count,
            "Attempted to invalidate a leaf outside the tree: {leaf}"
        );
        if !self.nodes[leaf].invalidated {
            self.nodes[leaf].invalidated = true;
            self.update_queue.push_back(leaf);
        }
    }

    /// Recomputes every invalidated node from the given leaf rates,
    /// propagating along the stale paths only.
    pub fn update_rates(&mut self, rate_of: impl Fn(usize) -> f64) {
        while let Some(idx) = self.update_queue.pop_front() {
            if !self.nodes[idx].invalidated {
                continue;
            }
            if let Some(parent) = self.update_node(idx, &rate_of) {
                self.update_queue.push_back(parent);
            }
        }
    }

    /// Rebuilds every node of the tree from scratch.
    pub fn recompute_all(&mut self, rate_of: impl Fn(usize) -> f64) {
        for idx in 0..self.nodes.len() {
            let rate = match self.nodes[idx].kind {
                RateNodeKind::Leaf { reaction } => rate_of(reaction),
                RateNodeKind::Internal { left, right } => {
                    self.nodes[left].rate + self.nodes[right].rate
                }
            };
            debug_assert!(
                rate >= 0.,
                "A reaction propensity cannot be negative: {rate}"
            );
            self.nodes[idx].rate = rate;
            self.nodes[idx].invalidated = false;
        }
        self.update_queue.clear();
    }

    /// The total rate of all the reactions in the tree.
    pub fn total_rate(&self) -> f64 {
        debug_assert!(
            self.update_queue.is_empty(),
            "The total rate was read from a tree with pending updates"
        );
        self.nodes[self.root].rate
    }

    /// Translates a cumulated rate value in `[0, total_rate())` to the index
    /// of the reaction whose rate range contains it.
    ///
    /// The tree must be up to date: callers are responsible for running
    /// `update_rates` after the last invalidation.
    pub fn find(&self, value: f64) -> usize {
        debug_assert!(
            self.update_queue.is_empty(),
            "The tree was queried with pending updates"
        );
        let mut idx = self.root;
        let mut value = value;
        loop {
            let node = &self.nodes[idx];
            debug_assert!(!node.invalidated, "The tree was queried while stale");
            match node.kind {
                RateNodeKind::Leaf { reaction } => return reaction,
                RateNodeKind::Internal { left, right } => {
                    let left_rate = self.nodes[left].rate;
                    if value < left_rate {
                        idx = left;
                    } else {
                        value -= left_rate;
                        idx = right;
                    }
                }
            }
        }
    }

    /// Updates a single node, and returns its parent if the parent was newly
    /// invalidated by this update rippling upwards.
    fn update_node(&mut self, idx: usize, rate_of: &impl Fn(usize) -> f64) -> Option<usize> {
        let rate = match self.nodes[idx].kind {
            RateNodeKind::Leaf { reaction } => rate_of(reaction),
            RateNodeKind::Internal { left, right } => {
                self.nodes[left].rate + self.nodes[right].rate
            }
        };
        debug_assert!(
            rate >= 0.,
            "A reaction propensity cannot be negative: {rate}"
        );
        let node = &mut self.nodes[idx];
        node.rate = rate;
        node.invalidated = false;
        let parent = node.parent;
        match parent {
            Some(parent) if !self.nodes[parent].invalidated => {
                self.nodes[parent].invalidated = true;
                Some(parent)
            }
            _ => None,
        }
    }
}
