use rustc_hash::FxHashMap;

use crate::{rate_tree::RateTree, reaction::Reaction, wheel::BiasedWheel};

/// Owns the reactions-to-rates mapping for one group of reactions.
///
/// A rate manager evaluates the current rate of every reaction it covers,
/// reports the aggregate, and translates a drawn cumulated rate value back to
/// a reaction. A total rate of zero means no reaction in the group can
/// currently fire; callers must treat this as "no event" and never draw.
pub trait RateManager {
    /// Evaluates every reaction's current rate and rebuilds the cumulated
    /// structures from scratch.
    fn recompute_all<R: Reaction>(&mut self, reactions: &[R], state: &[i64]);
    /// The total rate of the group.
    fn total_rate(&self) -> f64;
    /// Translates a value in `[0, total_rate())` to the global index of the
    /// reaction whose rate range contains it.
    fn translate(&self, value: f64) -> usize;
}

/// A rate manager storing rates in a flat vector with cumulated sums.
///
/// Every rate change requires a full rebuild, which suits groups whose rates
/// are refreshed wholesale at window boundaries.
#[derive(Clone, Debug)]
pub struct FlatRateManager {
    /// The global indices of the covered reactions.
    reactions: Vec<usize>,
    /// The current rate of each covered reaction.
    rates: Vec<f64>,
    wheel: BiasedWheel<f64>,
}

impl FlatRateManager {
    pub fn new(reactions: Vec<usize>) -> FlatRateManager {
        let rates = vec![0.; reactions.len()];
        FlatRateManager {
            reactions,
            wheel: BiasedWheel::new(&rates),
            rates,
        }
    }

    /// The current rates of the covered reactions, in group order.
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// The global index of the reaction at the given group position.
    pub fn reaction(&self, local: usize) -> usize {
        self.reactions[local]
    }

    pub fn len(&self) -> usize {
        self.reactions.len()
    }
}

impl RateManager for FlatRateManager {
    fn recompute_all<R: Reaction>(&mut self, reactions: &[R], state: &[i64]) {
        for (rate, &global) in self.rates.iter_mut().zip(&self.reactions) {
            *rate = reactions[global].forward_rate(state);
        }
        self.wheel = BiasedWheel::new(&self.rates);
    }

    fn total_rate(&self) -> f64 {
        self.wheel.total()
    }

    fn translate(&self, value: f64) -> usize {
        self.reactions[self.wheel.find_index(value)]
    }
}

/// A rate manager storing rates in a [`RateTree`].
///
/// Point rate changes invalidate single leaves and are folded in with
/// logarithmic work, which suits groups whose rates are refreshed after
/// every reaction.
#[derive(Clone, Debug)]
pub struct TreeRateManager {
    /// The global indices of the covered reactions.
    reactions: Vec<usize>,
    /// The group position of each covered global reaction index.
    local_indices: FxHashMap<usize, usize>,
    tree: RateTree,
}

impl TreeRateManager {
    pub fn new(reactions: Vec<usize>) -> TreeRateManager {
        let local_indices = reactions
            .iter()
            .enumerate()
            .map(|(local, &global)| (global, local))
            .collect();
        TreeRateManager {
            tree: RateTree::new(reactions.len()),
            local_indices,
            reactions,
        }
    }

    /// Marks the given reaction's rate as stale, if the reaction belongs to
    /// this group. Reactions outside the group are ignored.
    pub fn report_change(&mut self, reaction: usize) {
        if let Some(&local) = self.local_indices.get(&reaction) {
            self.tree.invalidate(local);
        }
    }

    /// Recomputes the invalidated leaves and the stale paths above them.
    pub fn update_rates<R: Reaction>(&mut self, reactions: &[R], state: &[i64]) {
        let indices = &self.reactions;
        self.tree
            .update_rates(|local| reactions[indices[local]].forward_rate(state));
    }

    pub fn len(&self) -> usize {
        self.reactions.len()
    }
}

impl RateManager for TreeRateManager {
    fn recompute_all<R: Reaction>(&mut self, reactions: &[R], state: &[i64]) {
        let indices = &self.reactions;
        self.tree
            .recompute_all(|local| reactions[indices[local]].forward_rate(state));
    }

    fn total_rate(&self) -> f64 {
        self.tree.total_rate()
    }

    fn translate(&self, value: f64) -> usize {
        self.reactions[self.tree.find(value)]
    }
}
