use crate::{
    random::RandomHandler,
    rate_manager::{RateManager, TreeRateManager},
    reaction::Reaction,
};

use super::group::{ReactionGroup, NO_REACTION_LEFT};

/// A reaction group whose rates reflect the latest state at every step.
///
/// Each scheduling step folds the reported rate changes into the rate tree,
/// draws one exponential waiting time with rate parameter equal to the total
/// rate, and selects the firing reaction through the tree, so a step costs
/// O(log n) in the number of invalidated rates rather than a full rebuild.
pub struct UpdatedRateGroup {
    rate_manager: TreeRateManager,
    next_reaction_time: f64,
    next_reaction: Option<usize>,
}

impl UpdatedRateGroup {
    pub fn new<R: Reaction>(
        reaction_indices: Vec<usize>,
        reactions: &[R],
        state: &[i64],
    ) -> UpdatedRateGroup {
        let mut rate_manager = TreeRateManager::new(reaction_indices);
        rate_manager.recompute_all(reactions, state);
        UpdatedRateGroup {
            rate_manager,
            next_reaction_time: NO_REACTION_LEFT,
            next_reaction: None,
        }
    }

    /// Rebuilds every rate from scratch and drops the pending schedule.
    pub fn reinitialize<R: Reaction>(&mut self, reactions: &[R], state: &[i64]) {
        self.rate_manager.recompute_all(reactions, state);
        self.next_reaction_time = NO_REACTION_LEFT;
        self.next_reaction = None;
    }

    /// Marks the given reaction's rate as stale, if it belongs to the group.
    pub fn report_rate_change(&mut self, reaction: usize) {
        self.rate_manager.report_change(reaction);
    }
}

impl ReactionGroup for UpdatedRateGroup {
    fn next_reaction_time(&self) -> f64 {
        self.next_reaction_time
    }

    fn next_reaction(&self) -> Option<usize> {
        self.next_reaction
    }

    fn perform_next_reaction<R: Reaction>(
        &mut self,
        reactions: &[R],
        state: &mut [i64],
    ) -> usize {
        let reaction = self
            .next_reaction
            .take()
            .unwrap_or_else(|| panic!("Performing a reaction in a group with none scheduled"));
        reactions[reaction].perform_forward(state);
        self.next_reaction_time = NO_REACTION_LEFT;
        reaction
    }

    fn discard_next_reaction(&mut self) {
        self.next_reaction = None;
        self.next_reaction_time = NO_REACTION_LEFT;
    }

    fn schedule_next_reaction<R: Reaction>(
        &mut self,
        time: f64,
        reactions: &[R],
        state: &[i64],
        random: &mut RandomHandler,
    ) {
        self.rate_manager.update_rates(reactions, state);
        let total_rate = self.rate_manager.total_rate();
        if total_rate <= 0. {
            self.next_reaction_time = NO_REACTION_LEFT;
            self.next_reaction = None;
            return;
        }
        self.next_reaction_time = time + random.draw_exponential(total_rate);
        let value = random.draw_uniform(0., total_rate);
        self.next_reaction = Some(self.rate_manager.translate(value));
    }
}
