use ordered_float::OrderedFloat;

use crate::{
    random::RandomHandler,
    rate_manager::{FlatRateManager, RateManager},
    reaction::Reaction,
};

use super::group::{ReactionGroup, NO_REACTION_LEFT};

/// A reaction group whose rates are assumed constant over bounded windows.
///
/// Under the constant rate hypothesis the whole reaction schedule of a
/// window can be drawn in one shot: the number of firings is
/// Poisson(total_rate × Δ), their times are i.i.d. uniform over the window
/// (the order statistics of a Poisson process conditioned on its count),
/// and each firing's identity is an independent draw proportional to the
/// individual rates. Playback of the precomputed batch is then O(1) per
/// firing.
pub struct ConstantRateGroup {
    rate_manager: FlatRateManager,
    /// The duration of a scheduling window.
    time_step: f64,
    /// Firing times drawn for the current window, sorted ascending.
    reaction_times: Vec<f64>,
    /// Global reaction indices drawn for the window, aligned with the times.
    scheduled_reactions: Vec<usize>,
    /// The position of the next unconsumed event in the batch.
    next_index: usize,
    /// The end of the current window; the next window starts here.
    window_end: f64,
}

impl ConstantRateGroup {
    pub fn new<R: Reaction>(
        reaction_indices: Vec<usize>,
        time_step: f64,
        initial_time: f64,
        reactions: &[R],
        state: &[i64],
        random: &mut RandomHandler,
    ) -> ConstantRateGroup {
        assert!(time_step > 0., "A scheduling window must have a positive duration");
        let mut group = ConstantRateGroup {
            rate_manager: FlatRateManager::new(reaction_indices),
            time_step,
            reaction_times: Vec::new(),
            scheduled_reactions: Vec::new(),
            next_index: 0,
            window_end: initial_time,
        };
        group.reinitialize(initial_time, reactions, state, random);
        group
    }

    /// Discards the current batch and redraws a full schedule for a fresh
    /// window starting at `time`.
    ///
    /// Consecutive empty windows are skipped on the spot: the state cannot
    /// change while a window holds no firing, so the rates drawn from it
    /// stay valid for the following window. A group whose total rate is zero
    /// keeps an empty schedule until it is reinitialized again.
    pub fn reinitialize<R: Reaction>(
        &mut self,
        time: f64,
        reactions: &[R],
        state: &[i64],
        random: &mut RandomHandler,
    ) {
        self.rate_manager.recompute_all(reactions, state);
        self.reaction_times.clear();
        self.scheduled_reactions.clear();
        self.next_index = 0;
        self.window_end = time + self.time_step;

        let total_rate = self.rate_manager.total_rate();
        if total_rate <= 0. {
            return;
        }

        let mut window_start = time;
        let count = loop {
            let count = random.draw_poisson(total_rate * self.time_step);
            if count > 0 {
                break count as usize;
            }
            window_start += self.time_step;
        };
        self.window_end = window_start + self.time_step;

        self.reaction_times = (0..count)
            .map(|_| random.draw_uniform(window_start, self.window_end))
            .collect();
        self.reaction_times.sort_unstable_by_key(|&time| OrderedFloat(time));

        self.scheduled_reactions = random
            .draw_multiple_indices(self.rate_manager.rates(), count)
            .into_iter()
            .map(|local| self.rate_manager.reaction(local))
            .collect();
    }
}

impl ReactionGroup for ConstantRateGroup {
    fn next_reaction_time(&self) -> f64 {
        self.reaction_times
            .get(self.next_index)
            .copied()
            .unwrap_or(NO_REACTION_LEFT)
    }

    fn next_reaction(&self) -> Option<usize> {
        self.scheduled_reactions.get(self.next_index).copied()
    }

    fn perform_next_reaction<R: Reaction>(
        &mut self,
        reactions: &[R],
        state: &mut [i64],
    ) -> usize {
        let reaction = self.scheduled_reactions[self.next_index];
        reactions[reaction].perform_forward(state);
        self.next_index += 1;
        reaction
    }

    fn discard_next_reaction(&mut self) {
        self.next_index += 1;
    }

    fn schedule_next_reaction<R: Reaction>(
        &mut self,
        time: f64,
        reactions: &[R],
        state: &[i64],
        random: &mut RandomHandler,
    ) {
        // The batch cursor already designates the next event; only an
        // exhausted batch needs a redraw, for the window following the
        // current one. A group revived after sitting idle with a zero total
        // rate resumes from the current time instead of its stale window.
        if self.next_index >= self.reaction_times.len() {
            self.reinitialize(self.window_end.max(time), reactions, state, random);
        }
    }
}
