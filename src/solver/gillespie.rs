use crate::{
    random::RandomHandler,
    rate_manager::{RateManager, TreeRateManager},
    reaction::Reaction,
    reaction_graph::ReactionGraph,
    Solver,
};

use super::group::NO_REACTION_LEFT;

/// The classical Gillespie algorithm: a single group over all the reactions,
/// with rates refreshed after every firing.
///
/// Exact by construction, so it doubles as the reference implementation the
/// grouped solver is tested against.
pub struct GillespieSolver<R: Reaction> {
    reactions: Vec<R>,
    state: Vec<i64>,
    dependence_graph: ReactionGraph,
    rate_manager: TreeRateManager,
    random: RandomHandler,
    next_reaction: Option<usize>,
    next_reaction_time: f64,
    time: f64,
    reactions_performed: u64,
}

impl<R: Reaction> GillespieSolver<R> {
    pub fn new(
        initial_state: Vec<i64>,
        reactions: Vec<R>,
        dependence_graph: ReactionGraph,
        initial_time: f64,
        random: RandomHandler,
    ) -> GillespieSolver<R> {
        assert!(
            !reactions.is_empty(),
            "A solver requires at least one reaction"
        );
        let mut rate_manager = TreeRateManager::new((0..reactions.len()).collect());
        rate_manager.recompute_all(&reactions, &initial_state);

        let mut solver = GillespieSolver {
            reactions,
            state: initial_state,
            dependence_graph,
            rate_manager,
            random,
            next_reaction: None,
            next_reaction_time: NO_REACTION_LEFT,
            time: initial_time,
            reactions_performed: 0,
        };
        solver.schedule_next_reaction();
        solver
    }

    fn schedule_next_reaction(&mut self) {
        self.rate_manager.update_rates(&self.reactions, &self.state);
        let total_rate = self.rate_manager.total_rate();
        if total_rate <= 0. {
            self.next_reaction = None;
            self.next_reaction_time = NO_REACTION_LEFT;
            return;
        }
        let waiting_time = self.random.draw_exponential(total_rate);
        let value = self.random.draw_uniform(0., total_rate);
        self.next_reaction_time = self.time + waiting_time;
        self.next_reaction = Some(self.rate_manager.translate(value));
    }
}

impl<R: Reaction> Solver for GillespieSolver<R> {
    fn time(&self) -> f64 {
        self.time
    }

    fn next_reaction_time(&self) -> f64 {
        self.next_reaction_time
    }

    fn perform_next_reaction(&mut self) {
        let reaction = self
            .next_reaction
            .take()
            .unwrap_or_else(|| panic!("Performing a reaction with none scheduled"));
        debug_assert!(self.reactions[reaction].is_reaction_possible(&self.state));

        self.time = self.next_reaction_time;
        self.reactions[reaction].perform_forward(&mut self.state);
        self.reactions_performed += 1;

        for &dependent in self.dependence_graph.dependents(reaction) {
            self.rate_manager.report_change(dependent);
        }

        self.schedule_next_reaction();
    }

    fn reschedule(&mut self, time: f64) {
        self.time = time;
        self.rate_manager.recompute_all(&self.reactions, &self.state);
        self.schedule_next_reaction();
    }

    fn number_reactions_performed(&self) -> u64 {
        self.reactions_performed
    }

    fn state(&self) -> &[i64] {
        &self.state
    }
}
