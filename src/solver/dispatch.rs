use derive_new::new;
use ordered_float::OrderedFloat;

use crate::{
    classification::{ReactionClassification, TimeStep},
    random::RandomHandler,
    reaction::Reaction,
    reaction_graph::ReactionGraph,
    Solver,
};

use super::{
    constant_rate::ConstantRateGroup,
    group::{ReactionGroup, NO_REACTION_LEFT},
    updated_rate::UpdatedRateGroup,
};

/// The group owning an entry of the dispatcher's event list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupId {
    /// One constant-rate group, by position.
    Constant(usize),
    /// The merged placeholder standing for whichever updated-rate group
    /// currently holds the earliest next event.
    Variable,
}

/// An entry of the dispatcher's time-ordered event list.
#[derive(Clone, Copy, Debug, PartialEq, new)]
pub struct GroupEvent {
    pub time: f64,
    pub group: GroupId,
}

/// A solver merging the next-event streams of several reaction groups into
/// one globally time-ordered reaction stream.
///
/// The event list holds one entry per constant-rate group and a single
/// merged entry for the union of the updated-rate groups, sorted ascending
/// by time. Each scheduling round refreshes the stale entries, then walks
/// the front of the list checking the designated reaction against the
/// current state: a reaction whose reactants were consumed by another
/// group's firing since its draw was made is discarded without being
/// performed, and the schedule simply moves on.
pub struct ManualDispatchSolver<R: Reaction> {
    reactions: Vec<R>,
    state: Vec<i64>,
    dependence_graph: ReactionGraph,
    random: RandomHandler,
    constant_groups: Vec<ConstantRateGroup>,
    updated_groups: Vec<UpdatedRateGroup>,
    /// Kept sorted ascending by time, stable on ties.
    event_list: Vec<GroupEvent>,
    /// The updated-rate group holding the earliest next event, and its time.
    variable_event: (f64, Option<usize>),
    next_reaction: Option<usize>,
    next_reaction_time: f64,
    time: f64,
    reactions_performed: u64,
}

impl<R: Reaction> ManualDispatchSolver<R> {
    pub fn new(
        initial_state: Vec<i64>,
        reactions: Vec<R>,
        classification: &ReactionClassification,
        dependence_graph: ReactionGraph,
        initial_time: f64,
        mut random: RandomHandler,
    ) -> ManualDispatchSolver<R> {
        let mut constant_groups = Vec::new();
        let mut updated_groups = Vec::new();
        let mut event_list = Vec::new();

        for class in classification.classes() {
            match class.time_step {
                TimeStep::AlwaysUpdated => updated_groups.push(UpdatedRateGroup::new(
                    class.reactions.clone(),
                    &reactions,
                    &initial_state,
                )),
                TimeStep::Constant(time_step) => {
                    let group = ConstantRateGroup::new(
                        class.reactions.clone(),
                        time_step,
                        initial_time,
                        &reactions,
                        &initial_state,
                        &mut random,
                    );
                    event_list.push(GroupEvent::new(
                        group.next_reaction_time(),
                        GroupId::Constant(constant_groups.len()),
                    ));
                    constant_groups.push(group);
                }
            }
        }
        event_list.sort_by_key(|event| OrderedFloat(event.time));

        let mut solver = ManualDispatchSolver {
            reactions,
            state: initial_state,
            dependence_graph,
            random,
            constant_groups,
            updated_groups,
            event_list,
            variable_event: (NO_REACTION_LEFT, None),
            next_reaction: None,
            next_reaction_time: NO_REACTION_LEFT,
            time: initial_time,
            reactions_performed: 0,
        };
        solver.schedule_next_reaction();
        solver
    }

    /// Selects the globally next reaction across all groups.
    fn schedule_next_reaction(&mut self) {
        // The previous round's chosen group left a stale entry at the front
        // of the list, unless it was the variable placeholder, which is
        // refreshed unconditionally below.
        if self
            .event_list
            .first()
            .is_some_and(|event| event.group != GroupId::Variable)
        {
            self.update_first_event();
        }
        self.update_variable_event();

        // Reactant availability can invalidate draws made before another
        // group fired, so front events are discarded until one designates a
        // reaction that can still be performed.
        loop {
            let front = self.event_list[0];
            if front.time == NO_REACTION_LEFT {
                self.next_reaction = None;
                self.next_reaction_time = NO_REACTION_LEFT;
                return;
            }
            let candidate = match front.group {
                GroupId::Constant(idx) => self.constant_groups[idx].next_reaction(),
                GroupId::Variable => self
                    .variable_event
                    .1
                    .and_then(|idx| self.updated_groups[idx].next_reaction()),
            };
            match candidate {
                Some(reaction) if self.reactions[reaction].is_reaction_possible(&self.state) => {
                    self.next_reaction = Some(reaction);
                    self.next_reaction_time = front.time;
                    return;
                }
                _ => match front.group {
                    GroupId::Constant(idx) => {
                        if candidate.is_some() {
                            self.constant_groups[idx].discard_next_reaction();
                        }
                        self.update_first_event();
                    }
                    GroupId::Variable => {
                        if let (Some(idx), true) = (self.variable_event.1, candidate.is_some()) {
                            self.updated_groups[idx].discard_next_reaction();
                        }
                        self.update_variable_event();
                    }
                },
            }
        }
    }

    /// Pops the front event, lets its group refresh its own schedule, and
    /// reinserts the group at its new time.
    fn update_first_event(&mut self) {
        let event = self.event_list.remove(0);
        let GroupId::Constant(idx) = event.group else {
            unreachable!("The variable placeholder is refreshed by update_variable_event");
        };
        let group = &mut self.constant_groups[idx];
        group.schedule_next_reaction(self.time, &self.reactions, &self.state, &mut self.random);
        let next_time = group.next_reaction_time();
        self.insert_event(next_time, event.group);
    }

    /// Reschedules every updated-rate group and folds them into the single
    /// placeholder entry at the earliest of their next-event times.
    fn update_variable_event(&mut self) {
        if let Some(pos) = self
            .event_list
            .iter()
            .position(|event| event.group == GroupId::Variable)
        {
            self.event_list.remove(pos);
        }
        self.variable_event = (NO_REACTION_LEFT, None);
        for (idx, group) in self.updated_groups.iter_mut().enumerate() {
            group.schedule_next_reaction(
                self.time,
                &self.reactions,
                &self.state,
                &mut self.random,
            );
            if group.next_reaction_time() < self.variable_event.0 {
                self.variable_event = (group.next_reaction_time(), Some(idx));
            }
        }
        let time = self.variable_event.0;
        self.insert_event(time, GroupId::Variable);
    }

    /// Inserts an event at its position in the time-sorted list.
    ///
    /// A linear-scan insert: the list holds one entry per group, which stays
    /// small relative to the number of events dispatched between refreshes.
    fn insert_event(&mut self, time: f64, group: GroupId) {
        let pos = self.event_list.partition_point(|event| event.time <= time);
        self.event_list.insert(pos, GroupEvent::new(time, group));
    }
}

impl<R: Reaction> Solver for ManualDispatchSolver<R> {
    fn time(&self) -> f64 {
        self.time
    }

    fn next_reaction_time(&self) -> f64 {
        self.next_reaction_time
    }

    fn perform_next_reaction(&mut self) {
        let expected = self
            .next_reaction
            .unwrap_or_else(|| panic!("Performing a reaction with none scheduled"));
        self.time = self.next_reaction_time;

        let front = self.event_list[0];
        let performed = match front.group {
            GroupId::Constant(idx) => {
                self.constant_groups[idx].perform_next_reaction(&self.reactions, &mut self.state)
            }
            GroupId::Variable => {
                let idx = self
                    .variable_event
                    .1
                    .unwrap_or_else(|| panic!("The variable placeholder designates no group"));
                self.updated_groups[idx].perform_next_reaction(&self.reactions, &mut self.state)
            }
        };
        debug_assert_eq!(performed, expected);
        self.reactions_performed += 1;

        for &dependent in self.dependence_graph.dependents(performed) {
            for group in &mut self.updated_groups {
                group.report_rate_change(dependent);
            }
        }

        self.schedule_next_reaction();
    }

    fn reschedule(&mut self, time: f64) {
        self.time = time;
        self.event_list.clear();
        for idx in 0..self.constant_groups.len() {
            let group = &mut self.constant_groups[idx];
            group.reinitialize(time, &self.reactions, &self.state, &mut self.random);
            let next_time = group.next_reaction_time();
            self.insert_event(next_time, GroupId::Constant(idx));
        }
        for group in &mut self.updated_groups {
            group.reinitialize(&self.reactions, &self.state);
        }
        self.variable_event = (NO_REACTION_LEFT, None);
        self.schedule_next_reaction();
    }

    fn number_reactions_performed(&self) -> u64 {
        self.reactions_performed
    }

    fn state(&self) -> &[i64] {
        &self.state
    }
}
