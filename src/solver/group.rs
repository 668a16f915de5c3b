use crate::{random::RandomHandler, reaction::Reaction};

/// The scheduled time reported by a group with no reaction left to perform.
///
/// Groups whose total rate is zero, and constant-rate groups whose window
/// batch is exhausted, report this sentinel; it sorts after every real event
/// time.
pub const NO_REACTION_LEFT: f64 = f64::INFINITY;

/// A set of reactions scheduled together under one rate refresh policy.
///
/// A group owns the schedule of its own next reaction: the dispatcher asks
/// for its time, checks the reaction it designates against the current
/// state, and either performs it or discards it and asks the group to move
/// on.
pub trait ReactionGroup {
    /// The time of the group's next scheduled reaction,
    /// [`NO_REACTION_LEFT`] if there is none.
    fn next_reaction_time(&self) -> f64;

    /// The global index of the reaction scheduled next, `None` if the group
    /// has no reaction left to offer.
    fn next_reaction(&self) -> Option<usize>;

    /// Performs the scheduled reaction, moves past it, and returns its
    /// global index.
    fn perform_next_reaction<R: Reaction>(&mut self, reactions: &[R], state: &mut [i64])
        -> usize;

    /// Drops the scheduled reaction without performing it.
    ///
    /// Used when the scheduled reaction is no longer possible in the current
    /// state; the draw is abandoned, never retried.
    fn discard_next_reaction(&mut self);

    /// Refreshes the group's next scheduled reaction, starting from the
    /// given current time.
    fn schedule_next_reaction<R: Reaction>(
        &mut self,
        time: f64,
        reactions: &[R],
        state: &[i64],
        random: &mut RandomHandler,
    );
}
