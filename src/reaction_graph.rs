use itertools::izip;
use smallvec::SmallVec;

use crate::reaction::ChemicalReaction;

/// The dependence structure of a reaction network.
///
/// For every reaction, the graph lists the reactions whose rates may change
/// when it fires: the reactions reading any species the firing reaction
/// touches. Solvers use this to restrict rate invalidation to the affected
/// set instead of refreshing every rate after every firing.
#[derive(Clone, Debug, Default)]
pub struct ReactionGraph {
    dependents: Vec<SmallVec<[usize; 8]>>,
}

impl ReactionGraph {
    /// Builds the dependence graph of a mass-action network.
    ///
    /// We already have the reaction -> reactant edges, and now need the
    /// reactant -> reaction edges, and then we take the product.
    pub fn from_reactions(state_len: usize, reactions: &[ChemicalReaction]) -> ReactionGraph {
        let mut component_input = vec![Vec::new(); state_len];
        for (idx, reaction) in reactions.iter().enumerate() {
            for &(reactant, _) in &reaction.inputs {
                component_input[reactant].push(idx);
            }
        }

        let mut dependents: Vec<SmallVec<[usize; 8]>> =
            vec![SmallVec::new(); reactions.len()];
        for (reaction, deps) in izip!(reactions, &mut dependents) {
            for &(reactant, _) in &reaction.stoichiometry {
                deps.extend_from_slice(&component_input[reactant]);
            }
        }
        for deps in &mut dependents {
            deps.sort_unstable();
            deps.dedup();
        }

        ReactionGraph { dependents }
    }

    /// Builds a graph from explicit dependent lists, one per reaction.
    pub fn from_dependents(dependents: Vec<Vec<usize>>) -> ReactionGraph {
        ReactionGraph {
            dependents: dependents.into_iter().map(SmallVec::from_vec).collect(),
        }
    }

    /// The indices of the reactions whose rates may change when the given
    /// reaction fires.
    pub fn dependents(&self, reaction: usize) -> &[usize] {
        &self.dependents[reaction]
    }
}
