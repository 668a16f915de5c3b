use itertools::chain;
use tinyvec::ArrayVec;

pub const MAX_INPUTS: usize = 4;
pub const MAX_STOI: usize = 4;

/// The capability a reaction must expose to the scheduling engine.
///
/// The engine references reactions by index into a slice owned by the solver;
/// it never stores reactions itself. The chemical state is a vector of
/// molecule counts, also owned by the solver.
pub trait Reaction {
    /// The rate at which reaction events currently occur.
    fn forward_rate(&self, state: &[i64]) -> f64;
    /// Whether the reaction can be performed in the given state.
    ///
    /// A reaction drawn from a precomputed schedule may have become impossible
    /// because another reaction consumed its reactants since the draw was made.
    fn is_reaction_possible(&self, state: &[i64]) -> bool;
    /// Applies the reaction to the state.
    fn perform_forward(&self, state: &mut [i64]);
}

impl<T: Reaction + ?Sized> Reaction for Box<T> {
    fn forward_rate(&self, state: &[i64]) -> f64 {
        (**self).forward_rate(state)
    }
    fn is_reaction_possible(&self, state: &[i64]) -> bool {
        (**self).is_reaction_possible(state)
    }
    fn perform_forward(&self, state: &mut [i64]) {
        (**self).perform_forward(state)
    }
}

/// A struct describing a single mass-action chemical reaction.
#[derive(Clone, Debug)]
pub struct ChemicalReaction {
    /// The inputs to the reaction.
    pub inputs: ArrayVec<[(usize, u64); MAX_INPUTS]>,
    /// The change to the reaction state for every firing of the reaction.
    pub stoichiometry: ArrayVec<[(usize, i64); MAX_STOI]>,
    /// The rate constant of the reaction.
    pub rate: f64,
}

impl ChemicalReaction {
    pub fn new(
        inputs: ArrayVec<[(usize, u64); MAX_INPUTS]>,
        stoichiometry: ArrayVec<[(usize, i64); MAX_STOI]>,
        rate: f64,
    ) -> ChemicalReaction {
        ChemicalReaction {
            inputs,
            stoichiometry,
            rate,
        }
    }

    /// Computes the `input_product` of the reaction, or the number of combinations of input molecules.
    pub fn input_product(&self, reactants: &[i64]) -> u64 {
        self.inputs
            .iter()
            .map(|&(reactant, count)| binomial(reactants[reactant].max(0) as u64, count))
            .product()
    }

    pub fn all_reactants<'t>(&'t self) -> impl Iterator<Item = usize> + 't {
        chain!(
            self.inputs.iter().map(|(r, _)| *r),
            self.stoichiometry.iter().map(|(r, _)| *r)
        )
    }
}

impl Reaction for ChemicalReaction {
    fn forward_rate(&self, state: &[i64]) -> f64 {
        self.input_product(state) as f64 * self.rate
    }

    fn is_reaction_possible(&self, state: &[i64]) -> bool {
        self.inputs
            .iter()
            .all(|&(reactant, count)| state[reactant] >= count as i64)
    }

    fn perform_forward(&self, state: &mut [i64]) {
        for &(reactant, change) in &self.stoichiometry {
            state[reactant] += change;
        }
    }
}

/// Computes n choose k, of the number of subsets of size k of a set of size n.
pub fn binomial(n: u64, k: u64) -> u64 {
    match k {
        0 => 1,
        1 => n,
        2 => (n * n - n) / 2,
        3 => (n * (n - 1) * (n - 2)) / 6,
        k => {
            let mut res = 1;
            for i in 0..k {
                res = res * (n - i) / (i + 1);
            }
            res
        }
    }
}
