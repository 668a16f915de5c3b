use kdam::tqdm;
use rustc_hash::FxHashMap;

use crate::{
    random::RandomHandler, tests::chisq::same_categorical_dist, GillespieSolver,
    ManualDispatchSolver, ParseState, ReactionGraph, Solver,
};

/// The system:
///
/// \phi -> A
const SYNTHESIS_MODEL: &str = "A = 0
-> A, 20.0
";
/// The synthesis system with the reaction tagged as constant-rate.
/// Synthesis has no inputs, so the constant-window hypothesis is exact and
/// the grouped schedule must match the Gillespie reference exactly.
const SYNTHESIS_CONSTANT_MODEL: &str = "A = 0
-> A, 20.0 @ 0.1
";
/// The system:
///
/// A -> \phi
const DECAY_MODEL: &str = "A = 20
A -> , 1.0
";
/// The system:
///
/// A + B -> B + C
/// B + C -> C + A
/// C + A -> A + B
const CONVERSION_CYCLE_MODEL: &str = "A = 6
B = 8
C = 0
A + B -> B + C, 0.05
B + C -> C + A, 0.05
C + A -> A + B, 0.05
";
/// A hybrid system mixing an exactly-constant synthesis class with an
/// always-updated decay class.
const HYBRID_MODEL: &str = "A = 0
-> A, 10.0 @ 0.25
A -> , 1.0
";

/// Tests that the chemical reaction network defined by the given model text
/// has the same end-state distribution when simulated by the Gillespie
/// reference and by the grouped dispatch solver.
fn test_network(model: &str, n: usize, t: f64) {
    let mut parse_state = ParseState::default();
    parse_state.parse_str(model);
    let (initial_state, reactions, _, classification) = parse_state.get_network();
    let dependence_graph = ReactionGraph::from_reactions(initial_state.len(), &reactions);

    let mut gillespie_samples: FxHashMap<Vec<i64>, u64> = FxHashMap::default();
    let mut dispatch_samples: FxHashMap<Vec<i64>, u64> = FxHashMap::default();

    for i in tqdm!(0..n, desc = "Gillespie") {
        let mut solver = GillespieSolver::new(
            initial_state.clone(),
            reactions.clone(),
            dependence_graph.clone(),
            0.,
            RandomHandler::from_seed(i as u64),
        );
        solver.advance_until(t);
        *gillespie_samples.entry(solver.state().to_owned()).or_default() += 1;
    }

    for i in tqdm!(0..n, desc = "Dispatch") {
        let mut solver = ManualDispatchSolver::new(
            initial_state.clone(),
            reactions.clone(),
            &classification,
            dependence_graph.clone(),
            0.,
            RandomHandler::from_seed(i as u64),
        );
        solver.advance_until(t);
        *dispatch_samples.entry(solver.state().to_owned()).or_default() += 1;
    }

    assert!(same_categorical_dist(gillespie_samples, dispatch_samples));
}

/// Tests that the system:
///
/// \phi -> A
///
/// behaves the same using the Gillespie reference and the dispatch solver
/// with a single always-updated group.
#[test]
fn test_synthesis_updated() {
    test_network(SYNTHESIS_MODEL, 1 << 14, 0.5);
}

/// Tests that the system:
///
/// \phi -> A
///
/// behaves the same using the Gillespie reference and the dispatch solver
/// with the synthesis scheduled in constant-rate windows.
#[test]
fn test_synthesis_constant() {
    test_network(SYNTHESIS_CONSTANT_MODEL, 1 << 14, 0.5);
}

/// Tests that the system:
///
/// A -> \phi
///
/// behaves the same using the Gillespie reference and the dispatch solver.
#[test]
fn test_decay() {
    test_network(DECAY_MODEL, 1 << 14, 0.5);
}

/// Tests that the system:
///
/// A + B -> B + C
/// B + C -> C + A
/// C + A -> A + B
///
/// behaves the same using the Gillespie reference and the dispatch solver.
#[test]
fn test_conversion_cycle() {
    test_network(CONVERSION_CYCLE_MODEL, 1 << 14, 5.);
}

/// Tests a hybrid system whose constant class (zero-input synthesis) is
/// exact, so the mixed dispatch schedule must still match the reference.
#[test]
fn test_hybrid_synthesis_decay() {
    test_network(HYBRID_MODEL, 1 << 14, 1.);
}
