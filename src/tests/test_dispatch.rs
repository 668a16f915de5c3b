use tinyvec::ArrayVec;

use crate::{
    random::RandomHandler,
    reaction::ChemicalReaction,
    solver::{ConstantRateGroup, ReactionGroup},
    utils::DEFAULT_SEED,
    ManualDispatchSolver, ParseState, ReactionGraph, Solver, NO_REACTION_LEFT,
};

/// Builds a dispatch solver from model-definition text.
fn dispatch_solver(model: &str, seed: u64) -> (ManualDispatchSolver<ChemicalReaction>, Vec<String>) {
    let mut parse_state = ParseState::default();
    parse_state.parse_str(model);
    let (initial_state, reactions, names, classification) = parse_state.get_network();
    let dependence_graph = ReactionGraph::from_reactions(initial_state.len(), &reactions);
    let solver = ManualDispatchSolver::new(
        initial_state,
        reactions,
        &classification,
        dependence_graph,
        0.,
        RandomHandler::from_seed(seed),
    );
    (solver, names)
}

/// Over many window draws with two reactions of rates 1 and 3, the count of
/// events per window concentrates around Poisson(4) and the fraction of
/// type-1 events around 1/4: the Poisson/uniform/multinomial decomposition
/// of the superposed process.
#[test]
fn test_poisson_uniform_decomposition() {
    let synthesis = |species: usize, rate: f64| {
        let mut stoichiometry = ArrayVec::new();
        stoichiometry.push((species, 1_i64));
        ChemicalReaction::new(ArrayVec::new(), stoichiometry, rate)
    };
    let reactions = vec![synthesis(0, 1.), synthesis(1, 3.)];
    let mut state = vec![0_i64, 0];
    let random = &mut RandomHandler::from_seed(DEFAULT_SEED);

    let windows = 4000;
    let mut total_events = 0_u64;
    let mut first_kind_events = 0_u64;
    for _ in 0..windows {
        let mut group =
            ConstantRateGroup::new(vec![0, 1], 1., 0., &reactions, &state, random);
        let mut previous_time = 0.;
        while let Some(reaction) = group.next_reaction() {
            let time = group.next_reaction_time();
            if time >= 1. {
                // The chained redraw moved past the first window.
                break;
            }
            assert!(time >= previous_time, "Window events must be sorted");
            previous_time = time;
            total_events += 1;
            if reaction == 0 {
                first_kind_events += 1;
            }
            group.perform_next_reaction(&reactions, &mut state);
        }
    }

    let mean_count = total_events as f64 / windows as f64;
    assert!(
        (mean_count - 4.).abs() < 0.15,
        "Events per window averaged {mean_count}, expected about 4"
    );
    let first_kind_fraction = first_kind_events as f64 / total_events as f64;
    assert!(
        (first_kind_fraction - 0.25).abs() < 0.02,
        "Type-1 fraction was {first_kind_fraction}, expected about 0.25"
    );
}

/// Two constant-rate groups draw their schedules independently against the
/// same finite reactant pool, so each holds draws the other can invalidate.
/// The dispatcher must discard every infeasible draw unexecuted, keep the
/// pool nonnegative, and still terminate.
#[test]
fn test_feasibility_guard_shared_pool() {
    let model = "S = 40
A = 0
B = 0
S -> A, 1.0 @ 2.0
S -> B, 1.0 @ 1.5
";
    for seed in 0..20 {
        let (mut solver, names) = dispatch_solver(model, seed);
        let pool = names.iter().position(|name| name == "S").unwrap();

        let mut steps = 0;
        while solver.next_reaction_time() < NO_REACTION_LEFT {
            solver.perform_next_reaction();
            assert!(
                solver.state()[pool] >= 0,
                "A reaction fired without its reactant available"
            );
            steps += 1;
            assert!(steps <= 10_000, "The dispatcher failed to terminate");
        }

        assert_eq!(solver.state()[pool], 0);
        assert_eq!(solver.number_reactions_performed(), 40);
        assert_eq!(solver.state().iter().sum::<i64>(), 40);
    }
}

/// The times at which reactions are performed never decrease, across group
/// boundaries and window reinitializations alike.
#[test]
fn test_monotonic_time() {
    let model = "A = 0
B = 50
-> A, 8.0 @ 0.25
A -> B, 0.5
B -> A, 0.2 @ 0.4
";
    for seed in 0..10 {
        let (mut solver, _) = dispatch_solver(model, seed);
        let mut previous_time = 0.;
        while solver.next_reaction_time() <= 20. {
            let time = solver.next_reaction_time();
            assert!(
                time >= previous_time,
                "Reaction times went backwards: {time} after {previous_time}"
            );
            previous_time = time;
            solver.perform_next_reaction();
        }
        assert!(solver.number_reactions_performed() > 0);
    }
}

/// On a closed network the dispatcher preserves the total molecule count.
#[test]
fn test_conservation_closed_network() {
    let model = "A = 30
B = 20
C = 10
A + B -> B + C, 0.05 @ 0.5
B + C -> C + A, 0.05
C + A -> A + B, 0.05
";
    let (mut solver, _) = dispatch_solver(model, DEFAULT_SEED);
    solver.advance_until(5.);
    assert_eq!(solver.state().iter().sum::<i64>(), 60);
    for &count in solver.state() {
        assert!(count >= 0);
    }
}

/// Rescheduling redraws every group from the given time; subsequent
/// reactions are all scheduled at or after it.
#[test]
fn test_reschedule() {
    let model = "A = 100
A -> , 1.0 @ 0.5
";
    let (mut solver, _) = dispatch_solver(model, DEFAULT_SEED);
    solver.advance_until(0.2);
    let performed = solver.number_reactions_performed();
    assert!(performed > 0);

    solver.reschedule(1.);
    assert!(solver.next_reaction_time() >= 1.);
    solver.advance_until(2.);
    assert!(solver.number_reactions_performed() > performed);
}
