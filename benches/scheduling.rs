use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;

use groupspie::{
    BiasedWheel, GillespieSolver, ManualDispatchSolver, ParseState, RandomHandler, ReactionGraph,
    Solver, DEFAULT_SEED,
};

/// A birth-death cascade with a constant-rate synthesis class feeding two
/// always-updated conversion and decay classes.
const CASCADE_MODEL: &str = "A = 0
B = 0
-> A, 500.0 @ 0.05
A -> B, 1.0
B -> , 0.5
";
const CASCADE_TIME: f64 = 2.;

fn criterion_benchmark(c: &mut Criterion) {
    let mut parse_state = ParseState::default();
    parse_state.parse_str(CASCADE_MODEL);
    let (initial_state, reactions, _, classification) = parse_state.get_network();

    c.bench_function("cascade gillespie", |b| {
        b.iter(|| {
            let mut solver = GillespieSolver::new(
                initial_state.clone(),
                reactions.clone(),
                ReactionGraph::from_reactions(initial_state.len(), &reactions),
                0.,
                RandomHandler::from_seed(black_box(DEFAULT_SEED)),
            );
            solver.advance_until(CASCADE_TIME);
            solver.number_reactions_performed()
        })
    });

    c.bench_function("cascade dispatch", |b| {
        b.iter(|| {
            let mut solver = ManualDispatchSolver::new(
                initial_state.clone(),
                reactions.clone(),
                &classification,
                ReactionGraph::from_reactions(initial_state.len(), &reactions),
                0.,
                RandomHandler::from_seed(black_box(DEFAULT_SEED)),
            );
            solver.advance_until(CASCADE_TIME);
            solver.number_reactions_performed()
        })
    });

    let rng = &mut StdRng::seed_from_u64(DEFAULT_SEED);
    let weights = (0..1000).map(|_| rng.random::<f64>()).collect::<Vec<_>>();
    let wheel = BiasedWheel::new(&weights);
    let values = (0..1000)
        .map(|_| rng.random::<f64>() * wheel.total())
        .collect::<Vec<_>>();

    c.bench_function("wheel batched selection", |b| {
        b.iter(|| wheel.find_multiple_indices(black_box(&values)))
    });
}

criterion_group! {
    name=benches; config=Criterion::default().sample_size(10); targets=criterion_benchmark
}
criterion_main!(benches);
