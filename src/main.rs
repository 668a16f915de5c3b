use std::{path::PathBuf, time::SystemTime};

use clap::{command, Parser};
use groupspie::{
    Algorithm, GillespieSolver, ManualDispatchSolver, ParseState, RandomHandler, ReactionGraph,
    Solver,
};

use rand::{rng, Rng};

// See also `clap_cargo::style::CLAP_STYLING`
pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

#[derive(Debug, Parser)]
#[command(
    name = "groupspie",
    about = "Simulation of chemical reaction networks with grouped scheduling.",
    long_about = "A program for the stochastic simulation of chemical reaction networks,
scheduling reactions in groups with heterogeneous rate refresh policies.
The program takes in as input several data files, in the format:

A = 6
B = 8
C = 0
A + B -> C, 0.05
-> A, 2.0 @ 0.5

The system above has three chemical species, A, B, and C.
A and B can react to form C, and the reaction rate is 0.05.
A is also synthesized at rate 2.0; the trailing tag declares that this
rate may be treated as constant over windows of duration 0.5, letting the
solver precompute its firings in batches.",
    styles = CLAP_STYLING,
)]
struct Cli {
    /// The amount of time to simulate.
    time: f64,

    /// The path to the files specifying the chemical reaction network.
    #[arg(num_args = 1.., )]
    data: Vec<PathBuf>,

    /// How often to sample and store the state.
    /// If not given, only the final state is stored.
    #[arg(short, long)]
    samples: Option<u64>,

    /// Whether to count the number of reactions.
    #[arg(long)]
    count_reactions: bool,

    /// Whether to count the cpu time.
    #[arg(long)]
    cpu_time: bool,

    /// Whether to skip printing the final state.
    #[arg(long)]
    no_print_state: bool,

    /// The algorithm to use to simulate the system.
    #[arg(long)]
    algorithm: Option<Algorithm>,

    /// The seed to use for random number generation.
    #[arg(long)]
    seed: Option<u64>,
}

fn run_with_solver(args: &Cli, names: &[String], mut solver: impl Solver) {
    let time = args.time;
    let start_time = SystemTime::now();
    let sample_count = args.samples.unwrap_or(1);
    let mut samples = Vec::new();
    samples.push((solver.state().to_owned(), 0, 0.));

    for idx in 1..=sample_count {
        solver.advance_until(time * idx as f64 / sample_count as f64);
        samples.push((
            solver.state().to_owned(),
            solver.number_reactions_performed(),
            start_time.elapsed().unwrap().as_secs_f32(),
        ));
    }

    // Printing the sampled states to stdout, to be redirected as desired.
    print!("time");
    if !args.no_print_state {
        for name in names {
            print!("\t{name}");
        }
    }
    if args.count_reactions {
        print!("\treaction_count");
    }
    if args.cpu_time {
        print!("\tcpu_time");
    }
    println!();
    for (idx, (state, total_reactions, cpu_time)) in samples.into_iter().enumerate() {
        print!("{}", idx as f64 / sample_count as f64 * time);
        if !args.no_print_state {
            for count in state {
                print!("\t{count}");
            }
        }
        if args.count_reactions {
            print!("\t{total_reactions}");
        }
        if args.cpu_time {
            print!("\t{cpu_time:.3}")
        }
        println!();
    }
}

fn run_cli(args: Cli) {
    let mut parse_state = ParseState::default();
    for path in &args.data {
        parse_state.parse_data_file(path);
    }
    let (initial_state, reactions, names, classification) = parse_state.get_network();

    let random = match args.seed {
        Some(seed) => RandomHandler::from_seed(seed),
        None => RandomHandler::from_seed(rng().random()),
    };
    let dependence_graph = ReactionGraph::from_reactions(initial_state.len(), &reactions);

    match args.algorithm.unwrap_or_default() {
        Algorithm::Gillespie => run_with_solver(
            &args,
            &names,
            GillespieSolver::new(initial_state, reactions, dependence_graph, 0., random),
        ),
        Algorithm::Dispatch => run_with_solver(
            &args,
            &names,
            ManualDispatchSolver::new(
                initial_state,
                reactions,
                &classification,
                dependence_graph,
                0.,
                random,
            ),
        ),
    }
}

pub fn main() {
    run_cli(Cli::parse());
}
