use crate::classification::{ReactionClassification, TimeStep};
use crate::reaction::ChemicalReaction;
use derive_new::new;
use itertools::Itertools;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{digit0, digit1, multispace0},
    combinator::{map_res, opt},
    multi::separated_list0,
    number::complete::double,
    sequence::{delimited, preceded},
    AsChar, IResult, Parser,
};
use num_traits::Zero;
use rustc_hash::FxHashMap;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};
use tinyvec::ArrayVec;

/// The result of parsing a line defining a new reaction.
#[derive(Clone, Debug)]
struct NamedReaction {
    inputs: Vec<(String, u64)>,
    outputs: Vec<(String, u64)>,
    rate: f64,
    /// The constant-rate window tagged onto the reaction, if any.
    time_step: Option<f64>,
}

/// The result of parsing a line setting the initial value of a reactant.
#[derive(Clone, Debug, new)]
struct Reactant {
    name: String,
    amount: u64,
}

#[derive(Default)]
pub struct ParseState {
    initial_states: FxHashMap<String, u64>,
    reactions: Vec<NamedReaction>,
}

/// An enum storing the result of parsing a line.
enum Line {
    Reactant(Reactant),
    Reaction(NamedReaction),
}

/// A parser for a nonnegative decimal number.
pub fn decimal(data: &str) -> IResult<&str, u64> {
    map_res(digit1, |s: &str| s.parse::<u64>()).parse(data)
}

/// Parses a line of the form:
/// ```ignore
/// A = 5
/// ```
/// that sets the initial value of the reactant `A` to 5.
fn parse_reactant(data: &str) -> IResult<&str, Line> {
    let (rem, (name, _, _, _, amount)) = (
        take_while1(AsChar::is_alphanum),
        multispace0,
        tag("="),
        multispace0,
        decimal,
    )
        .parse(data)?;

    Ok((rem, Line::Reactant(Reactant::new(name.to_owned(), amount))))
}

/// Parses a term of the form `2A`.
fn parse_reaction_item(data: &str) -> IResult<&str, (String, u64)> {
    let (rem, num): (&str, u64) = map_res(digit0, |s: &str| {
        if s.is_empty() {
            Ok(1)
        } else {
            s.parse::<u64>()
        }
    })
    .parse(data)?;
    let (rem, name) = take_while1(AsChar::is_alphanum).parse(rem)?;

    Ok((rem, (name.to_owned(), num)))
}

/// Parses one-half of a reaction:
/// ```ignore
/// 2A + B
/// ```
fn parse_reaction_half(data: &str) -> IResult<&str, Vec<(String, u64)>> {
    separated_list0(
        delimited(multispace0, tag("+"), multispace0),
        parse_reaction_item,
    )
    .parse(data)
}

/// A parser for a full reaction, of the form:
/// ```ignore
/// 2A + B -> 3C, 3.5e-9
/// ```
/// An optional trailing `@ 0.5` declares that the reaction's rate may be
/// treated as constant over windows of the given duration; reactions tagged
/// with the same duration are scheduled together.
fn parse_reaction(reaction: &str) -> IResult<&str, Line> {
    let (rem, (left_half, _, right_half, _, rate, time_step)) = (
        parse_reaction_half,
        delimited(multispace0, tag("->"), multispace0),
        parse_reaction_half,
        delimited(multispace0, tag(","), multispace0),
        double,
        opt(preceded(
            delimited(multispace0, tag("@"), multispace0),
            double,
        )),
    )
        .parse(reaction)?;

    let res = NamedReaction {
        inputs: left_half,
        outputs: right_half,
        rate,
        time_step,
    };

    Ok((rem, Line::Reaction(res)))
}

fn parse_line(line: &str) -> IResult<&str, Line> {
    alt((parse_reactant, parse_reaction)).parse(line)
}

fn named_to_reaction(
    named_reaction: &NamedReaction,
    reactant_names: &FxHashMap<String, usize>,
) -> ChemicalReaction {
    let mut inputs = ArrayVec::new();
    for (comp, count) in &named_reaction.inputs {
        let comp = *reactant_names.get(comp).unwrap_or_else(||panic!("Failed to parse the reaction: \"{named_reaction:?}\": The reactant \"{comp:?}\" is undefined!"));
        if inputs
            .last()
            .is_some_and(|&(last_comp, _)| last_comp == comp)
        {
            inputs.last_mut().unwrap().1 += *count;
        } else {
            inputs.push((comp, *count));
        }
    }

    let outputs = named_reaction
        .outputs
        .iter()
        .map(|(s, count)| {
            let comp = *reactant_names.get(s).unwrap_or_else(||panic!("Failed to parse the reaction: \"{named_reaction:?}\": The reactant \"{s:?}\" is undefined!"));
            (comp, *count as i64)
        })
        .collect_vec();

    // Computing an iterator over the differences, and merging it to a single stoichiometry vector.
    let in_diff = inputs.iter().map(|(idx, count)| (*idx, -(*count as i64)));
    let all_diff = in_diff.chain(outputs.into_iter()).sorted();
    let mut stoichiometry: ArrayVec<[(usize, i64); 4]> = ArrayVec::new();
    for (idx, diff) in all_diff {
        if stoichiometry.is_empty() || stoichiometry.last().unwrap().0 < idx {
            stoichiometry.push((idx, diff));
        } else {
            stoichiometry.last_mut().unwrap().1 += diff;
        }
    }
    let stoichiometry = stoichiometry
        .iter()
        .filter(|(_, diff)| !diff.is_zero())
        .copied()
        .collect();

    ChemicalReaction::new(inputs, stoichiometry, named_reaction.rate)
}

impl ParseState {
    /// Parses model-definition text.
    /// The text contains lines, each of which is either a definition of the initial state of a reactant:
    /// ```ignore
    /// A = 5
    /// B = 7
    /// ```
    /// or a reaction, with an optional constant-window tag:
    /// ```ignore
    /// A + B -> C, 0.05
    /// 2B -> A, 1e-3 @ 0.5
    /// ```
    pub fn parse_str(&mut self, data: &str) -> &mut Self {
        data.lines()
            .filter(|line| !line.trim().is_empty() && !line.trim().starts_with("#"))
            .map(|line| {
                parse_line(line)
                    .unwrap_or_else(|err| {
                        panic!("Failed to parse the line {line} with error {err:?}")
                    })
                    .1
            })
            .for_each(|line| match line {
                Line::Reactant(reactant) => {
                    self.initial_states.insert(reactant.name, reactant.amount);
                }
                Line::Reaction(named_reaction) => {
                    self.reactions.push(named_reaction);
                }
            });
        self
    }

    /// Parses a data file in the format accepted by [`ParseState::parse_str`].
    pub fn parse_data_file(&mut self, reactions_path: &Path) -> &mut Self {
        let data = BufReader::new(
            File::open(reactions_path)
                .unwrap_or_else(|err| panic!("Failed to open {reactions_path:?}: {err:?}!")),
        )
        .lines()
        .map_while(|line| line.ok())
        .join("\n");
        self.parse_str(&data)
    }

    /// Gets the reaction network.
    /// The network has four components:
    /// * The initial state.
    /// * The reactions.
    /// * The name of each reactant.
    /// * The classification of the reactions into scheduling classes.
    pub fn get_network(
        self,
    ) -> (
        Vec<i64>,
        Vec<ChemicalReaction>,
        Vec<String>,
        ReactionClassification,
    ) {
        let mut reactant_name_map = FxHashMap::default();
        let mut reactant_names = Vec::default();
        let mut initial_state = Vec::default();
        let mut reactions = Vec::default();
        let mut classification = ReactionClassification::default();

        for (idx, (reactant_name, initial_val)) in self.initial_states.into_iter().enumerate() {
            reactant_name_map.insert(reactant_name.clone(), idx);
            initial_state.push(initial_val as i64);
            reactant_names.push(reactant_name.clone());
        }

        for (idx, named_reaction) in self.reactions.iter().enumerate() {
            reactions.push(named_to_reaction(named_reaction, &reactant_name_map));
            let time_step = match named_reaction.time_step {
                Some(duration) => TimeStep::Constant(duration),
                None => TimeStep::AlwaysUpdated,
            };
            classification.classify(idx, time_step);
        }

        (initial_state, reactions, reactant_names, classification)
    }
}
