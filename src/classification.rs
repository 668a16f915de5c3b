use derive_new::new;

/// How often the rates of a class of reactions must be refreshed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeStep {
    /// Rates are recomputed after every reaction that may affect them.
    AlwaysUpdated,
    /// Rates are treated as constant over windows of the given duration.
    Constant(f64),
}

/// One scheduling class: a set of reactions sharing a rate refresh policy.
#[derive(Clone, Debug, new)]
pub struct ReactionClass {
    pub time_step: TimeStep,
    /// The global indices of the reactions in the class.
    pub reactions: Vec<usize>,
}

/// A partition of a reaction network into scheduling classes.
///
/// Every reaction belongs to exactly one class; reactions tagged with the
/// same constant window duration share a class, and all always-updated
/// reactions share one.
#[derive(Clone, Debug, Default)]
pub struct ReactionClassification {
    classes: Vec<ReactionClass>,
}

impl ReactionClassification {
    /// Adds the reaction to the class with the given time step, creating the
    /// class if it does not exist yet.
    pub fn classify(&mut self, reaction: usize, time_step: TimeStep) {
        let class = self.class_for(time_step);
        self.classes[class].reactions.push(reaction);
    }

    /// The index of the class with the given time step, created on demand.
    pub fn class_for(&mut self, time_step: TimeStep) -> usize {
        match self
            .classes
            .iter()
            .position(|class| class.time_step == time_step)
        {
            Some(idx) => idx,
            None => {
                self.classes.push(ReactionClass::new(time_step, Vec::new()));
                self.classes.len() - 1
            }
        }
    }

    /// A classification putting all the reactions in a single class.
    pub fn uniform(reaction_count: usize, time_step: TimeStep) -> ReactionClassification {
        ReactionClassification {
            classes: vec![ReactionClass::new(
                time_step,
                (0..reaction_count).collect(),
            )],
        }
    }

    pub fn classes(&self) -> &[ReactionClass] {
        &self.classes
    }

    pub fn number_classes(&self) -> usize {
        self.classes.len()
    }
}
