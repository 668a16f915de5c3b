mod constant_rate;
mod dispatch;
mod gillespie;
mod group;
mod updated_rate;

pub use constant_rate::ConstantRateGroup;
pub use dispatch::{GroupEvent, GroupId, ManualDispatchSolver};
pub use gillespie::GillespieSolver;
pub use group::{ReactionGroup, NO_REACTION_LEFT};
pub use updated_rate::UpdatedRateGroup;
