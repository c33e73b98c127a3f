pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use policy::CareStrategy;
pub use seeds::resolve_seed_inputs;
pub use simulation::{GameTester, PlayerPlan, SimulationPlan, SimulationSummary};
pub use tester::*;
