pub mod game_tester;
pub mod reports;
pub mod simulation;
pub mod tester;

pub use game_tester::{
    DEFAULT_PLAYERS, DEFAULT_ROUNDS, GameTester, SimulationPlan, SimulationSummary,
};
pub use tester::*;
