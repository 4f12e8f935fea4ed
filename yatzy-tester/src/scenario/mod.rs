pub mod catalog;

use crate::logic::{DEFAULT_PLAYERS, DEFAULT_ROUNDS, SimulationPlan};

/// Table size used by the simulated scenarios.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioOptions {
    pub players: usize,
    pub rounds: usize,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            players: DEFAULT_PLAYERS,
            rounds: DEFAULT_ROUNDS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

pub fn get_scenario(name: &str, options: ScenarioOptions) -> Option<TestScenario> {
    let requested = name.to_lowercase();
    let key = ALIASES
        .iter()
        .find(|(alias, _)| *alias == requested)
        .map_or(requested.as_str(), |(_, target)| *target);
    let (key, description) = SCENARIOS.iter().find(|(candidate, _)| *candidate == key)?;
    let plan = catalog::plan_for(key, options)?;
    Some(TestScenario::simulation(format!("{description} ({key})"), plan))
}

static SCENARIOS: [(&str, &str); 10] = [
    ("smoke", "Smoke Test"),
    ("upper-bonus", "Upper Section Bonus"),
    ("divisibility", "Upper Section Divisibility"),
    ("fixed-scores", "Fixed Lower Scores"),
    ("lower-caps", "Lower Section Maxima"),
    ("round-ties", "Round Winner Ties"),
    ("overall-by-round-wins", "Overall Winner by Round Wins"),
    ("roster-errors", "Roster Validation"),
    ("persistence", "Save and Restore"),
    ("random-play", "Random Valid Play"),
];

static ALIASES: [(&str, &str); 5] = [
    ("bonus", "upper-bonus"),
    ("fixed", "fixed-scores"),
    ("ties", "round-ties"),
    ("overall", "overall-by-round-wins"),
    ("random", "random-play"),
];

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS.to_vec()
}
