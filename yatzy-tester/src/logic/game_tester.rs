use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use yatzy_game::{GameState, Scoreboard};

use crate::logic::simulation::{RoundRecord, SimulationConfig, SimulationSession};

pub const DEFAULT_PLAYERS: usize = 3;
pub const DEFAULT_ROUNDS: usize = 3;

#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub players: usize,
    pub rounds: usize,
    pub typo_rate: f64,
    pub setup: Option<fn(&mut GameState)>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(players: usize, rounds: usize) -> Self {
        Self {
            players,
            rounds,
            typo_rate: 0.05,
            setup: None,
            expectations: Vec::new(),
        }
    }

    /// A plan that plays nothing; expectations exercise the engine directly.
    #[must_use]
    pub const fn checks_only() -> Self {
        Self::new(0, 0)
    }

    #[must_use]
    pub const fn with_typo_rate(mut self, typo_rate: f64) -> Self {
        self.typo_rate = typo_rate;
        self
    }

    #[must_use]
    pub fn with_setup(mut self, setup: fn(&mut GameState)) -> Self {
        self.setup = Some(setup);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub rounds: Vec<RoundRecord>,
    pub final_state: GameState,
    pub scoreboard: Scoreboard,
    /// Set when the engine refused an operation mid-run.
    pub error: Option<String>,
}

impl SimulationSummary {
    #[must_use]
    pub fn typo_count(&self) -> usize {
        self.rounds.iter().map(|r| r.typos).sum()
    }
}

/// Headless deterministic runner for the scorekeeping engine.
#[derive(Debug, Clone, Copy)]
pub struct GameTester {
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        let config = SimulationConfig::new(seed, plan.players, plan.rounds)
            .with_typo_rate(plan.typo_rate);
        let mut session = SimulationSession::new(config, ChaCha20Rng::seed_from_u64(seed));

        if plan.players == 0 || plan.rounds == 0 {
            let mut final_state = session.into_state();
            if let Some(setup) = plan.setup {
                setup(&mut final_state);
            }
            return SimulationSummary {
                seed,
                rounds: Vec::new(),
                scoreboard: final_state.scoreboard(),
                final_state,
                error: None,
            };
        }

        let (rounds, error) = match session.run() {
            Ok(rounds) => (rounds, None),
            Err(err) => (Vec::new(), Some(err.to_string())),
        };
        let mut final_state = session.into_state();
        if let Some(setup) = plan.setup {
            setup(&mut final_state);
        }

        if self.verbose {
            log::info!(
                "seed {seed}: {} round(s), {} player(s), page {}",
                final_state.round_count(),
                final_state.players().len(),
                final_state.page()
            );
        }

        SimulationSummary {
            seed,
            rounds,
            scoreboard: final_state.scoreboard(),
            final_state,
            error,
        }
    }
}
