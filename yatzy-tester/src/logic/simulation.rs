use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use std::collections::BTreeMap;
use yatzy_game::constants::{BONUS_POINTS, BONUS_THRESHOLD};
use yatzy_game::{
    Category, CategoryRule, GameError, GameState, MemoryStorage, RoundCompletion, ScoreKeeper,
};

/// Configuration for a simulated table.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub players: usize,
    pub rounds: usize,
    /// Chance of typing a bad value into a cell before correcting it.
    pub typo_rate: f64,
}

impl SimulationConfig {
    #[must_use]
    pub const fn new(seed: u64, players: usize, rounds: usize) -> Self {
        Self {
            seed,
            players,
            rounds,
            typo_rate: 0.05,
        }
    }

    #[must_use]
    pub const fn with_typo_rate(mut self, typo_rate: f64) -> Self {
        self.typo_rate = typo_rate;
        self
    }
}

/// What happened in one simulated round.
#[derive(Debug, Clone, Default)]
pub struct RoundRecord {
    pub round: usize,
    /// Totals recomputed from the entered values, without the engine.
    pub expected_totals: BTreeMap<String, i64>,
    pub typos: usize,
    /// Cells the engine reported when the round was first submitted.
    pub flagged_cells: usize,
    pub blocked_attempts: usize,
}

/// A value the category accepts, drawn the way a real score would be.
pub fn random_valid_value(category: Category, rng: &mut ChaCha20Rng) -> i64 {
    let rule = CategoryRule::for_category(category);
    if let Some(face) = category.face_value() {
        return face * rng.gen_range(0..=5);
    }
    if let Some(fixed) = rule.fixed {
        return if rng.gen_bool(0.5) { fixed } else { 0 };
    }
    rng.gen_range(0..=rule.max.unwrap_or(0))
}

/// Input the category must reject.
pub fn random_invalid_input(category: Category, rng: &mut ChaCha20Rng) -> String {
    let rule = CategoryRule::for_category(category);
    let mut options = vec!["-1".to_string(), "x".to_string(), "1.5".to_string()];
    if let Some(max) = rule.max {
        options.push((max + 1).to_string());
    }
    if let Some(divisor) = rule.divisor
        && divisor > 1
    {
        options.push((divisor + 1).to_string());
    }
    if let Some(fixed) = rule.fixed {
        options.push((fixed - 1).to_string());
    }
    options
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| "-1".to_string())
}

fn expected_total(values: &BTreeMap<Category, i64>) -> i64 {
    let upper: i64 = Category::UPPER.iter().filter_map(|c| values.get(c)).sum();
    let lower: i64 = Category::LOWER.iter().filter_map(|c| values.get(c)).sum();
    let bonus = if upper > BONUS_THRESHOLD { BONUS_POINTS } else { 0 };
    upper + bonus + lower
}

/// Drives a [`ScoreKeeper`] through full rounds of random but legal scores.
pub struct SimulationSession {
    keeper: ScoreKeeper<MemoryStorage>,
    config: SimulationConfig,
    rng: ChaCha20Rng,
}

impl SimulationSession {
    #[must_use]
    pub fn new(config: SimulationConfig, rng: ChaCha20Rng) -> Self {
        Self {
            keeper: ScoreKeeper::with_seed(MemoryStorage::new(), config.seed),
            config,
            rng,
        }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        self.keeper.state()
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.keeper.into_state()
    }

    /// Seat the players.
    ///
    /// # Errors
    ///
    /// Returns an error if the generated roster is rejected.
    pub fn seat_players(&mut self) -> Result<Vec<String>, GameError> {
        let names: Vec<String> = (1..=self.config.players)
            .map(|i| format!("Player {i}"))
            .collect();
        self.keeper.start(&names)?;
        Ok(names)
    }

    /// Fill and close the current round, correcting any typos after the
    /// first blocked submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects an edit.
    pub fn play_round(&mut self) -> Result<RoundRecord, GameError> {
        let mut record = RoundRecord {
            round: self.keeper.current_round(),
            ..RoundRecord::default()
        };
        let players = self.keeper.players().to_vec();
        let mut typos: Vec<(String, Category, i64)> = Vec::new();

        for player in &players {
            let mut values = BTreeMap::new();
            for category in Category::ALL {
                let value = random_valid_value(category, &mut self.rng);
                values.insert(category, value);
                if self.rng.gen_bool(self.config.typo_rate) {
                    let typo = random_invalid_input(category, &mut self.rng);
                    self.keeper.edit_cell(player, category, &typo)?;
                    typos.push((player.clone(), category, value));
                } else {
                    self.keeper
                        .edit_cell(player, category, &value.to_string())?;
                }
            }
            record
                .expected_totals
                .insert(player.clone(), expected_total(&values));
        }
        record.typos = typos.len();

        // Every typo has to block the round until it is corrected.
        if !typos.is_empty() {
            if let RoundCompletion::Blocked { errors } = self.keeper.finish_round()? {
                record.blocked_attempts += 1;
                record.flagged_cells = errors.values().map(BTreeMap::len).sum();
            }
            for (player, category, value) in &typos {
                self.keeper
                    .edit_cell(player, *category, &value.to_string())?;
            }
        }

        if let RoundCompletion::Blocked { errors } = self.keeper.finish_round()? {
            log::warn!("round {} still blocked: {errors:?}", record.round + 1);
            record.blocked_attempts += 1;
        }
        Ok(record)
    }

    /// Play every configured round, starting a new one from the scoreboard.
    ///
    /// # Errors
    ///
    /// Propagates the first engine error.
    pub fn run(&mut self) -> Result<Vec<RoundRecord>, GameError> {
        self.seat_players()?;
        let mut records = Vec::with_capacity(self.config.rounds);
        for round in 0..self.config.rounds {
            if round > 0 {
                self.keeper.play_new_round()?;
            }
            records.push(self.play_round()?);
        }
        Ok(records)
    }
}
