use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use thiserror::Error;

use crate::category::Category;
use crate::colors::{assign_colors, next_color};
use crate::score::{PlayerScores, RoundTotals, ScoreEntry};
use crate::standings::Scoreboard;
use crate::validation::{CellError, should_display, validate_scores};

/// Score sheets for every player in one round, keyed by player name.
pub type RoundScores = BTreeMap<String, PlayerScores>;

/// Which screen the game is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    /// Filling in the current round's score sheet.
    #[default]
    Game,
    /// Reviewing completed-round results.
    Scoreboard,
}

impl Page {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Game => "game",
            Self::Scoreboard => "scoreboard",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Problems with the roster submitted to start a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RosterError {
    #[error("Duplicate player names are not allowed.")]
    DuplicateNames,
    #[error("Please enter at least one player")]
    EmptyRoster,
}

/// Operations called outside their preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("no game is in progress")]
    NoActiveGame,
    #[error("unknown player: {0}")]
    UnknownPlayer(String),
    #[error("round {index} does not exist (game has {count} rounds)")]
    RoundOutOfRange { index: usize, count: usize },
    #[error("a new round can only be started from the scoreboard")]
    NotOnScoreboard,
    #[error("scores can only be edited while the score sheet is shown")]
    SheetClosed,
}

/// Result of asking to finish the current round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundCompletion {
    /// Every cell validated; the scoreboard is now shown.
    Finished,
    /// Some cells are invalid; the sheet stays open and the errors are listed.
    Blocked {
        errors: BTreeMap<String, BTreeMap<Category, CellError>>,
    },
}

impl RoundCompletion {
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Trim names, drop blanks and reject duplicates.
///
/// # Errors
///
/// Returns [`RosterError::DuplicateNames`] when two trimmed names match
/// (checked first) and [`RosterError::EmptyRoster`] when nothing is left.
pub fn normalize_roster<I, S>(names: I) -> Result<Vec<String>, RosterError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let roster: Vec<String> = names
        .into_iter()
        .map(|name| name.as_ref().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    let mut seen = HashSet::with_capacity(roster.len());
    if !roster.iter().all(|name| seen.insert(name.as_str())) {
        return Err(RosterError::DuplicateNames);
    }
    if roster.is_empty() {
        return Err(RosterError::EmptyRoster);
    }
    Ok(roster)
}

fn blank_round(players: &[String]) -> RoundScores {
    players
        .iter()
        .map(|player| (player.clone(), PlayerScores::new()))
        .collect()
}

/// The whole scorekeeping state for one table.
///
/// An empty roster means no game has been started. While a game is active
/// `current_round` always indexes into `scores_per_round`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) players: Vec<String>,
    pub(crate) scores_per_round: Vec<RoundScores>,
    pub(crate) current_round: usize,
    pub(crate) player_colors: BTreeMap<String, String>,
    pub(crate) page: Page,
    pub(crate) submit_attempted: bool,
    pub(crate) rng: ChaCha20Rng,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            players: Vec::new(),
            scores_per_round: Vec::new(),
            current_round: 0,
            player_colors: BTreeMap::new(),
            page: Page::Game,
            submit_attempted: false,
            rng: ChaCha20Rng::from_entropy(),
        }
    }
}

impl GameState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reseed the RNG used for color assignment.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha20Rng::seed_from_u64(seed);
        self
    }

    // Accessors

    #[must_use]
    pub fn has_game(&self) -> bool {
        !self.players.is_empty()
    }

    #[must_use]
    pub fn players(&self) -> &[String] {
        &self.players
    }

    #[must_use]
    pub const fn current_round(&self) -> usize {
        self.current_round
    }

    #[must_use]
    pub fn round_count(&self) -> usize {
        self.scores_per_round.len()
    }

    #[must_use]
    pub fn is_last_round(&self) -> bool {
        self.current_round + 1 == self.scores_per_round.len()
    }

    #[must_use]
    pub const fn page(&self) -> Page {
        self.page
    }

    #[must_use]
    pub const fn submit_attempted(&self) -> bool {
        self.submit_attempted
    }

    #[must_use]
    pub const fn player_colors(&self) -> &BTreeMap<String, String> {
        &self.player_colors
    }

    #[must_use]
    pub fn rounds(&self) -> &[RoundScores] {
        &self.scores_per_round
    }

    #[must_use]
    pub fn current_scores(&self) -> Option<&RoundScores> {
        self.scores_per_round.get(self.current_round)
    }

    #[must_use]
    pub fn player_scores(&self, round: usize, player: &str) -> Option<&PlayerScores> {
        self.scores_per_round.get(round)?.get(player)
    }

    /// Current validation error of a cell in the current round.
    #[must_use]
    pub fn cell_error(&self, player: &str, category: Category) -> Option<CellError> {
        self.player_scores(self.current_round, player)?
            .get(category)
            .validate(category)
            .err()
    }

    /// Like [`Self::cell_error`], but `Required` stays hidden until the cell
    /// has been typed in or a submission was attempted.
    #[must_use]
    pub fn visible_cell_error(&self, player: &str, category: Category) -> Option<CellError> {
        let entry = self
            .player_scores(self.current_round, player)?
            .get(category);
        entry
            .validate(category)
            .err()
            .filter(|err| should_display(*err, entry, self.submit_attempted))
    }

    /// Every failing cell in the current round, by player then category.
    #[must_use]
    pub fn current_round_errors(&self) -> BTreeMap<String, BTreeMap<Category, CellError>> {
        let Some(round) = self.current_scores() else {
            return BTreeMap::new();
        };
        self.players
            .iter()
            .filter_map(|player| {
                let errors = round.get(player).map_or_else(
                    || {
                        Category::ALL
                            .into_iter()
                            .map(|category| (category, CellError::Required))
                            .collect()
                    },
                    validate_scores,
                );
                (!errors.is_empty()).then(|| (player.clone(), errors))
            })
            .collect()
    }

    #[must_use]
    pub fn all_fields_valid(&self) -> bool {
        self.has_game() && self.current_round_errors().is_empty()
    }

    /// Sums for every player in a round.
    #[must_use]
    pub fn round_totals(&self, round: usize) -> Option<BTreeMap<String, RoundTotals>> {
        let scores = self.scores_per_round.get(round)?;
        Some(
            self.players
                .iter()
                .map(|player| {
                    let totals = scores
                        .get(player)
                        .map(PlayerScores::totals)
                        .unwrap_or_default();
                    (player.clone(), totals)
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn current_totals(&self) -> Option<BTreeMap<String, RoundTotals>> {
        self.round_totals(self.current_round)
    }

    #[must_use]
    pub fn scoreboard(&self) -> Scoreboard {
        Scoreboard::from_state(self)
    }

    fn require_game(&self) -> Result<(), GameError> {
        if self.has_game() {
            Ok(())
        } else {
            Err(GameError::NoActiveGame)
        }
    }

    fn require_player(&self, player: &str) -> Result<(), GameError> {
        self.require_game()?;
        if self.players.iter().any(|p| p == player) {
            Ok(())
        } else {
            Err(GameError::UnknownPlayer(player.to_string()))
        }
    }

    // Transitions

    /// Start a new game with the given names.
    ///
    /// # Errors
    ///
    /// Returns a [`RosterError`] when the names are duplicated or all blank;
    /// the current state is left untouched in that case.
    pub fn start<I, S>(&mut self, names: I) -> Result<(), RosterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let players = normalize_roster(names)?;
        self.player_colors = assign_colors(&players, &mut self.rng);
        self.scores_per_round = vec![blank_round(&players)];
        self.players = players;
        self.current_round = 0;
        self.page = Page::Game;
        self.submit_attempted = false;
        log::info!("started game with {} player(s)", self.players.len());
        Ok(())
    }

    /// Store raw input for one cell of the current round. No validation
    /// happens here.
    ///
    /// # Errors
    ///
    /// Fails when no game is running, the player is unknown, or the
    /// scoreboard is showing.
    pub fn edit_cell(
        &mut self,
        player: &str,
        category: Category,
        raw: &str,
    ) -> Result<(), GameError> {
        self.require_player(player)?;
        if self.page != Page::Game {
            return Err(GameError::SheetClosed);
        }
        let count = self.scores_per_round.len();
        let round = self
            .scores_per_round
            .get_mut(self.current_round)
            .ok_or(GameError::RoundOutOfRange {
                index: self.current_round,
                count,
            })?;
        round
            .entry(player.to_string())
            .or_default()
            .set(category, ScoreEntry::parse(raw));
        Ok(())
    }

    /// Close the current round if every cell validates.
    ///
    /// # Errors
    ///
    /// Fails only when no game is running.
    pub fn finish_round(&mut self) -> Result<RoundCompletion, GameError> {
        self.require_game()?;
        let errors = self.current_round_errors();
        if errors.is_empty() {
            self.page = Page::Scoreboard;
            log::debug!("round {} finished", self.current_round + 1);
            Ok(RoundCompletion::Finished)
        } else {
            self.submit_attempted = true;
            log::debug!(
                "round {} blocked by invalid cells for {} player(s)",
                self.current_round + 1,
                errors.len()
            );
            Ok(RoundCompletion::Blocked { errors })
        }
    }

    /// Append a blank round and switch to it. Returns the new round index.
    ///
    /// # Errors
    ///
    /// Fails unless the scoreboard is showing.
    pub fn play_new_round(&mut self) -> Result<usize, GameError> {
        self.require_game()?;
        if self.page != Page::Scoreboard {
            return Err(GameError::NotOnScoreboard);
        }
        self.scores_per_round.push(blank_round(&self.players));
        self.current_round = self.scores_per_round.len() - 1;
        self.page = Page::Game;
        self.submit_attempted = false;
        log::debug!("round {} started", self.current_round + 1);
        Ok(self.current_round)
    }

    /// Reopen a round's score sheet.
    ///
    /// # Errors
    ///
    /// Fails when no game is running or the index is out of range.
    pub fn go_to_round(&mut self, index: usize) -> Result<(), GameError> {
        self.require_game()?;
        let count = self.scores_per_round.len();
        if index >= count {
            return Err(GameError::RoundOutOfRange { index, count });
        }
        self.current_round = index;
        self.page = Page::Game;
        Ok(())
    }

    /// Forget the game entirely.
    pub fn reset(&mut self) {
        self.players.clear();
        self.scores_per_round.clear();
        self.player_colors.clear();
        self.current_round = 0;
        self.page = Page::Game;
        self.submit_attempted = false;
        log::info!("game reset");
    }

    /// Override a player's display color.
    ///
    /// # Errors
    ///
    /// Fails when the player is not in the game.
    pub fn set_player_color(
        &mut self,
        player: &str,
        color: impl Into<String>,
    ) -> Result<(), GameError> {
        self.require_player(player)?;
        self.player_colors.insert(player.to_string(), color.into());
        Ok(())
    }

    /// Give a player a different palette color and return it.
    ///
    /// # Errors
    ///
    /// Fails when the player is not in the game.
    pub fn cycle_player_color(&mut self, player: &str) -> Result<String, GameError> {
        self.require_player(player)?;
        let color = next_color(&self.player_colors, player, &mut self.rng);
        self.player_colors.insert(player.to_string(), color.clone());
        Ok(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(names: &[&str]) -> GameState {
        let mut state = GameState::new().with_seed(42);
        state.start(names.iter().copied()).unwrap();
        state
    }

    fn fill_valid(state: &mut GameState, player: &str) {
        for category in Category::ALL {
            state.edit_cell(player, category, "0").unwrap();
        }
    }

    #[test]
    fn roster_is_trimmed_and_blank_names_dropped() {
        let roster = normalize_roster(["  Alice ", "", "Bob", "   "]).unwrap();
        assert_eq!(roster, vec!["Alice".to_string(), "Bob".to_string()]);
    }

    #[test]
    fn roster_errors_prefer_duplicates() {
        assert_eq!(
            normalize_roster(["Alice", " Alice"]),
            Err(RosterError::DuplicateNames)
        );
        assert_eq!(normalize_roster(["", "  "]), Err(RosterError::EmptyRoster));
        assert_eq!(
            normalize_roster(Vec::<String>::new()),
            Err(RosterError::EmptyRoster)
        );
        assert_eq!(
            RosterError::EmptyRoster.to_string(),
            "Please enter at least one player"
        );
    }

    #[test]
    fn failed_start_leaves_state_alone() {
        let mut state = started(&["Alice"]);
        assert_eq!(state.start(["Bob", "Bob"]), Err(RosterError::DuplicateNames));
        assert_eq!(state.players(), ["Alice".to_string()]);
    }

    #[test]
    fn start_creates_a_blank_first_round() {
        let state = started(&["Alice", "Bob"]);
        assert!(state.has_game());
        assert_eq!(state.round_count(), 1);
        assert_eq!(state.current_round(), 0);
        assert_eq!(state.page(), Page::Game);
        assert!(!state.submit_attempted());
        let round = state.current_scores().unwrap();
        assert_eq!(round.len(), 2);
        assert!(round.values().all(PlayerScores::is_blank));
        assert_eq!(state.player_colors().len(), 2);
        assert_ne!(
            state.player_colors().get("Alice"),
            state.player_colors().get("Bob")
        );
    }

    #[test]
    fn edits_update_only_the_current_round() {
        let mut state = started(&["Alice"]);
        state.edit_cell("Alice", Category::Twos, "3").unwrap();
        assert_eq!(
            state.cell_error("Alice", Category::Twos),
            Some(CellError::NotDivisible { divisor: 2 })
        );
        state.edit_cell("Alice", Category::Twos, "4").unwrap();
        assert_eq!(state.cell_error("Alice", Category::Twos), None);
        assert_eq!(
            state.player_scores(0, "Alice").unwrap().get(Category::Twos),
            &ScoreEntry::Value(4)
        );
    }

    #[test]
    fn edit_rejects_unknown_players_and_closed_sheets() {
        let mut state = GameState::new();
        assert_eq!(
            state.edit_cell("Alice", Category::Ones, "1"),
            Err(GameError::NoActiveGame)
        );
        let mut state = started(&["Alice"]);
        assert_eq!(
            state.edit_cell("Zed", Category::Ones, "1"),
            Err(GameError::UnknownPlayer("Zed".to_string()))
        );
        fill_valid(&mut state, "Alice");
        assert!(state.finish_round().unwrap().is_finished());
        assert_eq!(
            state.edit_cell("Alice", Category::Ones, "1"),
            Err(GameError::SheetClosed)
        );
    }

    #[test]
    fn required_errors_surface_after_a_blocked_submission() {
        let mut state = started(&["Alice"]);
        assert_eq!(state.cell_error("Alice", Category::Ones), Some(CellError::Required));
        assert_eq!(state.visible_cell_error("Alice", Category::Ones), None);

        let outcome = state.finish_round().unwrap();
        let RoundCompletion::Blocked { errors } = outcome else {
            panic!("blank sheet should not finish");
        };
        assert_eq!(errors["Alice"].len(), 15);
        assert!(state.submit_attempted());
        assert_eq!(state.page(), Page::Game);
        assert_eq!(
            state.visible_cell_error("Alice", Category::Ones),
            Some(CellError::Required)
        );
    }

    #[test]
    fn finishing_requires_every_player_to_be_valid() {
        let mut state = started(&["Alice", "Bob"]);
        fill_valid(&mut state, "Alice");
        assert!(!state.all_fields_valid());
        assert!(!state.finish_round().unwrap().is_finished());
        fill_valid(&mut state, "Bob");
        assert!(state.all_fields_valid());
        assert!(state.finish_round().unwrap().is_finished());
        assert_eq!(state.page(), Page::Scoreboard);
    }

    #[test]
    fn new_round_only_from_scoreboard() {
        let mut state = started(&["Alice"]);
        assert_eq!(state.play_new_round(), Err(GameError::NotOnScoreboard));
        fill_valid(&mut state, "Alice");
        state.finish_round().unwrap();
        assert_eq!(state.play_new_round(), Ok(1));
        assert_eq!(state.round_count(), 2);
        assert_eq!(state.current_round(), 1);
        assert_eq!(state.page(), Page::Game);
        assert!(state.is_last_round());
        assert!(state.current_scores().unwrap()["Alice"].is_blank());
    }

    #[test]
    fn go_to_round_checks_range_and_reopens_sheet() {
        let mut state = started(&["Alice"]);
        fill_valid(&mut state, "Alice");
        state.finish_round().unwrap();
        state.play_new_round().unwrap();
        state.go_to_round(0).unwrap();
        assert_eq!(state.current_round(), 0);
        assert!(!state.is_last_round());
        assert_eq!(state.page(), Page::Game);
        assert_eq!(
            state.go_to_round(2),
            Err(GameError::RoundOutOfRange { index: 2, count: 2 })
        );
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = started(&["Alice", "Bob"]);
        state.edit_cell("Bob", Category::Yatzy, "50").unwrap();
        state.reset();
        assert!(!state.has_game());
        assert_eq!(state.round_count(), 0);
        assert!(state.player_colors().is_empty());
        assert!(state.current_scores().is_none());
        assert!(!state.all_fields_valid());
    }

    #[test]
    fn round_totals_cover_every_player() {
        let mut state = started(&["Alice", "Bob"]);
        for category in Category::UPPER {
            state.edit_cell("Alice", category, "12").unwrap();
        }
        let totals = state.current_totals().unwrap();
        assert_eq!(totals["Alice"].upper_sum, 72);
        assert_eq!(totals["Alice"].bonus, 35);
        assert_eq!(totals["Alice"].total, 107);
        assert_eq!(totals["Bob"].total, 0);
        assert!(state.round_totals(3).is_none());
    }

    #[test]
    fn player_colors_can_be_set_and_cycled() {
        let mut state = started(&["Alice", "Bob"]);
        state.set_player_color("Alice", "#000000").unwrap();
        assert_eq!(state.player_colors()["Alice"], "#000000");
        let fresh = state.cycle_player_color("Alice").unwrap();
        assert_ne!(fresh, "#000000");
        assert_ne!(Some(&fresh), state.player_colors().get("Bob"));
        assert_eq!(
            state.set_player_color("Zed", "#fff"),
            Err(GameError::UnknownPlayer("Zed".to_string()))
        );
    }
}
