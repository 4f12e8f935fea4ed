//! Explicit owner of the live game.
//!
//! [`ScoreKeeper`] binds a [`GameState`] to a [`GameStorage`]: it restores
//! the saved game on construction, writes a fresh snapshot after every
//! successful mutation and tells subscribers about the new state.
use std::collections::BTreeMap;
use std::fmt;

use crate::GameStorage;
use crate::category::Category;
use crate::constants::STORAGE_KEY;
use crate::snapshot::{decode_snapshot_into, encode_snapshot};
use crate::standings::Scoreboard;
use crate::state::{GameError, GameState, Page, RoundCompletion, RosterError};
use crate::validation::CellError;

type Observer = Box<dyn FnMut(&GameState)>;

pub struct ScoreKeeper<S: GameStorage> {
    state: GameState,
    storage: S,
    key: String,
    observers: Vec<Observer>,
}

impl<S: GameStorage> fmt::Debug for ScoreKeeper<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreKeeper")
            .field("state", &self.state)
            .field("key", &self.key)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl<S: GameStorage> ScoreKeeper<S> {
    /// Open the game saved under the default key, or start empty.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    #[must_use]
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self::with_base(storage, key, GameState::new())
    }

    /// Open with a seeded RNG so color assignment is reproducible.
    #[must_use]
    pub fn with_seed(storage: S, seed: u64) -> Self {
        Self::with_base(storage, STORAGE_KEY, GameState::new().with_seed(seed))
    }

    fn with_base(storage: S, key: impl Into<String>, base: GameState) -> Self {
        let key = key.into();
        let state = load_state(&storage, &key, base.clone()).unwrap_or(base);
        Self {
            state,
            storage,
            key,
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Consume the keeper, returning the live state.
    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Register a callback run after every successful mutation.
    pub fn subscribe(&mut self, observer: impl FnMut(&GameState) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn commit(&mut self) {
        self.persist();
        for observer in &mut self.observers {
            observer(&self.state);
        }
    }

    fn persist(&self) {
        let result = match encode_snapshot(&self.state) {
            Ok(Some(blob)) => self.storage.save(&self.key, &blob),
            Ok(None) => self.storage.delete(&self.key),
            Err(err) => {
                log::warn!("could not encode game state: {err}");
                return;
            }
        };
        if let Err(err) = result {
            log::warn!("could not persist game state under {}: {err}", self.key);
        }
    }

    /// # Errors
    ///
    /// See [`GameState::start`].
    pub fn start<I, T>(&mut self, names: I) -> Result<(), RosterError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.state.start(names)?;
        self.commit();
        Ok(())
    }

    /// # Errors
    ///
    /// See [`GameState::edit_cell`].
    pub fn edit_cell(
        &mut self,
        player: &str,
        category: Category,
        raw: &str,
    ) -> Result<(), GameError> {
        self.state.edit_cell(player, category, raw)?;
        self.commit();
        Ok(())
    }

    /// Attempt to close the round. A blocked attempt still changes state
    /// (errors become visible), so observers hear about both outcomes.
    ///
    /// # Errors
    ///
    /// See [`GameState::finish_round`].
    pub fn finish_round(&mut self) -> Result<RoundCompletion, GameError> {
        let outcome = self.state.finish_round()?;
        self.commit();
        Ok(outcome)
    }

    /// # Errors
    ///
    /// See [`GameState::play_new_round`].
    pub fn play_new_round(&mut self) -> Result<usize, GameError> {
        let index = self.state.play_new_round()?;
        self.commit();
        Ok(index)
    }

    /// # Errors
    ///
    /// See [`GameState::go_to_round`].
    pub fn go_to_round(&mut self, index: usize) -> Result<(), GameError> {
        self.state.go_to_round(index)?;
        self.commit();
        Ok(())
    }

    /// Drop the game and its saved blob.
    pub fn reset(&mut self) {
        self.state.reset();
        self.commit();
    }

    /// # Errors
    ///
    /// See [`GameState::set_player_color`].
    pub fn set_player_color(
        &mut self,
        player: &str,
        color: impl Into<String>,
    ) -> Result<(), GameError> {
        self.state.set_player_color(player, color)?;
        self.commit();
        Ok(())
    }

    /// # Errors
    ///
    /// See [`GameState::cycle_player_color`].
    pub fn cycle_player_color(&mut self, player: &str) -> Result<String, GameError> {
        let color = self.state.cycle_player_color(player)?;
        self.commit();
        Ok(color)
    }

    // Read-through accessors

    #[must_use]
    pub fn players(&self) -> &[String] {
        self.state.players()
    }

    #[must_use]
    pub const fn current_round(&self) -> usize {
        self.state.current_round()
    }

    #[must_use]
    pub fn round_count(&self) -> usize {
        self.state.round_count()
    }

    #[must_use]
    pub const fn page(&self) -> Page {
        self.state.page()
    }

    #[must_use]
    pub fn cell_error(&self, player: &str, category: Category) -> Option<CellError> {
        self.state.cell_error(player, category)
    }

    #[must_use]
    pub fn current_round_errors(&self) -> BTreeMap<String, BTreeMap<Category, CellError>> {
        self.state.current_round_errors()
    }

    #[must_use]
    pub fn all_fields_valid(&self) -> bool {
        self.state.all_fields_valid()
    }

    #[must_use]
    pub fn scoreboard(&self) -> Scoreboard {
        self.state.scoreboard()
    }
}

fn load_state<S: GameStorage>(storage: &S, key: &str, base: GameState) -> Option<GameState> {
    match storage.load(key) {
        Ok(Some(blob)) => {
            let state = decode_snapshot_into(&blob, base)?;
            log::debug!(
                "restored game with {} player(s) at round {}",
                state.players().len(),
                state.current_round() + 1
            );
            Some(state)
        }
        Ok(None) => None,
        Err(err) => {
            log::warn!("could not load saved game under {key}: {err}");
            None
        }
    }
}
