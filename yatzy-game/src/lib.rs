//! Yatzy Scorekeeper Engine
//!
//! Platform-agnostic scorekeeping for Scandinavian Yatzy played with physical
//! dice: score validation, totals, round and overall winners, and a
//! persistable game state. No UI or platform-specific dependencies.

pub mod category;
pub mod colors;
pub mod constants;
pub mod score;
pub mod session;
pub mod snapshot;
pub mod standings;
pub mod state;
pub mod storage;
pub mod validation;

// Re-export commonly used types
pub use category::{Category, Section, UnknownCategory};
pub use colors::{assign_colors, next_color, pick_color};
pub use score::{PlayerScores, RoundTotals, ScoreEntry, bonus, lower_sum, total, upper_sum};
pub use session::ScoreKeeper;
pub use snapshot::{
    GameSnapshot, SnapshotError, decode_snapshot, decode_snapshot_into, encode_snapshot,
    try_decode_snapshot,
};
pub use standings::{
    RoundResult, Scoreboard, cumulative_totals, overall_winners, round_win_counts, round_winners,
};
pub use state::{
    GameError, GameState, Page, RosterError, RoundCompletion, RoundScores, normalize_roster,
};
pub use storage::MemoryStorage;
pub use validation::{
    CategoryRule, CellError, sheet_is_valid, should_display, validate, validate_scores,
};

/// Trait for abstracting where the serialized game lives.
/// Platform-specific implementations should provide this
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store a blob under `key`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written.
    fn save(&self, key: &str, blob: &str) -> Result<(), Self::Error>;

    /// Fetch the blob stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Remove the blob stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob exists but cannot be removed.
    fn delete(&self, key: &str) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeper_roundtrips_through_storage() {
        let storage = MemoryStorage::new();
        let mut keeper = ScoreKeeper::with_seed(storage.clone(), 0xABCD);
        keeper.start(["Alice", "Bob"]).unwrap();
        keeper.edit_cell("Bob", Category::FullHouse, "25").unwrap();

        let blob = storage.get(constants::STORAGE_KEY).expect("save exists");
        let loaded = decode_snapshot(&blob).expect("blob decodes");
        assert_eq!(
            loaded.player_scores(0, "Bob").unwrap().get(Category::FullHouse),
            &ScoreEntry::Value(25)
        );
        assert_eq!(loaded.page(), Page::Game);
    }
}
