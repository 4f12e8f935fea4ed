//! Persisted form of a game.
//!
//! The blob is camelCase JSON with plain maps so older saves written by
//! other front-ends keep loading. Decoding is forgiving: anything that
//! cannot be repaired is dropped with a warning and treated as "no save".
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::colors::pick_color;
use crate::state::{GameState, Page, RoundScores, normalize_roster};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("snapshot has no players")]
    NoPlayers,
    #[error("snapshot has no rounds")]
    NoRounds,
    #[error("snapshot roster is invalid: {0}")]
    Roster(#[from] crate::state::RosterError),
}

/// Serializable game state, without transient UI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub players: Vec<String>,
    pub scores_per_round: Vec<RoundScores>,
    #[serde(default)]
    pub player_colors: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient_round")]
    pub current_round: usize,
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Page,
}

/// `null` or non-numeric round indices restore as the first round.
fn lenient_round<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let round = value.as_u64().and_then(|n| usize::try_from(n).ok());
    if round.is_none() && !value.is_null() {
        log::warn!("ignoring unreadable snapshot round {value}");
    }
    Ok(round.unwrap_or_default())
}

/// Unknown page names restore as the score sheet.
fn lenient_page<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Page, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(Page::default());
    }
    Ok(serde_json::from_value(value.clone()).unwrap_or_else(|_| {
        log::warn!("ignoring unknown snapshot page {value}");
        Page::default()
    }))
}

/// Re-key a saved map by trimmed player name. An exact key wins over a
/// padded one that trims to the same name.
fn trim_keys<V>(map: BTreeMap<String, V>) -> BTreeMap<String, V> {
    let mut trimmed = BTreeMap::new();
    let mut exact = Vec::new();
    for (key, value) in map {
        let name = key.trim();
        if name == key {
            exact.push((key, value));
        } else {
            trimmed.insert(name.to_string(), value);
        }
    }
    trimmed.extend(exact);
    trimmed
}

impl GameState {
    /// Capture the persistent part of the state; `None` when no game is active.
    #[must_use]
    pub fn snapshot(&self) -> Option<GameSnapshot> {
        if !self.has_game() {
            return None;
        }
        Some(GameSnapshot {
            players: self.players.clone(),
            scores_per_round: self.scores_per_round.clone(),
            player_colors: self.player_colors.clone(),
            current_round: self.current_round,
            page: self.page,
        })
    }

    /// Rebuild a state from a snapshot, repairing what can be repaired.
    ///
    /// Player names are trimmed along with the keys that refer to them.
    /// Missing categories and players become blank cells and scores for
    /// players outside the roster are dropped. Missing colors are assigned,
    /// and an out-of-range round index falls back to the first round.
    ///
    /// # Errors
    ///
    /// Fails when the roster or the round list is empty, or the roster has
    /// duplicate names.
    pub fn restore(mut self, snapshot: GameSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.players.is_empty() {
            return Err(SnapshotError::NoPlayers);
        }
        if snapshot.scores_per_round.is_empty() {
            return Err(SnapshotError::NoRounds);
        }
        let players = normalize_roster(&snapshot.players)?;

        let rounds: Vec<RoundScores> = snapshot
            .scores_per_round
            .into_iter()
            .map(|round| {
                let mut round = trim_keys(round);
                players
                    .iter()
                    .map(|player| {
                        let mut scores = round.remove(player).unwrap_or_default();
                        scores.fill_missing();
                        (player.clone(), scores)
                    })
                    .collect()
            })
            .collect();

        let mut colors: BTreeMap<String, String> = trim_keys(snapshot.player_colors)
            .into_iter()
            .filter(|(player, _)| players.contains(player))
            .collect();
        for player in &players {
            if !colors.contains_key(player) {
                let existing: Vec<&str> = colors.values().map(String::as_str).collect();
                let color = pick_color(&existing, &mut self.rng);
                colors.insert(player.clone(), color);
            }
        }

        let current_round = if snapshot.current_round < rounds.len() {
            snapshot.current_round
        } else {
            log::warn!(
                "snapshot round {} out of range ({} rounds); using first round",
                snapshot.current_round,
                rounds.len()
            );
            0
        };

        self.players = players;
        self.scores_per_round = rounds;
        self.player_colors = colors;
        self.current_round = current_round;
        self.page = snapshot.page;
        self.submit_attempted = false;
        Ok(self)
    }
}

/// Serialize the persistent part of a state. `None` when no game is active.
///
/// # Errors
///
/// Returns [`SnapshotError::Malformed`] if serialization fails.
pub fn encode_snapshot(state: &GameState) -> Result<Option<String>, SnapshotError> {
    state
        .snapshot()
        .map(|snapshot| serde_json::to_string(&snapshot))
        .transpose()
        .map_err(SnapshotError::from)
}

/// Parse and repair a stored blob into `base`.
///
/// # Errors
///
/// Returns a [`SnapshotError`] describing why the blob was rejected.
pub fn try_decode_snapshot(blob: &str, base: GameState) -> Result<GameState, SnapshotError> {
    let snapshot: GameSnapshot = serde_json::from_str(blob)?;
    base.restore(snapshot)
}

/// Lenient decode: any failure is logged and reported as "no saved game".
#[must_use]
pub fn decode_snapshot(blob: &str) -> Option<GameState> {
    decode_snapshot_into(blob, GameState::new())
}

/// Like [`decode_snapshot`], restoring on top of a prepared (e.g. seeded) state.
#[must_use]
pub fn decode_snapshot_into(blob: &str, base: GameState) -> Option<GameState> {
    match try_decode_snapshot(blob, base) {
        Ok(state) => Some(state),
        Err(err) => {
            log::warn!("discarding saved game: {err}");
            None
        }
    }
}
