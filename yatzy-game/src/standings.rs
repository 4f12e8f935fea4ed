//! Round winners, win counts and the overall result.
//!
//! The overall winner is decided by the number of rounds won, not by the
//! cumulative point total.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::state::GameState;

/// Totals for one round keyed by player name.
pub type RoundTotalsByPlayer = BTreeMap<String, i64>;

/// Players whose total equals the round maximum, in roster order.
///
/// Players missing from `totals` are scored as zero.
#[must_use]
pub fn round_winners(players: &[String], totals: &RoundTotalsByPlayer) -> Vec<String> {
    let score_of = |player: &String| totals.get(player).copied().unwrap_or_default();
    let Some(best) = players.iter().map(score_of).max() else {
        return Vec::new();
    };
    players
        .iter()
        .filter(|player| score_of(*player) == best)
        .cloned()
        .collect()
}

/// How many rounds each player won (ties count as a win for everyone tied).
#[must_use]
pub fn round_win_counts(
    players: &[String],
    per_round_winners: &[Vec<String>],
) -> BTreeMap<String, usize> {
    players
        .iter()
        .map(|player| {
            let wins = per_round_winners
                .iter()
                .filter(|winners| winners.contains(player))
                .count();
            (player.clone(), wins)
        })
        .collect()
}

/// Players with the most round wins; empty when nobody has won a round.
#[must_use]
pub fn overall_winners(players: &[String], per_round_winners: &[Vec<String>]) -> Vec<String> {
    let counts = round_win_counts(players, per_round_winners);
    let max_wins = counts.values().copied().max().unwrap_or_default();
    if max_wins == 0 {
        return Vec::new();
    }
    players
        .iter()
        .filter(|player| counts.get(*player).copied() == Some(max_wins))
        .cloned()
        .collect()
}

/// Sum of each player's totals across every round.
#[must_use]
pub fn cumulative_totals(
    players: &[String],
    rounds: &[RoundTotalsByPlayer],
) -> BTreeMap<String, i64> {
    players
        .iter()
        .map(|player| {
            let sum = rounds
                .iter()
                .map(|round| round.get(player).copied().unwrap_or_default())
                .fold(0_i64, i64::saturating_add);
            (player.clone(), sum)
        })
        .collect()
}

/// One scoreboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: usize,
    pub totals: RoundTotalsByPlayer,
    pub winners: Vec<String>,
}

/// Everything the round-end scoreboard displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub players: Vec<String>,
    pub rounds: Vec<RoundResult>,
    pub cumulative: BTreeMap<String, i64>,
    pub win_counts: BTreeMap<String, usize>,
    pub overall_winners: Vec<String>,
}

impl Scoreboard {
    /// Build the scoreboard from per-round totals.
    #[must_use]
    pub fn from_totals(players: &[String], rounds: &[RoundTotalsByPlayer]) -> Self {
        let results: Vec<RoundResult> = rounds
            .iter()
            .enumerate()
            .map(|(round, totals)| RoundResult {
                round,
                totals: totals.clone(),
                winners: round_winners(players, totals),
            })
            .collect();
        let per_round_winners: Vec<Vec<String>> =
            results.iter().map(|row| row.winners.clone()).collect();

        Self {
            players: players.to_vec(),
            cumulative: cumulative_totals(players, rounds),
            win_counts: round_win_counts(players, &per_round_winners),
            overall_winners: overall_winners(players, &per_round_winners),
            rounds: results,
        }
    }

    /// Build the scoreboard for every round recorded in a game.
    #[must_use]
    pub fn from_state(state: &GameState) -> Self {
        let rounds: Vec<RoundTotalsByPlayer> = (0..state.round_count())
            .filter_map(|round| state.round_totals(round))
            .map(|totals| {
                totals
                    .into_iter()
                    .map(|(player, sums)| (player, sums.total))
                    .collect()
            })
            .collect();
        Self::from_totals(state.players(), &rounds)
    }

    /// `true` when exactly one player leads on round wins.
    #[must_use]
    pub fn has_single_winner(&self) -> bool {
        self.overall_winners.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn totals(pairs: &[(&str, i64)]) -> RoundTotalsByPlayer {
        pairs
            .iter()
            .map(|(name, total)| ((*name).to_string(), *total))
            .collect()
    }

    #[test]
    fn round_winner_is_the_highest_total() {
        let players = roster(&["Alice", "Bob", "Cara"]);
        let round = totals(&[("Alice", 180), ("Bob", 220), ("Cara", 150)]);
        assert_eq!(round_winners(&players, &round), roster(&["Bob"]));
    }

    #[test]
    fn round_ties_return_every_max_scorer() {
        let players = roster(&["Alice", "Bob", "Cara"]);
        let round = totals(&[("Alice", 200), ("Bob", 200), ("Cara", 150)]);
        assert_eq!(round_winners(&players, &round), roster(&["Alice", "Bob"]));
    }

    #[test]
    fn missing_players_score_zero() {
        let players = roster(&["Alice", "Bob"]);
        let round = totals(&[("Alice", 0)]);
        assert_eq!(round_winners(&players, &round), roster(&["Alice", "Bob"]));
        assert!(round_winners(&[], &round).is_empty());
    }

    #[test]
    fn overall_winner_is_decided_by_round_wins_not_points() {
        let players = roster(&["Alice", "Bob"]);
        let rounds = vec![
            totals(&[("Alice", 150), ("Bob", 140)]),
            totals(&[("Alice", 160), ("Bob", 150)]),
            totals(&[("Alice", 100), ("Bob", 300)]),
        ];
        let board = Scoreboard::from_totals(&players, &rounds);
        assert_eq!(board.cumulative["Alice"], 410);
        assert_eq!(board.cumulative["Bob"], 590);
        assert_eq!(board.win_counts["Alice"], 2);
        assert_eq!(board.win_counts["Bob"], 1);
        assert_eq!(board.overall_winners, roster(&["Alice"]));
        assert!(board.has_single_winner());
    }

    #[test]
    fn split_rounds_produce_a_shared_overall_win() {
        let players = roster(&["Alice", "Bob"]);
        let rounds = vec![
            totals(&[("Alice", 100), ("Bob", 50)]),
            totals(&[("Alice", 50), ("Bob", 100)]),
        ];
        let board = Scoreboard::from_totals(&players, &rounds);
        assert_eq!(board.overall_winners, roster(&["Alice", "Bob"]));
        assert!(!board.has_single_winner());
        assert_eq!(board.rounds[0].winners, roster(&["Alice"]));
        assert_eq!(board.rounds[1].winners, roster(&["Bob"]));
    }

    #[test]
    fn no_rounds_means_no_overall_winner() {
        let players = roster(&["Alice", "Bob"]);
        assert!(overall_winners(&players, &[]).is_empty());
        let board = Scoreboard::from_totals(&players, &[]);
        assert!(board.overall_winners.is_empty());
        assert_eq!(board.cumulative["Alice"], 0);
    }

    #[test]
    fn win_counts_include_every_tied_player() {
        let players = roster(&["Alice", "Bob", "Cara"]);
        let winners = vec![roster(&["Alice", "Bob"]), roster(&["Bob"])];
        let counts = round_win_counts(&players, &winners);
        assert_eq!(counts["Alice"], 1);
        assert_eq!(counts["Bob"], 2);
        assert_eq!(counts["Cara"], 0);
        assert_eq!(overall_winners(&players, &winners), roster(&["Bob"]));
    }
}
