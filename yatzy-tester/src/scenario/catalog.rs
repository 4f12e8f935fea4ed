use anyhow::{Context, Result, anyhow, ensure};
use std::collections::BTreeMap;
use std::fs;

use yatzy_game::{
    Category, CategoryRule, CellError, GameState, GameStorage, PlayerScores, RosterError,
    RoundCompletion, ScoreEntry, ScoreKeeper, Scoreboard, bonus, normalize_roster, round_winners,
    upper_sum, validate,
};

use crate::logic::{SimulationPlan, SimulationSummary};
use crate::scenario::ScenarioOptions;
use crate::storage::FileStorage;
use crate::util::scratch_dir;

/// Plan behind a catalog key.
pub fn plan_for(key: &str, options: ScenarioOptions) -> Option<SimulationPlan> {
    let checks = SimulationPlan::checks_only();
    let plan = match key {
        "smoke" => SimulationPlan::new(2, 1)
            .with_typo_rate(0.0)
            .with_expectation(smoke_expectation),
        "upper-bonus" => checks.with_expectation(upper_bonus_expectation),
        "divisibility" => checks.with_expectation(divisibility_expectation),
        "fixed-scores" => checks.with_expectation(fixed_scores_expectation),
        "lower-caps" => checks.with_expectation(lower_caps_expectation),
        "round-ties" => checks.with_expectation(round_ties_expectation),
        "overall-by-round-wins" => checks.with_expectation(overall_by_round_wins_expectation),
        "roster-errors" => checks.with_expectation(roster_errors_expectation),
        "persistence" => checks.with_expectation(persistence_expectation),
        "random-play" => SimulationPlan::new(options.players.max(1), options.rounds.max(1))
            .with_expectation(completed_every_round)
            .with_expectation(totals_match_recomputation)
            .with_expectation(winners_match_recomputation)
            .with_expectation(typos_were_blocked),
        _ => return None,
    };
    Some(plan)
}

fn started(names: &[&str], seed: u64) -> Result<GameState> {
    let mut state = GameState::new().with_seed(seed);
    state.start(names.iter().copied())?;
    Ok(state)
}

/// Fill a whole sheet with valid zeros, then apply `overrides`.
fn enter_sheet(state: &mut GameState, player: &str, overrides: &[(Category, i64)]) -> Result<()> {
    for category in Category::ALL {
        let value = overrides
            .iter()
            .find(|(c, _)| *c == category)
            .map_or(0, |(_, v)| *v);
        state.edit_cell(player, category, &value.to_string())?;
    }
    Ok(())
}

fn finish(state: &mut GameState) -> Result<()> {
    match state.finish_round()? {
        RoundCompletion::Finished => Ok(()),
        RoundCompletion::Blocked { errors } => Err(anyhow!("round blocked: {errors:?}")),
    }
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(state.has_game(), "game should be running");
    ensure!(state.players().len() == 2, "two players should be seated");
    ensure!(state.round_count() == 1, "exactly one round should exist");
    ensure!(
        state.page() == yatzy_game::Page::Scoreboard,
        "finished round should show the scoreboard"
    );
    ensure!(
        !summary.scoreboard.rounds[0].winners.is_empty(),
        "a round with players always has a winner"
    );
    ensure!(
        state.player_colors().len() == 2,
        "every player should have a color"
    );
    Ok(())
}

fn upper_bonus_expectation(_summary: &SimulationSummary) -> Result<()> {
    ensure!(bonus(62) == 0, "62 must not earn the bonus");
    ensure!(bonus(63) == 35, "63 must earn the bonus");

    let twelves: PlayerScores = Category::UPPER
        .into_iter()
        .map(|category| (category, ScoreEntry::Value(12)))
        .collect();
    let totals = twelves.totals();
    ensure!(totals.upper_sum == 72, "upper sum was {}", totals.upper_sum);
    ensure!(totals.bonus == 35, "bonus was {}", totals.bonus);

    // Three of each face reaches exactly 63 with valid cells.
    let mut state = started(&["Alice", "Bob"], 1)?;
    let three_each: Vec<(Category, i64)> = Category::UPPER
        .into_iter()
        .filter_map(|c| c.face_value().map(|face| (c, 3 * face)))
        .collect();
    enter_sheet(&mut state, "Alice", &three_each)?;
    let mut one_short = three_each.clone();
    one_short[0] = (Category::Ones, 2);
    enter_sheet(&mut state, "Bob", &one_short)?;
    finish(&mut state)?;

    let totals = state.round_totals(0).context("round 0 totals")?;
    ensure!(totals["Alice"].bonus == 35, "Alice at 63 should get the bonus");
    ensure!(totals["Bob"].bonus == 0, "Bob at 62 should not");
    ensure!(
        totals["Alice"].total - totals["Bob"].total == 36,
        "bonus plus one pip should separate them"
    );
    let upper = state
        .player_scores(0, "Bob")
        .map(upper_sum)
        .context("Bob's sheet")?;
    ensure!(upper == 62, "Bob's upper sum was {upper}");
    Ok(())
}

fn divisibility_expectation(_summary: &SimulationSummary) -> Result<()> {
    ensure!(
        validate(Category::Twos, "3") == Err(CellError::NotDivisible { divisor: 2 }),
        "3 in Twos must fail divisibility"
    );
    ensure!(validate(Category::Twos, "4").is_ok(), "4 in Twos is valid");

    for category in Category::UPPER {
        let face = category.face_value().context("upper face")?;
        let accepted = CategoryRule::for_category(category).accepted_values(40);
        let expected: Vec<i64> = (0..=5).map(|n| n * face).collect();
        ensure!(
            accepted == expected,
            "{category} accepted {accepted:?}, expected {expected:?}"
        );
    }

    let mut state = started(&["Alice"], 2)?;
    state.edit_cell("Alice", Category::Twos, "3")?;
    ensure!(
        state.cell_error("Alice", Category::Twos) == Some(CellError::NotDivisible { divisor: 2 }),
        "engine should flag 3 in Twos"
    );
    state.edit_cell("Alice", Category::Twos, "4")?;
    ensure!(
        state.cell_error("Alice", Category::Twos).is_none(),
        "correcting to 4 should clear the error"
    );
    Ok(())
}

fn fixed_scores_expectation(_summary: &SimulationSummary) -> Result<()> {
    let fixed = [
        (Category::SmallStraight, 30),
        (Category::LargeStraight, 40),
        (Category::FullHouse, 25),
        (Category::Yatzy, 50),
    ];
    for (category, score) in fixed {
        let accepted = CategoryRule::for_category(category).accepted_values(100);
        ensure!(
            accepted == vec![0, score],
            "{category} accepted {accepted:?}"
        );
    }
    ensure!(
        validate(Category::SmallStraight, "25")
            == Err(CellError::NotExactValue { value: 30 }),
        "25 in Small Straight must be rejected"
    );
    ensure!(validate(Category::SmallStraight, "30").is_ok(), "30 is valid");
    ensure!(validate(Category::SmallStraight, "0").is_ok(), "0 is valid");
    Ok(())
}

fn lower_caps_expectation(_summary: &SimulationSummary) -> Result<()> {
    let caps = [
        (Category::OnePair, 12),
        (Category::TwoPairs, 22),
        (Category::ThreeOfAKind, 18),
        (Category::FourOfAKind, 24),
        (Category::Chance, 30),
    ];
    for (category, max) in caps {
        let rule = CategoryRule::for_category(category);
        let accepted = rule.accepted_values(max + 10);
        ensure!(
            accepted == (0..=max).collect::<Vec<_>>(),
            "{category} should accept exactly 0..={max}"
        );
        ensure!(
            validate(category, &(max + 1).to_string()) == Err(CellError::MaxExceeded { max }),
            "{category} must reject {}",
            max + 1
        );
    }
    ensure!(
        validate(Category::Chance, "-1") == Err(CellError::Negative),
        "negative values are rejected"
    );
    ensure!(
        validate(Category::Chance, "seven") == Err(CellError::NotInteger),
        "text is rejected"
    );
    Ok(())
}

fn round_ties_expectation(_summary: &SimulationSummary) -> Result<()> {
    let mut state = started(&["Alice", "Bob", "Cara"], 3)?;
    enter_sheet(&mut state, "Alice", &[(Category::Chance, 20)])?;
    enter_sheet(&mut state, "Bob", &[(Category::Chance, 20)])?;
    enter_sheet(&mut state, "Cara", &[(Category::Chance, 19)])?;
    finish(&mut state)?;

    let board = state.scoreboard();
    let winners = &board.rounds[0].winners;
    ensure!(
        winners == &["Alice".to_string(), "Bob".to_string()],
        "tied round winners were {winners:?}"
    );
    ensure!(
        board.win_counts["Alice"] == 1 && board.win_counts["Bob"] == 1,
        "both tied players are credited with the win"
    );
    ensure!(
        round_winners(&[], &BTreeMap::new()).is_empty(),
        "an empty roster has no winners"
    );
    Ok(())
}

fn overall_by_round_wins_expectation(_summary: &SimulationSummary) -> Result<()> {
    let players = vec!["Alice".to_string(), "Bob".to_string()];
    let round = |alice: i64, bob: i64| -> BTreeMap<String, i64> {
        BTreeMap::from([("Alice".to_string(), alice), ("Bob".to_string(), bob)])
    };

    let rounds = [round(150, 140), round(160, 150), round(100, 300)];
    let board = Scoreboard::from_totals(&players, &rounds);
    ensure!(
        board.cumulative["Bob"] > board.cumulative["Alice"],
        "Bob should lead on points"
    );
    ensure!(
        board.overall_winners == vec!["Alice".to_string()],
        "two round wins should beat one, got {:?}",
        board.overall_winners
    );

    let split = Scoreboard::from_totals(&players, &[round(100, 50), round(50, 100)]);
    ensure!(
        split.overall_winners == players,
        "split rounds should share the overall win, got {:?}",
        split.overall_winners
    );
    ensure!(
        Scoreboard::from_totals(&players, &[]).overall_winners.is_empty(),
        "no rounds means no overall winner"
    );
    Ok(())
}

fn roster_errors_expectation(_summary: &SimulationSummary) -> Result<()> {
    ensure!(
        normalize_roster(["Alice", "Alice "]) == Err(RosterError::DuplicateNames),
        "trimmed duplicates are rejected"
    );
    ensure!(
        normalize_roster(["", "   "]) == Err(RosterError::EmptyRoster),
        "blank rosters are rejected"
    );
    ensure!(
        normalize_roster(["", ""]) == Err(RosterError::EmptyRoster),
        "two blanks are not duplicates"
    );
    ensure!(
        RosterError::DuplicateNames.to_string() == "Duplicate player names are not allowed.",
        "duplicate message text"
    );
    let roster = normalize_roster([" Ann ", "", "Ben"])?;
    ensure!(roster == ["Ann", "Ben"], "roster was {roster:?}");

    let mut state = started(&["Ann"], 4)?;
    ensure!(
        state.start(["Ben", "Ben"]).is_err() && state.players() == ["Ann".to_string()],
        "a rejected roster keeps the running game"
    );
    Ok(())
}

fn persistence_expectation(summary: &SimulationSummary) -> Result<()> {
    let dir = scratch_dir("persistence", summary.seed);
    let storage = FileStorage::new(&dir);
    let result = check_persistence(&storage, summary.seed);
    let _ = fs::remove_dir_all(&dir);
    result
}

fn check_persistence(storage: &FileStorage, seed: u64) -> Result<()> {
    let mut keeper = ScoreKeeper::with_seed(storage.clone(), seed);
    ensure!(!keeper.state().has_game(), "empty directory means no game");
    keeper.start(["Alice", "Bob"])?;
    keeper.edit_cell("Alice", Category::Ones, "0")?;
    keeper.edit_cell("Bob", Category::Yatzy, "50")?;

    let reopened = ScoreKeeper::new(storage.clone());
    ensure!(
        reopened.state().snapshot() == keeper.state().snapshot(),
        "reloaded state differs from the saved one"
    );
    let sheet = reopened
        .state()
        .player_scores(0, "Alice")
        .context("Alice's sheet")?;
    ensure!(
        sheet.get(Category::Ones) == &ScoreEntry::Value(0)
            && sheet.get(Category::Twos) == &ScoreEntry::Empty,
        "blank and zero must survive a reload"
    );

    keeper.reset();
    ensure!(
        storage.load(yatzy_game::constants::STORAGE_KEY)?.is_none(),
        "reset should remove the saved game"
    );

    storage.save(yatzy_game::constants::STORAGE_KEY, "{ not json")?;
    ensure!(
        !ScoreKeeper::new(storage.clone()).state().has_game(),
        "a corrupt save falls back to no game"
    );
    Ok(())
}

fn completed_every_round(summary: &SimulationSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(
        state.round_count() == summary.rounds.len(),
        "engine has {} rounds, simulation played {}",
        state.round_count(),
        summary.rounds.len()
    );
    ensure!(
        state.page() == yatzy_game::Page::Scoreboard,
        "last round should end on the scoreboard"
    );
    ensure!(state.is_last_round(), "current round should be the newest");
    ensure!(
        state.current_round_errors().is_empty(),
        "finished round still has invalid cells"
    );
    Ok(())
}

fn totals_match_recomputation(summary: &SimulationSummary) -> Result<()> {
    for record in &summary.rounds {
        let totals = summary
            .final_state
            .round_totals(record.round)
            .with_context(|| format!("round {} missing", record.round))?;
        for (player, expected) in &record.expected_totals {
            let actual = totals.get(player).map(|t| t.total).unwrap_or_default();
            ensure!(
                actual == *expected,
                "round {} {player}: engine total {actual}, expected {expected}",
                record.round + 1
            );
        }
    }
    let mut cumulative: BTreeMap<&str, i64> = BTreeMap::new();
    for record in &summary.rounds {
        for (player, total) in &record.expected_totals {
            *cumulative.entry(player.as_str()).or_default() += total;
        }
    }
    for (player, expected) in cumulative {
        let actual = summary.scoreboard.cumulative.get(player).copied();
        ensure!(
            actual == Some(expected),
            "{player}: cumulative {actual:?}, expected {expected}"
        );
    }
    Ok(())
}

fn winners_match_recomputation(summary: &SimulationSummary) -> Result<()> {
    let players = summary.final_state.players();
    let mut wins: BTreeMap<&str, usize> = BTreeMap::new();
    for (record, row) in summary.rounds.iter().zip(&summary.scoreboard.rounds) {
        let best = record.expected_totals.values().copied().max().unwrap_or_default();
        let expected: Vec<&str> = players
            .iter()
            .filter(|p| record.expected_totals.get(*p) == Some(&best))
            .map(String::as_str)
            .collect();
        ensure!(
            row.winners == expected,
            "round {} winners {:?}, expected {expected:?}",
            record.round + 1,
            row.winners
        );
        for player in expected {
            *wins.entry(player).or_default() += 1;
        }
    }
    let most = wins.values().copied().max().unwrap_or_default();
    let expected: Vec<&str> = players
        .iter()
        .map(String::as_str)
        .filter(|p| most > 0 && wins.get(p) == Some(&most))
        .collect();
    ensure!(
        summary.scoreboard.overall_winners == expected,
        "overall winners {:?}, expected {expected:?}",
        summary.scoreboard.overall_winners
    );
    Ok(())
}

fn typos_were_blocked(summary: &SimulationSummary) -> Result<()> {
    for record in &summary.rounds {
        ensure!(
            record.flagged_cells == record.typos,
            "round {}: {} typo(s) but {} flagged cell(s)",
            record.round + 1,
            record.typos,
            record.flagged_cells
        );
        ensure!(
            record.blocked_attempts == usize::from(record.typos > 0),
            "round {}: {} blocked submission(s) for {} typo(s)",
            record.round + 1,
            record.blocked_attempts,
            record.typos
        );
    }
    Ok(())
}
