//! Score cells, per-player score maps and round totals.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::category::Category;
use crate::constants::{BONUS_POINTS, BONUS_THRESHOLD};

/// Contents of a single score-sheet cell.
///
/// `Empty` means "not entered yet" and is distinct from `Value(0)` ("no dice
/// scored"). `Text` holds input that does not parse as an integer so the
/// validator can still report it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawEntry", into = "String")]
pub enum ScoreEntry {
    #[default]
    Empty,
    Value(i64),
    Text(String),
}

impl ScoreEntry {
    /// Interpret raw keystrokes from an input field.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed.parse::<i64>() {
            Ok(value) => Self::Value(value),
            Err(_) => saturated_integer(trimmed)
                .map_or_else(|| Self::Text(raw.to_string()), Self::Value),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[must_use]
    pub const fn value(&self) -> Option<i64> {
        match self {
            Self::Value(n) => Some(*n),
            _ => None,
        }
    }

    /// Contribution to live sums: blank and unparsable cells count as zero.
    #[must_use]
    pub const fn points(&self) -> i64 {
        match self {
            Self::Value(n) => *n,
            Self::Empty | Self::Text(_) => 0,
        }
    }
}

/// Clamp an all-digit input too large for `i64` to the bound on its side.
fn saturated_integer(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

impl fmt::Display for ScoreEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Value(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for ScoreEntry {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<i64> for ScoreEntry {
    fn from(value: i64) -> Self {
        Self::Value(value)
    }
}

impl From<ScoreEntry> for String {
    fn from(entry: ScoreEntry) -> Self {
        entry.to_string()
    }
}

/// Accepted persisted shapes for a cell: strings, bare numbers, or null.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Number(i64),
    Text(String),
    Missing(Option<()>),
}

impl From<RawEntry> for ScoreEntry {
    fn from(raw: RawEntry) -> Self {
        match raw {
            RawEntry::Number(n) => Self::Value(n),
            RawEntry::Text(text) => Self::parse(&text),
            RawEntry::Missing(_) => Self::Empty,
        }
    }
}

static EMPTY_ENTRY: ScoreEntry = ScoreEntry::Empty;

/// One player's score sheet for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerScores {
    cells: BTreeMap<Category, ScoreEntry>,
}

impl Default for PlayerScores {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerScores {
    /// A fresh sheet with every category blank.
    #[must_use]
    pub fn new() -> Self {
        let cells = Category::ALL
            .into_iter()
            .map(|category| (category, ScoreEntry::Empty))
            .collect();
        Self { cells }
    }

    #[must_use]
    pub fn get(&self, category: Category) -> &ScoreEntry {
        self.cells.get(&category).unwrap_or(&EMPTY_ENTRY)
    }

    pub fn set(&mut self, category: Category, entry: ScoreEntry) {
        self.cells.insert(category, entry);
    }

    /// Iterate cells in sheet order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &ScoreEntry)> {
        Category::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }

    /// Insert blanks for any category missing from a decoded sheet.
    pub fn fill_missing(&mut self) {
        for category in Category::ALL {
            self.cells.entry(category).or_default();
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(ScoreEntry::is_empty)
    }

    #[must_use]
    pub fn totals(&self) -> RoundTotals {
        RoundTotals::from_scores(self)
    }
}

impl FromIterator<(Category, ScoreEntry)> for PlayerScores {
    fn from_iter<I: IntoIterator<Item = (Category, ScoreEntry)>>(iter: I) -> Self {
        let mut scores = Self::new();
        for (category, entry) in iter {
            scores.set(category, entry);
        }
        scores
    }
}

fn section_sum(scores: &PlayerScores, categories: &[Category]) -> i64 {
    categories
        .iter()
        .map(|category| scores.get(*category).points())
        .fold(0_i64, i64::saturating_add)
}

/// Sum of Ones through Sixes.
#[must_use]
pub fn upper_sum(scores: &PlayerScores) -> i64 {
    section_sum(scores, &Category::UPPER)
}

/// Upper-section bonus: awarded when the upper sum exceeds 62.
#[must_use]
pub const fn bonus(upper_sum: i64) -> i64 {
    if upper_sum > BONUS_THRESHOLD {
        BONUS_POINTS
    } else {
        0
    }
}

/// Sum of the nine lower-section categories.
#[must_use]
pub fn lower_sum(scores: &PlayerScores) -> i64 {
    section_sum(scores, &Category::LOWER)
}

/// Round total including the bonus.
#[must_use]
pub fn total(scores: &PlayerScores) -> i64 {
    RoundTotals::from_scores(scores).total
}

/// Derived sums for one player's sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTotals {
    pub upper_sum: i64,
    pub bonus: i64,
    pub lower_sum: i64,
    pub total: i64,
}

impl RoundTotals {
    #[must_use]
    pub fn from_scores(scores: &PlayerScores) -> Self {
        let upper_sum = upper_sum(scores);
        let bonus = bonus(upper_sum);
        let lower_sum = lower_sum(scores);
        Self {
            upper_sum,
            bonus,
            lower_sum,
            total: upper_sum.saturating_add(bonus).saturating_add(lower_sum),
        }
    }
}
