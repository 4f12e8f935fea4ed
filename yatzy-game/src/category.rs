//! Scoring categories of the Yatzy score sheet.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which half of the score sheet a category belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Face-value rows (Ones through Sixes) that feed the bonus.
    Upper,
    /// Combination rows (pairs, straights, Yatzy, ...).
    Lower,
}

/// One of the fifteen rows a player fills in each round.
///
/// Serialized by its display label so persisted snapshots read
/// `"One Pair"` rather than `"OnePair"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Ones,
    Twos,
    Threes,
    Fours,
    Fives,
    Sixes,
    #[serde(rename = "One Pair")]
    OnePair,
    #[serde(rename = "Two Pairs")]
    TwoPairs,
    #[serde(rename = "Three of a Kind")]
    ThreeOfAKind,
    #[serde(rename = "Four of a Kind")]
    FourOfAKind,
    #[serde(rename = "Small Straight")]
    SmallStraight,
    #[serde(rename = "Large Straight")]
    LargeStraight,
    #[serde(rename = "Full House")]
    FullHouse,
    Chance,
    Yatzy,
}

impl Category {
    /// Upper-section categories in sheet order.
    pub const UPPER: [Self; 6] = [
        Self::Ones,
        Self::Twos,
        Self::Threes,
        Self::Fours,
        Self::Fives,
        Self::Sixes,
    ];

    /// Lower-section categories in sheet order.
    pub const LOWER: [Self; 9] = [
        Self::OnePair,
        Self::TwoPairs,
        Self::ThreeOfAKind,
        Self::FourOfAKind,
        Self::SmallStraight,
        Self::LargeStraight,
        Self::FullHouse,
        Self::Chance,
        Self::Yatzy,
    ];

    /// Every category, upper section first.
    pub const ALL: [Self; 15] = [
        Self::Ones,
        Self::Twos,
        Self::Threes,
        Self::Fours,
        Self::Fives,
        Self::Sixes,
        Self::OnePair,
        Self::TwoPairs,
        Self::ThreeOfAKind,
        Self::FourOfAKind,
        Self::SmallStraight,
        Self::LargeStraight,
        Self::FullHouse,
        Self::Chance,
        Self::Yatzy,
    ];

    #[must_use]
    pub const fn section(self) -> Section {
        match self {
            Self::Ones | Self::Twos | Self::Threes | Self::Fours | Self::Fives | Self::Sixes => {
                Section::Upper
            }
            _ => Section::Lower,
        }
    }

    #[must_use]
    pub const fn is_upper(self) -> bool {
        matches!(self.section(), Section::Upper)
    }

    /// Die face counted by an upper category (Ones = 1 ... Sixes = 6).
    #[must_use]
    pub const fn face_value(self) -> Option<i64> {
        match self {
            Self::Ones => Some(1),
            Self::Twos => Some(2),
            Self::Threes => Some(3),
            Self::Fours => Some(4),
            Self::Fives => Some(5),
            Self::Sixes => Some(6),
            _ => None,
        }
    }

    /// Label shown on the score sheet and used as the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ones => "Ones",
            Self::Twos => "Twos",
            Self::Threes => "Threes",
            Self::Fours => "Fours",
            Self::Fives => "Fives",
            Self::Sixes => "Sixes",
            Self::OnePair => "One Pair",
            Self::TwoPairs => "Two Pairs",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::FourOfAKind => "Four of a Kind",
            Self::SmallStraight => "Small Straight",
            Self::LargeStraight => "Large Straight",
            Self::FullHouse => "Full House",
            Self::Chance => "Chance",
            Self::Yatzy => "Yatzy",
        }
    }

    /// Snake-case identifier, handy for CLI arguments and message keys.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Ones => "ones",
            Self::Twos => "twos",
            Self::Threes => "threes",
            Self::Fours => "fours",
            Self::Fives => "fives",
            Self::Sixes => "sixes",
            Self::OnePair => "one_pair",
            Self::TwoPairs => "two_pairs",
            Self::ThreeOfAKind => "three_of_a_kind",
            Self::FourOfAKind => "four_of_a_kind",
            Self::SmallStraight => "small_straight",
            Self::LargeStraight => "large_straight",
            Self::FullHouse => "full_house",
            Self::Chance => "chance",
            Self::Yatzy => "yatzy",
        }
    }

    /// One-line rule summary for the category info dialog.
    #[must_use]
    pub const fn help_text(self) -> &'static str {
        match self {
            Self::Ones => "Sum of all dice showing 1.",
            Self::Twos => "Sum of all dice showing 2.",
            Self::Threes => "Sum of all dice showing 3.",
            Self::Fours => "Sum of all dice showing 4.",
            Self::Fives => "Sum of all dice showing 5.",
            Self::Sixes => "Sum of all dice showing 6.",
            Self::OnePair => "Sum of the two highest matching dice.",
            Self::TwoPairs => {
                "Sum of two different pairs (4 dice). Example: 2-2-5-5-6 scores 2+2+5+5=14."
            }
            Self::ThreeOfAKind => "Sum of three matching dice.",
            Self::FourOfAKind => "Sum of four matching dice.",
            Self::SmallStraight => "Four dice in a row (e.g. 1-2-3-4). Scores 30 points.",
            Self::LargeStraight => "Five dice in a row (e.g. 1-2-3-4-5). Scores 40 points.",
            Self::FullHouse => "Three of a kind plus a pair. Scores 25 points.",
            Self::Chance => "Sum of all dice (any combination).",
            Self::Yatzy => "All five dice the same. Scores 50 points.",
        }
    }

    /// Position on the score sheet, 0-based.
    #[must_use]
    pub fn ordinal(self) -> usize {
        Self::ALL
            .iter()
            .position(|category| *category == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a string names no known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| {
                category.label().eq_ignore_ascii_case(needle)
                    || category.key().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
