//! Per-cell score validation.
//!
//! Every category gets a [`CategoryRule`]; the checks run in a fixed order
//! (required, integer, non-negative, maximum, divisibility, exact value) and
//! the first failure wins. Results are derived on demand and never stored.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::category::Category;
use crate::constants::{
    CHANCE_MAX, DICE_COUNT, FOUR_OF_A_KIND_MAX, FULL_HOUSE_SCORE, LARGE_STRAIGHT_SCORE,
    ONE_PAIR_MAX, SMALL_STRAIGHT_SCORE, THREE_OF_A_KIND_MAX, TWO_PAIRS_MAX, YATZY_SCORE,
};
use crate::score::{PlayerScores, ScoreEntry};

/// Why a cell value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellError {
    #[error("Required")]
    Required,
    #[error("Must be an integer")]
    NotInteger,
    #[error("Must be non-negative")]
    Negative,
    #[error("Maximum is {max}")]
    MaxExceeded { max: i64 },
    #[error("Must be divisible by {divisor}")]
    NotDivisible { divisor: i64 },
    #[error("Must be exactly {value}")]
    NotExactValue { value: i64 },
}

impl CellError {
    /// Translation key for the localization layer; placeholders use `{{name}}`.
    #[must_use]
    pub const fn message_key(self) -> &'static str {
        match self {
            Self::Required => "Required",
            Self::NotInteger => "Must be an integer",
            Self::Negative => "Must be non-negative",
            Self::MaxExceeded { .. } => "Maximum is {{max}}",
            Self::NotDivisible { .. } => "Must be divisible by {{divisor}}",
            Self::NotExactValue { .. } => "Must be exactly {{value}}",
        }
    }

    /// Named parameters referenced by [`Self::message_key`].
    #[must_use]
    pub fn params(self) -> BTreeMap<&'static str, i64> {
        let mut params = BTreeMap::new();
        match self {
            Self::MaxExceeded { max } => {
                params.insert("max", max);
            }
            Self::NotDivisible { divisor } => {
                params.insert("divisor", divisor);
            }
            Self::NotExactValue { value } => {
                params.insert("value", value);
            }
            Self::Required | Self::NotInteger | Self::Negative => {}
        }
        params
    }

    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Required)
    }
}

/// Constraints that apply to one category once the value is a non-negative integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryRule {
    /// Highest acceptable value.
    pub max: Option<i64>,
    /// Values must be a multiple of this.
    pub divisor: Option<i64>,
    /// The only non-zero value allowed.
    pub fixed: Option<i64>,
}

impl CategoryRule {
    #[must_use]
    pub const fn for_category(category: Category) -> Self {
        if let Some(face) = category.face_value() {
            return Self {
                max: Some(DICE_COUNT * face),
                divisor: Some(face),
                fixed: None,
            };
        }
        match category {
            Category::OnePair => Self::capped(ONE_PAIR_MAX),
            Category::TwoPairs => Self::capped(TWO_PAIRS_MAX),
            Category::ThreeOfAKind => Self::capped(THREE_OF_A_KIND_MAX),
            Category::FourOfAKind => Self::capped(FOUR_OF_A_KIND_MAX),
            Category::Chance => Self::capped(CHANCE_MAX),
            Category::SmallStraight => Self::fixed(SMALL_STRAIGHT_SCORE),
            Category::LargeStraight => Self::fixed(LARGE_STRAIGHT_SCORE),
            Category::FullHouse => Self::fixed(FULL_HOUSE_SCORE),
            Category::Yatzy => Self::fixed(YATZY_SCORE),
            _ => Self {
                max: None,
                divisor: None,
                fixed: None,
            },
        }
    }

    const fn capped(max: i64) -> Self {
        Self {
            max: Some(max),
            divisor: None,
            fixed: None,
        }
    }

    const fn fixed(value: i64) -> Self {
        Self {
            max: None,
            divisor: None,
            fixed: Some(value),
        }
    }

    /// Apply the numeric checks to an already-parsed value.
    ///
    /// # Errors
    ///
    /// Returns the first failing check in order: negative, maximum,
    /// divisibility, exact value.
    pub const fn check(self, value: i64) -> Result<(), CellError> {
        if value < 0 {
            return Err(CellError::Negative);
        }
        if let Some(max) = self.max
            && value > max
        {
            return Err(CellError::MaxExceeded { max });
        }
        if let Some(divisor) = self.divisor
            && value % divisor != 0
        {
            return Err(CellError::NotDivisible { divisor });
        }
        if let Some(fixed) = self.fixed
            && value != 0
            && value != fixed
        {
            return Err(CellError::NotExactValue { value: fixed });
        }
        Ok(())
    }

    /// Every value in `0..=limit` this rule accepts.
    #[must_use]
    pub fn accepted_values(self, limit: i64) -> Vec<i64> {
        (0..=limit).filter(|v| self.check(*v).is_ok()).collect()
    }
}

/// Validate raw input for a category.
///
/// # Errors
///
/// Returns a [`CellError`] describing the first rule the value breaks.
pub fn validate(category: Category, raw: &str) -> Result<(), CellError> {
    ScoreEntry::parse(raw).validate(category)
}

impl ScoreEntry {
    /// Validate a stored cell against its category.
    ///
    /// # Errors
    ///
    /// Returns a [`CellError`] describing the first rule the value breaks.
    pub const fn validate(&self, category: Category) -> Result<(), CellError> {
        match self {
            Self::Empty => Err(CellError::Required),
            Self::Text(_) => Err(CellError::NotInteger),
            Self::Value(value) => CategoryRule::for_category(category).check(*value),
        }
    }
}

/// Collect every failing cell of a sheet, keyed by category.
#[must_use]
pub fn validate_scores(scores: &PlayerScores) -> BTreeMap<Category, CellError> {
    scores
        .iter()
        .filter_map(|(category, entry)| entry.validate(category).err().map(|e| (category, e)))
        .collect()
}

/// `true` when every category of the sheet is valid.
#[must_use]
pub fn sheet_is_valid(scores: &PlayerScores) -> bool {
    scores
        .iter()
        .all(|(category, entry)| entry.validate(category).is_ok())
}

/// Whether an error should be surfaced to the player yet.
///
/// `Required` stays hidden on untouched cells until a submission has been
/// attempted; every other error shows immediately.
#[must_use]
pub const fn should_display(error: CellError, entry: &ScoreEntry, submit_attempted: bool) -> bool {
    if !error.is_required() {
        return true;
    }
    submit_attempted || !entry.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_required() {
        assert_eq!(validate(Category::Ones, ""), Err(CellError::Required));
        assert_eq!(validate(Category::Yatzy, "  \t"), Err(CellError::Required));
    }

    #[test]
    fn non_integers_and_negatives_are_rejected() {
        assert_eq!(validate(Category::Chance, "abc"), Err(CellError::NotInteger));
        assert_eq!(validate(Category::Chance, "2.5"), Err(CellError::NotInteger));
        assert_eq!(validate(Category::Chance, "-1"), Err(CellError::Negative));
        assert_eq!(validate(Category::Ones, "-3"), Err(CellError::Negative));
    }

    #[test]
    fn upper_categories_accept_multiples_of_face_up_to_five_dice() {
        for category in Category::UPPER {
            let face = category.face_value().unwrap();
            let rule = CategoryRule::for_category(category);
            let expected: Vec<i64> = (0..=5).map(|n| n * face).collect();
            assert_eq!(rule.accepted_values(5 * face + 10), expected, "{category}");
        }
    }

    #[test]
    fn oversized_integers_report_their_range_error() {
        assert_eq!(
            validate(Category::Chance, "99999999999999999999"),
            Err(CellError::MaxExceeded { max: 30 })
        );
        assert_eq!(
            validate(Category::Chance, "-99999999999999999999"),
            Err(CellError::Negative)
        );
        assert_eq!(
            validate(Category::Threes, "99999999999999999999"),
            Err(CellError::MaxExceeded { max: 15 })
        );
    }

    #[test]
    fn upper_checks_max_before_divisibility() {
        assert_eq!(
            validate(Category::Twos, "11"),
            Err(CellError::MaxExceeded { max: 10 })
        );
        assert_eq!(
            validate(Category::Twos, "3"),
            Err(CellError::NotDivisible { divisor: 2 })
        );
        assert_eq!(validate(Category::Twos, "4"), Ok(()));
        assert_eq!(validate(Category::Sixes, "0"), Ok(()));
    }

    #[test]
    fn fixed_categories_accept_zero_or_the_fixed_score() {
        let cases = [
            (Category::SmallStraight, 30),
            (Category::LargeStraight, 40),
            (Category::FullHouse, 25),
            (Category::Yatzy, 50),
        ];
        for (category, fixed) in cases {
            let rule = CategoryRule::for_category(category);
            assert_eq!(rule.accepted_values(100), vec![0, fixed], "{category}");
        }
        assert_eq!(
            validate(Category::SmallStraight, "25"),
            Err(CellError::NotExactValue { value: 30 })
        );
        assert_eq!(validate(Category::SmallStraight, "30"), Ok(()));
        assert_eq!(validate(Category::SmallStraight, "0"), Ok(()));
    }

    #[test]
    fn capped_categories_accept_every_value_up_to_the_max() {
        let cases = [
            (Category::OnePair, 12),
            (Category::TwoPairs, 22),
            (Category::ThreeOfAKind, 18),
            (Category::FourOfAKind, 24),
            (Category::Chance, 30),
        ];
        for (category, max) in cases {
            let rule = CategoryRule::for_category(category);
            let expected: Vec<i64> = (0..=max).collect();
            assert_eq!(rule.accepted_values(max + 20), expected, "{category}");
            assert_eq!(
                rule.check(max + 1),
                Err(CellError::MaxExceeded { max }),
                "{category}"
            );
        }
    }

    #[test]
    fn errors_expose_message_keys_and_params() {
        let err = CellError::NotDivisible { divisor: 2 };
        assert_eq!(err.message_key(), "Must be divisible by {{divisor}}");
        assert_eq!(err.params().get("divisor"), Some(&2));
        assert_eq!(err.to_string(), "Must be divisible by 2");
        assert!(CellError::Required.params().is_empty());
        assert_eq!(
            CellError::NotExactValue { value: 30 }.to_string(),
            "Must be exactly 30"
        );
    }

    #[test]
    fn required_is_hidden_until_touched_or_submitted() {
        let blank = ScoreEntry::Empty;
        assert!(!should_display(CellError::Required, &blank, false));
        assert!(should_display(CellError::Required, &blank, true));
        let typed = ScoreEntry::parse("x");
        assert!(should_display(CellError::NotInteger, &typed, false));
        assert!(should_display(
            CellError::MaxExceeded { max: 5 },
            &ScoreEntry::Value(6),
            false
        ));
    }

    #[test]
    fn validate_scores_reports_only_failing_cells() {
        let mut scores = PlayerScores::new();
        for category in Category::ALL {
            scores.set(category, ScoreEntry::Value(0));
        }
        assert!(validate_scores(&scores).is_empty());
        assert!(sheet_is_valid(&scores));

        scores.set(Category::Twos, ScoreEntry::parse("3"));
        scores.set(Category::Chance, ScoreEntry::Empty);
        let errors = validate_scores(&scores);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get(&Category::Twos),
            Some(&CellError::NotDivisible { divisor: 2 })
        );
        assert_eq!(errors.get(&Category::Chance), Some(&CellError::Required));
        assert!(!sheet_is_valid(&scores));
    }

    #[test]
    fn errors_serialize_with_kind_tag() {
        let json = serde_json::to_value(CellError::MaxExceeded { max: 12 }).unwrap();
        assert_eq!(json["kind"], "max_exceeded");
        assert_eq!(json["max"], 12);
    }
}
