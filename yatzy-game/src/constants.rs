//! Rule constants for Scandinavian Yatzy scorekeeping.

/// Number of dice rolled per turn.
pub const DICE_COUNT: i64 = 5;

/// Upper-section sums strictly above this value earn the bonus.
pub const BONUS_THRESHOLD: i64 = 62;

/// Points awarded for reaching the upper-section bonus.
pub const BONUS_POINTS: i64 = 35;

/// Highest achievable One Pair score (6 + 6).
pub const ONE_PAIR_MAX: i64 = 12;

/// Highest achievable Two Pairs score (6 + 6 + 5 + 5).
pub const TWO_PAIRS_MAX: i64 = 22;

/// Highest achievable Three of a Kind score (6 + 6 + 6).
pub const THREE_OF_A_KIND_MAX: i64 = 18;

/// Highest achievable Four of a Kind score (6 + 6 + 6 + 6).
pub const FOUR_OF_A_KIND_MAX: i64 = 24;

/// Highest achievable Chance score (five sixes).
pub const CHANCE_MAX: i64 = 30;

pub const SMALL_STRAIGHT_SCORE: i64 = 30;
pub const LARGE_STRAIGHT_SCORE: i64 = 40;
pub const FULL_HOUSE_SCORE: i64 = 25;
pub const YATZY_SCORE: i64 = 50;

/// Storage key used for the persisted game snapshot.
pub const STORAGE_KEY: &str = "yatzy-state";

/// Visually distinct player colors handed out at game start.
pub const PLAYER_PALETTE: [&str; 18] = [
    "#64b5f6", // blue
    "#81c784", // green
    "#ffd54f", // yellow
    "#ba68c8", // purple
    "#4db6ac", // teal
    "#ffb74d", // orange
    "#a1887f", // brown
    "#90a4ae", // blue gray
    "#f06292", // pink
    "#7986cb", // indigo
    "#aed581", // light green
    "#fff176", // light yellow
    "#9575cd", // violet
    "#4fc3f7", // light blue
    "#ff8a65", // light orange
    "#dce775", // lime
    "#b0bec5", // gray
    "#2196f3", // strong blue
];
