//! Player display colors.
//!
//! Colors are presentation data, but the engine owns the assignment so a
//! restored game keeps the same colors. Selection goes through an injected
//! RNG so tests can seed it.
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

use crate::constants::PLAYER_PALETTE;

/// Pick a palette color not in `existing`; falls back to any palette color
/// once every entry is taken.
pub fn pick_color<R: Rng + ?Sized>(existing: &[&str], rng: &mut R) -> String {
    let available: Vec<&str> = PLAYER_PALETTE
        .iter()
        .copied()
        .filter(|color| !existing.contains(color))
        .collect();
    let pool: &[&str] = if available.is_empty() {
        &PLAYER_PALETTE
    } else {
        &available
    };
    pool.choose(rng)
        .copied()
        .unwrap_or(PLAYER_PALETTE[0])
        .to_string()
}

/// Give every player a distinct color (as long as the palette lasts).
pub fn assign_colors<R: Rng + ?Sized>(players: &[String], rng: &mut R) -> BTreeMap<String, String> {
    let mut used: Vec<String> = Vec::with_capacity(players.len());
    let mut colors = BTreeMap::new();
    for player in players {
        let existing: Vec<&str> = used.iter().map(String::as_str).collect();
        let color = pick_color(&existing, rng);
        used.push(color.clone());
        colors.insert(player.clone(), color);
    }
    colors
}

/// Choose a new color for `player` that differs from their current one and
/// from every other player's color when the palette allows it.
pub fn next_color<R: Rng + ?Sized>(
    colors: &BTreeMap<String, String>,
    player: &str,
    rng: &mut R,
) -> String {
    let current = colors.get(player).map(String::as_str);
    let mut taken: Vec<&str> = colors
        .iter()
        .filter(|(name, _)| name.as_str() != player)
        .map(|(_, color)| color.as_str())
        .collect();
    if let Some(current) = current {
        taken.push(current);
    }
    let candidate = pick_color(&taken, rng);
    if Some(candidate.as_str()) != current {
        return candidate;
    }
    // Every palette entry is taken; settle for anything but the current color.
    let others: Vec<&str> = PLAYER_PALETTE
        .iter()
        .copied()
        .filter(|color| Some(*color) != current)
        .collect();
    others
        .choose(rng)
        .map_or(candidate, |color| (*color).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::collections::HashSet;

    fn names(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("Player {i}")).collect()
    }

    #[test]
    fn assigns_distinct_colors_within_palette() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let players = names(PLAYER_PALETTE.len());
        let colors = assign_colors(&players, &mut rng);
        let unique: HashSet<&String> = colors.values().collect();
        assert_eq!(unique.len(), PLAYER_PALETTE.len());
        assert!(colors.values().all(|c| PLAYER_PALETTE.contains(&c.as_str())));
    }

    #[test]
    fn reuses_palette_when_players_outnumber_colors() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let players = names(PLAYER_PALETTE.len() + 3);
        let colors = assign_colors(&players, &mut rng);
        assert_eq!(colors.len(), players.len());
    }

    #[test]
    fn same_seed_gives_same_assignment() {
        let players = names(4);
        let first = assign_colors(&players, &mut ChaCha20Rng::seed_from_u64(3));
        let second = assign_colors(&players, &mut ChaCha20Rng::seed_from_u64(3));
        assert_eq!(first, second);
    }

    #[test]
    fn next_color_changes_and_avoids_other_players() {
        let mut rng = ChaCha20Rng::seed_from_u64(99);
        let players = names(3);
        let colors = assign_colors(&players, &mut rng);
        for _ in 0..20 {
            let fresh = next_color(&colors, "Player 1", &mut rng);
            assert_ne!(Some(&fresh), colors.get("Player 1"));
            assert_ne!(Some(&fresh), colors.get("Player 2"));
            assert_ne!(Some(&fresh), colors.get("Player 3"));
        }
    }

    #[test]
    fn next_color_still_changes_when_palette_is_exhausted() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let players = names(PLAYER_PALETTE.len());
        let colors = assign_colors(&players, &mut rng);
        let fresh = next_color(&colors, "Player 4", &mut rng);
        assert_ne!(Some(&fresh), colors.get("Player 4"));
    }
}
