//! XP awards and levels
//!
//! Level `n` requires `100 * n * (n - 1) / 2` total XP, so each level costs
//! 100 XP more than the one before: 0, 100, 300, 600, 1000, ...

use serde::{Deserialize, Serialize};

/// Highest reachable level
pub const MAX_LEVEL: u32 = 50;

/// XP granted per action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct XpRewards {
    #[serde(default = "default_item_added")]
    pub item_added: u64,
    #[serde(default = "default_wear_logged")]
    pub wear_logged: u64,
    #[serde(default = "default_outfit_logged")]
    pub outfit_logged: u64,
    #[serde(default = "default_item_revived")]
    pub item_revived: u64,
    #[serde(default = "default_profile_completed")]
    pub profile_completed: u64,
    #[serde(default = "default_streak_week")]
    pub streak_week: u64,
}

fn default_item_added() -> u64 {
    10
}

fn default_wear_logged() -> u64 {
    5
}

fn default_outfit_logged() -> u64 {
    15
}

fn default_item_revived() -> u64 {
    20
}

fn default_profile_completed() -> u64 {
    50
}

fn default_streak_week() -> u64 {
    50
}

impl Default for XpRewards {
    fn default() -> Self {
        Self {
            item_added: default_item_added(),
            wear_logged: default_wear_logged(),
            outfit_logged: default_outfit_logged(),
            item_revived: default_item_revived(),
            profile_completed: default_profile_completed(),
            streak_week: default_streak_week(),
        }
    }
}

/// Total XP needed to reach `level`
pub fn xp_for_level(level: u32) -> u64 {
    let n = level.clamp(1, MAX_LEVEL) as u64;
    100 * n * (n - 1) / 2
}

/// Level reached with `xp` total XP
pub fn level_for_xp(xp: u64) -> u32 {
    let mut level = 1;
    while level < MAX_LEVEL && xp_for_level(level + 1) <= xp {
        level += 1;
    }
    level
}

/// Title shown for a level band
pub fn level_title(level: u32) -> &'static str {
    match level {
        0..=4 => "Novice",
        5..=9 => "Stylist",
        10..=19 => "Trendsetter",
        20..=34 => "Curator",
        _ => "Icon",
    }
}

/// Where a user stands between two levels
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LevelProgress {
    pub level: u32,
    pub title: &'static str,
    pub xp: u64,
    /// XP at which the current level started
    pub current_floor: u64,
    /// XP needed for the next level, `None` at the cap
    pub next_threshold: Option<u64>,
    /// Fraction of the way to the next level, `1.0` at the cap
    pub progress: f64,
}

impl LevelProgress {
    pub fn from_xp(xp: u64) -> Self {
        let level = level_for_xp(xp);
        let current_floor = xp_for_level(level);
        let next_threshold = (level < MAX_LEVEL).then(|| xp_for_level(level + 1));

        let progress = match next_threshold {
            Some(next) => (xp - current_floor) as f64 / (next - current_floor) as f64,
            None => 1.0,
        };

        Self {
            level,
            title: level_title(level),
            xp,
            current_floor,
            next_threshold,
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(xp_for_level(1), 0);
        assert_eq!(xp_for_level(2), 100);
        assert_eq!(xp_for_level(3), 300);
        assert_eq!(xp_for_level(4), 600);
        assert_eq!(xp_for_level(10), 4500);
    }

    #[test]
    fn test_level_for_xp() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(299), 2);
        assert_eq!(level_for_xp(300), 3);
        assert_eq!(level_for_xp(u64::MAX / 2), MAX_LEVEL);
    }

    #[test]
    fn test_progress() {
        let p = LevelProgress::from_xp(200);
        assert_eq!(p.level, 2);
        assert_eq!(p.current_floor, 100);
        assert_eq!(p.next_threshold, Some(300));
        assert!((p.progress - 0.5).abs() < 1e-9);
        assert_eq!(p.title, "Novice");
    }

    #[test]
    fn test_progress_at_cap() {
        let p = LevelProgress::from_xp(xp_for_level(MAX_LEVEL) + 10);
        assert_eq!(p.level, MAX_LEVEL);
        assert_eq!(p.next_threshold, None);
        assert_eq!(p.progress, 1.0);
        assert_eq!(p.title, "Icon");
    }
}
