//! Wardrobe Gamification
//!
//! XP, levels, streaks, badges, challenges and the Global Wardrobe Score:
//!
//! - **xp**: rewards per action and the level curve
//! - **state**: per-user counters, streak and earned badges
//! - **badges**: static badge catalog
//! - **challenges**: time-boxed challenges with validated progress
//! - **score**: the Global Wardrobe Score
//! - **engine**: applies user activity to all of the above
//!
//! # Architecture
//!
//! ```text
//! Activity → Engine → XP + counters + streak
//!                   → challenge progress (validated)
//!                   → badges
//!                   → GamificationOutcome → WebSocket toasts
//! ```

pub mod badges;
pub mod challenges;
pub mod engine;
pub mod score;
pub mod state;
pub mod xp;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StorageError;

pub use badges::{Badge, BadgeId};
pub use challenges::{Challenge, ChallengeKind, Enrollment, EnrollmentStatus, ProgressEvent};
pub use engine::{detect_revival, Activity, ChallengeView, GamificationEngine, GamificationOutcome, WornItem};
pub use score::{GlobalWardrobeScore, Grade, ScoreBreakdown, ScoreWeights};
pub use state::{Counters, EarnedBadge, GamificationState, Streak};
pub use xp::{level_for_xp, xp_for_level, LevelProgress, XpRewards};

/// Errors from the gamification layer
#[derive(Error, Debug)]
pub enum GamificationError {
    #[error("Invalid score weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid gamification settings: {0}")]
    InvalidSettings(String),

    #[error("Unknown challenge: {0}")]
    UnknownChallenge(String),

    #[error("Already enrolled in challenge: {0}")]
    AlreadyEnrolled(String),

    #[error("Active challenge limit reached ({limit})")]
    ChallengeLimit { limit: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type GamificationResult<T> = Result<T, GamificationError>;

/// Largest accepted day window or threshold (about ten years)
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Tunables for the engine and score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GamificationSettings {
    /// Days unworn after which a wear counts as a revival
    #[serde(default = "default_revival_threshold_days")]
    pub revival_threshold_days: i64,

    /// Lookback window for the Global Wardrobe Score
    #[serde(default = "default_score_window_days")]
    pub score_window_days: i64,

    /// Days unworn after which the dashboard lists an item as neglected
    #[serde(default = "default_neglected_days")]
    pub neglected_days: i64,

    #[serde(default)]
    pub weights: ScoreWeights,

    #[serde(default)]
    pub xp: XpRewards,
}

fn default_revival_threshold_days() -> i64 {
    90
}

fn default_score_window_days() -> i64 {
    90
}

fn default_neglected_days() -> i64 {
    90
}

impl Default for GamificationSettings {
    fn default() -> Self {
        Self {
            revival_threshold_days: default_revival_threshold_days(),
            score_window_days: default_score_window_days(),
            neglected_days: default_neglected_days(),
            weights: ScoreWeights::default(),
            xp: XpRewards::default(),
        }
    }
}

impl GamificationSettings {
    pub fn validate(&self) -> GamificationResult<()> {
        for (name, days) in [
            ("revival_threshold_days", self.revival_threshold_days),
            ("score_window_days", self.score_window_days),
            ("neglected_days", self.neglected_days),
        ] {
            if !(1..=MAX_WINDOW_DAYS).contains(&days) {
                return Err(GamificationError::InvalidSettings(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MAX_WINDOW_DAYS, days
                )));
            }
        }
        self.weights.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_valid() {
        assert!(GamificationSettings::default().validate().is_ok());
    }

    #[test]
    fn test_settings_from_partial_toml() {
        let settings: GamificationSettings = toml::from_str(
            r#"
            revival_threshold_days = 60

            [xp]
            wear_logged = 8
            "#,
        )
        .unwrap();

        assert_eq!(settings.revival_threshold_days, 60);
        assert_eq!(settings.score_window_days, 90);
        assert_eq!(settings.xp.wear_logged, 8);
        assert_eq!(settings.xp.item_added, 10);
        assert_eq!(settings.weights, ScoreWeights::default());
    }

    #[test]
    fn test_non_positive_window_rejected() {
        let settings = GamificationSettings {
            score_window_days: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(GamificationError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_oversized_windows_rejected() {
        for settings in [
            GamificationSettings {
                score_window_days: 1_000_000_000_000,
                ..Default::default()
            },
            GamificationSettings {
                revival_threshold_days: MAX_WINDOW_DAYS + 1,
                ..Default::default()
            },
            GamificationSettings {
                neglected_days: i64::MAX,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                settings.validate(),
                Err(GamificationError::InvalidSettings(_))
            ));
        }

        let widest = GamificationSettings {
            score_window_days: MAX_WINDOW_DAYS,
            revival_threshold_days: MAX_WINDOW_DAYS,
            neglected_days: MAX_WINDOW_DAYS,
            ..Default::default()
        };
        assert!(widest.validate().is_ok());
    }
}
