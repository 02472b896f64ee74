//! Per-user gamification state
//!
//! One document per user holding XP, denormalized activity counters,
//! the activity streak and earned badges.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::badges::BadgeId;
use super::xp::{level_for_xp, LevelProgress};

/// Denormalized activity counters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Counters {
    #[serde(default)]
    pub items_added: u64,
    #[serde(default)]
    pub wears_logged: u64,
    #[serde(default)]
    pub outfits_logged: u64,
    #[serde(default)]
    pub items_revived: u64,
}

/// Consecutive-day activity streak (UTC days)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Streak {
    #[serde(default)]
    pub current: u32,
    #[serde(default)]
    pub longest: u32,
    #[serde(default)]
    pub last_active: Option<NaiveDate>,
}

impl Streak {
    /// Record activity on `day`. Returns true when the streak grew.
    ///
    /// Activity on the same day as the last one, or backdated before it,
    /// leaves the streak untouched.
    pub fn record(&mut self, day: NaiveDate) -> bool {
        match self.last_active {
            Some(last) if day <= last => return false,
            Some(last) if last.succ_opt() == Some(day) => self.current += 1,
            _ => self.current = 1,
        }
        self.last_active = Some(day);
        self.longest = self.longest.max(self.current);
        true
    }

    /// The streak as seen on `today`: zero once a full day has been missed
    pub fn current_as_of(&self, today: NaiveDate) -> u32 {
        match self.last_active {
            Some(last) if last == today || last.succ_opt() == Some(today) => self.current,
            _ => 0,
        }
    }
}

/// A badge a user has earned
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EarnedBadge {
    pub id: BadgeId,
    pub earned_at: DateTime<Utc>,
}

/// Gamification document for one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GamificationState {
    pub user_id: String,
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub counters: Counters,
    #[serde(default)]
    pub streak: Streak,
    #[serde(default)]
    pub badges: Vec<EarnedBadge>,
    #[serde(default)]
    pub profile_bonus_awarded: bool,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl GamificationState {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            xp: 0,
            counters: Counters::default(),
            streak: Streak::default(),
            badges: Vec::new(),
            profile_bonus_awarded: false,
            updated_at: Utc::now(),
        }
    }

    pub fn level(&self) -> u32 {
        level_for_xp(self.xp)
    }

    pub fn progress(&self) -> LevelProgress {
        LevelProgress::from_xp(self.xp)
    }

    pub fn has_badge(&self, id: BadgeId) -> bool {
        self.badges.iter().any(|b| b.id == id)
    }

    /// Add XP, saturating at `u64::MAX`
    pub fn add_xp(&mut self, amount: u64) {
        self.xp = self.xp.saturating_add(amount);
    }
}
