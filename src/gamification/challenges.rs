//! Challenges and progress validation
//!
//! A challenge is a time-boxed goal a user opts into. Progress is never
//! reported by clients directly: it is derived from wear and outfit events,
//! and each event is validated against the enrollment window before it
//! counts.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// What a challenge counts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Distinct items worn
    WearDistinctItems,
    /// Distinct items revived
    ReviveItems,
    /// Outfits logged
    LogOutfits,
    /// Distinct days with any activity
    ActiveDays,
}

/// A challenge definition
#[derive(Debug, Clone, Serialize)]
pub struct Challenge {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub kind: ChallengeKind,
    pub target: u32,
    pub duration_days: i64,
    pub xp_reward: u64,
}

const CATALOG: &[Challenge] = &[
    Challenge {
        id: "mix-it-up",
        title: "Mix It Up",
        description: "Wear 15 different items in two weeks",
        kind: ChallengeKind::WearDistinctItems,
        target: 15,
        duration_days: 14,
        xp_reward: 150,
    },
    Challenge {
        id: "full-rotation",
        title: "Full Rotation",
        description: "Wear 30 different items in 30 days",
        kind: ChallengeKind::WearDistinctItems,
        target: 30,
        duration_days: 30,
        xp_reward: 300,
    },
    Challenge {
        id: "closet-revival",
        title: "Closet Revival",
        description: "Bring 3 forgotten items back into rotation this month",
        kind: ChallengeKind::ReviveItems,
        target: 3,
        duration_days: 30,
        xp_reward: 200,
    },
    Challenge {
        id: "outfit-diary",
        title: "Outfit Diary",
        description: "Log 7 outfits in a week",
        kind: ChallengeKind::LogOutfits,
        target: 7,
        duration_days: 7,
        xp_reward: 100,
    },
    Challenge {
        id: "consistency",
        title: "Consistency",
        description: "Be active on 10 days within two weeks",
        kind: ChallengeKind::ActiveDays,
        target: 10,
        duration_days: 14,
        xp_reward: 150,
    },
];

/// All challenge definitions
pub fn catalog() -> &'static [Challenge] {
    CATALOG
}

/// Look up a challenge by id
pub fn challenge(id: &str) -> Option<&'static Challenge> {
    CATALOG.iter().find(|c| c.id == id)
}

/// An activity that may advance challenges
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Wear {
        item_id: String,
        at: DateTime<Utc>,
        revived: bool,
    },
    Outfit {
        outfit_id: String,
        at: DateTime<Utc>,
    },
}

impl ProgressEvent {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            ProgressEvent::Wear { at, .. } | ProgressEvent::Outfit { at, .. } => *at,
        }
    }

    /// Deduplication key under a challenge kind, `None` if the event does
    /// not apply to that kind
    fn key_for(&self, kind: ChallengeKind) -> Option<String> {
        match (kind, self) {
            (ChallengeKind::WearDistinctItems, ProgressEvent::Wear { item_id, .. }) => {
                Some(item_id.clone())
            }
            (ChallengeKind::ReviveItems, ProgressEvent::Wear { item_id, revived: true, .. }) => {
                Some(item_id.clone())
            }
            (ChallengeKind::LogOutfits, ProgressEvent::Outfit { outfit_id, .. }) => {
                Some(outfit_id.clone())
            }
            (ChallengeKind::ActiveDays, event) => {
                Some(event.at().date_naive().format("%Y-%m-%d").to_string())
            }
            _ => None,
        }
    }
}

/// Why an event did not advance an enrollment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotApplicable,
    BeforeJoin,
    AfterEnd,
    InFuture,
    Duplicate,
    AlreadyComplete,
}

/// Outcome of applying an event to an enrollment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressResult {
    Counted { progress: u32 },
    Completed,
    Rejected(Rejection),
}

/// Lifecycle of an enrollment, computed at read time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Expired,
}

/// A user's participation in a challenge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enrollment {
    pub id: String,
    pub owner_id: String,
    pub challenge_id: String,
    pub joined_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub progress: u32,
    /// Keys already counted (item ids, outfit ids or days)
    #[serde(default)]
    pub counted: Vec<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    /// Start a challenge at `now`
    pub fn start(owner_id: impl Into<String>, challenge: &Challenge, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            challenge_id: challenge.id.to_string(),
            joined_at: now,
            ends_at: now + Duration::days(challenge.duration_days),
            progress: 0,
            counted: Vec::new(),
            completed_at: None,
        }
    }

    /// Reset an expired enrollment so the challenge can be attempted again
    pub fn restart(&mut self, challenge: &Challenge, now: DateTime<Utc>) {
        self.joined_at = now;
        self.ends_at = now + Duration::days(challenge.duration_days);
        self.progress = 0;
        self.counted.clear();
        self.completed_at = None;
    }

    pub fn status(&self, now: DateTime<Utc>) -> EnrollmentStatus {
        if self.completed_at.is_some() {
            EnrollmentStatus::Completed
        } else if now > self.ends_at {
            EnrollmentStatus::Expired
        } else {
            EnrollmentStatus::Active
        }
    }

    /// Validate an event and count it toward the challenge.
    ///
    /// Events must fall within `[joined_at, ends_at]`, must not be in the
    /// future relative to `now`, and each key counts once. Progress never
    /// exceeds the target; reaching it stamps `completed_at`.
    pub fn apply(
        &mut self,
        challenge: &Challenge,
        event: &ProgressEvent,
        now: DateTime<Utc>,
    ) -> ProgressResult {
        if self.completed_at.is_some() {
            return ProgressResult::Rejected(Rejection::AlreadyComplete);
        }

        let Some(key) = event.key_for(challenge.kind) else {
            return ProgressResult::Rejected(Rejection::NotApplicable);
        };

        let at = event.at();
        if at > now {
            return ProgressResult::Rejected(Rejection::InFuture);
        }
        if at < self.joined_at {
            return ProgressResult::Rejected(Rejection::BeforeJoin);
        }
        if at > self.ends_at {
            return ProgressResult::Rejected(Rejection::AfterEnd);
        }
        if self.counted.contains(&key) {
            return ProgressResult::Rejected(Rejection::Duplicate);
        }

        self.counted.push(key);
        self.progress = (self.progress + 1).min(challenge.target);

        if self.progress >= challenge.target {
            self.completed_at = Some(now);
            ProgressResult::Completed
        } else {
            ProgressResult::Counted {
                progress: self.progress,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wear(item: &str, at: DateTime<Utc>) -> ProgressEvent {
        ProgressEvent::Wear {
            item_id: item.to_string(),
            at,
            revived: false,
        }
    }

    #[test]
    fn test_catalog_lookup() {
        assert!(challenge("mix-it-up").is_some());
        assert!(challenge("nope").is_none());
        assert!(catalog().iter().all(|c| c.target > 0 && c.duration_days > 0));
    }

    #[test]
    fn test_distinct_items_count_once() {
        let now = Utc::now();
        let c = challenge("mix-it-up").unwrap();
        let mut e = Enrollment::start("u1", c, now - Duration::days(1));

        assert_eq!(
            e.apply(c, &wear("a", now), now),
            ProgressResult::Counted { progress: 1 }
        );
        assert_eq!(
            e.apply(c, &wear("a", now), now),
            ProgressResult::Rejected(Rejection::Duplicate)
        );
        assert_eq!(e.progress, 1);
    }

    #[test]
    fn test_window_validation() {
        let now = Utc::now();
        let c = challenge("mix-it-up").unwrap();
        let mut e = Enrollment::start("u1", c, now - Duration::days(2));

        assert_eq!(
            e.apply(c, &wear("a", now - Duration::days(3)), now),
            ProgressResult::Rejected(Rejection::BeforeJoin)
        );
        assert_eq!(
            e.apply(c, &wear("a", now + Duration::hours(1)), now),
            ProgressResult::Rejected(Rejection::InFuture)
        );

        let later = now + Duration::days(20);
        assert_eq!(
            e.apply(c, &wear("b", later), later),
            ProgressResult::Rejected(Rejection::AfterEnd)
        );
        assert_eq!(e.status(later), EnrollmentStatus::Expired);
    }

    #[test]
    fn test_completion_caps_progress() {
        let now = Utc::now();
        let c = challenge("closet-revival").unwrap();
        let mut e = Enrollment::start("u1", c, now - Duration::days(1));

        for (i, item) in ["a", "b", "c"].iter().enumerate() {
            let ev = ProgressEvent::Wear {
                item_id: item.to_string(),
                at: now,
                revived: true,
            };
            let result = e.apply(c, &ev, now);
            if i < 2 {
                assert!(matches!(result, ProgressResult::Counted { .. }));
            } else {
                assert_eq!(result, ProgressResult::Completed);
            }
        }

        assert_eq!(e.progress, 3);
        assert_eq!(e.status(now), EnrollmentStatus::Completed);
        assert_eq!(
            e.apply(c, &wear("d", now), now),
            ProgressResult::Rejected(Rejection::AlreadyComplete)
        );
    }

    #[test]
    fn test_non_revival_wear_not_applicable() {
        let now = Utc::now();
        let c = challenge("closet-revival").unwrap();
        let mut e = Enrollment::start("u1", c, now - Duration::days(1));
        assert_eq!(
            e.apply(c, &wear("a", now), now),
            ProgressResult::Rejected(Rejection::NotApplicable)
        );
    }

    #[test]
    fn test_active_days_dedup_by_day() {
        let now = Utc::now();
        let c = challenge("consistency").unwrap();
        let mut e = Enrollment::start("u1", c, now - Duration::days(5));

        let outfit = ProgressEvent::Outfit {
            outfit_id: "o1".to_string(),
            at: now,
        };
        assert!(matches!(e.apply(c, &wear("a", now), now), ProgressResult::Counted { .. }));
        assert_eq!(
            e.apply(c, &outfit, now),
            ProgressResult::Rejected(Rejection::Duplicate)
        );
    }

    #[test]
    fn test_restart_expired() {
        let now = Utc::now();
        let c = challenge("outfit-diary").unwrap();
        let mut e = Enrollment::start("u1", c, now - Duration::days(30));
        e.progress = 3;
        assert_eq!(e.status(now), EnrollmentStatus::Expired);

        e.restart(c, now);
        assert_eq!(e.status(now), EnrollmentStatus::Active);
        assert_eq!(e.progress, 0);
    }
}
