//! Gamification Engine
//!
//! Applies user activity to the stored gamification state: XP, counters,
//! streak, challenge progress and badges. Each call is a single
//! load-modify-store cycle serialized by an internal lock, so concurrent
//! handlers for the same user cannot lose updates.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::badges::{self, BadgeId};
use super::challenges::{self, Challenge, Enrollment, EnrollmentStatus, ProgressEvent, ProgressResult};
use super::score::{self, GlobalWardrobeScore};
use super::state::GamificationState;
use super::{GamificationError, GamificationResult, GamificationSettings};
use crate::storage::Repository;
use crate::wardrobe::{TierLimits, WardrobeItem};

/// An item worn as part of an activity
#[derive(Debug, Clone, PartialEq)]
pub struct WornItem {
    pub item_id: String,
    pub revived: bool,
}

/// Something the user did that may earn rewards
#[derive(Debug, Clone, PartialEq)]
pub enum Activity {
    ItemAdded {
        item_id: String,
    },
    WearLogged {
        item_id: String,
        worn_at: DateTime<Utc>,
        revived: bool,
    },
    OutfitLogged {
        outfit_id: String,
        worn_at: DateTime<Utc>,
        items: Vec<WornItem>,
    },
    ProfileUpdated {
        complete: bool,
    },
}

/// What a recorded activity earned
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GamificationOutcome {
    pub xp_gained: u64,
    pub total_xp: u64,
    pub level_before: u32,
    pub level_after: u32,
    pub streak: u32,
    pub badges_unlocked: Vec<BadgeId>,
    pub challenges_completed: Vec<String>,
}

impl GamificationOutcome {
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }

    /// Fold a later outcome into this one, as if both were one action
    pub fn merge(mut self, later: GamificationOutcome) -> Self {
        self.xp_gained += later.xp_gained;
        self.total_xp = later.total_xp;
        self.level_after = later.level_after;
        self.streak = later.streak;
        self.badges_unlocked.extend(later.badges_unlocked);
        self.challenges_completed.extend(later.challenges_completed);
        self
    }
}

/// A catalog challenge with the user's enrollment, if any
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeView {
    #[serde(flatten)]
    pub challenge: Challenge,
    pub enrollment: Option<Enrollment>,
    pub status: Option<EnrollmentStatus>,
}

/// Whether wearing `item` at `worn_at` brings it back from neglect.
///
/// Measured from the previous wear, or from when the item was added if it
/// has never been worn. Must be called before the wear is recorded on the
/// item.
pub fn detect_revival(item: &WardrobeItem, worn_at: DateTime<Utc>, threshold_days: i64) -> bool {
    let reference = item.last_worn_at.unwrap_or(item.created_at);
    worn_at - reference >= Duration::days(threshold_days)
}

/// Applies activity to persisted gamification state
pub struct GamificationEngine {
    repo: Repository,
    settings: GamificationSettings,
    write_lock: Mutex<()>,
}

impl GamificationEngine {
    pub fn new(repo: Repository, settings: GamificationSettings) -> Self {
        Self {
            repo,
            settings,
            write_lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &GamificationSettings {
        &self.settings
    }

    /// Current state for a user
    pub async fn state(&self, user_id: &str) -> GamificationResult<GamificationState> {
        Ok(self.repo.gamification(user_id).await?)
    }

    /// Record an activity and return what it earned
    pub async fn record(
        &self,
        user_id: &str,
        activity: Activity,
        now: DateTime<Utc>,
    ) -> GamificationResult<GamificationOutcome> {
        let _guard = self.write_lock.lock().await;

        let rewards = self.settings.xp;
        let mut state = self.repo.gamification(user_id).await?;
        let level_before = state.level();
        let mut xp_gained = 0u64;
        let mut events = Vec::new();
        let mut active_at = None;

        match activity {
            Activity::ItemAdded { item_id } => {
                state.counters.items_added += 1;
                xp_gained += rewards.item_added;
                tracing::debug!(user_id, item_id = %item_id, "Item added");
            }
            Activity::WearLogged {
                item_id,
                worn_at,
                revived,
            } => {
                xp_gained += self.count_wear(&mut state, revived);
                events.push(ProgressEvent::Wear {
                    item_id,
                    at: worn_at,
                    revived,
                });
                active_at = Some(worn_at);
            }
            Activity::OutfitLogged {
                outfit_id,
                worn_at,
                items,
            } => {
                state.counters.outfits_logged += 1;
                xp_gained += rewards.outfit_logged;
                for worn in items {
                    xp_gained += self.count_wear(&mut state, worn.revived);
                    events.push(ProgressEvent::Wear {
                        item_id: worn.item_id,
                        at: worn_at,
                        revived: worn.revived,
                    });
                }
                events.push(ProgressEvent::Outfit {
                    outfit_id,
                    at: worn_at,
                });
                active_at = Some(worn_at);
            }
            Activity::ProfileUpdated { complete } => {
                if complete && !state.profile_bonus_awarded {
                    state.profile_bonus_awarded = true;
                    xp_gained += rewards.profile_completed;
                }
            }
        }

        if let Some(at) = active_at.filter(|at| *at <= now) {
            if state.streak.record(at.date_naive()) && state.streak.current % 7 == 0 {
                xp_gained += rewards.streak_week;
                tracing::debug!(user_id, streak = state.streak.current, "Streak milestone");
            }
        }

        let mut challenges_completed = Vec::new();
        if !events.is_empty() {
            for mut enrollment in self.repo.enrollments(user_id).await? {
                if enrollment.status(now) != EnrollmentStatus::Active {
                    continue;
                }
                let Some(challenge) = challenges::challenge(&enrollment.challenge_id) else {
                    tracing::warn!(challenge_id = %enrollment.challenge_id, "Enrollment for unknown challenge");
                    continue;
                };

                let mut changed = false;
                for event in &events {
                    match enrollment.apply(challenge, event, now) {
                        ProgressResult::Counted { .. } => changed = true,
                        ProgressResult::Completed => {
                            changed = true;
                            xp_gained += challenge.xp_reward;
                            challenges_completed.push(challenge.id.to_string());
                            tracing::info!(user_id, challenge = challenge.id, "Challenge completed");
                        }
                        ProgressResult::Rejected(reason) => {
                            tracing::trace!(challenge = challenge.id, ?reason, "Progress event rejected");
                        }
                    }
                }
                if changed {
                    self.repo.save_enrollment(&enrollment).await?;
                }
            }
        }

        state.add_xp(xp_gained);
        let badges_unlocked = badges::award_pending(&mut state, now);
        state.updated_at = now;
        self.repo.save_gamification(&state).await?;

        let outcome = GamificationOutcome {
            xp_gained,
            total_xp: state.xp,
            level_before,
            level_after: state.level(),
            streak: state.streak.current,
            badges_unlocked,
            challenges_completed,
        };

        if outcome.leveled_up() {
            tracing::info!(user_id, level = outcome.level_after, "Level up");
        }

        Ok(outcome)
    }

    fn count_wear(&self, state: &mut GamificationState, revived: bool) -> u64 {
        state.counters.wears_logged += 1;
        let mut xp = self.settings.xp.wear_logged;
        if revived {
            state.counters.items_revived += 1;
            xp += self.settings.xp.item_revived;
        }
        xp
    }

    /// Enroll a user in a challenge.
    ///
    /// An expired enrollment is restarted; an active or completed one is a
    /// conflict. The number of concurrently active enrollments is bounded
    /// by the subscription tier.
    pub async fn join_challenge(
        &self,
        user_id: &str,
        challenge_id: &str,
        limits: &TierLimits,
        now: DateTime<Utc>,
    ) -> GamificationResult<Enrollment> {
        let challenge = challenges::challenge(challenge_id)
            .ok_or_else(|| GamificationError::UnknownChallenge(challenge_id.to_string()))?;

        let _guard = self.write_lock.lock().await;
        let enrollments = self.repo.enrollments(user_id).await?;

        let existing = enrollments
            .iter()
            .find(|e| e.challenge_id == challenge.id)
            .cloned();
        if let Some(e) = &existing {
            if e.status(now) != EnrollmentStatus::Expired {
                return Err(GamificationError::AlreadyEnrolled(challenge.id.to_string()));
            }
        }

        let active = enrollments
            .iter()
            .filter(|e| e.status(now) == EnrollmentStatus::Active)
            .count();
        if active >= limits.max_active_challenges {
            return Err(GamificationError::ChallengeLimit {
                limit: limits.max_active_challenges,
            });
        }

        let enrollment = match existing {
            Some(mut e) => {
                e.restart(challenge, now);
                e
            }
            None => Enrollment::start(user_id, challenge, now),
        };
        self.repo.save_enrollment(&enrollment).await?;

        tracing::info!(user_id, challenge = challenge.id, ends_at = %enrollment.ends_at, "Joined challenge");
        Ok(enrollment)
    }

    /// Every catalog challenge alongside the user's enrollment
    pub async fn challenges(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> GamificationResult<Vec<ChallengeView>> {
        let enrollments = self.repo.enrollments(user_id).await?;
        Ok(challenges::catalog()
            .iter()
            .map(|c| {
                let enrollment = enrollments.iter().find(|e| e.challenge_id == c.id).cloned();
                let status = enrollment.as_ref().map(|e| e.status(now));
                ChallengeView {
                    challenge: c.clone(),
                    enrollment,
                    status,
                }
            })
            .collect())
    }

    /// Compute the Global Wardrobe Score from stored documents
    pub async fn score(&self, user_id: &str, now: DateTime<Utc>) -> GamificationResult<GlobalWardrobeScore> {
        let items = self.repo.items(user_id).await?;
        let wears = self.repo.wears(user_id).await?;
        let outfits = self.repo.outfits(user_id).await?;

        Ok(score::compute(
            &items,
            &wears,
            &outfits,
            &self.settings.weights,
            self.settings.score_window_days,
            now,
        ))
    }
}
