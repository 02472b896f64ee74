//! Badge catalog and evaluation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{EarnedBadge, GamificationState};

/// Badge identifiers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BadgeId {
    FirstItem,
    WardrobeBuilder,
    ClosetCurator,
    FirstOutfit,
    OutfitRegular,
    WearTracker,
    Rediscovery,
    RevivalMaster,
    WeekStreak,
    MonthStreak,
    Level5,
    Level10,
    ProfileComplete,
}

/// What a badge requires
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Criterion {
    ItemsAdded(u64),
    OutfitsLogged(u64),
    WearsLogged(u64),
    ItemsRevived(u64),
    LongestStreak(u32),
    Level(u32),
    ProfileComplete,
}

impl Criterion {
    /// Whether the state satisfies this criterion
    pub fn is_met(&self, state: &GamificationState) -> bool {
        match *self {
            Criterion::ItemsAdded(n) => state.counters.items_added >= n,
            Criterion::OutfitsLogged(n) => state.counters.outfits_logged >= n,
            Criterion::WearsLogged(n) => state.counters.wears_logged >= n,
            Criterion::ItemsRevived(n) => state.counters.items_revived >= n,
            Criterion::LongestStreak(n) => state.streak.longest >= n,
            Criterion::Level(n) => state.level() >= n,
            Criterion::ProfileComplete => state.profile_bonus_awarded,
        }
    }
}

/// A badge definition
#[derive(Debug, Clone, Serialize)]
pub struct Badge {
    pub id: BadgeId,
    pub name: &'static str,
    pub description: &'static str,
    pub criterion: Criterion,
}

const CATALOG: &[Badge] = &[
    Badge {
        id: BadgeId::FirstItem,
        name: "First Piece",
        description: "Add your first item to the wardrobe",
        criterion: Criterion::ItemsAdded(1),
    },
    Badge {
        id: BadgeId::WardrobeBuilder,
        name: "Wardrobe Builder",
        description: "Add 25 items",
        criterion: Criterion::ItemsAdded(25),
    },
    Badge {
        id: BadgeId::ClosetCurator,
        name: "Closet Curator",
        description: "Add 100 items",
        criterion: Criterion::ItemsAdded(100),
    },
    Badge {
        id: BadgeId::FirstOutfit,
        name: "First Look",
        description: "Log your first outfit",
        criterion: Criterion::OutfitsLogged(1),
    },
    Badge {
        id: BadgeId::OutfitRegular,
        name: "Outfit Regular",
        description: "Log 25 outfits",
        criterion: Criterion::OutfitsLogged(25),
    },
    Badge {
        id: BadgeId::WearTracker,
        name: "Wear Tracker",
        description: "Log 50 wears",
        criterion: Criterion::WearsLogged(50),
    },
    Badge {
        id: BadgeId::Rediscovery,
        name: "Rediscovery",
        description: "Wear an item you had forgotten about",
        criterion: Criterion::ItemsRevived(1),
    },
    Badge {
        id: BadgeId::RevivalMaster,
        name: "Revival Master",
        description: "Revive 10 forgotten items",
        criterion: Criterion::ItemsRevived(10),
    },
    Badge {
        id: BadgeId::WeekStreak,
        name: "Week Streak",
        description: "Stay active 7 days in a row",
        criterion: Criterion::LongestStreak(7),
    },
    Badge {
        id: BadgeId::MonthStreak,
        name: "Month Streak",
        description: "Stay active 30 days in a row",
        criterion: Criterion::LongestStreak(30),
    },
    Badge {
        id: BadgeId::Level5,
        name: "Rising Stylist",
        description: "Reach level 5",
        criterion: Criterion::Level(5),
    },
    Badge {
        id: BadgeId::Level10,
        name: "Trendsetter",
        description: "Reach level 10",
        criterion: Criterion::Level(10),
    },
    Badge {
        id: BadgeId::ProfileComplete,
        name: "All About Me",
        description: "Complete your profile",
        criterion: Criterion::ProfileComplete,
    },
];

/// All badge definitions
pub fn catalog() -> &'static [Badge] {
    CATALOG
}

/// Look up a badge definition
pub fn badge(id: BadgeId) -> Option<&'static Badge> {
    CATALOG.iter().find(|b| b.id == id)
}

/// Badges whose criteria are met but which the user has not earned yet
pub fn pending(state: &GamificationState) -> Vec<BadgeId> {
    CATALOG
        .iter()
        .filter(|b| !state.has_badge(b.id) && b.criterion.is_met(state))
        .map(|b| b.id)
        .collect()
}

/// Award every pending badge, returning the newly earned ones
pub fn award_pending(state: &mut GamificationState, now: DateTime<Utc>) -> Vec<BadgeId> {
    let new = pending(state);
    for id in &new {
        state.badges.push(EarnedBadge { id: *id, earned_at: now });
    }
    new
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique() {
        let mut ids: Vec<BadgeId> = catalog().iter().map(|b| b.id).collect();
        let before = ids.len();
        ids.sort_by_key(|id| format!("{:?}", id));
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn test_first_item_awarded_once() {
        let mut state = GamificationState::new("u1");
        assert!(award_pending(&mut state, Utc::now()).is_empty());

        state.counters.items_added = 1;
        assert_eq!(award_pending(&mut state, Utc::now()), vec![BadgeId::FirstItem]);
        assert!(award_pending(&mut state, Utc::now()).is_empty());
        assert!(state.has_badge(BadgeId::FirstItem));
    }

    #[test]
    fn test_multiple_badges_at_once() {
        let mut state = GamificationState::new("u1");
        state.counters.items_added = 30;
        state.counters.items_revived = 1;
        state.add_xp(1000);

        let new = award_pending(&mut state, Utc::now());
        assert!(new.contains(&BadgeId::FirstItem));
        assert!(new.contains(&BadgeId::WardrobeBuilder));
        assert!(new.contains(&BadgeId::Rediscovery));
        assert!(new.contains(&BadgeId::Level5));
        assert!(!new.contains(&BadgeId::ClosetCurator));
    }

    #[test]
    fn test_badge_serialization() {
        let json = serde_json::to_string(&BadgeId::Level10).unwrap();
        assert_eq!(json, "\"level10\"");
        assert_eq!(badge(BadgeId::WeekStreak).unwrap().name, "Week Streak");
    }
}
