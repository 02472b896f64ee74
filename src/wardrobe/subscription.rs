//! Subscriptions
//!
//! Billing itself lives with the payments platform; this document mirrors
//! the tier and status it reports so the API can enforce tier limits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Premium,
    Pro,
}

impl Tier {
    pub fn limits(&self) -> TierLimits {
        match self {
            Tier::Free => TierLimits {
                max_items: Some(50),
                max_active_challenges: 1,
                export: false,
            },
            Tier::Premium => TierLimits {
                max_items: Some(500),
                max_active_challenges: 3,
                export: true,
            },
            Tier::Pro => TierLimits {
                max_items: None,
                max_active_challenges: 10,
                export: true,
            },
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Free => write!(f, "free"),
            Tier::Premium => write!(f, "premium"),
            Tier::Pro => write!(f, "pro"),
        }
    }
}

/// Billing status reported by the payments platform
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Trialing,
    PastDue,
    Canceled,
}

/// Feature limits for a tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierLimits {
    /// Maximum stored items, `None` for unlimited
    pub max_items: Option<usize>,
    /// Maximum concurrently active challenges
    pub max_active_challenges: usize,
    /// CSV/JSON export and CSV import
    pub export: bool,
}

impl TierLimits {
    /// Whether one more item fits under the limit
    pub fn allows_items(&self, current: usize) -> bool {
        self.max_items.map_or(true, |max| current < max)
    }
}

/// A user's subscription document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub user_id: String,
    #[serde(default)]
    pub tier: Tier,
    #[serde(default)]
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub provider_customer_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// The implicit subscription of a user with no billing record
    pub fn free(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            tier: Tier::Free,
            status: SubscriptionStatus::Active,
            current_period_end: None,
            provider_customer_id: None,
            updated_at: Utc::now(),
        }
    }

    /// Tier that currently applies. Past-due accounts keep their tier as a
    /// grace period; canceled accounts drop to free.
    pub fn effective_tier(&self) -> Tier {
        match self.status {
            SubscriptionStatus::Canceled => Tier::Free,
            _ => self.tier,
        }
    }

    pub fn limits(&self) -> TierLimits {
        self.effective_tier().limits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_by_default() {
        let sub = Subscription::free("u1");
        assert_eq!(sub.effective_tier(), Tier::Free);
        assert_eq!(sub.limits().max_items, Some(50));
        assert!(!sub.limits().export);
    }

    #[test]
    fn test_canceled_drops_to_free() {
        let mut sub = Subscription::free("u1");
        sub.tier = Tier::Pro;
        sub.status = SubscriptionStatus::Canceled;
        assert_eq!(sub.effective_tier(), Tier::Free);
    }

    #[test]
    fn test_past_due_keeps_tier() {
        let mut sub = Subscription::free("u1");
        sub.tier = Tier::Premium;
        sub.status = SubscriptionStatus::PastDue;
        assert_eq!(sub.effective_tier(), Tier::Premium);
    }

    #[test]
    fn test_item_limits() {
        assert!(Tier::Free.limits().allows_items(49));
        assert!(!Tier::Free.limits().allows_items(50));
        assert!(Tier::Pro.limits().allows_items(1_000_000));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&SubscriptionStatus::PastDue).unwrap();
        assert_eq!(json, "\"past_due\"");
    }
}
