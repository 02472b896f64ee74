//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::gamification::{
    Badge, BadgeId, GamificationOutcome, GamificationState, LevelProgress,
};
use crate::storage::StoreStats;
use crate::wardrobe::{
    format_warnings, ItemCategory, OutfitEntry, OutfitWarning, Subscription, SubscriptionStatus,
    Tier, TierLimits, UserProfile, WardrobeItem, WearEvent,
};

// ============================================
// PROFILE DTOs
// ============================================

/// Profile with completeness
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    /// Fraction of profile facets filled, 0 to 1
    pub completeness: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamification: Option<GamificationOutcome>,
}

impl ProfileResponse {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            completeness: profile.completeness(),
            profile,
            gamification: None,
        }
    }
}

/// Subscription sync from the payments platform
#[derive(Debug, Deserialize)]
pub struct SubscriptionUpdate {
    pub tier: Tier,
    #[serde(default)]
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub provider_customer_id: Option<String>,
}

/// Subscription with the limits in effect
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub effective_tier: Tier,
    pub limits: TierLimits,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(subscription: Subscription) -> Self {
        Self {
            effective_tier: subscription.effective_tier(),
            limits: subscription.limits(),
            subscription,
        }
    }
}

// ============================================
// ITEM DTOs
// ============================================

/// Create item request
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub category: ItemCategory,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub style_tags: Vec<String>,
    #[serde(default)]
    pub seasons: Vec<String>,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CreateItemRequest {
    /// Build an unsanitized item for `owner_id`
    pub fn into_item(self, owner_id: &str) -> WardrobeItem {
        let mut item = WardrobeItem::new(owner_id, self.name, self.category);
        item.color = self.color;
        item.brand = self.brand;
        item.style_tags = self.style_tags;
        item.seasons = self.seasons;
        item.purchase_price = self.purchase_price;
        item.purchase_date = self.purchase_date;
        item.image_url = self.image_url;
        item
    }
}

/// Item list ordering
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemSort {
    /// Newest first
    #[default]
    Recent,
    MostWorn,
    LeastWorn,
    /// Cheapest per wear first, unpriced or unworn last
    Cpw,
    Name,
}

/// Item list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ItemQuery {
    #[serde(default)]
    pub category: Option<ItemCategory>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub include_archived: bool,
    #[serde(default)]
    pub sort: ItemSort,
}

/// Item with derived fields
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemResponse {
    #[serde(flatten)]
    pub item: WardrobeItem,
    pub cost_per_wear: Option<f64>,
    pub days_since_worn: i64,
}

impl ItemResponse {
    pub fn new(item: WardrobeItem, now: DateTime<Utc>) -> Self {
        Self {
            cost_per_wear: item.cost_per_wear(),
            days_since_worn: item.days_since_worn(now),
            item,
        }
    }
}

/// Item list response
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemListResponse {
    pub items: Vec<ItemResponse>,
    pub total: usize,
}

/// Result of a gamified item write
#[derive(Debug, Serialize)]
pub struct ItemActionResponse {
    pub item: ItemResponse,
    pub gamification: GamificationOutcome,
}

/// Log-a-wear request
#[derive(Debug, Default, Deserialize)]
pub struct WearRequest {
    /// Defaults to now; may not lie in the future
    #[serde(default)]
    pub worn_at: Option<DateTime<Utc>>,
}

/// Log-a-wear response
#[derive(Debug, Serialize)]
pub struct WearResponse {
    pub wear: WearEvent,
    pub item: ItemResponse,
    pub gamification: GamificationOutcome,
}

/// CSV import response
#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub imported: usize,
    /// Valid rows dropped because the tier item limit was reached
    pub skipped: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub gamification: Option<GamificationOutcome>,
}

// ============================================
// OUTFIT DTOs
// ============================================

/// Log-an-outfit request
#[derive(Debug, Deserialize)]
pub struct CreateOutfitRequest {
    pub item_ids: Vec<String>,
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub worn_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fit_score: Option<f64>,
    #[serde(default)]
    pub warnings: Vec<OutfitWarning>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateOutfitRequest {
    pub fn into_entry(self, owner_id: &str, worn_at: DateTime<Utc>) -> OutfitEntry {
        let mut entry = OutfitEntry::new(owner_id, self.item_ids, worn_at);
        entry.occasion = self.occasion;
        entry.fit_score = self.fit_score;
        entry.warnings = self.warnings;
        entry.notes = self.notes;
        entry
    }
}

/// Outfit with warnings rendered for display
#[derive(Debug, Serialize)]
pub struct OutfitResponse {
    #[serde(flatten)]
    pub outfit: OutfitEntry,
    pub warning_text: Vec<String>,
}

impl From<OutfitEntry> for OutfitResponse {
    fn from(outfit: OutfitEntry) -> Self {
        Self {
            warning_text: format_warnings(&outfit.warnings),
            outfit,
        }
    }
}

/// Outfit history query parameters
#[derive(Debug, Default, Deserialize)]
pub struct OutfitQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Outfit history response
#[derive(Debug, Serialize)]
pub struct OutfitListResponse {
    pub outfits: Vec<OutfitResponse>,
    pub total: usize,
}

/// Log-an-outfit response
#[derive(Debug, Serialize)]
pub struct OutfitCreatedResponse {
    pub outfit: OutfitResponse,
    pub gamification: GamificationOutcome,
}

// ============================================
// GAMIFICATION DTOs
// ============================================

/// Gamification summary
#[derive(Debug, Serialize)]
pub struct GamificationResponse {
    #[serde(flatten)]
    pub state: GamificationState,
    pub level: LevelProgress,
    /// Streak as of today; zero once a day has been missed
    pub current_streak: u32,
}

impl GamificationResponse {
    pub fn new(state: GamificationState, today: NaiveDate) -> Self {
        Self {
            level: state.progress(),
            current_streak: state.streak.current_as_of(today),
            state,
        }
    }
}

/// One catalog badge with earned flag
#[derive(Debug, Serialize)]
pub struct BadgeView {
    pub id: BadgeId,
    pub name: &'static str,
    pub description: &'static str,
    pub earned: bool,
    pub earned_at: Option<DateTime<Utc>>,
}

impl BadgeView {
    pub fn new(badge: &Badge, state: &GamificationState) -> Self {
        let earned_at = state
            .badges
            .iter()
            .find(|b| b.id == badge.id)
            .map(|b| b.earned_at);
        Self {
            id: badge.id,
            name: badge.name,
            description: badge.description,
            earned: earned_at.is_some(),
            earned_at,
        }
    }
}

// ============================================
// EXPORT DTOs
// ============================================

/// Export format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

/// Export query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub format: ExportFormat,
}

/// Full JSON export of one user's documents
#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub user_id: String,
    pub exported_at: DateTime<Utc>,
    pub items: Vec<WardrobeItem>,
    pub wears: Vec<WearEvent>,
    pub outfits: Vec<OutfitEntry>,
    pub gamification: GamificationState,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "unhealthy"
    pub status: String,
    /// Storage status
    pub storage: String,
    /// Stored documents, when storage is reachable
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub documents: Option<StoreStats>,
    /// Open WebSocket connections
    pub ws_connections: usize,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Version string
    pub version: String,
}
