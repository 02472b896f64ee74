//! Typed repository over the document store
//!
//! Routes and the gamification engine go through this façade instead of
//! juggling collections and raw JSON.

use std::sync::Arc;

use crate::gamification::challenges::Enrollment;
use crate::gamification::state::GamificationState;
use crate::storage::error::StorageResult;
use crate::storage::store::{Collection, DocumentStore, StoreStats};
use crate::wardrobe::{OutfitEntry, Subscription, UserProfile, WardrobeItem, WearEvent};

/// Typed access to every wardrobe collection
#[derive(Clone)]
pub struct Repository {
    store: Arc<DocumentStore>,
}

impl Repository {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Repository over a fresh in-memory store
    pub fn in_memory() -> StorageResult<Self> {
        Ok(Self::new(Arc::new(DocumentStore::open_in_memory()?)))
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    // ---- profiles ----

    pub async fn profile(&self, user_id: &str) -> StorageResult<Option<UserProfile>> {
        self.store.get_typed(Collection::Profiles, user_id).await
    }

    pub async fn save_profile(&self, profile: &UserProfile) -> StorageResult<()> {
        self.store
            .put_typed(Collection::Profiles, &profile.user_id, &profile.user_id, profile)
            .await
    }

    // ---- subscriptions ----

    /// The user's subscription, or a free one when none is stored
    pub async fn subscription(&self, user_id: &str) -> StorageResult<Subscription> {
        Ok(self
            .store
            .get_typed(Collection::Subscriptions, user_id)
            .await?
            .unwrap_or_else(|| Subscription::free(user_id)))
    }

    pub async fn save_subscription(&self, sub: &Subscription) -> StorageResult<()> {
        self.store
            .put_typed(Collection::Subscriptions, &sub.user_id, &sub.user_id, sub)
            .await
    }

    // ---- items ----

    pub async fn item(&self, id: &str) -> StorageResult<Option<WardrobeItem>> {
        self.store.get_typed(Collection::Items, id).await
    }

    pub async fn items(&self, owner_id: &str) -> StorageResult<Vec<WardrobeItem>> {
        self.store.list_typed(Collection::Items, owner_id).await
    }

    /// Number of stored items, archived ones included
    pub async fn count_items(&self, owner_id: &str) -> StorageResult<usize> {
        self.store.count_by_owner(Collection::Items, owner_id).await
    }

    pub async fn save_item(&self, item: &WardrobeItem) -> StorageResult<()> {
        self.store
            .put_typed(Collection::Items, &item.id, &item.owner_id, item)
            .await
    }

    pub async fn delete_item(&self, id: &str) -> StorageResult<bool> {
        self.store.delete(Collection::Items, id).await
    }

    // ---- wear history ----

    pub async fn wears(&self, owner_id: &str) -> StorageResult<Vec<WearEvent>> {
        self.store.list_typed(Collection::Wears, owner_id).await
    }

    pub async fn save_wear(&self, wear: &WearEvent) -> StorageResult<()> {
        self.store
            .put_typed(Collection::Wears, &wear.id, &wear.owner_id, wear)
            .await
    }

    // ---- outfits ----

    pub async fn outfits(&self, owner_id: &str) -> StorageResult<Vec<OutfitEntry>> {
        self.store.list_typed(Collection::Outfits, owner_id).await
    }

    pub async fn save_outfit(&self, outfit: &OutfitEntry) -> StorageResult<()> {
        self.store
            .put_typed(Collection::Outfits, &outfit.id, &outfit.owner_id, outfit)
            .await
    }

    // ---- gamification ----

    /// The user's gamification state, fresh when none is stored
    pub async fn gamification(&self, user_id: &str) -> StorageResult<GamificationState> {
        Ok(self
            .store
            .get_typed(Collection::Gamification, user_id)
            .await?
            .unwrap_or_else(|| GamificationState::new(user_id)))
    }

    pub async fn save_gamification(&self, state: &GamificationState) -> StorageResult<()> {
        self.store
            .put_typed(Collection::Gamification, &state.user_id, &state.user_id, state)
            .await
    }

    pub async fn enrollments(&self, owner_id: &str) -> StorageResult<Vec<Enrollment>> {
        self.store.list_typed(Collection::Enrollments, owner_id).await
    }

    pub async fn save_enrollment(&self, enrollment: &Enrollment) -> StorageResult<()> {
        self.store
            .put_typed(
                Collection::Enrollments,
                &enrollment.id,
                &enrollment.owner_id,
                enrollment,
            )
            .await
    }

    // ---- housekeeping ----

    pub async fn stats(&self) -> StorageResult<StoreStats> {
        self.store.stats().await
    }

    pub async fn ping(&self) -> bool {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wardrobe::{ItemCategory, Tier};
    use chrono::Utc;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_subscription_is_free() {
        let repo = Repository::in_memory().unwrap();
        let sub = repo.subscription("u1").await.unwrap();
        assert_eq!(sub.tier, Tier::Free);
        assert_eq!(sub.user_id, "u1");
    }

    #[tokio::test]
    async fn test_item_roundtrip_and_count() {
        let repo = Repository::in_memory().unwrap();
        let item = WardrobeItem::new("u1", "Denim Jacket", ItemCategory::Outerwear).price(80.0);
        repo.save_item(&item).await.unwrap();

        let loaded = repo.item(&item.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Denim Jacket");
        assert_eq!(repo.count_items("u1").await.unwrap(), 1);
        assert_eq!(repo.items("u2").await.unwrap().len(), 0);

        assert!(repo.delete_item(&item.id).await.unwrap());
        assert!(repo.item(&item.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_legacy_profile_decodes() {
        let repo = Repository::in_memory().unwrap();
        repo.store()
            .put(
                Collection::Profiles,
                "u1",
                "u1",
                &json!({
                    "displayName": "Ada",
                    "stylePreferences": ["minimal"],
                    "heightFeetInches": "5'10\""
                }),
            )
            .await
            .unwrap();

        let profile = repo.profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.user_id, "u1");
        assert_eq!(profile.display_name.as_deref(), Some("Ada"));
        assert_eq!(profile.preferences.style, vec!["minimal".to_string()]);
        assert_eq!(profile.measurements.height_cm, Some(177.8));
    }

    #[tokio::test]
    async fn test_outfit_with_odd_warnings_still_listed() {
        let repo = Repository::in_memory().unwrap();
        let entry = OutfitEntry::new("u1", vec!["i1".to_string()], Utc::now()).fit_score(80.0);
        let mut body = serde_json::to_value(&entry).unwrap();
        body["warnings"] = json!([null, 7, "Bring an umbrella"]);
        repo.store()
            .put(Collection::Outfits, &entry.id, "u1", &body)
            .await
            .unwrap();

        let outfits = repo.outfits("u1").await.unwrap();
        assert_eq!(outfits.len(), 1);
        assert_eq!(outfits[0].fit_score, Some(80.0));
        assert_eq!(outfits[0].warnings.len(), 3);
    }

    #[tokio::test]
    async fn test_gamification_default_state() {
        let repo = Repository::in_memory().unwrap();
        let mut state = repo.gamification("u1").await.unwrap();
        assert_eq!(state.xp, 0);

        state.add_xp(40);
        state.updated_at = Utc::now();
        repo.save_gamification(&state).await.unwrap();
        assert_eq!(repo.gamification("u1").await.unwrap().xp, 40);
    }
}
