//! Outfit history and wear events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::warnings::OutfitWarning;
use super::{Validation, ValidationResult};

/// Maximum number of items in a single outfit
pub const MAX_OUTFIT_ITEMS: usize = 12;

/// One recorded wear of one item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WearEvent {
    pub id: String,
    pub owner_id: String,
    pub item_id: String,
    pub worn_at: DateTime<Utc>,
    #[serde(default)]
    pub outfit_id: Option<String>,
    /// The item had gone unworn long enough for this wear to count as a revival
    #[serde(default)]
    pub revived: bool,
}

impl WearEvent {
    pub fn new(owner_id: impl Into<String>, item_id: impl Into<String>, worn_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            item_id: item_id.into(),
            worn_at,
            outfit_id: None,
            revived: false,
        }
    }

    /// Builder: link the wear to an outfit entry
    pub fn outfit(mut self, outfit_id: impl Into<String>) -> Self {
        self.outfit_id = Some(outfit_id.into());
        self
    }
}

/// A generated or saved combination of items, as recorded in history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutfitEntry {
    pub id: String,
    pub owner_id: String,
    pub item_ids: Vec<String>,
    #[serde(default)]
    pub occasion: Option<String>,
    pub worn_at: DateTime<Utc>,
    /// AI-fit score in `[0, 100]`
    #[serde(default)]
    pub fit_score: Option<f64>,
    #[serde(default)]
    pub warnings: Vec<OutfitWarning>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OutfitEntry {
    pub fn new(owner_id: impl Into<String>, item_ids: Vec<String>, worn_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            item_ids,
            occasion: None,
            worn_at,
            fit_score: None,
            warnings: Vec::new(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    /// Builder: set the AI-fit score
    pub fn fit_score(mut self, score: f64) -> Self {
        self.fit_score = Some(score);
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.item_ids.is_empty() {
            return Err(Validation::new("item_ids", "An outfit needs at least one item"));
        }
        if self.item_ids.len() > MAX_OUTFIT_ITEMS {
            return Err(Validation::new(
                "item_ids",
                format!("An outfit can contain at most {} items", MAX_OUTFIT_ITEMS),
            ));
        }
        let unique: HashSet<&String> = self.item_ids.iter().collect();
        if unique.len() != self.item_ids.len() {
            return Err(Validation::new("item_ids", "Outfit items must be distinct"));
        }
        if let Some(score) = self.fit_score {
            if !score.is_finite() || !(0.0..=100.0).contains(&score) {
                return Err(Validation::new("fit_score", "Fit score must be between 0 and 100"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_outfit() {
        let now = Utc::now();
        let ok = OutfitEntry::new("u1", vec!["a".into(), "b".into()], now).fit_score(82.0);
        assert!(ok.validate().is_ok());

        let empty = OutfitEntry::new("u1", vec![], now);
        assert!(empty.validate().is_err());

        let dup = OutfitEntry::new("u1", vec!["a".into(), "a".into()], now);
        assert!(dup.validate().is_err());

        let bad_score = OutfitEntry::new("u1", vec!["a".into()], now).fit_score(120.0);
        assert_eq!(bad_score.validate().unwrap_err().field, "fit_score");
    }

    #[test]
    fn test_outfit_deserializes_mixed_warnings() {
        let json = r#"{
            "id": "o1",
            "owner_id": "u1",
            "item_ids": ["a"],
            "worn_at": "2024-05-01T08:00:00Z",
            "warnings": ["Too warm", {"type": "color", "message": "Two prints"}],
            "created_at": "2024-05-01T08:00:00Z"
        }"#;
        let outfit: OutfitEntry = serde_json::from_str(json).unwrap();
        assert_eq!(outfit.warnings.len(), 2);
        assert_eq!(outfit.warnings[1].display_text(), "color: Two prints");
    }
}
