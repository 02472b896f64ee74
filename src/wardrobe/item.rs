//! Wardrobe items
//!
//! A wardrobe item is a single piece of clothing owned by a user, with
//! descriptive metadata and the denormalized wear counters the analytics
//! and gamification layers aggregate over.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::{Validation, ValidationResult};

/// Maximum length of an item name
pub const MAX_NAME_LEN: usize = 100;
/// Maximum number of style tags per item
pub const MAX_STYLE_TAGS: usize = 20;
/// Maximum length of a single style tag
pub const MAX_TAG_LEN: usize = 40;

/// Clothing category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Top,
    Bottom,
    Dress,
    Outerwear,
    Shoes,
    Accessory,
    Bag,
    Other,
}

impl ItemCategory {
    /// Get all categories for iteration
    pub fn all() -> &'static [ItemCategory] {
        &[
            ItemCategory::Top,
            ItemCategory::Bottom,
            ItemCategory::Dress,
            ItemCategory::Outerwear,
            ItemCategory::Shoes,
            ItemCategory::Accessory,
            ItemCategory::Bag,
            ItemCategory::Other,
        ]
    }

    /// Parse a category, accepting a few common synonyms
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "top" | "tops" | "shirt" | "t-shirt" | "blouse" | "sweater" => Some(Self::Top),
            "bottom" | "bottoms" | "pants" | "jeans" | "skirt" | "shorts" => Some(Self::Bottom),
            "dress" | "dresses" => Some(Self::Dress),
            "outerwear" | "jacket" | "coat" => Some(Self::Outerwear),
            "shoes" | "shoe" | "footwear" | "sneakers" | "boots" => Some(Self::Shoes),
            "accessory" | "accessories" | "jewelry" | "hat" | "scarf" | "belt" => {
                Some(Self::Accessory)
            }
            "bag" | "bags" | "handbag" => Some(Self::Bag),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ItemCategory::Top => "top",
            ItemCategory::Bottom => "bottom",
            ItemCategory::Dress => "dress",
            ItemCategory::Outerwear => "outerwear",
            ItemCategory::Shoes => "shoes",
            ItemCategory::Accessory => "accessory",
            ItemCategory::Bag => "bag",
            ItemCategory::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// A user-owned clothing record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WardrobeItem {
    pub id: String,
    pub owner_id: String,
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
    #[serde(default)]
    pub wear_count: u32,
    #[serde(default)]
    pub last_worn_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WardrobeItem {
    /// Create a new item with a fresh id
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>, category: ItemCategory) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            name: name.into(),
            category,
            color: None,
            brand: None,
            style_tags: Vec::new(),
            seasons: Vec::new(),
            purchase_price: None,
            purchase_date: None,
            image_url: None,
            wear_count: 0,
            last_worn_at: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set color
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Builder: set purchase price
    pub fn price(mut self, price: f64) -> Self {
        self.purchase_price = Some(price);
        self
    }

    /// Builder: add a style tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.style_tags.push(tag.into());
        self
    }

    /// Builder: set creation time
    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self
    }

    /// Purchase price divided by recorded wears.
    ///
    /// `None` when the item has no price or has never been worn.
    pub fn cost_per_wear(&self) -> Option<f64> {
        cost_per_wear(self.purchase_price, self.wear_count)
    }

    /// Days since the item was last worn, or since it was added if never worn
    pub fn days_since_worn(&self, now: DateTime<Utc>) -> i64 {
        let reference = self.last_worn_at.unwrap_or(self.created_at);
        (now - reference).num_days().max(0)
    }

    /// Whether the item has sat unworn for at least `threshold_days`
    pub fn is_neglected(&self, now: DateTime<Utc>, threshold_days: i64) -> bool {
        !self.archived && self.days_since_worn(now) >= threshold_days
    }

    /// Whether the item carries a style tag (case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.style_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Record a wear at `worn_at`, keeping `last_worn_at` monotonic
    pub fn record_wear(&mut self, worn_at: DateTime<Utc>) {
        self.wear_count = self.wear_count.saturating_add(1);
        if self.last_worn_at.map_or(true, |last| worn_at > last) {
            self.last_worn_at = Some(worn_at);
        }
        self.updated_at = Utc::now();
    }

    /// Normalize user-provided fields in place and validate the result
    pub fn sanitize(&mut self) -> ValidationResult<()> {
        self.name = self.name.trim().to_string();
        self.color = self.color.as_deref().and_then(normalize_color);
        self.brand = self
            .brand
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string);
        self.style_tags = dedup_tags(&self.style_tags);
        self.seasons = dedup_tags(&self.seasons);
        self.validate()
    }

    fn validate(&self) -> ValidationResult<()> {
        if self.name.is_empty() {
            return Err(Validation::new("name", "Item name cannot be empty"));
        }
        if self.name.chars().count() > MAX_NAME_LEN {
            return Err(Validation::new(
                "name",
                format!("Item name exceeds maximum length of {} characters", MAX_NAME_LEN),
            ));
        }
        validate_price(self.purchase_price)?;
        if self.style_tags.len() > MAX_STYLE_TAGS {
            return Err(Validation::new(
                "style_tags",
                format!("At most {} style tags are allowed", MAX_STYLE_TAGS),
            ));
        }
        if let Some(tag) = self.style_tags.iter().find(|t| t.chars().count() > MAX_TAG_LEN) {
            return Err(Validation::new(
                "style_tags",
                format!("Style tag '{}' exceeds {} characters", tag, MAX_TAG_LEN),
            ));
        }
        Ok(())
    }
}

/// Cost per wear for a price and wear count
pub fn cost_per_wear(price: Option<f64>, wears: u32) -> Option<f64> {
    match price {
        Some(p) if wears > 0 => Some(p / wears as f64),
        _ => None,
    }
}

/// Validate an optional purchase price
pub fn validate_price(price: Option<f64>) -> ValidationResult<()> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(Validation::new(
            "purchase_price",
            "Purchase price must be a non-negative number",
        )),
        _ => Ok(()),
    }
}

fn hex_color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid hex color regex")
    })
}

/// Normalize a color: `#rgb`/`#rrggbb` hex codes are lower-cased, names
/// are only trimmed. Blank input yields `None`.
pub fn normalize_color(color: &str) -> Option<String> {
    let trimmed = color.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(caps) = hex_color_regex().captures(trimmed) {
        return Some(format!("#{}", caps[1].to_lowercase()));
    }
    Some(trimmed.to_string())
}

/// Trim, drop blanks, and remove case-insensitive duplicates keeping first spelling
fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let t = tag.trim();
        if t.is_empty() || out.iter().any(|o| o.eq_ignore_ascii_case(t)) {
            continue;
        }
        out.push(t.to_string());
    }
    out
}

/// Partial update for an item; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub category: Option<ItemCategory>,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub style_tags: Option<Vec<String>>,
    pub seasons: Option<Vec<String>>,
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub archived: Option<bool>,
}

impl WardrobeItem {
    /// Apply a patch and re-validate
    pub fn apply_patch(&mut self, patch: ItemPatch) -> ValidationResult<()> {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(color) = patch.color {
            self.color = Some(color);
        }
        if let Some(brand) = patch.brand {
            self.brand = Some(brand);
        }
        if let Some(tags) = patch.style_tags {
            self.style_tags = tags;
        }
        if let Some(seasons) = patch.seasons {
            self.seasons = seasons;
        }
        if patch.purchase_price.is_some() {
            self.purchase_price = patch.purchase_price;
        }
        if patch.purchase_date.is_some() {
            self.purchase_date = patch.purchase_date;
        }
        if let Some(url) = patch.image_url {
            self.image_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Some(archived) = patch.archived {
            self.archived = archived;
        }
        self.updated_at = Utc::now();
        self.sanitize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_cost_per_wear() {
        let mut item = WardrobeItem::new("u1", "Denim jacket", ItemCategory::Outerwear).price(120.0);
        assert_eq!(item.cost_per_wear(), None);

        item.wear_count = 4;
        assert_eq!(item.cost_per_wear(), Some(30.0));

        item.purchase_price = None;
        assert_eq!(item.cost_per_wear(), None);
    }

    #[test]
    fn test_days_since_worn_falls_back_to_created() {
        let now = Utc::now();
        let item = WardrobeItem::new("u1", "Scarf", ItemCategory::Accessory)
            .created(now - Duration::days(120));
        assert_eq!(item.days_since_worn(now), 120);
        assert!(item.is_neglected(now, 90));

        let mut archived = item.clone();
        archived.archived = true;
        assert!(!archived.is_neglected(now, 90));
    }

    #[test]
    fn test_record_wear_keeps_latest() {
        let now = Utc::now();
        let mut item = WardrobeItem::new("u1", "Tee", ItemCategory::Top);
        item.record_wear(now);
        item.record_wear(now - Duration::days(3));

        assert_eq!(item.wear_count, 2);
        assert_eq!(item.last_worn_at, Some(now));
    }

    #[test]
    fn test_record_wear_saturates() {
        let mut item = WardrobeItem::new("u1", "Tee", ItemCategory::Top);
        item.wear_count = u32::MAX;
        item.record_wear(Utc::now());
        assert_eq!(item.wear_count, u32::MAX);
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("#AABBCC"), Some("#aabbcc".to_string()));
        assert_eq!(normalize_color(" #FfF "), Some("#fff".to_string()));
        assert_eq!(normalize_color("  Navy "), Some("Navy".to_string()));
        assert_eq!(normalize_color("Bad"), Some("Bad".to_string()));
        assert_eq!(normalize_color("FFF"), Some("FFF".to_string()));
        assert_eq!(normalize_color("#abcd"), Some("#abcd".to_string()));
        assert_eq!(normalize_color("   "), None);
    }

    #[test]
    fn test_sanitize_rejects_bad_input() {
        let mut item = WardrobeItem::new("u1", "   ", ItemCategory::Top);
        assert!(item.sanitize().is_err());

        let mut item = WardrobeItem::new("u1", "Coat", ItemCategory::Outerwear).price(-5.0);
        let err = item.sanitize().unwrap_err();
        assert_eq!(err.field, "purchase_price");

        let mut item = WardrobeItem::new("u1", "Coat", ItemCategory::Outerwear).price(f64::NAN);
        assert!(item.sanitize().is_err());
    }

    #[test]
    fn test_sanitize_dedups_tags() {
        let mut item = WardrobeItem::new("u1", " Linen shirt ", ItemCategory::Top)
            .tag("Casual")
            .tag("casual")
            .tag(" ")
            .tag("summer");
        item.sanitize().unwrap();

        assert_eq!(item.name, "Linen shirt");
        assert_eq!(item.style_tags, vec!["Casual", "summer"]);
        assert!(item.has_tag("CASUAL"));
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(ItemCategory::parse("Jeans"), Some(ItemCategory::Bottom));
        assert_eq!(ItemCategory::parse("sneakers"), Some(ItemCategory::Shoes));
        assert_eq!(ItemCategory::parse("spaceship"), None);
    }

    #[test]
    fn test_apply_patch() {
        let mut item = WardrobeItem::new("u1", "Tee", ItemCategory::Top);
        item.apply_patch(ItemPatch {
            name: Some("Black tee".to_string()),
            color: Some("#000000".to_string()),
            archived: Some(true),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(item.name, "Black tee");
        assert_eq!(item.color.as_deref(), Some("#000000"));
        assert!(item.archived);
    }
}
