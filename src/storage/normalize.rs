//! Legacy document normalization
//!
//! Documents written by older clients use several spellings for the same
//! field (`createdAt` vs `created_at`, `stylePreferences` vs
//! `preferences.style`, `heightFeetInches` vs `measurements.height`, ...)
//! and store timestamps either as epoch milliseconds or RFC 3339 strings.
//! These functions rewrite a raw JSON body into the canonical shape the
//! typed documents decode from. When both spellings are present the
//! canonical one wins and the legacy key is dropped.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::storage::store::{Collection, Document};
use crate::wardrobe::ItemCategory;

/// Normalize a stored document in place, filling identity and timestamp
/// fields from the row metadata when the body lacks them.
pub fn normalize_document(doc: &mut Document) {
    let Some(obj) = doc.body.as_object_mut() else {
        return;
    };

    match doc.collection {
        Collection::Profiles => normalize_profile(obj),
        Collection::Items => normalize_item(obj),
        Collection::Subscriptions => normalize_subscription(obj),
        Collection::Wears | Collection::Outfits => normalize_history(obj),
        Collection::Gamification | Collection::Enrollments => {}
    }

    let owner_key = match doc.collection {
        Collection::Profiles | Collection::Subscriptions | Collection::Gamification => "user_id",
        _ => "owner_id",
    };
    fill_missing(obj, owner_key, Value::String(doc.owner_id.clone()));

    if !matches!(
        doc.collection,
        Collection::Profiles | Collection::Subscriptions | Collection::Gamification
    ) {
        fill_missing(obj, "id", Value::String(doc.id.clone()));
    }

    if matches!(
        doc.collection,
        Collection::Profiles | Collection::Items | Collection::Outfits
    ) {
        fill_missing(obj, "created_at", millis_to_value(doc.created_at));
    }
    if matches!(
        doc.collection,
        Collection::Profiles | Collection::Items | Collection::Subscriptions
    ) {
        fill_missing(obj, "updated_at", millis_to_value(doc.updated_at));
    }
}

/// Normalize a raw profile body
pub fn normalize_profile(obj: &mut Map<String, Value>) {
    rename(obj, "userId", "user_id");
    rename(obj, "uid", "user_id");
    rename(obj, "displayName", "display_name");
    rename(obj, "name", "display_name");
    rename(obj, "avatarUrl", "avatar_url");
    rename(obj, "photoURL", "avatar_url");
    rename(obj, "bodyType", "body_type");
    rename(obj, "createdAt", "created_at");
    rename(obj, "updatedAt", "updated_at");
    coerce_datetime(obj, "created_at");
    coerce_datetime(obj, "updated_at");

    let style = obj.remove("stylePreferences").map(string_list);
    let colors = obj.remove("favoriteColors").map(string_list);
    let prefs = ensure_object(obj, "preferences");
    if let Some(style) = style {
        fill_missing(prefs, "style", style);
    }
    if let Some(colors) = colors {
        fill_missing(prefs, "colors", colors);
    }
    for key in ["style", "colors", "occasions"] {
        if let Some(v) = prefs.remove(key) {
            prefs.insert(key.to_string(), string_list(v));
        }
    }

    let legacy_height = obj.remove("heightFeetInches").and_then(|v| parse_feet_inches(&v));
    let measurements = ensure_object(obj, "measurements");
    if let Some(height) = measurements.remove("height") {
        if let Some(cm) = height.as_f64() {
            fill_missing(measurements, "height_cm", Value::from(cm));
        } else if let Some(cm) = parse_feet_inches(&height) {
            fill_missing(measurements, "height_cm", Value::from(cm));
        }
    }
    if let Some(cm) = legacy_height {
        fill_missing(measurements, "height_cm", Value::from(cm));
    }
    rename(measurements, "weight", "weight_kg");
    rename(measurements, "shoeSize", "shoe_size");
    if let Some(size) = measurements.get("shoe_size").and_then(Value::as_f64) {
        measurements.insert("shoe_size".to_string(), Value::String(format_number(size)));
    }
}

/// Normalize a raw wardrobe item body
pub fn normalize_item(obj: &mut Map<String, Value>) {
    rename(obj, "ownerId", "owner_id");
    rename(obj, "userId", "owner_id");
    rename(obj, "user_id", "owner_id");
    rename(obj, "imageUrl", "image_url");
    rename(obj, "wearCount", "wear_count");
    rename(obj, "timesWorn", "wear_count");
    rename(obj, "lastWornAt", "last_worn_at");
    rename(obj, "lastWorn", "last_worn_at");
    rename(obj, "last_worn", "last_worn_at");
    rename(obj, "purchasePrice", "purchase_price");
    rename(obj, "price", "purchase_price");
    rename(obj, "purchaseDate", "purchase_date");
    rename(obj, "styleTags", "style_tags");
    rename(obj, "tags", "style_tags");
    rename(obj, "type", "category");
    rename(obj, "createdAt", "created_at");
    rename(obj, "updatedAt", "updated_at");
    rename(obj, "isArchived", "archived");

    let category = obj
        .get("category")
        .and_then(Value::as_str)
        .and_then(ItemCategory::parse)
        .unwrap_or(ItemCategory::Other);
    obj.insert("category".to_string(), Value::String(category.to_string()));

    if let Some(price) = obj.remove("purchase_price") {
        if let Some(p) = parse_price(&price) {
            obj.insert("purchase_price".to_string(), Value::from(p));
        }
    }

    if let Some(count) = obj.get("wear_count") {
        let n = count
            .as_u64()
            .or_else(|| count.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .or_else(|| count.as_str().and_then(|s| s.trim().parse().ok()))
            .unwrap_or(0);
        obj.insert("wear_count".to_string(), Value::from(n));
    }

    if let Some(tags) = obj.remove("style_tags") {
        obj.insert("style_tags".to_string(), string_list(tags));
    }
    if let Some(seasons) = obj.remove("seasons") {
        obj.insert("seasons".to_string(), string_list(seasons));
    }

    coerce_datetime(obj, "created_at");
    coerce_datetime(obj, "updated_at");
    coerce_datetime(obj, "last_worn_at");
    coerce_date(obj, "purchase_date");
}

/// Normalize a raw subscription body
pub fn normalize_subscription(obj: &mut Map<String, Value>) {
    rename(obj, "userId", "user_id");
    rename(obj, "plan", "tier");
    rename(obj, "currentPeriodEnd", "current_period_end");
    rename(obj, "customerId", "provider_customer_id");
    rename(obj, "updatedAt", "updated_at");

    if let Some(tier) = obj.get("tier").and_then(Value::as_str) {
        let tier = tier.trim().to_lowercase();
        obj.insert("tier".to_string(), Value::String(tier));
    }
    if let Some(status) = obj.get("status").and_then(Value::as_str) {
        let status = match status.trim() {
            "pastDue" | "past-due" | "past_due" => "past_due".to_string(),
            "cancelled" | "canceled" => "canceled".to_string(),
            other => other.to_lowercase(),
        };
        obj.insert("status".to_string(), Value::String(status));
    }

    coerce_datetime(obj, "current_period_end");
    coerce_datetime(obj, "updated_at");
}

/// Normalize a raw wear event or outfit history body
pub fn normalize_history(obj: &mut Map<String, Value>) {
    rename(obj, "ownerId", "owner_id");
    rename(obj, "userId", "owner_id");
    rename(obj, "itemId", "item_id");
    rename(obj, "itemIds", "item_ids");
    rename(obj, "items", "item_ids");
    rename(obj, "outfitId", "outfit_id");
    rename(obj, "wornAt", "worn_at");
    rename(obj, "date", "worn_at");
    rename(obj, "fitScore", "fit_score");
    rename(obj, "aiScore", "fit_score");
    rename(obj, "createdAt", "created_at");

    coerce_datetime(obj, "worn_at");
    coerce_datetime(obj, "created_at");
}

/// Parse a height given as `5'10"`, `5-10`, `5 ft 10 in` or
/// `{"feet": 5, "inches": 10}` into centimeters, rounded to 0.1 cm.
pub fn parse_feet_inches(value: &Value) -> Option<f64> {
    let (feet, inches) = match value {
        Value::Object(map) => {
            let feet = map.get("feet").and_then(Value::as_f64)?;
            let inches = map.get("inches").and_then(Value::as_f64).unwrap_or(0.0);
            (feet, inches)
        }
        Value::String(s) => {
            let caps = feet_inches_regex().captures(s.trim())?;
            let feet: f64 = caps.get(1)?.as_str().parse().ok()?;
            let inches: f64 = caps
                .get(2)
                .map(|m| m.as_str().parse().unwrap_or(0.0))
                .unwrap_or(0.0);
            (feet, inches)
        }
        _ => return None,
    };

    if feet < 0.0 || !(0.0..12.0).contains(&inches) {
        return None;
    }

    let cm = (feet * 12.0 + inches) * 2.54;
    Some((cm * 10.0).round() / 10.0)
}

fn feet_inches_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^(\d+)\s*(?:'|ft|-)\s*(?:(\d+(?:\.\d+)?)\s*(?:"|''|in)?)?$"#)
            .expect("valid feet/inches regex")
    })
}

/// Parse a price given as a number or a string like `"$1,299.00"`
fn parse_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse().ok()
        }
        _ => None,
    }
}

fn rename(obj: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(v) = obj.remove(from) {
        if !obj.contains_key(to) && !v.is_null() {
            obj.insert(to.to_string(), v);
        }
    }
}

fn fill_missing(obj: &mut Map<String, Value>, key: &str, value: Value) {
    let missing = obj.get(key).map_or(true, Value::is_null);
    if missing {
        obj.insert(key.to_string(), value);
    }
}

fn ensure_object<'a>(obj: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let needs_reset = !obj.get(key).map_or(false, Value::is_object);
    if needs_reset {
        obj.insert(key.to_string(), Value::Object(Map::new()));
    }
    match obj.get_mut(key) {
        Some(Value::Object(map)) => map,
        _ => unreachable!("object was just inserted"),
    }
}

/// Turn an array, a comma-separated string, or null into a list of strings
fn string_list(value: Value) -> Value {
    let items: Vec<Value> = match value {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(Value::String(s.trim().to_string())),
                _ => None,
            })
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect(),
        _ => Vec::new(),
    };
    Value::Array(items)
}

fn millis_to_value(ms: i64) -> Value {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| Value::String(dt.to_rfc3339()))
        .unwrap_or(Value::Null)
}

/// Convert epoch milliseconds or a bare date into an RFC 3339 string
fn coerce_datetime(obj: &mut Map<String, Value>, key: &str) {
    let Some(value) = obj.get(key) else {
        return;
    };
    let converted = match value {
        Value::Number(n) => n.as_i64().map(millis_to_value),
        Value::String(s) => {
            let s = s.trim();
            if DateTime::parse_from_rfc3339(s).is_ok() {
                None
            } else if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                date.and_hms_opt(0, 0, 0)
                    .map(|dt| Value::String(dt.and_utc().to_rfc3339()))
            } else if s.is_empty() {
                Some(Value::Null)
            } else {
                None
            }
        }
        _ => None,
    };
    if let Some(v) = converted {
        if v.is_null() {
            obj.remove(key);
        } else {
            obj.insert(key.to_string(), v);
        }
    }
}

/// Convert epoch milliseconds or a full timestamp into a `YYYY-MM-DD` date
fn coerce_date(obj: &mut Map<String, Value>, key: &str) {
    let Some(value) = obj.get(key) else {
        return;
    };
    let converted = match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive()),
        _ => None,
    };
    if let Some(date) = converted {
        obj.insert(key.to_string(), Value::String(date.format("%Y-%m-%d").to_string()));
    } else if value.as_str().map_or(true, |s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_err()) {
        obj.remove(key);
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wardrobe::{UserProfile, WardrobeItem};
    use serde_json::json;

    fn doc(collection: Collection, body: Value) -> Document {
        Document {
            collection,
            id: "doc-1".to_string(),
            owner_id: "u1".to_string(),
            body,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_parse_feet_inches() {
        assert_eq!(parse_feet_inches(&json!("5'10\"")), Some(177.8));
        assert_eq!(parse_feet_inches(&json!("5-10")), Some(177.8));
        assert_eq!(parse_feet_inches(&json!("6'")), Some(182.9));
        assert_eq!(parse_feet_inches(&json!({"feet": 5, "inches": 4})), Some(162.6));
        assert_eq!(parse_feet_inches(&json!("tall")), None);
        assert_eq!(parse_feet_inches(&json!("5'14\"")), None);
    }

    #[test]
    fn test_legacy_profile_decodes() {
        let mut d = doc(
            Collection::Profiles,
            json!({
                "displayName": "Ada",
                "createdAt": 1_690_000_000_000i64,
                "stylePreferences": "minimal, classic",
                "heightFeetInches": "5'10\"",
                "measurements": {"weight": 60}
            }),
        );
        normalize_document(&mut d);
        let profile: UserProfile = serde_json::from_value(d.body).unwrap();

        assert_eq!(profile.user_id, "u1");
        assert_eq!(profile.display_name.as_deref(), Some("Ada"));
        assert_eq!(profile.preferences.style, vec!["minimal", "classic"]);
        assert_eq!(profile.measurements.height_cm, Some(177.8));
        assert_eq!(profile.measurements.weight_kg, Some(60.0));
        assert_eq!(profile.created_at.timestamp_millis(), 1_690_000_000_000);
    }

    #[test]
    fn test_canonical_spelling_wins() {
        let mut d = doc(
            Collection::Profiles,
            json!({
                "preferences": {"style": ["boho"]},
                "stylePreferences": ["preppy"],
                "measurements": {"height": 165.0, "height_cm": 170.0}
            }),
        );
        normalize_document(&mut d);
        assert_eq!(d.body["preferences"]["style"], json!(["boho"]));
        assert_eq!(d.body["measurements"]["height_cm"], json!(170.0));
        assert!(d.body.get("stylePreferences").is_none());
    }

    #[test]
    fn test_legacy_item_decodes() {
        let mut d = doc(
            Collection::Items,
            json!({
                "name": "Trench coat",
                "type": "Jacket",
                "price": "$1,299.50",
                "wearCount": "3",
                "lastWorn": 1_695_000_000_000i64,
                "purchaseDate": "2023-01-15T10:00:00Z",
                "tags": "classic,  rain"
            }),
        );
        normalize_document(&mut d);
        let item: WardrobeItem = serde_json::from_value(d.body).unwrap();

        assert_eq!(item.id, "doc-1");
        assert_eq!(item.owner_id, "u1");
        assert_eq!(item.category, ItemCategory::Outerwear);
        assert_eq!(item.purchase_price, Some(1299.5));
        assert_eq!(item.wear_count, 3);
        assert_eq!(item.style_tags, vec!["classic", "rain"]);
        assert_eq!(
            item.purchase_date,
            NaiveDate::from_ymd_opt(2023, 1, 15)
        );
        assert!(item.last_worn_at.is_some());
    }

    #[test]
    fn test_unknown_category_becomes_other() {
        let mut d = doc(Collection::Items, json!({"name": "Cape", "category": "cape"}));
        normalize_document(&mut d);
        assert_eq!(d.body["category"], "other");
    }

    #[test]
    fn test_subscription_status_spellings() {
        let mut d = doc(
            Collection::Subscriptions,
            json!({"plan": "Premium", "status": "pastDue"}),
        );
        normalize_document(&mut d);
        assert_eq!(d.body["tier"], "premium");
        assert_eq!(d.body["status"], "past_due");
        assert_eq!(d.body["user_id"], "u1");
    }

    #[test]
    fn test_history_timestamps() {
        let mut d = doc(
            Collection::Wears,
            json!({"itemId": "i1", "date": "2024-03-02"}),
        );
        normalize_document(&mut d);
        assert_eq!(d.body["item_id"], "i1");
        assert_eq!(d.body["worn_at"], "2024-03-02T00:00:00+00:00");
    }
}
