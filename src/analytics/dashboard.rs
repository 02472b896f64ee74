//! Wardrobe dashboard aggregation

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::cpw::{average_cpw, cpw_table, CpwRow};
use crate::gamification::score::utilization;
use crate::wardrobe::{normalize_color, ItemCategory, WardrobeItem, WearEvent};

/// Days covered by the wear timeline
pub const TIMELINE_DAYS: i64 = 30;

/// Number of entries in the most-worn list
pub const TOP_WORN: usize = 5;

/// Per-category totals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryBreakdown {
    pub category: ItemCategory,
    pub count: usize,
    pub wears: u64,
    pub value: f64,
}

/// Count of items sharing a color
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColorCount {
    pub color: String,
    pub count: usize,
}

/// Compact item reference used in dashboard lists
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemSummary {
    pub id: String,
    pub name: String,
    pub category: ItemCategory,
    pub wear_count: u32,
    pub days_since_worn: i64,
}

impl ItemSummary {
    fn of(item: &WardrobeItem, now: DateTime<Utc>) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category,
            wear_count: item.wear_count,
            days_since_worn: item.days_since_worn(now),
        }
    }
}

/// Wears logged on one UTC day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyWears {
    pub date: NaiveDate,
    pub wears: u64,
}

/// Everything the analytics page shows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub total_items: usize,
    pub active_items: usize,
    pub archived_items: usize,
    pub total_value: f64,
    pub average_cpw: Option<f64>,
    pub utilization_pct: f64,
    pub window_days: i64,
    pub categories: Vec<CategoryBreakdown>,
    pub colors: Vec<ColorCount>,
    pub most_worn: Vec<ItemSummary>,
    pub neglected: Vec<ItemSummary>,
    pub wear_timeline: Vec<DailyWears>,
    pub cpw: Vec<CpwRow>,
    pub generated_at: DateTime<Utc>,
}

/// Build the dashboard for one user's items and wear history
pub fn build_dashboard(
    items: &[WardrobeItem],
    wears: &[WearEvent],
    window_days: i64,
    neglected_days: i64,
    now: DateTime<Utc>,
) -> Dashboard {
    let active: Vec<&WardrobeItem> = items.iter().filter(|i| !i.archived).collect();

    let total_value = active.iter().filter_map(|i| i.purchase_price).sum::<f64>();
    let usage = utilization(items, wears, now - Duration::days(window_days), now);

    // Categories in declaration order, skipping empty ones
    let mut by_category: BTreeMap<ItemCategory, CategoryBreakdown> = BTreeMap::new();
    for item in &active {
        let entry = by_category
            .entry(item.category)
            .or_insert_with(|| CategoryBreakdown {
                category: item.category,
                count: 0,
                wears: 0,
                value: 0.0,
            });
        entry.count += 1;
        entry.wears += item.wear_count as u64;
        entry.value += item.purchase_price.unwrap_or(0.0);
    }

    let mut color_counts: HashMap<String, usize> = HashMap::new();
    for item in &active {
        let color = item
            .color
            .as_deref()
            .and_then(normalize_color)
            // "Black" and "black" share a bucket
            .map(|c| c.to_lowercase())
            .unwrap_or_else(|| "unspecified".to_string());
        *color_counts.entry(color).or_default() += 1;
    }
    let mut colors: Vec<ColorCount> = color_counts
        .into_iter()
        .map(|(color, count)| ColorCount { color, count })
        .collect();
    colors.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.color.cmp(&b.color)));

    let mut most_worn: Vec<&WardrobeItem> = active.iter().copied().filter(|i| i.wear_count > 0).collect();
    most_worn.sort_by(|a, b| b.wear_count.cmp(&a.wear_count).then_with(|| a.name.cmp(&b.name)));
    let most_worn = most_worn
        .into_iter()
        .take(TOP_WORN)
        .map(|i| ItemSummary::of(i, now))
        .collect();

    let mut neglected: Vec<ItemSummary> = active
        .iter()
        .filter(|i| i.is_neglected(now, neglected_days))
        .map(|i| ItemSummary::of(i, now))
        .collect();
    neglected.sort_by(|a, b| b.days_since_worn.cmp(&a.days_since_worn));

    let cpw = cpw_table(items);

    Dashboard {
        total_items: items.len(),
        active_items: active.len(),
        archived_items: items.len() - active.len(),
        total_value: (total_value * 100.0).round() / 100.0,
        average_cpw: average_cpw(&cpw),
        utilization_pct: (usage.percent * 10.0).round() / 10.0,
        window_days,
        categories: by_category.into_values().collect(),
        colors,
        most_worn,
        neglected,
        wear_timeline: wear_timeline(wears, now.date_naive(), TIMELINE_DAYS),
        cpw,
        generated_at: now,
    }
}

/// Wears per day for the `days` days ending on `today`, zero-filled
pub fn wear_timeline(wears: &[WearEvent], today: NaiveDate, days: i64) -> Vec<DailyWears> {
    let start = today - Duration::days(days - 1);
    let mut counts: HashMap<NaiveDate, u64> = HashMap::new();
    for w in wears {
        let day = w.worn_at.date_naive();
        if day >= start && day <= today {
            *counts.entry(day).or_default() += 1;
        }
    }

    (0..days)
        .map(|offset| {
            let date = start + Duration::days(offset);
            DailyWears {
                date,
                wears: counts.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}
