//! Cost-per-wear table

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::wardrobe::{ItemCategory, WardrobeItem};

/// One row of the CPW table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CpwRow {
    pub item_id: String,
    pub name: String,
    pub category: ItemCategory,
    pub purchase_price: Option<f64>,
    pub wear_count: u32,
    pub cost_per_wear: Option<f64>,
}

impl From<&WardrobeItem> for CpwRow {
    fn from(item: &WardrobeItem) -> Self {
        Self {
            item_id: item.id.clone(),
            name: item.name.clone(),
            category: item.category,
            purchase_price: item.purchase_price,
            wear_count: item.wear_count,
            cost_per_wear: item.cost_per_wear(),
        }
    }
}

/// CPW rows for non-archived items, cheapest per wear first.
///
/// Items without a CPW (no price or never worn) sort last, ordered by
/// price descending so the most expensive unworn pieces stand out.
pub fn cpw_table(items: &[WardrobeItem]) -> Vec<CpwRow> {
    let mut rows: Vec<CpwRow> = items
        .iter()
        .filter(|i| !i.archived)
        .map(CpwRow::from)
        .collect();
    rows.sort_by(compare_rows);
    rows
}

fn compare_rows(a: &CpwRow, b: &CpwRow) -> Ordering {
    match (a.cost_per_wear, b.cost_per_wear) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b
            .purchase_price
            .unwrap_or(0.0)
            .total_cmp(&a.purchase_price.unwrap_or(0.0))
            .then_with(|| a.name.cmp(&b.name)),
    }
}

/// Mean CPW over rows that have one
pub fn average_cpw(rows: &[CpwRow]) -> Option<f64> {
    let values: Vec<f64> = rows.iter().filter_map(|r| r.cost_per_wear).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, price: Option<f64>, wears: u32) -> WardrobeItem {
        let mut item = WardrobeItem::new("u1", name, ItemCategory::Top);
        item.purchase_price = price;
        item.wear_count = wears;
        item
    }

    #[test]
    fn test_sorted_with_missing_last() {
        let items = vec![
            item("unworn", Some(200.0), 0),
            item("pricey", Some(100.0), 2),
            item("cheap", Some(10.0), 5),
            item("gift", None, 3),
            item("unworn-cheap", Some(20.0), 0),
        ];
        let rows = cpw_table(&items);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["cheap", "pricey", "unworn", "unworn-cheap", "gift"]);
        assert_eq!(rows[0].cost_per_wear, Some(2.0));
    }

    #[test]
    fn test_archived_excluded() {
        let mut archived = item("old", Some(50.0), 1);
        archived.archived = true;
        assert!(cpw_table(&[archived]).is_empty());
    }

    #[test]
    fn test_average_cpw() {
        let rows = cpw_table(&[item("a", Some(10.0), 1), item("b", Some(30.0), 1), item("c", None, 0)]);
        assert_eq!(average_cpw(&rows), Some(20.0));
        assert_eq!(average_cpw(&[]), None);
    }
}
