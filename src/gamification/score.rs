//! Global Wardrobe Score
//!
//! A single 0-100 number summarizing how well a wardrobe is used. It is a
//! weighted sum of four components, each already on a 0-100 scale:
//!
//! - **utilization**: share of active items worn inside the window
//! - **cpw_trend**: whether average cost-per-wear fell over the last 30 days
//! - **fit**: mean AI-fit score of outfits inside the window
//! - **revival**: forgotten items brought back into rotation

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::GamificationError;
use crate::wardrobe::{OutfitEntry, WardrobeItem, WearEvent};

/// Lookback for the "previous" side of the CPW trend
pub const CPW_TREND_DAYS: i64 = 30;

/// Score when a component has no data to judge
const NEUTRAL: f64 = 50.0;

/// Component weights
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreWeights {
    #[serde(default = "default_utilization")]
    pub utilization: f64,
    #[serde(default = "default_cpw_trend")]
    pub cpw_trend: f64,
    #[serde(default = "default_fit")]
    pub fit: f64,
    #[serde(default = "default_revival")]
    pub revival: f64,
}

fn default_utilization() -> f64 {
    0.40
}

fn default_cpw_trend() -> f64 {
    0.25
}

fn default_fit() -> f64 {
    0.25
}

fn default_revival() -> f64 {
    0.10
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            utilization: default_utilization(),
            cpw_trend: default_cpw_trend(),
            fit: default_fit(),
            revival: default_revival(),
        }
    }
}

impl ScoreWeights {
    /// Weights must be finite, non-negative and sum to 1 (within 0.001)
    pub fn validate(&self) -> Result<(), GamificationError> {
        let all = [self.utilization, self.cpw_trend, self.fit, self.revival];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(GamificationError::InvalidWeights(
                "weights must be finite and non-negative".to_string(),
            ));
        }
        let sum: f64 = all.iter().sum();
        if (sum - 1.0).abs() > 0.001 {
            return Err(GamificationError::InvalidWeights(format!(
                "weights must sum to 1.0, got {:.3}",
                sum
            )));
        }
        Ok(())
    }
}

/// Letter grade for a score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Grade::A
        } else if score >= 70.0 {
            Grade::B
        } else if score >= 55.0 {
            Grade::C
        } else if score >= 40.0 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        write!(f, "{}", s)
    }
}

/// Component values and the raw figures behind them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub utilization: f64,
    pub cpw_trend: f64,
    pub fit: f64,
    pub revival: f64,
    pub active_items: usize,
    pub worn_items: usize,
    pub current_cpw: Option<f64>,
    pub previous_cpw: Option<f64>,
    pub scored_outfits: usize,
    pub revived_wears: usize,
}

/// The computed score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalWardrobeScore {
    pub score: f64,
    pub grade: Grade,
    pub components: ScoreBreakdown,
    pub weights: ScoreWeights,
    pub window_days: i64,
    pub computed_at: DateTime<Utc>,
}

/// Compute the Global Wardrobe Score.
///
/// `weights` are expected to have passed [`ScoreWeights::validate`]; the
/// result is still clamped to `[0, 100]` and rounded to one decimal.
pub fn compute(
    items: &[WardrobeItem],
    wears: &[WearEvent],
    outfits: &[OutfitEntry],
    weights: &ScoreWeights,
    window_days: i64,
    now: DateTime<Utc>,
) -> GlobalWardrobeScore {
    let window_start = now - Duration::days(window_days);
    let in_window = |t: DateTime<Utc>| t >= window_start && t <= now;

    let active: Vec<&WardrobeItem> = items.iter().filter(|i| !i.archived).collect();

    let usage = utilization(items, wears, window_start, now);

    // CPW trend
    let trend_start = now - Duration::days(CPW_TREND_DAYS);
    let mut recent_wears: HashMap<&str, u32> = HashMap::new();
    for w in wears.iter().filter(|w| w.worn_at >= trend_start) {
        *recent_wears.entry(w.item_id.as_str()).or_default() += 1;
    }
    let current_cpw = average_cpw(active.iter().map(|i| (i.purchase_price, i.wear_count)));
    let previous_cpw = average_cpw(active.iter().map(|i| {
        let recent = recent_wears.get(i.id.as_str()).copied().unwrap_or(0);
        (i.purchase_price, i.wear_count.saturating_sub(recent))
    }));
    let cpw_trend = match (previous_cpw, current_cpw) {
        (Some(prev), Some(cur)) if prev > 0.0 => (NEUTRAL + NEUTRAL * (prev - cur) / prev).clamp(0.0, 100.0),
        _ => NEUTRAL,
    };

    // Fit
    let fit_scores: Vec<f64> = outfits
        .iter()
        .filter(|o| in_window(o.worn_at))
        .filter_map(|o| o.fit_score)
        .filter(|s| s.is_finite())
        .collect();
    let fit = if fit_scores.is_empty() {
        NEUTRAL
    } else {
        (fit_scores.iter().sum::<f64>() / fit_scores.len() as f64).clamp(0.0, 100.0)
    };

    // Revival
    let revived_wears = wears
        .iter()
        .filter(|w| w.revived && in_window(w.worn_at))
        .count();
    let revival = (10.0 * revived_wears as f64).min(100.0);

    let raw = weights.utilization * usage.percent
        + weights.cpw_trend * cpw_trend
        + weights.fit * fit
        + weights.revival * revival;
    let score = round1(raw.clamp(0.0, 100.0));

    GlobalWardrobeScore {
        score,
        grade: Grade::from_score(score),
        components: ScoreBreakdown {
            utilization: round1(usage.percent),
            cpw_trend: round1(cpw_trend),
            fit: round1(fit),
            revival,
            active_items: usage.active_items,
            worn_items: usage.worn_items,
            current_cpw,
            previous_cpw,
            scored_outfits: fit_scores.len(),
            revived_wears,
        },
        weights: *weights,
        window_days,
        computed_at: now,
    }
}

/// Active items worn inside a window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Utilization {
    pub active_items: usize,
    pub worn_items: usize,
    /// `0.0` when there are no active items
    pub percent: f64,
}

/// Share of non-archived items worn in `[start, end]`.
///
/// An item counts as worn when a wear event falls inside the window or
/// its `last_worn_at` does; legacy items carry the latter without events.
pub fn utilization(
    items: &[WardrobeItem],
    wears: &[WearEvent],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Utilization {
    let in_window = |t: DateTime<Utc>| t >= start && t <= end;
    let worn_ids: HashSet<&str> = wears
        .iter()
        .filter(|w| in_window(w.worn_at))
        .map(|w| w.item_id.as_str())
        .collect();

    let active: Vec<&WardrobeItem> = items.iter().filter(|i| !i.archived).collect();
    let worn_items = active
        .iter()
        .filter(|i| worn_ids.contains(i.id.as_str()) || i.last_worn_at.map_or(false, in_window))
        .count();
    let percent = if active.is_empty() {
        0.0
    } else {
        100.0 * worn_items as f64 / active.len() as f64
    };

    Utilization {
        active_items: active.len(),
        worn_items,
        percent,
    }
}

/// Mean cost-per-wear over items that have both a price and wears
fn average_cpw(items: impl Iterator<Item = (Option<f64>, u32)>) -> Option<f64> {
    let values: Vec<f64> = items
        .filter_map(|(price, wears)| crate::wardrobe::cost_per_wear(price, wears))
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wardrobe::ItemCategory;

    fn item(id: &str, price: Option<f64>, wears: u32, now: DateTime<Utc>) -> WardrobeItem {
        let mut item = WardrobeItem::new("u1", id, ItemCategory::Top).created(now - Duration::days(200));
        item.id = id.to_string();
        item.purchase_price = price;
        item.wear_count = wears;
        item
    }

    fn wear(item_id: &str, at: DateTime<Utc>) -> WearEvent {
        WearEvent::new("u1", item_id, at)
    }

    #[test]
    fn test_default_weights_valid() {
        assert!(ScoreWeights::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_weights() {
        let mut w = ScoreWeights::default();
        w.fit = 0.5;
        assert!(w.validate().is_err());

        let w = ScoreWeights {
            utilization: 1.2,
            cpw_trend: -0.2,
            fit: 0.0,
            revival: 0.0,
        };
        assert!(w.validate().is_err());
    }

    #[test]
    fn test_empty_wardrobe() {
        let now = Utc::now();
        let gws = compute(&[], &[], &[], &ScoreWeights::default(), 90, now);
        // U = 0, T = 50, F = 50, R = 0
        assert_eq!(gws.components.utilization, 0.0);
        assert_eq!(gws.components.cpw_trend, 50.0);
        assert_eq!(gws.components.fit, 50.0);
        assert_eq!(gws.score, 25.0);
        assert_eq!(gws.grade, Grade::F);
    }

    #[test]
    fn test_utilization_counts_window_only() {
        let now = Utc::now();
        let items = vec![
            item("a", None, 1, now),
            item("b", None, 1, now),
            item("c", None, 0, now),
            item("d", None, 0, now),
        ];
        let wears = vec![
            wear("a", now - Duration::days(3)),
            wear("b", now - Duration::days(120)),
        ];
        let gws = compute(&items, &wears, &[], &ScoreWeights::default(), 90, now);
        assert_eq!(gws.components.worn_items, 1);
        assert_eq!(gws.components.utilization, 25.0);
    }

    #[test]
    fn test_archived_items_excluded() {
        let now = Utc::now();
        let mut archived = item("b", None, 0, now);
        archived.archived = true;
        let items = vec![item("a", None, 1, now), archived];
        let wears = vec![wear("a", now - Duration::days(1))];

        let gws = compute(&items, &wears, &[], &ScoreWeights::default(), 90, now);
        assert_eq!(gws.components.active_items, 1);
        assert_eq!(gws.components.utilization, 100.0);
    }

    #[test]
    fn test_cpw_trend_improves_with_recent_wears() {
        let now = Utc::now();
        // 100.0 over 4 wears now, 2 of them recent: prev CPW 50, current 25
        let items = vec![item("a", Some(100.0), 4, now)];
        let wears = vec![
            wear("a", now - Duration::days(2)),
            wear("a", now - Duration::days(5)),
        ];
        let gws = compute(&items, &wears, &[], &ScoreWeights::default(), 90, now);
        assert_eq!(gws.components.previous_cpw, Some(50.0));
        assert_eq!(gws.components.current_cpw, Some(25.0));
        assert_eq!(gws.components.cpw_trend, 75.0);
    }

    #[test]
    fn test_cpw_trend_neutral_without_history() {
        let now = Utc::now();
        let items = vec![item("a", Some(80.0), 1, now)];
        let wears = vec![wear("a", now - Duration::days(1))];
        let gws = compute(&items, &wears, &[], &ScoreWeights::default(), 90, now);
        assert_eq!(gws.components.previous_cpw, None);
        assert_eq!(gws.components.cpw_trend, 50.0);
    }

    #[test]
    fn test_fit_and_revival() {
        let now = Utc::now();
        let outfits = vec![
            OutfitEntry::new("u1", vec!["a".into()], now - Duration::days(1)).fit_score(80.0),
            OutfitEntry::new("u1", vec!["a".into()], now - Duration::days(2)).fit_score(90.0),
            OutfitEntry::new("u1", vec!["a".into()], now - Duration::days(200)).fit_score(10.0),
        ];
        let mut revived = wear("a", now - Duration::days(1));
        revived.revived = true;

        let gws = compute(&[], &[revived], &outfits, &ScoreWeights::default(), 90, now);
        assert_eq!(gws.components.fit, 85.0);
        assert_eq!(gws.components.scored_outfits, 2);
        assert_eq!(gws.components.revival, 10.0);
    }

    #[test]
    fn test_perfect_wardrobe_grades_a() {
        let now = Utc::now();
        let items = vec![item("a", None, 1, now)];
        let mut wears = Vec::new();
        for i in 0..10 {
            let mut w = wear("a", now - Duration::days(i));
            w.revived = true;
            wears.push(w);
        }
        let outfits = vec![OutfitEntry::new("u1", vec!["a".into()], now).fit_score(100.0)];

        let gws = compute(&items, &wears, &outfits, &ScoreWeights::default(), 90, now);
        // 0.4*100 + 0.25*50 + 0.25*100 + 0.1*100
        assert_eq!(gws.score, 87.5);
        assert_eq!(gws.grade, Grade::A);
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(Grade::from_score(85.0), Grade::A);
        assert_eq!(Grade::from_score(84.9), Grade::B);
        assert_eq!(Grade::from_score(55.0), Grade::C);
        assert_eq!(Grade::from_score(40.0), Grade::D);
        assert_eq!(Grade::from_score(39.9), Grade::F);
    }
}
