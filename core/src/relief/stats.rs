use super::model::{FoodRequest, UrgencyLevel};
use serde::{Deserialize, Serialize};

pub const TOP_IMPACT_WINDOW: usize = 5;
pub const LOCATION_LABEL_MAX_CHARS: usize = 15;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrgencySlice {
    pub name: UrgencyLevel,
    pub value: usize,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImpactBar {
    pub name: String,
    pub people: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub urgency_distribution: Vec<UrgencySlice>,
    pub top_impact_locations: Vec<ImpactBar>,
}

/// Per-batch summary returned after a successful extraction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    /// Requests held after the batch was committed.
    pub total_processed: usize,
    pub food_requests_found: usize,
    pub critical_count: usize,
}

impl ExtractionStats {
    pub fn for_batch(batch: &[FoodRequest], total_after_commit: usize) -> Self {
        Self {
            total_processed: total_after_commit,
            food_requests_found: batch.len(),
            critical_count: batch
                .iter()
                .filter(|r| r.urgency == UrgencyLevel::Critical)
                .count(),
        }
    }
}

/// Counts per urgency in severity order; zero-count levels are omitted.
pub fn urgency_distribution(records: &[FoodRequest]) -> Vec<UrgencySlice> {
    UrgencyLevel::ALL
        .iter()
        .map(|level| (*level, records.iter().filter(|r| r.urgency == *level).count()))
        .filter(|(_, count)| *count > 0)
        .map(|(level, count)| UrgencySlice {
            name: level,
            value: count,
            color: level.chart_color().to_string(),
        })
        .collect()
}

pub fn location_label(location: &str) -> String {
    if location.chars().count() > LOCATION_LABEL_MAX_CHARS {
        let head: String = location.chars().take(LOCATION_LABEL_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        location.to_string()
    }
}

/// The most recently inserted requests (cache order, before any user
/// filter or sort), ranked by people affected.
pub fn top_impact_locations(records: &[FoodRequest]) -> Vec<ImpactBar> {
    let mut bars: Vec<ImpactBar> = records
        .iter()
        .take(TOP_IMPACT_WINDOW)
        .map(|r| ImpactBar {
            name: location_label(&r.location),
            people: r.people_count,
        })
        .collect();
    bars.sort_by(|a, b| b.people.cmp(&a.people));
    bars
}

/// `None` when there is nothing to chart.
pub fn dashboard_stats(records: &[FoodRequest]) -> Option<DashboardStats> {
    if records.is_empty() {
        return None;
    }
    Some(DashboardStats {
        total: records.len(),
        urgency_distribution: urgency_distribution(records),
        top_impact_locations: top_impact_locations(records),
    })
}
