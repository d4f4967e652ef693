//! Resolution statistics for officials.
//!
//! All numbers are computed on demand from projected request rows. The
//! aggregation is kept in pure functions so it can be tested without a
//! database.

use std::collections::{BTreeMap, HashSet};

use cidadao_common::AppResult;
use cidadao_db::{
    entities::{official, request::RequestStatus},
    repositories::{ClaimedRequestRow, RequestRepository},
};
use serde::Serialize;

/// Number of categories reported in [`OfficialStats::top_categories`].
pub const TOP_CATEGORY_LIMIT: usize = 3;

/// Claimed-request count for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category_id: i32,
    pub name: String,
    pub count: u64,
}

/// Statistics for a single official.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OfficialStats {
    pub claimed_count: u64,
    pub resolved_count: u64,
    /// Mean resolution time in days, one decimal.
    pub avg_resolution_days: f64,
    /// Percentage of claimed requests that are resolved, 0..=100.
    pub resolution_rate: u32,
    pub top_categories: Vec<CategoryCount>,
}

/// Statistics across every claimed request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalStats {
    pub total_claimed: u64,
    pub total_resolved: u64,
    pub total_open: u64,
    pub total_in_progress: u64,
    pub avg_resolution_days: f64,
    pub resolution_rate: u32,
    /// Distinct citizens with at least one claimed request.
    pub citizens_served: u64,
}

/// An official together with its statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfficialProfile {
    #[serde(flatten)]
    pub official: official::Model,
    pub stats: OfficialStats,
}

/// Exact halves round to the even neighbour.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// `resolved / claimed * 100`, rounded half to even, 0 when nothing is claimed.
#[must_use]
pub fn resolution_rate(resolved: u64, claimed: u64) -> u32 {
    if claimed == 0 {
        return 0;
    }
    let rate = (resolved as f64 / claimed as f64 * 100.0).round_ties_even() as u32;
    rate.min(100)
}

/// Mean of the recorded resolution times of resolved rows, one decimal.
fn average_resolution_days<'a, I>(rows: I) -> f64
where
    I: IntoIterator<Item = &'a ClaimedRequestRow>,
{
    let days: Vec<i32> = rows
        .into_iter()
        .filter(|r| r.status == RequestStatus::Resolved)
        .filter_map(|r| r.resolution_time_days)
        .collect();

    if days.is_empty() {
        return 0.0;
    }

    let total: i64 = days.iter().map(|d| i64::from(*d)).sum();
    round_one_decimal(total as f64 / days.len() as f64)
}

/// Compute the statistics of one official from its claimed rows.
///
/// Rows claimed by other officials are ignored.
#[must_use]
pub fn official_stats(official_id: i32, rows: &[ClaimedRequestRow]) -> OfficialStats {
    let own: Vec<&ClaimedRequestRow> = rows
        .iter()
        .filter(|r| r.official_id == official_id)
        .collect();

    let claimed_count = own.len() as u64;
    let resolved_count = own
        .iter()
        .filter(|r| r.status == RequestStatus::Resolved)
        .count() as u64;

    // Keyed by category id so ties come out in ascending id order.
    let mut by_category: BTreeMap<i32, CategoryCount> = BTreeMap::new();
    for row in &own {
        by_category
            .entry(row.category_id)
            .or_insert_with(|| CategoryCount {
                category_id: row.category_id,
                name: row.category_name.clone(),
                count: 0,
            })
            .count += 1;
    }

    let mut top_categories: Vec<CategoryCount> = by_category.into_values().collect();
    top_categories.sort_by(|a, b| b.count.cmp(&a.count));
    top_categories.truncate(TOP_CATEGORY_LIMIT);

    OfficialStats {
        claimed_count,
        resolved_count,
        avg_resolution_days: average_resolution_days(own.iter().copied()),
        resolution_rate: resolution_rate(resolved_count, claimed_count),
        top_categories,
    }
}

/// Compute the global statistics over every claimed row.
#[must_use]
pub fn global_stats(rows: &[ClaimedRequestRow]) -> GlobalStats {
    let count_status =
        |status: RequestStatus| rows.iter().filter(|r| r.status == status).count() as u64;

    let total_claimed = rows.len() as u64;
    let total_resolved = count_status(RequestStatus::Resolved);
    let citizens: HashSet<i32> = rows.iter().map(|r| r.user_id).collect();

    GlobalStats {
        total_claimed,
        total_resolved,
        total_open: count_status(RequestStatus::Open),
        total_in_progress: count_status(RequestStatus::InProgress),
        avg_resolution_days: average_resolution_days(rows),
        resolution_rate: resolution_rate(total_resolved, total_claimed),
        citizens_served: citizens.len() as u64,
    }
}

/// Build a profile for every official and order them by resolution rate.
///
/// `officials` is expected in id order; equal rates keep that order.
#[must_use]
pub fn rank_officials(
    officials: Vec<official::Model>,
    rows: &[ClaimedRequestRow],
) -> Vec<OfficialProfile> {
    let mut profiles: Vec<OfficialProfile> = officials
        .into_iter()
        .map(|official| {
            let stats = official_stats(official.id, rows);
            OfficialProfile { official, stats }
        })
        .collect();

    profiles.sort_by(|a, b| b.stats.resolution_rate.cmp(&a.stats.resolution_rate));
    profiles
}

/// Statistics service.
#[derive(Clone)]
pub struct StatsService {
    request_repo: RequestRepository,
}

impl StatsService {
    /// Create a new stats service.
    #[must_use]
    pub const fn new(request_repo: RequestRepository) -> Self {
        Self { request_repo }
    }

    /// Statistics for one official.
    pub async fn for_official(&self, official_id: i32) -> AppResult<OfficialStats> {
        let rows = self.request_repo.find_claimed_rows(Some(official_id)).await?;
        Ok(official_stats(official_id, &rows))
    }

    /// Statistics across every official.
    pub async fn global(&self) -> AppResult<GlobalStats> {
        let rows = self.request_repo.find_claimed_rows(None).await?;
        Ok(global_stats(&rows))
    }

    /// Profiles for the given officials, best resolution rate first.
    pub async fn ranking(&self, officials: Vec<official::Model>) -> AppResult<Vec<OfficialProfile>> {
        let rows = self.request_repo.find_claimed_rows(None).await?;
        Ok(rank_officials(officials, &rows))
    }
}
