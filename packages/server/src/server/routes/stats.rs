use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domains::blog::models::GenerationStats;
use crate::server::{ApiError, AppState};

pub const DEFAULT_STATS_HOURS: i64 = 24;
pub const MAX_STATS_HOURS: i64 = 24 * 365;

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub hours: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: GenerationStats,
    pub timestamp: DateTime<Utc>,
}

/// Generation counters over the last `hours` hours
pub async fn stats_handler(
    Extension(state): Extension<AppState>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<StatsResponse>, ApiError> {
    let Query(query) = query?;
    let hours = query.hours.unwrap_or(DEFAULT_STATS_HOURS);
    if !(1..=MAX_STATS_HOURS).contains(&hours) {
        return Err(ApiError::BadRequest(format!(
            "hours must be between 1 and {}",
            MAX_STATS_HOURS
        )));
    }

    let stats = state.store.generation_stats(hours).await?;
    Ok(Json(StatsResponse {
        stats,
        timestamp: Utc::now(),
    }))
}
