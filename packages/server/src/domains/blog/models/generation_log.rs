use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use super::blog_post::BlogPostId;

pub type GenerationLogId = i64;

/// Outcome of a generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    InProgress,
    Success,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationStatus::InProgress => "in_progress",
            GenerationStatus::Success => "success",
            GenerationStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "in_progress" => Ok(GenerationStatus::InProgress),
            "success" => Ok(GenerationStatus::Success),
            "failed" => Ok(GenerationStatus::Failed),
            other => anyhow::bail!("unknown generation status: {}", other),
        }
    }
}

/// One generation attempt as stored in `generation_logs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GenerationLog {
    pub id: GenerationLogId,
    pub topic: String,
    pub status: String, // 'in_progress', 'success', 'failed'
    pub error_msg: Option<String>,
    pub blog_post_id: Option<BlogPostId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attempt and post counters over a trailing window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub total_attempts: i64,
    pub successful_attempts: i64,
    pub failed_attempts: i64,
    pub in_progress_attempts: i64,
    pub total_posts: i64,
    pub success_rate: f64,
    pub period_hours: i64,
}

impl GenerationStats {
    pub fn new(counts: GenerationCounts, total_posts: i64, period_hours: i64) -> Self {
        let success_rate = if counts.total > 0 {
            counts.success as f64 / counts.total as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_attempts: counts.total,
            successful_attempts: counts.success,
            failed_attempts: counts.failed,
            in_progress_attempts: counts.in_progress,
            total_posts,
            success_rate,
            period_hours,
        }
    }
}

/// Raw per-status counts from `generation_logs`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct GenerationCounts {
    pub total: i64,
    pub success: i64,
    pub failed: i64,
    pub in_progress: i64,
}

impl GenerationLog {
    pub fn status(&self) -> Result<GenerationStatus> {
        self.status.parse()
    }

    /// Record the start of an attempt.
    pub async fn start(topic: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO generation_logs (topic, status)
             VALUES ($1, 'in_progress')
             RETURNING *",
        )
        .bind(topic)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Record the outcome of an attempt.
    pub async fn finish(
        id: GenerationLogId,
        status: GenerationStatus,
        error_msg: Option<String>,
        blog_post_id: Option<BlogPostId>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE generation_logs
             SET status = $2, error_msg = $3, blog_post_id = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(error_msg)
        .bind(blog_post_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn counts_since(since: DateTime<Utc>, pool: &PgPool) -> Result<GenerationCounts> {
        sqlx::query_as::<_, GenerationCounts>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE status = 'success') AS success,
                    COUNT(*) FILTER (WHERE status = 'failed') AS failed,
                    COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress
             FROM generation_logs
             WHERE created_at >= $1",
        )
        .bind(since)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Attempts still `in_progress` that started before `before`.
    pub async fn count_stale_in_progress(before: DateTime<Utc>, pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM generation_logs
             WHERE status = 'in_progress' AND created_at < $1",
        )
        .bind(before)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
