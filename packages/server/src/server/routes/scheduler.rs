use axum::{body::Bytes, extract::Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::optional_json;
use crate::kernel::JobInfo;
use crate::server::{ApiError, AppState};

/// Interval used when `POST /scheduler/start` omits one.
pub const DEFAULT_START_INTERVAL_MINUTES: u64 = 10;

#[derive(Debug, Deserialize)]
pub struct StartSchedulerRequest {
    #[serde(default = "default_interval")]
    pub interval_minutes: u64,
}

impl Default for StartSchedulerRequest {
    fn default() -> Self {
        Self {
            interval_minutes: DEFAULT_START_INTERVAL_MINUTES,
        }
    }
}

fn default_interval() -> u64 {
    DEFAULT_START_INTERVAL_MINUTES
}

#[derive(Debug, Serialize)]
pub struct SchedulerStatusResponse {
    pub running: bool,
    pub jobs: Vec<JobInfo>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
            timestamp: Utc::now(),
        })
    }
}

pub async fn scheduler_status_handler(
    Extension(state): Extension<AppState>,
) -> Json<SchedulerStatusResponse> {
    Json(SchedulerStatusResponse {
        running: state.scheduler.is_running().await,
        jobs: state.scheduler.job_info().await,
        timestamp: Utc::now(),
    })
}

pub async fn scheduler_start_handler(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let request: StartSchedulerRequest = optional_json(&body)?;
    if request.interval_minutes == 0 {
        return Err(ApiError::BadRequest(
            "interval_minutes must be at least 1".to_string(),
        ));
    }

    if state.scheduler.is_running().await {
        return Ok(MessageResponse::new("Scheduler is already running"));
    }

    state.scheduler.start(request.interval_minutes).await?;
    Ok(MessageResponse::new(format!(
        "Scheduler started with {} minute interval",
        request.interval_minutes
    )))
}

pub async fn scheduler_stop_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.scheduler.is_running().await {
        return Ok(MessageResponse::new("Scheduler is not running"));
    }

    state.scheduler.stop().await?;
    Ok(MessageResponse::new("Scheduler stopped"))
}
