use axum::{body::Bytes, extract::Extension, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::optional_json;
use crate::domains::generation::{GenerateRequest, GeneratedPostSummary};
use crate::server::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog_post: Option<GeneratedPostSummary>,
    pub timestamp: DateTime<Utc>,
}

/// Trigger a generation.
///
/// With a `topic` the post is generated before responding. Without one the
/// attempt is spawned in the background and 202 is returned right away.
pub async fn generate_handler(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<GenerateResponse>), ApiError> {
    let request: GenerateRequest = optional_json(&body)?;
    let has_topic = request
        .topic
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());

    if has_topic {
        let summary = state.generator.generate_blog_post(request).await?;
        return Ok((
            StatusCode::OK,
            Json(GenerateResponse {
                message: "Blog post generated successfully".to_string(),
                blog_post: Some(summary),
                timestamp: Utc::now(),
            }),
        ));
    }

    let generator = state.generator.clone();
    tokio::spawn(async move {
        if let Err(e) = generator.generate_blog_post(request).await {
            tracing::error!(error = %e, "Background generation failed");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateResponse {
            message: "Blog generation started in background".to_string(),
            blog_post: None,
            timestamp: Utc::now(),
        }),
    ))
}
