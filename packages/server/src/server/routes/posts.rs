use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Extension, Path, Query,
    },
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domains::blog::models::{BlogPost, BlogPostId};
use crate::server::{ApiError, AppState};

pub const DEFAULT_POSTS_LIMIT: i64 = 10;
pub const MAX_POSTS_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct PostsQuery {
    pub limit: Option<i64>,
    /// Case-insensitive substring of the post topic
    pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub posts: Vec<BlogPost>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Most recent posts, newest first
pub async fn list_posts_handler(
    Extension(state): Extension<AppState>,
    query: Result<Query<PostsQuery>, QueryRejection>,
) -> Result<Json<PostsResponse>, ApiError> {
    let Query(query) = query?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_POSTS_LIMIT)
        .clamp(1, MAX_POSTS_LIMIT);

    let posts = match query.topic.as_deref().map(str::trim) {
        Some(topic) if !topic.is_empty() => state.store.posts_by_topic(topic, limit).await?,
        _ => state.store.recent_posts(limit).await?,
    };

    Ok(Json(PostsResponse {
        count: posts.len(),
        posts,
        timestamp: Utc::now(),
    }))
}

pub async fn get_post_handler(
    Extension(state): Extension<AppState>,
    id: Result<Path<BlogPostId>, PathRejection>,
) -> Result<Json<BlogPost>, ApiError> {
    let Path(id) = id?;
    state
        .store
        .find_post(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Blog post {} not found", id)))
}
