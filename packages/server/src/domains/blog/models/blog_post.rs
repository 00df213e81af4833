use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::common::generate_slug;
use crate::domains::generation::GenerationResult;

pub type BlogPostId = i64;

/// A generated blog post as stored in `blog_posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BlogPost {
    pub id: BlogPostId,
    pub title: String,
    pub content: String,
    pub topic: String,
    pub tags: Vec<String>,
    pub word_count: i32,
    pub meta_description: Option<String>,
    pub slug: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBlogPost {
    pub title: String,
    pub content: String,
    pub topic: String,
    pub tags: Vec<String>,
    pub word_count: i32,
    pub meta_description: Option<String>,
    pub slug: String,
}

impl NewBlogPost {
    /// Build the insert payload for a generation result on `topic`.
    pub fn from_generation(topic: &str, result: &GenerationResult) -> Self {
        Self {
            title: result.title.clone(),
            content: result.content.clone(),
            topic: topic.to_string(),
            tags: result.tags.clone(),
            word_count: i32::try_from(result.word_count).unwrap_or(i32::MAX),
            meta_description: result.meta_description.clone(),
            slug: generate_slug(&result.title),
        }
    }
}

impl BlogPost {
    pub async fn create(post: &NewBlogPost, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO blog_posts (title, content, topic, tags, word_count, meta_description, slug)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.topic)
        .bind(&post.tags)
        .bind(post.word_count)
        .bind(&post.meta_description)
        .bind(&post.slug)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: BlogPostId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM blog_posts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Most recent posts first.
    pub async fn find_recent(limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM blog_posts
             ORDER BY created_at DESC, id DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Posts whose topic contains `topic`, case-insensitively.
    pub async fn find_by_topic(topic: &str, limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM blog_posts
             WHERE topic ILIKE '%' || $1 || '%'
             ORDER BY created_at DESC, id DESC
             LIMIT $2",
        )
        .bind(topic)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn count_since(since: DateTime<Utc>, pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blog_posts WHERE created_at >= $1")
            .bind(since)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }
}
