//! Postgres-backed blog store.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use super::models::{
    BlogPost, BlogPostId, GenerationLog, GenerationLogId, GenerationStats, GenerationStatus,
    NewBlogPost,
};
use crate::kernel::BaseBlogStore;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// [`BaseBlogStore`] over a shared connection pool.
#[derive(Clone)]
pub struct PgBlogStore {
    pool: PgPool,
}

impl PgBlogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run migrations")
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl BaseBlogStore for PgBlogStore {
    async fn create_post(&self, post: &NewBlogPost) -> Result<BlogPost> {
        let created = BlogPost::create(post, &self.pool)
            .await
            .context("Failed to insert blog post")?;
        tracing::info!(post_id = created.id, title = %created.title, "Created blog post");
        Ok(created)
    }

    async fn find_post(&self, id: BlogPostId) -> Result<Option<BlogPost>> {
        BlogPost::find_by_id(id, &self.pool).await
    }

    async fn recent_posts(&self, limit: i64) -> Result<Vec<BlogPost>> {
        BlogPost::find_recent(limit, &self.pool).await
    }

    async fn posts_by_topic(&self, topic: &str, limit: i64) -> Result<Vec<BlogPost>> {
        BlogPost::find_by_topic(topic, limit, &self.pool).await
    }

    async fn start_generation_log(&self, topic: &str) -> Result<GenerationLog> {
        GenerationLog::start(topic, &self.pool)
            .await
            .context("Failed to record generation start")
    }

    async fn finish_generation_log(
        &self,
        id: GenerationLogId,
        status: GenerationStatus,
        error_msg: Option<String>,
        blog_post_id: Option<BlogPostId>,
    ) -> Result<GenerationLog> {
        GenerationLog::finish(id, status, error_msg, blog_post_id, &self.pool)
            .await
            .with_context(|| format!("Failed to record generation outcome for log {}", id))
    }

    async fn generation_stats(&self, hours: i64) -> Result<GenerationStats> {
        let since = Utc::now() - chrono::Duration::hours(hours);
        let counts = GenerationLog::counts_since(since, &self.pool).await?;
        let total_posts = BlogPost::count_since(since, &self.pool).await?;
        Ok(GenerationStats::new(counts, total_posts, hours))
    }

    async fn count_stale_in_progress(&self, older_than_hours: i64) -> Result<i64> {
        let before = Utc::now() - chrono::Duration::hours(older_than_hours);
        GenerationLog::count_stale_in_progress(before, &self.pool).await
    }

    async fn health_check(&self) -> Result<()> {
        tokio::time::timeout(
            HEALTH_CHECK_TIMEOUT,
            sqlx::query("SELECT 1").execute(&self.pool),
        )
        .await
        .context("Query timeout (>5s)")?
        .context("Query failed")?;
        Ok(())
    }
}
