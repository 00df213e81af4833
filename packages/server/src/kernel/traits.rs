// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// The generation flow (topic -> crew -> extraction -> store) lives in
// domains::generation and is written against these traits.
//
// Naming convention: Base* for trait names (e.g., BaseAI, BaseBlogStore)

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domains::blog::models::{
    BlogPost, BlogPostId, GenerationLog, GenerationLogId, GenerationStats, GenerationStatus,
    NewBlogPost,
};
use crate::domains::generation::SelectedTopic;

// =============================================================================
// AI Trait (Infrastructure - chat completion)
// =============================================================================

#[async_trait]
pub trait BaseAI: Send + Sync {
    /// Complete a system + user prompt pair (returns raw text response)
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

// =============================================================================
// Search Service Trait (Infrastructure)
// =============================================================================

/// A single web search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub date: Option<String>,
}

#[async_trait]
pub trait BaseSearchService: Send + Sync {
    /// Search the web, returning at most `max_results` hits
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

// =============================================================================
// Content Pipeline Trait (Infrastructure - the agent crew)
// =============================================================================

#[async_trait]
pub trait BaseContentPipeline: Send + Sync {
    /// Research, write and edit a post on the topic (returns the raw final text)
    async fn run(&self, topic: &SelectedTopic) -> Result<String>;
}

// =============================================================================
// Blog Store Trait (Infrastructure - persistence)
// =============================================================================

#[async_trait]
pub trait BaseBlogStore: Send + Sync {
    async fn create_post(&self, post: &NewBlogPost) -> Result<BlogPost>;

    async fn find_post(&self, id: BlogPostId) -> Result<Option<BlogPost>>;

    /// Most recent posts first
    async fn recent_posts(&self, limit: i64) -> Result<Vec<BlogPost>>;

    /// Posts whose topic contains `topic` (case-insensitive), most recent first
    async fn posts_by_topic(&self, topic: &str, limit: i64) -> Result<Vec<BlogPost>>;

    /// Create an `in_progress` log row for a new attempt
    async fn start_generation_log(&self, topic: &str) -> Result<GenerationLog>;

    /// Move an attempt's log row to its final status
    async fn finish_generation_log(
        &self,
        id: GenerationLogId,
        status: GenerationStatus,
        error_msg: Option<String>,
        blog_post_id: Option<BlogPostId>,
    ) -> Result<GenerationLog>;

    /// Counters over the last `hours` hours
    async fn generation_stats(&self, hours: i64) -> Result<GenerationStats>;

    /// Attempts stuck in `in_progress` for longer than `older_than_hours`
    async fn count_stale_in_progress(&self, older_than_hours: i64) -> Result<i64>;

    /// Check the store is reachable
    async fn health_check(&self) -> Result<()>;
}
