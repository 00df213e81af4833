// TestDependencies - mock implementations for testing
//
// In-memory doubles for every Base* trait so the generator, scheduler and
// HTTP routes can be exercised without Postgres or network access.

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BaseAI, BaseBlogStore, BaseContentPipeline, BaseSearchService, SearchResult};
use crate::domains::blog::models::{
    BlogPost, BlogPostId, GenerationCounts, GenerationLog, GenerationLogId, GenerationStats,
    GenerationStatus, NewBlogPost,
};
use crate::domains::generation::{BlogGenerator, SelectedTopic};

// =============================================================================
// Mock AI (chat completion)
// =============================================================================

pub struct MockAI {
    responses: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    error: Option<String>,
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            error: None,
        }
    }

    /// Every call fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::new()
        }
    }

    /// Add a text response to the queue
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(response.into());
        self
    }

    /// Get all (system, user) prompt pairs that were sent to the AI
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the number of times the AI was called
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAI for MockAI {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        if let Some(message) = &self.error {
            bail!("{}", message);
        }

        let mut responses = self.responses.lock().unwrap();
        if !responses.is_empty() {
            Ok(responses.remove(0))
        } else {
            Ok("Mock AI response".to_string())
        }
    }
}

// =============================================================================
// Mock Search Service
// =============================================================================

pub struct MockSearchService {
    responses: Arc<Mutex<Vec<Vec<SearchResult>>>>,
    queries: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockSearchService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_results(self, results: Vec<SearchResult>) -> Self {
        self.responses.lock().unwrap().push(results);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockSearchService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseSearchService for MockSearchService {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        self.queries.lock().unwrap().push(query.to_string());

        if self.fail {
            bail!("search service unavailable");
        }

        let mut responses = self.responses.lock().unwrap();
        if !responses.is_empty() {
            let mut results = responses.remove(0);
            results.truncate(max_results);
            Ok(results)
        } else {
            Ok(vec![])
        }
    }
}

// =============================================================================
// Mock Content Pipeline (stands in for the writing crew)
// =============================================================================

pub struct MockContentPipeline {
    output: Result<String, String>,
    delay: Option<Duration>,
    topics: Arc<Mutex<Vec<SelectedTopic>>>,
}

impl MockContentPipeline {
    /// Every run returns `raw`
    pub fn returning(raw: impl Into<String>) -> Self {
        Self {
            output: Ok(raw.into()),
            delay: None,
            topics: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every run fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            output: Err(message.into()),
            delay: None,
            topics: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sleep before answering (simulates a slow crew)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Topics the pipeline was asked to write about
    pub fn topics(&self) -> Vec<SelectedTopic> {
        self.topics.lock().unwrap().clone()
    }

    pub fn run_count(&self) -> usize {
        self.topics.lock().unwrap().len()
    }
}

#[async_trait]
impl BaseContentPipeline for MockContentPipeline {
    async fn run(&self, topic: &SelectedTopic) -> Result<String> {
        self.topics.lock().unwrap().push(topic.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.output {
            Ok(raw) => Ok(raw.clone()),
            Err(message) => bail!("{}", message),
        }
    }
}

// =============================================================================
// In-memory Blog Store
// =============================================================================

#[derive(Default)]
struct StoreState {
    posts: Vec<BlogPost>,
    logs: Vec<GenerationLog>,
}

#[derive(Default)]
pub struct InMemoryBlogStore {
    state: Mutex<StoreState>,
    fail_posts: bool,
    fail_logs: bool,
    unhealthy: bool,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `create_post` always errors
    pub fn failing_posts(mut self) -> Self {
        self.fail_posts = true;
        self
    }

    /// Generation log writes always error
    pub fn failing_logs(mut self) -> Self {
        self.fail_logs = true;
        self
    }

    /// `health_check` always errors
    pub fn unhealthy(mut self) -> Self {
        self.unhealthy = true;
        self
    }

    pub fn posts(&self) -> Vec<BlogPost> {
        self.state.lock().unwrap().posts.clone()
    }

    pub fn logs(&self) -> Vec<GenerationLog> {
        self.state.lock().unwrap().logs.clone()
    }

    /// Seed a log row with an explicit status and creation time
    pub fn insert_log(
        &self,
        topic: &str,
        status: GenerationStatus,
        created_at: DateTime<Utc>,
    ) -> GenerationLog {
        let mut state = self.state.lock().unwrap();
        let log = GenerationLog {
            id: state.logs.len() as GenerationLogId + 1,
            topic: topic.to_string(),
            status: status.as_str().to_string(),
            error_msg: None,
            blog_post_id: None,
            created_at,
            updated_at: created_at,
        };
        state.logs.push(log.clone());
        log
    }
}

#[async_trait]
impl BaseBlogStore for InMemoryBlogStore {
    async fn create_post(&self, post: &NewBlogPost) -> Result<BlogPost> {
        if self.fail_posts {
            bail!("database unavailable");
        }

        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let created = BlogPost {
            id: state.posts.len() as BlogPostId + 1,
            title: post.title.clone(),
            content: post.content.clone(),
            topic: post.topic.clone(),
            tags: post.tags.clone(),
            word_count: post.word_count,
            meta_description: post.meta_description.clone(),
            slug: post.slug.clone(),
            published: true,
            created_at: now,
            updated_at: now,
        };
        state.posts.push(created.clone());
        Ok(created)
    }

    async fn find_post(&self, id: BlogPostId) -> Result<Option<BlogPost>> {
        let state = self.state.lock().unwrap();
        Ok(state.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn recent_posts(&self, limit: i64) -> Result<Vec<BlogPost>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn posts_by_topic(&self, topic: &str, limit: i64) -> Result<Vec<BlogPost>> {
        let needle = topic.to_lowercase();
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .iter()
            .rev()
            .filter(|p| p.topic.to_lowercase().contains(&needle))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn start_generation_log(&self, topic: &str) -> Result<GenerationLog> {
        if self.fail_logs {
            bail!("database unavailable");
        }

        Ok(self.insert_log(topic, GenerationStatus::InProgress, Utc::now()))
    }

    async fn finish_generation_log(
        &self,
        id: GenerationLogId,
        status: GenerationStatus,
        error_msg: Option<String>,
        blog_post_id: Option<BlogPostId>,
    ) -> Result<GenerationLog> {
        if self.fail_logs {
            bail!("database unavailable");
        }

        let mut state = self.state.lock().unwrap();
        let Some(log) = state.logs.iter_mut().find(|l| l.id == id) else {
            bail!("generation log {} not found", id);
        };
        log.status = status.as_str().to_string();
        log.error_msg = error_msg;
        log.blog_post_id = blog_post_id;
        log.updated_at = Utc::now();
        Ok(log.clone())
    }

    async fn generation_stats(&self, hours: i64) -> Result<GenerationStats> {
        let since = Utc::now() - ChronoDuration::hours(hours);
        let state = self.state.lock().unwrap();

        let mut counts = GenerationCounts::default();
        for log in state.logs.iter().filter(|l| l.created_at >= since) {
            counts.total += 1;
            match log.status() {
                Ok(GenerationStatus::Success) => counts.success += 1,
                Ok(GenerationStatus::Failed) => counts.failed += 1,
                Ok(GenerationStatus::InProgress) => counts.in_progress += 1,
                Err(_) => {}
            }
        }
        let total_posts = state.posts.iter().filter(|p| p.created_at >= since).count() as i64;

        Ok(GenerationStats::new(counts, total_posts, hours))
    }

    async fn count_stale_in_progress(&self, older_than_hours: i64) -> Result<i64> {
        let before = Utc::now() - ChronoDuration::hours(older_than_hours);
        let state = self.state.lock().unwrap();
        Ok(state
            .logs
            .iter()
            .filter(|l| l.status == GenerationStatus::InProgress.as_str() && l.created_at < before)
            .count() as i64)
    }

    async fn health_check(&self) -> Result<()> {
        if self.unhealthy {
            bail!("database unreachable");
        }
        Ok(())
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub pipeline: Arc<MockContentPipeline>,
    pub store: Arc<InMemoryBlogStore>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            pipeline: Arc::new(MockContentPipeline::returning(SAMPLE_CREW_OUTPUT)),
            store: Arc::new(InMemoryBlogStore::new()),
        }
    }

    /// Set a mock content pipeline
    pub fn mock_pipeline(mut self, pipeline: MockContentPipeline) -> Self {
        self.pipeline = Arc::new(pipeline);
        self
    }

    /// Set an in-memory store
    pub fn mock_store(mut self, store: InMemoryBlogStore) -> Self {
        self.store = Arc::new(store);
        self
    }

    /// Build a generator over the mocks (deterministic topic selection)
    pub fn into_generator(self) -> Arc<BlogGenerator> {
        Arc::new(BlogGenerator::new(self.pipeline, self.store).with_seed(1))
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

/// Crew output in the shape the writer and editor prompts ask for.
pub const SAMPLE_CREW_OUTPUT: &str = "# The Rise of Agentic AI\n\n\
INTRODUCTION\n\
Autonomous agents are moving from demos into production systems.\n\n\
## Why It Matters\n\
Teams automate research, triage and reporting with planning models.\n\n\
**Tags:** Agentic AI, Automation, LLMs, Enterprise AI, Productivity\n\n\
Meta Description: How autonomous AI agents are moving from demos into production.";
