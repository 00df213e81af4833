//! Generation orchestrator.
//!
//! One attempt runs topic selection, the content pipeline, extraction,
//! normalization and persistence, bracketed by a generation log row that is
//! opened as `in_progress` and closed as `success` or `failed`.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use super::extraction::{count_words, extract_blog_components};
use super::markdown::normalize_markdown;
use super::topics::{SelectedTopic, Theme, TopicSelector};
use crate::domains::blog::models::{
    BlogPost, BlogPostId, GenerationLogId, GenerationStatus, NewBlogPost,
};
use crate::kernel::{BaseBlogStore, BaseContentPipeline};

/// Step of an attempt that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    Generate,
    Persist,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStage::Generate => write!(f, "generate"),
            GenerationStage::Persist => write!(f, "persist"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{stage} stage failed: {message}")]
pub struct GenerationError {
    pub stage: GenerationStage,
    pub message: String,
}

impl GenerationError {
    fn new(stage: GenerationStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Body of a manual generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub theme: Option<Theme>,
}

impl GenerateRequest {
    pub fn topic(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            theme: None,
        }
    }

    pub fn theme(theme: Theme) -> Self {
        Self {
            topic: None,
            theme: Some(theme),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPostSummary {
    pub id: BlogPostId,
    pub title: String,
    pub topic: String,
    pub tags: Vec<String>,
    pub word_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&BlogPost> for GeneratedPostSummary {
    fn from(post: &BlogPost) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            topic: post.topic.clone(),
            tags: post.tags.clone(),
            word_count: post.word_count,
            created_at: post.created_at,
        }
    }
}

pub struct BlogGenerator {
    pipeline: Arc<dyn BaseContentPipeline>,
    store: Arc<dyn BaseBlogStore>,
    selector: TopicSelector,
    rng: Mutex<StdRng>,
}

impl BlogGenerator {
    pub fn new(pipeline: Arc<dyn BaseContentPipeline>, store: Arc<dyn BaseBlogStore>) -> Self {
        Self {
            pipeline,
            store,
            selector: TopicSelector::current(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic topic selection.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_selector(mut self, selector: TopicSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn store(&self) -> &Arc<dyn BaseBlogStore> {
        &self.store
    }

    /// Resolve the subject of an attempt: a custom topic wins, otherwise the
    /// selector picks one (restricted to the requested theme, if any).
    pub fn resolve_topic(&self, request: &GenerateRequest) -> SelectedTopic {
        let custom = request
            .topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        if let Some(topic) = custom {
            return SelectedTopic {
                theme: request.theme.unwrap_or_else(|| Theme::infer(topic)),
                topic: topic.to_string(),
            };
        }

        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        self.selector.select(request.theme, &mut *rng)
    }

    /// Run one attempt end to end.
    pub async fn generate_blog_post(
        &self,
        request: GenerateRequest,
    ) -> Result<GeneratedPostSummary, GenerationError> {
        let selected = self.resolve_topic(&request);
        info!(topic = %selected.topic, theme = %selected.theme, "Starting blog generation");

        let log_id = self.open_log(&selected.topic).await;

        match self.produce(&selected).await {
            Ok(post) => {
                self.close_log(log_id, GenerationStatus::Success, None, Some(post.id))
                    .await;
                info!(
                    post_id = post.id,
                    title = %post.title,
                    word_count = post.word_count,
                    "Blog post generated"
                );
                Ok(GeneratedPostSummary::from(&post))
            }
            Err(e) => {
                self.close_log(log_id, GenerationStatus::Failed, Some(e.to_string()), None)
                    .await;
                error!(topic = %selected.topic, stage = %e.stage, error = %e.message, "Blog generation failed");
                Err(e)
            }
        }
    }

    /// Timer entry point: a random topic, errors logged and swallowed.
    pub async fn generate_for_schedule(&self) -> Option<GeneratedPostSummary> {
        match self.generate_blog_post(GenerateRequest::default()).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(error = %e, "Scheduled generation produced no post");
                None
            }
        }
    }

    async fn produce(&self, selected: &SelectedTopic) -> Result<BlogPost, GenerationError> {
        let raw = self
            .pipeline
            .run(selected)
            .await
            .map_err(|e| GenerationError::new(GenerationStage::Generate, format!("{:#}", e)))?;

        if raw.trim().is_empty() {
            return Err(GenerationError::new(
                GenerationStage::Generate,
                "No output generated from crew",
            ));
        }

        let mut result = extract_blog_components(&raw);
        result.content = normalize_markdown(&result.content);
        result.word_count = count_words(&result.content);

        let new_post = NewBlogPost::from_generation(&selected.topic, &result);
        self.store
            .create_post(&new_post)
            .await
            .map_err(|e| GenerationError::new(GenerationStage::Persist, format!("{:#}", e)))
    }

    async fn open_log(&self, topic: &str) -> Option<GenerationLogId> {
        match self.store.start_generation_log(topic).await {
            Ok(log) => Some(log.id),
            Err(e) => {
                warn!(topic = %topic, error = %e, "Failed to record generation start");
                None
            }
        }
    }

    async fn close_log(
        &self,
        log_id: Option<GenerationLogId>,
        status: GenerationStatus,
        error_msg: Option<String>,
        blog_post_id: Option<BlogPostId>,
    ) {
        let Some(id) = log_id else { return };
        if let Err(e) = self
            .store
            .finish_generation_log(id, status, error_msg, blog_post_id)
            .await
        {
            warn!(log_id = id, status = %status, error = %e, "Failed to update generation log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::{InMemoryBlogStore, MockContentPipeline};

    const RAW: &str = "# Agents At Work\n\nKEY POINTS\nAgents plan and act.\n\n\
                       **Tags:** AI, Agents, Automation\n\
                       Meta Description: How agents are changing work.";

    fn generator(pipeline: MockContentPipeline) -> (BlogGenerator, Arc<InMemoryBlogStore>) {
        let store = Arc::new(InMemoryBlogStore::new());
        let generator = BlogGenerator::new(Arc::new(pipeline), store.clone()).with_seed(7);
        (generator, store)
    }

    #[tokio::test]
    async fn test_success_persists_post_and_log() {
        let (generator, store) = generator(MockContentPipeline::returning(RAW));

        let summary = generator
            .generate_blog_post(GenerateRequest::topic("AI agents"))
            .await
            .unwrap();

        assert_eq!(summary.title, "Agents At Work");
        assert_eq!(summary.topic, "AI agents");
        assert_eq!(summary.tags, vec!["AI", "Agents", "Automation"]);

        let post = store.find_post(summary.id).await.unwrap().unwrap();
        assert_eq!(post.slug, "agents-at-work");
        assert!(post.content.contains("## Key Points"));
        assert_eq!(post.word_count as usize, count_words(&post.content));
        assert_eq!(
            post.meta_description.as_deref(),
            Some("How agents are changing work.")
        );

        let logs = store.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, "success");
        assert_eq!(logs[0].blog_post_id, Some(summary.id));
    }

    #[tokio::test]
    async fn test_empty_output_fails_attempt() {
        let (generator, store) = generator(MockContentPipeline::returning("   \n"));

        let err = generator
            .generate_blog_post(GenerateRequest::default())
            .await
            .unwrap_err();

        assert_eq!(err.stage, GenerationStage::Generate);
        assert_eq!(err.message, "No output generated from crew");
        assert!(store.posts().is_empty());

        let logs = store.logs();
        assert_eq!(logs[0].status, "failed");
        assert!(logs[0]
            .error_msg
            .as_deref()
            .unwrap()
            .contains("No output generated from crew"));
    }

    #[tokio::test]
    async fn test_store_failure_is_persist_stage() {
        let store = Arc::new(InMemoryBlogStore::new().failing_posts());
        let generator =
            BlogGenerator::new(Arc::new(MockContentPipeline::returning(RAW)), store.clone());

        let err = generator
            .generate_blog_post(GenerateRequest::default())
            .await
            .unwrap_err();

        assert_eq!(err.stage, GenerationStage::Persist);
        assert_eq!(store.logs()[0].status, "failed");
    }

    #[tokio::test]
    async fn test_log_failure_does_not_abort() {
        let store = Arc::new(InMemoryBlogStore::new().failing_logs());
        let generator =
            BlogGenerator::new(Arc::new(MockContentPipeline::returning(RAW)), store.clone());

        let summary = generator
            .generate_blog_post(GenerateRequest::default())
            .await
            .unwrap();

        assert_eq!(store.posts().len(), 1);
        assert_eq!(store.posts()[0].id, summary.id);
    }

    #[tokio::test]
    async fn test_schedule_swallows_errors() {
        let (generator, store) = generator(MockContentPipeline::failing("llm down"));

        assert!(generator.generate_for_schedule().await.is_none());
        assert_eq!(store.logs()[0].status, "failed");
    }

    #[tokio::test]
    async fn test_theme_restricts_random_topic() {
        let pipeline = Arc::new(MockContentPipeline::returning(RAW));
        let generator = BlogGenerator::new(pipeline.clone(), Arc::new(InMemoryBlogStore::new()))
            .with_seed(42);

        generator
            .generate_blog_post(GenerateRequest::theme(Theme::Blockchain))
            .await
            .unwrap();

        let seen = pipeline.topics();
        assert_eq!(seen[0].theme, Theme::Blockchain);
        assert!(seen[0].topic.contains(" - "));
    }

    #[test]
    fn test_custom_topic_infers_theme() {
        let (generator, _) = generator(MockContentPipeline::returning(RAW));

        let selected = generator.resolve_topic(&GenerateRequest::topic("  Bitcoin ETFs  "));
        assert_eq!(selected.topic, "Bitcoin ETFs");
        assert_eq!(selected.theme, Theme::Blockchain);

        let blank = generator.resolve_topic(&GenerateRequest::topic("   "));
        assert!(blank.topic.contains(" - "));
    }
}
