//! End-to-end generation: crew -> extraction -> normalization -> store.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use blog_core::domains::blog::models::GenerationLog;
use blog_core::domains::generation::{
    count_words, BlogGenerator, GenerateRequest, GenerationStage, SelectedTopic, Theme,
    WritingCrew,
};
use blog_core::kernel::test_dependencies::{
    InMemoryBlogStore, MockAI, MockContentPipeline, MockSearchService, SAMPLE_CREW_OUTPUT,
};
use blog_core::kernel::{BaseBlogStore, BaseContentPipeline, SearchResult};

/// Pipeline that snapshots the store's generation logs while the crew runs.
struct LogSnapshotPipeline {
    store: Arc<InMemoryBlogStore>,
    output: Result<String, String>,
    seen: Mutex<Vec<GenerationLog>>,
}

impl LogSnapshotPipeline {
    fn new(store: Arc<InMemoryBlogStore>, output: Result<&str, &str>) -> Self {
        Self {
            store,
            output: output.map(str::to_string).map_err(str::to_string),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<GenerationLog> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseContentPipeline for LogSnapshotPipeline {
    async fn run(&self, _topic: &SelectedTopic) -> anyhow::Result<String> {
        *self.seen.lock().unwrap() = self.store.logs();
        match &self.output {
            Ok(raw) => Ok(raw.clone()),
            Err(message) => anyhow::bail!("{}", message),
        }
    }
}

#[tokio::test]
async fn crew_output_becomes_stored_post() {
    let ai = Arc::new(
        MockAI::new()
            .with_response("Research: agents are shipping.")
            .with_response("# Draft")
            .with_response(SAMPLE_CREW_OUTPUT),
    );
    let search = Arc::new(MockSearchService::new().with_results(vec![SearchResult {
        title: "Agents in production".to_string(),
        url: "https://example.com/agents".to_string(),
        snippet: "Companies deploy agents.".to_string(),
        date: None,
    }]));
    let store = Arc::new(InMemoryBlogStore::new());
    let crew = WritingCrew::new(ai.clone()).with_search(search.clone());
    let generator = BlogGenerator::new(Arc::new(crew), store.clone());

    let summary = generator
        .generate_blog_post(GenerateRequest::topic("Agentic AI"))
        .await
        .unwrap();

    assert_eq!(summary.title, "The Rise of Agentic AI");
    assert_eq!(summary.tags.len(), 5);
    assert_eq!(ai.call_count(), 3);
    assert_eq!(search.queries(), vec!["Agentic AI".to_string()]);

    let post = store.find_post(summary.id).await.unwrap().unwrap();
    assert_eq!(post.slug, "the-rise-of-agentic-ai");
    assert!(post.content.contains("## Introduction"));
    assert!(!post.content.contains("Meta Description"));
    assert_eq!(post.word_count as usize, count_words(&post.content));
    assert!(post.published);
}

#[tokio::test]
async fn log_moves_from_in_progress_to_success() {
    let store = Arc::new(InMemoryBlogStore::new());
    let generator = BlogGenerator::new(
        Arc::new(MockContentPipeline::returning(SAMPLE_CREW_OUTPUT)),
        store.clone(),
    );

    let summary = generator
        .generate_blog_post(GenerateRequest::default())
        .await
        .unwrap();

    let logs = store.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, "success");
    assert_eq!(logs[0].blog_post_id, Some(summary.id));
    assert_eq!(logs[0].topic, summary.topic);
    assert!(logs[0].updated_at >= logs[0].created_at);
}

#[tokio::test]
async fn crew_failure_is_logged_as_failed() {
    let store = Arc::new(InMemoryBlogStore::new());
    let crew = WritingCrew::new(Arc::new(MockAI::failing("429 Too Many Requests")));
    let generator = BlogGenerator::new(Arc::new(crew), store.clone());

    let err = generator
        .generate_blog_post(GenerateRequest::topic("DeFi lending"))
        .await
        .unwrap_err();

    assert_eq!(err.stage, GenerationStage::Generate);
    assert!(err.message.contains("429 Too Many Requests"));

    let logs = store.logs();
    assert_eq!(logs[0].status, "failed");
    assert_eq!(logs[0].blog_post_id, None);
    assert!(store.posts().is_empty());

    let stats = store.generation_stats(24).await.unwrap();
    assert_eq!(stats.total_attempts, 1);
    assert_eq!(stats.failed_attempts, 1);
    assert_eq!(stats.success_rate, 0.0);
}

#[tokio::test]
async fn log_is_in_progress_while_crew_runs() {
    let store = Arc::new(InMemoryBlogStore::new());
    let pipeline = Arc::new(LogSnapshotPipeline::new(store.clone(), Ok(SAMPLE_CREW_OUTPUT)));
    let generator = BlogGenerator::new(pipeline.clone(), store.clone());

    let summary = generator
        .generate_blog_post(GenerateRequest::topic("Agentic workflows"))
        .await
        .unwrap();

    let during = pipeline.seen();
    assert_eq!(during.len(), 1);
    assert_eq!(during[0].status, "in_progress");
    assert_eq!(during[0].topic, "Agentic workflows");
    assert_eq!(during[0].blog_post_id, None);

    let after = store.logs();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].id, during[0].id);
    assert_eq!(after[0].status, "success");
    assert_eq!(after[0].blog_post_id, Some(summary.id));
}

#[tokio::test]
async fn in_progress_log_is_closed_as_failed() {
    let store = Arc::new(InMemoryBlogStore::new());
    let pipeline = Arc::new(LogSnapshotPipeline::new(store.clone(), Err("crew timed out")));
    let generator = BlogGenerator::new(pipeline.clone(), store.clone());

    generator
        .generate_blog_post(GenerateRequest::topic("Zero-knowledge proofs"))
        .await
        .unwrap_err();

    let during = pipeline.seen();
    assert_eq!(during.len(), 1);
    assert_eq!(during[0].status, "in_progress");
    assert_eq!(during[0].error_msg, None);

    let after = store.logs();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].id, during[0].id);
    assert_eq!(after[0].status, "failed");
    assert!(after[0]
        .error_msg
        .as_deref()
        .is_some_and(|m| m.contains("crew timed out")));
    assert_eq!(after[0].blog_post_id, None);
}

#[tokio::test]
async fn custom_blockchain_topic_frames_agents() {
    let ai = Arc::new(MockAI::new());
    let generator = BlogGenerator::new(
        Arc::new(WritingCrew::new(ai.clone())),
        Arc::new(InMemoryBlogStore::new()),
    );

    generator
        .generate_blog_post(GenerateRequest::topic("Ethereum rollups"))
        .await
        .unwrap();

    let (system, user) = &ai.calls()[0];
    assert!(system.contains("blockchain"));
    assert!(user.contains("Ethereum rollups"));
}

#[tokio::test]
async fn stats_count_successes() {
    let store = Arc::new(InMemoryBlogStore::new());
    let generator = BlogGenerator::new(
        Arc::new(MockContentPipeline::returning(SAMPLE_CREW_OUTPUT)),
        store.clone(),
    );

    for theme in [Theme::GenAI, Theme::Blockchain] {
        generator
            .generate_blog_post(GenerateRequest::theme(theme))
            .await
            .unwrap();
    }

    let stats = store.generation_stats(24).await.unwrap();
    assert_eq!(stats.total_attempts, 2);
    assert_eq!(stats.successful_attempts, 2);
    assert_eq!(stats.total_posts, 2);
    assert_eq!(stats.success_rate, 100.0);
    assert_eq!(stats.period_hours, 24);
}
