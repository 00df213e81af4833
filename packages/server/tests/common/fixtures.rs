//! Shared fixtures for integration tests.

use std::sync::Arc;

use blog_core::domains::generation::{BlogGenerator, GenerationResult};
use blog_core::kernel::test_dependencies::{InMemoryBlogStore, MockContentPipeline};
use blog_core::kernel::BlogScheduler;
use blog_core::server::AppState;

/// A generation result as the extractor would produce it.
pub fn sample_generation_result(title: &str) -> GenerationResult {
    let content = format!("# {}\n\n## Overview\nModels keep getting better.", title);
    GenerationResult {
        title: title.to_string(),
        word_count: blog_core::domains::generation::count_words(&content),
        content,
        tags: vec!["AI".to_string(), "Research".to_string()],
        meta_description: Some("A short overview.".to_string()),
    }
}

/// Wired application state over in-memory collaborators.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<InMemoryBlogStore>,
    pub pipeline: Arc<MockContentPipeline>,
}

impl TestApp {
    pub fn new(pipeline: MockContentPipeline, store: InMemoryBlogStore) -> Self {
        let store = Arc::new(store);
        let pipeline = Arc::new(pipeline);
        let generator = Arc::new(BlogGenerator::new(pipeline.clone(), store.clone()).with_seed(3));
        let scheduler = Arc::new(BlogScheduler::new(generator.clone(), store.clone()));

        Self {
            state: AppState::new(store.clone(), generator, scheduler),
            store,
            pipeline,
        }
    }
}
