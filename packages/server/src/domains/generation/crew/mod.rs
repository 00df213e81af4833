//! The writing crew: researcher, writer and editor run in sequence, each a
//! single chat completion fed the previous agent's output.

pub mod prompts;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domains::generation::topics::SelectedTopic;
use crate::kernel::{BaseAI, BaseContentPipeline, BaseSearchService, SearchResult};

/// Search hits handed to the researcher.
pub const RESEARCH_SOURCES: usize = 5;

pub struct WritingCrew {
    ai: Arc<dyn BaseAI>,
    search: Option<Arc<dyn BaseSearchService>>,
}

impl WritingCrew {
    pub fn new(ai: Arc<dyn BaseAI>) -> Self {
        Self { ai, search: None }
    }

    /// Ground the researcher in live web search results.
    pub fn with_search(mut self, search: Arc<dyn BaseSearchService>) -> Self {
        self.search = Some(search);
        self
    }

    async fn gather_sources(&self, topic: &str) -> Vec<SearchResult> {
        let Some(search) = &self.search else {
            return Vec::new();
        };

        match search.search(topic, RESEARCH_SOURCES).await {
            Ok(results) => {
                debug!(topic = %topic, count = results.len(), "Search results for research");
                results
            }
            Err(e) => {
                warn!(topic = %topic, error = %e, "Search failed, researching without sources");
                Vec::new()
            }
        }
    }

    async fn research(&self, selected: &SelectedTopic) -> Result<String> {
        let sources = self.gather_sources(&selected.topic).await;
        self.ai
            .complete(
                &prompts::researcher_system(selected.theme),
                &prompts::researcher_task(&selected.topic, selected.theme, &sources),
            )
            .await
            .context("Research agent failed")
    }

    async fn write(&self, selected: &SelectedTopic, research: &str) -> Result<String> {
        self.ai
            .complete(
                &prompts::writer_system(selected.theme),
                &prompts::writer_task(&selected.topic, research),
            )
            .await
            .context("Writer agent failed")
    }

    async fn edit(&self, draft: &str) -> Result<String> {
        self.ai
            .complete(prompts::EDITOR_SYSTEM, &prompts::editor_task(draft))
            .await
            .context("Editor agent failed")
    }
}

#[async_trait]
impl BaseContentPipeline for WritingCrew {
    async fn run(&self, selected: &SelectedTopic) -> Result<String> {
        info!(topic = %selected.topic, theme = %selected.theme, "Crew starting");

        let research = self.research(selected).await?;
        let draft = self.write(selected, &research).await?;
        let edited = self.edit(&draft).await?;

        info!(topic = %selected.topic, chars = edited.len(), "Crew finished");
        Ok(edited)
    }
}
