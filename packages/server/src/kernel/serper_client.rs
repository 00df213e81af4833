use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{BaseSearchService, SearchResult};

pub const DEFAULT_SERPER_URL: &str = "https://google.serper.dev/search";

/// Serper (Google search) API client for web search
pub struct SerperClient {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

/// Serper API request
#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

/// Serper API response
#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

/// Individual organic result from Serper
#[derive(Debug, Deserialize)]
struct SerperResult {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    date: Option<String>,
}

impl SerperClient {
    /// Create a new Serper client
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_key,
            endpoint: DEFAULT_SERPER_URL.to_string(),
            client,
        })
    }

    /// Point the client at a different search endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl BaseSearchService for SerperClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let request = SerperRequest {
            q: query,
            num: max_results,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send Serper search request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Serper API error {}: {}", status, body);
        }

        let serper_response: SerperResponse = response
            .json()
            .await
            .context("Failed to parse Serper response")?;

        let results = serper_response
            .organic
            .into_iter()
            .take(max_results)
            .map(|r| SearchResult {
                title: r.title,
                url: r.link,
                snippet: r.snippet,
                date: r.date,
            })
            .collect();

        Ok(results)
    }
}
