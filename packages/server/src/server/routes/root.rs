use std::collections::BTreeMap;

use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct ServiceInfo {
    message: &'static str,
    description: &'static str,
    version: &'static str,
    scheduler_running: bool,
    endpoints: BTreeMap<&'static str, &'static str>,
}

/// Service banner with the route map
pub async fn root_handler(Extension(state): Extension<AppState>) -> Json<ServiceInfo> {
    let endpoints = BTreeMap::from([
        ("health", "GET /health"),
        ("generate", "POST /generate"),
        ("posts", "GET /posts"),
        ("post", "GET /posts/{id}"),
        ("stats", "GET /stats"),
        ("scheduler", "GET /scheduler"),
        ("scheduler_start", "POST /scheduler/start"),
        ("scheduler_stop", "POST /scheduler/stop"),
    ]);

    Json(ServiceInfo {
        message: "Blog Generation Service",
        description: "Scheduled research, writing and publishing of blog posts on generative AI and blockchain",
        version: env!("CARGO_PKG_VERSION"),
        scheduler_running: state.scheduler.is_running().await,
        endpoints,
    })
}
