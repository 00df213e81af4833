//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::generation::BlogGenerator;
use crate::kernel::{BaseBlogStore, BlogScheduler};
use crate::server::routes::{
    generate_handler, get_post_handler, health_handler, list_posts_handler, root_handler,
    scheduler_start_handler, scheduler_status_handler, scheduler_stop_handler, stats_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BaseBlogStore>,
    pub generator: Arc<BlogGenerator>,
    pub scheduler: Arc<BlogScheduler>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn BaseBlogStore>,
        generator: Arc<BlogGenerator>,
        scheduler: Arc<BlogScheduler>,
    ) -> Self {
        Self {
            store,
            generator,
            scheduler,
        }
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    // CORS configuration - allow any origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/generate", post(generate_handler))
        .route("/posts", get(list_posts_handler))
        .route("/posts/:id", get(get_post_handler))
        .route("/stats", get(stats_handler))
        .route("/scheduler", get(scheduler_status_handler))
        .route("/scheduler/start", post(scheduler_start_handler))
        .route("/scheduler/stop", post(scheduler_stop_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
