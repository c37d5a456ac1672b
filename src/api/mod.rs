use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::search::SearchService;

pub mod handlers;
pub mod models;

pub fn create_router(service: Arc<SearchService>, static_dir: Option<&str>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/api/search", get(handlers::search_handler))
        .route("/api/fetch", get(handlers::fetch_handler))
        .route("/health", get(handlers::health_handler))
        .with_state(service);

    // Static file serving for a browser frontend
    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(cors)
}
