use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;

use crate::data_models::SearchResponse;
use crate::search::SearchService;

use super::models::{ErrorResponse, FetchParams, FetchResponse, HealthResponse, SearchParams};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub async fn search_handler(
    State(service): State<Arc<SearchService>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = Instant::now();

    let query = params.q.as_deref().unwrap_or_default();
    if query.is_empty() {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "query parameter is required",
        ));
    }

    let response = service
        .search(query, params.num_results(), params.max_content_length())
        .await
        .map_err(|e| {
            log::error!("search for {query:?} failed, error: {:#}", e);
            error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    log::info!(
        "search {query:?}: {} results in {}ms",
        response.results.len(),
        start.elapsed().as_millis()
    );
    Ok(Json(response))
}

pub async fn fetch_handler(
    State(service): State<Arc<SearchService>>,
    Query(params): Query<FetchParams>,
) -> Result<Json<FetchResponse>, ApiError> {
    let url = params.url.as_deref().unwrap_or_default();
    if url.is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "url parameter is required"));
    }

    let contents = service
        .fetch_page_content(url, params.max_content_length())
        .await
        .map_err(|e| {
            log::error!("fetch of {url} failed, error: {:#}", e);
            error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(FetchResponse { contents }))
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
