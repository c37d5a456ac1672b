use serde::{Deserialize, Serialize};

use crate::search::{DEFAULT_MAX_CONTENT_LENGTH, DEFAULT_NUM_RESULTS};

/// Query string values are kept raw so that garbage falls back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub results: Option<String>,
    #[serde(rename = "maxLength")]
    pub max_length: Option<String>,
}

impl SearchParams {
    pub fn num_results(&self) -> usize {
        parse_or(self.results.as_deref(), DEFAULT_NUM_RESULTS)
    }

    pub fn max_content_length(&self) -> usize {
        parse_or(self.max_length.as_deref(), DEFAULT_MAX_CONTENT_LENGTH)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FetchParams {
    pub url: Option<String>,
    #[serde(rename = "maxLength")]
    pub max_length: Option<String>,
}

impl FetchParams {
    pub fn max_content_length(&self) -> usize {
        parse_or(self.max_length.as_deref(), DEFAULT_MAX_CONTENT_LENGTH)
    }
}

fn parse_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FetchResponse {
    pub contents: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
