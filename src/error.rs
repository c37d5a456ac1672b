use thiserror::Error;

/// Failures while turning page bytes into text.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported charset: {0}")]
    Decode(String),

    #[error("failed to parse html: {0}")]
    Parse(String),
}

/// Failures of a single page fetch. These only ever degrade one result.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("status code error: {0}")]
    Status(u16),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Failures of the upstream search provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to perform search request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("search request failed with status: {0}")]
    Status(u16),

    #[error("failed to parse search results: {0}")]
    Parse(String),
}

/// Failures that abort a whole search call.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search failed: {0}")]
    Provider(#[from] ProviderError),
}
