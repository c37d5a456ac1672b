use serde::{Deserialize, Serialize};

use crate::urls::derive_source_name;

/// A single hit as returned by the upstream search provider. `url` has
/// already been unwrapped from any click-redirect link.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RawResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

impl RawResult {
    pub fn new(title: String, snippet: String, url: String) -> RawResult {
        RawResult {
            title,
            snippet,
            url,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EnrichedResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
    pub content: String,
    #[serde(rename = "sourceName")]
    pub source_name: String,
}

impl EnrichedResult {
    pub fn from_raw(raw: RawResult, content: String) -> EnrichedResult {
        let source_name = derive_source_name(&raw.title, &raw.url);
        EnrichedResult {
            title: raw.title,
            snippet: raw.snippet,
            url: raw.url,
            content,
            source_name,
        }
    }

    /// Degraded form used when the page could not be fetched or extracted.
    pub fn from_snippet(raw: RawResult) -> EnrichedResult {
        let content = raw.snippet.clone();
        Self::from_raw(raw, content)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResponse {
    pub results: Vec<EnrichedResult>,
}

/// Raw body and `Content-Type` header of a fetched page.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

impl FetchedPage {
    pub fn new(body: Vec<u8>, content_type: Option<String>) -> FetchedPage {
        FetchedPage { body, content_type }
    }
}
