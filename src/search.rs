use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::cache::TtlCache;
use crate::data_models::{EnrichedResult, RawResult, SearchResponse};
use crate::duckduckgo::SearchProvider;
use crate::error::{FetchError, SearchError};
use crate::extractor;
use crate::fetcher::{PageFetcher, fetch_page_content};

pub const DEFAULT_NUM_RESULTS: usize = 10;
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 8000;
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Upper bound on page fetches in flight during one search call.
    pub max_concurrent_fetches: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

/// Search-and-enrich pipeline: one provider call, then one fetch per hit,
/// with both stages cached.
pub struct SearchService {
    provider: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    search_cache: Arc<TtlCache<SearchResponse>>,
    page_cache: Arc<TtlCache<String>>,
    options: SearchOptions,
}

/// Response cache key. `max_content_length` is deliberately not part of it,
/// so responses cached under one length are served for any other.
pub fn cache_key(query: &str, num_results: usize) -> String {
    format!("{query}:{num_results}")
}

impl SearchService {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        search_cache: Arc<TtlCache<SearchResponse>>,
        page_cache: Arc<TtlCache<String>>,
        options: SearchOptions,
    ) -> Self {
        Self {
            provider,
            fetcher,
            search_cache,
            page_cache,
            options,
        }
    }

    pub fn search_cache(&self) -> &TtlCache<SearchResponse> {
        &self.search_cache
    }

    pub fn page_cache(&self) -> &TtlCache<String> {
        &self.page_cache
    }

    pub async fn search(
        &self,
        query: &str,
        num_results: usize,
        max_content_length: usize,
    ) -> Result<SearchResponse, SearchError> {
        let key = cache_key(query, num_results);
        if let Some(cached) = self.search_cache.get(&key) {
            log::info!("search cache hit for {key:?}");
            return Ok(cached);
        }

        let raw_results = self.provider.search(query, num_results).await?;

        let permits = Arc::new(Semaphore::new(
            self.options
                .max_concurrent_fetches
                .clamp(1, Semaphore::MAX_PERMITS),
        ));
        let handles: Vec<_> = raw_results
            .iter()
            .cloned()
            .map(|raw| {
                let fetcher = self.fetcher.clone();
                let page_cache = self.page_cache.clone();
                let permits = permits.clone();
                tokio::spawn(enrich(raw, fetcher, page_cache, permits, max_content_length))
            })
            .collect();

        // join_all yields in input order, so the provider's ranking survives
        let results = join_all(handles)
            .await
            .into_iter()
            .zip(raw_results)
            .map(|(joined, raw)| match joined {
                Ok(result) => result,
                Err(e) => {
                    log::error!("enrichment task for {} failed, error: {:#}", raw.url, e);
                    EnrichedResult::from_snippet(raw)
                }
            })
            .collect();

        let response = SearchResponse { results };
        self.search_cache.put(key, response.clone());
        Ok(response)
    }

    /// Fetches and extracts a single page, bypassing both caches.
    pub async fn fetch_page_content(
        &self,
        url: &str,
        max_content_length: usize,
    ) -> Result<String, FetchError> {
        fetch_page_content(self.fetcher.as_ref(), url, max_content_length).await
    }
}

async fn enrich(
    raw: RawResult,
    fetcher: Arc<dyn PageFetcher>,
    page_cache: Arc<TtlCache<String>>,
    permits: Arc<Semaphore>,
    max_content_length: usize,
) -> EnrichedResult {
    if let Some(content) = page_cache.get(&raw.url) {
        return EnrichedResult::from_raw(raw, content);
    }

    let fetched = {
        // only the network part is gated; the semaphore is never closed
        let _permit = permits.acquire().await;
        fetcher.fetch(&raw.url).await
    };

    let content = fetched.and_then(|page| {
        extractor::extract(&page.body, page.content_type.as_deref(), max_content_length)
            .map_err(FetchError::from)
    });

    match content {
        Ok(content) => {
            page_cache.put(raw.url.clone(), content.clone());
            EnrichedResult::from_raw(raw, content)
        }
        Err(e) => {
            log::warn!("falling back to snippet for {}, error: {:#}", raw.url, e);
            EnrichedResult::from_snippet(raw)
        }
    }
}
