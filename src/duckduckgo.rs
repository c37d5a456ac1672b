use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

use crate::data_models::RawResult;
use crate::error::ProviderError;
use crate::fetcher::USER_AGENT;
use crate::urls::resolve_url;

pub const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";

/// Upstream web search. Implementations return at most `max_results` hits,
/// in the provider's ranking order.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<RawResult>, ProviderError>;
}

/// Scrapes the JavaScript-free DuckDuckGo results page.
#[derive(Debug, Clone)]
pub struct DuckDuckGo {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGo {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<DuckDuckGo, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(DuckDuckGo {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn search_url(&self, query: &str) -> String {
        format!("{}/html/?q={}", self.base_url, urlencoding::encode(query))
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGo {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<RawResult>, ProviderError> {
        let res = self.client.get(self.search_url(query)).send().await?;

        let status = res.status();
        if status.as_u16() >= 300 {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let html = res.text().await?;
        let results = parse_results(&html, max_results)?;
        log::info!("search for {query:?} returned {} results", results.len());
        Ok(results)
    }
}

fn selector(s: &str) -> Result<Selector, ProviderError> {
    Selector::parse(s).map_err(|e| ProviderError::Parse(e.to_string()))
}

fn trimmed_text(block: &ElementRef, selector: &Selector) -> String {
    block
        .select(selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Pulls `(title, snippet, url)` triples out of a results page.
pub fn parse_results(html: &str, max_results: usize) -> Result<Vec<RawResult>, ProviderError> {
    let result_selector = selector(".result")?;
    let title_selector = selector(".result__title")?;
    let snippet_selector = selector(".result__snippet")?;
    let url_selector = selector(".result__url")?;

    let document = Html::parse_document(html);
    let mut results = Vec::new();

    for block in document.select(&result_selector) {
        if results.len() >= max_results {
            break;
        }

        let href = block
            .select(&url_selector)
            .next()
            .and_then(|a| a.value().attr("href"));
        let Some(href) = href.filter(|h| !h.is_empty()) else {
            continue;
        };

        let url = resolve_url(href);
        if url.is_empty() {
            continue;
        }

        results.push(RawResult::new(
            trimmed_text(&block, &title_selector),
            trimmed_text(&block, &snippet_selector),
            url,
        ));
    }

    Ok(results)
}
