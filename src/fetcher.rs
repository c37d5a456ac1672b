use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

use crate::data_models::FetchedPage;
use crate::error::FetchError;
use crate::extractor;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Source of raw page bytes.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<HttpFetcher, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(HttpFetcher { client })
    }

    pub fn with_client(client: reqwest::Client) -> HttpFetcher {
        HttpFetcher { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let res = self.client.get(url).send().await?;

        let status = res.status();
        if status.as_u16() >= 300 {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = res.bytes().await?;

        Ok(FetchedPage::new(body.to_vec(), content_type))
    }
}

/// Fetches `url` and runs the body through the content extractor.
pub async fn fetch_page_content(
    fetcher: &dyn PageFetcher,
    url: &str,
    max_length: usize,
) -> Result<String, FetchError> {
    let page = fetcher.fetch(url).await?;
    let content = extractor::extract(&page.body, page.content_type.as_deref(), max_length)?;
    Ok(content)
}
