use anyhow::Result;
use async_trait::async_trait;
use mockito::{Matcher, Server};
use std::sync::Arc;
use std::time::Duration;

use gleaner::cache::{DEFAULT_TTL, TtlCache};
use gleaner::data_models::RawResult;
use gleaner::duckduckgo::{DuckDuckGo, SearchProvider, parse_results};
use gleaner::error::{FetchError, ProviderError};
use gleaner::fetcher::{HttpFetcher, PageFetcher, fetch_page_content};
use gleaner::search::{SearchOptions, SearchService};

mod test_helpers {
    use super::*;

    /// Accepts connections and never answers them.
    pub async fn stalled_server() -> Result<String> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        Ok(format!("http://{addr}"))
    }

    pub struct FixedProvider {
        pub results: Vec<RawResult>,
    }

    #[async_trait]
    impl SearchProvider for FixedProvider {
        async fn search(
            &self,
            _query: &str,
            max_results: usize,
        ) -> Result<Vec<RawResult>, ProviderError> {
            Ok(self.results.iter().take(max_results).cloned().collect())
        }
    }
}

use test_helpers::*;

const RESULTS_PAGE: &str = r#"
<html><body>
  <div class="result results_links">
    <h2 class="result__title"><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=abc">
      Rust Programming Language
    </a></h2>
    <a class="result__url" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=abc">www.rust-lang.org</a>
    <a class="result__snippet">A language empowering everyone.</a>
  </div>
  <div class="result results_links">
    <h2 class="result__title">No link here</h2>
    <a class="result__snippet">Should be skipped.</a>
  </div>
  <div class="result results_links">
    <h2 class="result__title">The Book</h2>
    <a class="result__url" href="https://doc.rust-lang.org/book/">doc.rust-lang.org</a>
    <a class="result__snippet">Learn Rust.</a>
  </div>
  <div class="result results_links">
    <h2 class="result__title">Tokio</h2>
    <a class="result__url" href="https://tokio.rs/">tokio.rs</a>
    <a class="result__snippet">Async runtime.</a>
  </div>
</body></html>
"#;

#[cfg(test)]
mod parse_tests {
    use super::*;

    #[test]
    fn test_parse_results_unwraps_and_skips() -> Result<()> {
        let results = parse_results(RESULTS_PAGE, 10)?;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].snippet, "A language empowering everyone.");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(results[1].title, "The Book");
        assert_eq!(results[1].url, "https://doc.rust-lang.org/book/");
        assert_eq!(results[2].url, "https://tokio.rs/");
        Ok(())
    }

    #[test]
    fn test_parse_results_respects_max() -> Result<()> {
        let results = parse_results(RESULTS_PAGE, 2)?;
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].title, "The Book");

        assert!(parse_results(RESULTS_PAGE, 0)?.is_empty());
        assert!(parse_results("<html></html>", 10)?.is_empty());
        Ok(())
    }
}

#[tokio::test]
async fn test_duckduckgo_search_against_mock() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/html/")
        .match_query(Matcher::UrlEncoded("q".into(), "rust async".into()))
        .match_header("user-agent", Matcher::Regex("Mozilla".into()))
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(RESULTS_PAGE)
        .expect(1)
        .create_async()
        .await;

    let provider = DuckDuckGo::new(server.url(), Duration::from_secs(5))?;
    let results = provider.search("rust async", 5).await?;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].url, "https://www.rust-lang.org/");
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_duckduckgo_error_status_is_fatal() -> Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/html/")
        .match_query(Matcher::Any)
        .with_status(403)
        .create_async()
        .await;

    let provider = DuckDuckGo::new(format!("{}/", server.url()), Duration::from_secs(5))?;
    let err = provider.search("blocked", 5).await.unwrap_err();

    assert!(matches!(err, ProviderError::Status(403)));
    Ok(())
}

#[tokio::test]
async fn test_http_fetcher_returns_body_and_content_type() -> Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/article")
        .with_status(200)
        .with_header("content-type", "text/html; charset=ISO-8859-1")
        .with_body(b"<html><body><main>Caf\xe9   au lait</main></body></html>".to_vec())
        .create_async()
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(5))?;
    let url = format!("{}/article", server.url());

    let page = fetcher.fetch(&url).await?;
    assert_eq!(
        page.content_type.as_deref(),
        Some("text/html; charset=ISO-8859-1")
    );

    let content = fetch_page_content(&fetcher, &url, 8000).await?;
    assert_eq!(content, "Café au lait");
    Ok(())
}

#[tokio::test]
async fn test_http_fetcher_rejects_error_status() -> Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(5))?;
    let err = fetcher
        .fetch(&format!("{}/missing", server.url()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status(404)));
    assert_eq!(err.to_string(), "status code error: 404");
    Ok(())
}

#[tokio::test]
async fn test_http_fetcher_unreachable_host() -> Result<()> {
    let fetcher = HttpFetcher::new(Duration::from_secs(2))?;
    let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();
    assert!(matches!(err, FetchError::Http(_)));
    Ok(())
}

#[tokio::test]
async fn test_http_fetcher_times_out() -> Result<()> {
    let base = stalled_server().await?;
    let fetcher = HttpFetcher::new(Duration::from_millis(100))?;

    let err = fetcher.fetch(&format!("{base}/slow")).await.unwrap_err();

    match err {
        FetchError::Http(e) => assert!(e.is_timeout(), "expected a timeout, got {e}"),
        other => panic!("expected a timeout, got {other}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_timed_out_page_falls_back_to_snippet_in_search() -> Result<()> {
    let mut server = Server::new_async().await;
    for path in ["/fast", "/fast-again"] {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body><article>Fast page</article></body></html>")
            .create_async()
            .await;
    }
    let stalled = stalled_server().await?;

    let results = vec![
        RawResult::new(
            "Fast one".into(),
            "fast snippet".into(),
            format!("{}/fast", server.url()),
        ),
        RawResult::new(
            "Slow one".into(),
            "slow snippet".into(),
            format!("{stalled}/slow"),
        ),
        RawResult::new(
            "Fast again".into(),
            "another snippet".into(),
            format!("{}/fast-again", server.url()),
        ),
    ];
    let service = SearchService::new(
        Arc::new(FixedProvider { results }),
        Arc::new(HttpFetcher::new(Duration::from_millis(200))?),
        Arc::new(TtlCache::new(DEFAULT_TTL)),
        Arc::new(TtlCache::new(DEFAULT_TTL)),
        SearchOptions::default(),
    );

    let response = service.search("mixed", 10, 8000).await?;

    assert_eq!(response.results.len(), 3);
    assert_eq!(response.results[0].content, "Fast page");
    assert_eq!(response.results[1].content, "slow snippet");
    assert_eq!(response.results[1].title, "Slow one");
    assert_eq!(response.results[2].content, "Fast page");
    assert!(service.page_cache().get(&format!("{stalled}/slow")).is_none());
    Ok(())
}
