use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use gleaner::api::create_router;
use gleaner::cache::TtlCache;
use gleaner::config::CONFIG;
use gleaner::duckduckgo::DuckDuckGo;
use gleaner::fetcher::HttpFetcher;
use gleaner::search::{
    DEFAULT_MAX_CONTENT_LENGTH, DEFAULT_NUM_RESULTS, SearchOptions, SearchService,
};

#[derive(Parser)]
#[command(name = "gleaner", about = "Web search proxy that enriches results with page text")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to listen on, overrides GLEANER_BIND_ADDR
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run one search and print the JSON response
    Search {
        query: String,
        #[arg(long, default_value_t = DEFAULT_NUM_RESULTS)]
        results: usize,
        #[arg(long, default_value_t = DEFAULT_MAX_CONTENT_LENGTH)]
        max_length: usize,
    },
    /// Fetch one page and print its extracted text
    Fetch {
        url: String,
        #[arg(long, default_value_t = DEFAULT_MAX_CONTENT_LENGTH)]
        max_length: usize,
    },
}

fn build_service() -> anyhow::Result<SearchService> {
    let provider = DuckDuckGo::new(CONFIG.search_base_url.clone(), CONFIG.http_timeout)
        .context("failed to build search client")?;
    let fetcher = HttpFetcher::new(CONFIG.http_timeout).context("failed to build page client")?;

    Ok(SearchService::new(
        Arc::new(provider),
        Arc::new(fetcher),
        Arc::new(TtlCache::new(CONFIG.cache_ttl)),
        Arc::new(TtlCache::new(CONFIG.cache_ttl)),
        SearchOptions {
            max_concurrent_fetches: CONFIG.max_concurrent_fetches,
        },
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber (handles both tracing and log crate)
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&CONFIG.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let service = build_service()?;

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| CONFIG.bind_addr.clone());
            let app = create_router(Arc::new(service), CONFIG.static_dir.as_deref());
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            tracing::info!("starting server on {addr}");
            axum::serve(listener, app).await?;
        }
        Command::Search {
            query,
            results,
            max_length,
        } => {
            let response = service.search(&query, results, max_length).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Fetch { url, max_length } => {
            let contents = service.fetch_page_content(&url, max_length).await?;
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "contents": contents }))?);
        }
    }
    Ok(())
}
