pub mod api;
pub mod cache;
pub mod config;
pub mod data_models;
pub mod duckduckgo;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod search;
pub mod urls;
