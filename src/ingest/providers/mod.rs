// src/ingest/providers/mod.rs
pub mod fixture;
pub mod http;

pub use fixture::FixtureFeed;
pub use http::HttpFeed;
