//! `crawlctl` — a controllable, domain-bounded web crawler exposed over a
//! unary + server-streaming gRPC control API.

pub mod config;
pub mod crawl {
    tonic::include_proto!("crawl");
}
pub mod engine;
pub mod fetcher;
pub mod registry;
pub mod service;
pub mod tree;
pub mod url_norm;
pub mod visited;
