//! The `crawlctl-server` binary: parses flags, wires up the fetcher and
//! registry, and serves the `Crawl` gRPC service, with TLS turned on by
//! `--tls`.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tracing_subscriber::EnvFilter;

use crawlctl::config::ServerConfig;
use crawlctl::crawl::crawl_server::CrawlServer;
use crawlctl::fetcher::{Fetcher, HtmlFetcher, MockFetcher};
use crawlctl::registry::Registry;
use crawlctl::service::CrawlService;

const USER_AGENT: &str = "crawlctl";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_tracing(config.debug_logging());

    let fetcher: Arc<dyn Fetcher> = if config.mock {
        tracing::info!("using MockFetcher (golang.org fixture)");
        Arc::new(MockFetcher::golang_fixture())
    } else {
        Arc::new(HtmlFetcher::new(USER_AGENT)?)
    };

    let registry = Arc::new(Registry::new(fetcher));
    let service = CrawlService::new(registry);

    let addr: SocketAddr = format!("127.0.0.1:{}", config.port).parse()?;
    let mut server = Server::builder();

    if config.tls {
        let cert_path = config
            .tls_cert_file
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("--tls requires --tls-cert-file"))?;
        let key_path = config
            .tls_key_file
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("--tls requires --tls-key-file"))?;
        let cert = std::fs::read(cert_path)?;
        let key = std::fs::read(key_path)?;
        let identity = Identity::from_pem(cert, key);
        server = server.tls_config(ServerTlsConfig::new().identity(identity))?;
    }

    tracing::info!(%addr, tls = config.tls, "crawlctl-server listening");

    server
        .add_service(CrawlServer::new(service))
        .serve(addr)
        .await?;

    Ok(())
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
