//! Server and client configuration: command-line flags parsed with
//! `clap`'s derive API.

use clap::Parser;

/// Flags recognized by the `crawlctl-server` binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "crawlctl-server", about = "Domain-bounded crawl control server")]
pub struct ServerConfig {
    /// Enable TLS on the listening socket.
    #[arg(long)]
    pub tls: bool,

    /// Path to the TLS certificate (PEM), required when --tls is set.
    #[arg(long, value_name = "FILE")]
    pub tls_cert_file: Option<String>,

    /// Path to the TLS private key (PEM), required when --tls is set.
    #[arg(long, value_name = "FILE")]
    pub tls_key_file: Option<String>,

    /// Port to listen on.
    #[arg(long, default_value_t = 10000)]
    pub port: u16,

    /// Enable debug-level logging regardless of the TESTING environment
    /// variable.
    #[arg(long)]
    pub debug: bool,

    /// Use the in-memory MockFetcher instead of HtmlFetcher. Intended for
    /// local tests and demos where reaching the network is undesirable.
    #[arg(long)]
    pub mock: bool,
}

impl ServerConfig {
    /// True when debug logging should be on: either `--debug` was passed,
    /// or the `TESTING` environment variable is set and non-empty.
    pub fn debug_logging(&self) -> bool {
        self.debug || std::env::var("TESTING").map(|v| !v.is_empty()).unwrap_or(false)
    }
}

/// Flags recognized by the `crawlctl` CLI binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "crawlctl", about = "Control a crawlctl-server crawl")]
pub struct ClientConfig {
    /// Server address to dial.
    #[arg(long, default_value = "http://127.0.0.1:10000")]
    pub addr: String,

    /// CA bundle to trust when dialing over TLS.
    #[arg(long, value_name = "FILE")]
    pub tls_ca: Option<String>,

    /// Server name override for TLS certificate verification.
    #[arg(long, value_name = "NAME")]
    pub tls_domain: Option<String>,

    #[command(subcommand)]
    pub command: ClientCommand,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum ClientCommand {
    /// Start crawling a URL.
    Start { url: String },
    /// Pause a crawl for a URL.
    Stop { url: String },
    /// Check the state of a crawl for a URL.
    Check { url: String },
    /// Show the discovery tree for a URL.
    Show { url: String },
}
