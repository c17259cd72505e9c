//! `crawlctl` CLI: thin front-end mapping subcommands 1:1 onto `CrawlSite`
//! (`start`/`stop`/`check`) and `CrawlResult` (`show`). Dials the server,
//! sends one request, prints the result, and exits nonzero on failure.

use clap::Parser;
use tonic::transport::{Certificate, Channel, ClientTlsConfig};
use tonic::Request;

use crawlctl::config::{ClientCommand, ClientConfig};
use crawlctl::crawl::crawl_client::CrawlClient;
use crawlctl::crawl::{UrlRequest, UrlRequestCommand};

#[tokio::main]
async fn main() {
    let config = ClientConfig::parse();
    if let Err(err) = run(config).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run(config: ClientConfig) -> anyhow::Result<()> {
    let channel = connect(&config).await?;
    let mut client = CrawlClient::new(channel);

    match config.command {
        ClientCommand::Start { url } => control(&mut client, url, UrlRequestCommand::Start).await,
        ClientCommand::Stop { url } => control(&mut client, url, UrlRequestCommand::Stop).await,
        ClientCommand::Check { url } => control(&mut client, url, UrlRequestCommand::Check).await,
        ClientCommand::Show { url } => show(&mut client, url).await,
    }
}

async fn connect(config: &ClientConfig) -> anyhow::Result<Channel> {
    let endpoint = Channel::from_shared(config.addr.clone())?;
    let endpoint = if let Some(ca_path) = &config.tls_ca {
        let ca = std::fs::read(ca_path)?;
        let mut tls = ClientTlsConfig::new().ca_certificate(Certificate::from_pem(ca));
        if let Some(domain) = &config.tls_domain {
            tls = tls.domain_name(domain.clone());
        }
        endpoint.tls_config(tls)?
    } else {
        endpoint
    };
    Ok(endpoint.connect().await?)
}

async fn control(
    client: &mut CrawlClient<Channel>,
    url: String,
    command: UrlRequestCommand,
) -> anyhow::Result<()> {
    let request = Request::new(UrlRequest {
        url,
        state: command.into(),
    });
    let response = client.crawl_site(request).await?;
    let state = response.into_inner();
    println!("{:?} {}", state.status(), state.message);
    Ok(())
}

async fn show(client: &mut CrawlClient<Channel>, url: String) -> anyhow::Result<()> {
    let request = Request::new(UrlRequest {
        url,
        state: UrlRequestCommand::Show.into(),
    });
    let mut stream = client.crawl_result(request).await?.into_inner();
    while let Some(node) = stream.message().await? {
        println!("{}", node.tree_string);
    }
    Ok(())
}
