//! The Fetcher plug-in contract: given a URL, return the page body and the
//! list of outbound link URLs it contains, or an error. The engine
//! tolerates links that are relative, absolute, off-host, or syntactically
//! invalid — normalization and host filtering are the engine's job, not
//! the fetcher's.

use std::collections::HashMap;

use async_trait::async_trait;
use scraper::{Html, Selector};

/// A fetched page: its body text and the raw `href` values found on it.
pub struct FetchedPage {
    pub body: String,
    pub links: Vec<String>,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> anyhow::Result<FetchedPage>;
}

/// Reference fetcher: an HTML parser backed by `reqwest` + `scraper`,
/// fetching and extracting `a[href]` links from a single page. The engine
/// owns traversal, depth, and bounds, not the fetcher.
pub struct HtmlFetcher {
    client: reqwest::Client,
}

impl HtmlFetcher {
    pub fn new(user_agent: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    fn extract_links(body: &str) -> anyhow::Result<Vec<String>> {
        let document = Html::parse_document(body);
        let selector = Selector::parse("a[href]").map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(document
            .select(&selector)
            .filter_map(|el| el.value().attr("href").map(str::to_string))
            .collect())
    }
}

#[async_trait]
impl Fetcher for HtmlFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<FetchedPage> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        let links = Self::extract_links(&body)?;
        Ok(FetchedPage { body, links })
    }
}

/// Canned-page fetcher for tests: a fixed map from URL to (body, links),
/// erroring for anything absent.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, FetchedPage>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchedPage {
                body: body.to_string(),
                links: links.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    /// A small fixture: `golang.org` and its `pkg`/`cmd`/`pkg/fmt`/`pkg/os`
    /// subtree, each linking back toward the root so the engine's cycle
    /// suppression is exercised.
    pub fn golang_fixture() -> Self {
        Self::new()
            .with_page(
                "http://golang.org/",
                "The Go Programming Language",
                &["http://golang.org/pkg/", "http://golang.org/cmd/"],
            )
            .with_page(
                "http://golang.org/pkg/",
                "Packages",
                &[
                    "http://golang.org/",
                    "http://golang.org/cmd/",
                    "http://golang.org/pkg/fmt/",
                    "http://golang.org/pkg/os/",
                ],
            )
            .with_page(
                "http://golang.org/cmd/",
                "Commands",
                &["http://golang.org/", "http://golang.org/pkg/"],
            )
            .with_page(
                "http://golang.org/pkg/fmt/",
                "Package fmt",
                &["http://golang.org/", "http://golang.org/pkg/"],
            )
            .with_page(
                "http://golang.org/pkg/os/",
                "Package os",
                &["http://golang.org/", "http://golang.org/pkg/"],
            )
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<FetchedPage> {
        match self.pages.get(url) {
            Some(page) => Ok(FetchedPage {
                body: page.body.clone(),
                links: page.links.clone(),
            }),
            None => Err(anyhow::anyhow!("not found: {url}")),
        }
    }
}
