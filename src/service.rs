//! RPC Surface: `CrawlSite` (unary START/STOP/CHECK) and `CrawlResult`
//! (server-streaming SHOW), implemented against the generated `Crawl`
//! service trait. A thin struct wrapping the `Registry` that actually
//! holds state, translating RPC requests into calls on it.

use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;
use tonic::{Request, Response, Status};

use crate::crawl::crawl_server::Crawl;
use crate::crawl::{SiteNode, UrlRequestCommand, UrlState, UrlStateStatus, UrlRequest};
use crate::registry::{CrawlState, Registry};

pub struct CrawlService {
    registry: Arc<Registry>,
}

impl CrawlService {
    pub fn new(registry: Arc<Registry>) -> Self {
        CrawlService { registry }
    }
}

/// The wire enum exposes only STOPPED/RUNNING/UNKNOWN. DONE maps to
/// STOPPED and FAILED maps to UNKNOWN; the truthful state lives in the
/// `message` string instead.
fn to_wire(state: CrawlState) -> UrlStateStatus {
    match state {
        CrawlState::Running => UrlStateStatus::Running,
        CrawlState::Stopped | CrawlState::Done => UrlStateStatus::Stopped,
        CrawlState::Unknown | CrawlState::Failed => UrlStateStatus::Unknown,
    }
}

type ResultStream = Pin<Box<dyn Stream<Item = Result<SiteNode, Status>> + Send + 'static>>;

#[tonic::async_trait]
impl Crawl for CrawlService {
    async fn crawl_site(&self, request: Request<UrlRequest>) -> Result<Response<UrlState>, Status> {
        let req = request.into_inner();

        let (state, message) = match req.state() {
            UrlRequestCommand::Start => self.registry.start(&req.url),
            UrlRequestCommand::Stop => self.registry.stop(&req.url),
            UrlRequestCommand::Check => {
                let state = self.registry.check(&req.url);
                (state, state.label().to_string())
            }
            UrlRequestCommand::Show => {
                return Err(Status::invalid_argument(
                    "SHOW is served by CrawlResult, not CrawlSite",
                ))
            }
        };

        Ok(Response::new(UrlState {
            status: to_wire(state).into(),
            message,
        }))
    }

    type CrawlResultStream = ResultStream;

    async fn crawl_result(&self, request: Request<UrlRequest>) -> Result<Response<Self::CrawlResultStream>, Status> {
        let req = request.into_inner();

        let status = self.registry.check(&req.url).label().to_string();
        let rendered = self.registry.show(&req.url);
        let site_url = req.url;

        let lines: Vec<String> = if rendered.is_empty() {
            Vec::new()
        } else {
            rendered.lines().map(str::to_string).collect()
        };

        let stream = futures::stream::iter(lines.into_iter().map(move |line| {
            Ok(SiteNode {
                site_url: site_url.clone(),
                tree_string: line,
                status: status.clone(),
            })
        }));

        Ok(Response::new(Box::pin(stream)))
    }
}
