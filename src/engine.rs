//! Crawl Engine: per-seed state bundling the base URL, registered host,
//! visited set, discovery tree, fetcher reference, and run/pause/stop
//! control. Runs the recursive expansion algorithm and implements
//! cooperative pause.
//!
//! One supervising task per crawl fans a `tokio::spawn` out per outbound
//! link and joins on all of them before returning, rather than serializing
//! work through a single queue.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::fetcher::Fetcher;
use crate::tree::{DiscoveryTree, NodeId};
use crate::url_norm;
use crate::visited::{Outcome, VisitedSet};

const RUN: u8 = 0;
const PAUSE: u8 = 1;
const STOP: u8 = 2;

struct EngineShared {
    base_url: String,
    scheme: String,
    host: String,
    visited: VisitedSet,
    tree: DiscoveryTree,
    fetcher: Arc<dyn Fetcher>,
    run_state: AtomicU8,
    notify: Notify,
    done: AtomicBool,
    failed: AtomicBool,
}

/// The per-crawl engine. Cloning an `Engine` shares the same underlying
/// state (it is a thin handle around an `Arc`), matching how the registry
/// hands engine references to the RPC layer while retaining exclusive
/// ownership of the map entry itself.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<EngineShared>,
}

impl Engine {
    /// Creates a new engine for `seed_url`. If the seed itself fails to
    /// parse, the engine is born already `done` and `failed`, and
    /// `start()` becomes a permanent no-op instead of panicking.
    pub fn new(seed_url: &str, fetcher: Arc<dyn Fetcher>) -> Self {
        let normalized = url_norm::normalize(seed_url);
        let (base_url, scheme, host, seed_failed) = match normalized {
            Ok(n) => {
                let scheme = n.split(':').next().unwrap_or_default().to_string();
                let host = url_norm::host_of(&n).unwrap_or_default();
                (n, scheme, host, false)
            }
            Err(_) => (seed_url.to_string(), String::new(), String::new(), true),
        };

        let shared = EngineShared {
            base_url,
            scheme,
            host,
            visited: VisitedSet::new(),
            tree: DiscoveryTree::new(),
            fetcher,
            run_state: AtomicU8::new(STOP),
            notify: Notify::new(),
            done: AtomicBool::new(seed_failed),
            failed: AtomicBool::new(seed_failed),
        };

        Engine {
            shared: Arc::new(shared),
        }
    }

    /// Begins background expansion from the base URL. Non-blocking.
    pub fn start(&self) {
        if self.shared.base_url_is_seed_invalid() {
            // A permanently-invalid seed never becomes crawlable.
            self.shared.done.store(true, Ordering::SeqCst);
            self.shared.failed.store(true, Ordering::SeqCst);
            return;
        }

        self.shared.visited.clear();
        self.shared.tree.reset();
        self.shared.done.store(false, Ordering::SeqCst);
        self.shared.failed.store(false, Ordering::SeqCst);
        self.shared.run_state.store(RUN, Ordering::SeqCst);
        self.shared.notify.notify_waiters();

        let shared = self.shared.clone();
        let seed = shared.base_url.clone();
        tokio::spawn(async move {
            let done_flag = shared.clone();
            let handle = tokio::spawn(expand(shared, seed, None));
            match handle.await {
                Ok(()) => done_flag.done.store(true, Ordering::SeqCst),
                Err(join_error) => {
                    tracing::error!(error = %join_error, "crawl background task panicked");
                    done_flag.failed.store(true, Ordering::SeqCst);
                }
            }
        });
    }

    /// Requests cooperative suspension. The task finishes its current
    /// page then blocks at its next suspension point until `resume()` or
    /// `stop()`.
    pub fn pause(&self) {
        self.shared.run_state.store(PAUSE, Ordering::SeqCst);
    }

    /// Leaves pause. No-op if already running.
    pub fn resume(&self) {
        self.shared.run_state.store(RUN, Ordering::SeqCst);
        self.shared.notify.notify_waiters();
    }

    /// Requests permanent cessation. The background task exits at its
    /// next suspension point.
    pub fn stop(&self) {
        self.shared.run_state.store(STOP, Ordering::SeqCst);
        self.shared.notify.notify_waiters();
    }

    pub fn is_done(&self) -> bool {
        self.shared.done.load(Ordering::SeqCst)
    }

    pub fn has_failed(&self) -> bool {
        self.shared.failed.load(Ordering::SeqCst)
    }

    /// Renders the current tree. Takes the tree's own lock for the
    /// duration of the render rather than pausing and resuming expansion
    /// around it.
    pub fn format(&self) -> String {
        self.shared.tree.render()
    }
}

impl EngineShared {
    fn base_url_is_seed_invalid(&self) -> bool {
        self.host.is_empty() && self.scheme.is_empty()
    }
}

async fn wait_if_needed(shared: &EngineShared) -> bool {
    loop {
        match shared.run_state.load(Ordering::SeqCst) {
            STOP => return true,
            RUN => return false,
            PAUSE => {
                let notified = shared.notify.notified();
                if shared.run_state.load(Ordering::SeqCst) != PAUSE {
                    continue;
                }
                notified.await;
            }
            _ => unreachable!("run_state only ever holds RUN, PAUSE, or STOP"),
        }
    }
}

fn rewrite_relative(scheme: &str, host: &str, url: &str) -> String {
    if url.starts_with('/') {
        format!("{scheme}://{host}{url}")
    } else {
        url.to_string()
    }
}

/// One step of the recursive expansion algorithm. Spawned as its own task
/// for every outbound link so siblings fan out concurrently; the spawning
/// caller joins on every child handle before returning.
async fn expand(shared: Arc<EngineShared>, url: String, parent: Option<NodeId>) {
    if url.is_empty() {
        return;
    }

    if wait_if_needed(&shared).await {
        return;
    }

    let candidate = rewrite_relative(&shared.scheme, &shared.host, &url);

    let normalized = match url_norm::normalize(&candidate) {
        Ok(n) => n,
        Err(e) => {
            tracing::debug!(url = %candidate, error = %e, "invalid URL");
            shared.visited.mark(&candidate, Outcome::Error(e.to_string()));
            shared.tree.add_at(parent, candidate);
            return;
        }
    };

    let link_host = url_norm::host_of(&normalized).unwrap_or_default();
    if link_host != shared.host {
        tracing::debug!(url = %normalized, "offsite, skipping");
        shared.visited.mark(&normalized, Outcome::Offsite);
        return;
    }

    let node = shared.tree.add_at(parent, normalized.clone());

    if !shared.visited.claim(&normalized) {
        tracing::debug!(url = %normalized, "already visited, skipping fetch");
        return;
    }

    tracing::debug!(url = %normalized, "fetching");
    let page = match shared.fetcher.fetch(&normalized).await {
        Ok(page) => {
            shared.visited.mark(&normalized, Outcome::Ok);
            page
        }
        Err(e) => {
            tracing::debug!(url = %normalized, error = %e, "fetch failed");
            shared.visited.mark(&normalized, Outcome::Error(e.to_string()));
            return;
        }
    };

    let handles: Vec<_> = page
        .links
        .into_iter()
        .map(|link| tokio::spawn(expand(shared.clone(), link, Some(node))))
        .collect();
    for result in futures::future::join_all(handles).await {
        if let Err(e) = result {
            tracing::warn!(error = %e, "child crawl task panicked");
        }
    }
    tracing::debug!(url = %normalized, "finished");
}
