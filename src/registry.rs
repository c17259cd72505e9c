//! Crawl Registry / Lifecycle Manager: maps seed URL to engine handle and
//! lifecycle state, serializes every transition under one mutex, and
//! translates external commands into engine calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::engine::Engine;
use crate::fetcher::Fetcher;

/// The registry's stored lifecycle state. `Unknown` is never stored — it
/// is synthesized only when reporting on a URL absent from the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Stopped,
    Running,
    Done,
    Unknown,
    Failed,
}

impl CrawlState {
    pub fn label(self) -> &'static str {
        match self {
            CrawlState::Stopped => "stopped",
            CrawlState::Running => "running",
            CrawlState::Done => "done",
            CrawlState::Unknown => "unknown",
            CrawlState::Failed => "failed",
        }
    }
}

struct Entry {
    state: CrawlState,
    engine: Engine,
}

/// The process-wide manager. One mutex covers the map and every engine
/// lifecycle transition; the engine's own finer-grained locks (tree,
/// visited, control signal) are acquired only beneath this one, never the
/// other way around.
pub struct Registry {
    fetcher: Arc<dyn Fetcher>,
    entries: Mutex<HashMap<String, Entry>>,
}

impl Registry {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Registry {
            fetcher,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Runs the reconciliation step for `entry`: observes the engine's
    /// sticky `done`/`failed` flags and updates the stored state before
    /// any command acts on it. This is how background completion is
    /// observed without a callback path from engine into registry, which
    /// would invert the lock ordering.
    fn reconcile(entry: &mut Entry) {
        if entry.engine.has_failed() {
            entry.state = CrawlState::Failed;
        } else if entry.engine.is_done() {
            entry.state = CrawlState::Done;
        }
    }

    /// START: absent -> create+start; STOPPED -> resume; RUNNING -> no-op;
    /// DONE/FAILED -> discard old engine, create a fresh one, and start it.
    pub fn start(&self, url: &str) -> (CrawlState, String) {
        let mut entries = self.entries.lock().expect("registry mutex poisoned");

        let (new_state, message, engine_action);
        if let Some(entry) = entries.get_mut(url) {
            Self::reconcile(entry);
            match entry.state {
                CrawlState::Running => {
                    message = change_state(url, entry.state.label(), "running", "no action");
                    new_state = CrawlState::Running;
                    engine_action = EngineAction::None;
                }
                CrawlState::Done => {
                    message = change_state(url, "done", "running", "last crawl discarded, restarting crawl");
                    new_state = CrawlState::Running;
                    engine_action = EngineAction::Replace;
                }
                CrawlState::Stopped => {
                    message = change_state(url, "stopped", "running", "resuming crawl");
                    new_state = CrawlState::Running;
                    engine_action = EngineAction::Resume;
                }
                CrawlState::Failed => {
                    message = change_state(url, "failed", "running", "retrying crawl");
                    new_state = CrawlState::Running;
                    engine_action = EngineAction::Replace;
                }
                CrawlState::Unknown => {
                    unreachable!("registry never stores CrawlState::Unknown");
                }
            }
        } else {
            message = change_state(url, "unknown", "running", "starting crawl");
            new_state = CrawlState::Running;
            engine_action = EngineAction::Replace;
        }

        match engine_action {
            EngineAction::None => {}
            EngineAction::Resume => {
                if let Some(entry) = entries.get(url) {
                    entry.engine.resume();
                }
            }
            EngineAction::Replace => {
                let engine = Engine::new(url, self.fetcher.clone());
                engine.start();
                entries.insert(
                    url.to_string(),
                    Entry {
                        state: new_state,
                        engine,
                    },
                );
            }
        }

        if let EngineAction::Resume | EngineAction::None = engine_action {
            if let Some(entry) = entries.get_mut(url) {
                entry.state = new_state;
            }
        }

        tracing::info!("{message}");
        (new_state, message)
    }

    /// STOP (a.k.a. "pause" at the engine layer): RUNNING -> engine.pause()
    /// -> STOPPED; everything else (absent, STOPPED, DONE, FAILED) is a
    /// no-op.
    pub fn stop(&self, url: &str) -> (CrawlState, String) {
        let mut entries = self.entries.lock().expect("registry mutex poisoned");

        if let Some(entry) = entries.get_mut(url) {
            Self::reconcile(entry);
            let message = match entry.state {
                CrawlState::Running => {
                    entry.engine.pause();
                    entry.state = CrawlState::Stopped;
                    change_state(url, "running", "stopped", "crawl paused")
                }
                CrawlState::Done | CrawlState::Stopped | CrawlState::Failed => {
                    change_state(url, entry.state.label(), entry.state.label(), "no action")
                }
                CrawlState::Unknown => unreachable!("registry never stores CrawlState::Unknown"),
            };
            let state = entry.state;
            tracing::info!("{message}");
            (state, message)
        } else {
            let message = change_state(url, "unknown", "stopped", "no action");
            tracing::info!("{message}");
            (CrawlState::Unknown, message)
        }
    }

    /// CHECK: reports the current state without changing anything.
    pub fn check(&self, url: &str) -> CrawlState {
        let mut entries = self.entries.lock().expect("registry mutex poisoned");
        if let Some(entry) = entries.get_mut(url) {
            Self::reconcile(entry);
            entry.state
        } else {
            CrawlState::Unknown
        }
    }

    /// SHOW: renders the discovery tree by calling through to
    /// `Engine::format`, which itself takes the tree's lock for the
    /// duration of the render rather than pausing/resuming expansion
    /// around it.
    pub fn show(&self, url: &str) -> String {
        let mut entries = self.entries.lock().expect("registry mutex poisoned");
        if let Some(entry) = entries.get_mut(url) {
            Self::reconcile(entry);
            match entry.state {
                CrawlState::Failed => "Crawl failed; no valid results to show".to_string(),
                CrawlState::Running | CrawlState::Stopped | CrawlState::Done => entry.engine.format(),
                CrawlState::Unknown => unreachable!("registry never stores CrawlState::Unknown"),
            }
        } else {
            format!("{url} has not been crawled")
        }
    }
}

enum EngineAction {
    None,
    Resume,
    Replace,
}

fn change_state(url: &str, old: &str, new: &str, result: &str) -> String {
    format!("Change {url} in state {old} to {new}: {result}")
}
