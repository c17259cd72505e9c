//! Lifecycle/transition-table tests against `Registry`, asserting the
//! exact transition-log phrasing ("Change <url> in state <old> to
//! <new>: <result>") for every START/STOP/CHECK/SHOW transition.

use std::sync::Arc;
use std::time::Duration;

use crawlctl::fetcher::MockFetcher;
use crawlctl::registry::{CrawlState, Registry};

fn registry() -> Registry {
    Registry::new(Arc::new(MockFetcher::golang_fixture()))
}

async fn wait_for_done(reg: &Registry, url: &str) {
    for _ in 0..200 {
        if reg.check(url) == CrawlState::Done {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("crawl never reached done");
}

#[tracing_test::traced_test]
#[tokio::test]
async fn start_logs_the_exact_transition_line() {
    let reg = registry();
    reg.start("http://golang.org/");
    assert!(logs_contain(
        "Change http://golang.org/ in state unknown to running: starting crawl"
    ));
}

#[tokio::test]
async fn start_on_absent_begins_running() {
    let reg = registry();
    let (state, message) = reg.start("http://golang.org/");
    assert_eq!(state, CrawlState::Running);
    assert_eq!(
        message,
        "Change http://golang.org/ in state unknown to running: starting crawl"
    );
}

#[tokio::test]
async fn stop_on_unknown_is_a_no_op_with_exact_message() {
    let reg = registry();
    let (state, message) = reg.stop("http://never.crawled/");
    assert_eq!(state, CrawlState::Unknown);
    assert_eq!(
        message,
        "Change http://never.crawled/ in state unknown to stopped: no action"
    );
}

#[tokio::test]
async fn show_on_unknown_reports_not_crawled() {
    let reg = registry();
    assert_eq!(
        reg.show("http://never.crawled/"),
        "http://never.crawled/ has not been crawled"
    );
}

#[tokio::test]
async fn start_twice_on_running_is_a_no_op() {
    let reg = registry();
    reg.start("http://golang.org/");
    let (state, message) = reg.start("http://golang.org/");
    assert_eq!(state, CrawlState::Running);
    assert!(message.ends_with("no action"));
}

#[tokio::test]
async fn stop_then_check_reports_stopped() {
    let reg = registry();
    reg.start("http://golang.org/");
    reg.stop("http://golang.org/");
    assert_eq!(reg.check("http://golang.org/"), CrawlState::Stopped);
}

#[tokio::test]
async fn stop_on_stopped_is_idempotent() {
    let reg = registry();
    reg.start("http://golang.org/");
    reg.stop("http://golang.org/");
    let (state, message) = reg.stop("http://golang.org/");
    assert_eq!(state, CrawlState::Stopped);
    assert!(message.ends_with("no action"));
}

#[tokio::test]
async fn resuming_a_stopped_crawl_reports_resuming() {
    let reg = registry();
    reg.start("http://golang.org/");
    reg.stop("http://golang.org/");
    let (state, message) = reg.start("http://golang.org/");
    assert_eq!(state, CrawlState::Running);
    assert!(message.ends_with("resuming crawl"));
}

#[tokio::test]
async fn eventually_reaches_done_and_renders() {
    let reg = registry();
    reg.start("http://golang.org/");
    wait_for_done(&reg, "http://golang.org/").await;
    let rendered = reg.show("http://golang.org/");
    assert!(rendered.starts_with("http://golang.org/\n"));
    assert!(rendered.contains("http://golang.org/cmd/"));
    assert!(rendered.contains("http://golang.org/pkg/"));
}

#[tokio::test]
async fn unknown_seed_crawl_reports_single_leaf() {
    let reg = registry();
    reg.start("http://example.com/");
    wait_for_done(&reg, "http://example.com/").await;
    assert_eq!(reg.show("http://example.com/"), "http://example.com/\n");
}

#[tokio::test]
async fn restart_after_done_discards_prior_results() {
    let reg = registry();
    reg.start("http://golang.org/");
    wait_for_done(&reg, "http://golang.org/").await;
    let (_, message) = reg.start("http://golang.org/");
    assert!(message.ends_with("last crawl discarded, restarting crawl"));
    wait_for_done(&reg, "http://golang.org/").await;
    let rendered = reg.show("http://golang.org/");
    assert!(rendered.starts_with("http://golang.org/\n"));
}
