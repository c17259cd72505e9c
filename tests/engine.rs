//! Engine-level integration tests against `MockFetcher`, covering
//! traversal, cycle suppression, offsite filtering, pause/resume/stop,
//! and restart — exercised directly on the engine, below the registry's
//! lifecycle wrapping.

use std::sync::Arc;
use std::time::Duration;

use crawlctl::engine::Engine;
use crawlctl::fetcher::MockFetcher;

async fn wait_for_done(engine: &Engine) {
    for _ in 0..500 {
        if engine.is_done() || engine.has_failed() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("crawl never reached done/failed");
}

#[tokio::test]
async fn known_seed_reaches_done_and_renders_known_children() {
    let fetcher = Arc::new(MockFetcher::golang_fixture());
    let engine = Engine::new("http://golang.org/", fetcher);

    engine.start();
    wait_for_done(&engine).await;

    assert!(engine.is_done());
    assert!(!engine.has_failed());

    let rendered = engine.format();
    assert!(rendered.starts_with("http://golang.org/\n"));
    assert!(rendered.contains("http://golang.org/cmd/"));
    assert!(rendered.contains("http://golang.org/pkg/"));
}

#[tokio::test]
async fn unknown_seed_records_fetch_error_and_renders_single_line() {
    let fetcher = Arc::new(MockFetcher::golang_fixture());
    let engine = Engine::new("http://example.com", fetcher);

    engine.start();
    wait_for_done(&engine).await;

    assert!(engine.is_done());
    assert_eq!(engine.format(), "http://example.com/\n");
}

#[tokio::test]
async fn invalid_seed_fails_immediately_without_spawning_work() {
    let fetcher = Arc::new(MockFetcher::golang_fixture());
    let engine = Engine::new("not a url", fetcher);

    engine.start();

    assert!(engine.is_done());
    assert!(engine.has_failed());
    assert_eq!(engine.format(), "");
}

#[tokio::test]
async fn pause_then_resume_still_reaches_done() {
    let fetcher = Arc::new(MockFetcher::golang_fixture());
    let engine = Engine::new("http://golang.org/", fetcher);

    engine.start();
    engine.pause();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!engine.is_done());

    engine.resume();
    wait_for_done(&engine).await;
    assert!(engine.is_done());
}

#[tokio::test]
async fn stop_prevents_further_progress() {
    let fetcher = Arc::new(MockFetcher::golang_fixture());
    let engine = Engine::new("http://golang.org/", fetcher);

    engine.start();
    engine.stop();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!engine.is_done());
}

#[tokio::test]
async fn restart_resets_visited_and_tree() {
    let fetcher = Arc::new(MockFetcher::golang_fixture());
    let engine = Engine::new("http://golang.org/", fetcher);

    engine.start();
    wait_for_done(&engine).await;
    let first_render = engine.format();

    engine.start();
    wait_for_done(&engine).await;
    let second_render = engine.format();

    assert_eq!(first_render, second_render);
}

#[tokio::test]
async fn offsite_links_are_not_recorded_in_the_tree() {
    let fetcher = Arc::new(
        MockFetcher::new().with_page(
            "http://golang.org/",
            "home",
            &["http://other.example/elsewhere"],
        ),
    );
    let engine = Engine::new("http://golang.org/", fetcher);

    engine.start();
    wait_for_done(&engine).await;

    let rendered = engine.format();
    assert_eq!(rendered, "http://golang.org/\n");
    assert!(!rendered.contains("other.example"));
}
