use httpmock::prelude::*;
use serde_json::json;

use opsdeck::client::{Backend, BackendConfig};
use opsdeck::dispatch::{self, DispatchOutcome};
use opsdeck::markdown::MarkdownRenderer;
use opsdeck::registry::Registry;

fn backend_for(server: &MockServer) -> Backend {
    Backend::new(BackendConfig {
        base_url: server.base_url(),
        timeout_ms: 5_000,
    })
    .expect("backend config is valid")
}

fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

async fn run(server: &MockServer, id: &str, pairs: &[(&str, &str)]) -> DispatchOutcome {
    let registry = Registry::new().expect("catalog validates");
    let op = registry.get(id).expect("known operation");
    let backend = backend_for(server);
    let markdown = MarkdownRenderer::new();
    dispatch::execute(&backend, op, &fields(pairs), &markdown).await
}

#[tokio::test]
async fn get_dispatch_sends_query_params_and_toasts() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/postgre-ttrss/search-and-insert-rss")
                .query_param("link", "https://example.org/feed");
            then.status(200).json_body(json!({"status": "queued"}));
        })
        .await;

    let outcome = run(
        &server,
        "search-and-insert-rss",
        &[("link", "https://example.org/feed")],
    )
    .await;

    mock.assert_async().await;
    assert!(outcome.ok);
    assert_eq!(
        outcome.toast.as_deref(),
        Some("Search and Insert RSS started")
    );
    assert!(outcome.html.contains("queued"));
}

#[tokio::test]
async fn get_dispatch_keeps_whitespace_only_values() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/postgre-ttrss/search-and-insert-rss")
                .query_param("link", "  ");
            then.status(200).json_body(json!({"status": "queued"}));
        })
        .await;

    run(&server, "search-and-insert-rss", &[("link", "  ")]).await;

    mock.assert_async().await;
}

#[tokio::test]
async fn post_scan_sends_coerced_body_and_sorts_reply() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/network/scan").json_body(json!({
                "host": "192.168.1.10",
                "ports": [22, 80],
                "use_nmap": true,
            }));
            then.status(200).json_body(json!({
                "host": "192.168.1.10",
                "duration_seconds": 1.25,
                "results": [
                    {"port": 80, "open": false, "service": "http"},
                    {"port": 22, "open": true, "service": "ssh"},
                ],
            }));
        })
        .await;

    let outcome = run(
        &server,
        "network-scan",
        &[
            ("host", "192.168.1.10"),
            ("ports", "22, x, 80"),
            ("use_nmap", "on"),
            ("note", "   "),
        ],
    )
    .await;

    mock.assert_async().await;
    assert!(outcome.ok);
    // Sorted rendering puts the open port first even though the reply lists it last.
    let ssh = outcome.html.find("ssh").expect("open port rendered");
    let http = outcome.html.find("http").expect("closed port rendered");
    assert!(ssh < http);
}

#[tokio::test]
async fn failed_worker_start_does_not_toast() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/newsSpider/scrape-news");
            then.status(500).json_body(json!({"detail": "spider crashed"}));
        })
        .await;

    let outcome = run(&server, "scrape-news", &[]).await;

    assert!(!outcome.ok);
    assert!(outcome.toast.is_none());
    assert!(outcome.html.contains("Status: 500"));
    assert!(outcome.html.contains("spider crashed"));
}

#[tokio::test]
async fn markdown_reply_renders_as_html() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/llm/updater");
            then.status(200)
                .header("content-type", "text/plain")
                .body("# Updater\n\nAll models refreshed.");
        })
        .await;

    let outcome = run(&server, "llm-updater", &[]).await;

    assert!(outcome.ok);
    assert!(outcome.html.contains("<h1>Updater</h1>"));
    assert_eq!(outcome.toast.as_deref(), Some("LLM Updater started"));
}

#[tokio::test]
async fn plain_text_reply_is_escaped() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/postgre-ttrss/feeds");
            then.status(200)
                .header("content-type", "text/plain")
                .body("ok <script>alert(1)</script>");
        })
        .await;

    let outcome = run(&server, "feeds", &[]).await;

    assert!(outcome.html.contains("<pre"));
    assert!(outcome.html.contains("&lt;script&gt;"));
    assert!(!outcome.html.contains("<script>alert"));
}

#[tokio::test]
async fn unreachable_backend_renders_error_panel() {
    let backend = Backend::new(BackendConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_ms: 500,
    })
    .expect("backend config is valid");
    let registry = Registry::new().expect("catalog validates");
    let op = registry.get("feeds").expect("known operation");
    let markdown = MarkdownRenderer::new();

    let outcome = dispatch::execute(&backend, op, &[], &markdown).await;

    assert!(!outcome.ok);
    assert!(outcome.html.contains("Error:"));
}
