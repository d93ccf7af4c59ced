//! Integration tests for the HTTP server.
//!
//! Each test binds the server on an ephemeral port with offline
//! backends (hash embeddings, in-memory index) and drives it over
//! real HTTP, so routing, request validation, the error contract, and
//! the full ingest/search/delete flow are all exercised end to end.

use ragline::config::Config;
use ragline::server::run_server;
use serde_json::{json, Value};

// ─── Helpers ────────────────────────────────────────────────────────

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn offline_config(port: u16) -> Config {
    let config_content = format!(
        r#"
[server]
bind = "127.0.0.1:{}"

[embedding]
provider = "hash"

[index]
provider = "memory"

[generation]
provider = "disabled"

[retrieval]
default_top_k = 5
"#,
        port
    );
    toml::from_str(&config_content).unwrap()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

/// Spawn the server on a free port and wait until it answers.
async fn start_server() -> (u16, tokio::task::JoinHandle<()>) {
    let port = find_free_port();
    let cfg = offline_config(port);
    let handle = tokio::spawn(async move {
        run_server(&cfg).await.ok();
    });
    wait_for_server(port).await;
    (port, handle)
}

fn url(port: u16, path: &str) -> String {
    format!("http://127.0.0.1:{}{}", port, path)
}

async fn ingest_document(
    client: &reqwest::Client,
    port: u16,
    document_id: &str,
    title: &str,
    content: &str,
) -> Value {
    let resp = client
        .post(url(port, "/api/chunk"))
        .json(&json!({
            "document_id": document_id,
            "title": title,
            "content": content,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200, "ingest of {} failed", document_id);
    resp.json().await.unwrap()
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_reports_version() {
    let (port, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client.get(url(port, "/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(!body["version"].as_str().unwrap().is_empty());

    handle.abort();
}

#[tokio::test]
async fn test_ingest_search_delete_flow() {
    let (port, handle) = start_server().await;
    let client = reqwest::Client::new();

    let report = ingest_document(
        &client,
        port,
        "rust-doc",
        "Rust Guide",
        "# Rust Guide\n\nOwnership and borrowing are the core concepts of Rust memory safety.\n\n## Cargo\n\nCargo builds crates and manages dependencies.",
    )
    .await;
    assert_eq!(report["document_id"], "rust-doc");
    assert_eq!(report["strategy"], "markdown");
    assert!(report["chunks_created"].as_u64().unwrap() >= 1);
    assert_eq!(report["message"], "Document chunked and embedded successfully");

    ingest_document(
        &client,
        port,
        "deploy-doc",
        "Deploy Guide",
        "Deploy the application with containers.\n\nKubernetes schedules workloads across the cluster.",
    )
    .await;

    // Search should rank the Rust document first for Rust vocabulary
    let resp = client
        .post(url(port, "/api/search"))
        .json(&json!({"query": "rust ownership borrowing"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let results = body["results"].as_array().unwrap();
    assert!(!results.is_empty(), "search returned no results");
    assert_eq!(results[0]["document_id"], "rust-doc");
    assert!(results[0]["score"].as_f64().unwrap() > 0.0);
    assert!(results[0]["chunk_text"].as_str().unwrap().len() > 0);

    // Delete the Rust document, then verify it no longer matches
    let resp = client
        .delete(url(port, "/api/chunk/rust-doc"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Document chunks deleted successfully");

    let resp = client
        .post(url(port, "/api/search"))
        .json(&json!({"query": "rust ownership borrowing"}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let results = body["results"].as_array().unwrap();
    assert!(
        results.iter().all(|r| r["document_id"] != "rust-doc"),
        "deleted document still matched: {:?}",
        results
    );

    handle.abort();
}

#[tokio::test]
async fn test_search_respects_top_k() {
    let (port, handle) = start_server().await;
    let client = reqwest::Client::new();

    for i in 0..4 {
        ingest_document(
            &client,
            port,
            &format!("doc-{}", i),
            "Doc",
            &format!("Paragraph about topic number {}.", i),
        )
        .await;
    }

    let resp = client
        .post(url(port, "/api/search"))
        .json(&json!({"query": "topic", "top_k": 2}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    handle.abort();
}

#[tokio::test]
async fn test_reingest_overwrites_records() {
    let (port, handle) = start_server().await;
    let client = reqwest::Client::new();

    ingest_document(&client, port, "doc-a", "Doc A", "Original text about falcons.").await;
    ingest_document(&client, port, "doc-a", "Doc A", "Replacement text about herons.").await;

    let resp = client
        .post(url(port, "/api/search"))
        .json(&json!({"query": "herons"}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1, "overwrite should not duplicate records");
    assert!(results[0]["chunk_text"]
        .as_str()
        .unwrap()
        .contains("herons"));

    handle.abort();
}

#[tokio::test]
async fn test_chunk_rejects_unknown_strategy() {
    let (port, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(url(port, "/api/chunk"))
        .json(&json!({
            "document_id": "doc-1",
            "title": "Doc",
            "content": "Some content.",
            "strategy": "sentence",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "invalid_strategy");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("sentence"));

    handle.abort();
}

#[tokio::test]
async fn test_chunk_rejects_whitespace_only_content() {
    let (port, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(url(port, "/api/chunk"))
        .json(&json!({
            "document_id": "doc-1",
            "title": "Doc",
            "content": "   \n\n\t  ",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "empty_document");

    handle.abort();
}

#[tokio::test]
async fn test_chunk_rejects_blank_identifiers() {
    let (port, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(url(port, "/api/chunk"))
        .json(&json!({
            "document_id": "  ",
            "title": "Doc",
            "content": "Some content.",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("document_id must not be empty"));

    handle.abort();
}

#[tokio::test]
async fn test_search_rejects_empty_query() {
    let (port, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(url(port, "/api/search"))
        .json(&json!({"query": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("query must not be empty"));

    handle.abort();
}

#[tokio::test]
async fn test_ask_with_disabled_generation_is_bad_gateway() {
    let (port, handle) = start_server().await;
    let client = reqwest::Client::new();

    ingest_document(&client, port, "doc-1", "Doc", "Some indexed content.").await;

    let resp = client
        .post(url(port, "/api/ask"))
        .json(&json!({"question": "What is indexed?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "upstream_unavailable");
    assert!(body["error"]["message"].as_str().unwrap().contains("disabled"));

    handle.abort();
}

#[tokio::test]
async fn test_delete_unknown_document_still_reports_completion() {
    let (port, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .delete(url(port, "/api/chunk/never-ingested"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["document_id"], "never-ingested");
    assert_eq!(body["message"], "Document chunks deleted successfully");

    handle.abort();
}

#[tokio::test]
async fn test_compare_returns_per_strategy_map() {
    let (port, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(url(port, "/api/chunk/compare"))
        .json(&json!({
            "content": "# Title\n\nFirst paragraph of the document.\n\n## Section\n\nSecond paragraph with more words in it.",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    for strategy in ["fixed", "markdown", "semantic", "hybrid"] {
        let report = &body[strategy];
        assert!(
            report.is_object(),
            "missing report for strategy {}: {:?}",
            strategy,
            body
        );
        assert!(report["chunks_count"].as_u64().unwrap() >= 1);
        assert!(report["average_size"].as_f64().unwrap() > 0.0);
        assert!(report["sample_chunks"].as_array().unwrap().len() >= 1);
    }

    handle.abort();
}
