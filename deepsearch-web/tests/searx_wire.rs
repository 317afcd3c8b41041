use deepsearch_web::{DEFAULT_USER_AGENT, SearchProvider, SearxClient};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn hits(n: usize) -> serde_json::Value {
    let results: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "title": format!("Result {i}"),
                "content": format!("Content {i}"),
                "url": format!("https://example.com/{i}"),
                "engine": "duckduckgo",
                "score": 1.0 - i as f64 * 0.1,
            })
        })
        .collect();
    json!({ "query": "rust", "results": results })
}

#[tokio::test]
async fn search_sends_fixed_params_and_truncates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust async"))
        .and(query_param("format", "json"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(10)))
        .expect(1)
        .mount(&server)
        .await;

    let client = SearxClient::new(&server.uri()).unwrap();
    let results = client.search("rust async", 8).await;

    assert_eq!(results.len(), 8);
    assert_eq!(results[0].title, "Result 0");
    assert_eq!(results[7].url, "https://example.com/7");
    assert_eq!(results[3].engine, "duckduckgo");
}

#[tokio::test]
async fn status_503_yields_empty_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = SearxClient::new(&server.uri()).unwrap();
    assert!(client.search("anything", 8).await.is_empty());

    let err = client.try_search("anything", 8).await.unwrap_err();
    assert!(err.is_provider_unavailable());
}

#[tokio::test]
async fn malformed_body_yields_empty_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<!doctype html>"))
        .mount(&server)
        .await;

    let client = SearxClient::new(&server.uri()).unwrap();
    assert!(client.search("anything", 8).await.is_empty());
    assert!(client.try_search("anything", 8).await.unwrap_err().is_malformed_response());
}

#[tokio::test]
async fn unreachable_provider_yields_empty_results() {
    // Nothing listens on the discard port.
    let client = SearxClient::new("http://127.0.0.1:9").unwrap();
    assert!(client.search("anything", 8).await.is_empty());
}

#[tokio::test]
async fn timeout_yields_empty_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(hits(2))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    let client = SearxClient::new(&server.uri())
        .unwrap()
        .with_timeout(Duration::from_millis(50));
    assert!(client.search("slow", 8).await.is_empty());
}

#[tokio::test]
async fn probe_reports_availability() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    assert!(SearxClient::new(&server.uri()).unwrap().probe().await);
    assert!(!SearxClient::new("http://127.0.0.1:9").unwrap().probe().await);
}
