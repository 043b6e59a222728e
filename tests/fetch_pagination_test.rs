//! Integration tests for paginated reply fetching.

use discourse_emoji_stats::client::ApiClient;
use discourse_emoji_stats::config::Config;
use discourse_emoji_stats::fetch::fetch_user_replies;
use discourse_emoji_stats::models::TimeWindow;
use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointed at the mock server.
fn test_config(server: &MockServer) -> Config {
    Config {
        base_url: Url::parse(&server.uri()).expect("valid mock server URL"),
        ..Config::for_testing()
    }
}

fn record(created_at: &str, cooked: &str) -> Value {
    json!({
        "created_at": created_at,
        "topic_id": 1,
        "title": "Some topic",
        "cooked": cooked,
        "excerpt": ""
    })
}

fn page(records: Vec<Value>) -> Value {
    json!({ "user_actions": records })
}

#[tokio::test]
async fn test_fetches_until_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user_actions.json"))
        .and(query_param("username", "alice"))
        .and(query_param("filter", "5"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![
            record("2024-06-02T00:00:00Z", "<p>:smile:</p>"),
            record("2024-06-01T00:00:00Z", "<p>plain</p>"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user_actions.json"))
        .and(query_param("offset", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![record(
            "2024-05-01T00:00:00Z",
            "<p>older</p>",
        )])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user_actions.json"))
        .and(query_param("offset", "60"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let client = ApiClient::new(&config, None).expect("client");

    let replies =
        fetch_user_replies(&client, &config, "alice", None, &TimeWindow::default()).await;
    assert_eq!(replies.len(), 3);
}

#[tokio::test]
async fn test_stops_at_page_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user_actions.json"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![record(
            "2024-06-01T00:00:00Z",
            "<p>hi</p>",
        )])))
        .expect(1)
        .mount(&server)
        .await;

    // The page limit must prevent any request past the first page.
    Mock::given(method("GET"))
        .and(path("/user_actions.json"))
        .and(query_param("offset", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let client = ApiClient::new(&config, None).expect("client");

    let replies =
        fetch_user_replies(&client, &config, "alice", Some(1), &TimeWindow::default()).await;
    assert_eq!(replies.len(), 1);
}

#[tokio::test]
async fn test_early_stop_once_page_predates_window_start() {
    let server = MockServer::start().await;

    // Newest-first page whose oldest record predates the window start.
    Mock::given(method("GET"))
        .and(path("/user_actions.json"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![
            record("2024-06-01T00:00:00Z", "<p>in window</p>"),
            record("2024-02-01T00:00:00Z", "<p>too old</p>"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    // No further page may be requested once the stop condition fires.
    Mock::given(method("GET"))
        .and(path("/user_actions.json"))
        .and(query_param("offset", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let client = ApiClient::new(&config, None).expect("client");
    let window = TimeWindow::parse(Some("2024-03-01"), None).expect("window");

    let replies = fetch_user_replies(&client, &config, "alice", None, &window).await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].created_at.as_deref(), Some("2024-06-01T00:00:00Z"));
}

#[tokio::test]
async fn test_window_keeps_records_without_usable_timestamp() {
    let server = MockServer::start().await;

    let no_timestamp = json!({
        "topic_id": 1,
        "title": "Some topic",
        "cooked": "<p>undated</p>"
    });

    Mock::given(method("GET"))
        .and(path("/user_actions.json"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![
            no_timestamp,
            record("not-a-timestamp", "<p>garbled date</p>"),
            record("2024-01-01T00:00:00Z", "<p>out of window</p>"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user_actions.json"))
        .and(query_param("offset", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let client = ApiClient::new(&config, None).expect("client");
    let window = TimeWindow::parse(Some("2024-03-01"), Some("2024-12-31")).expect("window");

    // The dated-out-of-window record is dropped and also triggers the early
    // stop; the undated and garbled ones pass conservatively.
    let replies = fetch_user_replies(&client, &config, "alice", None, &window).await;
    assert_eq!(replies.len(), 2);
}

#[tokio::test]
async fn test_transient_failure_returns_accumulated_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user_actions.json"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![record(
            "2024-06-01T00:00:00Z",
            "<p>kept</p>",
        )])))
        .expect(1)
        .mount(&server)
        .await;

    // 500 is retried up to the attempt cap, then pagination stops.
    Mock::given(method("GET"))
        .and(path("/user_actions.json"))
        .and(query_param("offset", "30"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let config = Config {
        retry_max_attempts: 2,
        ..test_config(&server)
    };
    let client = ApiClient::new(&config, None).expect("client");

    let replies =
        fetch_user_replies(&client, &config, "alice", None, &TimeWindow::default()).await;
    assert_eq!(replies.len(), 1);
}

#[tokio::test]
async fn test_client_error_status_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user_actions.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        retry_max_attempts: 3,
        ..test_config(&server)
    };
    let client = ApiClient::new(&config, None).expect("client");

    let replies =
        fetch_user_replies(&client, &config, "nobody", None, &TimeWindow::default()).await;
    assert!(replies.is_empty());
}
