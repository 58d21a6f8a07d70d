//! Pagination tests against a mocked REST collection.

use std::time::Duration;

use snykapi::{fetch_all, QueryParams, SnykClient, SnykError};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VERSION: &str = "2023-09-14~beta";

fn client_for(server: &MockServer) -> SnykClient {
    SnykClient::builder("token abc123")
        .base_url(server.uri())
        .max_retries(0)
        .backoff_unit(Duration::from_millis(1))
        .build()
        .unwrap()
}

fn records(prefix: &str, count: usize) -> Vec<serde_json::Value> {
    (0..count)
        .map(|i| {
            serde_json::json!({
                "type": "project",
                "id": format!("{prefix}-{i}"),
                "attributes": {"name": format!("project {prefix}-{i}")}
            })
        })
        .collect()
}

#[tokio::test]
async fn test_follows_every_link_shape() {
    let mock_server = MockServer::start().await;

    // First page: next link without the /rest prefix or a version
    Mock::given(method("GET"))
        .and(path("/rest/orgs/o1/projects"))
        .and(query_param("version", VERSION))
        .and(query_param("limit", "100"))
        .and(query_param_is_missing("starting_after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": records("a", 5),
            "links": {"next": "/orgs/o1/projects?starting_after=cursor1&limit=100"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Second page: requested with the version restored; next link carries its own
    Mock::given(method("GET"))
        .and(path("/rest/orgs/o1/projects"))
        .and(query_param("starting_after", "cursor1"))
        .and(query_param("version", VERSION))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": records("b", 4),
            "links": {"next": "/rest/orgs/o1/projects?version=2024-01-23~beta&starting_after=cursor2"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Last page: requested verbatim; empty next link ends the walk
    Mock::given(method("GET"))
        .and(path("/rest/orgs/o1/projects"))
        .and(query_param("starting_after", "cursor2"))
        .and(query_param("version", "2024-01-23~beta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": records("c", 3),
            "links": {"next": ""}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let resources = fetch_all::<serde_json::Value>(&client, "/rest/orgs/o1/projects", None)
        .await
        .unwrap();

    assert_eq!(resources.len(), 12);
    assert_eq!(resources[0].id, "a-0");
    assert_eq!(resources[5].id, "b-0");
    assert_eq!(resources[11].id, "c-2");
}

#[tokio::test]
async fn test_each_link_shape_yields_same_records() {
    let shapes = [
        format!("/rest/orgs/o1/projects?version={VERSION}&starting_after=cursor"),
        format!("/orgs/o1/projects?version={VERSION}&starting_after=cursor"),
        "/rest/orgs/o1/projects?starting_after=cursor".to_string(),
    ];

    for next in shapes {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/orgs/o1/projects"))
            .and(query_param_is_missing("starting_after"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": records("first", 8),
                "links": {"next": next.as_str()}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/orgs/o1/projects"))
            .and(query_param("starting_after", "cursor"))
            .and(query_param("version", VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": records("second", 4)
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let resources = fetch_all::<serde_json::Value>(&client, "/rest/orgs/o1/projects", None)
            .await
            .unwrap();

        assert_eq!(resources.len(), 12, "link shape {next}");
    }
}

#[tokio::test]
async fn test_caller_params_override_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/orgs"))
        .and(query_param("version", "2024-01-23~beta"))
        .and(query_param("limit", "10"))
        .and(query_param("slug", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let params = QueryParams::new()
        .with("version", "2024-01-23~beta")
        .with("limit", "10")
        .with("slug", "acme");
    let resources = fetch_all::<serde_json::Value>(&client, "/rest/orgs", Some(&params))
        .await
        .unwrap();

    assert!(resources.is_empty());
}

#[tokio::test]
async fn test_empty_page_stops_even_with_next_link() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [],
            "links": {"next": "/groups?starting_after=again"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let resources = fetch_all::<serde_json::Value>(&client, "/rest/groups", None)
        .await
        .unwrap();

    assert!(resources.is_empty());
}

#[tokio::test]
async fn test_failed_page_aborts_listing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/orgs/o1/targets"))
        .and(query_param_is_missing("starting_after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": records("t", 8),
            "links": {"next": "/orgs/o1/targets?starting_after=t-7"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/orgs/o1/targets"))
        .and(query_param("starting_after", "t-7"))
        .respond_with(ResponseTemplate::new(403).set_body_string(r#"{"errors":[{"detail":"forbidden"}]}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = fetch_all::<serde_json::Value>(&client, "/rest/orgs/o1/targets", None)
        .await
        .unwrap_err();

    assert!(matches!(err, SnykError::ApiError { status_code: 403, .. }));
}

#[tokio::test]
async fn test_malformed_page_is_a_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/orgs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = fetch_all::<serde_json::Value>(&client, "/rest/orgs", None)
        .await
        .unwrap_err();

    assert!(matches!(err, SnykError::ParseError(_)));
}
