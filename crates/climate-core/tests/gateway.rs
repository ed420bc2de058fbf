//! Integration tests for the request gateway against a mock API.

use std::time::Duration;

use climate_core::gateway::{GatewayError, GatewayErrorKind, RequestGateway, USER_AGENT};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

#[tokio::test]
async fn test_get_returns_raw_response() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/historical/1990"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"mean":14.2}"#))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = RequestGateway::new(server.uri());
    let response = gateway.get("historical/1990").await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), r#"{"mean":14.2}"#);
}

#[tokio::test]
async fn test_non_success_status_raises_request_failed() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/locked"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let gateway = RequestGateway::new(server.uri());

    let err = gateway.get("/missing").await.unwrap_err();
    assert_eq!(err.kind(), GatewayErrorKind::RequestFailed);
    assert_eq!(err.status(), Some(404));
    match err {
        GatewayError::RequestFailed { body, url, .. } => {
            assert_eq!(body.as_deref(), Some("not found"));
            assert!(url.ends_with("/missing"));
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = gateway.delete("locked").await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_post_and_put_send_json_body() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let body = json!({ "name": "Lisbon", "lat": 38.72, "lng": -9.14 });
    Mock::given(method("POST"))
        .and(path("/locations"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/locations/1"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = RequestGateway::new(server.uri());
    let created = gateway.post("/locations", Some(&body)).await.unwrap();
    assert_eq!(created.status(), 201);
    let updated = gateway.put("locations/1", Some(&body)).await.unwrap();
    assert_eq!(updated.status(), 204);
}

#[tokio::test]
async fn test_post_without_body_sends_empty_payload() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let gateway = RequestGateway::new(server.uri());
    let response = gateway
        .post::<serde_json::Value>("/refresh", None)
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_caller_headers_override_content_type() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tiles/2000.png"))
        .and(header("content-type", "image/png"))
        .and(header("x-request-id", "abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut headers = HeaderMap::new();
    headers.insert("content-type", HeaderValue::from_static("image/png"));
    headers.insert("x-request-id", HeaderValue::from_static("abc"));

    let gateway = RequestGateway::new(server.uri());
    gateway
        .get_with_headers("/tiles/2000.png", headers)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0");
        let Ok(listener) = listener else {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        };
        listener.local_addr().unwrap().port()
    };

    let gateway = RequestGateway::new(format!("http://127.0.0.1:{port}"));
    let err = gateway.get("/anything").await.unwrap_err();
    assert_eq!(err.kind(), GatewayErrorKind::Transport);
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_slow_response_is_reported_as_timeout() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let gateway = RequestGateway::with_client(server.uri(), http);
    let err = gateway.get("/slow").await.unwrap_err();
    assert_eq!(err.kind(), GatewayErrorKind::Transport);
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_default_client_sends_user_agent() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    RequestGateway::new(server.uri()).get("/ua").await.unwrap();
}

#[tokio::test]
async fn test_custom_client_keeps_its_user_agent() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header("user-agent", "map-viewer/2.0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let http = reqwest::Client::builder()
        .user_agent("map-viewer/2.0")
        .build()
        .unwrap();
    RequestGateway::with_client(server.uri(), http)
        .get("/ua")
        .await
        .unwrap();
}
