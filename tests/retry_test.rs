//! Wiremock tests for RequestExecutor: retries, timeouts, error bodies and
//! credential refresh on 401.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use locallens::{
    CredentialManager, KeyValueStore, LensError, MemoryStore, RequestExecutor, RequestOptions,
    RetryConfig,
};

const KEY: &str = "locallens_apiKey";

fn fast_retry() -> RetryConfig {
    RetryConfig::new()
        .base_backoff(Duration::from_millis(1))
        .jitter(false)
}

fn executor(base: &str, credentials: Option<Arc<CredentialManager>>) -> RequestExecutor {
    RequestExecutor::new(reqwest::Client::new(), base, credentials)
        .unwrap()
        .with_retry(fast_retry())
}

#[tokio::test]
async fn success_returns_parsed_json() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recommendations"))
        .and(query_param("lat", "40.71234"))
        .and(query_param("lon", "-74.00567"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [1, 2]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let exec = executor(&mock_server.uri(), None);
    let options = RequestOptions::get()
        .query("lat", 40.71234)
        .query("lon", -74.00567)
        .auth(false);
    let value = exec.execute("/recommendations", &options).await.unwrap();

    assert_eq!(value, json!({"items": [1, 2]}));
}

#[tokio::test]
async fn post_body_is_sent_as_json() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/geoapify"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"endpoint": "/v2/places"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let exec = executor(&mock_server.uri(), None);
    let options = RequestOptions::post(json!({"endpoint": "/v2/places"})).auth(false);
    tokio_test::assert_ok!(exec.execute("/geoapify", &options).await);
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let exec = executor(&mock_server.uri(), None);
    let value = exec
        .execute("/anything", &RequestOptions::get().auth(false))
        .await
        .unwrap();
    assert_eq!(value, serde_json::Value::Null);
}

#[tokio::test]
async fn server_error_retries_until_exhausted() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/insights"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "busy"})))
        .expect(4)
        .mount(&mock_server)
        .await;

    let exec = executor(&mock_server.uri(), None);
    let err = exec
        .execute("/insights", &RequestOptions::get().auth(false))
        .await
        .unwrap_err();

    match err {
        LensError::Api { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, json!({"error": "busy"}));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_then_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let exec = executor(&mock_server.uri(), None);
    let value = exec
        .execute("/recommendations", &RequestOptions::get().auth(false))
        .await
        .unwrap();
    assert_eq!(value, json!([1]));
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such thing"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let exec = executor(&mock_server.uri(), None);
    let err = exec
        .execute("/missing", &RequestOptions::get().auth(false))
        .await
        .unwrap_err();

    match err {
        LensError::Api { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, json!("no such thing"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn disabled_retry_makes_one_attempt() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let exec = RequestExecutor::new(reqwest::Client::new(), &mock_server.uri(), None)
        .unwrap()
        .with_retry(RetryConfig::disabled());
    let err = exec
        .execute("/x", &RequestOptions::get().auth(false))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn unauthorized_reloads_credential_before_retry() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let credentials = Arc::new(CredentialManager::new(store.clone(), KEY));
    credentials.update("old").await;
    // Rotated behind the manager's back; only a reload can see it.
    store
        .set(HashMap::from([(KEY.to_string(), json!("new"))]))
        .await
        .unwrap();

    let exec = executor(&mock_server.uri(), Some(credentials.clone()));
    let value = exec
        .execute("/recommendations", &RequestOptions::get())
        .await
        .unwrap();

    assert_eq!(value, json!({"ok": true}));
    assert_eq!(credentials.load().await, "new");
}

#[tokio::test]
async fn unauthorized_without_auth_keeps_credential() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(4)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let credentials = Arc::new(CredentialManager::new(store, KEY));
    credentials.update("kept").await;

    let exec = executor(&mock_server.uri(), Some(credentials.clone()));
    let err = exec
        .execute("/x", &RequestOptions::get().auth(false))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(credentials.status(), locallens::CredentialStatus::Present);
}

#[tokio::test]
async fn slow_response_times_out() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let exec = RequestExecutor::new(reqwest::Client::new(), &mock_server.uri(), None)
        .unwrap()
        .with_retry(RetryConfig::disabled())
        .with_timeout(Duration::from_millis(50));
    let err = exec
        .execute("/slow", &RequestOptions::get().auth(false))
        .await
        .unwrap_err();

    assert!(
        matches!(err, LensError::Timeout { elapsed } if elapsed == Duration::from_millis(50)),
        "expected timeout, got {err:?}"
    );
}

#[tokio::test]
async fn timeouts_are_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let exec = executor(&mock_server.uri(), None)
        .with_retry(fast_retry().max_retries(1))
        .with_timeout(Duration::from_millis(50));
    let err = exec
        .execute("/slow", &RequestOptions::get().auth(false))
        .await
        .unwrap_err();
    assert!(matches!(err, LensError::Timeout { .. }));
}

#[tokio::test]
async fn connection_failure_is_http_error() {
    // Nothing listens on port 1.
    let exec = executor("http://127.0.0.1:1", None);
    let err = exec
        .execute("/x", &RequestOptions::get().auth(false))
        .await
        .unwrap_err();
    assert!(matches!(err, LensError::Http(_)), "got {err:?}");
}

/// Serve raw HTTP: the first connection gets a 503 whose body is cut short,
/// later ones get `ok`. Returns the base URL.
async fn truncated_then(ok: &'static str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut first = true;
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let response = if first {
                "HTTP/1.1 503 Service Unavailable\r\nContent-Type: application/json\r\n\
                 Content-Length: 100\r\n\r\n{\"err"
                    .to_string()
            } else {
                format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{ok}",
                    ok.len()
                )
            };
            first = false;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn unreadable_error_body_keeps_status() {
    let base = truncated_then(r#"{"ok":true}"#).await;
    let exec = RequestExecutor::new(reqwest::Client::new(), &base, None)
        .unwrap()
        .with_retry(RetryConfig::disabled());

    let err = exec
        .execute("/x", &RequestOptions::get().auth(false))
        .await
        .unwrap_err();

    match err {
        LensError::Api { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, json!(""));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreadable_error_body_is_still_retried() {
    let base = truncated_then(r#"{"ok":true}"#).await;
    let exec = executor(&base, None);

    let value = exec
        .execute("/x", &RequestOptions::get().auth(false))
        .await
        .unwrap();

    assert_eq!(value, json!({"ok": true}));
}
