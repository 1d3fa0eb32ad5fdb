use std::time::Duration;

use serde_json::json;

use locallens::{LensError, Result};

#[test]
fn test_error_display() {
    let err = LensError::InvalidArgument("latitude is missing".to_string());
    assert!(err.to_string().contains("latitude is missing"));

    let err = LensError::Api {
        status: 503,
        body: json!({"error": "busy"}),
    };
    let text = err.to_string();
    assert!(text.contains("503"));
    assert!(text.contains("busy"));
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(LensError::NotFound("Atlantis".into()))
    }
    assert!(returns_error().is_err());
}

#[test]
fn test_status_only_for_api_errors() {
    let api = LensError::Api {
        status: 404,
        body: json!("missing"),
    };
    assert_eq!(api.status(), Some(404));
    assert_eq!(
        LensError::Timeout {
            elapsed: Duration::from_secs(10)
        }
        .status(),
        None
    );
    assert_eq!(LensError::Http("reset".into()).status(), None);
}

// ============================================================================
// Retry classification
// ============================================================================

fn api(status: u16) -> LensError {
    LensError::Api {
        status,
        body: serde_json::Value::Null,
    }
}

#[test]
fn retryable_errors() {
    for status in [401, 408, 429, 500, 502, 503, 504, 599] {
        assert!(api(status).is_retryable(), "{status} should be retryable");
    }
    assert!(
        LensError::Timeout {
            elapsed: Duration::from_secs(10)
        }
        .is_retryable()
    );
}

#[test]
fn terminal_errors() {
    for status in [400, 403, 404, 409, 422] {
        assert!(!api(status).is_retryable(), "{status} should be terminal");
    }
    assert!(!LensError::Http("connection refused".into()).is_retryable());
    assert!(!LensError::InvalidArgument("x".into()).is_retryable());
    assert!(!LensError::StoreUnavailable("x".into()).is_retryable());
    assert!(!LensError::NotFound("x".into()).is_retryable());
    assert!(!LensError::Configuration("x".into()).is_retryable());
}

#[test]
fn json_error_converts() {
    let err: LensError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
    assert!(matches!(err, LensError::Json(_)));
}
