//! Status handling shared by every fetcher.
//!
//! 429 becomes [`RegistryError::RateLimited`] carrying the server's
//! `Retry-After` seconds; any other non-2xx becomes [`RegistryError::Api`]
//! with the start of the body for the failure log. Bodies that do not
//! decode become [`RegistryError::Parse`].

use reqwest::{Response, StatusCode, header::RETRY_AFTER};
use serde::de::DeserializeOwned;

use crate::error::RegistryError;

/// Longest response body kept in an [`RegistryError::Api`] message.
const MAX_ERROR_BODY: usize = 200;

/// Wait used when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Pass a successful response through, or classify the failure.
pub async fn check_response(resp: Response) -> Result<Response, RegistryError> {
    let status = resp.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(RegistryError::RateLimited {
            retry_after_secs: retry_after_secs(&resp),
        });
    }
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(RegistryError::Api {
        status: status.as_u16(),
        message: clip(body),
    })
}

/// Decode a successful response body.
pub async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, RegistryError> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| RegistryError::Parse(e.to_string()))
}

/// Only the delta-seconds form is understood; an HTTP date falls back to the
/// default.
fn retry_after_secs(resp: &Response) -> u64 {
    resp.headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

fn clip(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn response(status: u16, retry_after: Option<&str>, body: &str) -> Response {
        let mut builder = ::http::Response::builder().status(status);
        if let Some(value) = retry_after {
            builder = builder.header("Retry-After", value);
        }
        Response::from(builder.body(body.to_string()).unwrap())
    }

    #[rstest]
    #[case(Some("120"), 120)]
    #[case(Some(" 5 "), 5)]
    #[case(None, 60)]
    #[case(Some("Wed, 21 Oct 2026 07:28:00 GMT"), 60)]
    #[tokio::test]
    async fn too_many_requests_reads_retry_after(
        #[case] header: Option<&str>,
        #[case] expected: u64,
    ) {
        let err = check_response(response(429, header, "")).await.unwrap_err();
        assert!(
            matches!(err, RegistryError::RateLimited { retry_after_secs } if retry_after_secs == expected)
        );
    }

    #[tokio::test]
    async fn not_found_keeps_body() {
        let err = check_response(response(404, None, r#"{"error":"Not found"}"#))
            .await
            .unwrap_err();
        let RegistryError::Api { status, message } = err else {
            panic!("expected Api error, got {err:?}");
        };
        assert_eq!(status, 404);
        assert!(message.contains("Not found"));
    }

    #[tokio::test]
    async fn long_bodies_are_clipped() {
        let err = check_response(response(502, None, &"x".repeat(5_000)))
            .await
            .unwrap_err();
        let RegistryError::Api { message, .. } = err else {
            panic!("expected Api error, got {err:?}");
        };
        assert_eq!(message.len(), MAX_ERROR_BODY);
    }

    #[test]
    fn clip_respects_char_boundaries() {
        let body = "é".repeat(150);
        let clipped = clip(body);
        assert!(clipped.len() <= MAX_ERROR_BODY);
        assert_eq!(clipped.chars().count(), 100);
    }

    #[tokio::test]
    async fn undecodable_body_is_a_parse_error() {
        let err = read_json::<serde_json::Value>(response(200, None, "<html>oops</html>"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Parse(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn wrong_shape_is_a_parse_error() {
        let err = read_json::<Vec<u64>>(response(200, None, r#"{"downloads": 1}"#))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[tokio::test]
    async fn success_passes_through() {
        let resp = check_response(response(200, None, "{}")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
