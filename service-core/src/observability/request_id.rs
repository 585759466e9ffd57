//! Request correlation for service-to-service HTTP calls.
//!
//! Incoming requests carry an `x-request-id` (assigned by
//! [`request_id_middleware`](crate::middleware::tracing::request_id_middleware)
//! when missing); outbound calls made on behalf of that request forward the
//! same id so backend logs can be joined with ours.

use axum::http::HeaderMap;

/// Header name for request correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extract request ID from incoming request headers.
pub fn extract_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Extract a bearer token from an `Authorization` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
}

/// Extension trait forwarding correlation data on outbound requests.
pub trait RequestIdExt {
    fn with_request_id(self, request_id: Option<&str>) -> Self;
}

impl RequestIdExt for reqwest::RequestBuilder {
    fn with_request_id(self, request_id: Option<&str>) -> Self {
        match request_id {
            Some(id) => self.header(REQUEST_ID_HEADER, id),
            None => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_request_id() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, "abc-123".parse().unwrap());

        let request_id = extract_request_id(&headers);
        assert_eq!(request_id, Some("abc-123".to_string()));
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Bearer eyJhbGciOi".parse().unwrap(),
        );
        assert_eq!(extract_bearer_token(&headers), Some("eyJhbGciOi".to_string()));

        headers.insert(axum::http::header::AUTHORIZATION, "Basic dXNlcg==".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn test_request_id_is_forwarded() {
        let client = reqwest::Client::new();
        let request = client
            .post("http://backend.local/bills")
            .with_request_id(Some("req-42"))
            .build()
            .unwrap();

        assert_eq!(
            request.headers().get(REQUEST_ID_HEADER).unwrap(),
            "req-42"
        );
    }
}
