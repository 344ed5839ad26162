use axum::extract::MatchedPath;
use axum::http::{header, HeaderMap, Method, Request, StatusCode, Uri};
use std::time::Instant;

/// Request extension holding the moment the request entered the metrics layer.
#[derive(Debug, Clone, Copy)]
pub struct RequestStart(pub Instant);

impl RequestStart {
    pub fn now() -> Self {
        Self(Instant::now())
    }
}

/// Snapshot of the request taken before it is handed to the inner service.
///
/// Normalizers, custom label providers and skip predicates see this instead
/// of the request itself, which is consumed by the handler.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// Route template axum matched, e.g. `/users/{id}`.
    pub matched_path: Option<String>,
}

impl RequestInfo {
    // ---
    pub fn from_request<B>(request: &Request<B>) -> Self {
        // ---
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
            matched_path: request
                .extensions()
                .get::<MatchedPath>()
                .map(|path| path.as_str().to_string()),
        }
    }

    /// The path used for the `path` label before normalization.
    ///
    /// Prefers the matched route template with optional markers (`?`)
    /// stripped; falls back to the raw URI path for unmatched requests.
    pub fn route_path(&self) -> String {
        // ---
        match &self.matched_path {
            Some(template) => template.replace('?', ""),
            None => self.uri.path().to_string(),
        }
    }

    /// Declared `Content-Length` of the request body, if any.
    pub fn content_length(&self) -> Option<u64> {
        content_length(&self.headers)
    }
}

/// Context handed to every normalizer alongside the raw value.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    pub request: &'a RequestInfo,
    /// Response status, absent when no response was produced.
    pub status: Option<StatusCode>,
}

pub(crate) fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use axum::body::Body;

    #[test]
    fn route_path_falls_back_to_uri() {
        // ---
        let request = Request::builder()
            .uri("/missing/42?x=1")
            .body(Body::empty())
            .unwrap();
        let info = RequestInfo::from_request(&request);

        assert_eq!(info.matched_path, None);
        assert_eq!(info.route_path(), "/missing/42");
    }

    #[test]
    fn content_length_is_parsed() {
        // ---
        let request = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header(header::CONTENT_LENGTH, "1024")
            .body(Body::empty())
            .unwrap();

        assert_eq!(RequestInfo::from_request(&request).content_length(), Some(1024));
    }

    #[test]
    fn invalid_content_length_is_ignored() {
        // ---
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_LENGTH, "lots".parse().unwrap());

        assert_eq!(content_length(&headers), None);
    }
}
