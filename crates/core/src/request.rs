//! Request and response model shared by the worker, the cache and the fetch pipeline.

use bytes::Bytes;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// How the page issued a request.
///
/// Only `Navigate` changes routing; the other modes are carried through
/// unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Full-page load of a document.
    Navigate,
    /// Same-origin subresource request.
    SameOrigin,
    /// Cross-origin request with CORS.
    Cors,
    /// Opaque subresource request (images, stylesheets).
    #[default]
    NoCors,
}

/// An outgoing request issued by a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: Url,
    /// Upper-case HTTP method.
    pub method: String,
    pub mode: RequestMode,
}

impl Request {
    /// A subresource `GET` request.
    pub fn get(url: Url) -> Self {
        Self { url, method: "GET".into(), mode: RequestMode::NoCors }
    }

    /// A full-page navigation to `url`.
    pub fn navigate(url: Url) -> Self {
        Self { url, method: "GET".into(), mode: RequestMode::Navigate }
    }

    /// Build a request with an arbitrary method; the method is upper-cased.
    pub fn new(url: Url, method: &str, mode: RequestMode) -> Self {
        Self { url, method: method.to_ascii_uppercase(), mode }
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

/// A response produced by the network or replayed from a cache store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Final URL of the response.
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    /// Whether the status is in the 2xx range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> Response {
        Response {
            url: "http://localhost:5000/".into(),
            status,
            content_type: Some("text/html".into()),
            headers: Vec::new(),
            body: Bytes::from_static(b"<h1>hi</h1>"),
        }
    }

    #[test]
    fn test_request_constructors() {
        let url = Url::parse("http://localhost:5000/profile").unwrap();
        assert!(Request::navigate(url.clone()).is_navigation());
        assert!(!Request::get(url.clone()).is_navigation());
        assert_eq!(Request::new(url, "post", RequestMode::Cors).method, "POST");
    }

    #[test]
    fn test_response_ok_range() {
        assert!(response(200).ok());
        assert!(response(204).ok());
        assert!(!response(304).ok());
        assert!(!response(404).ok());
        assert!(!response(500).ok());
    }

    #[test]
    fn test_response_text() {
        assert_eq!(response(200).text(), "<h1>hi</h1>");
    }

    #[test]
    fn test_request_mode_serde() {
        let mode: RequestMode = serde_json::from_str("\"navigate\"").unwrap();
        assert_eq!(mode, RequestMode::Navigate);
        assert_eq!(serde_json::to_string(&RequestMode::NoCors).unwrap(), "\"no-cors\"");
    }
}
