//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `CatalogClient` builds
//! `HttpRequest` values and parses `HttpResponse` values without touching the
//! network; either a host (mobile platform, C caller) or a
//! [`Transport`](crate::transport::Transport) executes the round-trip.
//!
//! All fields use owned types (`String`, `Vec`) so values can cross the FFI
//! boundary without lifetime concerns.

/// HTTP method for a request. The catalog is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL including any query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// An HTTP response described as plain data.
///
/// Constructed by whoever executed the matching `HttpRequest`, then handed
/// to `CatalogClient::parse_*`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
