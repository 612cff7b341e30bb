//! Request and response model shared by the fetch client and the worker.
//!
//! These are deliberately small, owned types: a request is a method, a
//! canonical URL and a destination hint; a stored response is the immutable
//! snapshot that lives in a cache generation.

use bytes::Bytes;
use url::Url;

/// HTTP request method.
///
/// Only GET requests are ever cached; every other method passes through
/// to the network untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    /// Canonical upper-case name, as used in cache entry keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }

    pub fn is_get(&self) -> bool {
        matches!(self, Method::Get)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the response will be used for.
///
/// `Document` marks a full page navigation; those get the offline fallback
/// page when both the network and the cache come up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    Document,
    #[default]
    Resource,
}

/// An intercepted request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
    pub body: Bytes,
}

impl Request {
    /// Build a request with an explicit method and no body.
    ///
    /// The URL fragment is dropped: fragments never go over the wire, so
    /// two spellings that differ only in fragment are one cache identity.
    pub fn new(method: Method, mut url: Url) -> Self {
        url.set_fragment(None);
        Self { method, url, destination: Destination::Resource, body: Bytes::new() }
    }

    /// A plain GET request for a sub-resource.
    pub fn get(url: Url) -> Self {
        Self::new(Method::Get, url)
    }

    /// A GET request representing a full document navigation.
    pub fn navigation(url: Url) -> Self {
        Self { destination: Destination::Document, ..Self::new(Method::Get, url) }
    }

    /// Attach a request body (only meaningful for passthrough methods).
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    /// URL path component, the input to route classification.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Whether this request targets the API surface.
    pub fn is_api(&self) -> bool {
        self.path().starts_with("/api/")
    }
}

/// An immutable response snapshot as stored in a cache generation.
///
/// Overwritten wholesale on update, never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub stored_at: String,
}

impl StoredResponse {
    /// Build a snapshot stamped with the current time.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Bytes) -> Self {
        Self { status, headers, body, stored_at: chrono::Utc::now().to_rfc3339() }
    }

    /// HTTP status in the "ok" range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
