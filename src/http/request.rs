use std::net::SocketAddr;
use std::path::PathBuf;

/// A single request header as received on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Header name, whitespace-trimmed, case preserved
    pub name: String,
    /// Header value, whitespace-trimmed
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Represents a parsed HTTP request from a client.
///
/// One `Request` exists per accepted connection and is owned by the worker
/// handling it. The connection itself lives next to it in
/// [`Connection`](crate::http::connection::Connection), which closes it once.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// The method token exactly as received (e.g. "GET")
    pub method: String,
    /// Request target up to the first `?`, always starting with `/`
    pub uri: String,
    /// Everything after the first `?`, if the target had one
    pub query: Option<String>,
    /// Protocol version token (e.g. "HTTP/1.0"), if the request line had one
    pub version: Option<String>,
    /// Headers in receipt order; duplicates are kept
    pub headers: Vec<Header>,
    /// Canonical filesystem path, set once the URI has been resolved
    pub path: Option<PathBuf>,
    /// Remote host as text
    pub peer_host: String,
    /// Remote port as text
    pub peer_port: String,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<String>,
    uri: Option<String>,
    query: Option<String>,
    version: Option<String>,
    headers: Vec<Header>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            uri: None,
            query: None,
            version: None,
            headers: Vec::new(),
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            uri: self.uri.ok_or("uri missing")?,
            query: self.query,
            version: self.version,
            headers: self.headers,
            ..Request::default()
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Retrieves the first header with the given name (ASCII case-insensitive).
    ///
    /// # Example
    ///
    /// ```
    /// # use spidey::http::request::RequestBuilder;
    /// let req = RequestBuilder::new()
    ///     .method("GET")
    ///     .uri("/")
    ///     .header("Host", "localhost")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(req.header("host"), Some("localhost"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Records the remote endpoint captured at accept time.
    pub fn set_peer(&mut self, peer: SocketAddr) {
        self.peer_host = peer.ip().to_string();
        self.peer_port = peer.port().to_string();
    }

    /// The version token, or "HTTP/1.0" when the request line omitted it.
    pub fn protocol(&self) -> &str {
        self.version.as_deref().unwrap_or("HTTP/1.0")
    }
}
