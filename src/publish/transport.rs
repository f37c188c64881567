//! The HTTP seam between the publisher and the remote content store.
//!
//! [`ContentTransport`] is two calls: read the current state of a path, and
//! write a new version of it. The publisher owns all the protocol decisions
//! (which status means "missing", when to send a `sha`); a transport only
//! moves requests and responses.
//!
//! The production implementation is
//! [`GitHubTransport`](super::github::GitHubTransport).

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Request failed: {0}")]
    Request(String),
}

/// Status code and raw body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Body of a contents-API write. `content` is already base64-encoded.
///
/// `sha` is omitted from the JSON entirely when the file is being created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WritePayload {
    pub message: String,
    pub content: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Trait for remote content stores.
pub trait ContentTransport {
    /// Read the metadata (and content) of a file.
    fn get(&self, path: &str) -> Result<Response, TransportError>;

    /// Create or replace a file.
    fn put(&self, path: &str, payload: &WritePayload) -> Result<Response, TransportError>;
}

impl<T: ContentTransport + ?Sized> ContentTransport for &T {
    fn get(&self, path: &str) -> Result<Response, TransportError> {
        (**self).get(path)
    }

    fn put(&self, path: &str, payload: &WritePayload) -> Result<Response, TransportError> {
        (**self).put(path, payload)
    }
}
