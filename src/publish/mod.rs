//! Create-or-update publishing of text files to the remote content store.
//!
//! Every publish is exactly one read and one write:
//!
//! 1. GET the path. A 200 carries the current revision marker (`sha`); any
//!    other status, or a failed request, means the file does not exist yet.
//! 2. PUT `{message, content, branch, sha?}` with the content base64-encoded.
//!    `sha` is sent only when step 1 found one.
//! 3. 200 or 201 is success; anything else is [`PublishError::Rejected`].
//!
//! There are no retries. Two publishers racing on the same path can lose an
//! update, or the second write is rejected for a stale `sha`.
//!
//! The module is split into:
//! - **Transport**: [`ContentTransport`] trait, the HTTP seam
//! - **GitHub**: [`GitHubTransport`], the reqwest implementation
//! - **Publisher**: the protocol above, generic over any transport

pub mod github;
pub mod transport;

pub use github::GitHubTransport;
pub use transport::{ContentTransport, Response, TransportError, WritePayload};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("remote rejected write ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected response: {0}")]
    BadResponse(String),
}

/// Whether a publish created a new file or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Created,
    Updated,
}

/// The fields we read from a contents-API GET.
#[derive(Debug, Deserialize)]
struct ContentsEntry {
    #[serde(default)]
    sha: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Publishes files to one branch of the remote store.
pub struct Publisher<T> {
    transport: T,
    branch: String,
}

impl<T: ContentTransport> Publisher<T> {
    pub fn new(transport: T, branch: impl Into<String>) -> Self {
        Self {
            transport,
            branch: branch.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Create or overwrite `path` with `content`, stamped with the current time.
    pub fn publish(&self, path: &str, content: &str) -> Result<PublishOutcome, PublishError> {
        self.publish_at(path, content, Utc::now())
    }

    /// [`publish`](Self::publish) with an explicit commit timestamp.
    pub fn publish_at(
        &self,
        path: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<PublishOutcome, PublishError> {
        let sha = self.current_sha(path);
        let outcome = if sha.is_some() {
            PublishOutcome::Updated
        } else {
            PublishOutcome::Created
        };

        let payload = WritePayload {
            message: commit_message(path, now),
            content: STANDARD.encode(content.as_bytes()),
            branch: self.branch.clone(),
            sha,
        };

        let response = self.transport.put(path, &payload)?;
        if response.status == 200 || response.status == 201 {
            tracing::info!(path, ?outcome, bytes = content.len(), "published");
            Ok(outcome)
        } else {
            tracing::error!(path, status = response.status, "remote rejected write");
            Err(PublishError::Rejected {
                status: response.status,
                body: response.body,
            })
        }
    }

    /// Revision marker of the file at `path`, or `None` if it should be created.
    fn current_sha(&self, path: &str) -> Option<String> {
        match self.transport.get(path) {
            Ok(response) if response.status == 200 => {
                match serde_json::from_str::<ContentsEntry>(&response.body) {
                    Ok(entry) => entry.sha,
                    Err(e) => {
                        tracing::warn!(path, error = %e, "unreadable contents response, creating");
                        None
                    }
                }
            }
            Ok(response) => {
                tracing::debug!(path, status = response.status, "file not found, creating");
                None
            }
            Err(e) => {
                tracing::warn!(path, error = %e, "lookup failed, creating");
                None
            }
        }
    }

    /// Download and decode the current content of `path`.
    ///
    /// Any non-200 answer is `Ok(None)`; a failed request is an error.
    pub fn fetch_file(&self, path: &str) -> Result<Option<String>, PublishError> {
        let response = self.transport.get(path)?;
        if response.status != 200 {
            tracing::debug!(path, status = response.status, "nothing to fetch");
            return Ok(None);
        }

        let entry: ContentsEntry = serde_json::from_str(&response.body)
            .map_err(|e| PublishError::BadResponse(e.to_string()))?;
        // The API wraps base64 at 60 columns.
        let encoded: String = entry
            .content
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| PublishError::BadResponse(e.to_string()))?;
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| PublishError::BadResponse(e.to_string()))
    }
}

/// Commit message for a publish: generated JSON and spreadsheet exports are
/// labelled differently so the history reads clearly.
pub fn commit_message(path: &str, now: DateTime<Utc>) -> String {
    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    if path.contains(".json") {
        format!("Auto-convert CSV to JSON: {path} - {stamp}")
    } else {
        format!("Update {path} from spreadsheet - {stamp}")
    }
}
