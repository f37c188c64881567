//! GitHub contents API transport over a blocking reqwest client.
//!
//! Both calls hit `{api_base}/repos/{owner}/{repo}/contents/{path}` with a
//! Bearer token, the v3 JSON media type, and the configured User-Agent.
//! Non-2xx responses are returned as data, not errors; only a failure to
//! complete the request at all is a [`TransportError`].

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;

use super::transport::{ContentTransport, Response, TransportError, WritePayload};
use crate::config::GitHubConfig;

const GITHUB_V3_JSON: &str = "application/vnd.github.v3+json";

pub struct GitHubTransport {
    client: Client,
    api_base: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubTransport {
    pub fn new(config: &GitHubConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token: config.token.clone(),
        })
    }

    pub fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            self.owner,
            self.repo,
            path.trim_start_matches('/')
        )
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = request
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_V3_JSON)
            .send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(Response { status, body })
    }
}

impl ContentTransport for GitHubTransport {
    fn get(&self, path: &str) -> Result<Response, TransportError> {
        let url = self.contents_url(path);
        tracing::debug!(%url, "GET contents");
        self.send(self.client.get(&url))
    }

    fn put(&self, path: &str, payload: &WritePayload) -> Result<Response, TransportError> {
        let url = self.contents_url(path);
        tracing::debug!(%url, update = payload.sha.is_some(), "PUT contents");
        self.send(self.client.put(&url).json(payload))
    }
}
