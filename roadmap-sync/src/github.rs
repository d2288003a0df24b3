//! GitHub REST implementation of [`RemoteClient`].
//!
//! - `GET   /repos/{owner}/{repo}`         → description + topics
//! - `PATCH /repos/{owner}/{repo}`         ← `{"description": …}`
//! - `PUT   /repos/{owner}/{repo}/topics`  ← `{"names": […]}`

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Deserialize;

use roadmap_core::types::RepoRef;
use roadmap_renderer::RemoteMetadata;

use crate::error::RemoteError;
use crate::remote::RemoteClient;

/// User-Agent header required by the GitHub API.
const USER_AGENT: &str = concat!("roadmap/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// Fields of `GET /repos/{owner}/{repo}` we care about.
#[derive(Debug, Deserialize)]
struct RepoResponse {
    description: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
}

pub struct GithubClient {
    agent: ureq::Agent,
    api_base: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(api_base: &str, token: Option<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        GithubClient {
            agent,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn repo_url(&self, repo: &RepoRef) -> String {
        format!("{}/repos/{}", self.api_base, repo.0)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let req = self
            .agent
            .request(method, url)
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", API_VERSION);
        match &self.token {
            Some(token) => req.set("Authorization", &format!("Bearer {token}")),
            None => req,
        }
    }
}

impl RemoteClient for GithubClient {
    fn fetch(&self, repo: &RepoRef) -> Result<RemoteMetadata, RemoteError> {
        tracing::debug!("GET {}", self.repo_url(repo));
        let response = self
            .request("GET", &self.repo_url(repo))
            .call()
            .map_err(|e| map_error(repo, e))?;
        let body: RepoResponse = response
            .into_json()
            .map_err(|e| RemoteError::Parse(e.to_string()))?;
        Ok(RemoteMetadata {
            description: body.description.unwrap_or_default(),
            topics: body.topics,
        })
    }

    fn update_description(&self, repo: &RepoRef, description: &str) -> Result<(), RemoteError> {
        tracing::debug!("PATCH {}", self.repo_url(repo));
        self.request("PATCH", &self.repo_url(repo))
            .send_json(serde_json::json!({ "description": description }))
            .map_err(|e| map_error(repo, e))?;
        Ok(())
    }

    fn replace_topics(&self, repo: &RepoRef, topics: &[String]) -> Result<(), RemoteError> {
        let url = format!("{}/topics", self.repo_url(repo));
        tracing::debug!("PUT {url}");
        self.request("PUT", &url)
            .send_json(serde_json::json!({ "names": topics }))
            .map_err(|e| map_error(repo, e))?;
        Ok(())
    }
}

fn map_error(repo: &RepoRef, error: ureq::Error) -> RemoteError {
    match error {
        ureq::Error::Status(401, _) => RemoteError::Unauthorized,
        ureq::Error::Status(404, _) => RemoteError::NotFound { repo: repo.0.clone() },
        ureq::Error::Status(429, resp) => RemoteError::RateLimited {
            retry_after: throttle_hint(&resp).or(Some(Duration::from_secs(60))),
        },
        ureq::Error::Status(403, resp) => {
            let exhausted = resp.header("x-ratelimit-remaining") == Some("0");
            let hint = throttle_hint(&resp);
            if exhausted || resp.header("retry-after").is_some() {
                RemoteError::RateLimited { retry_after: hint }
            } else {
                RemoteError::Forbidden(resp.into_string().unwrap_or_default())
            }
        }
        ureq::Error::Status(status, resp) => RemoteError::Http {
            status,
            body: resp.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => {
            let message = transport.to_string();
            if message.contains("timed out") || message.contains("timeout") {
                RemoteError::Timeout(message)
            } else {
                RemoteError::Transport(message)
            }
        }
    }
}

/// `Retry-After` seconds, else time until `x-ratelimit-reset`.
fn throttle_hint(resp: &ureq::Response) -> Option<Duration> {
    if let Some(secs) = resp.header("retry-after").and_then(|v| v.trim().parse::<u64>().ok()) {
        return Some(Duration::from_secs(secs));
    }
    let reset = resp
        .header("x-ratelimit-reset")
        .and_then(|v| v.trim().parse::<u64>().ok())?;
    let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some(Duration::from_secs(reset.saturating_sub(now).max(1)))
}
