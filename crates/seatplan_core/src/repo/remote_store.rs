//! Remote document store over HTTP.
//!
//! # Responsibility
//! - GET the latest export document from a configured endpoint.
//! - POST the full export document (with preferences) back to it.
//!
//! # Invariants
//! - An empty or student-less response is "no data", not an error.
//! - Saves succeed only when the endpoint answers `{"status":"success"}`.
//! - Blocking client; no async runtime is required.

use crate::model::state::{AppState, DisplayPrefs};
use crate::repo::snapshot::{decode_remote_document, encode_export_document};
use crate::repo::state_repo::{RepoError, RepoResult, StateRepository, StateSnapshot};
use chrono::Utc;
use log::{error, info};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStoreConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl RemoteStoreConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn validate(&self) -> RepoResult<()> {
        let endpoint = self.endpoint.trim();
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Ok(())
        } else {
            Err(RepoError::NotConfigured(format!(
                "remote endpoint must be an http(s) URL, got `{endpoint}`"
            )))
        }
    }
}

/// Remote store client.
pub struct RemoteStore {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl RemoteStore {
    pub fn new(config: RemoteStoreConfig) -> RepoResult<Self> {
        config.validate()?;
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("seatplan/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|err| RepoError::Transport(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            endpoint: config.endpoint.trim().to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn get_text(&self) -> RepoResult<String> {
        let resp = self
            .http
            .get(&self.endpoint)
            .send()
            .map_err(|err| RepoError::Transport(err.to_string()))?;
        read_success_body(resp)
    }

    fn post_text(&self, body: String) -> RepoResult<String> {
        let resp = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body)
            .send()
            .map_err(|err| RepoError::Transport(err.to_string()))?;
        read_success_body(resp)
    }
}

fn read_success_body(resp: reqwest::blocking::Response) -> RepoResult<String> {
    let status = resp.status();
    let body = resp
        .text()
        .map_err(|err| RepoError::Transport(err.to_string()))?;
    if !status.is_success() {
        return Err(RepoError::Transport(format!(
            "HTTP {}: {}",
            status.as_u16(),
            body.trim()
        )));
    }
    Ok(body)
}

/// Interprets a GET body; `Ok(None)` means the remote holds no roster.
pub fn parse_remote_load(body: &str) -> RepoResult<Option<StateSnapshot>> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|err| RepoError::Malformed(format!("remote document: {err}")))?;
    let has_students = value
        .get("students")
        .map(|students| !students.is_null())
        .unwrap_or(false);
    if !has_students {
        return Ok(None);
    }
    decode_remote_document(value).map(Some)
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Interprets a POST reply.
pub fn parse_remote_save_response(body: &str) -> RepoResult<()> {
    let reply: SaveResponse = serde_json::from_str(body.trim())
        .map_err(|err| RepoError::Malformed(format!("remote save reply: {err}")))?;
    if reply.status.as_deref() == Some("success") {
        return Ok(());
    }
    Err(RepoError::Remote(reply.message.unwrap_or_else(|| {
        format!(
            "unexpected status `{}`",
            reply.status.as_deref().unwrap_or("missing")
        )
    })))
}

impl StateRepository for RemoteStore {
    fn backend(&self) -> &'static str {
        "remote"
    }

    fn load(&self) -> RepoResult<Option<StateSnapshot>> {
        let result = self.get_text().and_then(|body| parse_remote_load(&body));
        match &result {
            Ok(found) => info!(
                "event=remote_load module=repo status=ok found={}",
                found.is_some()
            ),
            Err(err) => error!(
                "event=remote_load module=repo status=error error_code={} error={}",
                err.code(),
                err
            ),
        }
        result
    }

    fn save(&self, state: &AppState, prefs: &DisplayPrefs) -> RepoResult<()> {
        let body = encode_export_document(state, Some(prefs), Utc::now())?;
        let result = self
            .post_text(body)
            .and_then(|reply| parse_remote_save_response(&reply));
        match &result {
            Ok(()) => info!(
                "event=remote_save module=repo status=ok students={}",
                state.students.len()
            ),
            Err(err) => error!(
                "event=remote_save module=repo status=error error_code={} error={}",
                err.code(),
                err
            ),
        }
        result
    }
}
