//! HTTP client for the backend API.
//!
//! Dispatched operations treat any HTTP status as data: the reply body is
//! read and handed to the classifier even on 4xx/5xx. Only transport-level
//! failures surface as errors. The typed helpers for `/status` and
//! `/workers/{name}` are stricter and reject non-2xx replies.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::types::StatusSnapshot;

/// Generous default; range scans with service probing can run for minutes.
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        BackendConfig {
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend base URL is empty")]
    BaseUrlMissing,
    #[error("invalid request path")]
    InvalidPath,
    #[error("request failed: {message}")]
    Request { message: String },
    #[error("failed reading response body: {message}")]
    Read { message: String },
    #[error("backend returned {status}: {body}")]
    Http { status: StatusCode, body: String },
    #[error("failed decoding response: {message}")]
    Decode { message: String },
}

/// Raw reply of a dispatched operation.
#[derive(Debug, Clone)]
pub struct BackendReply {
    pub status: u16,
    pub ok: bool,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Backend {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl Backend {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let base_url = normalize_base_url(&config.base_url)?;
        Ok(Backend {
            base_url,
            timeout: Duration::from_millis(config.timeout_ms.max(250)),
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join a catalog path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> Option<String> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('/') {
            Some(format!("{}{}", self.base_url, trimmed))
        } else {
            Some(format!("{}/{}", self.base_url, trimmed))
        }
    }

    /// `/workers/{name}` with the worker name percent-encoded as one segment.
    fn worker_url(&self, name: &str) -> Result<reqwest::Url, BackendError> {
        let mut url =
            reqwest::Url::parse(&self.base_url).map_err(|_| BackendError::InvalidPath)?;
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidPath)?
            .push("workers")
            .push(name);
        Ok(url)
    }

    /// Dispatch a GET operation. Query pairs keep their given order; an empty
    /// set means no query string at all.
    pub async fn get_operation(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<BackendReply, BackendError> {
        let url = self.endpoint(path).ok_or(BackendError::InvalidPath)?;
        let mut request = self.http.get(&url).timeout(self.timeout);
        if !query.is_empty() {
            request = request.query(query);
        }
        read_reply(request.send().await).await
    }

    /// Dispatch a POST operation with a JSON body.
    pub async fn post_operation(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<BackendReply, BackendError> {
        let url = self.endpoint(path).ok_or(BackendError::InvalidPath)?;
        let request = self.http.post(&url).timeout(self.timeout).json(body);
        read_reply(request.send().await).await
    }

    /// Fetch and decode the aggregate status snapshot.
    pub async fn fetch_status(&self) -> Result<StatusSnapshot, BackendError> {
        let url = self.endpoint("/status").ok_or(BackendError::InvalidPath)?;
        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(request_error)?;
        decode_json(response).await
    }

    /// Set one worker's desired running state.
    pub async fn set_worker(&self, name: &str, enabled: bool) -> Result<(), BackendError> {
        let url = self.worker_url(name)?;
        let response = self
            .http
            .post(url)
            .timeout(self.timeout)
            .json(&serde_json::json!({ "enabled": enabled }))
            .send()
            .await
            .map_err(request_error)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| BackendError::Read {
                message: error.to_string(),
            })?;
        if !status.is_success() {
            return Err(BackendError::Http { status, body });
        }
        Ok(())
    }
}

fn request_error(error: reqwest::Error) -> BackendError {
    BackendError::Request {
        message: error.to_string(),
    }
}

async fn read_reply(
    sent: Result<reqwest::Response, reqwest::Error>,
) -> Result<BackendReply, BackendError> {
    let response = sent.map_err(request_error)?;
    let status = response.status();
    let body = response.text().await.map_err(|error| BackendError::Read {
        message: error.to_string(),
    })?;
    Ok(BackendReply {
        status: status.as_u16(),
        ok: status.is_success(),
        body,
    })
}

async fn decode_json<T>(response: reqwest::Response) -> Result<T, BackendError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|error| BackendError::Read {
            message: error.to_string(),
        })?;
    if !status.is_success() {
        return Err(BackendError::Http {
            status,
            body: String::from_utf8_lossy(&bytes).trim().to_string(),
        });
    }
    serde_json::from_slice::<T>(&bytes).map_err(|error| BackendError::Decode {
        message: error.to_string(),
    })
}

fn normalize_base_url(base_url: &str) -> Result<String, BackendError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(BackendError::BaseUrlMissing);
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> Backend {
        Backend::new(BackendConfig::new(base)).unwrap()
    }

    #[test]
    fn endpoint_builder_normalizes_paths() {
        let client = backend("http://127.0.0.1:8000/");
        assert_eq!(
            client.endpoint("/network/ports"),
            Some("http://127.0.0.1:8000/network/ports".to_string())
        );
        assert_eq!(
            client.endpoint("network/ports"),
            Some("http://127.0.0.1:8000/network/ports".to_string())
        );
        assert_eq!(client.endpoint(""), None);
        assert_eq!(client.endpoint("  "), None);
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(matches!(
            Backend::new(BackendConfig::new("   ")),
            Err(BackendError::BaseUrlMissing)
        ));
    }

    #[test]
    fn worker_url_percent_encodes_the_name() {
        let client = backend("http://127.0.0.1:8000");
        let url = client.worker_url("spacy nlp/alpha").unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/workers/spacy%20nlp%2Falpha"
        );
        let plain = client.worker_url("llm_updater").unwrap();
        assert_eq!(plain.as_str(), "http://127.0.0.1:8000/workers/llm_updater");
    }
}
