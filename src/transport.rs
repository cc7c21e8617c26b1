//! HTTP transport for the job-control API.
//!
//! All network traffic flows through the [`ApiTransport`] trait so tests can
//! substitute a scripted implementation for the real server. Requests are
//! sent exactly once; callers decide whether a failed call is worth retrying.

use crate::auth::ResolvedAuth;
use crate::error::{KilnLinkError, Result};
use crate::models::UploadFile;
use crate::timeouts::KilnLinkTimeouts;
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value as JsonValue;
use std::time::Instant;

/// HTTP method for an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Patch => write!(f, "PATCH"),
        }
    }
}

/// One request against the job-control API.
///
/// `path` is relative to the client's base URL, e.g. `/training-jobs/7/logs`.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<JsonValue>,
    pub files: Vec<UploadFile>,
}

impl ApiRequest {
    /// Build a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
            files: Vec::new(),
        }
    }

    /// Build a POST request with no body.
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: None,
            files: Vec::new(),
        }
    }

    /// Build a PATCH request with no body.
    pub fn patch(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Patch,
            path: path.into(),
            body: None,
            files: Vec::new(),
        }
    }

    /// Build a multipart POST carrying the given files.
    pub fn post_multipart(path: impl Into<String>, files: Vec<UploadFile>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: None,
            files,
        }
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// True when this request uploads files and must be sent as multipart.
    pub fn is_multipart(&self) -> bool {
        !self.files.is_empty()
    }
}

/// Abstraction over the wire so callers never touch HTTP directly.
///
/// The production implementation is [`HttpTransport`]; tests use scripted
/// implementations that answer from canned payloads.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Send one request and return the decoded JSON response body.
    ///
    /// Success responses with an empty body decode to `JsonValue::Null`.
    async fn execute(&self, request: ApiRequest) -> Result<JsonValue>;
}

/// Production transport backed by a reqwest connection pool.
pub struct HttpTransport {
    base_url: String,
    http_client: reqwest::Client,
    auth: ResolvedAuth,
    timeouts: KilnLinkTimeouts,
}

impl HttpTransport {
    pub(crate) fn new(
        base_url: String,
        http_client: reqwest::Client,
        auth: ResolvedAuth,
        timeouts: KilnLinkTimeouts,
    ) -> Self {
        Self {
            base_url,
            http_client,
            auth,
            timeouts,
        }
    }

    fn build_multipart_form(files: &[UploadFile]) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let mut part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
                .file_name(file.file_name.clone());
            if let Some(content_type) = &file.content_type {
                part = part.mime_str(content_type).map_err(|e| {
                    KilnLinkError::UploadError(format!(
                        "Invalid content type \"{}\" for {}: {}",
                        content_type, file.file_name, e
                    ))
                })?;
            }
            form = form.part("files", part);
        }
        Ok(form)
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<JsonValue> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!("[LINK_HTTP] Sending {} to {}", request.method, url);

        let mut req_builder = match request.method {
            HttpMethod::Get => self.http_client.get(&url),
            HttpMethod::Post => self.http_client.post(&url),
            HttpMethod::Patch => self.http_client.patch(&url),
        };

        // Uploads carry larger bodies and get the longer window.
        let timeout = if request.is_multipart() {
            self.timeouts.upload_timeout
        } else {
            self.timeouts.request_timeout
        };
        if !KilnLinkTimeouts::is_no_timeout(timeout) {
            req_builder = req_builder.timeout(timeout);
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.json(body);
        }
        if request.is_multipart() {
            req_builder = req_builder.multipart(Self::build_multipart_form(&request.files)?);
        }

        // Apply authentication, resolving dynamic providers per request
        let auth = self.auth.resolve().await?;
        req_builder = auth.apply_to_request(req_builder)?;

        let start = Instant::now();
        match req_builder.send().await {
            Ok(response) => {
                let duration_ms = start.elapsed().as_millis();
                let status = response.status();
                debug!(
                    "[LINK_HTTP] Response received: status={} duration_ms={}",
                    status, duration_ms
                );

                if status.is_success() {
                    let text = response.text().await?;
                    if text.is_empty() {
                        return Ok(JsonValue::Null);
                    }
                    Ok(serde_json::from_str(&text)?)
                } else {
                    let reason = status.canonical_reason().unwrap_or("Unknown error");
                    let body_text = response.text().await.unwrap_or_default();
                    let message = if body_text.is_empty() {
                        reason.to_string()
                    } else {
                        format!("{}: {}", reason, body_text)
                    };

                    warn!(
                        "[LINK_HTTP] Server error: status={} message=\"{}\" duration_ms={}",
                        status, message, duration_ms
                    );

                    Err(KilnLinkError::ServerError {
                        status_code: status.as_u16(),
                        message,
                    })
                }
            }
            Err(e) => {
                warn!(
                    "[LINK_HTTP] Request failed: {} duration_ms={}",
                    e,
                    start.elapsed().as_millis()
                );
                Err(e.into())
            }
        }
    }
}
