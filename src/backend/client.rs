//! HTTP client for the timeliner scheduling service
//!
//! Calls are made with the async reqwest client and driven to completion on
//! an owned tokio runtime, so callers see a plain blocking API. Requests use
//! the transport's default timeout and are never retried.

use crate::backend::{BackendResponse, BackendStatus, SchedulingBackend, TaskUpdates};
use crate::core::config::BackendConfig;
use crate::core::error::{Result, SchedulerError};
use crate::core::types::STORAGE_DATE_FORMAT;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use tracing::{error, info, warn};

const AUTH_TOKEN_PATH: &[&str] = &["api", "auth", "token"];
const AUTH_STATUS_PATH: &[&str] = &["api", "auth", "status"];
const CREATE_TASK_PATH: &[&str] = &["api", "timeliner", "task"];
const UPDATE_TASK_PATH: &[&str] = &["api", "timeliner", "task", "update"];
const DELETE_TASK_PATH: &[&str] = &["api", "timeliner", "task", "delete"];

/// Lifetime assumed for a token whose expiry cannot be read
const FALLBACK_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Bearer token and the instant it stops being accepted
#[derive(Debug, Clone, PartialEq)]
pub struct AuthToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// Reply of the auth status endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    #[serde(default)]
    success: bool,
    token: Option<String>,
    expires_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskRequest<'a> {
    task_name: &'a str,
    task_type: &'a str,
    planned_start_date: String,
    planned_end_date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct UpdateTaskRequest<'a> {
    task_name: &'a str,
    updates: UpdatePayload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct UpdatePayload {
    new_name: Option<String>,
    new_start_date: Option<String>,
    new_end_date: Option<String>,
    new_status: Option<BackendStatus>,
}

impl From<&TaskUpdates> for UpdatePayload {
    fn from(updates: &TaskUpdates) -> Self {
        Self {
            new_name: updates.new_name.clone(),
            new_start_date: updates.new_start.map(storage_date),
            new_end_date: updates.new_end.map(storage_date),
            new_status: updates.new_status,
        }
    }
}

fn storage_date(date: NaiveDate) -> String {
    date.format(STORAGE_DATE_FORMAT).to_string()
}

/// Parse a token expiry: RFC 3339 with `Z` or an offset and any fractional
/// precision, or a bare timestamp taken as UTC
pub fn parse_expiry(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn backend_error(e: reqwest::Error) -> SchedulerError {
    SchedulerError::Backend(e.to_string())
}

pub struct HttpBackend {
    runtime: Runtime,
    client: Client,
    base_url: Url,
    token: Option<AuthToken>,
    credentials: Option<(String, String)>,
    refresh_margin: Duration,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SchedulerError::Config(format!("invalid base_url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SchedulerError::Config(format!(
                "base_url cannot carry a path: {}",
                config.base_url
            )));
        }
        Ok(Self {
            runtime: Runtime::new()?,
            client: Client::new(),
            base_url,
            token: None,
            credentials: None,
            refresh_margin: Duration::try_seconds(config.token_refresh_margin_secs.max(0))
                .unwrap_or_else(Duration::zero),
        })
    }

    /// Build an endpoint URL; each segment is percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SchedulerError::Config("base_url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    /// Token present and not within the refresh margin of expiring
    pub fn is_token_valid(&self, now: DateTime<Utc>) -> bool {
        self.token
            .as_ref()
            .is_some_and(|token| now + self.refresh_margin < token.expires_at)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(&token.value),
            None => request,
        }
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.runtime.block_on(async {
            let response = request.send().await.map_err(backend_error)?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SchedulerError::Backend(format!("HTTP {}: {}", status, body)));
            }
            response.json::<T>().await.map_err(backend_error)
        })
    }

    /// Re-authenticate with stored credentials when the token has lapsed
    fn ensure_authenticated(&mut self) -> Result<bool> {
        if self.is_token_valid(Utc::now()) {
            return Ok(true);
        }
        match self.credentials.clone() {
            Some((client_id, client_secret)) => self.authenticate(&client_id, &client_secret),
            None => {
                warn!("Token missing or expired and no credentials stored for re-authentication");
                Ok(false)
            }
        }
    }

    pub fn check_auth_status(&self) -> Result<AuthStatus> {
        let url = self.endpoint(AUTH_STATUS_PATH)?;
        self.send(self.authorized(self.client.get(url)))
    }
}

impl SchedulingBackend for HttpBackend {
    fn authenticate(&mut self, client_id: &str, client_secret: &str) -> Result<bool> {
        let url = self.endpoint(AUTH_TOKEN_PATH)?;
        let request = self.client.post(url).json(&TokenRequest {
            client_id,
            client_secret,
        });
        let reply: TokenResponse = self.send(request)?;

        let token = match (reply.success, reply.token) {
            (true, Some(token)) => token,
            _ => {
                error!("Authentication failed: no success indicator in response");
                return Ok(false);
            }
        };

        let expires_at = match reply.expires_at.as_deref().and_then(parse_expiry) {
            Some(expires_at) => expires_at,
            None => {
                warn!(
                    expires_at = ?reply.expires_at,
                    "Could not parse token expiry, assuming one hour"
                );
                Utc::now() + Duration::seconds(FALLBACK_TOKEN_LIFETIME_SECS)
            }
        };

        info!(%expires_at, "Authenticated with scheduling backend");
        self.token = Some(AuthToken {
            value: token,
            expires_at,
        });
        self.credentials = Some((client_id.to_string(), client_secret.to_string()));
        Ok(true)
    }

    /// Signed in this session; an aged-out token is renewed from the stored
    /// credentials on the next call
    fn is_authenticated(&self) -> bool {
        self.token.is_some() || self.credentials.is_some()
    }

    fn create_task(
        &mut self,
        name: &str,
        task_type: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BackendResponse> {
        if !self.ensure_authenticated()? {
            return Ok(BackendResponse::failed("Not authenticated"));
        }
        let url = self.endpoint(CREATE_TASK_PATH)?;
        let body = CreateTaskRequest {
            task_name: name,
            task_type,
            planned_start_date: storage_date(start),
            planned_end_date: storage_date(end),
        };
        self.send(self.authorized(self.client.post(url).json(&body)))
    }

    fn update_task(&mut self, name: &str, updates: &TaskUpdates) -> Result<BackendResponse> {
        if !self.ensure_authenticated()? {
            return Ok(BackendResponse::failed("Not authenticated"));
        }
        let url = self.endpoint(UPDATE_TASK_PATH)?;
        let body = UpdateTaskRequest {
            task_name: name,
            updates: updates.into(),
        };
        self.send(self.authorized(self.client.put(url).json(&body)))
    }

    fn delete_task(&mut self, name: &str) -> Result<BackendResponse> {
        if !self.ensure_authenticated()? {
            return Ok(BackendResponse::failed("Not authenticated"));
        }
        let mut segments = DELETE_TASK_PATH.to_vec();
        segments.push(name);
        let url = self.endpoint(&segments)?;
        self.send(self.authorized(self.client.delete(url)))
    }
}
