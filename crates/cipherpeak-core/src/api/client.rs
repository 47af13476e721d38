//! HTTP client for the Cipherpeak REST backend.
//!
//! Every business call goes through the authorization pipeline: read the
//! session credential, attach it as a bearer token, and refresh it first
//! when it has expired. Login, logout, and the refresh exchange itself talk
//! to the backend directly, outside the pipeline.
//!
//! Refreshes are single-flight: when several concurrent requests find the
//! access token expired, one performs the exchange and the rest wait for it,
//! so the backend sees one refresh call per expiry instead of one per
//! request. A failed refresh clears the session and the pending request is
//! still sent with the stale token - the backend's 401 then surfaces through
//! the normal error channel instead of being swallowed here.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use reqwest::{header, Client, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::{expiry, SessionStore, Subject};
use crate::models::{
    CalendarEvent, ClientRecord, Employee, LeaveApplication, LeaveStatus, LedgerEntry, NewClient,
    NewEmployee, NewEvent, NewLeave, NewLedgerEntry, NewTask, Task, TaskStatus,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

// ============================================================================
// Wire types for the auth endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access: String,
    refresh: String,
    #[serde(flatten)]
    subject: Subject,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    /// Only present when the backend rotates refresh tokens; absent means
    /// "keep using the old one".
    #[serde(default)]
    refresh: Option<String>,
}

/// API client for the Cipherpeak backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling, and clones share the session store and the refresh gate.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
    /// Serializes refresh exchanges across concurrent requests.
    refresh_gate: Arc<tokio::sync::Mutex<()>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            refresh_gate: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// The session store this client reads its credential from.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Log in with username and password, installing the returned credential
    /// into the session store.
    pub async fn login(&self, username: &str, password: &str) -> Result<Subject> {
        let response = self
            .http
            .post(self.url("/auth/login/"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .context("Failed to send login request")?;

        let response = Self::check_response(response).await?;
        let login: LoginResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;

        self.session
            .set_login(login.access, login.refresh, login.subject.clone());
        Ok(login.subject)
    }

    /// Log out: tell the backend, then clear the local session.
    ///
    /// The backend call invalidates the refresh token server-side but is
    /// best-effort - if it fails the local session is cleared anyway.
    pub async fn logout(&self) {
        if let Some(credential) = self.session.get() {
            let result = self
                .http
                .post(self.url("/auth/logout/"))
                .bearer_auth(&credential.access_token)
                .json(&serde_json::json!({ "refresh": credential.refresh_token }))
                .send()
                .await;
            if let Err(err) = result {
                debug!(error = %err, "logout request failed, clearing session anyway");
            }
        }
        self.session.clear();
    }

    // ========================================================================
    // Token refresh
    // ========================================================================

    /// Exchange the refresh token for a new access token.
    ///
    /// Talks to the backend directly - the refresh endpoint must not go back
    /// through the authorization pipeline, which would recurse.
    async fn refresh_exchange(&self, refresh_token: &str) -> Result<RefreshResponse> {
        let response = self
            .http
            .post(self.url("/auth/token/refresh/"))
            .json(&serde_json::json!({ "refresh": refresh_token }))
            .send()
            .await
            .context("Failed to send token refresh request")?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .context("Failed to parse token refresh response")
    }

    /// Run the refresh exchange at most once across concurrent callers.
    ///
    /// Requests that arrive while a refresh is in flight queue on the gate
    /// and find a fresh token already installed when they get through. A
    /// failed exchange clears the session.
    async fn refresh_if_expired(&self) {
        let _guard = self.refresh_gate.lock().await;

        let Some(credential) = self.session.get() else {
            return;
        };
        if !expiry::is_expired(&credential.access_token, Utc::now()) {
            // Refreshed by whoever held the gate before us
            return;
        }

        match self.refresh_exchange(&credential.refresh_token).await {
            Ok(tokens) => {
                debug!("access token refreshed");
                self.session.set_refreshed(tokens.access, tokens.refresh);
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, clearing session");
                self.session.clear();
            }
        }
    }

    /// Resolve the bearer token for an outgoing request, refreshing first
    /// when the current access token has expired.
    ///
    /// `None` means no session is active and the request goes out
    /// unauthenticated. After a failed refresh the stale token is returned
    /// rather than blocking the request: the backend rejects it and the
    /// caller sees the usual 401.
    async fn bearer_token(&self) -> Option<String> {
        let credential = self.session.get()?;
        if !expiry::is_expired(&credential.access_token, Utc::now()) {
            return Some(credential.access_token);
        }

        self.refresh_if_expired().await;

        match self.session.get() {
            Some(fresh) => Some(fresh.access_token),
            None => Some(credential.access_token),
        }
    }

    async fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.bearer_token().await {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    // ========================================================================
    // Request plumbing
    // ========================================================================

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit
    /// (should retry), or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Send an authorized request, retrying rate-limited responses with
    /// exponential backoff. Headers are recomputed per attempt so a token
    /// refreshed between attempts is picked up.
    async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let mut request = self
                .http
                .request(method.clone(), &url)
                .headers(self.auth_headers().await?);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request
                .send()
                .await
                .with_context(|| format!("Failed to send {} request to {}", method, url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = %url, retry = retries, backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<T, serde_json::Value>(Method::GET, path, None)
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// DELETE returns 204 with no body, so it skips the JSON decoding path.
    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        let response = self
            .http
            .delete(&url)
            .headers(self.auth_headers().await?)
            .send()
            .await
            .with_context(|| format!("Failed to send DELETE request to {}", url))?;
        Self::check_response(response).await?;
        Ok(())
    }

    // ========================================================================
    // Employees
    // ========================================================================

    pub async fn fetch_employees(&self) -> Result<Vec<Employee>> {
        self.get("/employees/").await
    }

    pub async fn fetch_employee(&self, id: i64) -> Result<Employee> {
        self.get(&format!("/employees/{}/", id)).await
    }

    pub async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee> {
        self.post("/employees/", employee).await
    }

    pub async fn update_employee(&self, id: i64, employee: &NewEmployee) -> Result<Employee> {
        self.patch(&format!("/employees/{}/", id), employee).await
    }

    pub async fn delete_employee(&self, id: i64) -> Result<()> {
        self.delete(&format!("/employees/{}/", id)).await
    }

    // ========================================================================
    // Clients
    // ========================================================================

    pub async fn fetch_clients(&self) -> Result<Vec<ClientRecord>> {
        self.get("/clients/").await
    }

    pub async fn create_client(&self, client: &NewClient) -> Result<ClientRecord> {
        self.post("/clients/", client).await
    }

    pub async fn delete_client(&self, id: i64) -> Result<()> {
        self.delete(&format!("/clients/{}/", id)).await
    }

    // ========================================================================
    // Tasks
    // ========================================================================

    pub async fn fetch_tasks(&self) -> Result<Vec<Task>> {
        self.get("/tasks/").await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task> {
        self.post("/tasks/", task).await
    }

    pub async fn set_task_status(&self, id: i64, status: TaskStatus) -> Result<Task> {
        self.patch(
            &format!("/tasks/{}/", id),
            &serde_json::json!({ "status": status }),
        )
        .await
    }

    // ========================================================================
    // Calendar events
    // ========================================================================

    /// Fetch events whose span overlaps the given date window.
    pub async fn fetch_events(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CalendarEvent>> {
        self.get(&format!("/events/?start={}&end={}", start, end))
            .await
    }

    pub async fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent> {
        self.post("/events/", event).await
    }

    // ========================================================================
    // Leave applications
    // ========================================================================

    pub async fn fetch_leaves(&self) -> Result<Vec<LeaveApplication>> {
        self.get("/leaves/").await
    }

    pub async fn submit_leave(&self, leave: &NewLeave) -> Result<LeaveApplication> {
        self.post("/leaves/", leave).await
    }

    /// Approve or reject a leave application. The backend enforces that only
    /// admins may do this; the client merely forwards the decision.
    pub async fn set_leave_status(&self, id: i64, status: LeaveStatus) -> Result<LeaveApplication> {
        self.patch(
            &format!("/leaves/{}/", id),
            &serde_json::json!({ "status": status }),
        )
        .await
    }

    // ========================================================================
    // Finance ledger
    // ========================================================================

    pub async fn fetch_ledger(&self) -> Result<Vec<LedgerEntry>> {
        self.get("/finance/records/").await
    }

    pub async fn add_ledger_entry(&self, entry: &NewLedgerEntry) -> Result<LedgerEntry> {
        self.post("/finance/records/", entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_response() {
        let json = r#"{
            "access": "A1",
            "refresh": "R1",
            "user": "employee",
            "user_info": {"id": 7, "username": "alice", "email": "alice@cipherpeak.app"}
        }"#;

        let parsed: LoginResponse = serde_json::from_str(json).expect("login response should parse");
        assert_eq!(parsed.access, "A1");
        assert_eq!(parsed.refresh, "R1");
        assert_eq!(parsed.subject.user, "employee");
        assert_eq!(parsed.subject.user_info.id, 7);
        assert_eq!(parsed.subject.user_info.username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_parse_refresh_response_with_rotation() {
        let parsed: RefreshResponse =
            serde_json::from_str(r#"{"access": "A2", "refresh": "R2"}"#).unwrap();
        assert_eq!(parsed.access, "A2");
        assert_eq!(parsed.refresh.as_deref(), Some("R2"));
    }

    #[test]
    fn test_parse_refresh_response_without_rotation() {
        let parsed: RefreshResponse = serde_json::from_str(r#"{"access": "A2"}"#).unwrap();
        assert_eq!(parsed.access, "A2");
        assert!(parsed.refresh.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_is_stripped() {
        let session = Arc::new(SessionStore::new(std::env::temp_dir()));
        let client = ApiClient::new("https://api.example.com/", session).unwrap();
        assert_eq!(client.url("/tasks/"), "https://api.example.com/tasks/");
    }
}
