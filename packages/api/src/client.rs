//! # Wire protocol client for the sync/auth server
//!
//! All reads and writes of the remote collection go through the
//! [`SyncTransport`] trait, so the controller logic works against the real
//! HTTP server or an in-memory fake in tests.
//!
//! ## Endpoints
//!
//! | Operation | Route | Body / response |
//! |-----------|-------|-----------------|
//! | [`register`](SyncTransport::register) | `POST /auth/register` | `{email,password,username}` → `{user:{id,email,username,token}}` |
//! | [`login`](SyncTransport::login) | `POST /auth/login` | `{email,password}` → `{user:{...,token}}` |
//! | [`push`](SyncTransport::push) | `POST /sync/upload` | `{subscriptions:[...]}` → `{message}` |
//! | [`pull`](SyncTransport::pull) | `GET /sync/download` | → `{subscriptions:[...]}` |
//!
//! `push` and `pull` carry the session token as `Authorization: Bearer`.
//! A push replaces the entire remote collection and is idempotent; a pull
//! returns the remote collection verbatim.
//!
//! ## Status mapping
//!
//! 400/401/403 become [`SyncError::Auth`] with the server's `{message}` so an
//! expired token is distinguishable from an unreachable server; everything
//! else transport-shaped becomes [`SyncError::Network`].

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use store::{Session, Subscription};

use crate::error::SyncError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Async trait for the four remote operations.
pub trait SyncTransport {
    fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> impl Future<Output = Result<Session, SyncError>> + Send;

    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, SyncError>> + Send;

    /// Replace the entire remote collection with `subscriptions`.
    fn push(
        &self,
        subscriptions: &[Subscription],
        token: &str,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Fetch the remote collection verbatim.
    fn pull(&self, token: &str) -> impl Future<Output = Result<Vec<Subscription>, SyncError>> + Send;
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    username: &'a str,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct UploadRequest<'a> {
    subscriptions: &'a [Subscription],
}

#[derive(Deserialize)]
struct AuthResponse {
    user: UserPayload,
}

/// Profile fields the server returns on register/login.
#[derive(Deserialize)]
struct UserPayload {
    id: String,
    email: String,
    username: String,
    token: String,
}

#[derive(Deserialize)]
struct DownloadResponse {
    subscriptions: Vec<Subscription>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl UserPayload {
    fn into_session(self) -> Session {
        Session {
            id: self.id,
            email: self.email,
            username: self.username,
            token: self.token,
            created_at: Utc::now(),
            last_sync: None,
        }
    }
}

/// HTTP implementation of [`SyncTransport`] against a configured base URL.
#[derive(Clone, Debug)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &store::SubwatchConfig) -> Self {
        Self::new(config.api.base_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Map an error status to the sync taxonomy, reading `{message}` when the
/// server reported one.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if matches!(status.as_u16(), 400 | 401 | 403) {
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| status.to_string());
        return Err(SyncError::Auth(message));
    }
    Err(match response.error_for_status() {
        Err(err) => SyncError::Network(err),
        Ok(response) => SyncError::Auth(response.status().to_string()),
    })
}

impl SyncTransport for HttpClient {
    async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Session, SyncError> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .timeout(REQUEST_TIMEOUT)
            .json(&RegisterRequest {
                email,
                password,
                username,
            })
            .send()
            .await?;
        let body: AuthResponse = check(response).await?.json().await?;
        Ok(body.user.into_session())
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session, SyncError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .timeout(REQUEST_TIMEOUT)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let body: AuthResponse = check(response).await?.json().await?;
        Ok(body.user.into_session())
    }

    async fn push(&self, subscriptions: &[Subscription], token: &str) -> Result<(), SyncError> {
        let response = self
            .http
            .post(self.url("/sync/upload"))
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(token)
            .json(&UploadRequest { subscriptions })
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn pull(&self, token: &str) -> Result<Vec<Subscription>, SyncError> {
        let response = self
            .http
            .get(self.url("/sync/download"))
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(token)
            .send()
            .await?;
        let body: DownloadResponse = check(response).await?.json().await?;
        Ok(body.subscriptions)
    }
}
