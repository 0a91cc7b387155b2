//! PIPO API client implementation

use crate::{
    config::{ClientConfig, ConfigError},
    error::ApiError,
    refresh::{RefreshCoordinator, RefreshOutcome},
    request::{ApiRequest, LOGIN_PATH, REFRESH_PATH},
};
use futures::FutureExt;
use pipo_console_core::{LoginResponse, SessionStore, TokenPair, UserProfile};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Authenticated client for the PIPO API
///
/// Attaches the stored access token to every request. A `401` triggers one
/// shared token refresh and a single resend; if the refresh fails the
/// session is cleared and the caller gets the refresh error.
///
/// Clones share the HTTP connection pool, the session and the refresh slot.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: Client,
    base_url: String,
    session: SessionStore,
    refresh: RefreshCoordinator,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    /// Create a client from environment configuration
    ///
    /// The session lives in `PIPO_SESSION_FILE` when set, in memory otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the environment holds invalid values
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = ClientConfig::from_env()?;
        let session = config.session_store();
        Self::new(&config, session)
    }

    /// Create a client for `config` backed by `session`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid or the HTTP
    /// client cannot be built
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: config.base_url.clone(),
                session,
                refresh: RefreshCoordinator::new(),
            }),
        })
    }

    /// Session this client reads tokens from
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Number of token refreshes started by this client and its clones
    #[must_use]
    pub fn refreshes_started(&self) -> u64 {
        self.inner.refresh.started()
    }

    /// Log in and store the resulting session
    ///
    /// The login call never triggers a token refresh: bad credentials fail
    /// with `ApiError::Unauthorized`.
    ///
    /// # Errors
    ///
    /// Returns errors for rejected credentials, network failures, malformed
    /// responses, or a session write failure
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ApiError> {
        let response = self
            .inner
            .http
            .post(self.inner.url(LOGIN_PATH))
            .json(&Credentials { email, password })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let login: LoginResponse = decode(check(response).await?).await?;
        self.inner
            .session
            .set_session(&login.access_token, &login.refresh_token, &login.user)?;

        tracing::info!(user_id = %login.user.id, role = %login.user.role, "Logged in");
        Ok(login.user)
    }

    /// Forget the stored session
    ///
    /// # Errors
    ///
    /// Returns error if the session could not be cleared
    pub fn logout(&self) -> Result<(), ApiError> {
        self.inner.session.clear()?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Send `request` and decode the JSON response
    ///
    /// # Errors
    ///
    /// Returns errors from [`send`](Self::send), or `ApiError::Decode` if the
    /// body is not the expected JSON
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        decode(self.send(request).await?).await
    }

    /// Send `request`, discarding the response body
    ///
    /// # Errors
    ///
    /// Returns errors from [`send`](Self::send)
    pub async fn send_empty(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.send(request).await.map(drop)
    }

    /// Send `request` with the stored access token
    ///
    /// A `401` on a first attempt (outside the refresh endpoint) refreshes the
    /// tokens and resends once. If the stored token changed while the request
    /// was in flight, the resend uses it without another refresh. Every other
    /// failure is returned as is.
    ///
    /// # Errors
    ///
    /// - `ApiError::Network` if no response arrived
    /// - `ApiError::Unauthorized` for a `401` that cannot be recovered
    /// - `ApiError::MissingCredential` or `ApiError::RefreshFailed` if the
    ///   refresh failed; the session has been cleared
    /// - `ApiError::Api` for any other error status
    pub async fn send(&self, mut request: ApiRequest) -> Result<Response, ApiError> {
        let sent_token = self.inner.session.access_token();
        let response = self.inner.dispatch(&request, sent_token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED
            || request.is_retry()
            || request.targets_refresh()
        {
            return check(response).await;
        }

        request.mark_retry();

        // A refresh that settled while this request was in flight already
        // replaced the rejected token.
        let access_token = match self.inner.session.access_token() {
            Some(current) if sent_token.as_deref() != Some(current.as_str()) => {
                tracing::debug!(
                    method = %request.method(),
                    path = request.path(),
                    "Access token already refreshed, resending"
                );
                current
            }
            _ => {
                tracing::debug!(
                    method = %request.method(),
                    path = request.path(),
                    "Access token rejected, refreshing"
                );
                let inner = Arc::clone(&self.inner);
                self.inner
                    .refresh
                    .obtain(move || async move { inner.refresh_tokens().await }.boxed())
                    .await?
            }
        };

        let response = self.inner.dispatch(&request, Some(&access_token)).await?;
        check(response).await
    }
}

impl Inner {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response, ApiError> {
        tracing::debug!(
            method = %request.method(),
            path = request.path(),
            retry = request.is_retry(),
            "Sending request"
        );

        let mut builder = self
            .http
            .request(request.method().clone(), self.url(request.path()));
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    // Any failure here ends the session.
    async fn refresh_tokens(&self) -> RefreshOutcome {
        let outcome = self.exchange_refresh_token().await;
        match &outcome {
            Ok(_) => tracing::info!("Access token refreshed"),
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, clearing session");
                if let Err(clear_error) = self.session.clear() {
                    tracing::warn!(error = %clear_error, "Failed to clear session");
                }
            }
        }
        outcome
    }

    async fn exchange_refresh_token(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.session.refresh_token() else {
            return Err(ApiError::MissingCredential);
        };

        let request = ApiRequest::post(REFRESH_PATH).with_json(&RefreshBody {
            refresh_token: &refresh_token,
        })?;
        let response = self.dispatch(&request, None).await.map_err(|e| match e {
            ApiError::Network(message) => ApiError::RefreshFailed(message),
            other => other,
        })?;

        let tokens: TokenPair = match check(response).await {
            Ok(response) => decode(response)
                .await
                .map_err(|e| ApiError::RefreshFailed(e.to_string()))?,
            Err(e) => return Err(ApiError::RefreshFailed(e.to_string())),
        };

        self.session
            .set_tokens(&tokens.access_token, &tokens.refresh_token)?;
        Ok(tokens.access_token)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("session", &self.inner.session)
            .field("refresh", &self.inner.refresh)
            .finish_non_exhaustive()
    }
}

/// Turn an error status into an `ApiError`, passing successes through.
async fn check(response: Response) -> Result<Response, ApiError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        status => {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            })
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

/// The server reports failures as `{"error": "..."}`; anything else is kept
/// verbatim.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body).map_or_else(|_| body.trim().to_string(), |b| b.error)
}
