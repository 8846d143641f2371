/// Backend Client: the only caller of the external user API.
///
/// Authenticated requests carry `Authorization: Bearer <access>`. A 401 triggers
/// exactly one refresh and one replay; a second failure ends the session.
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::backend::session::AuthSession;
use crate::quiz::models::FormValues;

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const LOGIN_PATH: &str = "/auth/login-custom/";
pub const REGISTER_PATH: &str = "/auth/register/";
pub const LOGOUT_PATH: &str = "/auth/logout/";
pub const REFRESH_PATH: &str = "/token/refresh/";
pub const PROFILE_PATH: &str = "/auth/profile/";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Session expired")]
    AuthExpired,

    #[error("Session store error: {0}")]
    Store(anyhow::Error),
}

#[derive(Debug, Deserialize)]
struct LoginTokens {
    access: String,
    refresh: String,
    #[serde(default)]
    user: Value,
}

#[derive(Debug, Deserialize)]
struct RefreshedTokens {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

pub struct BackendClient {
    http: Client,
    base_url: String,
    session: Arc<AuthSession>,
    /// Serializes refreshes so concurrent 401s spend one refresh token.
    refresh_lock: Mutex<()>,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, session: Arc<AuthSession>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Loads persisted credentials and checks them once against the profile
    /// endpoint. Expired credentials are dropped; network failures keep them.
    pub async fn init(&self) -> Result<(), BackendError> {
        self.session.load().await.map_err(BackendError::Store)?;
        if !self.session.is_authenticated() {
            debug!("No persisted backend session");
            return Ok(());
        }

        match self.profile().await {
            Ok(_) => {
                info!("Restored backend session");
                Ok(())
            }
            Err(BackendError::AuthExpired) => {
                info!("Persisted backend session expired, cleared");
                Ok(())
            }
            Err(BackendError::Http(e)) => {
                warn!("Backend unreachable, keeping persisted session: {e}");
                Ok(())
            }
            Err(BackendError::Api { status, message }) => {
                warn!(status, "Profile check failed, keeping persisted session: {message}");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Authenticated request. Returns the decoded JSON body (`Null` when empty).
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, BackendError> {
        let token = self.session.access_token();
        let response = self.dispatch(&method, path, body, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return decode(response).await;
        }

        debug!(path, "Backend answered 401, refreshing once");
        if !self.refresh_after(token.as_deref()).await? {
            self.expire().await?;
            return Err(BackendError::AuthExpired);
        }

        let token = self.session.access_token();
        let response = self.dispatch(&method, path, body, token.as_deref()).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(path, "Replay after refresh still unauthorized");
            self.expire().await?;
            return Err(BackendError::AuthExpired);
        }
        decode(response).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Value, BackendError> {
        let body = json!({ "email": email, "password": password });
        let tokens: LoginTokens = self.send_public(LOGIN_PATH, &body).await?;
        self.start_session(tokens).await
    }

    /// Sends every text field of the form as-is.
    pub async fn register(&self, form: &FormValues) -> Result<Value, BackendError> {
        let body: Map<String, Value> = form
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_text()
                    .map(|text| (key.clone(), Value::String(text.to_string())))
            })
            .collect();
        let tokens: LoginTokens = self.send_public(REGISTER_PATH, &Value::Object(body)).await?;
        self.start_session(tokens).await
    }

    /// Best-effort remote logout; local state is cleared regardless.
    pub async fn logout(&self) -> Result<(), BackendError> {
        let state = self.session.snapshot();
        if let (Some(access), Some(refresh)) = (state.access_token, state.refresh_token) {
            let body = json!({ "refresh": refresh });
            match self
                .dispatch(&Method::POST, LOGOUT_PATH, Some(&body), Some(&access))
                .await
            {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => warn!(status = response.status().as_u16(), "Remote logout rejected"),
                Err(e) => warn!("Remote logout failed: {e}"),
            }
        }
        self.expire().await?;
        info!("Backend session cleared");
        Ok(())
    }

    /// Explicit refresh. A rejected refresh token ends the session.
    pub async fn refresh(&self) -> Result<(), BackendError> {
        let refreshed = {
            let _guard = self.refresh_lock.lock().await;
            self.request_refresh().await?
        };
        if refreshed {
            Ok(())
        } else {
            self.expire().await?;
            Err(BackendError::AuthExpired)
        }
    }

    pub async fn profile(&self) -> Result<Value, BackendError> {
        let user = self.send(Method::GET, PROFILE_PATH, None).await?;
        self.session
            .store_user(user.clone())
            .await
            .map_err(BackendError::Store)?;
        Ok(user)
    }

    async fn start_session(&self, tokens: LoginTokens) -> Result<Value, BackendError> {
        self.session
            .store_login(tokens.access, tokens.refresh, tokens.user.clone())
            .await
            .map_err(BackendError::Store)?;
        Ok(tokens.user)
    }

    /// Unauthenticated POST whose 401 is a plain rejection, not an expiry.
    async fn send_public<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, BackendError> {
        let response = self.dispatch(&Method::POST, path, Some(body), None).await?;
        let value = decode(response).await?;
        serde_json::from_value(value).map_err(|e| BackendError::Api {
            status: StatusCode::BAD_GATEWAY.as_u16(),
            message: format!("Unexpected response from {path}: {e}"),
        })
    }

    /// Refreshes unless another task already replaced the `stale` token.
    async fn refresh_after(&self, stale: Option<&str>) -> Result<bool, BackendError> {
        let _guard = self.refresh_lock.lock().await;
        let current = self.session.access_token();
        if current.is_some() && current.as_deref() != stale {
            return Ok(true);
        }
        self.request_refresh().await
    }

    async fn request_refresh(&self) -> Result<bool, BackendError> {
        let Some(refresh) = self.session.refresh_token() else {
            return Ok(false);
        };

        let body = json!({ "refresh": refresh });
        let response = self
            .dispatch(&Method::POST, REFRESH_PATH, Some(&body), None)
            .await?;
        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "Token refresh rejected");
            return Ok(false);
        }

        let tokens: RefreshedTokens = match response.json().await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!("Token refresh returned an unreadable body: {e}");
                return Ok(false);
            }
        };
        self.session
            .store_tokens(tokens.access, tokens.refresh)
            .await
            .map_err(BackendError::Store)?;
        debug!("Access token refreshed");
        Ok(true)
    }

    async fn expire(&self) -> Result<(), BackendError> {
        self.session.clear().await.map_err(BackendError::Store)
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Response, BackendError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }
}

async fn decode(response: Response) -> Result<Value, BackendError> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(&text).map_err(|e| BackendError::Api {
            status: StatusCode::BAD_GATEWAY.as_u16(),
            message: format!("Backend returned invalid JSON: {e}"),
        });
    }

    Err(BackendError::Api {
        status: status.as_u16(),
        message: error_message(status, &text),
    })
}

/// `detail`, `error` or `message` when present, else the field errors joined.
fn error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("Backend request failed")
            .to_string()
    };
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return if body.trim().is_empty() {
            fallback()
        } else {
            body.trim().to_string()
        };
    };

    for key in ["detail", "error", "message"] {
        if let Some(Value::String(text)) = map.get(key) {
            return text.clone();
        }
    }

    let fields: Vec<String> = map
        .iter()
        .filter_map(|(field, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => return None,
            };
            (!text.is_empty()).then(|| format!("{field}: {text}"))
        })
        .collect();

    if fields.is_empty() {
        fallback()
    } else {
        fields.join("; ")
    }
}
