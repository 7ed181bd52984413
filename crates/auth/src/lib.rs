//! Supabase Auth (GoTrue) client
//!
//! Email/password sign up and sign in, sign out, user lookup and token
//! refresh. The client keeps the current session in memory and tells
//! registered listeners whenever it changes.

mod listeners;
mod types;

use log::{debug, info, warn};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

pub use listeners::{AuthChangeEvent, AuthStateHandler, AuthStateListeners, Subscription};
pub use types::{PasswordCredentials, Session, SignUpOutcome, User};

use types::ErrorBody;

const CLIENT_INFO: &str = concat!("supabase-records/", env!("CARGO_PKG_VERSION"));

/// Auth error type
#[derive(Error, Debug)]
pub enum AuthError {
    /// The server rejected the request; `message` is the server's own text
    #[error("{message}")]
    ApiError { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Auth session missing")]
    MissingSession,
}

impl AuthError {
    fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| body.to_string());
        AuthError::ApiError { status, message }
    }

    /// HTTP status of an API rejection
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AuthError::ApiError { status, .. } => Some(*status),
            AuthError::NetworkError(err) => err.status(),
            _ => None,
        }
    }
}

/// Client options
#[derive(Debug, Clone)]
pub struct AuthOptions {
    /// Refresh an expired session on access instead of signing the user out
    pub auto_refresh_token: bool,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            auto_refresh_token: true,
        }
    }
}

/// Auth client
pub struct Auth {
    url: String,
    key: String,
    http_client: Client,
    options: AuthOptions,
    current_session: Arc<RwLock<Option<Session>>>,
    listeners: AuthStateListeners,
}

impl Auth {
    pub fn new(url: &str, key: &str, http_client: Client, options: AuthOptions) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            http_client,
            options,
            current_session: Arc::new(RwLock::new(None)),
            listeners: AuthStateListeners::new(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    fn read_session(&self) -> Option<Session> {
        self.current_session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_session(&self, session: Session, event: AuthChangeEvent) -> Session {
        let session = session.with_expiry();
        *self
            .current_session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        self.listeners.notify(event, Some(&session));
        session
    }

    fn clear_session(&self) {
        let previous = self
            .current_session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            self.listeners.notify(AuthChangeEvent::SignedOut, None);
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(AuthError::from_response(status, &body));
        }
        Ok(response.json::<T>().await?)
    }

    /// Sign up a new user with email and password
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        debug!("Signing up {}", email);
        let response = self
            .http_client
            .post(self.auth_url("/signup"))
            .header("apikey", &self.key)
            .header("X-Client-Info", CLIENT_INFO)
            .json(&PasswordCredentials { email, password })
            .send()
            .await?;

        let mut body: serde_json::Value = Self::parse(response).await?;

        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body)?;
            info!("Signed up and signed in user {}", session.user.id);
            let session =
                self.store_session(session.expiring_from_now(), AuthChangeEvent::SignedIn);
            return Ok(SignUpOutcome::SignedIn(session));
        }

        // Without autoconfirm GoTrue answers with the user alone.
        let user_value = if body.get("user").is_some() {
            body["user"].take()
        } else {
            body
        };
        let user: User = serde_json::from_value(user_value)?;
        info!("Signed up user {}, awaiting email confirmation", user.id);
        Ok(SignUpOutcome::ConfirmationRequired(user))
    }

    /// Sign in a user with email and password
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        debug!("Signing in {}", email);
        let response = self
            .http_client
            .post(self.auth_url("/token?grant_type=password"))
            .header("apikey", &self.key)
            .header("X-Client-Info", CLIENT_INFO)
            .json(&PasswordCredentials { email, password })
            .send()
            .await?;

        let session: Session = Self::parse(response).await?;
        info!("Signed in user {}", session.user.id);
        Ok(self.store_session(session.expiring_from_now(), AuthChangeEvent::SignedIn))
    }

    /// Current session, refreshed first if it has expired.
    ///
    /// An expired session that cannot be refreshed is dropped and listeners
    /// see `SignedOut`.
    pub async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        let session = match self.read_session() {
            Some(session) => session,
            None => return Ok(None),
        };
        if !session.is_expired() {
            return Ok(Some(session));
        }

        if !self.options.auto_refresh_token {
            info!("Session for user {} expired", session.user.id);
            self.clear_session();
            return Ok(None);
        }

        match self.refresh_session().await {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                warn!("Could not refresh expired session: {}", err);
                self.clear_session();
                Err(err)
            }
        }
    }

    /// Replace the current session, e.g. one restored by the caller
    pub fn set_session(&self, session: Session) -> Session {
        self.store_session(session, AuthChangeEvent::SignedIn)
    }

    /// Exchange the refresh token for a new session
    pub async fn refresh_session(&self) -> Result<Session, AuthError> {
        let session = self.read_session().ok_or(AuthError::MissingSession)?;

        let response = self
            .http_client
            .post(self.auth_url("/token?grant_type=refresh_token"))
            .header("apikey", &self.key)
            .header("X-Client-Info", CLIENT_INFO)
            .json(&serde_json::json!({ "refresh_token": session.refresh_token }))
            .send()
            .await?;

        let refreshed: Session = Self::parse(response).await?;
        debug!("Refreshed session for user {}", refreshed.user.id);
        Ok(self.store_session(
            refreshed.expiring_from_now(),
            AuthChangeEvent::TokenRefreshed,
        ))
    }

    /// Fetch the user behind the current session from the server
    pub async fn get_user(&self) -> Result<User, AuthError> {
        let session = self.get_session().await?.ok_or(AuthError::MissingSession)?;

        let response = self
            .http_client
            .get(self.auth_url("/user"))
            .header("apikey", &self.key)
            .header("X-Client-Info", CLIENT_INFO)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Sign out the current user
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let session = self.read_session().ok_or(AuthError::MissingSession)?;

        let response = self
            .http_client
            .post(self.auth_url("/logout"))
            .header("apikey", &self.key)
            .header("X-Client-Info", CLIENT_INFO)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        let status = response.status();
        match status {
            s if s.is_success() => {}
            // Token already dead on the server side; still sign out locally.
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                warn!("Logout returned {}, clearing local session", status);
            }
            _ => {
                let body = response.text().await?;
                return Err(AuthError::from_response(status, &body));
            }
        }

        info!("Signed out user {}", session.user.id);
        self.clear_session();
        Ok(())
    }

    /// Register a handler for session changes.
    ///
    /// The handler is called right away with `InitialSession` and whatever
    /// session is currently held.
    pub fn on_auth_state_change<F>(&self, handler: F) -> Subscription
    where
        F: Fn(AuthChangeEvent, Option<&Session>) + Send + Sync + 'static,
    {
        let handler: AuthStateHandler = Arc::new(handler);
        let subscription = self.listeners.subscribe(handler.clone());
        handler(AuthChangeEvent::InitialSession, self.read_session().as_ref());
        subscription
    }
}
