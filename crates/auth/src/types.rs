//! Types returned by the GoTrue endpoints

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// User data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub app_metadata: serde_json::Value,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Session data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    /// Unix timestamp in seconds, on the local clock for sessions this client
    /// received from the server.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub token_type: String,
    pub user: User,
}

impl Session {
    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now().timestamp() >= expires_at,
            None => false,
        }
    }

    /// Expiry counted from now, for a session the server just issued. The
    /// server's own `expires_at` is ignored so clock skew can't make a fresh
    /// token look expired.
    pub(crate) fn expiring_from_now(mut self) -> Self {
        self.expires_at = Some(Utc::now().timestamp() + self.expires_in);
        self
    }

    pub(crate) fn with_expiry(mut self) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(Utc::now().timestamp() + self.expires_in);
        }
        self
    }
}

/// Email and password pair sent to `/signup` and `/token?grant_type=password`
#[derive(Debug, Clone, Serialize)]
pub struct PasswordCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `/signup` either signs the user in or waits for them to confirm their email.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    ConfirmationRequired(User),
}

impl SignUpOutcome {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SignUpOutcome::SignedIn(session) => Some(session),
            SignUpOutcome::ConfirmationRequired(_) => None,
        }
    }
}

/// Error body shapes GoTrue has used across versions
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub msg: Option<String>,
    pub message: Option<String>,
    pub error_description: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}
