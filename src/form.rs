//! Uncommitted form input: credentials and the record draft

use thiserror::Error;

use crate::records::NewRecord;

/// Which credential action the form submits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Why a draft cannot be submitted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("first name, last name and age are all required")]
    Incomplete,

    #[error("age must be a whole number, got {0:?}")]
    InvalidAge(String),
}

/// Record fields as typed, age still text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    pub first_name: String,
    pub last_name: String,
    pub age: String,
}

impl RecordDraft {
    pub fn is_complete(&self) -> bool {
        !self.first_name.is_empty() && !self.last_name.is_empty() && !self.age.is_empty()
    }

    /// Check the draft and parse the age.
    pub fn validate(&self) -> Result<ValidDraft, DraftError> {
        if !self.is_complete() {
            return Err(DraftError::Incomplete);
        }
        let age = self
            .age
            .trim()
            .parse::<i32>()
            .map_err(|_| DraftError::InvalidAge(self.age.clone()))?;

        Ok(ValidDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age,
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A draft that passed validation but has no owner yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
}

impl ValidDraft {
    pub fn owned_by(self, user_id: impl Into<String>) -> NewRecord {
        NewRecord {
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            user_id: user_id.into(),
        }
    }
}

/// Everything the user has typed but not submitted
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub credentials: Credentials,
    pub mode: AuthMode,
    pub draft: RecordDraft,
}

impl FormState {
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }
}
