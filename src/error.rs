//! Error handling for the record screen

use thiserror::Error;

use crate::form::DraftError;

/// Unified error type
#[derive(Error, Debug)]
pub enum Error {
    /// Credential rejected, expired session, or auth service unreachable
    #[error("Authentication error: {0}")]
    Auth(#[from] supabase_records_auth::AuthError),

    /// Read or write rejected by the table's policy, or the database unreachable
    #[error("Database error: {0}")]
    Persistence(#[from] supabase_records_postgrest::PostgrestError),

    /// The record form could not be turned into a row
    #[error("Invalid record: {0}")]
    Draft(#[from] DraftError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn config<T: std::fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
