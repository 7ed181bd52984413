//! Session-gated record screen for Supabase
//!
//! A signed-out user sees a credential form; once a session exists the
//! screen shows a record form and the list of rows in the records table,
//! newest first. Every successful write or sign-in reloads the whole list.
//!
//! The screen talks to the backend only through [`backend::AuthBackend`] and
//! [`backend::RecordStore`]. [`Supabase`] wires both to a real project.

pub mod backend;
pub mod config;
pub mod error;
pub mod form;
pub mod records;
pub mod screen;
pub mod session;

use log::debug;
use reqwest::Client;
use std::sync::Arc;
use supabase_records_auth::{Auth, AuthOptions};
use supabase_records_postgrest::PostgrestClient;

use crate::backend::SupabaseRecords;
use crate::config::SupabaseConfig;
use crate::error::Result;

/// Explicitly constructed client for one Supabase project
#[derive(Clone)]
pub struct Supabase {
    config: SupabaseConfig,
    http_client: Client,
    auth: Arc<Auth>,
}

impl Supabase {
    /// Create a new Supabase client
    ///
    /// # Example
    ///
    /// ```
    /// use supabase_records::{config::SupabaseConfig, Supabase};
    ///
    /// let config = SupabaseConfig::new("https://your-project-url.supabase.co", "your-anon-key")?;
    /// let supabase = Supabase::new(config)?;
    /// # Ok::<(), supabase_records::error::Error>(())
    /// ```
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let auth = Auth::new(
            config.base_url(),
            &config.anon_key,
            http_client.clone(),
            AuthOptions {
                auto_refresh_token: config.options.auto_refresh_token,
            },
        );
        debug!("Supabase client created for {}", config.base_url());

        Ok(Self {
            config,
            http_client,
            auth: Arc::new(auth),
        })
    }

    /// Convenience function to create a client directly from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    /// Auth client for user management and authentication
    pub fn auth(&self) -> Arc<Auth> {
        self.auth.clone()
    }

    /// PostgREST client for `table`, authorized as the current user when
    /// signed in and as the anonymous role otherwise.
    pub async fn from(&self, table: &str) -> Result<PostgrestClient> {
        let token = match self.auth.get_session().await? {
            Some(session) => session.access_token,
            None => self.config.anon_key.clone(),
        };

        let mut client = PostgrestClient::new(
            self.config.base_url(),
            &self.config.anon_key,
            table,
            self.http_client.clone(),
        )?
        .with_auth(&token)?;

        if self.config.options.db_schema != "public" {
            client = client.schema(&self.config.options.db_schema)?;
        }
        Ok(client)
    }

    /// Record store backed by the configured records table
    pub fn records(&self) -> SupabaseRecords {
        SupabaseRecords::new(self.clone())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::backend::{AuthBackend, RecordStore, SupabaseRecords};
    pub use crate::config::{ClientOptions, SupabaseConfig};
    pub use crate::error::{Error, Result};
    pub use crate::form::{AuthMode, DraftError, RecordDraft};
    pub use crate::records::{NewRecord, Record, SubmitOutcome};
    pub use crate::screen::{Notice, NoticeKind, RecordScreen, View};
    pub use crate::Supabase;
}
