//! Configuration for the Supabase project backing the screen

use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

/// Table the screen reads and writes unless told otherwise
pub const DEFAULT_RECORDS_TABLE: &str = "usuarios";

/// Configuration options for the Supabase clients
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Whether to refresh an expired token instead of signing out
    pub auto_refresh_token: bool,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The database schema
    pub db_schema: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            auto_refresh_token: true,
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
        }
    }
}

impl ClientOptions {
    /// Set whether to automatically refresh the token
    pub fn with_auto_refresh_token(mut self, value: bool) -> Self {
        self.auto_refresh_token = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }
}

/// Project endpoint, key and table.
///
/// Load these from the environment rather than baking them into a binary.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: Url,
    pub anon_key: String,
    pub records_table: String,
    pub options: ClientOptions,
}

impl SupabaseConfig {
    /// Creates a new configuration, validating the URL.
    pub fn new(url_str: &str, anon_key: impl Into<String>) -> Result<Self> {
        let url = Url::parse(url_str)?;
        let anon_key = anon_key.into();
        if anon_key.is_empty() {
            return Err(Error::config("anon_key cannot be empty"));
        }
        Ok(Self {
            url,
            anon_key,
            records_table: DEFAULT_RECORDS_TABLE.to_string(),
            options: ClientOptions::default(),
        })
    }

    /// Reads `SUPABASE_URL`, `SUPABASE_ANON_KEY` and the optional
    /// `SUPABASE_RECORDS_TABLE` and `SUPABASE_DB_SCHEMA`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = var("SUPABASE_URL")
            .ok_or_else(|| Error::config("SUPABASE_URL environment variable not found"))?;
        let anon_key = var("SUPABASE_ANON_KEY")
            .ok_or_else(|| Error::config("SUPABASE_ANON_KEY environment variable not found"))?;

        let mut config = Self::new(&url, anon_key)?;
        if let Some(table) = var("SUPABASE_RECORDS_TABLE").filter(|t| !t.is_empty()) {
            config.records_table = table;
        }
        if let Some(schema) = var("SUPABASE_DB_SCHEMA").filter(|s| !s.is_empty()) {
            config.options = config.options.with_db_schema(&schema);
        }
        Ok(config)
    }

    pub fn with_records_table(mut self, table: &str) -> Self {
        self.records_table = table.to_string();
        self
    }

    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Project URL without the trailing slash `Url` adds
    pub fn base_url(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn config_new_valid() {
        let config = SupabaseConfig::new("http://localhost:54321", "dummy-anon-key").unwrap();
        assert_eq!(config.url.to_string(), "http://localhost:54321/");
        assert_eq!(config.base_url(), "http://localhost:54321");
        assert_eq!(config.records_table, DEFAULT_RECORDS_TABLE);
    }

    #[test]
    fn config_new_invalid_url() {
        let config = SupabaseConfig::new("not a valid url", "some_anon_key");
        assert!(matches!(config, Err(Error::Url(_))));
    }

    #[test]
    fn config_new_empty_key() {
        match SupabaseConfig::new("http://localhost:54321", "") {
            Err(Error::Config(msg)) => assert!(msg.contains("anon_key cannot be empty")),
            other => panic!("Expected Config error for empty key, got {:?}", other),
        }
    }

    #[test]
    fn from_vars_reads_optional_overrides() {
        let config = SupabaseConfig::from_vars(vars(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("SUPABASE_RECORDS_TABLE", "people"),
            ("SUPABASE_DB_SCHEMA", "app"),
        ]))
        .unwrap();

        assert_eq!(config.records_table, "people");
        assert_eq!(config.options.db_schema, "app");
        assert!(config.options.auto_refresh_token);
    }

    #[test]
    fn from_vars_requires_key() {
        let result =
            SupabaseConfig::from_vars(vars(&[("SUPABASE_URL", "https://project.supabase.co")]));
        match result {
            Err(Error::Config(msg)) => assert!(msg.contains("SUPABASE_ANON_KEY")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }
}
