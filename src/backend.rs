//! The two backend capabilities the screen depends on
//!
//! [`AuthBackend`] and [`RecordStore`] are implemented here for the real
//! Supabase clients; tests substitute an in-memory fake.

use async_trait::async_trait;
use log::debug;
use supabase_records_auth::{
    Auth, AuthChangeEvent, AuthError, AuthStateHandler, Session, SignUpOutcome, Subscription, User,
};
use supabase_records_postgrest::SortOrder;

use crate::error::Result;
use crate::records::{NewRecord, Record};
use crate::Supabase;

/// Session lifecycle operations
#[async_trait]
pub trait AuthBackend: Send + Sync + 'static {
    async fn get_session(&self) -> std::result::Result<Option<Session>, AuthError>;

    /// Register a handler for session changes. It receives `InitialSession`
    /// immediately, then every change until the subscription is dropped.
    fn on_auth_state_change(&self, handler: AuthStateHandler) -> Subscription;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<Session, AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<SignUpOutcome, AuthError>;

    async fn sign_out(&self) -> std::result::Result<(), AuthError>;

    async fn get_user(&self) -> std::result::Result<User, AuthError>;
}

/// Read and append access to the records table
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Every row the current identity may see, newest first
    async fn fetch_all(&self) -> Result<Vec<Record>>;

    async fn insert(&self, record: &NewRecord) -> Result<()>;
}

#[async_trait]
impl AuthBackend for Auth {
    async fn get_session(&self) -> std::result::Result<Option<Session>, AuthError> {
        Auth::get_session(self).await
    }

    fn on_auth_state_change(&self, handler: AuthStateHandler) -> Subscription {
        Auth::on_auth_state_change(
            self,
            move |event: AuthChangeEvent, session: Option<&Session>| handler(event, session),
        )
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<Session, AuthError> {
        Auth::sign_in_with_password(self, email, password).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<SignUpOutcome, AuthError> {
        Auth::sign_up(self, email, password).await
    }

    async fn sign_out(&self) -> std::result::Result<(), AuthError> {
        Auth::sign_out(self).await
    }

    async fn get_user(&self) -> std::result::Result<User, AuthError> {
        Auth::get_user(self).await
    }
}

/// [`RecordStore`] over the project's PostgREST endpoint
#[derive(Clone)]
pub struct SupabaseRecords {
    supabase: Supabase,
    table: String,
}

impl SupabaseRecords {
    pub fn new(supabase: Supabase) -> Self {
        let table = supabase.config().records_table.clone();
        Self { supabase, table }
    }
}

#[async_trait]
impl RecordStore for SupabaseRecords {
    async fn fetch_all(&self) -> Result<Vec<Record>> {
        let records = self
            .supabase
            .from(&self.table)
            .await?
            .select("*")
            .order("created_at", SortOrder::Descending)
            .execute::<Record>()
            .await?;
        Ok(records)
    }

    async fn insert(&self, record: &NewRecord) -> Result<()> {
        let inserted = self
            .supabase
            .from(&self.table)
            .await?
            .insert(vec![record])
            .await?;
        debug!("Insert into {} returned {}", self.table, inserted);
        Ok(())
    }
}
