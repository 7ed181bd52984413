#![allow(dead_code)]

//! In-memory auth and record store for screen tests

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use supabase_records::backend::{AuthBackend, RecordStore};
use supabase_records::error::{Error, Result};
use supabase_records::records::{NewRecord, Record};
use supabase_records_auth::{
    AuthChangeEvent, AuthError, AuthStateHandler, AuthStateListeners, Session, SignUpOutcome,
    Subscription, User,
};
use supabase_records_postgrest::PostgrestError;

#[derive(Default)]
struct State {
    accounts: HashMap<String, (String, User)>,
    session: Option<Session>,
    rows: Vec<Record>,
    next_row_id: i64,
    next_user_id: u32,
    inserts: usize,
    selects: usize,
    fail_selects: bool,
    fail_inserts: bool,
    require_confirmation: bool,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    listeners: AuthStateListeners,
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn session_for(user: &User) -> Session {
    Session {
        access_token: format!("token-{}", user.id),
        refresh_token: format!("refresh-{}", user.id),
        expires_in: 3600,
        expires_at: None,
        token_type: "bearer".to_string(),
        user: user.clone(),
    }
}

fn rejected(message: &str) -> AuthError {
    AuthError::ApiError {
        status: StatusCode::BAD_REQUEST,
        message: message.to_string(),
    }
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn create_account(state: &mut State, email: &str, password: &str) -> User {
        state.next_user_id += 1;
        let user = User {
            id: format!("user-{}", state.next_user_id),
            email: Some(email.to_string()),
            ..User::default()
        };
        state
            .accounts
            .insert(email.to_string(), (password.to_string(), user.clone()));
        user
    }

    pub fn add_account(&self, email: &str, password: &str) -> User {
        Self::create_account(&mut self.state(), email, password)
    }

    /// Start out signed in, as if the session had been restored.
    pub fn restore_session(&self, email: &str) -> Session {
        let mut state = self.state();
        let user = state.accounts[email].1.clone();
        let session = session_for(&user);
        state.session = Some(session.clone());
        session
    }

    /// The server invalidated the session on its own.
    pub fn expire_session(&self) {
        self.state().session = None;
        self.listeners.notify(AuthChangeEvent::SignedOut, None);
    }

    pub fn seed_row(&self, first_name: &str, last_name: &str, age: i32, user_id: &str) {
        let mut state = self.state();
        Self::push_row(
            &mut state,
            NewRecord {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                age,
                user_id: user_id.to_string(),
            },
        );
    }

    fn push_row(state: &mut State, row: NewRecord) {
        state.next_row_id += 1;
        let id = state.next_row_id;
        state.rows.push(Record {
            id,
            first_name: row.first_name,
            last_name: row.last_name,
            age: Some(row.age),
            user_id: row.user_id,
            created_at: epoch() + Duration::seconds(id),
        });
    }

    pub fn require_confirmation(&self, value: bool) {
        self.state().require_confirmation = value;
    }

    pub fn fail_selects(&self, value: bool) {
        self.state().fail_selects = value;
    }

    pub fn fail_inserts(&self, value: bool) {
        self.state().fail_inserts = value;
    }

    pub fn insert_count(&self) -> usize {
        self.state().inserts
    }

    pub fn select_count(&self) -> usize {
        self.state().selects
    }

    pub fn row_count(&self) -> usize {
        self.state().rows.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.state().session.clone()
    }

    fn sign_in_as(&self, user: &User) -> Session {
        let session = session_for(user);
        self.state().session = Some(session.clone());
        self.listeners.notify(AuthChangeEvent::SignedIn, Some(&session));
        session
    }
}

fn unavailable() -> Error {
    Error::Persistence(PostgrestError::UnparsedApiError {
        message: "service unavailable".to_string(),
        status: StatusCode::SERVICE_UNAVAILABLE,
    })
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn get_session(&self) -> std::result::Result<Option<Session>, AuthError> {
        Ok(self.state().session.clone())
    }

    fn on_auth_state_change(&self, handler: AuthStateHandler) -> Subscription {
        let subscription = self.listeners.subscribe(handler.clone());
        let session = self.state().session.clone();
        handler(AuthChangeEvent::InitialSession, session.as_ref());
        subscription
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<Session, AuthError> {
        let user = match self.state().accounts.get(email) {
            Some((stored, user)) if stored == password => user.clone(),
            _ => return Err(rejected("Invalid login credentials")),
        };
        Ok(self.sign_in_as(&user))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<SignUpOutcome, AuthError> {
        let (user, require_confirmation) = {
            let mut state = self.state();
            if state.accounts.contains_key(email) {
                return Err(rejected("User already registered"));
            }
            let user = Self::create_account(&mut state, email, password);
            (user, state.require_confirmation)
        };

        if require_confirmation {
            Ok(SignUpOutcome::ConfirmationRequired(user))
        } else {
            Ok(SignUpOutcome::SignedIn(self.sign_in_as(&user)))
        }
    }

    async fn sign_out(&self) -> std::result::Result<(), AuthError> {
        if self.state().session.take().is_none() {
            return Err(AuthError::MissingSession);
        }
        self.listeners.notify(AuthChangeEvent::SignedOut, None);
        Ok(())
    }

    async fn get_user(&self) -> std::result::Result<User, AuthError> {
        self.state()
            .session
            .as_ref()
            .map(|session| session.user.clone())
            .ok_or(AuthError::MissingSession)
    }
}

#[async_trait]
impl RecordStore for FakeBackend {
    async fn fetch_all(&self) -> Result<Vec<Record>> {
        let mut state = self.state();
        state.selects += 1;
        if state.fail_selects {
            return Err(unavailable());
        }
        let mut rows = state.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert(&self, record: &NewRecord) -> Result<()> {
        let mut state = self.state();
        state.inserts += 1;
        if state.fail_inserts {
            return Err(unavailable());
        }
        Self::push_row(&mut state, record.clone());
        Ok(())
    }
}
