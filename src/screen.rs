//! The session-gated record screen
//!
//! Signed out, the screen offers sign in or sign up. Signed in, it offers
//! the record form and the record list. Errors never change the gate; they
//! queue a [`Notice`] for the front-end to show.

use log::{debug, info};
use std::collections::VecDeque;
use std::sync::Arc;
use supabase_records_auth::{AuthChangeEvent, Session, SignUpOutcome};

use crate::backend::{AuthBackend, RecordStore};
use crate::error::Error;
use crate::form::{AuthMode, FormState};
use crate::records::{Record, RecordList, SubmitOutcome};
use crate::session::{SessionChange, SessionTracker};

/// What the front-end should render
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View<'a> {
    Credentials { mode: AuthMode },
    Records(&'a [Record]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Auth,
    Persistence,
    Validation,
    Info,
}

/// A message for the user, shown as a blocking alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }
}

impl From<&Error> for Notice {
    fn from(err: &Error) -> Self {
        let (kind, message) = match err {
            Error::Auth(err) => (NoticeKind::Auth, err.to_string()),
            Error::Persistence(err) => (
                NoticeKind::Persistence,
                err.server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| err.to_string()),
            ),
            Error::Draft(err) => (NoticeKind::Validation, err.to_string()),
            other => (NoticeKind::Persistence, other.to_string()),
        };
        Self { kind, message }
    }
}

pub struct RecordScreen<A, S> {
    auth: Arc<A>,
    store: Arc<S>,
    tracker: SessionTracker,
    form: FormState,
    records: RecordList,
    notices: VecDeque<Notice>,
}

impl<A, S> RecordScreen<A, S>
where
    A: AuthBackend,
    S: RecordStore,
{
    /// Read the current session, subscribe to changes and load the list if
    /// already signed in.
    pub async fn mount(auth: Arc<A>, store: Arc<S>) -> Self {
        let tracker = SessionTracker::start(auth.as_ref()).await;
        let mut screen = Self {
            auth,
            store,
            tracker,
            form: FormState::default(),
            records: RecordList::new(),
            notices: VecDeque::new(),
        };
        screen.process_auth_changes().await;
        screen
    }

    pub fn view(&self) -> View<'_> {
        if self.tracker.is_signed_in() {
            View::Records(self.records.records())
        } else {
            View::Credentials {
                mode: self.form.mode,
            }
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.tracker.session()
    }

    pub fn is_signed_in(&self) -> bool {
        self.tracker.is_signed_in()
    }

    pub fn records(&self) -> &[Record] {
        self.records.records()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn toggle_mode(&mut self) {
        self.form.toggle_mode();
    }

    /// Sign in or sign up with the typed credentials, depending on the mode.
    pub async fn submit_credentials(&mut self) {
        let email = self.form.credentials.email.clone();
        let password = self.form.credentials.password.clone();

        let result = match self.form.mode {
            AuthMode::SignIn => self
                .auth
                .sign_in_with_password(&email, &password)
                .await
                .map(|_| ()),
            AuthMode::SignUp => match self.auth.sign_up(&email, &password).await {
                Ok(SignUpOutcome::SignedIn(_)) => Ok(()),
                Ok(SignUpOutcome::ConfirmationRequired(_)) => {
                    self.notices.push_back(Notice::info(format!(
                        "Check {} for a link to confirm your account",
                        email
                    )));
                    Ok(())
                }
                Err(err) => Err(err),
            },
        };

        if let Err(err) = result {
            self.alert(&Error::from(err));
        }
        self.process_auth_changes().await;
    }

    /// Submit the record draft, then reload the list once it was saved.
    ///
    /// `None` means nothing was saved and a notice was queued. A reload that
    /// fails after a save still returns `Saved` and queues its own notice.
    pub async fn submit_record(&mut self) -> Option<SubmitOutcome> {
        let result = self
            .records
            .submit(&mut self.form.draft, self.auth.as_ref(), self.store.as_ref())
            .await;
        let outcome = match result {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                self.alert(&err);
                None
            }
        };
        if outcome == Some(SubmitOutcome::Saved) {
            self.load_records().await;
        }
        self.process_auth_changes().await;
        outcome
    }

    /// Reload the list from the store.
    pub async fn reload(&mut self) {
        self.load_records().await;
        self.process_auth_changes().await;
    }

    async fn load_records(&mut self) {
        let result = self.records.reload(self.store.as_ref()).await.map(|_| ());
        if let Err(err) = result {
            self.alert(&err);
        }
    }

    pub async fn sign_out(&mut self) {
        if let Err(err) = self.auth.sign_out().await {
            self.alert(&Error::from(err));
        }
        self.process_auth_changes().await;
    }

    /// Apply every notification already delivered by the backend.
    pub async fn process_auth_changes(&mut self) {
        while let Some(change) = self.tracker.try_next() {
            self.on_session_change(change).await;
        }
    }

    /// Wait for the next notification and apply it.
    pub async fn next_auth_change(&mut self) -> Option<AuthChangeEvent> {
        let change = self.tracker.next().await?;
        let event = change.event;
        self.on_session_change(change).await;
        Some(event)
    }

    async fn on_session_change(&mut self, change: SessionChange) {
        debug!("Auth state change: {}", change.event);
        if change.session.is_some() {
            self.load_records().await;
        }
    }

    fn alert(&mut self, err: &Error) {
        self.notices.push_back(Notice::from(err));
    }

    /// Oldest notice not yet shown
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }

    pub fn pending_notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Tear the screen down, unregistering its auth listener.
    pub fn unmount(mut self) {
        info!("Unmounting record screen");
        self.tracker.stop();
    }
}
