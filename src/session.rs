//! Session tracking for the screen's gate

use log::{info, warn};
use std::sync::Arc;
use supabase_records_auth::{AuthChangeEvent, Session, Subscription};
use tokio::sync::mpsc;

use crate::backend::AuthBackend;

/// A notification from the auth backend
#[derive(Debug, Clone, PartialEq)]
pub struct SessionChange {
    pub event: AuthChangeEvent,
    pub session: Option<Session>,
}

/// Holds the gating session and the queue of pending auth notifications.
///
/// The registered handler only enqueues; changes take effect when the owner
/// pulls them with [`SessionTracker::try_next`] or [`SessionTracker::next`].
pub struct SessionTracker {
    session: Option<Session>,
    changes: mpsc::UnboundedReceiver<SessionChange>,
    subscription: Option<Subscription>,
}

impl SessionTracker {
    /// Read the current session and subscribe to changes.
    pub async fn start<A>(auth: &A) -> Self
    where
        A: AuthBackend + ?Sized,
    {
        let session = match auth.get_session().await {
            Ok(session) => session,
            Err(err) => {
                warn!("Could not read current session: {}", err);
                None
            }
        };

        let (sender, changes) = mpsc::unbounded_channel();
        let subscription = auth.on_auth_state_change(Arc::new(
            move |event: AuthChangeEvent, session: Option<&Session>| {
                // Fails only once the tracker is gone.
                let _ = sender.send(SessionChange {
                    event,
                    session: session.cloned(),
                });
            },
        ));

        Self {
            session,
            changes,
            subscription: Some(subscription),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Apply the next queued change, if any, without waiting.
    pub fn try_next(&mut self) -> Option<SessionChange> {
        let change = self.changes.try_recv().ok()?;
        self.apply(&change);
        Some(change)
    }

    /// Wait for the next change and apply it. `None` once stopped and drained.
    pub async fn next(&mut self) -> Option<SessionChange> {
        if self.subscription.is_none() {
            return self.try_next();
        }
        let change = self.changes.recv().await?;
        self.apply(&change);
        Some(change)
    }

    fn apply(&mut self, change: &SessionChange) {
        match (&self.session, &change.session) {
            (None, Some(session)) => info!("Signed in as {} ({})", session.user.id, change.event),
            (Some(session), None) => info!("Signed out {} ({})", session.user.id, change.event),
            _ => {}
        }
        self.session = change.session.clone();
    }

    /// Unregister from the backend. Later calls do nothing.
    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}
