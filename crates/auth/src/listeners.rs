//! Auth state change listeners
//!
//! Handlers are called synchronously, in registration order, whenever the
//! session held by [`crate::Auth`] changes. Registration hands back a
//! [`Subscription`]; the handler stays registered until it is unsubscribed
//! or dropped.

use log::{debug, trace};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::Session;

/// What happened to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChangeEvent {
    /// Sent once to a new listener with whatever session exists at registration
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

impl fmt::Display for AuthChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthChangeEvent::InitialSession => "INITIAL_SESSION",
            AuthChangeEvent::SignedIn => "SIGNED_IN",
            AuthChangeEvent::SignedOut => "SIGNED_OUT",
            AuthChangeEvent::TokenRefreshed => "TOKEN_REFRESHED",
        };
        f.write_str(name)
    }
}

pub type AuthStateHandler = Arc<dyn Fn(AuthChangeEvent, Option<&Session>) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    handlers: RwLock<BTreeMap<u64, AuthStateHandler>>,
}

/// Set of registered auth state handlers
#[derive(Clone, Default)]
pub struct AuthStateListeners {
    registry: Arc<Registry>,
}

impl AuthStateListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. It is removed when the returned subscription goes away.
    pub fn subscribe(&self, handler: AuthStateHandler) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::SeqCst);
        self.registry
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, handler);
        debug!("Registered auth state listener {}", id);

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Call every registered handler with the event.
    pub fn notify(&self, event: AuthChangeEvent, session: Option<&Session>) {
        // Handlers may register or drop subscriptions, so don't call them under the lock.
        let handlers: Vec<AuthStateHandler> = self
            .registry
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        trace!("Notifying {} listener(s) of {}", handlers.len(), event);
        for handler in handlers {
            handler(event, session);
        }
    }

    pub fn len(&self) -> usize {
        self.registry
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Disposer for a registered handler
#[must_use = "dropping a Subscription unregisters its handler"]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Unregister the handler.
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .handlers
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
            debug!("Removed auth state listener {}", self.id);
        }
    }
}
