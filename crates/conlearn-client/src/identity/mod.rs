//! Sign-up, login and sign-in state.
//!
//! Providers keep the signed-in user in an [`IdentityState`]. Subscribers
//! are called once with the current identity when they register and again on
//! every sign-in or sign-out until their [`Subscription`] is cancelled or
//! dropped.

pub mod firebase;

pub use firebase::FirebaseAuth;

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider subject id, used as the owner of uploads
    pub user_id: String,
    pub email: String,
    pub id_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already registered")]
    EmailAlreadyRegistered,

    #[error("password too weak")]
    WeakPassword,

    #[error("malformed email")]
    MalformedEmail,

    #[error("{0}")]
    Other(String),
}

impl AuthError {
    /// Text suitable for showing next to a login form.
    pub fn friendly_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "Incorrect email or password".to_string(),
            AuthError::EmailAlreadyRegistered => {
                "An account with this email already exists".to_string()
            }
            AuthError::WeakPassword => "Password should be at least 6 characters".to_string(),
            AuthError::MalformedEmail => "Please enter a valid email address".to_string(),
            AuthError::Other(message) => message.clone(),
        }
    }
}

pub type Listener = Box<dyn Fn(Option<&Identity>) + Send + Sync>;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn logout(&self) -> Result<(), AuthError>;

    fn subscribe(&self, listener: Listener) -> Subscription;

    fn current(&self) -> Option<Identity>;
}

type SharedListener = Arc<dyn Fn(Option<&Identity>) + Send + Sync>;

#[derive(Default)]
struct Inner {
    current: Option<Identity>,
    next_id: u64,
    listeners: Vec<(u64, SharedListener)>,
}

/// Current identity plus the listeners watching it.
#[derive(Clone, Default)]
pub struct IdentityState {
    inner: Arc<Mutex<Inner>>,
    // Held from update through delivery so listeners see changes in order
    delivery: Arc<Mutex<()>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A listener panicking cannot leave Inner half-updated
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl IdentityState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Identity> {
        lock(&self.inner).current.clone()
    }

    /// Replace the current identity and notify every listener.
    ///
    /// Concurrent calls are delivered one at a time, in the order they
    /// update the state. Listeners may read the state but must not call
    /// `set` themselves.
    pub fn set(&self, identity: Option<Identity>) {
        let _delivery = lock(&self.delivery);
        let (current, listeners) = {
            let mut inner = lock(&self.inner);
            inner.current = identity;
            let listeners: Vec<SharedListener> =
                inner.listeners.iter().map(|(_, l)| l.clone()).collect();
            (inner.current.clone(), listeners)
        };

        for listener in listeners {
            listener(current.as_ref());
        }
    }

    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let listener: SharedListener = Arc::from(listener);
        let _delivery = lock(&self.delivery);
        let (id, current) = {
            let mut inner = lock(&self.inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, listener.clone()));
            (id, inner.current.clone())
        };

        listener(current.as_ref());

        Subscription {
            state: Arc::downgrade(&self.inner),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner).listeners.len()
    }
}

/// Handle for a registered listener; dropping it unregisters the listener.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    state: Weak<Mutex<Inner>>,
    id: u64,
}

impl Subscription {
    pub fn cancel(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(inner) = self.state.upgrade() {
            lock(&inner).listeners.retain(|(id, _)| *id != self.id);
        }
        self.state = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}
