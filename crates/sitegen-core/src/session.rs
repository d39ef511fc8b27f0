//! Session context
//!
//! Holds the signed-in user and the backend token. Mirrors the persisted
//! `token`/`user` keys of the key-value store; screens receive a shared
//! `Arc<SessionContext>` instead of reading storage directly.

use crate::api::Backend;
use crate::error::CoreError;
use crate::event::{ClientEvent, EventBus};
use crate::storage::KeyValueStore;
use parking_lot::RwLock;
use sitegen_types::UserProfile;
use std::sync::Arc;
use tracing::{info, warn};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const RETURN_PATH_KEY: &str = "pricingReturnPath";

const INVALID_RESPONSE: &str = "Invalid response from server";

/// Authenticated session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

/// Shared session state backed by the key-value store
pub struct SessionContext {
    store: Arc<dyn KeyValueStore>,
    current: RwLock<Option<Session>>,
    events: EventBus,
}

impl SessionContext {
    /// Create an empty context; call [`hydrate`](Self::hydrate) to load a
    /// previously stored session.
    pub fn new(store: Arc<dyn KeyValueStore>, events: EventBus) -> Self {
        Self {
            store,
            current: RwLock::new(None),
            events,
        }
    }

    /// Load the session from storage.
    ///
    /// Both keys must be present. An unparseable `user` entry is treated as
    /// signed out.
    pub fn hydrate(&self) -> Result<Option<Session>, CoreError> {
        let token = self.store.get(TOKEN_KEY)?;
        let user = self.store.get(USER_KEY)?;

        let session = match (token, user) {
            (Some(token), Some(raw)) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(Session { token, user }),
                Err(e) => {
                    warn!(error = %e, "Stored user is not valid JSON, ignoring session");
                    None
                }
            },
            _ => None,
        };

        *self.current.write() = session.clone();
        Ok(session)
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().clone()
    }

    /// Current session or [`CoreError::AuthRequired`]
    pub fn require(&self) -> Result<Session, CoreError> {
        self.current().ok_or(CoreError::AuthRequired)
    }

    pub fn user_id(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.user.id.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    /// Persist and activate a session
    pub fn establish(&self, session: Session) -> Result<(), CoreError> {
        let user_json = serde_json::to_string(&session.user).map_err(|e| CoreError::Decode {
            operation: "session",
            message: e.to_string(),
        })?;
        self.store.set(TOKEN_KEY, &session.token)?;
        self.store.set(USER_KEY, &user_json)?;

        info!(user_id = %session.user.id, "Session established");
        self.events
            .publish(ClientEvent::SignedIn(session.user.id.clone()));
        *self.current.write() = Some(session);
        Ok(())
    }

    /// Verify a Google `id_token` with the backend and establish the session
    pub async fn sign_in(&self, backend: &dyn Backend, id_token: &str) -> Result<Session, CoreError> {
        let response = backend.verify_google(id_token).await?;

        let session = match (response.ok, response.user, response.token) {
            (true, Some(user), Some(token)) if !token.is_empty() => Session { token, user },
            _ => {
                let message = response
                    .error
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| INVALID_RESPONSE.to_string());
                return Err(CoreError::LoginRejected { message });
            }
        };

        self.establish(session.clone())?;
        Ok(session)
    }

    /// Clear the session from storage and memory (logout)
    pub fn teardown(&self) -> Result<(), CoreError> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        let was_signed_in = self.current.write().take().is_some();
        if was_signed_in {
            info!("Session cleared");
            self.events.publish(ClientEvent::SignedOut);
        }
        Ok(())
    }

    /// Underlying store, shared with the pricing flow
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }
}
