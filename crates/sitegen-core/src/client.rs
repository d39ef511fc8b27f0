//! Shared client handle
//!
//! Bundles what every screen and command needs: configuration, the backend,
//! the session and the balance tracker, all wired to one event bus.

use crate::api::{Backend, HttpBackend};
use crate::balance::{BalanceTracker, RefreshHandle};
use crate::config::Config;
use crate::error::CoreError;
use crate::event::EventBus;
use crate::session::{Session, SessionContext};
use crate::storage::{FileStore, KeyValueStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Central handle for sitegen front-ends
///
/// Cheap to clone; all state lives behind `Arc`s.
#[derive(Clone)]
pub struct SitegenClient {
    config: Config,
    backend: Arc<dyn Backend>,
    session: Arc<SessionContext>,
    balance: Arc<BalanceTracker>,
    events: EventBus,
}

impl SitegenClient {
    /// Build a client from parts and hydrate the stored session
    pub fn new(
        config: Config,
        backend: Arc<dyn Backend>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, CoreError> {
        let events = EventBus::default_capacity();
        let session = Arc::new(SessionContext::new(store, events.clone()));
        let hydrated = session.hydrate()?;
        debug!(signed_in = hydrated.is_some(), "Session hydrated");

        Ok(Self {
            config,
            backend,
            session,
            balance: Arc::new(BalanceTracker::new(events.clone())),
            events,
        })
    }

    /// HTTP backend plus file-backed storage at `storage_path`
    pub fn open(config: Config, storage_path: &Path) -> Result<Self, CoreError> {
        let backend = Arc::new(HttpBackend::new(&config)?);
        let store = Arc::new(FileStore::open(storage_path)?);
        info!(
            api_url = %config.api_url,
            auth_url = %config.auth_url,
            storage = %storage_path.display(),
            "sitegen client ready"
        );
        Self::new(config, backend, store)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn backend_arc(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn balance(&self) -> &BalanceTracker {
        &self.balance
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.session.store()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    pub async fn sign_in(&self, id_token: &str) -> Result<Session, CoreError> {
        self.session.sign_in(self.backend.as_ref(), id_token).await
    }

    pub fn logout(&self) -> Result<(), CoreError> {
        self.session.teardown()
    }

    /// Fetch the balance of the signed-in user
    pub async fn refresh_balance(&self) -> Result<Option<u64>, CoreError> {
        let user_id = self.session.user_id().ok_or(CoreError::AuthRequired)?;
        self.balance.refresh(self.backend.as_ref(), &user_id).await
    }

    /// Start polling the balance at the configured interval.
    ///
    /// `None` when signed out. Dropping the handle stops the task.
    pub fn spawn_balance_refresher(&self) -> Option<RefreshHandle> {
        let user_id = self.session.user_id()?;
        Some(self.balance.spawn_refresher(
            self.backend_arc(),
            user_id,
            self.config.balance_refresh_interval,
        ))
    }
}
