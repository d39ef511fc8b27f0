//! Token balance tracking
//!
//! The balance is never computed locally. Callers refresh it explicitly after
//! every mutating operation; a background refresher can poll it while a gated
//! screen is open. Whichever response lands last wins.

use crate::api::Backend;
use crate::error::CoreError;
use crate::event::{ClientEvent, EventBus};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Last known token balance of the signed-in user
pub struct BalanceTracker {
    value: RwLock<Option<u64>>,
    refreshed_at: RwLock<Option<DateTime<Utc>>>,
    events: EventBus,
}

impl BalanceTracker {
    pub fn new(events: EventBus) -> Self {
        Self {
            value: RwLock::new(None),
            refreshed_at: RwLock::new(None),
            events,
        }
    }

    /// Last known balance, `0` before the first successful fetch
    pub fn current(&self) -> u64 {
        self.value.read().unwrap_or(0)
    }

    pub fn known(&self) -> Option<u64> {
        *self.value.read()
    }

    /// When the balance was last updated
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        *self.refreshed_at.read()
    }

    pub fn set(&self, balance: u64) {
        *self.value.write() = Some(balance);
        *self.refreshed_at.write() = Some(Utc::now());
        self.events.publish(ClientEvent::BalanceUpdated(balance));
    }

    /// Fetch the balance for `user_id`.
    ///
    /// A response with `success: false` leaves the stored value untouched
    /// and yields `Ok(None)`.
    pub async fn refresh(&self, backend: &dyn Backend, user_id: &str) -> Result<Option<u64>, CoreError> {
        let response = backend.token_balance(user_id).await?;
        match response.balance() {
            Some(balance) => {
                debug!(user_id, balance, "Token balance refreshed");
                self.set(balance);
                Ok(Some(balance))
            }
            None => {
                debug!(user_id, "Balance response reported no success");
                Ok(None)
            }
        }
    }

    /// Refresh and swallow failures; used after mutating operations where a
    /// stale balance is not worth interrupting the user for.
    pub async fn refresh_logged(&self, backend: &dyn Backend, user_id: &str) -> Option<u64> {
        match self.refresh(backend, user_id).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!(user_id, error = %e, "Token balance refresh failed");
                self.events
                    .publish(ClientEvent::BalanceRefreshFailed(e.to_string()));
                None
            }
        }
    }

    /// Poll the balance every `interval` until the returned handle is dropped.
    ///
    /// The first tick fires immediately, which doubles as the initial fetch
    /// when a screen opens.
    pub fn spawn_refresher(
        self: &Arc<Self>,
        backend: Arc<dyn Backend>,
        user_id: String,
        interval: Duration,
    ) -> RefreshHandle {
        let tracker = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tracker.refresh_logged(backend.as_ref(), &user_id).await;
            }
        });
        RefreshHandle { task }
    }
}

/// Cancels the background refresh when dropped
#[derive(Debug)]
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_balance_reads_as_zero() {
        let tracker = BalanceTracker::new(EventBus::default());
        assert_eq!(tracker.current(), 0);
        assert_eq!(tracker.known(), None);
        assert!(tracker.refreshed_at().is_none());
    }

    #[test]
    fn test_set_publishes_update() {
        let events = EventBus::default();
        let mut rx = events.subscribe();
        let tracker = BalanceTracker::new(events);

        tracker.set(40_000);
        tracker.set(12_000);

        assert_eq!(tracker.current(), 12_000);
        assert!(tracker.refreshed_at().is_some());
        assert_eq!(rx.try_recv().unwrap(), ClientEvent::BalanceUpdated(40_000));
        assert_eq!(rx.try_recv().unwrap(), ClientEvent::BalanceUpdated(12_000));
    }
}
