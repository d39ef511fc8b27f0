//! Token packages and the purchase/redirect flow
//!
//! The pricing screen is reached from any gated screen. The origin is
//! remembered twice: as the `returnTo` parameter and as the single-use
//! `pricingReturnPath` store key. After a purchase (or the back action) the
//! user is sent back to whichever one resolves first.

use crate::api::Backend;
use crate::error::CoreError;
use crate::event::{ClientEvent, EventBus};
use crate::gate::format_tokens_compact;
use crate::session::{SessionContext, RETURN_PATH_KEY};
use crate::storage::KeyValueStore;
use sitegen_types::PurchaseRequest;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Delay between a successful purchase and the redirect
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Where the user lands when no return path was supplied
pub const DEFAULT_RETURN_PATH: &str = "/generate";

/// A purchasable token package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPackage {
    pub id: &'static str,
    pub name: &'static str,
    pub tokens: u64,
    pub features: [&'static str; 3],
    pub popular: bool,
}

impl TokenPackage {
    /// Package size in display tokens ("100", "500", "1000")
    pub fn display_tokens(&self) -> String {
        format_tokens_compact(self.tokens)
    }

    /// Confirmation shown after a successful purchase
    pub fn success_message(&self) -> String {
        format!(
            "Successfully added {} tokens to your account!",
            self.display_tokens()
        )
    }
}

pub static TOKEN_PACKAGES: [TokenPackage; 3] = [
    TokenPackage {
        id: "starter",
        name: "Starter",
        tokens: 100_000,
        features: ["Generate 2-3 websites", "Basic support", "Valid forever"],
        popular: false,
    },
    TokenPackage {
        id: "pro",
        name: "Professional",
        tokens: 500_000,
        features: ["Generate 10-15 websites", "Priority support", "Valid forever"],
        popular: true,
    },
    TokenPackage {
        id: "business",
        name: "Business",
        tokens: 1_000_000,
        features: ["Generate 30+ websites", "Premium support", "Valid forever"],
        popular: false,
    },
];

/// Look up a package by id (case-insensitive)
pub fn find_package(id: &str) -> Result<&'static TokenPackage, CoreError> {
    TOKEN_PACKAGES
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(id.trim()))
        .ok_or_else(|| CoreError::UnknownPackage { id: id.to_string() })
}

/// Resolve the return path: explicit parameter, then stored path, then
/// `/generate`. Reading does not consume the stored value.
pub fn resolve_return_path(query: Option<&str>, store: &dyn KeyValueStore) -> String {
    if let Some(path) = query.map(str::trim).filter(|p| !p.is_empty()) {
        return path.to_string();
    }
    match store.get(RETURN_PATH_KEY) {
        Ok(Some(path)) if !path.trim().is_empty() => path,
        Ok(_) => DEFAULT_RETURN_PATH.to_string(),
        Err(e) => {
            warn!(error = %e, "Could not read stored return path");
            DEFAULT_RETURN_PATH.to_string()
        }
    }
}

/// Remember `path` as the place to return to after pricing
pub fn remember_return_path(store: &dyn KeyValueStore, path: &str) -> Result<(), CoreError> {
    store.set(RETURN_PATH_KEY, path)
}

/// Drop the stored return path once it has been used
pub fn consume_return_path(store: &dyn KeyValueStore) {
    if let Err(e) = store.remove(RETURN_PATH_KEY) {
        warn!(error = %e, "Could not clear stored return path");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Idle,
    Purchasing(&'static str),
    Purchased { message: String, at: Instant },
}

/// Pricing screen state
pub struct PricingFlow {
    store: Arc<dyn KeyValueStore>,
    return_to: String,
    phase: Phase,
    error: Option<String>,
}

impl PricingFlow {
    pub fn new(store: Arc<dyn KeyValueStore>, query_return_to: Option<&str>) -> Self {
        let return_to = resolve_return_path(query_return_to, store.as_ref());
        Self {
            store,
            return_to,
            phase: Phase::Idle,
            error: None,
        }
    }

    pub fn return_to(&self) -> &str {
        &self.return_to
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Purchasing(_))
    }

    /// Id of the package whose purchase is in flight
    pub fn purchasing(&self) -> Option<&'static str> {
        match self.phase {
            Phase::Purchasing(id) => Some(id),
            _ => None,
        }
    }

    pub fn success(&self) -> Option<&str> {
        match &self.phase {
            Phase::Purchased { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validate and build the purchase request for `package_id`
    pub fn begin_purchase(&mut self, package_id: &str, user_id: Option<&str>) -> Result<PurchaseRequest, CoreError> {
        if self.is_busy() {
            return Err(CoreError::Busy);
        }
        let package = find_package(package_id)?;
        let Some(user_id) = user_id else {
            return Err(CoreError::AuthRequired);
        };

        self.error = None;
        self.phase = Phase::Purchasing(package.id);
        Ok(PurchaseRequest {
            user_id: user_id.to_string(),
            tokens: package.tokens,
            package_name: package.name.to_string(),
        })
    }

    /// Apply the purchase result; success starts the redirect countdown
    pub fn complete_purchase(&mut self, result: Result<(), CoreError>, now: Instant) -> Result<&'static TokenPackage, CoreError> {
        let Phase::Purchasing(id) = self.phase else {
            return Err(CoreError::InvalidTransition {
                state: "idle",
                action: "complete a purchase",
            });
        };
        let package = find_package(id)?;

        match result {
            Ok(()) => {
                info!(package = package.id, tokens = package.tokens, "Tokens purchased");
                self.phase = Phase::Purchased {
                    message: package.success_message(),
                    at: now,
                };
                Ok(package)
            }
            Err(e) => {
                self.phase = Phase::Idle;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Once the redirect delay has elapsed, consume the stored path and
    /// return where to go.
    pub fn redirect_due(&mut self, now: Instant) -> Option<String> {
        let due = matches!(
            &self.phase,
            Phase::Purchased { at, .. } if now.saturating_duration_since(*at) >= REDIRECT_DELAY
        );
        if !due {
            return None;
        }
        consume_return_path(self.store.as_ref());
        self.phase = Phase::Idle;
        Some(self.return_to.clone())
    }

    /// Leave without purchasing
    pub fn back(&mut self) -> String {
        consume_return_path(self.store.as_ref());
        self.return_to.clone()
    }

    /// Purchase end to end; returns the package bought. The caller waits
    /// [`REDIRECT_DELAY`] before honouring [`redirect_due`](Self::redirect_due).
    pub async fn purchase(
        &mut self,
        backend: &dyn Backend,
        session: &SessionContext,
        events: &EventBus,
        package_id: &str,
    ) -> Result<&'static TokenPackage, CoreError> {
        let user_id = session.user_id();
        let request = self.begin_purchase(package_id, user_id.as_deref())?;
        let result = backend.purchase_tokens(&request).await;
        let package = self.complete_purchase(result, Instant::now())?;
        events.publish(ClientEvent::TokensPurchased(package.tokens));
        Ok(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_packages() {
        assert_eq!(TOKEN_PACKAGES.len(), 3);
        assert_eq!(find_package("pro").unwrap().name, "Professional");
        assert_eq!(find_package("Business").unwrap().tokens, 1_000_000);
        assert!(matches!(
            find_package("enterprise"),
            Err(CoreError::UnknownPackage { .. })
        ));
        assert_eq!(TOKEN_PACKAGES.iter().filter(|p| p.popular).count(), 1);
    }

    #[test]
    fn test_success_message() {
        assert_eq!(
            TOKEN_PACKAGES[0].success_message(),
            "Successfully added 100 tokens to your account!"
        );
    }

    #[test]
    fn test_return_path_precedence() {
        let store = MemoryStore::new();
        assert_eq!(resolve_return_path(None, &store), "/generate");

        store.set(RETURN_PATH_KEY, "/preview/w1").unwrap();
        assert_eq!(resolve_return_path(None, &store), "/preview/w1");
        assert_eq!(resolve_return_path(Some("/generate"), &store), "/generate");
        assert_eq!(resolve_return_path(Some(""), &store), "/preview/w1");
    }

    #[test]
    fn test_purchase_then_redirect_consumes_stored_path() {
        let store = Arc::new(MemoryStore::new());
        store.set(RETURN_PATH_KEY, "/preview/w1").unwrap();
        let mut flow = PricingFlow::new(store.clone(), None);

        let request = flow.begin_purchase("starter", Some("u1")).unwrap();
        assert_eq!(request.tokens, 100_000);
        assert_eq!(request.package_name, "Starter");
        assert_eq!(flow.purchasing(), Some("starter"));
        assert!(matches!(flow.begin_purchase("pro", Some("u1")), Err(CoreError::Busy)));

        let now = Instant::now();
        flow.complete_purchase(Ok(()), now).unwrap();
        assert_eq!(flow.success(), Some("Successfully added 100 tokens to your account!"));

        assert_eq!(flow.redirect_due(now + Duration::from_secs(1)), None);
        assert_eq!(store.get(RETURN_PATH_KEY).unwrap().as_deref(), Some("/preview/w1"));

        assert_eq!(
            flow.redirect_due(now + REDIRECT_DELAY).as_deref(),
            Some("/preview/w1")
        );
        assert_eq!(store.get(RETURN_PATH_KEY).unwrap(), None);
    }

    #[test]
    fn test_failed_purchase_stays_on_pricing() {
        let store = Arc::new(MemoryStore::new());
        let mut flow = PricingFlow::new(store, Some("/generate"));
        flow.begin_purchase("pro", Some("u1")).unwrap();
        flow.complete_purchase(
            Err(CoreError::Backend {
                status: 400,
                message: "Failed to purchase tokens".to_string(),
            }),
            Instant::now(),
        )
        .unwrap_err();

        assert!(!flow.is_busy());
        assert_eq!(flow.error(), Some("Failed to purchase tokens"));
        assert_eq!(flow.redirect_due(Instant::now() + REDIRECT_DELAY), None);
    }

    #[test]
    fn test_purchase_requires_session() {
        let mut flow = PricingFlow::new(Arc::new(MemoryStore::new()), None);
        assert!(matches!(
            flow.begin_purchase("starter", None),
            Err(CoreError::AuthRequired)
        ));
        assert!(!flow.is_busy());
    }

    #[test]
    fn test_back_clears_stored_path() {
        let store = Arc::new(MemoryStore::new());
        store.set(RETURN_PATH_KEY, "/preview/w9").unwrap();
        let mut flow = PricingFlow::new(store.clone(), None);
        assert_eq!(flow.back(), "/preview/w9");
        assert!(store.is_empty());
    }
}
