//! End-to-end workflow scenarios against a scripted backend

use async_trait::async_trait;
use parking_lot::Mutex;
use sitegen_core::api::Backend;
use sitegen_core::routes::navigate_to_pricing;
use sitegen_core::session::RETURN_PATH_KEY;
use sitegen_core::workflow::EditOutcome;
use sitegen_core::{
    BalanceTracker, ClientEvent, Config, CoreError, EditModalState, EditWorkflow, EventBus,
    GenerationStep, GenerationWorkflow, KeyValueStore, MemoryStore, PreviewState, PricingFlow,
    Route, Session, SessionContext, SitegenClient,
};
use sitegen_types::{
    AnalyzeRequest, AnalyzeResponse, BalanceData, BalanceResponse, EditWebsiteRequest,
    EditWebsiteResponse, GenerateRequest, GenerateResponse, GenerationPlan, GoogleAuthResponse,
    PurchaseRequest, UserProfile, WebsiteArtifact,
};
use std::sync::Arc;

/// Scripted backend recording every call
#[derive(Default)]
struct MockBackend {
    calls: Mutex<Vec<String>>,
    balance: Mutex<u64>,
    fail_generate: bool,
    fail_update: bool,
}

impl MockBackend {
    fn with_balance(balance: u64) -> Self {
        Self {
            balance: Mutex::new(balance),
            ..Default::default()
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Calls other than balance lookups
    fn mutating_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("balance"))
            .collect()
    }

    fn charge(&self, amount: u64) {
        let mut balance = self.balance.lock();
        *balance = balance.saturating_sub(amount);
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn verify_google(&self, id_token: &str) -> Result<GoogleAuthResponse, CoreError> {
        self.record(format!("verify:{}", id_token));
        if id_token == "valid" {
            Ok(GoogleAuthResponse {
                ok: true,
                token: Some("jwt-1".to_string()),
                user: Some(user()),
                error: None,
            })
        } else {
            Ok(GoogleAuthResponse {
                ok: false,
                token: None,
                user: None,
                error: Some("Invalid Google token".to_string()),
            })
        }
    }

    async fn token_balance(&self, user_id: &str) -> Result<BalanceResponse, CoreError> {
        self.record(format!("balance:{}", user_id));
        Ok(BalanceResponse {
            success: true,
            data: Some(BalanceData {
                token_balance: *self.balance.lock(),
            }),
        })
    }

    async fn purchase_tokens(&self, request: &PurchaseRequest) -> Result<(), CoreError> {
        self.record(format!("purchase:{}", request.tokens));
        *self.balance.lock() += request.tokens;
        Ok(())
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, CoreError> {
        self.record(format!("analyze:{}", request.prompt));
        self.charge(2_000);
        Ok(AnalyzeResponse {
            session_id: "sess-1".to_string(),
            plan: GenerationPlan::from(serde_json::json!({
                "websiteType": "Coffee shop",
                "sections": ["Hero", "Menu", "Contact"],
            })),
        })
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, CoreError> {
        self.record(format!("generate:{}", request.session_id));
        if self.fail_generate {
            return Err(CoreError::Backend {
                status: 500,
                message: "Failed to generate website".to_string(),
            });
        }
        self.charge(3_000);
        Ok(GenerateResponse {
            website_id: "web-7".to_string(),
        })
    }

    async fn fetch_website(&self, website_id: &str) -> Result<WebsiteArtifact, CoreError> {
        self.record(format!("fetch:{}", website_id));
        Ok(WebsiteArtifact::new(
            website_id,
            "<html><body>Coffee</body></html>",
            Some(GenerationPlan::default()),
        ))
    }

    async fn edit_website(
        &self,
        request: &EditWebsiteRequest,
    ) -> Result<EditWebsiteResponse, CoreError> {
        self.record(format!("edit:{}", request.edit_prompt));
        Ok(EditWebsiteResponse {
            updated_code: "<html><body style=\"color:blue\">Coffee</body></html>".to_string(),
        })
    }

    async fn update_website(&self, website_id: &str, _code: &str) -> Result<(), CoreError> {
        self.record(format!("update:{}", website_id));
        if self.fail_update {
            return Err(CoreError::Network {
                message: "connection reset".to_string(),
            });
        }
        Ok(())
    }
}

fn user() -> UserProfile {
    UserProfile {
        id: "user-1".to_string(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        picture: None,
    }
}

fn signed_in() -> (Arc<MemoryStore>, SessionContext, BalanceTracker) {
    let store = Arc::new(MemoryStore::new());
    let events = EventBus::default();
    let session = SessionContext::new(store.clone(), events.clone());
    session
        .establish(Session {
            token: "jwt-1".to_string(),
            user: user(),
        })
        .unwrap();
    (store, session, BalanceTracker::new(events))
}

#[tokio::test]
async fn test_coffee_shop_generation_reaches_preview() {
    let backend = MockBackend::with_balance(40_000);
    let (_, session, balance) = signed_in();
    balance.refresh(&backend, "user-1").await.unwrap();

    let mut workflow = GenerationWorkflow::default();
    workflow.set_prompt("Coffee shop site");
    workflow.analyze(&backend, &session, &balance).await.unwrap();

    assert_eq!(workflow.step(), GenerationStep::Plan);
    assert_eq!(workflow.plan().unwrap().section_count(), 3);
    assert_eq!(balance.current(), 38_000);

    let route = workflow.generate(&backend, &session, &balance).await.unwrap();
    assert_eq!(route, Route::Preview("web-7".to_string()));
    assert_eq!(route.to_string(), "/preview/web-7");
    assert_eq!(balance.current(), 35_000);

    assert_eq!(
        backend.mutating_calls(),
        vec!["analyze:Coffee shop site", "generate:sess-1"]
    );
}

#[tokio::test]
async fn test_low_balance_blocks_every_gated_action_without_network() {
    let backend = MockBackend::with_balance(10_000);
    let (_, session, balance) = signed_in();
    balance.refresh(&backend, "user-1").await.unwrap();

    let mut generation = GenerationWorkflow::default();
    generation.set_prompt("Coffee shop site");
    assert!(matches!(
        generation.analyze(&backend, &session, &balance).await,
        Err(CoreError::InsufficientTokens(_))
    ));

    let mut edit = EditWorkflow::default();
    let err = edit.open(balance.current()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("10.0"));
    assert!(message.contains("35.0"));
    assert_eq!(edit.state(), EditModalState::Closed);

    assert!(backend.mutating_calls().is_empty());
}

#[tokio::test]
async fn test_balance_drop_between_analyze_and_generate_blocks_generate() {
    let backend = MockBackend::with_balance(36_000);
    let (_, session, balance) = signed_in();
    balance.refresh(&backend, "user-1").await.unwrap();

    let mut workflow = GenerationWorkflow::default();
    workflow.set_prompt("Coffee shop site");
    workflow.analyze(&backend, &session, &balance).await.unwrap();
    assert_eq!(balance.current(), 34_000);

    assert!(matches!(
        workflow.generate(&backend, &session, &balance).await,
        Err(CoreError::InsufficientTokens(_))
    ));
    assert_eq!(workflow.step(), GenerationStep::Plan);
    assert_eq!(backend.mutating_calls(), vec!["analyze:Coffee shop site"]);
}

#[tokio::test]
async fn test_failed_generation_keeps_plan() {
    let backend = MockBackend {
        balance: Mutex::new(40_000),
        fail_generate: true,
        ..Default::default()
    };
    let (_, session, balance) = signed_in();
    balance.refresh(&backend, "user-1").await.unwrap();

    let mut workflow = GenerationWorkflow::default();
    workflow.set_prompt("Coffee shop site");
    workflow.analyze(&backend, &session, &balance).await.unwrap();
    let err = workflow
        .generate(&backend, &session, &balance)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to generate website");
    assert_eq!(workflow.step(), GenerationStep::Plan);
    assert_eq!(workflow.session_id(), Some("sess-1"));
    assert_eq!(workflow.error(), Some("Failed to generate website"));
}

#[tokio::test]
async fn test_edit_survives_persist_failure() {
    let backend = MockBackend {
        balance: Mutex::new(40_000),
        fail_update: true,
        ..Default::default()
    };
    let (_, session, balance) = signed_in();
    balance.refresh(&backend, "user-1").await.unwrap();

    let mut preview = PreviewState::new("web-7");
    preview.load(&backend).await;
    let mut artifact = preview.artifact().cloned().unwrap();

    let mut edit = EditWorkflow::default();
    edit.open(balance.current()).unwrap();
    edit.use_example(0);
    let outcome = edit
        .submit(&backend, &session, &balance, &mut artifact)
        .await
        .unwrap();

    assert_eq!(outcome, EditOutcome { persisted: false });
    assert!(artifact.code.contains("color:blue"));
    assert_eq!(edit.state(), EditModalState::Closed);
    assert!(edit.error().is_none());
    assert!(edit.success_visible(std::time::Instant::now()));
    assert_eq!(
        backend.mutating_calls(),
        vec![
            "fetch:web-7",
            "edit:Change the primary color to blue",
            "update:web-7"
        ]
    );
}

#[tokio::test]
async fn test_pricing_round_trip_returns_to_preview() {
    let backend = MockBackend::with_balance(10_000);
    let (store, session, _) = signed_in();
    let events = session.events().clone();
    let mut rx = events.subscribe();

    let origin = Route::Preview("web-7".to_string());
    let pricing = navigate_to_pricing(store.as_ref(), &origin).unwrap();
    let Route::Pricing { return_to } = pricing else {
        panic!("expected pricing route");
    };

    let mut flow = PricingFlow::new(store.clone(), return_to.as_deref());
    let package = flow
        .purchase(&backend, &session, &events, "starter")
        .await
        .unwrap();
    assert_eq!(package.tokens, 100_000);
    assert_eq!(*backend.balance.lock(), 110_000);
    assert_eq!(rx.try_recv().unwrap(), ClientEvent::TokensPurchased(100_000));

    let later = std::time::Instant::now() + sitegen_core::pricing::REDIRECT_DELAY;
    assert_eq!(flow.redirect_due(later).as_deref(), Some("/preview/web-7"));
    assert_eq!(store.get(RETURN_PATH_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_sign_in_and_logout_through_client() {
    let backend = Arc::new(MockBackend::with_balance(50_000));
    let store = Arc::new(MemoryStore::new());
    let client = SitegenClient::new(Config::default(), backend.clone(), store.clone()).unwrap();
    assert!(!client.session().is_authenticated());
    assert!(matches!(
        client.refresh_balance().await,
        Err(CoreError::AuthRequired)
    ));

    let err = client.sign_in("bogus").await.unwrap_err();
    assert_eq!(err.to_string(), "Login failed: Invalid Google token");

    let session = client.sign_in("valid").await.unwrap();
    assert_eq!(session.user.id, "user-1");
    assert_eq!(client.refresh_balance().await.unwrap(), Some(50_000));

    let reopened = SitegenClient::new(Config::default(), backend.clone(), store.clone()).unwrap();
    assert!(reopened.session().is_authenticated());

    client.logout().unwrap();
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_background_refresher_stops_when_handle_dropped() {
    let backend = Arc::new(MockBackend::with_balance(40_000));
    let store = Arc::new(MemoryStore::new());
    let client = SitegenClient::new(Config::default(), backend.clone(), store).unwrap();
    assert!(client.spawn_balance_refresher().is_none());

    client.sign_in("valid").await.unwrap();
    let handle = client.spawn_balance_refresher().unwrap();
    assert!(handle.is_running());

    tokio::time::sleep(std::time::Duration::from_secs(71)).await;
    let polled = backend.calls().iter().filter(|c| c.starts_with("balance")).count();
    assert_eq!(polled, 3);
    assert_eq!(client.balance().current(), 40_000);

    drop(handle);
    tokio::time::sleep(std::time::Duration::from_secs(120)).await;
    let after = backend.calls().iter().filter(|c| c.starts_with("balance")).count();
    assert_eq!(after, polled);
}
