//! TUI Application state and event loop

use crate::components::{Spinner, Toast, ToastManager};
use crate::screens::{
    Action, GenerateScreen, LandingScreen, LoginScreen, PreviewScreen, PricingScreen,
};
use crate::theme::{ColorScheme, Palette};
use crossterm::event::{KeyCode, KeyModifiers};
use sitegen_core::preview::{write_sandbox_file, COPY_ACK_DURATION};
use sitegen_core::routes::navigate_to_pricing;
use sitegen_core::workflow::{persist_best_effort, SUCCESS_NOTICE};
use sitegen_core::{
    ClientEvent, CoreError, PricingFlow, RefreshHandle, Route, Session, SitegenClient, TokenGate,
};
use sitegen_types::{AnalyzeResponse, EditWebsiteResponse, GenerateResponse, WebsiteArtifact};
use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

/// Screen for the current route
pub enum Screen {
    Landing(LandingScreen),
    Login(LoginScreen),
    Generate(GenerateScreen),
    Preview(PreviewScreen),
    Pricing(PricingScreen),
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Landing(_) => "Home",
            Screen::Login(_) => "Sign in",
            Screen::Generate(_) => "Generate",
            Screen::Preview(_) => "Preview",
            Screen::Pricing(_) => "Pricing",
        }
    }
}

/// Result of a backend request run off the UI thread
pub(crate) enum TaskResult {
    SignedIn(Result<Session, CoreError>),
    Analyzed {
        epoch: u64,
        result: Result<AnalyzeResponse, CoreError>,
    },
    Generated {
        epoch: u64,
        result: Result<GenerateResponse, CoreError>,
    },
    Fetched(Result<WebsiteArtifact, CoreError>),
    Edited(Result<EditWebsiteResponse, CoreError>),
    Persisted { website_id: String, saved: bool },
    Purchased(Result<(), CoreError>),
}

/// A task result tagged with the navigation it was started under
pub(crate) struct TaskMessage {
    nav: u64,
    result: TaskResult,
}

/// TUI Application state
pub struct App {
    /// Shared client handle
    pub client: SitegenClient,

    /// Event receiver for session and balance updates
    pub event_rx: broadcast::Receiver<ClientEvent>,

    /// Current route and its screen
    pub route: Route,
    pub screen: Screen,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Warning shown in the status bar
    pub status_message: Option<String>,

    pub toasts: ToastManager,
    pub spinner: Spinner,
    pub palette: Palette,

    /// Where downloads are written (`download_dir` from the config)
    pub export_dir: PathBuf,

    gate: TokenGate,
    /// Bumped on every navigation; results tagged with an older value
    /// belong to a screen that no longer exists
    nav_seq: u64,
    task_tx: mpsc::UnboundedSender<TaskMessage>,
    task_rx: mpsc::UnboundedReceiver<TaskMessage>,
    refresher: Option<RefreshHandle>,
}

impl App {
    pub fn new(client: SitegenClient, scheme: ColorScheme) -> Self {
        let event_rx = client.event_bus().subscribe();
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let palette = Palette::new(scheme);
        let export_dir = client.config().download_dir.clone();

        Self {
            client,
            event_rx,
            route: Route::Landing,
            screen: Screen::Landing(LandingScreen::new()),
            should_quit: false,
            status_message: None,
            toasts: ToastManager::new(),
            spinner: Spinner::new().with_color(palette.focus),
            palette,
            export_dir,
            gate: TokenGate::default(),
            nav_seq: 0,
            task_tx,
            task_rx,
            refresher: None,
        }
    }

    pub fn gate(&self) -> TokenGate {
        self.gate
    }

    /// Whether the background balance poller is active
    pub fn is_refreshing_balance(&self) -> bool {
        self.refresher.as_ref().is_some_and(RefreshHandle::is_running)
    }

    /// Switch to `route`, applying the session guard
    pub fn navigate(&mut self, route: Route) {
        let session = self.client.session();
        let mut route = route.guard(session);
        if route == Route::Landing {
            route = Route::landing_redirect(session);
        }
        debug!(from = %self.route, to = %route, "Navigate");

        self.nav_seq += 1;
        self.status_message = None;
        self.screen = match &route {
            Route::Landing => Screen::Landing(LandingScreen::new()),
            Route::Login => Screen::Login(LoginScreen::new()),
            Route::Generate => Screen::Generate(GenerateScreen::new(self.gate)),
            Route::Preview(id) => {
                let backend = self.client.backend_arc();
                let id_owned = id.clone();
                self.spawn_task(async move {
                    TaskResult::Fetched(backend.fetch_website(&id_owned).await)
                });
                Screen::Preview(PreviewScreen::new(id.clone(), self.gate))
            }
            Route::Pricing { return_to } => Screen::Pricing(PricingScreen::new(PricingFlow::new(
                self.client.store(),
                return_to.as_deref(),
            ))),
        };

        match &route {
            Route::Generate | Route::Preview(_) => {
                if self.refresher.is_none() {
                    self.refresher = self.client.spawn_balance_refresher();
                }
            }
            Route::Pricing { .. } => {
                self.refresher = None;
                self.refresh_balance();
            }
            Route::Landing | Route::Login => self.refresher = None,
        }
        self.route = route;
    }

    /// Handle keyboard input
    /// Returns true if the key was handled as a global key
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        let global = match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                true
            }
            KeyCode::F(2) if self.client.session().is_authenticated() => {
                if !matches!(self.screen, Screen::Pricing(_)) {
                    self.dispatch(Action::OpenPricing);
                }
                true
            }
            KeyCode::F(5) => {
                self.refresh_balance();
                true
            }
            KeyCode::F(9) if self.client.session().is_authenticated() => {
                if let Err(e) = self.client.logout() {
                    self.toasts.push(Toast::error(e.to_string()));
                }
                true
            }
            _ => false,
        };
        if global {
            return true;
        }

        let action = match &mut self.screen {
            Screen::Landing(s) => s.handle_key(key),
            Screen::Login(s) => s.handle_key(key, modifiers),
            Screen::Generate(s) => s.handle_key(key, modifiers),
            Screen::Preview(s) => s.handle_key(key, modifiers),
            Screen::Pricing(s) => s.handle_key(key),
        };
        if let Some(action) = action {
            self.dispatch(action);
        }
        false
    }

    /// Run a screen action
    pub fn dispatch(&mut self, action: Action) {
        let balance = self.client.balance().current();
        let user_id = self.client.session().user_id();

        match action {
            Action::Quit => self.should_quit = true,
            Action::Navigate(route) => self.navigate(route),
            Action::OpenPricing => match navigate_to_pricing(self.client.store().as_ref(), &self.route) {
                Ok(route) => self.navigate(route),
                Err(e) => self.toasts.push(Toast::error(e.to_string())),
            },
            Action::SignIn(token) => {
                let client = self.client.clone();
                self.spawn_task(async move { TaskResult::SignedIn(client.sign_in(&token).await) });
            }
            Action::Analyze => {
                let Screen::Generate(screen) = &mut self.screen else {
                    return;
                };
                let workflow = screen.workflow_mut();
                match workflow.begin_analyze(user_id.as_deref(), balance) {
                    Ok(request) => {
                        let epoch = workflow.epoch();
                        let backend = self.client.backend_arc();
                        self.spawn_task(async move {
                            TaskResult::Analyzed {
                                epoch,
                                result: backend.analyze(&request).await,
                            }
                        });
                    }
                    Err(e) => self.refused(e),
                }
            }
            Action::Generate => {
                let Screen::Generate(screen) = &mut self.screen else {
                    return;
                };
                let workflow = screen.workflow_mut();
                match workflow.begin_generate(balance) {
                    Ok(request) => {
                        let epoch = workflow.epoch();
                        let backend = self.client.backend_arc();
                        self.spawn_task(async move {
                            TaskResult::Generated {
                                epoch,
                                result: backend.generate(&request).await,
                            }
                        });
                    }
                    Err(e) => self.refused(e),
                }
            }
            Action::OpenEdit => {
                if let Screen::Preview(screen) = &mut self.screen {
                    if let Err(e) = screen.open_edit(balance) {
                        self.refused(e);
                    }
                }
            }
            Action::CloseEdit => {
                if let Screen::Preview(screen) = &mut self.screen {
                    if let Err(e) = screen.close_edit() {
                        debug!(error = %e, "Edit modal stays open");
                    }
                }
            }
            Action::SubmitEdit => {
                let Screen::Preview(screen) = &mut self.screen else {
                    return;
                };
                let (state, edit) = screen.parts_mut();
                let Some(artifact) = state.artifact() else {
                    return;
                };
                match edit.begin_submit(artifact, user_id.as_deref(), balance) {
                    Ok(request) => {
                        let backend = self.client.backend_arc();
                        self.spawn_task(async move {
                            TaskResult::Edited(backend.edit_website(&request).await)
                        });
                    }
                    Err(e) => self.refused(e),
                }
            }
            Action::Purchase(package_id) => {
                let Screen::Pricing(screen) = &mut self.screen else {
                    return;
                };
                match screen.flow_mut().begin_purchase(package_id, user_id.as_deref()) {
                    Ok(request) => {
                        let backend = self.client.backend_arc();
                        self.spawn_task(async move {
                            TaskResult::Purchased(backend.purchase_tokens(&request).await)
                        });
                    }
                    Err(e) => self.refused(e),
                }
            }
            Action::CopyCode => self.copy_code(),
            Action::Download => {
                let Screen::Preview(screen) = &self.screen else {
                    return;
                };
                match screen.state().export(&self.export_dir) {
                    Some(Ok(path)) => self
                        .toasts
                        .push(Toast::success(format!("Saved {}", path.display()))),
                    Some(Err(e)) => self.toasts.push(Toast::error(e.to_string())),
                    None => {}
                }
            }
            Action::OpenInBrowser => {
                let Screen::Preview(screen) = &self.screen else {
                    return;
                };
                let Some(artifact) = screen.state().artifact() else {
                    return;
                };
                let opened = write_sandbox_file(artifact)
                    .map_err(|e| e.to_string())
                    .and_then(|path| open::that(&path).map(|_| path).map_err(|e| e.to_string()));
                match opened {
                    Ok(path) => {
                        info!(path = %path.display(), "Opened sandboxed preview");
                        self.toasts.push(Toast::info("Opened in browser"));
                    }
                    Err(e) => self
                        .toasts
                        .push(Toast::error(format!("Could not open browser: {}", e))),
                }
            }
        }
    }

    fn copy_code(&mut self) {
        let Screen::Preview(screen) = &mut self.screen else {
            return;
        };
        let Some(code) = screen.state().artifact().map(|a| a.code.clone()) else {
            return;
        };
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(code)) {
            Ok(()) => {
                screen.state_mut().mark_copied(Instant::now());
                self.toasts
                    .push(Toast::success("Copied!").with_duration(COPY_ACK_DURATION));
            }
            Err(e) => {
                warn!(error = %e, "Clipboard unavailable");
                self.toasts
                    .push(Toast::error(format!("Clipboard unavailable: {}", e)));
            }
        }
    }

    /// Surface a refused action; the screen already shows its own error
    fn refused(&mut self, error: CoreError) {
        match error {
            CoreError::Busy => {}
            CoreError::AuthRequired => self.navigate(Route::Login),
            CoreError::InsufficientTokens(_) => {
                self.toasts
                    .push(Toast::warning("Not enough tokens. Press F2 to buy more."));
            }
            e => debug!(error = %e, "Action refused"),
        }
    }

    fn spawn_task<F>(&self, fut: F)
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let tx = self.task_tx.clone();
        let nav = self.nav_seq;
        tokio::spawn(async move {
            let result = fut.await;
            let _ = tx.send(TaskMessage { nav, result });
        });
    }

    /// Fetch the balance in the background; the result arrives as an event
    pub fn refresh_balance(&self) {
        let Some(user_id) = self.client.session().user_id() else {
            return;
        };
        let client = self.client.clone();
        tokio::spawn(async move {
            client
                .balance()
                .refresh_logged(client.backend(), &user_id)
                .await;
        });
    }

    /// Check for client events (non-blocking)
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                ClientEvent::SignedIn(user_id) => {
                    debug!(user_id, "Session established");
                }
                ClientEvent::SignedOut => {
                    self.toasts.push(Toast::info("Signed out"));
                    if self.route.requires_session() {
                        self.navigate(Route::Login);
                    }
                }
                ClientEvent::BalanceUpdated(_) => {
                    self.status_message = None;
                }
                ClientEvent::BalanceRefreshFailed(msg) => {
                    self.status_message = Some(format!("Balance refresh failed: {}", msg));
                }
                ClientEvent::TokensPurchased(_) => self.refresh_balance(),
            }
        }
    }

    /// Apply finished backend requests (non-blocking)
    pub fn poll_tasks(&mut self) {
        while let Ok(message) = self.task_rx.try_recv() {
            self.apply_task(message);
        }
    }

    /// Per-frame timers: toasts, spinner, pricing redirect
    pub fn tick(&mut self, now: Instant) {
        self.toasts.clear_expired(now);
        self.spinner.tick();
        if let Screen::Pricing(screen) = &mut self.screen {
            if let Some(action) = screen.tick(now) {
                self.dispatch(action);
            }
        }
    }

    pub(crate) fn apply_task(&mut self, message: TaskMessage) {
        let current = message.nav == self.nav_seq;

        match message.result {
            TaskResult::SignedIn(result) => {
                let error = result.as_ref().err().map(|e| e.to_string());
                if let (true, Screen::Login(screen)) = (current, &mut self.screen) {
                    screen.finish(error);
                }
                if let Ok(session) = result {
                    self.toasts.push(Toast::success(format!(
                        "Signed in as {}",
                        session.user.display_name()
                    )));
                    if current {
                        self.navigate(Route::Generate);
                    }
                }
            }
            // Best-effort save; a failure is only logged
            TaskResult::Persisted { website_id, saved } => {
                debug!(website_id, saved, "Edit persisted");
            }
            _ if !current => debug!("Dropping result for a screen that is gone"),
            TaskResult::Analyzed { epoch, result } => {
                let Screen::Generate(screen) = &mut self.screen else {
                    return;
                };
                if screen.workflow().epoch() != epoch {
                    debug!(epoch, "Dropping analysis from before reset");
                    return;
                }
                if screen.workflow_mut().complete_analyze(result).is_ok() {
                    self.refresh_balance();
                }
            }
            TaskResult::Generated { epoch, result } => {
                let Screen::Generate(screen) = &mut self.screen else {
                    return;
                };
                if screen.workflow().epoch() != epoch {
                    debug!(epoch, "Dropping generation from before reset");
                    return;
                }
                if let Ok(route) = screen.workflow_mut().complete_generate(result) {
                    self.refresh_balance();
                    self.toasts.push(Toast::success("Website generated"));
                    self.navigate(route);
                }
            }
            TaskResult::Fetched(result) => {
                if let Screen::Preview(screen) = &mut self.screen {
                    screen.state_mut().apply_fetch(result);
                }
            }
            TaskResult::Edited(result) => {
                let Screen::Preview(screen) = &mut self.screen else {
                    return;
                };
                let (state, edit) = screen.parts_mut();
                let Some(artifact) = state.artifact_mut() else {
                    return;
                };
                if edit.complete_submit(result, artifact, Instant::now()).is_err() {
                    return;
                }
                let edited = artifact.clone();
                self.toasts.push(Toast::success(SUCCESS_NOTICE));
                let backend = self.client.backend_arc();
                self.spawn_task(async move {
                    let saved = persist_best_effort(backend.as_ref(), &edited).await;
                    TaskResult::Persisted {
                        website_id: edited.id,
                        saved,
                    }
                });
                self.refresh_balance();
            }
            TaskResult::Purchased(result) => {
                let Screen::Pricing(screen) = &mut self.screen else {
                    return;
                };
                if let Ok(package) = screen.flow_mut().complete_purchase(result, Instant::now()) {
                    self.client
                        .event_bus()
                        .publish(ClientEvent::TokensPurchased(package.tokens));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sitegen_core::{Backend, Config, MemoryStore};
    use sitegen_types::{
        AnalyzeRequest, BalanceData, BalanceResponse, EditWebsiteRequest, GenerateRequest,
        GenerationPlan, GoogleAuthResponse, PurchaseRequest, UserProfile,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct StubBackend {
        fail_update: bool,
        updates: AtomicUsize,
    }

    #[async_trait]
    impl Backend for StubBackend {
        async fn verify_google(&self, _id_token: &str) -> Result<GoogleAuthResponse, CoreError> {
            Ok(GoogleAuthResponse {
                ok: true,
                token: Some("jwt".to_string()),
                user: Some(user()),
                error: None,
            })
        }

        async fn token_balance(&self, _user_id: &str) -> Result<BalanceResponse, CoreError> {
            Ok(BalanceResponse {
                success: true,
                data: Some(BalanceData {
                    token_balance: 40_000,
                }),
            })
        }

        async fn purchase_tokens(&self, _request: &PurchaseRequest) -> Result<(), CoreError> {
            Ok(())
        }

        async fn analyze(&self, _request: &AnalyzeRequest) -> Result<AnalyzeResponse, CoreError> {
            Ok(AnalyzeResponse {
                session_id: "s1".to_string(),
                plan: GenerationPlan::default(),
            })
        }

        async fn generate(&self, _request: &GenerateRequest) -> Result<GenerateResponse, CoreError> {
            Ok(GenerateResponse {
                website_id: "w1".to_string(),
            })
        }

        async fn fetch_website(&self, website_id: &str) -> Result<WebsiteArtifact, CoreError> {
            Ok(WebsiteArtifact::new(website_id, "<h1>Hi</h1>", None))
        }

        async fn edit_website(
            &self,
            _request: &EditWebsiteRequest,
        ) -> Result<EditWebsiteResponse, CoreError> {
            Ok(EditWebsiteResponse {
                updated_code: "<h1>Blue</h1>".to_string(),
            })
        }

        async fn update_website(&self, _website_id: &str, _code: &str) -> Result<(), CoreError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            if self.fail_update {
                return Err(CoreError::Backend {
                    status: 500,
                    message: "Failed to save website".to_string(),
                });
            }
            Ok(())
        }
    }

    fn user() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            picture: None,
        }
    }

    fn app(signed_in: bool) -> App {
        app_with(signed_in, Arc::new(StubBackend::default()))
    }

    fn app_with(signed_in: bool, backend: Arc<StubBackend>) -> App {
        let client = SitegenClient::new(Config::default(), backend, Arc::new(MemoryStore::new()))
        .unwrap();
        if signed_in {
            client
                .session()
                .establish(Session {
                    token: "jwt".to_string(),
                    user: user(),
                })
                .unwrap();
        }
        App::new(client, ColorScheme::Dark)
    }

    async fn settle(app: &mut App) {
        for _ in 0..20 {
            tokio::task::yield_now().await;
            app.poll_tasks();
        }
    }

    #[tokio::test]
    async fn test_gated_routes_redirect_to_login() {
        let mut app = app(false);
        app.navigate(Route::Generate);
        assert_eq!(app.route, Route::Login);
        assert!(matches!(app.screen, Screen::Login(_)));
        assert!(!app.is_refreshing_balance());
    }

    #[tokio::test]
    async fn test_landing_redirects_signed_in_user() {
        let mut app = app(true);
        app.navigate(Route::Landing);
        assert_eq!(app.route, Route::Generate);
        assert!(app.is_refreshing_balance());
    }

    #[tokio::test]
    async fn test_analyze_and_generate_reach_preview() {
        let mut app = app(true);
        app.navigate(Route::Generate);
        app.client.balance().set(40_000);

        if let Screen::Generate(screen) = &mut app.screen {
            screen.workflow_mut().set_prompt("Coffee shop");
        }
        app.dispatch(Action::Analyze);
        settle(&mut app).await;
        let Screen::Generate(screen) = &app.screen else {
            panic!("expected generate screen");
        };
        assert_eq!(screen.workflow().session_id(), Some("s1"));

        app.dispatch(Action::Generate);
        settle(&mut app).await;
        assert_eq!(app.route, Route::Preview("w1".to_string()));
        let Screen::Preview(screen) = &app.screen else {
            panic!("expected preview screen");
        };
        assert_eq!(screen.state().artifact().unwrap().code, "<h1>Hi</h1>");
    }

    #[tokio::test]
    async fn test_stale_analysis_is_dropped_after_navigation() {
        let mut app = app(true);
        app.navigate(Route::Generate);
        app.client.balance().set(40_000);
        if let Screen::Generate(screen) = &mut app.screen {
            screen.workflow_mut().set_prompt("Coffee shop");
        }
        app.dispatch(Action::Analyze);
        app.navigate(Route::Generate);
        settle(&mut app).await;

        let Screen::Generate(screen) = &app.screen else {
            panic!("expected generate screen");
        };
        assert_eq!(screen.workflow().session_id(), None);
        assert!(!screen.workflow().is_busy());
    }

    #[tokio::test]
    async fn test_edit_replaces_code_and_toasts() {
        let mut app = app(true);
        app.navigate(Route::Preview("w1".to_string()));
        settle(&mut app).await;
        app.client.balance().set(40_000);

        app.dispatch(Action::OpenEdit);
        if let Screen::Preview(screen) = &mut app.screen {
            let (_, edit) = screen.parts_mut();
            edit.set_instruction("Make it blue");
        }
        app.dispatch(Action::SubmitEdit);
        settle(&mut app).await;

        let Screen::Preview(screen) = &app.screen else {
            panic!("expected preview screen");
        };
        assert_eq!(screen.state().artifact().unwrap().code, "<h1>Blue</h1>");
        assert!(!screen.edit().is_open());
        assert_eq!(app.toasts.latest().unwrap().message, SUCCESS_NOTICE);
    }

    #[tokio::test]
    async fn test_failed_save_after_edit_stays_silent() {
        let backend = Arc::new(StubBackend {
            fail_update: true,
            ..Default::default()
        });
        let mut app = app_with(true, backend.clone());
        app.navigate(Route::Preview("w1".to_string()));
        settle(&mut app).await;
        app.client.balance().set(40_000);

        app.dispatch(Action::OpenEdit);
        if let Screen::Preview(screen) = &mut app.screen {
            let (_, edit) = screen.parts_mut();
            edit.set_instruction("Make it blue");
        }
        app.dispatch(Action::SubmitEdit);
        settle(&mut app).await;

        assert_eq!(backend.updates.load(Ordering::SeqCst), 1);
        let Screen::Preview(screen) = &app.screen else {
            panic!("expected preview screen");
        };
        assert_eq!(screen.state().artifact().unwrap().code, "<h1>Blue</h1>");
        assert_eq!(screen.state().error(), None);
        assert_eq!(app.toasts.latest().unwrap().message, SUCCESS_NOTICE);
    }

    #[tokio::test]
    async fn test_low_balance_refuses_edit_with_toast() {
        let mut app = app(true);
        app.navigate(Route::Preview("w1".to_string()));
        settle(&mut app).await;
        app.client.balance().set(10_000);

        app.dispatch(Action::OpenEdit);
        let Screen::Preview(screen) = &app.screen else {
            panic!("expected preview screen");
        };
        assert!(!screen.edit().is_open());
        assert!(screen.state().error().unwrap().contains("35.0"));
        assert!(app.toasts.latest().unwrap().message.contains("F2"));
    }

    #[tokio::test]
    async fn test_pricing_remembers_origin() {
        let mut app = app(true);
        app.navigate(Route::Preview("w1".to_string()));
        app.dispatch(Action::OpenPricing);
        assert_eq!(
            app.route,
            Route::Pricing {
                return_to: Some("/preview/w1".to_string())
            }
        );
        assert!(!app.is_refreshing_balance());

        app.dispatch(Action::Purchase("starter"));
        settle(&mut app).await;
        let Screen::Pricing(screen) = &app.screen else {
            panic!("expected pricing screen");
        };
        assert_eq!(
            screen.flow().success(),
            Some("Successfully added 100 tokens to your account!")
        );
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let mut app = app(true);
        app.navigate(Route::Generate);
        assert!(app.handle_key(KeyCode::F(9), KeyModifiers::NONE));
        app.poll_events();
        assert_eq!(app.route, Route::Login);
        assert!(!app.client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_in_lands_on_generate() {
        let mut app = app(false);
        app.navigate(Route::Login);
        app.dispatch(Action::SignIn("google-id-token".to_string()));
        settle(&mut app).await;
        assert_eq!(app.route, Route::Generate);
        assert!(app.client.session().is_authenticated());
    }
}
