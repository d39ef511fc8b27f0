//! Generation workflow: `input → plan → generating`
//!
//! Submitting a prompt runs the analysis step and yields a design plan;
//! confirming the plan runs generation and routes to the preview of the new
//! website. Both steps are token-gated and only one request may be in flight.

use crate::api::Backend;
use crate::balance::BalanceTracker;
use crate::error::CoreError;
use crate::gate::{GatedAction, TokenGate};
use crate::routes::Route;
use crate::session::SessionContext;
use sitegen_types::{AnalyzeRequest, AnalyzeResponse, GenerateRequest, GenerateResponse, GenerationPlan};
use tracing::{info, warn};

/// Quick-pick prompts offered on the input step
pub const EXAMPLE_PROMPTS: [&str; 4] = [
    "Modern tech startup landing page with sleek design",
    "Cozy coffee shop website with menu showcase",
    "Fitness gym website with class schedules",
    "Luxury hotel website with booking system",
];

const EMPTY_PROMPT: &str = "Please enter a prompt";

/// Visible step of the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStep {
    Input,
    Plan,
    Generating,
}

impl GenerationStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStep::Input => "input",
            GenerationStep::Plan => "plan",
            GenerationStep::Generating => "generating",
        }
    }
}

#[derive(Debug, Clone)]
enum State {
    Input,
    Plan {
        session_id: String,
        plan: GenerationPlan,
    },
    Generating {
        session_id: String,
        plan: GenerationPlan,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Analyze,
    Generate,
}

/// State of one generation session on the generate screen
#[derive(Debug, Clone)]
pub struct GenerationWorkflow {
    prompt: String,
    state: State,
    pending: Option<Pending>,
    error: Option<String>,
    website_id: Option<String>,
    epoch: u64,
    gate: TokenGate,
}

impl Default for GenerationWorkflow {
    fn default() -> Self {
        Self::new(TokenGate::default())
    }
}

impl GenerationWorkflow {
    pub fn new(gate: TokenGate) -> Self {
        Self {
            prompt: String::new(),
            state: State::Input,
            pending: None,
            error: None,
            website_id: None,
            epoch: 0,
            gate,
        }
    }

    pub fn step(&self) -> GenerationStep {
        match self.state {
            State::Input => GenerationStep::Input,
            State::Plan { .. } => GenerationStep::Plan,
            State::Generating { .. } => GenerationStep::Generating,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Edit the prompt; ignored outside the input step or while analyzing
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        if matches!(self.state, State::Input) && !self.is_busy() {
            self.prompt = prompt.into();
        }
    }

    /// Pre-fill the prompt with one of [`EXAMPLE_PROMPTS`]. Never submits.
    pub fn use_example(&mut self, index: usize) -> Option<&'static str> {
        let example = EXAMPLE_PROMPTS.get(index).copied()?;
        self.set_prompt(example);
        Some(example)
    }

    pub fn plan(&self) -> Option<&GenerationPlan> {
        match &self.state {
            State::Plan { plan, .. } | State::Generating { plan, .. } => Some(plan),
            State::Input => None,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match &self.state {
            State::Plan { session_id, .. } | State::Generating { session_id, .. } => {
                Some(session_id.as_str())
            }
            State::Input => None,
        }
    }

    /// Last user-facing error, cleared when the next step starts
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Website produced by a successful generation
    pub fn website_id(&self) -> Option<&str> {
        self.website_id.as_deref()
    }

    /// Incremented on every reset; completions captured under an older epoch
    /// are stale and must be dropped by the caller.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Start prompt analysis.
    ///
    /// Checks, in order: busy guard, step, empty prompt, session, token gate.
    /// Every refusal except the busy guard is recorded as the screen error.
    pub fn begin_analyze(&mut self, user_id: Option<&str>, balance: u64) -> Result<AnalyzeRequest, CoreError> {
        if self.is_busy() {
            return Err(CoreError::Busy);
        }
        if !matches!(self.state, State::Input) {
            return Err(CoreError::InvalidTransition {
                state: self.step().as_str(),
                action: "analyze",
            });
        }

        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return self.refuse(CoreError::empty_input(EMPTY_PROMPT));
        }
        let Some(user_id) = user_id else {
            return self.refuse(CoreError::AuthRequired);
        };
        if let Err(e) = self.gate.check(GatedAction::Analyze, balance) {
            return self.refuse(e);
        }

        let request = AnalyzeRequest {
            prompt: self.prompt.clone(),
            user_id: user_id.to_string(),
        };
        self.error = None;
        self.pending = Some(Pending::Analyze);
        Ok(request)
    }

    /// Apply the analysis result: `input → plan` on success, stay on input
    /// with the error otherwise.
    pub fn complete_analyze(&mut self, result: Result<AnalyzeResponse, CoreError>) -> Result<(), CoreError> {
        if self.pending != Some(Pending::Analyze) {
            return Err(CoreError::InvalidTransition {
                state: self.step().as_str(),
                action: "complete analysis",
            });
        }
        self.pending = None;

        match result {
            Ok(response) => {
                info!(
                    session_id = %response.session_id,
                    sections = response.plan.section_count(),
                    "Prompt analyzed"
                );
                self.state = State::Plan {
                    session_id: response.session_id,
                    plan: response.plan,
                };
                Ok(())
            }
            Err(e) => self.refuse(e),
        }
    }

    /// Start generation from the current plan, re-checking the token gate
    pub fn begin_generate(&mut self, balance: u64) -> Result<GenerateRequest, CoreError> {
        if self.is_busy() {
            return Err(CoreError::Busy);
        }
        let (session_id, plan) = match &self.state {
            State::Plan { session_id, plan } => (session_id.clone(), plan.clone()),
            _ => {
                return Err(CoreError::InvalidTransition {
                    state: self.step().as_str(),
                    action: "generate",
                })
            }
        };
        if let Err(e) = self.gate.check(GatedAction::Generate, balance) {
            return self.refuse(e);
        }

        self.error = None;
        self.pending = Some(Pending::Generate);
        self.state = State::Generating {
            session_id: session_id.clone(),
            plan,
        };
        Ok(GenerateRequest { session_id })
    }

    /// Apply the generation result.
    ///
    /// Success yields the preview route of the new website. Failure reverts
    /// to the plan step with plan and session id intact.
    pub fn complete_generate(&mut self, result: Result<GenerateResponse, CoreError>) -> Result<Route, CoreError> {
        if self.pending != Some(Pending::Generate) {
            return Err(CoreError::InvalidTransition {
                state: self.step().as_str(),
                action: "complete generation",
            });
        }
        self.pending = None;

        match result {
            Ok(response) => {
                info!(website_id = %response.website_id, "Website generated");
                self.website_id = Some(response.website_id.clone());
                Ok(Route::Preview(response.website_id))
            }
            Err(e) => {
                if let State::Generating { session_id, plan } =
                    std::mem::replace(&mut self.state, State::Input)
                {
                    self.state = State::Plan { session_id, plan };
                }
                warn!(error = %e, "Generation failed");
                self.refuse(e)
            }
        }
    }

    /// Back to the input step with prompt, plan, session id and error cleared
    pub fn reset(&mut self) {
        self.prompt.clear();
        self.state = State::Input;
        self.pending = None;
        self.error = None;
        self.website_id = None;
        self.epoch += 1;
    }

    /// Run analysis end to end, refreshing the balance on success
    pub async fn analyze(
        &mut self,
        backend: &dyn Backend,
        session: &SessionContext,
        balance: &BalanceTracker,
    ) -> Result<(), CoreError> {
        let user_id = session.user_id();
        let request = self.begin_analyze(user_id.as_deref(), balance.current())?;
        let result = backend.analyze(&request).await;
        if result.is_ok() {
            balance.refresh_logged(backend, &request.user_id).await;
        }
        self.complete_analyze(result)
    }

    /// Run generation end to end, refreshing the balance on success
    pub async fn generate(
        &mut self,
        backend: &dyn Backend,
        session: &SessionContext,
        balance: &BalanceTracker,
    ) -> Result<Route, CoreError> {
        let request = self.begin_generate(balance.current())?;
        let result = backend.generate(&request).await;
        if result.is_ok() {
            if let Some(user_id) = session.user_id() {
                balance.refresh_logged(backend, &user_id).await;
            }
        }
        self.complete_generate(result)
    }

    fn refuse<T>(&mut self, error: CoreError) -> Result<T, CoreError> {
        self.error = Some(error.to_string());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzed() -> AnalyzeResponse {
        AnalyzeResponse {
            session_id: "s1".to_string(),
            plan: GenerationPlan::from(serde_json::json!({
                "websiteType": "Coffee shop",
                "sections": ["Hero", "Menu"],
            })),
        }
    }

    fn in_plan() -> GenerationWorkflow {
        let mut wf = GenerationWorkflow::default();
        wf.set_prompt("Coffee shop site");
        wf.begin_analyze(Some("u1"), 40_000).unwrap();
        wf.complete_analyze(Ok(analyzed())).unwrap();
        wf
    }

    #[test]
    fn test_analyze_moves_to_plan() {
        let wf = in_plan();
        assert_eq!(wf.step(), GenerationStep::Plan);
        assert_eq!(wf.session_id(), Some("s1"));
        assert_eq!(wf.plan().unwrap().section_count(), 2);
        assert!(!wf.is_busy());
    }

    #[test]
    fn test_empty_prompt_is_rejected() {
        let mut wf = GenerationWorkflow::default();
        wf.set_prompt("   ");
        let err = wf.begin_analyze(Some("u1"), 40_000).unwrap_err();
        assert!(matches!(err, CoreError::EmptyInput { .. }));
        assert_eq!(wf.error(), Some("Please enter a prompt"));
        assert_eq!(wf.step(), GenerationStep::Input);
    }

    #[test]
    fn test_missing_session_is_rejected() {
        let mut wf = GenerationWorkflow::default();
        wf.set_prompt("Coffee shop site");
        assert!(matches!(
            wf.begin_analyze(None, 40_000),
            Err(CoreError::AuthRequired)
        ));
        assert_eq!(wf.error(), Some("Please login first"));
    }

    #[test]
    fn test_low_balance_blocks_analyze() {
        let mut wf = GenerationWorkflow::default();
        wf.set_prompt("Coffee shop site");
        let err = wf.begin_analyze(Some("u1"), 34_999).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientTokens(_)));
        assert!(wf.error().unwrap().contains("generate a website"));
        assert!(!wf.is_busy());
        assert_eq!(wf.step(), GenerationStep::Input);
    }

    #[test]
    fn test_busy_guard_rejects_second_trigger() {
        let mut wf = GenerationWorkflow::default();
        wf.set_prompt("Coffee shop site");
        wf.begin_analyze(Some("u1"), 40_000).unwrap();
        assert!(matches!(
            wf.begin_analyze(Some("u1"), 40_000),
            Err(CoreError::Busy)
        ));
        assert_eq!(wf.error(), None);
    }

    #[test]
    fn test_prompt_is_frozen_while_analyzing() {
        let mut wf = GenerationWorkflow::default();
        wf.set_prompt("Coffee shop site");
        wf.begin_analyze(Some("u1"), 40_000).unwrap();
        wf.set_prompt("something else");
        assert_eq!(wf.prompt(), "Coffee shop site");
    }

    #[test]
    fn test_failed_analyze_stays_on_input() {
        let mut wf = GenerationWorkflow::default();
        wf.set_prompt("Coffee shop site");
        wf.begin_analyze(Some("u1"), 40_000).unwrap();
        let err = wf
            .complete_analyze(Err(CoreError::Backend {
                status: 500,
                message: "Failed to analyze prompt".to_string(),
            }))
            .unwrap_err();
        assert!(err.is_backend_failure());
        assert_eq!(wf.step(), GenerationStep::Input);
        assert_eq!(wf.error(), Some("Failed to analyze prompt"));
        assert_eq!(wf.prompt(), "Coffee shop site");
    }

    #[test]
    fn test_generate_success_routes_to_preview() {
        let mut wf = in_plan();
        let request = wf.begin_generate(40_000).unwrap();
        assert_eq!(request.session_id, "s1");
        assert_eq!(wf.step(), GenerationStep::Generating);

        let route = wf
            .complete_generate(Ok(GenerateResponse {
                website_id: "w42".to_string(),
            }))
            .unwrap();
        assert_eq!(route, Route::Preview("w42".to_string()));
        assert_eq!(wf.website_id(), Some("w42"));
    }

    #[test]
    fn test_failed_generate_reverts_to_plan() {
        let mut wf = in_plan();
        wf.begin_generate(40_000).unwrap();
        wf.complete_generate(Err(CoreError::Backend {
            status: 502,
            message: "Failed to generate website".to_string(),
        }))
        .unwrap_err();

        assert_eq!(wf.step(), GenerationStep::Plan);
        assert_eq!(wf.session_id(), Some("s1"));
        assert!(wf.plan().is_some());
        assert_eq!(wf.error(), Some("Failed to generate website"));
    }

    #[test]
    fn test_generate_rechecks_gate() {
        let mut wf = in_plan();
        assert!(matches!(
            wf.begin_generate(10_000),
            Err(CoreError::InsufficientTokens(_))
        ));
        assert_eq!(wf.step(), GenerationStep::Plan);
        assert!(!wf.is_busy());
    }

    #[test]
    fn test_generate_requires_plan() {
        let mut wf = GenerationWorkflow::default();
        assert!(matches!(
            wf.begin_generate(40_000),
            Err(CoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_reset_clears_everything_from_any_step() {
        let mut input = GenerationWorkflow::default();
        input.set_prompt("x");
        let mut plan = in_plan();
        let mut generating = in_plan();
        generating.begin_generate(40_000).unwrap();

        for wf in [&mut input, &mut plan, &mut generating] {
            let epoch = wf.epoch();
            wf.reset();
            assert_eq!(wf.step(), GenerationStep::Input);
            assert_eq!(wf.prompt(), "");
            assert!(wf.plan().is_none());
            assert!(wf.session_id().is_none());
            assert!(wf.error().is_none());
            assert!(!wf.is_busy());
            assert_eq!(wf.epoch(), epoch + 1);
        }
    }

    #[test]
    fn test_stale_completion_after_reset_is_rejected() {
        let mut wf = GenerationWorkflow::default();
        wf.set_prompt("Coffee shop site");
        wf.begin_analyze(Some("u1"), 40_000).unwrap();
        wf.reset();
        assert!(matches!(
            wf.complete_analyze(Ok(analyzed())),
            Err(CoreError::InvalidTransition { .. })
        ));
        assert_eq!(wf.step(), GenerationStep::Input);
    }

    #[test]
    fn test_use_example_prefills_without_submitting() {
        let mut wf = GenerationWorkflow::default();
        assert_eq!(wf.use_example(1), Some("Cozy coffee shop website with menu showcase"));
        assert_eq!(wf.prompt(), EXAMPLE_PROMPTS[1]);
        assert!(!wf.is_busy());
        assert_eq!(wf.use_example(9), None);
    }
}
