//! Edit workflow: `closed → open → submitting → closed`
//!
//! The modal sends the current markup and a free-text instruction to the
//! backend and swaps in whatever markup comes back. Persisting the result is
//! best effort: a failed save is logged and never undoes the local change.

use crate::api::Backend;
use crate::balance::BalanceTracker;
use crate::error::CoreError;
use crate::gate::{GatedAction, TokenGate};
use crate::session::SessionContext;
use sitegen_types::{EditWebsiteRequest, EditWebsiteResponse, WebsiteArtifact};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Quick-pick instructions offered in the modal
pub const EXAMPLE_EDITS: [&str; 4] = [
    "Change the primary color to blue",
    "Add a newsletter signup section",
    "Make the hero text larger and bold",
    "Change the background to dark theme",
];

/// How long the success notice stays visible
pub const SUCCESS_NOTICE_DURATION: Duration = Duration::from_secs(3);

pub const SUCCESS_NOTICE: &str = "Edited Successfully!";

const EMPTY_INSTRUCTION: &str = "Please describe the changes you want to make";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditModalState {
    Closed,
    Open,
    Submitting,
}

impl EditModalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditModalState::Closed => "closed",
            EditModalState::Open => "open",
            EditModalState::Submitting => "submitting",
        }
    }
}

/// Result of a successful edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Whether the backend accepted the updated markup
    pub persisted: bool,
}

#[derive(Debug, Clone)]
pub struct EditWorkflow {
    state: EditModalState,
    instruction: String,
    error: Option<String>,
    succeeded_at: Option<Instant>,
    gate: TokenGate,
}

impl Default for EditWorkflow {
    fn default() -> Self {
        Self::new(TokenGate::default())
    }
}

impl EditWorkflow {
    pub fn new(gate: TokenGate) -> Self {
        Self {
            state: EditModalState::Closed,
            instruction: String::new(),
            error: None,
            succeeded_at: None,
            gate,
        }
    }

    pub fn state(&self) -> EditModalState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != EditModalState::Closed
    }

    pub fn is_busy(&self) -> bool {
        self.state == EditModalState::Submitting
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Error shown inside the modal
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Open the modal if the balance allows editing.
    ///
    /// A refusal leaves the modal closed; the caller shows the error on the
    /// parent screen.
    pub fn open(&mut self, balance: u64) -> Result<(), CoreError> {
        match self.state {
            EditModalState::Submitting => return Err(CoreError::Busy),
            EditModalState::Open => return Ok(()),
            EditModalState::Closed => {}
        }
        self.gate.check(GatedAction::OpenEdit, balance)?;
        self.state = EditModalState::Open;
        self.error = None;
        Ok(())
    }

    /// Close the modal, discarding the instruction. Refused mid-request.
    pub fn close(&mut self) -> Result<(), CoreError> {
        if self.is_busy() {
            return Err(CoreError::Busy);
        }
        self.state = EditModalState::Closed;
        self.instruction.clear();
        self.error = None;
        Ok(())
    }

    /// Edit the instruction; ignored unless the modal is open and idle
    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        if self.state == EditModalState::Open {
            self.instruction = instruction.into();
        }
    }

    /// Pre-fill with one of [`EXAMPLE_EDITS`]. Never submits.
    pub fn use_example(&mut self, index: usize) -> Option<&'static str> {
        let example = EXAMPLE_EDITS.get(index).copied()?;
        self.set_instruction(example);
        Some(example)
    }

    /// Validate and build the edit request: `open → submitting`
    pub fn begin_submit(
        &mut self,
        artifact: &WebsiteArtifact,
        user_id: Option<&str>,
        balance: u64,
    ) -> Result<EditWebsiteRequest, CoreError> {
        match self.state {
            EditModalState::Submitting => return Err(CoreError::Busy),
            EditModalState::Closed => {
                return Err(CoreError::InvalidTransition {
                    state: self.state.as_str(),
                    action: "submit an edit",
                })
            }
            EditModalState::Open => {}
        }

        if self.instruction.trim().is_empty() {
            return self.refuse(CoreError::empty_input(EMPTY_INSTRUCTION));
        }
        if let Err(e) = self.gate.check(GatedAction::ApplyEdit, balance) {
            return self.refuse(e);
        }
        let Some(user_id) = user_id else {
            return self.refuse(CoreError::AuthRequired);
        };

        self.state = EditModalState::Submitting;
        self.error = None;
        Ok(EditWebsiteRequest {
            current_code: artifact.code.clone(),
            edit_prompt: self.instruction.clone(),
            plan: artifact.plan.clone(),
            website_id: artifact.id.clone(),
            user_id: user_id.to_string(),
        })
    }

    /// Apply the edit result.
    ///
    /// Success replaces the artifact markup, closes the modal and starts the
    /// success notice. Failure returns to `open` with the error in the modal.
    pub fn complete_submit(
        &mut self,
        result: Result<EditWebsiteResponse, CoreError>,
        artifact: &mut WebsiteArtifact,
        now: Instant,
    ) -> Result<(), CoreError> {
        if self.state != EditModalState::Submitting {
            return Err(CoreError::InvalidTransition {
                state: self.state.as_str(),
                action: "complete an edit",
            });
        }

        match result {
            Ok(response) => {
                artifact.replace_code(response.updated_code);
                info!(website_id = %artifact.id, bytes = artifact.code_len(), "Website edited");
                self.state = EditModalState::Closed;
                self.instruction.clear();
                self.error = None;
                self.succeeded_at = Some(now);
                Ok(())
            }
            Err(e) => {
                self.state = EditModalState::Open;
                self.refuse(e)
            }
        }
    }

    /// Whether the success notice is still visible at `now`
    pub fn success_visible(&self, now: Instant) -> bool {
        self.succeeded_at
            .is_some_and(|at| now.saturating_duration_since(at) < SUCCESS_NOTICE_DURATION)
    }

    /// Run an edit end to end: request, local replace, best-effort persist,
    /// balance refresh.
    pub async fn submit(
        &mut self,
        backend: &dyn Backend,
        session: &SessionContext,
        balance: &BalanceTracker,
        artifact: &mut WebsiteArtifact,
    ) -> Result<EditOutcome, CoreError> {
        let user_id = session.user_id();
        let request = self.begin_submit(artifact, user_id.as_deref(), balance.current())?;
        let result = backend.edit_website(&request).await;
        self.complete_submit(result, artifact, Instant::now())?;

        let persisted = persist_best_effort(backend, artifact).await;
        balance.refresh_logged(backend, &request.user_id).await;
        Ok(EditOutcome { persisted })
    }

    fn refuse<T>(&mut self, error: CoreError) -> Result<T, CoreError> {
        self.error = Some(error.to_string());
        Err(error)
    }
}

/// Save edited markup; failures are logged and reported as `false`
pub async fn persist_best_effort(backend: &dyn Backend, artifact: &WebsiteArtifact) -> bool {
    match backend.update_website(&artifact.id, &artifact.code).await {
        Ok(()) => true,
        Err(e) => {
            warn!(website_id = %artifact.id, error = %e, "Failed to save edited website");
            false
        }
    }
}
