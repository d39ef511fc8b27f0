//! Generation and edit workflows
//!
//! Both workflows are explicit state machines. Each network step is split
//! into a `begin_*` transition (validation, gate check, request building) and
//! a `complete_*` transition (applying the backend result), so a front-end
//! can run the request wherever it likes. The async helpers on each workflow
//! chain the two for callers that simply await.

pub mod edit;
pub mod generate;

pub use edit::{
    persist_best_effort, EditModalState, EditOutcome, EditWorkflow, EXAMPLE_EDITS, SUCCESS_NOTICE,
};
pub use generate::{GenerationStep, GenerationWorkflow, EXAMPLE_PROMPTS};
