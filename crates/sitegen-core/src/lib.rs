//! sitegen-core - Core library for sitegen
//!
//! Provides the session context, token gate, backend client, generation and
//! edit workflows, preview helpers and the pricing flow.

pub mod api;
pub mod balance;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod gate;
pub mod preview;
pub mod pricing;
pub mod routes;
pub mod session;
pub mod storage;
pub mod workflow;

pub use api::{Backend, HttpBackend};
pub use balance::{BalanceTracker, RefreshHandle};
pub use client::SitegenClient;
pub use config::{Config, ConfigOverrides};
pub use error::CoreError;
pub use event::{ClientEvent, EventBus};
pub use gate::{format_tokens, GatedAction, TokenGate, MINIMUM_TOKENS};
pub use preview::{PreviewState, ViewMode};
pub use pricing::{PricingFlow, TokenPackage, TOKEN_PACKAGES};
pub use routes::Route;
pub use session::{Session, SessionContext};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use workflow::{EditModalState, EditWorkflow, GenerationStep, GenerationWorkflow};
