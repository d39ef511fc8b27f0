//! sitegen-types - Shared wire types for sitegen
//!
//! Pure serde data structures exchanged with the generation backend.
//! No tokio, no HTTP client - just types.
//!
//! Used by:
//! - sitegen-core (workflows, API client)
//! - sitegen-tui (terminal UI)
//! - sitegen (CLI)

pub mod api;
pub mod plan;
pub mod user;
pub mod website;

pub use api::{
    AnalyzeRequest, AnalyzeResponse, BalanceData, BalanceResponse, EditWebsiteRequest,
    EditWebsiteResponse, ErrorBody, GenerateRequest, GenerateResponse, GoogleAuthRequest,
    GoogleAuthResponse, PurchaseRequest, UpdateWebsiteRequest, WebsiteData, WebsiteResponse,
};
pub use plan::GenerationPlan;
pub use user::UserProfile;
pub use website::WebsiteArtifact;
