//! Backend contract
//!
//! The generation backend is split across two base URLs: the auth server
//! (sign-in, token ledger) and the generation API (analysis, generation,
//! website storage). [`Backend`] is the seam the workflows depend on;
//! [`HttpBackend`] is the reqwest implementation.

pub mod http;

pub use http::HttpBackend;

use crate::error::CoreError;
use async_trait::async_trait;
use sitegen_types::{
    AnalyzeRequest, AnalyzeResponse, BalanceResponse, EditWebsiteRequest, EditWebsiteResponse,
    GenerateRequest, GenerateResponse, GoogleAuthResponse, PurchaseRequest, WebsiteArtifact,
};

/// Fallback messages used when an error response carries no `error` field
pub mod fallback {
    pub const ANALYZE: &str = "Failed to analyze prompt";
    pub const GENERATE: &str = "Failed to generate website";
    pub const FETCH_WEBSITE: &str = "Failed to load website";
    pub const EDIT_WEBSITE: &str = "Failed to apply changes";
    pub const UPDATE_WEBSITE: &str = "Failed to save website";
    pub const PURCHASE: &str = "Failed to purchase tokens";
    pub const BALANCE: &str = "Failed to fetch token balance";
}

/// Operations the client expects from the backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// Forward a Google `id_token` for verification.
    ///
    /// Non-2xx statuses are errors; a 2xx body with `ok: false` is returned
    /// as-is for the session layer to interpret.
    async fn verify_google(&self, id_token: &str) -> Result<GoogleAuthResponse, CoreError>;

    async fn token_balance(&self, user_id: &str) -> Result<BalanceResponse, CoreError>;

    async fn purchase_tokens(&self, request: &PurchaseRequest) -> Result<(), CoreError>;

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, CoreError>;

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, CoreError>;

    async fn fetch_website(&self, website_id: &str) -> Result<WebsiteArtifact, CoreError>;

    async fn edit_website(
        &self,
        request: &EditWebsiteRequest,
    ) -> Result<EditWebsiteResponse, CoreError>;

    /// Persist edited markup
    async fn update_website(&self, website_id: &str, code: &str) -> Result<(), CoreError>;
}

/// Endpoint paths, relative to the matching base URL
pub mod paths {
    pub const GOOGLE_AUTH: &str = "/api/auth/google";
    pub const PURCHASE: &str = "/api/tokens/purchase";
    pub const ANALYZE: &str = "/api/analyze";
    pub const GENERATE: &str = "/api/generate-complete";
    pub const EDIT_WEBSITE: &str = "/api/edit-website";

    pub fn balance(user_id: &str) -> String {
        format!("/api/tokens/balance/{}", urlencoding::encode(user_id))
    }

    pub fn website(website_id: &str) -> String {
        format!("/api/website/{}", urlencoding::encode(website_id))
    }

    pub fn update_website(website_id: &str) -> String {
        format!("/api/website/{}/update", urlencoding::encode(website_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_helpers_are_deterministic() {
        assert_eq!(paths::balance("42"), "/api/tokens/balance/42");
        assert_eq!(paths::website("abc123"), "/api/website/abc123");
        assert_eq!(paths::update_website("abc123"), "/api/website/abc123/update");
    }

    #[test]
    fn test_path_segments_are_encoded() {
        assert_eq!(paths::website("a/b"), "/api/website/a%2Fb");
    }
}
