//! Request and response envelopes for the generation backend
//!
//! Field names follow the backend's JSON (camelCase, except the sign-in
//! request which uses `id_token`).

use crate::plan::GenerationPlan;
use crate::user::UserProfile;
use serde::{Deserialize, Serialize};

/// Error body returned with any non-2xx response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

// ===================
// Auth server
// ===================

#[derive(Debug, Clone, Serialize)]
pub struct GoogleAuthRequest {
    pub id_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleAuthResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalanceResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<BalanceData>,
}

impl BalanceResponse {
    /// Raw balance, only when the backend flagged the response successful
    pub fn balance(&self) -> Option<u64> {
        if !self.success {
            return None;
        }
        self.data.as_ref().map(|d| d.token_balance)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceData {
    #[serde(default)]
    pub token_balance: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub user_id: String,
    pub tokens: u64,
    pub package_name: String,
}

// ===================
// Generation API
// ===================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub prompt: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub session_id: String,
    pub plan: GenerationPlan,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub website_id: String,
}

/// `GET /api/website/{id}` body; the id is not echoed back
#[derive(Debug, Clone, Deserialize)]
pub struct WebsiteResponse {
    pub data: WebsiteData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebsiteData {
    pub code: String,
    #[serde(default)]
    pub plan: Option<GenerationPlan>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditWebsiteRequest {
    pub current_code: String,
    pub edit_prompt: String,
    pub plan: Option<GenerationPlan>,
    pub website_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditWebsiteResponse {
    pub updated_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateWebsiteRequest {
    pub code: String,
}
