//! reqwest implementation of [`Backend`]

use super::{fallback, paths, Backend};
use crate::config::{normalize_base_url, Config};
use crate::error::CoreError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sitegen_types::{
    AnalyzeRequest, AnalyzeResponse, BalanceResponse, EditWebsiteRequest, EditWebsiteResponse,
    ErrorBody, GenerateRequest, GenerateResponse, GoogleAuthRequest, GoogleAuthResponse,
    PurchaseRequest, UpdateWebsiteRequest, WebsiteArtifact, WebsiteResponse,
};
use std::time::Duration;
use tracing::debug;

/// HTTP client for the auth server and the generation API
#[derive(Debug, Clone)]
pub struct HttpBackend {
    api_url: String,
    auth_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, CoreError> {
        Ok(Self {
            api_url: normalize_base_url(&config.api_url)?,
            auth_url: normalize_base_url(&config.auth_url)?,
            timeout: config.request_timeout,
            http: reqwest::Client::new(),
        })
    }

    pub fn api_endpoint(&self, path: &str) -> String {
        join(&self.api_url, path)
    }

    pub fn auth_endpoint(&self, path: &str) -> String {
        join(&self.auth_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        operation: &'static str,
        fallback: &str,
    ) -> Result<T, CoreError> {
        debug!(%url, operation, "GET");
        let response = self
            .http
            .get(url.as_str())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(network_error)?;
        decode_json_response(response, operation, fallback).await
    }

    async fn send_json<Req, Res>(
        &self,
        method: reqwest::Method,
        url: String,
        payload: &Req,
        operation: &'static str,
        fallback: &str,
    ) -> Result<Res, CoreError>
    where
        Req: Serialize + ?Sized + Sync,
        Res: DeserializeOwned,
    {
        debug!(%url, %method, operation, "send");
        let response = self
            .http
            .request(method, url.as_str())
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .map_err(network_error)?;
        decode_json_response(response, operation, fallback).await
    }

    /// Like `send_json` but the success body is not inspected
    async fn send_unit<Req>(
        &self,
        method: reqwest::Method,
        url: String,
        payload: &Req,
        fallback: &str,
    ) -> Result<(), CoreError>
    where
        Req: Serialize + ?Sized + Sync,
    {
        debug!(%url, %method, "send");
        let response = self
            .http
            .request(method, url.as_str())
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let bytes = response.bytes().await.map_err(network_error)?;
        Err(format_http_error(status, &bytes, fallback))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn verify_google(&self, id_token: &str) -> Result<GoogleAuthResponse, CoreError> {
        let url = self.auth_endpoint(paths::GOOGLE_AUTH);
        debug!(%url, "POST sign-in");
        let response = self
            .http
            .post(url.as_str())
            .timeout(self.timeout)
            .json(&GoogleAuthRequest {
                id_token: id_token.to_string(),
            })
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Backend {
                status: status.as_u16(),
                message: format!("HTTP error! status: {}", status.as_u16()),
            });
        }

        let bytes = response.bytes().await.map_err(network_error)?;
        serde_json::from_slice(&bytes).map_err(|e| CoreError::Decode {
            operation: "sign-in",
            message: e.to_string(),
        })
    }

    async fn token_balance(&self, user_id: &str) -> Result<BalanceResponse, CoreError> {
        self.get_json(
            self.auth_endpoint(&paths::balance(user_id)),
            "token balance",
            fallback::BALANCE,
        )
        .await
    }

    async fn purchase_tokens(&self, request: &PurchaseRequest) -> Result<(), CoreError> {
        self.send_unit(
            reqwest::Method::POST,
            self.auth_endpoint(paths::PURCHASE),
            request,
            fallback::PURCHASE,
        )
        .await
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, CoreError> {
        self.send_json(
            reqwest::Method::POST,
            self.api_endpoint(paths::ANALYZE),
            request,
            "analyze",
            fallback::ANALYZE,
        )
        .await
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, CoreError> {
        self.send_json(
            reqwest::Method::POST,
            self.api_endpoint(paths::GENERATE),
            request,
            "generate",
            fallback::GENERATE,
        )
        .await
    }

    async fn fetch_website(&self, website_id: &str) -> Result<WebsiteArtifact, CoreError> {
        let response: WebsiteResponse = self
            .get_json(
                self.api_endpoint(&paths::website(website_id)),
                "website fetch",
                fallback::FETCH_WEBSITE,
            )
            .await?;
        Ok(WebsiteArtifact::new(
            website_id,
            response.data.code,
            response.data.plan,
        ))
    }

    async fn edit_website(
        &self,
        request: &EditWebsiteRequest,
    ) -> Result<EditWebsiteResponse, CoreError> {
        self.send_json(
            reqwest::Method::POST,
            self.api_endpoint(paths::EDIT_WEBSITE),
            request,
            "website edit",
            fallback::EDIT_WEBSITE,
        )
        .await
    }

    async fn update_website(&self, website_id: &str, code: &str) -> Result<(), CoreError> {
        self.send_unit(
            reqwest::Method::PUT,
            self.api_endpoint(&paths::update_website(website_id)),
            &UpdateWebsiteRequest {
                code: code.to_string(),
            },
            fallback::UPDATE_WEBSITE,
        )
        .await
    }
}

fn join(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

fn network_error(error: reqwest::Error) -> CoreError {
    CoreError::Network {
        message: error.to_string(),
    }
}

/// Map a non-2xx response to a backend error.
///
/// The message comes from the `{error}` body when present and non-empty,
/// otherwise the operation's fallback literal.
pub fn format_http_error(status: StatusCode, body: &[u8], fallback: &str) -> CoreError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string());
    CoreError::Backend {
        status: status.as_u16(),
        message,
    }
}

async fn decode_json_response<T: DeserializeOwned>(
    response: reqwest::Response,
    operation: &'static str,
    fallback: &str,
) -> Result<T, CoreError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(network_error)?;

    if !status.is_success() {
        return Err(format_http_error(status, &bytes, fallback));
    }

    serde_json::from_slice::<T>(&bytes).map_err(|e| CoreError::Decode {
        operation,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> HttpBackend {
        let config = Config {
            api_url: "http://api.example.com/".to_string(),
            auth_url: "http://auth.example.com".to_string(),
            ..Config::default()
        };
        HttpBackend::new(&config).unwrap()
    }

    #[test]
    fn test_endpoints_use_matching_base() {
        let backend = backend();
        assert_eq!(
            backend.api_endpoint(paths::ANALYZE),
            "http://api.example.com/api/analyze"
        );
        assert_eq!(
            backend.auth_endpoint(&paths::balance("u1")),
            "http://auth.example.com/api/tokens/balance/u1"
        );
        assert_eq!(
            backend.api_endpoint("api/website/w1"),
            "http://api.example.com/api/website/w1"
        );
    }

    #[test]
    fn test_http_error_uses_body_message() {
        let err = format_http_error(
            StatusCode::BAD_REQUEST,
            br#"{"error": "Prompt too short"}"#,
            fallback::ANALYZE,
        );
        assert!(matches!(err, CoreError::Backend { status: 400, ref message } if message == "Prompt too short"));
    }

    #[test]
    fn test_http_error_falls_back_to_literal() {
        for body in [&b""[..], b"<html>oops</html>", br#"{"error": ""}"#, br#"{"detail": "x"}"#] {
            let err = format_http_error(StatusCode::INTERNAL_SERVER_ERROR, body, fallback::GENERATE);
            assert_eq!(err.to_string(), "Failed to generate website");
        }
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let config = Config {
            api_url: "ftp://nope".to_string(),
            ..Config::default()
        };
        assert!(HttpBackend::new(&config).is_err());
    }
}
