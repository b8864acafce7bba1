//! HTTP client for the generative-language endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use docbase_core::{DocbaseError, Result};

use crate::backend::GenerativeBackend;

/// Default generateContent endpoint.
pub const DEFAULT_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Every backend call is bounded by this timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

// Response structs stay lenient: every level is optional so a shape change
// upstream surfaces as "no text" instead of a decode failure.
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Client for the generative-language REST endpoint.
///
/// The API key travels as a query parameter and is never logged.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    config: GenerationConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Build a client against the default endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`DocbaseError::Backend`] when the HTTP client cannot be
    /// constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Build a client against a custom endpoint (proxies, tests).
    ///
    /// # Errors
    ///
    /// Returns [`DocbaseError::Backend`] when the HTTP client cannot be
    /// constructed.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DocbaseError::Backend(e.to_string()))?;
        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            config: GenerationConfig::default(),
            http,
        })
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!(endpoint = %self.base_url, "calling generative backend");
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: self.config,
        };
        let response = self
            .http
            .post(format!("{}?key={}", self.base_url, self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| DocbaseError::Backend(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DocbaseError::Backend(e.to_string()))?;
        if !status.is_success() {
            return Err(DocbaseError::BackendStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let reply: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| DocbaseError::MalformedResponse(e.to_string()))?;
        reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| DocbaseError::MalformedResponse("reply carried no text".to_string()))
    }
}
