//! Document analyzer backed by the Google Generative Language API.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::prompt::{response_schema, AUDIT_PROMPT};
use super::{AnalyzeError, DocumentAnalyzer, Document, RawExtraction};
use crate::config::AnalyzerConfig;
use crate::sanitize::truncate_for_log;
use crate::secrets::resolve_secret;

/// Connect timeout for provider requests. The overall per-call deadline is
/// enforced by [`super::ResilientAnalyzer`].
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Finish reasons that mean the provider refused to answer.
const REFUSAL_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

pub struct GeminiAnalyzer {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl GeminiAnalyzer {
    /// Builds an analyzer from configuration, resolving the API key from the
    /// inline value, key file, or environment variable (in that order).
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalyzeError> {
        let api_key = resolve_secret(
            config.api_key.as_deref(),
            config.api_key_file.as_deref(),
            config.api_key_env_var.as_deref(),
        )
        .map_err(|e| AnalyzeError::Config(e.to_string()))?;

        Self::new(&config.base_url, &config.model, api_key)
    }

    pub fn new(base_url: &str, model: &str, api_key: SecretString) -> Result<Self, AnalyzeError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| AnalyzeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Lists the models available to this key that support content generation.
    pub async fn list_models(&self) -> Result<Vec<String>, AnalyzeError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("pageSize", "1000")])
            .header("x-goog-api-key", self.api_key.expose_secret())
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_success_body(response).await?;
        let listing: ModelList = serde_json::from_str(&body)
            .map_err(|e| AnalyzeError::InvalidResponse(e.to_string()))?;

        Ok(listing
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|method| method == "generateContent")
            })
            .map(|m| m.name)
            .collect())
    }
}

#[async_trait]
impl DocumentAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, document: &Document) -> Result<RawExtraction, AnalyzeError> {
        if document.is_empty() {
            return Err(AnalyzeError::EmptyDocument(document.file_name.clone()));
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = build_request(document);

        debug!(
            model = %self.model,
            mime_type = %document.mime_type,
            bytes = document.len(),
            "Sending document to analyzer"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_success_body(response).await?;
        parse_generate_response(&body)
    }
}

fn transport_error(e: reqwest::Error) -> AnalyzeError {
    if e.is_timeout() {
        AnalyzeError::Transport(format!("request timed out: {}", e))
    } else if e.is_connect() {
        AnalyzeError::Transport(format!("connection failed: {}", e))
    } else {
        AnalyzeError::Transport(e.to_string())
    }
}

async fn read_success_body(response: reqwest::Response) -> Result<String, AnalyzeError> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;
    if !status.is_success() {
        return Err(AnalyzeError::Provider {
            status: status.as_u16(),
            body: truncate_for_log(&body),
        });
    }
    Ok(body)
}

// ─── Wire types ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPart<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

fn build_request(document: &Document) -> GenerateContentRequest<'_> {
    let data = base64::engine::general_purpose::STANDARD.encode(&document.bytes);
    GenerateContentRequest {
        contents: vec![RequestContent {
            role: "user",
            parts: vec![
                RequestPart {
                    text: Some(AUDIT_PROMPT),
                    inline_data: None,
                },
                RequestPart {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: document.mime_type.clone(),
                        data,
                    }),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: response_schema(),
            temperature: 0.0,
        },
    }
}

/// Pulls the JSON payload out of a `generateContent` response body.
fn parse_generate_response(body: &str) -> Result<RawExtraction, AnalyzeError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| AnalyzeError::InvalidResponse(e.to_string()))?;

    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(AnalyzeError::Rejected(format!("prompt blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AnalyzeError::Rejected("no candidates returned".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(match candidate.finish_reason {
            Some(reason) if REFUSAL_FINISH_REASONS.contains(&reason.as_str()) => {
                AnalyzeError::Rejected(format!("generation stopped: {}", reason))
            }
            _ => AnalyzeError::InvalidResponse("empty response text".to_string()),
        });
    }

    serde_json::from_str(strip_code_fence(&text))
        .map_err(|e| AnalyzeError::InvalidResponse(format!("payload is not JSON: {}", e)))
}

/// Models sometimes wrap JSON in a markdown fence despite instructions.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
