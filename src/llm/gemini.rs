//! Google Gemini `generateContent` auditor

use crate::config::AuditConfig;
use crate::error::{AtsScannerError, Result};
use crate::llm::auditor::{AuditDocument, AuditReport, DocumentAuditor};
use crate::llm::prompts::{audit_response_schema, audit_user_prompt, AUDIT_SYSTEM_INSTRUCTION};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Backoff doubles from one second up to this many doublings (32s).
const MAX_BACKOFF_EXPONENT: u32 = 5;

/// Gemini API client used for document audits
#[derive(Debug, Clone)]
pub struct GeminiAuditor {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_retries: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl GeminiAuditor {
    pub fn new(config: &AuditConfig, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AtsScannerError::Configuration(
                "audit API key must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_retries: config.max_retries.max(1),
        })
    }

    /// Build from config, reading the key from the configured environment variable.
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        Self::new(config, config.api_key()?)
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", self.endpoint, self.model)
    }

    fn build_request(&self, document: &AuditDocument) -> GeminiRequest {
        GeminiRequest {
            system_instruction: GeminiContent {
                parts: vec![GeminiPart::Text {
                    text: AUDIT_SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiPart::InlineData {
                        inline_data: GeminiInlineData {
                            mime_type: document.mime_type.clone(),
                            data: BASE64.encode(&document.bytes),
                        },
                    },
                    GeminiPart::Text {
                        text: audit_user_prompt(&document.file_name),
                    },
                ],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.0,
                top_p: 1.0,
                top_k: 1,
                response_mime_type: "application/json".to_string(),
                response_schema: audit_response_schema(),
            },
        }
    }

    /// Post the request, retrying 429 and 5xx with exponential backoff.
    async fn call(&self, request: &GeminiRequest) -> Result<GeminiResponse> {
        let mut last_error: Option<AtsScannerError> = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(
                    "Audit call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(self.url())
                .header("x-goog-api-key", &self.api_key)
                .json(request)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(AtsScannerError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Audit API returned {}: {}", status, body);
                last_error = Some(AtsScannerError::AuditApi {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GeminiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(AtsScannerError::AuditApi {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: GeminiResponse = response.json().await?;
            if let Some(usage) = &parsed.usage_metadata {
                debug!(
                    "Audit call succeeded: prompt_tokens={:?}, candidate_tokens={:?}",
                    usage.prompt_token_count, usage.candidates_token_count
                );
            }
            return Ok(parsed);
        }

        Err(last_error.unwrap_or(AtsScannerError::AuditApi {
            status: 429,
            message: format!("gave up after {} attempts", self.max_retries),
        }))
    }
}

/// Delay before retry `attempt` (1-based): 1s, 2s, 4s, ... capped at 32s.
fn backoff_delay(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
    Duration::from_millis(1000 << exponent)
}

#[async_trait]
impl DocumentAuditor for GeminiAuditor {
    async fn audit(&self, document: &AuditDocument) -> Result<AuditReport> {
        info!(
            "Auditing {} ({}, {} bytes) with {}",
            document.file_name,
            document.mime_type,
            document.bytes.len(),
            self.model
        );

        let request = self.build_request(document);
        let response = self.call(&request).await?;
        let text = response.text().ok_or(AtsScannerError::EmptyAuditResponse)?;

        AuditReport::from_model_text(&text)
    }

    fn backend(&self) -> String {
        format!("gemini:{}", self.model)
    }
}
