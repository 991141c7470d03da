use crate::error::{GatewayError, RelayError};
use crate::prompt::{AssembledPrompt, Envelope};
use crate::provider::{parse_endpoint, Extraction, ModelProvider, OutboundRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

const SAFETY_FINISH_REASON: &str = "SAFETY";

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// Generate-content shape: one user part carrying the whole prompt,
/// API key in the query string, reply at `candidates[0].content.parts[0].text`.
pub struct GeminiProvider {
    endpoint: Url,
    model: String,
    temperature: f64,
}

impl GeminiProvider {
    pub fn new(
        base_url: Option<&str>,
        model: Option<&str>,
        temperature: Option<f64>,
    ) -> Result<Self, RelayError> {
        let base = base_url.unwrap_or(GEMINI_API_BASE).trim_end_matches('/');
        let model = model.unwrap_or(DEFAULT_GEMINI_MODEL).to_string();
        Ok(Self {
            endpoint: parse_endpoint(&format!("{}/models/{}:generateContent", base, model))?,
            model,
            temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
        })
    }
}

impl ModelProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn envelope(&self) -> Envelope {
        Envelope::SingleBlob
    }

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn build_payload(&self, prompt: &AssembledPrompt) -> Result<Value, GatewayError> {
        let request = GenerateContentRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.full_text(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        Ok(serde_json::to_value(request)?)
    }

    fn authenticate(&self, mut request: OutboundRequest, api_key: &str) -> OutboundRequest {
        request.url.query_pairs_mut().append_pair("key", api_key);
        request
    }

    fn extract_text(&self, body: &Value) -> Result<Extraction, GatewayError> {
        let response: GenerateContentResponse =
            serde_json::from_value(body.clone()).map_err(|e| GatewayError::Malformed {
                provider: self.name(),
                detail: e.to_string(),
            })?;

        let Some(candidate) = response.candidates.into_iter().next() else {
            // The whole prompt was blocked before generation
            let blocked = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .is_some();
            return Ok(if blocked { Extraction::Refused } else { Extraction::Empty });
        };

        if candidate.finish_reason.as_deref() == Some(SAFETY_FINISH_REASON) {
            return Ok(Extraction::Refused);
        }

        Ok(candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .map(Extraction::Text)
            .unwrap_or(Extraction::Empty))
    }
}
