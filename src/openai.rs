use crate::error::{GatewayError, RelayError};
use crate::prompt::{AssembledPrompt, Envelope};
use crate::provider::{parse_endpoint, Extraction, ModelProvider, OutboundRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Chat-completions shape: system + user messages, bearer auth,
/// reply at `choices[0].message.content`.
pub struct OpenAiProvider {
    endpoint: Url,
    model: String,
    temperature: Option<f64>,
}

impl OpenAiProvider {
    pub fn new(
        base_url: Option<&str>,
        model: Option<&str>,
        temperature: Option<f64>,
    ) -> Result<Self, RelayError> {
        let base = base_url.unwrap_or(OPENAI_API_BASE).trim_end_matches('/');
        Ok(Self {
            endpoint: parse_endpoint(&format!("{}/chat/completions", base))?,
            model: model.unwrap_or(DEFAULT_OPENAI_MODEL).to_string(),
            temperature,
        })
    }
}

impl ModelProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn envelope(&self) -> Envelope {
        Envelope::Chat
    }

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn build_payload(&self, prompt: &AssembledPrompt) -> Result<Value, GatewayError> {
        let messages = match prompt {
            AssembledPrompt::Chat { system, user } => vec![
                ChatMessage::new("system", system),
                ChatMessage::new("user", user),
            ],
            AssembledPrompt::Blob(text) => vec![ChatMessage::new("user", text)],
        };

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
        };

        Ok(serde_json::to_value(request)?)
    }

    fn authenticate(&self, mut request: OutboundRequest, api_key: &str) -> OutboundRequest {
        request
            .headers
            .push(("Authorization", format!("Bearer {}", api_key)));
        request
    }

    fn extract_text(&self, body: &Value) -> Result<Extraction, GatewayError> {
        let completion: ChatCompletionResponse =
            serde_json::from_value(body.clone()).map_err(|e| GatewayError::Malformed {
                provider: self.name(),
                detail: e.to_string(),
            })?;

        let Some(choice) = completion.choices.into_iter().next() else {
            return Ok(Extraction::Empty);
        };

        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Ok(Extraction::Refused);
        }

        Ok(choice
            .message
            .and_then(|m| m.content)
            .map(Extraction::Text)
            .unwrap_or(Extraction::Empty))
    }
}
