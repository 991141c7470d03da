//! Model gateway
//!
//! One outbound attempt per call. Whatever happens (missing key, transport
//! failure, provider error, safety refusal) the caller gets a `ModelReply`
//! that renders to text; nothing is raised past this boundary.

use crate::error::{GatewayError, RelayError};
use crate::logging;
use crate::prompt::AssembledPrompt;
use crate::provider::{Extraction, ModelProvider, OutboundRequest};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

pub const MISSING_CREDENTIAL_REPLY: &str = "API key not set; cannot call external model.";
pub const SAFETY_REFUSAL_REPLY: &str =
    "I'm sorry, but I can't help with that request. Could you rephrase it or ask about something else?";
pub const EMPTY_RESPONSE_REPLY: &str =
    "I'm sorry, I wasn't able to come up with a response this time. Please try asking again.";

const CONNECT_TIMEOUT_SECS: u64 = 10;

// ============ Replies ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    MissingCredential,
    SafetyRefusal,
    EmptyResponse,
}

impl Fallback {
    pub fn text(&self) -> &'static str {
        match self {
            Fallback::MissingCredential => MISSING_CREDENTIAL_REPLY,
            Fallback::SafetyRefusal => SAFETY_REFUSAL_REPLY,
            Fallback::EmptyResponse => EMPTY_RESPONSE_REPLY,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Fallback::MissingCredential => "missing_credential",
            Fallback::SafetyRefusal => "safety_refusal",
            Fallback::EmptyResponse => "empty_response",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    Answer(String),
    Degraded(Fallback),
    Failed(GatewayError),
}

impl ModelReply {
    pub fn text(&self) -> String {
        match self {
            ModelReply::Answer(text) => text.clone(),
            ModelReply::Degraded(fallback) => fallback.text().to_string(),
            ModelReply::Failed(err) => {
                format!("Sorry, I couldn't reach the model provider: {}", err)
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelReply::Answer(_) => "answer",
            ModelReply::Degraded(_) => "degraded",
            ModelReply::Failed(_) => "failed",
        }
    }
}

// ============ Transport ============

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, request: &OutboundRequest) -> Result<TransportResponse, GatewayError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// `timeout` bounds a whole request; `None` leaves it to the caller
    pub fn new(timeout: Option<Duration>) -> Result<Self, RelayError> {
        let mut builder = Client::builder().connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, request: &OutboundRequest) -> Result<TransportResponse, GatewayError> {
        let mut builder = self.client.post(request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }
        builder = builder.json(&request.body);

        // reqwest errors embed the request URL, which may carry the API key
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.without_url().to_string()))?;

        Ok(TransportResponse { status, body })
    }
}

// ============ Gateway ============

pub struct ModelGateway {
    provider: Box<dyn ModelProvider>,
    transport: Arc<dyn Transport>,
    api_key: Option<String>,
}

impl ModelGateway {
    pub fn new(
        provider: Box<dyn ModelProvider>,
        transport: Arc<dyn Transport>,
        api_key: Option<String>,
    ) -> Self {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Self {
            provider,
            transport,
            api_key,
        }
    }

    pub fn provider(&self) -> &dyn ModelProvider {
        self.provider.as_ref()
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn invoke(&self, prompt: &AssembledPrompt) -> ModelReply {
        self.invoke_for(None, prompt).await
    }

    /// Same as `invoke`, tagging log lines with an interaction id
    pub async fn invoke_for(&self, interaction_id: Option<&str>, prompt: &AssembledPrompt) -> ModelReply {
        let Some(api_key) = self.api_key.as_deref() else {
            logging::log_error(interaction_id, &format!(
                "{} API key not configured, skipping model call", self.provider.name()
            ));
            return ModelReply::Degraded(Fallback::MissingCredential);
        };

        match self.call(interaction_id, prompt, api_key).await {
            Ok(reply) => reply,
            Err(e) => {
                logging::log_error(interaction_id, &format!("Model call failed: {}", e));
                ModelReply::Failed(e)
            }
        }
    }

    async fn call(
        &self,
        interaction_id: Option<&str>,
        prompt: &AssembledPrompt,
        api_key: &str,
    ) -> Result<ModelReply, GatewayError> {
        let provider = self.provider.as_ref();
        let payload = provider.build_payload(prompt)?;
        let request = provider.authenticate(
            OutboundRequest::new(provider.endpoint().clone(), payload),
            api_key,
        );

        // Path only: the query string may carry the key
        logging::log_agent(interaction_id, &format!(
            "POST {}{} (model={})",
            request.url.host_str().unwrap_or_default(),
            request.url.path(),
            provider.model()
        ));

        let response = self.transport.post_json(&request).await?;

        if !response.is_success() {
            let message = provider
                .error_message(&response.body)
                .or_else(|| {
                    let raw = response.body.trim();
                    (!raw.is_empty()).then(|| raw.to_string())
                })
                .unwrap_or_else(|| format!("HTTP {}", response.status));

            return Err(GatewayError::Provider {
                provider: provider.name(),
                status: response.status,
                message,
            });
        }

        let body: serde_json::Value =
            serde_json::from_str(&response.body).map_err(|e| GatewayError::Malformed {
                provider: provider.name(),
                detail: e.to_string(),
            })?;

        Ok(match provider.extract_text(&body)? {
            Extraction::Text(text) if !text.trim().is_empty() => ModelReply::Answer(text),
            Extraction::Text(_) | Extraction::Empty => ModelReply::Degraded(Fallback::EmptyResponse),
            Extraction::Refused => ModelReply::Degraded(Fallback::SafetyRefusal),
        })
    }
}
