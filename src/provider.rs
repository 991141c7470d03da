//! Model provider strategy
//!
//! Each hosted API wants its own request envelope, auth scheme and response
//! shape. A provider knows those three things and nothing else; the gateway
//! owns the single network attempt and the error policy.

use crate::error::{ConfigError, GatewayError, RelayError};
use crate::gemini::GeminiProvider;
use crate::openai::OpenAiProvider;
use crate::prompt::{AssembledPrompt, Envelope};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// A fully-formed outbound call, ready for a transport
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

impl OutboundRequest {
    pub fn new(url: Url, body: Value) -> Self {
        Self {
            url,
            headers: vec![("Content-Type", "application/json".to_string())],
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What a successful response contained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Text(String),
    /// Provider declined on content-policy grounds
    Refused,
    /// Well-formed, but nothing usable in it
    Empty,
}

pub trait ModelProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn model(&self) -> &str;

    fn envelope(&self) -> Envelope;

    fn endpoint(&self) -> &Url;

    fn build_payload(&self, prompt: &AssembledPrompt) -> Result<Value, GatewayError>;

    fn authenticate(&self, request: OutboundRequest, api_key: &str) -> OutboundRequest;

    fn extract_text(&self, body: &Value) -> Result<Extraction, GatewayError>;

    /// Pull a human-readable message out of an error body.
    /// Both supported APIs use `{"error": {"message": ...}}`.
    fn error_message(&self, body: &str) -> Option<String> {
        #[derive(Deserialize)]
        struct ErrorEnvelope {
            error: ErrorDetails,
        }

        #[derive(Deserialize)]
        struct ErrorDetails {
            message: String,
        }

        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .map(|e| e.error.message)
            .filter(|m| !m.trim().is_empty())
    }
}

// ============ Provider Selection ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// Environment variable holding this provider's credential
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub model: Option<String>,
    /// API root, e.g. `https://api.openai.com/v1`
    pub base_url: Option<String>,
    pub temperature: Option<f64>,
}

impl ProviderSettings {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            model: None,
            base_url: None,
            temperature: None,
        }
    }
}

pub fn build_provider(settings: &ProviderSettings) -> Result<Box<dyn ModelProvider>, RelayError> {
    let base_url = settings.base_url.as_deref();
    let model = settings.model.as_deref();

    let provider: Box<dyn ModelProvider> = match settings.kind {
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new(base_url, model, settings.temperature)?),
        ProviderKind::Gemini => Box::new(GeminiProvider::new(base_url, model, settings.temperature)?),
    };
    Ok(provider)
}

pub(crate) fn parse_endpoint(raw: &str) -> Result<Url, RelayError> {
    Url::parse(raw).map_err(|source| RelayError::BaseUrl {
        url: raw.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" Gemini ".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert!(matches!(
            "claude".parse::<ProviderKind>(),
            Err(ConfigError::UnknownProvider(name)) if name == "claude"
        ));
    }

    #[test]
    fn test_build_provider_picks_envelope() {
        let openai = build_provider(&ProviderSettings::new(ProviderKind::OpenAi)).unwrap();
        assert_eq!(openai.envelope(), Envelope::Chat);
        assert_eq!(openai.name(), "OpenAI");

        let gemini = build_provider(&ProviderSettings::new(ProviderKind::Gemini)).unwrap();
        assert_eq!(gemini.envelope(), Envelope::SingleBlob);
        assert_eq!(gemini.name(), "Gemini");
    }

    #[test]
    fn test_bad_base_url_is_rejected() {
        let mut settings = ProviderSettings::new(ProviderKind::OpenAi);
        settings.base_url = Some("not a url".to_string());
        assert!(matches!(build_provider(&settings), Err(RelayError::BaseUrl { .. })));
    }

    #[test]
    fn test_default_error_message_parsing() {
        let provider = build_provider(&ProviderSettings::new(ProviderKind::OpenAi)).unwrap();
        let body = json!({"error": {"message": "quota exceeded", "type": "insufficient_quota"}});
        assert_eq!(
            provider.error_message(&body.to_string()),
            Some("quota exceeded".to_string())
        );
        assert_eq!(provider.error_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn test_outbound_request_header_lookup() {
        let url = Url::parse("https://example.com/v1").unwrap();
        let request = OutboundRequest::new(url, json!({}));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("Authorization"), None);
    }
}
