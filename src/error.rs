use thiserror::Error;

/// Failures talking to a model provider. These never escape the gateway;
/// they are folded into a `ModelReply::Failed` and rendered as reply text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("{0}")]
    Transport(String),

    #[error("{provider} API error ({status}): {message}")]
    Provider {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Malformed {provider} response: {detail}")]
    Malformed {
        provider: &'static str,
        detail: String,
    },

    #[error("Failed to encode request: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unknown provider '{0}' (expected 'openai' or 'gemini')")]
    UnknownProvider(String),

    #[error("Unknown profile '{name}' (built-in profiles: {available})")]
    UnknownProfile { name: String, available: String },

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
}

/// Startup-time errors. Per-interaction failures are replies, not errors.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid base URL '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display_includes_message() {
        let err = GatewayError::Provider {
            provider: "OpenAI",
            status: 401,
            message: "Incorrect API key provided".to_string(),
        };
        assert_eq!(err.to_string(), "OpenAI API error (401): Incorrect API key provided");
    }

    #[test]
    fn test_transport_error_is_raw_message() {
        let err = GatewayError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn test_unknown_profile_lists_builtins() {
        let err = ConfigError::UnknownProfile {
            name: "pirate".to_string(),
            available: "coach, guide".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown profile 'pirate' (built-in profiles: coach, guide)");
    }
}
