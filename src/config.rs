//! Configuration
//!
//! Values resolve as: CLI flags > environment variables (via clap) >
//! `~/.persona-relay/config.toml` > defaults. The provider credential is
//! optional; without it the server still starts and reports the problem
//! per request.

use crate::error::ConfigError;
use crate::profiles::{self, AgentProfile};
use crate::provider::{ProviderKind, ProviderSettings};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_PROFILE: &str = "coach";

#[derive(Parser, Debug, Default)]
#[command(name = "persona-relay")]
#[command(about = "Intent-routed persona agent in front of hosted LLMs")]
pub struct Args {
    /// Model provider: openai or gemini
    #[arg(long, env = "RELAY_PROVIDER")]
    pub provider: Option<String>,

    /// Model name (defaults per provider)
    #[arg(long, env = "RELAY_MODEL")]
    pub model: Option<String>,

    /// API root override, e.g. for a proxy
    #[arg(long, env = "RELAY_BASE_URL")]
    pub base_url: Option<String>,

    /// Provider API key (falls back to OPENAI_API_KEY / GEMINI_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Built-in profile: coach or guide
    #[arg(long, env = "RELAY_PROFILE")]
    pub profile: Option<String>,

    /// TOML file describing a custom profile (overrides --profile)
    #[arg(long, env = "RELAY_PROFILE_FILE")]
    pub profile_file: Option<PathBuf>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Whole-request timeout for model calls, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Address for the HTTP server
    #[arg(long, env = "RELAY_BIND")]
    pub bind: Option<String>,

    /// Directory for daily log files
    #[arg(long, env = "RELAY_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Config file (defaults to ~/.persona-relay/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Answer one message on stdout instead of serving HTTP
    #[arg(long)]
    pub ask: Option<String>,
}

/// Contents of the TOML config file
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub profile: Option<String>,
    pub profile_file: Option<PathBuf>,
    pub temperature: Option<f64>,
    pub timeout_secs: Option<u64>,
    pub bind: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Load the default config file if present. A broken file is reported
    /// and ignored.
    pub fn load_default() -> Self {
        let Some(path) = config_path().filter(|p| p.exists()) else {
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}", e);
                Self::default()
            }
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".persona-relay").join("config.toml"))
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: ProviderSettings,
    pub api_key: Option<String>,
    pub profile: AgentProfile,
    pub request_timeout: Option<Duration>,
    pub bind: String,
    pub log_dir: Option<PathBuf>,
    pub ask: Option<String>,
}

impl Settings {
    pub fn resolve(args: Args, file: FileConfig) -> Result<Self, ConfigError> {
        let kind: ProviderKind = args
            .provider
            .or(file.provider)
            .as_deref()
            .unwrap_or("openai")
            .parse()?;

        let api_key = args
            .api_key
            .or_else(|| std::env::var(kind.api_key_env()).ok())
            .or(file.api_key)
            .filter(|k| !k.trim().is_empty());

        let profile = match args.profile_file.or(file.profile_file) {
            Some(path) => AgentProfile::from_toml_file(&path)?,
            None => {
                let id = args
                    .profile
                    .or(file.profile)
                    .unwrap_or_else(|| DEFAULT_PROFILE.to_string());
                profiles::builtin(&id)
                    .cloned()
                    .ok_or_else(|| ConfigError::UnknownProfile {
                        available: profiles::builtin_ids().join(", "),
                        name: id,
                    })?
            }
        };

        Ok(Self {
            provider: ProviderSettings {
                kind,
                model: args.model.or(file.model),
                base_url: args.base_url.or(file.base_url),
                temperature: args.temperature.or(file.temperature),
            },
            api_key,
            profile,
            request_timeout: args.timeout_secs.or(file.timeout_secs).map(Duration::from_secs),
            bind: args
                .bind
                .or(file.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            log_dir: args.log_dir.or(file.log_dir),
            ask: args.ask,
        })
    }
}
