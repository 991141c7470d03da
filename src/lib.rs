pub mod config;
pub mod error;
pub mod formatter;
pub mod gateway;
pub mod gemini;
pub mod intent;
pub mod logging;
pub mod openai;
pub mod orchestrator;
pub mod persona;
pub mod planner;
pub mod profiles;
pub mod prompt;
pub mod provider;
pub mod server;

#[cfg(test)]
mod testing;

pub use config::{Args, FileConfig, Settings};
pub use error::{ConfigError, GatewayError, RelayError};
pub use gateway::{Fallback, HttpTransport, ModelGateway, ModelReply, Transport};
pub use intent::{Intent, IntentClassifier, IntentRule};
pub use orchestrator::{Interaction, Orchestrator};
pub use persona::Persona;
pub use profiles::AgentProfile;
pub use provider::{ModelProvider, ProviderKind};

use std::sync::Arc;

/// Wire provider, HTTP transport and gateway for the resolved settings
pub fn build_orchestrator(settings: &Settings) -> Result<Orchestrator, RelayError> {
    let provider = provider::build_provider(&settings.provider)?;
    let transport = Arc::new(HttpTransport::new(settings.request_timeout)?);
    let gateway = ModelGateway::new(provider, transport, settings.api_key.clone());
    Ok(Orchestrator::new(&settings.profile, gateway))
}

// ============ Run ============

/// Start logging, then either answer `settings.ask` once or serve HTTP
pub async fn run(settings: Settings) -> Result<(), RelayError> {
    if let Some(dir) = settings.log_dir.as_deref() {
        logging::init_logging(Some(dir))?;
        if let Ok(deleted) = logging::cleanup_old_logs(dir) {
            if deleted > 0 {
                logging::log_conversation(None, &format!("Removed {} old log file(s)", deleted));
            }
        }
    } else {
        logging::init_logging(None)?;
    }

    let orchestrator = build_orchestrator(&settings)?;

    if !orchestrator.gateway().has_credential() {
        logging::log_error(None, &format!(
            "{} is not set; requests will be answered with an error",
            settings.provider.kind.api_key_env()
        ));
    }

    if let Some(question) = settings.ask.as_deref() {
        println!("{}", orchestrator.process_interaction(question).await);
        return Ok(());
    }

    server::serve(Arc::new(orchestrator), &settings.bind).await
}
