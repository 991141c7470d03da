//! Structured logging for Persona Relay
//!
//! Console output always; optionally a file in a log directory that rolls
//! over at midnight UTC.
//! Categories:
//! - ROUTING: intent classification decisions
//! - AGENT: outbound model calls and their outcome
//! - CONVERSATION: interaction and server lifecycle
//! - ERROR: failures folded into fallback replies

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE_STEM: &str = "persona-relay";
const LOG_FILE_PREFIX: &str = "persona-relay.";
const LOG_RETENTION_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    Routing,
    Agent,
    Conversation,
    Error,
}

impl LogCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Routing => "ROUTING",
            LogCategory::Agent => "AGENT",
            LogCategory::Conversation => "CONVERSATION",
            LogCategory::Error => "ERROR",
        }
    }
}

/// Today's log file inside `log_dir`, named the way the appender names it
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    let today = Utc::now().format("%Y-%m-%d").to_string();
    log_dir.join(format!("{}{}.log", LOG_FILE_PREFIX, today))
}

/// Rolls at midnight UTC and prunes its own files beyond the retention window
fn daily_appender(dir: &Path) -> std::io::Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_STEM)
        .filename_suffix("log")
        .max_log_files(LOG_RETENTION_DAYS as usize)
        .build(dir)
        .map_err(std::io::Error::other)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Returns the log file in use, if any.
/// A second call is a no-op.
pub fn init_logging(log_dir: Option<&Path>) -> std::io::Result<Option<PathBuf>> {
    let Some(dir) = log_dir else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .try_init();
        return Ok(None);
    };

    fs::create_dir_all(dir)?;
    let path = log_file_path(dir);
    let appender = daily_appender(dir)?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(std::io::stdout.and(appender))
        .try_init();

    log_conversation(None, &format!("Logging to {}", path.display()));
    Ok(Some(path))
}

/// Log a message with category and optional interaction context
pub fn log(category: LogCategory, interaction_id: Option<&str>, message: &str) {
    let context = interaction_id
        .map(|id| format!("interaction={} | ", &id[..8.min(id.len())]))
        .unwrap_or_default();

    match category {
        LogCategory::Error => {
            tracing::error!(category = category.as_str(), "{}{}", context, message)
        }
        _ => tracing::info!(category = category.as_str(), "{}{}", context, message),
    }
}

/// Log an intent classification decision
pub fn log_routing(interaction_id: Option<&str>, message: &str) {
    log(LogCategory::Routing, interaction_id, message);
}

/// Log a model call
pub fn log_agent(interaction_id: Option<&str>, message: &str) {
    log(LogCategory::Agent, interaction_id, message);
}

pub fn log_conversation(interaction_id: Option<&str>, message: &str) {
    log(LogCategory::Conversation, interaction_id, message);
}

pub fn log_error(interaction_id: Option<&str>, message: &str) {
    log(LogCategory::Error, interaction_id, message);
}

/// Remove our log files older than the retention window. The appender prunes
/// by count while running; this catches files left by earlier runs.
pub fn cleanup_old_logs(log_dir: &Path) -> std::io::Result<usize> {
    let mut deleted = 0;

    if !log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Utc::now() - chrono::Duration::days(LOG_RETENTION_DAYS);

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        let ours = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX) && n.ends_with(".log"));
        if !ours {
            continue;
        }

        if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
            let modified_time: chrono::DateTime<Utc> = modified.into();
            if modified_time < cutoff && fs::remove_file(&path).is_ok() {
                deleted += 1;
            }
        }
    }

    Ok(deleted)
}
