use crate::gateway::ModelReply;
use crate::planner::ResponsePlan;
use serde::{Deserialize, Serialize};

const TEACHING_NOTE: &str =
    "Teaching note: pick one step above and try it today. Small experiments teach more than rereading.";

/// How a reply is presented to the end user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatStyle {
    /// Trimmed model text, nothing added
    #[default]
    Plain,
    /// Persona header, principle count and a teaching-note footer
    TeachingNote,
}

impl FormatStyle {
    /// Only genuine answers are decorated; fallback texts pass through
    pub fn format(&self, reply: &ModelReply, plan: &ResponsePlan<'_>) -> String {
        match reply {
            ModelReply::Answer(text) => self.format_text(text, plan),
            other => other.text().trim().to_string(),
        }
    }

    pub fn format_text(&self, reply: &str, plan: &ResponsePlan<'_>) -> String {
        let reply = reply.trim();
        match self {
            FormatStyle::Plain => reply.to_string(),
            FormatStyle::TeachingNote => {
                let count = plan.persona.principles.len();
                let noun = if count == 1 { "principle" } else { "principles" };
                format!(
                    "[{} | {}]\n\n{}\n\n---\nGrounded in {} {}.\n{}",
                    plan.persona.name,
                    plan.intent.label(),
                    reply,
                    count,
                    noun,
                    TEACHING_NOTE
                )
            }
        }
    }
}
