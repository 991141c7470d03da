use crate::intent::Intent;
use crate::persona::Persona;
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ============ Observed Input ============

/// A user message as seen by one interaction. Never retained.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedInput {
    pub text: String,
    pub timestamp: String,
}

impl ObservedInput {
    pub fn observe(text: &str) -> Self {
        Self {
            text: text.trim().to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

// ============ Plan Templates ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTemplate {
    pub system_goal: String,
    pub structure_hint: String,
}

impl PlanTemplate {
    pub fn new(system_goal: impl Into<String>, structure_hint: impl Into<String>) -> Self {
        Self {
            system_goal: system_goal.into(),
            structure_hint: structure_hint.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub intent: Intent,
    #[serde(flatten)]
    pub template: PlanTemplate,
}

/// Everything one interaction needs to render its prompt
#[derive(Debug, Clone)]
pub struct ResponsePlan<'a> {
    pub intent: Intent,
    pub system_goal: &'a str,
    pub structure_hint: &'a str,
    pub persona: &'a Persona,
    pub input: ObservedInput,
}

/// Intent -> (system goal, structure hint). Intents without an entry get the
/// default template.
#[derive(Debug, Clone)]
pub struct ResponsePlanner {
    entries: Vec<PlanEntry>,
    default_plan: PlanTemplate,
}

impl ResponsePlanner {
    pub fn new(entries: Vec<PlanEntry>, default_plan: PlanTemplate) -> Self {
        Self { entries, default_plan }
    }

    pub fn plan(&self, intent: &Intent) -> &PlanTemplate {
        self.entries
            .iter()
            .find(|entry| entry.intent == *intent)
            .map(|entry| &entry.template)
            .unwrap_or(&self.default_plan)
    }

    pub fn build<'a>(
        &'a self,
        persona: &'a Persona,
        intent: Intent,
        input: ObservedInput,
    ) -> ResponsePlan<'a> {
        let template = self.plan(&intent);
        ResponsePlan {
            intent,
            system_goal: &template.system_goal,
            structure_hint: &template.structure_hint,
            persona,
            input,
        }
    }
}
