//! Agent profiles
//!
//! A profile bundles one persona with its keyword rules, plan templates and
//! presentation style. Two profiles ship built in; others can be loaded from
//! TOML. Built-ins live in a process-wide registry and are never mutated.

use crate::error::ConfigError;
use crate::formatter::FormatStyle;
use crate::intent::{Intent, IntentClassifier, IntentRule};
use crate::persona::Persona;
use crate::planner::{PlanEntry, PlanTemplate, ResponsePlanner};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentProfile {
    pub id: String,
    pub persona: Persona,
    pub default_intent: Intent,
    /// Evaluated in order; the first rule with a matching keyword wins
    #[serde(default)]
    pub rules: Vec<IntentRule>,
    #[serde(default)]
    pub plans: Vec<PlanEntry>,
    pub default_plan: PlanTemplate,
    #[serde(default)]
    pub format: FormatStyle,
}

impl AgentProfile {
    pub fn from_toml_str(raw: &str, source: &str) -> Result<Self, ConfigError> {
        let profile: AgentProfile = toml::from_str(raw).map_err(|e| ConfigError::Parse {
            path: source.to_string(),
            source: e,
        })?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&raw, &path.display().to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.persona.name.trim().is_empty() {
            return Err(ConfigError::InvalidProfile(format!(
                "profile '{}' has an empty persona name",
                self.id
            )));
        }

        if let Some(rule) = self
            .rules
            .iter()
            .find(|r| r.keywords.iter().all(|k| k.trim().is_empty()))
        {
            return Err(ConfigError::InvalidProfile(format!(
                "rule for '{}' in profile '{}' has no keywords",
                rule.intent, self.id
            )));
        }

        Ok(())
    }

    pub fn classifier(&self) -> IntentClassifier {
        IntentClassifier::new(self.rules.clone(), self.default_intent.clone())
    }

    pub fn planner(&self) -> ResponsePlanner {
        ResponsePlanner::new(self.plans.clone(), self.default_plan.clone())
    }
}

// ============ Built-in Profiles ============

static BUILTIN_PROFILES: Lazy<Vec<AgentProfile>> = Lazy::new(|| vec![coach_profile(), guide_profile()]);

pub fn builtin(id: &str) -> Option<&'static AgentProfile> {
    let id = id.trim().to_lowercase();
    BUILTIN_PROFILES.iter().find(|p| p.id == id)
}

pub fn builtin_ids() -> Vec<&'static str> {
    BUILTIN_PROFILES.iter().map(|p| p.id.as_str()).collect()
}

fn plan(intent: Intent, system_goal: &str, structure_hint: &str) -> PlanEntry {
    PlanEntry {
        intent,
        template: PlanTemplate::new(system_goal, structure_hint),
    }
}

/// Discipline and engineering coach. Discipline keywords are checked before
/// technical ones, so "stay consistent with coding" is a discipline question.
fn coach_profile() -> AgentProfile {
    AgentProfile {
        id: "coach".to_string(),
        persona: Persona::new(
            "Atlas",
            [
                "Consistency beats intensity: small daily reps compound.",
                "Design systems so the right action is the easy one; don't rely on willpower.",
                "Rest is part of the work. Burnout is a planning failure, not a character flaw.",
                "Ship small, get feedback fast, and adjust.",
                "Be honest and direct without being harsh.",
            ],
            [
                "habit formation",
                "software engineering",
                "productivity systems",
                "stress and recovery",
                "systems architecture",
            ],
        ),
        default_intent: Intent::GENERAL_HELP,
        rules: vec![
            IntentRule::new(
                Intent::DISCIPLINE_SUPPORT,
                &[
                    "discipline", "consistent", "consistency", "habit", "routine",
                    "motivation", "motivated", "procrastinat", "burn out", "burnout",
                    "burning out", "focus", "streak", "lazy",
                ],
            ),
            IntentRule::new(
                Intent::EMOTIONAL_VENTING,
                &[
                    "frustrated", "overwhelmed", "anxious", "stressed", "exhausted",
                    "upset", "angry", "hopeless", "i feel like", "vent",
                ],
            ),
            IntentRule::new(
                Intent::TECHNICAL_HELP,
                &[
                    "code", "coding", "bug", "error", "debug", "compile", "stack trace",
                    "exception", "function", "crash", "refactor",
                ],
            ),
            IntentRule::new(
                Intent::SYSTEM_DESIGN,
                &[
                    "architecture", "system design", "scalab", "database", "microservice",
                    "infrastructure", "design a", "load balanc",
                ],
            ),
        ],
        plans: vec![
            plan(
                Intent::DISCIPLINE_SUPPORT,
                "Help the user build a sustainable routine that survives bad days.",
                "Name the real obstacle in one sentence, give three concrete micro-habits as a numbered list, then one line on how to restart after a missed day.",
            ),
            plan(
                Intent::EMOTIONAL_VENTING,
                "Acknowledge what the user is feeling before offering any advice.",
                "Reflect the feeling back in one or two sentences, ask at most one gentle question, and suggest a single small next step only if it fits.",
            ),
            plan(
                Intent::TECHNICAL_HELP,
                "Unblock the user's technical problem with a correct, minimal fix.",
                "State the likely cause first, show the fix in a short code block, then list how to verify it.",
            ),
            plan(
                Intent::SYSTEM_DESIGN,
                "Guide the user toward a simple design that meets today's needs and can grow.",
                "List the components as bullets, call out the main trade-off, and end with the first piece to build.",
            ),
        ],
        default_plan: PlanTemplate::new(
            "Give a clear, useful answer grounded in the guiding principles.",
            "Answer directly in a short paragraph, then add up to three bullet points of practical follow-up.",
        ),
        format: FormatStyle::TeachingNote,
    }
}

fn guide_profile() -> AgentProfile {
    AgentProfile {
        id: "guide".to_string(),
        persona: Persona::new(
            "Sage",
            [
                "Meet the learner where they are.",
                "Prefer a realistic plan over an ambitious one.",
                "Every recommendation should come with a next step.",
                "Protect sleep and health; they are part of preparation.",
            ],
            [
                "exam preparation",
                "study techniques",
                "career planning",
                "interview preparation",
                "student wellbeing",
            ],
        ),
        default_intent: Intent::GENERAL_GUIDANCE,
        rules: vec![
            IntentRule::new(
                Intent::STUDY_PLANNING,
                &[
                    "study", "exam", "syllabus", "revision", "mock test", "cgl", "course",
                    "learn", "timetable",
                ],
            ),
            IntentRule::new(
                Intent::CAREER_GUIDANCE,
                &["career", "job", "interview", "resume", "salary", "internship", "promotion"],
            ),
            IntentRule::new(
                Intent::WELLBEING_CHECK,
                &["stress", "anxious", "tired", "burnout", "overwhelm", "can't sleep", "lonely"],
            ),
        ],
        plans: vec![
            plan(
                Intent::STUDY_PLANNING,
                "Turn the user's goal into a study plan they can follow this week.",
                "Give a day-by-day plan as a short table or list, then two techniques to make the hours count.",
            ),
            plan(
                Intent::CAREER_GUIDANCE,
                "Help the user make a concrete next move in their career.",
                "Summarise their situation in one line, offer two or three options with one trade-off each, and recommend one.",
            ),
            plan(
                Intent::WELLBEING_CHECK,
                "Check in on the user's wellbeing and help them recover energy.",
                "Acknowledge how they feel, suggest one or two gentle adjustments, and mention reaching out to someone they trust.",
            ),
        ],
        default_plan: PlanTemplate::new(
            "Offer clear, encouraging guidance on the user's question.",
            "Answer in a few short paragraphs and finish with a single suggested next step.",
        ),
        format: FormatStyle::Plain,
    }
}
