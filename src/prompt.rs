//! Prompt assembly
//!
//! Renders persona, plan and user text in a fixed order:
//! persona name, principles, knowledge domains, system goal, structure hint,
//! then the user's message with its timestamp. Providers pick the envelope;
//! the content is the same either way.

use crate::planner::ResponsePlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// System message with the persona, user message with the request
    Chat,
    /// One combined text sent as a single user part
    SingleBlob,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssembledPrompt {
    Chat { system: String, user: String },
    Blob(String),
}

impl AssembledPrompt {
    /// The whole prompt as one string, regardless of envelope
    pub fn full_text(&self) -> String {
        match self {
            AssembledPrompt::Chat { system, user } => format!("{}\n\n{}", system, user),
            AssembledPrompt::Blob(text) => text.clone(),
        }
    }
}

fn persona_section(plan: &ResponsePlan<'_>) -> String {
    let persona = plan.persona;
    let mut parts = vec![format!("You are {}.", persona.name)];

    if !persona.principles.is_empty() {
        parts.push(format!("Your guiding principles:\n{}", persona.principles_block()));
    }
    if !persona.knowledge_domains.is_empty() {
        parts.push(format!("Your areas of knowledge: {}", persona.knowledge_line()));
    }

    parts.join("\n\n")
}

fn request_section(plan: &ResponsePlan<'_>) -> String {
    format!(
        "System goal: {}\n\nResponse structure: {}\n\nUser message (received {}):\n{}",
        plan.system_goal, plan.structure_hint, plan.input.timestamp, plan.input.text
    )
}

pub fn build_prompt(plan: &ResponsePlan<'_>, envelope: Envelope) -> AssembledPrompt {
    let persona = persona_section(plan);
    let request = request_section(plan);

    match envelope {
        Envelope::Chat => AssembledPrompt::Chat {
            system: persona.trim().to_string(),
            user: request.trim().to_string(),
        },
        Envelope::SingleBlob => {
            AssembledPrompt::Blob(format!("{}\n\n{}", persona, request).trim().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Intent;
    use crate::persona::Persona;
    use crate::planner::{ObservedInput, PlanTemplate, ResponsePlanner};

    fn persona() -> Persona {
        Persona::new(
            "Atlas",
            ["Consistency beats intensity", "Rest is part of the work"],
            ["habit formation", "software engineering"],
        )
    }

    fn planner() -> ResponsePlanner {
        ResponsePlanner::new(Vec::new(), PlanTemplate::new("Help them", "Numbered list"))
    }

    #[test]
    fn test_blob_contains_everything_in_order() {
        let persona = persona();
        let planner = planner();
        let plan = planner.build(&persona, Intent::GENERAL_HELP, ObservedInput::observe("How do I start?"));

        let prompt = build_prompt(&plan, Envelope::SingleBlob);
        let AssembledPrompt::Blob(text) = &prompt else {
            panic!("expected a blob prompt");
        };

        let positions: Vec<usize> = [
            "Atlas",
            "Consistency beats intensity",
            "Rest is part of the work",
            "habit formation, software engineering",
            "Help them",
            "Numbered list",
            plan.input.timestamp.as_str(),
            "How do I start?",
        ]
        .iter()
        .map(|needle| text.find(needle).unwrap_or_else(|| panic!("missing {}", needle)))
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]), "out of order: {:?}", positions);
        assert_eq!(text.trim(), text);
    }

    #[test]
    fn test_chat_splits_persona_and_request() {
        let persona = persona();
        let planner = planner();
        let plan = planner.build(&persona, Intent::GENERAL_HELP, ObservedInput::observe("Ship it?"));

        match build_prompt(&plan, Envelope::Chat) {
            AssembledPrompt::Chat { system, user } => {
                assert!(system.starts_with("You are Atlas."));
                assert!(system.contains("- Consistency beats intensity\n- Rest is part of the work"));
                assert!(!system.contains("Ship it?"));
                assert!(user.contains("System goal: Help them"));
                assert!(user.contains("Response structure: Numbered list"));
                assert!(user.ends_with("Ship it?"));
            }
            other => panic!("expected chat prompt, got {:?}", other),
        }
    }

    #[test]
    fn test_content_is_identical_across_envelopes() {
        let persona = persona();
        let planner = planner();
        let plan = planner.build(&persona, Intent::GENERAL_HELP, ObservedInput::observe("same text"));

        let chat = build_prompt(&plan, Envelope::Chat).full_text();
        let blob = build_prompt(&plan, Envelope::SingleBlob).full_text();
        assert_eq!(chat, blob);
    }

    #[test]
    fn test_user_text_is_verbatim() {
        let persona = persona();
        let planner = planner();
        let raw = "Fix `fn main() { println!(\"{}\", x) }` please -- it's {broken}";
        let plan = planner.build(&persona, Intent::GENERAL_HELP, ObservedInput::observe(raw));

        let text = build_prompt(&plan, Envelope::SingleBlob).full_text();
        assert!(text.contains(raw));
        for principle in &persona.principles {
            assert!(text.contains(principle.as_str()));
        }
    }

    #[test]
    fn test_empty_persona_lists_are_omitted() {
        let persona = Persona::new("Bare", Vec::<String>::new(), Vec::<String>::new());
        let planner = planner();
        let plan = planner.build(&persona, Intent::GENERAL_HELP, ObservedInput::observe(""));

        let text = build_prompt(&plan, Envelope::SingleBlob).full_text();
        assert!(text.starts_with("You are Bare.\n\nSystem goal: Help them"));
        assert!(!text.contains("guiding principles"));
    }
}
