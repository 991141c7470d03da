use crate::formatter::FormatStyle;
use crate::gateway::{ModelGateway, ModelReply};
use crate::intent::{Intent, IntentClassifier};
use crate::logging;
use crate::persona::Persona;
use crate::planner::{ObservedInput, ResponsePlanner};
use crate::profiles::AgentProfile;
use crate::prompt::build_prompt;
use uuid::Uuid;

/// Outcome of one `run_interaction` call
#[derive(Debug, Clone)]
pub struct Interaction {
    pub id: Uuid,
    pub intent: Intent,
    pub reply: ModelReply,
    /// What the user sees: the formatted reply or a fallback text
    pub text: String,
}

/// Runs observe -> classify -> plan -> assemble -> invoke -> format for one
/// persona. Holds no per-call state, so one instance serves concurrent
/// requests.
pub struct Orchestrator {
    profile_id: String,
    persona: Persona,
    classifier: IntentClassifier,
    planner: ResponsePlanner,
    format: FormatStyle,
    gateway: ModelGateway,
}

impl Orchestrator {
    pub fn new(profile: &AgentProfile, gateway: ModelGateway) -> Self {
        Self {
            profile_id: profile.id.clone(),
            persona: profile.persona.clone(),
            classifier: profile.classifier(),
            planner: profile.planner(),
            format: profile.format,
            gateway,
        }
    }

    pub fn profile_id(&self) -> &str {
        &self.profile_id
    }

    pub fn gateway(&self) -> &ModelGateway {
        &self.gateway
    }

    /// The reply text for `user_input`. Never fails; provider problems come
    /// back as readable text.
    pub async fn process_interaction(&self, user_input: &str) -> String {
        self.run_interaction(user_input).await.text
    }

    pub async fn run_interaction(&self, user_input: &str) -> Interaction {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let observed = ObservedInput::observe(user_input);

        let intent = match self.classifier.matched_rule(&observed.text) {
            Some(m) => {
                logging::log_routing(Some(&id_str), &format!(
                    "intent={} (rule #{}, keyword '{}')", m.intent, m.index, m.keyword
                ));
                m.intent.clone()
            }
            None => {
                logging::log_routing(Some(&id_str), &format!(
                    "intent={} (default, no keyword matched)", self.classifier.default_intent()
                ));
                self.classifier.default_intent().clone()
            }
        };

        let plan = self.planner.build(&self.persona, intent, observed);
        let prompt = build_prompt(&plan, self.gateway.provider().envelope());
        let reply = self.gateway.invoke_for(Some(&id_str), &prompt).await;

        let outcome = match &reply {
            ModelReply::Degraded(fallback) => format!("degraded/{}", fallback.as_str()),
            other => other.kind().to_string(),
        };
        logging::log_agent(Some(&id_str), &format!(
            "{} replied: {} ({} chars)",
            self.gateway.provider().name(),
            outcome,
            reply.text().len()
        ));

        let text = self.format.format(&reply, &plan);

        Interaction {
            id,
            intent: plan.intent,
            reply,
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Fallback, MISSING_CREDENTIAL_REPLY};
    use crate::gemini::GeminiProvider;
    use crate::openai::OpenAiProvider;
    use crate::profiles::builtin;
    use crate::testing::MockTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn coach_with(transport: Arc<MockTransport>, key: Option<&str>) -> Orchestrator {
        let gateway = ModelGateway::new(
            Box::new(OpenAiProvider::new(None, None, None).unwrap()),
            transport,
            key.map(String::from),
        );
        Orchestrator::new(builtin("coach").unwrap(), gateway)
    }

    #[tokio::test]
    async fn test_consistency_with_coding_end_to_end() {
        let transport = MockTransport::replying(
            200,
            json!({"choices": [{"message": {"content": "Start with 20 minutes a day."}}]}),
        );
        let orchestrator = coach_with(transport.clone(), Some("sk-test"));
        let input = "Help me stay consistent with coding without burning out";

        let interaction = orchestrator.run_interaction(input).await;

        assert_eq!(interaction.intent, Intent::DISCIPLINE_SUPPORT);
        assert!(matches!(interaction.reply, ModelReply::Answer(_)));

        let profile = builtin("coach").unwrap();
        let discipline_plan = profile.planner().plan(&Intent::DISCIPLINE_SUPPORT).clone();

        let sent = transport.last_request().unwrap();
        let system = sent.body["messages"][0]["content"].as_str().unwrap();
        let user = sent.body["messages"][1]["content"].as_str().unwrap();

        for principle in &profile.persona.principles {
            assert!(system.contains(principle.as_str()), "missing principle: {}", principle);
        }
        assert!(user.contains(input));
        assert!(user.contains(&discipline_plan.system_goal));
        assert!(user.contains(&discipline_plan.structure_hint));

        // coach decorates answers with a teaching note
        assert!(interaction.text.starts_with("[Atlas | discipline support]"));
        assert!(interaction.text.contains("Start with 20 minutes a day."));
    }

    #[tokio::test]
    async fn test_missing_key_returns_fallback_without_calls() {
        let transport = MockTransport::replying(200, json!({}));
        let orchestrator = coach_with(transport.clone(), None);

        let text = orchestrator.process_interaction("fix this bug").await;

        assert_eq!(text, MISSING_CREDENTIAL_REPLY);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_input_uses_default_intent() {
        let transport = MockTransport::replying(200, json!({"choices": [{"message": {"content": "Hi!"}}]}));
        let orchestrator = coach_with(transport, Some("sk-test"));

        let interaction = orchestrator.run_interaction("   ").await;
        assert_eq!(interaction.intent, Intent::GENERAL_HELP);
    }

    #[tokio::test]
    async fn test_gemini_gets_single_blob_with_same_content() {
        let transport = MockTransport::replying(
            200,
            json!({"candidates": [{"content": {"parts": [{"text": "Plan ready."}]}}]}),
        );
        let gateway = ModelGateway::new(
            Box::new(GeminiProvider::new(None, None, None).unwrap()),
            transport.clone(),
            Some("g-key".to_string()),
        );
        let orchestrator = Orchestrator::new(builtin("guide").unwrap(), gateway);

        let interaction = orchestrator.run_interaction("Make me a CGL revision timetable").await;
        assert_eq!(interaction.intent, Intent::STUDY_PLANNING);
        // guide uses plain formatting
        assert_eq!(interaction.text, "Plan ready.");

        let sent = transport.last_request().unwrap();
        let parts = sent.body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        let text = parts[0]["text"].as_str().unwrap();
        assert!(text.starts_with("You are Sage."));
        assert!(text.contains("Make me a CGL revision timetable"));
    }

    #[tokio::test]
    async fn test_safety_refusal_is_not_decorated() {
        let transport = MockTransport::replying(
            200,
            json!({"choices": [{"message": {"content": ""}, "finish_reason": "content_filter"}]}),
        );
        let orchestrator = coach_with(transport, Some("sk-test"));

        let interaction = orchestrator.run_interaction("my code crashes").await;
        assert_eq!(interaction.reply, ModelReply::Degraded(Fallback::SafetyRefusal));
        assert_eq!(interaction.text, Fallback::SafetyRefusal.text());
    }
}
