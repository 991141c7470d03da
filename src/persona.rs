use serde::{Deserialize, Serialize};

/// The identity presented to the model as framing context.
/// Set once when an agent is built and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    #[serde(default)]
    pub principles: Vec<String>,
    #[serde(default)]
    pub knowledge_domains: Vec<String>,
}

impl Persona {
    pub fn new(
        name: impl Into<String>,
        principles: impl IntoIterator<Item = impl Into<String>>,
        knowledge_domains: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            principles: principles.into_iter().map(Into::into).collect(),
            knowledge_domains: knowledge_domains.into_iter().map(Into::into).collect(),
        }
    }

    /// Principles as a bullet list, in their configured order
    pub fn principles_block(&self) -> String {
        self.principles
            .iter()
            .map(|p| format!("- {}", p))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn knowledge_line(&self) -> String {
        self.knowledge_domains.join(", ")
    }
}
