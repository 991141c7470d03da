//! Keyword intent classification
//!
//! An ordered list of `(keywords, intent)` rules. The first rule with any
//! keyword contained in the lower-cased input wins, so rule order is the
//! tie-break when a message mentions more than one topic.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A closed-set label for what a message is likely about.
/// The set is defined by the active profile's rule table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intent(Cow<'static, str>);

impl Intent {
    pub const GENERAL_HELP: Intent = Intent(Cow::Borrowed("general_help"));
    pub const DISCIPLINE_SUPPORT: Intent = Intent(Cow::Borrowed("discipline_support"));
    pub const TECHNICAL_HELP: Intent = Intent(Cow::Borrowed("technical_help"));
    pub const EMOTIONAL_VENTING: Intent = Intent(Cow::Borrowed("emotional_venting"));
    pub const SYSTEM_DESIGN: Intent = Intent(Cow::Borrowed("system_design"));

    pub const GENERAL_GUIDANCE: Intent = Intent(Cow::Borrowed("general_guidance"));
    pub const STUDY_PLANNING: Intent = Intent(Cow::Borrowed("study_planning"));
    pub const CAREER_GUIDANCE: Intent = Intent(Cow::Borrowed("career_guidance"));
    pub const WELLBEING_CHECK: Intent = Intent(Cow::Borrowed("wellbeing_check"));

    pub fn new(label: impl Into<String>) -> Self {
        Intent(Cow::Owned(label.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// "discipline_support" -> "discipline support"
    pub fn label(&self) -> String {
        self.0.replace('_', " ")
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRule {
    pub intent: Intent,
    pub keywords: Vec<String>,
}

impl IntentRule {
    pub fn new(intent: Intent, keywords: &[&str]) -> Self {
        Self {
            intent,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Which rule fired and on what keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    pub index: usize,
    pub intent: &'a Intent,
    pub keyword: &'a str,
}

#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
    default_intent: Intent,
}

impl IntentClassifier {
    /// Keywords are lower-cased up front but otherwise kept as written, so
    /// `" ai "` only matches the padded word. Blank keywords are dropped since
    /// an empty needle is contained in every message.
    pub fn new(rules: Vec<IntentRule>, default_intent: Intent) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| IntentRule {
                intent: rule.intent,
                keywords: rule
                    .keywords
                    .iter()
                    .filter(|k| !k.trim().is_empty())
                    .map(|k| k.to_lowercase())
                    .collect(),
            })
            .collect();

        Self { rules, default_intent }
    }

    pub fn default_intent(&self) -> &Intent {
        &self.default_intent
    }

    pub fn matched_rule(&self, text: &str) -> Option<RuleMatch<'_>> {
        let lower = text.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }

        self.rules.iter().enumerate().find_map(|(index, rule)| {
            rule.keywords
                .iter()
                .find(|kw| lower.contains(kw.as_str()))
                .map(|kw| RuleMatch {
                    index,
                    intent: &rule.intent,
                    keyword: kw.as_str(),
                })
        })
    }

    pub fn classify(&self, text: &str) -> Intent {
        self.matched_rule(text)
            .map(|m| m.intent.clone())
            .unwrap_or_else(|| self.default_intent.clone())
    }
}
