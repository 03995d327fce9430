//! Question Content Types
//!
//! The boundary with the question-content collaborator. A scenario supplies
//! an ordered arc of [`QuestionSpec`]s; each may carry urgency settings,
//! interruption triggers, and follow-up rules. Condition strings use a small
//! fixed grammar parsed by the controller crate.

use serde::{Deserialize, Serialize};

/// What happens when a question's advisory timer expires.
///
/// Timeout handling is delegated to the caller; the controller never
/// enforces wall-clock limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutAction {
    /// Move on as if a minimal answer was given
    #[default]
    AutoAdvance,
    /// Score a penalty against the candidate
    Penalty,
}

/// Advisory time pressure for a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgencyDescriptor {
    /// Seconds the player has to respond
    pub time_limit_secs: u32,
    /// Seconds remaining at which the UI should warn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_at_secs: Option<u32>,
    /// What the caller should do on timeout
    #[serde(default)]
    pub timeout_action: TimeoutAction,
}

/// A question-specific interruption trigger supplied by the content
/// provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterruptionTriggerSpec {
    /// Condition string (e.g. "tone:evasive", "word_count>60")
    pub condition: String,
    /// Interruption line to deliver
    pub message: String,
    /// Probability the interruption fires when the condition holds
    #[serde(default = "default_probability")]
    pub probability: f32,
    /// Optional symbolic follow-up action queued after the interruption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_action: Option<String>,
}

/// A follow-up rule attached to a question.
///
/// `target` is either an existing question id (asked as a planned question)
/// or a symbolic action name routed to the dynamic follow-up library. A
/// target that resolves to neither is a configuration gap and is skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpRule {
    /// Condition string in the same grammar as interruption triggers
    pub condition: String,
    /// Question id or symbolic action name
    pub target: String,
    /// Probability gate; absent means always
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f32>,
}

/// One planned question in a scenario arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSpec {
    /// Identifier, unique within the arc
    pub id: String,
    /// The question text
    pub prompt: String,
    /// Optional framing line read before the question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<String>,
    /// Topic tag used for memory and evasion tracking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Advisory time pressure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<UrgencyDescriptor>,
    /// Interruption triggers checked while this question is live
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interruption_triggers: Vec<InterruptionTriggerSpec>,
    /// Follow-up rules evaluated in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_ups: Vec<FollowUpRule>,
}

impl QuestionSpec {
    /// Creates a bare question.
    pub fn new(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            setup: None,
            topic: None,
            urgency: None,
            interruption_triggers: Vec::new(),
            follow_ups: Vec::new(),
        }
    }

    /// Sets the topic tag.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Sets the setup line.
    pub fn with_setup(mut self, setup: impl Into<String>) -> Self {
        self.setup = Some(setup.into());
        self
    }

    /// Sets the urgency descriptor.
    pub fn with_urgency(mut self, urgency: UrgencyDescriptor) -> Self {
        self.urgency = Some(urgency);
        self
    }

    /// Adds an interruption trigger.
    pub fn with_trigger(mut self, trigger: InterruptionTriggerSpec) -> Self {
        self.interruption_triggers.push(trigger);
        self
    }

    /// Adds a follow-up rule.
    pub fn with_follow_up(mut self, rule: FollowUpRule) -> Self {
        self.follow_ups.push(rule);
        self
    }

    /// Full display text: setup line (if any) followed by the prompt.
    pub fn display_text(&self) -> String {
        match &self.setup {
            Some(setup) => format!("{} {}", setup, self.prompt),
            None => self.prompt.clone(),
        }
    }
}

fn default_probability() -> f32 {
    1.0
}
