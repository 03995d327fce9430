//! Conversation Action Types
//!
//! The controller produces exactly one [`ConversationAction`] per player
//! turn. Each action carries display text plus a metadata bag consumed by
//! downstream UI and analytics; the core logic never reads metadata back.

use serde::{Deserialize, Serialize};

use crate::state::Mood;

/// Metadata attached to every action for downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMetadata {
    /// What caused this action (e.g. "consecutive_evasion", "rapid_fire")
    pub trigger: String,
    /// Turn number the action was produced on
    pub turn: u64,
    /// Interviewer mood at decision time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    /// Global evasion counter at decision time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evasion_count: Option<u32>,
    /// Escalation level (rapid-fire pacing, interruption tier)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_level: Option<u32>,
    /// Advisory response time limit in seconds; enforcement is the
    /// presentation layer's job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u32>,
    /// Expected response type hint (e.g. "yes_or_no")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_response: Option<String>,
    /// Question id this action refers back to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    /// Topic this action concerns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl ActionMetadata {
    /// Creates metadata with a trigger reason and turn number.
    pub fn new(trigger: impl Into<String>, turn: u64) -> Self {
        Self {
            trigger: trigger.into(),
            turn,
            mood: None,
            evasion_count: None,
            escalation_level: None,
            time_limit_secs: None,
            expected_response: None,
            question_id: None,
            topic: None,
        }
    }

    /// Sets the mood.
    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    /// Sets the evasion counter.
    pub fn with_evasion_count(mut self, count: u32) -> Self {
        self.evasion_count = Some(count);
        self
    }

    /// Sets the escalation level.
    pub fn with_escalation_level(mut self, level: u32) -> Self {
        self.escalation_level = Some(level);
        self
    }

    /// Sets the advisory time limit.
    pub fn with_time_limit(mut self, secs: u32) -> Self {
        self.time_limit_secs = Some(secs);
        self
    }

    /// Sets the expected response type hint.
    pub fn with_expected_response(mut self, expected: impl Into<String>) -> Self {
        self.expected_response = Some(expected.into());
        self
    }

    /// Sets the referenced question id.
    pub fn with_question_id(mut self, question_id: impl Into<String>) -> Self {
        self.question_id = Some(question_id.into());
        self
    }

    /// Sets the topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
}

/// The single value the controller returns each turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ConversationAction {
    /// Advance to a specific planned question
    Question {
        question_id: String,
        text: String,
        metadata: ActionMetadata,
    },
    /// Dynamically generated prompt, not part of the static arc
    FollowUp {
        text: String,
        metadata: ActionMetadata,
    },
    /// Mid-thought cutoff
    Interruption {
        text: String,
        metadata: ActionMetadata,
    },
    /// Challenge over an inconsistency with an earlier response
    ContradictionChallenge {
        text: String,
        metadata: ActionMetadata,
    },
    /// The interview is over
    Conclusion {
        text: String,
        metadata: ActionMetadata,
    },
}

impl ConversationAction {
    /// Display text of the action.
    pub fn text(&self) -> &str {
        match self {
            ConversationAction::Question { text, .. }
            | ConversationAction::FollowUp { text, .. }
            | ConversationAction::Interruption { text, .. }
            | ConversationAction::ContradictionChallenge { text, .. }
            | ConversationAction::Conclusion { text, .. } => text,
        }
    }

    /// The metadata bag.
    pub fn metadata(&self) -> &ActionMetadata {
        match self {
            ConversationAction::Question { metadata, .. }
            | ConversationAction::FollowUp { metadata, .. }
            | ConversationAction::Interruption { metadata, .. }
            | ConversationAction::ContradictionChallenge { metadata, .. }
            | ConversationAction::Conclusion { metadata, .. } => metadata,
        }
    }

    /// True if this is an interruption.
    pub fn is_interruption(&self) -> bool {
        matches!(self, ConversationAction::Interruption { .. })
    }

    /// True if this is a conclusion.
    pub fn is_conclusion(&self) -> bool {
        matches!(self, ConversationAction::Conclusion { .. })
    }
}

/// Why an interruption fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptionKind {
    /// Global evasion counter crossed the escalation threshold
    ConsecutiveEvasion,
    /// Repeated evasion on one topic
    TopicAvoidance,
    /// Overlong non-answer
    Filibuster,
    /// Redirecting the question elsewhere
    Deflection,
    /// A question-specific trigger supplied by the content provider
    QuestionTrigger,
    /// Driven by interviewer frustration and mood
    MoodDriven,
}

/// History record of one emitted interruption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterruptionRecord {
    /// Sequence-formatted record id
    pub record_id: String,
    /// Question being answered when the interruption fired
    pub question_id: String,
    /// Turn number
    pub turn: u64,
    /// Why it fired
    pub kind: InterruptionKind,
    /// The interruption line shown to the player
    pub message: String,
}

/// Generates an interruption record id.
pub fn generate_interruption_id(sequence: u64) -> String {
    format!("intr_{:05}", sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_builder() {
        let metadata = ActionMetadata::new("rapid_fire", 7)
            .with_mood(Mood::Frustrated)
            .with_escalation_level(3)
            .with_time_limit(15)
            .with_topic("climate");

        assert_eq!(metadata.trigger, "rapid_fire");
        assert_eq!(metadata.turn, 7);
        assert_eq!(metadata.mood, Some(Mood::Frustrated));
        assert_eq!(metadata.escalation_level, Some(3));
        assert_eq!(metadata.time_limit_secs, Some(15));
        assert_eq!(metadata.topic.as_deref(), Some("climate"));
        assert!(metadata.evasion_count.is_none());
    }

    #[test]
    fn test_action_accessors() {
        let action = ConversationAction::Interruption {
            text: "Hold on.".to_string(),
            metadata: ActionMetadata::new("consecutive_evasion", 3),
        };

        assert_eq!(action.text(), "Hold on.");
        assert_eq!(action.metadata().trigger, "consecutive_evasion");
        assert!(action.is_interruption());
        assert!(!action.is_conclusion());
    }

    #[test]
    fn test_action_serialization_tagged() {
        let action = ConversationAction::FollowUp {
            text: "Be specific.".to_string(),
            metadata: ActionMetadata::new("memory_contextual", 2),
        };

        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains(r#""action":"follow_up""#));

        let parsed: ConversationAction = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, action);
    }

    #[test]
    fn test_metadata_skips_empty_fields() {
        let metadata = ActionMetadata::new("advance", 1);
        let json = serde_json::to_string(&metadata).unwrap();
        assert!(!json.contains("mood"));
        assert!(!json.contains("time_limit_secs"));
    }

    #[test]
    fn test_interruption_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&InterruptionKind::TopicAvoidance).unwrap(),
            r#""topic_avoidance""#
        );
        assert_eq!(
            serde_json::to_string(&InterruptionKind::Filibuster).unwrap(),
            r#""filibuster""#
        );
    }

    #[test]
    fn test_generate_interruption_id() {
        assert_eq!(generate_interruption_id(1), "intr_00001");
        assert_eq!(generate_interruption_id(12345), "intr_12345");
    }
}
