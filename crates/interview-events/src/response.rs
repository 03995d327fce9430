//! Player Response Types
//!
//! A [`PlayerResponse`] is the immutable record of one answered turn: the
//! question it answered, the raw text, and the signals the controller
//! consumes (classified tone, word count, topic tag, contradiction flag).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified tone of a player response.
///
/// Classification happens upstream of the controller; this is a closed label
/// set, not free-text semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTone {
    Confident,
    Defensive,
    Evasive,
    Diplomatic,
    Aggressive,
    Authentic,
    Nervous,
    Passionate,
}

impl ResponseTone {
    /// Returns all tone variants.
    pub fn all() -> &'static [ResponseTone] {
        &[
            ResponseTone::Confident,
            ResponseTone::Defensive,
            ResponseTone::Evasive,
            ResponseTone::Diplomatic,
            ResponseTone::Aggressive,
            ResponseTone::Authentic,
            ResponseTone::Nervous,
            ResponseTone::Passionate,
        ]
    }

    /// True for tones that read as direct, composed engagement.
    pub fn is_direct(self) -> bool {
        matches!(self, ResponseTone::Confident | ResponseTone::Authentic)
    }

    /// True for tones that read as pressure or avoidance.
    pub fn is_pressured(self) -> bool {
        matches!(
            self,
            ResponseTone::Defensive | ResponseTone::Evasive | ResponseTone::Nervous
        )
    }
}

impl fmt::Display for ResponseTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResponseTone::Confident => "confident",
            ResponseTone::Defensive => "defensive",
            ResponseTone::Evasive => "evasive",
            ResponseTone::Diplomatic => "diplomatic",
            ResponseTone::Aggressive => "aggressive",
            ResponseTone::Authentic => "authentic",
            ResponseTone::Nervous => "nervous",
            ResponseTone::Passionate => "passionate",
        };
        write!(f, "{}", label)
    }
}

/// One player response, immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerResponse {
    /// Identifier of the question this response answers
    pub question_id: String,
    /// Raw response text
    pub text: String,
    /// Pre-classified tone label
    pub tone: ResponseTone,
    /// Word count of the response text
    pub word_count: u32,
    /// Optional topic tag (e.g. "economy", "climate")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Set by the inconsistency collaborator when this response conflicts
    /// with an earlier response on the same topic
    #[serde(default)]
    pub contradicts_previous: bool,
}

impl PlayerResponse {
    /// Creates a response, computing the word count from the text.
    pub fn new(
        question_id: impl Into<String>,
        text: impl Into<String>,
        tone: ResponseTone,
    ) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count() as u32;
        Self {
            question_id: question_id.into(),
            text,
            tone,
            word_count,
            topic: None,
            contradicts_previous: false,
        }
    }

    /// Sets the topic tag.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Marks this response as contradicting an earlier one.
    pub fn with_contradiction(mut self) -> Self {
        self.contradicts_previous = true;
        self
    }

    /// True if this response carries the given topic tag.
    pub fn is_on_topic(&self, topic: &str) -> bool {
        self.topic.as_deref() == Some(topic)
    }
}
