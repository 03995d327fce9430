//! Conversation State and Interviewer Mood
//!
//! [`ConversationState`] is the per-interview record of everything the
//! player has said plus the current performance snapshot. It is owned by
//! one controller instance and accessed sequentially; there is no sharing
//! across interviews.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::response::PlayerResponse;

/// Interviewer disposition, summarized as a single label.
///
/// Mood is a derived snapshot recomputed from frustration and recent
/// response quality. There is no transition graph between moods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    #[default]
    Neutral,
    Skeptical,
    Frustrated,
    Hostile,
    Sympathetic,
    Excited,
}

impl Mood {
    /// True for moods that read as the interviewer being won over.
    pub fn is_favorable(self) -> bool {
        matches!(self, Mood::Sympathetic | Mood::Excited)
    }

    /// True for moods that read as open antagonism.
    pub fn is_adversarial(self) -> bool {
        matches!(self, Mood::Frustrated | Mood::Hostile)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mood::Neutral => "neutral",
            Mood::Skeptical => "skeptical",
            Mood::Frustrated => "frustrated",
            Mood::Hostile => "hostile",
            Mood::Sympathetic => "sympathetic",
            Mood::Excited => "excited",
        };
        write!(f, "{}", label)
    }
}

/// Numeric performance snapshot, mutated by the external analyzer after
/// each turn. The controller only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSnapshot {
    /// Candidate confidence score, 0..100
    pub confidence: f32,
    /// Consistency score, 0..100
    pub consistency: f32,
    /// Authenticity score, 0..100
    pub authenticity: f32,
    /// Overall performance score, 0..100
    pub overall_score: f32,
    /// Count of major mistakes so far
    pub major_mistakes: u32,
    /// Count of strong moments so far
    pub strong_moments: u32,
}

impl Default for PerformanceSnapshot {
    fn default() -> Self {
        Self {
            confidence: 50.0,
            consistency: 50.0,
            authenticity: 50.0,
            overall_score: 50.0,
            major_mistakes: 0,
            strong_moments: 0,
        }
    }
}

/// Per-interview conversation state.
///
/// Holds the ordered sequence of answered question ids (insertion order,
/// unique), the append-only response log, and the performance snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    /// Unique identifier for this interview
    pub interview_id: String,
    /// Answered question ids in play order, no duplicates
    answered_questions: Vec<String>,
    /// Every response given, in order
    responses: Vec<PlayerResponse>,
    /// Current performance snapshot
    pub performance: PerformanceSnapshot,
}

impl ConversationState {
    /// Creates a fresh state for a new interview.
    pub fn new() -> Self {
        Self {
            interview_id: format!("interview_{}", Uuid::new_v4()),
            answered_questions: Vec::new(),
            responses: Vec::new(),
            performance: PerformanceSnapshot::default(),
        }
    }

    /// Records a question id as answered.
    ///
    /// Returns false if the id was already present; the sequence never
    /// contains duplicates.
    pub fn record_answer(&mut self, question_id: &str) -> bool {
        if self.has_answered(question_id) {
            return false;
        }
        self.answered_questions.push(question_id.to_string());
        true
    }

    /// Appends a response to the log. The log is append-only.
    pub fn push_response(&mut self, response: PlayerResponse) {
        self.responses.push(response);
    }

    /// Replaces the performance snapshot (called by the external analyzer).
    pub fn set_performance(&mut self, performance: PerformanceSnapshot) {
        self.performance = performance;
    }

    /// Answered question ids in play order.
    pub fn answered_questions(&self) -> &[String] {
        &self.answered_questions
    }

    /// True if the given question id has been answered.
    pub fn has_answered(&self, question_id: &str) -> bool {
        self.answered_questions.iter().any(|id| id == question_id)
    }

    /// The full response log.
    pub fn responses(&self) -> &[PlayerResponse] {
        &self.responses
    }

    /// Number of turns taken so far.
    pub fn turns(&self) -> usize {
        self.responses.len()
    }

    /// The most recent response, if any.
    pub fn last_response(&self) -> Option<&PlayerResponse> {
        self.responses.last()
    }

    /// Iterates over the last `n` responses, most recent first.
    pub fn recent_responses(&self, n: usize) -> impl Iterator<Item = &PlayerResponse> {
        self.responses.iter().rev().take(n)
    }

    /// Running average word count across all responses; 0.0 before the
    /// first response.
    pub fn average_word_count(&self) -> f32 {
        if self.responses.is_empty() {
            return 0.0;
        }
        let total: u32 = self.responses.iter().map(|r| r.word_count).sum();
        total as f32 / self.responses.len() as f32
    }

    /// Earliest response tagged with the given topic, excluding the most
    /// recent response. Used to resolve a contradiction back to the
    /// statement it conflicts with.
    pub fn earliest_prior_on_topic(&self, topic: &str) -> Option<&PlayerResponse> {
        let prior = self.responses.len().saturating_sub(1);
        self.responses[..prior].iter().find(|r| r.is_on_topic(topic))
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}
