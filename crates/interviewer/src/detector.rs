//! Evasion/Deflection Detector
//!
//! Stateless-per-call classification of responses plus two counters: a
//! decaying global evasion counter and monotonic per-topic counters. The
//! classification rules are behavioral contracts and are reproduced
//! exactly:
//!
//! - evasive: tone is evasive, OR tone is defensive with more than 50
//!   words, OR fewer than 8 words
//! - filibuster: words above 2.5x the running average, above 80 words,
//!   and tone evasive or defensive
//! - deflection: a deflection phrase in the text, with at least 2 of the
//!   last 3 responses defensive/deflecting (consecutive, most-recent-first)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use interview_events::{ConversationState, InterruptionKind, PlayerResponse, ResponseTone};

/// Responses under this many words are evasive regardless of tone.
pub const SHORT_RESPONSE_WORDS: u32 = 8;
/// Defensive responses over this many words are evasive.
pub const LONG_DEFENSIVE_WORDS: u32 = 50;
/// Filibusters exceed this absolute word count.
pub const FILIBUSTER_MIN_WORDS: u32 = 80;
/// Filibusters exceed this multiple of the running average.
pub const FILIBUSTER_AVG_MULTIPLIER: f32 = 2.5;

/// Escalation messages for consecutive evasion, indexed by tier.
/// Tier = floor(counter / 2): counter 3 reads the first line, 4-5 the
/// second, and the critical line is reached at counter 6+.
const ESCALATION_MESSAGES: [&str; 3] = [
    "Hold on. That is the third question in a row you have dodged. A simple answer, please.",
    "Stop. You are still not answering. Viewers notice this, you know.",
    "This is remarkable. I cannot get a single straight answer out of you tonight.",
];

/// Detector thresholds and phrase list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Global counter value at which consecutive-evasion interruptions begin
    pub consecutive_evasion_threshold: u32,
    /// Per-topic evasions at which topic avoidance fires
    pub topic_avoidance_threshold: u32,
    /// Phrases that mark a response as deflecting
    pub deflection_phrases: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            consecutive_evasion_threshold: 3,
            topic_avoidance_threshold: 2,
            deflection_phrases: vec![
                "what we should really be talking about".to_string(),
                "the real question is".to_string(),
                "let me tell you what matters".to_string(),
                "that's not the issue".to_string(),
                "my opponent".to_string(),
                "ask yourself instead".to_string(),
            ],
        }
    }
}

/// Counter snapshot for downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EvasionStats {
    /// Decaying global counter: +1 per evasive response, -1 (floor 0)
    /// per non-evasive one
    pub consecutive_evasions: u32,
    /// Monotonic per-topic counters
    pub topic_evasions: HashMap<String, u32>,
    /// Total evasive responses over the interview
    pub total_evasive_responses: u32,
}

impl EvasionStats {
    /// Per-topic count, 0 when the topic was never evaded on.
    pub fn topic_count(&self, topic: &str) -> u32 {
        self.topic_evasions.get(topic).copied().unwrap_or(0)
    }
}

/// One interruption produced by a pattern check.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternInterruption {
    /// Which pattern matched
    pub kind: InterruptionKind,
    /// The line to deliver
    pub message: String,
    /// Escalation tier (consecutive evasion only, 0 otherwise)
    pub escalation_level: u32,
    /// Topic, for topic avoidance
    pub topic: Option<String>,
}

/// Evasion and deflection detector.
#[derive(Debug, Clone)]
pub struct EvasionDetector {
    config: DetectorConfig,
    evasion_counter: u32,
    topic_evasions: HashMap<String, u32>,
    total_evasive: u32,
}

impl EvasionDetector {
    /// Creates a detector with default thresholds.
    pub fn new() -> Self {
        Self::with_config(DetectorConfig::default())
    }

    /// Creates a detector with the given configuration.
    pub fn with_config(config: DetectorConfig) -> Self {
        Self {
            config,
            evasion_counter: 0,
            topic_evasions: HashMap::new(),
            total_evasive: 0,
        }
    }

    /// Classifies a response as evasive. This rule is a fixed contract.
    pub fn is_evasive(&self, response: &PlayerResponse) -> bool {
        response.tone == ResponseTone::Evasive
            || (response.tone == ResponseTone::Defensive
                && response.word_count > LONG_DEFENSIVE_WORDS)
            || response.word_count < SHORT_RESPONSE_WORDS
    }

    /// Updates the counters for a response.
    ///
    /// The global counter decays on non-evasive responses; per-topic
    /// counters only ever grow.
    pub fn update_tracking(&mut self, response: &PlayerResponse) {
        if self.is_evasive(response) {
            self.evasion_counter += 1;
            self.total_evasive += 1;
            if let Some(topic) = &response.topic {
                *self.topic_evasions.entry(topic.clone()).or_insert(0) += 1;
            }
        } else {
            self.evasion_counter = self.evasion_counter.saturating_sub(1);
        }
    }

    /// Escalation tier for the current counter: floor(counter / 2),
    /// clamped to the defined tiers.
    pub fn escalation_level(&self) -> u32 {
        (self.evasion_counter / 2).min(ESCALATION_MESSAGES.len() as u32)
    }

    /// Runs the pattern checks in fixed priority order and returns the
    /// first match: consecutive evasion, topic avoidance, filibuster,
    /// deflection. At most one interruption per turn.
    pub fn check_patterns(
        &self,
        response: &PlayerResponse,
        state: &ConversationState,
    ) -> Option<PatternInterruption> {
        if let Some(interruption) = self.check_consecutive_evasion(response) {
            return Some(interruption);
        }
        if let Some(interruption) = self.check_topic_avoidance(response) {
            return Some(interruption);
        }
        if let Some(interruption) = self.check_filibuster(response, state) {
            return Some(interruption);
        }
        self.check_deflection(response, state)
    }

    fn check_consecutive_evasion(&self, response: &PlayerResponse) -> Option<PatternInterruption> {
        if !self.is_evasive(response)
            || self.evasion_counter < self.config.consecutive_evasion_threshold
        {
            return None;
        }
        let level = self.escalation_level();
        let message = ESCALATION_MESSAGES[(level as usize).saturating_sub(1).min(2)];
        Some(PatternInterruption {
            kind: InterruptionKind::ConsecutiveEvasion,
            message: message.to_string(),
            escalation_level: level,
            topic: None,
        })
    }

    fn check_topic_avoidance(&self, response: &PlayerResponse) -> Option<PatternInterruption> {
        let topic = response.topic.as_deref()?;
        if self.topic_count(topic) < self.config.topic_avoidance_threshold {
            return None;
        }
        Some(PatternInterruption {
            kind: InterruptionKind::TopicAvoidance,
            message: format!(
                "Every time {} comes up, you change the subject. Why is that?",
                topic
            ),
            escalation_level: 0,
            topic: Some(topic.to_string()),
        })
    }

    fn check_filibuster(
        &self,
        response: &PlayerResponse,
        state: &ConversationState,
    ) -> Option<PatternInterruption> {
        let average = state.average_word_count();
        let is_filibuster = response.word_count > FILIBUSTER_MIN_WORDS
            && response.word_count as f32 > FILIBUSTER_AVG_MULTIPLIER * average
            && matches!(
                response.tone,
                ResponseTone::Evasive | ResponseTone::Defensive
            );
        if !is_filibuster {
            return None;
        }
        Some(PatternInterruption {
            kind: InterruptionKind::Filibuster,
            message: "Let me stop you there. We are short on time, and that was not an answer."
                .to_string(),
            escalation_level: 0,
            topic: None,
        })
    }

    fn check_deflection(
        &self,
        response: &PlayerResponse,
        state: &ConversationState,
    ) -> Option<PatternInterruption> {
        if !self.contains_deflection_phrase(&response.text) {
            return None;
        }
        // Count the consecutive defensive/deflecting run over the last 3
        // responses, most recent first; the first clean response breaks it.
        let mut run = 0;
        for recent in state.recent_responses(3) {
            let matches = recent.tone == ResponseTone::Defensive
                || self.contains_deflection_phrase(&recent.text);
            if !matches {
                break;
            }
            run += 1;
        }
        if run < 2 {
            return None;
        }
        Some(PatternInterruption {
            kind: InterruptionKind::Deflection,
            message: "You keep pointing elsewhere. I asked about you, not anyone else."
                .to_string(),
            escalation_level: 0,
            topic: None,
        })
    }

    fn contains_deflection_phrase(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.config
            .deflection_phrases
            .iter()
            .any(|phrase| lowered.contains(phrase.as_str()))
    }

    /// Per-topic evasion count.
    pub fn topic_count(&self, topic: &str) -> u32 {
        self.topic_evasions.get(topic).copied().unwrap_or(0)
    }

    /// Current global counter.
    pub fn evasion_counter(&self) -> u32 {
        self.evasion_counter
    }

    /// Counter snapshot.
    pub fn stats(&self) -> EvasionStats {
        EvasionStats {
            consecutive_evasions: self.evasion_counter,
            topic_evasions: self.topic_evasions.clone(),
            total_evasive_responses: self.total_evasive,
        }
    }

    /// Clears all counters. The only way they go backwards beyond decay.
    pub fn reset(&mut self) {
        self.evasion_counter = 0;
        self.topic_evasions.clear();
        self.total_evasive = 0;
    }
}

impl Default for EvasionDetector {
    fn default() -> Self {
        Self::new()
    }
}
