//! Condition Grammar
//!
//! Content-supplied trigger and follow-up conditions use a small fixed
//! grammar: `tone:<label>`, `word_count><int>`, `word_count<<int>`,
//! `topic:<name>`, `contradicts:previous`, `interviewer_mood:<label>`,
//! plus the named predicates `low_confidence` and `high_consistency`
//! resolved against the live conversation state.
//!
//! Parsing is strict at this API; the controller maps parse failures to
//! cascade misses rather than surfacing them.

use std::str::FromStr;

use thiserror::Error;

use interview_events::{ConversationState, Mood, PlayerResponse, ResponseTone};

/// Confidence below this satisfies `low_confidence`.
pub const LOW_CONFIDENCE_THRESHOLD: f32 = 40.0;
/// Consistency above this satisfies `high_consistency`.
pub const HIGH_CONSISTENCY_THRESHOLD: f32 = 75.0;

/// A parsed condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Response tone equals the label
    Tone(ResponseTone),
    /// Word count strictly greater
    WordCountOver(u32),
    /// Word count strictly smaller
    WordCountUnder(u32),
    /// Response topic equals the name
    Topic(String),
    /// Response flagged as contradicting an earlier statement
    ContradictsPrevious,
    /// Interviewer mood equals the label
    InterviewerMood(Mood),
    /// Candidate confidence is low
    LowConfidence,
    /// Candidate consistency is high
    HighConsistency,
}

/// Errors from parsing a condition string.
#[derive(Debug, Error, PartialEq)]
pub enum ConditionParseError {
    #[error("unknown condition '{0}'")]
    UnknownCondition(String),
    #[error("unknown tone label '{0}'")]
    UnknownTone(String),
    #[error("unknown mood label '{0}'")]
    UnknownMood(String),
    #[error("invalid word count in '{0}'")]
    InvalidWordCount(String),
}

fn parse_tone(label: &str) -> Result<ResponseTone, ConditionParseError> {
    let tone = match label {
        "confident" => ResponseTone::Confident,
        "defensive" => ResponseTone::Defensive,
        "evasive" => ResponseTone::Evasive,
        "diplomatic" => ResponseTone::Diplomatic,
        "aggressive" => ResponseTone::Aggressive,
        "authentic" => ResponseTone::Authentic,
        "nervous" => ResponseTone::Nervous,
        "passionate" => ResponseTone::Passionate,
        _ => return Err(ConditionParseError::UnknownTone(label.to_string())),
    };
    Ok(tone)
}

fn parse_mood(label: &str) -> Result<Mood, ConditionParseError> {
    let mood = match label {
        "neutral" => Mood::Neutral,
        "skeptical" => Mood::Skeptical,
        "frustrated" => Mood::Frustrated,
        "hostile" => Mood::Hostile,
        "sympathetic" => Mood::Sympathetic,
        "excited" => Mood::Excited,
        _ => return Err(ConditionParseError::UnknownMood(label.to_string())),
    };
    Ok(mood)
}

impl FromStr for Condition {
    type Err = ConditionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(label) = s.strip_prefix("tone:") {
            return parse_tone(label.trim()).map(Condition::Tone);
        }
        if let Some(count) = s.strip_prefix("word_count>") {
            return count
                .trim()
                .parse::<u32>()
                .map(Condition::WordCountOver)
                .map_err(|_| ConditionParseError::InvalidWordCount(s.to_string()));
        }
        if let Some(count) = s.strip_prefix("word_count<") {
            return count
                .trim()
                .parse::<u32>()
                .map(Condition::WordCountUnder)
                .map_err(|_| ConditionParseError::InvalidWordCount(s.to_string()));
        }
        if let Some(name) = s.strip_prefix("topic:") {
            return Ok(Condition::Topic(name.trim().to_string()));
        }
        if let Some(label) = s.strip_prefix("interviewer_mood:") {
            return parse_mood(label.trim()).map(Condition::InterviewerMood);
        }
        match s {
            "contradicts:previous" => Ok(Condition::ContradictsPrevious),
            "low_confidence" => Ok(Condition::LowConfidence),
            "high_consistency" => Ok(Condition::HighConsistency),
            _ => Err(ConditionParseError::UnknownCondition(s.to_string())),
        }
    }
}

impl Condition {
    /// Evaluates against the current response, live state, and mood.
    pub fn evaluate(
        &self,
        response: &PlayerResponse,
        state: &ConversationState,
        mood: Mood,
    ) -> bool {
        match self {
            Condition::Tone(tone) => response.tone == *tone,
            Condition::WordCountOver(count) => response.word_count > *count,
            Condition::WordCountUnder(count) => response.word_count < *count,
            Condition::Topic(name) => response.is_on_topic(name),
            Condition::ContradictsPrevious => response.contradicts_previous,
            Condition::InterviewerMood(expected) => mood == *expected,
            Condition::LowConfidence => state.performance.confidence < LOW_CONFIDENCE_THRESHOLD,
            Condition::HighConsistency => {
                state.performance.consistency > HIGH_CONSISTENCY_THRESHOLD
            }
        }
    }
}
