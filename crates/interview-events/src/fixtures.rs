//! Sample data fixtures for testing.
//!
//! This module provides ready-made test data for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // interview-events = { path = "../interview-events", features = ["test-fixtures"] }
//!
//! use interview_events::fixtures;
//!
//! let arc = fixtures::sample_arc();
//! let response = fixtures::response_with_words("q_economy_1", fixtures::EVASIVE, 30);
//! ```

use crate::{PlayerResponse, QuestionSpec, ResponseTone};

pub use crate::ResponseTone::{
    Aggressive as AGGRESSIVE, Authentic as AUTHENTIC, Confident as CONFIDENT,
    Defensive as DEFENSIVE, Diplomatic as DIPLOMATIC, Evasive as EVASIVE, Nervous as NERVOUS,
    Passionate as PASSIONATE,
};

/// Returns the sample scenario arc from the fixtures file.
///
/// Contains 6 questions across motivation, economy, climate, record, and
/// trust topics, including urgency descriptors, interruption triggers, and
/// follow-up rules of both target kinds.
pub fn sample_arc() -> Vec<QuestionSpec> {
    let json = include_str!("../tests/fixtures/sample_arc.json");
    serde_json::from_str(json).expect("Failed to parse sample_arc.json")
}

/// Returns a specific question by id from the sample arc.
pub fn get_question(question_id: &str) -> Option<QuestionSpec> {
    sample_arc().into_iter().find(|q| q.id == question_id)
}

/// Builds a response with an exact word count.
pub fn response_with_words(question_id: &str, tone: ResponseTone, words: usize) -> PlayerResponse {
    let text = (0..words)
        .map(|i| if i % 7 == 0 { "frankly" } else { "word" })
        .collect::<Vec<_>>()
        .join(" ");
    PlayerResponse::new(question_id, text, tone)
}

/// Builds a topic-tagged response with an exact word count.
pub fn topic_response(
    question_id: &str,
    tone: ResponseTone,
    words: usize,
    topic: &str,
) -> PlayerResponse {
    response_with_words(question_id, tone, words).with_topic(topic)
}

/// A textbook evasive response: evasive tone, vague text.
pub fn evasive_response(question_id: &str) -> PlayerResponse {
    PlayerResponse::new(
        question_id,
        "Well, there are many perspectives on this and we are looking at all the options carefully.",
        ResponseTone::Evasive,
    )
}

/// A textbook confident, direct response of in-range length.
pub fn direct_response(question_id: &str) -> PlayerResponse {
    PlayerResponse::new(
        question_id,
        "Yes. I support the bill, I will vote for it next week, and I will say so in every district in this state.",
        ResponseTone::Confident,
    )
}
