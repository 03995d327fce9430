//! Interviewer Memory & Mood
//!
//! Per-interview, mutable record of remarkable statements, topic history,
//! and an escalating frustration scalar. Mood is never stored; it is
//! derived on demand from frustration, the recent tone window, and the
//! contradiction count (see [`crate::mood::derive_mood`]).
//!
//! The three generator operations are probabilistic content lookups: they
//! legitimately return `None` when no applicable memory exists, and the
//! controller treats `None` as "try the next cascade step".

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use interview_events::{Mood, PlayerResponse, ResponseTone};

use crate::mood::derive_mood;

/// What made a statement remarkable enough to remember.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Contradiction,
    Evasion,
    StrongMoment,
    WeakMoment,
    QuotableLine,
}

impl MemoryKind {
    /// Returns all kinds, used for per-kind trimming.
    pub fn all() -> &'static [MemoryKind] {
        &[
            MemoryKind::Contradiction,
            MemoryKind::Evasion,
            MemoryKind::StrongMoment,
            MemoryKind::WeakMoment,
            MemoryKind::QuotableLine,
        ]
    }
}

/// One remembered statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Why it was remembered
    pub kind: MemoryKind,
    /// Question being answered
    pub question_id: String,
    /// Topic tag, if the response carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Short excerpt of what was said
    pub excerpt: String,
    /// Turn the statement was made on
    pub turn: u64,
}

impl MemoryEntry {
    /// Creates an entry with an empty excerpt.
    pub fn new(kind: MemoryKind, question_id: impl Into<String>, turn: u64) -> Self {
        Self {
            kind,
            question_id: question_id.into(),
            topic: None,
            excerpt: String::new(),
            turn,
        }
    }

    /// Sets the topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Sets the excerpt, truncated to 80 characters on a char boundary.
    pub fn with_excerpt(mut self, text: &str) -> Self {
        self.excerpt = text.chars().take(80).collect();
        self
    }
}

/// Aggregated memory counts for analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MemoryStats {
    pub contradictions: u32,
    pub evasions: u32,
    pub strong_moments: u32,
    pub weak_moments: u32,
    pub quotable_lines: u32,
    /// Distinct topics with at least one entry
    pub topics_touched: usize,
}

/// Memory bounds configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Most recent entries kept per kind; older ones are trimmed
    pub max_entries_per_kind: usize,
    /// Size of the recent tone window fed to mood derivation
    pub recent_tone_window: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_entries_per_kind: 20,
            recent_tone_window: 5,
        }
    }
}

const REFERENCE_TEMPLATES: &[&str] = &[
    "Earlier tonight, on {topic}, you told me: \"{excerpt}\". Do you stand by that?",
    "Let me take you back to {topic}. You said \"{excerpt}\". Still your position?",
    "I wrote this down when we discussed {topic}: \"{excerpt}\". Care to revisit it?",
];

const PRESS_TEMPLATES: &[&str] = &[
    "That's not an answer. Give me one concrete specific.",
    "You've given me words, not a position. Which is it?",
    "Try again, and this time commit to something.",
];

const AGGRESSION_TEMPLATES: &[&str] = &[
    "That tone might work at a rally. It doesn't work here.",
    "Getting heated isn't the same as getting specific.",
];

const CERTAINTY_TEMPLATES: &[&str] = &[
    "You sound very sure now, yet earlier you told me something quite different.",
    "Such confidence. Shame it doesn't match what you said before.",
];

const ACCOUNTABILITY_TEMPLATES: &[&str] = &[
    "Let's tally the evening: {contradictions} contradictions and {evasions} dodged questions. Is that your record?",
    "By my count you've contradicted yourself {contradictions} times and ducked {evasions} questions. Why should anyone believe the next answer?",
    "{evasions} evasions, {contradictions} reversals. At what point does this stop being strategy and start being the truth?",
];

const PRESSURE_TEMPLATES: &[&str] = &[
    "No. Stop. I've been patient all evening and I am done being talked past.",
    "Enough. You will answer this one plainly or we move on and viewers draw their own conclusions.",
    "I'm going to interrupt you every single time until I get a straight answer.",
];

/// Interviewer memory: bounded log of remarkable statements, the recent
/// tone window, and the frustration scalar.
#[derive(Debug, Clone)]
pub struct InterviewerMemory {
    entries: Vec<MemoryEntry>,
    recent_tones: VecDeque<ResponseTone>,
    /// Clamped to [0, 100]
    frustration: f32,
    contradiction_count: u32,
    config: MemoryConfig,
}

impl InterviewerMemory {
    /// Creates memory with default bounds.
    pub fn new() -> Self {
        Self::with_config(MemoryConfig::default())
    }

    /// Creates memory with the given bounds.
    pub fn with_config(config: MemoryConfig) -> Self {
        Self {
            entries: Vec::new(),
            recent_tones: VecDeque::new(),
            frustration: 0.0,
            contradiction_count: 0,
            config,
        }
    }

    /// Records a remarkable statement, trimming the log for that kind to
    /// the configured bound (oldest entries drop first).
    pub fn record_statement(&mut self, entry: MemoryEntry) {
        if entry.kind == MemoryKind::Contradiction {
            self.contradiction_count += 1;
        }
        self.entries.push(entry);
        self.trim();
    }

    fn trim(&mut self) {
        for kind in MemoryKind::all() {
            let count = self.entries.iter().filter(|e| e.kind == *kind).count();
            let mut to_drop = count.saturating_sub(self.config.max_entries_per_kind);
            if to_drop > 0 {
                self.entries.retain(|e| {
                    if e.kind == *kind && to_drop > 0 {
                        to_drop -= 1;
                        false
                    } else {
                        true
                    }
                });
            }
        }
    }

    /// Pushes a tone into the recent window.
    pub fn observe_tone(&mut self, tone: ResponseTone) {
        self.recent_tones.push_back(tone);
        while self.recent_tones.len() > self.config.recent_tone_window {
            self.recent_tones.pop_front();
        }
    }

    /// Adjusts frustration by a signed delta, clamped to [0, 100].
    pub fn adjust_frustration(&mut self, delta: f32) {
        self.frustration = (self.frustration + delta).clamp(0.0, 100.0);
    }

    /// Current frustration level in [0, 100].
    pub fn frustration_level(&self) -> f32 {
        self.frustration
    }

    /// Derives the current mood.
    pub fn mood(&self) -> Mood {
        let tones: Vec<ResponseTone> = self.recent_tones.iter().copied().collect();
        derive_mood(self.frustration, &tones, self.contradiction_count)
    }

    /// Aggregated counts.
    pub fn memory_stats(&self) -> MemoryStats {
        let count = |kind: MemoryKind| self.entries.iter().filter(|e| e.kind == kind).count() as u32;
        let mut topics: Vec<&str> = self
            .entries
            .iter()
            .filter_map(|e| e.topic.as_deref())
            .collect();
        topics.sort_unstable();
        topics.dedup();

        MemoryStats {
            contradictions: count(MemoryKind::Contradiction),
            evasions: count(MemoryKind::Evasion),
            strong_moments: count(MemoryKind::StrongMoment),
            weak_moments: count(MemoryKind::WeakMoment),
            quotable_lines: count(MemoryKind::QuotableLine),
            topics_touched: topics.len(),
        }
    }

    /// All entries tagged with a topic.
    pub fn entries_on_topic(&self, topic: &str) -> Vec<&MemoryEntry> {
        self.entries
            .iter()
            .filter(|e| e.topic.as_deref() == Some(topic))
            .collect()
    }

    /// Total contradictions recorded over the interview (not trimmed).
    pub fn contradiction_count(&self) -> u32 {
        self.contradiction_count
    }

    /// Generates a callback to a remembered statement on the topic.
    ///
    /// Returns `None` when nothing memorable was recorded on the topic, or
    /// when the only matches have empty excerpts.
    pub fn generate_reference(&self, topic: &str, rng: &mut SmallRng) -> Option<String> {
        let candidates: Vec<&MemoryEntry> = self
            .entries_on_topic(topic)
            .into_iter()
            .filter(|e| !e.excerpt.is_empty())
            .collect();
        let entry = candidates.choose(rng)?;
        let template = REFERENCE_TEMPLATES.choose(rng)?;
        Some(
            template
                .replace("{topic}", topic)
                .replace("{excerpt}", &entry.excerpt),
        )
    }

    /// Generates a follow-up keyed to the response's tone.
    ///
    /// Pressured tones get a pressing line; aggression gets called out;
    /// direct tones only draw a challenge when a contradiction is already
    /// on record. Everything else yields `None`.
    pub fn generate_contextual_follow_up(
        &self,
        response: &PlayerResponse,
        rng: &mut SmallRng,
    ) -> Option<String> {
        match response.tone {
            ResponseTone::Evasive | ResponseTone::Defensive | ResponseTone::Nervous => {
                PRESS_TEMPLATES.choose(rng).map(|t| t.to_string())
            }
            ResponseTone::Aggressive => AGGRESSION_TEMPLATES.choose(rng).map(|t| t.to_string()),
            ResponseTone::Confident | ResponseTone::Authentic | ResponseTone::Passionate
                if self.contradiction_count > 0 =>
            {
                CERTAINTY_TEMPLATES.choose(rng).map(|t| t.to_string())
            }
            _ => None,
        }
    }

    /// Generates an accountability challenge built from the evening's
    /// tally. Requires at least one contradiction or two evasions on
    /// record; otherwise there is nothing to hold the candidate to.
    pub fn generate_accountability_challenge(&self, rng: &mut SmallRng) -> Option<String> {
        let stats = self.memory_stats();
        if stats.contradictions < 1 && stats.evasions < 2 {
            return None;
        }
        let template = ACCOUNTABILITY_TEMPLATES.choose(rng)?;
        Some(
            template
                .replace("{contradictions}", &stats.contradictions.to_string())
                .replace("{evasions}", &stats.evasions.to_string()),
        )
    }

    /// Generates a frustration-boil-over interruption line. Only available
    /// once the mood has turned adversarial.
    pub fn generate_pressure_interruption(&self, rng: &mut SmallRng) -> Option<String> {
        if !self.mood().is_adversarial() {
            return None;
        }
        PRESSURE_TEMPLATES.choose(rng).map(|t| t.to_string())
    }

    /// Clears all memory state. The only way counters go backwards.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.recent_tones.clear();
        self.frustration = 0.0;
        self.contradiction_count = 0;
    }
}

impl Default for InterviewerMemory {
    fn default() -> Self {
        Self::new()
    }
}
