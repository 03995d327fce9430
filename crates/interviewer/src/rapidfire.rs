//! Rapid-Fire Escalation Engine
//!
//! A two-state machine (idle/active) that, once triggered, takes over turn
//! decisions for a bounded burst of rapidly escalating, time-constrained
//! questions. At most one session is active per interview; a new trigger
//! cannot fire while a session runs or during its cooldown window.
//!
//! The cooldown is measured on the logical turn clock. Per-question time
//! limits are advisory metadata for the presentation layer.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use interview_events::{Mood, PlayerResponse};

use crate::detector::EvasionStats;

/// Words in this range count as a direct answer that can end a session early.
pub const DIRECT_ANSWER_WORDS: std::ops::RangeInclusive<u32> = 15..=40;

/// Urgency prefixes for questions beyond position 2, indexed by how deep
/// into the burst we are and clamped to the pool.
const URGENCY_PREFIXES: [&str; 4] = [
    "Quickly now:",
    "No time to deliberate:",
    "Just answer:",
    "Yes or no, right now:",
];

/// Intensity tier of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    #[default]
    Medium,
    High,
    Extreme,
}

/// Boolean condition a trigger watches for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RapidFireCondition {
    /// Global evasion counter at or above `min`
    GlobalEvasion { min: u32 },
    /// Per-topic evasion count at or above `min` for the response's topic
    TopicEvasion { min: u32 },
    /// The current response was flagged as a contradiction
    ContradictionDetected,
    /// Frustration level at or above `min`
    FrustrationAbove { min: f32 },
}

/// One configured trigger, evaluated in configuration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RapidFireTriggerConfig {
    /// Trigger name, carried into session metadata
    pub name: String,
    /// Human-readable description of what set the burst off
    pub description: String,
    /// Condition watched while idle
    pub condition: RapidFireCondition,
    /// Questions in the generated burst
    pub question_count: u32,
    /// Intensity tier
    pub intensity: Intensity,
    /// Geometric escalation rate per position, > 1
    pub escalation_rate: f32,
    /// Advisory per-question time limit
    pub time_limit_secs: u32,
}

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RapidFireConfig {
    /// Turns after a session ends before another trigger may fire
    pub cooldown_turns: u64,
    /// Safety valve: sessions never run past this many questions
    pub max_session_questions: u32,
    /// Triggers in evaluation order
    pub triggers: Vec<RapidFireTriggerConfig>,
}

impl Default for RapidFireConfig {
    fn default() -> Self {
        Self {
            cooldown_turns: 5,
            max_session_questions: 6,
            triggers: vec![
                RapidFireTriggerConfig {
                    name: "caught_in_contradiction".to_string(),
                    description: "The candidate contradicted an earlier statement".to_string(),
                    condition: RapidFireCondition::ContradictionDetected,
                    question_count: 3,
                    intensity: Intensity::High,
                    escalation_rate: 1.4,
                    time_limit_secs: 15,
                },
                RapidFireTriggerConfig {
                    name: "stonewalling".to_string(),
                    description: "Three evasive answers in a row".to_string(),
                    condition: RapidFireCondition::GlobalEvasion { min: 3 },
                    question_count: 4,
                    intensity: Intensity::Medium,
                    escalation_rate: 1.3,
                    time_limit_secs: 20,
                },
                RapidFireTriggerConfig {
                    name: "topic_dodging".to_string(),
                    description: "Repeated evasion on a single topic".to_string(),
                    condition: RapidFireCondition::TopicEvasion { min: 2 },
                    question_count: 3,
                    intensity: Intensity::Medium,
                    escalation_rate: 1.3,
                    time_limit_secs: 20,
                },
                RapidFireTriggerConfig {
                    name: "boiling_point".to_string(),
                    description: "The interviewer has run out of patience".to_string(),
                    condition: RapidFireCondition::FrustrationAbove { min: 70.0 },
                    question_count: 5,
                    intensity: Intensity::Extreme,
                    escalation_rate: 1.5,
                    time_limit_secs: 10,
                },
            ],
        }
    }
}

/// One generated question within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RapidFireQuestion {
    /// Question text, urgency-prefixed past position 2
    pub text: String,
    /// round(rate^position); exposed for UI pacing, never branched on
    pub escalation_level: u32,
    /// Advisory time limit
    pub time_limit_secs: u32,
    /// Expected response type hint for this position
    pub expected_response: String,
}

/// An active burst. Ephemeral; destroyed on exhaustion or early exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RapidFireSession {
    /// Name of the trigger that started the burst
    pub trigger_name: String,
    /// The trigger's description
    pub description: String,
    /// Target topic, when the triggering response carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Intensity tier
    pub intensity: Intensity,
    /// Total questions in the burst
    pub total: u32,
    /// Questions not yet asked
    pub remaining: u32,
    /// The full generated sequence
    pub questions: Vec<RapidFireQuestion>,
    /// Turn the session started on
    pub started_at_turn: u64,
}

impl RapidFireSession {
    /// Position of the next question to ask (0-based).
    pub fn position(&self) -> u32 {
        self.total - self.remaining
    }

    /// Questions already asked.
    pub fn asked(&self) -> u32 {
        self.position()
    }
}

/// Errors from engine misuse.
#[derive(Debug, Error, PartialEq)]
pub enum RapidFireError {
    /// The per-turn handler was invoked with no active session. This is a
    /// caller bug, not recoverable input.
    #[error("no active rapid-fire session; the turn handler requires one")]
    NoActiveSession,
}

fn question_templates(condition: &RapidFireCondition) -> &'static [&'static str] {
    match condition {
        RapidFireCondition::ContradictionDetected => &[
            "Which of your two positions on {topic} is the real one?",
            "You said one thing then, another now. When were you telling the truth about {topic}?",
            "Was the earlier statement on {topic} false, or is this one?",
            "Do you understand why voters hear that as a reversal on {topic}?",
            "If both statements are true, explain how. Briefly.",
        ],
        RapidFireCondition::GlobalEvasion { .. } => &[
            "One more time: what is your answer on {topic}?",
            "Yes or no on {topic}?",
            "Give me a number, a date, or a name on {topic}.",
            "What exactly would you do about {topic} in your first hundred days?",
            "Is there any question tonight you intend to answer directly?",
        ],
        RapidFireCondition::TopicEvasion { .. } => &[
            "Why do you keep avoiding {topic}?",
            "What about {topic} makes you uncomfortable?",
            "Is there something on {topic} you would rather voters not know?",
            "I will keep asking about {topic} until I get an answer. What is it?",
        ],
        RapidFireCondition::FrustrationAbove { .. } => &[
            "A straight answer on {topic}. Now.",
            "Do you take this audience seriously, yes or no?",
            "Answer the question that was asked, not the one you wanted.",
            "One sentence. What is your position on {topic}?",
            "Last chance to be direct about {topic}. Take it.",
        ],
    }
}

fn expected_response_for(position: u32) -> &'static str {
    match position {
        0 | 1 => "direct_answer",
        2 | 3 => "specific_commitment",
        _ => "yes_or_no",
    }
}

/// Escalation level for a position: round(rate^position).
pub fn escalation_level(rate: f32, position: u32) -> u32 {
    rate.powi(position as i32).round() as u32
}

/// The rapid-fire escalation engine.
#[derive(Debug, Clone)]
pub struct RapidFireEngine {
    config: RapidFireConfig,
    session: Option<RapidFireSession>,
    /// First turn a new trigger may fire again
    cooldown_until_turn: u64,
    sessions_started: u32,
}

impl RapidFireEngine {
    /// Creates an idle engine with default triggers.
    pub fn new() -> Self {
        Self::with_config(RapidFireConfig::default())
    }

    /// Creates an idle engine with the given configuration.
    pub fn with_config(config: RapidFireConfig) -> Self {
        Self {
            config,
            session: None,
            cooldown_until_turn: 0,
            sessions_started: 0,
        }
    }

    /// True while a session is running.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&RapidFireSession> {
        self.session.as_ref()
    }

    /// Sessions started over the interview.
    pub fn sessions_started(&self) -> u32 {
        self.sessions_started
    }

    /// Turns left before a trigger may fire again; 0 when the window has
    /// elapsed.
    pub fn cooldown_remaining(&self, current_turn: u64) -> u64 {
        self.cooldown_until_turn.saturating_sub(current_turn)
    }

    /// Evaluates the trigger list against the current turn's signals.
    ///
    /// Only fires while idle with an elapsed cooldown; the first matching
    /// trigger in configuration order wins.
    pub fn evaluate_triggers(
        &self,
        response: &PlayerResponse,
        evasion: &EvasionStats,
        frustration: f32,
        current_turn: u64,
    ) -> Option<RapidFireTriggerConfig> {
        if self.is_active() || current_turn < self.cooldown_until_turn {
            return None;
        }
        self.config
            .triggers
            .iter()
            // A zero-question trigger is a configuration gap; it never
            // fires and never shadows a later trigger.
            .filter(|trigger| trigger.question_count > 0)
            .find(|trigger| match &trigger.condition {
                RapidFireCondition::GlobalEvasion { min } => evasion.consecutive_evasions >= *min,
                RapidFireCondition::TopicEvasion { min } => response
                    .topic
                    .as_deref()
                    .map(|topic| evasion.topic_count(topic) >= *min)
                    .unwrap_or(false),
                RapidFireCondition::ContradictionDetected => response.contradicts_previous,
                RapidFireCondition::FrustrationAbove { min } => frustration >= *min,
            })
            .cloned()
    }

    /// Starts a session from a fired trigger, generating the full question
    /// sequence and arming the cooldown.
    pub fn start_session(
        &mut self,
        trigger: &RapidFireTriggerConfig,
        response: &PlayerResponse,
        current_turn: u64,
        rng: &mut SmallRng,
    ) {
        if trigger.question_count == 0 {
            tracing::warn!(
                trigger = trigger.name.as_str(),
                "trigger has no questions configured; not starting a session"
            );
            return;
        }
        let topic = response.topic.clone();
        let topic_text = topic.as_deref().unwrap_or("the question at hand");
        let templates = question_templates(&trigger.condition);

        let questions: Vec<RapidFireQuestion> = (0..trigger.question_count)
            .map(|position| {
                let template = templates
                    .choose(rng)
                    .copied()
                    .unwrap_or("Answer the question about {topic}.");
                let mut text = template.replace("{topic}", topic_text);
                if position >= 2 {
                    let index = ((position - 2) as usize).min(URGENCY_PREFIXES.len() - 1);
                    text = format!("{} {}", URGENCY_PREFIXES[index], text);
                }
                RapidFireQuestion {
                    text,
                    escalation_level: escalation_level(trigger.escalation_rate, position),
                    time_limit_secs: trigger.time_limit_secs,
                    expected_response: expected_response_for(position).to_string(),
                }
            })
            .collect();

        tracing::info!(
            trigger = trigger.name.as_str(),
            questions = questions.len(),
            "rapid-fire session started"
        );

        self.session = Some(RapidFireSession {
            trigger_name: trigger.name.clone(),
            description: trigger.description.clone(),
            topic,
            intensity: trigger.intensity,
            total: trigger.question_count,
            remaining: trigger.question_count,
            questions,
            started_at_turn: current_turn,
        });
        self.sessions_started += 1;
        self.cooldown_until_turn = current_turn + self.config.cooldown_turns;
    }

    /// Consumes one question from the active session.
    ///
    /// The session is destroyed when its budget is exhausted. Calling this
    /// while idle is a programming error and fails loudly.
    pub fn next_question(&mut self) -> Result<RapidFireQuestion, RapidFireError> {
        let session = self.session.as_mut().ok_or(RapidFireError::NoActiveSession)?;
        let position = (session.total - session.remaining) as usize;
        let Some(question) = session.questions.get(position).cloned() else {
            // A session with nothing left to ask is over, not a panic.
            self.session = None;
            return Err(RapidFireError::NoActiveSession);
        };
        session.remaining -= 1;
        if session.remaining == 0 {
            tracing::debug!("rapid-fire session exhausted");
            self.session = None;
        }
        Ok(question)
    }

    /// Early-exit check: a confident direct answer of in-range length, a
    /// favorable interviewer mood, or the safety-valve question cap.
    pub fn should_exit_early(&self, response: &PlayerResponse, mood: Mood) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        if response.tone.is_direct() && DIRECT_ANSWER_WORDS.contains(&response.word_count) {
            return true;
        }
        if mood.is_favorable() {
            return true;
        }
        session.asked() >= self.config.max_session_questions
    }

    /// Ends the active session (early exit) and arms the cooldown.
    pub fn end_session(&mut self, current_turn: u64) {
        if self.session.take().is_some() {
            tracing::debug!("rapid-fire session ended early");
            self.cooldown_until_turn = current_turn + self.config.cooldown_turns;
        }
    }
}

impl Default for RapidFireEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_events::{PlayerResponse, ResponseTone};
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(99)
    }

    fn evasive_stats(global: u32) -> EvasionStats {
        EvasionStats {
            consecutive_evasions: global,
            ..EvasionStats::default()
        }
    }

    fn evasive_response() -> PlayerResponse {
        PlayerResponse::new("q1", "We shall have to see about that.", ResponseTone::Evasive)
            .with_topic("economy")
    }

    fn first_trigger(engine: &RapidFireEngine, response: &PlayerResponse) -> RapidFireTriggerConfig {
        engine
            .evaluate_triggers(response, &evasive_stats(3), 0.0, 10)
            .expect("stonewalling trigger should fire")
    }

    #[test]
    fn test_idle_engine_rejects_next_question() {
        let mut engine = RapidFireEngine::new();
        assert_eq!(engine.next_question(), Err(RapidFireError::NoActiveSession));
    }

    #[test]
    fn test_trigger_order_is_configuration_order() {
        let engine = RapidFireEngine::new();
        // Contradiction is listed before stonewalling; with both true the
        // contradiction trigger wins.
        let response = evasive_response().with_contradiction();
        let trigger = engine
            .evaluate_triggers(&response, &evasive_stats(5), 0.0, 10)
            .unwrap();
        assert_eq!(trigger.name, "caught_in_contradiction");
    }

    #[test]
    fn test_no_trigger_while_active() {
        let mut engine = RapidFireEngine::new();
        let response = evasive_response();
        let trigger = first_trigger(&engine, &response);
        engine.start_session(&trigger, &response, 10, &mut rng());

        assert!(engine.is_active());
        assert!(engine
            .evaluate_triggers(&response, &evasive_stats(5), 99.0, 11)
            .is_none());
    }

    #[test]
    fn test_no_trigger_during_cooldown() {
        let mut engine = RapidFireEngine::new();
        let response = evasive_response();
        let trigger = first_trigger(&engine, &response);
        engine.start_session(&trigger, &response, 10, &mut rng());
        engine.end_session(12);

        assert!(engine
            .evaluate_triggers(&response, &evasive_stats(5), 0.0, 14)
            .is_none());
        // Cooldown of 5 turns from the end of the session.
        assert!(engine
            .evaluate_triggers(&response, &evasive_stats(5), 0.0, 17)
            .is_some());
    }

    #[test]
    fn test_session_question_sequence() {
        let mut engine = RapidFireEngine::new();
        let response = evasive_response();
        let trigger = first_trigger(&engine, &response);
        assert_eq!(trigger.question_count, 4);
        engine.start_session(&trigger, &response, 10, &mut rng());

        let session = engine.session().unwrap();
        assert_eq!(session.total, 4);
        assert_eq!(session.remaining, 4);
        assert_eq!(session.topic.as_deref(), Some("economy"));
        // Topic is substituted into every generated question.
        for question in &session.questions {
            assert!(!question.text.contains("{topic}"));
        }
        // Positions 0 and 1 are unprefixed; later ones carry urgency.
        assert!(!session.questions[0].text.starts_with("Quickly now:"));
        assert!(session.questions[2].text.starts_with("Quickly now:"));
        assert!(session.questions[3].text.starts_with("No time to deliberate:"));
    }

    #[test]
    fn test_escalation_levels_geometric() {
        assert_eq!(escalation_level(1.3, 0), 1);
        assert_eq!(escalation_level(1.3, 2), 2);
        assert_eq!(escalation_level(1.5, 4), 5);

        let mut engine = RapidFireEngine::new();
        let response = evasive_response();
        let trigger = first_trigger(&engine, &response);
        engine.start_session(&trigger, &response, 10, &mut rng());
        let session = engine.session().unwrap();
        for (i, question) in session.questions.iter().enumerate() {
            assert_eq!(
                question.escalation_level,
                escalation_level(trigger.escalation_rate, i as u32)
            );
        }
    }

    #[test]
    fn test_consumption_until_exhaustion() {
        let mut engine = RapidFireEngine::new();
        let response = evasive_response();
        let trigger = first_trigger(&engine, &response);
        engine.start_session(&trigger, &response, 10, &mut rng());

        for _ in 0..4 {
            assert!(engine.is_active());
            engine.next_question().unwrap();
        }
        // Budget exhausted; session destroyed.
        assert!(!engine.is_active());
        assert_eq!(engine.next_question(), Err(RapidFireError::NoActiveSession));
    }

    #[test]
    fn test_early_exit_on_direct_answer() {
        let mut engine = RapidFireEngine::new();
        let response = evasive_response();
        let trigger = first_trigger(&engine, &response);
        engine.start_session(&trigger, &response, 10, &mut rng());

        let direct = PlayerResponse::new(
            "q1",
            vec!["word"; 20].join(" "),
            ResponseTone::Confident,
        );
        assert!(engine.should_exit_early(&direct, Mood::Neutral));

        // Too short for the direct-answer exit.
        let curt = PlayerResponse::new("q1", "Yes.", ResponseTone::Confident);
        assert!(!engine.should_exit_early(&curt, Mood::Neutral));
    }

    #[test]
    fn test_early_exit_on_favorable_mood() {
        let mut engine = RapidFireEngine::new();
        let response = evasive_response();
        let trigger = first_trigger(&engine, &response);
        engine.start_session(&trigger, &response, 10, &mut rng());

        assert!(engine.should_exit_early(&response, Mood::Sympathetic));
        assert!(engine.should_exit_early(&response, Mood::Excited));
        assert!(!engine.should_exit_early(&response, Mood::Hostile));
    }

    #[test]
    fn test_zero_question_trigger_never_fires() {
        let config = RapidFireConfig {
            triggers: vec![
                RapidFireTriggerConfig {
                    name: "empty_burst".to_string(),
                    description: "misconfigured".to_string(),
                    condition: RapidFireCondition::ContradictionDetected,
                    question_count: 0,
                    intensity: Intensity::High,
                    escalation_rate: 1.4,
                    time_limit_secs: 15,
                },
                RapidFireTriggerConfig {
                    name: "stonewalling".to_string(),
                    description: "still valid".to_string(),
                    condition: RapidFireCondition::GlobalEvasion { min: 3 },
                    question_count: 4,
                    intensity: Intensity::Medium,
                    escalation_rate: 1.3,
                    time_limit_secs: 20,
                },
            ],
            ..RapidFireConfig::default()
        };
        let mut engine = RapidFireEngine::with_config(config);
        let response = evasive_response().with_contradiction();

        // The zero-count trigger matches first but is skipped; the later
        // valid trigger still fires.
        let trigger = engine
            .evaluate_triggers(&response, &evasive_stats(3), 0.0, 10)
            .unwrap();
        assert_eq!(trigger.name, "stonewalling");

        // Starting directly from the misconfigured trigger is a no-op.
        let empty = RapidFireTriggerConfig {
            name: "empty_burst".to_string(),
            description: "misconfigured".to_string(),
            condition: RapidFireCondition::ContradictionDetected,
            question_count: 0,
            intensity: Intensity::High,
            escalation_rate: 1.4,
            time_limit_secs: 15,
        };
        engine.start_session(&empty, &response, 10, &mut rng());
        assert!(!engine.is_active());
        assert_eq!(engine.sessions_started(), 0);
        assert_eq!(engine.next_question(), Err(RapidFireError::NoActiveSession));
    }

    #[test]
    fn test_sessions_started_counter() {
        let mut engine = RapidFireEngine::new();
        let response = evasive_response();
        let trigger = first_trigger(&engine, &response);
        engine.start_session(&trigger, &response, 10, &mut rng());
        assert_eq!(engine.sessions_started(), 1);
    }

    #[test]
    fn test_cooldown_remaining() {
        let mut engine = RapidFireEngine::new();
        let response = evasive_response();
        let trigger = first_trigger(&engine, &response);
        engine.start_session(&trigger, &response, 10, &mut rng());

        assert_eq!(engine.cooldown_remaining(11), 4);
        assert_eq!(engine.cooldown_remaining(20), 0);
    }

    #[test]
    fn test_config_serialization() {
        let config = RapidFireConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("stonewalling"));
        assert!(json.contains(r#""kind":"global_evasion""#));

        let parsed: RapidFireConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.triggers.len(), 4);
    }
}
