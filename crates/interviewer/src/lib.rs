//! Adaptive interview conversation controller.
//!
//! One [`ConversationController`] owns all mutable state for one interview:
//! the conversation record, the interviewer's memory and frustration, the
//! evasion detector's counters, and the rapid-fire engine. Each player
//! response produces exactly one [`ConversationAction`] through a strict
//! decision cascade, evaluated top to bottom with the first match winning:
//!
//! 1. An active rapid-fire session owns the turn.
//! 2. Interruption checks: question-specific triggers, detector patterns,
//!    mood-driven boil-over.
//! 3. Idle rapid-fire triggers; a fired trigger takes the current response
//!    straight into the new session.
//! 4. Memory-based follow-ups (contextual, accountability, topic reference).
//! 5. The current question's configured follow-up rules.
//! 6. Contradiction challenge against the earliest conflicting statement.
//! 7. Conclusion conditions.
//! 8. Advance: queued follow-ups, then the first unanswered arc question,
//!    then conclusion.
//!
//! All randomness flows through one seeded `SmallRng`, so a run is fully
//! replayable from its seed and response script.

pub mod analytics;
pub mod conditions;
pub mod config;
pub mod detector;
pub mod followup;
pub mod memory;
pub mod mood;
pub mod rapidfire;

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use interview_events::{
    generate_interruption_id, ActionMetadata, ConversationAction, ConversationState,
    InterruptionKind, InterruptionRecord, Mood, PerformanceSnapshot, PlayerResponse, QuestionSpec,
};

pub use analytics::{ConversationAnalytics, RapidFireStatus};
pub use conditions::{Condition, ConditionParseError};
pub use config::{ConfigError, ControllerConfig, FollowUpGates, FrustrationPolicy};
pub use detector::{DetectorConfig, EvasionDetector, EvasionStats};
pub use memory::{InterviewerMemory, MemoryEntry, MemoryKind, MemoryStats};
pub use mood::derive_mood;
pub use rapidfire::{RapidFireConfig, RapidFireEngine, RapidFireError, RapidFireSession};

const CLOSING_COMPLETE: &str =
    "That covers everything I wanted to ask tonight. Thank you for your time.";
const CLOSING_GAVE_UP: &str =
    "I think we are done here. Viewers can judge for themselves what was and was not answered.";
const CLOSING_EARNED: &str =
    "You have been remarkably direct tonight, so I will let you go early. Thank you.";

const CONTRADICTION_FALLBACK: &str =
    "That directly contradicts what you told me earlier. Which version is true?";

/// Direct responses in this word range are recorded as strong moments.
const STRONG_MOMENT_WORDS: std::ops::RangeInclusive<u32> = 15..=60;
/// Emphatic responses in this word range are recorded as quotable lines.
const QUOTABLE_WORDS: std::ops::RangeInclusive<u32> = 8..=25;

fn trigger_label(kind: InterruptionKind) -> &'static str {
    match kind {
        InterruptionKind::ConsecutiveEvasion => "consecutive_evasion",
        InterruptionKind::TopicAvoidance => "topic_avoidance",
        InterruptionKind::Filibuster => "filibuster",
        InterruptionKind::Deflection => "deflection",
        InterruptionKind::QuestionTrigger => "question_trigger",
        InterruptionKind::MoodDriven => "mood_driven",
    }
}

/// The per-interview conversation flow controller.
pub struct ConversationController {
    config: ControllerConfig,
    arc: Vec<QuestionSpec>,
    state: ConversationState,
    memory: InterviewerMemory,
    detector: EvasionDetector,
    rapid_fire: RapidFireEngine,
    interruption_history: Vec<InterruptionRecord>,
    /// Question ids or symbolic action names queued by interruption triggers
    queued_follow_ups: VecDeque<String>,
    next_interruption_seq: u64,
    current_turn: u64,
    rng: SmallRng,
}

impl ConversationController {
    /// Creates a controller for the given question arc, fully seeded.
    pub fn new(arc: Vec<QuestionSpec>, config: ControllerConfig, seed: u64) -> Self {
        Self {
            memory: InterviewerMemory::with_config(config.memory.clone()),
            detector: EvasionDetector::with_config(config.detector.clone()),
            rapid_fire: RapidFireEngine::with_config(config.rapid_fire.clone()),
            state: ConversationState::new(),
            interruption_history: Vec::new(),
            queued_follow_ups: VecDeque::new(),
            next_interruption_seq: 1,
            current_turn: 0,
            rng: SmallRng::seed_from_u64(seed),
            arc,
            config,
        }
    }

    /// Creates a controller with default configuration and a fixed seed.
    pub fn with_defaults(arc: Vec<QuestionSpec>) -> Self {
        Self::new(arc, ControllerConfig::default(), 42)
    }

    /// Processes one player response and returns the interviewer's action.
    ///
    /// State mutation and action emission happen atomically within this
    /// call; there is no partial-turn state.
    pub fn process_response(&mut self, response: PlayerResponse) -> ConversationAction {
        self.current_turn += 1;
        self.observe(&response);

        let mood = self.memory.mood();
        tracing::debug!(
            turn = self.current_turn,
            mood = %mood,
            frustration = self.memory.frustration_level(),
            "processing response"
        );

        // 1. An active rapid-fire session owns the turn; an early exit
        // rejoins the cascade with this same response.
        if self.rapid_fire.is_active() {
            if self.rapid_fire.should_exit_early(&response, mood) {
                self.rapid_fire.end_session(self.current_turn);
                tracing::debug!("rapid-fire early exit; rejoining cascade");
            } else if let Ok(question) = self.rapid_fire.next_question() {
                return ConversationAction::FollowUp {
                    text: question.text,
                    metadata: ActionMetadata::new("rapid_fire", self.current_turn)
                        .with_mood(mood)
                        .with_escalation_level(question.escalation_level)
                        .with_time_limit(question.time_limit_secs)
                        .with_expected_response(question.expected_response),
                };
            }
        }

        let current_question = self
            .arc
            .iter()
            .find(|q| q.id == response.question_id)
            .cloned();

        // 2. Interruptions: question triggers, detector patterns, mood.
        if let Some(action) = self.check_interruptions(&response, current_question.as_ref(), mood) {
            return action;
        }

        // 3. Idle rapid-fire triggers. A fired trigger delegates the current
        // response straight into the new session.
        let trigger = self.rapid_fire.evaluate_triggers(
            &response,
            &self.detector.stats(),
            self.memory.frustration_level(),
            self.current_turn,
        );
        if let Some(trigger) = trigger {
            self.rapid_fire
                .start_session(&trigger, &response, self.current_turn, &mut self.rng);
            if let Ok(question) = self.rapid_fire.next_question() {
                return ConversationAction::FollowUp {
                    text: question.text,
                    metadata: ActionMetadata::new("rapid_fire", self.current_turn)
                        .with_mood(mood)
                        .with_escalation_level(question.escalation_level)
                        .with_time_limit(question.time_limit_secs)
                        .with_expected_response(question.expected_response),
                };
            }
        }

        // 4. Memory-based follow-ups, first non-null wins.
        if let Some(action) = self.memory_follow_up(&response, mood) {
            return action;
        }

        // 5. The current question's configured follow-up rules.
        if let Some(spec) = &current_question {
            if let Some(action) = self.apply_follow_up_rules(spec, &response, mood) {
                return action;
            }
        }

        // 6. Contradiction challenge.
        if response.contradicts_previous {
            if let Some(action) = self.contradiction_challenge(&response, mood) {
                return action;
            }
        }

        // 7. Conclusion conditions, evaluated fresh every turn.
        if let Some(action) = self.check_conclusion(mood) {
            return action;
        }

        // 8. Advance.
        self.advance(&response, mood)
    }

    /// Per-turn bookkeeping, applied before the cascade runs.
    fn observe(&mut self, response: &PlayerResponse) {
        self.state.record_answer(&response.question_id);
        self.detector.update_tracking(response);
        self.memory.observe_tone(response.tone);

        let mut delta = self.config.frustration.delta_for(response.tone);
        if response.word_count < detector::SHORT_RESPONSE_WORDS {
            delta += self.config.frustration.short_response;
        }
        if response.contradicts_previous {
            delta += self.config.frustration.contradiction;
        }
        self.memory.adjust_frustration(delta);

        self.record_remarkable(response);
        self.state.push_response(response.clone());
    }

    fn entry_for(&self, kind: MemoryKind, response: &PlayerResponse) -> MemoryEntry {
        let mut entry = MemoryEntry::new(kind, response.question_id.clone(), self.current_turn)
            .with_excerpt(&response.text);
        if let Some(topic) = &response.topic {
            entry = entry.with_topic(topic.clone());
        }
        entry
    }

    fn record_remarkable(&mut self, response: &PlayerResponse) {
        if response.contradicts_previous {
            let entry = self.entry_for(MemoryKind::Contradiction, response);
            self.memory.record_statement(entry);
        }
        if self.detector.is_evasive(response) {
            let entry = self.entry_for(MemoryKind::Evasion, response);
            self.memory.record_statement(entry);
        }
        if response.tone == interview_events::ResponseTone::Nervous {
            let entry = self.entry_for(MemoryKind::WeakMoment, response);
            self.memory.record_statement(entry);
        }
        if response.tone.is_direct()
            && STRONG_MOMENT_WORDS.contains(&response.word_count)
            && !response.contradicts_previous
        {
            let entry = self.entry_for(MemoryKind::StrongMoment, response);
            self.memory.record_statement(entry);
        }
        if matches!(
            response.tone,
            interview_events::ResponseTone::Passionate | interview_events::ResponseTone::Aggressive
        ) && QUOTABLE_WORDS.contains(&response.word_count)
        {
            let entry = self.entry_for(MemoryKind::QuotableLine, response);
            self.memory.record_statement(entry);
        }
    }

    fn check_interruptions(
        &mut self,
        response: &PlayerResponse,
        question: Option<&QuestionSpec>,
        mood: Mood,
    ) -> Option<ConversationAction> {
        if let Some(spec) = question {
            for trigger in &spec.interruption_triggers {
                let Ok(condition) = trigger.condition.parse::<Condition>() else {
                    tracing::warn!(
                        condition = trigger.condition.as_str(),
                        "unparseable interruption condition; skipping"
                    );
                    continue;
                };
                if !condition.evaluate(response, &self.state, mood) {
                    continue;
                }
                if self.rng.gen::<f32>() >= trigger.probability {
                    tracing::debug!(
                        condition = trigger.condition.as_str(),
                        "interruption trigger lost its probability roll"
                    );
                    continue;
                }
                if let Some(action_name) = &trigger.follow_up_action {
                    self.queued_follow_ups.push_back(action_name.clone());
                }
                let message = trigger.message.clone();
                return Some(self.emit_interruption(
                    InterruptionKind::QuestionTrigger,
                    message,
                    response,
                    mood,
                    None,
                ));
            }
        }

        if let Some(pattern) = self.detector.check_patterns(response, &self.state) {
            let escalation = (pattern.escalation_level > 0).then_some(pattern.escalation_level);
            return Some(self.emit_interruption(
                pattern.kind,
                pattern.message,
                response,
                mood,
                escalation,
            ));
        }

        if self.memory.frustration_level() >= self.config.gates.mood_interruption_frustration
            && self.rng.gen::<f32>() < self.config.gates.mood_interruption_probability
        {
            if let Some(line) = self.memory.generate_pressure_interruption(&mut self.rng) {
                return Some(self.emit_interruption(
                    InterruptionKind::MoodDriven,
                    line,
                    response,
                    mood,
                    None,
                ));
            }
        }

        None
    }

    fn emit_interruption(
        &mut self,
        kind: InterruptionKind,
        message: String,
        response: &PlayerResponse,
        mood: Mood,
        escalation: Option<u32>,
    ) -> ConversationAction {
        let record = InterruptionRecord {
            record_id: generate_interruption_id(self.next_interruption_seq),
            question_id: response.question_id.clone(),
            turn: self.current_turn,
            kind,
            message: message.clone(),
        };
        self.next_interruption_seq += 1;
        self.interruption_history.push(record);
        tracing::info!(kind = ?kind, turn = self.current_turn, "interruption emitted");

        let mut metadata = ActionMetadata::new(trigger_label(kind), self.current_turn)
            .with_mood(mood)
            .with_evasion_count(self.detector.evasion_counter())
            .with_question_id(response.question_id.clone());
        if let Some(level) = escalation {
            metadata = metadata.with_escalation_level(level);
        }
        if let Some(topic) = &response.topic {
            metadata = metadata.with_topic(topic.clone());
        }
        ConversationAction::Interruption {
            text: message,
            metadata,
        }
    }

    fn memory_follow_up(
        &mut self,
        response: &PlayerResponse,
        mood: Mood,
    ) -> Option<ConversationAction> {
        if let Some(text) = self
            .memory
            .generate_contextual_follow_up(response, &mut self.rng)
        {
            return Some(self.follow_up_action(text, "memory_contextual", response, mood));
        }
        if self.rng.gen::<f32>() < self.config.gates.accountability_probability {
            if let Some(text) = self.memory.generate_accountability_challenge(&mut self.rng) {
                return Some(self.follow_up_action(text, "memory_accountability", response, mood));
            }
        }
        if let Some(topic) = response.topic.clone() {
            if self.rng.gen::<f32>() < self.config.gates.reference_probability {
                if let Some(text) = self.memory.generate_reference(&topic, &mut self.rng) {
                    return Some(self.follow_up_action(text, "memory_reference", response, mood));
                }
            }
        }
        None
    }

    fn follow_up_action(
        &self,
        text: String,
        trigger: &str,
        response: &PlayerResponse,
        mood: Mood,
    ) -> ConversationAction {
        let mut metadata = ActionMetadata::new(trigger, self.current_turn)
            .with_mood(mood)
            .with_evasion_count(self.detector.evasion_counter());
        if let Some(topic) = &response.topic {
            metadata = metadata.with_topic(topic.clone());
        }
        ConversationAction::FollowUp { text, metadata }
    }

    fn apply_follow_up_rules(
        &mut self,
        spec: &QuestionSpec,
        response: &PlayerResponse,
        mood: Mood,
    ) -> Option<ConversationAction> {
        for rule in &spec.follow_ups {
            let Ok(condition) = rule.condition.parse::<Condition>() else {
                tracing::warn!(
                    condition = rule.condition.as_str(),
                    "unparseable follow-up condition; skipping"
                );
                continue;
            };
            if !condition.evaluate(response, &self.state, mood) {
                continue;
            }
            if self.rng.gen::<f32>() >= rule.probability.unwrap_or(1.0) {
                continue;
            }
            if let Some(action) = self.resolve_target(&rule.target, response, mood) {
                return Some(action);
            }
            tracing::debug!(
                target = rule.target.as_str(),
                "follow-up target unresolved; continuing cascade"
            );
        }
        None
    }

    /// Resolves a follow-up target: an arc question id becomes a planned
    /// question, a known symbolic name becomes a dynamic follow-up, and
    /// anything else is a configuration gap treated as a miss.
    fn resolve_target(
        &mut self,
        target: &str,
        response: &PlayerResponse,
        mood: Mood,
    ) -> Option<ConversationAction> {
        if let Some(spec) = self.arc.iter().find(|q| q.id == target).cloned() {
            return Some(self.question_action(spec, "follow_up_rule", mood));
        }
        let text = followup::generate_dynamic_follow_up(target, response, &mut self.rng)?;
        Some(self.follow_up_action(text, "dynamic_follow_up", response, mood))
    }

    fn question_action(&self, spec: QuestionSpec, trigger: &str, mood: Mood) -> ConversationAction {
        let mut metadata = ActionMetadata::new(trigger, self.current_turn)
            .with_mood(mood)
            .with_question_id(spec.id.clone());
        if let Some(topic) = &spec.topic {
            metadata = metadata.with_topic(topic.clone());
        }
        if let Some(urgency) = &spec.urgency {
            metadata = metadata.with_time_limit(urgency.time_limit_secs);
        }
        ConversationAction::Question {
            question_id: spec.id.clone(),
            text: spec.display_text(),
            metadata,
        }
    }

    fn contradiction_challenge(
        &mut self,
        response: &PlayerResponse,
        mood: Mood,
    ) -> Option<ConversationAction> {
        let topic = response.topic.clone()?;
        let earliest_id = self
            .state
            .earliest_prior_on_topic(&topic)?
            .question_id
            .clone();

        let mut text = self.memory.generate_reference(&topic, &mut self.rng);
        if text.is_none() {
            text = self
                .memory
                .generate_contextual_follow_up(response, &mut self.rng);
        }
        if text.is_none() {
            text = self.memory.generate_accountability_challenge(&mut self.rng);
        }
        let text = text.unwrap_or_else(|| CONTRADICTION_FALLBACK.to_string());

        tracing::info!(
            topic = topic.as_str(),
            earlier = earliest_id.as_str(),
            "contradiction challenge"
        );

        let metadata = ActionMetadata::new("contradiction", self.current_turn)
            .with_mood(mood)
            .with_question_id(earliest_id)
            .with_topic(topic);
        Some(ConversationAction::ContradictionChallenge { text, metadata })
    }

    fn check_conclusion(&mut self, mood: Mood) -> Option<ConversationAction> {
        let total = self.arc.len();
        let answered = self
            .arc
            .iter()
            .filter(|q| self.state.has_answered(&q.id))
            .count();

        if total > 0 && answered == total {
            return Some(self.conclusion("arc_complete", CLOSING_COMPLETE, mood));
        }
        if self.memory.frustration_level() > self.config.conclusion.giving_up_frustration
            && self.interruption_history.len() > self.config.conclusion.giving_up_interruptions
        {
            return Some(self.conclusion("interviewer_gave_up", CLOSING_GAVE_UP, mood));
        }
        let ratio = if total == 0 {
            1.0
        } else {
            answered as f32 / total as f32
        };
        if ratio >= self.config.conclusion.early_wrap_answered_ratio
            && self.state.performance.overall_score > self.config.conclusion.early_wrap_score
            && self.state.performance.consistency > self.config.conclusion.early_wrap_consistency
        {
            return Some(self.conclusion("earned_wrap_up", CLOSING_EARNED, mood));
        }
        None
    }

    fn conclusion(&self, reason: &str, text: &str, mood: Mood) -> ConversationAction {
        tracing::info!(reason, turn = self.current_turn, "interview concluded");
        ConversationAction::Conclusion {
            text: text.to_string(),
            metadata: ActionMetadata::new(reason, self.current_turn).with_mood(mood),
        }
    }

    fn advance(&mut self, response: &PlayerResponse, mood: Mood) -> ConversationAction {
        while let Some(target) = self.queued_follow_ups.pop_front() {
            if let Some(spec) = self.arc.iter().find(|q| q.id == target).cloned() {
                return self.question_action(spec, "queued_follow_up", mood);
            }
            if let Some(text) = followup::generate_dynamic_follow_up(&target, response, &mut self.rng)
            {
                return self.follow_up_action(text, "queued_follow_up", response, mood);
            }
            tracing::debug!(target = target.as_str(), "queued follow-up unresolved; dropping");
        }

        if let Some(spec) = self
            .arc
            .iter()
            .find(|q| !self.state.has_answered(&q.id))
            .cloned()
        {
            return self.question_action(spec, "advance", mood);
        }
        self.conclusion("arc_complete", CLOSING_COMPLETE, mood)
    }

    /// The conversation record.
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Current derived interviewer mood.
    pub fn mood(&self) -> Mood {
        self.memory.mood()
    }

    /// Logical turns processed so far.
    pub fn current_turn(&self) -> u64 {
        self.current_turn
    }

    /// Replaces the performance snapshot (called by the external analyzer
    /// between turns).
    pub fn set_performance(&mut self, performance: PerformanceSnapshot) {
        self.state.set_performance(performance);
    }

    /// Every interruption emitted so far, in order.
    pub fn interruption_history(&self) -> &[InterruptionRecord] {
        &self.interruption_history
    }

    /// Current evasion counters.
    pub fn evasion_stats(&self) -> EvasionStats {
        self.detector.stats()
    }

    /// Rapid-fire engine status.
    pub fn rapid_fire_status(&self) -> RapidFireStatus {
        RapidFireStatus {
            active: self.rapid_fire.is_active(),
            session: self.rapid_fire.session().cloned(),
            cooldown_remaining_turns: self.rapid_fire.cooldown_remaining(self.current_turn),
        }
    }

    /// Aggregated analytics snapshot.
    pub fn conversation_analytics(&self) -> ConversationAnalytics {
        let total = self.arc.len();
        let answered = self
            .arc
            .iter()
            .filter(|q| self.state.has_answered(&q.id))
            .count();
        ConversationAnalytics {
            turns: self.current_turn,
            mood: self.memory.mood(),
            frustration_level: self.memory.frustration_level(),
            memory: self.memory.memory_stats(),
            evasion: self.detector.stats(),
            interruption_count: self.interruption_history.len(),
            rapid_fire_sessions: self.rapid_fire.sessions_started(),
            questions_answered: answered,
            questions_total: total,
        }
    }
}
