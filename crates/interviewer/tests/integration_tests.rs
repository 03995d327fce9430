//! End-to-end controller tests over full scripted exchanges.

use interview_events::fixtures;
use interview_events::{
    ConversationAction, FollowUpRule, InterruptionKind, InterruptionTriggerSpec,
    PerformanceSnapshot, PlayerResponse, QuestionSpec, ResponseTone,
};
use interviewer::{ControllerConfig, ConversationController};

fn bare_arc(count: usize) -> Vec<QuestionSpec> {
    (1..=count)
        .map(|i| QuestionSpec::new(format!("q{}", i), format!("Question number {}?", i)))
        .collect()
}

/// Zeroes every probability gate and removes rapid-fire triggers so the
/// cascade path taken is fully predictable.
fn quiet_config() -> ControllerConfig {
    let mut config = ControllerConfig::default();
    config.gates.accountability_probability = 0.0;
    config.gates.reference_probability = 0.0;
    config.gates.mood_interruption_probability = 0.0;
    config.rapid_fire.triggers = Vec::new();
    config
}

/// Default config with the mood gate silenced; rapid-fire stays armed.
fn rapid_fire_config() -> ControllerConfig {
    let mut config = ControllerConfig::default();
    config.gates.accountability_probability = 0.0;
    config.gates.reference_probability = 0.0;
    config.gates.mood_interruption_probability = 0.0;
    config
}

#[test]
fn test_determinism_under_fixed_seed() {
    let script = vec![
        fixtures::evasive_response("q_opening"),
        fixtures::topic_response("q_economy_1", fixtures::EVASIVE, 25, "economy"),
        fixtures::topic_response("q_economy_2", fixtures::DEFENSIVE, 60, "economy"),
        fixtures::topic_response("q_record_1", fixtures::CONFIDENT, 20, "record")
            .with_contradiction(),
        fixtures::direct_response("q_climate_1"),
        fixtures::response_with_words("q_closing", fixtures::AUTHENTIC, 30),
    ];

    let mut first =
        ConversationController::new(fixtures::sample_arc(), ControllerConfig::default(), 7);
    let mut second =
        ConversationController::new(fixtures::sample_arc(), ControllerConfig::default(), 7);

    let first_actions: Vec<ConversationAction> = script
        .iter()
        .map(|r| first.process_response(r.clone()))
        .collect();
    let second_actions: Vec<ConversationAction> = script
        .iter()
        .map(|r| second.process_response(r.clone()))
        .collect();

    assert_eq!(first_actions, second_actions);
}

#[test]
fn test_interruption_beats_follow_up_rule() {
    let mut arc = bare_arc(3);
    arc[0] = arc[0]
        .clone()
        .with_trigger(InterruptionTriggerSpec {
            condition: "tone:evasive".to_string(),
            message: "You are dodging already?".to_string(),
            probability: 1.0,
            follow_up_action: None,
        })
        .with_follow_up(FollowUpRule {
            condition: "tone:evasive".to_string(),
            target: "q3".to_string(),
            probability: None,
        });
    let mut controller = ConversationController::new(arc, quiet_config(), 3);

    // The response satisfies both the trigger and the rule; the
    // interruption must win.
    let action =
        controller.process_response(fixtures::response_with_words("q1", fixtures::EVASIVE, 20));
    assert!(action.is_interruption());
    assert_eq!(action.text(), "You are dodging already?");
    assert_eq!(controller.interruption_history().len(), 1);
}

#[test]
fn test_evasion_counter_dynamics() {
    let mut controller = ConversationController::new(bare_arc(5), quiet_config(), 3);

    // First two evasions press via memory follow-ups; the counter is not
    // yet at the interruption threshold.
    for _ in 0..2 {
        let action =
            controller.process_response(fixtures::response_with_words("q1", fixtures::EVASIVE, 16));
        assert!(!action.is_interruption());
    }

    // Third evasion in a row: counter 3, first escalation tier.
    let action =
        controller.process_response(fixtures::response_with_words("q1", fixtures::EVASIVE, 16));
    assert!(action.is_interruption());
    assert_eq!(action.metadata().escalation_level, Some(1));
    assert_eq!(
        controller.interruption_history().last().unwrap().kind,
        InterruptionKind::ConsecutiveEvasion
    );

    // A direct answer decays the counter instead of escalating further.
    let action =
        controller.process_response(fixtures::response_with_words("q1", fixtures::CONFIDENT, 20));
    assert!(!action.is_interruption());
    assert_eq!(controller.evasion_stats().consecutive_evasions, 2);
}

#[test]
fn test_rapid_fire_exclusivity_and_exhaustion() {
    let mut controller = ConversationController::new(bare_arc(5), rapid_fire_config(), 3);

    // A contradiction starts the burst and delegates the same response
    // into it: the first rapid-fire question comes back immediately.
    let opener = fixtures::topic_response("q1", fixtures::DIPLOMATIC, 20, "economy")
        .with_contradiction();
    let action = controller.process_response(opener);
    assert_eq!(action.metadata().trigger, "rapid_fire");
    let status = controller.rapid_fire_status();
    assert!(status.active);
    let session = status.session.unwrap();
    assert_eq!(session.total, 3);
    assert_eq!(session.remaining, 2);

    // Another contradiction mid-session must not start a second burst.
    let action = controller.process_response(
        fixtures::topic_response("q1", fixtures::EVASIVE, 10, "economy").with_contradiction(),
    );
    assert_eq!(action.metadata().trigger, "rapid_fire");
    assert_eq!(controller.conversation_analytics().rapid_fire_sessions, 1);

    // Third question exhausts the budget; the session is destroyed.
    let action = controller
        .process_response(fixtures::topic_response("q1", fixtures::EVASIVE, 10, "economy"));
    assert_eq!(action.metadata().trigger, "rapid_fire");
    assert!(!controller.rapid_fire_status().active);

    // During cooldown the evasion pattern interrupts instead of starting a
    // new burst.
    let action = controller
        .process_response(fixtures::topic_response("q1", fixtures::EVASIVE, 10, "economy"));
    assert!(action.is_interruption());
    assert_eq!(controller.conversation_analytics().rapid_fire_sessions, 1);
}

#[test]
fn test_zero_question_trigger_falls_through_cascade() {
    use interviewer::rapidfire::{Intensity, RapidFireCondition, RapidFireTriggerConfig};

    // Valid, deserializable configuration with a burst of zero questions.
    // It must be treated as a configuration gap, never a panic.
    let mut config = quiet_config();
    config.rapid_fire.triggers = vec![RapidFireTriggerConfig {
        name: "empty_burst".to_string(),
        description: "misconfigured".to_string(),
        condition: RapidFireCondition::ContradictionDetected,
        question_count: 0,
        intensity: Intensity::High,
        escalation_rate: 1.4,
        time_limit_secs: 15,
    }];
    let mut controller = ConversationController::new(bare_arc(3), config, 3);

    let action = controller.process_response(
        fixtures::topic_response("q1", fixtures::DIPLOMATIC, 20, "economy").with_contradiction(),
    );
    assert!(matches!(action, ConversationAction::Question { .. }));
    assert!(!controller.rapid_fire_status().active);
    assert_eq!(controller.conversation_analytics().rapid_fire_sessions, 0);
}

#[test]
fn test_rapid_fire_early_exit_resumes_cascade() {
    let mut controller = ConversationController::new(bare_arc(5), rapid_fire_config(), 3);

    let opener = fixtures::topic_response("q1", fixtures::DIPLOMATIC, 20, "economy")
        .with_contradiction();
    let action = controller.process_response(opener);
    assert_eq!(action.metadata().trigger, "rapid_fire");

    // A confident, direct, in-range answer exits the session; the same
    // response re-enters the outer cascade this turn rather than being
    // dropped.
    let action = controller.process_response(fixtures::direct_response("q1"));
    assert!(!controller.rapid_fire_status().active);
    assert_ne!(action.metadata().trigger, "rapid_fire");
    assert_eq!(action.metadata().turn, 2);
}

#[test]
fn test_topic_avoidance_references_topic() {
    let mut controller = ConversationController::new(bare_arc(5), quiet_config(), 3);

    controller
        .process_response(fixtures::topic_response("q1", fixtures::EVASIVE, 20, "climate"));
    controller
        .process_response(fixtures::topic_response("q2", fixtures::EVASIVE, 20, "climate"));

    // Third response on the topic draws a specific callout, not a generic
    // interruption.
    let action = controller
        .process_response(fixtures::topic_response("q3", fixtures::DIPLOMATIC, 20, "climate"));
    assert!(action.is_interruption());
    assert!(action.text().contains("climate"));
    assert_eq!(action.metadata().topic.as_deref(), Some("climate"));
    assert_eq!(
        controller.interruption_history().last().unwrap().kind,
        InterruptionKind::TopicAvoidance
    );
}

#[test]
fn test_conclusion_early_wrap_up() {
    let mut controller = ConversationController::new(bare_arc(10), quiet_config(), 3);
    controller.set_performance(PerformanceSnapshot {
        overall_score: 90.0,
        consistency: 95.0,
        ..PerformanceSnapshot::default()
    });

    let mut last = None;
    for i in 1..=7 {
        last = Some(controller.process_response(fixtures::response_with_words(
            &format!("q{}", i),
            fixtures::DIPLOMATIC,
            20,
        )));
    }

    // 70% answered with a strong, consistent performance earns an early
    // wrap-up despite unanswered questions.
    let action = last.unwrap();
    assert!(action.is_conclusion());
    assert_eq!(action.metadata().trigger, "earned_wrap_up");
}

#[test]
fn test_no_early_wrap_up_on_middling_score() {
    let mut controller = ConversationController::new(bare_arc(10), quiet_config(), 3);
    controller.set_performance(PerformanceSnapshot {
        overall_score: 60.0,
        consistency: 95.0,
        ..PerformanceSnapshot::default()
    });

    let mut last = None;
    for i in 1..=7 {
        last = Some(controller.process_response(fixtures::response_with_words(
            &format!("q{}", i),
            fixtures::DIPLOMATIC,
            20,
        )));
    }

    let action = last.unwrap();
    assert!(!action.is_conclusion());
    assert!(matches!(action, ConversationAction::Question { .. }));
}

#[test]
fn test_contradiction_references_earliest_question() {
    let mut controller = ConversationController::new(bare_arc(5), quiet_config(), 3);

    controller
        .process_response(fixtures::topic_response("q1", fixtures::DIPLOMATIC, 20, "economy"));
    controller
        .process_response(fixtures::topic_response("q2", fixtures::DIPLOMATIC, 20, "economy"));

    // The challenge points back to the earliest statement on the topic,
    // not the most recent one.
    let action = controller.process_response(
        fixtures::topic_response("q3", fixtures::DIPLOMATIC, 20, "economy").with_contradiction(),
    );
    match &action {
        ConversationAction::ContradictionChallenge { metadata, .. } => {
            assert_eq!(metadata.question_id.as_deref(), Some("q1"));
            assert_eq!(metadata.topic.as_deref(), Some("economy"));
        }
        other => panic!("expected contradiction challenge, got {:?}", other),
    }
}

#[test]
fn test_replay_of_sample_arc_reaches_conclusion() {
    let arc = fixtures::sample_arc();
    let ids: Vec<String> = arc.iter().map(|q| q.id.clone()).collect();
    let mut controller = ConversationController::new(arc, quiet_config(), 11);

    let mut concluded = false;
    for id in &ids {
        let action = controller.process_response(fixtures::response_with_words(
            id,
            fixtures::DIPLOMATIC,
            20,
        ));
        if action.is_conclusion() {
            concluded = true;
            break;
        }
    }
    assert!(concluded);
    let analytics = controller.conversation_analytics();
    assert_eq!(analytics.questions_answered, analytics.questions_total);
}
