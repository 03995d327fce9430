//! Dynamic Follow-Up Library
//!
//! Follow-up rules may target a symbolic action name instead of a question
//! id. Each known name maps to a small template pool, contextualized with
//! the response's topic. Unknown names are configuration gaps and resolve
//! to `None`, which the controller treats as a cascade miss.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use interview_events::PlayerResponse;

const PRESS_FOR_SPECIFICS: &[&str] = &[
    "Give me one specific on {topic}. A number, a date, a name.",
    "That is a slogan. What would you actually do about {topic}?",
    "Concretely, on {topic}: what changes in year one?",
];

const CHALLENGE_RECORD: &[&str] = &[
    "Your record on {topic} says otherwise. Square that for me.",
    "How does that claim survive contact with your voting record on {topic}?",
];

const PERSONAL_COST: &[&str] = &[
    "What has this position on {topic} personally cost you?",
    "Have you ever paid a political price for {topic}, or only collected on it?",
];

const SIMPLIFY_FOR_VOTERS: &[&str] = &[
    "Explain {topic} the way you would to someone at a kitchen table.",
    "One plain sentence on {topic}, no qualifiers.",
];

const PIN_DOWN_NUMBERS: &[&str] = &[
    "Put a number on it. What does your {topic} plan cost?",
    "Give me the figure. How much, and who pays for {topic}?",
];

/// Names the library resolves.
pub fn known_actions() -> &'static [&'static str] {
    &[
        "press_for_specifics",
        "challenge_record",
        "personal_cost",
        "simplify_for_voters",
        "pin_down_numbers",
    ]
}

/// Generates a dynamic follow-up for a symbolic action name, or `None`
/// when the name is unknown.
pub fn generate_dynamic_follow_up(
    action_name: &str,
    response: &PlayerResponse,
    rng: &mut SmallRng,
) -> Option<String> {
    let pool: &[&str] = match action_name {
        "press_for_specifics" => PRESS_FOR_SPECIFICS,
        "challenge_record" => CHALLENGE_RECORD,
        "personal_cost" => PERSONAL_COST,
        "simplify_for_voters" => SIMPLIFY_FOR_VOTERS,
        "pin_down_numbers" => PIN_DOWN_NUMBERS,
        _ => return None,
    };
    let topic = response.topic.as_deref().unwrap_or("this issue");
    pool.choose(rng).map(|t| t.replace("{topic}", topic))
}
