//! Configuration loading for the conversation controller.
//!
//! All tunable policy (frustration increments, probability gates,
//! rapid-fire triggers, conclusion thresholds) is loaded from a TOML
//! configuration file. Every section has defaults, so a partial file is
//! valid.

use serde::{Deserialize, Serialize};
use std::path::Path;

use interview_events::ResponseTone;

use crate::detector::DetectorConfig;
use crate::memory::MemoryConfig;
use crate::rapidfire::RapidFireConfig;

/// Complete controller configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Per-tone frustration increments
    pub frustration: FrustrationPolicy,
    /// Memory bounds
    pub memory: MemoryConfig,
    /// Detector thresholds and phrases
    pub detector: DetectorConfig,
    /// Rapid-fire engine settings
    pub rapid_fire: RapidFireConfig,
    /// Probability gates in the follow-up cascade
    pub gates: FollowUpGates,
    /// Conclusion thresholds
    pub conclusion: ConclusionConfig,
}

impl ControllerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::TomlError)
    }

    /// Serializes the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, TomlSerializeError> {
        toml::to_string_pretty(self).map_err(TomlSerializeError)
    }
}

/// Frustration increment table, applied per response.
///
/// These are balance knobs, not laws; scenario designers tune them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrustrationPolicy {
    pub evasive: f32,
    pub defensive: f32,
    pub aggressive: f32,
    pub diplomatic: f32,
    pub confident: f32,
    pub authentic: f32,
    pub nervous: f32,
    pub passionate: f32,
    /// Extra increment for responses under the short-response threshold
    pub short_response: f32,
    /// Extra increment when a contradiction is detected
    pub contradiction: f32,
}

impl Default for FrustrationPolicy {
    fn default() -> Self {
        Self {
            evasive: 12.0,
            defensive: 8.0,
            aggressive: 6.0,
            diplomatic: -3.0,
            confident: -6.0,
            authentic: -8.0,
            nervous: 4.0,
            passionate: 0.0,
            short_response: 5.0,
            contradiction: 15.0,
        }
    }
}

impl FrustrationPolicy {
    /// Base increment for a tone, before the short-response and
    /// contradiction additions.
    pub fn delta_for(&self, tone: ResponseTone) -> f32 {
        match tone {
            ResponseTone::Evasive => self.evasive,
            ResponseTone::Defensive => self.defensive,
            ResponseTone::Aggressive => self.aggressive,
            ResponseTone::Diplomatic => self.diplomatic,
            ResponseTone::Confident => self.confident,
            ResponseTone::Authentic => self.authentic,
            ResponseTone::Nervous => self.nervous,
            ResponseTone::Passionate => self.passionate,
        }
    }
}

/// Probability gates in the memory follow-up cascade step and the
/// mood-driven interruption check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowUpGates {
    /// Gate on the accountability challenge
    pub accountability_probability: f32,
    /// Gate on the topic memory reference
    pub reference_probability: f32,
    /// Gate on the mood-driven interruption
    pub mood_interruption_probability: f32,
    /// Frustration floor for the mood-driven interruption
    pub mood_interruption_frustration: f32,
}

impl Default for FollowUpGates {
    fn default() -> Self {
        Self {
            accountability_probability: 0.7,
            reference_probability: 0.6,
            mood_interruption_probability: 0.4,
            mood_interruption_frustration: 75.0,
        }
    }
}

/// Conclusion thresholds (see the terminal check in the controller).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConclusionConfig {
    /// Frustration above which the interviewer may give up
    pub giving_up_frustration: f32,
    /// Interruption count that must also be exceeded for giving up
    pub giving_up_interruptions: usize,
    /// Fraction of the arc answered for an earned early wrap-up
    pub early_wrap_answered_ratio: f32,
    /// Overall score that must be exceeded for an early wrap-up
    pub early_wrap_score: f32,
    /// Consistency that must be exceeded for an early wrap-up
    pub early_wrap_consistency: f32,
}

impl Default for ConclusionConfig {
    fn default() -> Self {
        Self {
            giving_up_frustration: 90.0,
            giving_up_interruptions: 3,
            early_wrap_answered_ratio: 0.7,
            early_wrap_score: 85.0,
            early_wrap_consistency: 90.0,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    IoError(std::io::Error),
    /// Error parsing TOML config
    TomlError(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::TomlError(e) => Some(e),
        }
    }
}

/// Error that can occur during TOML serialization.
#[derive(Debug)]
pub struct TomlSerializeError(pub toml::ser::Error);

impl std::fmt::Display for TomlSerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TOML serialize error: {}", self.0)
    }
}

impl std::error::Error for TomlSerializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Conversation Controller Configuration

[frustration]
evasive = 12.0
defensive = 8.0
aggressive = 6.0
diplomatic = -3.0
confident = -6.0
authentic = -8.0
nervous = 4.0
passionate = 0.0
short_response = 5.0
contradiction = 15.0

[memory]
max_entries_per_kind = 20
recent_tone_window = 5

[detector]
consecutive_evasion_threshold = 3
topic_avoidance_threshold = 2
deflection_phrases = [
    "what we should really be talking about",
    "the real question is",
    "let me tell you what matters",
    "that's not the issue",
    "my opponent",
    "ask yourself instead",
]

[gates]
accountability_probability = 0.7
reference_probability = 0.6
mood_interruption_probability = 0.4
mood_interruption_frustration = 75.0

[conclusion]
giving_up_frustration = 90.0
giving_up_interruptions = 3
early_wrap_answered_ratio = 0.7
early_wrap_score = 85.0
early_wrap_consistency = 90.0

[rapid_fire]
cooldown_turns = 5
max_session_questions = 6

[[rapid_fire.triggers]]
name = "caught_in_contradiction"
description = "The candidate contradicted an earlier statement"
question_count = 3
intensity = "high"
escalation_rate = 1.4
time_limit_secs = 15

[rapid_fire.triggers.condition]
kind = "contradiction_detected"

[[rapid_fire.triggers]]
name = "stonewalling"
description = "Three evasive answers in a row"
question_count = 4
intensity = "medium"
escalation_rate = 1.3
time_limit_secs = 20

[rapid_fire.triggers.condition]
kind = "global_evasion"
min = 3

[[rapid_fire.triggers]]
name = "topic_dodging"
description = "Repeated evasion on a single topic"
question_count = 3
intensity = "medium"
escalation_rate = 1.3
time_limit_secs = 20

[rapid_fire.triggers.condition]
kind = "topic_evasion"
min = 2

[[rapid_fire.triggers]]
name = "boiling_point"
description = "The interviewer has run out of patience"
question_count = 5
intensity = "extreme"
escalation_rate = 1.5
time_limit_secs = 10

[rapid_fire.triggers.condition]
kind = "frustration_above"
min = 70.0
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rapidfire::RapidFireCondition;

    #[test]
    fn test_default_config() {
        let config = ControllerConfig::default();

        assert_eq!(config.gates.accountability_probability, 0.7);
        assert_eq!(config.gates.reference_probability, 0.6);
        assert_eq!(config.conclusion.giving_up_frustration, 90.0);
        assert_eq!(config.rapid_fire.cooldown_turns, 5);
        assert_eq!(config.rapid_fire.triggers.len(), 4);
    }

    #[test]
    fn test_frustration_policy_delta() {
        let policy = FrustrationPolicy::default();
        assert_eq!(policy.delta_for(ResponseTone::Evasive), 12.0);
        assert_eq!(policy.delta_for(ResponseTone::Authentic), -8.0);
    }

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let toml = r#"
            [gates]
            accountability_probability = 1.0

            [conclusion]
            early_wrap_score = 80.0
        "#;

        let config = ControllerConfig::from_toml_str(toml).unwrap();

        // Specified values
        assert_eq!(config.gates.accountability_probability, 1.0);
        assert_eq!(config.conclusion.early_wrap_score, 80.0);
        // Default values
        assert_eq!(config.gates.reference_probability, 0.6);
        assert_eq!(config.frustration.evasive, 12.0);
        assert_eq!(config.rapid_fire.triggers.len(), 4);
    }

    #[test]
    fn test_parse_custom_triggers() {
        let toml = r#"
            [[rapid_fire.triggers]]
            name = "custom"
            description = "test"
            question_count = 2
            intensity = "low"
            escalation_rate = 1.1
            time_limit_secs = 30

            [rapid_fire.triggers.condition]
            kind = "global_evasion"
            min = 1
        "#;

        let config = ControllerConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.rapid_fire.triggers.len(), 1);
        assert_eq!(
            config.rapid_fire.triggers[0].condition,
            RapidFireCondition::GlobalEvasion { min: 1 }
        );
    }

    #[test]
    fn test_default_config_toml_matches_defaults() {
        let parsed = ControllerConfig::from_toml_str(&default_config_toml()).unwrap();
        let defaults = ControllerConfig::default();

        assert_eq!(parsed.frustration.contradiction, defaults.frustration.contradiction);
        assert_eq!(parsed.detector.deflection_phrases, defaults.detector.deflection_phrases);
        assert_eq!(parsed.rapid_fire.triggers, defaults.rapid_fire.triggers);
        assert_eq!(
            parsed.gates.mood_interruption_frustration,
            defaults.gates.mood_interruption_frustration
        );
    }

    #[test]
    fn test_config_to_toml_roundtrip() {
        let config = ControllerConfig::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[frustration]"));
        assert!(toml.contains("[gates]"));

        let parsed = ControllerConfig::from_toml_str(&toml).unwrap();
        assert_eq!(parsed.rapid_fire.triggers.len(), 4);
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[gates]\nreference_probability = 0.5\n").unwrap();

        let config = ControllerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.gates.reference_probability, 0.5);
    }

    #[test]
    fn test_from_file_missing_is_error() {
        let result = ControllerConfig::from_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
