//! Mood derivation.
//!
//! Mood is a derived snapshot, not a state machine: it is recomputed from
//! the frustration scalar, the recent tone window, and the contradiction
//! count. Identical inputs always yield the same mood, which keeps a run
//! replayable from a frustration trace.

use interview_events::{Mood, ResponseTone};

/// Frustration at or above this reads as open hostility.
pub const HOSTILE_FRUSTRATION: f32 = 85.0;
/// Frustration at or above this reads as visible frustration.
pub const FRUSTRATED_FRUSTRATION: f32 = 60.0;
/// Frustration at or above this reads as skepticism.
pub const SKEPTICAL_FRUSTRATION: f32 = 35.0;

/// Derives the interviewer's mood.
///
/// Checks run in order: hostility and frustration first (high frustration
/// dominates everything), then skepticism (raised frustration or repeated
/// contradictions), then the favorable moods earned by a run of direct
/// tones at low frustration.
pub fn derive_mood(frustration: f32, recent_tones: &[ResponseTone], contradiction_count: u32) -> Mood {
    if frustration >= HOSTILE_FRUSTRATION {
        return Mood::Hostile;
    }
    if frustration >= FRUSTRATED_FRUSTRATION {
        return Mood::Frustrated;
    }
    if frustration >= SKEPTICAL_FRUSTRATION || contradiction_count >= 2 {
        return Mood::Skeptical;
    }

    let direct = recent_tones
        .iter()
        .filter(|t| matches!(t, ResponseTone::Confident | ResponseTone::Authentic | ResponseTone::Passionate))
        .count();

    if direct >= 3 && frustration < 20.0 {
        return Mood::Excited;
    }
    if direct >= 2 && frustration < 30.0 {
        return Mood::Sympathetic;
    }

    Mood::Neutral
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_events::ResponseTone::*;

    #[test]
    fn test_high_frustration_dominates() {
        // Even a run of confident answers cannot offset hostility.
        let tones = vec![Confident, Confident, Confident, Authentic, Passionate];
        assert_eq!(derive_mood(90.0, &tones, 0), Mood::Hostile);
        assert_eq!(derive_mood(70.0, &tones, 0), Mood::Frustrated);
    }

    #[test]
    fn test_skeptical_from_frustration_or_contradictions() {
        assert_eq!(derive_mood(40.0, &[], 0), Mood::Skeptical);
        assert_eq!(derive_mood(10.0, &[], 2), Mood::Skeptical);
        assert_eq!(derive_mood(10.0, &[], 1), Mood::Neutral);
    }

    #[test]
    fn test_excited_needs_direct_run_and_low_frustration() {
        let tones = vec![Confident, Authentic, Passionate, Diplomatic, Confident];
        assert_eq!(derive_mood(10.0, &tones, 0), Mood::Excited);
        // Same tones at higher frustration only earn sympathy.
        assert_eq!(derive_mood(25.0, &tones, 0), Mood::Sympathetic);
    }

    #[test]
    fn test_sympathetic_threshold() {
        let tones = vec![Confident, Authentic, Evasive, Defensive, Nervous];
        assert_eq!(derive_mood(10.0, &tones, 0), Mood::Sympathetic);
    }

    #[test]
    fn test_neutral_baseline() {
        assert_eq!(derive_mood(0.0, &[], 0), Mood::Neutral);
        let tones = vec![Diplomatic, Nervous, Defensive];
        assert_eq!(derive_mood(20.0, &tones, 0), Mood::Neutral);
    }

    #[test]
    fn test_pure_derivation() {
        let tones = vec![Confident, Evasive, Diplomatic];
        let a = derive_mood(42.0, &tones, 1);
        let b = derive_mood(42.0, &tones, 1);
        assert_eq!(a, b);
    }
}
