//! Serializable snapshots of controller state, for UIs, logs, and
//! post-interview review.

use serde::{Deserialize, Serialize};

use interview_events::Mood;

use crate::detector::EvasionStats;
use crate::memory::MemoryStats;
use crate::rapidfire::RapidFireSession;

/// Point-in-time view of the whole conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationAnalytics {
    /// Logical turns processed so far
    pub turns: u64,
    /// Current derived mood
    pub mood: Mood,
    /// Frustration in [0, 100]
    pub frustration_level: f32,
    /// Memory counts
    pub memory: MemoryStats,
    /// Evasion counters
    pub evasion: EvasionStats,
    /// Interruptions issued so far
    pub interruption_count: usize,
    /// Rapid-fire sessions started so far
    pub rapid_fire_sessions: u32,
    /// Arc questions answered
    pub questions_answered: usize,
    /// Arc questions total
    pub questions_total: usize,
}

/// Rapid-fire engine status, including the live session when one runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RapidFireStatus {
    /// True while a session is running
    pub active: bool,
    /// The live session, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<RapidFireSession>,
    /// Turns before another trigger may fire
    pub cooldown_remaining_turns: u64,
}
