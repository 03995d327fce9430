//! Shared data types and serialization for the interview simulation.
//!
//! This crate contains pure data structures with no control logic.
//! It is a dependency for all other crates in the workspace.

pub mod action;
pub mod question;
pub mod response;
pub mod state;

// Re-export response types
pub use response::{PlayerResponse, ResponseTone};

// Re-export action types
pub use action::{
    generate_interruption_id, ActionMetadata, ConversationAction, InterruptionKind,
    InterruptionRecord,
};

// Re-export question content types
pub use question::{
    FollowUpRule, InterruptionTriggerSpec, QuestionSpec, TimeoutAction, UrgencyDescriptor,
};

// Re-export state types
pub use state::{ConversationState, Mood, PerformanceSnapshot};

#[cfg(feature = "test-fixtures")]
pub mod fixtures;
