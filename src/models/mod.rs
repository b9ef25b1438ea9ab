//! Models module for the LilyPond emitter
//!
//! Durations, pitches, events and the arena-backed music tree, plus the
//! staff layout model printed around it.

pub mod attributes;
pub mod duration;
pub mod events;
pub mod music;
pub mod pitch;
pub mod pitch_language;
pub mod staff;

// Re-export commonly used types
pub use attributes::*;
pub use duration::{Duration, Rational};
pub use events::*;
pub use music::{
    ChordEvent, Music, MusicNode, MusicTree, MusicWrapper, NestedMusic, NodeId, RepeatedMusic,
    Side, WrapperKind,
};
pub use pitch::Pitch;
pub use pitch_language::PitchLanguage;
pub use staff::{StaffGroup, StaffKind, StaffPart, VoicePart};
