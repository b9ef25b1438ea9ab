//! LilyPond emitter for an in-memory music tree
//!
//! Build a `MusicTree` (and optionally a `StaffGroup` layout), then print
//! it as LilyPond source with an `OutputPrinter` or one of the `emit_*`
//! helpers. The printer tracks durations, relative pitches and tuplet
//! scaling so the output uses LilyPond's shorthand where it can.

pub mod errors;
pub mod models;
pub mod renderers;
pub mod settings;

// Re-export commonly used types
pub use errors::{EmitError, TreeError};
pub use models::{Duration, Music, MusicTree, NodeId, Pitch, PitchLanguage, Rational, StaffGroup};
pub use renderers::lilypond::{emit_document, emit_music, emit_staff, export_to_file, OutputPrinter};
pub use settings::EmitterSettings;
