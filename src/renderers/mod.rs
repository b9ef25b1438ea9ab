//! Renderers module for the LilyPond emitter
//!
//! This module contains the text output of the music tree: LilyPond source
//! and Scheme music expressions.

pub mod lilypond;
pub mod scheme;

// Re-export commonly used types
pub use lilypond::{emit_document, emit_music, emit_staff, export_to_file, OutputPrinter};
