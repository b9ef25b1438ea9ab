//! Emitter configuration

use serde::{Deserialize, Serialize};

use crate::errors::EmitError;
use crate::models::PitchLanguage;

/// Configuration options for LilyPond emission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterSettings {
    /// Version written by `\version` (e.g., "2.24.0")
    pub target_lilypond_version: String,

    /// Note name language
    pub language: PitchLanguage,

    /// Preferred maximum line length
    pub line_width: usize,

    /// Spaces per nesting level
    pub indent_width: usize,
}

impl Default for EmitterSettings {
    fn default() -> Self {
        Self {
            target_lilypond_version: "2.24.0".to_string(),
            language: PitchLanguage::Nederlands,
            line_width: 72,
            indent_width: 4,
        }
    }
}

impl EmitterSettings {
    /// Parse settings from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, EmitError> {
        Ok(serde_json::from_str(json)?)
    }
}
