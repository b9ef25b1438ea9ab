//! Attribute changes and other non-rhythmic music
//!
//! Key, time and clef changes, bar lines, upbeats, staff switches,
//! multi-measure rests and lyrics.

use lazy_static::lazy_static;
use std::collections::HashMap;

use super::duration::Duration;
use super::pitch::Pitch;

/// Key signature change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySignatureChange {
    pub tonic: Pitch,
    /// Mode name as a LilyPond command ("major", "minor", "dorian", ...)
    pub mode: String,
    /// Alteration of each of the 7 steps (for the Scheme pitch alist)
    pub scale: Vec<i32>,
}

impl Default for KeySignatureChange {
    fn default() -> Self {
        Self {
            tonic: Pitch::default(),
            mode: "major".to_string(),
            scale: Vec::new(),
        }
    }
}

/// Time signature change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignatureChange {
    /// (beats, beat type)
    pub fraction: (u32, u32),
}

impl Default for TimeSignatureChange {
    fn default() -> Self {
        Self { fraction: (4, 4) }
    }
}

/// (sign, staff line) -> LilyPond clef name
const CLEF_NAMES: [((&str, i32), &str); 12] = [
    (("G", 2), "treble"),
    (("G", 1), "french"),
    (("C", 1), "soprano"),
    (("C", 2), "mezzosoprano"),
    (("C", 3), "alto"),
    (("C", 4), "tenor"),
    (("C", 5), "baritone"),
    (("F", 3), "varbaritone"),
    (("F", 4), "bass"),
    (("F", 5), "subbass"),
    (("percussion", 2), "percussion"),
    (("TAB", 5), "tab"),
];

/// Clef change, described by sign, staff line and octave transposition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClefChange {
    /// Clef sign: "G", "C", "F", "percussion", "TAB"
    pub clef_type: String,
    /// Staff line the clef sits on (1 = bottom)
    pub position: i32,
    /// Octave transposition (-2..=2)
    pub octave: i32,
}

impl Default for ClefChange {
    fn default() -> Self {
        Self {
            clef_type: "G".to_string(),
            position: 2,
            octave: 0,
        }
    }
}

impl ClefChange {
    pub fn new(clef_type: &str, position: i32) -> Self {
        Self {
            clef_type: clef_type.to_string(),
            position,
            octave: 0,
        }
    }

    /// LilyPond clef name, `None` for an unknown sign/line combination
    pub fn clef_name(&self) -> Option<&'static str> {
        CLEF_NAMES
            .iter()
            .find(|((sign, line), _)| *sign == self.clef_type && *line == self.position)
            .map(|(_, name)| *name)
    }

    /// Octave transposition suffix
    pub fn octave_modifier(&self) -> &'static str {
        match self.octave {
            1 => "^8",
            2 => "^15",
            -1 => "_8",
            -2 => "_15",
            _ => "",
        }
    }
}

lazy_static! {
    static ref BAR_SYMBOLS: HashMap<&'static str, &'static str> = HashMap::from([
        ("regular", "|"),
        ("dotted", ":"),
        ("dashed", ":"),
        ("heavy", "|"),
        ("light-light", "||"),
        ("light-heavy", "|."),
        ("heavy-light", ".|"),
        ("heavy-heavy", ".|."),
        ("tick", "'"),
        ("short", "'"),
        ("none", ""),
    ]);
}

/// Bar line, optionally styled, with its bar number
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BarLine {
    pub bar_number: u32,
    /// Bar style name ("light-heavy", "dashed", ...)
    pub bar_type: Option<String>,
}

impl BarLine {
    /// Glyph for `\bar "..."`, `None` for unset or unknown styles
    pub fn bar_symbol(&self) -> Option<&'static str> {
        self.bar_type
            .as_deref()
            .and_then(|style| BAR_SYMBOLS.get(style).copied())
    }
}

/// Upbeat (`\partial`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Partial {
    pub partial: Option<Duration>,
}

/// Cross-staff switch (`\change Staff="..."`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StaffChange {
    pub staff: Option<String>,
}

/// Whole-bar rest spanning one or more measures
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultiMeasureRest {
    pub duration: Duration,
}

/// Lyric syllables for one `\lyricmode` block
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lyrics {
    pub syllables: Vec<String>,
}
