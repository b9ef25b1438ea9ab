//! Event types attached to chords
//!
//! Rhythmic events (notes, rests, skips) carry a duration. Everything else
//! is a decoration: spanners, articulations, dynamics and markup that are
//! printed around the note they belong to.

use super::duration::{Duration, Rational};
use super::pitch::Pitch;

// ============================================================================
// DIRECTIONS
// ============================================================================

/// Start/continue/stop of a spanner, with the numeric codes -1/0/+1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanDirection {
    Start,
    Continue,
    Stop,
}

impl SpanDirection {
    pub fn code(&self) -> i32 {
        match self {
            SpanDirection::Start => -1,
            SpanDirection::Continue => 0,
            SpanDirection::Stop => 1,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            c if c < 0 => SpanDirection::Start,
            0 => SpanDirection::Continue,
            _ => SpanDirection::Stop,
        }
    }
}

/// Forced placement of a script: `^`, `_` or `-`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl Direction {
    pub fn from_code(code: i32) -> Self {
        match code {
            c if c > 0 => Direction::Up,
            c if c < 0 => Direction::Down,
            _ => Direction::Neutral,
        }
    }

    /// LilyPond placement prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            Direction::Up => "^",
            Direction::Down => "_",
            Direction::Neutral => "-",
        }
    }
}

/// Line style of a spanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Wavy,
}

// ============================================================================
// SPANNERS
// ============================================================================

/// Spanner variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Slur,
    Beam,
    Pedal,
    TextSpanner,
    BracketSpanner,
    OctaveShift,
    TrillSpan,
    Glissando,
    Hairpin,
}

/// A spanner start, continuation or end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanEvent {
    pub kind: SpanKind,
    pub direction: SpanDirection,
    pub line_type: LineType,
    /// Variant specific: +1 crescendo / -1 decrescendo, +1 up / -1 down octave shift
    pub span_type: i32,
    /// Octave shift size (8 or 15)
    pub size: i32,
}

impl SpanEvent {
    pub fn new(kind: SpanKind, direction: SpanDirection) -> Self {
        Self {
            kind,
            direction,
            line_type: LineType::Solid,
            span_type: 0,
            size: 0,
        }
    }

    /// Set the span subtype from its interchange name
    pub fn set_span_type(&mut self, name: &str) {
        self.span_type = match self.kind {
            SpanKind::OctaveShift => match name {
                "up" => 1,
                "down" => -1,
                _ => 0,
            },
            SpanKind::Hairpin => match name {
                "crescendo" => 1,
                "decrescendo" | "diminuendo" => -1,
                _ => 0,
            },
            _ => 0,
        };
    }
}

// ============================================================================
// DECORATIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArpeggioEvent {
    pub direction: Option<Direction>,
    pub non_arpeggiate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DynamicsEvent {
    /// Dynamic name without backslash (e.g. "mf", "sfz")
    pub kind: Option<String>,
}

/// How a rehearsal mark's contents are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkKind {
    #[default]
    Text,
    MusicGlyph,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkEvent {
    pub mark: Option<String>,
    pub kind: MarkKind,
}

impl Default for MarkEvent {
    fn default() -> Self {
        Self {
            mark: Some("\\default".to_string()),
            kind: MarkKind::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextEvent {
    pub text: String,
    pub force_direction: Option<Direction>,
    /// Markup command wrapping the text (e.g. "\\bold")
    pub markup: Option<String>,
}

/// Articulation spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArticulationStyle {
    /// `-\staccato`, direction prefix only when forced
    #[default]
    Named,
    /// `-.`, `->`: direction prefix defaults to `-`
    Short,
    /// `\fermata` style commands that take no direction
    NoDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticulationEvent {
    pub name: Option<String>,
    pub style: ArticulationStyle,
    pub force_direction: Option<Direction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkupEvent {
    pub contents: Option<String>,
    pub force_direction: Option<Direction>,
}

/// Fret diagram attached above a chord
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FretEvent {
    pub strings: u32,
    pub frets: u32,
    /// Barre as (from string, to string, fret); ignored unless it has 3 parts
    pub barre: Vec<String>,
    /// Per-dot components: string, fret and optional fingering
    pub elements: Vec<Vec<String>>,
    pub force_direction: Option<Direction>,
}

impl Default for FretEvent {
    fn default() -> Self {
        Self {
            strings: 6,
            frets: 4,
            barre: Vec::new(),
            elements: Vec::new(),
            force_direction: Some(Direction::Up),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TremoloEvent {
    pub bars: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BendEvent {
    pub alter: i32,
}

// ============================================================================
// RHYTHMIC EVENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteEvent {
    pub duration: Duration,
    pub pitch: Option<Pitch>,
    /// Drum name used instead of a pitch in drum mode
    pub drum_type: Option<String>,
    pub cautionary: bool,
    pub forced_accidental: bool,
}

impl NoteEvent {
    pub fn new(pitch: Pitch, duration: Duration) -> Self {
        Self {
            duration,
            pitch: Some(pitch),
            ..Self::default()
        }
    }

    pub fn drum(drum_type: &str, duration: Duration) -> Self {
        Self {
            duration,
            drum_type: Some(drum_type.to_string()),
            ..Self::default()
        }
    }

    /// Accidental suffixes: `?` for cautionary, `!` for forced
    pub fn pitch_mods(&self) -> &'static str {
        match (self.cautionary, self.forced_accidental) {
            (true, true) => "?!",
            (true, false) => "?",
            (false, true) => "!",
            (false, false) => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RestEvent {
    pub duration: Duration,
    /// Vertical position for a pitched rest (`c'4\rest`)
    pub pitch: Option<Pitch>,
}

impl RestEvent {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            pitch: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkipEvent {
    pub duration: Duration,
}

impl SkipEvent {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

// ============================================================================
// EVENT
// ============================================================================

/// Closed set of event variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Span(SpanEvent),
    Arpeggio(ArpeggioEvent),
    Tie,
    Dynamics(DynamicsEvent),
    Mark(MarkEvent),
    Text(TextEvent),
    Articulation(ArticulationEvent),
    Markup(MarkupEvent),
    Fret(FretEvent),
    Tremolo(TremoloEvent),
    Bend(BendEvent),
    Note(NoteEvent),
    Rest(RestEvent),
    Skip(SkipEvent),
}

/// An event plus free-form text printed before/after the note it decorates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    /// e.g. an `\once \override` needed by the decoration
    pub before_note: Option<String>,
    /// e.g. a `\revert` undoing `before_note`
    pub after_note: Option<String>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            before_note: None,
            after_note: None,
        }
    }

    /// Whether the event has a duration of its own
    pub fn is_rhythmic(&self) -> bool {
        matches!(
            self.kind,
            EventKind::Note(_) | EventKind::Rest(_) | EventKind::Skip(_)
        )
    }

    /// Whether the event attaches to the following note
    ///
    /// Rehearsal marks and ottava brackets stand on their own; every other
    /// decoration needs a note to hang on.
    pub fn waits_for_note(&self) -> bool {
        match &self.kind {
            EventKind::Span(span) => span.kind != SpanKind::OctaveShift,
            EventKind::Mark(_) => false,
            EventKind::Note(_) | EventKind::Rest(_) | EventKind::Skip(_) => false,
            _ => true,
        }
    }

    pub fn duration(&self) -> Option<&Duration> {
        match &self.kind {
            EventKind::Note(note) => Some(&note.duration),
            EventKind::Rest(rest) => Some(&rest.duration),
            EventKind::Skip(skip) => Some(&skip.duration),
            _ => None,
        }
    }

    /// Sounding length; zero for decorations
    pub fn length(&self) -> Rational {
        self.duration()
            .map(Duration::length)
            .unwrap_or_else(|| Rational::from_integer(0))
    }
}

impl From<EventKind> for Event {
    fn from(kind: EventKind) -> Self {
        Event::new(kind)
    }
}

macro_rules! event_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Event {
                fn from(value: $ty) -> Self {
                    Event::new(EventKind::$variant(value))
                }
            }
        )*
    };
}

event_from! {
    SpanEvent => Span,
    ArpeggioEvent => Arpeggio,
    DynamicsEvent => Dynamics,
    MarkEvent => Mark,
    TextEvent => Text,
    ArticulationEvent => Articulation,
    MarkupEvent => Markup,
    FretEvent => Fret,
    TremoloEvent => Tremolo,
    BendEvent => Bend,
    NoteEvent => Note,
    RestEvent => Rest,
    SkipEvent => Skip,
}
