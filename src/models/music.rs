//! Music expression tree
//!
//! Nodes live in a single arena (`MusicTree`) and refer to each other by
//! `NodeId`. Ownership flows from parent to children through the id lists
//! held by nested music, wrappers and repeats; the `parent` field is only a
//! back-reference and is kept in sync by the structural edit operations.

use crate::errors::TreeError;

use super::attributes::{
    BarLine, ClefChange, KeySignatureChange, Lyrics, MultiMeasureRest, Partial, StaffChange,
    TimeSignatureChange,
};
use super::duration::Rational;
use super::events::{
    ArpeggioEvent, ArticulationEvent, BendEvent, DynamicsEvent, Event, EventKind, FretEvent,
    MarkEvent, MarkupEvent, NoteEvent, RestEvent, SkipEvent, SpanEvent, TextEvent, TremoloEvent,
};
use super::pitch::Pitch;

/// Index of a node inside its `MusicTree`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Where to insert relative to a sibling (or an end of the list)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

// ============================================================================
// MUSIC VARIANTS
// ============================================================================

/// Ordered child list shared by sequential music and chords
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedMusic {
    pub elements: Vec<NodeId>,
}

/// Simultaneous events sharing one duration, with optional grace notes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChordEvent {
    pub elements: Vec<NodeId>,
    /// Sequential music printed before the chord
    pub grace_elements: Option<NodeId>,
    /// Grace command without backslash ("grace", "acciaccatura", ...)
    pub grace_type: Option<String>,
}

/// What a wrapper adds around its single element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrapperKind {
    /// Prints the element unchanged
    Plain,
    /// `\notemode`, `\drummode`, `\chordmode`, ...
    ModeChange(String),
    /// `\relative <base>`; `None` uses middle C
    Relative(Option<Pitch>),
    /// `\times n/d`
    TimeScaled { numerator: i32, denominator: i32 },
}

/// A single-child container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicWrapper {
    pub kind: WrapperKind,
    pub element: Option<NodeId>,
}

impl MusicWrapper {
    pub fn new(kind: WrapperKind) -> Self {
        Self {
            kind,
            element: None,
        }
    }

    /// Time-scaled wrapper factor
    ///
    /// `None` for other wrappers and for a ratio with a zero term, which
    /// scales nothing.
    pub fn factor(&self) -> Option<Rational> {
        match self.kind {
            WrapperKind::TimeScaled {
                numerator,
                denominator,
            } if numerator != 0 && denominator != 0 => Some(Rational::new(numerator, denominator)),
            _ => None,
        }
    }
}

/// `\repeat <type> <count> body \alternative { endings }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatedMusic {
    pub repeat_type: String,
    pub repeat_count: u32,
    pub body: Option<NodeId>,
    pub endings: Vec<NodeId>,
}

impl Default for RepeatedMusic {
    fn default() -> Self {
        Self {
            repeat_type: "volta".to_string(),
            repeat_count: 2,
            body: None,
            endings: Vec::new(),
        }
    }
}

/// Closed set of tree node payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Music {
    Sequential(NestedMusic),
    Chord(ChordEvent),
    Wrapper(MusicWrapper),
    Repeated(RepeatedMusic),
    Lyrics(Lyrics),
    Partial(Partial),
    BarLine(BarLine),
    KeySignature(KeySignatureChange),
    TimeSignature(TimeSignatureChange),
    Clef(ClefChange),
    StaffChange(StaffChange),
    MultiMeasureRest(MultiMeasureRest),
    Event(Event),
}

impl Music {
    /// Node name used in Scheme `make-music` expressions
    pub fn name(&self) -> &'static str {
        match self {
            Music::Sequential(_) => "SequentialMusic",
            Music::Chord(_) => "EventChord",
            Music::Wrapper(wrapper) => match wrapper.kind {
                WrapperKind::Relative(_) => "RelativeOctaveMusic",
                WrapperKind::TimeScaled { .. } => "TimeScaledMusic",
                _ => "MusicWrapper",
            },
            Music::Repeated(_) => "VoltaRepeatedMusic",
            Music::Lyrics(_) => "LyricCombineMusic",
            Music::Partial(_) => "PartialSet",
            Music::BarLine(_) => "BarCheck",
            Music::KeySignature(_) => "KeyChangeEvent",
            Music::TimeSignature(_) => "TimeSignatureMusic",
            Music::Clef(_) => "ContextSpeccedMusic",
            Music::StaffChange(_) => "ContextChange",
            Music::MultiMeasureRest(_) => "MultiMeasureRestMusic",
            Music::Event(event) => match &event.kind {
                EventKind::Note(_) => "NoteEvent",
                EventKind::Rest(_) => "RestEvent",
                EventKind::Skip(_) => "SkipEvent",
                EventKind::Tie => "TieEvent",
                EventKind::Span(_) => "SpanEvent",
                EventKind::Dynamics(_) => "AbsoluteDynamicEvent",
                EventKind::Arpeggio(_) => "ArpeggioEvent",
                EventKind::Mark(_) => "MarkEvent",
                EventKind::Text(_) => "TextScriptEvent",
                EventKind::Tremolo(_) => "TremoloEvent",
                EventKind::Bend(_) => "BendAfterEvent",
                EventKind::Articulation(_) | EventKind::Markup(_) | EventKind::Fret(_) => {
                    "ArticulationEvent"
                }
            },
        }
    }

    /// Child list for nested music
    pub fn elements(&self) -> Option<&[NodeId]> {
        match self {
            Music::Sequential(nested) => Some(&nested.elements),
            Music::Chord(chord) => Some(&chord.elements),
            _ => None,
        }
    }

    fn elements_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            Music::Sequential(nested) => Some(&mut nested.elements),
            Music::Chord(chord) => Some(&mut chord.elements),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Music::Event(event) => Some(event),
            _ => None,
        }
    }
}

macro_rules! music_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Music {
                fn from(value: $ty) -> Self {
                    Music::$variant(value)
                }
            }
        )*
    };
}

music_from! {
    NestedMusic => Sequential,
    ChordEvent => Chord,
    MusicWrapper => Wrapper,
    RepeatedMusic => Repeated,
    Lyrics => Lyrics,
    Partial => Partial,
    BarLine => BarLine,
    KeySignatureChange => KeySignature,
    TimeSignatureChange => TimeSignature,
    ClefChange => Clef,
    StaffChange => StaffChange,
    MultiMeasureRest => MultiMeasureRest,
    Event => Event,
}

// Events reach the tree through `Event`
macro_rules! music_from_event {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Music {
                fn from(value: $ty) -> Self {
                    Music::Event(Event::from(value))
                }
            }
        )*
    };
}

music_from_event! {
    EventKind,
    SpanEvent,
    ArpeggioEvent,
    DynamicsEvent,
    MarkEvent,
    TextEvent,
    ArticulationEvent,
    MarkupEvent,
    FretEvent,
    TremoloEvent,
    BendEvent,
    NoteEvent,
    RestEvent,
    SkipEvent,
}

// ============================================================================
// TREE
// ============================================================================

/// One node in the arena
#[derive(Debug, Clone)]
pub struct MusicNode {
    parent: Option<NodeId>,
    /// Start time, assigned by `MusicTree::set_start`
    pub start: Rational,
    /// Free-text comment printed as `% ...`
    pub comment: Option<String>,
    /// When set, the node is printed as `\identifier` where referenced
    pub identifier: Option<String>,
    pub music: Music,
}

impl MusicNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Arena owning every music node of one score
#[derive(Debug, Clone, Default)]
pub struct MusicTree {
    nodes: Vec<MusicNode>,
}

impl MusicTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detached node
    pub fn add(&mut self, music: impl Into<Music>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(MusicNode {
            parent: None,
            start: Rational::from_integer(0),
            comment: None,
            identifier: None,
            music: music.into(),
        });
        id
    }

    /// Add an empty sequential music node
    pub fn add_sequential(&mut self) -> NodeId {
        self.add(Music::Sequential(NestedMusic::default()))
    }

    /// Add an empty chord node
    pub fn add_chord(&mut self) -> NodeId {
        self.add(Music::Chord(ChordEvent::default()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &MusicNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut MusicNode {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&MusicNode> {
        self.nodes.get(id.0)
    }

    pub fn music(&self, id: NodeId) -> &Music {
        &self.node(id).music
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children of nested music; empty for every other node
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.music(id).elements().unwrap_or(&[])
    }

    pub fn set_comment(&mut self, id: NodeId, comment: &str) {
        self.node_mut(id).comment = Some(comment.to_string());
    }

    pub fn set_identifier(&mut self, id: NodeId, identifier: &str) {
        self.node_mut(id).identifier = Some(identifier.to_string());
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let mut ancestor = Some(parent);
        while let Some(node) = ancestor {
            if node == child {
                return Err(TreeError::SelfReference(child));
            }
            ancestor = self.parent(node);
        }
        if self.node(child).parent.is_some() {
            return Err(TreeError::AlreadyAttached(child));
        }
        self.node_mut(child).parent = Some(parent);
        Ok(())
    }

    /// Append a child at the end of nested music
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.insert_around(parent, None, child, Side::After)
    }

    /// Insert a child next to `successor`, or at one end of the list
    ///
    /// Without a successor, `Side::Before` inserts at the front and
    /// `Side::After` at the back.
    pub fn insert_around(
        &mut self,
        parent: NodeId,
        successor: Option<NodeId>,
        child: NodeId,
        side: Side,
    ) -> Result<(), TreeError> {
        let elements = self
            .music(parent)
            .elements()
            .ok_or(TreeError::NotNested(parent))?;

        let index = match successor {
            Some(sibling) => {
                let position = elements
                    .iter()
                    .position(|e| *e == sibling)
                    .ok_or(TreeError::NotAChild {
                        parent,
                        child: sibling,
                    })?;
                match side {
                    Side::Before => position,
                    Side::After => position + 1,
                }
            }
            None => match side {
                Side::Before => 0,
                Side::After => elements.len(),
            },
        };

        self.attach(parent, child)?;
        if let Some(elements) = self.node_mut(parent).music.elements_mut() {
            elements.insert(index, child);
        }
        Ok(())
    }

    /// Remove a child from nested music, leaving it detached in the arena
    pub fn delete_element(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let elements = self
            .node_mut(parent)
            .music
            .elements_mut()
            .ok_or(TreeError::NotNested(parent))?;
        let position = elements
            .iter()
            .position(|e| *e == child)
            .ok_or(TreeError::NotAChild { parent, child })?;
        elements.remove(position);
        self.node_mut(child).parent = None;
        Ok(())
    }

    /// Position of a node among its parent's children
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|e| *e == id)
    }

    /// Sibling `offset` places away, clamped to the ends of the list
    pub fn neighbor(&self, id: NodeId, offset: isize) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|e| *e == id)? as isize;
        let target = (index + offset).clamp(0, siblings.len() as isize - 1);
        siblings.get(target as usize).copied()
    }

    /// Attach a grace note (or any music) to a chord's grace sequence
    pub fn append_grace(&mut self, chord: NodeId, element: NodeId) -> Result<(), TreeError> {
        let existing = match self.music(chord) {
            Music::Chord(c) => c.grace_elements,
            _ => return Err(TreeError::NotAChord(chord)),
        };
        let grace = match existing {
            Some(grace) => grace,
            None => {
                let grace = self.add_sequential();
                self.node_mut(grace).parent = Some(chord);
                if let Music::Chord(c) = &mut self.node_mut(chord).music {
                    c.grace_elements = Some(grace);
                }
                grace
            }
        };
        self.append(grace, element)
    }

    /// Set the single element of a wrapper
    pub fn set_element(&mut self, wrapper: NodeId, element: NodeId) -> Result<(), TreeError> {
        if !matches!(self.music(wrapper), Music::Wrapper(_)) {
            return Err(TreeError::NotAWrapper(wrapper));
        }
        self.attach(wrapper, element)?;
        let previous = match &mut self.node_mut(wrapper).music {
            Music::Wrapper(w) => w.element.replace(element),
            _ => None,
        };
        if let Some(previous) = previous {
            self.node_mut(previous).parent = None;
        }
        Ok(())
    }

    /// Set the body of a repeat
    pub fn set_repeat_body(&mut self, repeat: NodeId, body: NodeId) -> Result<(), TreeError> {
        if !matches!(self.music(repeat), Music::Repeated(_)) {
            return Err(TreeError::NotARepeat(repeat));
        }
        self.attach(repeat, body)?;
        let previous = match &mut self.node_mut(repeat).music {
            Music::Repeated(r) => r.body.replace(body),
            _ => None,
        };
        if let Some(previous) = previous {
            self.node_mut(previous).parent = None;
        }
        Ok(())
    }

    /// Set the body of a repeat from a list of nodes, wrapped in sequential music
    pub fn set_repeat_body_list(
        &mut self,
        repeat: NodeId,
        elements: &[NodeId],
    ) -> Result<NodeId, TreeError> {
        let body = self.add_sequential();
        for element in elements {
            self.append(body, *element)?;
        }
        self.set_repeat_body(repeat, body)?;
        Ok(body)
    }

    /// Add an alternative ending to a repeat
    pub fn add_ending(&mut self, repeat: NodeId, ending: NodeId) -> Result<(), TreeError> {
        if !matches!(self.music(repeat), Music::Repeated(_)) {
            return Err(TreeError::NotARepeat(repeat));
        }
        self.attach(repeat, ending)?;
        if let Music::Repeated(r) = &mut self.node_mut(repeat).music {
            r.endings.push(ending);
        }
        Ok(())
    }

    /// Every node directly owned by `id`, in printing order
    pub fn owned_children(&self, id: NodeId) -> Vec<NodeId> {
        match self.music(id) {
            Music::Sequential(nested) => nested.elements.clone(),
            Music::Chord(chord) => chord
                .grace_elements
                .into_iter()
                .chain(chord.elements.iter().copied())
                .collect(),
            Music::Wrapper(wrapper) => wrapper.element.into_iter().collect(),
            Music::Repeated(repeat) => repeat
                .body
                .into_iter()
                .chain(repeat.endings.iter().copied())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Sounding length of a node
    ///
    /// Sequences add up, chords take their longest member, wrappers follow
    /// their element (scaled for tuplets), repeats count body and endings
    /// once each.
    pub fn length(&self, id: NodeId) -> Rational {
        let zero = Rational::from_integer(0);
        match self.music(id) {
            Music::Sequential(nested) => nested
                .elements
                .iter()
                .fold(zero, |acc, e| acc + self.length(*e)),
            Music::Chord(chord) => chord
                .elements
                .iter()
                .map(|e| self.length(*e))
                .fold(zero, |acc, l| if l > acc { l } else { acc }),
            Music::Wrapper(wrapper) => {
                let inner = wrapper.element.map(|e| self.length(e)).unwrap_or(zero);
                match wrapper.factor() {
                    Some(factor) => inner * factor,
                    None => inner,
                }
            }
            Music::Repeated(_) => self
                .owned_children(id)
                .iter()
                .fold(zero, |acc, e| acc + self.length(*e)),
            Music::MultiMeasureRest(rest) => rest.duration.length(),
            Music::Event(event) => event.length(),
            _ => zero,
        }
    }

    /// Assign start times: siblings in a sequence start where the previous
    /// one ended, everything else starts with its parent
    pub fn set_start(&mut self, id: NodeId, start: Rational) {
        self.set_start_scaled(id, start, Rational::from_integer(1));
    }

    fn set_start_scaled(&mut self, id: NodeId, start: Rational, scale: Rational) {
        self.node_mut(id).start = start;
        match self.music(id).clone() {
            Music::Sequential(NestedMusic { elements }) => {
                let mut position = start;
                for element in elements {
                    self.set_start_scaled(element, position, scale);
                    position += self.length(element) * scale;
                }
            }
            Music::Repeated(repeat) => {
                let mut position = start;
                for element in repeat.body.into_iter().chain(repeat.endings) {
                    self.set_start_scaled(element, position, scale);
                    position += self.length(element) * scale;
                }
            }
            Music::Chord(chord) => {
                for element in chord.elements {
                    self.set_start_scaled(element, start, scale);
                }
            }
            Music::Wrapper(wrapper) => {
                let scale = wrapper.factor().map_or(scale, |factor| scale * factor);
                if let Some(element) = wrapper.element {
                    self.set_start_scaled(element, start, scale);
                }
            }
            _ => {}
        }
    }

    /// First node (depth-first, self included) matching the predicate
    pub fn find_first<F>(&self, id: NodeId, predicate: &F) -> Option<NodeId>
    where
        F: Fn(&MusicNode) -> bool,
    {
        if predicate(self.node(id)) {
            return Some(id);
        }
        self.owned_children(id)
            .into_iter()
            .find_map(|child| self.find_first(child, predicate))
    }

    /// Last chord of a sequence, unless a bar line comes after it
    pub fn last_event_chord(&self, sequence: NodeId) -> Option<NodeId> {
        self.children(sequence)
            .iter()
            .rev()
            .find(|e| matches!(self.music(**e), Music::Chord(_) | Music::BarLine(_)))
            .copied()
            .filter(|e| matches!(self.music(*e), Music::Chord(_)))
    }
}
