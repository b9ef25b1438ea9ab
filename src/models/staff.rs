//! Staff and staff-group layout model
//!
//! A score is laid out as an owned tree of staff groups. Leaf staves do not
//! hold music themselves: they carry part information naming the voice and
//! lyrics identifiers defined elsewhere in the output.

use serde::{Deserialize, Serialize};

use super::pitch::Pitch;

/// One voice of a staff and the lyrics lines attached to it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoicePart {
    pub voice_id: String,
    pub lyrics: Vec<String>,
}

impl VoicePart {
    pub fn new(voice_id: &str, lyrics: &[&str]) -> Self {
        Self {
            voice_id: voice_id.to_string(),
            lyrics: lyrics.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// One (sub-)staff of a part: its context id and its voices
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StaffPart {
    /// Context id; empty means an anonymous context
    pub staff_id: Option<String>,
    pub voices: Vec<VoicePart>,
}

impl StaffPart {
    pub fn new(staff_id: &str, voices: Vec<VoicePart>) -> Self {
        Self {
            staff_id: Some(staff_id.to_string()),
            voices,
        }
    }
}

/// Kind of layout node, with the settings specific to each kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffKind {
    /// Container of other groups and staves
    Group,
    Staff,
    TabStaff {
        string_tunings: Vec<Pitch>,
        tablature_format: Option<String>,
    },
    DrumStaff {
        drum_style_table: Option<String>,
    },
    RhythmicStaff,
}

impl StaffKind {
    /// Whether the node is a leaf staff printing part information
    pub fn is_staff(&self) -> bool {
        !matches!(self, StaffKind::Group)
    }

    /// Context used for each voice of a leaf staff
    pub fn voice_command(&self) -> &'static str {
        match self {
            StaffKind::TabStaff { .. } => "TabVoice",
            StaffKind::DrumStaff { .. } => "DrumVoice",
            _ => "Voice",
        }
    }

    fn default_command(&self) -> &'static str {
        match self {
            StaffKind::Group => "StaffGroup",
            StaffKind::Staff => "Staff",
            StaffKind::TabStaff { .. } => "TabStaff",
            StaffKind::DrumStaff { .. } => "DrumStaff",
            StaffKind::RhythmicStaff => "RhythmicStaff",
        }
    }
}

/// A staff group or a single staff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffGroup {
    pub kind: StaffKind,
    /// Context type after `\new`; `None` prints the group without `\new`
    pub staff_type: Option<String>,
    /// Part name used to route part information
    pub id: Option<String>,
    pub instrument_name: Option<String>,
    pub short_instrument_name: Option<String>,
    /// Start delimiter: "bracket", "brace", "line" or "none"
    pub symbol: Option<String>,
    /// "no" hides span bars
    pub spanbar: Option<String>,
    pub children: Vec<StaffGroup>,
    pub part_information: Vec<StaffPart>,
}

impl StaffGroup {
    pub fn new(kind: StaffKind) -> Self {
        let staff_type = Some(kind.default_command().to_string());
        Self {
            kind,
            staff_type,
            id: None,
            instrument_name: None,
            short_instrument_name: None,
            symbol: None,
            spanbar: None,
            children: Vec::new(),
            part_information: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Self::new(StaffKind::Group)
    }

    /// Leaf staff routed by part name
    pub fn staff(id: &str) -> Self {
        let mut staff = Self::new(StaffKind::Staff);
        staff.id = Some(id.to_string());
        staff
    }

    pub fn append_staff(&mut self, staff: StaffGroup) {
        self.children.push(staff);
    }

    /// Assign part information to the node whose id equals `part_name`
    ///
    /// Returns whether a matching node was found.
    pub fn set_part_information(&mut self, part_name: &str, staves: Vec<StaffPart>) -> bool {
        if self.id.as_deref() == Some(part_name) {
            self.part_information = staves;
            return true;
        }
        for child in &mut self.children {
            if child.set_part_information(part_name, staves.clone()) {
                return true;
            }
        }
        false
    }

    /// Context type actually printed and the context used for each sub-staff
    ///
    /// A staff whose part spans more than one staff becomes a piano staff
    /// holding plain staves.
    pub fn effective_types(&self) -> (Option<String>, String) {
        let own = self.staff_type.clone();
        if self.kind.is_staff() && self.part_information.len() > 1 {
            return (Some("PianoStaff".to_string()), "Staff".to_string());
        }
        let sub = own
            .clone()
            .unwrap_or_else(|| self.kind.default_command().to_string());
        (own, sub)
    }
}
