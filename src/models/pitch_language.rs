//! Note-name languages
//!
//! LilyPond accepts note names in several languages. Each language is a
//! fixed table of seven step names plus four accidental suffixes (flat,
//! quarter-flat, quarter-sharp, sharp), followed by a few substitutions
//! that collapse irregular spellings such as `aes` -> `as`.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::duration::Rational;

/// Note naming language for LilyPond output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchLanguage {
    /// Dutch: c d e f g a b (cis/ees) - LilyPond default
    #[default]
    Nederlands,
    /// English: cs/ef
    English,
    /// German: h for b, b for b-flat
    Deutsch,
    /// Norwegian, same spelling as German
    Norsk,
    /// Swedish: ciss/cess
    Svenska,
    /// Italian: do re mi (dod/dob)
    Italiano,
    /// Catalan, same spelling as Italian
    Catalan,
    /// Spanish: dos/dob
    Espanol,
    /// Flemish: dok/dob
    Vlaams,
}

struct NameTable {
    steps: [&'static str; 7],
    /// flat, quarter-flat, quarter-sharp, sharp
    accidentals: [&'static str; 4],
    substitutions: &'static [(&'static str, &'static str)],
}

const DUTCH_STEPS: [&str; 7] = ["c", "d", "e", "f", "g", "a", "b"];
const GERMAN_STEPS: [&str; 7] = ["c", "d", "e", "f", "g", "a", "h"];
const SOLFEGE_STEPS: [&str; 7] = ["do", "re", "mi", "fa", "sol", "la", "si"];

const NEDERLANDS: NameTable = NameTable {
    steps: DUTCH_STEPS,
    accidentals: ["es", "eh", "ih", "is"],
    substitutions: &[("aes", "as"), ("ees", "es")],
};

const ENGLISH: NameTable = NameTable {
    steps: DUTCH_STEPS,
    accidentals: ["f", "qf", "qs", "s"],
    substitutions: &[("aes", "as"), ("ees", "es")],
};

const DEUTSCH: NameTable = NameTable {
    steps: GERMAN_STEPS,
    accidentals: ["es", "eh", "ih", "is"],
    substitutions: &[("hes", "b"), ("aes", "as"), ("ees", "es")],
};

const SVENSKA: NameTable = NameTable {
    steps: GERMAN_STEPS,
    accidentals: ["ess", "", "", "iss"],
    substitutions: &[("hess", "b"), ("aes", "as"), ("ees", "es")],
};

const ITALIANO: NameTable = NameTable {
    steps: SOLFEGE_STEPS,
    accidentals: ["b", "sb", "sd", "d"],
    substitutions: &[],
};

const ESPANOL: NameTable = NameTable {
    steps: SOLFEGE_STEPS,
    accidentals: ["b", "", "", "s"],
    substitutions: &[],
};

const VLAAMS: NameTable = NameTable {
    steps: SOLFEGE_STEPS,
    accidentals: ["b", "", "", "k"],
    substitutions: &[],
};

lazy_static! {
    static ref LANGUAGES_BY_NAME: HashMap<&'static str, PitchLanguage> = HashMap::from([
        ("nederlands", PitchLanguage::Nederlands),
        ("english", PitchLanguage::English),
        ("deutsch", PitchLanguage::Deutsch),
        ("norsk", PitchLanguage::Norsk),
        ("svenska", PitchLanguage::Svenska),
        ("italiano", PitchLanguage::Italiano),
        ("catalan", PitchLanguage::Catalan),
        ("espanol", PitchLanguage::Espanol),
        ("vlaams", PitchLanguage::Vlaams),
    ]);
}

impl PitchLanguage {
    /// Look up a language by its LilyPond name
    ///
    /// Unknown names fall back to the default (nederlands) table.
    pub fn from_name(name: &str) -> Self {
        match LANGUAGES_BY_NAME.get(name) {
            Some(language) => *language,
            None => {
                log::debug!("unknown pitch language '{}', using default names", name);
                Self::default()
            }
        }
    }

    /// LilyPond name used in `\language "..."`
    pub fn name(&self) -> &'static str {
        match self {
            PitchLanguage::Nederlands => "nederlands",
            PitchLanguage::English => "english",
            PitchLanguage::Deutsch => "deutsch",
            PitchLanguage::Norsk => "norsk",
            PitchLanguage::Svenska => "svenska",
            PitchLanguage::Italiano => "italiano",
            PitchLanguage::Catalan => "catalan",
            PitchLanguage::Espanol => "espanol",
            PitchLanguage::Vlaams => "vlaams",
        }
    }

    fn table(&self) -> &'static NameTable {
        match self {
            PitchLanguage::Nederlands => &NEDERLANDS,
            PitchLanguage::English => &ENGLISH,
            PitchLanguage::Deutsch | PitchLanguage::Norsk => &DEUTSCH,
            PitchLanguage::Svenska => &SVENSKA,
            PitchLanguage::Italiano | PitchLanguage::Catalan => &ITALIANO,
            PitchLanguage::Espanol => &ESPANOL,
            PitchLanguage::Vlaams => &VLAAMS,
        }
    }

    /// Note name (without octave marks) for a step and an alteration in semitones
    ///
    /// Whole semitones repeat the flat/sharp suffix; a remaining half
    /// semitone appends the quarter-tone suffix.
    pub fn note_name(&self, step: i32, alteration: Rational) -> String {
        let table = self.table();
        let mut name = table.steps[step.rem_euclid(7) as usize].to_string();

        let zero = Rational::from_integer(0);
        let (magnitude, whole_suffix, quarter_suffix) = if alteration < zero {
            (-alteration, table.accidentals[0], table.accidentals[1])
        } else {
            (alteration, table.accidentals[3], table.accidentals[2])
        };

        name.push_str(&whole_suffix.repeat(magnitude.trunc().to_integer() as usize));
        for &(from, to) in table.substitutions {
            name = name.replace(from, to);
        }

        if !magnitude.fract().is_integer() {
            name.push_str(quarter_suffix);
        }
        name
    }
}
