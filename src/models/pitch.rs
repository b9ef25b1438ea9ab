//! Pitch representation and transposition
//!
//! A pitch is a diatonic step, a chromatic alteration and an octave.
//! Octave 0 is the octave starting at middle C, which LilyPond writes as
//! `c'`.

use super::duration::Rational;
use super::pitch_language::PitchLanguage;

/// Semitone offset of each diatonic step above C
const STEP_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Musical pitch representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    /// Scale degree (0=C, 1=D, 2=E, 3=F, 4=G, 5=A, 6=B)
    pub step: i32,

    /// Alteration in semitones (-1=flat, +1=sharp, +1/2=quarter-tone sharp)
    pub alteration: Rational,

    /// Octave number (0 = middle C octave)
    pub octave: i32,
}

impl Default for Pitch {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl Pitch {
    /// Create a pitch with a whole-semitone alteration
    pub fn new(step: i32, alteration: i32, octave: i32) -> Self {
        Self {
            step,
            alteration: Rational::from_integer(alteration),
            octave,
        }
    }

    /// Same pitch with an arbitrary (e.g. quarter-tone) alteration
    pub fn with_alteration(mut self, alteration: Rational) -> Self {
        self.alteration = alteration;
        self
    }

    /// Bring the step into 0..7, carrying whole octaves
    pub fn normalize(&mut self) {
        self.octave += self.step.div_euclid(7);
        self.step = self.step.rem_euclid(7);
    }

    /// Number of diatonic steps above middle C
    pub fn steps(&self) -> i32 {
        self.step + self.octave * 7
    }

    /// Number of semitones above middle C
    pub fn semitones(&self) -> Rational {
        let diatonic = self.octave * 12 + STEP_SEMITONES[self.step.rem_euclid(7) as usize];
        Rational::from_integer(diatonic) + self.alteration
    }

    /// Transpose by an interval given as a pitch above middle C
    ///
    /// Steps and octaves are added diatonically; the alteration is then
    /// corrected so the semitone count is exactly the sum of both.
    pub fn transposed(&self, interval: &Pitch) -> Pitch {
        let mut result = Pitch {
            step: self.step + interval.step,
            alteration: self.alteration + interval.alteration,
            octave: self.octave + interval.octave,
        };
        result.normalize();

        let target = self.semitones() + interval.semitones();
        result.alteration += target - result.semitones();
        result
    }

    /// Note name without octave marks
    pub fn step_name(&self, language: PitchLanguage) -> String {
        language.note_name(self.step, self.alteration)
    }

    /// Octave marks in absolute mode
    ///
    /// Octave 0 (middle C) is `'`, octave -1 has no marks, lower octaves
    /// use one `,` per octave below -1.
    pub fn absolute_octave_marks(&self) -> String {
        if self.octave >= 0 {
            "'".repeat((self.octave + 1) as usize)
        } else if self.octave < -1 {
            ",".repeat((-self.octave - 1) as usize)
        } else {
            String::new()
        }
    }

    /// Octave marks relative to the previously rendered pitch
    ///
    /// LilyPond picks the closest octave, so a distance of up to a fourth
    /// (3 steps) needs no marks; beyond that each started octave adds one.
    pub fn relative_octave_marks(&self, previous: &Pitch) -> String {
        let diff = self.steps() - previous.steps();
        if diff > 3 {
            "'".repeat(((diff + 3) / 7) as usize)
        } else if diff < -3 {
            ",".repeat(((-diff + 3) / 7) as usize)
        } else {
            String::new()
        }
    }

    /// Note name plus absolute octave marks
    pub fn absolute_expression(&self, language: PitchLanguage) -> String {
        format!("{}{}", self.step_name(language), self.absolute_octave_marks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b_flat_below_middle_c() -> Pitch {
        Pitch::new(6, -1, -1)
    }

    #[test]
    fn test_semitones() {
        assert_eq!(Pitch::new(0, 0, 0).semitones(), Rational::from_integer(0));
        assert_eq!(Pitch::new(6, -1, -1).semitones(), Rational::from_integer(-2));
        assert_eq!(Pitch::new(3, 1, 1).semitones(), Rational::from_integer(18));
        assert_eq!(
            Pitch::new(0, 0, 0).with_alteration(Rational::new(1, 2)).semitones(),
            Rational::new(1, 2)
        );
    }

    #[test]
    fn test_normalize_negative_step() {
        let mut down = Pitch::new(-4, 0, 0);
        down.normalize();
        assert_eq!((down.step, down.octave), (3, -1));

        let mut up = Pitch::new(9, 0, 0);
        up.normalize();
        assert_eq!((up.step, up.octave), (2, 1));
    }

    #[test]
    fn test_transpose_up_a_fifth_respells_correctly() {
        let fifth = Pitch::new(4, 0, 0);
        let f = b_flat_below_middle_c().transposed(&fifth);
        // b-flat up a fifth is f (not f-sharp or e-sharp)
        assert_eq!((f.step, f.alteration, f.octave), (3, Rational::from_integer(0), 0));

        let c = f.transposed(&fifth);
        assert_eq!((c.step, c.alteration, c.octave), (0, Rational::from_integer(0), 1));
    }

    #[test]
    fn test_transpose_down_a_fifth() {
        let mut down = Pitch::new(-4, 0, 0);
        down.normalize();
        let e_flat = b_flat_below_middle_c().transposed(&down);
        assert_eq!(e_flat.step, 2);
        assert_eq!(e_flat.alteration, Rational::from_integer(-1));
        assert_eq!(e_flat.octave, -1);
    }

    #[test]
    fn test_transpose_preserves_semitone_sum() {
        let intervals = [
            Pitch::new(4, 0, 0),
            Pitch::new(2, -1, 0),
            Pitch::new(6, 0, -1),
            Pitch::new(1, 1, 1),
            Pitch::new(3, 1, -2),
        ];
        for step in 0..7 {
            for alteration in -2..=2 {
                for octave in -2..=2 {
                    let pitch = Pitch::new(step, alteration, octave);
                    for interval in &intervals {
                        assert_eq!(
                            pitch.transposed(interval).semitones(),
                            pitch.semitones() + interval.semitones(),
                            "{:?} + {:?}",
                            pitch,
                            interval
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_absolute_octave_marks() {
        assert_eq!(Pitch::new(0, 0, 0).absolute_octave_marks(), "'");
        assert_eq!(Pitch::new(0, 0, 2).absolute_octave_marks(), "'''");
        assert_eq!(Pitch::new(0, 0, -1).absolute_octave_marks(), "");
        assert_eq!(Pitch::new(0, 0, -3).absolute_octave_marks(), ",,");
    }

    #[test]
    fn test_relative_octave_marks_threshold() {
        let c4 = Pitch::new(0, 0, 0);
        // a fourth up or down needs no marks
        assert_eq!(Pitch::new(3, 0, 0).relative_octave_marks(&c4), "");
        assert_eq!(Pitch::new(4, 0, -1).relative_octave_marks(&c4), "");
        // a fifth up/down flips to the other side
        assert_eq!(Pitch::new(4, 0, 0).relative_octave_marks(&c4), "'");
        assert_eq!(Pitch::new(3, 0, -1).relative_octave_marks(&c4), ",");
        // octave and more
        assert_eq!(Pitch::new(0, 0, 1).relative_octave_marks(&c4), "'");
        assert_eq!(Pitch::new(0, 0, -1).relative_octave_marks(&c4), ",");
        assert_eq!(Pitch::new(4, 0, 1).relative_octave_marks(&c4), "''");
        assert_eq!(Pitch::new(3, 0, -2).relative_octave_marks(&c4), ",,");
    }

    #[test]
    fn test_relative_division_on_boundaries() {
        let c4 = Pitch::new(0, 0, 0);
        // diff 10 -> (10+3)/7 = 1, diff 11 -> 2
        assert_eq!(Pitch::new(3, 0, 1).relative_octave_marks(&c4), "'");
        assert_eq!(Pitch::new(4, 0, 1).relative_octave_marks(&c4), "''");
        // diff -10 -> 1, diff -11 -> 2
        assert_eq!(Pitch::new(4, 0, -2).relative_octave_marks(&c4), ",");
        assert_eq!(Pitch::new(3, 0, -2).relative_octave_marks(&c4), ",,");
    }

    #[test]
    fn test_absolute_expression() {
        let lang = PitchLanguage::Nederlands;
        assert_eq!(Pitch::new(6, -1, -1).absolute_expression(lang), "bes");
        assert_eq!(Pitch::new(3, 1, 1).absolute_expression(lang), "fis''");
        assert_eq!(Pitch::new(2, -1, -2).absolute_expression(lang), "es,");
    }
}
