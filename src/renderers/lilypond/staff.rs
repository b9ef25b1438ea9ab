//! Staff and voice layout
//!
//! Prints the `\new StaffGroup << ... >>` skeleton of a score. Leaf staves
//! refer to voices and lyrics by identifier; the music itself is printed
//! separately as definitions.

use std::io::Write;

use super::notation::escape_instrument_string;
use super::printer::OutputPrinter;
use crate::errors::EmitError;
use crate::models::{StaffGroup, StaffKind};

/// Print a staff group or staff, recursing into children
pub fn print_staff_group<W: Write>(
    group: &StaffGroup,
    printer: &mut OutputPrinter<W>,
) -> Result<(), EmitError> {
    let (staff_type, sub_staff_type) = group.effective_types();

    if let Some(staff_type) = &staff_type {
        printer.dump(&format!("\\new {}", staff_type))?;
    }
    print_overrides(group, printer)?;
    printer.dump("<<")?;
    printer.newline()?;

    if let Some(staff_type) = &staff_type {
        if let Some(name) = &group.instrument_name {
            printer.dump(&format!(
                "\\set {}.instrumentName = {}",
                staff_type,
                escape_instrument_string(name)
            ))?;
            printer.newline()?;
        }
        if let Some(name) = &group.short_instrument_name {
            printer.dump(&format!(
                "\\set {}.shortInstrumentName = {}",
                staff_type,
                escape_instrument_string(name)
            ))?;
            printer.newline()?;
        }
    }

    if group.kind.is_staff() {
        print_staff_contents(group, &sub_staff_type, printer)?;
    } else {
        for child in &group.children {
            print_staff_group(child, printer)?;
        }
    }

    printer.newline()?;
    printer.dump(">>")?;
    printer.newline()
}

/// `\with { ... }` block, only when something needs overriding
fn print_overrides<W: Write>(
    group: &StaffGroup,
    printer: &mut OutputPrinter<W>,
) -> Result<(), EmitError> {
    match &group.kind {
        StaffKind::Group => {
            let delimiter = match group.symbol.as_deref() {
                Some("brace") => Some("SystemStartBrace"),
                Some("none") => Some("f"),
                Some("line") => Some("SystemStartSquare"),
                _ => None,
            };
            let has_names =
                group.instrument_name.is_some() || group.short_instrument_name.is_some();
            let hide_span_bar = group.spanbar.as_deref() == Some("no");
            let other_symbol = matches!(group.symbol.as_deref(), Some(s) if s != "bracket");
            if !(has_names || hide_span_bar || other_symbol) {
                return Ok(());
            }

            printer.dump("\\with {")?;
            if has_names {
                printer.dump("\\consists \"Instrument_name_engraver\"")?;
            }
            if hide_span_bar {
                printer.dump("\\override SpanBar #'transparent = ##t")?;
            }
            if let Some(delimiter) = delimiter {
                printer.dump(&format!("systemStartDelimiter = #'{}", delimiter))?;
            }
            printer.dump("}")
        }
        StaffKind::TabStaff {
            string_tunings,
            tablature_format,
        } => {
            if string_tunings.is_empty() && tablature_format.is_none() {
                return Ok(());
            }
            printer.dump("\\with {")?;
            if !string_tunings.is_empty() {
                printer.dump("stringTunings = #'(")?;
                for tuning in string_tunings {
                    let semitones = tuning.semitones();
                    if !semitones.is_integer() {
                        log::warn!(
                            "string tuning {:?} is not a whole semitone, using {}",
                            tuning,
                            semitones.floor()
                        );
                    }
                    printer.dump(&semitones.floor().to_integer().to_string())?;
                }
                printer.dump(")")?;
            }
            if let Some(format) = tablature_format {
                printer.dump(&format!("tablatureFormat = #{}", format))?;
            }
            printer.dump("}")
        }
        StaffKind::DrumStaff { drum_style_table } => match drum_style_table {
            Some(table) => {
                printer.dump("\\with {")?;
                printer.dump(&format!("drumStyleTable = #{}", table))?;
                printer.dump("}")
            }
            None => Ok(()),
        },
        StaffKind::Staff | StaffKind::RhythmicStaff => Ok(()),
    }
}

/// One `\context` block per (sub-)staff, listing voices and lyrics
fn print_staff_contents<W: Write>(
    staff: &StaffGroup,
    sub_staff_type: &str,
    printer: &mut OutputPrinter<W>,
) -> Result<(), EmitError> {
    if staff.id.is_none() || staff.part_information.is_empty() {
        return Ok(());
    }
    let voice_command = staff.kind.voice_command();

    for part in &staff.part_information {
        match &part.staff_id {
            Some(staff_id) => {
                printer.dump(&format!("\\context {} = \"{}\" << ", sub_staff_type, staff_id))?
            }
            None => printer.dump(&format!("\\context {} << ", sub_staff_type))?,
        }
        printer.newline()?;

        let multiple_voices = part.voices.len() > 1;
        for (index, voice) in part.voices.iter().enumerate() {
            let voice_count = if multiple_voices {
                match index {
                    0 => " \\voiceOne",
                    1 => " \\voiceTwo",
                    2 => " \\voiceThree",
                    _ => " \\voiceFour",
                }
            } else {
                ""
            };
            printer.dump(&format!(
                "\\context {} = \"{}\" {{{} \\{} }}",
                voice_command, voice.voice_id, voice_count, voice.voice_id
            ))?;
            printer.newline()?;

            for lyrics in &voice.lyrics {
                printer.dump(&format!(
                    "\\new Lyrics \\lyricsto \"{}\" \\{}",
                    voice.voice_id, lyrics
                ))?;
                printer.newline()?;
            }
        }
        printer.dump(">>")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pitch, Rational, StaffPart, VoicePart};
    use crate::settings::EmitterSettings;

    fn render(group: &StaffGroup) -> String {
        let mut printer = OutputPrinter::new(Vec::new(), &EmitterSettings::default());
        print_staff_group(group, &mut printer).unwrap();
        String::from_utf8(printer.close().unwrap()).unwrap()
    }

    #[test]
    fn test_single_voice_staff() {
        let mut staff = StaffGroup::staff("P1");
        staff.part_information = vec![StaffPart::new(
            "P1",
            vec![VoicePart::new("PartPOneVoiceOne", &["PartPOneVoiceOneLyricsOne"])],
        )];
        let expected = "\\new Staff <<\n\
                        \x20   \\context Staff = \"P1\" <<\n\
                        \x20       \\context Voice = \"PartPOneVoiceOne\" { \\PartPOneVoiceOne }\n\
                        \x20       \\new Lyrics \\lyricsto \"PartPOneVoiceOne\" \\PartPOneVoiceOneLyricsOne\n\
                        \x20       >>\n\
                        \x20   >>\n";
        assert_eq!(render(&staff), expected);
    }

    #[test]
    fn test_voice_numbering_only_with_several_voices() {
        let mut staff = StaffGroup::staff("P1");
        staff.part_information = vec![StaffPart::new(
            "P1",
            vec![
                VoicePart::new("a", &[]),
                VoicePart::new("b", &[]),
                VoicePart::new("c", &[]),
                VoicePart::new("d", &[]),
                VoicePart::new("e", &[]),
            ],
        )];
        let text = render(&staff);
        assert!(text.contains("\\context Voice = \"a\" { \\voiceOne \\a }"));
        assert!(text.contains("\\context Voice = \"c\" { \\voiceThree \\c }"));
        assert!(text.contains("\\context Voice = \"d\" { \\voiceFour \\d }"));
        assert!(text.contains("\\context Voice = \"e\" { \\voiceFour \\e }"));
    }

    #[test]
    fn test_piano_staff_promotion() {
        let mut staff = StaffGroup::staff("P1");
        staff.instrument_name = Some("Piano".to_string());
        staff.part_information = vec![
            StaffPart::new("P1-1", vec![VoicePart::new("rh", &[])]),
            StaffPart::new("P1-2", vec![VoicePart::new("lh", &[])]),
        ];
        let text = render(&staff);
        assert!(text.starts_with("\\new PianoStaff <<\n"));
        assert!(text.contains("\\set PianoStaff.instrumentName = \"Piano\""));
        assert!(text.contains("\\context Staff = \"P1-1\" <<"));
        assert!(text.contains(">> \\context Staff = \"P1-2\" <<"));
    }

    #[test]
    fn test_group_with_block() {
        let mut group = StaffGroup::group();
        group.symbol = Some("brace".to_string());
        group.append_staff(StaffGroup::staff("P1"));
        let text = render(&group);
        assert_eq!(
            text.lines().next(),
            Some("\\new StaffGroup \\with { systemStartDelimiter = #'SystemStartBrace } <<")
        );

        let mut hidden = StaffGroup::group();
        hidden.spanbar = Some("no".to_string());
        let text = render(&hidden);
        assert_eq!(
            text.lines().next(),
            Some("\\new StaffGroup \\with { \\override SpanBar #'transparent = ##t } <<")
        );
    }

    #[test]
    fn test_bracket_group_has_no_with_block() {
        let mut group = StaffGroup::group();
        group.symbol = Some("bracket".to_string());
        let text = render(&group);
        assert_eq!(text.lines().next(), Some("\\new StaffGroup <<"));
    }

    #[test]
    fn test_special_staves() {
        let mut tab = StaffGroup::new(StaffKind::TabStaff {
            string_tunings: vec![Pitch::new(2, 0, -2), Pitch::new(5, 0, -2)],
            tablature_format: None,
        });
        tab.id = Some("P2".to_string());
        tab.part_information = vec![StaffPart::new("P2", vec![VoicePart::new("t", &[])])];
        let text = render(&tab);
        assert!(text.starts_with("\\new TabStaff \\with { stringTunings = #'( -20 -15 ) } <<"));
        assert!(text.contains("\\context TabVoice = \"t\" { \\t }"));

        let mut drums = StaffGroup::new(StaffKind::DrumStaff {
            drum_style_table: Some("percussion-style".to_string()),
        });
        drums.id = Some("P3".to_string());
        drums.part_information = vec![StaffPart::new("P3", vec![VoicePart::new("d", &[])])];
        let text = render(&drums);
        assert!(text.starts_with("\\new DrumStaff \\with { drumStyleTable = #percussion-style } <<"));
        assert!(text.contains("\\context DrumVoice = \"d\" { \\d }"));
    }

    #[test]
    fn test_quarter_tone_tuning_keeps_whole_semitones() {
        let quarter_sharp_e = Pitch::new(2, 0, -2).with_alteration(Rational::new(1, 2));
        let tab = StaffGroup::new(StaffKind::TabStaff {
            string_tunings: vec![quarter_sharp_e, Pitch::new(2, -1, -1)],
            tablature_format: None,
        });
        let text = render(&tab);
        assert!(text.starts_with("\\new TabStaff \\with { stringTunings = #'( -20 -9 ) } <<"));
    }

    #[test]
    fn test_multi_line_instrument_name() {
        let mut group = StaffGroup::group();
        group.instrument_name = Some("Violin\nI".to_string());
        let text = render(&group);
        assert!(text.contains("\\consists \"Instrument_name_engraver\""));
        assert!(text.contains(
            "\\set StaffGroup.instrumentName = \\markup { \\column { \\line {\"Violin\"} \\line {\"I\"} } }"
        ));
    }
}
