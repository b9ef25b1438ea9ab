//! Whole-document output: version header, language, definitions and the
//! score's staff layout, both as a string and written to disk

use lilypond_emitter::models::{ChordEvent, Music, NoteEvent, StaffPart, VoicePart};
use lilypond_emitter::{
    emit_document, emit_staff, export_to_file, Duration, EmitterSettings, MusicTree, NodeId, Pitch,
    PitchLanguage, StaffGroup,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn melody(tree: &mut MusicTree, pitches: &[Pitch]) -> NodeId {
    let seq = tree.add_sequential();
    for pitch in pitches {
        let chord = tree.add(Music::Chord(ChordEvent::default()));
        let note = tree.add(NoteEvent::new(*pitch, Duration::new(2, 0)));
        tree.append(chord, note).unwrap();
        tree.append(seq, chord).unwrap();
    }
    tree.set_identifier(seq, "melody");
    seq
}

fn single_staff() -> StaffGroup {
    let mut staff = StaffGroup::staff("P1");
    staff.part_information = vec![StaffPart::new("P1", vec![VoicePart::new("melody", &[])])];
    staff
}

#[test]
fn test_document_layout() {
    let mut tree = MusicTree::new();
    let seq = melody(&mut tree, &[Pitch::new(0, 0, 0), Pitch::new(1, 0, 0)]);

    let text = emit_document(&tree, &[seq], &single_staff(), &EmitterSettings::default()).unwrap();

    let expected = "\n\
                    \\version \"2.24.0\"\n\
                    \n\
                    melody = {\n\
                    \x20   c'4 d' }\n\
                    \n\
                    \\score {\n\
                    \x20   \\new Staff <<\n\
                    \x20       \\context Staff = \"P1\" <<\n\
                    \x20           \\context Voice = \"melody\" { \\melody }\n\
                    \x20           >>\n\
                    \x20       >>\n\
                    \x20   }\n";
    assert_eq!(text, expected);
}

#[test]
fn test_non_default_language_is_declared() {
    let mut tree = MusicTree::new();
    let seq = melody(&mut tree, &[Pitch::new(6, -1, 0), Pitch::new(6, 0, 0)]);
    let settings = EmitterSettings {
        language: PitchLanguage::Deutsch,
        ..EmitterSettings::default()
    };

    let text = emit_document(&tree, &[seq], &single_staff(), &settings).unwrap();

    assert!(text.contains("\\language \"deutsch\"\n"));
    assert!(text.contains("b'4 h'"));
}

#[test]
fn test_default_language_is_implicit() {
    let tree = MusicTree::new();
    let text = emit_document(&tree, &[], &single_staff(), &EmitterSettings::default()).unwrap();
    assert!(!text.contains("\\language"));
    assert!(text.starts_with("\n\\version \"2.24.0\"\n"));
}

#[test]
fn test_reference_prints_identifier() {
    let mut tree = MusicTree::new();
    let seq = melody(&mut tree, &[Pitch::new(0, 0, 0)]);
    let outer = tree.add_sequential();
    tree.append(outer, seq).unwrap();

    let text =
        lilypond_emitter::emit_music(&tree, outer, &EmitterSettings::default()).unwrap();
    assert_eq!(text, "{\n    \\melody }\n");
}

#[test]
fn test_nested_groups() {
    let mut strings = StaffGroup::group();
    strings.symbol = Some("none".to_string());
    strings.append_staff(StaffGroup::staff("P1"));
    strings.append_staff(StaffGroup::staff("P2"));
    let mut score = StaffGroup::group();
    score.staff_type = None;
    score.append_staff(strings);

    assert!(score.set_part_information(
        "P2",
        vec![StaffPart::new("P2", vec![VoicePart::new("cello", &["celloWords"])])]
    ));
    assert!(!score.set_part_information("P9", Vec::new()));

    let text = emit_staff(&score, &EmitterSettings::default()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "<<");
    assert_eq!(
        lines[1],
        "    \\new StaffGroup \\with { systemStartDelimiter = #'f } <<"
    );
    assert!(text.contains("\\context Voice = \"cello\" { \\cello }"));
    assert!(text.contains("\\new Lyrics \\lyricsto \"cello\" \\celloWords"));
    // closing brackets sit at the indentation of the lines they close
    assert_eq!(lines.last(), Some(&"    >>"));
}

#[test]
fn test_export_to_file() {
    let mut tree = MusicTree::new();
    let seq = melody(&mut tree, &[Pitch::new(4, 1, 0)]);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("score.ly");

    export_to_file(&path, &tree, &[seq], &single_staff(), &EmitterSettings::default()).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    let expected =
        emit_document(&tree, &[seq], &single_staff(), &EmitterSettings::default()).unwrap();
    assert_eq!(written, expected);
    assert!(written.contains("melody = {\n    gis'4 }\n"));
}

#[test]
fn test_export_to_missing_directory_fails() {
    let tree = MusicTree::new();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("score.ly");

    let result = export_to_file(&path, &tree, &[], &single_staff(), &EmitterSettings::default());
    assert!(result.is_err());
}

#[test]
fn test_settings_from_json_drive_output() {
    let settings = EmitterSettings::from_json(
        r#"{"target_lilypond_version": "2.22.1", "indent_width": 2}"#,
    )
    .unwrap();
    let text = emit_staff(&single_staff(), &settings).unwrap();
    assert!(text.starts_with("\\new Staff <<\n  \\context Staff = \"P1\" <<\n"));

    let tree = MusicTree::new();
    let document = emit_document(&tree, &[], &single_staff(), &settings).unwrap();
    assert!(document.contains("\\version \"2.22.1\""));

    assert!(EmitterSettings::from_json("{ not json").is_err());
}
