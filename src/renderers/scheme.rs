//! Scheme music expressions
//!
//! Renders nodes of the music tree as `(make-music ...)` expressions, the
//! form LilyPond uses internally. Useful for debugging a tree and for
//! embedding music in Scheme code.

use crate::models::{
    ClefChange, Duration, EventKind, KeySignatureChange, Music, MusicNode, MusicTree, NodeId,
    Pitch, Rational,
};

/// `(ly:make-duration log dots num den)`
pub fn duration_expression(duration: &Duration) -> String {
    format!(
        "(ly:make-duration {} {} {} {})",
        duration.log,
        duration.dots,
        duration.factor.numer(),
        duration.factor.denom()
    )
}

/// `(ly:make-pitch octave step alteration)`, alteration in whole tones
pub fn pitch_expression(pitch: &Pitch) -> String {
    let alteration = pitch.alteration / Rational::from_integer(2);
    format!(
        "(ly:make-pitch {} {} {})",
        pitch.octave, pitch.step, alteration
    )
}

/// Scheme expression for a node and everything below it
pub fn lisp_expression(tree: &MusicTree, id: NodeId) -> String {
    lisp_expression_filtered(tree, id, &|_| true)
}

/// Scheme expression for a node, keeping only the children of nested music
/// that match `predicate`
pub fn lisp_sub_expression<F>(tree: &MusicTree, id: NodeId, predicate: &F) -> String
where
    F: Fn(&MusicNode) -> bool,
{
    let elements = element_list(tree, tree.children(id), &|node| predicate(node), false);
    make_music(tree.music(id).name(), &elements)
}

fn lisp_expression_filtered(
    tree: &MusicTree,
    id: NodeId,
    predicate: &dyn Fn(&MusicNode) -> bool,
) -> String {
    let music = tree.music(id);
    match music {
        Music::KeySignature(key) => key_expression(key),
        Music::Clef(clef) => clef_expression(clef).unwrap_or_default(),
        Music::MultiMeasureRest(rest) => multi_measure_rest_expression(&rest.duration),
        _ => make_music(music.name(), &properties(tree, id, predicate)),
    }
}

fn make_music(name: &str, properties: &str) -> String {
    if properties.is_empty() {
        format!("(make-music '{})", name)
    } else {
        format!("(make-music '{} {})", name, properties)
    }
}

fn element_list(
    tree: &MusicTree,
    elements: &[NodeId],
    predicate: &dyn Fn(&MusicNode) -> bool,
    recurse_filtered: bool,
) -> String {
    let items: Vec<String> = elements
        .iter()
        .filter(|e| predicate(tree.node(**e)))
        .map(|e| {
            if recurse_filtered {
                lisp_expression_filtered(tree, *e, predicate)
            } else {
                lisp_expression(tree, *e)
            }
        })
        .collect();
    format!("'elements (list {})", items.join(" "))
}

fn properties(
    tree: &MusicTree,
    id: NodeId,
    predicate: &dyn Fn(&MusicNode) -> bool,
) -> String {
    match tree.music(id) {
        Music::Sequential(nested) => element_list(tree, &nested.elements, predicate, true),
        Music::Chord(chord) => element_list(tree, &chord.elements, predicate, true),
        Music::Wrapper(wrapper) => match wrapper.element {
            Some(element) => format!(
                "'element {}",
                lisp_expression_filtered(tree, element, predicate)
            ),
            None => String::new(),
        },
        Music::Event(event) => match &event.kind {
            EventKind::Note(note) => {
                let mut props = format!("'duration {}", duration_expression(&note.duration));
                if let Some(pitch) = &note.pitch {
                    props.push_str(&format!(" 'pitch {}", pitch_expression(pitch)));
                } else if let Some(drum) = &note.drum_type {
                    props.push_str(&format!(" 'drum-type '{}", drum));
                }
                props
            }
            EventKind::Rest(rest) => format!("'duration {}", duration_expression(&rest.duration)),
            EventKind::Skip(skip) => format!("'duration {}", duration_expression(&skip.duration)),
            EventKind::Span(span) => format!("'span-direction {}", span.direction.code()),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// Key change as a pitch alist of the seven step alterations
fn key_expression(key: &KeySignatureChange) -> String {
    let pairs: Vec<String> = (0..7)
        .map(|step| format!("({} . {})", step, key.scale.get(step).copied().unwrap_or(0)))
        .collect();
    format!("(make-music 'KeyChangeEvent 'pitch-alist '({}))", pairs.join(" "))
}

/// Clef as staff property settings; `None` for clef signs without a glyph
fn clef_expression(clef: &ClefChange) -> Option<String> {
    let (glyph, position, middle_c) = match clef.clef_type.as_str() {
        "G" => ("clefs.G", -2, -6),
        "C" => ("clefs.C", 0, 0),
        "F" => ("clefs.F", 2, 6),
        other => {
            log::debug!("no Scheme clef settings for clef type '{}'", other);
            return None;
        }
    };
    let set = |property: &str, value: String| {
        format!(
            "(context-spec-music (make-property-set '{} {}) 'Staff)",
            property, value
        )
    };
    Some(format!(
        "(make-music 'SequentialMusic 'elements (list {} {} {}))",
        set("clefGlyph", format!("\"{}\"", glyph)),
        set("clefPosition", position.to_string()),
        set("middleCPosition", middle_c.to_string())
    ))
}

/// A whole-bar rest framed by bar checks
fn multi_measure_rest_expression(duration: &Duration) -> String {
    format!(
        "(make-music 'MultiMeasureRestMusicGroup 'elements (list \
         (make-music 'BarCheck) \
         (make-music 'EventChord 'elements (list \
         (make-music 'MultiMeasureRestEvent 'duration {}))) \
         (make-music 'BarCheck)))",
        duration_expression(duration)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MultiMeasureRest, NoteEvent, RestEvent, SpanDirection, SpanEvent, SpanKind};

    #[test]
    fn test_duration_and_pitch() {
        let triplet = Duration::new(3, 1).with_factor(Rational::new(2, 3));
        assert_eq!(duration_expression(&triplet), "(ly:make-duration 3 1 2 3)");

        let b_flat = Pitch::new(6, -1, -1);
        assert_eq!(pitch_expression(&b_flat), "(ly:make-pitch -1 6 -1/2)");
        assert_eq!(pitch_expression(&Pitch::new(1, 2, 0)), "(ly:make-pitch 0 1 1)");
    }

    #[test]
    fn test_note_in_chord() {
        let mut tree = MusicTree::new();
        let chord = tree.add_chord();
        let note = tree.add(NoteEvent::new(Pitch::new(0, 0, 0), Duration::new(2, 0)));
        tree.append(chord, note).unwrap();
        assert_eq!(
            lisp_expression(&tree, chord),
            "(make-music 'EventChord 'elements (list (make-music 'NoteEvent \
             'duration (ly:make-duration 2 0 1 1) 'pitch (ly:make-pitch 0 0 0))))"
        );
    }

    #[test]
    fn test_drum_note_and_span() {
        let mut tree = MusicTree::new();
        let drum = tree.add(NoteEvent::drum("hihat", Duration::new(3, 0)));
        assert_eq!(
            lisp_expression(&tree, drum),
            "(make-music 'NoteEvent 'duration (ly:make-duration 3 0 1 1) 'drum-type 'hihat)"
        );
        let slur = tree.add(SpanEvent::new(SpanKind::Slur, SpanDirection::Stop));
        assert_eq!(
            lisp_expression(&tree, slur),
            "(make-music 'SpanEvent 'span-direction 1)"
        );
    }

    #[test]
    fn test_key_signature_alist() {
        let mut tree = MusicTree::new();
        let key = tree.add(KeySignatureChange {
            scale: vec![0, 0, 0, 1, 0, 0, 0],
            ..KeySignatureChange::default()
        });
        assert_eq!(
            lisp_expression(&tree, key),
            "(make-music 'KeyChangeEvent 'pitch-alist \
             '((0 . 0) (1 . 0) (2 . 0) (3 . 1) (4 . 0) (5 . 0) (6 . 0)))"
        );
    }

    #[test]
    fn test_clef_settings() {
        let bass = clef_expression(&ClefChange::new("F", 4)).unwrap();
        assert!(bass.contains("(make-property-set 'clefGlyph \"clefs.F\") 'Staff"));
        assert!(bass.contains("(make-property-set 'middleCPosition 6) 'Staff"));
        assert_eq!(clef_expression(&ClefChange::new("percussion", 2)), None);
    }

    #[test]
    fn test_multi_measure_rest_group() {
        let mut tree = MusicTree::new();
        let rest = tree.add(MultiMeasureRest {
            duration: Duration::new(0, 0).with_factor(Rational::from_integer(3)),
        });
        let expression = lisp_expression(&tree, rest);
        assert!(expression.starts_with("(make-music 'MultiMeasureRestMusicGroup"));
        assert!(expression.contains("'duration (ly:make-duration 0 0 3 1)"));
    }

    #[test]
    fn test_subset_keeps_matching_children() {
        let mut tree = MusicTree::new();
        let seq = tree.add_sequential();
        let note = tree.add(NoteEvent::new(Pitch::new(0, 0, 0), Duration::new(2, 0)));
        let rest = tree.add(RestEvent::new(Duration::new(2, 0)));
        tree.append(seq, note).unwrap();
        tree.append(seq, rest).unwrap();

        let only_rests = |node: &MusicNode| {
            matches!(node.music.as_event().map(|e| &e.kind), Some(EventKind::Rest(_)))
        };
        assert_eq!(
            lisp_sub_expression(&tree, seq, &only_rests),
            "(make-music 'SequentialMusic 'elements (list \
             (make-music 'RestEvent 'duration (ly:make-duration 2 0 1 1))))"
        );
    }
}
