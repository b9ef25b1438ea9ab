//! Printing of the music tree
//!
//! One recursive pass over a `MusicTree`. All state that changes during the
//! pass (durations, relative pitches, scaling) lives in the `OutputPrinter`;
//! the functions here only decide what to print and in which order.

use std::io::Write;

use super::notation;
use super::printer::OutputPrinter;
use crate::errors::EmitError;
use crate::models::{
    BarLine, ChordEvent, ClefChange, Event, EventKind, Music, MusicTree, MusicWrapper, NodeId,
    NoteEvent, RepeatedMusic, WrapperKind,
};

/// Print a node reached as a child: a reference when it has an identifier,
/// otherwise its contents
pub fn print_child<W: Write>(
    tree: &MusicTree,
    id: NodeId,
    printer: &mut OutputPrinter<W>,
) -> Result<(), EmitError> {
    match &tree.node(id).identifier {
        Some(identifier) => printer.dump(&format!("\\{}", identifier)),
        None => print_music(tree, id, printer),
    }
}

/// Print `identifier = <music>` for a node defined by reference
pub fn print_definition<W: Write>(
    tree: &MusicTree,
    id: NodeId,
    printer: &mut OutputPrinter<W>,
) -> Result<(), EmitError> {
    if let Some(identifier) = &tree.node(id).identifier {
        printer.dump(&format!("{} =", identifier))?;
    } else {
        log::debug!("definition printed for node {:?} without identifier", id);
    }
    printer.invalidate_duration();
    print_music(tree, id, printer)?;
    printer.newline()
}

/// Print a node's contents
pub fn print_music<W: Write>(
    tree: &MusicTree,
    id: NodeId,
    printer: &mut OutputPrinter<W>,
) -> Result<(), EmitError> {
    let node = tree.node(id);
    match &node.music {
        Music::Sequential(_) => return print_sequential(tree, id, printer, true),
        Music::Chord(chord) => return print_chord(tree, id, chord, printer),
        Music::Wrapper(wrapper) => print_wrapper(tree, id, wrapper, printer)?,
        Music::Repeated(repeat) => print_repeat(tree, repeat, printer)?,
        Music::Lyrics(lyrics) => {
            printer.dump("\\lyricmode {")?;
            for syllable in &lyrics.syllables {
                printer.dump(syllable)?;
            }
            printer.dump("}")?;
        }
        Music::Partial(partial) => {
            if let Some(duration) = &partial.partial {
                printer.dump(&format!("\\partial {}", duration.ly_expression()))?;
                printer.invalidate_duration();
            }
        }
        Music::BarLine(bar) => print_bar_line(bar, printer)?,
        Music::KeySignature(key) => {
            let tonic = key.tonic.step_name(printer.language());
            printer.dump(&format!("\\key {} \\{}", tonic, key.mode))?;
        }
        Music::TimeSignature(time) => {
            let (beats, beat_type) = time.fraction;
            printer.dump(&format!("\\time {}/{}", beats, beat_type))?;
        }
        Music::Clef(clef) => print_clef(clef, printer)?,
        Music::StaffChange(change) => {
            if let Some(staff) = &change.staff {
                printer.dump(&format!("\\change Staff=\"{}\"", staff))?;
            }
        }
        Music::MultiMeasureRest(rest) => {
            printer.dump("R")?;
            printer.print_duration(&rest.duration);
        }
        Music::Event(event) => print_standalone_event(event, printer)?,
    }
    print_comment(node.comment.as_deref(), printer)
}

/// `{ ... }`, with line breaks after both braces unless `newlines` is off
pub fn print_sequential<W: Write>(
    tree: &MusicTree,
    id: NodeId,
    printer: &mut OutputPrinter<W>,
    newlines: bool,
) -> Result<(), EmitError> {
    printer.dump("{")?;
    print_comment(tree.node(id).comment.as_deref(), printer)?;
    if newlines {
        printer.newline()?;
    }
    for element in tree.children(id) {
        print_child(tree, *element, printer)?;
    }
    printer.dump("}")?;
    if newlines {
        printer.newline()?;
    }
    Ok(())
}

// ============================================================================
// CHORDS
// ============================================================================

fn print_chord<W: Write>(
    tree: &MusicTree,
    id: NodeId,
    chord: &ChordEvent,
    printer: &mut OutputPrinter<W>,
) -> Result<(), EmitError> {
    if let Some(grace) = chord.grace_elements {
        if !chord.elements.is_empty() {
            let command = chord.grace_type.as_deref().unwrap_or("grace");
            printer.dump(&format!("\\{}", command))?;
            print_sequential(tree, grace, printer, false)?;
        }
    }

    let mut notes: Vec<&NoteEvent> = Vec::new();
    let mut rests: Vec<&Event> = Vec::new();
    let mut decorations: Vec<NodeId> = Vec::new();
    for element in &chord.elements {
        match tree.music(*element).as_event() {
            Some(event) => match &event.kind {
                EventKind::Note(note) => notes.push(note),
                EventKind::Rest(_) | EventKind::Skip(_) => rests.push(event),
                _ => decorations.push(*element),
            },
            None => decorations.push(*element),
        }
    }
    let decoration_events: Vec<&Event> = decorations
        .iter()
        .filter_map(|d| tree.music(*d).as_event())
        .collect();

    for event in decoration_events.iter().filter(|e| e.waits_for_note()) {
        for text in notation::before_note(event) {
            printer.dump(&text)?;
        }
    }

    if let Some(rest) = rests.first() {
        print_rhythmic_event(rest, printer)?;
    } else if notes.len() == 1 {
        print_note(notes[0], printer)?;
    } else if let Some(first) = notes.first() {
        let pitches: Vec<String> = notes
            .iter()
            .map(|note| chord_member(note, printer))
            .collect();
        // relative octaves continue from the chord's first note
        if let Some(pitch) = first.pitch {
            printer.set_relative_cursor(pitch);
        }
        printer.dump(&format!("<{}>", pitches.join(" ")))?;
        printer.print_duration(&first.duration);
    }

    for element in &decorations {
        match tree.music(*element).as_event() {
            Some(event) => {
                // marks and ottavas stand alone, so their preparation goes
                // right before them
                if !event.waits_for_note() {
                    for text in notation::before_note(event) {
                        printer.dump(&text)?;
                    }
                }
                if let Some(token) = notation::event_token(event) {
                    printer.dump(&token)?;
                }
            }
            None => print_child(tree, *element, printer)?,
        }
    }

    for event in &decoration_events {
        for text in notation::after_note(event) {
            printer.dump(&text)?;
        }
    }

    print_comment(tree.node(id).comment.as_deref(), printer)
}

/// Pitch (or drum name) of a note inside `<...>`, without duration
fn chord_member<W: Write>(note: &NoteEvent, printer: &mut OutputPrinter<W>) -> String {
    match (&note.pitch, &note.drum_type) {
        (Some(pitch), _) => format!("{}{}", printer.pitch_expression(pitch), note.pitch_mods()),
        (None, Some(drum)) => drum.clone(),
        (None, None) => String::new(),
    }
}

fn print_note<W: Write>(note: &NoteEvent, printer: &mut OutputPrinter<W>) -> Result<(), EmitError> {
    match (&note.pitch, &note.drum_type) {
        (Some(pitch), _) => {
            let expression = printer.pitch_expression(pitch);
            printer.dump(&expression)?;
            printer.print_verbatim(note.pitch_mods());
        }
        (None, Some(drum)) => printer.dump(drum)?,
        (None, None) => {
            log::warn!("note without pitch or drum type, printing a skip");
            printer.dump("s")?;
        }
    }
    printer.print_duration(&note.duration);
    Ok(())
}

fn print_rhythmic_event<W: Write>(
    event: &Event,
    printer: &mut OutputPrinter<W>,
) -> Result<(), EmitError> {
    match &event.kind {
        EventKind::Note(note) => print_note(note, printer),
        EventKind::Rest(rest) => match &rest.pitch {
            Some(pitch) => {
                let expression = printer.pitch_expression(pitch);
                printer.dump(&expression)?;
                printer.print_duration(&rest.duration);
                printer.dump("\\rest")
            }
            None => {
                printer.dump("r")?;
                printer.print_duration(&rest.duration);
                Ok(())
            }
        },
        EventKind::Skip(skip) => {
            printer.dump("s")?;
            printer.print_duration(&skip.duration);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// An event outside any chord: rhythmic events print normally, decorations
/// print all three phases in place
fn print_standalone_event<W: Write>(
    event: &Event,
    printer: &mut OutputPrinter<W>,
) -> Result<(), EmitError> {
    if event.is_rhythmic() {
        return print_rhythmic_event(event, printer);
    }
    for text in notation::before_note(event) {
        printer.dump(&text)?;
    }
    if let Some(token) = notation::event_token(event) {
        printer.dump(&token)?;
    }
    for text in notation::after_note(event) {
        printer.dump(&text)?;
    }
    Ok(())
}

// ============================================================================
// WRAPPERS AND REPEATS
// ============================================================================

fn print_wrapper<W: Write>(
    tree: &MusicTree,
    id: NodeId,
    wrapper: &MusicWrapper,
    printer: &mut OutputPrinter<W>,
) -> Result<(), EmitError> {
    match &wrapper.kind {
        WrapperKind::Plain => print_wrapped(tree, id, wrapper.element, printer),
        WrapperKind::ModeChange(mode) => {
            printer.dump(&format!("\\{}", mode))?;
            print_wrapped(tree, id, wrapper.element, printer)
        }
        WrapperKind::Relative(base) => {
            let base = base.unwrap_or_default();
            let expression = base.absolute_expression(printer.language());
            let mut relative = printer.enter_relative(base);
            relative.dump(&format!("\\relative {}", expression))?;
            print_wrapped(tree, id, wrapper.element, &mut relative)
        }
        WrapperKind::TimeScaled {
            numerator,
            denominator,
        } => match wrapper.factor() {
            Some(factor) => {
                printer.dump(&format!("\\times {}/{}", numerator, denominator))?;
                let mut scaled = printer.push_factor(factor);
                print_wrapped(tree, id, wrapper.element, &mut scaled)
            }
            None => {
                log::warn!(
                    "time scaling {}/{} of {:?} is degenerate, printed unscaled",
                    numerator,
                    denominator,
                    id
                );
                print_wrapped(tree, id, wrapper.element, printer)
            }
        },
    }
}

fn print_wrapped<W: Write>(
    tree: &MusicTree,
    id: NodeId,
    element: Option<NodeId>,
    printer: &mut OutputPrinter<W>,
) -> Result<(), EmitError> {
    match element {
        Some(element) => print_child(tree, element, printer),
        None => {
            log::warn!("music wrapper {:?} has no element", id);
            printer.dump("{}")
        }
    }
}

fn print_repeat<W: Write>(
    tree: &MusicTree,
    repeat: &RepeatedMusic,
    printer: &mut OutputPrinter<W>,
) -> Result<(), EmitError> {
    printer.dump(&format!(
        "\\repeat {} {}",
        repeat.repeat_type, repeat.repeat_count
    ))?;
    match repeat.body {
        Some(body) => print_child(tree, body, printer)?,
        None => {
            log::warn!("encountered repeat without body");
            printer.dump("{}")?;
        }
    }
    if !repeat.endings.is_empty() {
        printer.dump("\\alternative {")?;
        for ending in &repeat.endings {
            print_child(tree, *ending, printer)?;
        }
        printer.dump("}")?;
    }
    Ok(())
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

fn print_clef<W: Write>(clef: &ClefChange, printer: &mut OutputPrinter<W>) -> Result<(), EmitError> {
    match clef.clef_name() {
        Some(name) => printer.dump(&format!(
            "\\clef \"{}{}\"",
            name,
            clef.octave_modifier()
        )),
        None => {
            log::warn!(
                "unknown clef {} on line {}, no clef printed",
                clef.clef_type,
                clef.position
            );
            Ok(())
        }
    }
}

fn print_bar_line<W: Write>(bar: &BarLine, printer: &mut OutputPrinter<W>) -> Result<(), EmitError> {
    match bar.bar_symbol() {
        Some(symbol) => printer.dump(&format!("\\bar \"{}\"", symbol))?,
        None => {
            if let Some(style) = &bar.bar_type {
                log::debug!("unknown bar style '{}', printing a bar check", style);
            }
            printer.dump("|")?;
        }
    }
    if bar.bar_number > 0 && bar.bar_number % 10 == 0 {
        printer.dump(&format!("\\barNumberCheck #{}", bar.bar_number))?;
    } else {
        printer.print_verbatim(&format!(" % {}", bar.bar_number));
    }
    printer.newline()
}

/// `% ...` comment lines; a comment of just a line break forces a newline
fn print_comment<W: Write>(
    comment: Option<&str>,
    printer: &mut OutputPrinter<W>,
) -> Result<(), EmitError> {
    let comment = match comment {
        Some(comment) if !comment.is_empty() => comment,
        _ => return Ok(()),
    };
    if comment == "\n" {
        return printer.newline();
    }
    for line in comment.split('\n') {
        if !line.is_empty() {
            let separator = if printer.line().trim().is_empty() { "" } else { " " };
            printer.print_verbatim(&format!("{}% {}", separator, line));
        }
        printer.newline()?;
    }
    Ok(())
}
