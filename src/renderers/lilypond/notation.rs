//! LilyPond notation tokens for decorations
//!
//! Every decoration attached to a chord contributes up to three pieces of
//! text: something printed before the note (overrides), its own token after
//! the note, and something printed after that (reverts). The functions here
//! build those strings; `music.rs` decides when each one is printed.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{
    ArpeggioEvent, ArticulationEvent, ArticulationStyle, BendEvent, Direction, DynamicsEvent,
    Event, EventKind, FretEvent, LineType, MarkEvent, MarkKind, MarkupEvent, SpanDirection,
    SpanEvent, SpanKind, TextEvent, TremoloEvent,
};

lazy_static! {
    static ref LINE_BREAKS: Regex = Regex::new(r"[\r\n]+").unwrap();
}

/// Quote an instrument name; multi-line names become a markup column
pub fn escape_instrument_string(name: &str) -> String {
    let escaped = name.replace('"', "\\\"");
    if !LINE_BREAKS.is_match(&escaped) {
        return format!("\"{}\"", escaped);
    }
    let lines: String = LINE_BREAKS
        .split(&escaped)
        .map(|line| format!("\\line {{\"{}\"}} ", line))
        .collect();
    format!("\\markup {{ \\column {{ {}}} }}", lines)
}

/// Placement prefix, falling back to `default` when no direction is forced
fn direction_mod(direction: Option<Direction>, default: &'static str) -> &'static str {
    direction.map_or(default, |d| d.prefix())
}

fn non_empty(token: String) -> Option<String> {
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

// ============================================================================
// SPANNERS
// ============================================================================

/// Token a spanner prints after its note
pub fn span_token(span: &SpanEvent) -> Option<String> {
    use SpanDirection::*;

    let token = match (span.kind, span.direction) {
        (SpanKind::Slur, Start) => "(",
        (SpanKind::Slur, Stop) => ")",
        (SpanKind::Beam, Start) => "[",
        (SpanKind::Beam, Stop) => "]",
        (SpanKind::Pedal, Start) => "\\sustainDown",
        (SpanKind::Pedal, Continue) => "\\sustainUp\\sustainDown",
        (SpanKind::Pedal, Stop) => "\\sustainUp",
        (SpanKind::TextSpanner, Start) => "\\startTextSpan",
        (SpanKind::TextSpanner, Stop) => "\\stopTextSpan",
        (SpanKind::BracketSpanner, Start) => "\\startGroup",
        (SpanKind::BracketSpanner, Stop) => "\\stopGroup",
        (SpanKind::TrillSpan, Start) => "\\startTrillSpan",
        (SpanKind::TrillSpan, Stop) => "\\stopTrillSpan",
        (SpanKind::Glissando, Start) => "\\glissando",
        (SpanKind::OctaveShift, Start) => {
            return octave_shift_indicator(span)
                .map(|value| format!("#(set-octavation {})", value));
        }
        (SpanKind::OctaveShift, Stop) => "#(set-octavation 0)",
        (SpanKind::Hairpin, Stop) => "\\!",
        (SpanKind::Hairpin, _) => match span.span_type {
            1 => "\\<",
            -1 => "\\>",
            _ => "",
        },
        _ => "",
    };
    non_empty(token.to_string())
}

/// Octavation value for an ottava bracket: 8 -> 1, 15 -> 2, negated for
/// shifts up
fn octave_shift_indicator(span: &SpanEvent) -> Option<i32> {
    let value = match span.size {
        8 => 1,
        15 => 2,
        _ => 0,
    } * -span.span_type;
    if value == 0 {
        None
    } else {
        Some(value)
    }
}

fn span_before_note(span: &SpanEvent) -> Option<String> {
    if span.direction != SpanDirection::Start {
        return None;
    }
    match (span.kind, span.line_type) {
        (SpanKind::Slur, LineType::Dashed) => Some("\\slurDashed".to_string()),
        (SpanKind::Slur, LineType::Dotted) => Some("\\slurDotted".to_string()),
        (SpanKind::Glissando, line_type) => {
            let style = match line_type {
                LineType::Dashed => "dashed-line",
                LineType::Dotted => "dotted-line",
                LineType::Wavy => "zigzag",
                LineType::Solid => return None,
            };
            Some(format!(
                "\\once \\override Glissando #'style = #'{}",
                style
            ))
        }
        _ => None,
    }
}

fn span_after_note(span: &SpanEvent) -> Option<String> {
    let non_solid = matches!(span.line_type, LineType::Dashed | LineType::Dotted);
    if span.kind == SpanKind::Slur && span.direction == SpanDirection::Start && non_solid {
        Some("\\slurSolid".to_string())
    } else {
        None
    }
}

// ============================================================================
// OTHER DECORATIONS
// ============================================================================

fn arpeggio_before_note(arpeggio: &ArpeggioEvent) -> Option<String> {
    if arpeggio.non_arpeggiate {
        return Some("\\arpeggioBracket".to_string());
    }
    match arpeggio.direction {
        Some(Direction::Up) => Some("\\arpeggioUp".to_string()),
        Some(Direction::Down) => Some("\\arpeggioDown".to_string()),
        _ => None,
    }
}

fn arpeggio_after_note(arpeggio: &ArpeggioEvent) -> Option<String> {
    let directed = matches!(arpeggio.direction, Some(Direction::Up | Direction::Down));
    if arpeggio.non_arpeggiate || directed {
        Some("\\arpeggioNeutral".to_string())
    } else {
        None
    }
}

fn dynamics_token(dynamics: &DynamicsEvent) -> Option<String> {
    dynamics.kind.as_ref().map(|kind| format!("\\{}", kind))
}

/// `\mark ...`; an empty text mark prints a visible error marker
pub fn mark_token(mark: &MarkEvent) -> Option<String> {
    let contents = match (mark.kind, mark.mark.as_deref()) {
        (MarkKind::Text, Some(text)) if !text.is_empty() => text.to_string(),
        (MarkKind::Text, _) => "\"ERROR\"".to_string(),
        (MarkKind::MusicGlyph, Some(glyph)) if !glyph.is_empty() => {
            format!("\\markup {{ \\musicglyph #\"scripts.{}\" }}", glyph)
        }
        (MarkKind::MusicGlyph, _) => String::new(),
    };
    Some(format!("\\mark {}", contents))
}

fn text_token(text: &TextEvent) -> Option<String> {
    let direction = direction_mod(text.force_direction, "-");
    let token = match &text.markup {
        Some(markup) if !markup.is_empty() => {
            format!("{}\\markup{{ {} {{{}}} }}", direction, markup, text.text)
        }
        _ => format!("{}\"{}\"", direction, text.text.replace('"', "\\\"")),
    };
    Some(token)
}

fn articulation_token(articulation: &ArticulationEvent) -> Option<String> {
    let name = articulation.name.as_deref().filter(|n| !n.is_empty())?;
    let token = match articulation.style {
        ArticulationStyle::Named => format!(
            "{}\\{}",
            direction_mod(articulation.force_direction, ""),
            name
        ),
        ArticulationStyle::Short => {
            format!("{}{}", direction_mod(articulation.force_direction, "-"), name)
        }
        ArticulationStyle::NoDirection => format!("\\{}", name),
    };
    Some(token)
}

fn markup_token(markup: &MarkupEvent) -> Option<String> {
    let contents = markup.contents.as_deref().filter(|c| !c.is_empty())?;
    Some(format!(
        "{}\\markup {{ {} }}",
        direction_mod(markup.force_direction, "-"),
        contents
    ))
}

/// `\fret-diagram` markup; a barre with fewer than three parts is skipped
pub fn fret_token(fret: &FretEvent) -> Option<String> {
    let mut diagram = String::new();
    if fret.strings != 6 {
        diagram.push_str(&format!("w:{};", fret.strings));
    }
    if fret.frets != 4 {
        diagram.push_str(&format!("h:{};", fret.frets));
    }
    if fret.barre.len() >= 3 {
        diagram.push_str(&format!(
            "c:{}-{}-{};",
            fret.barre[0], fret.barre[1], fret.barre[2]
        ));
    }

    let mut have_fingering = false;
    for element in &fret.elements {
        if element.len() > 1 {
            diagram.push_str(&format!("{}-{}", element[0], element[1]));
        }
        if element.len() > 2 {
            have_fingering = true;
            diagram.push_str(&format!("-{}", element[2]));
        }
        diagram.push(';');
    }
    if have_fingering {
        diagram.insert_str(0, "f:1;");
    }

    if diagram.is_empty() {
        return None;
    }
    Some(format!(
        "{}\\markup {{ \\fret-diagram #\"{}\" }}",
        direction_mod(fret.force_direction, "-"),
        diagram
    ))
}

fn tremolo_token(tremolo: &TremoloEvent) -> Option<String> {
    if tremolo.bars == 0 {
        return None;
    }
    match tremolo.bars.checked_add(2).and_then(|shift| 1u64.checked_shl(shift)) {
        Some(subdivision) => Some(format!(":{}", subdivision)),
        None => {
            log::warn!("tremolo with {} bars out of range, not printed", tremolo.bars);
            None
        }
    }
}

fn bend_token(bend: &BendEvent) -> Option<String> {
    if bend.alter == 0 {
        return None;
    }
    Some(format!("-\\bendAfter #{}", bend.alter))
}

// ============================================================================
// THREE PHASES
// ============================================================================

/// Text printed before the note a decoration is attached to
pub fn before_note(event: &Event) -> Vec<String> {
    let own = match &event.kind {
        EventKind::Span(span) => span_before_note(span),
        EventKind::Arpeggio(arpeggio) => arpeggio_before_note(arpeggio),
        _ => None,
    };
    own.into_iter().chain(event.before_note.clone()).collect()
}

/// The decoration's own token
pub fn event_token(event: &Event) -> Option<String> {
    match &event.kind {
        EventKind::Span(span) => span_token(span),
        EventKind::Arpeggio(_) => Some("\\arpeggio".to_string()),
        EventKind::Tie => Some("~".to_string()),
        EventKind::Dynamics(dynamics) => dynamics_token(dynamics),
        EventKind::Mark(mark) => mark_token(mark),
        EventKind::Text(text) => text_token(text),
        EventKind::Articulation(articulation) => articulation_token(articulation),
        EventKind::Markup(markup) => markup_token(markup),
        EventKind::Fret(fret) => fret_token(fret),
        EventKind::Tremolo(tremolo) => tremolo_token(tremolo),
        EventKind::Bend(bend) => bend_token(bend),
        EventKind::Note(_) | EventKind::Rest(_) | EventKind::Skip(_) => None,
    }
}

/// Text printed after all decoration tokens of the chord
pub fn after_note(event: &Event) -> Vec<String> {
    let own = match &event.kind {
        EventKind::Span(span) => span_after_note(span),
        EventKind::Arpeggio(arpeggio) => arpeggio_after_note(arpeggio),
        _ => None,
    };
    own.into_iter().chain(event.after_note.clone()).collect()
}
